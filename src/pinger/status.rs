//! The JSON document a server returns in its status response.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusResponse {
    pub version: Version,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub players: Option<Players>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<Description>,
    /// Server icon as a `data:image/png;base64,...` URI.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub favicon: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enforces_secure_chat: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub previews_chat: Option<bool>,
    /// Fields this crate doesn't model (mod lists, proxy metadata, ...).
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Version {
    pub name: String,
    pub protocol: i32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Players {
    pub max: i64,
    pub online: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sample: Option<Vec<PlayerSample>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerSample {
    pub name: String,
    pub id: String,
}

/// Either a bare string or a chat component tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Description {
    Text(String),
    Component(Value),
}

impl Description {
    /// The description with component structure flattened and `§` formatting
    /// codes removed.
    pub fn plain_text(&self) -> String {
        let mut raw = String::new();
        match self {
            Description::Text(text) => raw.push_str(text),
            Description::Component(component) => flatten_component(component, &mut raw),
        }
        strip_formatting_codes(&raw)
    }
}

fn flatten_component(component: &Value, out: &mut String) {
    match component {
        Value::String(text) => out.push_str(text),
        Value::Array(parts) => {
            for part in parts {
                flatten_component(part, out);
            }
        }
        Value::Object(fields) => {
            if let Some(Value::String(text)) = fields.get("text") {
                out.push_str(text);
            } else if let Some(Value::String(key)) = fields.get("translate") {
                out.push_str(key);
            }
            if let Some(extra) = fields.get("extra") {
                flatten_component(extra, out);
            }
        }
        _ => {}
    }
}

fn strip_formatting_codes(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars();
    while let Some(c) = chars.next() {
        if c == '§' {
            chars.next();
        } else {
            out.push(c);
        }
    }
    out
}
