use tracing::trace;

use crate::net::frame::{build_packet, Packet};
use crate::net::varint;
use crate::pinger::protocols::{ParseResponseError, Protocol};
use crate::pinger::status::StatusResponse;

pub const HANDSHAKE_PACKET_ID: i32 = 0x00;
pub const STATUS_REQUEST_PACKET_ID: i32 = 0x00;
pub const STATUS_RESPONSE_PACKET_ID: i32 = 0x00;

/// Next-state value in the handshake that asks for the status exchange.
const STATUS_INTENT: i32 = 1;

/// The server list ping. `server_address` and `port` are what the handshake
/// advertises, which is the name the caller asked for even when the
/// connection goes to an SRV target.
#[derive(Debug, Clone)]
pub struct Minecraft {
    server_address: String,
    port: u16,
    protocol_version: i32,
}

impl Minecraft {
    pub fn new(server_address: impl Into<String>, port: u16, protocol_version: i32) -> Self {
        Self {
            server_address: server_address.into(),
            port,
            protocol_version,
        }
    }
}

impl Protocol for Minecraft {
    type Response = StatusResponse;

    fn requests(&self) -> Vec<Packet> {
        vec![
            build_handshake(&self.server_address, self.port, self.protocol_version),
            build_status_request(),
        ]
    }

    fn parse_response(&self, packet: &Packet) -> Result<StatusResponse, ParseResponseError> {
        parse_status_response(packet)
    }
}

pub fn build_handshake(server_address: &str, port: u16, protocol_version: i32) -> Packet {
    let mut payload = Vec::with_capacity(server_address.len() + 16);
    varint::write(&mut payload, protocol_version);
    write_string(&mut payload, server_address);
    payload.extend_from_slice(&port.to_be_bytes());
    varint::write(&mut payload, STATUS_INTENT);
    build_packet(HANDSHAKE_PACKET_ID, &payload)
}

pub fn build_status_request() -> Packet {
    build_packet(STATUS_REQUEST_PACKET_ID, &[])
}

fn write_string(out: &mut Vec<u8>, value: &str) {
    varint::write(out, value.len() as i32);
    out.extend_from_slice(value.as_bytes());
}

pub fn parse_status_response(packet: &Packet) -> Result<StatusResponse, ParseResponseError> {
    let bytes = packet.as_bytes();

    let (_length, mut offset) = varint::decode(bytes, 0)?;

    let (packet_id, id_len) = varint::decode(bytes, offset)?;
    if packet_id != STATUS_RESPONSE_PACKET_ID {
        return Err(ParseResponseError::UnexpectedPacketId {
            expected: STATUS_RESPONSE_PACKET_ID,
            found: packet_id,
        });
    }
    offset += id_len;

    let (declared, string_len) = varint::decode(bytes, offset)?;
    offset += string_len;
    let remaining = bytes.len() - offset;
    let json_len = usize::try_from(declared)
        .ok()
        .filter(|len| *len <= remaining)
        .ok_or(ParseResponseError::TruncatedPayload {
            declared,
            remaining,
        })?;

    let json = &bytes[offset..offset + json_len];
    trace!("status payload: {}", String::from_utf8_lossy(json));
    Ok(serde_json::from_slice(json)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn response_packet(json: &str) -> Packet {
        let mut payload = Vec::new();
        write_string(&mut payload, json);
        build_packet(STATUS_RESPONSE_PACKET_ID, &payload)
    }

    #[test]
    fn handshake_matches_wire_bytes() {
        let packet = build_handshake("localhost", 25565, 761);
        assert_eq!(
            packet.as_bytes(),
            [
                0x10, 0x00, 0xf9, 0x05, 0x09, 0x6c, 0x6f, 0x63, 0x61, 0x6c, 0x68, 0x6f, 0x73,
                0x74, 0x63, 0xdd, 0x01
            ]
        );
    }

    #[test]
    fn handshake_encodes_protocol_version_as_varint() {
        let packet = build_handshake("localhost", 25565, 765);
        assert_eq!(&packet.as_bytes()[..5], [0x10, 0x00, 0xfd, 0x05, 0x09]);
        assert_eq!(&packet.as_bytes()[14..], [0x63, 0xdd, 0x01]);
    }

    #[test]
    fn status_request_is_id_only() {
        assert_eq!(build_status_request().as_bytes(), [0x01, 0x00]);
    }

    #[test]
    fn requests_are_handshake_then_status_request() {
        let protocol = Minecraft::new("play.example.com", 25565, 47);
        let requests = protocol.requests();
        assert_eq!(requests.len(), 2);
        assert_eq!(requests[0], build_handshake("play.example.com", 25565, 47));
        assert_eq!(requests[1], build_status_request());
    }

    #[test]
    fn parses_status_response() {
        let packet = response_packet(
            r#"{"version":{"name":"1.20.4","protocol":765},"players":{"max":20,"online":3},"description":"A server"}"#,
        );
        let status = parse_status_response(&packet).unwrap();
        assert_eq!(status.version.name, "1.20.4");
        assert_eq!(status.players.unwrap().online, 3);
    }

    #[test]
    fn rejects_other_packet_ids() {
        let mut payload = Vec::new();
        write_string(&mut payload, "{}");
        let packet = build_packet(0x01, &payload);

        let err = parse_status_response(&packet).unwrap_err();
        assert!(matches!(
            err,
            ParseResponseError::UnexpectedPacketId {
                expected: 0x00,
                found: 0x01
            }
        ));
    }

    #[test]
    fn rejects_string_longer_than_packet() {
        let mut payload = Vec::new();
        varint::write(&mut payload, 50);
        payload.extend_from_slice(b"{}");
        let packet = build_packet(STATUS_RESPONSE_PACKET_ID, &payload);

        let err = parse_status_response(&packet).unwrap_err();
        assert!(matches!(
            err,
            ParseResponseError::TruncatedPayload {
                declared: 50,
                remaining: 2
            }
        ));
    }

    #[test]
    fn rejects_negative_string_length() {
        let mut payload = Vec::new();
        varint::write(&mut payload, -3);
        let packet = build_packet(STATUS_RESPONSE_PACKET_ID, &payload);

        assert!(matches!(
            parse_status_response(&packet).unwrap_err(),
            ParseResponseError::TruncatedPayload { declared: -3, .. }
        ));
    }

    #[test]
    fn rejects_non_json_payload() {
        let packet = response_packet("<html>not json</html>");
        assert!(matches!(
            parse_status_response(&packet).unwrap_err(),
            ParseResponseError::MalformedPayload(_)
        ));
    }

    #[test]
    fn rejects_body_cut_inside_string_length() {
        let packet = Packet::from_bytes(vec![0x02, 0x00, 0x80]);
        assert!(matches!(
            parse_status_response(&packet).unwrap_err(),
            ParseResponseError::Decode(varint::VarIntError::Incomplete)
        ));
    }
}
