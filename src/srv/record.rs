/// DNS record type number for SRV.
pub const SRV_RECORD_TYPE: u16 = 33;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SrvRecord {
    pub priority: u16,
    pub weight: u16,
    pub port: u16,
    pub target: String,
}

impl SrvRecord {
    /// Parses the presentation form `"<priority> <weight> <port> <target>."`.
    /// A negative weight counts as 0; anything else out of range, a port of 0
    /// or a missing target rejects the record.
    pub fn parse(data: &str) -> Option<Self> {
        let mut fields = data.split_whitespace();

        let priority = fields.next()?.parse::<u16>().ok()?;
        let weight = fields.next()?.parse::<i64>().ok()?.max(0);
        let weight = u16::try_from(weight).ok()?;
        let port = fields.next()?.parse::<u16>().ok().filter(|port| *port != 0)?;

        let target = fields.next()?;
        let target = target.strip_suffix('.').unwrap_or(target);
        if target.is_empty() {
            return None;
        }

        Some(Self {
            priority,
            weight,
            port,
            target: target.to_string(),
        })
    }
}
