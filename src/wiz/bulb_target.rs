use std::fmt::{Display, Formatter};

/// Address of a bulb, the host is either an IP literal or a resolvable name.
#[derive(Clone, Debug, PartialEq)]
pub struct BulbTarget {
    host: String,
    port: u16,
}

impl BulbTarget {
    pub const DEFAULT_PORT: u16 = 38899;

    pub fn new(host: impl Into<String>) -> Self {
        BulbTarget {
            host: host.into(),
            port: Self::DEFAULT_PORT,
        }
    }

    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub(super) fn socket_addr(&self) -> (&str, u16) {
        (&self.host, self.port)
    }
}

impl Display for BulbTarget {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.host, self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uses_the_protocol_port_by_default() {
        let target = BulbTarget::new("192.168.0.107");

        assert_eq!(target.port(), 38899);
        assert_eq!(target.to_string(), "192.168.0.107:38899");
    }

    #[test]
    fn port_can_be_overridden() {
        let target = BulbTarget::new("bulb.local").with_port(4000);

        assert_eq!(target.host(), "bulb.local");
        assert_eq!(target.socket_addr(), ("bulb.local", 4000));
    }
}
