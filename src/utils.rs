// src/utils.rs
use std::fmt;
use std::net::IpAddr;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListingError {
    Transport(String),
    Status(u16),
    Layout { tokens: usize, width: usize },
    FieldType { field: &'static str, value: String },
}

impl fmt::Display for ListingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Transport(e) => write!(f, "Failed to fetch server list: {}", e),
            Self::Status(code) => write!(f, "Master server answered with status {}", code),
            Self::Layout { tokens, width } => write!(
                f,
                "Server list has {} cells, not a multiple of the {} column layout",
                tokens, width
            ),
            Self::FieldType { field, value } => {
                write!(f, "Invalid {} field in server list: {:?}", field, value)
            }
        }
    }
}

impl std::error::Error for ListingError {}

impl From<reqwest::Error> for ListingError {
    fn from(e: reqwest::Error) -> Self {
        match e.status() {
            Some(status) => Self::Status(status.as_u16()),
            None => Self::Transport(e.to_string()),
        }
    }
}

/// Bare host of a `host:port` address. Bracketed IPv6 literals lose their brackets.
pub fn strip_port(addr: &str) -> &str {
    if let Some(rest) = addr.strip_prefix('[') {
        if let Some(end) = rest.find(']') {
            return &rest[..end];
        }
    }
    // An unbracketed IPv6 literal has no port to strip.
    if addr.parse::<IpAddr>().is_ok() {
        return addr;
    }
    match addr.rsplit_once(':') {
        Some((host, _)) => host,
        None => addr,
    }
}

pub fn port_of(addr: &str) -> Option<u16> {
    if addr.parse::<IpAddr>().is_ok() {
        return None;
    }
    addr.rsplit_once(':').and_then(|(_, port)| port.parse().ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_port_from_hosts() {
        assert_eq!(strip_port("1.2.3.4:12000"), "1.2.3.4");
        assert_eq!(strip_port("ror.example.org:12001"), "ror.example.org");
        assert_eq!(strip_port("ror.example.org"), "ror.example.org");
        assert_eq!(strip_port("[::1]:12000"), "::1");
        assert_eq!(strip_port("::1"), "::1");
    }

    #[test]
    fn reads_port() {
        assert_eq!(port_of("1.2.3.4:12000"), Some(12000));
        assert_eq!(port_of("[::1]:12001"), Some(12001));
        assert_eq!(port_of("1.2.3.4"), None);
        assert_eq!(port_of("host:abc"), None);
    }

    #[test]
    fn layout_error_message_names_width() {
        let e = ListingError::Layout { tokens: 7, width: 5 };
        assert_eq!(
            e.to_string(),
            "Server list has 7 cells, not a multiple of the 5 column layout"
        );
    }
}
