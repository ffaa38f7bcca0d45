// src/models/server.rs
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Reported latency for a server that was not measured.
pub const LATENCY_SENTINEL: u32 = 9999;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", content = "value", rename_all = "snake_case")]
pub enum Latency {
    Sentinel,
    Measured(u32),
    Unreachable(String),
}

impl Latency {
    /// Milliseconds for display. Anything without a measurement shows the sentinel.
    pub fn millis(&self) -> u32 {
        match self {
            Self::Measured(ms) => *ms,
            Self::Sentinel | Self::Unreachable(_) => LATENCY_SENTINEL,
        }
    }

    pub fn is_unreachable(&self) -> bool {
        matches!(self, Self::Unreachable(_))
    }
}

impl Default for Latency {
    fn default() -> Self {
        Self::Sentinel
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServerRecord {
    pub players_current: u32,
    pub players_max: u32,
    pub password_protected: bool,
    pub host: String,
    pub name: String,
    pub terrain: String,
    pub latency: Latency,
    pub lock_icon: Option<String>,
    pub country_code: Option<String>,
    pub flag_image: Option<PathBuf>,
    pub player_summary: String,
}

impl ServerRecord {
    pub fn new(
        players_current: u32,
        players_max: u32,
        password_protected: bool,
        host: String,
        name: String,
        terrain: String,
    ) -> Self {
        Self {
            players_current,
            players_max,
            password_protected,
            host,
            name,
            terrain,
            latency: Latency::Sentinel,
            lock_icon: None,
            country_code: None,
            flag_image: None,
            player_summary: String::new(),
        }
    }

    pub fn hostname(&self) -> &str {
        crate::utils::strip_port(&self.host)
    }
}
