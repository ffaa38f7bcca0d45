use std::env;
use std::path::PathBuf;
use std::time::Duration;

use crate::models::layout::{Layout, ListingFormat};
use crate::probe::DEFAULT_CONCURRENCY;

pub const DEFAULT_PROTOCOL: &str = "RoRnet_2.37";
const MASTER_BASE_URL: &str = "http://api.rigsofrods.com/serverlist/?version=";

#[derive(Debug, Clone)]
pub struct Config {
    // Master server
    pub protocol_version: String,
    pub master_url: String,
    pub fetch_timeout_secs: u64,
    pub format: ListingFormat,

    // Latency probing
    pub measure_latency: bool,
    pub probe_concurrency: usize,
    pub probe_timeout_ms: u64,
    pub default_port: u16,

    // Annotations
    pub geo_ranges_path: Option<PathBuf>,
    pub flag_dir: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            protocol_version: DEFAULT_PROTOCOL.to_string(),
            master_url: master_url_for(DEFAULT_PROTOCOL),
            fetch_timeout_secs: 15,
            format: ListingFormat::default(),
            measure_latency: true,
            probe_concurrency: DEFAULT_CONCURRENCY,
            probe_timeout_ms: 2000,
            default_port: 12000,
            geo_ranges_path: None,
            flag_dir: PathBuf::from("icons/flags"),
        }
    }
}

pub fn master_url_for(protocol_version: &str) -> String {
    format!("{}{}", MASTER_BASE_URL, protocol_version)
}

impl Config {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub(crate) fn from_lookup(var: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();

        let protocol_version = var("ROR_NET").unwrap_or(defaults.protocol_version);
        let master_url = var("MASTER_URL").unwrap_or_else(|| master_url_for(&protocol_version));

        let layout = |key: &str, default: Layout| {
            var(key)
                .and_then(|v| v.parse().ok())
                .and_then(Layout::from_width)
                .unwrap_or(default)
        };

        Self {
            fetch_timeout_secs: var("FETCH_TIMEOUT_SECS")
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.fetch_timeout_secs),

            format: ListingFormat {
                primary: layout("PRIMARY_LAYOUT", defaults.format.primary),
                secondary: layout("SECONDARY_LAYOUT", defaults.format.secondary),
            },

            measure_latency: var("PING_ENABLED")
                .and_then(|v| parse_bool(&v))
                .unwrap_or(defaults.measure_latency),

            probe_concurrency: var("PROBE_CONCURRENCY")
                .and_then(|v| v.parse().ok())
                .filter(|n| *n > 0)
                .unwrap_or(defaults.probe_concurrency),

            probe_timeout_ms: var("PROBE_TIMEOUT_MS")
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.probe_timeout_ms),

            default_port: var("DEFAULT_SERVER_PORT")
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.default_port),

            geo_ranges_path: var("GEOIP_RANGES").map(PathBuf::from),

            flag_dir: var("FLAG_ICON_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.flag_dir),

            protocol_version,
            master_url,
        }
    }

    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.fetch_timeout_secs)
    }

    pub fn probe_timeout(&self) -> Duration {
        Duration::from_millis(self.probe_timeout_ms)
    }
}

fn parse_bool(v: &str) -> Option<bool> {
    match v.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
