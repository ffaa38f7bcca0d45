// src/geo.rs
use ipnetwork::IpNetwork;
use log::{info, warn};
use std::fmt;
use std::net::IpAddr;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use crate::models::server::ServerRecord;

pub const LOCK_ICON: &str = "network-wireless-encrypted-symbolic";
const UNKNOWN_FLAG: &str = "unknown";

pub trait CountryLookup: Send + Sync {
    fn country_code(&self, host: &str) -> Option<String>;
}

/// Lookup used when no country table is configured.
pub struct NoCountry;

impl CountryLookup for NoCountry {
    fn country_code(&self, _host: &str) -> Option<String> {
        None
    }
}

#[derive(Debug)]
pub enum GeoError {
    Io(std::io::Error),
    Parse { line: usize, reason: String },
}

impl fmt::Display for GeoError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(e) => write!(f, "Failed to read country ranges: {}", e),
            Self::Parse { line, reason } => write!(f, "Invalid country range on line {}: {}", line, reason),
        }
    }
}

impl std::error::Error for GeoError {}

impl From<std::io::Error> for GeoError {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e)
    }
}

/// Address ranges mapped to ISO country codes.
#[derive(Debug, Default)]
pub struct CountryRanges {
    ranges: Vec<(IpNetwork, String)>,
}

impl CountryRanges {
    pub fn new() -> Self {
        Self { ranges: Vec::new() }
    }

    /// Parses `cidr,country` lines. Blank lines and `#` comments are skipped.
    pub fn parse(text: &str) -> Result<Self, GeoError> {
        let mut ranges = Vec::new();
        for (i, line) in text.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let (cidr, country) = line.split_once(',').ok_or_else(|| GeoError::Parse {
                line: i + 1,
                reason: "expected cidr,country".to_string(),
            })?;
            let network = IpNetwork::from_str(cidr.trim()).map_err(|e| GeoError::Parse {
                line: i + 1,
                reason: e.to_string(),
            })?;
            ranges.push((network, country.trim().to_ascii_uppercase()));
        }
        Ok(Self { ranges })
    }

    pub async fn load(path: &Path) -> Result<Self, GeoError> {
        let text = tokio::fs::read_to_string(path).await?;
        let ranges = Self::parse(&text)?;
        info!("Loaded {} country ranges from {}", ranges.len(), path.display());
        Ok(ranges)
    }

    pub fn len(&self) -> usize {
        self.ranges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ranges.is_empty()
    }

    pub fn lookup(&self, ip: IpAddr) -> Option<String> {
        self.ranges
            .iter()
            .find(|(network, _)| network.contains(ip))
            .map(|(_, country)| country.clone())
    }
}

impl CountryLookup for CountryRanges {
    fn country_code(&self, host: &str) -> Option<String> {
        // Host names would need a resolver round trip per row; only literals are mapped.
        host.parse::<IpAddr>().ok().and_then(|ip| self.lookup(ip))
    }
}

/// Fills in the display columns a server list view needs.
pub fn annotate(records: &mut [ServerRecord], lookup: &dyn CountryLookup, flag_dir: &Path) {
    for record in records.iter_mut() {
        record.lock_icon = record.password_protected.then(|| LOCK_ICON.to_string());
        record.country_code = lookup.country_code(record.hostname());
        record.flag_image = Some(flag_path(flag_dir, record.country_code.as_deref()));
        record.player_summary = format!("{}/{}", record.players_current, record.players_max);
    }
}

fn flag_path(flag_dir: &Path, country: Option<&str>) -> PathBuf {
    let name = country.unwrap_or(UNKNOWN_FLAG).to_ascii_lowercase();
    flag_dir.join(format!("{}.svg", name))
}

pub async fn lookup_from_path(path: Option<&Path>) -> Box<dyn CountryLookup> {
    match path {
        Some(path) => match CountryRanges::load(path).await {
            Ok(ranges) => Box::new(ranges),
            Err(e) => {
                warn!("{}. Disabling geolocation.", e);
                Box::new(NoCountry)
            }
        },
        None => Box::new(NoCountry),
    }
}
