// src/lib.rs
pub mod config;
pub mod geo;
pub mod listing;
pub mod models;
pub mod probe;
pub mod refresh;
pub mod utils;

pub use config::Config;
pub use listing::fetch::ListingClient;
pub use listing::parse_listing;
pub use models::layout::{Layout, ListingFormat};
pub use models::server::{Latency, ServerRecord, LATENCY_SENTINEL};
pub use probe::{LatencyProber, Probe, TcpProbe};
pub use refresh::refresh;
pub use utils::ListingError;
