// src/refresh.rs
use log::info;

use crate::config::Config;
use crate::geo::{annotate, CountryLookup};
use crate::listing::fetch::ListingClient;
use crate::listing::parse_listing;
use crate::models::server::ServerRecord;
use crate::probe::{append_latency, LatencyProber, Probe};
use crate::utils::ListingError;

/// Fetch, parse, probe and annotate the master listing once. The returned
/// set replaces whatever the caller showed before.
pub async fn refresh<P: Probe>(
    config: &Config,
    client: &ListingClient,
    prober: &LatencyProber<P>,
    geo: &dyn CountryLookup,
) -> Result<Vec<ServerRecord>, ListingError> {
    let raw = client.fetch().await?;
    let mut records = parse_listing(&raw, config.format)?;

    append_latency(&mut records, config.measure_latency, prober, config.default_port).await;
    annotate(&mut records, geo, &config.flag_dir);

    info!("Refreshed server list: {} servers", records.len());
    Ok(records)
}
