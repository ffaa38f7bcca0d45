// src/main.rs
use env_logger::Env;
use log::{error, info};
use ror_serverlist::{geo, refresh, Config, LatencyProber, ListingClient, TcpProbe};
use std::process::ExitCode;

#[tokio::main]
async fn main() -> ExitCode {
    dotenv::dotenv().ok();
    env_logger::init_from_env(Env::default().default_filter_or("info"));

    let config = Config::from_env();
    info!("Using master server {}", config.master_url);

    let client = match ListingClient::new(config.master_url.clone(), config.fetch_timeout()) {
        Ok(client) => client,
        Err(e) => {
            error!("Failed to build HTTP client: {}", e);
            return ExitCode::FAILURE;
        }
    };
    let prober = LatencyProber::new(TcpProbe::new(config.probe_timeout()), config.probe_concurrency);
    let countries = geo::lookup_from_path(config.geo_ranges_path.as_deref()).await;

    let records = match refresh(&config, &client, &prober, countries.as_ref()).await {
        Ok(records) => records,
        Err(e) => {
            error!("{}", e);
            return ExitCode::FAILURE;
        }
    };

    match serde_json::to_string_pretty(&records) {
        Ok(json) => {
            println!("{}", json);
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("Failed to serialize server list: {}", e);
            ExitCode::FAILURE
        }
    }
}
