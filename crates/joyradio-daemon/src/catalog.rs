//! Station catalog loader.
//!
//! The catalog is a JSON array of `{name, url}` objects served over HTTP(S).
//! It is fetched once at startup; any failure is fatal for the daemon.
use std::time::Duration;

use joyradio_proto::config::CatalogConfig;
use joyradio_proto::protocol::Station;
use reqwest::Client;
use thiserror::Error;
use tracing::{info, warn};

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("failed to fetch station catalog: {0}")]
    Fetch(#[from] reqwest::Error),
    #[error("station catalog request returned status {0}")]
    Status(reqwest::StatusCode),
    #[error("malformed station catalog: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("station catalog is empty")]
    Empty,
}

pub fn parse_catalog(body: &str) -> Result<Vec<Station>, CatalogError> {
    let stations: Vec<Station> = serde_json::from_str(body)?;
    if stations.is_empty() {
        return Err(CatalogError::Empty);
    }
    Ok(stations)
}

pub async fn fetch_catalog(config: &CatalogConfig) -> Result<Vec<Station>, CatalogError> {
    if config.accept_invalid_certs {
        warn!(
            "TLS certificate verification is DISABLED for catalog fetch from {}",
            config.url
        );
    }

    let client = Client::builder()
        .timeout(Duration::from_secs(config.timeout_secs))
        .danger_accept_invalid_certs(config.accept_invalid_certs)
        .build()?;

    info!("Fetching station catalog from {}", config.url);
    let response = client.get(&config.url).send().await?;
    let status = response.status();
    if !status.is_success() {
        return Err(CatalogError::Status(status));
    }

    let body = response.text().await?;
    let stations = parse_catalog(&body)?;
    info!("Loaded {} stations", stations.len());
    Ok(stations)
}
