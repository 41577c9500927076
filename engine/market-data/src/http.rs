//! Shared HTTP plumbing for the provider clients

use crate::config::MarketDataConfig;
use crate::error::{MarketDataError, Result};
use reqwest::Client;
use serde_json::Value;
use tracing::debug;
use url::Url;

/// Build the HTTP client used by every provider
pub fn build_client(config: &MarketDataConfig) -> Result<Client> {
    Client::builder()
        .timeout(config.request_timeout())
        .user_agent(concat!("coin-desk/", env!("CARGO_PKG_VERSION")))
        .build()
        .map_err(MarketDataError::from)
}

/// Join path segments onto a base URL, percent-encoding each segment
pub fn endpoint(base: &str, segments: &[&str]) -> Result<Url> {
    let mut url = Url::parse(base)?;
    url.path_segments_mut()
        .map_err(|_| MarketDataError::config(format!("{base} cannot be used as a base URL")))?
        .pop_if_empty()
        .extend(segments);
    Ok(url)
}

/// GET a JSON document, turning non-success statuses into errors
pub async fn get_json(client: &Client, url: Url, query: &[(&str, String)]) -> Result<Value> {
    let endpoint = url.path().to_string();
    debug!("GET {}", url);

    let response = client.get(url).query(query).send().await?;

    if !response.status().is_success() {
        return Err(MarketDataError::Status { endpoint, status: response.status().as_u16() });
    }

    Ok(response.json::<Value>().await?)
}
