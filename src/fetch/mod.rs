//! HTTP access to the election backend.

mod basic;
mod client;
mod endpoint;

pub use basic::BasicClient;
pub use client::HttpClient;
pub use endpoint::Endpoint;

use anyhow::{Context, Result, anyhow};
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use crate::model::{Year, YearList};
use crate::parser::parse_json;

/// GETs `endpoint` under `base_url` and returns the raw body.
///
/// # Errors
///
/// Fails when the request cannot be sent or the backend answers with a non-2xx
/// status; the error carries the status and the response body.
#[tracing::instrument(skip(client, endpoint), fields(endpoint = %endpoint))]
pub async fn fetch_bytes<C: HttpClient>(
    client: &C,
    base_url: &str,
    endpoint: &Endpoint,
) -> Result<Vec<u8>> {
    let url = endpoint.url(base_url)?;
    let req = reqwest::Request::new(reqwest::Method::GET, url.clone());

    let resp = client
        .execute(req)
        .await
        .with_context(|| format!("Request to {url} failed"))?;

    if !resp.status().is_success() {
        let status = resp.status();
        let body = resp.text().await.unwrap_or_default();
        warn!(%status, "Backend returned an error status");
        return Err(anyhow!("API returned status {}: {}", status, body));
    }

    let bytes = resp.bytes().await?;
    debug!(bytes = bytes.len(), "Response received");
    Ok(bytes.to_vec())
}

/// GETs `endpoint` and decodes the body as `T`.
pub async fn fetch_json<T, C>(client: &C, base_url: &str, endpoint: &Endpoint) -> Result<T>
where
    T: DeserializeOwned,
    C: HttpClient,
{
    let bytes = fetch_bytes(client, base_url, endpoint).await?;
    parse_json(&bytes).with_context(|| format!("Unexpected response from {endpoint}"))
}

/// The most recent election year the backend knows about, if any.
pub async fn latest_year<C: HttpClient>(client: &C, base_url: &str) -> Result<Option<Year>> {
    let years: YearList = fetch_json(client, base_url, &Endpoint::years()).await?;
    Ok(years.0.into_iter().max())
}
