use reqwest::Client;
use serde::Deserialize;
use url::Url;

use crate::error::TransportError;

/// Public echo service returning the caller's address as `{"ip": "..."}`.
pub const DEFAULT_LOOKUP_URL: &str = "https://api.ipify.org?format=json";

#[derive(Debug, Deserialize)]
struct LookupResponse {
    ip: String,
}

/// Resolves the network-derived client address.
///
/// This client applies no deadline of its own; the context builder bounds it.
#[derive(Debug, Clone)]
pub struct AddressLookupClient {
    http: Client,
    url: Url,
}

impl AddressLookupClient {
    pub fn new(url: &str) -> Result<Self, TransportError> {
        let url = Url::parse(url.trim())
            .map_err(|source| TransportError::invalid_base_url(url, source))?;
        let http = Client::builder().build()?;
        Ok(Self { http, url })
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    pub async fn lookup(&self) -> Result<String, TransportError> {
        let response = self.http.get(self.url.clone()).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(TransportError::Status(status));
        }

        let body = response.text().await?;
        let parsed: LookupResponse = serde_json::from_str(&body).map_err(TransportError::Decode)?;
        let ip = parsed.ip.trim();
        if ip.is_empty() {
            return Err(TransportError::MissingData);
        }
        Ok(ip.to_string())
    }
}
