use anyhow::{Context, Result, anyhow};
use async_trait::async_trait;
use tracing::{debug, instrument};

use crate::core::provider::{MonitorQuery, RateProvider};
use crate::core::rate::RawRate;

pub const DEFAULT_BASE_URL: &str = "https://pydolarve.org";

// PyDolarProvider implementation for RateProvider
pub struct PyDolarProvider {
    base_url: String,
}

impl PyDolarProvider {
    pub fn new(base_url: &str) -> Self {
        PyDolarProvider {
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    /// The API splits currencies across endpoints rather than query
    /// parameters: `/api/v1/dollar` and `/api/v1/euro`.
    fn endpoint(query: &MonitorQuery) -> &'static str {
        match query.currency {
            "EUR" => "euro",
            _ => "dollar",
        }
    }
}

#[async_trait]
impl RateProvider for PyDolarProvider {
    #[instrument(
        name = "PyDolarFetch",
        skip(self),
        fields(label = %query.label, page = %query.page.as_str())
    )]
    async fn fetch_monitors(&self, query: &MonitorQuery) -> Result<RawRate> {
        let url = format!(
            "{}/api/v1/{}?page={}",
            self.base_url,
            Self::endpoint(query),
            query.page.as_str()
        );
        debug!("Requesting monitor data from {}", url);

        let client = reqwest::Client::builder()
            .user_agent(concat!("vdolar/", env!("CARGO_PKG_VERSION")))
            .build()?;
        let response = client
            .get(&url)
            .send()
            .await
            .map_err(|e| anyhow!("Request error: {} for monitor: {} URL: {}", e, query.label, url))?;

        if !response.status().is_success() {
            return Err(anyhow!(
                "HTTP error: {} for monitor: {}",
                response.status(),
                query.label
            ));
        }

        let text = response.text().await?;
        if text.trim().is_empty() {
            return Err(anyhow!(
                "Received empty response for monitor: {}",
                query.label
            ));
        }

        // Any well-formed JSON decodes; the shape is the normalizer's
        // problem, not the transport's.
        let raw: RawRate = serde_json::from_str(&text).with_context(|| {
            format!("Failed to parse provider response for monitor: {}", query.label)
        })?;
        Ok(raw)
    }
}
