//! Assembles the three bolivar rates into one response envelope.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::core::provider::{MonitorQuery, RATE_QUERIES, RateProvider};

/// What a single failed fetch does to the request as a whole.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FailurePolicy {
    /// A failing currency degrades to `0.0` while the other two proceed.
    #[default]
    Isolated,
    /// The first failure aborts the whole request into an error envelope.
    Monolithic,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Success,
    Error,
}

/// Response envelope for `GET /rates`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum RatesResponse {
    Success {
        #[serde(rename = "BCV")]
        bcv: f64,
        #[serde(rename = "EURO")]
        euro: f64,
        #[serde(rename = "USDT")]
        usdt: f64,
        status: Status,
        /// Labels whose value was substituted with `0.0` after a failed
        /// fetch or normalization. Omitted when every fetch succeeded, so
        /// zero here is distinguishable from a genuinely zero market rate.
        #[serde(skip_serializing_if = "Vec::is_empty")]
        degraded: Vec<String>,
    },
    Error {
        error: String,
        status: Status,
    },
}

/// Runs the fixed monitor queries against a provider and reshapes the
/// results. Stateless: every call performs fresh fetches.
pub struct RateAggregator {
    provider: Arc<dyn RateProvider>,
    policy: FailurePolicy,
}

impl RateAggregator {
    pub fn new(provider: Arc<dyn RateProvider>, policy: FailurePolicy) -> Self {
        RateAggregator { provider, policy }
    }

    /// Fetch and normalize all three rates sequentially. Never fails:
    /// provider and normalization errors are folded into the envelope
    /// according to the configured [`FailurePolicy`].
    pub async fn collect(&self) -> RatesResponse {
        let mut rates = [0.0_f64; 3];
        let mut degraded = Vec::new();

        for (slot, query) in rates.iter_mut().zip(RATE_QUERIES.iter()) {
            match self.fetch_one(query).await {
                Ok(price) => *slot = price,
                Err(err) => {
                    warn!(label = query.label, error = %err, "rate fetch failed");
                    if self.policy == FailurePolicy::Monolithic {
                        return RatesResponse::Error {
                            error: err.to_string(),
                            status: Status::Error,
                        };
                    }
                    degraded.push(query.label.to_string());
                }
            }
        }

        let [bcv, euro, usdt] = rates;
        RatesResponse::Success {
            bcv,
            euro,
            usdt,
            status: Status::Success,
            degraded,
        }
    }

    async fn fetch_one(&self, query: &MonitorQuery) -> anyhow::Result<f64> {
        let raw = self.provider.fetch_monitors(query).await?;
        // The monitor key resolves the query's entry out of the provider's
        // map; a bare record or value normalizes as-is.
        let value = raw.lookup(query.monitor).unwrap_or(&raw);
        Ok(value.normalize()?)
    }
}
