//! Rate provider abstractions.

use anyhow::Result;
use async_trait::async_trait;

use crate::core::rate::RawRate;

/// Provider page a monitor is scraped from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MonitorPage {
    Bcv,
    CriptoDolar,
}

impl MonitorPage {
    pub fn as_str(&self) -> &'static str {
        match self {
            MonitorPage::Bcv => "bcv",
            MonitorPage::CriptoDolar => "criptodolar",
        }
    }
}

/// One configured data source + currency query against the provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MonitorQuery {
    /// Label the result is reported under in the response envelope.
    pub label: &'static str,
    pub page: MonitorPage,
    /// ISO currency code the provider is queried for.
    pub currency: &'static str,
    /// Key the provider files the result under. Has changed across provider
    /// versions, which is why normalization stays shape-tolerant.
    pub monitor: &'static str,
}

/// The three production queries, fetched in response order.
pub const RATE_QUERIES: [MonitorQuery; 3] = [
    MonitorQuery {
        label: "BCV",
        page: MonitorPage::Bcv,
        currency: "USD",
        monitor: "bcv",
    },
    MonitorQuery {
        label: "EURO",
        page: MonitorPage::Bcv,
        currency: "EUR",
        monitor: "bcv",
    },
    MonitorQuery {
        label: "USDT",
        page: MonitorPage::CriptoDolar,
        currency: "USD",
        monitor: "binance",
    },
];

#[async_trait]
pub trait RateProvider: Send + Sync {
    /// Fetch the raw monitor data for one query. The returned value is
    /// normalized by the caller; providers only move bytes.
    async fn fetch_monitors(&self, query: &MonitorQuery) -> Result<RawRate>;
}
