//! A client of the deals service.

use std::sync::Arc;
use std::time::Duration;

use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::catalog::{
    CatalogError, check_status, decode_records, lenient_text,
};

/// How many deals one search asks for by default.
pub const DEFAULT_DEALS_LIMIT: u32 = 100;

/// Settings of the deals service.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DealsConfig {
    /// The deals endpoint.
    pub url: String,
    /// How many deals to ask for.
    pub limit: u32,
    /// The timeout of every request.
    pub timeout: Duration,
}

/// A deal, reduced to the fields that may be shown to the user.
///
/// Discounted prices and discount percentages are dropped while decoding,
/// they never reach the model or the user.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Deal {
    /// The category, like "club" or "cafe".
    #[serde(default, deserialize_with = "lenient_text")]
    pub category_name: Option<String>,
    /// The venue name.
    #[serde(default, deserialize_with = "lenient_text")]
    pub name: Option<String>,
    /// The venue address.
    #[serde(default, deserialize_with = "lenient_text")]
    pub address: Option<String>,
    /// The city.
    #[serde(default, deserialize_with = "lenient_text")]
    pub city: Option<String>,
    /// The current price.
    #[serde(default)]
    pub price: Option<Value>,
    /// How many persons the deal is for.
    #[serde(default)]
    pub person: Option<Value>,
}

#[derive(Deserialize)]
struct DealsPage {
    #[serde(default)]
    data: Vec<Value>,
}

/// Deals client.
#[derive(Clone, Debug)]
pub struct DealsClient {
    client: Client,
    config: Arc<DealsConfig>,
}

impl DealsClient {
    /// Creates a new client with the given configuration.
    #[inline]
    pub fn new(config: DealsConfig) -> Self {
        Self {
            client: Client::new(),
            config: Arc::new(config),
        }
    }

    /// Searches deals. Any failure yields no deals.
    pub async fn search(&self, search: &str) -> Vec<Deal> {
        match self.fetch(search).await {
            Ok(deals) => {
                debug!("found {} deals for {search:?}", deals.len());
                deals
            }
            Err(err) => {
                warn!("deal search failed: {err}");
                vec![]
            }
        }
    }

    async fn fetch(&self, search: &str) -> Result<Vec<Deal>, CatalogError> {
        let resp = self
            .client
            .get(&self.config.url)
            .query(&[("search", search)])
            .query(&[("limit", self.config.limit)])
            .timeout(self.config.timeout)
            .send()
            .await?;
        let page: DealsPage = check_status(resp)?.json().await?;
        Ok(decode_records(page.data).collect())
    }
}
