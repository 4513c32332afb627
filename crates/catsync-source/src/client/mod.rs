//! HTTP client for the source catalog's `generic_product` endpoints.

use std::time::Duration;

use reqwest::{Client, Url};
use serde::Deserialize;
use serde_json::Value;

use crate::error::SourceError;
use crate::types::GenericProduct;

/// Upper bound on pages a single fetch will walk, regardless of what the
/// server reports in `total_pages`.
pub const MAX_PAGES: u32 = 1_000;

/// Per-request timeout for single-product lookups.
const PRODUCT_TIMEOUT_SECS: u64 = 30;

/// One decoded listing page.
///
/// Items are kept as raw JSON so one malformed entry does not poison the
/// page; decode them with [`SourcePage::products`].
#[derive(Debug, Clone)]
pub struct SourcePage {
    pub page: u32,
    /// Server-reported page count; `1` when the field is absent.
    pub total_pages: u32,
    pub items: Vec<Value>,
}

impl SourcePage {
    /// Decode each item independently.
    pub fn products(&self) -> impl Iterator<Item = Result<GenericProduct, SourceError>> + '_ {
        self.items.iter().enumerate().map(move |(index, item)| {
            GenericProduct::deserialize(item).map_err(|e| SourceError::Deserialize {
                context: format!("item {index} of page {}", self.page),
                source: e,
            })
        })
    }
}

/// HTTP client for the source catalog.
///
/// Non-2xx responses map to typed errors and payloads are validated for the
/// expected top-level keys. Nothing is retried.
pub struct SourceClient {
    client: Client,
    base_url: String,
    product_timeout: Duration,
}

impl SourceClient {
    /// Creates a `SourceClient` for `base_url` with the listing timeout and
    /// `User-Agent` applied to every request.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError::InvalidBaseUrl`] if `base_url` does not parse,
    /// or [`SourceError::Http`] if the underlying `reqwest::Client` cannot be
    /// constructed.
    pub fn new(base_url: &str, timeout_secs: u64, user_agent: &str) -> Result<Self, SourceError> {
        Url::parse(base_url).map_err(|e| SourceError::InvalidBaseUrl {
            url: base_url.to_owned(),
            reason: e.to_string(),
        })?;

        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(user_agent)
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_owned(),
            product_timeout: Duration::from_secs(PRODUCT_TIMEOUT_SECS.min(timeout_secs.max(1))),
        })
    }

    /// Fetches one listing page.
    ///
    /// # Errors
    ///
    /// - [`SourceError::NotFound`]: HTTP 404.
    /// - [`SourceError::UnexpectedStatus`]: any other non-2xx status.
    /// - [`SourceError::Http`]: network, TLS, or timeout failure.
    /// - [`SourceError::Deserialize`]: body is not JSON.
    /// - [`SourceError::InvalidPayload`]: `generic_products` missing or not an array.
    pub async fn fetch_page(&self, page: u32, limit: u32) -> Result<SourcePage, SourceError> {
        let url = self.page_url(page, limit)?;
        let body = self.get_json(&url, None).await?;
        parse_page(page, &url, body)
    }

    /// Fetches a single product by external id.
    ///
    /// # Errors
    ///
    /// As [`Self::fetch_page`], with [`SourceError::InvalidPayload`] when the
    /// `generic_product` key is missing.
    pub async fn fetch_product(&self, external_id: &str) -> Result<GenericProduct, SourceError> {
        let url = self.product_url(external_id)?;
        let mut body = self.get_json(&url, Some(self.product_timeout)).await?;

        let item = body
            .get_mut("generic_product")
            .filter(|v| v.is_object())
            .map(Value::take)
            .ok_or_else(|| SourceError::InvalidPayload {
                url: url.clone(),
                reason: "missing generic_product object".to_string(),
            })?;

        serde_json::from_value(item).map_err(|e| SourceError::Deserialize {
            context: format!("product {external_id}"),
            source: e,
        })
    }

    async fn get_json(&self, url: &str, timeout: Option<Duration>) -> Result<Value, SourceError> {
        let mut request = self
            .client
            .get(url)
            .header(reqwest::header::ACCEPT, "application/json");
        if let Some(timeout) = timeout {
            request = request.timeout(timeout);
        }

        let response = request.send().await?;
        let status = response.status();

        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(SourceError::NotFound {
                url: url.to_owned(),
            });
        }

        if !status.is_success() {
            return Err(SourceError::UnexpectedStatus {
                status: status.as_u16(),
                url: url.to_owned(),
            });
        }

        let body = response.text().await?;
        serde_json::from_str::<Value>(&body).map_err(|e| SourceError::Deserialize {
            context: format!("response from {url}"),
            source: e,
        })
    }

    /// Builds the listing URL, e.g. `{base}?page=2&limit=50`.
    fn page_url(&self, page: u32, limit: u32) -> Result<String, SourceError> {
        let mut url = self.parsed_base()?;
        url.query_pairs_mut()
            .append_pair("page", &page.to_string())
            .append_pair("limit", &limit.to_string());
        Ok(url.to_string())
    }

    /// Builds the single-product URL, e.g. `{base}/ZC-100`. The id is
    /// percent-encoded as one path segment.
    fn product_url(&self, external_id: &str) -> Result<String, SourceError> {
        let mut url = self.parsed_base()?;
        url.path_segments_mut()
            .map_err(|()| SourceError::InvalidBaseUrl {
                url: self.base_url.clone(),
                reason: "URL cannot be a base".to_string(),
            })?
            .pop_if_empty()
            .push(external_id);
        Ok(url.to_string())
    }

    fn parsed_base(&self) -> Result<Url, SourceError> {
        Url::parse(&self.base_url).map_err(|e| SourceError::InvalidBaseUrl {
            url: self.base_url.clone(),
            reason: e.to_string(),
        })
    }
}

/// Validates a listing payload and extracts its items and page count.
fn parse_page(page: u32, url: &str, mut body: Value) -> Result<SourcePage, SourceError> {
    let items = match body.get_mut("generic_products").map(Value::take) {
        Some(Value::Array(items)) => items,
        Some(_) => {
            return Err(SourceError::InvalidPayload {
                url: url.to_owned(),
                reason: "generic_products is not an array".to_string(),
            })
        }
        None => {
            return Err(SourceError::InvalidPayload {
                url: url.to_owned(),
                reason: "missing generic_products".to_string(),
            })
        }
    };

    let total_pages = body
        .get("total_pages")
        .and_then(catsync_core::de::value_as_i64)
        .and_then(|n| u32::try_from(n).ok())
        .filter(|n| *n > 0)
        .unwrap_or(1);

    Ok(SourcePage {
        page,
        total_pages,
        items,
    })
}

#[cfg(test)]
#[path = "../client_test.rs"]
mod tests;
