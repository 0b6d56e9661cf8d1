// Talks to the inventory search API: one GET per search, then normalize and sort

use anyhow::{Context, Result};
use reqwest::{Client, StatusCode};
use serde_json::Value;
use tracing::instrument;

use crate::config::{SearchConfig, Settings};
use crate::error::SearchError;
use crate::models::{RawListingRecord, SearchCriteria, VehicleListing};
use crate::normalize::{IdGenerator, RandomIdGenerator, normalize_all};
use crate::query::{build_query, redacted, search_url};
use crate::sort::sort_listings;

pub const FALLBACK_ERROR_MESSAGE: &str = "Unable to fetch listings. Please try again.";

// Shared HTTP client, built once at startup and cloned into each search
pub fn build_http_client(settings: &Settings) -> Result<Client> {
    let mut builder = Client::builder().user_agent(concat!(
        env!("CARGO_PKG_NAME"),
        "/",
        env!("CARGO_PKG_VERSION")
    ));

    if let Some(proxy_url) = settings.proxy_url.as_deref().filter(|p| !p.trim().is_empty()) {
        let proxy = reqwest::Proxy::all(proxy_url).context("Invalid proxy_url setting")?;
        builder = builder.proxy(proxy);
        tracing::info!("Inventory requests will go through the configured proxy.");
    }

    builder.build().context("Failed to build reqwest client")
}

/// Outcome of a successful search. An empty `listings` is still a success.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchResults {
    pub listings: Vec<VehicleListing>,
    pub total_found: Option<u64>,
}

/// The decoded `listings` page of a successful response.
#[derive(Debug, Default)]
pub struct InventoryPage {
    pub records: Vec<RawListingRecord>,
    pub total_found: Option<u64>,
}

/// Do not wrap `InventoryClient` in an `Arc` just for the HTTP client:
/// [`reqwest::Client`] is already reference counted internally.
#[derive(Clone)]
pub struct InventoryClient<G = RandomIdGenerator> {
    http: Client,
    config: SearchConfig,
    ids: G,
}

impl InventoryClient {
    pub fn new(http: Client, config: SearchConfig) -> Self {
        Self {
            http,
            config,
            ids: RandomIdGenerator,
        }
    }
}

impl<G: IdGenerator> InventoryClient<G> {
    pub fn with_id_generator<H: IdGenerator>(self, ids: H) -> InventoryClient<H> {
        InventoryClient {
            http: self.http,
            config: self.config,
            ids,
        }
    }

    pub fn config(&self) -> &SearchConfig {
        &self.config
    }

    #[instrument(skip_all, fields(city = %criteria.location.city, sort = %criteria.sort))]
    pub async fn search(&self, criteria: &SearchCriteria) -> Result<SearchResults, SearchError> {
        let params = build_query(criteria, &self.config);
        let url = search_url(&self.config);
        tracing::debug!(url = %url, params = ?redacted(&params), "Requesting inventory search");

        // reqwest errors carry the request URL, which includes the api key
        let response = self
            .http
            .get(&url)
            .query(&params)
            .send()
            .await
            .map_err(|e| SearchError::Transport(e.without_url()))?;

        let status = response.status();
        if !status.is_success() {
            // An unreadable error body still reports the status
            let body = response.text().await.unwrap_or_default();
            let message = error_message(status, &body);
            tracing::warn!(
                status = %status,
                message = %message,
                "Inventory search returned an error status"
            );
            return Err(SearchError::Http {
                status: status.as_u16(),
                message,
            });
        }

        let body = response
            .text()
            .await
            .map_err(|e| SearchError::Transport(e.without_url()))?;

        let page = parse_page(&body);
        let listings = sort_listings(&normalize_all(&page.records, &self.ids), criteria.sort);
        tracing::info!(
            count = listings.len(),
            total_found = ?page.total_found,
            "Inventory search complete"
        );

        Ok(SearchResults {
            listings,
            total_found: page.total_found,
        })
    }
}

/// Best message for a failed response: upstream `message`, then the status
/// text, then a generic fallback.
pub fn error_message(status: StatusCode, body: &str) -> String {
    serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|json| {
            json.get("message")
                .and_then(Value::as_str)
                .map(str::trim)
                .filter(|m| !m.is_empty())
                .map(str::to_string)
        })
        .or_else(|| status.canonical_reason().map(str::to_string))
        .unwrap_or_else(|| FALLBACK_ERROR_MESSAGE.to_string())
}

/// Decodes a successful response body.
///
/// An unparseable body or a missing / non-array `listings` reads as zero
/// results rather than an error.
pub fn parse_page(body: &str) -> InventoryPage {
    let json: Value = match serde_json::from_str(body) {
        Ok(json) => json,
        Err(e) => {
            tracing::warn!(error = %e, "Inventory response is not JSON, treating as no results");
            return InventoryPage::default();
        }
    };

    let total_found = json.get("num_found").and_then(Value::as_u64);
    let records = match json.get("listings") {
        Some(Value::Array(items)) => items
            .iter()
            .cloned()
            .map(RawListingRecord::from_json)
            .collect(),
        Some(other) => {
            tracing::warn!(
                kind = json_kind(other),
                "Unexpected 'listings' type, treating as no results"
            );
            Vec::new()
        }
        None => Vec::new(),
    };

    InventoryPage {
        records,
        total_found,
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_message_prefers_upstream_message() {
        let body = r#"{"code": 401, "message": "Invalid API key"}"#;
        assert_eq!(error_message(StatusCode::UNAUTHORIZED, body), "Invalid API key");
    }

    #[test]
    fn error_message_falls_back_to_status_text() {
        assert_eq!(
            error_message(StatusCode::SERVICE_UNAVAILABLE, "<html>down</html>"),
            "Service Unavailable"
        );
        assert_eq!(
            error_message(StatusCode::TOO_MANY_REQUESTS, r#"{"message": "  "}"#),
            "Too Many Requests"
        );
        assert_eq!(
            error_message(StatusCode::NOT_FOUND, r#"{"message": 404}"#),
            "Not Found"
        );
    }

    #[test]
    fn error_message_generic_fallback() {
        let status = StatusCode::from_u16(599).unwrap();
        assert_eq!(error_message(status, ""), FALLBACK_ERROR_MESSAGE);
    }

    #[test]
    fn page_without_listings_is_empty() {
        assert!(parse_page(r#"{"num_found": 0}"#).records.is_empty());
        assert!(parse_page(r#"{"listings": {"id": "x"}}"#).records.is_empty());
        assert!(parse_page(r#"{"listings": null}"#).records.is_empty());
        assert!(parse_page("not json").records.is_empty());
    }

    #[test]
    fn page_keeps_every_record() {
        let page = parse_page(r#"{"num_found": 812, "listings": [{"id": "a"}, 17, {"vin": "V"}]}"#);
        assert_eq!(page.total_found, Some(812));
        assert_eq!(page.records.len(), 3);
        assert_eq!(page.records[0].id.as_deref(), Some("a"));
        assert_eq!(page.records[1], RawListingRecord::default());
        assert_eq!(page.records[2].vin.as_deref(), Some("V"));
    }
}
