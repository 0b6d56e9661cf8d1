//! Used-vehicle search near a chosen city.
//!
//! Criteria from the search form are turned into an inventory API query, the
//! response records are normalized into [`models::VehicleListing`] values, and
//! the results are re-sorted locally before display.

use axum::extract::FromRef;
use reqwest::Client;
use std::sync::Arc;

pub mod config;
pub mod criteria;
pub mod error;
pub mod export;
pub mod inventory_api;
pub mod models;
pub mod normalize;
pub mod query;
pub mod routes;
pub mod sort;

use crate::config::{SearchConfig, Settings};
use crate::error::SearchError;
use crate::inventory_api::{InventoryClient, SearchResults};
use crate::models::SearchCriteria;

// Shared by every handler; nothing here changes between searches
#[derive(Clone, FromRef)]
pub struct AppState {
    pub settings: Arc<Settings>,
    pub http_client: Client,
}

impl AppState {
    /// Runs one search end to end. Settings are checked first so a missing
    /// api key fails before any request is built.
    pub async fn search(&self, criteria: &SearchCriteria) -> Result<SearchResults, SearchError> {
        let config = SearchConfig::from_settings(&self.settings)?;
        InventoryClient::new(self.http_client.clone(), config)
            .search(criteria)
            .await
    }
}
