// Handlers for the JSON and CSV endpoints

use axum::{
    extract::{Json as JsonExtract, Query, State, rejection::JsonRejection},
    http::header,
    response::{IntoResponse, Json},
};
use serde::Serialize;

use crate::{
    AppState,
    criteria::SearchForm,
    error::{AppError, AppResult},
    export,
    models::{SearchCriteria, VehicleListing},
};

pub const NO_RESULTS_MESSAGE: &str = "No vehicles found near this location. \
    Try broadening your search: increase the radius or remove some filters.";

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SearchResponse {
    listings: Vec<VehicleListing>,
    total_found: Option<u64>,
    message: Option<String>,
}

pub async fn search_listings(
    State(app_state): State<AppState>,
    body: Result<JsonExtract<SearchCriteria>, JsonRejection>,
) -> AppResult<impl IntoResponse> {
    // Malformed bodies (negative bounds, missing fields) are validation failures too
    let JsonExtract(criteria) =
        body.map_err(|rejection| AppError::BadRequest(rejection.body_text()))?;
    tracing::info!(
        city = %criteria.location.city,
        radius = criteria.radius,
        sort = %criteria.sort,
        "[HANDLER] /api/search - Request received."
    );
    criteria.validate()?;

    let results = app_state.search(&criteria).await?;
    let message = results
        .listings
        .is_empty()
        .then(|| NO_RESULTS_MESSAGE.to_string());

    Ok(Json(SearchResponse {
        listings: results.listings,
        total_found: results.total_found,
        message,
    }))
}

pub async fn export_listings(
    State(app_state): State<AppState>,
    Query(form): Query<SearchForm>,
) -> AppResult<impl IntoResponse> {
    tracing::info!(
        city = %form.city,
        "[HANDLER] /api/search/export - Request received."
    );
    let criteria = SearchCriteria::try_from(&form)?;

    let results = app_state.search(&criteria).await?;
    let body = export::to_csv_bytes(&results.listings)?;
    let file_name = export::export_file_name(&criteria.location.city, chrono::Local::now());
    tracing::info!(
        count = results.listings.len(),
        file_name = %file_name,
        "Exporting search results"
    );

    Ok((
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{file_name}\""),
            ),
        ],
        body,
    ))
}
