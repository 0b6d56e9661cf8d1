// Route definitions

use axum::{
    Router,
    routing::{get, post},
};
use tower_http::trace::TraceLayer;

use crate::AppState;

mod api;
mod pages;

pub use api::NO_RESULTS_MESSAGE;

// Static assets are nested by the caller (see main.rs)
pub fn create_router(app_state: AppState) -> Router {
    let api_router = Router::new()
        .route("/search", post(api::search_listings))
        .route("/search/export", get(api::export_listings));

    Router::new()
        // Server-rendered search page
        .route("/", get(pages::search_page))
        .route("/search", get(pages::results_page))
        .nest("/api", api_router)
        .layer(TraceLayer::new_for_http())
        .with_state(app_state)
}
