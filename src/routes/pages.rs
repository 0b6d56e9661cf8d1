use askama::Template;
use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{Html, IntoResponse},
};

use crate::{
    AppState,
    criteria::SearchForm,
    error::{AppError, AppResult},
    inventory_api::SearchResults,
    models::{SearchCriteria, SortOption, VehicleListing},
};

use super::api::NO_RESULTS_MESSAGE;

// One entry of the sort dropdown
struct SortChoice {
    value: &'static str,
    label: &'static str,
    selected: bool,
}

// Carries the current search into the CSV export form
struct HiddenField {
    name: &'static str,
    value: String,
}

// A listing with its display strings already formatted
struct ListingCard {
    title: String,
    price: String,
    mileage: Option<String>,
    distance: Option<String>,
    details: String,
    colors: Option<String>,
    dealer: Option<String>,
    dealer_phone: Option<String>,
    link: Option<String>,
    image: Option<String>,
}

#[derive(Template)]
#[template(path = "index.html")]
struct SearchPageTemplate {
    form: SearchForm,
    // Places autocomplete when set, otherwise the form asks for coordinates
    maps_api_key: Option<String>,
    sort_choices: Vec<SortChoice>,
    // At most one of error / notice / cards is shown
    error: Option<String>,
    notice: Option<String>,
    summary: Option<String>,
    cards: Vec<ListingCard>,
    export_fields: Vec<HiddenField>,
}

impl SearchPageTemplate {
    fn new(form: SearchForm, maps_api_key: Option<String>) -> Self {
        let selected = form.sort.parse::<SortOption>().unwrap_or_default();
        let sort_choices = SortOption::ALL
            .into_iter()
            .map(|option| SortChoice {
                value: option.as_str(),
                label: option.label(),
                selected: option == selected,
            })
            .collect();

        Self {
            form,
            maps_api_key,
            sort_choices,
            error: None,
            notice: None,
            summary: None,
            cards: Vec::new(),
            export_fields: Vec::new(),
        }
    }

    fn show_results(&mut self, results: SearchResults) {
        if results.listings.is_empty() {
            self.notice = Some(NO_RESULTS_MESSAGE.to_string());
            return;
        }

        let shown = results.listings.len();
        self.summary = Some(match results.total_found {
            Some(total) if total > shown as u64 => {
                format!("Showing {} of {} vehicles", shown, group_thousands(total as f64))
            }
            _ => format!("Showing {} vehicles", shown),
        });
        self.cards = results.listings.into_iter().map(ListingCard::from).collect();
        self.export_fields = self
            .form
            .fields()
            .into_iter()
            .filter(|(_, value)| !value.trim().is_empty())
            .map(|(name, value)| HiddenField {
                name,
                value: value.to_string(),
            })
            .collect();
    }

    fn render_page(&self, status: StatusCode) -> AppResult<(StatusCode, Html<String>)> {
        match self.render() {
            Ok(html) => Ok((status, Html(html))),
            Err(e) => {
                tracing::error!("Failed to render search template: {}", e);
                Err(AppError::InternalServerError(anyhow::Error::new(e)))
            }
        }
    }
}

impl From<VehicleListing> for ListingCard {
    fn from(listing: VehicleListing) -> Self {
        let details = [
            &listing.body_type,
            &listing.transmission,
            &listing.drivetrain,
            &listing.fuel_type,
        ]
        .into_iter()
        .flatten()
        .map(String::as_str)
        .collect::<Vec<_>>()
        .join(" · ");

        let colors = match (&listing.exterior_color, &listing.interior_color) {
            (Some(ext), Some(int)) => Some(format!("{ext} / {int} interior")),
            (Some(ext), None) => Some(ext.clone()),
            (None, Some(int)) => Some(format!("{int} interior")),
            (None, None) => None,
        };

        let place = match (&listing.dealer_city, &listing.dealer_state) {
            (Some(city), Some(state)) => Some(format!("{city}, {state}")),
            (Some(place), None) | (None, Some(place)) => Some(place.clone()),
            (None, None) => None,
        };
        let dealer = match (listing.dealer_name, place) {
            (Some(name), Some(place)) => Some(format!("{name} · {place}")),
            (name, place) => name.or(place),
        };

        ListingCard {
            title: listing.title,
            price: listing
                .price
                .map(|p| format!("${}", group_thousands(p)))
                .unwrap_or_else(|| "Call for price".to_string()),
            mileage: listing.mileage.map(|m| format!("{} mi", group_thousands(m))),
            distance: listing.distance.map(|d| format!("{d:.1} mi away")),
            details,
            colors,
            dealer,
            dealer_phone: listing.dealer_phone,
            link: listing.listing_url,
            image: listing.image_url,
        }
    }
}

// 23450.0 -> "23,450"
fn group_thousands(value: f64) -> String {
    let digits = (value.round().abs() as u64).to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }
    if value.round() < 0.0 {
        grouped.insert(0, '-');
    }
    grouped
}

fn maps_api_key(app_state: &AppState) -> Option<String> {
    app_state
        .settings
        .maps_api_key
        .as_deref()
        .map(str::trim)
        .filter(|key| !key.is_empty())
        .map(str::to_string)
}

// Handler for GET / (empty search form)
pub async fn search_page(State(app_state): State<AppState>) -> AppResult<impl IntoResponse> {
    SearchPageTemplate::new(SearchForm::default(), maps_api_key(&app_state))
        .render_page(StatusCode::OK)
}

// Handler for GET /search: one terminal outcome per search
pub async fn results_page(
    State(app_state): State<AppState>,
    Query(form): Query<SearchForm>,
) -> AppResult<impl IntoResponse> {
    tracing::info!(
        city = %form.city,
        radius = %form.radius,
        "[HANDLER] /search - Request received."
    );
    let mut page = SearchPageTemplate::new(form, maps_api_key(&app_state));

    let criteria = match SearchCriteria::try_from(&page.form) {
        Ok(criteria) => criteria,
        Err(e) => {
            let (status, message) = AppError::from(e).status_and_message();
            page.error = Some(message);
            return page.render_page(status);
        }
    };

    match app_state.search(&criteria).await {
        Ok(results) => {
            page.show_results(results);
            page.render_page(StatusCode::OK)
        }
        Err(e) => {
            tracing::error!("Search failed for {}: {}", criteria.location.description, e);
            let (status, message) = AppError::from(e).status_and_message();
            page.error = Some(message);
            page.render_page(status)
        }
    }
}
