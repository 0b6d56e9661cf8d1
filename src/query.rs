// Translates validated criteria into query parameters for the inventory search endpoint

use std::collections::BTreeMap;

use crate::config::SearchConfig;
use crate::models::{SearchCriteria, SortOption};

pub const SEARCH_PATH: &str = "/search/car/active";

/// Query parameters for one `GET {base}/search/car/active` request.
pub type QueryParams = BTreeMap<&'static str, String>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RemoteSort {
    pub field: &'static str,
    pub order: &'static str,
}

impl SortOption {
    // The endpoint's own sort vocabulary
    pub fn remote_sort(self) -> RemoteSort {
        let (field, order) = match self {
            SortOption::PriceAsc => ("price", "asc"),
            SortOption::PriceDesc => ("price", "desc"),
            SortOption::Distance => ("distance", "asc"),
            SortOption::MileageAsc => ("miles", "asc"),
        };
        RemoteSort { field, order }
    }
}

/// A ranged filter sent as a single inclusive `"min-max"` parameter.
///
/// When only one bound is supplied the other is filled from the defaults below
/// rather than left open, so a lone minimum mileage of 20000 is sent as
/// `20000-1000`. Kept as-is for compatibility with the existing search page.
struct RangeParam {
    name: &'static str,
    default_min: u32,
    default_max: u32,
}

const YEAR_RANGE: RangeParam = RangeParam {
    name: "year_range",
    default_min: 2000,
    default_max: 2030,
};

const MILES_RANGE: RangeParam = RangeParam {
    name: "miles_range",
    default_min: 0,
    default_max: 1000,
};

const PRICE_RANGE: RangeParam = RangeParam {
    name: "price_range",
    default_min: 0,
    default_max: 100_000,
};

impl RangeParam {
    fn value(&self, min: Option<u32>, max: Option<u32>) -> Option<String> {
        if min.is_none() && max.is_none() {
            return None;
        }
        Some(format!(
            "{}-{}",
            min.unwrap_or(self.default_min),
            max.unwrap_or(self.default_max)
        ))
    }
}

pub fn search_url(config: &SearchConfig) -> String {
    format!("{}{}", config.base_url.trim_end_matches('/'), SEARCH_PATH)
}

/// Builds the full parameter set for one search. Pure: the same criteria and
/// config always give the same parameters.
pub fn build_query(criteria: &SearchCriteria, config: &SearchConfig) -> QueryParams {
    let mut params = QueryParams::new();

    params.insert("api_key", config.api_key.clone());
    params.insert("latitude", criteria.location.lat.to_string());
    params.insert("longitude", criteria.location.lng.to_string());
    params.insert("radius", criteria.radius.to_string());
    params.insert("car_type", "used".to_string());
    params.insert("start", "0".to_string());
    params.insert("rows", config.rows().to_string());

    let text_filters = [
        ("make", &criteria.make),
        ("model", &criteria.model),
        ("exterior_color", &criteria.color),
    ];
    for (name, value) in text_filters {
        if let Some(value) = value.as_deref().map(str::trim).filter(|v| !v.is_empty()) {
            params.insert(name, value.to_string());
        }
    }

    let ranges = [
        (&YEAR_RANGE, criteria.min_year, criteria.max_year),
        (&MILES_RANGE, criteria.min_miles, criteria.max_miles),
        (&PRICE_RANGE, criteria.min_price, criteria.max_price),
    ];
    for (range, min, max) in ranges {
        if let Some(value) = range.value(min, max) {
            params.insert(range.name, value);
        }
    }

    let sort = criteria.sort.remote_sort();
    params.insert("sort_by", sort.field.to_string());
    params.insert("sort_order", sort.order.to_string());

    params
}

// Same parameters with the key masked, for logging
pub fn redacted(params: &QueryParams) -> QueryParams {
    let mut masked = params.clone();
    if let Some(key) = masked.get_mut("api_key") {
        *key = "***".to_string();
    }
    masked
}
