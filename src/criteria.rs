// Search form handling: raw form fields in, validated SearchCriteria out

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::{SearchCriteria, SelectedLocation, SortOption};

pub const MIN_RADIUS: u32 = 1;
pub const MAX_RADIUS: u32 = 500;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    #[error("Please choose a location from the suggestions or enter its coordinates.")]
    MissingLocation,

    #[error("The selected location has invalid coordinates.")]
    InvalidLocation,

    #[error("Radius must be between {} and {} miles.", MIN_RADIUS, MAX_RADIUS)]
    RadiusOutOfRange,

    #[error("{field} must be a whole number of zero or more, got '{value}'.")]
    InvalidNumber { field: &'static str, value: String },

    #[error("Minimum {field} cannot be greater than maximum {field}.")]
    InvertedRange { field: &'static str },

    #[error("Unknown sort option '{0}'.")]
    UnknownSortOption(String),
}

/// Search form as submitted by the page (query string), every field a string.
///
/// Blank numeric fields mean "no bound". The location fields are filled by the
/// autocomplete widget once the user picks a suggestion.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SearchForm {
    pub description: String,
    pub city: String,
    pub state: String,
    pub lat: String,
    pub lng: String,
    pub radius: String,
    pub make: String,
    pub model: String,
    pub color: String,
    pub min_year: String,
    pub max_year: String,
    pub min_miles: String,
    pub max_miles: String,
    pub min_price: String,
    pub max_price: String,
    pub sort: String,
}

impl SearchForm {
    // Name/value pairs, used to carry the current search into follow-up links
    pub fn fields(&self) -> [(&'static str, &str); 16] {
        [
            ("description", self.description.as_str()),
            ("city", self.city.as_str()),
            ("state", self.state.as_str()),
            ("lat", self.lat.as_str()),
            ("lng", self.lng.as_str()),
            ("radius", self.radius.as_str()),
            ("make", self.make.as_str()),
            ("model", self.model.as_str()),
            ("color", self.color.as_str()),
            ("minYear", self.min_year.as_str()),
            ("maxYear", self.max_year.as_str()),
            ("minMiles", self.min_miles.as_str()),
            ("maxMiles", self.max_miles.as_str()),
            ("minPrice", self.min_price.as_str()),
            ("maxPrice", self.max_price.as_str()),
            ("sort", self.sort.as_str()),
        ]
    }
}

impl TryFrom<&SearchForm> for SearchCriteria {
    type Error = ValidationError;

    fn try_from(form: &SearchForm) -> Result<Self, Self::Error> {
        let lat = parse_coordinate(&form.lat)?;
        let lng = parse_coordinate(&form.lng)?;

        let radius = parse_whole("Radius", &form.radius)?.ok_or(ValidationError::RadiusOutOfRange)?;

        let sort = if form.sort.trim().is_empty() {
            SortOption::default()
        } else {
            form.sort
                .parse::<SortOption>()
                .map_err(ValidationError::UnknownSortOption)?
        };

        let criteria = SearchCriteria {
            location: SelectedLocation {
                description: form.description.trim().to_string(),
                city: form.city.trim().to_string(),
                state: form.state.trim().to_string(),
                lat,
                lng,
            },
            radius,
            make: non_blank(&form.make),
            model: non_blank(&form.model),
            color: non_blank(&form.color),
            min_year: parse_whole("Year", &form.min_year)?,
            max_year: parse_whole("Year", &form.max_year)?,
            min_miles: parse_whole("Mileage", &form.min_miles)?,
            max_miles: parse_whole("Mileage", &form.max_miles)?,
            min_price: parse_whole("Price", &form.min_price)?,
            max_price: parse_whole("Price", &form.max_price)?,
            sort,
        };
        criteria.validate()?;
        Ok(criteria)
    }
}

impl SearchCriteria {
    /// Checks the invariants the query builder expects.
    pub fn validate(&self) -> Result<(), ValidationError> {
        let SelectedLocation { lat, lng, .. } = self.location;
        if !(lat.is_finite() && lng.is_finite()) || lat.abs() > 90.0 || lng.abs() > 180.0 {
            return Err(ValidationError::InvalidLocation);
        }

        if !(MIN_RADIUS..=MAX_RADIUS).contains(&self.radius) {
            return Err(ValidationError::RadiusOutOfRange);
        }

        let ranges = [
            ("year", self.min_year, self.max_year),
            ("mileage", self.min_miles, self.max_miles),
            ("price", self.min_price, self.max_price),
        ];
        for (field, min, max) in ranges {
            if let (Some(min), Some(max)) = (min, max) {
                if min > max {
                    return Err(ValidationError::InvertedRange { field });
                }
            }
        }

        Ok(())
    }
}

fn non_blank(value: &str) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

fn parse_coordinate(value: &str) -> Result<f64, ValidationError> {
    let value = value.trim();
    if value.is_empty() {
        return Err(ValidationError::MissingLocation);
    }
    value
        .parse::<f64>()
        .map_err(|_| ValidationError::InvalidLocation)
}

// Accepts thousands separators, e.g. "20,000"
fn parse_whole(field: &'static str, value: &str) -> Result<Option<u32>, ValidationError> {
    let cleaned: String = value.trim().chars().filter(|c| *c != ',').collect();
    if cleaned.is_empty() {
        return Ok(None);
    }
    cleaned
        .parse::<u32>()
        .map(Some)
        .map_err(|_| ValidationError::InvalidNumber {
            field,
            value: value.trim().to_string(),
        })
}
