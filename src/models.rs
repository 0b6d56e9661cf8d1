// Data structures shared by the search pipeline:
// criteria coming in, raw inventory records, and the canonical listing going out.

use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

// A place resolved by the location autocomplete on the search page
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SelectedLocation {
    pub description: String,
    pub city: String,
    pub state: String,
    pub lat: f64,
    pub lng: f64,
}

/// A validated search request.
///
/// Ranged fields are unsigned so they are non-negative by construction.
/// `min <= max` and the radius bounds are checked by [`SearchCriteria::validate`]
/// (see `criteria.rs`); the query builder tolerates values that skipped it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchCriteria {
    pub location: SelectedLocation,
    pub radius: u32,
    #[serde(default)]
    pub make: Option<String>,
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub color: Option<String>,
    #[serde(default)]
    pub min_year: Option<u32>,
    #[serde(default)]
    pub max_year: Option<u32>,
    #[serde(default)]
    pub min_miles: Option<u32>,
    #[serde(default)]
    pub max_miles: Option<u32>,
    #[serde(default)]
    pub min_price: Option<u32>,
    #[serde(default)]
    pub max_price: Option<u32>,
    #[serde(default)]
    pub sort: SortOption,
}

// Drives both the remote sort request and the local re-sort
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SortOption {
    #[default]
    PriceAsc,
    PriceDesc,
    Distance,
    MileageAsc,
}

impl SortOption {
    pub const ALL: [SortOption; 4] = [
        SortOption::PriceAsc,
        SortOption::PriceDesc,
        SortOption::Distance,
        SortOption::MileageAsc,
    ];

    // Value used in forms and JSON bodies
    pub fn as_str(self) -> &'static str {
        match self {
            SortOption::PriceAsc => "priceAsc",
            SortOption::PriceDesc => "priceDesc",
            SortOption::Distance => "distance",
            SortOption::MileageAsc => "mileageAsc",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            SortOption::PriceAsc => "Price: Low to High",
            SortOption::PriceDesc => "Price: High to Low",
            SortOption::Distance => "Distance: Nearest First",
            SortOption::MileageAsc => "Mileage: Low to High",
        }
    }
}

impl fmt::Display for SortOption {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SortOption {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SortOption::ALL
            .into_iter()
            .find(|option| option.as_str() == s.trim())
            .ok_or_else(|| s.to_string())
    }
}

// --- Inventory API shapes ---
//
// Upstream records are untrusted: any field may be missing or carry the wrong
// JSON type. Every field goes through a lenient deserializer so a bad value
// reads as absent instead of failing the record.

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct RawListingRecord {
    #[serde(default, deserialize_with = "lenient::string")]
    pub id: Option<String>,
    #[serde(default, deserialize_with = "lenient::string")]
    pub vin: Option<String>,
    #[serde(default, deserialize_with = "lenient::string")]
    pub heading: Option<String>,
    #[serde(default, deserialize_with = "lenient::number")]
    pub price: Option<f64>,
    #[serde(default, deserialize_with = "lenient::number")]
    pub ref_price: Option<f64>,
    #[serde(default, deserialize_with = "lenient::number")]
    pub miles: Option<f64>,
    #[serde(default, deserialize_with = "lenient::number")]
    pub ref_miles: Option<f64>,
    #[serde(default, deserialize_with = "lenient::number")]
    pub dist: Option<f64>,
    #[serde(default, deserialize_with = "lenient::number")]
    pub distance: Option<f64>,
    #[serde(default, deserialize_with = "lenient::string")]
    pub exterior_color: Option<String>,
    #[serde(default, deserialize_with = "lenient::string")]
    pub interior_color: Option<String>,
    #[serde(default, deserialize_with = "lenient::string")]
    pub vdp_url: Option<String>,
    #[serde(default, deserialize_with = "lenient::string")]
    pub source_url: Option<String>,
    #[serde(default, deserialize_with = "lenient::string")]
    pub website: Option<String>,
    #[serde(default, deserialize_with = "lenient::value")]
    pub build: Option<RawBuild>,
    #[serde(default, deserialize_with = "lenient::value")]
    pub dealer: Option<RawDealer>,
    #[serde(default, deserialize_with = "lenient::value")]
    pub media: Option<RawMedia>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct RawBuild {
    #[serde(default, deserialize_with = "lenient::year")]
    pub year: Option<u32>,
    #[serde(default, deserialize_with = "lenient::string")]
    pub make: Option<String>,
    #[serde(default, deserialize_with = "lenient::string")]
    pub model: Option<String>,
    #[serde(default, deserialize_with = "lenient::string")]
    pub trim: Option<String>,
    #[serde(default, deserialize_with = "lenient::string")]
    pub body_type: Option<String>,
    #[serde(default, deserialize_with = "lenient::string")]
    pub transmission: Option<String>,
    #[serde(default, deserialize_with = "lenient::string")]
    pub drivetrain: Option<String>,
    #[serde(default, deserialize_with = "lenient::string")]
    pub fuel_type: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct RawDealer {
    #[serde(default, deserialize_with = "lenient::string")]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "lenient::string")]
    pub city: Option<String>,
    #[serde(default, deserialize_with = "lenient::string")]
    pub state: Option<String>,
    #[serde(default, deserialize_with = "lenient::string")]
    pub phone: Option<String>,
    #[serde(default, deserialize_with = "lenient::string")]
    pub website: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct RawMedia {
    #[serde(default, deserialize_with = "lenient::string_list")]
    pub photo_links: Option<Vec<String>>,
}

impl RawListingRecord {
    /// Reads one entry of the upstream `listings` array.
    ///
    /// Never fails: anything that is not a JSON object becomes an empty record,
    /// which still normalizes to a placeholder listing.
    pub fn from_json(value: serde_json::Value) -> Self {
        match serde_json::from_value(value) {
            Ok(record) => record,
            Err(e) => {
                tracing::warn!(error = %e, "Listing record is not an object, using empty record");
                RawListingRecord::default()
            }
        }
    }
}

/// Canonical listing shown in the results grid, returned by the JSON API,
/// and written to CSV exports.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VehicleListing {
    pub id: String,
    pub title: String,
    pub price: Option<f64>,
    pub mileage: Option<f64>,
    pub distance: Option<f64>,
    pub year: Option<u32>,
    pub make: Option<String>,
    pub model: Option<String>,
    pub trim: Option<String>,
    pub exterior_color: Option<String>,
    pub interior_color: Option<String>,
    pub body_type: Option<String>,
    pub transmission: Option<String>,
    pub drivetrain: Option<String>,
    pub fuel_type: Option<String>,
    pub dealer_name: Option<String>,
    pub dealer_city: Option<String>,
    pub dealer_state: Option<String>,
    pub dealer_phone: Option<String>,
    pub dealer_website: Option<String>,
    pub listing_url: Option<String>,
    pub image_url: Option<String>,
}

mod lenient {
    use serde::{Deserialize, Deserializer, de::DeserializeOwned};
    use serde_json::Value;

    pub fn value<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
    where
        D: Deserializer<'de>,
        T: DeserializeOwned,
    {
        let raw = Value::deserialize(deserializer)?;
        if !raw.is_object() {
            return Ok(None);
        }
        Ok(serde_json::from_value(raw).ok())
    }

    // Strings and bare numbers are accepted; blank strings read as absent
    pub fn string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(match Value::deserialize(deserializer)? {
            Value::String(s) if !s.trim().is_empty() => Some(s),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        })
    }

    pub fn number<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(to_f64(&Value::deserialize(deserializer)?))
    }

    pub fn year<'de, D>(deserializer: D) -> Result<Option<u32>, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(to_f64(&Value::deserialize(deserializer)?)
            .filter(|y| *y >= 0.0 && y.fract() == 0.0 && *y <= f64::from(u32::MAX))
            .map(|y| y as u32))
    }

    pub fn string_list<'de, D>(deserializer: D) -> Result<Option<Vec<String>>, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(match Value::deserialize(deserializer)? {
            Value::Array(items) => Some(
                items
                    .into_iter()
                    .filter_map(|item| match item {
                        Value::String(s) if !s.trim().is_empty() => Some(s),
                        _ => None,
                    })
                    .collect(),
            ),
            _ => None,
        })
    }

    fn to_f64(value: &Value) -> Option<f64> {
        let n = match value {
            Value::Number(n) => n.as_f64(),
            Value::String(s) => s.trim().parse::<f64>().ok(),
            _ => None,
        };
        n.filter(|n| n.is_finite())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn wrong_typed_fields_read_as_absent() {
        let record = RawListingRecord::from_json(json!({
            "id": "abc",
            "price": "18,000 dollars",
            "miles": "42000",
            "dist": true,
            "build": "not an object",
            "dealer": { "name": 7, "city": ["Austin"] },
            "media": { "photo_links": "https://img/1.jpg" }
        }));

        assert_eq!(record.id.as_deref(), Some("abc"));
        assert_eq!(record.price, None);
        assert_eq!(record.miles, Some(42000.0));
        assert_eq!(record.dist, None);
        assert_eq!(record.build, None);
        let dealer = record.dealer.unwrap();
        assert_eq!(dealer.name.as_deref(), Some("7"));
        assert_eq!(dealer.city, None);
        assert_eq!(record.media.unwrap().photo_links, None);
    }

    #[test]
    fn non_object_record_becomes_empty() {
        assert_eq!(RawListingRecord::from_json(json!(42)), RawListingRecord::default());
        assert_eq!(RawListingRecord::from_json(json!(null)), RawListingRecord::default());
    }

    #[test]
    fn year_accepts_whole_numbers_only() {
        let record = RawListingRecord::from_json(json!({ "build": { "year": "2019" } }));
        assert_eq!(record.build.unwrap().year, Some(2019));

        let record = RawListingRecord::from_json(json!({ "build": { "year": 2019.5 } }));
        assert_eq!(record.build.unwrap().year, None);
    }

    #[test]
    fn sort_option_round_trips_through_form_values() {
        for option in SortOption::ALL {
            assert_eq!(option.as_str().parse::<SortOption>(), Ok(option));
        }
        assert!("cheapest".parse::<SortOption>().is_err());
        assert_eq!(
            serde_json::to_value(SortOption::MileageAsc).unwrap(),
            json!("mileageAsc")
        );
    }
}
