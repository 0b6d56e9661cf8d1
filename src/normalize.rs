// Maps raw inventory records onto the canonical VehicleListing shape

use uuid::Uuid;

use crate::models::{RawBuild, RawListingRecord, VehicleListing};

pub const PLACEHOLDER_TITLE: &str = "Used Vehicle";

/// Source of ids for records that carry neither an id nor a VIN.
///
/// Ids only need to be unique within one page of results, they are never
/// stored.
pub trait IdGenerator {
    fn generate(&self) -> String;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct RandomIdGenerator;

impl IdGenerator for RandomIdGenerator {
    fn generate(&self) -> String {
        Uuid::new_v4().simple().to_string()
    }
}

impl<F> IdGenerator for F
where
    F: Fn() -> String,
{
    fn generate(&self) -> String {
        self()
    }
}

/// Normalizes one record. Total over partially populated input: never fails
/// and always yields exactly one listing.
pub fn normalize_listing(raw: &RawListingRecord, ids: &impl IdGenerator) -> VehicleListing {
    let build = raw.build.clone().unwrap_or_default();
    let dealer = raw.dealer.clone().unwrap_or_default();

    let dealer_website = first_of([&dealer.website, &raw.website, &raw.source_url]);
    let listing_url = first_of([&raw.vdp_url, &raw.source_url, &dealer_website]);

    let image_url = raw
        .media
        .as_ref()
        .and_then(|media| media.photo_links.as_ref())
        .and_then(|links| links.first().cloned());

    let id = first_of([&raw.id, &raw.vin]).unwrap_or_else(|| ids.generate());

    VehicleListing {
        id,
        title: title(raw.heading.as_deref(), &build),
        price: raw.price.or(raw.ref_price),
        mileage: raw.miles.or(raw.ref_miles),
        distance: raw.dist.or(raw.distance),
        year: build.year,
        make: build.make,
        model: build.model,
        trim: build.trim,
        exterior_color: raw.exterior_color.clone(),
        interior_color: raw.interior_color.clone(),
        body_type: build.body_type,
        transmission: build.transmission,
        drivetrain: build.drivetrain,
        fuel_type: build.fuel_type,
        dealer_name: dealer.name,
        dealer_city: dealer.city,
        dealer_state: dealer.state,
        dealer_phone: dealer.phone,
        dealer_website,
        listing_url,
        image_url,
    }
}

pub fn normalize_all(raw: &[RawListingRecord], ids: &impl IdGenerator) -> Vec<VehicleListing> {
    raw.iter().map(|record| normalize_listing(record, ids)).collect()
}

fn first_of<const N: usize>(candidates: [&Option<String>; N]) -> Option<String> {
    candidates.into_iter().find_map(|candidate| candidate.clone())
}

// heading, else "year make model trim", else the placeholder
fn title(heading: Option<&str>, build: &RawBuild) -> String {
    if let Some(heading) = heading.map(str::trim).filter(|h| !h.is_empty()) {
        return heading.to_string();
    }

    let year = build.year.map(|y| y.to_string());
    let composed = [&year, &build.make, &build.model, &build.trim]
        .into_iter()
        .filter_map(|part| part.as_deref().map(str::trim))
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join(" ");

    if composed.is_empty() {
        PLACEHOLDER_TITLE.to_string()
    } else {
        composed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn fixed_id() -> String {
        "generated-1".to_string()
    }

    fn normalize(value: serde_json::Value) -> VehicleListing {
        normalize_listing(&RawListingRecord::from_json(value), &fixed_id)
    }

    #[test]
    fn id_falls_back_to_vin_then_generator() {
        assert_eq!(normalize(json!({ "id": "mc-1", "vin": "VIN1" })).id, "mc-1");
        assert_eq!(normalize(json!({ "vin": "VIN1" })).id, "VIN1");
        assert_eq!(normalize(json!({})).id, "generated-1");
    }

    #[test]
    fn random_ids_are_non_empty_and_distinct() {
        let raw = RawListingRecord::default();
        let a = normalize_listing(&raw, &RandomIdGenerator);
        let b = normalize_listing(&raw, &RandomIdGenerator);
        assert!(!a.id.is_empty());
        assert_ne!(a.id, b.id);
    }

    #[test]
    fn title_prefers_heading() {
        let listing = normalize(json!({
            "heading": "  2019 Toyota Camry SE  ",
            "build": { "year": 2020, "make": "Honda", "model": "Civic" }
        }));
        assert_eq!(listing.title, "2019 Toyota Camry SE");
    }

    #[test]
    fn title_is_composed_from_build() {
        let listing = normalize(json!({
            "heading": "   ",
            "build": { "year": 2020, "make": "Honda", "model": "Civic" }
        }));
        assert_eq!(listing.title, "2020 Honda Civic");

        let listing = normalize(json!({ "build": { "make": "Ford", "trim": "XLT" } }));
        assert_eq!(listing.title, "Ford XLT");
    }

    #[test]
    fn title_placeholder_when_nothing_known() {
        assert_eq!(normalize(json!({})).title, "Used Vehicle");
        assert_eq!(normalize(json!({ "build": {} })).title, "Used Vehicle");
    }

    #[test]
    fn numeric_fallbacks() {
        let listing =
            normalize(json!({ "ref_price": 15500, "ref_miles": 42000, "distance": 12.5 }));
        assert_eq!(listing.price, Some(15500.0));
        assert_eq!(listing.mileage, Some(42000.0));
        assert_eq!(listing.distance, Some(12.5));

        let listing = normalize(json!({
            "price": 14999, "ref_price": 15500,
            "miles": 40000, "ref_miles": 42000,
            "dist": 3.2, "distance": 12.5
        }));
        assert_eq!(listing.price, Some(14999.0));
        assert_eq!(listing.mileage, Some(40000.0));
        assert_eq!(listing.distance, Some(3.2));
    }

    #[test]
    fn dealer_website_and_listing_url_chains() {
        let listing = normalize(json!({ "source_url": "https://dealer.example/car/1" }));
        assert_eq!(listing.dealer_website.as_deref(), Some("https://dealer.example/car/1"));
        assert_eq!(listing.listing_url.as_deref(), Some("https://dealer.example/car/1"));

        let listing = normalize(json!({ "website": "https://top.example" }));
        assert_eq!(listing.dealer_website.as_deref(), Some("https://top.example"));
        assert_eq!(listing.listing_url.as_deref(), Some("https://top.example"));

        let listing = normalize(json!({
            "dealer": { "website": "https://dealer.example" },
            "website": "https://top.example",
            "vdp_url": "https://dealer.example/vdp/9"
        }));
        assert_eq!(listing.dealer_website.as_deref(), Some("https://dealer.example"));
        assert_eq!(listing.listing_url.as_deref(), Some("https://dealer.example/vdp/9"));

        let listing = normalize(json!({}));
        assert_eq!(listing.dealer_website, None);
        assert_eq!(listing.listing_url, None);
    }

    #[test]
    fn image_is_first_photo() {
        let listing = normalize(json!({
            "media": { "photo_links": ["https://img/1.jpg", "https://img/2.jpg"] }
        }));
        assert_eq!(listing.image_url.as_deref(), Some("https://img/1.jpg"));

        assert_eq!(normalize(json!({ "media": { "photo_links": [] } })).image_url, None);
        assert_eq!(normalize(json!({ "media": null })).image_url, None);
    }

    #[test]
    fn normalizing_twice_differs_only_in_generated_id() {
        let raw = RawListingRecord::from_json(json!({
            "heading": "2018 Mazda CX-5",
            "price": 19000,
            "dealer": { "name": "Mile High Mazda" }
        }));
        let a = normalize_listing(&raw, &RandomIdGenerator);
        let b = normalize_listing(&raw, &RandomIdGenerator);
        assert_ne!(a.id, b.id);
        assert_eq!(VehicleListing { id: b.id.clone(), ..a }, b);
    }

    #[test]
    fn fully_populated_record_keeps_every_value() {
        let listing = normalize(json!({
            "id": "mc-42",
            "vin": "1HGCV1F34LA000001",
            "heading": "2020 Honda Accord Sport",
            "price": 23450,
            "miles": 31877,
            "dist": 8.4,
            "exterior_color": "Platinum White Pearl",
            "interior_color": "Black",
            "vdp_url": "https://dealer.example/vdp/42",
            "build": {
                "year": 2020,
                "make": "Honda",
                "model": "Accord",
                "trim": "Sport",
                "body_type": "Sedan",
                "transmission": "Automatic",
                "drivetrain": "FWD",
                "fuel_type": "Unleaded"
            },
            "dealer": {
                "name": "Capitol Honda",
                "city": "Austin",
                "state": "TX",
                "phone": "512-555-0100",
                "website": "https://dealer.example"
            },
            "media": { "photo_links": ["https://img.example/42.jpg"] }
        }));

        assert_eq!(
            listing,
            VehicleListing {
                id: "mc-42".to_string(),
                title: "2020 Honda Accord Sport".to_string(),
                price: Some(23450.0),
                mileage: Some(31877.0),
                distance: Some(8.4),
                year: Some(2020),
                make: Some("Honda".to_string()),
                model: Some("Accord".to_string()),
                trim: Some("Sport".to_string()),
                exterior_color: Some("Platinum White Pearl".to_string()),
                interior_color: Some("Black".to_string()),
                body_type: Some("Sedan".to_string()),
                transmission: Some("Automatic".to_string()),
                drivetrain: Some("FWD".to_string()),
                fuel_type: Some("Unleaded".to_string()),
                dealer_name: Some("Capitol Honda".to_string()),
                dealer_city: Some("Austin".to_string()),
                dealer_state: Some("TX".to_string()),
                dealer_phone: Some("512-555-0100".to_string()),
                dealer_website: Some("https://dealer.example".to_string()),
                listing_url: Some("https://dealer.example/vdp/42".to_string()),
                image_url: Some("https://img.example/42.jpg".to_string()),
            }
        );
    }
}
