// CSV export of search results

use anyhow::{Context, Result};
use chrono::{DateTime, Local};
use std::io::Write;

use crate::models::VehicleListing;

/// Column names, in `VehicleListing` field order (camelCase, as serialized).
pub const COLUMNS: [&str; 22] = [
    "id",
    "title",
    "price",
    "mileage",
    "distance",
    "year",
    "make",
    "model",
    "trim",
    "exteriorColor",
    "interiorColor",
    "bodyType",
    "transmission",
    "drivetrain",
    "fuelType",
    "dealerName",
    "dealerCity",
    "dealerState",
    "dealerPhone",
    "dealerWebsite",
    "listingUrl",
    "imageUrl",
];

/// Writes a header row followed by one row per listing. Absent values are
/// left as empty cells. The header is written even when there are no rows.
pub fn write_csv<W: Write>(listings: &[VehicleListing], writer: W) -> Result<()> {
    let mut csv_writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(writer);
    csv_writer
        .write_record(COLUMNS)
        .context("Failed to write CSV header")?;
    for listing in listings {
        csv_writer
            .serialize(listing)
            .with_context(|| format!("Failed to write listing {} to CSV", listing.id))?;
    }
    csv_writer.flush().context("Failed to flush CSV writer")?;
    Ok(())
}

pub fn to_csv_bytes(listings: &[VehicleListing]) -> Result<Vec<u8>> {
    let mut buffer = Vec::new();
    write_csv(listings, &mut buffer)?;
    Ok(buffer)
}

// e.g. "used_cars_Austin_20261016_142501.csv"
pub fn export_file_name(city: &str, at: DateTime<Local>) -> String {
    let city: String = city
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect();
    let city = if city.trim_matches('_').is_empty() {
        "search".to_string()
    } else {
        city
    };
    format!("used_cars_{}_{}.csv", city, at.format("%Y%m%d_%H%M%S"))
}
