// Local re-sort of normalized listings.
// Always applied, even though the same order was requested from the API.

use std::cmp::Ordering;

use crate::models::{SortOption, VehicleListing};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Direction {
    Ascending,
    Descending,
}

// Which numeric field a sort option reads, and in which direction
type SortKey = fn(&VehicleListing) -> Option<f64>;

fn sort_key(sort: SortOption) -> (SortKey, Direction) {
    let price: SortKey = |l| l.price;
    let distance: SortKey = |l| l.distance;
    let mileage: SortKey = |l| l.mileage;

    match sort {
        SortOption::PriceAsc => (price, Direction::Ascending),
        SortOption::PriceDesc => (price, Direction::Descending),
        SortOption::Distance => (distance, Direction::Ascending),
        SortOption::MileageAsc => (mileage, Direction::Ascending),
    }
}

/// Missing values sort last in both directions; two missing values are equal.
fn compare_missing_last(a: Option<f64>, b: Option<f64>, direction: Direction) -> Ordering {
    match (a, b) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Greater,
        (Some(_), None) => Ordering::Less,
        (Some(a), Some(b)) => match direction {
            Direction::Ascending => a.total_cmp(&b),
            Direction::Descending => b.total_cmp(&a),
        },
    }
}

/// Returns the listings in the requested order. The input is left untouched;
/// listings with equal keys keep their relative order.
pub fn sort_listings(listings: &[VehicleListing], sort: SortOption) -> Vec<VehicleListing> {
    let (key, direction) = sort_key(sort);
    let mut sorted = listings.to_vec();
    sorted.sort_by(|a, b| compare_missing_last(key(a), key(b), direction));
    sorted
}
