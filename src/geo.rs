//! Geographic distance and proximity search
//!
//! Every distance in the service goes through [`distance_km`]; paths,
//! markets and the user's position are all compared with the same
//! haversine implementation.

use haversine::{Location as HaversineLocation, Units, distance};

use crate::models::{Coordinates, TraditionalMarket, WalkingPath, WalkingPathRecord};

/// Great-circle distance in km (mean Earth radius 6371 km).
///
/// Always defined for finite input; NaN propagates.
#[must_use]
pub fn distance_km(from: Coordinates, to: Coordinates) -> f64 {
    let from_haversine = HaversineLocation {
        latitude: from.latitude,
        longitude: from.longitude,
    };
    let to_haversine = HaversineLocation {
        latitude: to.latitude,
        longitude: to.longitude,
    };
    distance(from_haversine, to_haversine, Units::Kilometers)
}

/// Anything with a possibly missing position
pub trait HasCoordinates {
    fn coordinates(&self) -> Option<Coordinates>;
}

impl<T: HasCoordinates> HasCoordinates for &T {
    fn coordinates(&self) -> Option<Coordinates> {
        (**self).coordinates()
    }
}

impl HasCoordinates for Coordinates {
    fn coordinates(&self) -> Option<Coordinates> {
        Some(*self)
    }
}

impl HasCoordinates for WalkingPathRecord {
    fn coordinates(&self) -> Option<Coordinates> {
        WalkingPathRecord::coordinates(self)
    }
}

impl HasCoordinates for WalkingPath {
    fn coordinates(&self) -> Option<Coordinates> {
        self.coordinates
    }
}

impl HasCoordinates for TraditionalMarket {
    fn coordinates(&self) -> Option<Coordinates> {
        TraditionalMarket::coordinates(self)
    }
}

/// Records within `radius_km` of `origin`, closest first, at most `limit`.
///
/// Records without coordinates are dropped. The sort is stable, so equal
/// distances keep their input order. Fewer matches than `limit` returns
/// just the matches.
pub fn nearest_within<T, I>(
    records: I,
    origin: Coordinates,
    radius_km: f64,
    limit: usize,
) -> Vec<(T, f64)>
where
    T: HasCoordinates,
    I: IntoIterator<Item = T>,
{
    let mut results: Vec<(T, f64)> = records
        .into_iter()
        .filter_map(|record| {
            let distance = distance_km(origin, record.coordinates()?);
            Some((record, distance))
        })
        .filter(|(_, distance)| *distance <= radius_km)
        .collect();

    results.sort_by(|a, b| a.1.total_cmp(&b.1));
    results.truncate(limit);
    results
}
