//! Location models for geographic coordinates and the user's position

use serde::{Deserialize, Serialize};

/// Latitude/longitude pair in decimal degrees
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinates {
    #[must_use]
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// Build coordinates from nullable parts, `None` if either is missing
    #[must_use]
    pub fn from_parts(latitude: Option<f64>, longitude: Option<f64>) -> Option<Self> {
        match (latitude, longitude) {
            (Some(latitude), Some(longitude)) => Some(Self::new(latitude, longitude)),
            _ => None,
        }
    }

    /// Latitude within ±90 and longitude within ±180
    #[must_use]
    pub fn is_valid(&self) -> bool {
        (-90.0..=90.0).contains(&self.latitude) && (-180.0..=180.0).contains(&self.longitude)
    }

    /// Format as coordinates string
    #[must_use]
    pub fn format(&self) -> String {
        format!("{:.4}, {:.4}", self.latitude, self.longitude)
    }
}

/// The user's resolved position
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct UserLocation {
    /// Latitude in decimal degrees
    pub latitude: f64,
    /// Longitude in decimal degrees
    pub longitude: f64,
    /// Display address
    pub address: String,
}

impl UserLocation {
    /// Create a new location
    #[must_use]
    pub fn new(latitude: f64, longitude: f64, address: impl Into<String>) -> Self {
        Self {
            latitude,
            longitude,
            address: address.into(),
        }
    }

    /// Location labelled with its own coordinates
    #[must_use]
    pub fn from_coordinates(coordinates: Coordinates) -> Self {
        Self::new(
            coordinates.latitude,
            coordinates.longitude,
            coordinates.format(),
        )
    }

    #[must_use]
    pub fn coordinates(&self) -> Coordinates {
        Coordinates::new(self.latitude, self.longitude)
    }

    /// Round coordinates for cache key generation
    #[must_use]
    pub fn rounded_coordinates(&self, precision: u32) -> (f64, f64) {
        let multiplier = 10_f64.powi(i32::try_from(precision).unwrap_or(4));
        let lat = (self.latitude * multiplier).round() / multiplier;
        let lon = (self.longitude * multiplier).round() / multiplier;
        (lat, lon)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_location_rounded_coordinates() {
        let location = UserLocation::new(37.566_535, 126.977_969, "서울특별시청");
        let (lat, lon) = location.rounded_coordinates(2);
        assert_eq!(lat, 37.57);
        assert_eq!(lon, 126.98);
    }

    #[test]
    fn test_coordinates_from_parts() {
        assert!(Coordinates::from_parts(Some(37.5), None).is_none());
        assert!(Coordinates::from_parts(None, Some(127.0)).is_none());
        let coordinates = Coordinates::from_parts(Some(37.5), Some(127.0)).unwrap();
        assert_eq!(coordinates.format(), "37.5000, 127.0000");
    }

    #[test]
    fn test_coordinate_ranges() {
        assert!(Coordinates::new(-90.0, 180.0).is_valid());
        assert!(!Coordinates::new(90.5, 127.0).is_valid());
        assert!(!Coordinates::new(37.5, -181.0).is_valid());
        assert!(!Coordinates::new(f64::NAN, 127.0).is_valid());
    }

    #[test]
    fn test_from_coordinates_uses_coordinate_label() {
        let location = UserLocation::from_coordinates(Coordinates::new(37.5665, 126.978));
        assert_eq!(location.address, "37.5665, 126.9780");
    }
}
