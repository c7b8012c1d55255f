//! Location Resolution Module
//!
//! Turns what the user gave us (a device fix, raw coordinates or a typed
//! address) into a [`UserLocation`]. Device failures never surface as
//! errors: they fall back to the configured default location together with
//! a message for the user.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest_middleware::ClientWithMiddleware;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, warn};

use crate::backend::http_client;
use crate::cache::PersistentCache;
use crate::config::GeocodingConfig;
use crate::models::{Coordinates, UserLocation};
use crate::{Result, WalkError};

/// What the user supplied
#[derive(Debug, Clone, PartialEq)]
pub enum LocationInput {
    Coordinates(f64, f64),
    Address(String),
}

/// Result of asking the device for its position
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DevicePosition {
    #[serde(default)]
    pub latitude: Option<f64>,
    #[serde(default)]
    pub longitude: Option<f64>,
    /// Browser style error code (1, 2 or 3)
    #[serde(default, alias = "error_code")]
    pub error_code: Option<u16>,
}

impl DevicePosition {
    #[must_use]
    pub fn fix(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude: Some(latitude),
            longitude: Some(longitude),
            error_code: None,
        }
    }

    #[must_use]
    pub fn failed(code: u16) -> Self {
        Self {
            error_code: Some(code),
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GeolocationFailure {
    PermissionDenied,
    PositionUnavailable,
    Timeout,
}

impl GeolocationFailure {
    /// Unknown codes count as an unavailable position
    #[must_use]
    pub fn from_code(code: u16) -> Self {
        match code {
            1 => Self::PermissionDenied,
            3 => Self::Timeout,
            _ => Self::PositionUnavailable,
        }
    }

    #[must_use]
    pub fn code(self) -> u16 {
        match self {
            Self::PermissionDenied => 1,
            Self::PositionUnavailable => 2,
            Self::Timeout => 3,
        }
    }

    /// Message shown when falling back to `fallback_name`
    #[must_use]
    pub fn message(self, fallback_name: &str) -> String {
        let reason = match self {
            Self::PermissionDenied => "위치 정보 접근 권한이 거부되었습니다.",
            Self::PositionUnavailable => "현재 위치를 확인할 수 없습니다.",
            Self::Timeout => "위치 확인 요청 시간이 초과되었습니다.",
        };
        format!("{reason} 기본 위치({fallback_name})를 기준으로 검색합니다.")
    }
}

/// A resolved location plus the note to show when it is a fallback
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedLocation {
    pub location: UserLocation,
    pub is_fallback: bool,
    pub notice: Option<String>,
}

/// Forward and reverse address lookup
#[async_trait]
pub trait Geocoder: Send + Sync {
    /// Best match for a free-text address, `None` when nothing matched
    async fn geocode(&self, address: &str) -> Result<Option<UserLocation>>;

    /// Display address for coordinates, `None` when unknown
    async fn reverse(&self, coordinates: Coordinates) -> Result<Option<String>>;
}

#[derive(Debug, Deserialize)]
struct NominatimPlace {
    lat: String,
    lon: String,
    display_name: String,
}

#[derive(Debug, Deserialize)]
struct NominatimReverse {
    #[serde(default)]
    display_name: Option<String>,
}

/// Geocoder for OpenStreetMap Nominatim compatible services
pub struct NominatimGeocoder {
    client: ClientWithMiddleware,
    base_url: String,
    language: String,
    cache: Option<PersistentCache>,
    cache_ttl: Duration,
}

impl NominatimGeocoder {
    pub fn new(
        config: &GeocodingConfig,
        cache: Option<PersistentCache>,
        cache_ttl: Duration,
    ) -> Result<Self> {
        let client = http_client(config.timeout_seconds, 1, &config.user_agent)?;
        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            language: config.language.clone(),
            cache,
            cache_ttl,
        })
    }

    async fn cached<T>(&self, key: &str) -> Option<T>
    where
        T: serde::de::DeserializeOwned + Send + 'static,
    {
        let cache = self.cache.as_ref()?;
        match cache.get::<T>(key).await {
            Ok(value) => value,
            Err(e) => {
                warn!("Geocoding cache read failed for {}: {}", key, e);
                None
            }
        }
    }

    async fn remember<T>(&self, key: &str, value: T)
    where
        T: Serialize + Send + std::fmt::Debug + 'static,
    {
        let Some(cache) = &self.cache else {
            return;
        };
        if let Err(e) = cache.put(key, value, self.cache_ttl).await {
            warn!("Geocoding cache write failed for {}: {}", key, e);
        }
    }

    async fn get_json<T: serde::de::DeserializeOwned>(&self, url: &str) -> Result<T> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| WalkError::geocoding(format!("Geocoding request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(WalkError::geocoding(format!(
                "Geocoding service returned {status}"
            )));
        }

        response
            .json()
            .await
            .map_err(|e| WalkError::geocoding(format!("Invalid geocoding response: {e}")))
    }
}

#[async_trait]
impl Geocoder for NominatimGeocoder {
    #[instrument(skip(self))]
    async fn geocode(&self, address: &str) -> Result<Option<UserLocation>> {
        let key = format!("geocode:{address}");
        if let Some(location) = self.cached::<UserLocation>(&key).await {
            debug!("Geocoding cache hit for '{}'", address);
            return Ok(Some(location));
        }

        let url = format!(
            "{}/search?q={}&format=json&limit=1&accept-language={}",
            self.base_url,
            urlencoding::encode(address),
            urlencoding::encode(&self.language)
        );
        let places: Vec<NominatimPlace> = self.get_json(&url).await?;

        let Some(place) = places.into_iter().next() else {
            warn!("No geocoding results for '{}'", address);
            return Ok(None);
        };
        let (Ok(latitude), Ok(longitude)) = (place.lat.parse::<f64>(), place.lon.parse::<f64>())
        else {
            return Err(WalkError::geocoding(format!(
                "Unparseable coordinates for '{address}': {}, {}",
                place.lat, place.lon
            )));
        };

        let location = UserLocation::new(latitude, longitude, place.display_name);
        info!(
            "Geocoded '{}' to ({:.4}, {:.4})",
            address, location.latitude, location.longitude
        );
        self.remember(&key, location.clone()).await;
        Ok(Some(location))
    }

    #[instrument(skip(self))]
    async fn reverse(&self, coordinates: Coordinates) -> Result<Option<String>> {
        let (lat, lon) = UserLocation::from_coordinates(coordinates).rounded_coordinates(4);
        let key = format!("reverse:{lat},{lon}");
        if let Some(address) = self.cached::<String>(&key).await {
            return Ok(Some(address));
        }

        let url = format!(
            "{}/reverse?lat={}&lon={}&format=json&accept-language={}",
            self.base_url,
            coordinates.latitude,
            coordinates.longitude,
            urlencoding::encode(&self.language)
        );
        let reverse: NominatimReverse = self.get_json(&url).await?;

        if let Some(address) = &reverse.display_name {
            self.remember(&key, address.clone()).await;
        }
        Ok(reverse.display_name)
    }
}

/// Resolves user input to a location, degrading to a fixed fallback
pub struct LocationResolver {
    geocoder: Arc<dyn Geocoder>,
    fallback: UserLocation,
}

impl LocationResolver {
    pub fn new(geocoder: Arc<dyn Geocoder>, fallback: UserLocation) -> Self {
        Self { geocoder, fallback }
    }

    #[must_use]
    pub fn fallback(&self) -> &UserLocation {
        &self.fallback
    }

    /// Resolve coordinates or an address.
    ///
    /// Coordinates always resolve; the address is best effort. An address
    /// with no match is an error.
    pub async fn resolve(&self, input: LocationInput) -> Result<UserLocation> {
        debug!("Resolving location input: {:?}", input);

        match input {
            LocationInput::Coordinates(latitude, longitude) => {
                validate_coordinates(latitude, longitude)?;
                Ok(self
                    .label_coordinates(Coordinates::new(latitude, longitude))
                    .await)
            }
            LocationInput::Address(address) => {
                let address = address.trim();
                if address.is_empty() {
                    return Err(WalkError::validation("주소를 입력해 주세요."));
                }
                self.geocoder
                    .geocode(address)
                    .await?
                    .ok_or_else(|| WalkError::geocoding(format!("Location not found: {address}")))
            }
        }
    }

    /// Location from a device report; failures fall back with a notice
    pub async fn from_device(&self, position: DevicePosition) -> ResolvedLocation {
        let fix = match (position.error_code, position.latitude, position.longitude) {
            (None, Some(latitude), Some(longitude))
                if validate_coordinates(latitude, longitude).is_ok() =>
            {
                Ok(Coordinates::new(latitude, longitude))
            }
            (Some(code), _, _) => Err(GeolocationFailure::from_code(code)),
            _ => Err(GeolocationFailure::PositionUnavailable),
        };

        match fix {
            Ok(coordinates) => ResolvedLocation {
                location: self.label_coordinates(coordinates).await,
                is_fallback: false,
                notice: None,
            },
            Err(failure) => {
                warn!(
                    "Device position failed with code {}, using fallback location",
                    failure.code()
                );
                ResolvedLocation {
                    location: self.fallback.clone(),
                    is_fallback: true,
                    notice: Some(failure.message(&self.fallback.address)),
                }
            }
        }
    }

    async fn label_coordinates(&self, coordinates: Coordinates) -> UserLocation {
        match self.geocoder.reverse(coordinates).await {
            Ok(Some(address)) => {
                UserLocation::new(coordinates.latitude, coordinates.longitude, address)
            }
            Ok(None) => {
                debug!("No reverse geocoding result, using coordinates as name");
                UserLocation::from_coordinates(coordinates)
            }
            Err(e) => {
                debug!("Reverse geocoding failed: {}, using coordinates as name", e);
                UserLocation::from_coordinates(coordinates)
            }
        }
    }
}

pub(crate) fn validate_coordinates(latitude: f64, longitude: f64) -> Result<()> {
    if !Coordinates::new(latitude, longitude).is_valid() {
        return Err(WalkError::validation(format!(
            "좌표 범위를 벗어났습니다: {latitude}, {longitude}"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    struct FixedGeocoder {
        known: Option<UserLocation>,
        reverse: Result<Option<String>>,
    }

    #[async_trait]
    impl Geocoder for FixedGeocoder {
        async fn geocode(&self, _address: &str) -> Result<Option<UserLocation>> {
            Ok(self.known.clone())
        }

        async fn reverse(&self, _coordinates: Coordinates) -> Result<Option<String>> {
            match &self.reverse {
                Ok(address) => Ok(address.clone()),
                Err(_) => Err(WalkError::geocoding("offline")),
            }
        }
    }

    fn resolver(known: Option<UserLocation>, reverse: Result<Option<String>>) -> LocationResolver {
        LocationResolver::new(
            Arc::new(FixedGeocoder { known, reverse }),
            UserLocation::new(37.5665, 126.9780, "서울특별시청"),
        )
    }

    #[rstest]
    #[case(1, GeolocationFailure::PermissionDenied)]
    #[case(2, GeolocationFailure::PositionUnavailable)]
    #[case(3, GeolocationFailure::Timeout)]
    #[case(42, GeolocationFailure::PositionUnavailable)]
    fn test_failure_codes(#[case] code: u16, #[case] expected: GeolocationFailure) {
        assert_eq!(GeolocationFailure::from_code(code), expected);
    }

    #[rstest]
    #[case(1, "권한")]
    #[case(2, "확인할 수 없습니다")]
    #[case(3, "시간이 초과")]
    #[tokio::test]
    async fn test_device_failure_falls_back(#[case] code: u16, #[case] phrase: &str) {
        let resolver = resolver(None, Ok(None));
        let resolved = resolver.from_device(DevicePosition::failed(code)).await;

        assert!(resolved.is_fallback);
        assert_eq!(resolved.location.latitude, 37.5665);
        assert_eq!(resolved.location.longitude, 126.9780);
        let notice = resolved.notice.unwrap();
        assert!(notice.contains(phrase), "{notice}");
        assert!(notice.contains("서울특별시청"));
    }

    #[tokio::test]
    async fn test_device_fix_is_reverse_geocoded() {
        let resolver = resolver(None, Ok(Some("서울 마포구 망원동".to_string())));
        let resolved = resolver.from_device(DevicePosition::fix(37.556, 126.901)).await;

        assert!(!resolved.is_fallback);
        assert!(resolved.notice.is_none());
        assert_eq!(resolved.location.address, "서울 마포구 망원동");
    }

    #[tokio::test]
    async fn test_reverse_failure_uses_coordinate_label() {
        let resolver = resolver(None, Err(WalkError::geocoding("offline")));
        let location = resolver
            .resolve(LocationInput::Coordinates(37.5, 127.0))
            .await
            .unwrap();
        assert_eq!(location.address, "37.5000, 127.0000");
    }

    #[tokio::test]
    async fn test_unknown_address_is_an_error() {
        let resolver = resolver(None, Ok(None));
        let err = resolver
            .resolve(LocationInput::Address("없는 주소".to_string()))
            .await
            .unwrap_err();
        assert!(matches!(err, WalkError::Geocoding { .. }));
    }

    #[tokio::test]
    async fn test_known_address() {
        let gangnam = UserLocation::new(37.4979, 127.0276, "강남역");
        let resolver = resolver(Some(gangnam.clone()), Ok(None));
        let location = resolver
            .resolve(LocationInput::Address(" 강남역 ".to_string()))
            .await
            .unwrap();
        assert_eq!(location, gangnam);
    }

    #[tokio::test]
    async fn test_out_of_range_coordinates_rejected() {
        let resolver = resolver(None, Ok(None));
        let err = resolver
            .resolve(LocationInput::Coordinates(123.0, 127.0))
            .await
            .unwrap_err();
        assert!(matches!(err, WalkError::Validation { .. }));
    }
}
