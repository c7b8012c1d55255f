//! Configuration management for walkpath
//!
//! Handles loading configuration from files, environment variables,
//! and provides validation for all configuration settings.

use crate::WalkError;
use crate::models::UserLocation;
use anyhow::{Context, Result};
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Root configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WalkConfig {
    /// Hosted data backend
    #[serde(default)]
    pub backend: BackendConfig,
    /// Address lookup service
    #[serde(default)]
    pub geocoding: GeocodingConfig,
    /// Hosted text-to-speech
    #[serde(default)]
    pub speech: SpeechConfig,
    /// Cache configuration
    #[serde(default)]
    pub cache: CacheConfig,
    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
    /// Search defaults
    #[serde(default)]
    pub defaults: DefaultsConfig,
}

/// Backend REST settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackendConfig {
    /// Project URL, e.g. `https://xyz.supabase.co`
    #[serde(default = "default_backend_base_url")]
    pub base_url: String,
    /// Anonymous API key sent as `apikey` and bearer token
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default = "default_paths_table")]
    pub paths_table: String,
    #[serde(default = "default_markets_table")]
    pub markets_table: String,
    #[serde(default = "default_health_table")]
    pub health_table: String,
    /// Row cap for path fetches (0 = unlimited)
    #[serde(default = "default_fetch_limit")]
    pub fetch_limit: u32,
    /// Request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u32,
    /// Maximum number of retries for transient failures
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
}

/// Geocoding settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeocodingConfig {
    #[serde(default = "default_geocoding_base_url")]
    pub base_url: String,
    /// Nominatim requires an identifying user agent
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
    #[serde(default = "default_geocoding_language")]
    pub language: String,
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u32,
}

/// Hosted speech settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpeechConfig {
    #[serde(default = "default_speech_base_url")]
    pub base_url: String,
    /// Narration is disabled without a key
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default = "default_speech_language")]
    pub language_code: String,
    #[serde(default = "default_speech_voice")]
    pub voice: String,
    #[serde(default = "default_speaking_rate")]
    pub speaking_rate: f64,
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u32,
}

/// Cache configuration settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Cache directory location
    #[serde(default = "default_cache_location")]
    pub location: String,
    /// How long cached lookups stay fresh
    #[serde(default = "default_cache_ttl")]
    pub ttl_hours: u32,
}

impl CacheConfig {
    #[must_use]
    pub fn ttl(&self) -> Duration {
        Duration::from_secs(u64::from(self.ttl_hours) * 3600)
    }
}

/// Logging configuration settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (error, warn, info, debug, trace)
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Log format (pretty or json)
    #[serde(default = "default_log_format")]
    pub format: String,
    /// OTLP/HTTP collector endpoint; tracing export is off when unset
    #[serde(default)]
    pub otlp_endpoint: Option<String>,
}

/// Search defaults
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DefaultsConfig {
    /// Search radius in kilometers
    #[serde(default = "default_search_radius")]
    pub search_radius_km: f64,
    /// Number of cards returned
    #[serde(default = "default_result_limit")]
    pub result_limit: u32,
    /// Radius for attaching traditional markets to a path
    #[serde(default = "default_market_radius")]
    pub market_radius_km: f64,
    /// Markets attached per path
    #[serde(default = "default_max_markets")]
    pub max_markets: u32,
    /// Fallback position when the device cannot locate the user
    #[serde(default = "default_latitude")]
    pub latitude: f64,
    #[serde(default = "default_longitude")]
    pub longitude: f64,
    #[serde(default = "default_address")]
    pub address: String,
}

// Default value functions
fn default_backend_base_url() -> String {
    "http://localhost:54321".to_string()
}

fn default_paths_table() -> String {
    "walking_paths".to_string()
}

fn default_markets_table() -> String {
    "traditional_markets".to_string()
}

fn default_health_table() -> String {
    "health_profiles".to_string()
}

fn default_fetch_limit() -> u32 {
    500
}

fn default_timeout() -> u32 {
    30
}

fn default_max_retries() -> u32 {
    2
}

fn default_geocoding_base_url() -> String {
    "https://nominatim.openstreetmap.org".to_string()
}

fn default_user_agent() -> String {
    format!("walkpath/{}", crate::VERSION)
}

fn default_geocoding_language() -> String {
    "ko".to_string()
}

fn default_cache_ttl() -> u32 {
    24 * 7
}

fn default_speech_base_url() -> String {
    "https://texttospeech.googleapis.com/v1/text:synthesize".to_string()
}

fn default_speech_language() -> String {
    "ko-KR".to_string()
}

fn default_speech_voice() -> String {
    "ko-KR-Neural2-A".to_string()
}

fn default_speaking_rate() -> f64 {
    1.0
}

fn default_cache_location() -> String {
    dirs::cache_dir()
        .map(|dir| dir.join("walkpath").to_string_lossy().to_string())
        .unwrap_or_else(|| ".cache/walkpath".to_string())
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

fn default_search_radius() -> f64 {
    5.0
}

fn default_result_limit() -> u32 {
    3
}

fn default_market_radius() -> f64 {
    2.0
}

fn default_max_markets() -> u32 {
    3
}

// Seoul City Hall
fn default_latitude() -> f64 {
    37.5665
}

fn default_longitude() -> f64 {
    126.9780
}

fn default_address() -> String {
    "서울특별시청".to_string()
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            base_url: default_backend_base_url(),
            api_key: None,
            paths_table: default_paths_table(),
            markets_table: default_markets_table(),
            health_table: default_health_table(),
            fetch_limit: default_fetch_limit(),
            timeout_seconds: default_timeout(),
            max_retries: default_max_retries(),
        }
    }
}

impl Default for GeocodingConfig {
    fn default() -> Self {
        Self {
            base_url: default_geocoding_base_url(),
            user_agent: default_user_agent(),
            language: default_geocoding_language(),
            timeout_seconds: default_timeout(),
        }
    }
}

impl Default for SpeechConfig {
    fn default() -> Self {
        Self {
            base_url: default_speech_base_url(),
            api_key: None,
            language_code: default_speech_language(),
            voice: default_speech_voice(),
            speaking_rate: default_speaking_rate(),
            timeout_seconds: default_timeout(),
        }
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            location: default_cache_location(),
            ttl_hours: default_cache_ttl(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
            otlp_endpoint: None,
        }
    }
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        Self {
            search_radius_km: default_search_radius(),
            result_limit: default_result_limit(),
            market_radius_km: default_market_radius(),
            max_markets: default_max_markets(),
            latitude: default_latitude(),
            longitude: default_longitude(),
            address: default_address(),
        }
    }
}

impl Default for WalkConfig {
    fn default() -> Self {
        Self {
            backend: BackendConfig::default(),
            geocoding: GeocodingConfig::default(),
            speech: SpeechConfig::default(),
            cache: CacheConfig::default(),
            logging: LoggingConfig::default(),
            defaults: DefaultsConfig::default(),
        }
    }
}

impl DefaultsConfig {
    /// Position used when the device cannot be located
    #[must_use]
    pub fn fallback_location(&self) -> UserLocation {
        UserLocation::new(self.latitude, self.longitude, self.address.clone())
    }
}

impl WalkConfig {
    /// Load configuration from file and environment variables
    pub fn load() -> Result<Self> {
        Self::load_from_path(None)
    }

    /// Load configuration from specified path
    pub fn load_from_path(config_path: Option<PathBuf>) -> Result<Self> {
        let mut builder = Config::builder();

        // Load from file if path is provided or use default location
        let config_file = config_path.unwrap_or_else(|| {
            Self::get_config_path().unwrap_or_else(|| PathBuf::from("config.toml"))
        });

        if config_file.exists() {
            builder = builder.add_source(
                File::from(config_file.clone())
                    .required(false)
                    .format(config::FileFormat::Toml),
            );
        }

        // Environment overrides, e.g. WALKPATH_BACKEND__API_KEY
        builder = builder.add_source(
            Environment::with_prefix("WALKPATH")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let settings = builder
            .build()
            .with_context(|| "Failed to build configuration")?;

        let mut config: WalkConfig = settings
            .try_deserialize()
            .with_context(|| "Failed to deserialize configuration")?;

        config.apply_defaults();
        config.validate()?;

        Ok(config)
    }

    /// Get the default configuration file path
    #[must_use]
    pub fn get_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("walkpath").join("config.toml"))
    }

    /// Apply default values to blank configuration fields
    pub fn apply_defaults(&mut self) {
        if self.backend.base_url.is_empty() {
            self.backend.base_url = default_backend_base_url();
        }
        if self.backend.timeout_seconds == 0 {
            self.backend.timeout_seconds = default_timeout();
        }
        if self.geocoding.base_url.is_empty() {
            self.geocoding.base_url = default_geocoding_base_url();
        }
        if self.geocoding.user_agent.is_empty() {
            self.geocoding.user_agent = default_user_agent();
        }
        if self.geocoding.timeout_seconds == 0 {
            self.geocoding.timeout_seconds = default_timeout();
        }
        if self.speech.base_url.is_empty() {
            self.speech.base_url = default_speech_base_url();
        }
        if self.speech.timeout_seconds == 0 {
            self.speech.timeout_seconds = default_timeout();
        }
        if self.cache.location.is_empty() {
            self.cache.location = default_cache_location();
        }
        if self.cache.ttl_hours == 0 {
            self.cache.ttl_hours = default_cache_ttl();
        }
        if self.logging.level.is_empty() {
            self.logging.level = default_log_level();
        }
        if self.logging.format.is_empty() {
            self.logging.format = default_log_format();
        }
        if self.defaults.result_limit == 0 {
            self.defaults.result_limit = default_result_limit();
        }
        if self.defaults.search_radius_km <= 0.0 {
            self.defaults.search_radius_km = default_search_radius();
        }
    }

    /// Validate all configuration settings
    pub fn validate(&self) -> Result<()> {
        self.validate_api_keys()?;
        self.validate_numeric_ranges()?;
        self.validate_string_values()?;
        Ok(())
    }

    /// Validate API keys and credentials
    pub fn validate_api_keys(&self) -> Result<()> {
        for (name, key) in [
            ("Backend", &self.backend.api_key),
            ("Speech", &self.speech.api_key),
        ] {
            if let Some(key) = key {
                if key.is_empty() {
                    return Err(WalkError::config(format!(
                        "{name} API key cannot be empty if provided. Either remove it or provide a valid key."
                    ))
                    .into());
                }
                if key.len() < 8 {
                    return Err(WalkError::config(format!(
                        "{name} API key appears to be invalid (too short). Please check your API key."
                    ))
                    .into());
                }
            }
        }
        Ok(())
    }

    /// Validate numeric configuration ranges
    fn validate_numeric_ranges(&self) -> Result<()> {
        for (name, timeout) in [
            ("Backend", self.backend.timeout_seconds),
            ("Geocoding", self.geocoding.timeout_seconds),
            ("Speech", self.speech.timeout_seconds),
        ] {
            if timeout > 300 {
                return Err(
                    WalkError::config(format!("{name} timeout cannot exceed 300 seconds")).into(),
                );
            }
        }

        if self.backend.max_retries > 10 {
            return Err(WalkError::config("Backend max retries cannot exceed 10").into());
        }

        if self.defaults.search_radius_km > 100.0 {
            return Err(WalkError::config("Search radius cannot exceed 100 km").into());
        }

        if self.defaults.market_radius_km < 0.0 || self.defaults.market_radius_km > 20.0 {
            return Err(WalkError::config("Market radius must be between 0 and 20 km").into());
        }

        if self.defaults.result_limit > 50 {
            return Err(WalkError::config("Result limit cannot exceed 50").into());
        }

        if !(-90.0..=90.0).contains(&self.defaults.latitude)
            || !(-180.0..=180.0).contains(&self.defaults.longitude)
        {
            return Err(WalkError::config("Default location is not a valid coordinate").into());
        }

        if !(0.25..=4.0).contains(&self.speech.speaking_rate) {
            return Err(WalkError::config("Speaking rate must be between 0.25 and 4.0").into());
        }

        Ok(())
    }

    /// Validate string configuration values
    fn validate_string_values(&self) -> Result<()> {
        let valid_log_levels = ["error", "warn", "info", "debug", "trace"];
        if !valid_log_levels.contains(&self.logging.level.as_str()) {
            return Err(WalkError::config(format!(
                "Invalid log level '{}'. Must be one of: {}",
                self.logging.level,
                valid_log_levels.join(", ")
            ))
            .into());
        }

        let valid_log_formats = ["pretty", "json"];
        if !valid_log_formats.contains(&self.logging.format.as_str()) {
            return Err(WalkError::config(format!(
                "Invalid log format '{}'. Must be one of: {}",
                self.logging.format,
                valid_log_formats.join(", ")
            ))
            .into());
        }

        for (name, url) in [
            ("Backend", &self.backend.base_url),
            ("Geocoding", &self.geocoding.base_url),
            ("Speech", &self.speech.base_url),
        ] {
            if !url.starts_with("http://") && !url.starts_with("https://") {
                return Err(WalkError::config(format!(
                    "{name} base URL must be a valid HTTP or HTTPS URL"
                ))
                .into());
            }
        }

        Ok(())
    }
}
