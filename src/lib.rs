//! `walkpath` - Location and health aware walking path recommendations
//!
//! This library provides distance-based path search, profile filtering,
//! Korean recommendation text, exercise intensity advice and the HTTP API
//! that serves them.

pub mod api;
pub mod backend;
pub mod cache;
pub mod config;
pub mod error;
pub mod exercise;
pub mod geo;
pub mod location_resolver;
pub mod models;
pub mod recommend;
pub mod speech;
pub mod telemetry;
pub mod web;

// Re-export core types for public API
pub use backend::{PathDataSource, SupabaseClient};
pub use cache::PersistentCache;
pub use config::WalkConfig;
pub use error::WalkError;
pub use exercise::{ExerciseRecommendation, IntensityTier};
pub use location_resolver::{LocationInput, LocationResolver, NominatimGeocoder};
pub use models::{UserLocation, UserProfile, WalkingPath};
pub use recommend::{RecommendationService, Recommendations, SearchOptions};
pub use speech::Narrator;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Core result type used throughout the library
pub type Result<T> = std::result::Result<T, WalkError>;
