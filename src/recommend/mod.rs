//! Walking-path recommendation
//!
//! Raw backend rows are normalized into view models, filtered by distance
//! and by the user's profile, then explained in Korean.

pub mod eligibility;
pub mod food;
pub mod normalize;
pub mod reason;
mod service;

pub use service::{RecommendationService, Recommendations, SearchOptions};
