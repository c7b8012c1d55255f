//! Data models for the walkpath service
//!
//! This module contains the core domain models organized by concern:
//! - Location: Geographic coordinates and the user's resolved position
//! - Profile: The user's fitness profile and walking goal
//! - Path: Raw walking path rows and the normalized view model
//! - Market: Traditional market rows joined to paths by distance
//! - Health: Health checkup rows driving the exercise advisor

pub mod health;
pub mod location;
pub mod market;
pub mod path;
pub mod profile;

// Re-export all public types for convenient access
pub use health::{DEFAULT_AGE, HealthProfile};
pub use location::{Coordinates, UserLocation};
pub use market::{NearbyMarket, TraditionalMarket};
pub use path::{Difficulty, PathLength, WalkingPath, WalkingPathRecord};
pub use profile::{FitnessLevel, UserProfile, WalkingGoal};
