//! HTTP handlers for the story service.

pub mod fallback;
pub mod health;
pub mod story;

pub use fallback::fallback;
pub use health::{health_check, metrics_endpoint, readiness_check};
pub use story::{edit_story, generate_images, generate_story};
