pub mod metrics;
pub mod paragraphs;
pub mod prompts;
pub mod providers;
pub mod story;

pub use story::StoryService;
