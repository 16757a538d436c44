pub mod story;

pub use story::{
    EditParams, EditStoryRequest, EditStoryResponse, GenerateImagesRequest, GenerateImagesResponse,
    GenerateStoryRequest, GenerateStoryResponse, ImagePrompt, Illustration, Story,
    StoryMetadata, StoryParams,
};
