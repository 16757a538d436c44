//! Wire types for the story endpoints.
//!
//! Field names are camelCase to match the browser client. Request bodies are
//! deliberately loose (counts may arrive as numbers or numeric strings from
//! form inputs) and are tightened into validated parameter structs before
//! reaching the service layer.

use serde::{de, Deserialize, Deserializer, Serialize};
use serde_json::Value;
use service_core::error::AppError;
use validator::Validate;

const MISSING_PARAMETERS: &str = "Missing required parameters";

// ============================================================================
// generate-story
// ============================================================================

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateStoryRequest {
    #[serde(default)]
    pub genre: Option<String>,
    #[serde(default, deserialize_with = "lenient_u32")]
    pub characters: Option<u32>,
    #[serde(default, deserialize_with = "lenient_u32")]
    pub paragraphs: Option<u32>,
    #[serde(default)]
    pub character_names: Option<Vec<String>>,
}

/// Story parameters after presence checks.
#[derive(Debug, Clone, PartialEq, Eq, Validate)]
pub struct StoryParams {
    #[validate(length(min = 1, max = 64, message = "Genre must be 1-64 characters"))]
    pub genre: String,
    #[validate(range(min = 1, max = 10, message = "Characters must be between 1 and 10"))]
    pub characters: u32,
    #[validate(range(min = 1, max = 10, message = "Paragraphs must be between 1 and 10"))]
    pub paragraphs: u32,
    #[validate(length(max = 10, message = "At most 10 character names are allowed"))]
    pub character_names: Vec<String>,
}

impl GenerateStoryRequest {
    /// Zero counts and blank genres are treated as missing.
    pub fn into_params(self) -> Result<StoryParams, AppError> {
        let genre = self
            .genre
            .map(|g| g.trim().to_string())
            .filter(|g| !g.is_empty());
        let characters = self.characters.filter(|n| *n > 0);
        let paragraphs = self.paragraphs.filter(|n| *n > 0);

        let (Some(genre), Some(characters), Some(paragraphs)) = (genre, characters, paragraphs)
        else {
            return Err(AppError::BadRequest(anyhow::anyhow!(MISSING_PARAMETERS)));
        };

        let character_names = self
            .character_names
            .unwrap_or_default()
            .into_iter()
            .map(|name| name.trim().to_string())
            .filter(|name| !name.is_empty())
            .collect();

        let params = StoryParams {
            genre,
            characters,
            paragraphs,
            character_names,
        };
        params.validate()?;
        Ok(params)
    }
}

#[derive(Debug, Serialize)]
pub struct GenerateStoryResponse {
    pub success: bool,
    pub story: Story,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Story {
    pub summary: String,
    pub paragraphs: Vec<String>,
    pub image_prompts: Vec<ImagePrompt>,
    pub metadata: StoryMetadata,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StoryMetadata {
    pub genre: String,
    pub characters: u32,
    /// Paragraphs actually produced, which may be fewer than requested.
    pub paragraphs: usize,
    pub character_names: Vec<String>,
}

/// Scene description for one paragraph, round-tripped through the client
/// between generate-story and generate-images.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImagePrompt {
    pub paragraph_index: usize,
    pub prompt: String,
    #[serde(default)]
    pub content: String,
}

// ============================================================================
// generate-images
// ============================================================================

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateImagesRequest {
    #[serde(default)]
    pub image_prompts: Option<Value>,
}

/// One image request per prompt, so the batch is bounded like a story.
#[derive(Debug, Validate)]
struct ImagePromptBatch {
    #[validate(length(max = 10, message = "At most 10 image prompts are allowed"))]
    prompts: Vec<ImagePrompt>,
}

impl GenerateImagesRequest {
    pub fn into_prompts(self) -> Result<Vec<ImagePrompt>, AppError> {
        let invalid = || AppError::BadRequest(anyhow::anyhow!("Invalid image prompts"));

        let prompts = match self.image_prompts {
            Some(value @ Value::Array(_)) => serde_json::from_value(value).map_err(|e| {
                tracing::debug!(error = %e, "Rejected malformed image prompt");
                invalid()
            })?,
            _ => return Err(invalid()),
        };

        let batch = ImagePromptBatch { prompts };
        batch.validate()?;
        Ok(batch.prompts)
    }
}

#[derive(Debug, Serialize)]
pub struct GenerateImagesResponse {
    pub success: bool,
    pub images: Vec<Illustration>,
}

/// Outcome of illustrating one paragraph. `error` is set when the image is a
/// fallback placeholder.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Illustration {
    pub paragraph_index: usize,
    pub image_url: String,
    pub prompt: String,
    pub alt_text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl Illustration {
    pub fn is_fallback(&self) -> bool {
        self.error.is_some()
    }
}

// ============================================================================
// edit-story
// ============================================================================

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EditStoryRequest {
    #[serde(default)]
    pub original_story: Option<String>,
    #[serde(default)]
    pub edit_instructions: Option<String>,
    #[serde(default, deserialize_with = "lenient_u32")]
    pub paragraph_index: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditParams {
    pub original: String,
    pub instructions: String,
    pub paragraph_index: Option<u32>,
}

impl EditStoryRequest {
    pub fn into_params(self) -> Result<EditParams, AppError> {
        let non_blank = |s: Option<String>| s.filter(|s| !s.trim().is_empty());

        match (
            non_blank(self.original_story),
            non_blank(self.edit_instructions),
        ) {
            (Some(original), Some(instructions)) => Ok(EditParams {
                original,
                instructions,
                paragraph_index: self.paragraph_index,
            }),
            _ => Err(AppError::BadRequest(anyhow::anyhow!(MISSING_PARAMETERS))),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EditStoryResponse {
    pub success: bool,
    pub edited_paragraph: String,
    pub paragraph_index: Option<u32>,
}

/// Accept a non-negative integer given either as a JSON number or as a
/// numeric string. `null` and blank strings mean absent.
fn lenient_u32<'de, D>(deserializer: D) -> Result<Option<u32>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Number(n)) => n
            .as_u64()
            .and_then(|n| u32::try_from(n).ok())
            .map(Some)
            .ok_or_else(|| de::Error::custom(format!("expected a non-negative integer, got {}", n))),
        Some(Value::String(s)) => {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                return Ok(None);
            }
            trimmed
                .parse::<u32>()
                .map(Some)
                .map_err(|_| de::Error::custom(format!("expected a number, got \"{}\"", s)))
        }
        Some(other) => Err(de::Error::custom(format!(
            "expected a number, got {}",
            other
        ))),
    }
}
