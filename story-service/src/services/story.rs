//! Story orchestration: prompt building, paragraph splitting and the
//! per-paragraph illustration fan-out.

use super::metrics;
use super::paragraphs::split_paragraphs;
use super::prompts;
use super::providers::{
    GenerationParams, ImageParams, ImageProvider, ProviderError, ProviderResponse, TextProvider,
};
use crate::dtos::{EditParams, ImagePrompt, Illustration, Story, StoryMetadata, StoryParams};
use futures::future::join_all;
use std::sync::Arc;
use std::time::Instant;

const STORY_PARAMS: GenerationParams = GenerationParams {
    temperature: Some(0.8),
    top_p: Some(0.9),
    max_tokens: Some(2000),
};

const SUMMARY_PARAMS: GenerationParams = GenerationParams {
    temperature: Some(0.7),
    top_p: Some(0.9),
    max_tokens: Some(150),
};

const EDIT_PARAMS: GenerationParams = GenerationParams {
    temperature: Some(0.7),
    top_p: Some(0.9),
    max_tokens: Some(500),
};

/// Placeholder shown when a paragraph's illustration could not be rendered.
pub fn fallback_image_url(position: usize) -> String {
    format!("https://picsum.photos/800/600?random={}&blur=2", position)
}

pub struct StoryService {
    text_provider: Arc<dyn TextProvider>,
    image_provider: Option<Arc<dyn ImageProvider>>,
    image_params: ImageParams,
}

impl StoryService {
    pub fn new(
        text_provider: Arc<dyn TextProvider>,
        image_provider: Option<Arc<dyn ImageProvider>>,
    ) -> Self {
        Self {
            text_provider,
            image_provider,
            image_params: ImageParams::default(),
        }
    }

    pub fn text_provider(&self) -> &Arc<dyn TextProvider> {
        &self.text_provider
    }

    pub fn image_provider(&self) -> Option<&Arc<dyn ImageProvider>> {
        self.image_provider.as_ref()
    }

    /// Write a story and its teaser, then derive one scene prompt per paragraph.
    ///
    /// The story and summary requests are independent and run concurrently;
    /// either failing fails the whole call.
    #[tracing::instrument(skip(self, params), fields(genre = %params.genre, requested = params.paragraphs))]
    pub async fn generate_story(&self, params: &StoryParams) -> Result<Story, ProviderError> {
        let story_prompt = prompts::story_prompt(
            &params.genre,
            params.characters,
            &params.character_names,
            params.paragraphs,
        );
        let summary_prompt = prompts::summary_prompt(&params.genre);

        let (story, summary) = tokio::try_join!(
            self.complete("story", &story_prompt, &STORY_PARAMS),
            self.complete("summary", &summary_prompt, &SUMMARY_PARAMS),
        )?;

        let paragraphs = split_paragraphs(&story.text, params.paragraphs as usize);
        if paragraphs.len() < params.paragraphs as usize {
            tracing::warn!(
                produced = paragraphs.len(),
                requested = params.paragraphs,
                "Story came back shorter than requested"
            );
        }

        let image_prompts = paragraphs
            .iter()
            .enumerate()
            .map(|(index, paragraph)| ImagePrompt {
                paragraph_index: index,
                prompt: prompts::scene_prompt(&params.genre, paragraph),
                content: paragraph.clone(),
            })
            .collect();

        metrics::record_story_generated(paragraphs.len());
        tracing::info!(paragraphs = paragraphs.len(), "Story generated");

        Ok(Story {
            summary: summary.text.trim().to_string(),
            metadata: StoryMetadata {
                genre: params.genre.clone(),
                characters: params.characters,
                paragraphs: paragraphs.len(),
                character_names: params.character_names.clone(),
            },
            paragraphs,
            image_prompts,
        })
    }

    /// Illustrate every prompt concurrently, in input order.
    ///
    /// Returns `None` when no image provider is configured. A failed render
    /// becomes a fallback illustration for that position and leaves the rest
    /// intact, so a configured provider always yields one entry per prompt.
    #[tracing::instrument(skip(self, prompts), fields(count = prompts.len()))]
    pub async fn generate_images(&self, prompts: &[ImagePrompt]) -> Option<Vec<Illustration>> {
        let provider = self.image_provider.as_deref()?;

        tracing::info!("Generating {} images", prompts.len());

        let illustrations = join_all(
            prompts
                .iter()
                .enumerate()
                .map(|(position, prompt)| self.illustrate(provider, position, prompt)),
        )
        .await;

        let fallbacks = illustrations.iter().filter(|i| i.is_fallback()).count();
        tracing::info!(
            generated = illustrations.len() - fallbacks,
            fallbacks,
            "Image generation finished"
        );

        Some(illustrations)
    }

    /// Rewrite one paragraph according to the user's instructions.
    #[tracing::instrument(skip(self, params), fields(paragraph_index = ?params.paragraph_index))]
    pub async fn edit_paragraph(&self, params: &EditParams) -> Result<String, ProviderError> {
        let prompt = prompts::edit_prompt(&params.original, &params.instructions);
        let response = self.complete("edit", &prompt, &EDIT_PARAMS).await?;
        Ok(response.text.trim().to_string())
    }

    async fn complete(
        &self,
        operation: &'static str,
        prompt: &str,
        params: &GenerationParams,
    ) -> Result<ProviderResponse, ProviderError> {
        let start = Instant::now();
        let result = self.text_provider.generate(prompt, params).await;

        metrics::record_provider_call(
            self.text_provider.name(),
            operation,
            start.elapsed(),
            result.as_ref().err(),
        );

        match &result {
            Ok(response) => tracing::debug!(
                operation,
                input_tokens = response.input_tokens,
                output_tokens = response.output_tokens,
                finish_reason = ?response.finish_reason,
                "Text generation complete"
            ),
            Err(e) => tracing::warn!(operation, error = %e, "Text generation failed"),
        }

        result
    }

    async fn illustrate(
        &self,
        provider: &dyn ImageProvider,
        position: usize,
        prompt: &ImagePrompt,
    ) -> Illustration {
        let request = prompts::illustration_prompt(&prompt.prompt);
        let start = Instant::now();
        let result = provider.generate(&request, &self.image_params).await;

        metrics::record_provider_call(
            provider.name(),
            "image",
            start.elapsed(),
            result.as_ref().err(),
        );

        match result {
            Ok(image) => {
                metrics::record_illustration("generated");
                Illustration {
                    paragraph_index: prompt.paragraph_index,
                    image_url: image.data_url(),
                    prompt: prompt.prompt.clone(),
                    alt_text: format!("AI-generated image for paragraph {}", position + 1),
                    seed: image.seed,
                    error: None,
                }
            }
            Err(e) => {
                tracing::error!(
                    position,
                    paragraph_index = prompt.paragraph_index,
                    error = %e,
                    "Error generating image, using fallback"
                );
                metrics::record_illustration("fallback");
                Illustration {
                    paragraph_index: prompt.paragraph_index,
                    image_url: fallback_image_url(position),
                    prompt: prompt.prompt.clone(),
                    alt_text: format!("Fallback image for paragraph {}", position + 1),
                    seed: None,
                    error: Some(e.to_string()),
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::providers::mock::{MockImageProvider, MockTextProvider};

    const STORY_TEXT: &str = "The map was older than the town.\n\n\
        Mara followed it into the hills.\n\n\
        At the summit she found her grandmother's name carved in stone.";

    fn params(paragraphs: u32) -> StoryParams {
        StoryParams {
            genre: "adventure".to_string(),
            characters: 2,
            paragraphs,
            character_names: vec![],
        }
    }

    fn text_provider() -> Arc<MockTextProvider> {
        Arc::new(
            MockTextProvider::new(true)
                .with_reply("brief, engaging summary", "  A quest begins.  ")
                .with_reply("Write a creative", STORY_TEXT),
        )
    }

    fn prompt(index: usize, text: &str) -> ImagePrompt {
        ImagePrompt {
            paragraph_index: index,
            prompt: text.to_string(),
            content: String::new(),
        }
    }

    #[tokio::test]
    async fn story_has_one_prompt_per_paragraph() {
        let service = StoryService::new(text_provider(), None);

        let story = service.generate_story(&params(3)).await.unwrap();

        assert_eq!(story.summary, "A quest begins.");
        assert_eq!(story.paragraphs.len(), 3);
        assert_eq!(story.metadata.paragraphs, 3);
        assert_eq!(story.image_prompts.len(), 3);
        for (i, p) in story.image_prompts.iter().enumerate() {
            assert_eq!(p.paragraph_index, i);
            assert_eq!(p.content, story.paragraphs[i]);
            assert!(p.prompt.starts_with("A cinematic scene from a adventure story: "));
        }
    }

    #[tokio::test]
    async fn story_is_capped_at_requested_paragraphs() {
        let service = StoryService::new(text_provider(), None);

        let story = service.generate_story(&params(2)).await.unwrap();

        assert_eq!(story.paragraphs.len(), 2);
        assert_eq!(story.metadata.paragraphs, 2);
    }

    #[tokio::test]
    async fn short_story_reports_actual_count() {
        let service = StoryService::new(text_provider(), None);

        let story = service.generate_story(&params(5)).await.unwrap();

        assert_eq!(story.paragraphs.len(), 3);
        assert_eq!(story.metadata.paragraphs, 3);
    }

    #[tokio::test]
    async fn story_prompt_uses_character_names() {
        let provider = text_provider();
        let service = StoryService::new(provider.clone(), None);
        let mut params = params(3);
        params.character_names = vec!["Mara".to_string(), "Ilse".to_string()];

        service.generate_story(&params).await.unwrap();

        let prompts = provider.recorded_prompts();
        assert_eq!(prompts.len(), 2);
        assert!(prompts
            .iter()
            .any(|p| p.contains("The main characters are: Mara, Ilse.")));
    }

    #[tokio::test]
    async fn summary_failure_fails_story() {
        let provider = Arc::new(
            MockTextProvider::new(true)
                .with_failure("brief, engaging summary", ProviderError::RateLimited)
                .with_reply("Write a creative", STORY_TEXT),
        );
        let service = StoryService::new(provider, None);

        let err = service.generate_story(&params(3)).await.unwrap_err();
        assert_eq!(err, ProviderError::RateLimited);
    }

    #[tokio::test]
    async fn images_require_provider() {
        let service = StoryService::new(text_provider(), None);

        assert!(service
            .generate_images(&[prompt(0, "a scene")])
            .await
            .is_none());
    }

    #[tokio::test]
    async fn failed_image_falls_back_in_place() {
        let images = Arc::new(MockImageProvider::new(true).failing_on("stormy harbour"));
        let service = StoryService::new(text_provider(), Some(images.clone()));

        let prompts = vec![
            prompt(0, "a quiet village"),
            prompt(1, "a stormy harbour"),
            prompt(2, "a mountain pass"),
        ];
        let illustrations = service.generate_images(&prompts).await.unwrap();

        assert_eq!(images.call_count(), 3);
        assert_eq!(illustrations.len(), 3);

        assert_eq!(illustrations[0].image_url, "data:image/png;base64,bW9jaw==");
        assert_eq!(illustrations[0].alt_text, "AI-generated image for paragraph 1");
        assert!(illustrations[0].error.is_none());

        assert_eq!(illustrations[1].paragraph_index, 1);
        assert_eq!(illustrations[1].image_url, fallback_image_url(1));
        assert_eq!(illustrations[1].alt_text, "Fallback image for paragraph 2");
        assert_eq!(
            illustrations[1].error.as_deref(),
            Some("API error: Mock image failure")
        );
        assert!(illustrations[1].seed.is_none());

        assert_eq!(illustrations[2].paragraph_index, 2);
        assert!(!illustrations[2].is_fallback());
    }

    #[tokio::test]
    async fn empty_batch_is_empty() {
        let service = StoryService::new(text_provider(), Some(Arc::new(MockImageProvider::new(true))));
        assert!(service.generate_images(&[]).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn edit_trims_output() {
        let provider = Arc::new(
            MockTextProvider::new(true).with_reply("Edit instructions", "\n  The door groaned.  \n"),
        );
        let service = StoryService::new(provider, None);

        let edited = service
            .edit_paragraph(&EditParams {
                original: "The door creaked.".to_string(),
                instructions: "Make it heavier".to_string(),
                paragraph_index: Some(0),
            })
            .await
            .unwrap();
        assert_eq!(edited, "The door groaned.");
    }

    #[test]
    fn fallback_url_is_positional() {
        assert_eq!(
            fallback_image_url(3),
            "https://picsum.photos/800/600?random=3&blur=2"
        );
    }
}
