use crate::dtos::{
    EditStoryRequest, EditStoryResponse, GenerateImagesRequest, GenerateImagesResponse,
    GenerateStoryRequest, GenerateStoryResponse,
};
use crate::startup::AppState;
use axum::{extract::rejection::JsonRejection, extract::State, Json};
use service_core::error::AppError;

#[tracing::instrument(skip(state, payload))]
pub async fn generate_story(
    State(state): State<AppState>,
    payload: Result<Json<GenerateStoryRequest>, JsonRejection>,
) -> Result<Json<GenerateStoryResponse>, AppError> {
    let Json(request) = payload?;
    let params = request.into_params()?;

    let story = state.story.generate_story(&params).await.map_err(|e| {
        tracing::error!(error = %e, "Error generating story");
        AppError::upstream("Failed to generate story", e)
    })?;

    Ok(Json(GenerateStoryResponse {
        success: true,
        story,
    }))
}

#[tracing::instrument(skip(state, payload))]
pub async fn generate_images(
    State(state): State<AppState>,
    payload: Result<Json<GenerateImagesRequest>, JsonRejection>,
) -> Result<Json<GenerateImagesResponse>, AppError> {
    let Json(request) = payload?;
    let prompts = request.into_prompts()?;

    let images = state.story.generate_images(&prompts).await.ok_or_else(|| {
        AppError::BadRequest(anyhow::anyhow!("Stability AI API key not configured"))
    })?;

    Ok(Json(GenerateImagesResponse {
        success: true,
        images,
    }))
}

#[tracing::instrument(skip(state, payload))]
pub async fn edit_story(
    State(state): State<AppState>,
    payload: Result<Json<EditStoryRequest>, JsonRejection>,
) -> Result<Json<EditStoryResponse>, AppError> {
    let Json(request) = payload?;
    let params = request.into_params()?;

    let edited_paragraph = state.story.edit_paragraph(&params).await.map_err(|e| {
        tracing::error!(error = %e, "Error editing story");
        AppError::upstream("Failed to edit story", e)
    })?;

    Ok(Json(EditStoryResponse {
        success: true,
        edited_paragraph,
        paragraph_index: params.paragraph_index,
    }))
}
