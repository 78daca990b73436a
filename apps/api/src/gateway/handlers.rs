//! Axum route handlers for the AI gateway.

use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};
use tracing::warn;

use crate::ai::AiContext;
use crate::errors::AppError;
use crate::gateway::{handle, AiResponse, GatewayRequest};
use crate::state::AppState;

/// POST /api/ai
pub async fn handle_ai(
    State(state): State<AppState>,
    body: Result<Json<GatewayRequest>, JsonRejection>,
) -> Result<Json<AiResponse>, AppError> {
    let Json(request) = body.map_err(|rejection| {
        warn!(error = %rejection, "rejected AI request body");
        AppError::Validation("Invalid AI request body.".to_string())
    })?;

    let ai = AiContext::new(state.provider.clone(), request.config);
    let response = handle(&ai, &request.action, request.payload).await?;
    Ok(Json(response))
}
