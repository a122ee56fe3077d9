//! Free-form conversation with the guide persona.

use axum::{extract::State, http::HeaderMap, Json};
use std::sync::Arc;

use crate::app::AppState;
use crate::domain::chat::{ChatRequest, ChatResponse};
use crate::error::{ApiError, ApiResult};
use crate::middleware::request_id::request_id;
use crate::prompts;

/// Shown in place of a reply when the model gateway fails.
pub const FALLBACK_REPLY: &str = "AI response failed.";

/// POST /chat
///
/// Gateway failures still answer 200 with a fallback reply so the
/// conversation can carry on.
pub async fn chat(
    headers: HeaderMap,
    State(state): State<Arc<AppState>>,
    Json(req): Json<ChatRequest>,
) -> ApiResult<Json<ChatResponse>> {
    let message = req.message.trim();
    if message.is_empty() {
        return Err(ApiError::BadRequest("message must not be empty".to_string()));
    }

    let reply = match state
        .gateway
        .complete(&state.settings.groq_model, &prompts::chat(message))
        .await
    {
        Ok(reply) => reply,
        Err(e) => {
            tracing::error!(
                error = %e,
                request_id = request_id(&headers),
                "Chat completion failed"
            );
            FALLBACK_REPLY.to_string()
        }
    };

    Ok(Json(ChatResponse { reply }))
}
