use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
    http::StatusCode,
};

use crate::{
    AppState,
    api::models::{
        chat::{ChatRequest, ChatResponse},
        users::CurrentUser,
    },
    chat::{EMPTY_MESSAGE, NO_RESPONSE, REFUSAL},
};

/// Answer a paralysis-related question
#[tracing::instrument(skip_all, fields(username = %current_user.username))]
pub async fn chat(
    State(state): State<AppState>,
    current_user: CurrentUser,
    request: Result<Json<ChatRequest>, JsonRejection>,
) -> (StatusCode, Json<ChatResponse>) {
    // An unreadable body carries no question
    let request = match request {
        Ok(Json(request)) => request,
        Err(rejection) => {
            tracing::debug!(reason = %rejection.body_text(), "Unreadable chat body");
            return (StatusCode::BAD_REQUEST, Json(ChatResponse::new(EMPTY_MESSAGE)));
        }
    };

    let message = request.message.trim();
    if message.is_empty() {
        return (StatusCode::BAD_REQUEST, Json(ChatResponse::new(EMPTY_MESSAGE)));
    }

    if !state.topic_gate.allows(message) {
        tracing::debug!("Refusing off-topic question");
        return (StatusCode::OK, Json(ChatResponse::new(REFUSAL)));
    }

    let reply = state.inference.complete(message, &state.config.inference.chatbot_model).await;
    let reply = if reply.is_empty() { NO_RESPONSE.to_string() } else { reply };

    (StatusCode::OK, Json(ChatResponse { reply }))
}
