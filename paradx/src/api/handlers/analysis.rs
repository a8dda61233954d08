//! Face photo and voice clip analysis.
//!
//! Both handlers persist the upload, turn it into a bounded base64 snippet, ask the paralysis
//! model about it and render the result page. Inference failures never surface as errors: the
//! client returns an empty reply and the page shows a fallback message instead.

use axum::{
    body::Bytes,
    extract::{
        Multipart, State,
        multipart::MultipartError,
    },
    http::StatusCode,
    response::{IntoResponse, Response},
};

use crate::{
    AppState,
    api::models::{pages::RedirectResponse, users::CurrentUser},
    errors::Error,
    media::EncodedSnippet,
    render::ResultView,
};

pub const IMAGE_PROCESSING_FAILED: &str = "Image processing failed.";
pub const IMAGE_NO_REPLY: &str = "⚠️ AI could not analyze the image. Try again.";
pub const VOICE_NO_REPLY: &str = "⚠️ AI could not analyze the voice.";

const AI_ESTIMATED: &str = "AI Estimated";
const NOT_AVAILABLE: &str = "N/A";

fn image_prompt(snippet: &EncodedSnippet) -> String {
    format!(
        "Analyze the following face image for paralysis signs. Metadata: width={}, height={}. BASE64_SNIPPET: {}",
        snippet.width().unwrap_or_default(),
        snippet.height().unwrap_or_default(),
        snippet.text
    )
}

fn voice_prompt(snippet: &EncodedSnippet) -> String {
    format!(
        "Analyze this voice for slurred or impaired speech possibly due to paralysis. AUDIO_SNIPPET: {}",
        snippet.text
    )
}

fn or_fallback(reply: String, fallback: &str) -> String {
    if reply.is_empty() { fallback.to_string() } else { reply }
}

fn multipart_error(e: MultipartError) -> Error {
    if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
        Error::PayloadTooLarge {
            message: "Upload exceeds the size limit".to_string(),
        }
    } else {
        Error::BadRequest { message: e.body_text() }
    }
}

/// Client filename and contents of the file part called `field_name`.
///
/// `None` when the part is missing, or when the browser sent an empty part because no file
/// was chosen.
async fn read_upload(multipart: &mut Multipart, field_name: &str) -> Result<Option<(String, Bytes)>, Error> {
    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        if field.name() != Some(field_name) {
            continue;
        }
        let file_name = field.file_name().unwrap_or_default().to_string();
        let bytes = field.bytes().await.map_err(multipart_error)?;
        if file_name.is_empty() && bytes.is_empty() {
            return Ok(None);
        }
        return Ok(Some((file_name, bytes)));
    }
    Ok(None)
}

/// Analyze an uploaded face photo
#[tracing::instrument(skip_all)]
pub async fn upload(State(state): State<AppState>, user: Option<CurrentUser>, mut multipart: Multipart) -> Result<Response, Error> {
    let Some(user) = user else {
        return Ok(RedirectResponse::to("/login").into_response());
    };
    let Some((file_name, bytes)) = read_upload(&mut multipart, "file").await? else {
        return Err(Error::BadRequest {
            message: "No file uploaded".to_string(),
        });
    };

    let stored = state.uploads.save(&bytes, &file_name).await?;

    let encoder = state.encoder.clone();
    let snippet = tokio::task::spawn_blocking(move || encoder.encode_image(&bytes))
        .await
        .map_err(|e| Error::Internal {
            operation: format!("spawn image encoding task: {e}"),
        })?;

    let view = match snippet {
        None => ResultView {
            result_text: IMAGE_PROCESSING_FAILED.to_string(),
            confidence_label: NOT_AVAILABLE.to_string(),
            media_path: Some(stored.public_url()),
        },
        Some(snippet) => {
            tracing::debug!(dimensions = ?snippet.dimensions, snippet_len = snippet.text.len(), "Encoded image");
            let reply = state
                .inference
                .complete(&image_prompt(&snippet), &state.config.inference.paralysis_model)
                .await;
            ResultView {
                result_text: or_fallback(reply, IMAGE_NO_REPLY),
                confidence_label: AI_ESTIMATED.to_string(),
                media_path: Some(stored.public_url()),
            }
        }
    };

    Ok(state.pages.result(&view, Some(&user))?.into_response())
}

/// Analyze an uploaded voice clip
#[tracing::instrument(skip_all)]
pub async fn upload_voice(State(state): State<AppState>, user: Option<CurrentUser>, mut multipart: Multipart) -> Result<Response, Error> {
    let Some(user) = user else {
        return Ok(RedirectResponse::to("/login").into_response());
    };
    let Some((file_name, bytes)) = read_upload(&mut multipart, "voice").await? else {
        return Err(Error::BadRequest {
            message: "No voice file uploaded!".to_string(),
        });
    };

    state.uploads.save(&bytes, &file_name).await?;

    let snippet = state.encoder.encode_audio(&bytes);
    let reply = state
        .inference
        .complete(&voice_prompt(&snippet), &state.config.inference.paralysis_model)
        .await;

    let view = ResultView {
        result_text: or_fallback(reply, VOICE_NO_REPLY),
        confidence_label: AI_ESTIMATED.to_string(),
        media_path: None,
    };
    Ok(state.pages.result(&view, Some(&user))?.into_response())
}
