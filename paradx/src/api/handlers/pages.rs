//! Page handlers. Pages behind login redirect anonymous visitors instead of failing.

use axum::{
    extract::State,
    http::HeaderMap,
    response::{IntoResponse, Response},
};

use crate::{
    AppState,
    api::models::{
        pages::{PageResponse, RedirectResponse},
        users::CurrentUser,
    },
    errors::Error,
    flash::Flash,
    render::Page,
};

/// Render `page`, consuming any flash waiting in the request cookies.
pub(crate) fn render_page(state: &AppState, page: Page, user: Option<&CurrentUser>, headers: &HeaderMap) -> Result<PageResponse, Error> {
    let flash = Flash::from_headers(headers);
    let html = state.pages.render(page, user, flash.as_ref())?;
    Ok(PageResponse {
        html,
        consumed_flash: flash.is_some(),
    })
}

/// Render `page` for logged-in users, otherwise redirect to the login page.
fn protected_page(state: &AppState, page: Page, user: Option<CurrentUser>, headers: &HeaderMap) -> Result<Response, Error> {
    match user {
        Some(user) => Ok(render_page(state, page, Some(&user), headers)?.into_response()),
        None => Ok(RedirectResponse::to("/login").into_response()),
    }
}

#[tracing::instrument(skip_all)]
pub async fn landing(State(state): State<AppState>, user: Option<CurrentUser>, headers: HeaderMap) -> Result<PageResponse, Error> {
    render_page(&state, Page::Landing, user.as_ref(), &headers)
}

#[tracing::instrument(skip_all)]
pub async fn register_page(State(state): State<AppState>, user: Option<CurrentUser>, headers: HeaderMap) -> Result<PageResponse, Error> {
    render_page(&state, Page::Register, user.as_ref(), &headers)
}

#[tracing::instrument(skip_all)]
pub async fn login_page(State(state): State<AppState>, user: Option<CurrentUser>, headers: HeaderMap) -> Result<PageResponse, Error> {
    render_page(&state, Page::Login, user.as_ref(), &headers)
}

#[tracing::instrument(skip_all)]
pub async fn dashboard(State(state): State<AppState>, user: Option<CurrentUser>, headers: HeaderMap) -> Result<Response, Error> {
    match user {
        Some(user) => Ok(render_page(&state, Page::Dashboard, Some(&user), &headers)?.into_response()),
        None => Ok(RedirectResponse::to("/login")
            .with_flash(Flash::warning("Please log in to continue."))
            .into_response()),
    }
}

#[tracing::instrument(skip_all)]
pub async fn upload_page(State(state): State<AppState>, user: Option<CurrentUser>, headers: HeaderMap) -> Result<Response, Error> {
    protected_page(&state, Page::Upload, user, &headers)
}

#[tracing::instrument(skip_all)]
pub async fn upload_voice_page(State(state): State<AppState>, user: Option<CurrentUser>, headers: HeaderMap) -> Result<Response, Error> {
    protected_page(&state, Page::UploadVoice, user, &headers)
}

#[tracing::instrument(skip_all)]
pub async fn chatbot(State(state): State<AppState>, user: Option<CurrentUser>, headers: HeaderMap) -> Result<Response, Error> {
    protected_page(&state, Page::Chatbot, user, &headers)
}

#[tracing::instrument(skip_all)]
pub async fn healthz() -> &'static str {
    "OK"
}
