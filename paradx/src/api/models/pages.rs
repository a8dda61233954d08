//! Response models that implement IntoResponse for cleaner handler code

use axum::{
    http::{HeaderMap, HeaderValue, header},
    response::{Html, IntoResponse, Redirect, Response},
};

use crate::flash::Flash;

fn cookie_headers(cookies: Vec<String>) -> HeaderMap {
    let mut headers = HeaderMap::new();
    for cookie in cookies {
        match HeaderValue::from_str(&cookie) {
            Ok(value) => {
                headers.append(header::SET_COOKIE, value);
            }
            Err(e) => tracing::error!("Dropping unrepresentable cookie: {}", e),
        }
    }
    headers
}

/// A rendered page. Rendering consumes any pending flash, so its cookie is expired.
#[derive(Debug)]
pub struct PageResponse {
    pub html: Html<String>,
    pub consumed_flash: bool,
}

impl IntoResponse for PageResponse {
    fn into_response(self) -> Response {
        let cookies = if self.consumed_flash {
            vec![Flash::clear_cookie()]
        } else {
            vec![]
        };
        (cookie_headers(cookies), self.html).into_response()
    }
}

/// A `303 See Other` that may also set cookies (session, flash).
#[derive(Debug)]
pub struct RedirectResponse {
    pub location: String,
    pub cookies: Vec<String>,
}

impl RedirectResponse {
    pub fn to(location: impl Into<String>) -> Self {
        Self {
            location: location.into(),
            cookies: Vec::new(),
        }
    }

    pub fn with_cookie(mut self, cookie: String) -> Self {
        self.cookies.push(cookie);
        self
    }

    pub fn with_flash(self, flash: Flash) -> Self {
        self.with_cookie(flash.set_cookie())
    }
}

impl IntoResponse for RedirectResponse {
    fn into_response(self) -> Response {
        (cookie_headers(self.cookies), Redirect::to(&self.location)).into_response()
    }
}
