//! One-shot status messages carried across a redirect.
//!
//! The message rides in a short-lived cookie holding base64url of `kind\nmessage`. The next page
//! render reads it and expires the cookie.

use axum::http::HeaderMap;
use base64::Engine as _;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use serde::Serialize;

use crate::auth::utils::cookie_value;

pub const FLASH_COOKIE: &str = "paradx_flash";

/// Seconds a flash survives if no page consumes it.
const FLASH_MAX_AGE: u64 = 60;

/// Bootstrap alert category; the lowercase name is used as the CSS suffix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FlashKind {
    Success,
    Info,
    Warning,
    Danger,
}

impl FlashKind {
    fn as_str(self) -> &'static str {
        match self {
            FlashKind::Success => "success",
            FlashKind::Info => "info",
            FlashKind::Warning => "warning",
            FlashKind::Danger => "danger",
        }
    }

    fn parse(value: &str) -> Option<Self> {
        match value {
            "success" => Some(FlashKind::Success),
            "info" => Some(FlashKind::Info),
            "warning" => Some(FlashKind::Warning),
            "danger" => Some(FlashKind::Danger),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Flash {
    pub kind: FlashKind,
    pub message: String,
}

impl Flash {
    pub fn new(kind: FlashKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn success(message: impl Into<String>) -> Self {
        Self::new(FlashKind::Success, message)
    }

    pub fn info(message: impl Into<String>) -> Self {
        Self::new(FlashKind::Info, message)
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self::new(FlashKind::Warning, message)
    }

    pub fn danger(message: impl Into<String>) -> Self {
        Self::new(FlashKind::Danger, message)
    }

    /// Pending flash from the request cookies. Undecodable cookies are ignored.
    pub fn from_headers(headers: &HeaderMap) -> Option<Self> {
        Self::decode(cookie_value(headers, FLASH_COOKIE)?)
    }

    /// `Set-Cookie` value storing this flash.
    pub fn set_cookie(&self) -> String {
        format!(
            "{FLASH_COOKIE}={}; Path=/; HttpOnly; SameSite=Lax; Max-Age={FLASH_MAX_AGE}",
            self.encode()
        )
    }

    /// `Set-Cookie` value consuming any pending flash.
    pub fn clear_cookie() -> String {
        format!("{FLASH_COOKIE}=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0")
    }

    fn encode(&self) -> String {
        URL_SAFE_NO_PAD.encode(format!("{}\n{}", self.kind.as_str(), self.message))
    }

    fn decode(value: &str) -> Option<Self> {
        let bytes = URL_SAFE_NO_PAD.decode(value).ok()?;
        let text = String::from_utf8(bytes).ok()?;
        let (kind, message) = text.split_once('\n')?;
        Some(Self::new(FlashKind::parse(kind)?, message))
    }
}
