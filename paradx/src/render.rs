//! Server-side page rendering with templates compiled into the binary.

use axum::response::Html;
use minijinja::{AutoEscape, Environment, Output, State, Value};
use serde::Serialize;

use crate::{api::models::users::CurrentUser, errors::Error, flash::Flash};

/// Every page the application serves.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Page {
    Landing,
    Register,
    Login,
    Dashboard,
    Upload,
    UploadVoice,
    Chatbot,
    Result,
}

impl Page {
    fn template_name(self) -> &'static str {
        match self {
            Page::Landing => "landing.html",
            Page::Register => "register.html",
            Page::Login => "login.html",
            Page::Dashboard => "dashboard.html",
            Page::Upload => "upload.html",
            Page::UploadVoice => "upload_voice.html",
            Page::Chatbot => "chatbot.html",
            Page::Result => "result.html",
        }
    }
}

const TEMPLATES: &[(&str, &str)] = &[
    ("base.html", include_str!("../templates/base.html")),
    ("landing.html", include_str!("../templates/landing.html")),
    ("register.html", include_str!("../templates/register.html")),
    ("login.html", include_str!("../templates/login.html")),
    ("dashboard.html", include_str!("../templates/dashboard.html")),
    ("upload.html", include_str!("../templates/upload.html")),
    ("upload_voice.html", include_str!("../templates/upload_voice.html")),
    ("chatbot.html", include_str!("../templates/chatbot.html")),
    ("result.html", include_str!("../templates/result.html")),
];

/// Outcome of an image or voice analysis.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResultView {
    pub result_text: String,
    /// "AI Estimated", or "N/A" when the upload could not be processed
    pub confidence_label: String,
    /// Public URL of the persisted upload; only shown for images
    pub media_path: Option<String>,
}

#[derive(Serialize)]
struct PageContext<'a> {
    current_user: Option<&'a str>,
    flash: Option<&'a Flash>,
    result: Option<&'a ResultView>,
}

/// Template environment. HTML autoescaping is on, so model replies render as text.
///
/// Strings are escaped without touching `/`, which keeps upload URLs literal in `src` attributes.
#[derive(Debug)]
pub struct Pages {
    env: Environment<'static>,
}

impl Pages {
    pub fn new() -> Result<Self, minijinja::Error> {
        let mut env = Environment::new();
        env.set_formatter(html_formatter);
        for &(name, source) in TEMPLATES {
            env.add_template(name, source)?;
        }
        Ok(Self { env })
    }

    pub fn render(&self, page: Page, user: Option<&CurrentUser>, flash: Option<&Flash>) -> Result<Html<String>, Error> {
        self.render_context(
            page,
            PageContext {
                current_user: user.map(|u| u.username.as_str()),
                flash,
                result: None,
            },
        )
    }

    pub fn result(&self, view: &ResultView, user: Option<&CurrentUser>) -> Result<Html<String>, Error> {
        self.render_context(
            Page::Result,
            PageContext {
                current_user: user.map(|u| u.username.as_str()),
                flash: None,
                result: Some(view),
            },
        )
    }

    fn render_context(&self, page: Page, context: PageContext<'_>) -> Result<Html<String>, Error> {
        let name = page.template_name();
        let template = self.env.get_template(name).map_err(|e| Error::Internal {
            operation: format!("load template {name}: {e}"),
        })?;
        let html = template.render(context).map_err(|e| Error::Internal {
            operation: format!("render {name}: {e:#}"),
        })?;
        Ok(Html(html))
    }
}

fn html_formatter(out: &mut Output<'_>, state: &State<'_, '_>, value: &Value) -> Result<(), minijinja::Error> {
    if let (AutoEscape::Html, Some(text), false) = (state.auto_escape(), value.as_str(), value.is_safe()) {
        out.write_str(&escape_html(text))?;
        return Ok(());
    }
    minijinja::escape_formatter(out, state, value)
}

fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#x27;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(name: &str) -> CurrentUser {
        CurrentUser {
            username: name.to_string(),
        }
    }

    #[test]
    fn test_every_page_renders() {
        let pages = Pages::new().unwrap();
        for page in [
            Page::Landing,
            Page::Register,
            Page::Login,
            Page::Dashboard,
            Page::Upload,
            Page::UploadVoice,
            Page::Chatbot,
        ] {
            let Html(html) = pages.render(page, Some(&user("alice")), None).unwrap();
            assert!(html.contains("ParaDx"), "{page:?}");
        }
    }

    #[test]
    fn test_dashboard_greets_user() {
        let pages = Pages::new().unwrap();
        let Html(html) = pages.render(Page::Dashboard, Some(&user("alice")), None).unwrap();
        assert!(html.contains("Welcome, alice!"));
        assert!(html.contains("/logout"));
    }

    #[test]
    fn test_anonymous_nav_offers_login() {
        let pages = Pages::new().unwrap();
        let Html(html) = pages.render(Page::Landing, None, None).unwrap();
        assert!(html.contains("href=\"/login\""));
        assert!(!html.contains("/logout"));
    }

    #[test]
    fn test_flash_is_rendered_with_kind() {
        let pages = Pages::new().unwrap();
        let flash = Flash::danger("Invalid credentials!");
        let Html(html) = pages.render(Page::Login, None, Some(&flash)).unwrap();
        assert!(html.contains("alert-danger"));
        assert!(html.contains("Invalid credentials!"));
    }

    #[test]
    fn test_result_page_shows_reply_and_confidence() {
        let pages = Pages::new().unwrap();
        let view = ResultView {
            result_text: "No signs detected".to_string(),
            confidence_label: "AI Estimated".to_string(),
            media_path: Some("/static/uploads/face.jpg".to_string()),
        };
        let Html(html) = pages.result(&view, Some(&user("alice"))).unwrap();
        assert!(html.contains("No signs detected"));
        assert!(html.contains("AI Estimated"));
        assert!(html.contains("src=\"/static/uploads/face.jpg\""));
        assert!(!html.contains("&#x2f;"));
    }

    #[test]
    fn test_unavailable_confidence_renders_literally() {
        let pages = Pages::new().unwrap();
        let view = ResultView {
            result_text: "Image processing failed.".to_string(),
            confidence_label: "N/A".to_string(),
            media_path: None,
        };
        let Html(html) = pages.result(&view, None).unwrap();
        assert!(html.contains("<strong>Confidence:</strong> N/A"));
    }

    #[test]
    fn test_attribute_breakout_is_escaped() {
        assert_eq!(
            escape_html(r#"a" onerror='x' & <b>"#),
            "a&quot; onerror=&#x27;x&#x27; &amp; &lt;b&gt;"
        );
    }

    #[test]
    fn test_result_without_media_has_no_image() {
        let pages = Pages::new().unwrap();
        let view = ResultView {
            result_text: "Speech sounds clear".to_string(),
            confidence_label: "AI Estimated".to_string(),
            media_path: None,
        };
        let Html(html) = pages.result(&view, None).unwrap();
        assert!(!html.contains("<img"));
    }

    #[test]
    fn test_model_output_is_escaped() {
        let pages = Pages::new().unwrap();
        let view = ResultView {
            result_text: "<script>alert(1)</script>".to_string(),
            confidence_label: "AI Estimated".to_string(),
            media_path: None,
        };
        let Html(html) = pages.result(&view, None).unwrap();
        assert!(!html.contains("<script>alert(1)</script>"));
        assert!(html.contains("&lt;script&gt;"));
    }
}
