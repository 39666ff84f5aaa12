//! One-shot flash messages carried in a cookie across a redirect.

use axum::response::{IntoResponse, Redirect, Response};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use serde::{Deserialize, Serialize};

pub const FLASH_COOKIE: &str = "flash";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FlashLevel {
    Error,
}

impl FlashLevel {
    /// Bootstrap alert modifier used by the templates.
    pub fn css_class(&self) -> &'static str {
        match self {
            FlashLevel::Error => "danger",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Flash {
    pub level: FlashLevel,
    pub message: String,
}

impl Flash {
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            level: FlashLevel::Error,
            message: message.into(),
        }
    }

    fn encode(&self) -> String {
        // Serializing two plain fields cannot fail.
        let json = serde_json::to_vec(self).unwrap_or_default();
        URL_SAFE_NO_PAD.encode(json)
    }

    fn decode(raw: &str) -> Option<Self> {
        let bytes = URL_SAFE_NO_PAD.decode(raw).ok()?;
        serde_json::from_slice(&bytes).ok()
    }
}

fn flash_cookie(value: String) -> Cookie<'static> {
    Cookie::build((FLASH_COOKIE, value))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .build()
}

/// `303 See Other` to `to`, carrying `flash` for the next rendered page.
pub fn redirect_with_flash(to: &str, flash: Flash) -> Response {
    let jar = CookieJar::new().add(flash_cookie(flash.encode()));
    (jar, Redirect::to(to)).into_response()
}

/// Reads the pending flash, if any, and returns a jar that clears it.
pub fn take_flash(jar: CookieJar) -> (CookieJar, Option<Flash>) {
    let Some(cookie) = jar.get(FLASH_COOKIE) else {
        return (jar, None);
    };
    let flash = Flash::decode(cookie.value());
    let jar = jar.remove(Cookie::build(FLASH_COOKIE).path("/"));
    (jar, flash)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::{header, StatusCode};

    #[test]
    fn test_encode_decode() {
        let flash = Flash::error("Invalid file type. Please upload PDF, DOC, or DOCX files only.");
        let raw = flash.encode();
        assert!(raw
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_'));
        assert_eq!(Flash::decode(&raw), Some(flash));
    }

    #[test]
    fn test_tampered_cookie_is_ignored() {
        assert_eq!(Flash::decode("%%%"), None);
        assert_eq!(Flash::decode(&URL_SAFE_NO_PAD.encode("not json")), None);
    }

    #[test]
    fn test_redirect_sets_cookie() {
        let response = redirect_with_flash("/", Flash::error("hello"));

        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(response.headers()[header::LOCATION], "/");
        let set_cookie = response.headers()[header::SET_COOKIE].to_str().unwrap();
        assert!(set_cookie.starts_with("flash="));
    }

    #[test]
    fn test_take_flash_consumes() {
        let raw = Flash::error("No file selected").encode();
        let jar = CookieJar::new().add(Cookie::new(FLASH_COOKIE, raw));

        let (jar, flash) = take_flash(jar);

        assert_eq!(flash.unwrap().message, "No file selected");
        assert!(jar.get(FLASH_COOKIE).is_none());
    }

    #[test]
    fn test_take_flash_without_cookie() {
        let (_, flash) = take_flash(CookieJar::new());
        assert!(flash.is_none());
    }
}
