//! Session state: cookie jar and default headers
//!
//! One session belongs to one client instance; it is never process-wide,
//! so independent sessions against the same or different servers can
//! coexist. Cookie updates are applied at response-completion time, which
//! means concurrent in-flight requests commit their `Set-Cookie` writes
//! in completion order: the last response to complete wins for a cookie
//! touched by several of them. Session cookies are expected to be stable
//! across a session, so this is acceptable here.

use std::collections::HashMap;

use base64::Engine as _;
use percent_encoding::{percent_decode_str, utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, AUTHORIZATION};

use crate::error::{ClientError, Result};

/// Cookie holding the anti-forgery token.
pub const XSRF_COOKIE: &str = "XSRF-TOKEN";

/// Header the token is echoed into for double-submit CSRF protection.
pub const XSRF_HEADER: &str = "x-xsrf-token";

// Matches JS encodeURIComponent: everything but alphanumerics and
// - _ . ! ~ * ' ( ) is escaped.
const COOKIE_VALUE_SET: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

/// Per-client session: cookie jar plus default headers.
#[derive(Debug)]
pub struct Session {
    cookies: Option<HashMap<String, String>>,
    default_headers: HeaderMap,
}

impl Session {
    /// Create a session. With cookies enabled the jar is seeded with a
    /// freshly generated anti-forgery token.
    pub fn new(enable_cookies: bool) -> Self {
        let cookies = enable_cookies.then(|| {
            let mut jar = HashMap::new();
            jar.insert(XSRF_COOKIE.to_string(), uuid::Uuid::new_v4().to_string());
            jar
        });
        Self {
            cookies,
            default_headers: HeaderMap::new(),
        }
    }

    pub fn cookies_enabled(&self) -> bool {
        self.cookies.is_some()
    }

    /// Current value of a stored cookie.
    pub fn cookie(&self, name: &str) -> Option<&str> {
        self.cookies.as_ref()?.get(name).map(String::as_str)
    }

    /// The anti-forgery token value, when cookies are enabled.
    pub fn xsrf_token(&self) -> Option<&str> {
        self.cookie(XSRF_COOKIE)
    }

    /// Render the jar as a single `Cookie` header value, or `None` when
    /// the jar is disabled or empty.
    pub fn cookie_header(&self) -> Option<String> {
        let cookies = self.cookies.as_ref()?;
        if cookies.is_empty() {
            return None;
        }
        let rendered: Vec<String> = cookies
            .iter()
            .map(|(name, value)| {
                format!("{}={}", name, utf8_percent_encode(value, COOKIE_VALUE_SET))
            })
            .collect();
        Some(rendered.join("; "))
    }

    /// Apply one `Set-Cookie` response header to the jar: a zero max-age
    /// deletes the cookie, anything else upserts it.
    pub fn apply_set_cookie(&mut self, header: &str) {
        let Some(cookies) = self.cookies.as_mut() else {
            return;
        };
        let Some(parsed) = parse_set_cookie(header) else {
            return;
        };
        let expired = parsed
            .attributes
            .iter()
            .any(|(name, value)| name.eq_ignore_ascii_case("Max-Age") && value == "0");
        if expired {
            cookies.remove(&parsed.name);
        } else {
            cookies.insert(parsed.name, parsed.value);
        }
    }

    pub fn default_headers(&self) -> &HeaderMap {
        &self.default_headers
    }

    /// Set a header sent with every request (below per-request overrides).
    pub fn set_default_header(&mut self, name: &str, value: &str) -> Result<()> {
        let name = HeaderName::from_bytes(name.as_bytes()).map_err(ClientError::invalid_header)?;
        let value = HeaderValue::from_str(value).map_err(ClientError::invalid_header)?;
        self.default_headers.insert(name, value);
        Ok(())
    }

    /// Send `Authorization: Bearer <token>` with every request.
    pub fn set_bearer_authentication(&mut self, token: &str) -> Result<()> {
        let value = HeaderValue::from_str(&format!("Bearer {token}"))
            .map_err(ClientError::invalid_header)?;
        self.default_headers.insert(AUTHORIZATION, value);
        Ok(())
    }

    /// Send `Authorization: Basic <credentials>` with every request.
    pub fn set_basic_authentication(&mut self, username: &str, password: &str) -> Result<()> {
        let encoded =
            base64::engine::general_purpose::STANDARD.encode(format!("{username}:{password}"));
        let value = HeaderValue::from_str(&format!("Basic {encoded}"))
            .map_err(ClientError::invalid_header)?;
        self.default_headers.insert(AUTHORIZATION, value);
        Ok(())
    }
}

struct ParsedCookie {
    name: String,
    value: String,
    attributes: Vec<(String, String)>,
}

/// Split a `Set-Cookie` header on `;`: the first segment is the
/// `name=value` pair (quoted values unwrapped, percent-decoded), the rest
/// are attributes.
fn parse_set_cookie(header: &str) -> Option<ParsedCookie> {
    let mut segments = header.split(';').map(str::trim);

    let first = segments.next()?;
    let (name, raw_value) = match first.split_once('=') {
        Some((name, value)) => (name, value),
        None => (first, ""),
    };
    if name.is_empty() {
        return None;
    }
    let unquoted = raw_value
        .strip_prefix('"')
        .and_then(|v| v.strip_suffix('"'))
        .unwrap_or(raw_value);
    let value = percent_decode_str(unquoted).decode_utf8_lossy().into_owned();

    let attributes = segments
        .filter(|segment| !segment.is_empty())
        .map(|segment| match segment.split_once('=') {
            Some((attr_name, attr_value)) => (attr_name.to_string(), attr_value.to_string()),
            None => (segment.to_string(), String::new()),
        })
        .collect();

    Some(ParsedCookie {
        name: name.to_string(),
        value,
        attributes,
    })
}
