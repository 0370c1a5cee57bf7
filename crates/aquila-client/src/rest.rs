//! The request pipeline
//!
//! Turns a [`RestRequest`] into a completed HTTP exchange: query-string
//! rendering with ISO-8601 dates, JSON or multipart bodies, cookie and
//! CSRF header attachment, header merging, `Set-Cookie` processing,
//! response decoding, status classification, and a bounded retry loop
//! with a fixed delay.

use std::path::{Path, PathBuf};
use std::time::Duration;

use chrono::{DateTime, SecondsFormat, Utc};
use futures_util::StreamExt;
use parking_lot::Mutex;
use reqwest::header::{
    HeaderMap, HeaderName, HeaderValue, ACCEPT, CONTENT_LENGTH, CONTENT_TYPE, COOKIE, SET_COOKIE,
};
use reqwest::multipart::{Form, Part};
use reqwest::Method;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use tokio::io::AsyncWriteExt;
use tracing::{debug, instrument, warn};
use url::Url;

use crate::config::ClientConfig;
use crate::error::{ClientError, Result};
use crate::session::{Session, XSRF_HEADER};

/// Fixed delay between retry attempts unless overridden per request.
pub const DEFAULT_RETRY_DELAY: Duration = Duration::from_millis(5000);

/// A query parameter value.
///
/// Date-time values serialize to their ISO-8601 form (millisecond
/// precision, `Z` suffix) rather than a default display form.
#[derive(Debug, Clone, PartialEq)]
pub enum ParamValue {
    String(String),
    Integer(i64),
    Float(f64),
    Bool(bool),
    DateTime(DateTime<Utc>),
}

impl ParamValue {
    fn render(&self) -> String {
        match self {
            ParamValue::String(s) => s.clone(),
            ParamValue::Integer(i) => i.to_string(),
            ParamValue::Float(f) => f.to_string(),
            ParamValue::Bool(b) => b.to_string(),
            ParamValue::DateTime(dt) => dt.to_rfc3339_opts(SecondsFormat::Millis, true),
        }
    }
}

impl From<&str> for ParamValue {
    fn from(value: &str) -> Self {
        ParamValue::String(value.to_string())
    }
}

impl From<String> for ParamValue {
    fn from(value: String) -> Self {
        ParamValue::String(value)
    }
}

impl From<i64> for ParamValue {
    fn from(value: i64) -> Self {
        ParamValue::Integer(value)
    }
}

impl From<u32> for ParamValue {
    fn from(value: u32) -> Self {
        ParamValue::Integer(value.into())
    }
}

impl From<f64> for ParamValue {
    fn from(value: f64) -> Self {
        ParamValue::Float(value)
    }
}

impl From<bool> for ParamValue {
    fn from(value: bool) -> Self {
        ParamValue::Bool(value)
    }
}

impl From<DateTime<Utc>> for ParamValue {
    fn from(value: DateTime<Utc>) -> Self {
        ParamValue::DateTime(value)
    }
}

/// Request body. JSON and file upload are mutually exclusive by
/// construction; the default is no body (and no content type).
#[derive(Debug, Clone, Default)]
pub enum RequestBody {
    #[default]
    None,
    Json(Value),
    UploadFiles(Vec<PathBuf>),
}

/// How to decode the response body once the stream ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DecodeMode {
    /// Parse as JSON (the default). A parse failure is fatal regardless
    /// of status code.
    #[default]
    Json,
    /// Raw bytes, untouched.
    Bytes,
    /// UTF-8 text (lossy).
    Text,
}

/// One logical outbound request.
#[derive(Debug, Clone)]
pub struct RestRequest {
    pub path: String,
    pub method: Method,
    pub params: Vec<(String, ParamValue)>,
    pub body: RequestBody,
    pub headers: Vec<(String, String)>,
    pub decode: DecodeMode,
    pub write_to_file: Option<PathBuf>,
    pub retries: u32,
    pub retry_delay: Duration,
}

impl RestRequest {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            method,
            params: Vec::new(),
            body: RequestBody::None,
            headers: Vec::new(),
            decode: DecodeMode::Json,
            write_to_file: None,
            retries: 0,
            retry_delay: DEFAULT_RETRY_DELAY,
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path)
    }

    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::POST, path)
    }

    pub fn put(path: impl Into<String>) -> Self {
        Self::new(Method::PUT, path)
    }

    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(Method::DELETE, path)
    }

    /// Append a query parameter.
    pub fn param(mut self, name: impl Into<String>, value: impl Into<ParamValue>) -> Self {
        self.params.push((name.into(), value.into()));
        self
    }

    /// Set a JSON body from an already-built value.
    pub fn json(mut self, value: Value) -> Self {
        self.body = RequestBody::Json(value);
        self
    }

    /// Serialize `body` and set it as the JSON body.
    pub fn json_body<T: Serialize>(self, body: &T) -> Result<Self> {
        let value = serde_json::to_value(body).map_err(ClientError::Serialize)?;
        Ok(self.json(value))
    }

    /// Upload local files as multipart form fields named after their
    /// base filenames.
    pub fn upload_files(mut self, paths: Vec<PathBuf>) -> Self {
        self.body = RequestBody::UploadFiles(paths);
        self
    }

    /// Add a per-request header (overrides session defaults).
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    pub fn decode(mut self, decode: DecodeMode) -> Self {
        self.decode = decode;
        self
    }

    /// Stream the response body to this file instead of buffering it.
    pub fn write_to_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.write_to_file = Some(path.into());
        self
    }

    /// Retry any failure up to `retries` times, waiting
    /// [`DEFAULT_RETRY_DELAY`] between attempts.
    pub fn retries(mut self, retries: u32) -> Self {
        self.retries = retries;
        self
    }

    pub fn retry_delay(mut self, delay: Duration) -> Self {
        self.retry_delay = delay;
        self
    }
}

/// Decoded response body.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum ResponseData {
    /// Empty body, or body streamed to a file.
    #[default]
    None,
    Json(Value),
    Bytes(Vec<u8>),
    Text(String),
}

impl ResponseData {
    pub fn is_none(&self) -> bool {
        matches!(self, ResponseData::None)
    }

    pub fn as_json(&self) -> Option<&Value> {
        match self {
            ResponseData::Json(value) => Some(value),
            _ => None,
        }
    }

    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            ResponseData::Bytes(bytes) => Some(bytes),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            ResponseData::Text(text) => Some(text),
            _ => None,
        }
    }
}

/// A completed exchange: status, decoded body, response headers.
#[derive(Debug, Clone)]
pub struct RestResponse {
    pub status: u16,
    pub data: ResponseData,
    pub headers: HeaderMap,
}

impl RestResponse {
    /// Deserialize the JSON body into a typed value.
    pub fn parse<T: DeserializeOwned>(&self) -> Result<T> {
        let value = match &self.data {
            ResponseData::Json(value) => value.clone(),
            _ => Value::Null,
        };
        serde_json::from_value(value).map_err(ClientError::Decode)
    }
}

/// The pipeline: a keep-alive connection pool, a base URL, and the
/// session shared by every request issued through it.
#[derive(Debug)]
pub struct RestPipeline {
    http: reqwest::Client,
    base_url: Url,
    session: Mutex<Session>,
}

impl RestPipeline {
    pub fn new(config: &ClientConfig) -> Result<Self> {
        let mut builder = reqwest::Client::builder()
            .timeout(Duration::from_millis(config.timeouts.request_ms))
            .connect_timeout(Duration::from_millis(config.timeouts.connect_ms));
        if config.accept_invalid_certs {
            builder = builder.danger_accept_invalid_certs(true);
        }
        let http = builder.build()?;
        let base_url = config.base_url()?;

        let mut session = Session::new(config.enable_cookies);
        for (name, value) in &config.default_headers {
            session.set_default_header(name, value)?;
        }

        Ok(Self {
            http,
            base_url,
            session: Mutex::new(session),
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Run a closure against the session (cookie jar + default headers).
    pub fn with_session<R>(&self, f: impl FnOnce(&mut Session) -> R) -> R {
        f(&mut self.session.lock())
    }

    /// Execute a request, retrying failures per the request's retry
    /// budget. Retries are sequential with a fixed delay; only the final
    /// attempt's outcome is reported.
    #[instrument(skip(self, request), fields(method = %request.method, path = %request.path))]
    pub async fn execute(&self, request: RestRequest) -> Result<RestResponse> {
        let mut remaining = request.retries;
        loop {
            match self.execute_once(&request).await {
                Ok(response) => return Ok(response),
                Err(error) if remaining > 0 => {
                    remaining -= 1;
                    warn!(%error, remaining, "request failed, retrying after delay");
                    tokio::time::sleep(request.retry_delay).await;
                }
                Err(error) => return Err(error),
            }
        }
    }

    async fn execute_once(&self, request: &RestRequest) -> Result<RestResponse> {
        let url = self.build_url(request)?;

        // Base headers, then session cookies, then client defaults, then
        // per-request overrides - later entries win.
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        {
            let session = self.session.lock();
            if session.cookies_enabled() {
                if let Some(token) = session.xsrf_token() {
                    headers.insert(
                        HeaderName::from_static(XSRF_HEADER),
                        HeaderValue::from_str(token).map_err(ClientError::invalid_header)?,
                    );
                }
                if let Some(cookie_header) = session.cookie_header() {
                    headers.insert(
                        COOKIE,
                        HeaderValue::from_str(&cookie_header)
                            .map_err(ClientError::invalid_header)?,
                    );
                }
            }
            for (name, value) in session.default_headers() {
                headers.insert(name.clone(), value.clone());
            }
        }
        for (name, value) in &request.headers {
            let name =
                HeaderName::from_bytes(name.as_bytes()).map_err(ClientError::invalid_header)?;
            let value = HeaderValue::from_str(value).map_err(ClientError::invalid_header)?;
            headers.insert(name, value);
        }

        let mut builder = self.http.request(request.method.clone(), url);
        match &request.body {
            RequestBody::None => {}
            RequestBody::Json(value) => {
                let payload = serde_json::to_vec(value).map_err(ClientError::Serialize)?;
                headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
                headers.insert(CONTENT_LENGTH, HeaderValue::from(payload.len() as u64));
                builder = builder.body(payload);
            }
            RequestBody::UploadFiles(paths) => {
                builder = builder.multipart(multipart_form(paths).await?);
            }
        }
        builder = builder.headers(headers);

        debug!("dispatching request");
        let response = builder.send().await?;

        let status = response.status();
        let response_headers = response.headers().clone();

        {
            let mut session = self.session.lock();
            if session.cookies_enabled() {
                for raw in response_headers.get_all(SET_COOKIE) {
                    if let Ok(raw) = raw.to_str() {
                        session.apply_set_cookie(raw);
                    }
                }
            }
        }

        let data = if let Some(path) = &request.write_to_file {
            stream_to_file(response, path).await?;
            ResponseData::None
        } else {
            let body = response.bytes().await?;
            decode_body(&body, request.decode)?
        };

        if status.as_u16() < 400 {
            debug!(status = status.as_u16(), "request complete");
            Ok(RestResponse {
                status: status.as_u16(),
                data,
                headers: response_headers,
            })
        } else {
            Err(ClientError::Http {
                status: status.as_u16(),
                status_text: status.canonical_reason().unwrap_or("Unknown").to_string(),
                headers: response_headers,
                data,
            })
        }
    }

    fn build_url(&self, request: &RestRequest) -> Result<Url> {
        let mut url = self.base_url.join(&request.path)?;
        if !request.params.is_empty() {
            let mut pairs = url.query_pairs_mut();
            for (name, value) in &request.params {
                pairs.append_pair(name, &value.render());
            }
        }
        Ok(url)
    }
}

/// Build a multipart form with one part per file, field name = base
/// filename, content = the file's bytes.
async fn multipart_form(paths: &[PathBuf]) -> Result<Form> {
    let mut form = Form::new();
    for path in paths {
        let field = path
            .file_name()
            .and_then(|name| name.to_str())
            .map(str::to_owned)
            .ok_or_else(|| {
                ClientError::Io(std::io::Error::new(
                    std::io::ErrorKind::InvalidInput,
                    format!("invalid upload path: {}", path.display()),
                ))
            })?;
        let contents = tokio::fs::read(path).await?;
        form = form.part(field.clone(), Part::bytes(contents).file_name(field));
    }
    Ok(form)
}

async fn stream_to_file(response: reqwest::Response, path: &Path) -> Result<()> {
    let mut file = tokio::fs::File::create(path).await?;
    let mut stream = response.bytes_stream();
    while let Some(chunk) = stream.next().await {
        file.write_all(&chunk?).await?;
    }
    file.flush().await?;
    Ok(())
}

fn decode_body(body: &[u8], mode: DecodeMode) -> Result<ResponseData> {
    if body.is_empty() {
        return Ok(ResponseData::None);
    }
    match mode {
        DecodeMode::Bytes => Ok(ResponseData::Bytes(body.to_vec())),
        DecodeMode::Text => Ok(ResponseData::Text(
            String::from_utf8_lossy(body).into_owned(),
        )),
        DecodeMode::Json => serde_json::from_slice(body)
            .map(ResponseData::Json)
            .map_err(ClientError::Decode),
    }
}
