use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::time::Duration;

use rocket::tokio::fs;
use url::Url;

use super::{ContentDocument, ContentError};

/// Where the content document lives. Local files are answered with the same
/// status codes a static file server would use, so both sources fail the
/// same way.
#[derive(Debug, Clone, PartialEq)]
pub enum ContentSource {
    File(PathBuf),
    Http(Url),
}

impl ContentSource {
    /// `http://` and `https://` locations are fetched over the network,
    /// anything else is a path on disk.
    pub fn parse(location: &str) -> Result<Self, String> {
        let location = location.trim();
        if location.is_empty() {
            return Err("content source is empty".to_string());
        }
        if location.starts_with("http://") || location.starts_with("https://") {
            let url = Url::parse(location).map_err(|e| format!("invalid content URL {}: {}", location, e))?;
            return Ok(Self::Http(url));
        }
        Ok(Self::File(PathBuf::from(location)))
    }

    pub fn describe(&self) -> String {
        match self {
            Self::File(path) => path.display().to_string(),
            Self::Http(url) => url.to_string(),
        }
    }

    /// Request the resource as text. A single attempt, no retry.
    pub async fn fetch(&self, timeout: Duration) -> Result<RawResponse, ContentError> {
        match self {
            Self::File(path) => Ok(read_file(path).await),
            Self::Http(url) => fetch_http(url, timeout).await,
        }
    }
}

/// Status and body of one content request.
#[derive(Debug, Clone, PartialEq)]
pub struct RawResponse {
    pub status: u16,
    pub body: String,
}

impl RawResponse {
    pub fn ok(body: impl Into<String>) -> Self {
        RawResponse { status: 200, body: body.into() }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

async fn read_file(path: &Path) -> RawResponse {
    match fs::read(path).await {
        Ok(bytes) => match String::from_utf8(bytes) {
            Ok(body) => RawResponse::ok(body),
            // Decoded lossily, as a browser would for a mislabelled body.
            Err(e) => RawResponse::ok(String::from_utf8_lossy(e.as_bytes()).into_owned()),
        },
        Err(e) => {
            let status = match e.kind() {
                ErrorKind::NotFound => 404,
                ErrorKind::PermissionDenied => 403,
                _ => 500,
            };
            log::debug!("Content file {} unreadable: {}", path.display(), e);
            RawResponse { status, body: String::new() }
        }
    }
}

async fn fetch_http(url: &Url, timeout: Duration) -> Result<RawResponse, ContentError> {
    let client = reqwest::Client::builder()
        .timeout(timeout)
        .build()
        .map_err(|e| ContentError::Fetch { status: None, reason: format!("HTTP client error: {}", e) })?;

    let resp = client
        .get(url.clone())
        .send()
        .await
        .map_err(|e| ContentError::Fetch { status: None, reason: e.to_string() })?;

    let status = resp.status().as_u16();
    let body = resp
        .text()
        .await
        .map_err(|e| ContentError::Fetch { status: Some(status), reason: format!("body read failed: {}", e) })?;

    Ok(RawResponse { status, body })
}

/// Fetch and parse the content document.
pub async fn load(source: &ContentSource, timeout: Duration) -> Result<ContentDocument, ContentError> {
    let response = source.fetch(timeout).await?;
    parse_response(&response)
}

/// Check the status, isolate the embedded JSON object and parse it.
pub fn parse_response(response: &RawResponse) -> Result<ContentDocument, ContentError> {
    if !response.is_success() {
        return Err(ContentError::Fetch {
            status: Some(response.status),
            reason: status_reason(response.status).to_string(),
        });
    }
    let json = extract_json(&response.body)?;
    serde_json::from_str(json).map_err(|e| ContentError::Parse(e.to_string()))
}

/// The substring from the first `{` to the last `}`, inclusive. Tolerates
/// wrapper text around the object, such as comments or markdown fences.
pub fn extract_json(text: &str) -> Result<&str, ContentError> {
    let first = text.find('{');
    let last = text.rfind('}');
    match (first, last) {
        (Some(start), Some(end)) if start < end => Ok(&text[start..=end]),
        _ => Err(ContentError::Parse("no JSON object found in content".to_string())),
    }
}

fn status_reason(status: u16) -> &'static str {
    match status {
        400 => "Bad Request",
        401 => "Unauthorized",
        403 => "Forbidden",
        404 => "Not Found",
        410 => "Gone",
        429 => "Too Many Requests",
        500 => "Internal Server Error",
        502 => "Bad Gateway",
        503 => "Service Unavailable",
        504 => "Gateway Timeout",
        _ => "Unexpected Status",
    }
}
