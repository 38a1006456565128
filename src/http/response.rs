//! HTTP response values and fixed error pages.
//!
//! A [`Response`] is the three-part value handed back to the server adapter:
//! status code, header map, and a body that is either an ordered sequence of
//! byte chunks or an already-open file.

use hyper::body::Bytes;
use std::collections::HashMap;
use tokio::io::AsyncReadExt;

const NOT_FOUND_PAGE: &str = "<html><body>\n<h1>404</h1><p>Routing Error</p>\n</body></html>\n";

const FORBIDDEN_PAGE: &str = "<html><body>\n<h1>403</h1>\n<p>Forbidden</p>\n</body></html>\n";

const ERROR_PAGE: &str =
    "<html><body>\n<h1>500</h1>\n<p>Internal Server Error</p>\n</body></html>\n";

/// Response body: accumulated chunks, or a file resource to be streamed.
///
/// The file variant carries the open handle so the 403/404 decision made at
/// resolution time cannot be invalidated before the body is consumed, and so
/// the handle is released on every exit path when the response is dropped.
#[derive(Debug)]
pub enum Body {
    Chunks(Vec<Bytes>),
    File { file: tokio::fs::File, len: u64 },
}

impl Body {
    /// Total body size in bytes.
    #[must_use]
    pub fn len(&self) -> u64 {
        match self {
            Self::Chunks(chunks) => chunks.iter().map(|c| c.len() as u64).sum(),
            Self::File { len, .. } => *len,
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The chunk sequence, if this is a chunked body.
    #[must_use]
    pub fn as_chunks(&self) -> Option<&[Bytes]> {
        match self {
            Self::Chunks(chunks) => Some(chunks),
            Self::File { .. } => None,
        }
    }

    /// Consume the body into a single byte buffer.
    pub async fn into_bytes(self) -> std::io::Result<Bytes> {
        match self {
            Self::Chunks(chunks) => {
                if chunks.len() == 1 {
                    let mut chunks = chunks;
                    return Ok(chunks.pop().unwrap_or_default());
                }
                let mut out = Vec::with_capacity(total_len(&chunks));
                for chunk in &chunks {
                    out.extend_from_slice(chunk);
                }
                Ok(Bytes::from(out))
            }
            Self::File { mut file, len } => {
                let mut out = Vec::with_capacity(usize::try_from(len).unwrap_or(0));
                file.read_to_end(&mut out).await?;
                Ok(Bytes::from(out))
            }
        }
    }
}

fn total_len(chunks: &[Bytes]) -> usize {
    chunks.iter().map(Bytes::len).sum()
}

impl Default for Body {
    fn default() -> Self {
        Self::Chunks(Vec::new())
    }
}

/// A complete HTTP response as seen by the server adapter.
#[derive(Debug, Default)]
pub struct Response {
    pub status: u16,
    pub headers: HashMap<String, String>,
    pub body: Body,
}

impl Response {
    #[must_use]
    pub fn new(status: u16) -> Self {
        Self {
            status,
            headers: HashMap::new(),
            body: Body::default(),
        }
    }

    /// Set a header, replacing any existing value.
    #[must_use]
    pub fn with_header(mut self, name: &str, value: &str) -> Self {
        self.headers.insert(name.to_string(), value.to_string());
        self
    }

    /// Look up a header value by name.
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).map(String::as_str)
    }
}

fn html_page(status: u16, page: &'static str) -> Response {
    let mut response = Response::new(status).with_header("Content-Type", "text/html");
    response.body = Body::Chunks(vec![Bytes::from_static(page.as_bytes())]);
    response
}

/// Fixed 404 Not Found response. Routing misses and static misses are
/// indistinguishable to the client.
#[must_use]
pub fn not_found() -> Response {
    html_page(404, NOT_FOUND_PAGE)
}

/// Fixed 403 Forbidden response.
#[must_use]
pub fn forbidden() -> Response {
    html_page(403, FORBIDDEN_PAGE)
}

/// Fixed 500 Internal Server Error response. The body is always the generic
/// page; diagnostic detail goes to the error log only.
#[must_use]
pub fn internal_error() -> Response {
    html_page(500, ERROR_PAGE)
}
