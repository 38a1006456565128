//! Per-request state and the render contract.
//!
//! A [`RequestContext`] is allocated fresh for every dispatched request and
//! owned exclusively by that dispatch; it is never stored on anything that
//! outlives the request. Handlers read `params` and `environment` from it and
//! produce their response through [`RequestContext::render`] or
//! [`RequestContext::send_file`], at most once per request.

use crate::error::{BoxError, RenderError};
use crate::http::mime;
use crate::http::response::{Body, Response};
use crate::routing::pattern::Params;
use hyper::body::Bytes;
use std::collections::HashMap;
use std::path::Path;

/// The raw request environment handed in by the server adapter.
///
/// Contains at minimum `REQUEST_METHOD` and `PATH_INFO`; any further keys are
/// passed through to handlers opaquely.
pub type Environment = HashMap<String, String>;

/// Accumulated options for one `render` call.
///
/// A part is a `(kind, content)` pair: the kind is treated as a pseudo file
/// extension for content-type lookup (last part wins) and the content is
/// appended to the body chunk sequence in order.
#[derive(Debug, Default)]
pub struct Render {
    status: Option<u16>,
    parts: Vec<(String, Bytes)>,
}

impl Render {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Override the response status code (default 200).
    #[must_use]
    pub const fn status(mut self, code: u16) -> Self {
        self.status = Some(code);
        self
    }

    /// Alias for [`Render::status`]; reads better for error responses.
    #[must_use]
    pub const fn error(self, code: u16) -> Self {
        self.status(code)
    }

    /// Add a body part of the given kind ("html", "json", "jpg", ...).
    #[must_use]
    pub fn part(mut self, kind: &str, content: impl Into<Bytes>) -> Self {
        self.parts.push((kind.to_string(), content.into()));
        self
    }

    /// Shorthand for a single HTML part.
    #[must_use]
    pub fn html(content: impl Into<Bytes>) -> Self {
        Self::new().part("html", content)
    }

    /// Shorthand for a single JSON part.
    #[must_use]
    pub fn json(content: impl Into<Bytes>) -> Self {
        Self::new().part("json", content)
    }

    /// Shorthand for a single plain-text part.
    #[must_use]
    pub fn text(content: impl Into<Bytes>) -> Self {
        Self::new().part("txt", content)
    }
}

/// Mutable state for one in-flight request.
pub struct RequestContext {
    params: Params,
    environment: Environment,
    response: Option<Response>,
}

impl RequestContext {
    #[must_use]
    pub fn new(params: Params, environment: Environment) -> Self {
        Self {
            params,
            environment,
            response: None,
        }
    }

    /// Parameters extracted from the matched route pattern.
    #[must_use]
    pub const fn params(&self) -> &Params {
        &self.params
    }

    /// A single route parameter by capture name.
    #[must_use]
    pub fn param(&self, name: &str) -> Option<&str> {
        self.params.get(name).map(String::as_str)
    }

    /// The raw request environment.
    #[must_use]
    pub const fn environment(&self) -> &Environment {
        &self.environment
    }

    /// A single environment value by key.
    #[must_use]
    pub fn env(&self, key: &str) -> Option<&str> {
        self.environment.get(key).map(String::as_str)
    }

    /// Produce the response for this request.
    ///
    /// The response starts as `200` with `Content-Type: text/html`; the
    /// render options then override the status and set content type and body
    /// parts. Fails with [`RenderError`] if a response already exists; that
    /// error aborts the handler and is reported as a 500 by the dispatcher.
    pub fn render(&mut self, render: Render) -> Result<(), RenderError> {
        if self.response.is_some() {
            return Err(RenderError);
        }

        let mut response = Response::new(200).with_header("Content-Type", "text/html");
        if let Some(code) = render.status {
            response.status = code;
        }

        let mut chunks = Vec::with_capacity(render.parts.len());
        for (kind, content) in render.parts {
            response
                .headers
                .insert("Content-Type".to_string(), mime::content_type(&kind).to_string());
            chunks.push(content);
        }
        response.body = Body::Chunks(chunks);

        self.response = Some(response);
        Ok(())
    }

    /// Respond with the contents of a local file, content type derived from
    /// its extension. Subject to the same render-once invariant as `render`.
    ///
    /// The path is not confined to the static files root; handlers may send
    /// any file the process can read.
    pub fn send_file(&mut self, path: impl AsRef<Path>) -> Result<(), BoxError> {
        if self.response.is_some() {
            return Err(RenderError.into());
        }

        let path = path.as_ref();
        let file = std::fs::File::open(path)?;
        let len = file.metadata()?.len();

        let mut response =
            Response::new(200).with_header("Content-Type", mime::content_type_of_path(path));
        response.body = Body::File {
            file: tokio::fs::File::from_std(file),
            len,
        };

        self.response = Some(response);
        Ok(())
    }

    /// Whether a response has been produced yet. The dispatcher uses this to
    /// tell "no response" apart from an empty one.
    #[must_use]
    pub const fn has_response(&self) -> bool {
        self.response.is_some()
    }

    /// Consume the context, yielding the finished response if any.
    #[must_use]
    pub fn into_response(self) -> Option<Response> {
        self.response
    }
}
