//! Static file fallback with directory containment.
//!
//! Requests that match no route may be resolved against a configured root
//! directory. Canonicalization happens before the containment check, so
//! `..` components and symbolic links cannot escape the root; anything that
//! resolves outside it is reported as not found, never as forbidden.

use crate::http::response::{self, Body, Response};
use crate::http::mime;
use crate::logger;
use std::io;
use std::path::{Path, PathBuf};
use tokio::fs;

/// Resolver for a single sandboxed root directory.
///
/// The root is canonicalized once at configuration time and read-only
/// thereafter.
#[derive(Debug, Clone)]
pub struct StaticFiles {
    root: PathBuf,
}

impl StaticFiles {
    /// Configure a root directory. Fails fast if the path does not exist or
    /// is not a directory.
    pub fn new(root: impl AsRef<Path>) -> io::Result<Self> {
        let root = root.as_ref().canonicalize()?;
        if !root.is_dir() {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("static files root is not a directory: {}", root.display()),
            ));
        }
        Ok(Self { root })
    }

    /// The canonical root directory.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Resolve a URL path against the root.
    ///
    /// Missing candidates, escapes, and directories yield the fixed 404;
    /// contained-but-unreadable files yield the fixed 403; everything else is
    /// a 200 with a file-backed body and extension-derived content type.
    pub async fn resolve(&self, url_path: &str) -> Response {
        let mut candidate = self.root.clone();
        for part in url_path.split('/').filter(|p| !p.is_empty()) {
            candidate.push(part);
        }

        // Resolves symlinks and relative components; a missing file fails
        // here and becomes an ordinary 404.
        let resolved = match fs::canonicalize(&candidate).await {
            Ok(path) => path,
            Err(_) => return response::not_found(),
        };

        if !resolved.starts_with(&self.root) {
            logger::log_traversal_blocked(url_path, &resolved);
            return response::not_found();
        }

        let file = match fs::File::open(&resolved).await {
            Ok(file) => file,
            Err(e) if e.kind() == io::ErrorKind::PermissionDenied => {
                return response::forbidden();
            }
            Err(_) => return response::not_found(),
        };

        let metadata = match file.metadata().await {
            Ok(metadata) => metadata,
            Err(_) => return response::not_found(),
        };
        if metadata.is_dir() {
            return response::not_found();
        }

        let mut resp =
            Response::new(200).with_header("Content-Type", mime::content_type_of_path(&resolved));
        resp.body = Body::File {
            file,
            len: metadata.len(),
        };
        resp
    }
}
