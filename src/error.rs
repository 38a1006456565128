//! Error types for the dispatch lifecycle.

use thiserror::Error;

/// Boxed error type carried by handler results.
///
/// Handlers return `Result<(), BoxError>` so application code can use `?`
/// with any error type; everything a handler fails with is contained at the
/// dispatch boundary and converted to a 500.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// A handler attempted to produce a second response for one request.
#[derive(Debug, Error)]
#[error("a response was already rendered for this request")]
pub struct RenderError;

/// Classified outcome of a failed dispatch.
///
/// `NoResponse` and `RenderConflict` are contract violations in application
/// code; `Handler` and `Panic` are ordinary runtime failures. All four are
/// surfaced to the client as the same fixed 500 page, but they are logged
/// through separate channels so the distinction survives in diagnostics.
#[derive(Debug, Error)]
pub enum DispatchFailure {
    #[error("handler completed without producing a response")]
    NoResponse,

    #[error(transparent)]
    RenderConflict(RenderError),

    #[error("handler failed: {0}")]
    Handler(BoxError),

    #[error("handler panicked: {0}")]
    Panic(String),
}

impl DispatchFailure {
    /// True for failures that indicate a bug in the application rather than
    /// a runtime condition.
    #[must_use]
    pub const fn is_contract_violation(&self) -> bool {
        matches!(self, Self::NoResponse | Self::RenderConflict(_))
    }
}
