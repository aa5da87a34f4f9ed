//! Error types for federation-core.
//!
//! Every failure of a resolution entry point is an [`Error`]: the operation
//! that produced it, an [`ErrorKind`] the HTTP layer uses to pick a status,
//! an optional message that is safe to show the remote sender, and the typed
//! [`Cause`] for diagnostics.

use std::borrow::Cow;
use std::fmt;

use thiserror::Error;

use crate::context::DoneReason;
use crate::vocab::{Category, ResolveError};

/// Boxed error type for failures coming from outside the crate (body streams).
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// How the caller should treat a failed resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Unexpected failure on our side. Never shown to the sender.
    Internal,
    /// The sender's document is unusable.
    BadRequest,
    /// The document resolved, but to a type outside the requested category.
    WrongType,
    /// Untagged failure; the caller decides.
    Other,
}

impl ErrorKind {
    /// HTTP status code for this kind.
    pub fn status(self) -> u16 {
        match self {
            ErrorKind::Internal | ErrorKind::Other => 500,
            ErrorKind::BadRequest => 400,
            ErrorKind::WrongType => 422,
        }
    }

    fn generic_text(self) -> &'static str {
        match self {
            ErrorKind::Internal | ErrorKind::Other => "Internal Server Error",
            ErrorKind::BadRequest => "Bad Request",
            ErrorKind::WrongType => "Unprocessable Entity",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ErrorKind::Internal => "internal-error",
            ErrorKind::BadRequest => "bad-request",
            ErrorKind::WrongType => "wrong-type",
            ErrorKind::Other => "error",
        })
    }
}

/// The underlying reason a resolution failed.
#[derive(Debug, Error)]
pub enum Cause {
    #[error("error reading request body: {0}")]
    Body(#[source] BoxError),

    #[error("abandoned reading request body: {0}")]
    Done(#[source] DoneReason),

    #[error("error decoding json: {0}")]
    Json(#[from] serde_json::Error),

    #[error("body json not resolvable as ActivityStreams type")]
    Unmatched,

    #[error("error resolving json into vocab type: {0}")]
    Resolve(#[source] ResolveError),

    #[error("cannot resolve vocab type {type_name} as {category}")]
    WrongCategory {
        type_name: &'static str,
        category: Category,
    },

    #[error("missing ActivityStreams id property")]
    MissingId,
}

/// A classified resolution failure.
#[derive(Debug, Error)]
#[error("{op}: {cause}")]
pub struct Error {
    op: &'static str,
    kind: ErrorKind,
    safe: Option<Cow<'static, str>>,
    #[source]
    cause: Cause,
}

impl Error {
    /// Unexpected failure; the diagnostic stays internal.
    pub fn internal(op: &'static str, cause: Cause) -> Self {
        Self {
            op,
            kind: ErrorKind::Internal,
            safe: None,
            cause,
        }
    }

    /// Sender's fault. The cause's text is the safe message.
    pub fn bad_request(op: &'static str, cause: Cause) -> Self {
        Self {
            op,
            kind: ErrorKind::BadRequest,
            safe: Some(cause.to_string().into()),
            cause,
        }
    }

    /// Resolved to a type outside the requested category.
    pub fn wrong_type(op: &'static str, cause: Cause) -> Self {
        Self {
            op,
            kind: ErrorKind::WrongType,
            safe: Some(cause.to_string().into()),
            cause,
        }
    }

    /// Generic wrapped failure without HTTP framing.
    pub fn other(op: &'static str, cause: Cause) -> Self {
        Self {
            op,
            kind: ErrorKind::Other,
            safe: None,
            cause,
        }
    }

    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    /// Name of the entry point that failed.
    pub fn op(&self) -> &'static str {
        self.op
    }

    pub fn cause(&self) -> &Cause {
        &self.cause
    }

    pub fn status(&self) -> u16 {
        self.kind.status()
    }

    /// Text that may be shown to the remote sender.
    ///
    /// Internal diagnostics never appear here; use `Display` for logs.
    pub fn safe_message(&self) -> &str {
        self.safe
            .as_deref()
            .unwrap_or_else(|| self.kind.generic_text())
    }
}

/// Result type alias for federation-core operations.
pub type Result<T> = std::result::Result<T, Error>;
