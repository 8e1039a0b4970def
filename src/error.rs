use std::io;
use thiserror::Error;

/// Errors raised while loading, querying, mutating or writing documents.
///
/// Empty results (an out of range `eq`, `attr` on an empty selection, a
/// `closest` without match...) are never errors.
#[derive(Debug, Error)]
pub enum Error {
    /// Malformed markup, or a source that could not be read.
    #[error("parse error: {0}")]
    Parse(String),

    /// The selector string is not a valid CSS selector.
    #[error("invalid selector `{selector}`: {reason}")]
    Selector { selector: String, reason: String },

    /// A callback could not be resolved.
    #[error("cannot invoke callback: {0}")]
    Invocation(String),

    /// Writing serialized markup failed.
    #[error("write failed: {0}")]
    Io(#[from] io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
