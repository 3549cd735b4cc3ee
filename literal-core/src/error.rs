//! Error types.
//!
//! Only mounting can fail. Store operations, compositing and scheduling are
//! infallible; degenerate geometry is a skipped frame, not an error.

use thiserror::Error;

/// Result alias for fallible crate operations.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Configuration errors raised at mount time.
#[derive(Debug, Error)]
pub enum Error {
    /// Mount options carried no surface to render into.
    #[error("no mount target was provided")]
    MissingTarget,

    /// The surface refused to attach.
    #[error("mount target is not usable: {0}")]
    InvalidTarget(String),

    /// A palette lacks one of the two default slots.
    #[error("palette is missing the required `{0}` slot")]
    MissingPaletteSlot(&'static str),

    /// A palette document could not be parsed.
    #[error("palette is not valid JSON: {0}")]
    PaletteFormat(#[from] serde_json::Error),
}
