//! Error types for the rendering engine.

use mir_status_types::SnapshotError;
use thiserror::Error;

/// Rendering failures. Unknown sequence codes and empty windows are not
/// errors; see [`crate::render_model`].
#[derive(Debug, Error)]
pub enum MatrixError {
    /// A snapshot failed structural validation
    #[error("Malformed snapshot: {0}")]
    Malformed(#[from] SnapshotError),

    /// The aligned window is wider than the configured column limit
    #[error("Aligned window of {width} columns exceeds limit of {max}")]
    WindowTooWide { width: usize, max: usize },
}

/// Result type for rendering operations
pub type MatrixResult<T> = Result<T, MatrixError>;
