//! Danmaku error types.

use thiserror::Error;

/// Crate-specific result type.
pub type Result<T> = std::result::Result<T, DanmakuError>;

/// Errors that can occur while configuring a run or writing its output.
///
/// Layout itself never fails: contention is resolved by forced placement or
/// dropping, and invalid comments are refused at admission.
#[derive(Error, Debug)]
pub enum DanmakuError {
    /// Canvas geometry or timing that cannot produce a layout
    #[error("invalid canvas: {reason}")]
    InvalidCanvas { reason: String },

    /// Comment filter expression failed to compile
    #[error("invalid comment filter: {0}")]
    InvalidFilter(#[from] regex::Error),

    /// Configuration document could not be parsed
    #[error("config error: {0}")]
    Config(#[from] serde_json::Error),

    /// IO errors from the output sink
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl DanmakuError {
    /// Create an invalid canvas error.
    pub fn invalid_canvas(reason: impl Into<String>) -> Self {
        Self::InvalidCanvas {
            reason: reason.into(),
        }
    }
}
