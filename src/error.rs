//! Error taxonomy for the enhancement core.
//!
//! Every failure is scoped to a single run: the caller keeps showing the last
//! good result and the session stays ready for the next trigger.

use thiserror::Error;

/// Errors produced by a single enhancement run or export.
#[derive(Error, Debug)]
pub enum EnhanceError {
    /// A render target could not be acquired (allocation refused or the
    /// requested output exceeds the pixel ceiling).
    #[error("render target unavailable: {0}")]
    ResourceUnavailable(String),

    /// A run was attempted before any bitmap was loaded.
    #[error("no source image loaded")]
    NoSourceImage,

    /// Serializing the output buffer failed.
    #[error("encoding failed: {0}")]
    EncodingFailure(String),

    /// A parameter is outside the domain the pipeline can evaluate.
    #[error("invalid parameter {name}: {value}")]
    InvalidParameter { name: &'static str, value: f32 },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// A specialized Result type for enhancement operations.
pub type Result<T> = std::result::Result<T, EnhanceError>;
