//! Error taxonomy for the coloring engine.
//!
//! The source project represents fallible operations as `Result<T, String>`
//! and logs unrecoverable startup issues with `eprintln!`; that is too coarse
//! for the five distinct error kinds the coloring engine distinguishes, so
//! they are promoted to a `thiserror`-derived enum instead.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ColoringError {
    #[error("buffer shape mismatch: expected {expected} bytes, got {actual}")]
    BufferShapeMismatch { expected: usize, actual: usize },

    #[error("pixel field '{field}' length mismatch: expected {expected}, got {actual}")]
    PixelFieldLengthMismatch {
        field: &'static str,
        expected: usize,
        actual: usize,
    },

    #[error("no algorithm registry bound to engine")]
    NoRegistry,

    #[error("invalid configuration: {0:?}")]
    InvalidConfiguration(Vec<String>),

    #[error("unknown algorithm id: {0}")]
    UnknownAlgorithm(String),

    #[error("unknown blend mode: {0}")]
    UnknownBlendMode(String),

    #[error("unknown color space: {0}")]
    UnknownColorSpace(String),

    #[error("unknown interpolation: {0}")]
    UnknownInterpolation(String),

    #[error("unknown interior mode: {0}")]
    UnknownInteriorMode(String),
}

pub type Result<T> = std::result::Result<T, ColoringError>;
