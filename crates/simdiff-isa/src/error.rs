//! Error types for catalog lookups and raw value construction

use thiserror::Error;

use crate::shape::Shape;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum IsaError {
    #[error("Unknown intrinsic: {0}")]
    UnknownIntrinsic(String),

    #[error("Lane count mismatch for {shape}: expected {expected} lanes, got {actual}")]
    LaneCountMismatch { shape: Shape, expected: usize, actual: usize },

    #[error("Byte length mismatch for {shape}: expected {expected} bytes, got {actual}")]
    ByteLengthMismatch { shape: Shape, expected: usize, actual: usize },

    #[error("Unsupported bit width: {0}")]
    UnsupportedWidth(u32),
}

pub type Result<T> = std::result::Result<T, IsaError>;
