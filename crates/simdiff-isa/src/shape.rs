//! Operand and result shapes.
//!
//! A shape is either a full vector register (128, 256 or 512 bits split into
//! lanes of 8, 16, 32 or 64 bits) or a bare 32-bit scalar. Storing the
//! register width and the lane width instead of a free `(lanes, bits)` pair
//! makes illegal totals unrepresentable.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{IsaError, Result};

/// Width of one lane.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum LaneWidth {
    W8,
    W16,
    W32,
    W64,
}

impl LaneWidth {
    pub const ALL: [LaneWidth; 4] = [LaneWidth::W8, LaneWidth::W16, LaneWidth::W32, LaneWidth::W64];

    pub const fn bits(self) -> u32 {
        match self {
            LaneWidth::W8 => 8,
            LaneWidth::W16 => 16,
            LaneWidth::W32 => 32,
            LaneWidth::W64 => 64,
        }
    }

    pub const fn bytes(self) -> usize {
        (self.bits() / 8) as usize
    }

    pub fn from_bits(bits: u32) -> Result<Self> {
        match bits {
            8 => Ok(LaneWidth::W8),
            16 => Ok(LaneWidth::W16),
            32 => Ok(LaneWidth::W32),
            64 => Ok(LaneWidth::W64),
            other => Err(IsaError::UnsupportedWidth(other)),
        }
    }

    /// Smallest signed value representable in one lane.
    pub const fn min_signed(self) -> i64 {
        match self {
            LaneWidth::W8 => i8::MIN as i64,
            LaneWidth::W16 => i16::MIN as i64,
            LaneWidth::W32 => i32::MIN as i64,
            LaneWidth::W64 => i64::MIN,
        }
    }

    /// Largest signed value representable in one lane.
    pub const fn max_signed(self) -> i64 {
        match self {
            LaneWidth::W8 => i8::MAX as i64,
            LaneWidth::W16 => i16::MAX as i64,
            LaneWidth::W32 => i32::MAX as i64,
            LaneWidth::W64 => i64::MAX,
        }
    }

    /// Reinterpret the low `bits()` bits of `value` as a signed lane value.
    pub const fn truncate(self, value: i64) -> i64 {
        match self {
            LaneWidth::W8 => value as i8 as i64,
            LaneWidth::W16 => value as i16 as i64,
            LaneWidth::W32 => value as i32 as i64,
            LaneWidth::W64 => value,
        }
    }
}

impl fmt::Display for LaneWidth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "i{}", self.bits())
    }
}

/// Total width of a vector register.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum VectorWidth {
    V128,
    V256,
    V512,
}

impl VectorWidth {
    pub const ALL: [VectorWidth; 3] = [VectorWidth::V128, VectorWidth::V256, VectorWidth::V512];

    pub const fn bits(self) -> u32 {
        match self {
            VectorWidth::V128 => 128,
            VectorWidth::V256 => 256,
            VectorWidth::V512 => 512,
        }
    }

    pub const fn bytes(self) -> usize {
        (self.bits() / 8) as usize
    }

    pub fn from_bits(bits: u32) -> Result<Self> {
        match bits {
            128 => Ok(VectorWidth::V128),
            256 => Ok(VectorWidth::V256),
            512 => Ok(VectorWidth::V512),
            other => Err(IsaError::UnsupportedWidth(other)),
        }
    }
}

/// Layout of one operand or result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Shape {
    Vector { width: VectorWidth, lane: LaneWidth },
    /// A bare `i32`, used for immediate-style shift counts.
    Scalar32,
}

impl Shape {
    pub const fn vector(width: VectorWidth, lane: LaneWidth) -> Self {
        Shape::Vector { width, lane }
    }

    /// Build a vector shape from a `(lanes, lane bits)` pair.
    pub fn from_lanes(lanes: u32, lane_bits: u32) -> Result<Self> {
        let lane = LaneWidth::from_bits(lane_bits)?;
        let width = VectorWidth::from_bits(lanes * lane_bits)?;
        Ok(Shape::vector(width, lane))
    }

    pub const fn lane_count(self) -> usize {
        match self {
            Shape::Vector { width, lane } => (width.bits() / lane.bits()) as usize,
            Shape::Scalar32 => 1,
        }
    }

    pub const fn lane_width(self) -> LaneWidth {
        match self {
            Shape::Vector { lane, .. } => lane,
            Shape::Scalar32 => LaneWidth::W32,
        }
    }

    /// Total bit size: 128, 256 or 512 for vectors, 32 for the scalar.
    pub const fn bit_size(self) -> u32 {
        match self {
            Shape::Vector { width, .. } => width.bits(),
            Shape::Scalar32 => 32,
        }
    }

    pub const fn byte_size(self) -> usize {
        (self.bit_size() / 8) as usize
    }

    pub const fn is_scalar(self) -> bool {
        matches!(self, Shape::Scalar32)
    }

    pub const fn vector_width(self) -> Option<VectorWidth> {
        match self {
            Shape::Vector { width, .. } => Some(width),
            Shape::Scalar32 => None,
        }
    }
}

impl fmt::Display for Shape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Shape::Vector { lane, .. } => write!(f, "<{} x {}>", self.lane_count(), lane),
            Shape::Scalar32 => write!(f, "i32"),
        }
    }
}
