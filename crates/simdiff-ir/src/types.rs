//! Integer and fixed-length vector types.

use std::fmt;

use serde::{Deserialize, Serialize};
use simdiff_isa::Shape;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum IrType {
    Int { bits: u32 },
    Vector { lanes: u32, elem_bits: u32 },
}

impl IrType {
    pub const I32: IrType = IrType::Int { bits: 32 };

    pub const fn int(bits: u32) -> Self {
        IrType::Int { bits }
    }

    pub const fn vector(lanes: u32, elem_bits: u32) -> Self {
        IrType::Vector { lanes, elem_bits }
    }

    /// The IR type carrying a value of `shape`.
    pub const fn from_shape(shape: Shape) -> Self {
        match shape {
            Shape::Scalar32 => IrType::I32,
            Shape::Vector { .. } => IrType::vector(shape.lane_count() as u32, shape.lane_width().bits()),
        }
    }

    pub const fn is_vector(self) -> bool {
        matches!(self, IrType::Vector { .. })
    }

    /// Bits per element (the integer width itself for scalars).
    pub const fn elem_bits(self) -> u32 {
        match self {
            IrType::Int { bits } => bits,
            IrType::Vector { elem_bits, .. } => elem_bits,
        }
    }

    pub const fn total_bits(self) -> u32 {
        match self {
            IrType::Int { bits } => bits,
            IrType::Vector { lanes, elem_bits } => lanes * elem_bits,
        }
    }
}

impl fmt::Display for IrType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IrType::Int { bits } => write!(f, "i{bits}"),
            IrType::Vector { lanes, elem_bits } => write!(f, "<{lanes} x i{elem_bits}>"),
        }
    }
}
