//! Raw register contents exchanged with native code.
//!
//! A [`RawVectorValue`] is a bit pattern tagged with its register kind. Lane
//! interpretation happens at the edges (generation, printing, literal
//! decomposition) by passing a [`LaneWidth`]; lane `i` of width `W` always
//! occupies bytes `[i * W/8, (i + 1) * W/8)` of the native in-memory layout.

use std::fmt;

use crate::error::{IsaError, Result};
use crate::shape::{LaneWidth, Shape, VectorWidth};

#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub enum RawVectorValue {
    Scalar([u8; 4]),
    V128([u8; 16]),
    V256([u8; 32]),
    V512([u8; 64]),
}

impl RawVectorValue {
    /// All-zero value laid out for `shape`.
    pub const fn zeroed(shape: Shape) -> Self {
        match shape {
            Shape::Scalar32 => RawVectorValue::Scalar([0; 4]),
            Shape::Vector { width, .. } => match width {
                VectorWidth::V128 => RawVectorValue::V128([0; 16]),
                VectorWidth::V256 => RawVectorValue::V256([0; 32]),
                VectorWidth::V512 => RawVectorValue::V512([0; 64]),
            },
        }
    }

    pub const fn scalar(value: i32) -> Self {
        RawVectorValue::Scalar(value.to_ne_bytes())
    }

    /// Pack signed lane values into a value of `shape`.
    ///
    /// Each lane keeps only its low `W` bits, so `-1` and `0xff` pack to the
    /// same 8-bit lane.
    pub fn from_lanes(shape: Shape, lanes: &[i64]) -> Result<Self> {
        let expected = shape.lane_count();
        if lanes.len() != expected {
            return Err(IsaError::LaneCountMismatch {
                shape,
                expected,
                actual: lanes.len(),
            });
        }

        let mut value = Self::zeroed(shape);
        let lane = shape.lane_width();
        for (chunk, &lane_value) in value.as_bytes_mut().chunks_exact_mut(lane.bytes()).zip(lanes) {
            write_lane(chunk, lane, lane_value);
        }
        Ok(value)
    }

    /// Copy a native buffer into a value of `shape`.
    pub fn from_bytes(shape: Shape, bytes: &[u8]) -> Result<Self> {
        let expected = shape.byte_size();
        if bytes.len() != expected {
            return Err(IsaError::ByteLengthMismatch {
                shape,
                expected,
                actual: bytes.len(),
            });
        }
        let mut value = Self::zeroed(shape);
        value.as_bytes_mut().copy_from_slice(bytes);
        Ok(value)
    }

    pub fn as_bytes(&self) -> &[u8] {
        match self {
            RawVectorValue::Scalar(bytes) => bytes,
            RawVectorValue::V128(bytes) => bytes,
            RawVectorValue::V256(bytes) => bytes,
            RawVectorValue::V512(bytes) => bytes,
        }
    }

    pub fn as_bytes_mut(&mut self) -> &mut [u8] {
        match self {
            RawVectorValue::Scalar(bytes) => bytes,
            RawVectorValue::V128(bytes) => bytes,
            RawVectorValue::V256(bytes) => bytes,
            RawVectorValue::V512(bytes) => bytes,
        }
    }

    pub fn bit_size(&self) -> u32 {
        (self.as_bytes().len() * 8) as u32
    }

    pub fn is_scalar(&self) -> bool {
        matches!(self, RawVectorValue::Scalar(_))
    }

    pub fn as_scalar(&self) -> Option<i32> {
        match self {
            RawVectorValue::Scalar(bytes) => Some(i32::from_ne_bytes(*bytes)),
            _ => None,
        }
    }

    /// Whether this value has the register kind `shape` describes.
    pub fn fits(&self, shape: Shape) -> bool {
        self.bit_size() == shape.bit_size() && self.is_scalar() == shape.is_scalar()
    }

    /// Decompose into sign-extended lanes of `lane` bits.
    pub fn lanes(&self, lane: LaneWidth) -> Vec<i64> {
        self.as_bytes()
            .chunks_exact(lane.bytes())
            .map(|chunk| read_lane(chunk, lane))
            .collect()
    }

    pub fn lane(&self, index: usize, lane: LaneWidth) -> Option<i64> {
        self.as_bytes()
            .chunks_exact(lane.bytes())
            .nth(index)
            .map(|chunk| read_lane(chunk, lane))
    }

    /// Display adapter printing lanes as `< a b c >`.
    pub fn display(&self, lane: LaneWidth) -> LaneDisplay<'_> {
        LaneDisplay { value: self, lane }
    }
}

fn read_lane(chunk: &[u8], lane: LaneWidth) -> i64 {
    match lane {
        LaneWidth::W8 => i8::from_ne_bytes([chunk[0]]) as i64,
        LaneWidth::W16 => {
            let mut buf = [0u8; 2];
            buf.copy_from_slice(chunk);
            i16::from_ne_bytes(buf) as i64
        }
        LaneWidth::W32 => {
            let mut buf = [0u8; 4];
            buf.copy_from_slice(chunk);
            i32::from_ne_bytes(buf) as i64
        }
        LaneWidth::W64 => {
            let mut buf = [0u8; 8];
            buf.copy_from_slice(chunk);
            i64::from_ne_bytes(buf)
        }
    }
}

fn write_lane(chunk: &mut [u8], lane: LaneWidth, value: i64) {
    match lane {
        LaneWidth::W8 => chunk.copy_from_slice(&(value as i8).to_ne_bytes()),
        LaneWidth::W16 => chunk.copy_from_slice(&(value as i16).to_ne_bytes()),
        LaneWidth::W32 => chunk.copy_from_slice(&(value as i32).to_ne_bytes()),
        LaneWidth::W64 => chunk.copy_from_slice(&value.to_ne_bytes()),
    }
}

impl fmt::Debug for RawVectorValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = match self {
            RawVectorValue::Scalar(_) => "Scalar",
            RawVectorValue::V128(_) => "V128",
            RawVectorValue::V256(_) => "V256",
            RawVectorValue::V512(_) => "V512",
        };
        write!(f, "{kind}(0x")?;
        // Most significant byte first, as registers are usually written.
        for byte in self.as_bytes().iter().rev() {
            write!(f, "{byte:02x}")?;
        }
        write!(f, ")")
    }
}

pub struct LaneDisplay<'a> {
    value: &'a RawVectorValue,
    lane: LaneWidth,
}

impl fmt::Display for LaneDisplay<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<")?;
        for lane in self.value.lanes(self.lane) {
            write!(f, " {lane}")?;
        }
        write!(f, " >")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const W128_16: Shape = Shape::vector(VectorWidth::V128, LaneWidth::W16);

    #[test]
    fn lanes_follow_native_layout() {
        let value = RawVectorValue::from_lanes(W128_16, &[1, 2, 3, 4, 5, 6, 7, -1]).unwrap();
        let bytes = value.as_bytes();
        assert_eq!(&bytes[0..2], &1i16.to_ne_bytes());
        assert_eq!(&bytes[14..16], &(-1i16).to_ne_bytes());
        assert_eq!(value.lane(7, LaneWidth::W16), Some(-1));
        assert_eq!(value.lane(8, LaneWidth::W16), None);
    }

    #[test]
    fn lanes_can_be_reinterpreted_at_another_width() {
        let value = RawVectorValue::from_lanes(W128_16, &[-1; 8]).unwrap();
        assert_eq!(value.lanes(LaneWidth::W8), vec![-1; 16]);
        assert_eq!(value.lanes(LaneWidth::W64), vec![-1; 2]);
    }

    #[test]
    fn from_lanes_truncates_to_lane_width() {
        let shape = Shape::vector(VectorWidth::V128, LaneWidth::W8);
        let value = RawVectorValue::from_lanes(shape, &[0xff; 16]).unwrap();
        assert_eq!(value.lanes(LaneWidth::W8), vec![-1; 16]);
    }

    #[test]
    fn from_lanes_rejects_wrong_count() {
        let err = RawVectorValue::from_lanes(W128_16, &[0; 4]).unwrap_err();
        assert_eq!(
            err,
            IsaError::LaneCountMismatch {
                shape: W128_16,
                expected: 8,
                actual: 4
            }
        );
    }

    #[test]
    fn scalar_round_trips() {
        let value = RawVectorValue::scalar(-7);
        assert!(value.fits(Shape::Scalar32));
        assert!(!value.fits(W128_16));
        assert_eq!(value.as_scalar(), Some(-7));
        assert_eq!(value.lanes(LaneWidth::W32), vec![-7]);
    }

    #[test]
    fn display_prints_lanes() {
        let value = RawVectorValue::from_lanes(W128_16, &[2; 8]).unwrap();
        assert_eq!(value.display(LaneWidth::W16).to_string(), "< 2 2 2 2 2 2 2 2 >");
    }

    #[test]
    fn equal_lanes_hash_equal() {
        use std::collections::HashSet;
        let a = RawVectorValue::from_lanes(W128_16, &[3; 8]).unwrap();
        let b = RawVectorValue::from_lanes(W128_16, &[3; 8]).unwrap();
        let set: HashSet<_> = [a, b].into_iter().collect();
        assert_eq!(set.len(), 1);
    }

    fn any_vector_shape() -> impl Strategy<Value = Shape> {
        (0usize..3, 0usize..4).prop_map(|(w, l)| Shape::vector(VectorWidth::ALL[w], LaneWidth::ALL[l]))
    }

    proptest! {
        #[test]
        fn decompose_then_reassemble_is_identity(
            shape in any_vector_shape(),
            bytes in proptest::collection::vec(any::<u8>(), 64),
        ) {
            let original = RawVectorValue::from_bytes(shape, &bytes[..shape.byte_size()]).unwrap();
            let lanes = original.lanes(shape.lane_width());
            prop_assert_eq!(lanes.len(), shape.lane_count());
            let rebuilt = RawVectorValue::from_lanes(shape, &lanes).unwrap();
            prop_assert_eq!(rebuilt, original);
        }
    }
}
