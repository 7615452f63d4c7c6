//! # simdiff-isa
//!
//! Static knowledge about the instructions under test:
//!
//! - [`catalog`]: the closed table of x86 SIMD binary operations with their
//!   symbolic model symbol, native realisation and operand shapes
//! - [`shape`]: lane and register widths
//! - [`value`]: [`RawVectorValue`], the bit pattern passed to and returned
//!   from native code
//! - [`cpu`]: runtime feature probing so unsupported entries can be skipped
//!
//! ```
//! use simdiff_isa::{Intrinsic, Operand};
//!
//! let pavg = Intrinsic::from_name("sse2_pavg_w").unwrap();
//! assert_eq!(pavg.bit_size(Operand::First), 128);
//! assert_eq!(pavg.shape_of(Operand::Result).lane_count(), 8);
//! ```

pub mod catalog;
pub mod cpu;
pub mod error;
pub mod shape;
pub mod value;

pub use catalog::{Intrinsic, IntrinsicSpec, Operand};
pub use error::{IsaError, Result};
pub use shape::{LaneWidth, Shape, VectorWidth};
pub use value::{LaneDisplay, RawVectorValue};
