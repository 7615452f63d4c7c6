//! Random operand generation.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use simdiff_isa::{LaneWidth, RawVectorValue, Shape};

use crate::config::InputStrategy;

/// Boundary values that uniform sampling rarely reaches. Each is truncated
/// to the lane width it is used at.
pub const INTERESTING_VALUES: [u64; 37] = [
    -10i64 as u64,
    -9i64 as u64,
    -8i64 as u64,
    -7i64 as u64,
    -6i64 as u64,
    -5i64 as u64,
    -4i64 as u64,
    -3i64 as u64,
    -2i64 as u64,
    -1i64 as u64,
    0,
    1,
    2,
    3,
    4,
    5,
    6,
    7,
    8,
    9,
    10,
    16,
    32,
    64,
    128,
    256,
    512,
    1024,
    2048,
    4096,
    8192,
    16384,
    1 << 31,
    1 << 32,
    1 << 63,
    u64::MAX,
    i32::MAX as u64,
];

/// Produces operands for one run.
///
/// Seeded from OS entropy unless a seed is given.
#[derive(Debug, Clone)]
pub struct InputGenerator {
    rng: StdRng,
    strategy: InputStrategy,
    shift_modulus: Option<u32>,
}

impl InputGenerator {
    pub fn from_entropy(strategy: InputStrategy) -> Self {
        Self::with_rng(StdRng::from_entropy(), strategy)
    }

    pub fn seeded(seed: u64, strategy: InputStrategy) -> Self {
        Self::with_rng(StdRng::seed_from_u64(seed), strategy)
    }

    fn with_rng(rng: StdRng, strategy: InputStrategy) -> Self {
        Self {
            rng,
            strategy,
            shift_modulus: None,
        }
    }

    /// Reduce scalar operands into `0..modulus`.
    pub fn with_shift_modulus(mut self, modulus: Option<u32>) -> Self {
        self.shift_modulus = modulus.filter(|&m| m > 0);
        self
    }

    pub fn strategy(&self) -> InputStrategy {
        self.strategy
    }

    /// One lane value, sign-extended to `i64`.
    pub fn random_lane(&mut self, width: LaneWidth) -> i64 {
        let use_interesting = match self.strategy {
            InputStrategy::Uniform => false,
            InputStrategy::Interesting => true,
            InputStrategy::Mixed => self.rng.gen_bool(0.5),
        };
        if use_interesting {
            self.interesting_lane(width)
        } else {
            self.uniform_lane(width)
        }
    }

    /// A lane drawn as usual and then reduced into `0..modulus`.
    ///
    /// The modulus is capped at the lane's positive range, so the reduced
    /// value is never reinterpreted as negative.
    pub fn random_lane_mod(&mut self, width: LaneWidth, modulus: u32) -> i64 {
        let value = self.random_lane(width);
        if modulus == 0 {
            return value;
        }
        let modulus = i64::from(modulus).min(width.max_signed().saturating_add(1));
        value.rem_euclid(modulus)
    }

    /// A value of `shape` with every lane drawn independently.
    pub fn random_vector(&mut self, shape: Shape) -> RawVectorValue {
        if shape.is_scalar() {
            return self.random_scalar();
        }
        self.fill_lanes(shape, None)
    }

    /// A shift-count operand. With a shift modulus set, every lane (or the
    /// scalar) is reduced into `0..modulus`.
    pub fn random_shift_count(&mut self, shape: Shape) -> RawVectorValue {
        if shape.is_scalar() {
            return self.random_scalar();
        }
        self.fill_lanes(shape, self.shift_modulus)
    }

    /// A scalar operand, honouring the shift modulus when one is set.
    pub fn random_scalar(&mut self) -> RawVectorValue {
        let value = match self.shift_modulus {
            Some(modulus) => self.random_lane_mod(LaneWidth::W32, modulus),
            None => self.random_lane(LaneWidth::W32),
        };
        RawVectorValue::scalar(value as i32)
    }

    fn fill_lanes(&mut self, shape: Shape, modulus: Option<u32>) -> RawVectorValue {
        let lane = shape.lane_width();
        let mut value = RawVectorValue::zeroed(shape);
        for chunk in value.as_bytes_mut().chunks_exact_mut(lane.bytes()) {
            let lane_value = match modulus {
                Some(modulus) => self.random_lane_mod(lane, modulus),
                None => self.random_lane(lane),
            };
            match lane {
                LaneWidth::W8 => chunk.copy_from_slice(&(lane_value as i8).to_ne_bytes()),
                LaneWidth::W16 => chunk.copy_from_slice(&(lane_value as i16).to_ne_bytes()),
                LaneWidth::W32 => chunk.copy_from_slice(&(lane_value as i32).to_ne_bytes()),
                LaneWidth::W64 => chunk.copy_from_slice(&lane_value.to_ne_bytes()),
            }
        }
        value
    }

    fn uniform_lane(&mut self, width: LaneWidth) -> i64 {
        match width {
            LaneWidth::W8 => i64::from(self.rng.gen::<i8>()),
            LaneWidth::W16 => i64::from(self.rng.gen::<i16>()),
            LaneWidth::W32 => i64::from(self.rng.gen::<i32>()),
            LaneWidth::W64 => self.rng.gen::<i64>(),
        }
    }

    fn interesting_lane(&mut self, width: LaneWidth) -> i64 {
        let pick = INTERESTING_VALUES[self.rng.gen_range(0..INTERESTING_VALUES.len())];
        width.truncate(pick as i64)
    }
}
