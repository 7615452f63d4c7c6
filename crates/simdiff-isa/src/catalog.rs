//! The instruction shape catalog.
//!
//! Every testable instruction is a binary x86 integer operation with a
//! symbolic model exposed to the checker as an `llvm.x86.*` intrinsic and a
//! real implementation reachable through `core::arch`. The table is closed:
//! indices are stable for the lifetime of a build and are what the command
//! line's `-r=lower-upper` range selects.

use std::fmt;

use serde::Serialize;

use crate::cpu;
use crate::error::{IsaError, Result};
use crate::shape::{LaneWidth, Shape, VectorWidth};

/// Static description of one catalog entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct IntrinsicSpec {
    /// Short identifier, e.g. `sse2_pavg_w`.
    pub name: &'static str,
    /// Symbolic model handle, e.g. `llvm.x86.sse2.pavg.w`.
    pub symbol: &'static str,
    /// `core::arch::x86_64` function realising the instruction natively.
    pub native_fn: &'static str,
    /// CPU features the native function needs.
    pub features: &'static [&'static str],
    pub op0: Shape,
    pub op1: Shape,
    pub ret: Shape,
}

/// Which value of an instruction a shape query refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operand {
    First,
    Second,
    Result,
}

impl Operand {
    pub const INPUTS: [Operand; 2] = [Operand::First, Operand::Second];
}

/// Opaque handle for a catalog entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Intrinsic(u16);

impl Intrinsic {
    /// Number of catalog entries.
    pub const COUNT: usize = CATALOG.len();

    pub fn from_index(index: usize) -> Option<Self> {
        (index < Self::COUNT).then_some(Intrinsic(index as u16))
    }

    /// Handle for `index`.
    ///
    /// # Panics
    ///
    /// Panics if `index` is outside the catalog. The catalog is closed, so
    /// this is a programming error rather than a recoverable condition.
    pub fn at(index: usize) -> Self {
        assert!(
            index < Self::COUNT,
            "intrinsic index {index} out of range (catalog has {} entries)",
            Self::COUNT
        );
        Intrinsic(index as u16)
    }

    pub fn all() -> impl ExactSizeIterator<Item = Intrinsic> + DoubleEndedIterator {
        (0..Self::COUNT as u16).map(Intrinsic)
    }

    pub fn from_name(name: &str) -> Result<Self> {
        Self::all()
            .find(|intrinsic| intrinsic.name() == name)
            .ok_or_else(|| IsaError::UnknownIntrinsic(name.to_string()))
    }

    pub fn from_symbol(symbol: &str) -> Result<Self> {
        Self::all()
            .find(|intrinsic| intrinsic.symbol() == symbol)
            .ok_or_else(|| IsaError::UnknownIntrinsic(symbol.to_string()))
    }

    pub fn index(self) -> usize {
        self.0 as usize
    }

    pub fn spec(self) -> &'static IntrinsicSpec {
        &CATALOG[self.index()]
    }

    pub fn name(self) -> &'static str {
        self.spec().name
    }

    pub fn symbol(self) -> &'static str {
        self.spec().symbol
    }

    pub fn native_fn(self) -> &'static str {
        self.spec().native_fn
    }

    pub fn features(self) -> &'static [&'static str] {
        self.spec().features
    }

    pub fn shape_of(self, operand: Operand) -> Shape {
        let spec = self.spec();
        match operand {
            Operand::First => spec.op0,
            Operand::Second => spec.op1,
            Operand::Result => spec.ret,
        }
    }

    pub fn bit_size(self, operand: Operand) -> u32 {
        self.shape_of(operand).bit_size()
    }

    pub fn lane_width(self, operand: Operand) -> LaneWidth {
        self.shape_of(operand).lane_width()
    }

    /// Whether the second operand is a bare scalar count.
    pub fn has_scalar_operand(self) -> bool {
        self.spec().op1.is_scalar()
    }

    /// Whether the second operand is a shift count: a vector count, a
    /// per-lane count or a scalar immediate.
    pub fn has_shift_count(self) -> bool {
        let symbol = self.symbol();
        [".psrl", ".psra", ".psll"].iter().any(|family| symbol.contains(family))
    }

    /// Whether the running CPU implements every feature this entry needs.
    pub fn is_supported_on_host(self) -> bool {
        self.features().iter().all(|feature| cpu::host_supports(feature))
    }
}

impl fmt::Display for Intrinsic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

const B128: Shape = Shape::vector(VectorWidth::V128, LaneWidth::W8);
const W128: Shape = Shape::vector(VectorWidth::V128, LaneWidth::W16);
const D128: Shape = Shape::vector(VectorWidth::V128, LaneWidth::W32);
const Q128: Shape = Shape::vector(VectorWidth::V128, LaneWidth::W64);
const B256: Shape = Shape::vector(VectorWidth::V256, LaneWidth::W8);
const W256: Shape = Shape::vector(VectorWidth::V256, LaneWidth::W16);
const D256: Shape = Shape::vector(VectorWidth::V256, LaneWidth::W32);
const Q256: Shape = Shape::vector(VectorWidth::V256, LaneWidth::W64);
const B512: Shape = Shape::vector(VectorWidth::V512, LaneWidth::W8);
const W512: Shape = Shape::vector(VectorWidth::V512, LaneWidth::W16);
const D512: Shape = Shape::vector(VectorWidth::V512, LaneWidth::W32);
const Q512: Shape = Shape::vector(VectorWidth::V512, LaneWidth::W64);
const S32: Shape = Shape::Scalar32;

const SSE2: &[&str] = &["sse2"];
const SSSE3: &[&str] = &["ssse3"];
const AVX2: &[&str] = &["avx2"];
const AVX512F: &[&str] = &["avx512f"];
const AVX512BW: &[&str] = &["avx512bw"];
const AVX512F_VL: &[&str] = &["avx512f", "avx512vl"];
const AVX512BW_VL: &[&str] = &["avx512bw", "avx512vl"];

const fn entry(
    name: &'static str,
    symbol: &'static str,
    native_fn: &'static str,
    features: &'static [&'static str],
    op0: Shape,
    op1: Shape,
    ret: Shape,
) -> IntrinsicSpec {
    IntrinsicSpec {
        name,
        symbol,
        native_fn,
        features,
        op0,
        op1,
        ret,
    }
}

// Shift-by-vector entries take their count from the low 64 bits of a
// 128-bit operand; shift-by-scalar entries take an i32 count.
static CATALOG: [IntrinsicSpec; 107] = [
    /*   0 */ entry("sse2_pavg_w", "llvm.x86.sse2.pavg.w", "_mm_avg_epu16", SSE2, W128, W128, W128),
    /*   1 */ entry("sse2_pavg_b", "llvm.x86.sse2.pavg.b", "_mm_avg_epu8", SSE2, B128, B128, B128),
    /*   2 */ entry("avx2_pavg_w", "llvm.x86.avx2.pavg.w", "_mm256_avg_epu16", AVX2, W256, W256, W256),
    /*   3 */ entry("avx2_pavg_b", "llvm.x86.avx2.pavg.b", "_mm256_avg_epu8", AVX2, B256, B256, B256),
    /*   4 */ entry("avx512_pavg_b_512", "llvm.x86.avx512.pavg.b.512", "_mm512_avg_epu8", AVX512BW, B512, B512, B512),
    /*   5 */ entry("avx512_pavg_w_512", "llvm.x86.avx512.pavg.w.512", "_mm512_avg_epu16", AVX512BW, W512, W512, W512),
    /*   6 */ entry("avx2_pshuf_b", "llvm.x86.avx2.pshuf.b", "_mm256_shuffle_epi8", AVX2, B256, B256, B256),
    /*   7 */ entry("ssse3_pshuf_b_128", "llvm.x86.ssse3.pshuf.b.128", "_mm_shuffle_epi8", SSSE3, B128, B128, B128),
    /*   8 */ entry("sse2_psrl_w", "llvm.x86.sse2.psrl.w", "_mm_srl_epi16", SSE2, W128, W128, W128),
    /*   9 */ entry("sse2_psrl_d", "llvm.x86.sse2.psrl.d", "_mm_srl_epi32", SSE2, D128, D128, D128),
    /*  10 */ entry("sse2_psrl_q", "llvm.x86.sse2.psrl.q", "_mm_srl_epi64", SSE2, Q128, Q128, Q128),
    /*  11 */ entry("avx2_psrl_w", "llvm.x86.avx2.psrl.w", "_mm256_srl_epi16", AVX2, W256, W128, W256),
    /*  12 */ entry("avx2_psrl_d", "llvm.x86.avx2.psrl.d", "_mm256_srl_epi32", AVX2, D256, D128, D256),
    /*  13 */ entry("avx2_psrl_q", "llvm.x86.avx2.psrl.q", "_mm256_srl_epi64", AVX2, Q256, Q128, Q256),
    /*  14 */ entry("avx512_psrl_w_512", "llvm.x86.avx512.psrl.w.512", "_mm512_srl_epi16", AVX512BW, W512, W128, W512),
    /*  15 */ entry("avx512_psrl_d_512", "llvm.x86.avx512.psrl.d.512", "_mm512_srl_epi32", AVX512F, D512, D128, D512),
    /*  16 */ entry("avx512_psrl_q_512", "llvm.x86.avx512.psrl.q.512", "_mm512_srl_epi64", AVX512F, Q512, Q128, Q512),
    /*  17 */ entry("sse2_psrli_w", "llvm.x86.sse2.psrli.w", "_mm_srl_epi16", SSE2, W128, S32, W128),
    /*  18 */ entry("sse2_psrli_d", "llvm.x86.sse2.psrli.d", "_mm_srl_epi32", SSE2, D128, S32, D128),
    /*  19 */ entry("sse2_psrli_q", "llvm.x86.sse2.psrli.q", "_mm_srl_epi64", SSE2, Q128, S32, Q128),
    /*  20 */ entry("avx2_psrli_w", "llvm.x86.avx2.psrli.w", "_mm256_srl_epi16", AVX2, W256, S32, W256),
    /*  21 */ entry("avx2_psrli_d", "llvm.x86.avx2.psrli.d", "_mm256_srl_epi32", AVX2, D256, S32, D256),
    /*  22 */ entry("avx2_psrli_q", "llvm.x86.avx2.psrli.q", "_mm256_srl_epi64", AVX2, Q256, S32, Q256),
    /*  23 */ entry("avx512_psrli_w_512", "llvm.x86.avx512.psrli.w.512", "_mm512_srl_epi16", AVX512BW, W512, S32, W512),
    /*  24 */ entry("avx512_psrli_d_512", "llvm.x86.avx512.psrli.d.512", "_mm512_srl_epi32", AVX512F, D512, S32, D512),
    /*  25 */ entry("avx512_psrli_q_512", "llvm.x86.avx512.psrli.q.512", "_mm512_srl_epi64", AVX512F, Q512, S32, Q512),
    /*  26 */ entry("avx2_psrlv_d", "llvm.x86.avx2.psrlv.d", "_mm_srlv_epi32", AVX2, D128, D128, D128),
    /*  27 */ entry("avx2_psrlv_d_256", "llvm.x86.avx2.psrlv.d.256", "_mm256_srlv_epi32", AVX2, D256, D256, D256),
    /*  28 */ entry("avx2_psrlv_q", "llvm.x86.avx2.psrlv.q", "_mm_srlv_epi64", AVX2, Q128, Q128, Q128),
    /*  29 */ entry("avx2_psrlv_q_256", "llvm.x86.avx2.psrlv.q.256", "_mm256_srlv_epi64", AVX2, Q256, Q256, Q256),
    /*  30 */ entry("avx512_psrlv_d_512", "llvm.x86.avx512.psrlv.d.512", "_mm512_srlv_epi32", AVX512F, D512, D512, D512),
    /*  31 */ entry("avx512_psrlv_q_512", "llvm.x86.avx512.psrlv.q.512", "_mm512_srlv_epi64", AVX512F, Q512, Q512, Q512),
    /*  32 */ entry("avx512_psrlv_w_128", "llvm.x86.avx512.psrlv.w.128", "_mm_srlv_epi16", AVX512BW_VL, W128, W128, W128),
    /*  33 */ entry("avx512_psrlv_w_256", "llvm.x86.avx512.psrlv.w.256", "_mm256_srlv_epi16", AVX512BW_VL, W256, W256, W256),
    /*  34 */ entry("avx512_psrlv_w_512", "llvm.x86.avx512.psrlv.w.512", "_mm512_srlv_epi16", AVX512BW, W512, W512, W512),
    /*  35 */ entry("sse2_psra_w", "llvm.x86.sse2.psra.w", "_mm_sra_epi16", SSE2, W128, W128, W128),
    /*  36 */ entry("sse2_psra_d", "llvm.x86.sse2.psra.d", "_mm_sra_epi32", SSE2, D128, D128, D128),
    /*  37 */ entry("avx2_psra_w", "llvm.x86.avx2.psra.w", "_mm256_sra_epi16", AVX2, W256, W128, W256),
    /*  38 */ entry("avx2_psra_d", "llvm.x86.avx2.psra.d", "_mm256_sra_epi32", AVX2, D256, D128, D256),
    /*  39 */ entry("avx512_psra_q_128", "llvm.x86.avx512.psra.q.128", "_mm_sra_epi64", AVX512F_VL, Q128, Q128, Q128),
    /*  40 */ entry("avx512_psra_q_256", "llvm.x86.avx512.psra.q.256", "_mm256_sra_epi64", AVX512F_VL, Q256, Q128, Q256),
    /*  41 */ entry("avx512_psra_w_512", "llvm.x86.avx512.psra.w.512", "_mm512_sra_epi16", AVX512BW, W512, W128, W512),
    /*  42 */ entry("avx512_psra_d_512", "llvm.x86.avx512.psra.d.512", "_mm512_sra_epi32", AVX512F, D512, D128, D512),
    /*  43 */ entry("avx512_psra_q_512", "llvm.x86.avx512.psra.q.512", "_mm512_sra_epi64", AVX512F, Q512, Q128, Q512),
    /*  44 */ entry("sse2_psrai_w", "llvm.x86.sse2.psrai.w", "_mm_sra_epi16", SSE2, W128, S32, W128),
    /*  45 */ entry("sse2_psrai_d", "llvm.x86.sse2.psrai.d", "_mm_sra_epi32", SSE2, D128, S32, D128),
    /*  46 */ entry("avx2_psrai_w", "llvm.x86.avx2.psrai.w", "_mm256_sra_epi16", AVX2, W256, S32, W256),
    /*  47 */ entry("avx2_psrai_d", "llvm.x86.avx2.psrai.d", "_mm256_sra_epi32", AVX2, D256, S32, D256),
    /*  48 */ entry("avx512_psrai_w_512", "llvm.x86.avx512.psrai.w.512", "_mm512_sra_epi16", AVX512BW, W512, S32, W512),
    /*  49 */ entry("avx512_psrai_d_512", "llvm.x86.avx512.psrai.d.512", "_mm512_sra_epi32", AVX512F, D512, S32, D512),
    /*  50 */ entry("avx512_psrai_q_128", "llvm.x86.avx512.psrai.q.128", "_mm_sra_epi64", AVX512F_VL, Q128, S32, Q128),
    /*  51 */ entry("avx512_psrai_q_256", "llvm.x86.avx512.psrai.q.256", "_mm256_sra_epi64", AVX512F_VL, Q256, S32, Q256),
    /*  52 */ entry("avx512_psrai_q_512", "llvm.x86.avx512.psrai.q.512", "_mm512_sra_epi64", AVX512F, Q512, S32, Q512),
    /*  53 */ entry("avx2_psrav_d", "llvm.x86.avx2.psrav.d", "_mm_srav_epi32", AVX2, D128, D128, D128),
    /*  54 */ entry("avx2_psrav_d_256", "llvm.x86.avx2.psrav.d.256", "_mm256_srav_epi32", AVX2, D256, D256, D256),
    /*  55 */ entry("avx512_psrav_d_512", "llvm.x86.avx512.psrav.d.512", "_mm512_srav_epi32", AVX512F, D512, D512, D512),
    /*  56 */ entry("avx512_psrav_q_128", "llvm.x86.avx512.psrav.q.128", "_mm_srav_epi64", AVX512F_VL, Q128, Q128, Q128),
    /*  57 */ entry("avx512_psrav_q_256", "llvm.x86.avx512.psrav.q.256", "_mm256_srav_epi64", AVX512F_VL, Q256, Q256, Q256),
    /*  58 */ entry("avx512_psrav_q_512", "llvm.x86.avx512.psrav.q.512", "_mm512_srav_epi64", AVX512F, Q512, Q512, Q512),
    /*  59 */ entry("avx512_psrav_w_128", "llvm.x86.avx512.psrav.w.128", "_mm_srav_epi16", AVX512BW_VL, W128, W128, W128),
    /*  60 */ entry("avx512_psrav_w_256", "llvm.x86.avx512.psrav.w.256", "_mm256_srav_epi16", AVX512BW_VL, W256, W256, W256),
    /*  61 */ entry("avx512_psrav_w_512", "llvm.x86.avx512.psrav.w.512", "_mm512_srav_epi16", AVX512BW, W512, W512, W512),
    /*  62 */ entry("sse2_psll_w", "llvm.x86.sse2.psll.w", "_mm_sll_epi16", SSE2, W128, W128, W128),
    /*  63 */ entry("sse2_psll_d", "llvm.x86.sse2.psll.d", "_mm_sll_epi32", SSE2, D128, D128, D128),
    /*  64 */ entry("sse2_psll_q", "llvm.x86.sse2.psll.q", "_mm_sll_epi64", SSE2, Q128, Q128, Q128),
    /*  65 */ entry("avx2_psll_w", "llvm.x86.avx2.psll.w", "_mm256_sll_epi16", AVX2, W256, W128, W256),
    /*  66 */ entry("avx2_psll_d", "llvm.x86.avx2.psll.d", "_mm256_sll_epi32", AVX2, D256, D128, D256),
    /*  67 */ entry("avx2_psll_q", "llvm.x86.avx2.psll.q", "_mm256_sll_epi64", AVX2, Q256, Q128, Q256),
    /*  68 */ entry("avx512_psll_w_512", "llvm.x86.avx512.psll.w.512", "_mm512_sll_epi16", AVX512BW, W512, W128, W512),
    /*  69 */ entry("avx512_psll_d_512", "llvm.x86.avx512.psll.d.512", "_mm512_sll_epi32", AVX512F, D512, D128, D512),
    /*  70 */ entry("avx512_psll_q_512", "llvm.x86.avx512.psll.q.512", "_mm512_sll_epi64", AVX512F, Q512, Q128, Q512),
    /*  71 */ entry("sse2_pslli_w", "llvm.x86.sse2.pslli.w", "_mm_sll_epi16", SSE2, W128, S32, W128),
    /*  72 */ entry("sse2_pslli_d", "llvm.x86.sse2.pslli.d", "_mm_sll_epi32", SSE2, D128, S32, D128),
    /*  73 */ entry("sse2_pslli_q", "llvm.x86.sse2.pslli.q", "_mm_sll_epi64", SSE2, Q128, S32, Q128),
    /*  74 */ entry("avx2_pslli_w", "llvm.x86.avx2.pslli.w", "_mm256_sll_epi16", AVX2, W256, S32, W256),
    /*  75 */ entry("avx2_pslli_d", "llvm.x86.avx2.pslli.d", "_mm256_sll_epi32", AVX2, D256, S32, D256),
    /*  76 */ entry("avx2_pslli_q", "llvm.x86.avx2.pslli.q", "_mm256_sll_epi64", AVX2, Q256, S32, Q256),
    /*  77 */ entry("avx512_pslli_w_512", "llvm.x86.avx512.pslli.w.512", "_mm512_sll_epi16", AVX512BW, W512, S32, W512),
    /*  78 */ entry("avx512_pslli_d_512", "llvm.x86.avx512.pslli.d.512", "_mm512_sll_epi32", AVX512F, D512, S32, D512),
    /*  79 */ entry("avx512_pslli_q_512", "llvm.x86.avx512.pslli.q.512", "_mm512_sll_epi64", AVX512F, Q512, S32, Q512),
    /*  80 */ entry("avx2_psllv_d", "llvm.x86.avx2.psllv.d", "_mm_sllv_epi32", AVX2, D128, D128, D128),
    /*  81 */ entry("avx2_psllv_d_256", "llvm.x86.avx2.psllv.d.256", "_mm256_sllv_epi32", AVX2, D256, D256, D256),
    /*  82 */ entry("avx2_psllv_q", "llvm.x86.avx2.psllv.q", "_mm_sllv_epi64", AVX2, Q128, Q128, Q128),
    /*  83 */ entry("avx2_psllv_q_256", "llvm.x86.avx2.psllv.q.256", "_mm256_sllv_epi64", AVX2, Q256, Q256, Q256),
    /*  84 */ entry("avx512_psllv_d_512", "llvm.x86.avx512.psllv.d.512", "_mm512_sllv_epi32", AVX512F, D512, D512, D512),
    /*  85 */ entry("avx512_psllv_q_512", "llvm.x86.avx512.psllv.q.512", "_mm512_sllv_epi64", AVX512F, Q512, Q512, Q512),
    /*  86 */ entry("avx512_psllv_w_128", "llvm.x86.avx512.psllv.w.128", "_mm_sllv_epi16", AVX512BW_VL, W128, W128, W128),
    /*  87 */ entry("avx512_psllv_w_256", "llvm.x86.avx512.psllv.w.256", "_mm256_sllv_epi16", AVX512BW_VL, W256, W256, W256),
    /*  88 */ entry("avx512_psllv_w_512", "llvm.x86.avx512.psllv.w.512", "_mm512_sllv_epi16", AVX512BW, W512, W512, W512),
    /*  89 */ entry("ssse3_psign_b_128", "llvm.x86.ssse3.psign.b.128", "_mm_sign_epi8", SSSE3, B128, B128, B128),
    /*  90 */ entry("ssse3_psign_w_128", "llvm.x86.ssse3.psign.w.128", "_mm_sign_epi16", SSSE3, W128, W128, W128),
    /*  91 */ entry("ssse3_psign_d_128", "llvm.x86.ssse3.psign.d.128", "_mm_sign_epi32", SSSE3, D128, D128, D128),
    /*  92 */ entry("avx2_psign_b", "llvm.x86.avx2.psign.b", "_mm256_sign_epi8", AVX2, B256, B256, B256),
    /*  93 */ entry("avx2_psign_w", "llvm.x86.avx2.psign.w", "_mm256_sign_epi16", AVX2, W256, W256, W256),
    /*  94 */ entry("avx2_psign_d", "llvm.x86.avx2.psign.d", "_mm256_sign_epi32", AVX2, D256, D256, D256),
    /*  95 */ entry("ssse3_phadd_w_128", "llvm.x86.ssse3.phadd.w.128", "_mm_hadd_epi16", SSSE3, W128, W128, W128),
    /*  96 */ entry("ssse3_phadd_d_128", "llvm.x86.ssse3.phadd.d.128", "_mm_hadd_epi32", SSSE3, D128, D128, D128),
    /*  97 */ entry("ssse3_phadd_sw_128", "llvm.x86.ssse3.phadd.sw.128", "_mm_hadds_epi16", SSSE3, W128, W128, W128),
    /*  98 */ entry("avx2_phadd_w", "llvm.x86.avx2.phadd.w", "_mm256_hadd_epi16", AVX2, W256, W256, W256),
    /*  99 */ entry("avx2_phadd_d", "llvm.x86.avx2.phadd.d", "_mm256_hadd_epi32", AVX2, D256, D256, D256),
    /* 100 */ entry("avx2_phadd_sw", "llvm.x86.avx2.phadd.sw", "_mm256_hadds_epi16", AVX2, W256, W256, W256),
    /* 101 */ entry("ssse3_phsub_w_128", "llvm.x86.ssse3.phsub.w.128", "_mm_hsub_epi16", SSSE3, W128, W128, W128),
    /* 102 */ entry("ssse3_phsub_d_128", "llvm.x86.ssse3.phsub.d.128", "_mm_hsub_epi32", SSSE3, D128, D128, D128),
    /* 103 */ entry("ssse3_phsub_sw_128", "llvm.x86.ssse3.phsub.sw.128", "_mm_hsubs_epi16", SSSE3, W128, W128, W128),
    /* 104 */ entry("avx2_phsub_w", "llvm.x86.avx2.phsub.w", "_mm256_hsub_epi16", AVX2, W256, W256, W256),
    /* 105 */ entry("avx2_phsub_d", "llvm.x86.avx2.phsub.d", "_mm256_hsub_epi32", AVX2, D256, D256, D256),
    /* 106 */ entry("avx2_phsub_sw", "llvm.x86.avx2.phsub.sw", "_mm256_hsubs_epi16", AVX2, W256, W256, W256),
];

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn every_shape_has_a_legal_width() {
        for intrinsic in Intrinsic::all() {
            for operand in [Operand::First, Operand::Second, Operand::Result] {
                let shape = intrinsic.shape_of(operand);
                let bits = intrinsic.bit_size(operand);
                if shape.is_scalar() {
                    assert_eq!(bits, 32, "{intrinsic} {operand:?}");
                } else {
                    assert!(matches!(bits, 128 | 256 | 512), "{intrinsic} {operand:?} has {bits} bits");
                }
            }
            assert!(!intrinsic.shape_of(Operand::First).is_scalar(), "{intrinsic}");
            assert!(!intrinsic.shape_of(Operand::Result).is_scalar(), "{intrinsic}");
        }
    }

    #[test]
    fn names_and_symbols_are_unique() {
        let names: HashSet<_> = Intrinsic::all().map(Intrinsic::name).collect();
        let symbols: HashSet<_> = Intrinsic::all().map(Intrinsic::symbol).collect();
        assert_eq!(names.len(), Intrinsic::COUNT);
        assert_eq!(symbols.len(), Intrinsic::COUNT);
    }

    #[test]
    fn symbols_follow_names() {
        for intrinsic in Intrinsic::all() {
            let symbol = intrinsic.symbol();
            assert!(symbol.starts_with("llvm.x86."), "{symbol}");
            let family = intrinsic.name().split('_').nth(1).unwrap();
            assert!(symbol.contains(family), "{symbol} vs {}", intrinsic.name());
        }
    }

    #[test]
    fn result_shape_matches_first_operand() {
        for intrinsic in Intrinsic::all() {
            assert_eq!(
                intrinsic.shape_of(Operand::Result),
                intrinsic.shape_of(Operand::First),
                "{intrinsic}"
            );
        }
    }

    #[test]
    fn scalar_operands_are_immediate_shifts() {
        let scalar: Vec<_> = Intrinsic::all().filter(|i| i.has_scalar_operand()).collect();
        assert_eq!(scalar.len(), 27);
        for intrinsic in scalar {
            let name = intrinsic.name();
            assert!(
                name.contains("psrli") || name.contains("psrai") || name.contains("pslli"),
                "{name}"
            );
        }
    }

    #[test]
    fn shift_counts_cover_every_shift_family() {
        let shifts: Vec<Intrinsic> = Intrinsic::all().filter(|i| i.has_shift_count()).collect();
        assert!(shifts.iter().all(|i| ["psrl", "psra", "psll"].iter().any(|f| i.name().contains(f))));
        assert!(Intrinsic::all().filter(|i| i.has_scalar_operand()).all(Intrinsic::has_shift_count));
        assert!(Intrinsic::from_name("avx2_psrlv_d").unwrap().has_shift_count());
        assert!(Intrinsic::from_name("sse2_psrl_w").unwrap().has_shift_count());
        assert!(!Intrinsic::from_name("sse2_pavg_w").unwrap().has_shift_count());
        assert!(!Intrinsic::from_name("ssse3_pshuf_b_128").unwrap().has_shift_count());
    }

    #[test]
    fn lookup_by_name_and_symbol() {
        let pavg = Intrinsic::from_name("sse2_pavg_w").unwrap();
        assert_eq!(pavg.index(), 0);
        assert_eq!(pavg.symbol(), "llvm.x86.sse2.pavg.w");
        assert_eq!(pavg.lane_width(Operand::Result), LaneWidth::W16);
        assert_eq!(pavg.shape_of(Operand::First).lane_count(), 8);
        assert_eq!(Intrinsic::from_symbol("llvm.x86.avx2.phsub.sw").unwrap().name(), "avx2_phsub_sw");
        assert!(Intrinsic::from_name("mmx_padd_b").is_err());
    }

    #[test]
    fn vector_count_shifts_use_128_bit_count() {
        let psrl = Intrinsic::from_name("avx512_psrl_q_512").unwrap();
        assert_eq!(psrl.bit_size(Operand::First), 512);
        assert_eq!(psrl.bit_size(Operand::Second), 128);
        assert_eq!(psrl.lane_width(Operand::Second), LaneWidth::W64);
    }

    #[test]
    fn specs_serialize_for_listing() {
        let value = serde_json::to_value(Intrinsic::at(0).spec()).unwrap();
        assert_eq!(value["name"], "sse2_pavg_w");
        assert_eq!(value["features"][0], "sse2");
        assert_eq!(value["op1"]["Vector"]["lane"], "W16");
    }

    #[test]
    fn from_index_is_bounded() {
        assert!(Intrinsic::from_index(Intrinsic::COUNT - 1).is_some());
        assert!(Intrinsic::from_index(Intrinsic::COUNT).is_none());
    }

    #[test]
    #[should_panic(expected = "out of range")]
    fn at_panics_outside_catalog() {
        Intrinsic::at(Intrinsic::COUNT);
    }
}
