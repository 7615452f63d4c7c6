//! Synthetic program construction benchmarks
//!
//! Measures building and rendering one src/tgt pair, the per-iteration
//! overhead the engine adds on top of native execution and checking.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use simdiff_core::{ExecutionContext, InputGenerator, InputStrategy, VerificationContext};
use simdiff_isa::{Intrinsic, Operand};

fn benchmark_build_pair(c: &mut Criterion) {
    let mut group = c.benchmark_group("build_pair");

    for name in ["sse2_pavg_w", "avx2_psrli_d", "avx512_pavg_b_512"] {
        let intrinsic = Intrinsic::from_name(name).unwrap();
        group.bench_with_input(BenchmarkId::from_parameter(name), &intrinsic, |bencher, &intrinsic| {
            let mut inputs = InputGenerator::seeded(42, InputStrategy::Uniform);
            let mut verify = VerificationContext::new(Some("x86_64-unknown-linux-gnu"));
            let op0 = inputs.random_vector(intrinsic.shape_of(Operand::First));
            let op1 = inputs.random_vector(intrinsic.shape_of(Operand::Second));

            bencher.iter(|| {
                verify
                    .build_pair(intrinsic, &op0, &op1, &op0, intrinsic.lane_width(Operand::Result))
                    .unwrap();
                black_box(verify.render_pair().unwrap());
                verify.erase_pair();
            });
        });
    }

    group.finish();
}

fn benchmark_execution_module(c: &mut Criterion) {
    c.bench_function("execution_module_full_catalog", |bencher| {
        bencher.iter(|| black_box(ExecutionContext::new().unwrap().module().function_count()));
    });
}

fn benchmark_random_vectors(c: &mut Criterion) {
    let mut group = c.benchmark_group("random_vector");

    for strategy in [InputStrategy::Uniform, InputStrategy::Interesting, InputStrategy::Mixed] {
        let intrinsic = Intrinsic::from_name("avx512_pavg_b_512").unwrap();
        let shape = intrinsic.shape_of(Operand::First);
        group.bench_with_input(
            BenchmarkId::from_parameter(format!("{strategy:?}")),
            &strategy,
            |bencher, &strategy| {
                let mut inputs = InputGenerator::seeded(7, strategy);
                bencher.iter(|| black_box(inputs.random_vector(shape)));
            },
        );
    }

    group.finish();
}

criterion_group!(
    benches,
    benchmark_build_pair,
    benchmark_execution_module,
    benchmark_random_vectors
);
criterion_main!(benches);
