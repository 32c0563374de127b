//! Benchmarks for the motion vector rate estimation hot paths.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use nihav_av1mv::*;

fn bench_cost_table_build(c: &mut Criterion) {
    let mut group = c.benchmark_group("mv_cost_build");
    let ctx = NMVContext::new();
    let mut tab = MVCostTable::new();

    for &precision in [MVPrecision::FullPel, MVPrecision::QuarterPel, MVPrecision::EighthPel].iter() {
        for &layout in [FracLayout::Split, FracLayout::Joint].iter() {
            group.bench_with_input(BenchmarkId::new(precision.to_string(), layout), &(precision, layout), |b, &(precision, layout)| {
                b.iter(|| tab.build(black_box(&ctx), precision, layout))
            });
        }
    }

    group.finish();
}

fn bench_mv_cost_lookup(c: &mut Criterion) {
    let ctx = NMVContext::new();
    let mut tab = MVCostTable::new();
    tab.build(&ctx, MVPrecision::EighthPel, FracLayout::Split);
    let cands: Vec<MV> = (0..256).map(|i| MV::new((i * 37 % 512 - 256) as i16, (i * 11 % 128 - 64) as i16)).collect();

    c.bench_function("mv_bit_cost_256", |b| {
        b.iter(|| {
            let mut total = 0u32;
            for &mv in cands.iter() {
                total += tab.mv_bit_cost(black_box(mv), ZERO_MV, 100).unwrap_or(u32::MAX >> 8);
            }
            total
        })
    });
}

fn bench_encode_mv(c: &mut Criterion) {
    let mut group = c.benchmark_group("encode_mv");
    let cands: Vec<MV> = (0..256).map(|i| MV::new((i * 53 % 2048 - 1024) as i16, (i * 29 % 256 - 128) as i16)).collect();
    let enc_opts = MVCoderOptions::default();

    group.bench_function("range_encoder", |b| {
        b.iter(|| {
            let mut ctx = NMVContext::new();
            let mut rc = RangeEncoder::new();
            let mut enc = MVEncoder::new(&enc_opts);
            for &mv in cands.iter() {
                let _ = enc.encode_mv(&mut rc, black_box(mv), ZERO_MV, &mut ctx);
            }
            rc.finish()
        })
    });
    group.bench_function("estimator", |b| {
        b.iter(|| {
            let mut ctx = NMVContext::new();
            let mut est = Estimator::new();
            for &mv in cands.iter() {
                let _ = est.encode_mv_diff(black_box(mv), &mut ctx, MVPrecision::EighthPel, FracLayout::Split);
            }
            est.cost()
        })
    });

    group.finish();
}

criterion_group!(benches, bench_cost_table_build, bench_mv_cost_lookup, bench_encode_mv);
criterion_main!(benches);
