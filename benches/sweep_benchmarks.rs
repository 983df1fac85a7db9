//! Decoding sweep benchmarks
//!
//! Toyota Way: Genchi Genbutsu (measure, don't guess)
//!
//! Covers the hot loops of a sweep: SIMD kernels, the SVM solver and a full
//! region x contrast sweep on synthetic Haxby-sized runs.
//!
//! Run with: cargo bench --bench sweep_benchmarks

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use trueno_decode::classifier::{Classifier, LinearSvm};
use trueno_decode::evaluate::DecodingEvaluator;
use trueno_decode::labels::LabelTable;
use trueno_decode::simd;
use trueno_decode::sweep::{Contrast, Region, RegionContrastSweep};
use trueno_decode::volume::{FeatureMatrix, FrameData, Mask};

const CATEGORIES: [&str; 4] = ["face", "house", "cat", "shoe"];
const SHAPE: [usize; 3] = [16, 16, 4];
const N_RUNS: i64 = 6;
const PER_RUN: usize = 3;

fn synthetic(seed: u64) -> (FrameData, LabelTable) {
    let mut rng = StdRng::seed_from_u64(seed);
    let n_voxels: usize = SHAPE.iter().product();
    let mut pairs = Vec::new();
    let mut data = Vec::new();
    for run in 0..N_RUNS {
        for (c, label) in CATEGORIES.iter().enumerate() {
            for _ in 0..PER_RUN {
                pairs.push((*label, run));
                data.extend((0..n_voxels).map(|v| {
                    let signal = if v % CATEGORIES.len() == c { 1.0 } else { 0.0 };
                    signal + rng.gen_range(-1.0f32..1.0)
                }));
            }
        }
    }
    let n_frames = pairs.len();
    (
        FrameData::new(SHAPE, n_frames, data).unwrap(),
        LabelTable::from_pairs(pairs),
    )
}

/// Benchmark trueno dot product against the scalar loop
fn bench_dot(c: &mut Criterion) {
    let mut group = c.benchmark_group("dot_f32");
    let mut rng = StdRng::seed_from_u64(7);

    for size in [1_024usize, 40_000] {
        let a: Vec<f32> = (0..size).map(|_| rng.gen()).collect();
        let b: Vec<f32> = (0..size).map(|_| rng.gen()).collect();
        group.bench_with_input(BenchmarkId::new("trueno_simd", size), &(&a, &b), |bench, (a, b)| {
            bench.iter(|| simd::dot(black_box(a), black_box(b)));
        });
        group.bench_with_input(BenchmarkId::new("scalar_baseline", size), &(&a, &b), |bench, (a, b)| {
            bench.iter(|| {
                black_box(a)
                    .iter()
                    .zip(black_box(b).iter())
                    .map(|(x, y)| x * y)
                    .sum::<f32>()
            });
        });
    }

    group.finish();
}

/// Benchmark one binary SVM fit on a whole-volume training fold
fn bench_svm_fit(c: &mut Criterion) {
    let (data, labels) = synthetic(11);
    let frames: Vec<usize> = labels
        .iter()
        .enumerate()
        .filter(|(_, r)| r.label() == "face" || r.label() == "house")
        .map(|(i, _)| i)
        .collect();
    let x: FeatureMatrix = data.masked_frames(&Mask::full(SHAPE), &frames).unwrap();
    let y: Vec<String> = frames
        .iter()
        .map(|&i| labels.get(i).unwrap().label().to_string())
        .collect();

    c.bench_function("svm_fit_face_vs_house", |b| {
        b.iter(|| {
            let mut svm = LinearSvm::default();
            svm.fit(black_box(&x), black_box(&y)).unwrap();
            svm
        });
    });
}

/// Benchmark a full sweep over three regions and all category pairs
fn bench_sweep(c: &mut Criterion) {
    let (data, labels) = synthetic(23);
    let n_voxels: usize = SHAPE.iter().product();
    let half: Vec<bool> = (0..n_voxels).map(|v| v < n_voxels / 2).collect();
    let regions = vec![
        Region::new("whole", Mask::full(SHAPE)),
        Region::new("front", Mask::new(SHAPE, half.clone()).unwrap()),
        Region::new("back", Mask::new(SHAPE, half.iter().map(|b| !b).collect()).unwrap()),
    ];
    let contrasts = Contrast::all_pairs(&CATEGORIES);

    let mut group = c.benchmark_group("sweep");
    group.sample_size(10);
    group.bench_function("three_regions_all_pairs", |b| {
        let sweep = RegionContrastSweep::new(&data, &labels, DecodingEvaluator::default());
        b.iter(|| sweep.run(black_box(&regions), black_box(&contrasts)));
    });
    group.finish();
}

criterion_group!(benches, bench_dot, bench_svm_fit, bench_sweep);
criterion_main!(benches);
