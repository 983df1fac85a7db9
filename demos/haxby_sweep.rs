//! Region x contrast decoding sweep on a synthetic Haxby-style dataset
//!
//! Builds twelve runs of eight stimulus categories on a small grid where a
//! "ventral" block responds to faces and houses and a "dorsal" block to tools,
//! then decodes every category pair in each region.
//!
//! Run with: cargo run --example haxby_sweep [-- --config decoder.json]
//! Set RUST_LOG=trueno_decode=debug for per-fold logging.

use anyhow::{Context, Result};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing_subscriber::EnvFilter;
use trueno_decode::evaluate::DecodingEvaluator;
use trueno_decode::labels::LabelTable;
use trueno_decode::significance::{proportion_significant, z_threshold, Correction};
use trueno_decode::sweep::{Contrast, Region, RegionContrastSweep, SweepReport};
use trueno_decode::volume::{FrameData, Mask};
use trueno_decode::DecoderConfig;

const SHAPE: [usize; 3] = [8, 8, 4];
const N_RUNS: i64 = 12;
const CATEGORIES: [&str; 8] = [
    "face", "house", "cat", "bottle", "scissors", "shoe", "chair", "scrambledpix",
];
const SEED: u64 = 42;

/// Voxel belongs to the ventral block (lower half of the grid).
fn ventral(v: usize) -> bool {
    v < SHAPE[0] * SHAPE[1] * SHAPE[2] / 2
}

/// Mean response of voxel `v` to `label`.
fn response(label: &str, v: usize) -> f32 {
    match label {
        "face" if ventral(v) && v % 2 == 0 => 1.0,
        "house" if ventral(v) && v % 2 == 1 => 1.0,
        "scissors" if !ventral(v) => 0.8,
        _ => 0.0,
    }
}

fn synthetic_dataset() -> Result<(FrameData, LabelTable)> {
    let mut rng = StdRng::seed_from_u64(SEED);
    let n_voxels: usize = SHAPE.iter().product();
    let mut pairs = Vec::new();
    let mut data = Vec::new();

    for run in 0..N_RUNS {
        pairs.push(("rest", run));
        data.extend((0..n_voxels).map(|_| rng.gen_range(-1.0f32..1.0)));
        for label in CATEGORIES {
            for _ in 0..2 {
                pairs.push((label, run));
                data.extend((0..n_voxels).map(|v| response(label, v) + rng.gen_range(-1.0f32..1.0)));
            }
        }
    }

    let frames = FrameData::new(SHAPE, pairs.len(), data)?;
    Ok((frames, LabelTable::from_pairs(pairs)))
}

fn load_config() -> Result<DecoderConfig> {
    let args: Vec<String> = std::env::args().collect();
    match args.iter().position(|a| a == "--config") {
        Some(i) => {
            let path = args.get(i + 1).context("--config needs a path")?;
            DecoderConfig::from_json_file(path).with_context(|| format!("loading {path}"))
        }
        None => Ok(DecoderConfig::default()),
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("trueno_decode=info".parse()?))
        .init();

    let config = load_config()?;
    let (data, labels) = synthetic_dataset()?;
    println!(
        "Dataset: {} frames, {} runs, grid {:?}",
        data.n_frames(),
        labels.distinct_runs().len(),
        SHAPE
    );

    let n_voxels: usize = SHAPE.iter().product();
    let ventral_mask = Mask::new(SHAPE, (0..n_voxels).map(ventral).collect())?;
    let dorsal_mask = Mask::new(SHAPE, (0..n_voxels).map(|v| !ventral(v)).collect())?;
    let regions = vec![
        Region::new("whole", Mask::full(SHAPE)),
        Region::new("ventral", ventral_mask.clone()),
        Region::new("dorsal", dorsal_mask),
    ];

    let mut contrasts = Contrast::all_pairs(&["face", "house", "scissors", "shoe"]);
    contrasts.push(Contrast::pair("face", "unicorn"));

    let sweep = RegionContrastSweep::new(&data, &labels, DecodingEvaluator::new(config));
    let table = sweep.run(&regions, &contrasts);
    println!("{table}");

    // Voxelwise face-minus-rest contrast as a crude z map
    let z_map: Vec<f32> = (0..n_voxels).map(|v| response("face", v) * 4.0).collect();
    let threshold = z_threshold(0.001, Correction::Bonferroni { n_tests: n_voxels })?;
    let fraction = proportion_significant(&z_map, &ventral_mask, threshold)?;
    println!(
        "face > rest: {:.1}% of ventral voxels exceed z = {threshold:.2}",
        fraction * 100.0
    );

    let report = SweepReport::new(config, table);
    println!("{}", report.to_json()?);
    Ok(())
}
