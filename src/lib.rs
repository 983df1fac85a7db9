//! # trueno-decode: Cross-Validated fMRI Decoding Sweeps
//!
//! **Version**: 0.1.0
//!
//! trueno-decode evaluates multivariate pattern decoders on fMRI data the way
//! the classic Haxby et al. (2001) analysis does: pick a pair of stimulus
//! categories, restrict the data to a region of interest, hold out one
//! acquisition run at a time, fit a linear classifier on the remaining runs
//! and average the held-out accuracies. A sweep repeats this over every
//! region and contrast and reports one row per combination.
//!
//! ## Design Principles (Toyota Way Aligned)
//!
//! - **Jidoka**: A failing combination is flagged in its row, never aborts the sweep
//! - **Poka-Yoke**: Typed label records and explicit configuration, no column-name lookups
//! - **Genchi Genbutsu**: Per-fold outcomes are kept, including why a fold was skipped
//! - **Heijunka**: Deterministic solvers and fold order give bit-identical reruns
//!
//! ## Example Usage
//!
//! ```rust
//! use trueno_decode::evaluate::DecodingEvaluator;
//! use trueno_decode::labels::LabelTable;
//! use trueno_decode::sweep::{Contrast, Region, RegionContrastSweep};
//! use trueno_decode::volume::{FrameData, Mask};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let labels = LabelTable::from_pairs([
//!     ("face", 0), ("house", 0),
//!     ("face", 1), ("house", 1),
//!     ("face", 2), ("house", 2),
//! ]);
//! let data = FrameData::new([2, 1, 1], 6, vec![
//!     1.0, 0.2, -1.0, 0.2,
//!     0.9, 0.0, -1.1, 0.0,
//!     1.2, 0.1, -0.8, 0.1,
//! ])?;
//!
//! let sweep = RegionContrastSweep::new(&data, &labels, DecodingEvaluator::default());
//! let table = sweep.run(
//!     &[Region::new("whole brain", Mask::full([2, 1, 1]))],
//!     &[Contrast::pair("face", "house")],
//! );
//! println!("{table}");
//! assert_eq!(table.rows()[0].accuracy_pct, Some(100.0));
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]

pub mod aggregate;
pub mod classifier;
pub mod config;
pub mod error;
pub mod evaluate;
pub mod folds;
pub mod labels;
pub mod scaler;
pub mod scoring;
pub mod selection;
pub mod significance;
pub mod simd;
pub mod sweep;
pub mod volume;

pub use config::DecoderConfig;
pub use error::{Error, FailureKind, Result};
