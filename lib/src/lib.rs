//! # colorswap
//!
//! Post-processing for sliced G-code: find the line where a given layer or
//! print height begins and splice in a filament color swap block there.
//!
//! ## Pipeline
//!
//! 1. [`LineSequence`] holds the file as owned lines with their terminators.
//! 2. [`LayerModel`] scans it once and records where each layer starts.
//! 3. [`resolve`] maps a [`TargetSpec`] (layer number or height) to a line offset.
//! 4. [`SwapMode`] produces the fixed instruction block that gets spliced in.
//!
//! [`SwapJob`] wires these together with file loading, output naming and saving.
//!
//! ```rust,ignore
//! use colorswap::{LayerModel, LineSequence, SwapMode, TargetKind, TargetSpec};
//!
//! let mut lines = LineSequence::load("bow_tie.gcode")?;
//! let model = LayerModel::build(&lines);
//! let target = TargetSpec::new(TargetKind::Height, 1.0)?;
//! if let Some(offset) = colorswap::resolve(model.markers(), &target).offset() {
//!     lines.splice(offset, SwapMode::Manual.lines())?;
//! }
//! lines.save("bow_tie_swap_H1.0mm.gcode")?;
//! ```

use std::path::PathBuf;

pub mod gcode;
pub mod job;

pub use gcode::buffer::LineSequence;
pub use gcode::color_swap::SwapMode;
pub use gcode::insertion::{resolve, resolve_marker, InsertionOutcome, TargetKind, TargetSpec};
pub use gcode::layer_model::{LayerMarker, LayerModel, ScanState};
pub use gcode::stats::GCodeStats;
pub use job::{SwapJob, SwapJobPatch, SwapReport};

/// Errors produced while loading, resolving, splicing or saving G-code.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The input file could not be located or read.
    #[error("Failed to load {}: {source}", .path.display())]
    Load {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The output file could not be written.
    #[error("Failed to save {}: {source}", .path.display())]
    Save {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// No layer marker satisfies the requested target.
    #[error("Could not find insertion point for {target}")]
    InsertionPointNotFound { target: TargetSpec },

    /// A caller supplied a value outside the accepted domain.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;
