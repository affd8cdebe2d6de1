//! G-code line handling for color swap insertion.
//!
//! - [`buffer`]: the owned line sequence and the splice operation
//! - [`layer_model`]: single-pass layer boundary detection
//! - [`insertion`]: mapping a layer/height target to a line offset
//! - [`color_swap`]: the fixed swap instruction blocks
//! - [`stats`]: diagnostics about a loaded file

pub mod buffer;
pub mod color_swap;
pub mod insertion;
pub mod layer_model;
pub mod stats;

pub use buffer::LineSequence;
pub use color_swap::SwapMode;
pub use insertion::{resolve, resolve_marker, InsertionOutcome, TargetKind, TargetSpec};
pub use layer_model::{LayerMarker, LayerModel, ScanState};
pub use stats::GCodeStats;
