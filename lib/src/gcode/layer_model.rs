//! Layer boundary detection.
//!
//! Slicers announce layers in two ways: an explicit comment carrying the
//! layer number (`;LAYER:12`, `; layer 12`) or simply a move to a higher Z.
//! The scan treats the comment as authoritative and falls back to Z moves,
//! evaluating both per line with a fixed precedence:
//!
//! 1. A layer comment sets the counter to its literal number and records a
//!    marker at the height reached so far. Z is not inspected on that line.
//! 2. Otherwise a `G0`/`G1` with a Z strictly above the running height raises
//!    the height, bumps the counter by one and records a marker.
//! 3. Anything else leaves the state unchanged.
//!
//! Files that mix both styles can therefore yield repeated or non-monotonic
//! layer numbers. The scan keeps them as-is.

use lazy_static::lazy_static;
use regex::Regex;
use tracing::{debug, info, warn};

use super::buffer::LineSequence;

lazy_static! {
    /// `; LAYER:5`, `;layer 5`, `; LAYER_5`
    static ref LAYER_COMMENT_RE: Regex = Regex::new(r"(?i);\s*LAYER[_\s:]*(\d+)").unwrap();

    /// `G1 X10 Z0.4 F3000`; greedy, so the last Z on the line is taken.
    static ref Z_MOVE_RE: Regex = Regex::new(r"(?i)^G[01]\s+.*Z([\d.]+)").unwrap();
}

/// Start of a detected layer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LayerMarker {
    /// Layer number, either annotated or counted from Z moves.
    pub layer_index: usize,
    /// Index of the line that produced this marker.
    pub line_offset: usize,
    /// Highest Z (mm) seen up to and including that line.
    pub height: f64,
}

/// Running state of the layer scan.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ScanState {
    /// Current layer counter.
    pub layer: usize,
    /// Highest Z seen so far (mm).
    pub height: f64,
}

impl ScanState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Advance the scan by one line.
    ///
    /// Returns the next state and the marker this line produced, if any.
    pub fn step(self, line_index: usize, line: &str) -> (Self, Option<LayerMarker>) {
        let trimmed = line.trim();

        if let Some(layer) = explicit_layer(trimmed, line_index) {
            let marker = LayerMarker {
                layer_index: layer,
                line_offset: line_index,
                height: self.height,
            };
            return (
                Self {
                    layer,
                    height: self.height,
                },
                Some(marker),
            );
        }

        match z_move(trimmed, line_index) {
            Some(z) if z > self.height => {
                let next = Self {
                    layer: self.layer.saturating_add(1),
                    height: z,
                };
                let marker = LayerMarker {
                    layer_index: next.layer,
                    line_offset: line_index,
                    height: z,
                };
                (next, Some(marker))
            }
            _ => (self, None),
        }
    }
}

/// Parse an explicit layer comment, returning its layer number.
fn explicit_layer(trimmed: &str, line_index: usize) -> Option<usize> {
    let caps = LAYER_COMMENT_RE.captures(trimmed)?;
    let digits = caps.get(1)?.as_str();
    match digits.parse::<usize>() {
        Ok(layer) => Some(layer),
        Err(_) => {
            warn!("Ignoring unparseable layer number '{}' on line {}", digits, line_index);
            None
        }
    }
}

/// Parse the Z coordinate of a `G0`/`G1` move.
fn z_move(trimmed: &str, line_index: usize) -> Option<f64> {
    let caps = Z_MOVE_RE.captures(trimmed)?;
    let value = caps.get(1)?.as_str();
    match value.parse::<f64>() {
        Ok(z) => Some(z),
        Err(_) => {
            warn!("Ignoring unparseable Z value '{}' on line {}", value, line_index);
            None
        }
    }
}

/// Ordered layer markers for one G-code file.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LayerModel {
    markers: Vec<LayerMarker>,
    max_height: f64,
}

impl LayerModel {
    /// Scan a loaded sequence.
    pub fn build(lines: &LineSequence) -> Self {
        Self::from_lines(lines.iter())
    }

    /// Scan any ordered sequence of lines.
    pub fn from_lines<'a, I>(lines: I) -> Self
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut markers = Vec::new();
        let state = lines
            .into_iter()
            .enumerate()
            .fold(ScanState::new(), |state, (index, line)| {
                let (next, marker) = state.step(index, line);
                if let Some(marker) = marker {
                    debug!(
                        "Layer {} at line {} (height: {:.2}mm)",
                        marker.layer_index, marker.line_offset, marker.height
                    );
                    markers.push(marker);
                }
                next
            });

        info!(
            "Detected {} layers, max height: {:.2}mm",
            markers.len(),
            state.height
        );

        Self {
            markers,
            max_height: state.height,
        }
    }

    pub fn markers(&self) -> &[LayerMarker] {
        &self.markers
    }

    /// Highest Z reached anywhere in the file (mm).
    pub fn max_height(&self) -> f64 {
        self.max_height
    }

    /// Number of markers recorded.
    pub fn layer_count(&self) -> usize {
        self.markers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.markers.is_empty()
    }
}
