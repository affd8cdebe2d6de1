//! Diagnostics for a loaded G-code file.

use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::warn;

use super::buffer::LineSequence;
use super::layer_model::LayerModel;

/// Only the header is searched for slicer metadata.
const HEADER_SCAN_LINES: usize = 50;

const UNKNOWN_PRINT_TIME: &str = "Unknown";

lazy_static! {
    static ref PRINT_TIME_RE: Regex =
        Regex::new(r"(?i);\s*estimated printing time.*?(\d+)h?\s*(\d+)m?\s*(\d+)?s?").unwrap();
}

/// Snapshot of a file's size and detected layer structure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GCodeStats {
    pub total_lines: usize,
    pub layers_detected: usize,
    /// Highest Z seen (mm).
    pub max_height: f64,
    /// `HH:MM:SS` from the slicer header, or `Unknown`.
    pub estimated_print_time: String,
}

impl GCodeStats {
    pub fn collect(lines: &LineSequence, model: &LayerModel) -> Self {
        Self {
            total_lines: lines.len(),
            layers_detected: model.layer_count(),
            max_height: model.max_height(),
            estimated_print_time: estimate_print_time(lines)
                .unwrap_or_else(|| UNKNOWN_PRINT_TIME.to_string()),
        }
    }

    /// Multi-line human readable report.
    pub fn summary(&self) -> String {
        format!(
            "File statistics:\n  Total lines: {}\n  Layers detected: {}\n  \
             Max height: {:.2}mm\n  Estimated time: {}\n",
            self.total_lines, self.layers_detected, self.max_height, self.estimated_print_time
        )
    }
}

/// Extract the slicer's print time estimate from the header comments.
///
/// A matching line whose fields do not fit in a `u64` is skipped.
pub fn estimate_print_time(lines: &LineSequence) -> Option<String> {
    lines
        .iter()
        .take(HEADER_SCAN_LINES)
        .enumerate()
        .find_map(|(index, line)| {
            let caps = PRINT_TIME_RE.captures(line)?;
            let mut fields = [0u64; 3];
            for (slot, group) in fields.iter_mut().zip(1..) {
                if let Some(m) = caps.get(group) {
                    match m.as_str().parse::<u64>() {
                        Ok(value) => *slot = value,
                        Err(_) => {
                            warn!(
                                "Ignoring unparseable print time field '{}' on line {}",
                                m.as_str(),
                                index
                            );
                            return None;
                        }
                    }
                }
            }
            Some(format!("{:02}:{:02}:{:02}", fields[0], fields[1], fields[2]))
        })
}
