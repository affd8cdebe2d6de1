//! Insertion point resolution.
//!
//! Matching is first-match in scan order, not closest-match: when several
//! markers share a layer number the earliest one wins.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::info;

use super::layer_model::LayerMarker;
use crate::{Error, Result};

/// What the target value refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TargetKind {
    /// A layer number; fractional values are truncated toward zero.
    Layer,
    /// A print height in millimeters.
    Height,
}

impl TargetKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TargetKind::Layer => "layer",
            TargetKind::Height => "height",
        }
    }
}

impl fmt::Display for TargetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TargetKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "layer" => Ok(TargetKind::Layer),
            "height" => Ok(TargetKind::Height),
            other => Err(Error::InvalidArgument(format!(
                "unknown target kind '{}', expected 'layer' or 'height'",
                other
            ))),
        }
    }
}

/// Where the caller wants the swap to happen.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TargetSpec {
    kind: TargetKind,
    value: f64,
}

impl TargetSpec {
    /// Create a target, rejecting NaN and infinite values.
    pub fn new(kind: TargetKind, value: f64) -> Result<Self> {
        if !value.is_finite() {
            return Err(Error::InvalidArgument(format!(
                "{} target must be a finite number, got {}",
                kind, value
            )));
        }
        Ok(Self { kind, value })
    }

    pub fn layer(layer: i64) -> Self {
        Self {
            kind: TargetKind::Layer,
            value: layer as f64,
        }
    }

    pub fn height(height: f64) -> Result<Self> {
        Self::new(TargetKind::Height, height)
    }

    pub fn kind(&self) -> TargetKind {
        self.kind
    }

    pub fn value(&self) -> f64 {
        self.value
    }

    /// The target layer number, truncated toward zero.
    pub fn layer_number(&self) -> i64 {
        self.value.trunc() as i64
    }

    /// Whether `marker` satisfies this target.
    pub fn matches(&self, marker: &LayerMarker) -> bool {
        match self.kind {
            TargetKind::Layer => {
                i64::try_from(marker.layer_index)
                    .map_or(true, |layer| layer >= self.layer_number())
            }
            TargetKind::Height => marker.height >= self.value,
        }
    }
}

impl fmt::Display for TargetSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            TargetKind::Layer => write!(f, "layer {}", self.layer_number()),
            TargetKind::Height => write!(f, "height {}mm", self.value),
        }
    }
}

/// Outcome of resolving a target against the layer markers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertionOutcome {
    /// Insert immediately before this line offset.
    Found(usize),
    NotFound,
}

impl InsertionOutcome {
    pub fn offset(&self) -> Option<usize> {
        match self {
            InsertionOutcome::Found(offset) => Some(*offset),
            InsertionOutcome::NotFound => None,
        }
    }
}

/// Return the first marker, in scan order, that satisfies `target`.
pub fn resolve_marker<'a>(
    markers: &'a [LayerMarker],
    target: &TargetSpec,
) -> Option<&'a LayerMarker> {
    let found = markers.iter().find(|marker| target.matches(marker));
    if let Some(marker) = found {
        info!(
            "Found insertion point: Layer {} at line {} (height: {:.2}mm)",
            marker.layer_index, marker.line_offset, marker.height
        );
    }
    found
}

/// Resolve `target` to the line offset where the swap block belongs.
pub fn resolve(markers: &[LayerMarker], target: &TargetSpec) -> InsertionOutcome {
    match resolve_marker(markers, target) {
        Some(marker) => InsertionOutcome::Found(marker.line_offset),
        None => InsertionOutcome::NotFound,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn marker(layer_index: usize, line_offset: usize, height: f64) -> LayerMarker {
        LayerMarker {
            layer_index,
            line_offset,
            height,
        }
    }

    fn ramp() -> Vec<LayerMarker> {
        (1..=5)
            .map(|i| marker(i, i * 10, i as f64 * 0.2))
            .collect()
    }

    #[test]
    fn test_height_first_at_or_above() {
        let target = TargetSpec::height(0.7).unwrap();
        assert_eq!(resolve(&ramp(), &target), InsertionOutcome::Found(40));
    }

    #[test]
    fn test_height_exact_match() {
        let target = TargetSpec::height(0.2).unwrap();
        assert_eq!(resolve(&ramp(), &target), InsertionOutcome::Found(10));
    }

    #[test]
    fn test_layer_exact_and_truncated() {
        let markers = ramp();
        assert_eq!(resolve(&markers, &TargetSpec::layer(3)), InsertionOutcome::Found(30));

        let fractional = TargetSpec::new(TargetKind::Layer, 3.9).unwrap();
        assert_eq!(fractional.layer_number(), 3);
        assert_eq!(resolve(&markers, &fractional), InsertionOutcome::Found(30));
    }

    #[test]
    fn test_layer_first_match_on_duplicates() {
        let markers = vec![
            marker(1, 2, 0.0),
            marker(2, 5, 0.2),
            marker(2, 8, 0.2),
            marker(3, 11, 0.4),
        ];
        assert_eq!(resolve(&markers, &TargetSpec::layer(2)), InsertionOutcome::Found(5));
    }

    #[test]
    fn test_layer_first_match_not_closest() {
        // An annotated jump to 9 precedes the real layer 4.
        let markers = vec![marker(1, 0, 0.2), marker(9, 3, 0.2), marker(4, 6, 0.4)];
        assert_eq!(resolve(&markers, &TargetSpec::layer(4)), InsertionOutcome::Found(3));
    }

    #[test]
    fn test_negative_layer_matches_first_marker() {
        let target = TargetSpec::new(TargetKind::Layer, -2.5).unwrap();
        assert_eq!(resolve(&ramp(), &target), InsertionOutcome::Found(10));
    }

    #[test]
    fn test_target_beyond_model_not_found() {
        let markers = ramp();
        assert_eq!(resolve(&markers, &TargetSpec::layer(6)), InsertionOutcome::NotFound);
        let too_high = TargetSpec::height(1.01).unwrap();
        assert_eq!(resolve(&markers, &too_high), InsertionOutcome::NotFound);
        assert_eq!(resolve(&markers, &too_high).offset(), None);
    }

    #[test]
    fn test_empty_markers_not_found() {
        assert_eq!(resolve(&[], &TargetSpec::layer(0)), InsertionOutcome::NotFound);
        assert_eq!(
            resolve(&[], &TargetSpec::height(0.0).unwrap()),
            InsertionOutcome::NotFound
        );
    }

    #[test]
    fn test_non_finite_target_rejected() {
        assert!(TargetSpec::new(TargetKind::Height, f64::NAN).is_err());
        assert!(TargetSpec::new(TargetKind::Layer, f64::INFINITY).is_err());
    }

    #[test]
    fn test_target_kind_parse() {
        assert_eq!("layer".parse::<TargetKind>().unwrap(), TargetKind::Layer);
        assert_eq!("HEIGHT".parse::<TargetKind>().unwrap(), TargetKind::Height);
        assert!("z".parse::<TargetKind>().is_err());
    }

    #[test]
    fn test_target_display() {
        assert_eq!(TargetSpec::layer(5).to_string(), "layer 5");
        assert_eq!(TargetSpec::height(1.5).unwrap().to_string(), "height 1.5mm");
    }
}
