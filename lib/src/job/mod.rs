//! Color swap jobs.
//!
//! A [`SwapJob`] describes one insertion: which file, where (layer or height),
//! which swap mode and where to write the result. Jobs can be built in code,
//! from command line flags, or loaded from a JSON file:
//!
//! ```json
//! {
//!   "input": "bow_tie.gcode",
//!   "by": "height",
//!   "value": 1.0,
//!   "mode": "pause",
//!   "output": "bow_tie_blue_top.gcode"
//! }
//! ```
//!
//! Nothing is written unless the insertion point resolves and the splice
//! succeeds.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::gcode::{
    resolve_marker, GCodeStats, LayerMarker, LayerModel, LineSequence, SwapMode, TargetKind,
    TargetSpec,
};
use crate::{Error, Result};

/// A single color swap request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SwapJob {
    /// G-code file to modify.
    pub input: PathBuf,

    /// Whether `value` is a layer number or a height.
    pub by: TargetKind,

    /// Layer number or height (mm).
    pub value: f64,

    /// Swap procedure to insert.
    pub mode: SwapMode,

    /// Output path. Derived from the input name when absent.
    #[serde(default)]
    pub output: Option<PathBuf>,

    /// Report what would be done without writing anything.
    #[serde(default)]
    pub dry_run: bool,

    /// Log file statistics before processing.
    #[serde(default)]
    pub verbose: bool,
}

impl SwapJob {
    pub fn new<P: Into<PathBuf>>(input: P, by: TargetKind, value: f64, mode: SwapMode) -> Self {
        Self {
            input: input.into(),
            by,
            value,
            mode,
            output: None,
            dry_run: false,
            verbose: false,
        }
    }

    pub fn with_output<P: Into<PathBuf>>(mut self, output: P) -> Self {
        self.output = Some(output.into());
        self
    }

    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    /// Load a job from a JSON file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|source| Error::Load {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&content)
    }

    /// Parse a job from a JSON string.
    pub fn from_json(json: &str) -> Result<Self> {
        let job: Self = serde_json::from_str(json)?;
        job.validate()?;
        Ok(job)
    }

    /// Serialize to a JSON string.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn validate(&self) -> Result<()> {
        if self.input.as_os_str().is_empty() {
            return Err(Error::InvalidArgument("input path is empty".into()));
        }
        self.target().map(|_| ())
    }

    pub fn target(&self) -> Result<TargetSpec> {
        TargetSpec::new(self.by, self.value)
    }

    /// The explicit output path, or one generated from the input name.
    pub fn output_path(&self) -> PathBuf {
        self.output
            .clone()
            .unwrap_or_else(|| generate_output_path(&self.input, self.by, self.value))
    }

    /// Apply the swap to an in-memory sequence.
    ///
    /// In dry-run mode `lines` is left untouched and the report describes the
    /// splice that would have happened.
    pub fn apply(&self, lines: &mut LineSequence) -> Result<SwapReport> {
        let target = self.target()?;
        let model = LayerModel::build(lines);
        let stats = GCodeStats::collect(lines, &model);
        if self.verbose {
            info!("{}", stats.summary().trim_end());
        }

        let marker = *resolve_marker(model.markers(), &target)
            .ok_or(Error::InsertionPointNotFound { target })?;

        let block = self.mode.lines();
        let inserted = block.len();
        let final_total_lines = if self.dry_run {
            info!(
                "DRY RUN: Would insert color swap commands at line {}",
                marker.line_offset
            );
            lines.len() + inserted
        } else {
            lines.splice(marker.line_offset, block)?;
            info!(
                "Inserted {} color swap commands in {} mode",
                inserted, self.mode
            );
            lines.len()
        };

        Ok(SwapReport {
            target,
            marker,
            insertion_line: marker.line_offset,
            mode: self.mode,
            inserted_lines: self.mode.template().iter().map(|l| l.to_string()).collect(),
            output: self.output_path(),
            final_total_lines,
            dry_run: self.dry_run,
            stats,
        })
    }

    /// Load the input, apply the swap, and save unless this is a dry run.
    pub fn run(&self) -> Result<SwapReport> {
        self.validate()?;
        info!("Processing G-code file: {}", self.input.display());
        info!("Target: {} {}", self.by, self.value);
        info!("Mode: {}", self.mode);
        info!("Output: {}", self.output_path().display());

        let mut lines = LineSequence::load(&self.input)?;
        let report = self.apply(&mut lines)?;
        if !report.dry_run {
            lines.save(&report.output)?;
        }
        Ok(report)
    }
}

/// A job file whose fields may all be missing.
///
/// Used when a job file only supplies defaults and the remaining fields come
/// from somewhere else, such as command line flags.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct SwapJobPatch {
    #[serde(default)]
    pub input: Option<PathBuf>,
    #[serde(default)]
    pub by: Option<TargetKind>,
    #[serde(default)]
    pub value: Option<f64>,
    #[serde(default)]
    pub mode: Option<SwapMode>,
    #[serde(default)]
    pub output: Option<PathBuf>,
    #[serde(default)]
    pub dry_run: Option<bool>,
    #[serde(default)]
    pub verbose: Option<bool>,
}

impl SwapJobPatch {
    /// Load a partial job from a JSON file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|source| Error::Load {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&content)
    }

    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Fill every field left empty in `self` from `base`.
    pub fn or(self, base: SwapJobPatch) -> Self {
        Self {
            input: self.input.or(base.input),
            by: self.by.or(base.by),
            value: self.value.or(base.value),
            mode: self.mode.or(base.mode),
            output: self.output.or(base.output),
            dry_run: self.dry_run.or(base.dry_run),
            verbose: self.verbose.or(base.verbose),
        }
    }

    /// Build a validated job, failing on the first required field still missing.
    pub fn into_job(self) -> Result<SwapJob> {
        let missing =
            |name: &str| Error::InvalidArgument(format!("missing required field: {}", name));

        let mut job = SwapJob::new(
            self.input.ok_or_else(|| missing("input"))?,
            self.by.ok_or_else(|| missing("by"))?,
            self.value.ok_or_else(|| missing("value"))?,
            self.mode.ok_or_else(|| missing("mode"))?,
        )
        .with_dry_run(self.dry_run.unwrap_or(false))
        .with_verbose(self.verbose.unwrap_or(false));
        if let Some(output) = self.output {
            job = job.with_output(output);
        }

        job.validate()?;
        Ok(job)
    }
}

/// Result of applying a [`SwapJob`].
#[derive(Debug, Clone, PartialEq)]
pub struct SwapReport {
    pub target: TargetSpec,
    /// Marker chosen for the insertion.
    pub marker: LayerMarker,
    /// Line offset the block was (or would be) inserted before.
    pub insertion_line: usize,
    pub mode: SwapMode,
    /// Inserted block, without terminators.
    pub inserted_lines: Vec<String>,
    pub output: PathBuf,
    /// Line count after the splice (projected for dry runs).
    pub final_total_lines: usize,
    pub dry_run: bool,
    /// Statistics of the input before modification.
    pub stats: GCodeStats,
}

/// Derive an output name such as `part_swap_L5.gcode` or `part_swap_H1.2mm.gcode`.
pub fn generate_output_path(input: &Path, by: TargetKind, value: f64) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let ext = input
        .extension()
        .map(|e| format!(".{}", e.to_string_lossy()))
        .unwrap_or_default();
    let suffix = match by {
        TargetKind::Layer => format!("_swap_L{}", value.trunc() as i64),
        TargetKind::Height => format!("_swap_H{:.1}mm", value),
    };
    input.with_file_name(format!("{}{}{}", stem, suffix, ext))
}
