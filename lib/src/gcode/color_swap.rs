//! Color swap instruction blocks.
//!
//! Two fixed templates are available. `Automated` hands the whole change to
//! the firmware via `M600`. `Manual` parks the head with explicit moves and
//! blocks on `M0` until the operator resumes. Feed rates, retraction and park
//! coordinates are literals; they are not derived from the surrounding file.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

const AUTOMATED_TEMPLATE: [&str; 8] = [
    "; === COLOR SWAP - M600 FILAMENT CHANGE ===",
    "M600 ; Firmware filament change",
    "; Printer will:",
    ";   1. Pause and park nozzle",
    ";   2. Retract filament automatically",
    ";   3. Wait for user to change filament",
    ";   4. Purge and resume when confirmed",
    "; === RESUME PRINTING WITH NEW COLOR ===",
];

const MANUAL_TEMPLATE: [&str; 16] = [
    "; === COLOR SWAP - MANUAL PAUSE ===",
    "M117 Color swap required ; Display message",
    "G91 ; Relative positioning",
    "G1 E-5 F300 ; Retract filament",
    "G1 Z5 F3000 ; Raise Z for clearance",
    "G90 ; Absolute positioning",
    "G1 X10 Y10 F6000 ; Park nozzle",
    "M0 Change filament and press resume ; Infinite pause",
    "; Manual steps:",
    ";   1. Retract remaining filament (10-15mm)",
    ";   2. Remove old filament completely",
    ";   3. Load new filament until visible",
    ";   4. Purge until clean color (50-100mm)",
    ";   5. Press resume to continue",
    "G1 E5 F300 ; Prime extruder",
    "; === RESUME PRINTING WITH NEW COLOR ===",
];

/// How the filament change is carried out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SwapMode {
    /// Firmware filament change (`M600`).
    #[serde(alias = "m600")]
    Automated,
    /// Scripted park and indefinite pause (`M0`).
    #[serde(alias = "pause")]
    Manual,
}

impl SwapMode {
    /// Template lines without terminators.
    pub fn template(&self) -> &'static [&'static str] {
        match self {
            SwapMode::Automated => &AUTOMATED_TEMPLATE,
            SwapMode::Manual => &MANUAL_TEMPLATE,
        }
    }

    /// Template lines terminated with `\n`, ready to splice.
    pub fn lines(&self) -> Vec<String> {
        self.template()
            .iter()
            .map(|line| format!("{}\n", line))
            .collect()
    }

    /// Name as used on the command line.
    pub fn as_str(&self) -> &'static str {
        match self {
            SwapMode::Automated => "m600",
            SwapMode::Manual => "pause",
        }
    }
}

impl fmt::Display for SwapMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SwapMode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "m600" | "automated" => Ok(SwapMode::Automated),
            "pause" | "manual" => Ok(SwapMode::Manual),
            other => Err(Error::InvalidArgument(format!(
                "unknown mode '{}'. Use 'm600' or 'pause'",
                other
            ))),
        }
    }
}
