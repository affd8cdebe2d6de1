//! Command line front end.
//!
//! ```text
//! colorswap --input bow_tie.gcode --by layer --value 5 --mode m600
//! colorswap --input bow_tie.gcode --by height --value 1.0 --mode pause --output custom.gcode
//! colorswap --config job.json --dry-run
//! ```

use std::path::PathBuf;
use std::process::ExitCode;

use colorswap::{Error, SwapJob, SwapJobPatch, SwapReport};
use tracing::{error, Level};

const USAGE: &str = "\
Insert color swap commands into G-code files

Usage: colorswap --input <FILE> --by <layer|height> --value <N> --mode <m600|pause> [OPTIONS]

Options:
  -i, --input <FILE>     Input G-code file path
      --by <KIND>        Insert by layer number or height in mm
  -v, --value <N>        Layer number or height value for insertion
  -m, --mode <MODE>      Color swap mode: m600 (firmware) or pause (manual)
  -o, --output <FILE>    Output file path (auto-generated if not specified)
      --config <FILE>    Load the job from a JSON file; flags override its fields
      --dry-run          Show what would be done without modifying files
      --verbose          Show detailed processing information
  -h, --help             Print this help
";

/// Flags as given. Any job field left unset is taken from `--config`.
#[derive(Debug, Default)]
struct CliArgs {
    job: SwapJobPatch,
    config: Option<PathBuf>,
    help: bool,
}

impl CliArgs {
    fn parse<I: IntoIterator<Item = String>>(args: I) -> colorswap::Result<Self> {
        let mut parsed = CliArgs::default();
        let mut args = args.into_iter();

        while let Some(arg) = args.next() {
            let (flag, inline) = match arg.split_once('=') {
                Some((flag, value)) if flag.starts_with("--") => {
                    (flag.to_string(), Some(value.to_string()))
                }
                _ => (arg.clone(), None),
            };
            let mut value = |name: &str| -> colorswap::Result<String> {
                inline
                    .clone()
                    .or_else(|| args.next())
                    .ok_or_else(|| Error::InvalidArgument(format!("{} requires a value", name)))
            };
            let switch = |name: &str| -> colorswap::Result<bool> {
                match &inline {
                    Some(_) => Err(Error::InvalidArgument(format!(
                        "{} does not take a value",
                        name
                    ))),
                    None => Ok(true),
                }
            };

            match flag.as_str() {
                "-i" | "--input" => parsed.job.input = Some(PathBuf::from(value("--input")?)),
                "--by" => parsed.job.by = Some(value("--by")?.parse()?),
                "-v" | "--value" => {
                    let raw = value("--value")?;
                    let number = raw.trim().parse::<f64>().map_err(|_| {
                        Error::InvalidArgument(format!("invalid number for --value: '{}'", raw))
                    })?;
                    parsed.job.value = Some(number);
                }
                "-m" | "--mode" => parsed.job.mode = Some(value("--mode")?.parse()?),
                "-o" | "--output" => parsed.job.output = Some(PathBuf::from(value("--output")?)),
                "--config" => parsed.config = Some(PathBuf::from(value("--config")?)),
                "--dry-run" => parsed.job.dry_run = Some(switch("--dry-run")?),
                "--verbose" => parsed.job.verbose = Some(switch("--verbose")?),
                "-h" | "--help" => parsed.help = switch("--help")?,
                other => {
                    return Err(Error::InvalidArgument(format!("unexpected argument '{}'", other)))
                }
            }
        }

        Ok(parsed)
    }

    /// Merge flags over the optional config file into a complete job.
    fn into_job(self) -> colorswap::Result<SwapJob> {
        let base = match &self.config {
            Some(path) => SwapJobPatch::from_file(path)?,
            None => SwapJobPatch::default(),
        };
        self.job.or(base).into_job()
    }
}

/// Whether an error comes from bad input rather than a failed run.
fn is_usage_error(e: &Error) -> bool {
    matches!(e, Error::InvalidArgument(_) | Error::Json(_))
}

fn init_logging(verbose: bool) {
    let level = if verbose { Level::DEBUG } else { Level::INFO };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_max_level(level)
        .with_target(false)
        .init();
}

fn print_report(report: &SwapReport) {
    if report.dry_run {
        println!(
            "DRY RUN: Would insert color swap commands at line {}",
            report.insertion_line
        );
        println!("Commands that would be inserted:");
        for line in &report.inserted_lines {
            println!("  {}", line);
        }
        println!("Output would be saved to: {}", report.output.display());
        return;
    }

    println!("{}", "-".repeat(50));
    println!("Color swap insertion completed successfully!");
    println!("Modified G-code saved to: {}", report.output.display());
    println!("Final file: {} lines", report.final_total_lines);
}

fn main() -> ExitCode {
    let args = match CliArgs::parse(std::env::args().skip(1)) {
        Ok(args) => args,
        Err(e) => {
            eprintln!("error: {}\n\n{}", e, USAGE);
            return ExitCode::from(2);
        }
    };

    if args.help {
        print!("{}", USAGE);
        return ExitCode::SUCCESS;
    }

    let verbose_flag = args.job.verbose.unwrap_or(false);
    let job = match args.into_job() {
        Ok(job) => job,
        Err(e) if is_usage_error(&e) => {
            eprintln!("error: {}\n\n{}", e, USAGE);
            return ExitCode::from(2);
        }
        Err(e) => {
            init_logging(verbose_flag);
            error!("{}", e);
            return ExitCode::FAILURE;
        }
    };

    init_logging(job.verbose);

    match job.run() {
        Ok(report) => {
            print_report(&report);
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("{}", e);
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use colorswap::{SwapMode, TargetKind};
    use std::fs;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_parse_full_command() {
        let parsed = CliArgs::parse(args(&[
            "-i",
            "bow_tie.gcode",
            "--by",
            "height",
            "--value",
            "1.0",
            "--mode",
            "pause",
            "--dry-run",
        ]))
        .unwrap();
        let job = parsed.into_job().unwrap();

        assert_eq!(job.input, PathBuf::from("bow_tie.gcode"));
        assert_eq!(job.by, TargetKind::Height);
        assert_eq!(job.value, 1.0);
        assert_eq!(job.mode, SwapMode::Manual);
        assert!(job.dry_run);
        assert_eq!(job.output_path(), PathBuf::from("bow_tie_swap_H1.0mm.gcode"));
    }

    #[test]
    fn test_parse_inline_values() {
        let parsed =
            CliArgs::parse(args(&["--input=a.gcode", "--by=layer", "--value=5", "--mode=m600"]))
                .unwrap();
        let job = parsed.into_job().unwrap();
        assert_eq!(job.by, TargetKind::Layer);
        assert_eq!(job.mode, SwapMode::Automated);
    }

    #[test]
    fn test_missing_required_argument() {
        let parsed = CliArgs::parse(args(&["--input", "a.gcode", "--by", "layer"])).unwrap();
        let err = parsed.into_job().unwrap_err();
        assert!(err.to_string().contains("value"));
        assert!(is_usage_error(&err));
    }

    #[test]
    fn test_rejects_bad_values() {
        assert!(CliArgs::parse(args(&["--mode", "purge"])).is_err());
        assert!(CliArgs::parse(args(&["--by", "z"])).is_err());
        assert!(CliArgs::parse(args(&["--value", "abc"])).is_err());
        assert!(CliArgs::parse(args(&["--value"])).is_err());
        assert!(CliArgs::parse(args(&["--frobnicate"])).is_err());
    }

    #[test]
    fn test_nan_value_rejected() {
        let parsed =
            CliArgs::parse(args(&["-i", "a.gcode", "--by", "height", "-v", "NaN", "-m", "pause"]))
                .unwrap();
        assert!(matches!(parsed.into_job(), Err(Error::InvalidArgument(_))));
    }

    #[test]
    fn test_switches_reject_inline_values() {
        for flag in ["--dry-run=no", "--verbose=1", "--help=yes"] {
            let err = CliArgs::parse(args(&[flag])).unwrap_err();
            assert!(is_usage_error(&err), "flag {:?}", flag);
        }
    }

    #[test]
    fn test_flags_override_config_file() {
        let dir = tempfile::tempdir().unwrap();
        let config = dir.path().join("job.json");
        fs::write(
            &config,
            r#"{ "input": "part.gcode", "by": "height", "value": 2.0, "mode": "pause",
                 "output": "part_blue.gcode", "dry_run": true }"#,
        )
        .unwrap();
        let config_arg = config.to_string_lossy().into_owned();

        let parsed = CliArgs::parse(args(&[
            "--config",
            config_arg.as_str(),
            "--value",
            "0.6",
            "--mode",
            "m600",
        ]))
        .unwrap();
        let job = parsed.into_job().unwrap();

        assert_eq!(job.input, PathBuf::from("part.gcode"));
        assert_eq!(job.by, TargetKind::Height);
        assert_eq!(job.value, 0.6);
        assert_eq!(job.mode, SwapMode::Automated);
        assert!(job.dry_run);
        assert_eq!(job.output_path(), PathBuf::from("part_blue.gcode"));
    }

    #[test]
    fn test_partial_config_completed_by_flags() {
        let dir = tempfile::tempdir().unwrap();
        let config = dir.path().join("partial.json");
        fs::write(&config, r#"{ "input": "p.gcode", "mode": "m600" }"#).unwrap();
        let config_arg = config.to_string_lossy().into_owned();

        let flags = ["--config", config_arg.as_str(), "--by", "layer", "--value", "1"];
        let parsed = CliArgs::parse(args(&flags)).unwrap();
        let job = parsed.into_job().unwrap();

        assert_eq!(job.by, TargetKind::Layer);
        assert_eq!(job.value, 1.0);
        assert_eq!(job.mode, SwapMode::Automated);
        assert!(!job.dry_run);
    }

    #[test]
    fn test_invalid_config_is_usage_error() {
        let dir = tempfile::tempdir().unwrap();
        let config = dir.path().join("bad.json");
        fs::write(
            &config,
            r#"{ "input": "p.gcode", "by": "layer", "value": 1, "mode": "purge" }"#,
        )
        .unwrap();
        let config_arg = config.to_string_lossy().into_owned();

        let err = CliArgs::parse(args(&["--config", config_arg.as_str()]))
            .unwrap()
            .into_job()
            .unwrap_err();
        assert!(matches!(err, Error::Json(_)));
        assert!(is_usage_error(&err));

        let missing = dir.path().join("missing.json").to_string_lossy().into_owned();
        let err = CliArgs::parse(args(&["--config", missing.as_str()]))
            .unwrap()
            .into_job()
            .unwrap_err();
        assert!(matches!(err, Error::Load { .. }));
        assert!(!is_usage_error(&err));
    }
}
