//! CLI argument definitions

use clap::Parser;
use std::path::PathBuf;

use crate::pipeline::RunConfig;

#[derive(Parser, Debug)]
#[command(
    name = "tarmac-prof",
    version,
    about = "Turn instruction traces into flame-graph timelines and code coverage",
    after_help = "\
EXAMPLES:
    tarmac-prof image.sym run.log trace.json          Flame graph for Perfetto / chrome://tracing
    tarmac-prof image.sym run.log stats.csv           Per-invocation statistics table
    tarmac-prof image.sym run.log trace.json --coverage-details --coverage cov.txt"
)]
pub struct Args {
    /// Symbol listing produced by `fromelf -s`
    #[arg(value_name = "SYMBOLS")]
    pub symbols: PathBuf,

    /// Instruction trace (MDK ETM export or FVP tarmac log)
    #[arg(value_name = "TRACE")]
    pub trace: PathBuf,

    /// Timeline output (`.json` writes a flame graph, anything else a statistics table)
    #[arg(value_name = "OUTPUT")]
    pub output: PathBuf,

    /// Coverage report path
    #[arg(long, value_name = "FILE", default_value = "coverage")]
    pub coverage: PathBuf,

    /// List every executed address and its hit count in the coverage report
    #[arg(long)]
    pub coverage_details: bool,

    /// Close frames still open at the end of the trace
    #[arg(long)]
    pub flush_open_frames: bool,

    /// Suppress progress and summary output
    #[arg(short, long)]
    pub quiet: bool,
}

impl From<&Args> for RunConfig {
    fn from(args: &Args) -> Self {
        Self {
            symbols: args.symbols.clone(),
            trace: args.trace.clone(),
            output: args.output.clone(),
            coverage: args.coverage.clone(),
            coverage_details: args.coverage_details,
            flush_open_frames: args.flush_open_frames,
            quiet: args.quiet,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_positional_arguments_and_defaults() {
        let args = Args::try_parse_from(["tarmac-prof", "image.sym", "run.log", "out.json"]).unwrap();
        let config = RunConfig::from(&args);

        assert_eq!(config.symbols, PathBuf::from("image.sym"));
        assert_eq!(config.trace, PathBuf::from("run.log"));
        assert_eq!(config.output, PathBuf::from("out.json"));
        assert_eq!(config.coverage, PathBuf::from("coverage"));
        assert!(!config.coverage_details);
        assert!(!config.flush_open_frames);
        assert!(!config.quiet);
    }

    #[test]
    fn test_flags() {
        let args = Args::try_parse_from([
            "tarmac-prof",
            "image.sym",
            "run.log",
            "out.csv",
            "--coverage",
            "cov.txt",
            "--coverage-details",
            "--flush-open-frames",
            "-q",
        ])
        .unwrap();
        let config = RunConfig::from(&args);

        assert_eq!(config.coverage, PathBuf::from("cov.txt"));
        assert!(config.coverage_details);
        assert!(config.flush_open_frames);
        assert!(config.quiet);
    }

    #[test]
    fn test_missing_output_rejected() {
        assert!(Args::try_parse_from(["tarmac-prof", "image.sym", "run.log"]).is_err());
    }
}
