//! CLI argument definitions using clap
//!
//! ```text
//! minibase <database_dir> <input_file> <output_file>
//!          [--config <path>] [--log-level <level>] [--explain]
//! ```

use clap::Parser;
use std::path::PathBuf;

/// minibase - evaluate one conjunctive query against a directory of
/// relation files
#[derive(Parser, Debug)]
#[command(name = "minibase")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Database directory holding schema.txt and files/
    pub database_dir: PathBuf,

    /// File containing the query
    pub input_file: PathBuf,

    /// File the result rows are written to
    pub output_file: PathBuf,

    /// Optional JSON configuration file
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Minimum log severity (trace, info, warn, error, fatal); overrides the
    /// config file
    #[arg(long)]
    pub log_level: Option<String>,

    /// Also print the operator tree to stdout
    #[arg(long)]
    pub explain: bool,
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Cli::parse()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_positional_arguments() {
        let cli = Cli::try_parse_from(["minibase", "db", "q.txt", "out.csv"]).unwrap();
        assert_eq!(cli.database_dir, PathBuf::from("db"));
        assert_eq!(cli.input_file, PathBuf::from("q.txt"));
        assert_eq!(cli.output_file, PathBuf::from("out.csv"));
        assert!(cli.config.is_none());
        assert!(!cli.explain);
    }

    #[test]
    fn test_optional_flags() {
        let cli = Cli::try_parse_from([
            "minibase",
            "db",
            "q.txt",
            "out.csv",
            "--config",
            "minibase.json",
            "--log-level",
            "info",
            "--explain",
        ])
        .unwrap();
        assert_eq!(cli.config, Some(PathBuf::from("minibase.json")));
        assert_eq!(cli.log_level.as_deref(), Some("info"));
        assert!(cli.explain);
    }

    #[test]
    fn test_missing_output_rejected() {
        assert!(Cli::try_parse_from(["minibase", "db", "q.txt"]).is_err());
    }
}
