//! Command-line interface definition for log-filter
//!
//! Provides argument parsing and validation for the log filtering tool.

use crate::splitter::SplitMode;
use clap::Parser;
use std::path::PathBuf;

/// High-performance log record filter
///
/// Scan a directory of log files and zip archives, split every file into
/// records, and keep only the records matching your criteria.
#[derive(Parser, Debug, Clone)]
#[command(
    name = "log-filter",
    author = "m0h1nd4",
    version,
    about = "High-performance log filter for incident response",
    long_about = r#####"
Scan a directory of plain log files and zip archives, split each file into
records (by line or by a custom delimiter), filter every record against
literal substring and regex criteria, and write the matching records to one
output file per source. Output files that end up empty are deleted.

EXAMPLES:
    # Records containing "ERROR", delimited by the default "####"
    log-filter -s ERROR

    # Several criteria - a record matching more than one is written once per hit
    log-filter -s ERROR -s FATAL -r 'status=5\d\d'

    # Line-oriented logs
    log-filter --line -s "connection reset" -i /var/log/app

    # Everything EXCEPT the health-check noise
    log-filter --line --inverse -s healthz -m '*.log'

    # Rehearse without writing anything
    log-filter -s ERROR --dry-run
"#####,
    after_help = "For more information, visit: https://github.com/m0h1nd4/log-filter"
)]
pub struct Args {
    /// Literal substring criterion (repeatable)
    #[arg(short = 's', long = "search", value_name = "STRING")]
    pub search: Vec<String>,

    /// Regex criterion (repeatable)
    #[arg(short = 'r', long = "regex", value_name = "PATTERN")]
    pub regex: Vec<String>,

    /// Input directory to scan
    #[arg(short, long, value_name = "DIR", default_value = ".")]
    pub input: PathBuf,

    /// Output directory (default: derived from the criteria, under the input directory)
    #[arg(short, long, value_name = "DIR")]
    pub output: Option<PathBuf>,

    /// File mask for input discovery
    #[arg(short, long, value_name = "MASK", default_value = "*")]
    pub mask: String,

    /// Record delimiter, used for splitting and for output framing
    #[arg(short, long, value_name = "DELIM", default_value = "####")]
    pub delimiter: String,

    /// Split records on line boundaries instead of the delimiter
    #[arg(short, long, default_value_t = false)]
    pub line: bool,

    /// Emit the records that do NOT match each criterion
    #[arg(long, default_value_t = false)]
    pub inverse: bool,

    /// Recreate the output directory if it already exists
    #[arg(short, long, default_value_t = false)]
    pub force: bool,

    /// Dry run - run the filter pipeline without writing any output
    #[arg(short = 'x', long, default_value_t = false)]
    pub dry_run: bool,

    /// Maximum record size and write buffer (default: 64MB)
    #[arg(long, value_name = "SIZE", default_value = "64MB")]
    pub buffer_size: String,

    /// Number of threads (default: auto-detect)
    #[arg(short = 't', long, value_name = "NUM")]
    pub threads: Option<usize>,

    /// Quiet mode - minimal output
    #[arg(short, long, default_value_t = false)]
    pub quiet: bool,

    /// Verbose mode - detailed logging
    #[arg(short, long, default_value_t = false)]
    pub verbose: bool,
}

impl Args {
    /// Parse buffer size string to bytes
    pub fn parse_buffer_size(&self) -> anyhow::Result<usize> {
        parse_size(&self.buffer_size)
    }

    /// The split mode this run uses, resolved once from the flags.
    pub fn split_mode(&self) -> SplitMode {
        if self.line {
            SplitMode::Lines
        } else {
            SplitMode::Delimiter(self.delimiter.clone().into_bytes())
        }
    }

    /// Get the output directory.
    ///
    /// Without `--output` the directory is named after the criteria and
    /// placed under the input directory.
    pub fn resolve_output_dir(&self) -> PathBuf {
        match &self.output {
            Some(dir) => dir.clone(),
            None => self.input.join(derived_dir_name(&self.search, &self.regex)),
        }
    }
}

/// Build a directory name from the criteria: all pattern strings joined with
/// `_`, filesystem-hostile characters collapsed to `_`.
pub fn derived_dir_name(search: &[String], regex: &[String]) -> String {
    let joined = search
        .iter()
        .chain(regex.iter())
        .cloned()
        .collect::<Vec<_>>()
        .join("_");

    let hostile = regex::Regex::new(r#"[/\\\s:*?"<>|]+"#).unwrap();
    hostile.replace_all(&joined, "_").into_owned()
}

/// Parse human-readable size string to bytes
fn parse_size(size_str: &str) -> anyhow::Result<usize> {
    let size_str = size_str.trim().to_uppercase();

    let (num_str, multiplier) = if size_str.ends_with("GB") {
        (&size_str[..size_str.len() - 2], 1024 * 1024 * 1024)
    } else if size_str.ends_with("MB") {
        (&size_str[..size_str.len() - 2], 1024 * 1024)
    } else if size_str.ends_with("KB") {
        (&size_str[..size_str.len() - 2], 1024)
    } else if size_str.ends_with('B') {
        (&size_str[..size_str.len() - 1], 1)
    } else {
        (size_str.as_str(), 1)
    };

    let num: usize = num_str
        .trim()
        .parse()
        .map_err(|_| anyhow::anyhow!("Invalid size format: '{}'", size_str))?;

    Ok(num * multiplier)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse_args(argv: &[&str]) -> Args {
        let mut full = vec!["log-filter"];
        full.extend_from_slice(argv);
        Args::parse_from(full)
    }

    #[test]
    fn test_parse_size() {
        assert_eq!(parse_size("64MB").unwrap(), 64 * 1024 * 1024);
        assert_eq!(parse_size("8GB").unwrap(), 8 * 1024 * 1024 * 1024);
        assert_eq!(parse_size("1024KB").unwrap(), 1024 * 1024);
        assert_eq!(parse_size("512").unwrap(), 512);
        assert!(parse_size("lots").is_err());
    }

    #[test]
    fn test_repeatable_criteria() {
        let args = parse_args(&["-s", "ERROR", "-s", "FATAL", "-r", r"5\d\d"]);
        assert_eq!(args.search, vec!["ERROR", "FATAL"]);
        assert_eq!(args.regex, vec![r"5\d\d"]);
    }

    #[test]
    fn test_split_mode_default_is_delimiter() {
        let args = parse_args(&["-s", "x"]);
        assert!(matches!(
            args.split_mode(),
            SplitMode::Delimiter(d) if d == b"####"
        ));

        let args = parse_args(&["-s", "x", "--line"]);
        assert!(matches!(args.split_mode(), SplitMode::Lines));
    }

    #[test]
    fn test_derived_dir_name_sanitizes() {
        let search = vec!["time out".to_string(), "a/b".to_string()];
        let regex = vec![r"5\d\d".to_string()];
        assert_eq!(derived_dir_name(&search, &regex), "time_out_a_b_5_d_d");
    }

    #[test]
    fn test_resolve_output_dir_defaults_under_input() {
        let args = parse_args(&["-s", "ERROR", "-i", "/var/log"]);
        assert_eq!(args.resolve_output_dir(), PathBuf::from("/var/log/ERROR"));

        let args = parse_args(&["-s", "ERROR", "-o", "/tmp/out"]);
        assert_eq!(args.resolve_output_dir(), PathBuf::from("/tmp/out"));
    }
}
