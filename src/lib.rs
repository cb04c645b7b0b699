//! # Log Filter
//!
//! High-performance log record filtering tool for incident response.
//!
//! ## Features
//!
//! - **Record splitting**: Cut log files into records by line or by a custom
//!   delimiter byte sequence
//! - **Literal and regex criteria**: Keep records containing any of the
//!   configured substrings or matching any of the configured regexes
//! - **Inverse mode**: Keep the records that do NOT match instead
//! - **Zip archives**: Entries of `.zip` files are filtered like plain
//!   files, each into its own output
//! - **Parallel processing**: Every file and archive entry is processed on
//!   its own task across the thread pool
//! - **Self-cleaning output**: One output file per source; files with no
//!   matches are deleted after the run
//!
//! ## Usage
//!
//! ```bash
//! # Records containing "ERROR" from all files in the current directory
//! log-filter -s ERROR
//!
//! # Line-oriented logs, several criteria, custom mask
//! log-filter --line -s ERROR -r 'status=5\d\d' -m '*.log'
//! ```
//!
//! ## Example
//!
//! ```rust,no_run
//! use log_filter::filter::FilterSet;
//! use log_filter::processor::{Processor, ProcessorConfig};
//! use log_filter::splitter::SplitMode;
//! use std::path::PathBuf;
//!
//! let config = ProcessorConfig {
//!     filter: FilterSet::new(&["ERROR".to_string()], &[], false).unwrap(),
//!     mode: SplitMode::Delimiter(b"####".to_vec()),
//!     delimiter: b"####".to_vec(),
//!     buffer_size: 64 * 1024 * 1024,
//!     dry_run: false,
//!     force: false,
//!     input_dir: PathBuf::from("./logs"),
//!     output_dir: PathBuf::from("./logs/ERROR"),
//!     mask: "*".to_string(),
//!     quiet: false,
//!     verbose: false,
//! };
//!
//! let processor = Processor::new(config);
//! // processor.run().unwrap();
//! ```

pub mod archive;
pub mod cli;
pub mod filter;
pub mod output;
pub mod processor;
pub mod progress;
pub mod splitter;

pub use cli::Args;
pub use processor::{Processor, ProcessorConfig};
