//! Core processing engine
//!
//! Discovers the source files, fans their processing out across the thread
//! pool (archives fan out again, one task per entry), joins every task, and
//! cleans up empty results.

use crate::archive;
use crate::cli::Args;
use crate::filter::FilterSet;
use crate::output::{cleanup_empty, prepare_output_dir, RecordWriter};
use crate::progress::{create_progress_bar, print_info, print_warning, ProcessingStats};
use crate::splitter::{RecordSplitter, SplitMode};

use anyhow::Context;
use colored::*;
use glob::Pattern;
use indicatif::ProgressBar;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use walkdir::WalkDir;

/// Suffix that routes a discovered file through the archive pipeline.
const ARCHIVE_SUFFIX: &str = ".zip";

/// Processor configuration, built once before any task starts and shared
/// read-only by all of them.
pub struct ProcessorConfig {
    pub filter: FilterSet,
    pub mode: SplitMode,
    pub delimiter: Vec<u8>,
    pub buffer_size: usize,
    pub dry_run: bool,
    pub force: bool,
    pub input_dir: PathBuf,
    pub output_dir: PathBuf,
    pub mask: String,
    pub quiet: bool,
    pub verbose: bool,
}

impl ProcessorConfig {
    pub fn from_args(args: &Args) -> anyhow::Result<Self> {
        Ok(Self {
            filter: FilterSet::new(&args.search, &args.regex, args.inverse)?,
            mode: args.split_mode(),
            delimiter: args.delimiter.clone().into_bytes(),
            buffer_size: args.parse_buffer_size()?,
            dry_run: args.dry_run,
            force: args.force,
            input_dir: args.input.clone(),
            output_dir: args.resolve_output_dir(),
            mask: args.mask.clone(),
            quiet: args.quiet,
            verbose: args.verbose,
        })
    }
}

/// Main processor
pub struct Processor {
    config: ProcessorConfig,
    stats: Arc<ProcessingStats>,
}

impl Processor {
    pub fn new(config: ProcessorConfig) -> Self {
        Self {
            config,
            stats: Arc::new(ProcessingStats::new()),
        }
    }

    /// Run the whole pipeline: prepare, discover, fan out, join, clean up.
    pub fn run(&self) -> anyhow::Result<()> {
        prepare_output_dir(&self.config.output_dir, self.config.force, self.config.dry_run)?;

        let sources = self.discover()?;
        if sources.is_empty() {
            print_warning("No files matched the mask!");
            return Ok(());
        }

        self.stats.add_sources(sources.len() as u64);
        if !self.config.quiet {
            print_info(&format!(
                "Found {} files in {:?}",
                sources.len(),
                self.config.input_dir
            ));
        }

        let pb = if self.config.quiet {
            ProgressBar::hidden()
        } else {
            create_progress_bar(sources.len() as u64, "Filtering...")
        };

        // One task per source; the scope end is the barrier every task,
        // including nested archive-entry tasks, must reach before cleanup.
        let pb = &pb;
        rayon::scope(|s| {
            for path in &sources {
                s.spawn(move |_| {
                    if is_archive(path) {
                        self.process_archive(path);
                    } else {
                        self.process_file(path);
                    }
                    pb.inc(1);
                });
            }
        });
        pb.finish_with_message("Complete".green().to_string());

        self.cleanup();

        if !self.config.quiet {
            self.stats.print_summary();
        }

        Ok(())
    }

    /// Resolve the mask against the immediate children of the input
    /// directory. A bad mask aborts the run before any task starts.
    fn discover(&self) -> anyhow::Result<Vec<PathBuf>> {
        let pattern = Pattern::new(&self.config.mask)
            .with_context(|| format!("invalid file mask '{}'", self.config.mask))?;

        let mut sources = Vec::new();
        for entry in WalkDir::new(&self.config.input_dir)
            .min_depth(1)
            .max_depth(1)
            .into_iter()
            .filter_map(|e| e.ok())
        {
            let path = entry.path();
            if !path.is_file() {
                continue;
            }
            let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
                continue;
            };
            if pattern.matches(name) {
                if is_archive(path) {
                    log::info!("zip file: {}", name);
                } else {
                    log::info!("log file: {}", name);
                }
                sources.push(path.to_path_buf());
            }
        }

        Ok(sources)
    }

    /// Process one plain log file.
    fn process_file(&self, path: &Path) {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();

        log::debug!("start processing {}", name);
        match File::open(path) {
            Ok(file) => self.pipeline(BufReader::new(file), &name),
            Err(e) => {
                log::warn!("can't open input file {}: {}", name, e);
                self.stats.add_failure();
            }
        }
        log::debug!("finish processing {}", name);
    }

    /// Process one zip archive: enumerate its entries, then fan out one
    /// nested task per entry and join them all before returning.
    fn process_archive(&self, path: &Path) {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();

        log::debug!("start introspecting {}", name);
        let entries = match archive::entry_names(path) {
            Ok(entries) => entries,
            Err(e) => {
                log::warn!("can't open archive {}: {}", name, e);
                self.stats.add_failure();
                return;
            }
        };

        self.stats.add_sources(entries.len() as u64);

        rayon::scope(|s| {
            for entry in &entries {
                s.spawn(move |_| self.process_entry(path, entry));
            }
        });

        self.stats.complete_source();
        log::debug!("finish introspecting {}", name);
    }

    /// Process one archive entry through the same pipeline as a plain file.
    fn process_entry(&self, archive_path: &Path, entry: &str) {
        log::debug!("start processing {}", entry);
        let opened = archive::with_entry(archive_path, entry, |reader| {
            self.pipeline(BufReader::new(reader), entry);
        });
        if let Err(e) = opened {
            log::warn!("can't open archive entry {}: {}", entry, e);
            self.stats.add_failure();
        }
        log::debug!("finish processing {}", entry);
    }

    /// Split one source into records, match each against every criterion,
    /// and write the selected records to the source's own output file.
    fn pipeline<R: BufRead>(&self, reader: R, name: &str) {
        let mut sink = if self.config.dry_run {
            None
        } else {
            let out_path = self.config.output_dir.join(name);
            match RecordWriter::create(out_path, &self.config.delimiter, self.config.buffer_size) {
                Ok(writer) => Some(writer),
                Err(e) => {
                    log::warn!("can't open output file {}: {}", name, e);
                    self.stats.add_failure();
                    return;
                }
            }
        };

        let splitter =
            RecordSplitter::new(reader, self.config.mode.clone(), self.config.buffer_size);
        for item in splitter {
            match item {
                Ok(record) => {
                    self.stats.add_record();

                    // One emission per criterion that selected the record.
                    for _ in 0..self.config.filter.match_count(&record) {
                        self.stats
                            .add_emission((self.config.delimiter.len() + record.len()) as u64);
                        if let Some(writer) = sink.as_mut() {
                            if let Err(e) = writer.write_record(&record) {
                                log::warn!("can't write output file {}: {}", name, e);
                                self.stats.add_failure();
                            }
                        }
                    }
                }
                Err(e) => {
                    // Records already emitted from this source are kept.
                    log::warn!("can't read source {}: {}", name, e);
                    self.stats.add_failure();
                    break;
                }
            }
        }

        if let Some(mut writer) = sink {
            if let Err(e) = writer.finish() {
                log::warn!("can't close output file {}: {}", name, e);
                self.stats.add_failure();
            }
        }

        self.stats.complete_source();
    }

    /// Delete empty output files once every task has joined.
    fn cleanup(&self) {
        if self.config.dry_run {
            return;
        }
        if let Err(e) = cleanup_empty(&self.config.output_dir) {
            log::warn!("{}", e);
        }
    }

    /// Get processing statistics
    pub fn stats(&self) -> Arc<ProcessingStats> {
        Arc::clone(&self.stats)
    }
}

fn is_archive(path: &Path) -> bool {
    path.file_name()
        .and_then(|n| n.to_str())
        .is_some_and(|n| n.ends_with(ARCHIVE_SUFFIX))
}
