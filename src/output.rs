//! Output management module
//!
//! Handles the per-source output files: buffered record writing with
//! delimiter framing, output directory preparation, and post-run cleanup of
//! empty results.

use anyhow::Context;
use std::fs::{self, File, OpenOptions};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

/// Buffered writer for one source's matching records.
///
/// Every record is framed by writing the configured delimiter first, so the
/// delimiter leads each emission, including the very first.
pub struct RecordWriter {
    writer: BufWriter<File>,
    path: PathBuf,
    delimiter: Vec<u8>,
    records_written: u64,
    bytes_written: u64,
}

impl RecordWriter {
    /// Create the output file, truncating a previous one.
    pub fn create(path: PathBuf, delimiter: &[u8], buffer_size: usize) -> anyhow::Result<Self> {
        let file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .open(&path)
            .with_context(|| format!("can't create output file {:?}", path))?;

        let writer = BufWriter::with_capacity(buffer_size, file);

        Ok(Self {
            writer,
            path,
            delimiter: delimiter.to_vec(),
            records_written: 0,
            bytes_written: 0,
        })
    }

    /// Append one record, preceded by the delimiter frame.
    pub fn write_record(&mut self, record: &[u8]) -> io::Result<()> {
        self.writer.write_all(&self.delimiter)?;
        self.writer.write_all(record)?;
        self.records_written += 1;
        self.bytes_written += (self.delimiter.len() + record.len()) as u64;
        Ok(())
    }

    /// Flush buffered output to disk. Failures here are the caller's to
    /// report; they must not abort sibling sources.
    pub fn finish(&mut self) -> io::Result<()> {
        self.writer.flush()
    }

    /// Get the output path
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Get number of records written
    pub fn records_written(&self) -> u64 {
        self.records_written
    }

    /// Get bytes written
    pub fn bytes_written(&self) -> u64 {
        self.bytes_written
    }
}

impl Drop for RecordWriter {
    fn drop(&mut self) {
        let _ = self.writer.flush();
    }
}

/// Prepare the output directory before any task starts.
///
/// An existing directory is removed when `force` is set and is an error
/// otherwise (a warning only in dry-run). Dry-run never creates anything.
pub fn prepare_output_dir(path: &Path, force: bool, dry_run: bool) -> anyhow::Result<()> {
    if path.exists() {
        if force {
            fs::remove_dir_all(path)
                .with_context(|| format!("can't clear output directory {:?}", path))?;
        } else if dry_run {
            log::warn!("output directory {:?} already exists", path);
        } else {
            anyhow::bail!(
                "output directory {:?} already exists (use --force to recreate it)",
                path
            );
        }
    }

    if dry_run {
        return Ok(());
    }

    fs::create_dir_all(path)
        .with_context(|| format!("can't create output directory {:?}", path))?;
    Ok(())
}

/// Delete every zero-byte file among the immediate contents of the output
/// directory. Individual deletion failures are reported and skipped.
pub fn cleanup_empty(dir: &Path) -> anyhow::Result<()> {
    let entries =
        fs::read_dir(dir).with_context(|| format!("can't list output directory {:?}", dir))?;

    for entry in entries {
        let entry = match entry {
            Ok(e) => e,
            Err(e) => {
                log::warn!("can't read output directory entry: {}", e);
                continue;
            }
        };

        let metadata = match entry.metadata() {
            Ok(m) => m,
            Err(e) => {
                log::warn!("can't stat {:?}: {}", entry.path(), e);
                continue;
            }
        };

        if metadata.is_file() && metadata.len() == 0 {
            if let Err(e) = fs::remove_file(entry.path()) {
                log::warn!("can't delete empty file {:?}: {}", entry.path(), e);
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_record_writer_frames_every_record() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("out.log");

        let mut writer = RecordWriter::create(path.clone(), b"####", 1024).unwrap();
        writer.write_record(b"first").unwrap();
        writer.write_record(b"second").unwrap();
        writer.finish().unwrap();

        assert_eq!(writer.records_written(), 2);

        let content = fs::read(&path).unwrap();
        assert_eq!(content, b"####first####second");
    }

    #[test]
    fn test_record_writer_truncates_existing_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("out.log");
        fs::write(&path, b"stale content").unwrap();

        let mut writer = RecordWriter::create(path.clone(), b"|", 1024).unwrap();
        writer.write_record(b"fresh").unwrap();
        writer.finish().unwrap();

        assert_eq!(fs::read(&path).unwrap(), b"|fresh");
    }

    #[test]
    fn test_prepare_output_dir_creates() {
        let temp_dir = TempDir::new().unwrap();
        let out = temp_dir.path().join("results");

        prepare_output_dir(&out, false, false).unwrap();
        assert!(out.is_dir());
    }

    #[test]
    fn test_prepare_output_dir_rejects_existing_without_force() {
        let temp_dir = TempDir::new().unwrap();
        let out = temp_dir.path().join("results");
        fs::create_dir(&out).unwrap();

        assert!(prepare_output_dir(&out, false, false).is_err());
    }

    #[test]
    fn test_prepare_output_dir_force_recreates() {
        let temp_dir = TempDir::new().unwrap();
        let out = temp_dir.path().join("results");
        fs::create_dir(&out).unwrap();
        fs::write(out.join("old.log"), b"old").unwrap();

        prepare_output_dir(&out, true, false).unwrap();
        assert!(out.is_dir());
        assert!(!out.join("old.log").exists());
    }

    #[test]
    fn test_prepare_output_dir_dry_run_creates_nothing() {
        let temp_dir = TempDir::new().unwrap();
        let out = temp_dir.path().join("results");

        prepare_output_dir(&out, false, true).unwrap();
        assert!(!out.exists());
    }

    #[test]
    fn test_cleanup_removes_only_empty_files() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(temp_dir.path().join("empty.log"), b"").unwrap();
        fs::write(temp_dir.path().join("full.log"), b"####hit").unwrap();

        cleanup_empty(temp_dir.path()).unwrap();

        assert!(!temp_dir.path().join("empty.log").exists());
        assert!(temp_dir.path().join("full.log").exists());
    }

    #[test]
    fn test_cleanup_is_idempotent() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(temp_dir.path().join("empty.log"), b"").unwrap();
        fs::write(temp_dir.path().join("full.log"), b"data").unwrap();

        cleanup_empty(temp_dir.path()).unwrap();
        cleanup_empty(temp_dir.path()).unwrap();

        assert!(temp_dir.path().join("full.log").exists());
        assert_eq!(fs::read_dir(temp_dir.path()).unwrap().count(), 1);
    }

    #[test]
    fn test_cleanup_missing_directory_is_an_error() {
        let temp_dir = TempDir::new().unwrap();
        let gone = temp_dir.path().join("nope");
        assert!(cleanup_empty(&gone).is_err());
    }
}
