//! Zip archive introspection module
//!
//! Exposes the entries of a zip container as independent named byte streams
//! so each entry can run through the same pipeline as a plain file.

use std::fs::File;
use std::io::Read;
use std::path::Path;
use thiserror::Error;
use zip::ZipArchive;

#[derive(Error, Debug)]
pub enum ArchiveError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("zip error: {0}")]
    Zip(#[from] zip::result::ZipError),
}

/// List the entry names of an archive, in archive order.
///
/// Opening is all-or-nothing: any failure here means none of the entries can
/// be processed. Directory entries carry no byte stream and are skipped.
pub fn entry_names(path: &Path) -> Result<Vec<String>, ArchiveError> {
    let file = File::open(path)?;
    let mut archive = ZipArchive::new(file)?;

    let mut names = Vec::with_capacity(archive.len());
    for index in 0..archive.len() {
        let entry = archive.by_index(index)?;
        if entry.is_dir() {
            continue;
        }
        names.push(entry.name().to_string());
    }

    Ok(names)
}

/// Run `f` over the decompressed byte stream of one entry.
///
/// Each call opens its own archive handle, so concurrent entry tasks never
/// share state. A failure opening the entry affects only that entry.
pub fn with_entry<T>(
    path: &Path,
    name: &str,
    f: impl FnOnce(&mut dyn Read) -> T,
) -> Result<T, ArchiveError> {
    let file = File::open(path)?;
    let mut archive = ZipArchive::new(file)?;
    let mut entry = archive.by_name(name)?;
    Ok(f(&mut entry))
}
