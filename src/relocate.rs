//! Moving exported files into their album folders.
//!
//! Each source file and all of its destinations form one unit of work. Units
//! run on a rayon pool and report back over a channel, so one failing file
//! never stops the batch.

use anyhow::{Context, Result};
use filetime::FileTime;
use rayon::prelude::*;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::mpsc;
use tracing::{debug, warn};

use crate::error::RelocateError;
use crate::mapping::FileMapping;

/// A source that could not be fully relocated.
#[derive(Debug)]
pub struct RelocationFailure {
    pub source: PathBuf,
    pub destinations: Vec<PathBuf>,
    pub error: RelocateError,
}

/// Outcome of [`relocate_all`].
#[derive(Debug, Default)]
pub struct RelocationReport {
    /// Destination paths written successfully.
    pub relocated: usize,
    /// Sources that failed, sorted by source path.
    pub failures: Vec<RelocationFailure>,
}

impl RelocationReport {
    pub fn failed_sources(&self) -> usize {
        self.failures.len()
    }

    /// Destination paths that belong to failed sources.
    pub fn failed_destinations(&self) -> usize {
        self.failures.iter().map(|f| f.destinations.len()).sum()
    }

    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Number of workers to use when none is configured.
pub fn default_workers() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1)
}

/// Relocate every source in `mapping` using `workers` threads.
///
/// Only pool construction can fail; per-file problems end up in the report.
pub fn relocate_all(mapping: &FileMapping, workers: usize) -> Result<RelocationReport> {
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(workers.max(1))
        .thread_name(|i| format!("relocate-{}", i))
        .build()
        .context("Failed to start relocation workers")?;

    let (tx, rx) = mpsc::channel();

    pool.install(|| {
        mapping
            .entries()
            .par_iter()
            .for_each_with(tx, |tx, (source, destinations)| {
                let outcome = match move_to_many(source, destinations) {
                    Ok(()) => Ok(destinations.len()),
                    Err(error) => Err(RelocationFailure {
                        source: source.clone(),
                        destinations: destinations.clone(),
                        error,
                    }),
                };
                let _ = tx.send(outcome);
            });
    });

    let mut report = RelocationReport::default();
    for outcome in rx {
        match outcome {
            Ok(count) => report.relocated += count,
            Err(failure) => {
                warn!("Failed to relocate {}: {}", failure.source.display(), failure.error);
                report.failures.push(failure);
            }
        }
    }
    report.failures.sort_by(|a, b| a.source.cmp(&b.source));

    Ok(report)
}

/// Move one file to one or more destinations.
///
/// A single destination is a rename. Several destinations are copies (with
/// timestamps) followed by deleting the source once every copy succeeded.
/// Missing destination directories are created on demand.
pub fn move_to_many(source: &Path, destinations: &[PathBuf]) -> Result<(), RelocateError> {
    if !source.is_file() {
        return Err(RelocateError::SourceMissing(source.to_path_buf()));
    }

    match destinations {
        [] => Ok(()),
        [destination] => {
            debug!("\"{}\" -> \"{}\"", source.display(), destination.display());
            with_parent_dir(source, destination, move_file)
        }
        _ => {
            for destination in destinations {
                debug!("\"{}\" => \"{}\"", source.display(), destination.display());
                with_parent_dir(source, destination, copy_with_times)?;
            }
            fs::remove_file(source).map_err(|e| classify(source, source, e))
        }
    }
}

/// Run `op`, and if it fails because the destination directory is missing,
/// create it and retry once.
fn with_parent_dir<F>(source: &Path, destination: &Path, op: F) -> Result<(), RelocateError>
where
    F: Fn(&Path, &Path) -> io::Result<()>,
{
    match op(source, destination) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == io::ErrorKind::NotFound && source.is_file() => {
            if let Some(parent) = destination.parent() {
                // Another worker may create the same directory concurrently;
                // create_dir_all treats an existing directory as success.
                fs::create_dir_all(parent).map_err(|e| classify(source, destination, e))?;
            }
            op(source, destination).map_err(|e| classify(source, destination, e))
        }
        Err(e) => Err(classify(source, destination, e)),
    }
}

fn classify(source: &Path, destination: &Path, error: io::Error) -> RelocateError {
    if error.kind() == io::ErrorKind::NotFound && !source.exists() {
        RelocateError::SourceMissing(source.to_path_buf())
    } else {
        RelocateError::Io {
            destination: destination.to_path_buf(),
            source: error,
        }
    }
}

/// Rename, falling back to copy + delete across filesystems.
fn move_file(source: &Path, destination: &Path) -> io::Result<()> {
    match fs::rename(source, destination) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Err(e),
        Err(_) => {
            copy_with_times(source, destination)?;
            fs::remove_file(source)
        }
    }
}

/// Copy contents and permissions, then carry over access/modification times.
fn copy_with_times(source: &Path, destination: &Path) -> io::Result<()> {
    fs::copy(source, destination)?;
    let metadata = fs::metadata(source)?;
    filetime::set_file_times(
        destination,
        FileTime::from_last_access_time(&metadata),
        FileTime::from_last_modification_time(&metadata),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;
    use std::io::Write;
    use tempfile::tempdir;

    fn write(path: &Path, contents: &str) {
        let mut file = File::create(path).unwrap();
        file.write_all(contents.as_bytes()).unwrap();
    }

    #[test]
    fn test_single_destination_is_a_move() {
        let dir = tempdir().unwrap();
        let source = dir.path().join("a.jpg");
        let destination = dir.path().join("Album/Sub/1.a.jpg");
        write(&source, "a");

        move_to_many(&source, &[destination.clone()]).unwrap();

        assert!(!source.exists());
        assert_eq!(fs::read_to_string(&destination).unwrap(), "a");
    }

    #[test]
    fn test_many_destinations_copy_then_delete() {
        let dir = tempdir().unwrap();
        let source = dir.path().join("a.jpg");
        write(&source, "a");
        let mtime = FileTime::from_unix_time(1_500_000_000, 0);
        filetime::set_file_mtime(&source, mtime).unwrap();

        let destinations = vec![dir.path().join("A/a.jpg"), dir.path().join("B/a-2.jpg")];
        move_to_many(&source, &destinations).unwrap();

        assert!(!source.exists());
        for destination in &destinations {
            assert_eq!(fs::read_to_string(destination).unwrap(), "a");
            let metadata = fs::metadata(destination).unwrap();
            assert_eq!(FileTime::from_last_modification_time(&metadata), mtime);
        }
    }

    #[test]
    fn test_missing_source_creates_nothing() {
        let dir = tempdir().unwrap();
        let source = dir.path().join("gone.jpg");
        let destinations = vec![dir.path().join("A/gone.jpg"), dir.path().join("B/gone.jpg")];

        let error = move_to_many(&source, &destinations).unwrap_err();

        assert!(error.is_missing_source());
        assert!(!dir.path().join("A").exists());
        assert!(!dir.path().join("B").exists());
    }

    #[test]
    fn test_failed_copy_keeps_source() {
        let dir = tempdir().unwrap();
        let source = dir.path().join("a.jpg");
        write(&source, "a");
        // A regular file where a directory is needed.
        write(&dir.path().join("blocker"), "x");

        let destinations = vec![
            dir.path().join("A/a.jpg"),
            dir.path().join("blocker/a.jpg"),
        ];
        let error = move_to_many(&source, &destinations).unwrap_err();

        assert!(!error.is_missing_source());
        assert!(source.exists());
        assert!(dir.path().join("A/a.jpg").exists());
    }

    #[test]
    fn test_round_trip_three_files() {
        let dir = tempdir().unwrap();
        let mut mapping = FileMapping::new();
        for name in ["one", "two", "three"] {
            let source = dir.path().join(format!("{}.jpg", name));
            write(&source, name);
            mapping.insert(source, dir.path().join("Trip").join(format!("{}.jpg", name)));
        }

        let report = relocate_all(&mapping, 2).unwrap();

        assert_eq!(report.relocated, 3);
        assert!(report.is_success());
        for name in ["one", "two", "three"] {
            let moved = dir.path().join("Trip").join(format!("{}.jpg", name));
            assert_eq!(fs::read_to_string(moved).unwrap(), name);
        }
    }

    #[test]
    fn test_fan_out_with_missing_source_reports_once() {
        let dir = tempdir().unwrap();
        let source = dir.path().join("IMG_1.jpg");
        let mut mapping = FileMapping::new();
        mapping.insert(source.clone(), dir.path().join("A/IMG_1.jpg"));
        mapping.insert(source.clone(), dir.path().join("B/IMG_1-2.jpg"));

        let report = relocate_all(&mapping, 4).unwrap();

        assert_eq!(report.relocated, 0);
        assert_eq!(report.failed_sources(), 1);
        assert_eq!(report.failed_destinations(), 2);
        assert_eq!(report.failures[0].source, source);
        assert_eq!(report.failures[0].destinations.len(), 2);
        assert!(report.failures[0].error.is_missing_source());
        assert!(!dir.path().join("A").exists());
        assert!(!dir.path().join("B").exists());
    }

    fn hundred_units(root: &Path) -> FileMapping {
        let mut mapping = FileMapping::new();
        for i in 0..100 {
            let source = root.join(format!("{:03}.jpg", i));
            if i % 20 != 0 {
                write(&source, "x");
            }
            // Units share a handful of destination folders.
            let folder = root.join("out").join(format!("album-{}", i % 7));
            mapping.insert(source, folder.join(format!("{}.{:03}.jpg", i + 1, i)));
        }
        mapping
    }

    #[test]
    fn test_batch_result_independent_of_pool_size() {
        for workers in [1, 8] {
            let dir = tempdir().unwrap();
            let mapping = hundred_units(dir.path());

            let report = relocate_all(&mapping, workers).unwrap();

            assert_eq!(report.relocated, 95, "workers = {}", workers);
            assert_eq!(report.failed_sources(), 5, "workers = {}", workers);
            assert!(report.failures.iter().all(|f| f.error.is_missing_source()));
        }
    }
}
