// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Tracking of file modifications.
//!
//! [`FileChangeMonitor`] remembers a [`Fingerprint`] (modification time and
//! size) for every path it has been asked about, and reports whether any of
//! the queried files differ from what was seen on the previous query.

use std::{
    collections::HashMap,
    fs, io,
    path::{Path, PathBuf},
    time::SystemTime,
};

use log::{debug, trace};
use thiserror::Error;

/// A cheap proxy for a file's content.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Fingerprint {
    pub modified: SystemTime,
    pub len: u64,
}

impl Fingerprint {
    /// Read the fingerprint of the file at `path`.
    pub fn read(path: &Path) -> io::Result<Fingerprint> {
        let metadata = fs::metadata(path)?;
        Ok(Fingerprint {
            modified: metadata.modified()?,
            len: metadata.len(),
        })
    }
}

#[derive(Debug, Default)]
pub struct FileChangeMonitor {
    fingerprints: HashMap<PathBuf, Fingerprint>,
}

impl FileChangeMonitor {
    pub fn new() -> FileChangeMonitor {
        FileChangeMonitor::default()
    }

    /// Return `true` if any of the queried files changed since it was last
    /// queried. A file that has never been queried before counts as changed.
    ///
    /// Every path is checked (and its stored fingerprint updated), even if an
    /// earlier path already changed. If a file could not be inspected, the
    /// remaining files are still checked and the first error is returned; the
    /// stored fingerprint of a missing file is forgotten, so the file
    /// reappearing is reported as a change.
    pub fn changed<P: AsRef<Path>>(&mut self, paths: &[P]) -> Result<bool, FileMonitorError> {
        let mut changed = false;
        let mut first_error = None;
        for path in paths {
            match self.check(path.as_ref()) {
                Ok(c) => changed |= c,
                Err(e) => {
                    first_error.get_or_insert(e);
                }
            }
        }

        match first_error {
            Some(e) => Err(e),
            None => Ok(changed),
        }
    }

    fn check(&mut self, path: &Path) -> Result<bool, FileMonitorError> {
        let fingerprint = match Fingerprint::read(path) {
            Ok(f) => f,
            Err(e) => {
                self.fingerprints.remove(path);
                return Err(match e.kind() {
                    io::ErrorKind::NotFound => FileMonitorError::Missing {
                        path: path.to_path_buf(),
                    },
                    _ => FileMonitorError::Io {
                        path: path.to_path_buf(),
                        err: e,
                    },
                });
            }
        };

        match self.fingerprints.insert(path.to_path_buf(), fingerprint) {
            Some(previous) if previous == fingerprint => Ok(false),
            Some(_) => {
                debug!("File {} has changed", path.display());
                Ok(true)
            }
            None => {
                trace!("First observation of file {}", path.display());
                Ok(true)
            }
        }
    }

    /// The last fingerprint seen for `path`, if any.
    pub fn fingerprint(&self, path: &Path) -> Option<Fingerprint> {
        self.fingerprints.get(path).copied()
    }

    /// Forget all stored fingerprints. The next query of any file reports a
    /// change.
    pub fn clear(&mut self) {
        self.fingerprints.clear();
    }
}

#[derive(Error, Debug)]
pub enum FileMonitorError {
    #[error("File {} does not exist", path.display())]
    Missing { path: PathBuf },

    #[error("Could not inspect file {}: {err}", path.display())]
    Io { path: PathBuf, err: io::Error },
}
