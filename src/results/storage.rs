//! Write-permission checks for the export location.

use log::warn;
use std::fs::{self, File};
use std::path::{Path, PathBuf};

const PROBE_FILENAME: &str = ".nn_scoring_write_probe";

/// Answers whether results may be stored in the export location.
pub trait WritePermission {
    fn check(&self) -> bool;
}

/// Checks permission by creating and removing a probe file in a directory.
#[derive(Debug, Clone)]
pub struct ProbeFilePermission {
    dir: PathBuf,
}

impl ProbeFilePermission {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }
}

impl WritePermission for ProbeFilePermission {
    fn check(&self) -> bool {
        check_writable(&self.dir)
    }
}

/// Returns true when a file can be created in `dir`. The directory is created if missing.
pub fn check_writable(dir: &Path) -> bool {
    if let Err(e) = fs::create_dir_all(dir) {
        warn!("Cannot create directory '{}': {}", dir.display(), e);
        return false;
    }
    let probe = dir.join(PROBE_FILENAME);
    match File::create(&probe) {
        Ok(_) => {
            remove_probe(&probe);
            true
        }
        Err(e) => {
            warn!("Directory '{}' is not writable: {}", dir.display(), e);
            false
        }
    }
}

/// Removes a probe file, logging when it has to be left behind.
fn remove_probe(probe: &Path) -> bool {
    match fs::remove_file(probe) {
        Ok(()) => true,
        Err(e) => {
            warn!("Cannot remove probe file '{}': {}", probe.display(), e);
            false
        }
    }
}
