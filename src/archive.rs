use std::ffi::OsStr;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::thread;
use std::time::Duration;

use walkdir::WalkDir;

use crate::constants::archive::DATA_FILE_PREFIX;
use crate::types::CorrelationId;

/// List the immediate entries of `root` in whatever order the platform
/// yields them. Directories are included (callers decide to skip them);
/// nothing below the first level is visited. The order is not sorted
/// and callers must not assume it is.
pub fn scan_shallow(root: &Path) -> Vec<PathBuf> {
    WalkDir::new(root)
        .min_depth(1)
        .max_depth(1)
        .into_iter()
        .filter_map(Result::ok)
        .map(|entry| entry.path().to_path_buf())
        .collect()
}

/// Archive filename for a dispatched data file:
/// `data_<correlation_id>_<original_name>`.
pub fn data_archive_name(correlation_id: &CorrelationId, source: &Path) -> String {
    let original = source
        .file_name()
        .and_then(OsStr::to_str)
        .unwrap_or_default();
    format!("{DATA_FILE_PREFIX}{correlation_id}_{original}")
}

/// Copy `source` to `dest`, retrying at `interval` while the source
/// still exists.
///
/// The retry loop is how the dispatcher waits for an external writer
/// that is still flushing the source file; large files can stay locked
/// for a while. Returns `false` when the source vanished before any
/// copy succeeded, which is not an error.
pub fn copy_waiting_for_writer(source: &Path, dest: &Path, interval: Duration) -> bool {
    loop {
        if fs::copy(source, dest).is_ok() {
            return true;
        }
        if !source.exists() {
            return false;
        }
        thread::sleep(interval);
    }
}

/// Delete `path`, treating absence as success.
pub fn remove_if_exists(path: &Path) -> io::Result<()> {
    match fs::remove_file(path) {
        Ok(()) => Ok(()),
        Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(()),
        Err(err) => Err(err),
    }
}
