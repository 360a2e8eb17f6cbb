//! Filesystem helpers: input name resolution and atomic output writes

use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::{Result, StorageError};

/// Attempts made by [`write_atomic`] before giving up
const WRITE_ATTEMPTS: usize = 3;

/// Locate `name` inside `dir`, optionally ignoring ASCII case
pub fn resolve_input(dir: &Path, name: &str, case_insensitive: bool) -> Result<PathBuf> {
    let exact = dir.join(name);
    if exact.is_file() {
        return Ok(exact);
    }
    if case_insensitive {
        let entries = fs::read_dir(dir).map_err(|e| StorageError::open(dir, e))?;
        for entry in entries {
            let entry = entry.map_err(|e| StorageError::io(dir, e))?;
            let path = entry.path();
            if entry.file_name().to_string_lossy().eq_ignore_ascii_case(name) && path.is_file() {
                return Ok(path);
            }
        }
    }
    Err(StorageError::NotFound(exact))
}

fn sibling_path(path: &Path, suffix: &str) -> PathBuf {
    let mut name = path.file_name().unwrap_or_default().to_os_string();
    name.push(suffix);
    path.with_file_name(name)
}

fn temp_path(path: &Path) -> PathBuf {
    sibling_path(path, ".tmp")
}

fn write_synced(path: &Path, bytes: &[u8]) -> io::Result<()> {
    let mut file = File::create(path)?;
    file.write_all(bytes)?;
    file.flush()?;
    file.sync_all()
}

/// Write `bytes` to `path` through a synced temporary sibling and a rename
///
/// On failure the temporary file is removed and nothing exists under
/// `path` that was not there before.
pub fn write_atomic(path: &Path, bytes: &[u8]) -> Result<()> {
    let temp = temp_path(path);
    let mut last_error = None;

    for attempt in 0..WRITE_ATTEMPTS {
        match write_synced(&temp, bytes).and_then(|()| fs::rename(&temp, path)) {
            Ok(()) => {
                debug!(
                    "Wrote {} ({} bytes, attempt {})",
                    path.display(),
                    bytes.len(),
                    attempt + 1
                );
                return Ok(());
            }
            Err(e) => last_error = Some(e),
        }
        let _ = fs::remove_file(&temp);
    }

    Err(StorageError::io(
        path,
        last_error.unwrap_or_else(|| io::Error::other("write failed")),
    ))
}

/// Write the synced temporary of `path`, returning its location
fn write_temp(path: &Path, bytes: &[u8]) -> Result<PathBuf> {
    let temp = temp_path(path);
    let mut last_error = None;

    for _ in 0..WRITE_ATTEMPTS {
        match write_synced(&temp, bytes) {
            Ok(()) => return Ok(temp),
            Err(e) => last_error = Some(e),
        }
        let _ = fs::remove_file(&temp);
    }

    Err(StorageError::io(
        path,
        last_error.unwrap_or_else(|| io::Error::other("write failed")),
    ))
}

/// Replace two files together
///
/// Both temporaries are written and synced before either target is touched.
/// The previous `first` file is kept as a backup until `second` is renamed
/// into place, and restored if that rename fails. On any failure both
/// targets are left as they were and no temporary remains.
pub fn write_atomic_pair(first: (&Path, &[u8]), second: (&Path, &[u8])) -> Result<()> {
    let (first_path, first_bytes) = first;
    let (second_path, second_bytes) = second;

    let first_temp = write_temp(first_path, first_bytes)?;
    let second_temp = match write_temp(second_path, second_bytes) {
        Ok(temp) => temp,
        Err(e) => {
            let _ = fs::remove_file(&first_temp);
            return Err(e);
        }
    };
    let discard = || {
        let _ = fs::remove_file(&first_temp);
        let _ = fs::remove_file(&second_temp);
    };

    let backup = sibling_path(first_path, ".bak");
    let had_previous = first_path.is_file();
    if had_previous {
        if let Err(e) = fs::rename(first_path, &backup) {
            discard();
            return Err(StorageError::io(first_path, e));
        }
    }
    let restore = || {
        if had_previous {
            let _ = fs::rename(&backup, first_path);
        }
    };

    if let Err(e) = fs::rename(&first_temp, first_path) {
        restore();
        discard();
        return Err(StorageError::io(first_path, e));
    }
    if let Err(e) = fs::rename(&second_temp, second_path) {
        let _ = fs::remove_file(first_path);
        restore();
        discard();
        return Err(StorageError::io(second_path, e));
    }
    if had_previous {
        let _ = fs::remove_file(&backup);
    }

    debug!(
        "Wrote {} ({} bytes) and {} ({} bytes)",
        first_path.display(),
        first_bytes.len(),
        second_path.display(),
        second_bytes.len()
    );
    Ok(())
}
