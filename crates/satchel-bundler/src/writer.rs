//! Atomic artifact writing.
//!
//! Every file of a build is first written to a temporary sibling inside the
//! output directory. Only when all of them are on disk are they renamed into
//! place; on any failure the temporaries are removed and no artifact of this
//! build becomes visible.

use std::fs;
use std::path::{Path, PathBuf};

use path_clean::PathClean;

use crate::{Error, Result};

/// Suffix of in-flight files.
const TEMP_SUFFIX: &str = ".satchel-tmp";

/// One file to write, relative to the output directory.
#[derive(Debug, Clone, Copy)]
pub struct PendingFile<'a> {
    pub file_name: &'a str,
    pub contents: &'a [u8],
}

/// Write all `files` under `out_dir`, returning their final paths in order.
pub fn write_atomic(out_dir: &Path, files: &[PendingFile<'_>]) -> Result<Vec<PathBuf>> {
    let dir = out_dir.clean();

    let mut targets = Vec::with_capacity(files.len());
    for file in files {
        let target = validate_output_path(&dir, file.file_name)?;
        if target.is_dir() {
            return Err(Error::write(&target, "a directory exists at this path"));
        }
        targets.push(target);
    }

    fs::create_dir_all(&dir)
        .map_err(|e| Error::write(&dir, format!("failed to create output directory: {e}")))?;

    // Phase 1: temporaries
    let mut temp_files: Vec<(PathBuf, PathBuf)> = Vec::with_capacity(files.len());
    for (file, target) in files.iter().zip(&targets) {
        if let Some(parent) = target.parent() {
            if let Err(e) = fs::create_dir_all(parent) {
                cleanup_temp_files(&temp_files);
                return Err(Error::write(parent, format!("failed to create directory: {e}")));
            }
        }
        let temp = temp_path(target);
        if let Err(e) = fs::write(&temp, file.contents) {
            cleanup_temp_files(&temp_files);
            let _ = fs::remove_file(&temp);
            return Err(Error::write(target, e));
        }
        temp_files.push((temp, target.clone()));
    }

    // Phase 2: rename into place
    for (index, (temp, target)) in temp_files.iter().enumerate() {
        if let Err(e) = fs::rename(temp, target) {
            cleanup_temp_files(&temp_files[index..]);
            return Err(Error::write(target, format!("failed to move into place: {e}")));
        }
    }

    tracing::debug!(dir = %dir.display(), files = targets.len(), "artifacts written");
    Ok(targets)
}

fn temp_path(target: &Path) -> PathBuf {
    let mut name = target.as_os_str().to_os_string();
    name.push(TEMP_SUFFIX);
    PathBuf::from(name)
}

/// Resolve `file_name` under `base_dir`, refusing anything that escapes it.
fn validate_output_path(base_dir: &Path, file_name: &str) -> Result<PathBuf> {
    if file_name.contains('\0') {
        return Err(Error::write(
            base_dir.join(file_name.replace('\0', "")),
            "file name contains a null byte",
        ));
    }
    let full_path = base_dir.join(Path::new(file_name).clean()).clean();
    if !full_path.starts_with(base_dir) || full_path == base_dir {
        return Err(Error::write(
            &full_path,
            format!("'{file_name}' escapes the output directory {}", base_dir.display()),
        ));
    }
    Ok(full_path)
}

/// Best-effort removal; we are already failing.
fn cleanup_temp_files(temp_files: &[(PathBuf, PathBuf)]) {
    for (temp, _) in temp_files {
        if temp.exists() {
            if let Err(e) = fs::remove_file(temp) {
                tracing::warn!(path = %temp.display(), error = %e, "failed to remove temporary file");
            }
        }
    }
}
