use std::fs;

use crate::constants::{
    BACKUP_SUFFIX,
    TMP_SUFFIX,
};
use crate::errors::RelayoutError;

/// Preserves a copy of `path` next to it before it gets replaced
pub fn backup_file(path: &str) -> Result<String, RelayoutError> {
    let backup = format!("{path}{BACKUP_SUFFIX}");

    fs::copy(path, &backup).map_err(|err| {
        RelayoutError::FileError(err, format!("backup {path} to {backup}"))
    })?;

    Ok(backup)
}

/// Replaces the contents of `path` with `content` atomically:
/// the new text lands in a temp file first and is renamed over the
/// original, so a crash leaves either the old file or the new one,
/// never a partial write.
pub fn publish_file(path: &str, content: &str) -> Result<(), RelayoutError> {
    let tmp = format!("{path}{TMP_SUFFIX}");

    fs::write(&tmp, content).map_err(|err| {
        RelayoutError::FileError(err, format!("write working copy {tmp}"))
    })?;

    fs::rename(&tmp, path).map_err(|err| {
        RelayoutError::FileError(err, format!("rename {tmp} over {path}"))
    })
}
