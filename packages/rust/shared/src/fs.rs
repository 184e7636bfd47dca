//! Filesystem helpers.

use std::path::Path;

use tracing::debug;

use crate::error::{LinkShowcaseError, Result};

/// Write `content` to `target` atomically: write a sibling temp file, then rename.
pub fn write_atomic(target: &Path, content: &str) -> Result<()> {
    let file_name = target
        .file_name()
        .ok_or_else(|| {
            LinkShowcaseError::validation(format!("not a file path: {}", target.display()))
        })?
        .to_string_lossy();
    let temp = target.with_file_name(format!(".{file_name}.tmp"));

    std::fs::write(&temp, content).map_err(|e| LinkShowcaseError::io(&temp, e))?;

    if let Err(e) = std::fs::rename(&temp, target) {
        let _ = std::fs::remove_file(&temp);
        return Err(LinkShowcaseError::io(target, e));
    }

    debug!(path = %target.display(), size = content.len(), "wrote file");
    Ok(())
}
