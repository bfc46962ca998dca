/// Campaign progress: the index of the level to continue from.
///
/// ## File format:
///   A single integer as plain text, e.g. `3`.
///
/// Only the level index persists. A missing file means a new game; an
/// unreadable or garbled one is logged and treated the same way.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum SaveError {
    #[error("could not write progress to {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

// ══════════════════════════════════════════════════════════════
// Public API
// ══════════════════════════════════════════════════════════════

/// Saved level index, or `None` when there is nothing to continue.
pub fn load_progress(path: &Path) -> Option<usize> {
    let text = match fs::read_to_string(path) {
        Ok(text) => text,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return None,
        Err(e) => {
            log::warn!("could not read progress {}: {e}", path.display());
            return None;
        }
    };
    match text.trim().parse::<usize>() {
        Ok(level) => Some(level),
        Err(e) => {
            log::warn!("ignoring corrupt progress file {}: {e}", path.display());
            None
        }
    }
}

pub fn save_progress(path: &Path, level: usize) -> Result<(), SaveError> {
    let write = || -> io::Result<()> {
        if let Some(dir) = path.parent() {
            if !dir.as_os_str().is_empty() {
                fs::create_dir_all(dir)?;
            }
        }
        fs::write(path, level.to_string())
    };
    write().map_err(|source| SaveError::Write { path: path.to_path_buf(), source })?;
    log::info!("progress saved: level {level}");
    Ok(())
}
