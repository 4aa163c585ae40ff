use std::fs;
use std::io::{self, Write};
use std::path::Path;

use log::debug;
use tempfile::NamedTempFile;

use crate::io::workspace::WorkspaceError;
use crate::model::snapshot::Snapshot;

const SESSION_FILE: &str = "session.json";

/// Write `content` to `path` via a temp file in the same directory and a
/// rename, so readers never see a half-written file.
pub fn atomic_write(path: &Path, content: &[u8]) -> io::Result<()> {
    let dir = path.parent().unwrap_or(Path::new("."));
    let mut tmp = NamedTempFile::new_in(dir)?;
    tmp.write_all(content)?;
    tmp.flush()?;
    tmp.persist(path).map_err(|e| e.error)?;
    Ok(())
}

/// Read `session.json`. Returns an empty snapshot if the file does not exist.
pub fn read_session(board_dir: &Path) -> Result<Snapshot, WorkspaceError> {
    let path = board_dir.join(SESSION_FILE);
    if !path.exists() {
        debug!("no session at {}, starting empty", path.display());
        return Ok(Snapshot::default());
    }
    let text = fs::read_to_string(&path).map_err(|e| WorkspaceError::ReadError {
        path: path.clone(),
        source: e,
    })?;
    Ok(serde_json::from_str(&text)?)
}

/// Save the snapshot to `session.json`. Callers hold the workspace lock.
pub fn save_session(board_dir: &Path, snapshot: &Snapshot) -> Result<(), WorkspaceError> {
    let path = board_dir.join(SESSION_FILE);
    let mut content = serde_json::to_string_pretty(snapshot)?;
    content.push('\n');
    atomic_write(&path, content.as_bytes()).map_err(|e| WorkspaceError::WriteError {
        path: path.clone(),
        source: e,
    })?;
    debug!(
        "saved {} projects to {}",
        snapshot.projects.len(),
        path.display()
    );
    Ok(())
}
