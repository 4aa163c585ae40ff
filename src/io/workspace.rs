use std::fs;
use std::path::{Path, PathBuf};

use crate::io::session_io;
use crate::model::config::Config;
use crate::model::snapshot::Snapshot;

/// Name of the directory holding config, session, and lock files
pub const BOARD_DIR: &str = "taskboard";

/// Error type for workspace I/O operations
#[derive(Debug, thiserror::Error)]
pub enum WorkspaceError {
    #[error("not a taskboard workspace: no taskboard/config.toml found")]
    NotAWorkspace,
    #[error("workspace already initialized at {0}")]
    AlreadyInitialized(PathBuf),
    #[error("could not read {path}: {source}")]
    ReadError {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("could not write {path}: {source}")]
    WriteError {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("could not parse config.toml: {0}")]
    ConfigParseError(#[from] toml::de::Error),
    #[error("could not edit config.toml: {0}")]
    ConfigEditError(#[from] toml_edit::TomlError),
    #[error("could not parse session.json: {0}")]
    SessionParseError(#[from] serde_json::Error),
    #[error("io error: {0}")]
    IoError(#[from] std::io::Error),
}

/// A loaded workspace: its config plus the saved board session
#[derive(Debug, Clone)]
pub struct Workspace {
    pub board_dir: PathBuf,
    pub config: Config,
    pub snapshot: Snapshot,
}

/// Discover the workspace by walking up from the given directory, looking for
/// a `taskboard/config.toml`.
pub fn discover_workspace(start: &Path) -> Result<PathBuf, WorkspaceError> {
    let mut current = start.to_path_buf();
    loop {
        if current.join(BOARD_DIR).join("config.toml").is_file() {
            return Ok(current);
        }
        if !current.pop() {
            return Err(WorkspaceError::NotAWorkspace);
        }
    }
}

pub fn read_config_file(board_dir: &Path) -> Result<(Config, String), WorkspaceError> {
    let config_path = board_dir.join("config.toml");
    let text = fs::read_to_string(&config_path).map_err(|e| WorkspaceError::ReadError {
        path: config_path.clone(),
        source: e,
    })?;
    let config: Config = toml::from_str(&text)?;
    Ok((config, text))
}

/// Load config and session from a workspace root. A missing session file
/// means an empty board.
pub fn load_workspace(root: &Path) -> Result<Workspace, WorkspaceError> {
    let board_dir = root.join(BOARD_DIR);
    if !board_dir.is_dir() {
        return Err(WorkspaceError::NotAWorkspace);
    }
    let (config, _) = read_config_file(&board_dir)?;
    let snapshot = session_io::read_session(&board_dir)?;
    Ok(Workspace {
        board_dir,
        config,
        snapshot,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn create_test_workspace(dir: &Path) {
        let board_dir = dir.join(BOARD_DIR);
        fs::create_dir_all(&board_dir).unwrap();
        fs::write(
            board_dir.join("config.toml"),
            r#"
[workspace]
name = "acme"

[user]
id = "user1"
full_name = "John Doe"
role = "manager"
"#,
        )
        .unwrap();
    }

    #[test]
    fn test_discover_workspace() {
        let tmp = TempDir::new().unwrap();
        create_test_workspace(tmp.path());

        let root = discover_workspace(tmp.path()).unwrap();
        assert_eq!(root, tmp.path());

        let sub = tmp.path().join("src/deep");
        fs::create_dir_all(&sub).unwrap();
        assert_eq!(discover_workspace(&sub).unwrap(), tmp.path());
    }

    #[test]
    fn test_discover_workspace_not_found() {
        let tmp = TempDir::new().unwrap();
        assert!(matches!(
            discover_workspace(tmp.path()),
            Err(WorkspaceError::NotAWorkspace)
        ));
    }

    #[test]
    fn test_load_workspace_without_session() {
        let tmp = TempDir::new().unwrap();
        create_test_workspace(tmp.path());

        let ws = load_workspace(tmp.path()).unwrap();
        assert_eq!(ws.config.workspace.name, "acme");
        assert_eq!(ws.config.user.id, "user1");
        assert!(ws.snapshot.projects.is_empty());
    }

    #[test]
    fn test_load_workspace_bad_config() {
        let tmp = TempDir::new().unwrap();
        let board_dir = tmp.path().join(BOARD_DIR);
        fs::create_dir_all(&board_dir).unwrap();
        fs::write(board_dir.join("config.toml"), "[workspace]\n").unwrap();
        assert!(matches!(
            load_workspace(tmp.path()),
            Err(WorkspaceError::ConfigParseError(_))
        ));
    }
}
