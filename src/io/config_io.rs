use std::path::Path;

use crate::io::session_io::atomic_write;
use crate::io::workspace::{WorkspaceError, read_config_file};
use crate::model::config::{Config, UserConfig};

/// Read the workspace config, returning both the parsed config and the raw
/// toml_edit document for edits that keep comments and layout.
pub fn read_config(board_dir: &Path) -> Result<(Config, toml_edit::DocumentMut), WorkspaceError> {
    let (config, text) = read_config_file(board_dir)?;
    let doc: toml_edit::DocumentMut = text.parse()?;
    Ok((config, doc))
}

/// Write the config document back to disk, preserving formatting.
pub fn write_config(board_dir: &Path, doc: &toml_edit::DocumentMut) -> Result<(), WorkspaceError> {
    let config_path = board_dir.join("config.toml");
    atomic_write(&config_path, doc.to_string().as_bytes()).map_err(|e| {
        WorkspaceError::WriteError {
            path: config_path,
            source: e,
        }
    })
}

/// Replace the acting user
pub fn set_user(doc: &mut toml_edit::DocumentMut, user: &UserConfig) {
    if !doc.contains_key("user") {
        doc["user"] = toml_edit::Item::Table(toml_edit::Table::new());
    }
    doc["user"]["id"] = toml_edit::value(&user.id);
    doc["user"]["full_name"] = toml_edit::value(&user.full_name);
    doc["user"]["role"] = toml_edit::value(user.role.as_str());
}
