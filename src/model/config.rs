use serde::{Deserialize, Serialize};

use super::member::{Member, Role};
use super::task::Priority;

/// Configuration from taskboard/config.toml
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub workspace: WorkspaceInfo,
    pub user: UserConfig,
    #[serde(default)]
    pub board: BoardConfig,
    #[serde(default)]
    pub log: LogConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkspaceInfo {
    pub name: String,
}

/// The user the CLI acts as
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserConfig {
    pub id: String,
    pub full_name: String,
    pub role: Role,
}

impl UserConfig {
    pub fn member(&self) -> Member {
        Member::new(self.id.clone(), self.full_name.clone(), self.role)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BoardConfig {
    /// Renumber a column after one of its tasks is deleted
    #[serde(default = "default_true")]
    pub compact_on_delete: bool,
    #[serde(default)]
    pub default_priority: Priority,
}

impl Default for BoardConfig {
    fn default() -> Self {
        BoardConfig {
            compact_on_delete: true,
            default_priority: Priority::Medium,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogConfig {
    /// Default filter when RUST_LOG is unset
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        LogConfig {
            level: default_log_level(),
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_log_level() -> String {
    "warn".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_minimal_config_uses_defaults() {
        let config: Config = toml::from_str(
            r#"
[workspace]
name = "acme"

[user]
id = "user1"
full_name = "John Doe"
role = "Admin"
"#,
        )
        .unwrap();
        assert_eq!(config.user.role, Role::Admin);
        assert!(config.board.compact_on_delete);
        assert_eq!(config.board.default_priority, Priority::Medium);
        assert_eq!(config.log.level, "warn");
    }
}
