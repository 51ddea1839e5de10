//! Operator configuration, loaded from a YAML file at startup.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use serde::Deserialize;
use url::Url;

/// A channel the user must join before passing the funnel.
#[derive(Debug, Clone, Deserialize)]
pub struct ChannelConfig {
    /// Display name shown on the join button.
    pub name: String,
    /// Invite link the join button opens.
    pub link: Url,
    /// Chat identity used for membership queries.
    pub chat_id: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BotConfig {
    /// Gateway credential.
    pub token: String,
    /// Static operator allow-list.
    pub admin_ids: Vec<i64>,
    /// Required channels; membership is checked once per entry, duplicates
    /// included.
    pub channels: Vec<ChannelConfig>,
    #[serde(default = "default_registry_path")]
    pub registry_path: PathBuf,
    #[serde(default = "default_ledger_path")]
    pub ledger_path: PathBuf,
    #[serde(default)]
    pub log_level: Option<String>,
}

fn default_registry_path() -> PathBuf {
    PathBuf::from("data/users_database.json")
}

fn default_ledger_path() -> PathBuf {
    PathBuf::from("data/broadcast_stats.json")
}

pub fn load(path: &Path) -> Result<BotConfig> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("read config: {}", path.display()))?;
    let cfg: BotConfig = serde_yaml::from_str(&text).context("parse yaml")?;
    validate(&cfg)?;
    Ok(cfg)
}

fn validate(cfg: &BotConfig) -> Result<()> {
    if cfg.token.trim().is_empty() {
        bail!("bot token must not be empty");
    }
    if cfg.admin_ids.is_empty() {
        bail!("admin allow-list must not be empty");
    }
    if cfg.channels.is_empty() {
        bail!("at least one required channel must be configured");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_a_minimal_config() {
        let yaml = r#"
token: "123:abc"
admin_ids: [8301619548]
channels:
  - name: "Join"
    link: "https://example.com/channel"
    chat_id: -1002901037301
"#;
        let cfg: BotConfig = serde_yaml::from_str(yaml).expect("parse");
        validate(&cfg).expect("validate");
        assert_eq!(cfg.registry_path, default_registry_path());
        assert_eq!(cfg.channels[0].chat_id, -1002901037301);
    }

    #[test]
    fn rejects_empty_token() {
        let yaml = r#"
token: ""
admin_ids: [1]
channels:
  - name: "Join"
    link: "https://example.com/channel"
    chat_id: -100
"#;
        let cfg: BotConfig = serde_yaml::from_str(yaml).expect("parse");
        assert!(validate(&cfg).is_err());
    }
}
