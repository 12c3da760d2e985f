//! Daemon configuration file.
//!
//! One TOML file describes the listen address, the account state path, the
//! package catalog, and every tenant the daemon is willing to activate.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{bail, Context, Result};
use serde::Deserialize;

use warden_core::GuildId;
use warden_dispatch::PackageDefinition;
use warden_extract::Coordinates;
use warden_pipeline::{PipelineIntervals, TenantSettings};

const DEFAULT_LISTEN_ADDR: &str = "0.0.0.0:8080";
const DEFAULT_ACCOUNTS_PATH: &str = "warden-accounts.json";
const DEFAULT_STREAM_INTERVAL_SECONDS: u64 = 20;
const DEFAULT_RESTART_CHECK_INTERVAL_SECONDS: u64 = 60;
const DEFAULT_FIRST_JOIN_TELEPORT_DELAY_SECONDS: u64 = 60;

fn default_listen_addr() -> String {
    DEFAULT_LISTEN_ADDR.to_string()
}

fn default_accounts_path() -> PathBuf {
    PathBuf::from(DEFAULT_ACCOUNTS_PATH)
}

fn default_stream_interval_seconds() -> u64 {
    DEFAULT_STREAM_INTERVAL_SECONDS
}

fn default_restart_check_interval_seconds() -> u64 {
    DEFAULT_RESTART_CHECK_INTERVAL_SECONDS
}

fn default_first_join_teleport_delay_seconds() -> u64 {
    DEFAULT_FIRST_JOIN_TELEPORT_DELAY_SECONDS
}

fn default_command_marker() -> char {
    warden_extract::DEFAULT_COMMAND_MARKER
}

#[derive(Debug, Deserialize)]
pub struct DaemonConfig {
    #[serde(default = "default_listen_addr")]
    pub listen_addr: String,
    #[serde(default = "default_accounts_path")]
    pub accounts_path: PathBuf,
    #[serde(default)]
    pub packages: Vec<PackageDefinition>,
    #[serde(default)]
    pub tenants: Vec<TenantEntry>,
}

#[derive(Debug, Deserialize)]
pub struct TenantEntry {
    pub guild_id: String,
    pub log_directory: String,
    #[serde(default = "default_command_marker")]
    pub command_marker: char,
    #[serde(default = "default_stream_interval_seconds")]
    pub login_interval_seconds: u64,
    #[serde(default = "default_stream_interval_seconds")]
    pub chat_interval_seconds: u64,
    #[serde(default = "default_restart_check_interval_seconds")]
    pub restart_check_interval_seconds: u64,
    #[serde(default = "default_first_join_teleport_delay_seconds")]
    pub first_join_teleport_delay_seconds: u64,
    /// First-join teleport target; omit to disable the teleport.
    #[serde(default)]
    pub spawn: Option<Coordinates>,
    /// Named targets for the in-game teleport command.
    #[serde(default)]
    pub teleports: HashMap<String, Coordinates>,
}

impl DaemonConfig {
    /// Validates and converts the tenant entries into runtime settings.
    pub fn tenant_settings(&self) -> Result<HashMap<GuildId, TenantSettings>> {
        let mut settings = HashMap::new();
        for entry in &self.tenants {
            if entry.guild_id.trim().is_empty() {
                bail!("tenant entries must carry a non-empty guild_id");
            }
            if entry.login_interval_seconds == 0 || entry.chat_interval_seconds == 0 {
                bail!(
                    "tenant '{}' stream intervals must be greater than zero",
                    entry.guild_id
                );
            }
            let guild_id = GuildId::new(entry.guild_id.trim());
            let previous = settings.insert(
                guild_id.clone(),
                TenantSettings {
                    log_directory: entry.log_directory.clone(),
                    command_marker: entry.command_marker,
                    spawn_coordinates: entry.spawn,
                    teleport_locations: entry
                        .teleports
                        .iter()
                        .map(|(name, coordinates)| (name.to_ascii_lowercase(), *coordinates))
                        .collect(),
                    intervals: PipelineIntervals {
                        login: Duration::from_secs(entry.login_interval_seconds),
                        chat: Duration::from_secs(entry.chat_interval_seconds),
                        restart_check: Duration::from_secs(entry.restart_check_interval_seconds),
                    },
                    first_join_teleport_delay: Duration::from_secs(
                        entry.first_join_teleport_delay_seconds,
                    ),
                },
            );
            if previous.is_some() {
                bail!("tenant '{guild_id}' is configured more than once");
            }
        }
        Ok(settings)
    }
}

pub fn load_daemon_config(path: &Path) -> Result<DaemonConfig> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read config file {}", path.display()))?;
    let config: DaemonConfig = toml::from_str(&raw)
        .with_context(|| format!("failed to parse config file {}", path.display()))?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    const SAMPLE_CONFIG: &str = r##"
listen_addr = "127.0.0.1:9100"
accounts_path = "state/accounts.json"

[[packages]]
name = "welcomepack"
cost = 0
items = ["#SpawnItem Weapon_M9 1"]

[[packages]]
name = "drill"
cost = 1500
required_role = "donor"
items = ["#SpawnItem Drill 1"]

[[tenants]]
guild_id = "guild-1"
log_directory = "SCUM/Saved/Logs"
command_marker = "!"
login_interval_seconds = 15
spawn = { x = 100.0, y = 200.0, z = 300.0 }

[tenants.teleports]
Bunker = { x = 1.0, y = 2.0, z = 3.0 }
"##;

    #[test]
    fn parses_full_config() {
        let config: DaemonConfig = toml::from_str(SAMPLE_CONFIG).expect("config");
        assert_eq!(config.listen_addr, "127.0.0.1:9100");
        assert_eq!(config.packages.len(), 2);
        assert_eq!(config.packages[1].cost, 1500);
        assert_eq!(config.packages[0].required_role, None);
        assert_eq!(config.packages[1].required_role.as_deref(), Some("donor"));

        let settings = config.tenant_settings().expect("settings");
        let tenant = &settings[&GuildId::new("guild-1")];
        assert_eq!(tenant.command_marker, '!');
        assert_eq!(tenant.intervals.login, Duration::from_secs(15));
        // Defaults fill in whatever the entry omits.
        assert_eq!(tenant.intervals.chat, Duration::from_secs(20));
        assert!(tenant.spawn_coordinates.is_some());
        // Teleport names are matched case-insensitively; stored lowercase.
        assert!(tenant.teleport_locations.contains_key("bunker"));
    }

    #[test]
    fn empty_config_yields_defaults() {
        let config: DaemonConfig = toml::from_str("").expect("config");
        assert_eq!(config.listen_addr, DEFAULT_LISTEN_ADDR);
        assert!(config.tenants.is_empty());
        assert!(config.tenant_settings().expect("settings").is_empty());
    }

    #[test]
    fn duplicate_tenant_is_rejected() {
        let raw = r#"
[[tenants]]
guild_id = "g"
log_directory = "a"

[[tenants]]
guild_id = "g"
log_directory = "b"
"#;
        let config: DaemonConfig = toml::from_str(raw).expect("config");
        assert!(config.tenant_settings().is_err());
    }

    #[test]
    fn zero_interval_is_rejected() {
        let raw = r#"
[[tenants]]
guild_id = "g"
log_directory = "a"
login_interval_seconds = 0
"#;
        let config: DaemonConfig = toml::from_str(raw).expect("config");
        assert!(config.tenant_settings().is_err());
    }

    #[test]
    fn load_reports_missing_and_malformed_files() {
        assert!(load_daemon_config(Path::new("/nonexistent/warden.toml")).is_err());

        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        file.write_all(b"not = [valid").expect("write");
        assert!(load_daemon_config(file.path()).is_err());

        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        file.write_all(SAMPLE_CONFIG.as_bytes()).expect("write");
        assert!(load_daemon_config(file.path()).is_ok());
    }
}
