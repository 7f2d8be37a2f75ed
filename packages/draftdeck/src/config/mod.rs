mod profile;

pub use profile::EnvironmentProfile;

use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use figment::providers::{Env, Format, Serialized, Toml};
use figment::Figment;
use serde::{Deserialize, Serialize};

use crate::error::{DraftdeckError, Result};

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Where durable and session data live
    #[serde(default)]
    pub storage: StorageConfig,

    /// Storage keys used by the identity service
    #[serde(default)]
    pub identity: IdentityConfig,

    /// Overrides for the captured host environment
    #[serde(default)]
    pub environment: EnvironmentProfile,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Directory holding durable data (overrides the platform data dir)
    pub data_dir: Option<String>,

    /// Directory holding session-lifetime data (overrides the temp dir)
    pub session_dir: Option<String>,

    /// Session scope name; defaults to the parent process id
    #[serde(default, deserialize_with = "deserialize_scope")]
    pub session_scope: Option<String>,
}

impl StorageConfig {
    /// Path of the durable store file
    pub fn durable_path(&self) -> PathBuf {
        let dir = match self.data_dir.as_deref().map(str::trim) {
            Some(dir) if !dir.is_empty() => PathBuf::from(shellexpand::tilde(dir).to_string()),
            _ => dirs::data_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join("draftdeck"),
        };
        dir.join("durable.json")
    }

    fn session_root(&self) -> PathBuf {
        match self.session_dir.as_deref().map(str::trim) {
            Some(dir) if !dir.is_empty() => PathBuf::from(shellexpand::tilde(dir).to_string()),
            _ => std::env::temp_dir().join("draftdeck").join("sessions"),
        }
    }

    /// Path of the session store file for the effective scope
    pub fn session_path(&self) -> PathBuf {
        self.session_root()
            .join(format!("session-{}.json", self.effective_session_scope()))
    }

    /// Delete other scopes' session files not modified within `max_age`.
    ///
    /// Returns how many files were removed. Failures are logged and skipped.
    pub fn prune_stale_sessions(&self, max_age: Duration) -> usize {
        let root = self.session_root();
        let current = self.session_path();
        let Ok(entries) = fs::read_dir(&root) else {
            return 0;
        };

        let mut removed = 0;
        for entry in entries.flatten() {
            let path = entry.path();
            let name = entry.file_name();
            let name = name.to_string_lossy();
            if path == current || !name.starts_with("session-") || !name.ends_with(".json") {
                continue;
            }

            let stale = entry
                .metadata()
                .and_then(|meta| meta.modified())
                .ok()
                .and_then(|modified| modified.elapsed().ok())
                .is_some_and(|age| age > max_age);
            if !stale {
                continue;
            }

            match fs::remove_file(&path) {
                Ok(()) => {
                    tracing::debug!("Removed stale session store {}", path.display());
                    removed += 1;
                }
                Err(e) => {
                    tracing::warn!("Failed to remove session store {}: {}", path.display(), e)
                }
            }
        }

        removed
    }

    pub fn effective_session_scope(&self) -> String {
        match self.session_scope.as_deref().map(str::trim) {
            Some(scope) if !scope.is_empty() => sanitize_scope(scope),
            _ => default_session_scope(),
        }
    }
}

/// Session files of other scopes older than this are pruned on open
pub const SESSION_MAX_AGE: Duration = Duration::from_secs(7 * 24 * 60 * 60);

#[cfg(unix)]
fn default_session_scope() -> String {
    std::os::unix::process::parent_id().to_string()
}

#[cfg(not(unix))]
fn default_session_scope() -> String {
    std::process::id().to_string()
}

fn sanitize_scope(scope: &str) -> String {
    scope
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect()
}

/// Accept a scope written as a string or a bare number (`DRAFTDECK_STORAGE__SESSION_SCOPE=$$`)
fn deserialize_scope<'de, D>(deserializer: D) -> std::result::Result<Option<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    use serde::de::Error;

    let value: Option<serde_json::Value> = Option::deserialize(deserializer)?;

    match value {
        None | Some(serde_json::Value::Null) => Ok(None),
        Some(serde_json::Value::String(s)) => Ok(Some(s)),
        Some(serde_json::Value::Number(n)) => Ok(Some(n.to_string())),
        _ => Err(D::Error::custom("Expected string or number for session_scope")),
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IdentityConfig {
    /// Durable key holding the device id
    #[serde(default = "default_device_id_key")]
    pub device_id_key: String,

    /// Durable key holding the JSON current-user record
    #[serde(default = "default_current_user_key")]
    pub current_user_key: String,

    /// Field of the current-user record holding its id
    #[serde(default = "default_user_id_field")]
    pub user_id_field: String,
}

impl Default for IdentityConfig {
    fn default() -> Self {
        Self {
            device_id_key: default_device_id_key(),
            current_user_key: default_current_user_key(),
            user_id_field: default_user_id_field(),
        }
    }
}

fn default_device_id_key() -> String {
    "device_id".to_string()
}

fn default_current_user_key() -> String {
    "user".to_string()
}

fn default_user_id_field() -> String {
    "id".to_string()
}

fn parse_value<T: std::str::FromStr>(key: &str, value: &str) -> Result<T> {
    value.trim().parse().map_err(|_| {
        DraftdeckError::ConfigError(format!("Invalid value for {}: {}", key, value))
    })
}

fn non_empty(value: &str) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

impl Config {
    /// Load configuration from all sources (file, env, defaults)
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path())
    }

    /// Load configuration layering defaults, the given file and DRAFTDECK_* env vars
    pub fn load_from(config_path: &std::path::Path) -> Result<Self> {
        let config: Config = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Toml::file(config_path))
            // Nested keys use a double underscore: DRAFTDECK_STORAGE__DATA_DIR
            .merge(Env::prefixed("DRAFTDECK_").split("__"))
            .extract()
            .map_err(|e| DraftdeckError::ConfigError(e.to_string()))?;

        Ok(config)
    }

    /// Get the configuration file path
    pub fn config_path() -> PathBuf {
        if let Some(path) = std::env::var_os("DRAFTDECK_CONFIG_PATH") {
            return PathBuf::from(path);
        }

        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("draftdeck")
            .join("config.toml")
    }

    /// Save configuration to file
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path())
    }

    pub fn save_to(&self, path: &std::path::Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)
            .map_err(|e| DraftdeckError::ConfigError(e.to_string()))?;

        fs::write(path, content)?;
        Ok(())
    }

    /// Read a single dotted config key as a display string
    pub fn get_value(&self, key: &str) -> Result<Option<String>> {
        let env = &self.environment;
        let value = match key {
            "storage.data_dir" => self.storage.data_dir.clone(),
            "storage.session_dir" => self.storage.session_dir.clone(),
            "storage.session_scope" => self.storage.session_scope.clone(),
            "identity.device_id_key" => Some(self.identity.device_id_key.clone()),
            "identity.current_user_key" => Some(self.identity.current_user_key.clone()),
            "identity.user_id_field" => Some(self.identity.user_id_field.clone()),
            "environment.user_agent" => env.user_agent.clone(),
            "environment.language" => env.language.clone(),
            "environment.platform" => env.platform.clone(),
            "environment.screen_width" => env.screen_width.map(|v| v.to_string()),
            "environment.screen_height" => env.screen_height.map(|v| v.to_string()),
            "environment.timezone_offset_minutes" => {
                env.timezone_offset_minutes.map(|v| v.to_string())
            }
            "environment.cookie_enabled" => env.cookie_enabled.map(|v| v.to_string()),
            "environment.online" => env.online.map(|v| v.to_string()),
            "environment.disable_canvas" => Some(env.disable_canvas.to_string()),
            _ => {
                return Err(DraftdeckError::ConfigError(format!(
                    "Unknown config key: {}",
                    key
                )))
            }
        };

        Ok(value)
    }

    /// Set a single dotted config key from its string form
    pub fn set_value(&mut self, key: &str, value: &str) -> Result<()> {
        let env = &mut self.environment;
        match key {
            "storage.data_dir" => self.storage.data_dir = non_empty(value),
            "storage.session_dir" => self.storage.session_dir = non_empty(value),
            "storage.session_scope" => self.storage.session_scope = non_empty(value),
            "identity.device_id_key" | "identity.current_user_key" | "identity.user_id_field" => {
                let value = non_empty(value).ok_or_else(|| {
                    DraftdeckError::ConfigError(format!("{} cannot be empty", key))
                })?;
                match key {
                    "identity.device_id_key" => self.identity.device_id_key = value,
                    "identity.current_user_key" => self.identity.current_user_key = value,
                    _ => self.identity.user_id_field = value,
                }
            }
            "environment.user_agent" => env.user_agent = non_empty(value),
            "environment.language" => env.language = non_empty(value),
            "environment.platform" => env.platform = non_empty(value),
            "environment.screen_width" => env.screen_width = Some(parse_value(key, value)?),
            "environment.screen_height" => env.screen_height = Some(parse_value(key, value)?),
            "environment.timezone_offset_minutes" => {
                env.timezone_offset_minutes = Some(parse_value(key, value)?)
            }
            "environment.cookie_enabled" => env.cookie_enabled = Some(parse_value(key, value)?),
            "environment.online" => env.online = Some(parse_value(key, value)?),
            "environment.disable_canvas" => env.disable_canvas = parse_value(key, value)?,
            _ => {
                return Err(DraftdeckError::ConfigError(format!(
                    "Unknown config key: {}",
                    key
                )))
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    fn default_config_uses_browser_storage_keys() {
        let config = Config::default();

        assert_eq!(config.identity.device_id_key, "device_id");
        assert_eq!(config.identity.current_user_key, "user");
        assert_eq!(config.identity.user_id_field, "id");
        assert!(config.environment.is_empty());
    }

    #[test]
    fn storage_paths_honor_configured_dirs() {
        let storage = StorageConfig {
            data_dir: Some("/tmp/dd-data".to_string()),
            session_dir: Some("/tmp/dd-sessions".to_string()),
            session_scope: Some("tab one".to_string()),
        };

        assert_eq!(
            storage.durable_path(),
            PathBuf::from("/tmp/dd-data/durable.json")
        );
        assert_eq!(
            storage.session_path(),
            PathBuf::from("/tmp/dd-sessions/session-tab_one.json")
        );
    }

    #[test]
    fn tilde_dirs_expand_to_home() {
        let home = dirs::home_dir().unwrap();
        let storage = StorageConfig {
            data_dir: Some("~".to_string()),
            session_dir: Some("~/.draftdeck/sessions".to_string()),
            session_scope: Some("s".to_string()),
        };

        assert_eq!(storage.durable_path(), home.join("durable.json"));
        assert_eq!(
            storage.session_path(),
            home.join(".draftdeck").join("sessions").join("session-s.json")
        );
    }

    #[test]
    fn prune_removes_only_old_session_files() {
        let dir = tempfile::tempdir().unwrap();
        let storage = StorageConfig {
            session_dir: Some(dir.path().display().to_string()),
            session_scope: Some("current".to_string()),
            ..Default::default()
        };
        let month_ago = std::time::SystemTime::now() - Duration::from_secs(30 * 24 * 60 * 60);
        let write_aged = |name: &str, aged: bool| {
            let path = dir.path().join(name);
            fs::write(&path, "{}").unwrap();
            if aged {
                let file = fs::File::options().write(true).open(&path).unwrap();
                file.set_modified(month_ago).unwrap();
            }
            path
        };

        let old = write_aged("session-1001.json", true);
        let fresh = write_aged("session-1002.json", false);
        let current = write_aged("session-current.json", true);
        let unrelated = write_aged("notes.json", true);

        assert_eq!(storage.prune_stale_sessions(SESSION_MAX_AGE), 1);
        assert!(!old.exists());
        assert!(fresh.exists());
        assert!(current.exists());
        assert!(unrelated.exists());
    }

    #[test]
    fn prune_tolerates_missing_session_dir() {
        let dir = tempfile::tempdir().unwrap();
        let storage = StorageConfig {
            session_dir: Some(dir.path().join("absent").display().to_string()),
            ..Default::default()
        };

        assert_eq!(storage.prune_stale_sessions(Duration::ZERO), 0);
    }

    #[test]
    fn blank_session_scope_falls_back_to_process_scope() {
        let storage = StorageConfig {
            session_scope: Some("   ".to_string()),
            ..Default::default()
        };

        assert_eq!(storage.effective_session_scope(), default_session_scope());
    }

    #[test]
    #[serial]
    fn load_from_merges_toml_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            "[identity]\ncurrent_user_key = \"currentUser\"\n\n[environment]\nscreen_width = 390\n",
        )
        .unwrap();

        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.identity.current_user_key, "currentUser");
        assert_eq!(config.identity.device_id_key, "device_id");
        assert_eq!(config.environment.screen_width, Some(390));
    }

    #[test]
    #[serial]
    fn save_then_load_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let mut config = Config::default();
        config
            .set_value("environment.user_agent", "Mozilla/5.0 (iPhone)")
            .unwrap();
        config.save_to(&path).unwrap();

        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(
            loaded.environment.user_agent.as_deref(),
            Some("Mozilla/5.0 (iPhone)")
        );
    }

    #[test]
    #[serial]
    fn numeric_session_scope_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[storage]\nsession_scope = 4242\n").unwrap();

        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.storage.session_scope.as_deref(), Some("4242"));
        assert_eq!(config.storage.effective_session_scope(), "4242");
    }

    #[test]
    #[serial]
    fn numeric_session_scope_from_env() {
        let dir = tempfile::tempdir().unwrap();
        std::env::set_var("DRAFTDECK_STORAGE__SESSION_SCOPE", "12345");

        let loaded = Config::load_from(&dir.path().join("config.toml"));
        std::env::remove_var("DRAFTDECK_STORAGE__SESSION_SCOPE");

        let config = loaded.unwrap();
        assert_eq!(config.storage.session_scope.as_deref(), Some("12345"));
        assert_eq!(
            config.storage.session_path().file_name().unwrap(),
            "session-12345.json"
        );
    }

    #[test]
    fn set_value_parses_typed_fields() {
        let mut config = Config::default();
        config.set_value("environment.screen_height", "844").unwrap();
        config
            .set_value("environment.timezone_offset_minutes", "-120")
            .unwrap();
        config.set_value("environment.online", "false").unwrap();

        assert_eq!(
            config.get_value("environment.screen_height").unwrap().as_deref(),
            Some("844")
        );
        assert_eq!(config.environment.timezone_offset_minutes, Some(-120));
        assert_eq!(config.environment.online, Some(false));
    }

    #[test]
    fn set_value_rejects_bad_input() {
        let mut config = Config::default();

        assert!(matches!(
            config.set_value("environment.screen_width", "wide"),
            Err(DraftdeckError::ConfigError(_))
        ));
        assert!(matches!(
            config.set_value("identity.device_id_key", "  "),
            Err(DraftdeckError::ConfigError(_))
        ));
        assert!(matches!(
            config.set_value("browser.headless", "true"),
            Err(DraftdeckError::ConfigError(_))
        ));
    }

    #[test]
    fn blank_optional_value_clears_override() {
        let mut config = Config::default();
        config.set_value("environment.language", "fr-FR").unwrap();
        config.set_value("environment.language", "").unwrap();

        assert_eq!(config.get_value("environment.language").unwrap(), None);
    }
}
