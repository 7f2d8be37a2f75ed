//! Device identity service.
//!
//! A [`DeviceIdentity`] resolves one persistent device id at construction
//! and caches a [`DeviceInfo`] snapshot next to it. It is built explicitly
//! and handed to whatever needs it. Nothing here is global.

pub mod canvas;
pub mod classifier;
pub mod environment;
pub mod fingerprint;
pub mod resolver;
pub mod scoped;

pub use classifier::{get_device_name, get_device_type, DeviceType};
pub use environment::Environment;
pub use fingerprint::generate_browser_fingerprint;
pub use resolver::get_or_create_device_id;
pub use scoped::{session_key, ScopedStore};

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::config::{Config, IdentityConfig, SESSION_MAX_AGE};
use crate::error::{DraftdeckError, Result};
use crate::storage::{JsonFileStore, KeyValueStore};

/// Cached identity snapshot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeviceInfo {
    pub device_id: String,
    pub fingerprint: String,
    pub device_type: DeviceType,
    pub device_name: String,
    pub user_agent: String,
    pub screen_resolution: String,
    pub timezone: String,
    pub language: String,
    pub platform: String,
    pub cookie_enabled: bool,
    pub online: bool,
}

impl DeviceInfo {
    fn build(device_id: &str, env: &Environment) -> Self {
        Self {
            device_id: device_id.to_string(),
            fingerprint: generate_browser_fingerprint(env),
            device_type: get_device_type(&env.user_agent),
            device_name: get_device_name(&env.user_agent).to_string(),
            user_agent: env.user_agent.clone(),
            screen_resolution: env.screen_resolution(),
            timezone: env.timezone.clone(),
            language: env.language.clone(),
            platform: env.platform.clone(),
            cookie_enabled: env.cookie_enabled,
            online: env.online,
        }
    }
}

/// Device fields attached to outbound backend requests
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiDevicePayload {
    pub device_id: String,
    pub device_name: String,
    pub device_type: DeviceType,
    pub browser_fingerprint: String,
    pub user_id: Option<String>,
}

/// Persistent device identity plus per-device session data
pub struct DeviceIdentity {
    durable: Box<dyn KeyValueStore>,
    session: ScopedStore,
    environment: Environment,
    keys: IdentityConfig,
    device_id: String,
    device_info: DeviceInfo,
}

impl std::fmt::Debug for DeviceIdentity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DeviceIdentity")
            .field("device_id", &self.device_id)
            .field("device_info", &self.device_info)
            .finish_non_exhaustive()
    }
}

impl DeviceIdentity {
    /// Resolve the device id against `durable` and snapshot `environment`
    pub fn new(
        mut durable: Box<dyn KeyValueStore>,
        session: Box<dyn KeyValueStore>,
        environment: Environment,
        keys: IdentityConfig,
    ) -> Result<Self> {
        let device_id = get_or_create_device_id(
            durable.as_mut(),
            &keys.device_id_key,
            &environment.user_agent,
        )?;
        let device_info = DeviceInfo::build(&device_id, &environment);
        tracing::debug!(
            "Device identity ready: {} ({}, {})",
            device_id,
            device_info.device_name,
            device_info.device_type
        );

        Ok(Self {
            durable,
            session: ScopedStore::new(session),
            environment,
            keys,
            device_id,
            device_info,
        })
    }

    /// Open the configured file stores and capture the host environment
    pub fn from_config(config: &Config) -> Result<Self> {
        config.storage.prune_stale_sessions(SESSION_MAX_AGE);
        let durable = JsonFileStore::open(config.storage.durable_path());
        let session = JsonFileStore::open(config.storage.session_path());
        tracing::debug!(
            "Using durable store {} and session store {}",
            durable.path().display(),
            session.path().display()
        );

        Self::new(
            Box::new(durable),
            Box::new(session),
            Environment::capture(&config.environment),
            config.identity.clone(),
        )
    }

    pub fn device_id(&self) -> &str {
        &self.device_id
    }

    pub fn device_info(&self) -> &DeviceInfo {
        &self.device_info
    }

    /// Recompute the fingerprint from the captured environment
    pub fn generate_browser_fingerprint(&self) -> String {
        generate_browser_fingerprint(&self.environment)
    }

    /// Session-store key for `logical_key` on this device
    pub fn session_key(&self, logical_key: &str) -> String {
        session_key(logical_key, &self.device_id)
    }

    pub fn set_device_data<T: Serialize + ?Sized>(
        &mut self,
        logical_key: &str,
        value: &T,
    ) -> Result<()> {
        self.session.set(&self.device_id, logical_key, value)
    }

    /// Read device data; absent or malformed values read as `None`
    pub fn get_device_data<T: DeserializeOwned>(&self, logical_key: &str) -> Option<T> {
        self.session.get(&self.device_id, logical_key)
    }

    pub fn try_get_device_data<T: DeserializeOwned>(&self, logical_key: &str) -> Result<Option<T>> {
        self.session.try_get(&self.device_id, logical_key)
    }

    pub fn clear_device_data(&mut self, logical_key: &str) -> Result<()> {
        self.session.clear(&self.device_id, logical_key)
    }

    /// Logical keys holding data for this device
    pub fn device_data_keys(&self) -> Vec<String> {
        self.session.logical_keys(&self.device_id)
    }

    /// Id of the signed-in user; absent or malformed records read as `None`
    pub fn current_user_id(&self) -> Option<String> {
        match self.try_current_user_id() {
            Ok(id) => id,
            Err(e) => {
                tracing::warn!("Error getting current user: {}", e);
                None
            }
        }
    }

    pub fn try_current_user_id(&self) -> Result<Option<String>> {
        let key = &self.keys.current_user_key;
        let Some(text) = self.durable.get_item(key) else {
            return Ok(None);
        };

        let record: serde_json::Value =
            serde_json::from_str(&text).map_err(|e| DraftdeckError::MalformedData {
                key: key.clone(),
                reason: e.to_string(),
            })?;

        Ok(match record.get(&self.keys.user_id_field) {
            Some(serde_json::Value::String(id)) => Some(id.clone()),
            Some(serde_json::Value::Number(id)) => Some(id.to_string()),
            _ => None,
        })
    }

    /// Persist the current-user record, as a login would
    pub fn set_current_user(&mut self, record: &serde_json::Value) -> Result<()> {
        if !record.is_object() {
            return Err(DraftdeckError::InvalidValue(
                "current user record must be a JSON object".to_string(),
            ));
        }
        let text = serde_json::to_string(record)?;
        self.durable.set_item(&self.keys.current_user_key, &text)
    }

    /// Remove the current-user record, as a logout would
    pub fn clear_current_user(&mut self) -> Result<()> {
        self.durable.remove_item(&self.keys.current_user_key)
    }

    pub fn device_info_for_api(&self) -> ApiDevicePayload {
        ApiDevicePayload {
            device_id: self.device_id.clone(),
            device_name: self.device_info.device_name.clone(),
            device_type: self.device_info.device_type,
            browser_fingerprint: self.device_info.fingerprint.clone(),
            user_id: self.current_user_id(),
        }
    }

    /// Replace the persisted id and regenerate the snapshot in place.
    ///
    /// The new id is written over the old one; if that write fails the
    /// service keeps its current id.
    pub fn reset_device_id(&mut self) -> Result<()> {
        let device_id = resolver::generate_device_id(&self.environment.user_agent);
        self.durable.set_item(&self.keys.device_id_key, &device_id)?;

        tracing::info!("Device id reset: {} -> {}", self.device_id, device_id);
        self.device_info = DeviceInfo::build(&device_id, &self.environment);
        self.device_id = device_id;

        Ok(())
    }
}
