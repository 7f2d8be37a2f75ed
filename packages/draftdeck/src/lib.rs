//! Persistent device identity for draft planning clients.
//!
//! The [`device::DeviceIdentity`] service resolves a durable per-profile
//! device id, derives a best-effort fingerprint and device classification
//! from a captured [`device::Environment`], and namespaces session data per
//! device.
//!
//! ```no_run
//! use draftdeck::config::Config;
//! use draftdeck::device::DeviceIdentity;
//!
//! # fn main() -> draftdeck::error::Result<()> {
//! let config = Config::load()?;
//! let mut identity = DeviceIdentity::from_config(&config)?;
//!
//! identity.set_device_data("draft_state", &serde_json::json!({"phase": "ban"}))?;
//! let payload = identity.device_info_for_api();
//! println!("{}", serde_json::to_string(&payload)?);
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod device;
pub mod error;
pub mod storage;
