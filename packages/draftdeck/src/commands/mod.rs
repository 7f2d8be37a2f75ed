pub mod config;
pub mod data;
pub mod device;
pub mod user;

use draftdeck::config::Config;
use draftdeck::device::DeviceIdentity;
use draftdeck::error::Result;

use crate::cli::Cli;

/// Load config, apply command-line overrides and build the identity service
pub fn load_identity(cli: &Cli) -> Result<DeviceIdentity> {
    let mut config = Config::load()?;
    if let Some(ref ua) = cli.user_agent {
        config.environment.user_agent = Some(ua.clone());
    }
    DeviceIdentity::from_config(&config)
}
