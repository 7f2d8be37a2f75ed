use clap::{Parser, Subcommand};

use crate::commands;
use draftdeck::error::Result;

/// Draftdeck - device identity for draft planning clients
#[derive(Parser)]
#[command(name = "draftdeck")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// User-agent string to identify as (overrides config and host detection)
    #[arg(long, env = "DRAFTDECK_USER_AGENT", global = true)]
    pub user_agent: Option<String>,

    /// Output in JSON format
    #[arg(long, global = true)]
    pub json: bool,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Device identity commands
    Device {
        #[command(subcommand)]
        command: DeviceCommands,
    },

    /// Per-device session data
    Data {
        #[command(subcommand)]
        command: DataCommands,
    },

    /// Current user record
    User {
        #[command(subcommand)]
        command: UserCommands,
    },

    /// Configuration management
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

#[derive(Subcommand)]
pub enum DeviceCommands {
    /// Show the cached device snapshot
    Info,

    /// Print the persistent device id
    Id,

    /// Print the browser fingerprint
    Fingerprint,

    /// Print the device payload attached to backend requests
    Payload,

    /// Discard the persisted device id and create a new one
    Reset,

    /// Classify a user-agent string without touching storage
    Classify {
        /// User-agent string (e.g., "Mozilla/5.0 (iPhone; ...)")
        user_agent: String,
    },
}

#[derive(Subcommand)]
pub enum DataCommands {
    /// Print the session key a logical key maps to on this device
    Key {
        /// Logical key (e.g., "draft_state")
        key: String,
    },

    /// Store a JSON value under a logical key
    Set {
        /// Logical key
        key: String,
        /// JSON value (e.g., '{"picks":[]}')
        value: String,
    },

    /// Read the JSON value stored under a logical key
    Get {
        /// Logical key
        key: String,
    },

    /// Remove the value stored under a logical key
    Clear {
        /// Logical key
        key: String,
    },

    /// List logical keys stored for this device
    List,
}

#[derive(Subcommand)]
pub enum UserCommands {
    /// Print the current user's id
    Id,

    /// Store the current user record
    Login {
        /// JSON user record (e.g., '{"id":"u-1","name":"coach"}')
        record: String,
    },

    /// Remove the current user record
    Logout,
}

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Show current configuration
    Show,

    /// Set a configuration value
    Set {
        /// Configuration key (e.g., environment.user_agent)
        key: String,
        /// Configuration value
        value: String,
    },

    /// Get a configuration value
    Get {
        /// Configuration key
        key: String,
    },

    /// Show configuration file path
    Path,
}

impl Cli {
    pub fn run(&self) -> Result<()> {
        match &self.command {
            Commands::Device { command } => commands::device::run(self, command),
            Commands::Data { command } => commands::data::run(self, command),
            Commands::User { command } => commands::user::run(self, command),
            Commands::Config { command } => commands::config::run(self, command),
        }
    }
}
