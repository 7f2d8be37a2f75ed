use colored::Colorize;

use draftdeck::error::{DraftdeckError, Result};

use super::load_identity;
use crate::cli::{Cli, DataCommands};

pub fn run(cli: &Cli, command: &DataCommands) -> Result<()> {
    match command {
        DataCommands::Key { key } => session_key(cli, key),
        DataCommands::Set { key, value } => set(cli, key, value),
        DataCommands::Get { key } => get(cli, key),
        DataCommands::Clear { key } => clear(cli, key),
        DataCommands::List => list(cli),
    }
}

fn session_key(cli: &Cli, key: &str) -> Result<()> {
    let identity = load_identity(cli)?;
    let session_key = identity.session_key(key);

    if cli.json {
        println!(
            "{}",
            serde_json::json!({ "key": key, "session_key": session_key })
        );
    } else {
        println!("{}", session_key);
    }

    Ok(())
}

fn set(cli: &Cli, key: &str, value: &str) -> Result<()> {
    let value: serde_json::Value = serde_json::from_str(value)
        .map_err(|e| DraftdeckError::InvalidValue(format!("value is not JSON: {}", e)))?;

    let mut identity = load_identity(cli)?;
    identity.set_device_data(key, &value)?;

    if cli.json {
        println!("{}", serde_json::json!({ "success": true, "key": key }));
    } else {
        println!("{} Set {}", "✓".green(), key.bold());
    }

    Ok(())
}

fn get(cli: &Cli, key: &str) -> Result<()> {
    let identity = load_identity(cli)?;
    let value: Option<serde_json::Value> = identity.get_device_data(key);

    if cli.json {
        println!("{}", serde_json::json!({ "key": key, "value": value }));
    } else {
        match value {
            Some(v) => println!("{}", serde_json::to_string_pretty(&v)?),
            None => println!("{}", "(not set)".dimmed()),
        }
    }

    Ok(())
}

fn clear(cli: &Cli, key: &str) -> Result<()> {
    let mut identity = load_identity(cli)?;
    identity.clear_device_data(key)?;

    if cli.json {
        println!("{}", serde_json::json!({ "success": true, "key": key }));
    } else {
        println!("{} Cleared {}", "✓".green(), key.bold());
    }

    Ok(())
}

fn list(cli: &Cli) -> Result<()> {
    let identity = load_identity(cli)?;
    let keys = identity.device_data_keys();

    if cli.json {
        println!("{}", serde_json::json!({ "keys": keys }));
    } else if keys.is_empty() {
        println!("{}", "(no data)".dimmed());
    } else {
        for key in keys {
            println!("  {} {}", "●".cyan(), key);
        }
    }

    Ok(())
}
