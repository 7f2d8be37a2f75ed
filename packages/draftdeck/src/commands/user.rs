use colored::Colorize;

use draftdeck::error::{DraftdeckError, Result};

use super::load_identity;
use crate::cli::{Cli, UserCommands};

pub fn run(cli: &Cli, command: &UserCommands) -> Result<()> {
    match command {
        UserCommands::Id => id(cli),
        UserCommands::Login { record } => login(cli, record),
        UserCommands::Logout => logout(cli),
    }
}

fn id(cli: &Cli) -> Result<()> {
    let identity = load_identity(cli)?;
    let user_id = identity.current_user_id();

    if cli.json {
        println!("{}", serde_json::json!({ "user_id": user_id }));
    } else {
        match user_id {
            Some(id) => println!("{}", id),
            None => println!("{}", "(signed out)".dimmed()),
        }
    }

    Ok(())
}

fn login(cli: &Cli, record: &str) -> Result<()> {
    let record: serde_json::Value = serde_json::from_str(record)
        .map_err(|e| DraftdeckError::InvalidValue(format!("user record is not JSON: {}", e)))?;

    let mut identity = load_identity(cli)?;
    identity.set_current_user(&record)?;
    let user_id = identity.current_user_id();

    if cli.json {
        println!(
            "{}",
            serde_json::json!({ "success": true, "user_id": user_id })
        );
    } else {
        match user_id {
            Some(id) => println!("{} Signed in as {}", "✓".green(), id.bold()),
            None => println!(
                "{} Stored user record {}",
                "✓".green(),
                "(no id field)".dimmed()
            ),
        }
    }

    Ok(())
}

fn logout(cli: &Cli) -> Result<()> {
    let mut identity = load_identity(cli)?;
    identity.clear_current_user()?;

    if cli.json {
        println!("{}", serde_json::json!({ "success": true }));
    } else {
        println!("{} Signed out", "✓".green());
    }

    Ok(())
}
