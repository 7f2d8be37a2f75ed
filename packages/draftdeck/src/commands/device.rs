use colored::Colorize;

use draftdeck::device::{get_device_name, get_device_type, DeviceInfo};
use draftdeck::error::Result;

use super::load_identity;
use crate::cli::{Cli, DeviceCommands};

pub fn run(cli: &Cli, command: &DeviceCommands) -> Result<()> {
    match command {
        DeviceCommands::Info => info(cli),
        DeviceCommands::Id => id(cli),
        DeviceCommands::Fingerprint => fingerprint(cli),
        DeviceCommands::Payload => payload(cli),
        DeviceCommands::Reset => reset(cli),
        DeviceCommands::Classify { user_agent } => classify(cli, user_agent),
    }
}

fn print_info(info: &DeviceInfo) {
    println!("{} {}", "Device:".bold(), info.device_name.cyan());
    println!();
    println!("  ID: {}", info.device_id);
    println!("  Type: {}", info.device_type);
    println!("  Fingerprint: {}", info.fingerprint);
    println!("  Screen: {}", info.screen_resolution);
    println!("  Timezone: {}", info.timezone);
    println!("  Language: {}", info.language);

    if !info.platform.is_empty() {
        println!("  Platform: {}", info.platform);
    }

    println!("  Cookies: {}", info.cookie_enabled);
    println!("  Online: {}", info.online);
    println!("  User Agent: {}", info.user_agent.dimmed());
}

fn info(cli: &Cli) -> Result<()> {
    let identity = load_identity(cli)?;

    if cli.json {
        println!("{}", serde_json::to_string_pretty(identity.device_info())?);
    } else {
        print_info(identity.device_info());
    }

    Ok(())
}

fn id(cli: &Cli) -> Result<()> {
    let identity = load_identity(cli)?;

    if cli.json {
        println!(
            "{}",
            serde_json::json!({ "device_id": identity.device_id() })
        );
    } else {
        println!("{}", identity.device_id());
    }

    Ok(())
}

fn fingerprint(cli: &Cli) -> Result<()> {
    let identity = load_identity(cli)?;
    let fingerprint = identity.generate_browser_fingerprint();

    if cli.json {
        println!("{}", serde_json::json!({ "fingerprint": fingerprint }));
    } else {
        println!("{}", fingerprint);
    }

    Ok(())
}

fn payload(cli: &Cli) -> Result<()> {
    let identity = load_identity(cli)?;
    let payload = identity.device_info_for_api();

    // The payload is JSON either way; --json only switches to compact output
    if cli.json {
        println!("{}", serde_json::to_string(&payload)?);
    } else {
        println!("{}", serde_json::to_string_pretty(&payload)?);
    }

    Ok(())
}

fn reset(cli: &Cli) -> Result<()> {
    let mut identity = load_identity(cli)?;
    let previous = identity.device_id().to_string();
    identity.reset_device_id()?;

    if cli.json {
        println!(
            "{}",
            serde_json::json!({
                "success": true,
                "previous_device_id": previous,
                "device_id": identity.device_id()
            })
        );
    } else {
        println!(
            "{} Device id reset: {} {} {}",
            "✓".green(),
            previous.dimmed(),
            "→".dimmed(),
            identity.device_id().bold()
        );
    }

    Ok(())
}

fn classify(cli: &Cli, user_agent: &str) -> Result<()> {
    let device_type = get_device_type(user_agent);
    let device_name = get_device_name(user_agent);

    if cli.json {
        println!(
            "{}",
            serde_json::json!({
                "device_type": device_type,
                "device_name": device_name
            })
        );
    } else {
        println!("  Type: {}", device_type.to_string().cyan());
        println!("  Name: {}", device_name.cyan());
    }

    Ok(())
}
