use anyhow::{Context, Result};
use colored::Colorize;
use std::path::Path;

use super::binary_resolver::find_binary;
use crate::runner::target::Browser;

pub enum SystemCommand {
    /// Report which local browser drivers can be resolved
    Check,
}

pub async fn handle_system_command(command: SystemCommand) -> Result<()> {
    match command {
        SystemCommand::Check => check_drivers(),
    }
}

fn check_drivers() -> Result<()> {
    println!("{}", "Checking browser drivers...".blue().bold());

    let mut missing = 0;
    for browser in [Browser::Chrome, Browser::Firefox, Browser::Edge] {
        match find_binary(browser.driver_binary()) {
            Ok(path) => println!(
                "{} {:<8} {}",
                "✓".green(),
                browser.as_str(),
                path.display()
            ),
            Err(_) => {
                missing += 1;
                println!(
                    "{} {:<8} {} not found",
                    "✗".red(),
                    browser.as_str(),
                    browser.driver_binary()
                );
            }
        }
    }

    if missing == 0 {
        println!("\n{}", "All browser drivers are ready!".green().bold());
    } else {
        println!(
            "\n{} Put missing drivers on PATH or in ${}",
            "!".yellow(),
            super::binary_resolver::DRIVERS_DIR_ENV
        );
    }
    Ok(())
}

/// Open a file with the platform's default handler
pub fn open_in_browser(path: &Path) -> Result<()> {
    let target = path
        .canonicalize()
        .with_context(|| format!("Report not found: {}", path.display()))?;

    #[cfg(target_os = "macos")]
    let status = std::process::Command::new("open").arg(&target).status();

    #[cfg(target_os = "windows")]
    let status = std::process::Command::new("cmd")
        .args(["/C", "start", ""])
        .arg(&target)
        .status();

    #[cfg(not(any(target_os = "macos", target_os = "windows")))]
    let status = std::process::Command::new("xdg-open").arg(&target).status();

    let status = status.context("Failed to launch the default browser")?;
    if !status.success() {
        anyhow::bail!("Browser launcher exited with {}", status);
    }
    Ok(())
}
