//! Post-scaffold plan execution.
//!
//! The core components return intents; this module is the collaborator that
//! touches the filesystem and spawns processes. Deletions are confined to
//! the project root, and command failures are reported but do not abort the
//! scaffold.

use std::fs;
use std::path::{Component, Path};
use std::process::Command;

use anyhow::{bail, Result};
use tracing::{info, warn};

use atelier_templates::{CommandIntent, PostScaffoldPlan};

/// Apply a post-scaffold plan under the given project root.
pub fn apply_plan(root: &Path, plan: &PostScaffoldPlan, run_commands: bool) -> Result<()> {
    for deletion in &plan.deletions {
        delete_within(root, deletion)?;
    }

    if !run_commands {
        if !plan.commands.is_empty() {
            info!("Skipping {} post-scaffold commands", plan.commands.len());
        }
        return Ok(());
    }

    for intent in &plan.commands {
        run_command(root, intent);
    }
    Ok(())
}

/// Remove a path, refusing anything that escapes the project root.
fn delete_within(root: &Path, relative: &str) -> Result<()> {
    let candidate = Path::new(relative);
    if candidate.is_absolute()
        || candidate
            .components()
            .any(|c| matches!(c, Component::ParentDir))
    {
        bail!("refusing to delete '{}': path escapes the project root", relative);
    }

    let path = root.join(candidate);
    if path.exists() {
        info!("Deleting {}", path.display());
        fs::remove_dir_all(&path).or_else(|_| fs::remove_file(&path))?;
    }
    Ok(())
}

/// Run a single command in the project root via the platform shell.
/// Failures are non-fatal: the scaffolded project is already on disk and
/// the user can re-run the command by hand.
fn run_command(root: &Path, intent: &CommandIntent) {
    info!("{} ({})", intent.description, intent.command);

    let mut command = shell_command(&intent.command);
    command.current_dir(root).env("CI", "true");

    match command.output() {
        Ok(output) if output.status.success() => {
            info!("Command '{}' succeeded", intent.command);
        }
        Ok(output) => {
            warn!(
                "Command '{}' failed with {}: {}",
                intent.command,
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            );
        }
        Err(e) => {
            warn!("Command '{}' could not be started: {}", intent.command, e);
        }
    }
}

#[cfg(windows)]
fn shell_command(command_line: &str) -> Command {
    let mut command = Command::new("cmd");
    command.args(["/C", command_line]);
    command
}

#[cfg(not(windows))]
fn shell_command(command_line: &str) -> Command {
    let mut command = Command::new("sh");
    command.args(["-c", command_line]);
    command
}
