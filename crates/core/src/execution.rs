use std::process::{Command, Stdio};

use log::info;

use crate::error::{Error, Result};

/// Builds the foreground invocation `<shell> -c <command_text>`.
#[must_use]
pub fn shell_command(shell: &str, command_text: &str) -> Command {
    let mut command = Command::new(shell);
    command.args(["-c", command_text]);
    command
}

/// Executes a command in the foreground with inherited stdio.
///
/// # Errors
///
/// Returns [`Error::SubProcess`] if the process cannot be spawned and
/// [`Error::SubProcessExit`] with the exit code if it does not succeed.
pub fn execute_command(mut command: Command) -> Result<()> {
    let command = command
        .stdin(Stdio::inherit())
        .stdout(Stdio::inherit())
        .stderr(Stdio::inherit());

    info!("Executing {:?}", command);

    let status = command
        .spawn()
        .and_then(|mut child| child.wait())
        .map_err(Error::SubProcess)?;

    if status.success() {
        Ok(())
    } else {
        // Killed by a signal has no code
        Err(Error::SubProcessExit(status.code().unwrap_or(-1)))
    }
}
