//! Shell integration: a `see` wrapper function that evaluates the command
//! text printed by the binary, so commands like `export` or `cd` affect the
//! calling shell.

use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use log::info;
use see_core::error::{Error, Result};

use crate::cli_args::ShellKind;

/// First line of the installed wrapper, used to detect an existing install.
pub const WRAPPER_MARKER: &str = "# SEE Command Helper - Shell Integration";

const RC_FILE_DESCRIPTION: &str = "shell rc";

/// First arguments whose output is informational and must not be evaluated.
const INFO_COMMANDS: &str =
    "list search show delete stats install help -h --help interactive import i tags alias edit";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InstallOutcome {
    Installed(PathBuf),
    AlreadyInstalled(PathBuf),
}

/// Detects the shell from the value of `$SHELL`.
///
/// # Errors
///
/// Returns [`Error::UnsupportedShell`] if it is not bash, zsh or fish.
pub fn detect_shell(shell: &str) -> Result<ShellKind> {
    if shell.contains("bash") {
        Ok(ShellKind::Bash)
    } else if shell.contains("zsh") {
        Ok(ShellKind::Zsh)
    } else if shell.contains("fish") {
        Ok(ShellKind::Fish)
    } else {
        Err(Error::UnsupportedShell(shell.to_string()))
    }
}

/// The wrapper function calling the binary at `binary_path`.
#[must_use]
pub fn shell_wrapper(shell: ShellKind, binary_path: &str) -> String {
    match shell {
        ShellKind::Bash | ShellKind::Zsh => format!(
            r#"{WRAPPER_MARKER}
see() {{
    local info_cmds=" {INFO_COMMANDS} "

    if [[ $# -eq 0 ]] || [[ "$info_cmds" == *" $1 "* ]]; then
        command {binary_path} "$@"
    else
        local cmd_output
        cmd_output=$(command {binary_path} "$@")
        if [[ -n "$cmd_output" ]]; then
            eval "$cmd_output"
        fi
    fi
}}
"#
        ),
        ShellKind::Fish => format!(
            r#"{WRAPPER_MARKER}
function see
    set -l info_cmds {INFO_COMMANDS}

    if test (count $argv) -eq 0; or contains -- $argv[1] $info_cmds
        command {binary_path} $argv
    else
        set -l cmd_output (command {binary_path} $argv)
        if test -n "$cmd_output"
            eval $cmd_output
        end
    end
end
"#
        ),
    }
}

/// The rc file the wrapper is appended to, relative to `home`.
#[must_use]
pub fn rc_file(shell: ShellKind, home: &Path) -> PathBuf {
    match shell {
        ShellKind::Bash => home.join(".bashrc"),
        ShellKind::Zsh => home.join(".zshrc"),
        ShellKind::Fish => home.join(".config").join("fish").join("config.fish"),
    }
}

fn rc_error(path: &Path, e: std::io::Error) -> Error {
    Error::io_error(RC_FILE_DESCRIPTION.to_string(), path.display().to_string(), e)
}

/// Appends the wrapper to `rc_path` unless one is already there.
///
/// # Errors
///
/// Returns an error if the rc file cannot be read or written.
pub fn install(shell: ShellKind, binary_path: &str, rc_path: &Path) -> Result<InstallOutcome> {
    if rc_path.exists() {
        let contents = fs::read_to_string(rc_path).map_err(|e| rc_error(rc_path, e))?;
        if contents.contains(WRAPPER_MARKER) {
            return Ok(InstallOutcome::AlreadyInstalled(rc_path.to_path_buf()));
        }
    }

    if let Some(parent) = rc_path.parent() {
        fs::create_dir_all(parent).map_err(|e| rc_error(parent, e))?;
    }

    let mut rc_file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(rc_path)
        .map_err(|e| rc_error(rc_path, e))?;

    write!(rc_file, "\n{}\n", shell_wrapper(shell, binary_path))
        .map_err(|e| rc_error(rc_path, e))?;

    info!("Installed shell integration into `{}`", rc_path.display());
    Ok(InstallOutcome::Installed(rc_path.to_path_buf()))
}
