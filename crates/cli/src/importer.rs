//! Reading candidate commands from shell history files.

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use log::debug;
use see_core::error::{Error, Result};

/// Commands not worth saving on their own.
pub const TRIVIAL_COMMANDS: &[&str] = &[
    "ls", "ll", "la", "l", "cd", "cd ..", "cd ~", "cd -", "pwd", "clear", "cls", "exit", "logout",
    "history", "h", "git status", "gs", "gst", "git diff", "gd", "git log", "gl", "cat", "less",
    "more", "vim", "vi", "nano", "emacs", "top", "htop", "man", "help", "echo", "printf", "whoami",
    "id", "date", "cal",
];

/// Shorter commands are dropped by [`filter_trivial`].
pub const MIN_COMMAND_LENGTH: usize = 3;

/// `cd` commands shorter than this are dropped by [`filter_trivial`].
const SHORT_CD_LENGTH: usize = 20;

const HISTORY_FILE_DESCRIPTION: &str = "history";

/// Finds the history file of the current shell, then any common one.
#[must_use]
pub fn get_history_file(shell: &str) -> Option<PathBuf> {
    let home = PathBuf::from(shellexpand::tilde("~").into_owned());

    let preferred = if shell.contains("zsh") {
        Some(".zsh_history")
    } else if shell.contains("bash") {
        Some(".bash_history")
    } else {
        None
    };

    preferred
        .into_iter()
        .chain([".zsh_history", ".bash_history", ".history"])
        .map(|file_name| home.join(file_name))
        .find(|path| path.exists())
}

/// Strips the `: <timestamp>:<duration>;` prefix of zsh extended history.
fn strip_extended_history(line: &str) -> &str {
    if line.starts_with(':') {
        if let Some((_, command)) = line.split_once(';') {
            return command;
        }
    }
    line
}

/// The newest `lines` distinct commands in `contents`, newest first.
#[must_use]
pub fn parse_history(contents: &str, lines: usize) -> Vec<String> {
    let all_lines: Vec<&str> = contents.lines().collect();
    // Scan extra lines so duplicates do not starve the result
    let scan_from = all_lines.len().saturating_sub(lines.saturating_mul(2));

    let mut seen = HashSet::new();
    let mut commands = Vec::new();

    for line in all_lines[scan_from..].iter().rev() {
        if commands.len() >= lines {
            break;
        }

        let line = strip_extended_history(line.trim()).trim();
        if line.is_empty() || !seen.insert(line) {
            continue;
        }

        commands.push(line.to_string());
    }

    commands
}

/// Reads and parses a history file.
///
/// Bytes that are not UTF-8 are replaced rather than rejected.
///
/// # Errors
///
/// Returns an error if the file cannot be read.
pub fn read_history(path: &Path, lines: usize) -> Result<Vec<String>> {
    let bytes = fs::read(path).map_err(|e| {
        Error::io_error(
            HISTORY_FILE_DESCRIPTION.to_string(),
            path.display().to_string(),
            e,
        )
    })?;

    let commands = parse_history(&String::from_utf8_lossy(&bytes), lines);
    debug!("Read {} commands from `{}`", commands.len(), path.display());
    Ok(commands)
}

fn is_trivial(command: &str) -> bool {
    if command.chars().count() < MIN_COMMAND_LENGTH {
        return true;
    }

    let lowercase = command.to_lowercase();
    let base = lowercase.split_whitespace().next().unwrap_or_default();

    TRIVIAL_COMMANDS.contains(&lowercase.as_str())
        || TRIVIAL_COMMANDS.contains(&base)
        || (lowercase.starts_with("cd ") && command.chars().count() < SHORT_CD_LENGTH)
}

/// Drops short and everyday commands.
#[must_use]
pub fn filter_trivial(commands: Vec<String>) -> Vec<String> {
    commands
        .into_iter()
        .filter(|command| !is_trivial(command))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_parse_history_newest_first_and_distinct() {
        let contents = "ls\ndocker ps\ngit push\ndocker ps\n\nmake test\n";
        let commands = parse_history(contents, 10);
        assert_eq!(commands, vec!["make test", "docker ps", "git push", "ls"]);
    }

    #[test]
    fn test_parse_history_limits_lines() {
        let contents = "one\ntwo\nthree\nfour\n";
        assert_eq!(parse_history(contents, 2), vec!["four", "three"]);
    }

    #[test]
    fn test_parse_history_strips_zsh_timestamps() {
        let contents = ": 1700000000:0;cargo build\n: 1700000005:2;echo a;b\n";
        assert_eq!(parse_history(contents, 10), vec!["echo a;b", "cargo build"]);
    }

    #[test]
    fn test_filter_trivial() {
        let commands = vec![
            "ls".to_string(),
            "ls -lah".to_string(),
            "git status".to_string(),
            "cd /tmp".to_string(),
            "cd /very/long/project/path".to_string(),
            "vim notes.md".to_string(),
            "docker compose up -d".to_string(),
            "Pwd".to_string(),
        ];

        // Any command starting with a trivial word goes, including long `cd`s
        assert_eq!(filter_trivial(commands), vec!["docker compose up -d"]);
    }

    #[test]
    fn test_read_history_file() {
        let mut temp_file = NamedTempFile::new().unwrap();
        writeln!(temp_file, "terraform plan").unwrap();
        writeln!(temp_file, "terraform apply").unwrap();

        let commands = read_history(temp_file.path(), 50).unwrap();
        assert_eq!(commands, vec!["terraform apply", "terraform plan"]);
    }

    #[test]
    fn test_read_history_missing_file() {
        let result = read_history(Path::new("/nonexistent/history"), 50);
        assert!(matches!(result, Err(Error::Io { .. })));
    }
}
