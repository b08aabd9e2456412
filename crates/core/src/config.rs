//! Configuration path utilities and fixed settings for see.
//!
//! This module resolves the location of the command store and holds the
//! built-in list of words that may never be used as aliases.

use std::collections::HashSet;

/// Default path for the command store
const DEFAULT_STORE_PATH: &str = "~/.config/see-helper/commands.yml";

/// Environment variable that overrides the default store path
pub const STORE_PATH_ENV: &str = "SEE_STORE_PATH";

/// Default shell to use for command execution
pub const DEFAULT_SHELL: &str = "/bin/bash";

/// Shell builtins and everyday commands that an alias must not shadow.
pub const SHELL_RESERVED_WORDS: &[&str] = &[
    "cd", "exit", "logout", "pwd", "clear", "history", "type", "alias", "unalias", "export",
    "unset", "set", "env", "source", ".", "ls", "cp", "mv", "rm", "mkdir", "grep", "cat", "echo",
    "man", "sudo", "which", "whoami", "true", "false", "test",
];

/// Words owned by the `see` front end itself besides its subcommand names.
pub const TOOL_RESERVED_WORDS: &[&str] = &["see", "add", "help", "i"];

/// Resolves the store file path.
///
/// An explicit path wins, then the `SEE_STORE_PATH` environment value, then
/// the default location. Shell expansions like `~` are resolved.
///
/// # Examples
///
/// ```
/// use see_core::config::get_store_path;
///
/// let custom_path = get_store_path(Some("/path/to/commands.yml"), None);
/// assert_eq!(custom_path, "/path/to/commands.yml");
/// ```
pub fn get_store_path(store_path_arg: Option<&str>, store_path_env: Option<&str>) -> String {
    let store_path = store_path_arg
        .or(store_path_env)
        .unwrap_or(DEFAULT_STORE_PATH);

    shellexpand::tilde(store_path).to_string()
}

/// Builds the reserved alias set from the front end's subcommand names plus
/// the fixed word lists.
pub fn reserved_words<I, S>(subcommand_names: I) -> HashSet<String>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    subcommand_names
        .into_iter()
        .map(Into::into)
        .chain(
            SHELL_RESERVED_WORDS
                .iter()
                .chain(TOOL_RESERVED_WORDS)
                .map(ToString::to_string),
        )
        .collect()
}
