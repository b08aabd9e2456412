use std::collections::HashMap;
use std::sync::LazyLock;

use indexmap::IndexSet;
use regex::{Captures, Regex};

use crate::error::{Error, Result};

static PLACEHOLDER_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{\{(\w+)\}\}").expect("placeholder pattern is valid"));

/// Find all `{{name}}` placeholders in a command, in order of first appearance.
pub fn find_placeholders(command: &str) -> IndexSet<String> {
    PLACEHOLDER_PATTERN
        .captures_iter(command)
        .map(|captures| captures[1].to_string())
        .collect()
}

#[must_use]
pub fn has_placeholders(command: &str) -> bool {
    PLACEHOLDER_PATTERN.is_match(command)
}

/// Replace placeholders by name. Unknown placeholders are left verbatim.
pub fn substitute<S: std::hash::BuildHasher>(
    command: &str,
    values: &HashMap<String, String, S>,
) -> String {
    PLACEHOLDER_PATTERN
        .replace_all(command, |captures: &Captures| {
            values
                .get(&captures[1])
                .cloned()
                .unwrap_or_else(|| captures[0].to_string())
        })
        .into_owned()
}

/// Fill placeholders with `arguments` in order of first appearance.
///
/// Placeholders without a matching argument stay verbatim.
///
/// # Errors
///
/// Returns [`Error::ParameterCountMismatch`] when more arguments are given
/// than the command has placeholders.
pub fn substitute_positional(command: &str, arguments: &[String]) -> Result<String> {
    let placeholders = find_placeholders(command);

    if arguments.len() > placeholders.len() {
        return Err(Error::ParameterCountMismatch(
            placeholders.len(),
            arguments.len(),
        ));
    }

    let values: HashMap<String, String> = placeholders
        .into_iter()
        .zip(arguments.iter().cloned())
        .collect();

    Ok(substitute(command, &values))
}
