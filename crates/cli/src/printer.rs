//! Plain-text output for saved commands, tags and statistics.

use std::collections::BTreeMap;
use std::io::Write;

use crossterm::terminal;
use itertools::Itertools;
use see_core::command_definitions::{CommandDefinition, Stats};
use see_core::error::Result;

const FALLBACK_TERMINAL_WIDTH: usize = 120;

const ID_WIDTH: usize = 4;
const ALIAS_WIDTH: usize = 10;
const DESCRIPTION_WIDTH: usize = 25;
const TAGS_WIDTH: usize = 20;
const MIN_COMMAND_WIDTH: usize = 25;
const COLUMN_GAP: &str = "  ";

/// Prints one command with its metadata.
///
/// # Errors
///
/// Returns an error if writing fails.
pub fn print_command<W: Write>(out: &mut W, command: &CommandDefinition) -> Result<()> {
    writeln!(out, "\n[{}] {}", command.id, command.description)?;
    writeln!(out, "    Command: {}", command.command)?;

    if !command.tags.is_empty() {
        let tags = command.tags.iter().map(|tag| format!("#{tag}")).join(", ");
        writeln!(out, "    Tags: {tags}")?;
    }

    if let Some(alias) = &command.alias {
        writeln!(out, "    Alias: {alias}")?;
    }

    writeln!(out, "    Used: {} times", command.used_count)?;
    Ok(())
}

/// # Errors
///
/// Returns an error if writing fails.
pub fn print_stats<W: Write>(out: &mut W, stats: &Stats) -> Result<()> {
    writeln!(out, "\nStatistics")?;
    writeln!(out, "   Total commands: {}", stats.total)?;
    writeln!(out, "   Unique tags: {}", stats.tags.len())?;

    if !stats.tags.is_empty() {
        writeln!(out, "   Tags: {}", stats.tags.iter().join(", "))?;
    }

    if !stats.most_used.is_empty() {
        writeln!(out, "\n   Most used commands:")?;
        for command in &stats.most_used {
            writeln!(
                out,
                "   - [{}] {} ({} uses)",
                command.id, command.description, command.used_count
            )?;
        }
    }

    Ok(())
}

/// Prints tags with their counts, most used first and then by name.
///
/// # Errors
///
/// Returns an error if writing fails.
pub fn print_tags<W: Write>(out: &mut W, tag_counts: &BTreeMap<String, usize>) -> Result<()> {
    if tag_counts.is_empty() {
        writeln!(out, "No tags found.")?;
        return Ok(());
    }

    writeln!(out, "\nTags:")?;
    writeln!(out, "{}", "-".repeat(30))?;

    for (tag, count) in tag_counts
        .iter()
        .sorted_by(|(tag_a, count_a), (tag_b, count_b)| {
            count_b.cmp(count_a).then_with(|| tag_a.cmp(tag_b))
        })
    {
        writeln!(out, "  {tag} ({count})")?;
    }

    Ok(())
}

/// Greedy word wrap. Words longer than `width` are split across lines.
fn wrap(text: &str, width: usize) -> Vec<String> {
    let width = width.max(1);
    let mut lines = Vec::new();
    let mut current = String::new();

    for word in text.split_whitespace() {
        let mut word: Vec<char> = word.chars().collect();

        while word.len() > width {
            if !current.is_empty() {
                lines.push(std::mem::take(&mut current));
            }
            lines.push(word.drain(..width).collect());
        }

        if word.is_empty() {
            continue;
        }

        let current_length = current.chars().count();
        if current_length > 0 && current_length + 1 + word.len() > width {
            lines.push(std::mem::take(&mut current));
        }

        if !current.is_empty() {
            current.push(' ');
        }
        current.extend(word);
    }

    if !current.is_empty() || lines.is_empty() {
        lines.push(current);
    }

    lines
}

fn pad(text: &str, width: usize) -> String {
    format!("{text:<width$}")
}

fn table_widths(terminal_width: usize) -> [usize; 5] {
    let fixed = ID_WIDTH + ALIAS_WIDTH + DESCRIPTION_WIDTH + TAGS_WIDTH + 5 * COLUMN_GAP.len();
    let command_width = terminal_width.saturating_sub(fixed).max(MIN_COMMAND_WIDTH);
    [ID_WIDTH, ALIAS_WIDTH, DESCRIPTION_WIDTH, command_width, TAGS_WIDTH]
}

/// Formats commands as a table with wrapped ID, Alias, Description, Command
/// and Tags columns.
#[must_use]
pub fn format_table(commands: &[&CommandDefinition], terminal_width: usize) -> String {
    let widths = table_widths(terminal_width);

    let header: String = ["ID", "Alias", "Description", "Command", "Tags"]
        .iter()
        .zip(widths)
        .map(|(heading, width)| pad(heading, width) + COLUMN_GAP)
        .collect();

    let mut table = format!("\n{header}\n{}\n", "-".repeat(header.chars().count()));

    for command in commands {
        let cells = [
            vec![command.id.to_string()],
            wrap(command.alias.as_deref().unwrap_or_default(), widths[1]),
            wrap(&command.description, widths[2]),
            wrap(&command.command, widths[3]),
            wrap(&command.joined_tags(), widths[4]),
        ];

        let height = cells.iter().map(Vec::len).max().unwrap_or(1);
        for line in 0..height {
            let row: String = cells
                .iter()
                .zip(widths)
                .map(|(cell, width)| {
                    pad(cell.get(line).map_or("", String::as_str), width) + COLUMN_GAP
                })
                .collect();
            table.push_str(&row);
            table.push('\n');
        }

        table.push('\n');
    }

    table
}

/// Prints [`format_table`] sized to the terminal.
///
/// # Errors
///
/// Returns an error if writing fails.
pub fn print_table<W: Write>(out: &mut W, commands: &[&CommandDefinition]) -> Result<()> {
    let terminal_width = terminal::size()
        .map(|(width, _)| usize::from(width))
        .unwrap_or(FALLBACK_TERMINAL_WIDTH);

    write!(out, "{}", format_table(commands, terminal_width))?;
    Ok(())
}
