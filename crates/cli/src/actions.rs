//! Handlers behind each `see` invocation.
//!
//! Command text meant for the shell wrapper goes to `out` (stdout in the
//! binary) and nothing else does, since the wrapper evaluates it. Status
//! messages go to stderr; listings for the user go to `out` through the
//! printer.

use std::io::Write;
use std::path::Path;

use log::{debug, info};
use see_core::command_definitions::{CommandDefinition, ListSort};
use see_core::error::{Error, Result};
use see_core::execution::{execute_command, shell_command};
use see_core::file_handling::Store;
use see_core::interpolation::{
    find_placeholders, has_placeholders, substitute, substitute_positional,
};
use see_core::repository::Repository;

use crate::clipboard::copy_to_clipboard;
use crate::command_selection::PlaceholderPrompt;
use crate::importer::{filter_trivial, read_history};
use crate::printer::{print_command, print_stats, print_table, print_tags};

/// Longest command text shown per line of an import report.
const IMPORT_DISPLAY_WIDTH: usize = 60;

/// How a resolved command is handed over.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunMode {
    /// Print the command text for the shell wrapper to evaluate.
    Shell,
    /// Show the command text without running it.
    DryRun,
    /// Run the command as a child process and report its exit status.
    Foreground,
}

impl RunMode {
    #[must_use]
    pub fn from_flags(dry_run: bool, verbose: bool) -> Self {
        if dry_run {
            Self::DryRun
        } else if verbose {
            Self::Foreground
        } else {
            Self::Shell
        }
    }
}

/// A command to save, and how to run it afterwards.
#[derive(Debug, Clone)]
pub struct AddRequest {
    pub description: String,
    pub tags: Vec<String>,
    pub alias: Option<String>,
    pub command: String,
    pub save_only: bool,
    pub mode: RunMode,
}

/// Totals of an import.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ImportSummary {
    pub imported: usize,
    pub skipped: usize,
}

/// One invocation's view of the repository and its output.
pub struct Session<S: Store, W: Write, P: PlaceholderPrompt> {
    repository: Repository<S>,
    shell: String,
    out: W,
    prompt: P,
}

fn shorten(command: &str) -> String {
    if command.chars().count() > IMPORT_DISPLAY_WIDTH {
        let cut: String = command.chars().take(IMPORT_DISPLAY_WIDTH).collect();
        format!("{cut}...")
    } else {
        command.to_string()
    }
}

impl<S: Store, W: Write, P: PlaceholderPrompt> Session<S, W, P> {
    pub fn new(repository: Repository<S>, shell: impl Into<String>, out: W, prompt: P) -> Self {
        Self {
            repository,
            shell: shell.into(),
            out,
            prompt,
        }
    }

    #[must_use]
    pub fn repository(&self) -> &Repository<S> {
        &self.repository
    }

    #[must_use]
    pub fn out(&self) -> &W {
        &self.out
    }

    /// Fills placeholders from `args` in order, then prompts for the rest.
    ///
    /// Returns `None` if the prompt was abandoned.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ParameterCountMismatch`] if there are more `args`
    /// than placeholders.
    pub fn resolve(&mut self, command: &str, args: &[String]) -> Result<Option<String>> {
        let partially_filled = substitute_positional(command, args)?;
        if !has_placeholders(&partially_filled) {
            return Ok(Some(partially_filled));
        }

        Ok(self
            .prompt
            .fill(&find_placeholders(&partially_filled))?
            .map(|values| substitute(&partially_filled, &values)))
    }

    /// Hands `text` over according to `mode`. Returns whether it succeeded.
    fn emit(&mut self, description: &str, text: &str, mode: RunMode) -> Result<bool> {
        match mode {
            RunMode::Shell => {
                writeln!(self.out, "{text}")?;
                Ok(true)
            }
            RunMode::DryRun => {
                eprintln!("\nRunning: {description}");
                eprintln!("   Command: {text}\n");
                eprintln!("(Dry run - command not executed)");
                Ok(true)
            }
            RunMode::Foreground => {
                eprintln!("\nRunning: {description}");
                eprintln!("   Command: {text}\n");

                match execute_command(shell_command(&self.shell, text)) {
                    Ok(()) => {
                        eprintln!("\n✓ Command completed successfully");
                        Ok(true)
                    }
                    Err(Error::SubProcessExit(code)) => {
                        eprintln!("\n✗ Command exited with code {code}");
                        Ok(false)
                    }
                    Err(e) => Err(e),
                }
            }
        }
    }

    /// Saves a command and, unless `save_only`, runs it.
    ///
    /// Running right after saving does not count as a use.
    ///
    /// # Errors
    ///
    /// Returns alias errors from the repository, store errors, or errors
    /// running the command.
    pub fn add(&mut self, request: &AddRequest) -> Result<bool> {
        let outcome = self.repository.add(
            &request.command,
            &request.description,
            &request.tags,
            request.alias.as_deref(),
        )?;
        let id = outcome.command.id;

        if outcome.created {
            eprintln!("✓ Command saved with ID: {id}");
        } else if outcome.merged_tags {
            eprintln!("ℹ Merged tags for command ID: {id}");
        } else if outcome.updated {
            eprintln!("ℹ Updated alias for command ID: {id}");
        } else {
            eprintln!("ℹ Already exists: command ID {id}");
        }

        if request.save_only {
            return Ok(true);
        }

        let Some(text) = self.resolve(&outcome.command.command, &[])? else {
            eprintln!("Cancelled.");
            return Ok(false);
        };

        self.emit(&outcome.command.description, &text, request.mode)
    }

    /// Runs a saved command and records the use.
    ///
    /// A dry run is never recorded, and a foreground run only when it
    /// succeeds.
    ///
    /// # Errors
    ///
    /// Returns [`Error::CommandNotFound`] for an unknown id, placeholder
    /// errors, or errors running the command.
    pub fn run(&mut self, id: u32, args: &[String], mode: RunMode) -> Result<bool> {
        let Some(command) = self.repository.get(id).cloned() else {
            return Err(Error::CommandNotFound(id.to_string()));
        };

        let Some(text) = self.resolve(&command.command, args)? else {
            eprintln!("Cancelled.");
            return Ok(false);
        };

        let succeeded = self.emit(&command.description, &text, mode)?;

        if succeeded && mode != RunMode::DryRun {
            self.repository.increment_usage(id)?;
        }

        Ok(succeeded)
    }

    /// Runs the command saved under the alias `name`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::CommandNotFound`] if no command has that alias.
    pub fn run_alias(&mut self, name: &str, args: &[String], mode: RunMode) -> Result<bool> {
        let id = self
            .repository
            .get_by_alias(name)
            .map(|command| command.id)
            .ok_or_else(|| Error::CommandNotFound(name.to_string()))?;

        debug!("Alias `{name}` resolves to command {id}");
        self.run(id, args, mode)
    }

    /// # Errors
    ///
    /// Returns an error if writing fails.
    pub fn search(&mut self, query: &[String], tags: &[String]) -> Result<bool> {
        let query = query.join(" ");
        let results = self.repository.search(Some(&query), tags);

        if results.is_empty() {
            writeln!(self.out, "No commands found matching your search.")?;
            return Ok(true);
        }

        for command in results {
            print_command(&mut self.out, command)?;
        }
        Ok(true)
    }

    /// # Errors
    ///
    /// Returns an error if writing fails.
    pub fn list(&mut self, tags: &[String], limit: Option<usize>, sort: ListSort) -> Result<bool> {
        let mut commands = self.repository.list(tags, sort);

        if commands.is_empty() {
            writeln!(self.out, "No commands found.")?;
            return Ok(true);
        }

        if let Some(limit) = limit {
            commands.truncate(limit);
        }

        print_table(&mut self.out, &commands)?;
        Ok(true)
    }

    /// Prints a command, records the use and optionally copies it.
    ///
    /// # Errors
    ///
    /// Returns an error if writing or saving fails. A clipboard failure is
    /// only reported.
    pub fn show(&mut self, id: u32, copy: bool) -> Result<bool> {
        let Some(command) = self.repository.get(id).cloned() else {
            writeln!(self.out, "Command {id} not found.")?;
            return Ok(false);
        };

        print_command(&mut self.out, &command)?;
        self.repository.increment_usage(id)?;

        if copy {
            match copy_to_clipboard(&command.command) {
                Ok(()) => writeln!(self.out, "\nCopied to clipboard!")?,
                Err(e) => writeln!(self.out, "\n{e}")?,
            }
        }

        Ok(true)
    }

    /// # Errors
    ///
    /// Returns an error if writing or saving fails.
    pub fn delete(&mut self, ids: &[u32]) -> Result<bool> {
        match self.repository.delete_multiple(ids)? {
            0 => {
                writeln!(self.out, "No commands found to delete.")?;
                Ok(false)
            }
            1 => {
                writeln!(self.out, "Command deleted.")?;
                Ok(true)
            }
            count => {
                writeln!(self.out, "{count} commands deleted.")?;
                Ok(true)
            }
        }
    }

    /// # Errors
    ///
    /// Returns alias errors, or an error if writing or saving fails.
    pub fn edit(
        &mut self,
        id: u32,
        description: Option<&str>,
        tags: Option<&[String]>,
        alias: Option<&str>,
    ) -> Result<bool> {
        match self.repository.edit(id, description, tags, alias)? {
            Some(command) => {
                writeln!(self.out, "Command {id} updated.")?;
                print_command(&mut self.out, &command)?;
                Ok(true)
            }
            None => {
                writeln!(self.out, "Command {id} not found.")?;
                Ok(false)
            }
        }
    }

    /// Sets the alias of a command.
    ///
    /// # Errors
    ///
    /// Returns alias errors, or an error if writing or saving fails.
    pub fn set_alias(&mut self, id: u32, alias: &str) -> Result<bool> {
        match self.repository.edit(id, None, None, Some(alias))? {
            Some(_) => {
                writeln!(self.out, "Alias `{alias}` assigned to command {id}.")?;
                Ok(true)
            }
            None => {
                writeln!(self.out, "Command {id} not found.")?;
                Ok(false)
            }
        }
    }

    /// # Errors
    ///
    /// Returns an error if writing fails.
    pub fn tags(&mut self) -> Result<bool> {
        let tag_counts = self.repository.tag_counts();
        print_tags(&mut self.out, &tag_counts)?;
        Ok(true)
    }

    /// # Errors
    ///
    /// Returns an error if writing fails.
    pub fn stats(&mut self) -> Result<bool> {
        let stats = self.repository.stats();
        print_stats(&mut self.out, &stats)?;
        Ok(true)
    }

    /// Lets the user pick a command with `select`, most recently used first,
    /// and runs it in the foreground.
    ///
    /// # Errors
    ///
    /// Returns selector errors or errors running the command.
    pub fn interactive<F>(&mut self, select: F) -> Result<bool>
    where
        F: FnOnce(&[&CommandDefinition]) -> Result<Option<u32>>,
    {
        let commands = self.repository.recent_first();
        if commands.is_empty() {
            writeln!(self.out, "No commands found.")?;
            return Ok(true);
        }

        match select(&commands)? {
            Some(id) => self.run(id, &[], RunMode::Foreground),
            None => Ok(true),
        }
    }

    /// Saves each of `commands` with no description or tags.
    ///
    /// # Errors
    ///
    /// Returns an error if writing or saving fails.
    pub fn import_commands(&mut self, commands: &[String]) -> Result<ImportSummary> {
        writeln!(self.out, "\nFound {} commands to import:", commands.len())?;
        writeln!(self.out, "{}", "-".repeat(40))?;

        let mut summary = ImportSummary::default();
        for command in commands {
            let outcome = self.repository.add(command, "", &[], None)?;

            if outcome.created {
                summary.imported += 1;
                writeln!(self.out, "  ADD:  {}", shorten(command))?;
            } else {
                summary.skipped += 1;
                writeln!(self.out, "  SKIP: {}", shorten(command))?;
            }
        }

        writeln!(self.out, "{}", "-".repeat(40))?;
        writeln!(
            self.out,
            "Imported: {}, Skipped (exists): {}",
            summary.imported, summary.skipped
        )?;

        info!(
            "Imported {} commands, skipped {}",
            summary.imported, summary.skipped
        );
        Ok(summary)
    }

    /// Imports the newest `lines` distinct commands of a history file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, or if writing or saving
    /// fails.
    pub fn import_file(&mut self, path: &Path, lines: usize, no_filter: bool) -> Result<bool> {
        let mut commands = read_history(path, lines)?;
        if commands.is_empty() {
            writeln!(self.out, "No commands found in history.")?;
            return Ok(true);
        }

        if !no_filter {
            commands = filter_trivial(commands);
        }

        if commands.is_empty() {
            writeln!(self.out, "No interesting commands found after filtering.")?;
            return Ok(true);
        }

        self.import_commands(&commands)?;
        Ok(true)
    }
}
