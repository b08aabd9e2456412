//! Command-line argument parsing.
//!
//! Without a subcommand, `see` either saves a new command
//! (`see -d <description> <command...>`) or, when no description is given,
//! runs the command saved under the alias in the first word
//! (`see <alias> [args...]`).

use std::iter;

use clap::{ArgGroup, Args as ClapArgs, CommandFactory, Parser, Subcommand, ValueEnum};
use see_core::command_definitions::ListSort;

/// Command-line arguments for the `see` tool.
///
/// # Examples
///
/// ```rust
/// use clap::Parser;
/// use see_cli::cli_args::Args;
///
/// let args = Args::parse_from(["see", "-d", "List files", "ls", "-lah"]);
/// assert_eq!(args.add.command, vec!["ls", "-lah"]);
/// ```
#[derive(Parser, Debug)]
#[command(name = "see", version, about = "Save, find and rerun shell commands")]
#[command(term_width = 0)] // Just to make testing across clap features easier
pub struct Args {
    /// Path to the command store YAML file.
    ///
    /// If not provided, `SEE_STORE_PATH` is used, then
    /// `~/.config/see-helper/commands.yml`.
    #[arg(long, global = true)]
    pub store_path: Option<String>,

    #[command(subcommand)]
    pub subcommand: Option<Commands>,

    #[command(flatten)]
    pub add: AddArgs,
}

/// Arguments for saving a command, used when no subcommand is given.
#[derive(ClapArgs, Debug, Default)]
#[allow(clippy::struct_excessive_bools)]
pub struct AddArgs {
    /// Description of the command being saved.
    #[arg(short, long)]
    pub description: Option<String>,

    /// Tags for the command.
    #[arg(short, long, num_args = 1..)]
    pub tags: Vec<String>,

    /// Short name that runs the command with `see <alias>`.
    #[arg(short, long)]
    pub alias: Option<String>,

    /// Only save the command, do not run it.
    #[arg(short, long, action)]
    pub save_only: bool,

    /// Run in the foreground and report the exit status.
    #[arg(short, long, action)]
    pub verbose: bool,

    /// Marks the start of the command, ending the tag list.
    #[arg(short = 'c', long = "command", action)]
    pub command_marker: bool,

    /// The command to save, or an alias followed by its arguments.
    #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
    pub command: Vec<String>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Search saved commands by text and tags.
    Search {
        /// Words to look for in the command or description.
        query: Vec<String>,

        /// Only commands with any of these tags.
        #[arg(short, long, num_args = 1..)]
        tags: Vec<String>,
    },

    /// List saved commands.
    List {
        /// Only commands with any of these tags.
        #[arg(short, long, num_args = 1..)]
        tags: Vec<String>,

        /// Show at most this many commands.
        #[arg(short = 'n', long)]
        limit: Option<usize>,

        #[arg(short, long, value_enum, default_value_t = SortOrder::Created)]
        sort: SortOrder,
    },

    /// Print a saved command.
    Show {
        id: u32,

        /// Also copy the command to the clipboard.
        #[arg(short, long, action)]
        copy: bool,
    },

    /// Run a saved command.
    Run {
        #[arg(long, action)]
        dry_run: bool,

        /// Run in the foreground and report the exit status.
        #[arg(short, long, action)]
        verbose: bool,

        id: u32,

        /// Values for the command's placeholders, in order.
        #[arg(trailing_var_arg = true)]
        args: Vec<String>,
    },

    /// Delete saved commands.
    Delete {
        #[arg(required = true, num_args = 1..)]
        ids: Vec<u32>,
    },

    /// Change a saved command.
    Edit {
        id: u32,

        #[arg(short, long)]
        description: Option<String>,

        /// Replaces all existing tags.
        #[arg(short, long, num_args = 1..)]
        tags: Option<Vec<String>>,

        #[arg(short, long)]
        alias: Option<String>,
    },

    /// List tags by how many commands use them.
    Tags,

    /// Pick a command from a full-screen list and run it.
    #[command(visible_alias = "i")]
    Interactive,

    /// Save commands from shell history or a file.
    #[command(group(ArgGroup::new("source").required(true).args(["history", "file"])))]
    Import {
        /// Read the current shell's history file.
        #[arg(long, action)]
        history: bool,

        /// Read commands from a file, one per line.
        #[arg(long)]
        file: Option<String>,

        /// How many of the newest distinct lines to import.
        #[arg(long, default_value_t = 50)]
        lines: usize,

        /// Keep trivial commands such as `ls` or `cd ..`.
        #[arg(long, action)]
        no_filter: bool,
    },

    /// Show collection statistics.
    Stats,

    /// Add the `see` wrapper function to a shell rc file.
    Install {
        /// Shell to install for. Detected from `$SHELL` when omitted.
        #[arg(value_enum)]
        shell: Option<ShellKind>,
    },

    /// Set the alias of a saved command.
    Alias {
        id: u32,

        #[arg(short, long)]
        alias: String,
    },
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum SortOrder {
    Created,
    Recent,
    Used,
}

impl From<SortOrder> for ListSort {
    fn from(order: SortOrder) -> Self {
        match order {
            SortOrder::Created => Self::Created,
            SortOrder::Recent => Self::Recent,
            SortOrder::Used => Self::Used,
        }
    }
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum ShellKind {
    Bash,
    Zsh,
    Fish,
}

impl ShellKind {
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Bash => "bash",
            Self::Zsh => "zsh",
            Self::Fish => "fish",
        }
    }
}

/// Names and aliases of every subcommand; none of them may be used as a
/// command alias.
#[must_use]
pub fn subcommand_words() -> Vec<String> {
    Args::command()
        .get_subcommands()
        .flat_map(|subcommand| {
            iter::once(subcommand.get_name()).chain(subcommand.get_all_aliases())
        })
        .map(str::to_string)
        .collect()
}
