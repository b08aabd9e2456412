use std::env;
use std::io::{stdout, Stderr, StdinLock, Stdout};
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{CommandFactory, Parser};
use log::debug;
use see_cli::actions::{AddRequest, RunMode, Session};
use see_cli::cli_args::{subcommand_words, AddArgs, Args, Commands, ShellKind};
use see_cli::command_selection::{prompt_for_command_choice, LinePrompt};
use see_cli::importer::get_history_file;
use see_cli::installer::{self, InstallOutcome};
use see_core::config::{self, reserved_words, DEFAULT_SHELL, STORE_PATH_ENV};
use see_core::error::{Error, Result};
use see_core::file_handling::FileStore;
use see_core::repository::Repository;

type CliSession = Session<FileStore, Stdout, LinePrompt<StdinLock<'static>, Stderr>>;

fn home_dir() -> PathBuf {
    PathBuf::from(shellexpand::tilde("~").into_owned())
}

/// Saves a new command, or runs the command behind an alias when no
/// description is given.
fn default_action(session: &mut CliSession, add: AddArgs) -> Result<bool> {
    let mode = RunMode::from_flags(false, add.verbose);

    let Some(description) = add.description else {
        let Some((name, args)) = add.command.split_first() else {
            Args::command().print_help()?;
            return Ok(true);
        };
        return session.run_alias(name, args, mode);
    };

    let command = match add.command.as_slice() {
        [] => {
            return Err(Error::Misc(
                "No command specified. Usage: see -d 'description' [-t tag...] [-a alias] -c <command>"
                    .to_string(),
            ))
        }
        // A single argument was already quoted by the user's shell
        [single] => single.clone(),
        parts => shell_words::join(parts),
    };

    let request = AddRequest {
        description,
        tags: add.tags,
        alias: add.alias.filter(|alias| !alias.is_empty()),
        command,
        save_only: add.save_only,
        mode,
    };

    session.add(&request)
}

fn import(
    session: &mut CliSession,
    file: Option<String>,
    shell: &str,
    lines: usize,
    no_filter: bool,
) -> Result<bool> {
    let path = if let Some(file) = file {
        let path = PathBuf::from(shellexpand::tilde(&file).into_owned());
        if !path.exists() {
            println!("File not found: {file}");
            return Ok(false);
        }
        path
    } else {
        let Some(path) = get_history_file(shell) else {
            println!("Could not find shell history file.");
            return Ok(false);
        };
        println!("Reading from: {}", path.display());
        path
    };

    session.import_file(&path, lines, no_filter)
}

fn install(shell_kind: Option<ShellKind>, shell: &str) -> Result<bool> {
    let shell_kind = match shell_kind {
        Some(shell_kind) => shell_kind,
        None => installer::detect_shell(shell)?,
    };

    let binary_path = env::current_exe().map_err(|e| {
        Error::io_error("see binary".to_string(), env::args().next().unwrap_or_default(), e)
    })?;
    let rc_path = installer::rc_file(shell_kind, &home_dir());

    eprintln!("\nInstalling SEE shell integration for {}...", shell_kind.name());

    match installer::install(shell_kind, &binary_path.display().to_string(), &rc_path)? {
        InstallOutcome::Installed(path) => {
            eprintln!("✓ Successfully added shell integration to {}", path.display());
            eprintln!("\nTo activate it now, run:\n  source {}", path.display());
        }
        InstallOutcome::AlreadyInstalled(path) => {
            eprintln!(
                "Shell integration already appears to be installed in {}",
                path.display()
            );
            eprintln!("\nTo reinstall, remove the 'see' function and try again.");
        }
    }

    Ok(true)
}

fn execute() -> Result<bool> {
    let args = Args::parse();
    let shell = env::var("SHELL").unwrap_or_else(|_| DEFAULT_SHELL.to_string());

    let store_path = config::get_store_path(
        args.store_path.as_deref(),
        env::var(STORE_PATH_ENV).ok().as_deref(),
    );
    debug!("Store path: `{store_path}`");

    let repository = Repository::load(
        FileStore::new(store_path),
        reserved_words(subcommand_words()),
    );
    let mut session = Session::new(repository, shell.clone(), stdout(), LinePrompt::terminal());

    let Some(subcommand) = args.subcommand else {
        return default_action(&mut session, args.add);
    };

    match subcommand {
        Commands::Search { query, tags } => session.search(&query, &tags),
        Commands::List { tags, limit, sort } => session.list(&tags, limit, sort.into()),
        Commands::Show { id, copy } => session.show(id, copy),
        Commands::Run {
            dry_run,
            verbose,
            id,
            args,
        } => session.run(id, &args, RunMode::from_flags(dry_run, verbose)),
        Commands::Delete { ids } => session.delete(&ids),
        Commands::Edit {
            id,
            description,
            tags,
            alias,
        } => session.edit(id, description.as_deref(), tags.as_deref(), alias.as_deref()),
        Commands::Tags => session.tags(),
        Commands::Interactive => session.interactive(prompt_for_command_choice),
        // The source group guarantees `--history` when no file is given
        Commands::Import {
            history: _,
            file,
            lines,
            no_filter,
        } => import(&mut session, file, &shell, lines, no_filter),
        Commands::Stats => session.stats(),
        Commands::Install { shell: shell_kind } => install(shell_kind, &shell),
        Commands::Alias { id, alias } => session.set_alias(id, &alias),
    }
}

fn main() -> ExitCode {
    env_logger::init();

    match execute() {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            eprintln!("{e}");
            ExitCode::FAILURE
        }
    }
}
