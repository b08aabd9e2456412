//! See CLI Library
//!
//! This crate provides the command-line interface for see, a personal
//! command bookmark manager. It parses arguments, drives the repository from
//! `see-core`, prints listings, and hosts the full-screen command selector.
//!
//! # Architecture
//!
//! - [`cli_args`]: Command-line argument parsing
//! - [`actions`]: One handler per invocation, generic over store and output
//! - [`command_selection`]: Full-screen selector and placeholder prompts
//! - [`printer`]: Command, table, tag and statistics output
//! - [`importer`]: Reading candidate commands from shell history
//! - [`installer`]: Shell wrapper installation
//! - [`clipboard`]: Copying a command to the system clipboard
//!
//! # Examples
//!
//! ```bash
//! # Save a command and print it for the shell wrapper to run
//! see -d "List files" -t files -c ls -lah
//!
//! # Save only, with an alias
//! see -s -d "Docker cleanup" -t docker -a dclean -c docker system prune -a
//!
//! # Run by id or alias, filling {{placeholders}} in order
//! see run 3 prod-db
//! see dclean
//!
//! # Browse and pick interactively
//! see i
//! ```

pub mod actions;
pub mod cli_args;
pub mod clipboard;
pub mod command_selection;
pub mod importer;
pub mod installer;
pub mod printer;
