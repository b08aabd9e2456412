//! See Core Library
//!
//! This crate provides the core functionality for see, a personal command
//! bookmark manager that saves shell commands with a description, tags and an
//! optional alias, finds them again and re-runs them with `{{placeholder}}`
//! substitution.
//!
//! # Key Features
//!
//! - **Command Repository**: Deduplicating, alias-checked collection of saved commands
//! - **Command Store**: Whole-collection YAML persistence
//! - **Placeholders**: Discovery and substitution of `{{name}}` tokens
//! - **Execution**: Foreground execution through the user's shell
//! - **Error Handling**: One error type for every failure mode
//!
//! # Examples
//!
//! Adding a command and finding it again:
//!
//! ```no_run
//! use see_core::config::{get_store_path, reserved_words};
//! use see_core::file_handling::FileStore;
//! use see_core::repository::Repository;
//!
//! let store = FileStore::new(get_store_path(None, None));
//! let mut repository = Repository::load(store, reserved_words(["run", "list"]));
//!
//! let outcome = repository.add("ls -lah", "List files", &["files".to_string()], None)?;
//! println!("Saved with ID {}", outcome.command.id);
//!
//! for command in repository.search(Some("list"), &[]) {
//!     println!("{command}");
//! }
//! # Ok::<(), see_core::error::Error>(())
//! ```

pub mod command_definitions;
pub mod config;
pub mod error;
pub mod execution;
pub mod file_handling;
pub mod interpolation;
pub mod repository;
