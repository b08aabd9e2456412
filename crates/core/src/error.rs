use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

/// Description used for write failures on stdout, stderr or another stream.
pub const OUTPUT_DESCRIPTION: &str = "output";

/// Description used for read failures on stdin or another stream.
pub const INPUT_DESCRIPTION: &str = "input";

/// Path shown for standard streams.
pub const STREAM_PATH: &str = "-";

#[derive(Error, Debug)]
pub enum Error {
    #[error("The sub process exited with non-success code {}.", .0)]
    SubProcessExit(i32),

    #[error("Error with sub process: {}", _0)]
    SubProcess(std::io::Error),

    #[error("Error {} {} file at `{}`: {}", .action, .file_description, .path, .original)]
    Yaml {
        action: String,
        file_description: String,
        path: String,
        original: serde_yaml::Error,
    },

    #[error("IO error with {} file at path `{}`: {}", .file_description, .path, .original)]
    Io {
        file_description: String,
        path: String,
        original: std::io::Error,
    },

    #[error("No ids left: the largest stored id is {}", .0)]
    IdsExhausted(u32),

    #[error("Invalid alias: alias may not be empty")]
    EmptyAlias,

    #[error("Invalid alias `{}`: alias cannot start with '-'", .0)]
    AliasStartsWithDash(String),

    #[error("Invalid alias `{}`: alias is a reserved keyword", .0)]
    ReservedAlias(String),

    #[error("Invalid alias `{}`: alias is already in use by ID {}", .alias, .owner)]
    AliasInUse { alias: String, owner: u32 },

    #[error("Command not found: `{}`", .0)]
    CommandNotFound(String),

    #[error("Expected at most {} placeholder values, but {} were given.", .0, .1)]
    ParameterCountMismatch(usize, usize),

    #[error("Clipboard error: {}", .0)]
    Clipboard(String),

    #[error("Unsupported shell: `{}`", .0)]
    UnsupportedShell(String),

    #[error("Misc error: {}", .0)]
    Misc(String),
}

impl Error {
    pub fn yaml_error(
        action: String,
        file_description: String,
        path: String,
        original: serde_yaml::Error,
    ) -> Self {
        Self::Yaml {
            action,
            file_description,
            path,
            original,
        }
    }

    pub fn io_error(file_description: String, path: String, original: std::io::Error) -> Self {
        Self::Io {
            file_description,
            path,
            original,
        }
    }
}

/// Bare I/O errors come from writing to an output stream; file and process
/// failures are wrapped explicitly where they happen.
impl From<std::io::Error> for Error {
    fn from(original: std::io::Error) -> Self {
        Self::io_error(
            OUTPUT_DESCRIPTION.to_string(),
            STREAM_PATH.to_string(),
            original,
        )
    }
}
