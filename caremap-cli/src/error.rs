//! CLI error type.

use std::fmt;

/// Errors surfaced to the terminal user.
#[derive(Debug)]
pub enum CliError {
    /// Bad or missing configuration or arguments.
    Config(String),
    /// A file could not be read or written.
    Io(std::io::Error),
    /// A facilities or scenario file could not be parsed.
    Parse(String),
    /// The search controller rejected a command or shut down.
    Search(String),
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CliError::Config(msg) => write!(f, "configuration error: {}", msg),
            CliError::Io(err) => write!(f, "I/O error: {}", err),
            CliError::Parse(msg) => write!(f, "parse error: {}", msg),
            CliError::Search(msg) => write!(f, "search error: {}", msg),
        }
    }
}

impl std::error::Error for CliError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CliError::Io(err) => Some(err),
            _ => None,
        }
    }
}

impl From<std::io::Error> for CliError {
    fn from(err: std::io::Error) -> Self {
        CliError::Io(err)
    }
}

impl From<serde_json::Error> for CliError {
    fn from(err: serde_json::Error) -> Self {
        CliError::Parse(err.to_string())
    }
}
