//! Error types for the CLI application.
//!
//! `CliError` carries every failure a command handler can return; `run` maps
//! it onto an exit code. `BatchValidationError<T>` is the per-item error
//! collected by `verify` and `stats` before they report.

use std::fmt;

use klondike_engine::errors::GameError;
use klondike_engine::rules::RuleError;

#[derive(Debug)]
pub enum CliError {
    /// I/O error (file operations, stdout/stderr writes, etc.)
    Io(std::io::Error),

    /// Invalid user input or command-line arguments
    InvalidInput(String),

    /// Configuration error
    Config(String),

    /// Engine-related error
    Engine(String),

    /// Operation was interrupted (e.g., by user with Ctrl+C)
    Interrupted(String),
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CliError::Io(e) => write!(f, "I/O error: {}", e),
            CliError::InvalidInput(msg) => write!(f, "Invalid input: {}", msg),
            CliError::Config(msg) => write!(f, "Configuration error: {}", msg),
            CliError::Engine(msg) => write!(f, "Engine error: {}", msg),
            CliError::Interrupted(msg) => write!(f, "Interrupted: {}", msg),
        }
    }
}

impl std::error::Error for CliError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CliError::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for CliError {
    fn from(error: std::io::Error) -> Self {
        CliError::Io(error)
    }
}

impl From<GameError> for CliError {
    fn from(error: GameError) -> Self {
        CliError::Engine(error.to_string())
    }
}

impl From<RuleError> for CliError {
    fn from(error: RuleError) -> Self {
        CliError::InvalidInput(error.to_string())
    }
}

impl From<String> for CliError {
    fn from(error: String) -> Self {
        CliError::Engine(error)
    }
}

/// One failed item of a batch check, with the context that identifies it.
///
/// ```rust
/// use klondike_cli::BatchValidationError;
///
/// let error = BatchValidationError {
///     item_context: 5,
///     message: "missing tag".to_string(),
/// };
/// assert_eq!(error.to_string(), "5: missing tag");
/// ```
#[derive(Debug)]
pub struct BatchValidationError<T> {
    /// Context identifying the item that failed validation
    pub item_context: T,
    /// Descriptive error message
    pub message: String,
}

impl<T: fmt::Display> fmt::Display for BatchValidationError<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.item_context, self.message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn batch_error_formats_line_context() {
        let error = BatchValidationError {
            item_context: "line 42",
            message: "result 'draw' is not allowed".to_string(),
        };
        assert_eq!(error.to_string(), "line 42: result 'draw' is not allowed");
    }

    #[test]
    fn rule_errors_are_input_errors() {
        let err: CliError = RuleError::InvalidDraw(9).into();
        assert!(matches!(err, CliError::InvalidInput(_)));
        assert!(err.to_string().contains("between 1 and 5"));
    }

    #[test]
    fn game_errors_are_engine_errors() {
        let err: CliError = GameError::NoSelection.into();
        assert_eq!(err.to_string(), "Engine error: No source selected");
    }
}
