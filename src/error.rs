//! Error types for chatline.

use thiserror::Error;

use crate::actions::ActionError;

/// Common error type for chatline.
#[derive(Error, Debug)]
pub enum ChatlineError {
    /// The typed command name is not in the catalogue.
    ///
    /// The caller decides whether to send the line as a plain message instead.
    #[error("not a command: /{0}")]
    UnknownCommand(String),

    /// A single call into the action-dispatch surface failed.
    #[error("action failed: {0}")]
    Action(#[from] ActionError),

    /// Some per-target calls of a multi-target command failed.
    ///
    /// Every call was still issued; the successful ones are not rolled back.
    #[error("{} of {attempted} actions failed", .failures.len())]
    PartialFailure {
        /// Number of calls issued.
        attempted: usize,
        /// Errors of the calls that failed, in target order.
        failures: Vec<ActionError>,
    },

    /// Device capability lookup failed while starting a direct message.
    #[error("device lookup failed: {0}")]
    DeviceLookup(ActionError),

    /// Input was delivered to a mention session that is already closed.
    #[error("mention session is closed")]
    SessionClosed,

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),

    /// Validation error for configuration values.
    #[error("validation error: {0}")]
    Validation(String),
}

/// Result type alias for chatline operations.
pub type Result<T> = std::result::Result<T, ChatlineError>;
