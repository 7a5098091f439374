use crate::TodoId;
use std::{fmt, time::Duration};
use thiserror::Error;

/// The simulated operations performed by [Actions](crate::Actions).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Operation {
    Fetch,
    Save,
    Remove,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Operation::Fetch => "fetch",
            Operation::Save => "save",
            Operation::Remove => "remove",
        };
        f.write_str(name)
    }
}

/// Errors produced by [Actions](crate::Actions) and
/// [App](crate::App) interactions.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// A todo can only be saved with a non blank title.
    #[error("todo title must not be empty")]
    EmptyTitle,

    /// No saved todo has this id.
    #[error("todo {0} not found")]
    NotFound(TodoId),

    /// The todo in the editor has never been saved.
    #[error("todo has not been saved yet")]
    Unsaved,

    /// The editor is disabled while a save or delete is in flight.
    #[error("a save is already in progress")]
    Busy,

    /// The simulated operation took longer than the configured timeout.
    #[error("{operation} timed out after {limit:?}")]
    Timeout { operation: Operation, limit: Duration },
}

pub type Result<T> = std::result::Result<T, Error>;
