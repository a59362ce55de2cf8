//! Error types for binding and dispatch.
//!
//! Failures fall into four groups, matching where they can happen:
//!
//! - [`ConstructionError`]: the backup snapshot could not be written. No
//!   [`Binder`](crate::Binder) is produced.
//! - [`CoerceError`]: a raw argument could not be turned into the kind a key
//!   expects, or an enumerated value was not one of the permitted choices.
//! - [`HandlerError`]: what a handler returns; either a coercion failure or
//!   the caller's own callback failing.
//! - [`DispatchError`]: what [`Binder::dispatch`](crate::Binder::dispatch)
//!   returns to the caller.
//!
//! [`TagError`] never leaves discovery: a field whose tag fails to parse is
//! skipped, not reported.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::coerce::Kind;

/// Errors that prevent a [`Binder`](crate::Binder) from being constructed.
#[derive(Debug, Error)]
pub enum ConstructionError {
    /// Backup was enabled but no directory was configured.
    #[error("backup enabled but no backup directory was given")]
    MissingBackupDir,

    /// The backup directory could not be created.
    #[error("failed to create backup directory {}", path.display())]
    CreateDir {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The backup file could not be created.
    #[error("failed to create backup file {}", path.display())]
    CreateFile {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The destination could not be serialized into the backup file.
    #[error("failed to write backup {}", path.display())]
    Serialize {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// A raw argument that could not be coerced into its kind.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CoerceError {
    /// A scalar kind was dispatched with no arguments at all.
    #[error("missing {kind} argument")]
    MissingArgument { kind: Kind },

    /// The argument is not a valid literal of the kind.
    #[error("invalid {kind} value {value:?}: {reason}")]
    Parse {
        kind: Kind,
        value: String,
        reason: String,
    },

    /// The argument is not one of the permitted choices.
    #[error("invalid value {value:?}, must be one of {}", choices.join("|"))]
    Validation { value: String, choices: Vec<String> },
}

impl CoerceError {
    pub(crate) fn parse(kind: Kind, value: &str, reason: impl ToString) -> Self {
        CoerceError::Parse {
            kind,
            value: value.to_string(),
            reason: reason.to_string(),
        }
    }

    /// Returns true if this is a choice-set violation rather than a parse failure.
    pub fn is_validation(&self) -> bool {
        matches!(self, CoerceError::Validation { .. })
    }
}

/// Failure returned by a handler.
#[derive(Debug, Error)]
pub enum HandlerError {
    #[error(transparent)]
    Coerce(#[from] CoerceError),

    /// A coerced value was assigned to a field of a different kind.
    #[error("cannot assign a {found} value to a {expected} field")]
    KindMismatch { expected: Kind, found: Kind },

    /// The caller-supplied override callback failed.
    #[error(transparent)]
    Callback(#[from] anyhow::Error),
}

impl HandlerError {
    /// Returns the coercion error, if that is what failed.
    pub fn as_coerce(&self) -> Option<&CoerceError> {
        match self {
            HandlerError::Coerce(e) => Some(e),
            _ => None,
        }
    }
}

/// Failure returned by [`Binder::dispatch`](crate::Binder::dispatch).
#[derive(Debug, Error)]
pub enum DispatchError {
    /// No handler is registered for the key.
    #[error("no handler for key {key}")]
    NoHandler { key: String },

    /// The key's handler ran and failed.
    #[error("{key}: {source}")]
    Handler {
        key: String,
        #[source]
        source: HandlerError,
    },
}

impl DispatchError {
    /// The key that was being dispatched.
    pub fn key(&self) -> &str {
        match self {
            DispatchError::NoHandler { key } | DispatchError::Handler { key, .. } => key,
        }
    }

    /// Returns true if the key had no handler.
    pub fn is_no_handler(&self) -> bool {
        matches!(self, DispatchError::NoHandler { .. })
    }

    /// Returns the coercion error behind a handler failure, if any.
    pub fn coerce_error(&self) -> Option<&CoerceError> {
        match self {
            DispatchError::Handler { source, .. } => source.as_coerce(),
            DispatchError::NoHandler { .. } => None,
        }
    }
}

/// Why a binding tag was rejected during discovery.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TagError {
    #[error("tag has an empty name")]
    MissingName,

    #[error("tag has no kind")]
    MissingKind,

    #[error("unsupported kind {0:?}")]
    UnknownKind(String),

    #[error("enum tag has no choices")]
    MissingChoices,

    #[error("only enum tags take choices")]
    UnexpectedChoices,

    #[error("tag has more than three segments")]
    TooManySegments,

    /// The tag kind does not match the Rust type of the field.
    #[error("field type cannot hold a {0} value")]
    Unsupported(Kind),
}
