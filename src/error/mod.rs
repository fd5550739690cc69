// codepatcher: Code Patch Manager
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Error handling module.
//!
//! ```text
//!                 PatcherError (~24 bytes)
//!                        |
//!   +------+------+------+------+------+------+------+
//!   |      |      |      |      |      |      |      |
//!   v      v      v      v      v      v      v      v
//! Valid  Query  NotFnd Denied  Cfg   Proc  Store  Fs/Io
//!  400    400    404    403    500    500    500    500
//!
//! Sub-errors (unboxed internally):
//!   Validation OperationNotFound, InvalidOperation, DuplicateName, ...
//!   Query      UnknownColumn, OrderIndexOutOfRange, InvalidDirection
//!   NotFound   Patch, Report, PatchFile
//!   Config     GitPathNotFound, InvalidValue
//!   Process    SpawnFailed, WaitFailed
//!   Fs         NotFound, PermissionDenied, IoError
//!
//! All variants boxed => PatcherError fits in 24 bytes.
//! ```
//!
//! Subprocess failures of `git apply` are never errors: they are recorded as
//! reports. Only failures that prevent an operation from running, or that
//! break persistence, surface here.

use thiserror::Error;

/// Convenience alias for `anyhow::Result`.
pub type Result<T> = anyhow::Result<T>;

/// Result type using [`PatcherError`].
pub type PatcherResult<T> = std::result::Result<T, PatcherError>;

/// Top-level application error type.
///
/// All sub-errors are boxed to keep this enum at ~24 bytes on the stack.
#[derive(Debug, Error)]
pub enum PatcherError {
    /// Caller supplied invalid input.
    #[error("validation error: {0}")]
    Validation(#[from] Box<ValidationError>),

    /// Table request referenced something outside the column allow-list.
    #[error("query error: {0}")]
    Query(#[from] Box<QueryError>),

    /// A patch, report or stored file does not exist.
    #[error("not found: {0}")]
    NotFound(#[from] Box<NotFoundError>),

    /// The principal lacks the capability required by an endpoint.
    #[error("permission denied: missing capability '{0}'")]
    PermissionDenied(Box<str>),

    /// Configuration error.
    #[error("config error: {0}")]
    Config(#[from] Box<ConfigError>),

    /// Process execution error.
    #[error("process error: {0}")]
    Process(#[from] Box<ProcessError>),

    /// Database error.
    #[error("storage error: {0}")]
    Store(Box<sqlx::Error>),

    /// Filesystem error.
    #[error("filesystem error: {0}")]
    Fs(#[from] Box<FsError>),

    /// I/O error.
    #[error("io error: {0}")]
    Io(Box<std::io::Error>),

    /// Generic error with message.
    #[error("{0}")]
    Other(Box<str>),
}

impl PatcherError {
    /// HTTP-equivalent status code used when the error crosses the endpoint boundary.
    #[must_use]
    pub const fn status_code(&self) -> u16 {
        match self {
            Self::Validation(_) | Self::Query(_) => 400,
            Self::PermissionDenied(_) => 403,
            Self::NotFound(_) => 404,
            Self::Config(_)
            | Self::Process(_)
            | Self::Store(_)
            | Self::Fs(_)
            | Self::Io(_)
            | Self::Other(_) => 500,
        }
    }

    /// Stable machine-readable error code.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Validation(e) => e.error_code(),
            Self::Query(e) => e.error_code(),
            Self::NotFound(e) => e.error_code(),
            Self::PermissionDenied(_) => "nopermissions",
            Self::Config(e) => e.error_code(),
            Self::Process(_) => "processerror",
            Self::Store(_) => "dmlwriteexception",
            Self::Fs(_) | Self::Io(_) => "storedfileerror",
            Self::Other(_) => "generalexception",
        }
    }

    /// Whether the error is a domain error meant to be reported back to the caller
    /// (validation, query, not-found, permission) rather than a system fault.
    #[must_use]
    pub const fn is_domain(&self) -> bool {
        self.status_code() < 500
    }
}

/// Create a [`PatcherError::PermissionDenied`] for the named capability.
pub fn permission_denied(capability: impl Into<String>) -> PatcherError {
    PatcherError::PermissionDenied(capability.into().into_boxed_str())
}

// --- From implementations for boxing ---

/// Macro to generate `From` implementations that box the source error.
macro_rules! impl_from_boxed {
    ($($error:ty => $variant:ident),+ $(,)?) => {
        $(
            impl From<$error> for PatcherError {
                fn from(err: $error) -> Self {
                    PatcherError::$variant(Box::new(err))
                }
            }
        )+
    };
}

impl_from_boxed! {
    ValidationError => Validation,
    QueryError => Query,
    NotFoundError => NotFound,
    ConfigError => Config,
    ProcessError => Process,
    FsError => Fs,
    sqlx::Error => Store,
    std::io::Error => Io,
}

impl From<minijinja::Error> for PatcherError {
    fn from(err: minijinja::Error) -> Self {
        Self::Other(format!("markup rendering failed: {err}").into_boxed_str())
    }
}

// --- Validation Errors ---

/// Invalid caller input.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// No operation action was supplied.
    #[error("no operation action was found")]
    OperationNotFound,

    /// Operation action is not one of `apply` / `restore`.
    #[error("invalid operation action '{action}' was provided")]
    InvalidOperation { action: String },

    /// Patch name is empty.
    #[error("the name field is required")]
    NameRequired,

    /// Patch upload is missing or empty.
    #[error("the file is required")]
    FileRequired,

    /// Another patch already uses this name.
    #[error("the provided code patch name ({name}) already exists")]
    DuplicateName { name: String },

    /// Uploaded file does not carry an accepted extension.
    #[error("unsupported patch file type '{filename}' (expected .diff or .patch)")]
    UnsupportedFileType { filename: String },

    /// Uploaded file is not valid UTF-8 text.
    #[error("patch file '{filename}' is not valid UTF-8 text")]
    InvalidEncoding { filename: String },

    /// Repeating the last operation is disabled by configuration.
    #[error("patch {id} is already in state '{operation}' and repeats are disabled")]
    RepeatedOperation { id: i64, operation: String },

    /// Table request payload could not be decoded.
    #[error("malformed table request: {message}")]
    MalformedRequest { message: String },
}

impl ValidationError {
    /// Stable machine-readable error code.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::OperationNotFound => "operationnotfound",
            Self::InvalidOperation { .. } => "invalidoperation",
            Self::NameRequired => "namerequired",
            Self::FileRequired => "filerequired",
            Self::DuplicateName { .. } => "existingname",
            Self::UnsupportedFileType { .. } => "invalidfiletype",
            Self::InvalidEncoding { .. } => "invalidencoding",
            Self::RepeatedOperation { .. } => "repeatedoperation",
            Self::MalformedRequest { .. } => "invalidrequest",
        }
    }
}

// --- Query Errors ---

/// Table request errors raised before any SQL is built.
#[derive(Debug, Error)]
pub enum QueryError {
    /// Column name is not in the table's allow-list.
    #[error("unknown column '{name}'")]
    UnknownColumn { name: String },

    /// Order entry points past the requested column list.
    #[error("order column index {index} is out of range ({columns} columns)")]
    OrderIndexOutOfRange { index: usize, columns: usize },

    /// Column exists but may not be ordered on.
    #[error("column '{name}' is not orderable")]
    ColumnNotOrderable { name: String },

    /// Sort direction is neither `asc` nor `desc`.
    #[error("invalid sort direction '{dir}'")]
    InvalidDirection { dir: String },
}

impl QueryError {
    /// Stable machine-readable error code.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::UnknownColumn { .. } => "unknowncolumn",
            Self::OrderIndexOutOfRange { .. } => "invalidorderindex",
            Self::ColumnNotOrderable { .. } => "columnnotorderable",
            Self::InvalidDirection { .. } => "invalidsortdirection",
        }
    }
}

// --- Not Found Errors ---

/// Missing records.
#[derive(Debug, Error)]
pub enum NotFoundError {
    /// Patch id does not exist.
    #[error("code patch {id} was not found")]
    Patch { id: i64 },

    /// Report id does not exist.
    #[error("code patch report {id} was not found")]
    Report { id: i64 },

    /// Patch exists but has no non-empty stored file.
    #[error("the code patch file of '{name}' was not found")]
    PatchFile { name: String },
}

impl NotFoundError {
    /// Stable machine-readable error code.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::Patch { .. } => "patchnotfound",
            Self::Report { .. } => "reportnotfound",
            Self::PatchFile { .. } => "patchfilenotfound",
        }
    }
}

// --- Config Errors ---

/// Configuration-related errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Invalid configuration value.
    #[error("invalid value for '{key}' in section '[{section}]': {message}")]
    InvalidValue {
        section: String,
        key: String,
        message: String,
    },

    /// The git executable is not configured or cannot be resolved.
    #[error("git command path was not found{}", .path.as_ref().map(|p| format!(": '{p}'")).unwrap_or_default())]
    GitPathNotFound { path: Option<String> },
}

impl ConfigError {
    /// Stable machine-readable error code.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::GitPathNotFound { .. } => "gitpathnotfound",
            Self::InvalidValue { .. } => "configerror",
        }
    }
}

// --- Process Errors ---

/// Process execution errors.
#[derive(Debug, Error)]
pub enum ProcessError {
    /// Failed to spawn process.
    #[error("failed to spawn process '{command}': {source}")]
    SpawnFailed {
        command: String,
        #[source]
        source: std::io::Error,
    },

    /// Failed while waiting on a running process.
    #[error("failed waiting for process '{command}': {source}")]
    WaitFailed {
        command: String,
        #[source]
        source: std::io::Error,
    },
}

// --- Filesystem Errors ---

/// Filesystem operation errors.
#[derive(Debug, Error)]
pub enum FsError {
    /// Path not found.
    #[error("path not found: {0}")]
    NotFound(String),

    /// Permission denied.
    #[error("permission denied: {0}")]
    PermissionDenied(String),

    /// General I/O error.
    #[error("I/O error on '{path}': {source}")]
    IoError {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

impl FsError {
    /// Wrap an I/O error with the path it occurred on.
    pub fn io(path: &std::path::Path, source: std::io::Error) -> Self {
        let path = path.display().to_string();
        match source.kind() {
            std::io::ErrorKind::NotFound => Self::NotFound(path),
            std::io::ErrorKind::PermissionDenied => Self::PermissionDenied(path),
            _ => Self::IoError { path, source },
        }
    }
}
