//! Repository error taxonomy and driver error classification.
//!
//! # Responsibility
//! - Define the stable error kinds every generator returns.
//! - Own the only mapping from SQLite result codes to those kinds.
//!
//! # Invariants
//! - Every store failure is tagged with the resource type and operation.
//! - `classify` is the single place where engine-specific codes are read.

use log::warn;
use rusqlite::ffi;
use rusqlite::ErrorCode;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type RepoResult<T> = Result<T, RepoError>;

/// Diagnostic label attached to each generator instance.
///
/// Only used in error messages and log lines, never in query construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceType {
    Tenant,
    Label,
    Cluster,
    /// Free-form tag for callers outside the shipped sample repositories.
    Custom(&'static str),
}

impl ResourceType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Tenant => "tenant",
            Self::Label => "label",
            Self::Cluster => "cluster",
            Self::Custom(name) => name,
        }
    }
}

impl Display for ResourceType {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Statement family attempted when an error occurred.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    Create,
    Upsert,
    Get,
    List,
    Count,
    Update,
    Delete,
    Exists,
}

impl Operation {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Create => "create",
            Self::Upsert => "upsert",
            Self::Get => "get",
            Self::List => "list",
            Self::Count => "count",
            Self::Update => "update",
            Self::Delete => "delete",
            Self::Exists => "exists",
        }
    }
}

impl Display for Operation {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Flat classification of [`RepoError`] for callers mapping to API responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    NilInput,
    NotFound,
    AlreadyExists,
    ForeignKeyViolation,
    MalformedCursor,
    Connection,
    Conflict,
    InvalidInput,
    Internal,
}

impl ErrorKind {
    /// Suggested HTTP status for API layers translating repository failures.
    pub fn http_status_hint(self) -> u16 {
        match self {
            Self::NotFound => 404,
            Self::AlreadyExists | Self::Conflict => 409,
            Self::NilInput
            | Self::MalformedCursor
            | Self::InvalidInput
            | Self::ForeignKeyViolation => 400,
            Self::Connection => 503,
            Self::Internal => 500,
        }
    }
}

/// Error returned by every statement generator.
#[derive(Debug)]
pub enum RepoError {
    /// Caller passed no entity; detected before any statement is issued.
    NilInput {
        resource: ResourceType,
        operation: Operation,
    },
    NotFound {
        resource: ResourceType,
        operation: Operation,
    },
    /// Unique or primary-key violation, or an upsert blocked by another tenant.
    AlreadyExists {
        resource: ResourceType,
        operation: Operation,
        source: Option<rusqlite::Error>,
    },
    ForeignKeyViolation {
        resource: ResourceType,
        operation: Operation,
        source: rusqlite::Error,
    },
    /// Page cursor could not be decoded or belongs to another ordering.
    MalformedCursor(String),
    Connection {
        resource: ResourceType,
        operation: Operation,
        source: rusqlite::Error,
    },
    /// Versioned update found the row at a different version.
    Conflict {
        resource: ResourceType,
        operation: Operation,
    },
    /// Single-row operation called with an empty condition list.
    EmptyConditions {
        resource: ResourceType,
        operation: Operation,
    },
    /// Condition or ordering references a column outside the configured set.
    UnknownColumn {
        resource: ResourceType,
        column: &'static str,
    },
    /// Table or column identifier rejected at generator construction.
    InvalidIdentifier(String),
    InvalidPageSize(u32),
    /// Tenant-scoped generator invoked from a scope without a tenant.
    MissingTenant {
        resource: ResourceType,
        operation: Operation,
    },
    /// Entity tenant column disagrees with the scope tenant.
    TenantMismatch {
        resource: ResourceType,
        operation: Operation,
    },
    /// More rows matched than a single-row operation allows.
    MultipleRows {
        resource: ResourceType,
        operation: Operation,
        matched: usize,
    },
    /// Persisted data cannot be converted into a valid model.
    InvalidData(String),
    /// Unclassified store error.
    Internal {
        resource: ResourceType,
        operation: Operation,
        source: rusqlite::Error,
    },
}

impl RepoError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::NilInput { .. } => ErrorKind::NilInput,
            Self::NotFound { .. } => ErrorKind::NotFound,
            Self::AlreadyExists { .. } => ErrorKind::AlreadyExists,
            Self::ForeignKeyViolation { .. } => ErrorKind::ForeignKeyViolation,
            Self::MalformedCursor(_) => ErrorKind::MalformedCursor,
            Self::Connection { .. } => ErrorKind::Connection,
            Self::Conflict { .. } => ErrorKind::Conflict,
            Self::EmptyConditions { .. }
            | Self::InvalidPageSize(_)
            | Self::MissingTenant { .. }
            | Self::TenantMismatch { .. } => ErrorKind::InvalidInput,
            Self::UnknownColumn { .. }
            | Self::InvalidIdentifier(_)
            | Self::MultipleRows { .. }
            | Self::InvalidData(_)
            | Self::Internal { .. } => ErrorKind::Internal,
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.kind() == ErrorKind::NotFound
    }

    pub(crate) fn not_found(resource: ResourceType, operation: Operation) -> Self {
        Self::NotFound {
            resource,
            operation,
        }
    }
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NilInput {
                resource,
                operation,
            } => write!(f, "{resource} {operation}: item cannot be empty"),
            Self::NotFound {
                resource,
                operation,
            } => write!(f, "{resource} {operation}: object not found"),
            Self::AlreadyExists {
                resource,
                operation,
                ..
            } => write!(f, "{resource} {operation}: object already exists"),
            Self::ForeignKeyViolation {
                resource,
                operation,
                ..
            } => write!(f, "{resource} {operation}: referenced object does not exist"),
            Self::MalformedCursor(message) => write!(f, "malformed page cursor: {message}"),
            Self::Connection {
                resource,
                operation,
                source,
            } => write!(f, "{resource} {operation}: database unavailable: {source}"),
            Self::Conflict {
                resource,
                operation,
            } => write!(
                f,
                "{resource} {operation}: object was modified concurrently"
            ),
            Self::EmptyConditions {
                resource,
                operation,
            } => write!(
                f,
                "{resource} {operation}: single-row operation requires at least one condition"
            ),
            Self::UnknownColumn { resource, column } => {
                write!(f, "{resource}: column `{column}` is not configured")
            }
            Self::InvalidIdentifier(message) => write!(f, "invalid SQL identifier: {message}"),
            Self::InvalidPageSize(size) => {
                write!(f, "page size must be at least 1, got {size}")
            }
            Self::MissingTenant {
                resource,
                operation,
            } => write!(f, "{resource} {operation}: tenant is required"),
            Self::TenantMismatch {
                resource,
                operation,
            } => write!(
                f,
                "{resource} {operation}: entity tenant does not match scope tenant"
            ),
            Self::MultipleRows {
                resource,
                operation,
                matched,
            } => write!(
                f,
                "{resource} {operation}: expected a single row, matched {matched}"
            ),
            Self::InvalidData(message) => write!(f, "invalid persisted data: {message}"),
            Self::Internal {
                resource,
                operation,
                source,
            } => write!(f, "{resource} {operation}: internal error: {source}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::AlreadyExists {
                source: Some(err), ..
            } => Some(err),
            Self::ForeignKeyViolation { source, .. }
            | Self::Connection { source, .. }
            | Self::Internal { source, .. } => Some(source),
            _ => None,
        }
    }
}

/// Maps a driver failure into the repository taxonomy.
pub fn classify(err: rusqlite::Error, resource: ResourceType, operation: Operation) -> RepoError {
    let (code, extended_code) = match &err {
        rusqlite::Error::SqliteFailure(failure, _) => (Some(failure.code), failure.extended_code),
        _ => (None, 0),
    };

    let classified = match (code, extended_code) {
        _ if matches!(err, rusqlite::Error::QueryReturnedNoRows) => {
            RepoError::not_found(resource, operation)
        }
        (Some(_), ffi::SQLITE_CONSTRAINT_UNIQUE | ffi::SQLITE_CONSTRAINT_PRIMARYKEY) => {
            RepoError::AlreadyExists {
                resource,
                operation,
                source: Some(err),
            }
        }
        (Some(_), ffi::SQLITE_CONSTRAINT_FOREIGNKEY) => RepoError::ForeignKeyViolation {
            resource,
            operation,
            source: err,
        },
        (
            Some(
                ErrorCode::CannotOpen
                | ErrorCode::NotADatabase
                | ErrorCode::DatabaseBusy
                | ErrorCode::DatabaseLocked
                | ErrorCode::SystemIoFailure,
            ),
            _,
        ) => RepoError::Connection {
            resource,
            operation,
            source: err,
        },
        _ => RepoError::Internal {
            resource,
            operation,
            source: err,
        },
    };

    if !classified.is_not_found() {
        warn!(
            "event=repo_error module=repo status=error resource={} op={} kind={:?}",
            resource,
            operation,
            classified.kind()
        );
    }
    classified
}
