//! SQLite bootstrap for the sample tenant, label and cluster tables.
//!
//! # Responsibility
//! - Open connections configured the way the repositories expect them.
//! - Bring the sample schema to the latest migration.
//!
//! # Invariants
//! - The repository toolkit never opens or migrates; it consumes handles
//!   produced here (or by the caller).
//! - Every bootstrap failure names the step or migration that failed.

use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod migrations;
mod open;

pub use open::{open_db, open_db_in_memory};

/// Connection setup step that can fail before migrations run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BootstrapStep {
    Open,
    ForeignKeys,
    BusyTimeout,
    ReadSchemaVersion,
}

impl BootstrapStep {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Open => "open",
            Self::ForeignKeys => "foreign_keys",
            Self::BusyTimeout => "busy_timeout",
            Self::ReadSchemaVersion => "read_schema_version",
        }
    }
}

#[derive(Debug)]
pub enum DbError {
    /// Connection could not be opened or configured.
    Bootstrap {
        step: BootstrapStep,
        source: rusqlite::Error,
    },
    /// Migration `version` failed; nothing from the pending batch is kept.
    Migration {
        version: u32,
        name: &'static str,
        source: rusqlite::Error,
    },
    /// The file was migrated by a newer build.
    UnsupportedSchemaVersion { found: u32, latest_known: u32 },
}

impl DbError {
    pub(crate) fn at(step: BootstrapStep) -> impl FnOnce(rusqlite::Error) -> Self {
        move |source| Self::Bootstrap { step, source }
    }

    /// Stable code for `error_code=` log fields.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Bootstrap { .. } => "db_bootstrap_failed",
            Self::Migration { .. } => "db_migration_failed",
            Self::UnsupportedSchemaVersion { .. } => "db_schema_too_new",
        }
    }
}

impl Display for DbError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Bootstrap { step, source } => {
                write!(f, "database bootstrap failed at `{}`: {source}", step.as_str())
            }
            Self::Migration {
                version,
                name,
                source,
            } => write!(f, "migration {version} ({name}) failed: {source}"),
            Self::UnsupportedSchemaVersion {
                found,
                latest_known,
            } => write!(
                f,
                "schema version {found} is newer than the latest known migration {latest_known}"
            ),
        }
    }
}

impl Error for DbError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Bootstrap { source, .. } | Self::Migration { source, .. } => Some(source),
            Self::UnsupportedSchemaVersion { .. } => None,
        }
    }
}
