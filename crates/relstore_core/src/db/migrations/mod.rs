//! Ordered schema migrations for the sample tables.
//!
//! # Invariants
//! - Versions start at 1 and increase by one per entry.
//! - `PRAGMA user_version` holds the last applied version.
//! - The pending batch runs in one immediate transaction: concurrent openers
//!   of a fresh file serialize, and a failing migration leaves the previous
//!   version in place.

use crate::db::{BootstrapStep, DbError};
use log::info;
use rusqlite::{Connection, TransactionBehavior};

/// One schema step, named after the table it introduces.
#[derive(Debug, Clone, Copy)]
pub struct Migration {
    pub version: u32,
    pub name: &'static str,
    sql: &'static str,
}

const MIGRATIONS: &[Migration] = &[
    Migration {
        version: 1,
        name: "tenants",
        sql: include_str!("0001_tenants.sql"),
    },
    Migration {
        version: 2,
        name: "labels",
        sql: include_str!("0002_labels.sql"),
    },
    Migration {
        version: 3,
        name: "clusters",
        sql: include_str!("0003_clusters.sql"),
    },
];

/// All known migrations, oldest first.
pub fn migrations() -> &'static [Migration] {
    MIGRATIONS
}

pub fn latest_version() -> u32 {
    MIGRATIONS.len() as u32
}

/// Brings `conn` to `latest_version()`; returns how many migrations ran.
pub fn apply_migrations(conn: &mut Connection) -> Result<usize, DbError> {
    let tx = conn
        .transaction_with_behavior(TransactionBehavior::Immediate)
        .map_err(DbError::at(BootstrapStep::ReadSchemaVersion))?;
    let found: u32 = tx
        .pragma_query_value(None, "user_version", |row| row.get(0))
        .map_err(DbError::at(BootstrapStep::ReadSchemaVersion))?;

    let latest_known = latest_version();
    if found > latest_known {
        return Err(DbError::UnsupportedSchemaVersion {
            found,
            latest_known,
        });
    }

    let pending = &MIGRATIONS[found as usize..];
    for migration in pending {
        let failed = |source: rusqlite::Error| DbError::Migration {
            version: migration.version,
            name: migration.name,
            source,
        };
        tx.execute_batch(migration.sql).map_err(failed)?;
        tx.pragma_update(None, "user_version", migration.version)
            .map_err(failed)?;
        info!(
            "event=db_migrate module=db status=ok version={} name={}",
            migration.version, migration.name
        );
    }
    if !pending.is_empty() {
        tx.commit().map_err(|source| DbError::Migration {
            version: latest_known,
            name: "commit",
            source,
        })?;
    }
    Ok(pending.len())
}

#[cfg(test)]
mod tests {
    use super::{apply_migrations, latest_version, migrations};
    use crate::db::DbError;
    use rusqlite::Connection;

    #[test]
    fn versions_are_dense_and_ascending() {
        for (index, migration) in migrations().iter().enumerate() {
            assert_eq!(migration.version as usize, index + 1);
        }
        assert_eq!(latest_version() as usize, migrations().len());
    }

    #[test]
    fn reapplying_runs_nothing() {
        let mut conn = Connection::open_in_memory().unwrap();
        assert_eq!(apply_migrations(&mut conn).unwrap(), migrations().len());
        assert_eq!(apply_migrations(&mut conn).unwrap(), 0);
    }

    #[test]
    fn resumes_from_recorded_version() {
        let mut conn = Connection::open_in_memory().unwrap();
        conn.execute_batch(
            "CREATE TABLE business_tenant_mappings (id TEXT PRIMARY KEY NOT NULL);
             PRAGMA user_version = 1;",
        )
        .unwrap();
        assert_eq!(apply_migrations(&mut conn).unwrap(), migrations().len() - 1);
    }

    #[test]
    fn failing_migration_reports_its_version_and_keeps_old_schema() {
        let mut conn = Connection::open_in_memory().unwrap();
        conn.execute_batch(
            "CREATE TABLE business_tenant_mappings (id TEXT PRIMARY KEY NOT NULL);
             CREATE VIEW labels AS SELECT 1 AS id;
             PRAGMA user_version = 1;",
        )
        .unwrap();

        match apply_migrations(&mut conn).unwrap_err() {
            DbError::Migration { version, name, .. } => {
                assert_eq!(version, 2);
                assert_eq!(name, "labels");
            }
            other => panic!("unexpected error: {other}"),
        }
        let version: u32 = conn
            .query_row("PRAGMA user_version;", [], |row| row.get(0))
            .unwrap();
        assert_eq!(version, 1);
    }
}
