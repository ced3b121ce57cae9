//! CLI smoke entry point.
//!
//! # Responsibility
//! - Verify `relstore_core` linkage and migrations with one in-memory run.
//! - Keep output deterministic for quick local sanity checks.

use relstore_core::db::open_db_in_memory;
use relstore_core::{
    core_version, BusinessTenantMapping, DbScope, SqlTenantRepository, TenantRepository,
};
use std::error::Error;
use std::process::ExitCode;

fn main() -> ExitCode {
    println!("relstore_core version={}", core_version());
    match smoke() {
        Ok(listed) => {
            println!("relstore_core smoke=ok tenants={listed}");
            ExitCode::SUCCESS
        }
        Err(err) => {
            eprintln!("relstore_core smoke=error error={err}");
            ExitCode::FAILURE
        }
    }
}

fn smoke() -> Result<u64, Box<dyn Error>> {
    let conn = open_db_in_memory()?;
    let scope = DbScope::global(&conn);
    let repo = SqlTenantRepository::new()?;

    let tenant = BusinessTenantMapping::new("smoke", "smoke-external", "cli");
    repo.upsert(&scope, Some(&tenant))?;
    repo.get_by_external_tenant(&scope, "smoke-external")?;
    let page = repo.list(&scope, 10, "")?;
    repo.delete_by_external_tenant(&scope, "smoke-external")?;
    Ok(page.total_count)
}
