//! Generic relational persistence toolkit.
//! Table-agnostic statement generators, a condition model, cursor pagination
//! and a classified error taxonomy, plus the repositories built on them.

pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;

pub use logging::{default_log_level, init_logging, logging_status};
pub use model::cluster::ClusterRecord;
pub use model::label::Label;
pub use model::tenant::{BusinessTenantMapping, BusinessTenantMappingPage, TenantStatus};
pub use repo::cluster_repo::{ClusterLookup, ClusterRepository};
pub use repo::condition::{Condition, Conditions, Operator};
pub use repo::creator::Creator;
pub use repo::deleter::Deleter;
pub use repo::entity::{Converter, Entity};
pub use repo::error::{classify, ErrorKind, Operation, RepoError, RepoResult, ResourceType};
pub use repo::exists::ExistQuerier;
pub use repo::getter::SingleGetter;
pub use repo::label_repo::LabelRepository;
pub use repo::order::{OrderBy, OrderByParams, OrderDirection, NO_ORDER_BY};
pub use repo::pageable::PageableQuerier;
pub use repo::pagination::{Cursor, CursorKey, Page, PageInfo};
pub use repo::scope::{DbScope, ExecutionScope};
pub use repo::table::TableSpec;
pub use repo::tenant_repo::{SqlTenantRepository, TenantRepository};
pub use repo::updater::Updater;
pub use repo::upserter::Upserter;
pub use service::cluster_service::ClusterService;

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
