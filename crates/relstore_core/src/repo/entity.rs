//! Row-shaped entity contract and the model converter contract.
//!
//! # Invariants
//! - An entity declares its columns and their accessors once, in code.
//! - Generators only reach entity fields through `column_value`.
//! - Converters are the sole translation point between entity and model.

use crate::repo::error::RepoResult;
use rusqlite::types::Value;
use rusqlite::Row;

/// Persistence row shape with an explicit per-column accessor table.
pub trait Entity: Sized {
    /// Every column this entity can bind or decode.
    const COLUMNS: &'static [&'static str];

    /// Returns the bind value for `column`, or `None` for undeclared columns.
    fn column_value(&self, column: &str) -> Option<Value>;

    /// Decodes one row selected with the configured column list.
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self>;
}

/// Bidirectional mapping between a domain model and its entity.
///
/// `from_entity(to_entity(m))` must reproduce every persisted field of `m`.
pub trait Converter {
    type Model;
    type Entity: Entity;

    fn to_entity(&self, model: &Self::Model) -> Self::Entity;

    fn from_entity(&self, entity: Self::Entity) -> RepoResult<Self::Model>;
}
