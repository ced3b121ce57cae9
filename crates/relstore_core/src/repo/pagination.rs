//! Page model and opaque keyset cursor codec.
//!
//! # Responsibility
//! - Encode the ordering key of the last returned row into a cursor string.
//! - Decode cursors received from callers as untrusted input.
//!
//! # Invariants
//! - A cursor is self-contained: no server-side state is kept between pages.
//! - Malformed or foreign cursors map to `MalformedCursor`, never a panic.
//! - Cursor text is URL-safe base64 without padding.

use crate::repo::error::{RepoError, RepoResult};
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine as _;
use rusqlite::types::Value;
use serde::{Deserialize, Serialize};

const MAX_CURSOR_LEN: usize = 1024;

/// One page of results.
#[derive(Debug, Clone, PartialEq)]
pub struct Page<T> {
    pub items: Vec<T>,
    /// Size of the whole matching set, independent of the cursor.
    pub total_count: u64,
    pub page_info: PageInfo,
}

impl<T> Page<T> {
    /// Maps items while keeping paging metadata.
    pub fn try_map<U, F>(self, f: F) -> RepoResult<Page<U>>
    where
        F: FnMut(T) -> RepoResult<U>,
    {
        Ok(Page {
            items: self.items.into_iter().map(f).collect::<RepoResult<Vec<_>>>()?,
            total_count: self.total_count,
            page_info: self.page_info,
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageInfo {
    /// Cursor this page was requested with; empty for the first page.
    pub start_cursor: String,
    /// Cursor to request the next page with; empty when the page is empty.
    pub end_cursor: String,
    pub has_next_page: bool,
}

/// Ordering key value carried inside a cursor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum CursorKey {
    Integer(i64),
    Text(String),
}

impl CursorKey {
    pub fn from_value(value: Value) -> RepoResult<Self> {
        match value {
            Value::Integer(number) => Ok(Self::Integer(number)),
            Value::Text(text) => Ok(Self::Text(text)),
            other => Err(RepoError::InvalidData(format!(
                "order column value {other:?} cannot be used as a page cursor"
            ))),
        }
    }

    /// Whether `value` is a key of the same kind as this one.
    pub fn matches_kind(&self, value: &Value) -> bool {
        matches!(
            (self, value),
            (Self::Integer(_), Value::Integer(_)) | (Self::Text(_), Value::Text(_))
        )
    }

    pub fn into_value(self) -> Value {
        match self {
            Self::Integer(number) => Value::Integer(number),
            Self::Text(text) => Value::Text(text),
        }
    }
}

/// Decoded cursor: which column the page was ordered by and the last key seen.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Cursor {
    pub column: String,
    pub after: CursorKey,
}

impl Cursor {
    pub fn encode(&self) -> RepoResult<String> {
        let json = serde_json::to_vec(self)
            .map_err(|err| RepoError::InvalidData(format!("cursor serialization failed: {err}")))?;
        Ok(URL_SAFE_NO_PAD.encode(json))
    }

    /// Decodes `raw`; an empty string means "first page".
    pub fn decode(raw: &str) -> RepoResult<Option<Self>> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Ok(None);
        }
        if trimmed.len() > MAX_CURSOR_LEN {
            return Err(RepoError::MalformedCursor(format!(
                "cursor longer than {MAX_CURSOR_LEN} characters"
            )));
        }

        let bytes = URL_SAFE_NO_PAD
            .decode(trimmed)
            .map_err(|err| RepoError::MalformedCursor(format!("invalid encoding: {err}")))?;
        let cursor = serde_json::from_slice::<Self>(&bytes)
            .map_err(|err| RepoError::MalformedCursor(format!("invalid payload: {err}")))?;
        Ok(Some(cursor))
    }
}
