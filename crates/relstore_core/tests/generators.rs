use relstore_core::{
    Condition, Creator, Cursor, CursorKey, DbScope, Deleter, Entity, ErrorKind, ExecutionScope,
    ExistQuerier, OrderBy, PageableQuerier, RepoError, RepoResult, ResourceType, SingleGetter,
    TableSpec, Updater, Upserter, NO_ORDER_BY,
};
use rusqlite::types::Value;
use rusqlite::{Connection, Row};
use std::cell::Cell;

const WIDGET_COLUMNS: &[&str] = &["id", "name", "status"];

#[derive(Debug, Clone, PartialEq, Eq)]
struct Widget {
    id: i64,
    name: String,
    status: String,
}

impl Widget {
    fn new(id: i64, name: &str, status: &str) -> Self {
        Self {
            id,
            name: name.to_string(),
            status: status.to_string(),
        }
    }
}

impl Entity for Widget {
    const COLUMNS: &'static [&'static str] = WIDGET_COLUMNS;

    fn column_value(&self, column: &str) -> Option<Value> {
        match column {
            "id" => Some(Value::Integer(self.id)),
            "name" => Some(Value::Text(self.name.clone())),
            "status" => Some(Value::Text(self.status.clone())),
            _ => None,
        }
    }

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get("id")?,
            name: row.get("name")?,
            status: row.get("status")?,
        })
    }
}

/// Scope double that counts handle resolutions.
struct RecordingScope<'c> {
    conn: &'c Connection,
    resolved: Cell<usize>,
}

impl ExecutionScope for RecordingScope<'_> {
    fn resolve_handle(&self) -> RepoResult<&Connection> {
        self.resolved.set(self.resolved.get() + 1);
        Ok(self.conn)
    }

    fn tenant(&self) -> Option<&str> {
        None
    }
}

fn widget_db() -> Connection {
    let conn = Connection::open_in_memory().unwrap();
    conn.execute_batch(
        "CREATE TABLE widgets (
            id INTEGER PRIMARY KEY,
            name TEXT NOT NULL UNIQUE,
            status TEXT NOT NULL
        );",
    )
    .unwrap();
    conn
}

fn widget_spec() -> TableSpec {
    TableSpec::global(ResourceType::Custom("widget"), "widgets", WIDGET_COLUMNS).unwrap()
}

fn seed(conn: &Connection, widgets: &[Widget]) {
    let creator = Creator::<Widget>::new(widget_spec()).unwrap();
    let scope = DbScope::global(conn);
    for widget in widgets {
        creator.create(&scope, Some(widget)).unwrap();
    }
}

#[test]
fn statements_bind_one_placeholder_per_column() {
    let creator = Creator::<Widget>::new(widget_spec()).unwrap();
    assert_eq!(
        creator.sql(),
        "INSERT INTO widgets (id, name, status) VALUES (:id, :name, :status)"
    );

    let upserter = Upserter::<Widget>::new(widget_spec(), &["id"], &["name", "status"]).unwrap();
    assert_eq!(
        upserter.sql(),
        "INSERT INTO widgets (id, name, status) VALUES (:id, :name, :status) \
         ON CONFLICT (id) DO UPDATE SET name = excluded.name, status = excluded.status"
    );

    let updater = Updater::<Widget>::new(widget_spec(), &["name", "status"], &["id"]).unwrap();
    assert_eq!(
        updater.sql(),
        "UPDATE widgets SET name = :name, status = :status WHERE id = :id"
    );
}

#[test]
fn generators_reject_columns_the_entity_does_not_declare() {
    let spec = TableSpec::global(
        ResourceType::Custom("widget"),
        "widgets",
        &["id", "name", "color"],
    )
    .unwrap();
    let err = Creator::<Widget>::new(spec).unwrap_err();
    assert!(matches!(err, RepoError::InvalidIdentifier(_)));

    let err = Upserter::<Widget>::new(widget_spec(), &["id"], &["size"]).unwrap_err();
    assert!(matches!(err, RepoError::InvalidIdentifier(_)));
}

#[test]
fn create_then_get_returns_stored_row() {
    let conn = widget_db();
    let scope = DbScope::global(&conn);
    seed(&conn, &[Widget::new(1, "alpha", "ACTIVE")]);

    let getter = SingleGetter::<Widget>::new(widget_spec()).unwrap();
    let loaded = getter
        .get(&scope, &[Condition::equal("name", "alpha")], &NO_ORDER_BY)
        .unwrap();
    assert_eq!(loaded, Widget::new(1, "alpha", "ACTIVE"));
}

#[test]
fn duplicate_create_is_already_exists() {
    let conn = widget_db();
    seed(&conn, &[Widget::new(1, "alpha", "ACTIVE")]);

    let creator = Creator::<Widget>::new(widget_spec()).unwrap();
    let err = creator
        .create(&DbScope::global(&conn), Some(&Widget::new(2, "alpha", "ACTIVE")))
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::AlreadyExists);
    assert!(err.to_string().contains("widget create"));
}

#[test]
fn get_reports_not_found_empty_conditions_and_multiple_rows() {
    let conn = widget_db();
    let scope = DbScope::global(&conn);
    seed(
        &conn,
        &[
            Widget::new(1, "alpha", "ACTIVE"),
            Widget::new(2, "beta", "ACTIVE"),
        ],
    );
    let getter = SingleGetter::<Widget>::new(widget_spec()).unwrap();

    let missing = getter
        .get(&scope, &[Condition::equal("id", 9)], &NO_ORDER_BY)
        .unwrap_err();
    assert!(missing.is_not_found());

    let unfiltered = getter.get(&scope, &[], &NO_ORDER_BY).unwrap_err();
    assert!(matches!(unfiltered, RepoError::EmptyConditions { .. }));

    let ambiguous = getter
        .get(
            &scope,
            &[Condition::equal("status", "ACTIVE")],
            &[OrderBy::asc("id")],
        )
        .unwrap_err();
    assert!(matches!(ambiguous, RepoError::MultipleRows { matched: 2, .. }));
}

#[test]
fn conditions_filter_rows_and_unknown_fields_fail() {
    let conn = widget_db();
    let scope = DbScope::global(&conn);
    seed(
        &conn,
        &[
            Widget::new(1, "alpha", "ACTIVE"),
            Widget::new(2, "beta", "INACTIVE"),
        ],
    );
    let getter = SingleGetter::<Widget>::new(widget_spec()).unwrap();
    let exists = ExistQuerier::new(widget_spec());

    let active = getter
        .get(
            &scope,
            &[
                Condition::in_values("id", [1, 2]),
                Condition::not_equal("status", "INACTIVE"),
            ],
            &NO_ORDER_BY,
        )
        .unwrap();
    assert_eq!(active.name, "alpha");

    assert!(exists
        .exists(&scope, &[Condition::equal("status", "INACTIVE")])
        .unwrap());
    assert!(!exists
        .exists(&scope, &[Condition::equal("status", "ARCHIVED")])
        .unwrap());
    assert!(exists.exists(&scope, &[]).unwrap());

    let err = exists
        .exists(&scope, &[Condition::equal("owner", "x")])
        .unwrap_err();
    assert!(matches!(err, RepoError::UnknownColumn { column: "owner", .. }));
}

#[test]
fn missing_input_fails_before_resolving_a_handle() {
    let conn = widget_db();
    let scope = RecordingScope {
        conn: &conn,
        resolved: Cell::new(0),
    };

    let creator = Creator::<Widget>::new(widget_spec()).unwrap();
    let upserter = Upserter::<Widget>::new(widget_spec(), &["id"], &["name"]).unwrap();
    let updater = Updater::<Widget>::new(widget_spec(), &["name"], &["id"]).unwrap();

    let errors = [
        creator.create(&scope, None).unwrap_err(),
        upserter.upsert(&scope, None).unwrap_err(),
        updater.update(&scope, None).unwrap_err(),
    ];
    for err in errors {
        assert_eq!(err.kind(), ErrorKind::NilInput);
    }
    assert_eq!(scope.resolved.get(), 0);

    upserter
        .upsert(&scope, Some(&Widget::new(1, "alpha", "ACTIVE")))
        .unwrap();
    assert_eq!(scope.resolved.get(), 1);
}

#[test]
fn repeated_upsert_converges_to_last_write() {
    let conn = widget_db();
    let scope = DbScope::global(&conn);
    let upserter = Upserter::<Widget>::new(widget_spec(), &["id"], &["name", "status"]).unwrap();

    upserter
        .upsert(&scope, Some(&Widget::new(1, "alpha", "ACTIVE")))
        .unwrap();
    upserter
        .upsert(&scope, Some(&Widget::new(1, "alpha", "ACTIVE")))
        .unwrap();
    upserter
        .upsert(&scope, Some(&Widget::new(1, "renamed", "INACTIVE")))
        .unwrap();

    let rows: i64 = conn
        .query_row("SELECT COUNT(*) FROM widgets", [], |row| row.get(0))
        .unwrap();
    assert_eq!(rows, 1);

    let getter = SingleGetter::<Widget>::new(widget_spec()).unwrap();
    let stored = getter
        .get(&scope, &[Condition::equal("id", 1)], &NO_ORDER_BY)
        .unwrap();
    assert_eq!(stored, Widget::new(1, "renamed", "INACTIVE"));
}

#[test]
fn update_by_key_overwrites_or_reports_not_found() {
    let conn = widget_db();
    let scope = DbScope::global(&conn);
    seed(&conn, &[Widget::new(1, "alpha", "ACTIVE")]);
    let updater = Updater::<Widget>::new(widget_spec(), &["name", "status"], &["id"]).unwrap();

    updater
        .update(&scope, Some(&Widget::new(1, "alpha", "INACTIVE")))
        .unwrap();
    let status: String = conn
        .query_row("SELECT status FROM widgets WHERE id = 1", [], |row| row.get(0))
        .unwrap();
    assert_eq!(status, "INACTIVE");

    let err = updater
        .update(&scope, Some(&Widget::new(42, "ghost", "ACTIVE")))
        .unwrap_err();
    assert!(err.is_not_found());
}

#[test]
fn delete_one_and_delete_many() {
    let conn = widget_db();
    let scope = DbScope::global(&conn);
    seed(
        &conn,
        &[
            Widget::new(1, "alpha", "ACTIVE"),
            Widget::new(2, "beta", "INACTIVE"),
            Widget::new(3, "gamma", "INACTIVE"),
            Widget::new(4, "delta", "ACTIVE"),
        ],
    );
    let deleter = Deleter::new(widget_spec());

    deleter
        .delete_one(&scope, &[Condition::equal("id", 1)])
        .unwrap();
    assert!(deleter
        .delete_one(&scope, &[Condition::equal("id", 1)])
        .unwrap_err()
        .is_not_found());
    assert!(matches!(
        deleter.delete_one(&scope, &[]),
        Err(RepoError::EmptyConditions { .. })
    ));
    assert!(matches!(
        deleter.delete_one(&scope, &[Condition::equal("status", "INACTIVE")]),
        Err(RepoError::MultipleRows { matched: 2, .. })
    ));
    let remaining: i64 = conn
        .query_row("SELECT COUNT(*) FROM widgets", [], |row| row.get(0))
        .unwrap();
    assert_eq!(remaining, 3, "ambiguous single delete must not remove rows");

    deleter
        .delete_one(
            &scope,
            &[
                Condition::equal("status", "INACTIVE"),
                Condition::equal("name", "beta"),
            ],
        )
        .unwrap();

    assert_eq!(
        deleter
            .delete_many(&scope, &[Condition::equal("status", "ARCHIVED")])
            .unwrap(),
        0
    );
    assert_eq!(deleter.delete_many(&scope, &[]).unwrap(), 2);
}

#[test]
fn statements_join_the_callers_transaction() {
    let mut conn = widget_db();
    let creator = Creator::<Widget>::new(widget_spec()).unwrap();
    let exists = ExistQuerier::new(widget_spec());

    {
        let tx = conn.transaction().unwrap();
        creator
            .create(&DbScope::global(&tx), Some(&Widget::new(1, "alpha", "ACTIVE")))
            .unwrap();
        assert!(exists
            .exists(&DbScope::global(&tx), &[Condition::equal("id", 1)])
            .unwrap());
        tx.rollback().unwrap();
    }

    assert!(!exists
        .exists(&DbScope::global(&conn), &[Condition::equal("id", 1)])
        .unwrap());
}

#[test]
fn paging_visits_every_row_once_for_any_page_size() {
    let conn = widget_db();
    let scope = DbScope::global(&conn);
    let widgets: Vec<Widget> = (1..=7)
        .map(|id| Widget::new(id, &format!("w{id}"), "ACTIVE"))
        .collect();
    seed(&conn, &widgets);
    let pager = PageableQuerier::<Widget>::new(widget_spec()).unwrap();

    for page_size in 1..=8u32 {
        let mut cursor = String::new();
        let mut seen = Vec::new();
        loop {
            let page = pager.list(&scope, &[], page_size, &cursor, "id").unwrap();
            assert_eq!(page.total_count, 7);
            assert!(page.items.len() <= page_size as usize);
            assert_eq!(page.page_info.start_cursor, cursor);
            seen.extend(page.items.iter().map(|widget| widget.id));
            if !page.page_info.has_next_page {
                break;
            }
            cursor = page.page_info.end_cursor;
        }
        assert_eq!(seen, (1..=7).collect::<Vec<i64>>(), "page_size={page_size}");
    }
}

#[test]
fn paging_applies_conditions_to_items_and_total() {
    let conn = widget_db();
    let scope = DbScope::global(&conn);
    seed(
        &conn,
        &[
            Widget::new(1, "alpha", "ACTIVE"),
            Widget::new(2, "beta", "INACTIVE"),
            Widget::new(3, "gamma", "ACTIVE"),
        ],
    );
    let pager = PageableQuerier::<Widget>::new(widget_spec()).unwrap();

    let page = pager
        .list(
            &scope,
            &[Condition::equal("status", "ACTIVE")],
            10,
            "",
            "name",
        )
        .unwrap();
    assert_eq!(page.total_count, 2);
    assert!(!page.page_info.has_next_page);
    let names: Vec<&str> = page.items.iter().map(|w| w.name.as_str()).collect();
    assert_eq!(names, ["alpha", "gamma"]);
}

#[test]
fn empty_result_has_empty_end_cursor() {
    let conn = widget_db();
    let pager = PageableQuerier::<Widget>::new(widget_spec()).unwrap();

    let page = pager
        .list(&DbScope::global(&conn), &[], 5, "", "id")
        .unwrap();
    assert!(page.items.is_empty());
    assert_eq!(page.total_count, 0);
    assert!(page.page_info.end_cursor.is_empty());
    assert!(!page.page_info.has_next_page);
}

#[test]
fn paging_rejects_bad_cursors_and_sizes() {
    let conn = widget_db();
    let scope = DbScope::global(&conn);
    seed(
        &conn,
        &[
            Widget::new(1, "alpha", "ACTIVE"),
            Widget::new(2, "beta", "ACTIVE"),
        ],
    );
    let pager = PageableQuerier::<Widget>::new(widget_spec()).unwrap();

    let first = pager.list(&scope, &[], 1, "", "id").unwrap();
    let issued = first.page_info.end_cursor;

    let truncated = &issued[..issued.len() / 2];
    let err = pager.list(&scope, &[], 1, truncated, "id").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::MalformedCursor);

    let err = pager.list(&scope, &[], 1, &issued, "name").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::MalformedCursor);

    let foreign = Cursor {
        column: "name".to_string(),
        after: CursorKey::Text("alpha".to_string()),
    }
    .encode()
    .unwrap();
    let err = pager.list(&scope, &[], 1, &foreign, "id").unwrap_err();
    assert!(matches!(err, RepoError::MalformedCursor(_)));

    let text_key_for_integer_column = Cursor {
        column: "id".to_string(),
        after: CursorKey::Text("1".to_string()),
    }
    .encode()
    .unwrap();
    let err = pager
        .list(&scope, &[], 1, &text_key_for_integer_column, "id")
        .unwrap_err();
    assert!(matches!(err, RepoError::MalformedCursor(_)));

    let integer_key_for_text_column = Cursor {
        column: "name".to_string(),
        after: CursorKey::Integer(999),
    }
    .encode()
    .unwrap();
    let err = pager
        .list(&scope, &[], 1, &integer_key_for_text_column, "name")
        .unwrap_err();
    assert!(matches!(err, RepoError::MalformedCursor(_)));

    assert!(matches!(
        pager.list(&scope, &[], 0, "", "id"),
        Err(RepoError::InvalidPageSize(0))
    ));
    assert!(matches!(
        pager.list(&scope, &[], 1, "", "created_at"),
        Err(RepoError::UnknownColumn { .. })
    ));
}

#[test]
fn create_get_update_then_filter_by_status() {
    let conn = widget_db();
    let scope = DbScope::global(&conn);
    let creator = Creator::<Widget>::new(widget_spec()).unwrap();
    let getter = SingleGetter::<Widget>::new(widget_spec()).unwrap();
    let updater = Updater::<Widget>::new(widget_spec(), &["name", "status"], &["id"]).unwrap();
    let exists = ExistQuerier::new(widget_spec());

    creator
        .create(&scope, Some(&Widget::new(1, "alpha", "ACTIVE")))
        .unwrap();
    creator
        .create(&scope, Some(&Widget::new(2, "beta", "ACTIVE")))
        .unwrap();
    let mut second = getter
        .get(&scope, &[Condition::equal("id", 2)], &NO_ORDER_BY)
        .unwrap();
    second.status = "INACTIVE".to_string();
    updater.update(&scope, Some(&second)).unwrap();

    let active_only = |id: i64| {
        getter.get(
            &scope,
            &[
                Condition::equal("id", id),
                Condition::not_equal("status", "INACTIVE"),
            ],
            &NO_ORDER_BY,
        )
    };
    assert_eq!(active_only(1).unwrap().name, "alpha");
    assert!(active_only(2).unwrap_err().is_not_found());

    for id in [1, 2] {
        assert!(exists
            .exists(&scope, &[Condition::equal("id", id)])
            .unwrap());
    }
}
