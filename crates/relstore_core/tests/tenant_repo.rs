use relstore_core::db::open_db_in_memory;
use relstore_core::{
    BusinessTenantMapping, DbScope, ErrorKind, RepoError, SqlTenantRepository, TenantRepository,
    TenantStatus,
};

#[test]
fn create_and_lookup_by_both_identities() {
    let conn = open_db_in_memory().unwrap();
    let scope = DbScope::global(&conn);
    let repo = SqlTenantRepository::new().unwrap();

    let tenant = BusinessTenantMapping::new("Acme", "ext-acme", "provider-a");
    repo.create(&scope, &tenant).unwrap();

    assert_eq!(repo.get(&scope, &tenant.id).unwrap(), tenant);
    assert_eq!(
        repo.get_by_external_tenant(&scope, "ext-acme").unwrap(),
        tenant
    );
    assert!(repo.exists(&scope, &tenant.id).unwrap());
    assert!(!repo.exists_by_external_tenant(&scope, "ext-other").unwrap());
}

#[test]
fn duplicate_external_tenant_is_already_exists() {
    let conn = open_db_in_memory().unwrap();
    let scope = DbScope::global(&conn);
    let repo = SqlTenantRepository::new().unwrap();

    repo.create(&scope, &BusinessTenantMapping::new("A", "ext-1", "p"))
        .unwrap();
    let err = repo
        .create(&scope, &BusinessTenantMapping::new("B", "ext-1", "p"))
        .unwrap_err();
    assert!(matches!(err, RepoError::AlreadyExists { .. }));
    assert_eq!(err.kind().http_status_hint(), 409);
}

#[test]
fn inactive_tenants_are_hidden_from_get_but_still_exist() {
    let conn = open_db_in_memory().unwrap();
    let scope = DbScope::global(&conn);
    let repo = SqlTenantRepository::new().unwrap();

    let mut tenant = BusinessTenantMapping::new("Acme", "ext-acme", "provider-a");
    repo.create(&scope, &tenant).unwrap();
    tenant.deactivate();
    repo.update(&scope, Some(&tenant)).unwrap();

    assert!(repo.get(&scope, &tenant.id).unwrap_err().is_not_found());
    assert!(repo
        .get_by_external_tenant(&scope, "ext-acme")
        .unwrap_err()
        .is_not_found());
    assert!(repo.exists(&scope, &tenant.id).unwrap());

    let listed = repo.list(&scope, 10, "").unwrap();
    assert_eq!(listed.total_count, 1);
    assert_eq!(listed.data[0].status, TenantStatus::Inactive);
}

#[test]
fn upsert_keeps_identity_and_refreshes_attributes() {
    let conn = open_db_in_memory().unwrap();
    let scope = DbScope::global(&conn);
    let repo = SqlTenantRepository::new().unwrap();

    let original = BusinessTenantMapping::new("Acme", "ext-acme", "provider-a");
    repo.upsert(&scope, Some(&original)).unwrap();

    let refreshed = BusinessTenantMapping::new("Acme Corp", "ext-acme", "provider-b");
    repo.upsert(&scope, Some(&refreshed)).unwrap();

    let stored = repo.get_by_external_tenant(&scope, "ext-acme").unwrap();
    assert_eq!(stored.id, original.id);
    assert_eq!(stored.name, "Acme Corp");
    assert_eq!(stored.provider, "provider-b");
    assert_eq!(repo.list(&scope, 10, "").unwrap().total_count, 1);

    let err = repo.upsert(&scope, None).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NilInput);
}

#[test]
fn update_and_delete_of_unknown_tenant_are_not_found() {
    let conn = open_db_in_memory().unwrap();
    let scope = DbScope::global(&conn);
    let repo = SqlTenantRepository::new().unwrap();

    let ghost = BusinessTenantMapping::new("Ghost", "ext-ghost", "p");
    assert!(repo.update(&scope, Some(&ghost)).unwrap_err().is_not_found());
    assert!(repo
        .delete_by_external_tenant(&scope, "ext-ghost")
        .unwrap_err()
        .is_not_found());

    repo.create(&scope, &ghost).unwrap();
    repo.delete_by_external_tenant(&scope, "ext-ghost").unwrap();
    assert!(!repo.exists(&scope, &ghost.id).unwrap());
}

#[test]
fn list_walks_all_pages_in_id_order() {
    let conn = open_db_in_memory().unwrap();
    let scope = DbScope::global(&conn);
    let repo = SqlTenantRepository::new().unwrap();

    let mut expected = Vec::new();
    for index in 0..5 {
        let tenant = BusinessTenantMapping::new(format!("T{index}"), format!("ext-{index}"), "p");
        repo.create(&scope, &tenant).unwrap();
        expected.push(tenant.id);
    }
    expected.sort();

    let mut cursor = String::new();
    let mut seen = Vec::new();
    let mut pages = 0;
    loop {
        let page = repo.list(&scope, 2, &cursor).unwrap();
        pages += 1;
        assert_eq!(page.total_count, 5);
        seen.extend(page.data.into_iter().map(|tenant| tenant.id));
        if !page.page_info.has_next_page {
            break;
        }
        cursor = page.page_info.end_cursor;
    }

    assert_eq!(pages, 3);
    assert_eq!(seen, expected);
}
