use shoebox_core::db::open_db_in_memory;
use shoebox_core::{
    DeleteMode, Filter, ListQuery, Ordering, Product, ProductRepository, RepoError,
    SqliteProductRepository,
};

fn seeded_repo(conn: &rusqlite::Connection) -> SqliteProductRepository<'_> {
    let repo = SqliteProductRepository::try_new(conn).unwrap();
    let mut batch = vec![
        Product::new("P001", 50),
        Product::new("P002", 150),
        Product::new("P003", 100),
    ];
    repo.create_products(&mut batch).unwrap();
    repo
}

#[test]
fn default_query_returns_insertion_order() {
    let conn = open_db_in_memory().unwrap();
    let repo = seeded_repo(&conn);

    let listed = repo.list_products(&ListQuery::default()).unwrap();
    let codes: Vec<&str> = listed.iter().map(|product| product.code.as_str()).collect();
    assert_eq!(codes, ["P001", "P002", "P003"]);
}

#[test]
fn equality_and_comparison_filters_narrow_results() {
    let conn = open_db_in_memory().unwrap();
    let repo = seeded_repo(&conn);

    let query = ListQuery {
        filters: vec![Filter::eq("code", "P002".to_string())],
        ..ListQuery::default()
    };
    let listed = repo.list_products(&query).unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].code, "P002");

    let query = ListQuery {
        filters: vec![Filter::ge("price", 100i64)],
        ..ListQuery::default()
    };
    let listed = repo.list_products(&query).unwrap();
    let codes: Vec<&str> = listed.iter().map(|product| product.code.as_str()).collect();
    assert_eq!(codes, ["P002", "P003"]);
}

#[test]
fn set_membership_filter_matches_listed_values_only() {
    let conn = open_db_in_memory().unwrap();
    let repo = seeded_repo(&conn);

    let query = ListQuery {
        filters: vec![Filter::one_of(
            "code",
            ["P001".to_string(), "P003".to_string()],
        )],
        ..ListQuery::default()
    };
    let listed = repo.list_products(&query).unwrap();
    let codes: Vec<&str> = listed.iter().map(|product| product.code.as_str()).collect();
    assert_eq!(codes, ["P001", "P003"]);

    let empty = ListQuery {
        filters: vec![Filter::one_of("code", Vec::<String>::new())],
        ..ListQuery::default()
    };
    assert!(repo.list_products(&empty).unwrap().is_empty());
}

#[test]
fn unknown_filter_column_is_rejected() {
    let conn = open_db_in_memory().unwrap();
    let repo = seeded_repo(&conn);

    let query = ListQuery {
        filters: vec![Filter::eq("colour", "red".to_string())],
        ..ListQuery::default()
    };
    let err = repo.list_products(&query).unwrap_err();
    assert!(matches!(
        err,
        RepoError::UnknownColumn { table: "products", column } if column == "colour"
    ));
}

#[test]
fn ordering_by_named_column_breaks_ties_by_id() {
    let conn = open_db_in_memory().unwrap();
    let repo = seeded_repo(&conn);

    // Give two rows the same price so the id tiebreak is observable.
    conn.execute("UPDATE products SET price = 100 WHERE code = 'P001';", [])
        .unwrap();

    let query = ListQuery {
        order: Some(Ordering::ascending("price")),
        ..ListQuery::default()
    };
    let listed = repo.list_products(&query).unwrap();
    let codes: Vec<&str> = listed.iter().map(|product| product.code.as_str()).collect();
    assert_eq!(codes, ["P001", "P003", "P002"]);

    let query = ListQuery {
        order: Some(Ordering::descending("price")),
        ..ListQuery::default()
    };
    let listed = repo.list_products(&query).unwrap();
    let codes: Vec<&str> = listed.iter().map(|product| product.code.as_str()).collect();
    assert_eq!(codes, ["P002", "P001", "P003"]);
}

#[test]
fn limit_one_offset_one_returns_exactly_the_second_record() {
    let conn = open_db_in_memory().unwrap();
    let repo = seeded_repo(&conn);

    let query = ListQuery {
        order: Some(Ordering::ascending("code")),
        limit: Some(1),
        offset: 1,
        ..ListQuery::default()
    };
    let listed = repo.list_products(&query).unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].code, "P002");
}

#[test]
fn offset_without_limit_skips_leading_matches() {
    let conn = open_db_in_memory().unwrap();
    let repo = seeded_repo(&conn);

    let query = ListQuery {
        offset: 1,
        ..ListQuery::default()
    };
    let listed = repo.list_products(&query).unwrap();
    let codes: Vec<&str> = listed.iter().map(|product| product.code.as_str()).collect();
    assert_eq!(codes, ["P002", "P003"]);
}

#[test]
fn soft_deleted_rows_are_excluded_unless_requested() {
    let conn = open_db_in_memory().unwrap();
    let repo = seeded_repo(&conn);

    let listed = repo.list_products(&ListQuery::default()).unwrap();
    repo.delete_product(listed[1].id, DeleteMode::Soft).unwrap();

    let visible = repo.list_products(&ListQuery::default()).unwrap();
    assert_eq!(visible.len(), 2);

    let unscoped = ListQuery {
        include_deleted: true,
        ..ListQuery::default()
    };
    let all = repo.list_products(&unscoped).unwrap();
    assert_eq!(all.len(), 3);
}
