use rusqlite::Connection;
use shoebox_core::db::migrations::latest_version;
use shoebox_core::db::open_db_in_memory;
use shoebox_core::{
    DeleteMode, Product, ProductPatch, ProductRepository, RepoError, SqliteProductRepository,
};

#[test]
fn create_and_get_roundtrip() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteProductRepository::try_new(&conn).unwrap();

    let mut product = Product::new("P001", 50);
    let id = repo.create_product(&mut product).unwrap();

    assert!(id > 0);
    assert_eq!(product.id, id);
    assert!(product.created_at > 0);
    assert!(product.updated_at > 0);

    let loaded = repo.get_product(id, false).unwrap().unwrap();
    assert_eq!(loaded, product);
}

#[test]
fn generated_ids_are_strictly_increasing_and_never_reused() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteProductRepository::try_new(&conn).unwrap();

    let mut first = Product::new("A", 1);
    let mut second = Product::new("B", 2);
    repo.create_product(&mut first).unwrap();
    repo.create_product(&mut second).unwrap();
    assert!(second.id > first.id);

    repo.delete_product(second.id, DeleteMode::Hard).unwrap();

    let mut third = Product::new("C", 3);
    repo.create_product(&mut third).unwrap();
    assert!(third.id > second.id);
}

#[test]
fn duplicate_code_is_rejected_for_active_rows() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteProductRepository::try_new(&conn).unwrap();

    let mut original = Product::new("P001", 50);
    repo.create_product(&mut original).unwrap();

    let mut duplicate = Product::new("P001", 75);
    let err = repo.create_product(&mut duplicate).unwrap_err();
    assert!(matches!(
        err,
        RepoError::ConstraintViolation {
            entity: "product",
            ..
        }
    ));
}

#[test]
fn code_becomes_reusable_once_holder_is_soft_deleted() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteProductRepository::try_new(&conn).unwrap();

    let mut original = Product::new("P001", 50);
    repo.create_product(&mut original).unwrap();
    repo.delete_product(original.id, DeleteMode::Soft).unwrap();

    let mut replacement = Product::new("P001", 75);
    repo.create_product(&mut replacement).unwrap();
    assert!(replacement.id > original.id);

    // Restoring the tombstoned holder would recreate the collision.
    let err = repo.restore_product(original.id).unwrap_err();
    assert!(matches!(
        err,
        RepoError::ConstraintViolation {
            entity: "product",
            ..
        }
    ));
}

#[test]
fn patch_overwrites_named_fields_only() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteProductRepository::try_new(&conn).unwrap();

    let mut product = Product::new("P001", 50);
    repo.create_product(&mut product).unwrap();

    let patch = ProductPatch {
        price: Some(150),
        ..ProductPatch::default()
    };
    repo.patch_product(product.id, &patch).unwrap();

    let loaded = repo.get_product(product.id, false).unwrap().unwrap();
    assert_eq!(loaded.price, 150);
    assert_eq!(loaded.code, "P001");
}

#[test]
fn full_update_overwrites_zero_values_too() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteProductRepository::try_new(&conn).unwrap();

    let mut product = Product::new("P001", 50);
    repo.create_product(&mut product).unwrap();

    product.code = "P002".to_string();
    product.price = 0;
    repo.update_product(&product).unwrap();

    let loaded = repo.get_product(product.id, false).unwrap().unwrap();
    assert_eq!(loaded.code, "P002");
    assert_eq!(loaded.price, 0);
}

#[test]
fn mutations_on_missing_or_tombstoned_rows_return_not_found() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteProductRepository::try_new(&conn).unwrap();

    let ghost = Product {
        id: 99,
        ..Product::new("GHOST", 1)
    };
    assert!(matches!(
        repo.update_product(&ghost).unwrap_err(),
        RepoError::NotFound {
            entity: "product",
            id: 99,
        }
    ));

    let mut product = Product::new("P001", 50);
    repo.create_product(&mut product).unwrap();
    repo.delete_product(product.id, DeleteMode::Soft).unwrap();

    // Default visibility also governs mutation targets.
    let err = repo
        .patch_product(
            product.id,
            &ProductPatch {
                price: Some(10),
                ..ProductPatch::default()
            },
        )
        .unwrap_err();
    assert!(matches!(err, RepoError::NotFound { .. }));
}

#[test]
fn soft_delete_hides_from_default_reads_and_sets_timestamp() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteProductRepository::try_new(&conn).unwrap();

    let mut product = Product::new("P001", 50);
    repo.create_product(&mut product).unwrap();
    repo.delete_product(product.id, DeleteMode::Soft).unwrap();

    assert!(repo.get_product(product.id, false).unwrap().is_none());

    let tombstoned = repo.get_product(product.id, true).unwrap().unwrap();
    assert!(tombstoned.deleted_at.is_some());
    assert!(!tombstoned.is_active());
}

#[test]
fn soft_delete_is_idempotent_and_preserves_original_timestamp() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteProductRepository::try_new(&conn).unwrap();

    let mut product = Product::new("P001", 50);
    repo.create_product(&mut product).unwrap();
    repo.delete_product(product.id, DeleteMode::Soft).unwrap();

    conn.execute(
        "UPDATE products SET deleted_at = 1234567890000 WHERE id = ?1;",
        [product.id],
    )
    .unwrap();

    repo.delete_product(product.id, DeleteMode::Soft).unwrap();

    let tombstoned = repo.get_product(product.id, true).unwrap().unwrap();
    assert_eq!(tombstoned.deleted_at, Some(1_234_567_890_000));
}

#[test]
fn hard_delete_is_permanent_even_for_unscoped_reads() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteProductRepository::try_new(&conn).unwrap();

    let mut product = Product::new("P001", 50);
    repo.create_product(&mut product).unwrap();
    repo.delete_product(product.id, DeleteMode::Hard).unwrap();

    assert!(repo.get_product(product.id, false).unwrap().is_none());
    assert!(repo.get_product(product.id, true).unwrap().is_none());

    let err = repo
        .delete_product(product.id, DeleteMode::Hard)
        .unwrap_err();
    assert!(matches!(err, RepoError::NotFound { .. }));
}

#[test]
fn restore_clears_tombstone() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteProductRepository::try_new(&conn).unwrap();

    let mut product = Product::new("P001", 50);
    repo.create_product(&mut product).unwrap();
    repo.delete_product(product.id, DeleteMode::Soft).unwrap();
    repo.restore_product(product.id).unwrap();

    let restored = repo.get_product(product.id, false).unwrap().unwrap();
    assert!(restored.is_active());

    // Restoring an already-active row stays a no-op.
    repo.restore_product(product.id).unwrap();
    assert!(matches!(
        repo.restore_product(999).unwrap_err(),
        RepoError::NotFound { .. }
    ));
}

#[test]
fn validation_failure_blocks_create_and_update() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteProductRepository::try_new(&conn).unwrap();

    let mut invalid = Product::new("", 10);
    let create_err = repo.create_product(&mut invalid).unwrap_err();
    assert!(matches!(create_err, RepoError::Validation(_)));

    let mut valid = Product::new("P001", 10);
    repo.create_product(&mut valid).unwrap();

    valid.price = -1;
    let update_err = repo.update_product(&valid).unwrap_err();
    assert!(matches!(update_err, RepoError::Validation(_)));
}

#[test]
fn batch_create_is_best_effort_and_stops_at_first_error() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteProductRepository::try_new(&conn).unwrap();

    let mut batch = vec![
        Product::new("P001", 10),
        Product::new("P001", 20),
        Product::new("P003", 30),
    ];
    let err = repo.create_products(&mut batch).unwrap_err();
    assert!(matches!(err, RepoError::ConstraintViolation { .. }));

    // The first row was persisted, the colliding one and its successor not.
    assert!(batch[0].id > 0);
    assert!(repo.get_product(batch[0].id, false).unwrap().is_some());
    assert_eq!(batch[1].id, 0);
    assert_eq!(batch[2].id, 0);
}

#[test]
fn repository_rejects_uninitialized_connection() {
    let conn = Connection::open_in_memory().unwrap();

    let result = SqliteProductRepository::try_new(&conn);
    match result {
        Err(RepoError::UninitializedConnection {
            expected_version,
            actual_version: 0,
        }) => assert!(expected_version > 0),
        Err(other) => panic!("unexpected error: {other}"),
        Ok(_) => panic!("expected uninitialized connection error"),
    }
}

#[test]
fn repository_rejects_connection_without_required_table() {
    let conn = Connection::open_in_memory().unwrap();
    conn.execute_batch(&format!("PRAGMA user_version = {};", latest_version()))
        .unwrap();

    let result = SqliteProductRepository::try_new(&conn);
    assert!(matches!(
        result,
        Err(RepoError::MissingRequiredTable("products"))
    ));
}

#[test]
fn repository_rejects_connection_missing_required_column() {
    let conn = Connection::open_in_memory().unwrap();
    conn.execute_batch(
        "CREATE TABLE products (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            code TEXT NOT NULL
        );",
    )
    .unwrap();
    conn.execute_batch(&format!("PRAGMA user_version = {};", latest_version()))
        .unwrap();

    let result = SqliteProductRepository::try_new(&conn);
    assert!(matches!(
        result,
        Err(RepoError::MissingRequiredColumn {
            table: "products",
            column: "price"
        })
    ));
}
