use shoebox_core::{Post, Product, RecordValidationError, Task, User};

#[test]
fn product_new_sets_defaults() {
    let product = Product::new("P001", 50);

    assert_eq!(product.id, 0);
    assert_eq!(product.code, "P001");
    assert_eq!(product.price, 50);
    assert_eq!(product.created_at, 0);
    assert_eq!(product.updated_at, 0);
    assert_eq!(product.deleted_at, None);
    assert!(product.is_active());
}

#[test]
fn product_validation_rejects_bad_code_and_price() {
    let empty = Product::new("  ", 10);
    assert_eq!(
        empty.validate().unwrap_err(),
        RecordValidationError::MissingProductCode
    );

    let long = Product::new("CODE-TOO-LONG", 10);
    assert_eq!(
        long.validate().unwrap_err(),
        RecordValidationError::ProductCodeTooLong {
            max: 10,
            actual: 13,
        }
    );

    let negative = Product::new("P001", -5);
    assert_eq!(
        negative.validate().unwrap_err(),
        RecordValidationError::NegativePrice(-5)
    );
}

#[test]
fn user_validation_requires_name_and_email() {
    let unnamed = User::new("", "a@example.com");
    assert_eq!(
        unnamed.validate().unwrap_err(),
        RecordValidationError::MissingUserName
    );

    let unaddressed = User::new("Alice", " ");
    assert_eq!(
        unaddressed.validate().unwrap_err(),
        RecordValidationError::MissingUserEmail
    );

    assert!(User::new("Alice", "a@example.com").validate().is_ok());
}

#[test]
fn post_validation_requires_title_and_author() {
    let untitled = Post::new("", "body", 1);
    assert_eq!(
        untitled.validate().unwrap_err(),
        RecordValidationError::MissingPostTitle
    );

    let orphan = Post::new("title", "body", 0);
    assert_eq!(
        orphan.validate().unwrap_err(),
        RecordValidationError::MissingPostAuthor
    );

    assert!(Post::new("title", "", 1).validate().is_ok());
}

#[test]
fn task_validation_requires_description() {
    let blank = Task::new("   ");
    assert_eq!(
        blank.validate().unwrap_err(),
        RecordValidationError::MissingTaskDescription
    );

    let task = Task::new("do the thing");
    assert!(!task.done);
    assert!(task.validate().is_ok());
}

#[test]
fn product_serialization_uses_expected_wire_fields() {
    let mut product = Product::new("P001", 50);
    product.id = 7;
    product.created_at = 1_700_000_000_000;
    product.updated_at = 1_700_000_360_000;

    let json = serde_json::to_value(&product).unwrap();
    assert_eq!(json["id"], 7);
    assert_eq!(json["code"], "P001");
    assert_eq!(json["price"], 50);
    assert_eq!(json["created_at"], 1_700_000_000_000_i64);
    assert_eq!(json["updated_at"], 1_700_000_360_000_i64);
    assert_eq!(json["deleted_at"], serde_json::Value::Null);

    let decoded: Product = serde_json::from_value(json).unwrap();
    assert_eq!(decoded, product);
}
