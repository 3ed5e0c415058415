//! Scripted record-store walkthrough.
//!
//! # Responsibility
//! - Exercise the record store end to end against a local SQLite file:
//!   create/read/patch, hard vs soft vs permanent delete, relation loading.
//! - Keep the sequence fixed and flag-free; progress goes to the console
//!   log stream and the rolling log files.
//!
//! Startup failures (storage unreachable, migration failure) abort with a
//! non-zero exit status. Later operation failures are logged and the script
//! moves on.

use log::{error, info};
use rusqlite::Connection;
use shoebox_core::{
    default_log_level, init_logging, open_db, DeleteMode, Post, PostRepository, Product,
    ProductPatch, ProductRepository, RecordStore, Task, TaskPatch, TaskRepository, User,
    UserRepository,
};
use std::error::Error;
use std::process::ExitCode;

const DB_FILE: &str = "shoebox.db";
const LOG_DIR_NAME: &str = "logs";

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("shoebox: fatal: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<(), Box<dyn Error>> {
    let log_dir = std::env::current_dir()
        .map_err(|err| format!("cannot resolve working directory: {err}"))?
        .join(LOG_DIR_NAME);
    let log_dir = log_dir
        .to_str()
        .ok_or("log directory path is not valid UTF-8")?;
    init_logging(default_log_level(), log_dir)?;

    info!("opening database file {DB_FILE}");
    let conn = open_db(DB_FILE)?;
    let store = RecordStore::try_new(&conn)?;
    reset_demo_tables(&conn)?;

    product_walkthrough(&store);
    delete_walkthrough(&store);
    relation_walkthrough(&store);
    task_walkthrough(&store);

    info!("walkthrough finished, closing database");
    Ok(())
}

/// Unscoped wipe so repeated runs start from identical state, including the
/// id sequences. Posts go first: they reference users.
fn reset_demo_tables(conn: &Connection) -> rusqlite::Result<()> {
    for sql in [
        "DELETE FROM posts;",
        "DELETE FROM products;",
        "DELETE FROM users;",
        "DELETE FROM tasks;",
    ] {
        conn.execute(sql, [])?;
    }

    // sqlite_sequence only exists once an AUTOINCREMENT insert happened,
    // so a brand-new database has nothing to reset.
    let has_sequence: i64 = conn.query_row(
        "SELECT EXISTS(
            SELECT 1
            FROM sqlite_master
            WHERE type = 'table' AND name = 'sqlite_sequence'
        );",
        [],
        |row| row.get(0),
    )?;
    if has_sequence == 1 {
        conn.execute(
            "DELETE FROM sqlite_sequence
             WHERE name IN ('posts', 'products', 'users', 'tasks');",
            [],
        )?;
    }

    info!("demo tables reset");
    Ok(())
}

fn product_walkthrough(store: &RecordStore<'_>) {
    info!("--- products: create, read, patch, unique code ---");

    let mut product = Product::new("P001", 50);
    match store.products().create_product(&mut product) {
        Ok(id) => info!("product created id={id} code={} price={}", product.code, product.price),
        Err(err) => {
            error!("product create failed: {err}");
            return;
        }
    }

    match store.products().get_product(product.id, false) {
        Ok(Some(found)) => info!("product read back id={} price={}", found.id, found.price),
        Ok(None) => error!("product id={} missing right after create", product.id),
        Err(err) => error!("product read failed: {err}"),
    }

    let patch = ProductPatch {
        price: Some(150),
        ..ProductPatch::default()
    };
    match store.products().patch_product(product.id, &patch) {
        Ok(()) => match store.products().get_product(product.id, false) {
            Ok(Some(found)) => info!(
                "product patched id={} price={} code={} (code untouched)",
                found.id, found.price, found.code
            ),
            Ok(None) => error!("product id={} missing after patch", product.id),
            Err(err) => error!("product read failed: {err}"),
        },
        Err(err) => error!("product patch failed: {err}"),
    }

    let mut duplicate = Product::new("P001", 75);
    match store.products().create_product(&mut duplicate) {
        Err(err) => info!("duplicate product code rejected (expected): {err}"),
        Ok(id) => error!("duplicate product code accepted id={id} (unexpected)"),
    }
}

fn delete_walkthrough(store: &RecordStore<'_>) {
    info!("--- deletes: hard product, soft user, permanent user ---");

    let mut doomed = Product::new("HARDDEL", 10);
    if let Err(err) = store.products().create_product(&mut doomed) {
        error!("product create failed: {err}");
        return;
    }
    match store.products().delete_product(doomed.id, DeleteMode::Hard) {
        Ok(()) => info!("product id={} hard deleted", doomed.id),
        Err(err) => error!("product hard delete failed: {err}"),
    }
    match store.products().get_product(doomed.id, true) {
        Ok(None) => info!("product not found after hard delete, even unscoped (expected)"),
        Ok(Some(_)) => error!("product found after hard delete (unexpected)"),
        Err(err) => error!("product read failed: {err}"),
    }

    let mut soft_user = User::new("User Soft Delete", "softdelete@example.com");
    if let Err(err) = store.users().create_user(&mut soft_user) {
        error!("user create failed: {err}");
        return;
    }
    match store.users().delete_user(soft_user.id, DeleteMode::Soft) {
        Ok(()) => info!("user id={} soft deleted", soft_user.id),
        Err(err) => error!("user soft delete failed: {err}"),
    }
    match store.users().get_user(soft_user.id, false) {
        Ok(None) => info!("user not found by default read after soft delete (expected)"),
        Ok(Some(_)) => error!("user found after soft delete (unexpected)"),
        Err(err) => error!("user read failed: {err}"),
    }
    match store.users().get_user(soft_user.id, true) {
        Ok(Some(found)) => info!(
            "user found by unscoped read deleted_at={:?} (expected)",
            found.deleted_at
        ),
        Ok(None) => error!("user not found by unscoped read (unexpected)"),
        Err(err) => error!("user read failed: {err}"),
    }

    let mut perm_user = User::new("User Perm Delete", "permdelete@example.com");
    if let Err(err) = store.users().create_user(&mut perm_user) {
        error!("user create failed: {err}");
        return;
    }
    match store.users().delete_user(perm_user.id, DeleteMode::Hard) {
        Ok(()) => info!("user id={} permanently deleted", perm_user.id),
        Err(err) => error!("user permanent delete failed: {err}"),
    }
    match store.users().get_user(perm_user.id, true) {
        Ok(None) => info!("user not found after permanent delete (expected)"),
        Ok(Some(_)) => error!("user found after permanent delete (unexpected)"),
        Err(err) => error!("user read failed: {err}"),
    }
}

fn relation_walkthrough(store: &RecordStore<'_>) {
    info!("--- relations: has-many posts, belongs-to author ---");

    let mut users = vec![
        User::new("Alice", "alice@example.com"),
        User::new("Bob", "bob@example.com"),
    ];
    if let Err(err) = store.users().create_users(&mut users) {
        error!("user batch create failed: {err}");
        return;
    }
    let alice_id = users[0].id;
    let bob_id = users[1].id;

    let mut posts = vec![
        Post::new("P1", "first post", alice_id),
        Post::new("P2", "second post", alice_id),
        Post::new("P3", "third post", bob_id),
    ];
    if let Err(err) = store.posts().create_posts(&mut posts) {
        error!("post batch create failed: {err}");
        return;
    }

    match store.posts().posts_for_user(alice_id, false) {
        Ok(loaded) => {
            let titles: Vec<&str> = loaded.iter().map(|post| post.title.as_str()).collect();
            info!("posts loaded for user id={alice_id}: {titles:?}");
        }
        Err(err) => error!("has-many load failed: {err}"),
    }

    match store.user_with_posts(alice_id) {
        Ok(Some(bundle)) => info!(
            "user id={} loaded with {} posts",
            bundle.user.id,
            bundle.posts.len()
        ),
        Ok(None) => error!("user id={alice_id} missing (unexpected)"),
        Err(err) => error!("user-with-posts load failed: {err}"),
    }

    if let Err(err) = store.users().delete_user(bob_id, DeleteMode::Soft) {
        error!("user soft delete failed: {err}");
    }
    match store.posts().author_for_post(&posts[2]) {
        Ok(Some(author)) => info!(
            "belongs-to resolved soft-deleted author name={} deleted_at={:?}",
            author.name, author.deleted_at
        ),
        Ok(None) => error!("author missing for post id={} (unexpected)", posts[2].id),
        Err(err) => error!("belongs-to load failed: {err}"),
    }
}

fn task_walkthrough(store: &RecordStore<'_>) {
    info!("--- tasks: no soft-delete capability ---");

    let mut task = Task::new("write the walkthrough");
    if let Err(err) = store.tasks().create_task(&mut task) {
        error!("task create failed: {err}");
        return;
    }

    let patch = TaskPatch {
        done: Some(true),
        ..TaskPatch::default()
    };
    match store.tasks().patch_task(task.id, &patch) {
        Ok(()) => info!("task id={} marked done", task.id),
        Err(err) => error!("task patch failed: {err}"),
    }

    match store.tasks().delete_task(task.id, DeleteMode::Soft) {
        Ok(()) => info!("task id={} removed (soft delete degrades to hard)", task.id),
        Err(err) => error!("task delete failed: {err}"),
    }
    match store.tasks().get_task(task.id) {
        Ok(None) => info!("task not found after delete (expected)"),
        Ok(Some(_)) => error!("task found after delete (unexpected)"),
        Err(err) => error!("task read failed: {err}"),
    }
}
