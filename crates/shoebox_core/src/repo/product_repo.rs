//! Product repository contract and SQLite implementation.
//!
//! # Responsibility
//! - Provide stable CRUD APIs over the `products` table.
//! - Keep SQL details inside the persistence boundary.
//!
//! # Invariants
//! - Write paths must run model validation before SQL mutations.
//! - `code` uniqueness only binds among non-tombstoned rows; the engine
//!   enforces it via a partial unique index.
//! - Soft delete is idempotent and preserves the original tombstone time.

use crate::model::product::Product;
use crate::model::RecordId;
use crate::repo::query::{append_filters, append_order_and_page, ListQuery};
use crate::repo::{
    bool_to_int, ensure_schema_ready, ensure_table_ready, write_error, DeleteMode, RepoError,
    RepoResult,
};
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, Row};

const PRODUCT_SELECT_SQL: &str = "SELECT
    id,
    code,
    price,
    created_at,
    updated_at,
    deleted_at
FROM products";

const PRODUCT_COLUMNS: &[&str] = &["id", "code", "price", "created_at", "updated_at", "deleted_at"];

/// Partial update for a product; `None` fields keep their stored value.
#[derive(Debug, Clone, Default)]
pub struct ProductPatch {
    pub code: Option<String>,
    pub price: Option<i64>,
}

/// Repository interface for product CRUD operations.
pub trait ProductRepository {
    /// Inserts one product; populates its generated id and timestamps.
    fn create_product(&self, product: &mut Product) -> RepoResult<RecordId>;
    /// Inserts a batch, best effort: stops at the first error, earlier rows
    /// stay persisted.
    fn create_products(&self, products: &mut [Product]) -> RepoResult<()>;
    /// Gets one product by id with explicit deleted-row visibility.
    fn get_product(&self, id: RecordId, include_deleted: bool) -> RepoResult<Option<Product>>;
    /// Lists products using filter, order and pagination options.
    fn list_products(&self, query: &ListQuery) -> RepoResult<Vec<Product>>;
    /// Full replacement: every payload field overwrites, zero values included.
    fn update_product(&self, product: &Product) -> RepoResult<()>;
    /// Partial patch: only named fields overwrite.
    fn patch_product(&self, id: RecordId, patch: &ProductPatch) -> RepoResult<()>;
    /// Removes a product, tombstoning or permanently per `mode`.
    fn delete_product(&self, id: RecordId, mode: DeleteMode) -> RepoResult<()>;
    /// Clears the tombstone of a soft-deleted product.
    fn restore_product(&self, id: RecordId) -> RepoResult<()>;
}

/// SQLite-backed product repository.
pub struct SqliteProductRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteProductRepository<'conn> {
    /// Constructs a repository from a migrated/ready connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_schema_ready(conn)?;
        ensure_table_ready(conn, "products", PRODUCT_COLUMNS)?;
        Ok(Self { conn })
    }

    fn row_exists(&self, id: RecordId) -> RepoResult<bool> {
        let exists: i64 = self.conn.query_row(
            "SELECT EXISTS(SELECT 1 FROM products WHERE id = ?1);",
            [id],
            |row| row.get(0),
        )?;
        Ok(exists == 1)
    }
}

impl ProductRepository for SqliteProductRepository<'_> {
    fn create_product(&self, product: &mut Product) -> RepoResult<RecordId> {
        product.validate()?;

        self.conn
            .execute(
                "INSERT INTO products (code, price) VALUES (?1, ?2);",
                params![product.code.as_str(), product.price],
            )
            .map_err(|err| write_error("product", err))?;

        product.id = self.conn.last_insert_rowid();
        let (created_at, updated_at) = self.conn.query_row(
            "SELECT created_at, updated_at FROM products WHERE id = ?1;",
            [product.id],
            |row| Ok((row.get(0)?, row.get(1)?)),
        )?;
        product.created_at = created_at;
        product.updated_at = updated_at;
        product.deleted_at = None;

        Ok(product.id)
    }

    fn create_products(&self, products: &mut [Product]) -> RepoResult<()> {
        for product in products.iter_mut() {
            self.create_product(product)?;
        }
        Ok(())
    }

    fn get_product(&self, id: RecordId, include_deleted: bool) -> RepoResult<Option<Product>> {
        let mut stmt = self.conn.prepare(&format!(
            "{PRODUCT_SELECT_SQL}
             WHERE id = ?1
               AND (?2 = 1 OR deleted_at IS NULL);"
        ))?;

        let mut rows = stmt.query(params![id, bool_to_int(include_deleted)])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_product_row(row)?));
        }

        Ok(None)
    }

    fn list_products(&self, query: &ListQuery) -> RepoResult<Vec<Product>> {
        let mut sql = format!("{PRODUCT_SELECT_SQL} WHERE 1 = 1");
        let mut binds: Vec<Value> = Vec::new();

        if !query.include_deleted {
            sql.push_str(" AND deleted_at IS NULL");
        }
        append_filters(&mut sql, &mut binds, &query.filters, "products", PRODUCT_COLUMNS)?;
        append_order_and_page(&mut sql, &mut binds, query, "products", PRODUCT_COLUMNS)?;

        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = stmt.query(params_from_iter(binds))?;
        let mut products = Vec::new();

        while let Some(row) = rows.next()? {
            products.push(parse_product_row(row)?);
        }

        Ok(products)
    }

    fn update_product(&self, product: &Product) -> RepoResult<()> {
        product.validate()?;

        let changed = self
            .conn
            .execute(
                "UPDATE products
                 SET
                    code = ?1,
                    price = ?2,
                    updated_at = (strftime('%s', 'now') * 1000)
                 WHERE id = ?3
                   AND deleted_at IS NULL;",
                params![product.code.as_str(), product.price, product.id],
            )
            .map_err(|err| write_error("product", err))?;

        if changed == 0 {
            return Err(RepoError::NotFound {
                entity: "product",
                id: product.id,
            });
        }

        Ok(())
    }

    fn patch_product(&self, id: RecordId, patch: &ProductPatch) -> RepoResult<()> {
        let mut sql = String::from("UPDATE products SET ");
        let mut binds: Vec<Value> = Vec::new();

        if let Some(code) = &patch.code {
            Product::validate_code(code)?;
            sql.push_str("code = ?, ");
            binds.push(Value::Text(code.clone()));
        }
        if let Some(price) = patch.price {
            Product::validate_price(price)?;
            sql.push_str("price = ?, ");
            binds.push(Value::Integer(price));
        }

        sql.push_str(
            "updated_at = (strftime('%s', 'now') * 1000)
             WHERE id = ?
               AND deleted_at IS NULL;",
        );
        binds.push(Value::Integer(id));

        let changed = self
            .conn
            .execute(&sql, params_from_iter(binds))
            .map_err(|err| write_error("product", err))?;

        if changed == 0 {
            return Err(RepoError::NotFound {
                entity: "product",
                id,
            });
        }

        Ok(())
    }

    fn delete_product(&self, id: RecordId, mode: DeleteMode) -> RepoResult<()> {
        match mode {
            DeleteMode::Hard => {
                let changed = self
                    .conn
                    .execute("DELETE FROM products WHERE id = ?1;", [id])
                    .map_err(|err| write_error("product", err))?;
                if changed == 0 {
                    return Err(RepoError::NotFound {
                        entity: "product",
                        id,
                    });
                }
                Ok(())
            }
            DeleteMode::Soft => {
                let changed = self.conn.execute(
                    "UPDATE products
                     SET deleted_at = (strftime('%s', 'now') * 1000)
                     WHERE id = ?1
                       AND deleted_at IS NULL;",
                    [id],
                )?;
                if changed == 0 && !self.row_exists(id)? {
                    return Err(RepoError::NotFound {
                        entity: "product",
                        id,
                    });
                }
                Ok(())
            }
        }
    }

    fn restore_product(&self, id: RecordId) -> RepoResult<()> {
        let changed = self
            .conn
            .execute(
                "UPDATE products
                 SET
                    deleted_at = NULL,
                    updated_at = (strftime('%s', 'now') * 1000)
                 WHERE id = ?1
                   AND deleted_at IS NOT NULL;",
                [id],
            )
            .map_err(|err| write_error("product", err))?;

        if changed == 0 && !self.row_exists(id)? {
            return Err(RepoError::NotFound {
                entity: "product",
                id,
            });
        }

        Ok(())
    }
}

fn parse_product_row(row: &Row<'_>) -> RepoResult<Product> {
    let product = Product {
        id: row.get("id")?,
        code: row.get("code")?,
        price: row.get("price")?,
        created_at: row.get("created_at")?,
        updated_at: row.get("updated_at")?,
        deleted_at: row.get("deleted_at")?,
    };
    product.validate()?;
    Ok(product)
}
