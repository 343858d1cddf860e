//! # Product Repository
//!
//! Database operations for discrete-unit products.
//!
//! Stock levels are read here but only mutated through the
//! [`crate::ledger::StockLedger`]; `update` deliberately leaves the
//! `stock` column alone.

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::debug;

use crate::error::{DbError, DbResult};
use despensa_core::Product;

/// Repository for product database operations.
#[derive(Debug, Clone)]
pub struct ProductRepository {
    pool: SqlitePool,
}

impl ProductRepository {
    pub fn new(pool: SqlitePool) -> Self {
        ProductRepository { pool }
    }

    /// Gets a product by its ID.
    ///
    /// ## Returns
    /// * `Ok(Some(Product))` - found
    /// * `Ok(None)` - no such product
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Product>> {
        let product = sqlx::query_as::<_, Product>(
            r#"
            SELECT id, category, description, barcode, price_cents, stock,
                   created_at, updated_at
            FROM products
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(product)
    }

    /// Gets a product by barcode, for scanner lookups.
    pub async fn get_by_barcode(&self, barcode: &str) -> DbResult<Option<Product>> {
        let product = sqlx::query_as::<_, Product>(
            r#"
            SELECT id, category, description, barcode, price_cents, stock,
                   created_at, updated_at
            FROM products
            WHERE barcode = ?1
            "#,
        )
        .bind(barcode)
        .fetch_optional(&self.pool)
        .await?;

        Ok(product)
    }

    /// Lists all products, newest first.
    pub async fn list(&self) -> DbResult<Vec<Product>> {
        let products = sqlx::query_as::<_, Product>(
            r#"
            SELECT id, category, description, barcode, price_cents, stock,
                   created_at, updated_at
            FROM products
            ORDER BY created_at DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(products)
    }

    /// Lists products in a category, alphabetically.
    pub async fn list_by_category(&self, category: &str) -> DbResult<Vec<Product>> {
        let products = sqlx::query_as::<_, Product>(
            r#"
            SELECT id, category, description, barcode, price_cents, stock,
                   created_at, updated_at
            FROM products
            WHERE category = ?1
            ORDER BY description
            "#,
        )
        .bind(category)
        .fetch_all(&self.pool)
        .await?;

        Ok(products)
    }

    /// Lists products whose stock is at or below `threshold`, lowest first.
    pub async fn list_low_stock(&self, threshold: i64) -> DbResult<Vec<Product>> {
        let products = sqlx::query_as::<_, Product>(
            r#"
            SELECT id, category, description, barcode, price_cents, stock,
                   created_at, updated_at
            FROM products
            WHERE stock <= ?1
            ORDER BY stock ASC
            "#,
        )
        .bind(threshold)
        .fetch_all(&self.pool)
        .await?;

        Ok(products)
    }

    /// Inserts a new product.
    ///
    /// ## Returns
    /// * `Err(DbError::UniqueViolation)` - id (or barcode index) collision
    pub async fn insert(&self, product: &Product) -> DbResult<Product> {
        debug!(id = %product.id, description = %product.description, "Inserting product");

        sqlx::query(
            r#"
            INSERT INTO products (
                id, category, description, barcode, price_cents, stock,
                created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
            "#,
        )
        .bind(&product.id)
        .bind(&product.category)
        .bind(&product.description)
        .bind(&product.barcode)
        .bind(product.price_cents)
        .bind(product.stock)
        .bind(product.created_at)
        .bind(product.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(product.clone())
    }

    /// Updates a product's catalog fields. Stock is not touched; that goes
    /// through the ledger.
    pub async fn update(&self, product: &Product) -> DbResult<()> {
        debug!(id = %product.id, "Updating product");

        let result = sqlx::query(
            r#"
            UPDATE products SET
                category = ?2,
                description = ?3,
                barcode = ?4,
                price_cents = ?5,
                updated_at = ?6
            WHERE id = ?1
            "#,
        )
        .bind(&product.id)
        .bind(&product.category)
        .bind(&product.description)
        .bind(&product.barcode)
        .bind(product.price_cents)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Product", &product.id));
        }

        Ok(())
    }

    /// Deletes a product. Historical sale and write-off records that
    /// reference it survive (snapshot pattern, no FK).
    pub async fn delete(&self, id: &str) -> DbResult<()> {
        debug!(id = %id, "Deleting product");

        let result = sqlx::query("DELETE FROM products WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Product", id));
        }

        Ok(())
    }

    /// Counts products (for diagnostics).
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM products")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};

    fn sample(id: &str, stock: i64) -> Product {
        let now = Utc::now();
        Product {
            id: id.to_string(),
            category: "almacen".to_string(),
            description: "Arroz 1kg".to_string(),
            barcode: Some("7790000000001".to_string()),
            price_cents: 1800,
            stock,
            created_at: now,
            updated_at: now,
        }
    }

    #[tokio::test]
    async fn test_insert_and_get() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.products();

        repo.insert(&sample("p1", 10)).await.unwrap();

        let found = repo.get_by_id("p1").await.unwrap().unwrap();
        assert_eq!(found.description, "Arroz 1kg");
        assert_eq!(found.stock, 10);
        assert!(repo.get_by_id("missing").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_get_by_barcode() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.products();
        repo.insert(&sample("p1", 10)).await.unwrap();

        let found = repo.get_by_barcode("7790000000001").await.unwrap().unwrap();
        assert_eq!(found.id, "p1");
    }

    #[tokio::test]
    async fn test_update_preserves_stock() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.products();
        repo.insert(&sample("p1", 7)).await.unwrap();

        let mut edited = sample("p1", 0);
        edited.price_cents = 2100;
        edited.stock = 9999; // must be ignored
        repo.update(&edited).await.unwrap();

        let found = repo.get_by_id("p1").await.unwrap().unwrap();
        assert_eq!(found.price_cents, 2100);
        assert_eq!(found.stock, 7);
    }

    #[tokio::test]
    async fn test_delete_missing_is_not_found() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let err = db.products().delete("ghost").await.unwrap_err();
        assert!(matches!(err, DbError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_list_low_stock() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.products();

        let mut a = sample("a", 2);
        a.barcode = None;
        let mut b = sample("b", 50);
        b.barcode = None;
        repo.insert(&a).await.unwrap();
        repo.insert(&b).await.unwrap();

        let low = repo.list_low_stock(10).await.unwrap();
        assert_eq!(low.len(), 1);
        assert_eq!(low[0].id, "a");
    }
}
