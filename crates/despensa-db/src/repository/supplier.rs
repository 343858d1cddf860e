//! # Supplier Repository
//!
//! Supplier directory. Suppliers are soft-deleted (`active = 0`) because
//! purchases keep a hard foreign key to them.

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::debug;

use crate::error::{DbError, DbResult};
use despensa_core::Supplier;

const SUPPLIER_COLUMNS: &str = r#"
    id, name, contact, phone, email, category, payment_terms,
    address, website, tax_id, notes, active, created_at, updated_at
"#;

/// Repository for supplier database operations.
#[derive(Debug, Clone)]
pub struct SupplierRepository {
    pool: SqlitePool,
}

impl SupplierRepository {
    pub fn new(pool: SqlitePool) -> Self {
        SupplierRepository { pool }
    }

    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Supplier>> {
        let sql = format!("SELECT {SUPPLIER_COLUMNS} FROM suppliers WHERE id = ?1");

        let supplier = sqlx::query_as::<_, Supplier>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(supplier)
    }

    /// Lists suppliers alphabetically. `include_inactive` pulls in
    /// soft-deleted rows too.
    pub async fn list(&self, include_inactive: bool) -> DbResult<Vec<Supplier>> {
        let sql = if include_inactive {
            format!("SELECT {SUPPLIER_COLUMNS} FROM suppliers ORDER BY name")
        } else {
            format!("SELECT {SUPPLIER_COLUMNS} FROM suppliers WHERE active = 1 ORDER BY name")
        };

        let suppliers = sqlx::query_as::<_, Supplier>(&sql)
            .fetch_all(&self.pool)
            .await?;

        Ok(suppliers)
    }

    /// Lists active suppliers in a category, alphabetically.
    pub async fn list_by_category(&self, category: &str) -> DbResult<Vec<Supplier>> {
        let sql = format!(
            "SELECT {SUPPLIER_COLUMNS} FROM suppliers WHERE category = ?1 AND active = 1 ORDER BY name"
        );

        let suppliers = sqlx::query_as::<_, Supplier>(&sql)
            .bind(category)
            .fetch_all(&self.pool)
            .await?;

        Ok(suppliers)
    }

    pub async fn insert(&self, supplier: &Supplier) -> DbResult<Supplier> {
        debug!(id = %supplier.id, name = %supplier.name, "Inserting supplier");

        sqlx::query(
            r#"
            INSERT INTO suppliers (
                id, name, contact, phone, email, category, payment_terms,
                address, website, tax_id, notes, active, created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14)
            "#,
        )
        .bind(&supplier.id)
        .bind(&supplier.name)
        .bind(&supplier.contact)
        .bind(&supplier.phone)
        .bind(&supplier.email)
        .bind(&supplier.category)
        .bind(&supplier.payment_terms)
        .bind(&supplier.address)
        .bind(&supplier.website)
        .bind(&supplier.tax_id)
        .bind(&supplier.notes)
        .bind(supplier.active)
        .bind(supplier.created_at)
        .bind(supplier.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(supplier.clone())
    }

    pub async fn update(&self, supplier: &Supplier) -> DbResult<()> {
        debug!(id = %supplier.id, "Updating supplier");

        let result = sqlx::query(
            r#"
            UPDATE suppliers SET
                name = ?2,
                contact = ?3,
                phone = ?4,
                email = ?5,
                category = ?6,
                payment_terms = ?7,
                address = ?8,
                website = ?9,
                tax_id = ?10,
                notes = ?11,
                active = ?12,
                updated_at = ?13
            WHERE id = ?1
            "#,
        )
        .bind(&supplier.id)
        .bind(&supplier.name)
        .bind(&supplier.contact)
        .bind(&supplier.phone)
        .bind(&supplier.email)
        .bind(&supplier.category)
        .bind(&supplier.payment_terms)
        .bind(&supplier.address)
        .bind(&supplier.website)
        .bind(&supplier.tax_id)
        .bind(&supplier.notes)
        .bind(supplier.active)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Supplier", &supplier.id));
        }

        Ok(())
    }

    /// Soft-deletes a supplier so historical purchases keep resolving.
    pub async fn deactivate(&self, id: &str) -> DbResult<()> {
        debug!(id = %id, "Deactivating supplier");

        let result =
            sqlx::query("UPDATE suppliers SET active = 0, updated_at = ?2 WHERE id = ?1")
                .bind(id)
                .bind(Utc::now())
                .execute(&self.pool)
                .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Supplier", id));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};

    fn sample(id: &str, category: &str) -> Supplier {
        let now = Utc::now();
        Supplier {
            id: id.to_string(),
            name: "Distribuidora Norte".to_string(),
            contact: "Carlos".to_string(),
            phone: "11-5555-0000".to_string(),
            email: "ventas@norte.example".to_string(),
            category: category.to_string(),
            payment_terms: "30 días".to_string(),
            address: None,
            website: None,
            tax_id: Some("30-11111111-1".to_string()),
            notes: None,
            active: true,
            created_at: now,
            updated_at: now,
        }
    }

    #[tokio::test]
    async fn test_deactivate_hides_from_default_list() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.suppliers();

        repo.insert(&sample("sup1", "almacen")).await.unwrap();
        repo.deactivate("sup1").await.unwrap();

        assert!(repo.list(false).await.unwrap().is_empty());
        assert_eq!(repo.list(true).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_list_by_category() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.suppliers();

        repo.insert(&sample("sup1", "almacen")).await.unwrap();
        repo.insert(&sample("sup2", "fiambres")).await.unwrap();

        let fiambres = repo.list_by_category("fiambres").await.unwrap();
        assert_eq!(fiambres.len(), 1);
        assert_eq!(fiambres[0].id, "sup2");
    }
}
