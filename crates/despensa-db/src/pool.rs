//! # Connection Pool Management
//!
//! SQLite connection pool and the [`Database`] handle the rest of the
//! system works through.
//!
//! ## Pragmas
//! - `journal_mode = WAL`: readers never block the writer
//! - `synchronous = NORMAL`: safe with WAL, much faster than FULL
//! - `foreign_keys = ON`: SQLite ships with it off

use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous};
use sqlx::SqlitePool;
use tracing::info;

use crate::error::{DbError, DbResult};
use crate::ledger::StockLedger;
use crate::migrations::run_migrations;
use crate::repository::{
    BulkItemRepository, BulkSaleRepository, NoteRepository, ProductRepository,
    PromotionRepository, PurchaseRepository, SaleRepository, SupplierRepository,
    WriteOffRepository,
};

/// Database configuration.
#[derive(Debug, Clone)]
pub struct DbConfig {
    /// Path to the SQLite file, or `:memory:` for tests.
    pub path: PathBuf,
    /// Maximum number of pooled connections.
    pub max_connections: u32,
    /// Time to wait for a free connection before giving up.
    pub acquire_timeout: Duration,
    /// Create the database file if it does not exist.
    pub create_if_missing: bool,
}

impl Default for DbConfig {
    fn default() -> Self {
        DbConfig {
            path: PathBuf::from("despensa.db"),
            max_connections: 5,
            acquire_timeout: Duration::from_secs(5),
            create_if_missing: true,
        }
    }
}

impl DbConfig {
    /// Configuration pointing at a file path.
    pub fn new(path: impl AsRef<Path>) -> Self {
        DbConfig {
            path: path.as_ref().to_path_buf(),
            ..Default::default()
        }
    }

    /// In-memory database for tests. Single connection, because each
    /// SQLite `:memory:` connection is its own database.
    pub fn in_memory() -> Self {
        DbConfig {
            path: PathBuf::from(":memory:"),
            max_connections: 1,
            ..Default::default()
        }
    }
}

/// Handle to the POS database: owns the pool and hands out repositories.
///
/// Cloning is cheap (the pool is internally reference-counted), so the
/// engine clones it freely across tasks.
#[derive(Debug, Clone)]
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    /// Opens the database, applies pragmas and runs pending migrations.
    pub async fn new(config: DbConfig) -> DbResult<Self> {
        info!(path = %config.path.display(), "Opening database");

        let options = SqliteConnectOptions::from_str(&format!("sqlite:{}", config.path.display()))
            .map_err(|e| DbError::ConnectionFailed(e.to_string()))?
            .create_if_missing(config.create_if_missing)
            .journal_mode(SqliteJournalMode::Wal)
            .synchronous(SqliteSynchronous::Normal)
            .foreign_keys(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(config.acquire_timeout)
            .connect_with(options)
            .await
            .map_err(|e| DbError::ConnectionFailed(e.to_string()))?;

        run_migrations(&pool).await?;

        info!("Database ready");
        Ok(Database { pool })
    }

    /// Raw pool access for callers that need custom queries.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    // ## Repository accessors

    pub fn products(&self) -> ProductRepository {
        ProductRepository::new(self.pool.clone())
    }

    pub fn bulk_items(&self) -> BulkItemRepository {
        BulkItemRepository::new(self.pool.clone())
    }

    pub fn sales(&self) -> SaleRepository {
        SaleRepository::new(self.pool.clone())
    }

    pub fn write_offs(&self) -> WriteOffRepository {
        WriteOffRepository::new(self.pool.clone())
    }

    pub fn bulk_sales(&self) -> BulkSaleRepository {
        BulkSaleRepository::new(self.pool.clone())
    }

    pub fn promotions(&self) -> PromotionRepository {
        PromotionRepository::new(self.pool.clone())
    }

    pub fn suppliers(&self) -> SupplierRepository {
        SupplierRepository::new(self.pool.clone())
    }

    pub fn purchases(&self) -> PurchaseRepository {
        PurchaseRepository::new(self.pool.clone())
    }

    pub fn notes(&self) -> NoteRepository {
        NoteRepository::new(self.pool.clone())
    }

    /// Shared stock ledger over products and bulk items.
    pub fn ledger(&self) -> StockLedger {
        StockLedger::new(self.pool.clone())
    }

    /// Verifies the connection is alive.
    pub async fn health_check(&self) -> DbResult<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    /// Closes all pool connections. Call on shutdown so WAL checkpoints
    /// flush cleanly.
    pub async fn close(&self) {
        info!("Closing database pool");
        self.pool.close().await;
    }
}
