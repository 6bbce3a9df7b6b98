//! # Product Repository
//!
//! Database operations for products (bar stock).
//!
//! ## Availability Inputs
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                 What a product row contributes                          │
//! │                                                                         │
//! │   is_available  stock     →  available?                                 │
//! │   ───────────── ───────      ──────────                                 │
//! │   any           Some(n>0) →  yes                                        │
//! │   any           Some(0)   →  no                                         │
//! │   true          None      →  yes                                        │
//! │   false         None      →  no                                         │
//! │                                                                         │
//! │  Only the two inputs are stored. Every reader recomputes the answer.   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::debug;

use crate::error::{DbError, DbResult};
use taproom_core::validation::validate_stock;
use taproom_core::Product;

const PRODUCT_COLUMNS: &str =
    "id, name, category, is_available, stock, created_at, updated_at";

/// Repository for product database operations.
///
/// ## Usage
/// ```rust,ignore
/// let repo = ProductRepository::new(pool);
///
/// repo.set_stock(&lime_id, Some(0)).await?;
/// let lime = repo.get_by_id(&lime_id).await?;
/// ```
#[derive(Debug, Clone)]
pub struct ProductRepository {
    pool: SqlitePool,
}

impl ProductRepository {
    /// Creates a new ProductRepository.
    pub fn new(pool: SqlitePool) -> Self {
        ProductRepository { pool }
    }

    /// Gets a product by its ID.
    ///
    /// ## Returns
    /// * `Ok(Some(Product))` - Product found
    /// * `Ok(None)` - Product not found
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Product>> {
        let sql = format!("SELECT {PRODUCT_COLUMNS} FROM products WHERE id = ?1");

        let product = sqlx::query_as::<_, Product>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(product)
    }

    /// Lists all products sorted by category, then name.
    pub async fn list(&self) -> DbResult<Vec<Product>> {
        let sql = format!("SELECT {PRODUCT_COLUMNS} FROM products ORDER BY category, name");

        let products = sqlx::query_as::<_, Product>(&sql)
            .fetch_all(&self.pool)
            .await?;

        Ok(products)
    }

    /// Inserts a new product.
    ///
    /// ## Returns
    /// * `Ok(Product)` - The inserted product
    /// * `Err(DbError::Validation)` - Negative stock
    pub async fn insert(&self, product: &Product) -> DbResult<Product> {
        debug!(name = %product.name, "Inserting product");

        validate_stock(product.stock)?;

        sqlx::query(
            r#"
            INSERT INTO products (
                id, name, category, is_available, stock, created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            "#,
        )
        .bind(&product.id)
        .bind(&product.name)
        .bind(&product.category)
        .bind(product.is_available)
        .bind(product.stock)
        .bind(product.created_at)
        .bind(product.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(product.clone())
    }

    /// Sets or clears the stock counter.
    ///
    /// `None` hands the decision back to the manual `is_available` flag.
    ///
    /// ## Returns
    /// * `Ok(Product)` - The product after the write
    /// * `Err(DbError::Validation)` - Negative stock
    /// * `Err(DbError::NotFound)` - Product doesn't exist
    pub async fn set_stock(&self, id: &str, stock: Option<i64>) -> DbResult<Product> {
        debug!(id = %id, ?stock, "Setting product stock");

        validate_stock(stock)?;

        let result = sqlx::query("UPDATE products SET stock = ?2, updated_at = ?3 WHERE id = ?1")
            .bind(id)
            .bind(stock)
            .bind(Utc::now())
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Product", id));
        }

        self.get_by_id(id)
            .await?
            .ok_or_else(|| DbError::not_found("Product", id))
    }

    /// Flips the manual availability switch.
    ///
    /// Has no visible effect while a stock counter is present.
    pub async fn set_available(&self, id: &str, is_available: bool) -> DbResult<Product> {
        debug!(id = %id, is_available, "Setting product availability flag");

        let result =
            sqlx::query("UPDATE products SET is_available = ?2, updated_at = ?3 WHERE id = ?1")
                .bind(id)
                .bind(is_available)
                .bind(Utc::now())
                .execute(&self.pool)
                .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Product", id));
        }

        self.get_by_id(id)
            .await?
            .ok_or_else(|| DbError::not_found("Product", id))
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use crate::pool::{Database, DbConfig};
    use crate::repository::test_support::product;
    use crate::DbError;

    #[tokio::test]
    async fn test_insert_and_get() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.products();

        let gin = product("Gin", true, None);
        repo.insert(&gin).await.unwrap();

        let loaded = repo.get_by_id(&gin.id).await.unwrap().unwrap();
        assert_eq!(loaded.name, "Gin");
        assert!(loaded.is_available);
        assert_eq!(loaded.stock, None);
        assert!(loaded.is_available_now());

        assert!(repo.get_by_id("missing").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_stock_overrides_flag() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.products();

        let lime = product("Lime", false, None);
        repo.insert(&lime).await.unwrap();
        assert!(!repo.get_by_id(&lime.id).await.unwrap().unwrap().is_available_now());

        let updated = repo.set_stock(&lime.id, Some(3)).await.unwrap();
        assert!(updated.is_available_now());

        let updated = repo.set_stock(&lime.id, Some(0)).await.unwrap();
        assert!(!updated.is_available_now());

        // Clearing the counter falls back to the flag
        repo.set_available(&lime.id, true).await.unwrap();
        let updated = repo.set_stock(&lime.id, None).await.unwrap();
        assert!(updated.is_available_now());
    }

    #[tokio::test]
    async fn test_negative_stock_rejected() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.products();

        let mint = product("Mint", true, Some(2));
        repo.insert(&mint).await.unwrap();

        let err = repo.set_stock(&mint.id, Some(-1)).await.unwrap_err();
        assert!(matches!(err, DbError::Validation(_)));
        assert_eq!(repo.get_by_id(&mint.id).await.unwrap().unwrap().stock, Some(2));
    }

    #[tokio::test]
    async fn test_updates_on_missing_product() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.products();

        assert!(matches!(
            repo.set_stock("nope", Some(1)).await,
            Err(DbError::NotFound { .. })
        ));
        assert!(matches!(
            repo.set_available("nope", true).await,
            Err(DbError::NotFound { .. })
        ));
    }

    #[tokio::test]
    async fn test_list_sorted() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.products();

        let mut tonic = product("Tonic", true, None);
        tonic.category = "mixers".to_string();
        let mut gin = product("Gin", true, None);
        gin.category = "spirits".to_string();
        let mut soda = product("Soda", true, None);
        soda.category = "mixers".to_string();

        for p in [&tonic, &gin, &soda] {
            repo.insert(p).await.unwrap();
        }

        let names: Vec<String> = repo.list().await.unwrap().into_iter().map(|p| p.name).collect();
        assert_eq!(names, vec!["Soda", "Tonic", "Gin"]);
    }
}
