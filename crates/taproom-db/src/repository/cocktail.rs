//! # Cocktail Repository
//!
//! Database operations for cocktails and their recipes.
//!
//! Every read joins the ingredient links with the *current* product rows, so
//! the returned [`Cocktail`] carries exactly the state needed to recompute
//! availability. Nothing derived is written back.
//!
//! ```text
//! cocktails ──┐
//!             ├── cocktail_ingredients ── products (is_available, stock)
//!             │        position, is_required
//!             ▼
//!        Cocktail { ingredients: [IngredientLink..] }  →  is_available_now()
//! ```

use chrono::{DateTime, Utc};
use sqlx::{SqliteConnection, SqlitePool};
use std::collections::HashMap;
use tracing::debug;

use crate::error::{DbError, DbResult};
use taproom_core::{Cocktail, IngredientLink};

const LINK_SELECT: &str = r#"
    SELECT
        ci.cocktail_id,
        ci.product_id,
        p.name AS product_name,
        ci.position,
        ci.is_required,
        p.is_available AS product_is_available,
        p.stock AS product_stock
    FROM cocktail_ingredients ci
    INNER JOIN products p ON p.id = ci.product_id
"#;

/// Cocktail row without its recipe.
#[derive(Debug, sqlx::FromRow)]
struct CocktailRow {
    id: String,
    name: String,
    description: Option<String>,
    price_cents: i64,
    is_enabled: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl CocktailRow {
    fn with_ingredients(self, ingredients: Vec<IngredientLink>) -> Cocktail {
        Cocktail {
            id: self.id,
            name: self.name,
            description: self.description,
            price_cents: self.price_cents,
            is_enabled: self.is_enabled,
            ingredients,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

/// Ingredient link tagged with its owning cocktail, for batched loads.
#[derive(Debug, sqlx::FromRow)]
struct LinkRow {
    cocktail_id: String,
    #[sqlx(flatten)]
    link: IngredientLink,
}

/// Loads one cocktail with its recipe on an existing connection.
///
/// Shared with the order repository so the orderability check reads inside
/// the same transaction as the insert.
pub(crate) async fn load_cocktail(
    conn: &mut SqliteConnection,
    id: &str,
) -> DbResult<Option<Cocktail>> {
    let row = sqlx::query_as::<_, CocktailRow>(
        r#"
        SELECT id, name, description, price_cents, is_enabled, created_at, updated_at
        FROM cocktails
        WHERE id = ?1
        "#,
    )
    .bind(id)
    .fetch_optional(&mut *conn)
    .await?;

    let Some(row) = row else {
        return Ok(None);
    };

    let sql = format!("{LINK_SELECT} WHERE ci.cocktail_id = ?1 ORDER BY ci.position, p.name");
    let links = sqlx::query_as::<_, LinkRow>(&sql)
        .bind(id)
        .fetch_all(&mut *conn)
        .await?;

    Ok(Some(
        row.with_ingredients(links.into_iter().map(|r| r.link).collect()),
    ))
}

/// Repository for cocktail database operations.
#[derive(Debug, Clone)]
pub struct CocktailRepository {
    pool: SqlitePool,
}

impl CocktailRepository {
    /// Creates a new CocktailRepository.
    pub fn new(pool: SqlitePool) -> Self {
        CocktailRepository { pool }
    }

    /// Gets a cocktail by ID, recipe joined with current product state.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Cocktail>> {
        let mut conn = self.pool.acquire().await?;
        load_cocktail(&mut conn, id).await
    }

    /// Lists every cocktail, sorted by name.
    ///
    /// Two queries regardless of menu size: one for cocktails, one for all
    /// links, grouped in memory.
    pub async fn list(&self) -> DbResult<Vec<Cocktail>> {
        let rows = sqlx::query_as::<_, CocktailRow>(
            r#"
            SELECT id, name, description, price_cents, is_enabled, created_at, updated_at
            FROM cocktails
            ORDER BY name
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        let sql = format!("{LINK_SELECT} ORDER BY ci.cocktail_id, ci.position, p.name");
        let links = sqlx::query_as::<_, LinkRow>(&sql)
            .fetch_all(&self.pool)
            .await?;

        Ok(assemble(rows, links))
    }

    /// Lists cocktails whose recipe references the given product.
    ///
    /// These are the cocktails whose availability may change when the
    /// product's stock or flag changes.
    pub async fn list_using_product(&self, product_id: &str) -> DbResult<Vec<Cocktail>> {
        let rows = sqlx::query_as::<_, CocktailRow>(
            r#"
            SELECT c.id, c.name, c.description, c.price_cents, c.is_enabled,
                   c.created_at, c.updated_at
            FROM cocktails c
            WHERE c.id IN (
                SELECT cocktail_id FROM cocktail_ingredients WHERE product_id = ?1
            )
            ORDER BY c.name
            "#,
        )
        .bind(product_id)
        .fetch_all(&self.pool)
        .await?;

        let sql = format!(
            "{LINK_SELECT} WHERE ci.cocktail_id IN (
                SELECT cocktail_id FROM cocktail_ingredients WHERE product_id = ?1
            )
            ORDER BY ci.cocktail_id, ci.position, p.name"
        );
        let links = sqlx::query_as::<_, LinkRow>(&sql)
            .bind(product_id)
            .fetch_all(&self.pool)
            .await?;

        Ok(assemble(rows, links))
    }

    /// Inserts a cocktail and its recipe in one transaction.
    ///
    /// Only `product_id`, `position` and `is_required` of each link are
    /// stored. Returns the cocktail as read back, with product state joined.
    ///
    /// ## Errors
    /// * `DbError::ForeignKeyViolation` - A link names an unknown product
    pub async fn insert(&self, cocktail: &Cocktail) -> DbResult<Cocktail> {
        debug!(name = %cocktail.name, links = cocktail.ingredients.len(), "Inserting cocktail");

        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            INSERT INTO cocktails (
                id, name, description, price_cents, is_enabled, created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            "#,
        )
        .bind(&cocktail.id)
        .bind(&cocktail.name)
        .bind(&cocktail.description)
        .bind(cocktail.price_cents)
        .bind(cocktail.is_enabled)
        .bind(cocktail.created_at)
        .bind(cocktail.updated_at)
        .execute(&mut *tx)
        .await?;

        for link in &cocktail.ingredients {
            sqlx::query(
                r#"
                INSERT INTO cocktail_ingredients (cocktail_id, product_id, position, is_required)
                VALUES (?1, ?2, ?3, ?4)
                "#,
            )
            .bind(&cocktail.id)
            .bind(&link.product_id)
            .bind(link.position)
            .bind(link.is_required)
            .execute(&mut *tx)
            .await?;
        }

        let stored = load_cocktail(&mut tx, &cocktail.id)
            .await?
            .ok_or_else(|| DbError::not_found("Cocktail", &cocktail.id))?;

        tx.commit().await?;

        Ok(stored)
    }

    /// Flips the staff enable switch and returns the updated cocktail.
    pub async fn set_enabled(&self, id: &str, is_enabled: bool) -> DbResult<Cocktail> {
        debug!(id = %id, is_enabled, "Setting cocktail enabled flag");

        let result =
            sqlx::query("UPDATE cocktails SET is_enabled = ?2, updated_at = ?3 WHERE id = ?1")
                .bind(id)
                .bind(is_enabled)
                .bind(Utc::now())
                .execute(&self.pool)
                .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Cocktail", id));
        }

        self.get_by_id(id)
            .await?
            .ok_or_else(|| DbError::not_found("Cocktail", id))
    }
}

/// Attaches grouped links to their cocktail rows, keeping row order.
fn assemble(rows: Vec<CocktailRow>, links: Vec<LinkRow>) -> Vec<Cocktail> {
    let mut by_cocktail: HashMap<String, Vec<IngredientLink>> = HashMap::new();
    for row in links {
        by_cocktail.entry(row.cocktail_id).or_default().push(row.link);
    }

    rows.into_iter()
        .map(|row| {
            let ingredients = by_cocktail.remove(&row.id).unwrap_or_default();
            row.with_ingredients(ingredients)
        })
        .collect()
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use crate::pool::{Database, DbConfig};
    use crate::repository::test_support::{cocktail, link, product, seed_menu};
    use crate::DbError;

    #[tokio::test]
    async fn test_get_joins_current_product_state() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let (drink, gin, _tonic, _lime) = seed_menu(&db).await;

        let loaded = db.cocktails().get_by_id(&drink.id).await.unwrap().unwrap();
        let names: Vec<&str> = loaded
            .ingredients
            .iter()
            .map(|l| l.product_name.as_str())
            .collect();
        assert_eq!(names, vec!["Gin", "Tonic", "Lime"]);
        assert!(loaded.is_available_now());

        // Running out of a required ingredient shows up on the next read
        db.products().set_stock(&gin.id, Some(0)).await.unwrap();
        let loaded = db.cocktails().get_by_id(&drink.id).await.unwrap().unwrap();
        assert!(!loaded.is_available_now());
    }

    #[tokio::test]
    async fn test_optional_ingredient_does_not_gate() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let (drink, _gin, _tonic, lime) = seed_menu(&db).await;

        db.products().set_available(&lime.id, false).await.unwrap();
        let loaded = db.cocktails().get_by_id(&drink.id).await.unwrap().unwrap();
        assert!(loaded.is_available_now());
    }

    #[tokio::test]
    async fn test_disabled_cocktail_unavailable() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let (drink, ..) = seed_menu(&db).await;

        let updated = db.cocktails().set_enabled(&drink.id, false).await.unwrap();
        assert!(!updated.is_enabled);
        assert!(!updated.is_available_now());

        assert!(matches!(
            db.cocktails().set_enabled("missing", true).await,
            Err(DbError::NotFound { .. })
        ));
    }

    #[tokio::test]
    async fn test_list_and_list_using_product() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let (drink, gin, tonic, _lime) = seed_menu(&db).await;

        let vodka = product("Vodka", true, None);
        db.products().insert(&vodka).await.unwrap();
        let mule = db
            .cocktails()
            .insert(&cocktail("Mule", vec![link(&vodka, 0, true)]))
            .await
            .unwrap();

        let all = db.cocktails().list().await.unwrap();
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].id, drink.id);
        assert_eq!(all[0].ingredients.len(), 3);
        assert_eq!(all[1].id, mule.id);
        assert_eq!(all[1].ingredients.len(), 1);

        let using_gin = db.cocktails().list_using_product(&gin.id).await.unwrap();
        assert_eq!(using_gin.len(), 1);
        assert_eq!(using_gin[0].id, drink.id);
        // The full recipe comes back, not just the matching link
        assert_eq!(using_gin[0].ingredients.len(), 3);

        assert_eq!(db.cocktails().list_using_product(&tonic.id).await.unwrap().len(), 1);
        assert!(db.cocktails().list_using_product("nope").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_insert_with_unknown_product_rolls_back() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();

        let ghost = product("Ghost", true, None);
        let drink = cocktail("Phantom", vec![link(&ghost, 0, true)]);

        let err = db.cocktails().insert(&drink).await.unwrap_err();
        assert!(matches!(err, DbError::ForeignKeyViolation(_)));
        assert!(db.cocktails().get_by_id(&drink.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_cocktail_without_ingredients() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();

        let water = db.cocktails().insert(&cocktail("Water", vec![])).await.unwrap();
        assert!(water.ingredients.is_empty());
        assert!(water.is_available_now());
    }
}
