//! Inventory service.
//!
//! Staff switches on products and cocktails. Every change is followed by an
//! `inventory:updated` notification carrying the recomputed availability of
//! whatever the change can affect.
//!
//! ```text
//! set_stock / set_available ──► product + every cocktail using it
//! set_cocktail_enabled      ──► that cocktail
//! ```

use serde::Serialize;
use taproom_core::{Cocktail, Product, User};
use taproom_db::Database;
use taproom_hub::{topic, EventKind, Notification, NotificationHub};
use tracing::{debug, info, warn};

use super::order_service::require_staff;
use crate::error::ServiceResult;

/// A product with its availability at read time.
#[derive(Debug, Clone, Serialize)]
pub struct ProductState {
    #[serde(flatten)]
    pub product: Product,
    pub available: bool,
}

impl From<Product> for ProductState {
    fn from(product: Product) -> Self {
        let available = product.is_available_now();
        ProductState { product, available }
    }
}

/// A menu entry with its availability at read time.
#[derive(Debug, Clone, Serialize)]
pub struct MenuItem {
    #[serde(flatten)]
    pub cocktail: Cocktail,
    pub available: bool,
}

impl From<Cocktail> for MenuItem {
    fn from(cocktail: Cocktail) -> Self {
        let available = cocktail.is_available_now();
        MenuItem {
            cocktail,
            available,
        }
    }
}

#[derive(Debug, Serialize)]
struct CocktailAvailability<'a> {
    id: &'a str,
    name: &'a str,
    available: bool,
}

#[derive(Debug, Serialize)]
struct InventoryPayload<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    product: Option<&'a ProductState>,
    cocktails: Vec<CocktailAvailability<'a>>,
}

/// Product and cocktail switches.
#[derive(Debug, Clone)]
pub struct InventoryService {
    db: Database,
    hub: NotificationHub,
}

impl InventoryService {
    pub fn new(db: Database, hub: NotificationHub) -> Self {
        InventoryService { db, hub }
    }

    /// Every cocktail, availability recomputed.
    pub async fn menu(&self) -> ServiceResult<Vec<MenuItem>> {
        let cocktails = self.db.cocktails().list().await?;
        Ok(cocktails.into_iter().map(MenuItem::from).collect())
    }

    /// Sets or clears a product's stock counter. Staff only.
    pub async fn set_stock(
        &self,
        actor: &User,
        product_id: &str,
        stock: Option<i64>,
    ) -> ServiceResult<ProductState> {
        require_staff(actor)?;

        let product = self.db.products().set_stock(product_id, stock).await?;
        info!(product_id = %product_id, ?stock, actor = %actor.id, "Stock updated");

        Ok(self.product_changed(product).await)
    }

    /// Flips a product's manual availability switch. Staff only.
    pub async fn set_available(
        &self,
        actor: &User,
        product_id: &str,
        is_available: bool,
    ) -> ServiceResult<ProductState> {
        require_staff(actor)?;

        let product = self
            .db
            .products()
            .set_available(product_id, is_available)
            .await?;
        info!(product_id = %product_id, is_available, actor = %actor.id, "Product availability updated");

        Ok(self.product_changed(product).await)
    }

    /// Enables or disables a cocktail. Staff only.
    pub async fn set_cocktail_enabled(
        &self,
        actor: &User,
        cocktail_id: &str,
        is_enabled: bool,
    ) -> ServiceResult<MenuItem> {
        require_staff(actor)?;

        let cocktail = self
            .db
            .cocktails()
            .set_enabled(cocktail_id, is_enabled)
            .await?;
        info!(cocktail_id = %cocktail_id, is_enabled, actor = %actor.id, "Cocktail toggled");

        let item = MenuItem::from(cocktail);
        self.notify(&InventoryPayload {
            product: None,
            cocktails: vec![CocktailAvailability {
                id: &item.cocktail.id,
                name: &item.cocktail.name,
                available: item.available,
            }],
        });

        Ok(item)
    }

    /// Publishes the product and every cocktail using it. The write is
    /// already committed, so a failed cocktail read only narrows the payload.
    async fn product_changed(&self, product: Product) -> ProductState {
        let state = ProductState::from(product);

        // Re-read after the write so the links carry the new product state
        let affected = match self
            .db
            .cocktails()
            .list_using_product(&state.product.id)
            .await
        {
            Ok(affected) => affected,
            Err(err) => {
                warn!(
                    product_id = %state.product.id,
                    error = %err,
                    "Affected cocktails not read, publishing product only"
                );
                Vec::new()
            }
        };

        self.notify(&InventoryPayload {
            product: Some(&state),
            cocktails: affected
                .iter()
                .map(|c| CocktailAvailability {
                    id: &c.id,
                    name: &c.name,
                    available: c.is_available_now(),
                })
                .collect(),
        });

        state
    }

    fn notify(&self, payload: &InventoryPayload<'_>) {
        match Notification::from_payload(EventKind::InventoryUpdated, payload) {
            Ok(notification) => {
                let delivered = self.hub.publish(topic::INVENTORY_GLOBAL, &notification);
                debug!(delivered, "Inventory notification published");
            }
            Err(err) => warn!(error = %err, "Inventory notification not encoded"),
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ServiceError;
    use crate::test_support::{fixture, Fixture};
    use tokio::sync::mpsc::error::TryRecvError;

    #[tokio::test]
    async fn test_menu_recomputes_availability() {
        let Fixture {
            state,
            bartender,
            gin,
            cocktail,
            ..
        } = fixture().await;

        let menu = state.inventory.menu().await.unwrap();
        assert_eq!(menu.len(), 1);
        assert!(menu[0].available);

        state
            .inventory
            .set_stock(&bartender, &gin.id, Some(0))
            .await
            .unwrap();

        let menu = state.inventory.menu().await.unwrap();
        assert_eq!(menu[0].cocktail.id, cocktail.id);
        assert!(!menu[0].available);
    }

    #[tokio::test]
    async fn test_stock_change_publishes_affected_cocktails() {
        let Fixture {
            state,
            bartender,
            patron,
            gin,
            cocktail,
            ..
        } = fixture().await;

        // Patrons receive inventory updates too
        let (mut sub, _u) = state
            .hub
            .subscribe(topic::allowed_topics(&patron.id, patron.role), 8);

        let product = state
            .inventory
            .set_stock(&bartender, &gin.id, Some(0))
            .await
            .unwrap();
        assert!(!product.available);

        let got = sub.try_recv().unwrap();
        assert_eq!(got.kind, EventKind::InventoryUpdated);
        assert_eq!(got.data["product"]["id"], gin.id.as_str());
        assert_eq!(got.data["product"]["available"], false);
        assert_eq!(got.data["cocktails"][0]["id"], cocktail.id.as_str());
        assert_eq!(got.data["cocktails"][0]["available"], false);
    }

    #[tokio::test]
    async fn test_committed_change_still_publishes_when_cocktails_unreadable() {
        let Fixture { state, gin, .. } = fixture().await;
        let (mut sub, _u) = state.hub.subscribe([topic::INVENTORY_GLOBAL], 8);

        // Every later read fails
        state.db.close().await;

        let product = state.inventory.product_changed(gin.clone()).await;
        assert!(product.available);

        let got = sub.try_recv().unwrap();
        assert_eq!(got.kind, EventKind::InventoryUpdated);
        assert_eq!(got.data["product"]["id"], gin.id.as_str());
        assert_eq!(got.data["cocktails"].as_array().unwrap().len(), 0);
    }

    #[tokio::test]
    async fn test_flag_ignored_while_stock_present() {
        let Fixture {
            state, admin, gin, ..
        } = fixture().await;

        // Gin has stock 10, so the flag does not matter
        let product = state
            .inventory
            .set_available(&admin, &gin.id, false)
            .await
            .unwrap();
        assert!(product.available);

        let product = state.inventory.set_stock(&admin, &gin.id, None).await.unwrap();
        assert!(!product.available);
    }

    #[tokio::test]
    async fn test_only_required_ingredients_gate() {
        let Fixture {
            state,
            admin,
            tonic,
            lime,
            ..
        } = fixture().await;

        state.inventory.set_available(&admin, &lime.id, false).await.unwrap();
        assert!(state.inventory.menu().await.unwrap()[0].available);

        state.inventory.set_available(&admin, &tonic.id, false).await.unwrap();
        assert!(!state.inventory.menu().await.unwrap()[0].available);
    }

    #[tokio::test]
    async fn test_cocktail_toggle() {
        let Fixture {
            state,
            admin,
            cocktail,
            ..
        } = fixture().await;

        let (mut sub, _u) = state.hub.subscribe([topic::INVENTORY_GLOBAL], 8);

        let item = state
            .inventory
            .set_cocktail_enabled(&admin, &cocktail.id, false)
            .await
            .unwrap();
        assert!(!item.available);

        let got = sub.try_recv().unwrap();
        assert!(got.data.get("product").is_none());
        assert_eq!(got.data["cocktails"][0]["available"], false);
        assert!(matches!(sub.try_recv(), Err(TryRecvError::Empty)));
    }

    #[tokio::test]
    async fn test_patron_cannot_touch_inventory() {
        let Fixture {
            state,
            patron,
            gin,
            cocktail,
            ..
        } = fixture().await;

        assert!(matches!(
            state.inventory.set_stock(&patron, &gin.id, Some(1)).await,
            Err(ServiceError::Forbidden(_))
        ));
        assert!(matches!(
            state
                .inventory
                .set_cocktail_enabled(&patron, &cocktail.id, false)
                .await,
            Err(ServiceError::Forbidden(_))
        ));
    }

    #[tokio::test]
    async fn test_unknown_and_negative() {
        let Fixture { state, admin, gin, .. } = fixture().await;

        assert!(matches!(
            state.inventory.set_stock(&admin, "missing", Some(1)).await,
            Err(ServiceError::NotFound { .. })
        ));
        assert!(matches!(
            state.inventory.set_stock(&admin, &gin.id, Some(-1)).await,
            Err(ServiceError::Validation(_))
        ));
    }
}
