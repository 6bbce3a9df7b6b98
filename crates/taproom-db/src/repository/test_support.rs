//! Fixtures shared by the repository tests.

use chrono::Utc;
use taproom_core::{Cocktail, IngredientLink, Product, Role, User};

use super::generate_id;
use crate::pool::Database;

pub fn product(name: &str, is_available: bool, stock: Option<i64>) -> Product {
    let now = Utc::now();
    Product {
        id: generate_id(),
        name: name.to_string(),
        category: String::new(),
        is_available,
        stock,
        created_at: now,
        updated_at: now,
    }
}

/// Builds an ingredient link carrying `product`'s current availability and
/// stock, matching what a read would return right after insertion.
pub fn link(product: &Product, position: i64, is_required: bool) -> IngredientLink {
    IngredientLink {
        product_id: product.id.clone(),
        product_name: product.name.clone(),
        position,
        is_required,
        product_is_available: product.is_available,
        product_stock: product.stock,
    }
}

pub fn cocktail(name: &str, ingredients: Vec<IngredientLink>) -> Cocktail {
    let now = Utc::now();
    Cocktail {
        id: generate_id(),
        name: name.to_string(),
        description: None,
        price_cents: 1100,
        is_enabled: true,
        ingredients,
        created_at: now,
        updated_at: now,
    }
}

pub async fn seed_user(db: &Database, username: &str, role: Role) -> User {
    let user = User {
        id: generate_id(),
        username: username.to_string(),
        role,
    };
    db.users().insert(&user).await.unwrap();
    user
}

/// Inserts a gin + tonic (required) and lime (optional) cocktail.
pub async fn seed_menu(db: &Database) -> (Cocktail, Product, Product, Product) {
    let gin = product("Gin", true, Some(10));
    let tonic = product("Tonic", true, None);
    let lime = product("Lime", true, None);
    for p in [&gin, &tonic, &lime] {
        db.products().insert(p).await.unwrap();
    }

    let drink = cocktail(
        "Gin & Tonic",
        vec![link(&gin, 0, true), link(&tonic, 1, true), link(&lime, 2, false)],
    );
    let drink = db.cocktails().insert(&drink).await.unwrap();
    (drink, gin, tonic, lime)
}

#[tokio::test]
async fn test_link_mirrors_product_state() {
    let db = Database::new(crate::pool::DbConfig::in_memory()).await.unwrap();
    let empty = product("Vermouth", true, Some(0));
    db.products().insert(&empty).await.unwrap();

    let link = link(&empty, 0, true);
    assert!(link.product_is_available);
    assert_eq!(link.product_stock, Some(0));

    // Built and stored forms agree on availability
    let built = cocktail("Martini", vec![link]);
    let stored = db.cocktails().insert(&built).await.unwrap();
    assert!(!built.is_available_now());
    assert_eq!(stored.is_available_now(), built.is_available_now());
}
