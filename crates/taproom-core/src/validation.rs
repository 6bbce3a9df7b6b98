//! # Validation Module
//!
//! Input validation utilities for Taproom.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: HTTP extractor                                               │
//! │  └── Type validation (JSON deserialization)                            │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: THIS MODULE                                                  │
//! │  ├── quantity in [1, 10], location not blank                           │
//! │  └── cocktail enabled and derived-available                            │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Database (SQLite)                                            │
//! │  ├── CHECK constraints on quantity and status                          │
//! │  └── Foreign key constraints                                           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use crate::error::ValidationError;
use crate::types::{Cocktail, NewOrder};
use crate::{MAX_LOCATION_LEN, MAX_NOTES_LEN, MAX_ORDER_QUANTITY, MIN_ORDER_QUANTITY};

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

// =============================================================================
// Order Input
// =============================================================================

/// Validates an order quantity.
///
/// ## Example
/// ```rust
/// use taproom_core::validation::validate_quantity;
///
/// assert!(validate_quantity(1).is_ok());
/// assert!(validate_quantity(10).is_ok());
/// assert!(validate_quantity(0).is_err());
/// assert!(validate_quantity(11).is_err());
/// ```
pub fn validate_quantity(qty: i64) -> ValidationResult<()> {
    if !(MIN_ORDER_QUANTITY..=MAX_ORDER_QUANTITY).contains(&qty) {
        return Err(ValidationError::OutOfRange {
            field: "quantity".to_string(),
            min: MIN_ORDER_QUANTITY,
            max: MAX_ORDER_QUANTITY,
        });
    }

    Ok(())
}

/// Validates a delivery location and returns it trimmed.
pub fn validate_location(location: &str) -> ValidationResult<String> {
    let location = location.trim();

    if location.is_empty() {
        return Err(ValidationError::Required {
            field: "location".to_string(),
        });
    }

    if location.chars().count() > MAX_LOCATION_LEN {
        return Err(ValidationError::TooLong {
            field: "location".to_string(),
            max: MAX_LOCATION_LEN,
        });
    }

    Ok(location.to_string())
}

/// Validates free-text notes and returns them trimmed. Empty is fine.
pub fn validate_notes(notes: &str) -> ValidationResult<String> {
    let notes = notes.trim();

    if notes.chars().count() > MAX_NOTES_LEN {
        return Err(ValidationError::TooLong {
            field: "notes".to_string(),
            max: MAX_NOTES_LEN,
        });
    }

    Ok(notes.to_string())
}

/// Validates and normalizes a whole order request.
///
/// The cocktail itself is checked separately by [`validate_orderable`],
/// against state read at creation time.
pub fn validate_new_order(input: &NewOrder) -> ValidationResult<NewOrder> {
    validate_uuid(&input.cocktail_id)?;
    validate_quantity(input.quantity)?;
    let location = validate_location(&input.location)?;
    let notes = validate_notes(&input.notes)?;

    Ok(NewOrder {
        cocktail_id: input.cocktail_id.trim().to_string(),
        quantity: input.quantity,
        notes,
        location,
    })
}

/// Checks that a cocktail can be ordered right now.
///
/// ## Rules
/// - Disabled cocktails are rejected first
/// - Then derived availability (required ingredients) is recomputed
pub fn validate_orderable(cocktail: &Cocktail) -> ValidationResult<()> {
    if !cocktail.is_enabled {
        return Err(ValidationError::CocktailDisabled {
            name: cocktail.name.clone(),
        });
    }

    if !cocktail.is_available_now() {
        return Err(ValidationError::CocktailUnavailable {
            name: cocktail.name.clone(),
        });
    }

    Ok(())
}

// =============================================================================
// Inventory Input
// =============================================================================

/// Validates an absolute stock level. `None` clears the counter.
pub fn validate_stock(stock: Option<i64>) -> ValidationResult<()> {
    match stock {
        Some(count) if count < 0 => Err(ValidationError::OutOfRange {
            field: "stock".to_string(),
            min: 0,
            max: i64::MAX,
        }),
        _ => Ok(()),
    }
}

// =============================================================================
// UUID Validators
// =============================================================================

/// Validates a UUID string format.
///
/// ## Example
/// ```rust
/// use taproom_core::validation::validate_uuid;
///
/// assert!(validate_uuid("550e8400-e29b-41d4-a716-446655440000").is_ok());
/// assert!(validate_uuid("not-a-uuid").is_err());
/// ```
pub fn validate_uuid(id: &str) -> ValidationResult<()> {
    if id.trim().is_empty() {
        return Err(ValidationError::Required {
            field: "id".to_string(),
        });
    }

    uuid::Uuid::parse_str(id.trim()).map_err(|_| ValidationError::InvalidFormat {
        field: "id".to_string(),
        reason: "must be a valid UUID".to_string(),
    })?;

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::IngredientLink;
    use chrono::Utc;

    const COCKTAIL_ID: &str = "550e8400-e29b-41d4-a716-446655440000";

    fn order(quantity: i64, location: &str) -> NewOrder {
        NewOrder {
            cocktail_id: COCKTAIL_ID.to_string(),
            quantity,
            notes: "  no ice ".to_string(),
            location: location.to_string(),
        }
    }

    fn cocktail(enabled: bool, lime_stock: Option<i64>) -> Cocktail {
        let now = Utc::now();
        Cocktail {
            id: COCKTAIL_ID.to_string(),
            name: "Daiquiri".to_string(),
            description: None,
            price_cents: 1100,
            is_enabled: enabled,
            ingredients: vec![IngredientLink {
                product_id: "lime".to_string(),
                product_name: "Lime".to_string(),
                position: 0,
                is_required: true,
                product_is_available: true,
                product_stock: lime_stock,
            }],
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_validate_quantity_bounds() {
        assert!(validate_quantity(1).is_ok());
        assert!(validate_quantity(10).is_ok());
        assert!(validate_quantity(0).is_err());
        assert!(validate_quantity(-1).is_err());
        assert!(validate_quantity(11).is_err());
    }

    #[test]
    fn test_blank_location_rejected() {
        assert!(matches!(
            validate_location("   "),
            Err(ValidationError::Required { .. })
        ));
        assert_eq!(validate_location(" table 4 ").unwrap(), "table 4");
        assert!(validate_location(&"x".repeat(MAX_LOCATION_LEN + 1)).is_err());
    }

    #[test]
    fn test_validate_new_order_normalizes() {
        let normalized = validate_new_order(&order(2, " bar 1")).unwrap();
        assert_eq!(normalized.location, "bar 1");
        assert_eq!(normalized.notes, "no ice");

        assert!(validate_new_order(&order(11, "bar 1")).is_err());
        assert!(validate_new_order(&order(1, "")).is_err());
    }

    #[test]
    fn test_validate_orderable() {
        assert!(validate_orderable(&cocktail(true, Some(4))).is_ok());
        assert!(matches!(
            validate_orderable(&cocktail(false, Some(4))),
            Err(ValidationError::CocktailDisabled { .. })
        ));
        assert!(matches!(
            validate_orderable(&cocktail(true, Some(0))),
            Err(ValidationError::CocktailUnavailable { .. })
        ));
    }

    #[test]
    fn test_validate_stock() {
        assert!(validate_stock(None).is_ok());
        assert!(validate_stock(Some(0)).is_ok());
        assert!(validate_stock(Some(-1)).is_err());
    }

    #[test]
    fn test_validate_uuid() {
        assert!(validate_uuid(COCKTAIL_ID).is_ok());
        assert!(validate_uuid("").is_err());
        assert!(validate_uuid("123").is_err());
    }
}
