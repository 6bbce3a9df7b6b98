//! # Derived Availability
//!
//! Decides whether a product can be used and whether a cocktail can be
//! ordered.
//!
//! ## Rules
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Product                                                                │
//! │                                                                         │
//! │    stock present?  ──yes──►  available = stock > 0   (flag ignored)    │
//! │         │                                                               │
//! │         no                                                              │
//! │         ▼                                                               │
//! │    available = manual flag                                              │
//! │                                                                         │
//! │  Cocktail                                                               │
//! │                                                                         │
//! │    enabled?  ──no──►  false                                             │
//! │       │                                                                 │
//! │      yes                                                                │
//! │       ▼                                                                 │
//! │    any REQUIRED ingredient unavailable?  ──yes──►  false                │
//! │       │                                                                 │
//! │       no ──►  true           (optional ingredients never count)        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Nothing here is cached. Callers recompute on every read because product
//! state changes independently of cocktail reads.

/// Availability of a product under the stock-overrides-flag rule.
///
/// ## Example
/// ```rust
/// use taproom_core::availability::product_available;
///
/// assert!(product_available(false, Some(5)));
/// assert!(!product_available(true, Some(0)));
/// assert!(product_available(true, None));
/// assert!(!product_available(false, None));
/// ```
#[inline]
pub const fn product_available(flag: bool, stock: Option<i64>) -> bool {
    match stock {
        Some(count) => count > 0,
        None => flag,
    }
}

/// Derived availability of a cocktail.
///
/// `ingredients` yields `(required, product_available)` pairs.
///
/// ## Example
/// ```rust
/// use taproom_core::availability::cocktail_available;
///
/// assert!(cocktail_available(true, [(true, true), (false, false)]));
/// assert!(!cocktail_available(true, [(true, false)]));
/// assert!(!cocktail_available(false, [(true, true)]));
/// ```
pub fn cocktail_available<I>(enabled: bool, ingredients: I) -> bool
where
    I: IntoIterator<Item = (bool, bool)>,
{
    enabled
        && ingredients
            .into_iter()
            .all(|(required, available)| !required || available)
}

// =============================================================================
// Unit Tests
// =============================================================================
