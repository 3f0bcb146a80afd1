//! Catalog constants for the product façade.
//!
//! Products are arbitrary JSON objects persisted verbatim; no schema is
//! enforced here beyond the `category` field used by the listing filter.

/// Fixed acknowledgement returned after a successful insert.
pub const ADD_PRODUCT_ACK: &str = "Product added successfully";

/// Category used by the one hardcoded listing filter.
pub const LIST_CATEGORY: &str = "Retro";

/// Parameterized listing query executed against the store.
pub const PRODUCTS_QUERY: &str = "SELECT * FROM c WHERE c.category = @category";
