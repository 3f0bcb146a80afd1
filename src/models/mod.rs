//! Data models for GameVault.

mod catalog;
mod entity;

pub use catalog::{ADD_PRODUCT_ACK, LIST_CATEGORY, PRODUCTS_QUERY};
pub use entity::EntitySpan;
