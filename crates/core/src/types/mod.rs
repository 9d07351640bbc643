//! Core types for GoMarketplace.
//!
//! This module provides type-safe wrappers for cart domain concepts.

pub mod cart_item;
pub mod id;
pub mod price;
pub mod quantity;

pub use cart_item::{CartItem, CartProduct};
pub use id::*;
pub use price::Price;
pub use quantity::{Quantity, QuantityError};
