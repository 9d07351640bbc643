//! GoMarketplace Core - Shared cart domain types.
//!
//! This crate provides the types shared by the cart store and its consumers:
//! - [`ProductId`] - Stable identifier of a cart line
//! - [`Price`] - Decimal unit price
//! - [`Quantity`] - Line quantity that can never drop below one
//! - [`CartItem`] / [`CartProduct`] - A cart line and the candidate used to add one
//!
//! # Architecture
//!
//! The core crate contains only types - no I/O, no storage access, no async
//! runtime. Storage and state management live in `go-marketplace-cart`.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
