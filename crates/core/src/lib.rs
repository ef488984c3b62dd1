//! Quitanda Core - Shared domain types.
//!
//! This crate provides the types shared by the Quitanda storefront:
//! the cart held in the visitor's session, money and ID newtypes, and the
//! small value objects used by the account and checkout forms.
//!
//! # Architecture
//!
//! The core crate contains only types and pure logic - no I/O, no database
//! access, no HTTP clients. This keeps it lightweight and allows it to be
//! used anywhere.
//!
//! # Modules
//!
//! - [`cart`] - The session-held cart and its total computation
//! - [`types`] - Newtype wrappers for type-safe IDs, prices, emails, and statuses

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod cart;
pub mod types;

pub use cart::{AddToCart, AppliedDiscount, Cart, CartItem};
pub use types::*;
