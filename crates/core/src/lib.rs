//! Devshelf Core - Shared types library.
//!
//! This crate provides common types used across Devshelf components:
//! - `storefront` - Public-facing marketplace site
//!
//! # Architecture
//!
//! The core crate contains only types and traits - no I/O, no HTTP clients.
//! The marketplace backend owns every entity; these types are the shared
//! vocabulary for its wire representation.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for type-safe IDs, prices, emails, and statuses

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
