//! # CMS Shared Library
//!
//! This crate contains the storage core, record models and authentication
//! primitives used by the CMS API server.
//!
//! ## Module Organization
//!
//! - `store`: Named JSON collections with default seeding and fail-soft reads
//! - `models`: Typed records stored in the collections
//! - `auth`: Password hashing, bearer tokens, request authentication

pub mod auth;
pub mod models;
pub mod store;

/// Current version of the CMS shared library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
