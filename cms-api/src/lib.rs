//! # CMS API Server Library
//!
//! HTTP surface of the flat-file CMS: resource routers over the collection
//! store, upload handling and the application shell.
//!
//! ## Modules
//!
//! - `app`: Application state and router builder
//! - `config`: Configuration management
//! - `error`: Error handling and HTTP response mapping
//! - `middleware`: Response security headers
//! - `routes`: API route handlers
//! - `uploads`: Uploaded file storage

pub mod app;
pub mod config;
pub mod error;
pub mod middleware;
pub mod routes;
pub mod uploads;
