/// Middleware modules for the API server
///
/// Authentication lives in `cms_shared::auth::middleware`; this module holds
/// response-level middleware only.

pub mod security;
