//! HTTP middleware stack for the catalog service.
//!
//! # Middleware Order (bottom to top in Router)
//!
//! 1. Sentry layer (capture errors)
//! 2. `TraceLayer` (request tracing)
//! 3. Request ID (add unique ID to each request)
//! 4. CORS
//!
//! The [`CurrentUser`] extractor reads the gateway-verified user subject.

pub mod request_id;
pub mod user;

pub use request_id::{REQUEST_ID_HEADER, request_id_middleware};
pub use user::{CurrentUser, USER_ID_HEADER};
