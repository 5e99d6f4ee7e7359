//! HTTP API layer for foodgram.
//!
//! - **Endpoints**: users and tokens, tags, ingredients, recipes with their
//!   favorite and shopping-cart edges, and short-link redirects
//! - **Extractors**: authenticated and anonymous viewers
//! - **Middleware**: token authentication and application state
//!
//! Built on Axum 0.8 with Tower middleware stack.

pub mod endpoints;
pub mod extractors;
pub mod middleware;
pub mod response;

pub use endpoints::{root_router, router};
