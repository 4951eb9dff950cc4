//! Server core functionality
//!
//! The HTTP listener, the API router and its request handlers.

pub mod core;
pub mod responses;
pub mod routes;

pub use self::core::{Server, build_router};
