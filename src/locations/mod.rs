//! Storage locations
//!
//! The persisted set of roots the file manager can serve and the store that
//! selects the active one.

pub mod store;
pub mod types;

pub use store::{LocationStore, default_locations};
pub use types::{ConfigPatch, Location, RootConfiguration};
