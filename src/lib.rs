//! hxdash - server-rendered HTML with htmx partial updates
//!
//! A small dashboard over an in-memory user directory. Pages are rendered on
//! the server; htmx requests receive only the fragment they swap in. A live
//! count of connected viewers is pushed to every open page over server-sent
//! events, and a signed session cookie gates everything but the landing and
//! login pages.
#![warn(missing_docs)]

// Configure global allocator
#[global_allocator]
static GLOBAL: jemallocator::Jemalloc = jemallocator::Jemalloc;

// Core foundational modules
pub mod core;

// Main functional modules
pub mod api;
pub mod directory;
pub mod presence;
pub mod session;
pub mod system;
pub mod views;

// Re-export commonly used items for convenience
pub use crate::core::{AppState, Config, Error, Result, SharedState};

/// Crate version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
/// Crate name
pub const NAME: &str = env!("CARGO_PKG_NAME");
