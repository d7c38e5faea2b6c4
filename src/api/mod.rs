//! # API Module
//!
//! The HTML-over-HTTP surface of hxdash:
//!
//! ## Pages (full document, or content fragment for htmx requests)
//! - `GET /` - Landing page
//! - `GET /login`, `POST /login` - Sign in; redirects to `next` or `/users`
//! - `GET|POST /logout` - Sign out; redirects to `/login`
//! - `GET /users` - User directory (protected)
//!
//! ## User mutations (protected, form-encoded, answer with row fragments)
//! - `POST /users` - Create user
//! - `PUT /users/:id` - Update user
//! - `DELETE /users/:id` - Delete user
//!
//! ## Fragments and streams (protected)
//! - `GET /_components/users/new` - Create dialog
//! - `GET /_components/users/update/:id` - Update dialog
//! - `GET /users/connected` - Server-sent live viewer count
//!
//! ## System
//! - `GET /static/*` - Stylesheets
//! - `GET /health` - Health check
//! - `GET /metrics` - Prometheus metrics

pub mod extract;
pub mod gate;
pub mod handlers;
pub mod htmx;
pub mod response;
pub mod server;
pub mod stream;

// Re-export commonly used items
pub use server::{create_app, shutdown_signal, start_server};
