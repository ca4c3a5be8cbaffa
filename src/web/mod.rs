//! HTTP front end for httpmail.
//!
//! A single handler answers every path and turns GET/POST requests into
//! relayed mail.

pub mod error;
pub mod handlers;
pub mod router;
pub mod server;

pub use error::ApiError;
pub use handlers::AppState;
pub use router::create_router;
pub use server::WebServer;
