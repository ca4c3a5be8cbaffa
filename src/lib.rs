//! httpmail - HTTP-to-SMTP relay
//!
//! Accepts mail fields over HTTP, assembles a message and forwards it to an
//! upstream SMTP server.

pub mod config;
pub mod error;
pub mod logging;
pub mod mail;
pub mod smtp;
pub mod web;

pub use config::Config;
pub use error::{HttpMailError, Result};
pub use mail::{assemble, LineSeparator, Mail, RequestFields};
pub use smtp::{LettreConnector, SmtpClient, SmtpConnector, TlsPolicy};
pub use web::{create_router, AppState, WebServer};
