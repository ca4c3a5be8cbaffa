//! SMTP relay module for httpmail.
//!
//! This module provides the outbound side of the relay:
//! - The [`SmtpClient`] / [`SmtpConnector`] seam
//! - The session driver that sequences MAIL, RCPT, DATA and QUIT
//! - A lettre-backed connector for real relays

pub mod client;
pub mod session;
pub mod transport;

pub use client::{SmtpClient, SmtpConnector, TlsPolicy};
pub use session::send;
pub use transport::{LettreClient, LettreConnector};
