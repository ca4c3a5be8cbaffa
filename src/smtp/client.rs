//! SMTP client abstraction.
//!
//! The session driver only talks to these traits, so the relay can be
//! swapped for a recording double in tests.

use async_trait::async_trait;

use crate::Result;

/// How the connection to the relay is secured.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TlsPolicy {
    /// Upgrade with STARTTLS before any mail command. Failure aborts the session.
    Required,
    /// Plain text session, no STARTTLS.
    Skip,
}

/// An open SMTP session.
///
/// Every method maps to one protocol step and fails with
/// [`HttpMailError::Transport`](crate::HttpMailError::Transport).
#[async_trait]
pub trait SmtpClient: Send {
    /// Issue `MAIL FROM`.
    async fn mail(&mut self, from: &str) -> Result<()>;

    /// Issue `RCPT TO` for one recipient.
    async fn rcpt(&mut self, to: &str) -> Result<()>;

    /// Issue `DATA`, opening the data stream.
    async fn data(&mut self) -> Result<()>;

    /// Write message bytes to the open data stream.
    async fn write_data(&mut self, data: &[u8]) -> Result<()>;

    /// Close the data stream, sending the end-of-data marker.
    async fn close_data(&mut self) -> Result<()>;

    /// Issue `QUIT`.
    async fn quit(&mut self) -> Result<()>;
}

/// Opens SMTP sessions.
#[async_trait]
pub trait SmtpConnector: Send + Sync + 'static {
    /// Session type produced by [`dial`](Self::dial).
    type Client: SmtpClient;

    /// Connect to `addr` (`host:port`) and, unless `tls` is
    /// [`TlsPolicy::Skip`], negotiate TLS.
    async fn dial(&self, addr: &str, tls: TlsPolicy) -> Result<Self::Client>;
}
