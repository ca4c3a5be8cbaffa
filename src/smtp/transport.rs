//! SMTP client backed by lettre's low-level async connection.

use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use lettre::transport::smtp::client::{AsyncSmtpConnection, Certificate, TlsParameters};
use lettre::transport::smtp::commands::{Data, Mail, Rcpt};
use lettre::transport::smtp::extension::ClientId;
use lettre::Address;

use crate::{HttpMailError, Result};

use super::client::{SmtpClient, SmtpConnector, TlsPolicy};

/// Connector that dials real SMTP relays over tokio.
#[derive(Clone)]
pub struct LettreConnector {
    hello_name: ClientId,
    connect_timeout: Option<Duration>,
    root_certificates: Vec<Certificate>,
}

impl fmt::Debug for LettreConnector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LettreConnector")
            .field("hello_name", &self.hello_name)
            .field("connect_timeout", &self.connect_timeout)
            .field("root_certificates", &self.root_certificates.len())
            .finish()
    }
}

impl Default for LettreConnector {
    fn default() -> Self {
        Self::new()
    }
}

impl LettreConnector {
    /// Create a connector announcing the local hostname, without a connect timeout.
    pub fn new() -> Self {
        Self {
            hello_name: ClientId::default(),
            connect_timeout: None,
            root_certificates: Vec::new(),
        }
    }

    /// Set the name sent with EHLO.
    pub fn with_hello_name(mut self, name: impl Into<String>) -> Self {
        self.hello_name = ClientId::Domain(name.into());
        self
    }

    /// Set the connect timeout.
    pub fn with_connect_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.connect_timeout = timeout;
        self
    }

    /// Trust the PEM certificates in `pem` on top of the bundled web roots.
    pub fn with_root_certificate_pem(mut self, pem: &[u8]) -> Result<Self> {
        self.root_certificates.push(Certificate::from_pem(pem)?);
        Ok(self)
    }

    fn tls_parameters(&self, host: &str) -> Result<TlsParameters> {
        let builder = self
            .root_certificates
            .iter()
            .cloned()
            .fold(TlsParameters::builder(host.to_string()), |builder, cert| {
                builder.add_root_certificate(cert)
            });
        Ok(builder.build()?)
    }
}

/// Split `host:port`, accepting bracketed IPv6 hosts.
pub fn split_host_port(addr: &str) -> Result<(&str, u16)> {
    let (host, port) = addr
        .rsplit_once(':')
        .ok_or_else(|| HttpMailError::Transport(format!("missing port in address {addr}")))?;
    let port = port
        .parse::<u16>()
        .map_err(|_| HttpMailError::Transport(format!("invalid port in address {addr}")))?;
    let host = host.trim_start_matches('[').trim_end_matches(']');
    if host.is_empty() {
        return Err(HttpMailError::Transport(format!(
            "missing host in address {addr}"
        )));
    }
    Ok((host, port))
}

fn parse_address(addr: &str) -> Result<Address> {
    addr.parse::<Address>()
        .map_err(|e| HttpMailError::Transport(format!("invalid address {addr}: {e}")))
}

#[async_trait]
impl SmtpConnector for LettreConnector {
    type Client = LettreClient;

    async fn dial(&self, addr: &str, tls: TlsPolicy) -> Result<LettreClient> {
        let (host, port) = split_host_port(addr)?;

        let mut conn = AsyncSmtpConnection::connect_tokio1(
            (host, port),
            self.connect_timeout,
            &self.hello_name,
            None,
            None,
        )
        .await?;

        if tls == TlsPolicy::Required {
            let params = self.tls_parameters(host)?;
            conn.starttls(params, &self.hello_name).await?;
            tracing::debug!(host, "STARTTLS negotiated");
        }

        Ok(LettreClient {
            conn,
            buffer: Vec::new(),
        })
    }
}

/// An open session on top of [`AsyncSmtpConnection`].
pub struct LettreClient {
    conn: AsyncSmtpConnection,
    buffer: Vec<u8>,
}

#[async_trait]
impl SmtpClient for LettreClient {
    async fn mail(&mut self, from: &str) -> Result<()> {
        let sender = parse_address(from)?;
        self.conn.command(Mail::new(Some(sender), vec![])).await?;
        Ok(())
    }

    async fn rcpt(&mut self, to: &str) -> Result<()> {
        let recipient = parse_address(to)?;
        self.conn.command(Rcpt::new(recipient, vec![])).await?;
        Ok(())
    }

    async fn data(&mut self) -> Result<()> {
        self.conn.command(Data).await?;
        self.buffer.clear();
        Ok(())
    }

    async fn write_data(&mut self, data: &[u8]) -> Result<()> {
        self.buffer.extend_from_slice(data);
        Ok(())
    }

    async fn close_data(&mut self) -> Result<()> {
        // lettre dot-stuffs the payload and appends CRLF "." CRLF itself.
        let mut payload = std::mem::take(&mut self.buffer);
        if payload.ends_with(b"\r\n") {
            payload.truncate(payload.len() - 2);
        }
        self.conn.message(&payload).await?;
        Ok(())
    }

    async fn quit(&mut self) -> Result<()> {
        self.conn.quit().await?;
        Ok(())
    }
}
