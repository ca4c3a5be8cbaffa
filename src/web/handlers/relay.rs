//! The relay endpoint: one HTTP request in, one SMTP session out.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{ConnectInfo, State},
    http::{header, Method, StatusCode, Uri},
    response::{IntoResponse, Response},
};

use crate::config::{Config, DefaultsConfig};
use crate::mail::{assemble, Mail, RequestFields};
use crate::smtp::{self, SmtpConnector, TlsPolicy};
use crate::web::error::ApiError;

/// Read-only state shared by every request.
pub struct AppState<C> {
    /// Opens sessions to the relay.
    pub connector: C,
    /// Relay address (`host:port`).
    pub smtp_addr: String,
    /// How the relay connection is secured.
    pub tls_policy: TlsPolicy,
    /// Field defaults and the locked sender.
    pub defaults: DefaultsConfig,
    /// Hide relay error text from callers.
    pub redact_errors: bool,
}

impl<C: SmtpConnector> AppState<C> {
    /// Create a new application state with no defaults.
    pub fn new(connector: C, smtp_addr: impl Into<String>, tls_policy: TlsPolicy) -> Self {
        Self {
            connector,
            smtp_addr: smtp_addr.into(),
            tls_policy,
            defaults: DefaultsConfig::default(),
            redact_errors: false,
        }
    }

    /// Create the state described by `config`.
    pub fn from_config(config: &Config, connector: C) -> Self {
        Self::new(connector, &config.smtp.address, config.smtp.tls_policy())
            .with_defaults(config.defaults.clone())
            .with_redact_errors(config.relay.redact_errors)
    }

    /// Set the mail defaults.
    pub fn with_defaults(mut self, defaults: DefaultsConfig) -> Self {
        self.defaults = defaults;
        self
    }

    /// Enable or disable redaction of relay errors.
    pub fn with_redact_errors(mut self, redact: bool) -> Self {
        self.redact_errors = redact;
        self
    }

    /// Send `mail` through the relay.
    pub async fn deliver(&self, mail: &Mail) -> crate::Result<()> {
        smtp::send(
            &self.connector,
            &self.smtp_addr,
            &mail.from,
            &mail.to,
            &mail.wire_data(),
            self.tls_policy,
        )
        .await
    }
}

/// Collect mail fields from the query string and, for POST, the body.
///
/// Any non-empty POST body is the raw mail text, whatever its content type.
fn request_fields(method: &Method, uri: &Uri, body: &Bytes) -> Result<RequestFields, ApiError> {
    let mut fields = RequestFields::from_query(uri.query());

    if *method == Method::POST && !body.is_empty() {
        let text = std::str::from_utf8(body)
            .map_err(|_| ApiError::bad_request("request body is not valid UTF-8"))?;
        tracing::debug!("Got mail message body from POST");
        fields = fields.with_body(text);
    }

    Ok(fields)
}

/// Any path, GET or POST - relay a mail.
///
/// Responds with the display form of the sent mail, or a 400 with the
/// error text.
pub async fn relay_mail<C: SmtpConnector>(
    State(state): State<Arc<AppState<C>>>,
    connect_info: Option<ConnectInfo<SocketAddr>>,
    method: Method,
    uri: Uri,
    body: Bytes,
) -> Result<Response, ApiError> {
    let remote = connect_info
        .map(|ConnectInfo(addr)| addr.to_string())
        .unwrap_or_else(|| "-".to_string());
    tracing::info!("{} | {} {}", remote, method, uri);

    if method != Method::GET && method != Method::POST {
        return Err(ApiError::method_not_allowed(format!(
            "method {method} not allowed, use GET or POST"
        )));
    }

    let fields = request_fields(&method, &uri, &body)?;
    let mail = assemble(&fields, &state.defaults)
        .map_err(|e| ApiError::from_error(e, state.redact_errors))?;

    state
        .deliver(&mail)
        .await
        .map_err(|e| ApiError::from_error(e, state.redact_errors))?;

    tracing::info!(
        from = mail.from.as_str(),
        recipients = mail.to.len(),
        "Mail relayed"
    );

    Ok((
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain")],
        mail.to_string(),
    )
        .into_response())
}
