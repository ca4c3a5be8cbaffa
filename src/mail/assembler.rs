//! Builds a [`Mail`] out of request fields and configured defaults.

use crate::config::DefaultsConfig;
use crate::{HttpMailError, Result};

use super::types::Mail;

/// Form field carrying the sender.
pub const FIELD_FROM: &str = "from";
/// Form field carrying a recipient. May repeat.
pub const FIELD_TO: &str = "to";
/// Form field carrying the subject.
pub const FIELD_SUBJECT: &str = "subject";
/// Form field carrying the mail text.
pub const FIELD_MSG: &str = "msg";

/// Message returned when a header field carries a line break.
pub const HEADER_LINE_BREAK: &str = "line breaks are not allowed in from, to or subject";

/// Message returned when the sender or recipients are missing.
pub const MISSING_FIELDS: &str = "missing fields in mail. Set appropriate parameters: to, from";

/// Mail fields supplied by a single HTTP request.
#[derive(Debug, Clone, Default)]
pub struct RequestFields {
    pairs: Vec<(String, String)>,
    body: Option<String>,
}

impl RequestFields {
    /// Create an empty set of fields.
    pub fn new() -> Self {
        Self::default()
    }

    /// Fields decoded from a URL query string.
    pub fn from_query(query: Option<&str>) -> Self {
        let mut fields = Self::new();
        if let Some(query) = query {
            fields.extend_urlencoded(query.as_bytes());
        }
        fields
    }

    fn extend_urlencoded(&mut self, input: &[u8]) {
        self.pairs.extend(
            url::form_urlencoded::parse(input).map(|(k, v)| (k.into_owned(), v.into_owned())),
        );
    }

    /// Add a single field.
    pub fn with_field(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.pairs.push((name.into(), value.into()));
        self
    }

    /// Set the raw POST payload.
    pub fn with_body(mut self, body: impl Into<String>) -> Self {
        self.body = Some(body.into());
        self
    }

    /// First non-empty value of `name`.
    pub fn value(&self, name: &str) -> Option<&str> {
        self.pairs
            .iter()
            .find(|(k, v)| k == name && !v.is_empty())
            .map(|(_, v)| v.as_str())
    }

    /// All non-empty values of `name`, in request order.
    pub fn values<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.pairs
            .iter()
            .filter(move |(k, v)| k == name && !v.is_empty())
            .map(|(_, v)| v.as_str())
    }

    /// The raw POST payload, if it is non-empty.
    pub fn body(&self) -> Option<&str> {
        self.body.as_deref().filter(|b| !b.is_empty())
    }
}

/// Resolve every mail field and validate the result.
///
/// A field supplied by the request wins over its default; a non-empty raw
/// body wins over `msg`. A configured locked sender replaces `from` last,
/// whatever the request or defaults said.
///
/// # Errors
///
/// Returns [`HttpMailError::Validation`] when no sender or no recipient is
/// left after resolution, or when a header field contains CR or LF.
pub fn assemble(fields: &RequestFields, defaults: &DefaultsConfig) -> Result<Mail> {
    let mut to: Vec<String> = fields.values(FIELD_TO).map(str::to_string).collect();
    if to.is_empty() {
        to = defaults.to_list();
    }

    let mut from = field_or_default(fields, FIELD_FROM, &defaults.from);
    let subject = field_or_default(fields, FIELD_SUBJECT, &defaults.subject);
    let body = match fields.body() {
        Some(body) => {
            tracing::debug!("Using mail body from POST");
            body.to_string()
        }
        None => field_or_default(fields, FIELD_MSG, &defaults.body),
    };

    if let Some(locked) = defaults.locked_from() {
        from = locked.to_string();
    }

    if to.is_empty() || from.is_empty() {
        return Err(HttpMailError::Validation(MISSING_FIELDS.to_string()));
    }

    let header_values = std::iter::once(from.as_str())
        .chain(to.iter().map(String::as_str))
        .chain(std::iter::once(subject.as_str()));
    for value in header_values {
        if value.contains(['\r', '\n']) {
            return Err(HttpMailError::Validation(HEADER_LINE_BREAK.to_string()));
        }
    }

    Ok(Mail {
        from,
        to,
        subject,
        body,
    })
}

fn field_or_default(fields: &RequestFields, name: &str, default: &str) -> String {
    fields.value(name).unwrap_or(default).to_string()
}
