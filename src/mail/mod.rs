//! Mail module for httpmail.
//!
//! This module turns request input into a relayable message:
//! - Field resolution against configured defaults and the locked sender
//! - Display (LF) and wire (CRLF) rendering

mod assembler;
mod types;

pub use assembler::{
    assemble, RequestFields, FIELD_FROM, FIELD_MSG, FIELD_SUBJECT, FIELD_TO, HEADER_LINE_BREAK,
    MISSING_FIELDS,
};
pub use types::{LineSeparator, Mail};
