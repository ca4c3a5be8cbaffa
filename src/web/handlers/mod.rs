//! HTTP handlers.

pub mod relay;

pub use relay::*;
