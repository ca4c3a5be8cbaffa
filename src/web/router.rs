//! Router configuration for the relay.

use axum::Router;
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;

use super::handlers::{relay_mail, AppState};
use crate::smtp::SmtpConnector;

/// Create the relay router.
///
/// The relay handler is the fallback, so it answers every path.
pub fn create_router<C: SmtpConnector>(app_state: Arc<AppState<C>>) -> Router {
    Router::new()
        .fallback(relay_mail::<C>)
        .layer(ServiceBuilder::new().layer(TraceLayer::new_for_http()))
        .with_state(app_state)
}
