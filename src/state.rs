use std::sync::Arc;

use crate::config::Config;
use crate::db::ConnectionCache;
use crate::session::SessionProvider;

/// Shared application state available to all request handlers via Axum's `State` extractor.
///
/// Owns the connection cache and session provider; lifecycle is tied to
/// process start/stop, not ambient globals.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub db: ConnectionCache,
    pub sessions: Arc<dyn SessionProvider>,
}
