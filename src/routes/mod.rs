mod health;
mod pages;

use axum::Router;

use crate::state::AppState;

/// Build the complete application router.
///
/// Structure:
/// - `GET /` — server-rendered home page (document shell + session gate)
/// - `GET /health` — lightweight health check (used by the platform)
/// - `GET /api/v1/health` — detailed health check with database status
pub fn router() -> Router<AppState> {
    let api_v1 = Router::new().merge(health::api_router());

    Router::new()
        .merge(pages::router())
        .merge(health::root_router())
        .nest("/api/v1", api_v1)
}
