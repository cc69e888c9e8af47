use axum::Router;
use axum::extract::State;
use axum::response::Html;
use axum::routing::get;

use crate::layout;
use crate::session::Session;
use crate::state::AppState;

/// Landing page content rendered inside the document shell.
const HOME_CONTENT: &str = "<main>
        <h1>Imaginify</h1>
        <p>Transform your images with the power of AI.</p>
    </main>";

/// Build the page route group.
pub fn router() -> Router<AppState> {
    Router::new().route("/", get(home))
}

async fn home(State(state): State<AppState>, Session(session): Session) -> Html<String> {
    Html(layout::document(
        &state.config,
        session,
        state.sessions.sign_in_url(),
        HOME_CONTENT,
    ))
}
