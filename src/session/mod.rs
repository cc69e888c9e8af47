//! Session state from the external identity provider.
//!
//! The application never authenticates users itself. The provider issues a
//! session token, carried in a cookie, and this module reduces it to the
//! one signal the rest of the system consumes: signed in or signed out.

use std::convert::Infallible;

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum::http::{HeaderMap, header};
use jsonwebtoken::{DecodingKey, Validation, decode};
use serde::Deserialize;

use crate::config::Config;
use crate::state::AppState;

/// Cookie the identity provider stores its session token in.
pub const SESSION_COOKIE: &str = "__session";

/// Boolean-like session signal read from the identity provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    SignedIn,
    SignedOut,
}

impl SessionState {
    #[must_use]
    pub const fn is_signed_in(self) -> bool {
        matches!(self, Self::SignedIn)
    }
}

/// Capability interface over the external identity provider.
///
/// Handlers depend on this abstraction, not on any concrete provider
/// runtime.
pub trait SessionProvider: Send + Sync {
    /// Evaluate the session signal for an incoming request.
    fn session_state(&self, headers: &HeaderMap) -> SessionState;

    /// Provider-hosted sign-in flow the sign-in affordance links to.
    fn sign_in_url(&self) -> &str;
}

/// Claims the identity provider embeds in its session token.
///
/// Expiry is enforced by token validation; only the subject is read.
#[derive(Debug, Deserialize)]
struct SessionClaims {
    sub: String,
}

/// Session provider backed by the provider's signed session cookie.
///
/// The token is an HS256 JWT over a shared secret. Any verification
/// failure (missing cookie, malformed token, bad signature, expiry) reads
/// as signed out; session state is a signal, never an error.
pub struct TokenSessionProvider {
    secret: String,
    sign_in_url: String,
}

impl TokenSessionProvider {
    #[must_use]
    pub fn new(secret: impl Into<String>, sign_in_url: impl Into<String>) -> Self {
        Self {
            secret: secret.into(),
            sign_in_url: sign_in_url.into(),
        }
    }

    #[must_use]
    pub fn from_config(config: &Config) -> Self {
        Self::new(config.session_secret.clone(), config.sign_in_url.clone())
    }

    fn verify(&self, token: &str) -> Option<SessionClaims> {
        if self.secret.is_empty() {
            return None;
        }

        let key = DecodingKey::from_secret(self.secret.as_bytes());
        let validation = Validation::default();

        decode::<SessionClaims>(token, &key, &validation)
            .map(|data| data.claims)
            .ok()
    }
}

impl SessionProvider for TokenSessionProvider {
    fn session_state(&self, headers: &HeaderMap) -> SessionState {
        let Some(token) = session_cookie(headers) else {
            return SessionState::SignedOut;
        };

        match self.verify(&token) {
            Some(claims) => {
                tracing::debug!(subject = %claims.sub, "Session token verified");
                SessionState::SignedIn
            }
            None => SessionState::SignedOut,
        }
    }

    fn sign_in_url(&self) -> &str {
        &self.sign_in_url
    }
}

/// Extract the provider session token from the `Cookie` header.
///
/// Scans every `Cookie` header; proxies may split cookies across headers.
fn session_cookie(headers: &HeaderMap) -> Option<String> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|cookies| cookies.split(';'))
        .find_map(|pair| {
            let (name, value) = pair.split_once('=')?;
            (name.trim() == SESSION_COOKIE).then(|| value.trim().to_string())
        })
}

/// Session signal for the current request.
///
/// Use as an extractor in handler parameters:
/// ```ignore
/// async fn handler(Session(session): Session) -> impl IntoResponse { ... }
/// ```
#[derive(Debug, Clone, Copy)]
pub struct Session(pub SessionState);

impl FromRequestParts<AppState> for Session {
    type Rejection = Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        Ok(Self(state.sessions.session_state(&parts.headers)))
    }
}

#[cfg(test)]
mod tests {
    use axum::http::HeaderValue;
    use jsonwebtoken::{EncodingKey, Header, encode};
    use serde::Serialize;

    use super::*;

    const SECRET: &str = "test-session-secret";

    #[derive(Serialize)]
    struct TestClaims {
        sub: String,
        exp: i64,
        iat: i64,
    }

    fn mint(secret: &str, expires_in_secs: i64) -> String {
        let now = chrono::Utc::now().timestamp();
        let claims = TestClaims {
            sub: "user_2bEx4mpl3".to_string(),
            exp: now + expires_in_secs,
            iat: now,
        };
        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
        .unwrap_or_default()
    }

    fn headers_with_cookie(cookie: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        if let Ok(value) = HeaderValue::from_str(cookie) {
            headers.insert(header::COOKIE, value);
        }
        headers
    }

    #[test]
    fn valid_session_cookie_reads_signed_in() {
        let provider = TokenSessionProvider::new(SECRET, "/sign-in");
        let token = mint(SECRET, 3600);
        let headers = headers_with_cookie(&format!("__session={token}"));

        assert_eq!(provider.session_state(&headers), SessionState::SignedIn);
    }

    #[test]
    fn missing_cookie_reads_signed_out() {
        let provider = TokenSessionProvider::new(SECRET, "/sign-in");

        assert_eq!(
            provider.session_state(&HeaderMap::new()),
            SessionState::SignedOut
        );
    }

    #[test]
    fn tampered_token_reads_signed_out() {
        let provider = TokenSessionProvider::new(SECRET, "/sign-in");
        let token = mint("some-other-secret", 3600);
        let headers = headers_with_cookie(&format!("__session={token}"));

        assert_eq!(provider.session_state(&headers), SessionState::SignedOut);
    }

    #[test]
    fn expired_token_reads_signed_out() {
        let provider = TokenSessionProvider::new(SECRET, "/sign-in");
        // Well past the default validation leeway
        let token = mint(SECRET, -3600);
        let headers = headers_with_cookie(&format!("__session={token}"));

        assert_eq!(provider.session_state(&headers), SessionState::SignedOut);
    }

    #[test]
    fn empty_secret_reads_signed_out() {
        let provider = TokenSessionProvider::new("", "/sign-in");
        let token = mint(SECRET, 3600);
        let headers = headers_with_cookie(&format!("__session={token}"));

        assert_eq!(provider.session_state(&headers), SessionState::SignedOut);
    }

    #[test]
    fn session_cookie_is_found_among_other_cookies() {
        let provider = TokenSessionProvider::new(SECRET, "/sign-in");
        let token = mint(SECRET, 3600);
        let headers = headers_with_cookie(&format!("theme=dark; __session={token}; locale=en"));

        assert_eq!(provider.session_state(&headers), SessionState::SignedIn);
    }
}
