use axum::{
    extract::{Request, State},
    http::{HeaderMap, StatusCode, header},
    middleware::Next,
    response::{IntoResponse, Response},
};
use axum_extra::extract::cookie::CookieJar;
use std::sync::Arc;

use crate::AppState;

/// Name of the cookie carrying the session token for browser clients.
pub const SESSION_COOKIE: &str = "session_token";

/// GuardConfig
///
/// Static configuration of the route guard: one protected path prefix and one
/// exempt exact path (the login entry point). Read once at process start.
#[derive(Clone, Debug)]
pub struct GuardConfig {
    pub protected_prefix: String,
    pub login_path: String,
}

impl Default for GuardConfig {
    fn default() -> Self {
        Self {
            protected_prefix: "/admin".to_string(),
            login_path: "/admin/login".to_string(),
        }
    }
}

/// RouteDecision
///
/// The only two outcomes the guard can produce for a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteDecision {
    /// Pass the request through to the downstream handler unchanged.
    Forward,
    /// Answer with a 302 redirect to the login path.
    RedirectToLogin,
}

/// TokenVerdict
///
/// Result of checking a presented session token: structural validity plus the
/// role attribute embedded in it, when one is present.
#[derive(Debug, Clone, Default)]
pub struct TokenVerdict {
    pub valid: bool,
    pub role: Option<String>,
}

/// TokenVerifier
///
/// Injected capability that decides whether a token is well-formed and
/// unexpired. Keeping verification behind this seam leaves `classify` a pure
/// function over its inputs, testable without a real credential system.
pub trait TokenVerifier: Send + Sync {
    fn verify(&self, token: &str) -> TokenVerdict;
}

/// Shared verifier handle stored in the application state.
pub type VerifierState = Arc<dyn TokenVerifier>;

/// classify
///
/// The guard's decision function. Stateless and evaluated once per request;
/// rules are applied in order:
///
/// 1. The exempt login path is always forwarded, token or not.
/// 2. A path under the protected prefix is redirected unless a present and
///    valid token accompanies it. An invalid token is treated exactly like a
///    missing one.
/// 3. Everything else is forwarded unconditionally.
pub fn classify(
    config: &GuardConfig,
    path: &str,
    token: Option<&str>,
    verifier: &dyn TokenVerifier,
) -> RouteDecision {
    if path == config.login_path {
        return RouteDecision::Forward;
    }

    if path.starts_with(&config.protected_prefix) {
        let valid = token.is_some_and(|t| verifier.verify(t).valid);
        if !valid {
            return RouteDecision::RedirectToLogin;
        }
    }

    RouteDecision::Forward
}

/// extract_token
///
/// Pulls the opaque session token off a request: the session cookie first
/// (browser navigation), then an `Authorization: Bearer` header (API clients).
pub fn extract_token(headers: &HeaderMap) -> Option<String> {
    let jar = CookieJar::from_headers(headers);
    if let Some(cookie) = jar.get(SESSION_COOKIE) {
        return Some(cookie.value().to_string());
    }

    headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(|token| token.to_string())
}

/// route_guard
///
/// Axum middleware applying `classify` to every inbound request. Forwarded
/// requests reach the inner router untouched; everything else becomes a
/// 302 Found pointing at the login path.
pub async fn route_guard(State(state): State<AppState>, request: Request, next: Next) -> Response {
    let token = extract_token(request.headers());

    match classify(
        &state.guard,
        request.uri().path(),
        token.as_deref(),
        state.verifier.as_ref(),
    ) {
        RouteDecision::Forward => next.run(request).await,
        RouteDecision::RedirectToLogin => (
            StatusCode::FOUND,
            [(header::LOCATION, state.guard.login_path.clone())],
        )
            .into_response(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Verifier that accepts exactly one token value.
    struct FixedVerifier {
        accepted: &'static str,
        role: &'static str,
    }

    impl TokenVerifier for FixedVerifier {
        fn verify(&self, token: &str) -> TokenVerdict {
            if token == self.accepted {
                TokenVerdict {
                    valid: true,
                    role: Some(self.role.to_string()),
                }
            } else {
                TokenVerdict::default()
            }
        }
    }

    fn verifier() -> FixedVerifier {
        FixedVerifier {
            accepted: "good-token",
            role: "administrator",
        }
    }

    #[test]
    fn login_path_always_forwards() {
        let config = GuardConfig::default();
        let v = verifier();

        assert_eq!(
            classify(&config, "/admin/login", None, &v),
            RouteDecision::Forward
        );
        assert_eq!(
            classify(&config, "/admin/login", Some("garbage"), &v),
            RouteDecision::Forward
        );
        assert_eq!(
            classify(&config, "/admin/login", Some("good-token"), &v),
            RouteDecision::Forward
        );
    }

    #[test]
    fn protected_path_without_token_redirects() {
        let config = GuardConfig::default();
        assert_eq!(
            classify(&config, "/admin/users", None, &verifier()),
            RouteDecision::RedirectToLogin
        );
    }

    #[test]
    fn invalid_token_is_treated_as_absent() {
        let config = GuardConfig::default();
        assert_eq!(
            classify(&config, "/admin/users", Some("expired-or-mangled"), &verifier()),
            RouteDecision::RedirectToLogin
        );
    }

    #[test]
    fn valid_token_forwards_protected_path() {
        let config = GuardConfig::default();
        assert_eq!(
            classify(&config, "/admin/users", Some("good-token"), &verifier()),
            RouteDecision::Forward
        );
    }

    #[test]
    fn unprotected_path_forwards_unconditionally() {
        let config = GuardConfig::default();
        let v = verifier();

        assert_eq!(classify(&config, "/public/info", None, &v), RouteDecision::Forward);
        assert_eq!(classify(&config, "/models", None, &v), RouteDecision::Forward);
        assert_eq!(
            classify(&config, "/models", Some("garbage"), &v),
            RouteDecision::Forward
        );
    }

    #[test]
    fn classification_is_idempotent() {
        let config = GuardConfig::default();
        let v = verifier();

        for (path, token) in [
            ("/admin/login", None),
            ("/admin/users", None),
            ("/admin/users", Some("good-token")),
            ("/public/info", None),
        ] {
            let first = classify(&config, path, token, &v);
            let second = classify(&config, path, token, &v);
            assert_eq!(first, second, "decision for {path} must be stable");
        }
    }

    #[test]
    fn token_extraction_prefers_cookie() {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::COOKIE,
            "session_token=from-cookie".parse().unwrap(),
        );
        headers.insert(header::AUTHORIZATION, "Bearer from-header".parse().unwrap());

        assert_eq!(extract_token(&headers).as_deref(), Some("from-cookie"));
    }

    #[test]
    fn token_extraction_falls_back_to_bearer() {
        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, "Bearer from-header".parse().unwrap());

        assert_eq!(extract_token(&headers).as_deref(), Some("from-header"));
    }

    #[test]
    fn malformed_authorization_yields_no_token() {
        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, "Basic dXNlcjpwdw==".parse().unwrap());

        assert_eq!(extract_token(&headers), None);
    }
}
