use crate::{AppState, handlers};
use axum::{
    Router,
    routing::{get, post},
};

/// Session Router Module
///
/// The authentication surface, nested under `/admin`. `/admin/login` is the
/// route guard's single exempt path; logout and profile sit behind the guard
/// like any other admin route.
pub fn session_routes() -> Router<AppState> {
    Router::new()
        // POST /admin/login
        // Credential check and session issuance. Exempt from the guard.
        .route("/login", post(handlers::login))
        // POST /admin/logout
        // Clears the browser's session cookie.
        .route("/logout", post(handlers::logout))
        // GET /admin/me
        // The authenticated caller's own profile.
        .route("/me", get(handlers::get_me))
}
