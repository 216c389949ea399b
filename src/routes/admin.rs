use crate::{AppState, handlers};
use axum::{
    Router,
    routing::{delete, get, post, put},
};

/// Admin Router Module
///
/// The back-office CRUD surface, nested under `/admin` and therefore behind
/// the route guard. Handlers re-check the session through the `AuthUser`
/// extractor, and the user-management handlers additionally require the
/// `administrator` role.
pub fn admin_routes() -> Router<AppState> {
    Router::new()
        // GET /admin/stats
        // Dashboard counters (entity totals, draft backlog).
        .route("/stats", get(handlers::get_admin_stats))
        // --- Manufacturers ---
        .route("/manufacturers", post(handlers::create_manufacturer))
        .route(
            "/manufacturers/{id}",
            put(handlers::update_manufacturer).delete(handlers::delete_manufacturer),
        )
        // --- Builders ---
        .route("/builders", post(handlers::create_builder))
        .route(
            "/builders/{id}",
            put(handlers::update_builder).delete(handlers::delete_builder),
        )
        // --- Home models ---
        // GET lists drafts too; POST creates a draft.
        .route(
            "/models",
            get(handlers::get_admin_models).post(handlers::create_model),
        )
        .route(
            "/models/{id}",
            put(handlers::update_model).delete(handlers::delete_model),
        )
        // PUT /admin/models/{id}/status
        // The publish/hide moderation switch.
        .route("/models/{id}/status", put(handlers::update_model_status))
        // --- Blog posts ---
        .route(
            "/posts",
            get(handlers::get_admin_posts).post(handlers::create_post),
        )
        .route(
            "/posts/{id}",
            put(handlers::update_post).delete(handlers::delete_post),
        )
        .route("/posts/{id}/status", put(handlers::update_post_status))
        // --- Users (administrator only, enforced in the handlers) ---
        .route(
            "/users",
            get(handlers::get_users).post(handlers::create_user),
        )
        .route("/users/{id}", delete(handlers::delete_user))
        .route("/users/{id}/role", put(handlers::update_user_role))
        // POST /admin/upload/presigned
        // Direct-to-bucket image upload for catalog media.
        .route("/upload/presigned", post(handlers::get_presigned_url))
}
