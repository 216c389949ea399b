use crate::{AppState, handlers};
use axum::{Router, routing::get};

/// Public Router Module
///
/// Unauthenticated, read-only catalog endpoints. Every listing and detail
/// handler here serves published content only; draft models and posts are
/// filtered out at the repository level.
pub fn public_routes() -> Router<AppState> {
    Router::new()
        // GET /health
        // Unauthenticated liveness probe for monitoring and load balancers.
        .route("/health", get(|| async { "ok" }))
        // GET /manufacturers, /manufacturers/{id}
        .route("/manufacturers", get(handlers::get_manufacturers))
        .route("/manufacturers/{id}", get(handlers::get_manufacturer_details))
        // GET /builders, /builders/{id}
        .route("/builders", get(handlers::get_builders))
        .route("/builders/{id}", get(handlers::get_builder_details))
        // GET /models?manufacturer=...&bedrooms=...&search=...
        // Published models with filtering and full-text search.
        .route("/models", get(handlers::get_models))
        // GET /models/featured
        // The landing-page carousel selection.
        .route("/models/featured", get(handlers::get_featured_models))
        // GET /models/{id}
        .route("/models/{id}", get(handlers::get_model_details))
        // GET /posts, /posts/{slug}
        // Published editorial content, addressed by slug.
        .route("/posts", get(handlers::get_posts))
        .route("/posts/{slug}", get(handlers::get_post_by_slug))
}
