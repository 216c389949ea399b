use axum::{extract::FromRef, http::HeaderName, Router, middleware};
use std::sync::Arc;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::{DefaultOnResponse, TraceLayer},
};
use tracing::{Level, Span};

// --- Module Structure ---

// Core application services and components.
pub mod auth;
pub mod config;
pub mod error;
pub mod guard;
pub mod handlers;
pub mod models;
pub mod repository;
pub mod storage;

// Module for routing segregation (Public, Session, Admin).
pub mod routes;
use routes::{admin, public, session};

// --- Public Re-exports ---

// Core state types for the binary entry point and the test suites.
pub use config::AppConfig;
pub use guard::{GuardConfig, RouteDecision, VerifierState};
pub use repository::{PostgresRepository, RepositoryState};
pub use storage::{MockStorageService, S3StorageClient, StorageState};

/// ApiDoc
///
/// Aggregates every annotated handler and schema into the OpenAPI document
/// served at `/api-docs/openapi.json` (browsable at `/swagger-ui`).
#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::get_manufacturers, handlers::get_manufacturer_details,
        handlers::get_builders, handlers::get_builder_details,
        handlers::get_models, handlers::get_featured_models, handlers::get_model_details,
        handlers::get_posts, handlers::get_post_by_slug,
        handlers::login, handlers::logout, handlers::get_me,
        handlers::get_admin_stats,
        handlers::create_manufacturer, handlers::update_manufacturer,
        handlers::delete_manufacturer,
        handlers::create_builder, handlers::update_builder, handlers::delete_builder,
        handlers::get_admin_models, handlers::create_model, handlers::update_model,
        handlers::delete_model, handlers::update_model_status,
        handlers::get_admin_posts, handlers::create_post, handlers::update_post,
        handlers::delete_post, handlers::update_post_status,
        handlers::get_users, handlers::create_user, handlers::update_user_role,
        handlers::delete_user,
        handlers::get_presigned_url
    ),
    components(
        schemas(
            models::Manufacturer, models::Builder, models::HomeModel, models::BlogPost,
            models::User, models::UserProfile,
            models::CreateManufacturerRequest, models::UpdateManufacturerRequest,
            models::CreateBuilderRequest, models::UpdateBuilderRequest,
            models::CreateHomeModelRequest, models::UpdateHomeModelRequest,
            models::CreatePostRequest, models::UpdatePostRequest,
            models::CreateUserRequest, models::UpdateUserRoleRequest,
            models::LoginRequest, models::LoginResponse,
            models::PresignedUrlRequest, models::PresignedUrlResponse,
            models::AdminDashboardStats,
        )
    ),
    tags(
        (name = "prefab-catalog", description = "Prefabricated Home Catalog API")
    )
)]
struct ApiDoc;

/// AppState
///
/// The single, immutable container for all shared services, cloned into
/// every request.
#[derive(Clone)]
pub struct AppState {
    /// Repository layer: database access behind the Repository trait.
    pub repo: RepositoryState,
    /// Storage layer: S3 access and presigned URL generation.
    pub storage: StorageState,
    /// The loaded, immutable environment configuration.
    pub config: AppConfig,
    /// Static route-guard configuration (protected prefix, login path).
    pub guard: GuardConfig,
    /// Session token verifier used by the route guard.
    pub verifier: VerifierState,
}

impl AppState {
    /// Assembles the state from its three independently-constructed services.
    /// The guard configuration is static, and the verifier derives from the
    /// configured session secret.
    pub fn new(repo: RepositoryState, storage: StorageState, config: AppConfig) -> Self {
        let verifier: VerifierState = Arc::new(auth::JwtVerifier::new(config.jwt_secret.clone()));
        Self {
            repo,
            storage,
            config,
            guard: GuardConfig::default(),
            verifier,
        }
    }
}

// --- Axum FromRef Extractor Implementations ---

// Let handlers and extractors pull individual services out of the shared state.

impl FromRef<AppState> for RepositoryState {
    fn from_ref(app_state: &AppState) -> RepositoryState {
        app_state.repo.clone()
    }
}

impl FromRef<AppState> for StorageState {
    fn from_ref(app_state: &AppState) -> StorageState {
        app_state.storage.clone()
    }
}

impl FromRef<AppState> for AppConfig {
    fn from_ref(app_state: &AppState) -> AppConfig {
        app_state.config.clone()
    }
}

impl FromRef<AppState> for GuardConfig {
    fn from_ref(app_state: &AppState) -> GuardConfig {
        app_state.guard.clone()
    }
}

impl FromRef<AppState> for VerifierState {
    fn from_ref(app_state: &AppState) -> VerifierState {
        app_state.verifier.clone()
    }
}

/// create_router
///
/// Assembles the routing structure, applies the route guard to every inbound
/// request, and layers observability (request-id, tracing, CORS) outermost.
pub fn create_router(state: AppState) -> Router {
    // 1. CORS Configuration
    let cors = CorsLayer::new()
        .allow_methods(Any)
        .allow_origin(Any)
        .allow_headers(Any);

    // Header name constant for request correlation.
    let x_request_id = HeaderName::from_static("x-request-id");

    // 2. Base Router Assembly
    let base_router = Router::new()
        // Documentation: auto-generated Swagger UI.
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        // Public catalog routes.
        .merge(public::public_routes())
        // Session + back-office routes, both under the protected prefix.
        .nest(
            "/admin",
            session::session_routes().merge(admin::admin_routes()),
        )
        // The Route Guard sees every request; it forwards anything outside
        // the protected prefix, exempts the login path, and redirects the
        // rest unless a valid session token is present.
        .layer(middleware::from_fn_with_state(
            state.clone(),
            guard::route_guard,
        ))
        .with_state(state);

    // 3. Observability and Correlation Layers (outermost)
    base_router
        .layer(
            ServiceBuilder::new()
                // 3a. Request ID generation: unique UUID per inbound request.
                .layer(SetRequestIdLayer::new(x_request_id.clone(), MakeRequestUuid))
                // 3b. Request tracing spanning the whole request/response
                // lifecycle, correlated by the generated request ID.
                .layer(
                    TraceLayer::new_for_http()
                        .make_span_with(trace_span_logger)
                        .on_response(
                            DefaultOnResponse::new()
                                .level(Level::INFO)
                                .latency_unit(tower_http::LatencyUnit::Millis),
                        ),
                )
                // 3c. Request ID propagation back to the client.
                .layer(PropagateRequestIdLayer::new(x_request_id)),
        )
        // 4. CORS layer.
        .layer(cors)
}

/// trace_span_logger
///
/// Builds the per-request tracing span, pulling the `x-request-id` header
/// into the structured metadata so every log line for one request correlates.
fn trace_span_logger(request: &axum::http::Request<axum::body::Body>) -> Span {
    let request_id = request
        .headers()
        .get("x-request-id")
        .and_then(|value| value.to_str().ok())
        .unwrap_or("unknown");

    tracing::info_span!(
        "http_request",
        method = ?request.method(),
        uri = ?request.uri(),
        req_id = %request_id,
    )
}
