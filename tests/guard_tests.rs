use async_trait::async_trait;
use axum::{
    body::Body,
    http::{Request, StatusCode, header},
};
use chrono::Utc;
use prefab_portal::{
    AppConfig, AppState, auth,
    models::{
        AdminDashboardStats, AuthRecord, BlogPost, Builder, CreateBuilderRequest,
        CreateHomeModelRequest, CreateManufacturerRequest, CreatePostRequest, HomeModel,
        Manufacturer, UpdateBuilderRequest, UpdateHomeModelRequest, UpdateManufacturerRequest,
        UpdatePostRequest, User,
    },
    create_router,
    repository::Repository,
    storage::MockStorageService,
};
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};
use tower::ServiceExt;
use uuid::Uuid;

// --- Stub Repository ---

// The guard itself never touches the repository; only the handlers behind it
// do (via the AuthUser extractor). One configurable user is enough.
struct StubRepo {
    user: Option<User>,
}

#[async_trait]
impl Repository for StubRepo {
    async fn get_user(&self, _id: Uuid) -> Option<User> {
        self.user.clone()
    }
    async fn list_users(&self) -> Vec<User> {
        self.user.clone().into_iter().collect()
    }

    // Remaining operations are unreachable in these tests.
    async fn list_manufacturers(&self) -> Vec<Manufacturer> {
        vec![]
    }
    async fn get_manufacturer(&self, _id: Uuid) -> Option<Manufacturer> {
        None
    }
    async fn create_manufacturer(&self, _req: CreateManufacturerRequest) -> Option<Manufacturer> {
        None
    }
    async fn update_manufacturer(
        &self,
        _id: Uuid,
        _req: UpdateManufacturerRequest,
    ) -> Option<Manufacturer> {
        None
    }
    async fn delete_manufacturer(&self, _id: Uuid) -> bool {
        false
    }
    async fn list_builders(&self) -> Vec<Builder> {
        vec![]
    }
    async fn get_builder(&self, _id: Uuid) -> Option<Builder> {
        None
    }
    async fn create_builder(&self, _req: CreateBuilderRequest) -> Option<Builder> {
        None
    }
    async fn update_builder(&self, _id: Uuid, _req: UpdateBuilderRequest) -> Option<Builder> {
        None
    }
    async fn delete_builder(&self, _id: Uuid) -> bool {
        false
    }
    async fn list_published_models(
        &self,
        _manufacturer: Option<Uuid>,
        _bedrooms: Option<i32>,
        _search: Option<String>,
    ) -> Vec<HomeModel> {
        vec![]
    }
    async fn list_all_models(&self) -> Vec<HomeModel> {
        vec![]
    }
    async fn get_featured_models(&self, _limit: i64) -> Vec<HomeModel> {
        vec![]
    }
    async fn get_published_model(&self, _id: Uuid) -> Option<HomeModel> {
        None
    }
    async fn create_model(&self, _req: CreateHomeModelRequest) -> Option<HomeModel> {
        None
    }
    async fn update_model(&self, _id: Uuid, _req: UpdateHomeModelRequest) -> Option<HomeModel> {
        None
    }
    async fn delete_model(&self, _id: Uuid) -> bool {
        false
    }
    async fn set_model_published(&self, _id: Uuid, _is_published: bool) -> Option<HomeModel> {
        None
    }
    async fn list_published_posts(&self) -> Vec<BlogPost> {
        vec![]
    }
    async fn list_all_posts(&self) -> Vec<BlogPost> {
        vec![]
    }
    async fn get_published_post(&self, _slug: String) -> Option<BlogPost> {
        None
    }
    async fn create_post(&self, _req: CreatePostRequest, _author_id: Uuid) -> Option<BlogPost> {
        None
    }
    async fn update_post(&self, _id: Uuid, _req: UpdatePostRequest) -> Option<BlogPost> {
        None
    }
    async fn delete_post(&self, _id: Uuid) -> bool {
        false
    }
    async fn set_post_published(&self, _id: Uuid, _is_published: bool) -> Option<BlogPost> {
        None
    }
    async fn get_user_by_email(&self, _email: String) -> Option<AuthRecord> {
        None
    }
    async fn create_user(
        &self,
        _email: String,
        _password_hash: String,
        _role: String,
    ) -> Option<User> {
        None
    }
    async fn set_user_role(&self, _id: Uuid, _role: String) -> Option<User> {
        None
    }
    async fn delete_user(&self, _id: Uuid) -> bool {
        false
    }
    async fn get_stats(&self) -> AdminDashboardStats {
        AdminDashboardStats::default()
    }
}

// --- Helpers ---

fn staff_user(role: &str) -> User {
    User {
        id: Uuid::new_v4(),
        email: "staff@example.com".to_string(),
        role: role.to_string(),
        created_at: Utc::now(),
    }
}

fn test_state(user: Option<User>) -> AppState {
    AppState::new(
        Arc::new(StubRepo { user }),
        Arc::new(MockStorageService::new()),
        AppConfig::default(),
    )
}

fn valid_token(state: &AppState, user: &User) -> String {
    auth::issue_token(user.id, &user.role, &state.config.jwt_secret, 3600).unwrap()
}

/// Token that decoded fine once, but whose expiry is well in the past.
fn expired_token(state: &AppState, user: &User) -> String {
    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_secs() as usize;
    let claims = auth::Claims {
        sub: user.id,
        role: user.role.clone(),
        iat: now - 7200,
        exp: now - 3600,
    };
    jsonwebtoken::encode(
        &jsonwebtoken::Header::default(),
        &claims,
        &jsonwebtoken::EncodingKey::from_secret(state.config.jwt_secret.as_bytes()),
    )
    .unwrap()
}

async fn get(state: AppState, path: &str, token: Option<&str>) -> axum::response::Response {
    let mut builder = Request::builder().method("GET").uri(path);
    if let Some(t) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {t}"));
    }
    create_router(state)
        .oneshot(builder.body(Body::empty()).unwrap())
        .await
        .unwrap()
}

fn assert_redirects_to_login(response: &axum::response::Response) {
    assert_eq!(response.status(), StatusCode::FOUND);
    assert_eq!(
        response
            .headers()
            .get(header::LOCATION)
            .and_then(|v| v.to_str().ok()),
        Some("/admin/login")
    );
}

// --- Tests ---

#[tokio::test]
async fn login_path_reaches_handler_without_token() {
    // POST /admin/login with no session must reach the login handler: the
    // stub repo knows no such email, so a 401 (not a 302) proves the guard
    // let the request through.
    let state = test_state(None);

    let request = Request::builder()
        .method("POST")
        .uri("/admin/login")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(
            serde_json::json!({ "email": "who@example.com", "password": "pw" }).to_string(),
        ))
        .unwrap();

    let response = create_router(state).oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert!(response.headers().get(header::LOCATION).is_none());
}

#[tokio::test]
async fn protected_path_without_token_redirects() {
    let response = get(test_state(None), "/admin/users", None).await;
    assert_redirects_to_login(&response);
}

#[tokio::test]
async fn protected_path_with_garbage_token_redirects() {
    let response = get(test_state(None), "/admin/users", Some("not.a.token")).await;
    assert_redirects_to_login(&response);
}

#[tokio::test]
async fn protected_path_with_expired_token_redirects() {
    let user = staff_user("administrator");
    let state = test_state(Some(user.clone()));
    let token = expired_token(&state, &user);

    let response = get(state, "/admin/users", Some(&token)).await;
    assert_redirects_to_login(&response);
}

#[tokio::test]
async fn protected_path_with_valid_token_forwards() {
    let user = staff_user("administrator");
    let state = test_state(Some(user.clone()));
    let token = valid_token(&state, &user);

    let response = get(state, "/admin/users", Some(&token)).await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn valid_token_in_cookie_forwards() {
    let user = staff_user("administrator");
    let state = test_state(Some(user.clone()));
    let token = valid_token(&state, &user);

    let request = Request::builder()
        .method("GET")
        .uri("/admin/users")
        .header(header::COOKIE, format!("session_token={token}"))
        .body(Body::empty())
        .unwrap();

    let response = create_router(state).oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn public_paths_forward_unconditionally() {
    // Known public route answers normally.
    let response = get(test_state(None), "/models", None).await;
    assert_eq!(response.status(), StatusCode::OK);

    // Unknown path outside the protected prefix falls through to the
    // router's 404, not to a redirect.
    let response = get(test_state(None), "/public/info", None).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert!(response.headers().get(header::LOCATION).is_none());

    // A garbage token on a public path is irrelevant.
    let response = get(test_state(None), "/models", Some("garbage")).await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn editor_token_passes_guard_for_user_routes() {
    // Role restriction is deliberately not the guard's job: an editor's
    // valid session passes the routing layer, and the user-management
    // handler answers 403 itself.
    let user = staff_user("editor");
    let state = test_state(Some(user.clone()));
    let token = valid_token(&state, &user);

    let response = get(state, "/admin/users", Some(&token)).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn logout_sits_behind_the_guard() {
    // Only /admin/login is exempt; the rest of the session surface is
    // protected like any admin route.
    let state = test_state(None);

    let request = Request::builder()
        .method("POST")
        .uri("/admin/logout")
        .body(Body::empty())
        .unwrap();

    let response = create_router(state).oneshot(request).await.unwrap();
    assert_redirects_to_login(&response);
}
