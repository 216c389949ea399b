use async_trait::async_trait;
use axum::{
    extract::FromRequestParts,
    http::{Method, Request, Uri, header, request::Parts},
};
use chrono::Utc;
use prefab_portal::{
    AppConfig, AppState, auth,
    auth::AuthUser,
    error::AppError,
    models::{
        AdminDashboardStats, AuthRecord, BlogPost, Builder, CreateBuilderRequest,
        CreateHomeModelRequest, CreateManufacturerRequest, CreatePostRequest, HomeModel,
        Manufacturer, UpdateBuilderRequest, UpdateHomeModelRequest, UpdateManufacturerRequest,
        UpdatePostRequest, User,
    },
    repository::Repository,
    storage::MockStorageService,
};
use std::sync::Arc;
use uuid::Uuid;

// --- Mock Repository for Extractor Logic ---

#[derive(Default)]
struct MockAuthRepo {
    user_to_return: Option<User>,
}

#[async_trait]
impl Repository for MockAuthRepo {
    async fn get_user(&self, _id: Uuid) -> Option<User> {
        self.user_to_return.clone()
    }

    // Placeholders; the extractor only calls get_user.
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
    async fn list_users(&self) -> Vec<User> {
        vec![]
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

const TEST_USER_ID: Uuid = Uuid::from_u128(1);

fn stored_user(role: &str) -> User {
    User {
        id: TEST_USER_ID,
        email: "staff@example.com".to_string(),
        role: role.to_string(),
        created_at: Utc::now(),
    }
}

fn create_app_state(repo: MockAuthRepo) -> AppState {
    AppState::new(
        Arc::new(repo),
        Arc::new(MockStorageService::new()),
        AppConfig::default(),
    )
}

fn get_request_parts(method: Method, uri: Uri) -> Parts {
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .body(axum::body::Body::empty())
        .unwrap();
    let (parts, _) = request.into_parts();
    parts
}

// --- Tests ---

#[tokio::test]
async fn extractor_resolves_user_from_bearer_token() {
    let repo = MockAuthRepo {
        user_to_return: Some(stored_user("editor")),
    };
    let state = create_app_state(repo);
    let token =
        auth::issue_token(TEST_USER_ID, "editor", &state.config.jwt_secret, 3600).unwrap();

    let mut parts = get_request_parts(Method::GET, "/admin/models".parse().unwrap());
    parts.headers.insert(
        header::AUTHORIZATION,
        header::HeaderValue::from_str(&format!("Bearer {}", token)).unwrap(),
    );

    let auth_user = AuthUser::from_request_parts(&mut parts, &state).await.unwrap();
    assert_eq!(auth_user.id, TEST_USER_ID);
    assert_eq!(auth_user.role, "editor");
}

#[tokio::test]
async fn extractor_resolves_user_from_session_cookie() {
    let repo = MockAuthRepo {
        user_to_return: Some(stored_user("administrator")),
    };
    let state = create_app_state(repo);
    let token = auth::issue_token(
        TEST_USER_ID,
        "administrator",
        &state.config.jwt_secret,
        3600,
    )
    .unwrap();

    let mut parts = get_request_parts(Method::GET, "/admin/stats".parse().unwrap());
    parts.headers.insert(
        header::COOKIE,
        header::HeaderValue::from_str(&format!("session_token={}", token)).unwrap(),
    );

    let auth_user = AuthUser::from_request_parts(&mut parts, &state).await.unwrap();
    assert_eq!(auth_user.id, TEST_USER_ID);
}

#[tokio::test]
async fn extractor_rejects_missing_token() {
    let state = create_app_state(MockAuthRepo::default());

    let mut parts = get_request_parts(Method::GET, "/admin/stats".parse().unwrap());

    let result = AuthUser::from_request_parts(&mut parts, &state).await;
    assert!(matches!(result, Err(AppError::Unauthorized(_))));
}

#[tokio::test]
async fn extractor_rejects_token_signed_with_other_secret() {
    let repo = MockAuthRepo {
        user_to_return: Some(stored_user("administrator")),
    };
    let state = create_app_state(repo);
    let token = auth::issue_token(TEST_USER_ID, "administrator", "some-other-secret", 3600)
        .unwrap();

    let mut parts = get_request_parts(Method::GET, "/admin/stats".parse().unwrap());
    parts.headers.insert(
        header::AUTHORIZATION,
        header::HeaderValue::from_str(&format!("Bearer {}", token)).unwrap(),
    );

    let result = AuthUser::from_request_parts(&mut parts, &state).await;
    assert!(matches!(result, Err(AppError::Unauthorized(_))));
}

#[tokio::test]
async fn extractor_rejects_deleted_user() {
    // Token is valid, but the account no longer exists in the store.
    let state = create_app_state(MockAuthRepo {
        user_to_return: None,
    });
    let token = auth::issue_token(
        TEST_USER_ID,
        "administrator",
        &state.config.jwt_secret,
        3600,
    )
    .unwrap();

    let mut parts = get_request_parts(Method::GET, "/admin/stats".parse().unwrap());
    parts.headers.insert(
        header::AUTHORIZATION,
        header::HeaderValue::from_str(&format!("Bearer {}", token)).unwrap(),
    );

    let result = AuthUser::from_request_parts(&mut parts, &state).await;
    assert!(matches!(result, Err(AppError::Unauthorized(_))));
}

#[tokio::test]
async fn extractor_uses_stored_role_over_token_role() {
    // The account was promoted after the token was issued; the store wins.
    let repo = MockAuthRepo {
        user_to_return: Some(stored_user("administrator")),
    };
    let state = create_app_state(repo);
    let token =
        auth::issue_token(TEST_USER_ID, "editor", &state.config.jwt_secret, 3600).unwrap();

    let mut parts = get_request_parts(Method::GET, "/admin/users".parse().unwrap());
    parts.headers.insert(
        header::AUTHORIZATION,
        header::HeaderValue::from_str(&format!("Bearer {}", token)).unwrap(),
    );

    let auth_user = AuthUser::from_request_parts(&mut parts, &state).await.unwrap();
    assert_eq!(auth_user.role, "administrator");
}
