use crate::{
    AppState,
    auth::{self, AuthUser},
    error::AppError,
    guard,
    models::{
        AdminDashboardStats, BlogPost, Builder, CreateBuilderRequest,
        CreateHomeModelRequest, CreateManufacturerRequest, CreatePostRequest, CreateUserRequest,
        HomeModel, LoginRequest, LoginResponse, Manufacturer, PresignedUrlRequest,
        PresignedUrlResponse, UpdateBuilderRequest, UpdateHomeModelRequest,
        UpdateManufacturerRequest, UpdatePostRequest, UpdateUserRoleRequest, User, UserProfile,
    },
};
use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use serde::Deserialize;
use uuid::Uuid;

// --- Filter Structs ---

/// ModelFilter
///
/// Accepted query parameters for the public model listing (GET /models).
#[derive(Deserialize, utoipa::IntoParams)]
pub struct ModelFilter {
    /// Restrict to a single manufacturer.
    pub manufacturer: Option<Uuid>,
    /// Exact bedroom count.
    pub bedrooms: Option<i32>,
    /// Case-insensitive search over name and description.
    pub search: Option<String>,
}

// --- Public Catalog Handlers ---

/// [Public Route] Lists all manufacturers.
#[utoipa::path(
    get,
    path = "/manufacturers",
    responses((status = 200, description = "Manufacturers", body = [Manufacturer]))
)]
pub async fn get_manufacturers(State(state): State<AppState>) -> Json<Vec<Manufacturer>> {
    Json(state.repo.list_manufacturers().await)
}

/// [Public Route] Retrieves a single manufacturer by ID.
#[utoipa::path(
    get,
    path = "/manufacturers/{id}",
    params(("id" = Uuid, Path, description = "Manufacturer ID")),
    responses((status = 200, description = "Found", body = Manufacturer))
)]
pub async fn get_manufacturer_details(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Manufacturer>, AppError> {
    match state.repo.get_manufacturer(id).await {
        Some(manufacturer) => Ok(Json(manufacturer)),
        None => Err(AppError::NotFound("manufacturer not found".to_string())),
    }
}

/// [Public Route] Lists all builders, grouped by region.
#[utoipa::path(
    get,
    path = "/builders",
    responses((status = 200, description = "Builders", body = [Builder]))
)]
pub async fn get_builders(State(state): State<AppState>) -> Json<Vec<Builder>> {
    Json(state.repo.list_builders().await)
}

/// [Public Route] Retrieves a single builder by ID.
#[utoipa::path(
    get,
    path = "/builders/{id}",
    params(("id" = Uuid, Path, description = "Builder ID")),
    responses((status = 200, description = "Found", body = Builder))
)]
pub async fn get_builder_details(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Builder>, AppError> {
    match state.repo.get_builder(id).await {
        Some(builder) => Ok(Json(builder)),
        None => Err(AppError::NotFound("builder not found".to_string())),
    }
}

/// [Public Route] Lists published home models with filtering and search.
/// The repository applies `is_published = true` unconditionally, so drafts
/// never leak to anonymous visitors.
#[utoipa::path(
    get,
    path = "/models",
    params(ModelFilter),
    responses((status = 200, description = "List filtered models", body = [HomeModel]))
)]
pub async fn get_models(
    State(state): State<AppState>,
    Query(filter): Query<ModelFilter>,
) -> Json<Vec<HomeModel>> {
    let homes = state
        .repo
        .list_published_models(filter.manufacturer, filter.bedrooms, filter.search)
        .await;
    Json(homes)
}

/// [Public Route] Retrieves the models highlighted on the landing page.
#[utoipa::path(
    get,
    path = "/models/featured",
    responses((status = 200, description = "Featured models", body = [HomeModel]))
)]
pub async fn get_featured_models(State(state): State<AppState>) -> Json<Vec<HomeModel>> {
    Json(state.repo.get_featured_models(6).await)
}

/// [Public Route] Retrieves a single published model by ID. Drafts answer 404.
#[utoipa::path(
    get,
    path = "/models/{id}",
    params(("id" = Uuid, Path, description = "Model ID")),
    responses((status = 200, description = "Found", body = HomeModel))
)]
pub async fn get_model_details(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<HomeModel>, AppError> {
    match state.repo.get_published_model(id).await {
        Some(model) => Ok(Json(model)),
        None => Err(AppError::NotFound("model not found".to_string())),
    }
}

/// [Public Route] Lists published blog posts, newest first.
#[utoipa::path(
    get,
    path = "/posts",
    responses((status = 200, description = "Posts", body = [BlogPost]))
)]
pub async fn get_posts(State(state): State<AppState>) -> Json<Vec<BlogPost>> {
    Json(state.repo.list_published_posts().await)
}

/// [Public Route] Retrieves a published post by its slug.
#[utoipa::path(
    get,
    path = "/posts/{slug}",
    params(("slug" = String, Path, description = "Post slug")),
    responses((status = 200, description = "Found", body = BlogPost))
)]
pub async fn get_post_by_slug(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<Json<BlogPost>, AppError> {
    match state.repo.get_published_post(slug).await {
        Some(post) => Ok(Json(post)),
        None => Err(AppError::NotFound("post not found".to_string())),
    }
}

// --- Session Handlers ---

/// [Exempt Route] Session entry point. Verifies the credential pair and
/// issues the session token, both in the response body and as an HttpOnly
/// cookie so browser navigation passes the route guard.
///
/// Unknown email and wrong password are indistinguishable in the response.
#[utoipa::path(
    post,
    path = "/admin/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Session issued", body = LoginResponse),
        (status = 401, description = "Invalid credentials")
    )
)]
pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(payload): Json<LoginRequest>,
) -> Result<(CookieJar, Json<LoginResponse>), AppError> {
    let record = state
        .repo
        .get_user_by_email(payload.email)
        .await
        .ok_or_else(|| AppError::Unauthorized("invalid email or password".to_string()))?;

    if !auth::verify_password(&payload.password, &record.password_hash) {
        return Err(AppError::Unauthorized(
            "invalid email or password".to_string(),
        ));
    }

    let token = auth::issue_token(
        record.id,
        &record.role,
        &state.config.jwt_secret,
        state.config.session_ttl_secs,
    )
    .map_err(|e| AppError::Internal(format!("token issuance failed: {e}")))?;

    let cookie = Cookie::build((guard::SESSION_COOKIE, token.clone()))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .build();

    tracing::info!(user_id = %record.id, "session issued");

    Ok((
        jar.add(cookie),
        Json(LoginResponse {
            token,
            user: UserProfile {
                id: record.id,
                email: record.email,
                role: record.role,
            },
        }),
    ))
}

/// [Admin Route] Clears the session cookie. The token itself stays valid
/// until expiry; only the browser-side handle is dropped.
#[utoipa::path(
    post,
    path = "/admin/logout",
    responses((status = 204, description = "Session cookie cleared"))
)]
pub async fn logout(jar: CookieJar) -> (CookieJar, StatusCode) {
    let mut cookie = Cookie::from(guard::SESSION_COOKIE);
    cookie.set_path("/");
    (jar.remove(cookie), StatusCode::NO_CONTENT)
}

/// [Admin Route] Returns the authenticated user's own profile.
#[utoipa::path(
    get,
    path = "/admin/me",
    responses((status = 200, description = "Profile", body = UserProfile))
)]
pub async fn get_me(
    AuthUser { id, .. }: AuthUser,
    State(state): State<AppState>,
) -> Result<Json<UserProfile>, AppError> {
    let user = state
        .repo
        .get_user(id)
        .await
        .ok_or_else(|| AppError::NotFound("user not found".to_string()))?;

    Ok(Json(UserProfile {
        id: user.id,
        email: user.email,
        role: user.role,
    }))
}

// --- Admin Dashboard ---

/// [Admin Route] Retrieves the back-office dashboard counters.
#[utoipa::path(
    get,
    path = "/admin/stats",
    responses((status = 200, description = "Stats", body = AdminDashboardStats))
)]
pub async fn get_admin_stats(
    _auth: AuthUser,
    State(state): State<AppState>,
) -> Json<AdminDashboardStats> {
    Json(state.repo.get_stats().await)
}

// --- Admin Manufacturer Handlers ---

/// [Admin Route] Creates a manufacturer.
#[utoipa::path(
    post,
    path = "/admin/manufacturers",
    request_body = CreateManufacturerRequest,
    responses((status = 201, description = "Created", body = Manufacturer))
)]
pub async fn create_manufacturer(
    _auth: AuthUser,
    State(state): State<AppState>,
    Json(payload): Json<CreateManufacturerRequest>,
) -> Result<(StatusCode, Json<Manufacturer>), AppError> {
    match state.repo.create_manufacturer(payload).await {
        Some(manufacturer) => Ok((StatusCode::CREATED, Json(manufacturer))),
        None => Err(AppError::Internal(
            "manufacturer insert failed".to_string(),
        )),
    }
}

/// [Admin Route] Partially updates a manufacturer.
#[utoipa::path(
    put,
    path = "/admin/manufacturers/{id}",
    request_body = UpdateManufacturerRequest,
    responses((status = 200, description = "Updated", body = Manufacturer))
)]
pub async fn update_manufacturer(
    _auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateManufacturerRequest>,
) -> Result<Json<Manufacturer>, AppError> {
    match state.repo.update_manufacturer(id, payload).await {
        Some(manufacturer) => Ok(Json(manufacturer)),
        None => Err(AppError::NotFound("manufacturer not found".to_string())),
    }
}

/// [Admin Route] Deletes a manufacturer.
#[utoipa::path(
    delete,
    path = "/admin/manufacturers/{id}",
    responses((status = 204, description = "Deleted"), (status = 404, description = "Not Found"))
)]
pub async fn delete_manufacturer(
    _auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    if state.repo.delete_manufacturer(id).await {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::NotFound("manufacturer not found".to_string()))
    }
}

// --- Admin Builder Handlers ---

/// [Admin Route] Creates a builder.
#[utoipa::path(
    post,
    path = "/admin/builders",
    request_body = CreateBuilderRequest,
    responses((status = 201, description = "Created", body = Builder))
)]
pub async fn create_builder(
    _auth: AuthUser,
    State(state): State<AppState>,
    Json(payload): Json<CreateBuilderRequest>,
) -> Result<(StatusCode, Json<Builder>), AppError> {
    match state.repo.create_builder(payload).await {
        Some(builder) => Ok((StatusCode::CREATED, Json(builder))),
        None => Err(AppError::Internal("builder insert failed".to_string())),
    }
}

/// [Admin Route] Partially updates a builder.
#[utoipa::path(
    put,
    path = "/admin/builders/{id}",
    request_body = UpdateBuilderRequest,
    responses((status = 200, description = "Updated", body = Builder))
)]
pub async fn update_builder(
    _auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateBuilderRequest>,
) -> Result<Json<Builder>, AppError> {
    match state.repo.update_builder(id, payload).await {
        Some(builder) => Ok(Json(builder)),
        None => Err(AppError::NotFound("builder not found".to_string())),
    }
}

/// [Admin Route] Deletes a builder.
#[utoipa::path(
    delete,
    path = "/admin/builders/{id}",
    responses((status = 204, description = "Deleted"), (status = 404, description = "Not Found"))
)]
pub async fn delete_builder(
    _auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    if state.repo.delete_builder(id).await {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::NotFound("builder not found".to_string()))
    }
}

// --- Admin Model Handlers ---

/// [Admin Route] Lists every model including drafts, drafts first.
#[utoipa::path(
    get,
    path = "/admin/models",
    responses((status = 200, description = "All models", body = [HomeModel]))
)]
pub async fn get_admin_models(
    _auth: AuthUser,
    State(state): State<AppState>,
) -> Json<Vec<HomeModel>> {
    Json(state.repo.list_all_models().await)
}

/// [Admin Route] Adds a model to the catalog. New models start as drafts and
/// become publicly visible through the status endpoint.
#[utoipa::path(
    post,
    path = "/admin/models",
    request_body = CreateHomeModelRequest,
    responses((status = 201, description = "Created", body = HomeModel))
)]
pub async fn create_model(
    _auth: AuthUser,
    State(state): State<AppState>,
    Json(payload): Json<CreateHomeModelRequest>,
) -> Result<(StatusCode, Json<HomeModel>), AppError> {
    match state.repo.create_model(payload).await {
        Some(model) => Ok((StatusCode::CREATED, Json(model))),
        None => Err(AppError::Internal("model insert failed".to_string())),
    }
}

/// [Admin Route] Partially updates a model.
#[utoipa::path(
    put,
    path = "/admin/models/{id}",
    request_body = UpdateHomeModelRequest,
    responses((status = 200, description = "Updated", body = HomeModel))
)]
pub async fn update_model(
    _auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateHomeModelRequest>,
) -> Result<Json<HomeModel>, AppError> {
    match state.repo.update_model(id, payload).await {
        Some(model) => Ok(Json(model)),
        None => Err(AppError::NotFound("model not found".to_string())),
    }
}

/// [Admin Route] Removes a model from the catalog.
#[utoipa::path(
    delete,
    path = "/admin/models/{id}",
    responses((status = 204, description = "Deleted"), (status = 404, description = "Not Found"))
)]
pub async fn delete_model(
    _auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    if state.repo.delete_model(id).await {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::NotFound("model not found".to_string()))
    }
}

/// [Admin Route] Publishes or hides a model on the public catalog.
#[utoipa::path(
    put,
    path = "/admin/models/{id}/status",
    params(("id" = Uuid, Path, description = "Model ID")),
    request_body = bool,
    responses((status = 200, description = "Updated", body = HomeModel))
)]
pub async fn update_model_status(
    _auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(is_published): Json<bool>,
) -> Result<Json<HomeModel>, AppError> {
    match state.repo.set_model_published(id, is_published).await {
        Some(model) => Ok(Json(model)),
        None => Err(AppError::NotFound("model not found".to_string())),
    }
}

// --- Admin Post Handlers ---

/// [Admin Route] Lists every post including drafts.
#[utoipa::path(
    get,
    path = "/admin/posts",
    responses((status = 200, description = "All posts", body = [BlogPost]))
)]
pub async fn get_admin_posts(
    _auth: AuthUser,
    State(state): State<AppState>,
) -> Json<Vec<BlogPost>> {
    Json(state.repo.list_all_posts().await)
}

/// [Admin Route] Creates a draft post authored by the session user.
#[utoipa::path(
    post,
    path = "/admin/posts",
    request_body = CreatePostRequest,
    responses((status = 201, description = "Created", body = BlogPost))
)]
pub async fn create_post(
    AuthUser { id: author_id, .. }: AuthUser,
    State(state): State<AppState>,
    Json(payload): Json<CreatePostRequest>,
) -> Result<(StatusCode, Json<BlogPost>), AppError> {
    match state.repo.create_post(payload, author_id).await {
        Some(post) => Ok((StatusCode::CREATED, Json(post))),
        None => Err(AppError::Internal("post insert failed".to_string())),
    }
}

/// [Admin Route] Partially updates a post.
#[utoipa::path(
    put,
    path = "/admin/posts/{id}",
    request_body = UpdatePostRequest,
    responses((status = 200, description = "Updated", body = BlogPost))
)]
pub async fn update_post(
    _auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdatePostRequest>,
) -> Result<Json<BlogPost>, AppError> {
    match state.repo.update_post(id, payload).await {
        Some(post) => Ok(Json(post)),
        None => Err(AppError::NotFound("post not found".to_string())),
    }
}

/// [Admin Route] Deletes a post.
#[utoipa::path(
    delete,
    path = "/admin/posts/{id}",
    responses((status = 204, description = "Deleted"), (status = 404, description = "Not Found"))
)]
pub async fn delete_post(
    _auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    if state.repo.delete_post(id).await {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::NotFound("post not found".to_string()))
    }
}

/// [Admin Route] Publishes or hides a post. First publication stamps the
/// public date.
#[utoipa::path(
    put,
    path = "/admin/posts/{id}/status",
    params(("id" = Uuid, Path, description = "Post ID")),
    request_body = bool,
    responses((status = 200, description = "Updated", body = BlogPost))
)]
pub async fn update_post_status(
    _auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(is_published): Json<bool>,
) -> Result<Json<BlogPost>, AppError> {
    match state.repo.set_post_published(id, is_published).await {
        Some(post) => Ok(Json(post)),
        None => Err(AppError::NotFound("post not found".to_string())),
    }
}

// --- Admin User Handlers ---
// Role restriction is finer-grained here than the route guard provides: any
// valid session passes the routing layer, and these handlers additionally
// require the "administrator" role.

/// [Admin Route, administrator only] Lists back-office accounts.
#[utoipa::path(
    get,
    path = "/admin/users",
    responses(
        (status = 200, description = "Users", body = [User]),
        (status = 403, description = "Not an administrator")
    )
)]
pub async fn get_users(
    AuthUser { role, .. }: AuthUser,
    State(state): State<AppState>,
) -> Result<Json<Vec<User>>, AppError> {
    if role != "administrator" {
        return Err(AppError::Forbidden(
            "administrator role required".to_string(),
        ));
    }
    Ok(Json(state.repo.list_users().await))
}

/// [Admin Route, administrator only] Creates a back-office account. The
/// password is hashed before it reaches the store.
#[utoipa::path(
    post,
    path = "/admin/users",
    request_body = CreateUserRequest,
    responses(
        (status = 201, description = "Created", body = User),
        (status = 403, description = "Not an administrator")
    )
)]
pub async fn create_user(
    AuthUser { role, .. }: AuthUser,
    State(state): State<AppState>,
    Json(payload): Json<CreateUserRequest>,
) -> Result<(StatusCode, Json<User>), AppError> {
    if role != "administrator" {
        return Err(AppError::Forbidden(
            "administrator role required".to_string(),
        ));
    }
    if payload.role != "administrator" && payload.role != "editor" {
        return Err(AppError::BadRequest(format!(
            "unknown role: {}",
            payload.role
        )));
    }

    let password_hash = auth::hash_password(&payload.password)?;

    match state
        .repo
        .create_user(payload.email, password_hash, payload.role)
        .await
    {
        Some(user) => Ok((StatusCode::CREATED, Json(user))),
        // The unique constraint on email is the usual cause.
        None => Err(AppError::Conflict("email already registered".to_string())),
    }
}

/// [Admin Route, administrator only] Changes an account's role.
#[utoipa::path(
    put,
    path = "/admin/users/{id}/role",
    params(("id" = Uuid, Path, description = "User ID")),
    request_body = UpdateUserRoleRequest,
    responses(
        (status = 200, description = "Updated", body = User),
        (status = 403, description = "Not an administrator")
    )
)]
pub async fn update_user_role(
    AuthUser { role, .. }: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateUserRoleRequest>,
) -> Result<Json<User>, AppError> {
    if role != "administrator" {
        return Err(AppError::Forbidden(
            "administrator role required".to_string(),
        ));
    }
    if payload.role != "administrator" && payload.role != "editor" {
        return Err(AppError::BadRequest(format!(
            "unknown role: {}",
            payload.role
        )));
    }

    match state.repo.set_user_role(id, payload.role).await {
        Some(user) => Ok(Json(user)),
        None => Err(AppError::NotFound("user not found".to_string())),
    }
}

/// [Admin Route, administrator only] Deletes an account. Deleting one's own
/// account is refused so a lone administrator cannot lock everyone out.
#[utoipa::path(
    delete,
    path = "/admin/users/{id}",
    responses(
        (status = 204, description = "Deleted"),
        (status = 403, description = "Not an administrator"),
        (status = 404, description = "Not Found")
    )
)]
pub async fn delete_user(
    AuthUser { id: caller_id, role }: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    if role != "administrator" {
        return Err(AppError::Forbidden(
            "administrator role required".to_string(),
        ));
    }
    if id == caller_id {
        return Err(AppError::Conflict(
            "cannot delete the active account".to_string(),
        ));
    }

    if state.repo.delete_user(id).await {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::NotFound("user not found".to_string()))
    }
}

// --- Media Upload ---

/// [Admin Route] Generates a temporary URL for direct client-to-bucket image
/// upload. The URL is short-lived, constrained to the declared MIME type,
/// and keyed under a fresh UUID.
#[utoipa::path(
    post,
    path = "/admin/upload/presigned",
    request_body = PresignedUrlRequest,
    responses((status = 200, description = "URL", body = PresignedUrlResponse))
)]
pub async fn get_presigned_url(
    _auth: AuthUser,
    State(state): State<AppState>,
    Json(payload): Json<PresignedUrlRequest>,
) -> impl IntoResponse {
    // Derive a structured object key: 'catalog/UUID.ext'.
    let extension = std::path::Path::new(&payload.filename)
        .extension()
        .and_then(std::ffi::OsStr::to_str)
        .unwrap_or("bin");
    let unique_id = Uuid::new_v4();
    let object_key = format!("catalog/{}.{}", unique_id, extension);

    match state
        .storage
        .get_presigned_upload_url(&object_key, &payload.file_type)
        .await
    {
        Ok(url) => {
            let response = PresignedUrlResponse {
                upload_url: url,
                resource_key: object_key,
            };
            (StatusCode::OK, Json(response)).into_response()
        }
        Err(e) => {
            tracing::error!(error = %e, "presigned URL generation failed");
            AppError::Internal("storage unavailable".to_string()).into_response()
        }
    }
}
