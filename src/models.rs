use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use ts_rs::TS;
use utoipa::ToSchema;
use uuid::Uuid;

// --- Core Catalog Schemas (Mapped to Database) ---

/// Manufacturer
///
/// A prefabricated-home manufacturer whose model range the catalog presents.
/// Maps to the `manufacturers` table.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, FromRow, Default)]
#[ts(export)]
pub struct Manufacturer {
    pub id: Uuid,
    pub name: String,
    // URL-facing identifier, unique.
    pub slug: String,
    pub description: String,
    // S3 object key of the logo image.
    pub logo: Option<String>,
    pub website: Option<String>,

    #[ts(type = "string")]
    pub created_at: DateTime<Utc>,
    #[ts(type = "string")]
    pub updated_at: DateTime<Utc>,
}

/// Builder
///
/// A regional construction partner that assembles homes on site.
/// Maps to the `builders` table.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, FromRow, Default)]
#[ts(export)]
pub struct Builder {
    pub id: Uuid,
    pub name: String,
    pub region: String,
    pub email: String,
    pub phone: Option<String>,
    pub website: Option<String>,
    // Optional partnership link to a manufacturer.
    pub manufacturer_id: Option<Uuid>,

    #[ts(type = "string")]
    pub created_at: DateTime<Utc>,
    #[ts(type = "string")]
    pub updated_at: DateTime<Utc>,
}

/// HomeModel
///
/// A single home model in a manufacturer's range. Maps to the `home_models`
/// table. Only rows with `is_published = true` are reachable through the
/// public routes; enforcement lives in the repository queries.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, FromRow, Default)]
#[ts(export)]
pub struct HomeModel {
    pub id: Uuid,
    pub manufacturer_id: Uuid,
    pub name: String,
    pub slug: String,
    pub description: String,

    pub bedrooms: i32,
    pub bathrooms: i32,
    pub floor_area_sqm: f64,
    // Stored in cents so pricing survives integer arithmetic.
    pub base_price_cents: i64,

    // S3 object key of the primary photo.
    pub cover_image: String,

    // Visibility on the public catalog.
    pub is_published: bool,
    // Surfaced on the landing carousel.
    pub is_featured: bool,

    #[ts(type = "string")]
    pub created_at: DateTime<Utc>,
    #[ts(type = "string")]
    pub updated_at: DateTime<Utc>,
}

/// BlogPost
///
/// An editorial article. Maps to the `blog_posts` table. Public routes only
/// surface published posts.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, FromRow, Default)]
#[ts(export)]
pub struct BlogPost {
    pub id: Uuid,
    pub author_id: Uuid,
    pub title: String,
    pub slug: String,
    pub body: String,
    pub cover_image: Option<String>,

    pub is_published: bool,
    // Set on first publication, retained across unpublish/republish.
    #[ts(type = "string | null")]
    pub published_at: Option<DateTime<Utc>>,

    #[ts(type = "string")]
    pub created_at: DateTime<Utc>,
    #[ts(type = "string")]
    pub updated_at: DateTime<Utc>,
}

/// User
///
/// A back-office account. Maps to the `users` table, minus the credential
/// hash, which never leaves the repository layer in serialized form.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, FromRow, Default)]
#[ts(export)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    // "administrator" or "editor".
    pub role: String,

    #[ts(type = "string")]
    pub created_at: DateTime<Utc>,
}

/// AuthRecord
///
/// Internal row used exclusively by the login flow: identity plus the stored
/// credential hash. Deliberately not serializable.
#[derive(Debug, Clone, FromRow)]
pub struct AuthRecord {
    pub id: Uuid,
    pub email: String,
    pub role: String,
    pub password_hash: String,
}

// --- Request Payloads (Input Schemas) ---

/// LoginRequest
///
/// Input for the session entry point (POST /admin/login).
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// CreateManufacturerRequest
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct CreateManufacturerRequest {
    pub name: String,
    pub slug: String,
    pub description: String,
    pub logo_key: Option<String>,
    pub website: Option<String>,
}

/// UpdateManufacturerRequest
///
/// Partial update; only `Some` fields are written.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct UpdateManufacturerRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub logo_key: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub website: Option<String>,
}

/// CreateBuilderRequest
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct CreateBuilderRequest {
    pub name: String,
    pub region: String,
    pub email: String,
    pub phone: Option<String>,
    pub website: Option<String>,
    pub manufacturer_id: Option<Uuid>,
}

/// UpdateBuilderRequest
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct UpdateBuilderRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub website: Option<String>,
}

/// CreateHomeModelRequest
///
/// New models enter the catalog unpublished and are made visible through the
/// status endpoint after review.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct CreateHomeModelRequest {
    pub manufacturer_id: Uuid,
    pub name: String,
    pub slug: String,
    pub description: String,
    pub bedrooms: i32,
    pub bathrooms: i32,
    pub floor_area_sqm: f64,
    pub base_price_cents: i64,
    // S3 key resulting from the presigned upload flow.
    pub cover_image_key: String,
}

/// UpdateHomeModelRequest
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct UpdateHomeModelRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub bedrooms: Option<i32>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub bathrooms: Option<i32>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub floor_area_sqm: Option<f64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_price_cents: Option<i64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub cover_image_key: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_featured: Option<bool>,
}

/// CreatePostRequest
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct CreatePostRequest {
    pub title: String,
    pub slug: String,
    pub body: String,
    pub cover_image_key: Option<String>,
}

/// UpdatePostRequest
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct UpdatePostRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub cover_image_key: Option<String>,
}

/// CreateUserRequest
///
/// Administrator-only. The password is hashed before it reaches the store
/// and is never persisted or logged in plaintext.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct CreateUserRequest {
    pub email: String,
    pub password: String,
    pub role: String,
}

/// UpdateUserRoleRequest
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct UpdateUserRoleRequest {
    pub role: String,
}

/// PresignedUrlRequest
///
/// Input for requesting a short-lived S3 upload URL for catalog imagery.
#[derive(Debug, Clone, Deserialize, Serialize, ToSchema, TS, Default)]
#[ts(export)]
pub struct PresignedUrlRequest {
    /// The original filename, used to derive the file extension.
    #[schema(example = "bungalow-front.jpg")]
    pub filename: String,
    /// The MIME type, used to constrain the S3 upload to the allowed type.
    #[schema(example = "image/jpeg")]
    pub file_type: String,
}

/// PresignedUrlResponse
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, TS, Default)]
#[ts(export)]
pub struct PresignedUrlResponse {
    /// The time-limited URL for the PUT request.
    pub upload_url: String,
    /// The S3 object key the file lands under (referenced from the catalog).
    pub resource_key: String,
}

// --- Session & Dashboard Schemas (Output) ---

/// UserProfile
///
/// Output schema for the authenticated user's own profile (GET /admin/me)
/// and the login response.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct UserProfile {
    pub id: Uuid,
    pub email: String,
    pub role: String,
}

/// LoginResponse
///
/// The issued session token plus the principal it belongs to. The same token
/// is also set as an HttpOnly cookie for browser clients.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct LoginResponse {
    pub token: String,
    pub user: UserProfile,
}

/// AdminDashboardStats
///
/// Counters for the back-office dashboard (GET /admin/stats).
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct AdminDashboardStats {
    pub total_manufacturers: i64,
    pub total_builders: i64,
    pub total_models: i64,
    pub total_posts: i64,
    pub total_users: i64,
    /// Models not yet visible on the public catalog.
    pub draft_models: i64,
}
