use crate::models::{
    AdminDashboardStats, AuthRecord, BlogPost, Builder, CreateBuilderRequest,
    CreateHomeModelRequest, CreateManufacturerRequest, CreatePostRequest, HomeModel, Manufacturer,
    UpdateBuilderRequest, UpdateHomeModelRequest, UpdateManufacturerRequest, UpdatePostRequest,
    User,
};
use async_trait::async_trait;
use sqlx::{PgPool, query_builder::QueryBuilder};
use std::sync::Arc;
use uuid::Uuid;

/// Repository
///
/// Abstract contract for all persistence operations. Handlers only ever see
/// this trait, so the concrete backend (Postgres in production, an in-memory
/// mock in tests) is swappable behind `Arc<dyn Repository>`.
///
/// Visibility rules live here: the `*_published` methods hard-code the
/// published filter in their queries, the admin variants do not.
#[async_trait]
pub trait Repository: Send + Sync {
    // --- Manufacturers ---
    async fn list_manufacturers(&self) -> Vec<Manufacturer>;
    async fn get_manufacturer(&self, id: Uuid) -> Option<Manufacturer>;
    async fn create_manufacturer(&self, req: CreateManufacturerRequest) -> Option<Manufacturer>;
    // Partial update; None fields keep their stored value.
    async fn update_manufacturer(
        &self,
        id: Uuid,
        req: UpdateManufacturerRequest,
    ) -> Option<Manufacturer>;
    async fn delete_manufacturer(&self, id: Uuid) -> bool;

    // --- Builders ---
    async fn list_builders(&self) -> Vec<Builder>;
    async fn get_builder(&self, id: Uuid) -> Option<Builder>;
    async fn create_builder(&self, req: CreateBuilderRequest) -> Option<Builder>;
    async fn update_builder(&self, id: Uuid, req: UpdateBuilderRequest) -> Option<Builder>;
    async fn delete_builder(&self, id: Uuid) -> bool;

    // --- Home models ---
    // Public listing with filtering. Must enforce is_published = true.
    async fn list_published_models(
        &self,
        manufacturer: Option<Uuid>,
        bedrooms: Option<i32>,
        search: Option<String>,
    ) -> Vec<HomeModel>;
    // Admin access: every model regardless of status, drafts first.
    async fn list_all_models(&self) -> Vec<HomeModel>;
    async fn get_featured_models(&self, limit: i64) -> Vec<HomeModel>;
    async fn get_published_model(&self, id: Uuid) -> Option<HomeModel>;
    async fn create_model(&self, req: CreateHomeModelRequest) -> Option<HomeModel>;
    async fn update_model(&self, id: Uuid, req: UpdateHomeModelRequest) -> Option<HomeModel>;
    async fn delete_model(&self, id: Uuid) -> bool;
    async fn set_model_published(&self, id: Uuid, is_published: bool) -> Option<HomeModel>;

    // --- Blog posts ---
    async fn list_published_posts(&self) -> Vec<BlogPost>;
    async fn list_all_posts(&self) -> Vec<BlogPost>;
    async fn get_published_post(&self, slug: String) -> Option<BlogPost>;
    async fn create_post(&self, req: CreatePostRequest, author_id: Uuid) -> Option<BlogPost>;
    async fn update_post(&self, id: Uuid, req: UpdatePostRequest) -> Option<BlogPost>;
    async fn delete_post(&self, id: Uuid) -> bool;
    async fn set_post_published(&self, id: Uuid, is_published: bool) -> Option<BlogPost>;

    // --- Users ---
    async fn get_user(&self, id: Uuid) -> Option<User>;
    // Login path only: returns the credential hash alongside the identity.
    async fn get_user_by_email(&self, email: String) -> Option<AuthRecord>;
    async fn list_users(&self) -> Vec<User>;
    async fn create_user(&self, email: String, password_hash: String, role: String)
    -> Option<User>;
    async fn set_user_role(&self, id: Uuid, role: String) -> Option<User>;
    async fn delete_user(&self, id: Uuid) -> bool;

    // --- Dashboard ---
    async fn get_stats(&self) -> AdminDashboardStats;
}

/// RepositoryState
///
/// The concrete type used to share the persistence layer across the
/// application state.
pub type RepositoryState = Arc<dyn Repository>;

/// PostgresRepository
///
/// The `Repository` implementation backed by PostgreSQL. Queries are bound at
/// runtime so the crate builds without a reachable database.
pub struct PostgresRepository {
    pool: PgPool,
}

impl PostgresRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

const MANUFACTURER_COLS: &str = "id, name, slug, description, logo, website, created_at, updated_at";
const BUILDER_COLS: &str =
    "id, name, region, email, phone, website, manufacturer_id, created_at, updated_at";
const MODEL_COLS: &str = "id, manufacturer_id, name, slug, description, bedrooms, bathrooms, \
     floor_area_sqm, base_price_cents, cover_image, is_published, is_featured, created_at, updated_at";
const POST_COLS: &str =
    "id, author_id, title, slug, body, cover_image, is_published, published_at, created_at, updated_at";

#[async_trait]
impl Repository for PostgresRepository {
    // --- MANUFACTURERS ---

    async fn list_manufacturers(&self) -> Vec<Manufacturer> {
        let sql = format!("SELECT {MANUFACTURER_COLS} FROM manufacturers ORDER BY name ASC");
        sqlx::query_as::<_, Manufacturer>(&sql)
            .fetch_all(&self.pool)
            .await
            .unwrap_or_else(|e| {
                tracing::error!("list_manufacturers error: {:?}", e);
                vec![]
            })
    }

    async fn get_manufacturer(&self, id: Uuid) -> Option<Manufacturer> {
        let sql = format!("SELECT {MANUFACTURER_COLS} FROM manufacturers WHERE id = $1");
        sqlx::query_as::<_, Manufacturer>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .unwrap_or_else(|e| {
                tracing::error!("get_manufacturer error: {:?}", e);
                None
            })
    }

    async fn create_manufacturer(&self, req: CreateManufacturerRequest) -> Option<Manufacturer> {
        let sql = format!(
            "INSERT INTO manufacturers (id, name, slug, description, logo, website, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5, $6, NOW(), NOW()) \
             RETURNING {MANUFACTURER_COLS}"
        );
        sqlx::query_as::<_, Manufacturer>(&sql)
            .bind(Uuid::new_v4())
            .bind(req.name)
            .bind(req.slug)
            .bind(req.description)
            .bind(req.logo_key)
            .bind(req.website)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| tracing::error!("create_manufacturer error: {:?}", e))
            .ok()
    }

    async fn update_manufacturer(
        &self,
        id: Uuid,
        req: UpdateManufacturerRequest,
    ) -> Option<Manufacturer> {
        // COALESCE keeps stored values for fields the request leaves unset.
        let sql = format!(
            "UPDATE manufacturers \
             SET name = COALESCE($2, name), \
                 description = COALESCE($3, description), \
                 logo = COALESCE($4, logo), \
                 website = COALESCE($5, website), \
                 updated_at = NOW() \
             WHERE id = $1 \
             RETURNING {MANUFACTURER_COLS}"
        );
        sqlx::query_as::<_, Manufacturer>(&sql)
            .bind(id)
            .bind(req.name)
            .bind(req.description)
            .bind(req.logo_key)
            .bind(req.website)
            .fetch_optional(&self.pool)
            .await
            .unwrap_or_else(|e| {
                tracing::error!("update_manufacturer error: {:?}", e);
                None
            })
    }

    async fn delete_manufacturer(&self, id: Uuid) -> bool {
        match sqlx::query("DELETE FROM manufacturers WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
        {
            Ok(res) => res.rows_affected() > 0,
            Err(e) => {
                tracing::error!("delete_manufacturer error: {:?}", e);
                false
            }
        }
    }

    // --- BUILDERS ---

    async fn list_builders(&self) -> Vec<Builder> {
        let sql = format!("SELECT {BUILDER_COLS} FROM builders ORDER BY region ASC, name ASC");
        sqlx::query_as::<_, Builder>(&sql)
            .fetch_all(&self.pool)
            .await
            .unwrap_or_else(|e| {
                tracing::error!("list_builders error: {:?}", e);
                vec![]
            })
    }

    async fn get_builder(&self, id: Uuid) -> Option<Builder> {
        let sql = format!("SELECT {BUILDER_COLS} FROM builders WHERE id = $1");
        sqlx::query_as::<_, Builder>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .unwrap_or_else(|e| {
                tracing::error!("get_builder error: {:?}", e);
                None
            })
    }

    async fn create_builder(&self, req: CreateBuilderRequest) -> Option<Builder> {
        let sql = format!(
            "INSERT INTO builders (id, name, region, email, phone, website, manufacturer_id, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, NOW(), NOW()) \
             RETURNING {BUILDER_COLS}"
        );
        sqlx::query_as::<_, Builder>(&sql)
            .bind(Uuid::new_v4())
            .bind(req.name)
            .bind(req.region)
            .bind(req.email)
            .bind(req.phone)
            .bind(req.website)
            .bind(req.manufacturer_id)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| tracing::error!("create_builder error: {:?}", e))
            .ok()
    }

    async fn update_builder(&self, id: Uuid, req: UpdateBuilderRequest) -> Option<Builder> {
        let sql = format!(
            "UPDATE builders \
             SET name = COALESCE($2, name), \
                 region = COALESCE($3, region), \
                 email = COALESCE($4, email), \
                 phone = COALESCE($5, phone), \
                 website = COALESCE($6, website), \
                 updated_at = NOW() \
             WHERE id = $1 \
             RETURNING {BUILDER_COLS}"
        );
        sqlx::query_as::<_, Builder>(&sql)
            .bind(id)
            .bind(req.name)
            .bind(req.region)
            .bind(req.email)
            .bind(req.phone)
            .bind(req.website)
            .fetch_optional(&self.pool)
            .await
            .unwrap_or_else(|e| {
                tracing::error!("update_builder error: {:?}", e);
                None
            })
    }

    async fn delete_builder(&self, id: Uuid) -> bool {
        match sqlx::query("DELETE FROM builders WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
        {
            Ok(res) => res.rows_affected() > 0,
            Err(e) => {
                tracing::error!("delete_builder error: {:?}", e);
                false
            }
        }
    }

    // --- HOME MODELS ---

    /// Flexible public search via QueryBuilder for safe parameterization.
    /// The base query pins `is_published = true` unconditionally.
    async fn list_published_models(
        &self,
        manufacturer: Option<Uuid>,
        bedrooms: Option<i32>,
        search: Option<String>,
    ) -> Vec<HomeModel> {
        let mut builder: QueryBuilder<sqlx::Postgres> = QueryBuilder::new(format!(
            "SELECT {MODEL_COLS} FROM home_models WHERE is_published = true "
        ));

        if let Some(m) = manufacturer {
            builder.push(" AND manufacturer_id = ");
            builder.push_bind(m);
        }

        if let Some(b) = bedrooms {
            builder.push(" AND bedrooms = ");
            builder.push_bind(b);
        }

        if let Some(s) = search {
            // Case-insensitive match across name and description.
            let pattern = format!("%{}%", s);
            builder.push(" AND (name ILIKE ");
            builder.push_bind(pattern.clone());
            builder.push(" OR description ILIKE ");
            builder.push_bind(pattern);
            builder.push(")");
        }

        builder.push(" ORDER BY created_at DESC");

        builder
            .build_query_as::<HomeModel>()
            .fetch_all(&self.pool)
            .await
            .unwrap_or_else(|e| {
                tracing::error!("list_published_models error: {:?}", e);
                vec![]
            })
    }

    /// Administrative listing: no published restriction, drafts surface first.
    async fn list_all_models(&self) -> Vec<HomeModel> {
        let sql = format!(
            "SELECT {MODEL_COLS} FROM home_models ORDER BY is_published ASC, created_at DESC"
        );
        sqlx::query_as::<_, HomeModel>(&sql)
            .fetch_all(&self.pool)
            .await
            .unwrap_or_else(|e| {
                tracing::error!("list_all_models error: {:?}", e);
                vec![]
            })
    }

    async fn get_featured_models(&self, limit: i64) -> Vec<HomeModel> {
        let sql = format!(
            "SELECT {MODEL_COLS} FROM home_models \
             WHERE is_published = true AND is_featured = true \
             ORDER BY updated_at DESC LIMIT $1"
        );
        sqlx::query_as::<_, HomeModel>(&sql)
            .bind(limit)
            .fetch_all(&self.pool)
            .await
            .unwrap_or_else(|e| {
                tracing::error!("get_featured_models error: {:?}", e);
                vec![]
            })
    }

    async fn get_published_model(&self, id: Uuid) -> Option<HomeModel> {
        let sql =
            format!("SELECT {MODEL_COLS} FROM home_models WHERE id = $1 AND is_published = true");
        sqlx::query_as::<_, HomeModel>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .unwrap_or_else(|e| {
                tracing::error!("get_published_model error: {:?}", e);
                None
            })
    }

    /// New models start unpublished and unfeatured; publication is a separate
    /// administrative action.
    async fn create_model(&self, req: CreateHomeModelRequest) -> Option<HomeModel> {
        let sql = format!(
            "INSERT INTO home_models (id, manufacturer_id, name, slug, description, bedrooms, bathrooms, \
             floor_area_sqm, base_price_cents, cover_image, is_published, is_featured, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, false, false, NOW(), NOW()) \
             RETURNING {MODEL_COLS}"
        );
        sqlx::query_as::<_, HomeModel>(&sql)
            .bind(Uuid::new_v4())
            .bind(req.manufacturer_id)
            .bind(req.name)
            .bind(req.slug)
            .bind(req.description)
            .bind(req.bedrooms)
            .bind(req.bathrooms)
            .bind(req.floor_area_sqm)
            .bind(req.base_price_cents)
            .bind(req.cover_image_key)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| tracing::error!("create_model error: {:?}", e))
            .ok()
    }

    async fn update_model(&self, id: Uuid, req: UpdateHomeModelRequest) -> Option<HomeModel> {
        let sql = format!(
            "UPDATE home_models \
             SET name = COALESCE($2, name), \
                 description = COALESCE($3, description), \
                 bedrooms = COALESCE($4, bedrooms), \
                 bathrooms = COALESCE($5, bathrooms), \
                 floor_area_sqm = COALESCE($6, floor_area_sqm), \
                 base_price_cents = COALESCE($7, base_price_cents), \
                 cover_image = COALESCE($8, cover_image), \
                 is_featured = COALESCE($9, is_featured), \
                 updated_at = NOW() \
             WHERE id = $1 \
             RETURNING {MODEL_COLS}"
        );
        sqlx::query_as::<_, HomeModel>(&sql)
            .bind(id)
            .bind(req.name)
            .bind(req.description)
            .bind(req.bedrooms)
            .bind(req.bathrooms)
            .bind(req.floor_area_sqm)
            .bind(req.base_price_cents)
            .bind(req.cover_image_key)
            .bind(req.is_featured)
            .fetch_optional(&self.pool)
            .await
            .unwrap_or_else(|e| {
                tracing::error!("update_model error: {:?}", e);
                None
            })
    }

    async fn delete_model(&self, id: Uuid) -> bool {
        match sqlx::query("DELETE FROM home_models WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
        {
            Ok(res) => res.rows_affected() > 0,
            Err(e) => {
                tracing::error!("delete_model error: {:?}", e);
                false
            }
        }
    }

    async fn set_model_published(&self, id: Uuid, is_published: bool) -> Option<HomeModel> {
        let sql = format!(
            "UPDATE home_models SET is_published = $2, updated_at = NOW() \
             WHERE id = $1 RETURNING {MODEL_COLS}"
        );
        sqlx::query_as::<_, HomeModel>(&sql)
            .bind(id)
            .bind(is_published)
            .fetch_optional(&self.pool)
            .await
            .unwrap_or_else(|e| {
                tracing::error!("set_model_published error: {:?}", e);
                None
            })
    }

    // --- BLOG POSTS ---

    async fn list_published_posts(&self) -> Vec<BlogPost> {
        let sql = format!(
            "SELECT {POST_COLS} FROM blog_posts WHERE is_published = true \
             ORDER BY published_at DESC NULLS LAST"
        );
        sqlx::query_as::<_, BlogPost>(&sql)
            .fetch_all(&self.pool)
            .await
            .unwrap_or_else(|e| {
                tracing::error!("list_published_posts error: {:?}", e);
                vec![]
            })
    }

    async fn list_all_posts(&self) -> Vec<BlogPost> {
        let sql = format!(
            "SELECT {POST_COLS} FROM blog_posts ORDER BY is_published ASC, created_at DESC"
        );
        sqlx::query_as::<_, BlogPost>(&sql)
            .fetch_all(&self.pool)
            .await
            .unwrap_or_else(|e| {
                tracing::error!("list_all_posts error: {:?}", e);
                vec![]
            })
    }

    async fn get_published_post(&self, slug: String) -> Option<BlogPost> {
        let sql = format!(
            "SELECT {POST_COLS} FROM blog_posts WHERE slug = $1 AND is_published = true"
        );
        sqlx::query_as::<_, BlogPost>(&sql)
            .bind(slug)
            .fetch_optional(&self.pool)
            .await
            .unwrap_or_else(|e| {
                tracing::error!("get_published_post error: {:?}", e);
                None
            })
    }

    async fn create_post(&self, req: CreatePostRequest, author_id: Uuid) -> Option<BlogPost> {
        let sql = format!(
            "INSERT INTO blog_posts (id, author_id, title, slug, body, cover_image, is_published, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5, $6, false, NOW(), NOW()) \
             RETURNING {POST_COLS}"
        );
        sqlx::query_as::<_, BlogPost>(&sql)
            .bind(Uuid::new_v4())
            .bind(author_id)
            .bind(req.title)
            .bind(req.slug)
            .bind(req.body)
            .bind(req.cover_image_key)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| tracing::error!("create_post error: {:?}", e))
            .ok()
    }

    async fn update_post(&self, id: Uuid, req: UpdatePostRequest) -> Option<BlogPost> {
        let sql = format!(
            "UPDATE blog_posts \
             SET title = COALESCE($2, title), \
                 body = COALESCE($3, body), \
                 cover_image = COALESCE($4, cover_image), \
                 updated_at = NOW() \
             WHERE id = $1 \
             RETURNING {POST_COLS}"
        );
        sqlx::query_as::<_, BlogPost>(&sql)
            .bind(id)
            .bind(req.title)
            .bind(req.body)
            .bind(req.cover_image_key)
            .fetch_optional(&self.pool)
            .await
            .unwrap_or_else(|e| {
                tracing::error!("update_post error: {:?}", e);
                None
            })
    }

    async fn delete_post(&self, id: Uuid) -> bool {
        match sqlx::query("DELETE FROM blog_posts WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
        {
            Ok(res) => res.rows_affected() > 0,
            Err(e) => {
                tracing::error!("delete_post error: {:?}", e);
                false
            }
        }
    }

    /// First publication stamps `published_at`; later toggles keep the
    /// original date.
    async fn set_post_published(&self, id: Uuid, is_published: bool) -> Option<BlogPost> {
        let sql = format!(
            "UPDATE blog_posts \
             SET is_published = $2, \
                 published_at = CASE WHEN $2 AND published_at IS NULL THEN NOW() ELSE published_at END, \
                 updated_at = NOW() \
             WHERE id = $1 \
             RETURNING {POST_COLS}"
        );
        sqlx::query_as::<_, BlogPost>(&sql)
            .bind(id)
            .bind(is_published)
            .fetch_optional(&self.pool)
            .await
            .unwrap_or_else(|e| {
                tracing::error!("set_post_published error: {:?}", e);
                None
            })
    }

    // --- USERS ---

    async fn get_user(&self, id: Uuid) -> Option<User> {
        sqlx::query_as::<_, User>("SELECT id, email, role, created_at FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .unwrap_or(None)
    }

    async fn get_user_by_email(&self, email: String) -> Option<AuthRecord> {
        sqlx::query_as::<_, AuthRecord>(
            "SELECT id, email, role, password_hash FROM users WHERE email = $1",
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await
        .unwrap_or_else(|e| {
            tracing::error!("get_user_by_email error: {:?}", e);
            None
        })
    }

    async fn list_users(&self) -> Vec<User> {
        sqlx::query_as::<_, User>("SELECT id, email, role, created_at FROM users ORDER BY email ASC")
            .fetch_all(&self.pool)
            .await
            .unwrap_or_else(|e| {
                tracing::error!("list_users error: {:?}", e);
                vec![]
            })
    }

    async fn create_user(
        &self,
        email: String,
        password_hash: String,
        role: String,
    ) -> Option<User> {
        sqlx::query_as::<_, User>(
            "INSERT INTO users (id, email, password_hash, role, created_at) \
             VALUES ($1, $2, $3, $4, NOW()) \
             RETURNING id, email, role, created_at",
        )
        .bind(Uuid::new_v4())
        .bind(email)
        .bind(password_hash)
        .bind(role)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| tracing::error!("create_user error: {:?}", e))
        .ok()
    }

    async fn set_user_role(&self, id: Uuid, role: String) -> Option<User> {
        sqlx::query_as::<_, User>(
            "UPDATE users SET role = $2 WHERE id = $1 RETURNING id, email, role, created_at",
        )
        .bind(id)
        .bind(role)
        .fetch_optional(&self.pool)
        .await
        .unwrap_or_else(|e| {
            tracing::error!("set_user_role error: {:?}", e);
            None
        })
    }

    async fn delete_user(&self, id: Uuid) -> bool {
        match sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
        {
            Ok(res) => res.rows_affected() > 0,
            Err(e) => {
                tracing::error!("delete_user error: {:?}", e);
                false
            }
        }
    }

    // --- DASHBOARD ---

    /// Compiles the back-office counters in a single call.
    async fn get_stats(&self) -> AdminDashboardStats {
        let count = |sql: &'static str| {
            let pool = self.pool.clone();
            async move {
                sqlx::query_scalar::<_, i64>(sql)
                    .fetch_one(&pool)
                    .await
                    .unwrap_or(0)
            }
        };

        AdminDashboardStats {
            total_manufacturers: count("SELECT COUNT(*) FROM manufacturers").await,
            total_builders: count("SELECT COUNT(*) FROM builders").await,
            total_models: count("SELECT COUNT(*) FROM home_models").await,
            total_posts: count("SELECT COUNT(*) FROM blog_posts").await,
            total_users: count("SELECT COUNT(*) FROM users").await,
            draft_models: count("SELECT COUNT(*) FROM home_models WHERE is_published = false")
                .await,
        }
    }
}
