// store/postgres.rs
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgPool, QueryBuilder, Row};
use uuid::Uuid;

use crate::error::AppError;
use crate::models::{Category, CategoryCreate, Petition, User};
use crate::provider::SocialProfile;

use super::{NewPetition, PetitionQuery, Store};

const PETITION_COLUMNS: &str = "p.id, p.title, p.text, p.image, p.category_id, p.creator_id, \
     p.created_at, \
     (SELECT COUNT(*) FROM petition_voters v WHERE v.petition_id = p.id) AS vote_count";

pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl Store for PgStore {
    async fn list_categories(&self) -> Result<Vec<Category>, AppError> {
        let categories = sqlx::query_as::<_, Category>("SELECT * FROM categories ORDER BY id")
            .fetch_all(&self.pool)
            .await?;
        Ok(categories)
    }

    async fn create_category(&self, new: CategoryCreate) -> Result<Category, AppError> {
        let category = sqlx::query_as::<_, Category>(
            "INSERT INTO categories (name, description) VALUES ($1, $2) \
             RETURNING id, name, description",
        )
        .bind(&new.name)
        .bind(&new.description)
        .fetch_one(&self.pool)
        .await?;
        Ok(category)
    }

    async fn category_exists(&self, id: i64) -> Result<bool, AppError> {
        let row = sqlx::query("SELECT EXISTS(SELECT 1 FROM categories WHERE id = $1) AS known")
            .bind(id)
            .fetch_one(&self.pool)
            .await?;
        Ok(row.get("known"))
    }

    async fn create_petition(&self, new: NewPetition) -> Result<Petition, AppError> {
        let petition = sqlx::query_as::<_, Petition>(
            "INSERT INTO petitions (title, text, image, category_id, creator_id) \
             VALUES ($1, $2, $3, $4, $5) \
             RETURNING id, title, text, image, category_id, creator_id, created_at, \
                       0::BIGINT AS vote_count",
        )
        .bind(&new.title)
        .bind(&new.text)
        .bind(&new.image)
        .bind(new.category_id)
        .bind(new.creator_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(petition)
    }

    async fn petition(&self, id: i64) -> Result<Option<Petition>, AppError> {
        let petition = sqlx::query_as::<_, Petition>(&format!(
            "SELECT {PETITION_COLUMNS} FROM petitions p WHERE p.id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(petition)
    }

    async fn petitions(&self, query: &PetitionQuery) -> Result<Vec<Petition>, AppError> {
        let mut builder: QueryBuilder<sqlx::Postgres> =
            QueryBuilder::new(format!("SELECT {PETITION_COLUMNS} FROM petitions p WHERE 1=1"));

        if let Some(title) = &query.title {
            builder.push(" AND p.title ILIKE ");
            builder.push_bind(format!("%{title}%"));
        }
        if let Some(category) = query.category {
            builder.push(" AND p.category_id = ");
            builder.push_bind(category);
        }
        if let Some(creator_ids) = &query.creator_ids {
            builder.push(" AND p.creator_id = ANY(");
            builder.push_bind(creator_ids.clone());
            builder.push(")");
        }
        builder.push(" ORDER BY p.created_at DESC");

        let petitions = builder
            .build_query_as::<Petition>()
            .fetch_all(&self.pool)
            .await?;
        Ok(petitions)
    }

    async fn add_voter(&self, petition_id: i64, user_id: i64) -> Result<(), AppError> {
        // ON CONFLICT keeps the at-most-once-per-user invariant under
        // concurrent submissions.
        sqlx::query(
            "INSERT INTO petition_voters (petition_id, user_id) VALUES ($1, $2) \
             ON CONFLICT (petition_id, user_id) DO NOTHING",
        )
        .bind(petition_id)
        .bind(user_id)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn voters(&self, petition_id: i64) -> Result<Vec<User>, AppError> {
        let users = sqlx::query_as::<_, User>(
            "SELECT u.id, u.username, u.email, u.first_name, u.last_name \
             FROM users u \
             JOIN petition_voters v ON v.user_id = u.id \
             WHERE v.petition_id = $1 \
             ORDER BY u.id",
        )
        .bind(petition_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(users)
    }

    async fn petition_count(&self) -> Result<i64, AppError> {
        let row = sqlx::query("SELECT COUNT(*) AS count FROM petitions")
            .fetch_one(&self.pool)
            .await?;
        Ok(row.get("count"))
    }

    async fn total_vote_count(&self) -> Result<i64, AppError> {
        let row = sqlx::query("SELECT COUNT(*) AS count FROM petition_voters")
            .fetch_one(&self.pool)
            .await?;
        Ok(row.get("count"))
    }

    async fn upsert_user(&self, profile: &SocialProfile) -> Result<User, AppError> {
        let user = sqlx::query_as::<_, User>(
            "INSERT INTO users (provider, subject, username, email, first_name, last_name) \
             VALUES ($1, $2, $3, $4, $5, $6) \
             ON CONFLICT (provider, subject) DO UPDATE SET \
                 username = EXCLUDED.username, \
                 email = EXCLUDED.email, \
                 first_name = EXCLUDED.first_name, \
                 last_name = EXCLUDED.last_name \
             RETURNING id, username, email, first_name, last_name",
        )
        .bind(&profile.provider)
        .bind(&profile.subject)
        .bind(&profile.username)
        .bind(&profile.email)
        .bind(&profile.first_name)
        .bind(&profile.last_name)
        .fetch_one(&self.pool)
        .await?;
        Ok(user)
    }

    async fn list_users(&self) -> Result<Vec<User>, AppError> {
        let users = sqlx::query_as::<_, User>(
            "SELECT id, username, email, first_name, last_name FROM users ORDER BY id",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(users)
    }

    async fn revoke_token(&self, jti: Uuid, expires_at: DateTime<Utc>) -> Result<(), AppError> {
        sqlx::query(
            "INSERT INTO revoked_tokens (jti, expires_at) VALUES ($1, $2) \
             ON CONFLICT (jti) DO NOTHING",
        )
        .bind(jti)
        .bind(expires_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn is_token_revoked(&self, jti: Uuid) -> Result<bool, AppError> {
        let row = sqlx::query("SELECT EXISTS(SELECT 1 FROM revoked_tokens WHERE jti = $1) AS known")
            .bind(jti)
            .fetch_one(&self.pool)
            .await?;
        Ok(row.get("known"))
    }
}
