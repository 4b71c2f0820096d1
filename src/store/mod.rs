// store/mod.rs
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::error::AppError;
use crate::models::{Category, CategoryCreate, Petition, User};
use crate::provider::SocialProfile;

mod memory;
mod postgres;

pub use memory::InMemoryStore;
pub use postgres::PgStore;

/// Column values for a petition about to be inserted. `created_at` is
/// assigned by the store at insertion time and never updated afterwards.
#[derive(Debug, Clone)]
pub struct NewPetition {
    pub title: String,
    pub text: String,
    pub image: String,
    pub category_id: i64,
    pub creator_id: i64,
}

/// Filters pushed down to the petition listing query. `creator_ids` is the
/// already-resolved set of matching creators; `Some(vec![])` selects nothing.
#[derive(Debug, Default, Clone)]
pub struct PetitionQuery {
    pub title: Option<String>,
    pub category: Option<i64>,
    pub creator_ids: Option<Vec<i64>>,
}

/// Persistence operations needed by the domain services. Object-safe so
/// handlers and tests can swap the Postgres store for the in-memory one.
#[async_trait]
pub trait Store: Send + Sync {
    async fn list_categories(&self) -> Result<Vec<Category>, AppError>;

    async fn create_category(&self, new: CategoryCreate) -> Result<Category, AppError>;

    async fn category_exists(&self, id: i64) -> Result<bool, AppError>;

    async fn create_petition(&self, new: NewPetition) -> Result<Petition, AppError>;

    async fn petition(&self, id: i64) -> Result<Option<Petition>, AppError>;

    /// Matching petitions ordered by creation time, newest first.
    async fn petitions(&self, query: &PetitionQuery) -> Result<Vec<Petition>, AppError>;

    /// Adds `user_id` to the petition's voter set. Idempotent: re-adding an
    /// existing voter is a no-op, including under concurrent submissions.
    async fn add_voter(&self, petition_id: i64, user_id: i64) -> Result<(), AppError>;

    async fn voters(&self, petition_id: i64) -> Result<Vec<User>, AppError>;

    async fn petition_count(&self) -> Result<i64, AppError>;

    /// Total votes across all petitions.
    async fn total_vote_count(&self) -> Result<i64, AppError>;

    async fn upsert_user(&self, profile: &SocialProfile) -> Result<User, AppError>;

    async fn list_users(&self) -> Result<Vec<User>, AppError>;

    async fn revoke_token(&self, jti: Uuid, expires_at: DateTime<Utc>) -> Result<(), AppError>;

    async fn is_token_revoked(&self, jti: Uuid) -> Result<bool, AppError>;
}
