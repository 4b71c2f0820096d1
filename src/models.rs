// models.rs
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Category {
    pub id: i64,
    pub name: String,
    pub description: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
}

impl User {
    /// "first last", trimmed when either part is missing.
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
            .trim()
            .to_string()
    }
}

/// A petition row together with the current size of its voter set.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Petition {
    pub id: i64,
    pub title: String,
    pub text: String,
    pub image: String,
    pub category_id: i64,
    pub creator_id: i64,
    pub created_at: DateTime<Utc>,
    pub vote_count: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CategoryCreate {
    pub name: String,
    pub description: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PetitionCreate {
    pub title: String,
    pub text: String,
    pub image: String,
    pub category: i64,
}

/// Query parameters accepted by the petition listing endpoint.
#[derive(Debug, Default, Deserialize)]
pub struct PetitionListParams {
    pub title: Option<String>,
    pub category: Option<String>,
    pub creator: Option<String>,
    pub successful: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct SocialAuthRequest {
    pub provider: String,
    pub access_token: String,
}

#[derive(Debug, Deserialize)]
pub struct LogoutRequest {
    pub refresh: String,
}

#[derive(Debug, Serialize)]
pub struct SessionResponse {
    pub email: String,
    pub username: String,
    pub access: String,
    pub refresh: String,
}

#[derive(Debug, Serialize)]
pub struct CreatedResponse {
    pub id: i64,
}

#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub full_name: String,
}

impl From<&User> for UserResponse {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            username: user.username.clone(),
            email: user.email.clone(),
            full_name: user.full_name(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct StatisticsResponse {
    pub petitions_number: i64,
    pub vote_number: i64,
}

/// Petition as serialized to clients, with its derived status attached.
#[derive(Debug, Serialize)]
pub struct PetitionResponse {
    pub id: i64,
    pub title: String,
    pub text: String,
    pub image: String,
    pub category: i64,
    pub creator: i64,
    pub created_at: DateTime<Utc>,
    pub vote_count: i64,
    pub status: crate::petition::PetitionStatus,
}

impl PetitionResponse {
    pub fn new(petition: &Petition, status: crate::petition::PetitionStatus) -> Self {
        Self {
            id: petition.id,
            title: petition.title.clone(),
            text: petition.text.clone(),
            image: petition.image.clone(),
            category: petition.category_id,
            creator: petition.creator_id,
            created_at: petition.created_at,
            vote_count: petition.vote_count,
            status,
        }
    }
}
