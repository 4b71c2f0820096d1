// store/memory.rs
//
// In-memory store used by tests and local experiments. Mirrors the
// Postgres store's observable behavior, including voter-set idempotence
// and newest-first ordering.
use std::collections::{BTreeSet, HashMap, HashSet};
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::error::AppError;
use crate::models::{Category, CategoryCreate, Petition, User};
use crate::provider::SocialProfile;

use super::{NewPetition, PetitionQuery, Store};

#[derive(Default)]
struct Inner {
    categories: Vec<Category>,
    petitions: Vec<Petition>,
    users: Vec<StoredUser>,
    voters: HashMap<i64, BTreeSet<i64>>,
    revoked: HashSet<Uuid>,
    next_id: i64,
}

struct StoredUser {
    provider: String,
    subject: String,
    user: User,
}

#[derive(Default)]
pub struct InMemoryStore {
    inner: Mutex<Inner>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Inner {
    fn next_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }

    fn vote_count(&self, petition_id: i64) -> i64 {
        self.voters
            .get(&petition_id)
            .map(|set| set.len() as i64)
            .unwrap_or(0)
    }

    fn with_count(&self, petition: &Petition) -> Petition {
        let mut petition = petition.clone();
        petition.vote_count = self.vote_count(petition.id);
        petition
    }
}

#[async_trait]
impl Store for InMemoryStore {
    async fn list_categories(&self) -> Result<Vec<Category>, AppError> {
        let inner = self.inner.lock().expect("store lock poisoned");
        Ok(inner.categories.clone())
    }

    async fn create_category(&self, new: CategoryCreate) -> Result<Category, AppError> {
        let mut inner = self.inner.lock().expect("store lock poisoned");
        let category = Category {
            id: inner.next_id(),
            name: new.name,
            description: new.description,
        };
        inner.categories.push(category.clone());
        Ok(category)
    }

    async fn category_exists(&self, id: i64) -> Result<bool, AppError> {
        let inner = self.inner.lock().expect("store lock poisoned");
        Ok(inner.categories.iter().any(|c| c.id == id))
    }

    async fn create_petition(&self, new: NewPetition) -> Result<Petition, AppError> {
        let mut inner = self.inner.lock().expect("store lock poisoned");
        let petition = Petition {
            id: inner.next_id(),
            title: new.title,
            text: new.text,
            image: new.image,
            category_id: new.category_id,
            creator_id: new.creator_id,
            created_at: Utc::now(),
            vote_count: 0,
        };
        inner.petitions.push(petition.clone());
        Ok(petition)
    }

    async fn petition(&self, id: i64) -> Result<Option<Petition>, AppError> {
        let inner = self.inner.lock().expect("store lock poisoned");
        Ok(inner
            .petitions
            .iter()
            .find(|p| p.id == id)
            .map(|p| inner.with_count(p)))
    }

    async fn petitions(&self, query: &PetitionQuery) -> Result<Vec<Petition>, AppError> {
        let inner = self.inner.lock().expect("store lock poisoned");
        let mut petitions: Vec<Petition> = inner
            .petitions
            .iter()
            .filter(|p| match &query.title {
                Some(title) => p.title.to_lowercase().contains(&title.to_lowercase()),
                None => true,
            })
            .filter(|p| match query.category {
                Some(category) => p.category_id == category,
                None => true,
            })
            .filter(|p| match &query.creator_ids {
                Some(ids) => ids.contains(&p.creator_id),
                None => true,
            })
            .map(|p| inner.with_count(p))
            .collect();
        petitions.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(petitions)
    }

    async fn add_voter(&self, petition_id: i64, user_id: i64) -> Result<(), AppError> {
        let mut inner = self.inner.lock().expect("store lock poisoned");
        inner.voters.entry(petition_id).or_default().insert(user_id);
        Ok(())
    }

    async fn voters(&self, petition_id: i64) -> Result<Vec<User>, AppError> {
        let inner = self.inner.lock().expect("store lock poisoned");
        let Some(ids) = inner.voters.get(&petition_id) else {
            return Ok(Vec::new());
        };
        Ok(inner
            .users
            .iter()
            .filter(|u| ids.contains(&u.user.id))
            .map(|u| u.user.clone())
            .collect())
    }

    async fn petition_count(&self) -> Result<i64, AppError> {
        let inner = self.inner.lock().expect("store lock poisoned");
        Ok(inner.petitions.len() as i64)
    }

    async fn total_vote_count(&self) -> Result<i64, AppError> {
        let inner = self.inner.lock().expect("store lock poisoned");
        Ok(inner.voters.values().map(|set| set.len() as i64).sum())
    }

    async fn upsert_user(&self, profile: &SocialProfile) -> Result<User, AppError> {
        let mut inner = self.inner.lock().expect("store lock poisoned");
        if let Some(stored) = inner
            .users
            .iter_mut()
            .find(|u| u.provider == profile.provider && u.subject == profile.subject)
        {
            stored.user.username = profile.username.clone();
            stored.user.email = profile.email.clone();
            stored.user.first_name = profile.first_name.clone();
            stored.user.last_name = profile.last_name.clone();
            return Ok(stored.user.clone());
        }
        let user = User {
            id: inner.next_id(),
            username: profile.username.clone(),
            email: profile.email.clone(),
            first_name: profile.first_name.clone(),
            last_name: profile.last_name.clone(),
        };
        inner.users.push(StoredUser {
            provider: profile.provider.clone(),
            subject: profile.subject.clone(),
            user: user.clone(),
        });
        Ok(user)
    }

    async fn list_users(&self) -> Result<Vec<User>, AppError> {
        let inner = self.inner.lock().expect("store lock poisoned");
        Ok(inner.users.iter().map(|u| u.user.clone()).collect())
    }

    async fn revoke_token(&self, jti: Uuid, _expires_at: DateTime<Utc>) -> Result<(), AppError> {
        let mut inner = self.inner.lock().expect("store lock poisoned");
        inner.revoked.insert(jti);
        Ok(())
    }

    async fn is_token_revoked(&self, jti: Uuid) -> Result<bool, AppError> {
        let inner = self.inner.lock().expect("store lock poisoned");
        Ok(inner.revoked.contains(&jti))
    }
}
