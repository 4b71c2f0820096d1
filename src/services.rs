// services.rs
use chrono::Utc;

use crate::error::{AppError, FieldError};
use crate::models::{Petition, PetitionCreate, PetitionListParams};
use crate::petition::{PetitionStatus, VotingRules};
use crate::store::{NewPetition, PetitionQuery, Store};

pub const TITLE_MAX_LENGTH: usize = 200;

/// Statistics over the whole petition collection, recomputed per call.
#[derive(Debug, PartialEq, Eq)]
pub struct Statistics {
    pub petition_count: i64,
    pub vote_count: i64,
}

/// Filtered petition listing, newest first.
///
/// The `successful` filter is three-way by construction: `"true"` keeps
/// passed petitions, `"false"` keeps failed ones (expired without reaching
/// the threshold), and petitions still in their voting window match neither
/// value. Any other value leaves the listing unfiltered.
pub async fn list_petitions(
    store: &dyn Store,
    rules: VotingRules,
    params: &PetitionListParams,
) -> Result<Vec<Petition>, AppError> {
    let mut query = PetitionQuery::default();

    if let Some(title) = params.title.as_deref().filter(|t| !t.is_empty()) {
        query.title = Some(title.to_string());
    }

    // "null" arrives from clients with an unset category picker.
    if let Some(category) = params
        .category
        .as_deref()
        .filter(|c| !c.is_empty() && *c != "null")
    {
        let id = category.parse::<i64>().map_err(|_| {
            AppError::Validation(vec![FieldError::new("category", "must be a category id")])
        })?;
        query.category = Some(id);
    }

    if let Some(creator) = params.creator.as_deref().filter(|c| !c.is_empty()) {
        let needle = creator.to_lowercase();
        let ids = store
            .list_users()
            .await?
            .iter()
            .filter(|u| u.full_name().to_lowercase().contains(&needle))
            .map(|u| u.id)
            .collect();
        // No matching user leaves an empty id set, which matches nothing.
        query.creator_ids = Some(ids);
    }

    let mut petitions = store.petitions(&query).await?;

    if let Some(successful) = params.successful.as_deref() {
        let now = Utc::now();
        match successful.to_lowercase().as_str() {
            "true" => petitions.retain(|p| rules.status(p, now) == PetitionStatus::Passed),
            "false" => petitions.retain(|p| rules.status(p, now) == PetitionStatus::Failed),
            _ => {}
        }
    }

    Ok(petitions)
}

/// Add `user_id` to the petition's voter set. Voting closes once the
/// petition expires or passes, whichever happens first; a repeated vote by
/// the same user on an open petition is a no-op.
pub async fn submit_vote(
    store: &dyn Store,
    rules: VotingRules,
    petition_id: i64,
    user_id: i64,
) -> Result<(), AppError> {
    let petition = store
        .petition(petition_id)
        .await?
        .ok_or(AppError::NotFound)?;

    if rules.voting_closed(&petition, Utc::now()) {
        return Err(AppError::VotingClosed);
    }

    store.add_voter(petition_id, user_id).await
}

/// Validate and persist a new petition. The creator always comes from the
/// authenticated caller; anything the payload claims about it is ignored.
pub async fn create_petition(
    store: &dyn Store,
    payload: PetitionCreate,
    creator_id: i64,
) -> Result<Petition, AppError> {
    let mut fields = Vec::new();

    if payload.title.trim().is_empty() {
        fields.push(FieldError::new("title", "must not be empty"));
    } else if payload.title.chars().count() > TITLE_MAX_LENGTH {
        fields.push(FieldError::new(
            "title",
            format!("must be at most {TITLE_MAX_LENGTH} characters"),
        ));
    }
    if payload.text.trim().is_empty() {
        fields.push(FieldError::new("text", "must not be empty"));
    }
    if payload.image.trim().is_empty() {
        fields.push(FieldError::new("image", "must not be empty"));
    }
    if !store.category_exists(payload.category).await? {
        fields.push(FieldError::new("category", "unknown category"));
    }

    if !fields.is_empty() {
        return Err(AppError::Validation(fields));
    }

    store
        .create_petition(NewPetition {
            title: payload.title,
            text: payload.text,
            image: payload.image,
            category_id: payload.category,
            creator_id,
        })
        .await
}

pub async fn compute_statistics(store: &dyn Store) -> Result<Statistics, AppError> {
    Ok(Statistics {
        petition_count: store.petition_count().await?,
        vote_count: store.total_vote_count().await?,
    })
}

#[cfg(test)]
mod tests {
    use chrono::Duration;

    use super::*;
    use crate::models::User;
    use crate::provider::SocialProfile;
    use crate::store::InMemoryStore;

    fn rules() -> VotingRules {
        VotingRules {
            window: Duration::days(30),
            pass_threshold: 2,
        }
    }

    async fn make_user(store: &InMemoryStore, subject: &str, first: &str, last: &str) -> User {
        store
            .upsert_user(&SocialProfile {
                provider: "google".to_string(),
                subject: subject.to_string(),
                username: first.to_lowercase(),
                email: format!("{}@example.org", first.to_lowercase()),
                first_name: first.to_string(),
                last_name: last.to_string(),
            })
            .await
            .unwrap()
    }

    async fn make_petition(store: &InMemoryStore, title: &str, creator_id: i64) -> Petition {
        let category = store
            .create_category(crate::models::CategoryCreate {
                name: "Environment".to_string(),
                description: "Air, water, parks".to_string(),
            })
            .await
            .unwrap();
        create_petition(
            store,
            PetitionCreate {
                title: title.to_string(),
                text: "Please act".to_string(),
                image: "media/p.png".to_string(),
                category: category.id,
            },
            creator_id,
        )
        .await
        .unwrap()
    }

    #[tokio::test]
    async fn vote_is_idempotent_per_user() {
        let store = InMemoryStore::new();
        let ann = make_user(&store, "1", "Ann", "Smith").await;
        let petition = make_petition(&store, "Clean Air Now", ann.id).await;

        submit_vote(&store, rules(), petition.id, ann.id).await.unwrap();
        submit_vote(&store, rules(), petition.id, ann.id).await.unwrap();

        let petition = store.petition(petition.id).await.unwrap().unwrap();
        assert_eq!(petition.vote_count, 1);
    }

    #[tokio::test]
    async fn vote_on_missing_petition_is_not_found() {
        let store = InMemoryStore::new();
        let ann = make_user(&store, "1", "Ann", "Smith").await;

        let err = submit_vote(&store, rules(), 999, ann.id).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound));
    }

    #[tokio::test]
    async fn voting_closes_once_passed() {
        let store = InMemoryStore::new();
        let ann = make_user(&store, "1", "Ann", "Smith").await;
        let bob = make_user(&store, "2", "Bob", "Jones").await;
        let eve = make_user(&store, "3", "Eve", "Adams").await;
        let petition = make_petition(&store, "Clean Air Now", ann.id).await;

        submit_vote(&store, rules(), petition.id, ann.id).await.unwrap();
        submit_vote(&store, rules(), petition.id, bob.id).await.unwrap();

        let err = submit_vote(&store, rules(), petition.id, eve.id)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::VotingClosed));

        // The failed attempt must not have touched the voter set.
        let petition = store.petition(petition.id).await.unwrap().unwrap();
        assert_eq!(petition.vote_count, 2);
    }

    #[tokio::test]
    async fn voting_closes_once_expired() {
        let store = InMemoryStore::new();
        let ann = make_user(&store, "1", "Ann", "Smith").await;
        let petition = make_petition(&store, "Clean Air Now", ann.id).await;

        let expired = VotingRules {
            window: Duration::zero(),
            pass_threshold: 2,
        };
        let err = submit_vote(&store, expired, petition.id, ann.id)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::VotingClosed));

        let petition = store.petition(petition.id).await.unwrap().unwrap();
        assert_eq!(petition.vote_count, 0);
    }

    #[tokio::test]
    async fn title_filter_is_case_insensitive() {
        let store = InMemoryStore::new();
        let ann = make_user(&store, "1", "Ann", "Smith").await;
        make_petition(&store, "Clean Air Now", ann.id).await;
        make_petition(&store, "City Park", ann.id).await;

        let params = PetitionListParams {
            title: Some("clean".to_string()),
            ..Default::default()
        };
        let listed = list_petitions(&store, rules(), &params).await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].title, "Clean Air Now");
    }

    #[tokio::test]
    async fn creator_filter_unions_all_matching_users() {
        let store = InMemoryStore::new();
        let ann = make_user(&store, "1", "Ann", "Smith").await;
        let bob = make_user(&store, "2", "Bob", "Smith").await;
        let eve = make_user(&store, "3", "Eve", "Adams").await;
        make_petition(&store, "Ann's petition", ann.id).await;
        make_petition(&store, "Bob's petition", bob.id).await;
        make_petition(&store, "Eve's petition", eve.id).await;

        let params = PetitionListParams {
            creator: Some("smith".to_string()),
            ..Default::default()
        };
        let listed = list_petitions(&store, rules(), &params).await.unwrap();
        assert_eq!(listed.len(), 2);
        assert!(listed.iter().all(|p| p.creator_id != eve.id));

        // No matching user empties the result entirely.
        let params = PetitionListParams {
            creator: Some("nobody".to_string()),
            ..Default::default()
        };
        let listed = list_petitions(&store, rules(), &params).await.unwrap();
        assert!(listed.is_empty());
    }

    #[tokio::test]
    async fn category_null_sentinel_is_ignored() {
        let store = InMemoryStore::new();
        let ann = make_user(&store, "1", "Ann", "Smith").await;
        make_petition(&store, "Clean Air Now", ann.id).await;

        let params = PetitionListParams {
            category: Some("null".to_string()),
            ..Default::default()
        };
        assert_eq!(
            list_petitions(&store, rules(), &params).await.unwrap().len(),
            1
        );

        let params = PetitionListParams {
            category: Some("not-a-number".to_string()),
            ..Default::default()
        };
        assert!(matches!(
            list_petitions(&store, rules(), &params).await,
            Err(AppError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn successful_filter_excludes_active_petitions_from_both_branches() {
        let store = InMemoryStore::new();
        let ann = make_user(&store, "1", "Ann", "Smith").await;
        let bob = make_user(&store, "2", "Bob", "Jones").await;
        let active = make_petition(&store, "Still collecting", ann.id).await;
        let passed = make_petition(&store, "Clean Air Now", ann.id).await;
        submit_vote(&store, rules(), passed.id, ann.id).await.unwrap();
        submit_vote(&store, rules(), passed.id, bob.id).await.unwrap();

        let params = PetitionListParams {
            successful: Some("true".to_string()),
            ..Default::default()
        };
        let listed = list_petitions(&store, rules(), &params).await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].id, passed.id);

        // An unexpired petition is not "failed" yet, whatever its count.
        let params = PetitionListParams {
            successful: Some("false".to_string()),
            ..Default::default()
        };
        let listed = list_petitions(&store, rules(), &params).await.unwrap();
        assert!(listed.is_empty());

        // With the window elapsed, the active one becomes failed.
        let expired = VotingRules {
            window: Duration::zero(),
            pass_threshold: 2,
        };
        let listed = list_petitions(&store, expired, &params).await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].id, active.id);
    }

    #[tokio::test]
    async fn statistics_count_petitions_and_votes() {
        let store = InMemoryStore::new();
        let ann = make_user(&store, "1", "Ann", "Smith").await;
        let bob = make_user(&store, "2", "Bob", "Jones").await;
        let first = make_petition(&store, "First", ann.id).await;
        let second = make_petition(&store, "Second", ann.id).await;
        let third = make_petition(&store, "Third", bob.id).await;

        let wide = VotingRules {
            window: Duration::days(30),
            pass_threshold: 100,
        };
        submit_vote(&store, wide, first.id, ann.id).await.unwrap();
        submit_vote(&store, wide, first.id, bob.id).await.unwrap();
        submit_vote(&store, wide, second.id, ann.id).await.unwrap();
        submit_vote(&store, wide, third.id, ann.id).await.unwrap();
        submit_vote(&store, wide, third.id, bob.id).await.unwrap();

        let stats = compute_statistics(&store).await.unwrap();
        assert_eq!(
            stats,
            Statistics {
                petition_count: 3,
                vote_count: 5
            }
        );
    }

    #[tokio::test]
    async fn creation_rejects_bad_payloads_per_field() {
        let store = InMemoryStore::new();
        let ann = make_user(&store, "1", "Ann", "Smith").await;

        let err = create_petition(
            &store,
            PetitionCreate {
                title: "".to_string(),
                text: "".to_string(),
                image: "media/p.png".to_string(),
                category: 42,
            },
            ann.id,
        )
        .await
        .unwrap_err();

        match err {
            AppError::Validation(fields) => {
                let named: Vec<&str> = fields.iter().map(|f| f.field).collect();
                assert_eq!(named, vec!["title", "text", "category"]);
            }
            other => panic!("unexpected error: {other:?}"),
        }

        let long_title = "x".repeat(TITLE_MAX_LENGTH + 1);
        let err = create_petition(
            &store,
            PetitionCreate {
                title: long_title,
                text: "Please act".to_string(),
                image: "media/p.png".to_string(),
                category: 42,
            },
            ann.id,
        )
        .await
        .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }
}
