// handlers.rs
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use chrono::Utc;
use tracing::info;

use crate::auth::CurrentUser;
use crate::error::AppError;
use crate::models::{
    Category, CategoryCreate, CreatedResponse, LogoutRequest, PetitionCreate, PetitionListParams,
    PetitionResponse, SessionResponse, SocialAuthRequest, StatisticsResponse, UserResponse,
};
use crate::services;
use crate::state::AppState;

/// Authenticate through the named provider and hand back a session pair.
pub async fn social_login(
    State(state): State<AppState>,
    Json(payload): Json<SocialAuthRequest>,
) -> Result<Json<SessionResponse>, AppError> {
    let profile = state
        .providers
        .fetch_profile(&payload.provider, &payload.access_token)
        .await?;
    let user = state.store.upsert_user(&profile).await?;
    let pair = state.sessions.issue_pair(&user)?;

    info!("user {} logged in via {}", user.username, payload.provider);
    Ok(Json(SessionResponse {
        email: user.email,
        username: user.username,
        access: pair.access,
        refresh: pair.refresh,
    }))
}

/// Revoke the presented refresh token.
pub async fn logout(
    State(state): State<AppState>,
    _user: CurrentUser,
    Json(payload): Json<LogoutRequest>,
) -> Result<StatusCode, AppError> {
    let claims = state.sessions.verify_refresh(&payload.refresh)?;
    let expires_at = chrono::DateTime::from_timestamp(claims.exp, 0).unwrap_or_else(Utc::now);
    state.store.revoke_token(claims.jti, expires_at).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Fetch all categories.
pub async fn list_categories(
    State(state): State<AppState>,
) -> Result<Json<Vec<Category>>, AppError> {
    Ok(Json(state.store.list_categories().await?))
}

/// Create a category (admin surface).
pub async fn create_category(
    State(state): State<AppState>,
    _user: CurrentUser,
    Json(payload): Json<CategoryCreate>,
) -> Result<(StatusCode, Json<Category>), AppError> {
    let category = state.store.create_category(payload).await?;
    Ok((StatusCode::CREATED, Json(category)))
}

/// Filtered petition listing, newest first.
pub async fn list_petitions(
    State(state): State<AppState>,
    Query(params): Query<PetitionListParams>,
) -> Result<Json<Vec<PetitionResponse>>, AppError> {
    let petitions = services::list_petitions(state.store.as_ref(), state.rules, &params).await?;
    let now = Utc::now();
    let body = petitions
        .iter()
        .map(|p| PetitionResponse::new(p, state.rules.status(p, now)))
        .collect();
    Ok(Json(body))
}

/// Create a petition on behalf of the authenticated caller.
pub async fn create_petition(
    State(state): State<AppState>,
    user: CurrentUser,
    Json(payload): Json<PetitionCreate>,
) -> Result<(StatusCode, Json<CreatedResponse>), AppError> {
    let petition = services::create_petition(state.store.as_ref(), payload, user.id).await?;
    info!("petition {} created by user {}", petition.id, user.id);
    Ok((StatusCode::CREATED, Json(CreatedResponse { id: petition.id })))
}

/// Fetch a single petition.
pub async fn petition_detail(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<PetitionResponse>, AppError> {
    let petition = state.store.petition(id).await?.ok_or(AppError::NotFound)?;
    let status = state.rules.status(&petition, Utc::now());
    Ok(Json(PetitionResponse::new(&petition, status)))
}

/// Cast the caller's vote on a petition.
pub async fn submit_vote(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    user: CurrentUser,
) -> Result<StatusCode, AppError> {
    services::submit_vote(state.store.as_ref(), state.rules, id, user.id).await?;
    Ok(StatusCode::CREATED)
}

/// Users who voted on a petition.
pub async fn petition_voters(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Vec<UserResponse>>, AppError> {
    state.store.petition(id).await?.ok_or(AppError::NotFound)?;
    let voters = state.store.voters(id).await?;
    Ok(Json(voters.iter().map(UserResponse::from).collect()))
}

/// Fetch all users.
pub async fn list_users(State(state): State<AppState>) -> Result<Json<Vec<UserResponse>>, AppError> {
    let users = state.store.list_users().await?;
    Ok(Json(users.iter().map(UserResponse::from).collect()))
}

/// Aggregate petition and vote counters.
pub async fn statistics(
    State(state): State<AppState>,
) -> Result<Json<StatisticsResponse>, AppError> {
    let stats = services::compute_statistics(state.store.as_ref()).await?;
    Ok(Json(StatisticsResponse {
        petitions_number: stats.petition_count,
        vote_number: stats.vote_count,
    }))
}
