use axum::{
    body::Bytes,
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde_json::{json, Value};
use std::collections::{BTreeSet, HashSet};

use crate::{
    error::{AppError, AppResult},
    models::{
        ItemId, RebuildRequest, RecommendationRequest, RecommendationResponse, RuleSetSummary,
        RulesQuery, User,
    },
    services::{restrict_to_catalog, MiningConfig},
};

use super::AppState;

/// Health check endpoint
pub async fn health_check() -> (StatusCode, Json<Value>) {
    (StatusCode::OK, Json(json!({ "status": "healthy" })))
}

/// Recommend quotes from the likes sent by the client
pub async fn recommend(
    State(state): State<AppState>,
    Json(request): Json<RecommendationRequest>,
) -> AppResult<Json<RecommendationResponse>> {
    let user = state
        .store
        .find_user_by_name(&request.username)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("User {} not found.", request.username)))?;

    let recommendations = recommend_for(&state, request.liked_quotes).await;

    tracing::info!(
        user_id = user.id,
        recommended = recommendations.len(),
        "Recommendations served"
    );

    Ok(Json(RecommendationResponse {
        username: user.name,
        recommendations,
    }))
}

/// The stored likes of a user, in the shape `/recommend` accepts
pub async fn get_recommendation_request(
    State(state): State<AppState>,
    Path(user_id): Path<i64>,
) -> AppResult<Json<RecommendationRequest>> {
    let user = find_user(&state, user_id).await?;
    let liked_quotes = state.store.fetch_user_likes(user.id).await?;

    Ok(Json(RecommendationRequest {
        username: user.name,
        liked_quotes,
    }))
}

/// Recommend quotes from the likes stored for a user
pub async fn user_recommendations(
    State(state): State<AppState>,
    Path(user_id): Path<i64>,
) -> AppResult<Json<RecommendationResponse>> {
    let user = find_user(&state, user_id).await?;
    let likes = state.store.fetch_user_likes(user.id).await?;
    let recommendations = recommend_for(&state, likes).await;

    tracing::info!(
        user_id = user.id,
        recommended = recommendations.len(),
        "Recommendations served"
    );

    Ok(Json(RecommendationResponse {
        username: user.name,
        recommendations,
    }))
}

/// Describe the published rule set
pub async fn get_rules(
    State(state): State<AppState>,
    Query(query): Query<RulesQuery>,
) -> Json<RuleSetSummary> {
    let rule_set = state.rules.current().await;
    Json(rule_set.summary(query.limit))
}

/// Rebuild the rule set from the current likes and publish it
///
/// The body is optional; without one the configured thresholds are used.
pub async fn rebuild_rules(
    State(state): State<AppState>,
    body: Bytes,
) -> AppResult<Json<RuleSetSummary>> {
    let request = parse_rebuild_request(&body)?;
    let config = MiningConfig::new(
        request.min_support.unwrap_or(state.mining.min_support()),
        request.min_confidence.unwrap_or(state.mining.min_confidence()),
    )?
    .with_max_itemset_len(request.max_itemset_len.or(state.mining.max_itemset_len()))?;

    let rule_set = state
        .rules
        .rebuild(state.store.as_ref(), config, state.validate_catalog)
        .await?;

    Ok(Json(rule_set.summary(0)))
}

fn parse_rebuild_request(body: &[u8]) -> AppResult<RebuildRequest> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(RebuildRequest::default());
    }
    serde_json::from_slice(body)
        .map_err(|e| AppError::InvalidInput(format!("Invalid rebuild request: {}", e)))
}

async fn find_user(state: &AppState, user_id: i64) -> AppResult<User> {
    state
        .store
        .find_user(user_id)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found.".to_string()))
}

/// Matches likes against the published snapshot
///
/// Catalog filtering uses the catalog captured with the snapshot.
async fn recommend_for(state: &AppState, likes: Vec<ItemId>) -> Vec<ItemId> {
    let likes: HashSet<ItemId> = likes.into_iter().collect();
    let rule_set = state.rules.current().await;

    let mut recommendations: BTreeSet<ItemId> = rule_set.recommend(&likes);
    if state.validate_catalog {
        if let Some(catalog) = rule_set.catalog() {
            recommendations = restrict_to_catalog(recommendations, catalog);
        }
    }

    recommendations.into_iter().collect()
}
