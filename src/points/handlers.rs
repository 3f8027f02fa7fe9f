use axum::{extract::State, Json};
use serde::Serialize;
use tracing::{debug, instrument};

use super::repo;
use crate::{auth::extractors::MaybeSession, error::AppResult, state::AppState};

#[derive(Debug, Serialize)]
pub struct PointsResponse {
    pub points: i64,
}

/// Unauthenticated callers and unknown users read as zero rather than failing.
#[instrument(skip(state, session))]
pub async fn get_points(
    State(state): State<AppState>,
    session: MaybeSession,
) -> AppResult<Json<PointsResponse>> {
    let Some(user_id) = session.user_id else {
        debug!("get_points without session");
        return Ok(Json(PointsResponse { points: 0 }));
    };
    let points = repo::get_points(&state.db, user_id).await?.unwrap_or(0);
    Ok(Json(PointsResponse { points }))
}
