use crate::state::AppState;
use axum::{routing::get, Router};

pub mod handlers;
pub mod repo;

/// Bubbles awarded for every shared moment.
pub const POINTS_PER_MOMENT: i64 = 10;

pub fn router() -> Router<AppState> {
    Router::new().route("/get_points", get(handlers::get_points))
}
