//! Song listing endpoint

use axum::{extract::State, routing::get, Json, Router};
use shellac_common::db::models::SongDetail;

use crate::db::songs;
use crate::error::ApiResult;
use crate::AppState;

/// GET /songs
///
/// Every cataloged song as a flat list with artist, album and genre
/// names resolved.
pub async fn list_songs(State(state): State<AppState>) -> ApiResult<Json<Vec<SongDetail>>> {
    let songs = songs::list_songs(&state.db).await?;
    Ok(Json(songs))
}

/// Build song routes
pub fn song_routes() -> Router<AppState> {
    Router::new().route("/songs", get(list_songs))
}
