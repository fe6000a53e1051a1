use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use axum_extra::extract::WithRejection;

use crate::{
    AppState,
    error::{AppError, AppResult},
    models::{ListQuery, Movie, MovieChanges, NewMovie},
};

pub async fn list_movies(
    State(state): State<Arc<AppState>>,
    WithRejection(Query(q), _): WithRejection<Query<ListQuery>, AppError>,
) -> AppResult<Json<Vec<Movie>>> {
    let year = q.year()?;
    Ok(Json(state.store.list(year).await?))
}

pub async fn get_movie(
    State(state): State<Arc<AppState>>,
    WithRejection(Path(imdb_id), _): WithRejection<Path<String>, AppError>,
) -> AppResult<Json<Movie>> {
    state
        .store
        .get(&imdb_id)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::NotFound(format!("movie {imdb_id} not found")))
}

pub async fn create_movie(
    State(state): State<Arc<AppState>>,
    WithRejection(Json(new), _): WithRejection<Json<NewMovie>, AppError>,
) -> AppResult<(StatusCode, Json<Movie>)> {
    let movie = state.store.create(new.validate()?).await?;
    Ok((StatusCode::CREATED, Json(movie)))
}

pub async fn update_movie(
    State(state): State<Arc<AppState>>,
    WithRejection(Path(imdb_id), _): WithRejection<Path<String>, AppError>,
    WithRejection(Json(changes), _): WithRejection<Json<MovieChanges>, AppError>,
) -> AppResult<Json<Movie>> {
    state
        .store
        .update(&imdb_id, changes.validate()?)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::NotFound(format!("movie {imdb_id} not found")))
}
