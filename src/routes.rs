use std::sync::Arc;

use axum::{
    Json,
    extract::{
        Path, Query, State,
        rejection::{JsonRejection, PathRejection, QueryRejection},
    },
    http::StatusCode,
    response::Html,
};
use serde::Deserialize;

use crate::{
    AppState, catalog,
    embed::{self, Player},
    error::{AppError, AppResult},
    filters,
    models::{
        Ack, AddWatchHistoryRequest, CachedMovie, Credits, EmbedLink, Genre, MovieDetails,
        MovieSummary, Paged, WatchHistoryEntry,
    },
    templates,
};

type Movies = AppResult<Json<Paged<MovieSummary>>>;

#[derive(Debug, Deserialize)]
pub struct PageQuery {
    page: Option<u32>,
}

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    query: Option<String>,
    page: Option<u32>,
}

#[derive(Debug, Deserialize)]
pub struct TrendingQuery {
    page: Option<u32>,
    #[serde(rename = "recentOnly")]
    recent_only: Option<bool>,
}

#[derive(Debug, Deserialize)]
pub struct PopularQuery {
    page: Option<u32>,
    #[serde(rename = "minRating")]
    min_rating: Option<f64>,
}

fn page_or_first(page: Option<u32>) -> AppResult<u32> {
    match page {
        None => Ok(1),
        Some(0) => Err(AppError::Validation("page must be at least 1".to_string())),
        Some(p) => Ok(p),
    }
}

pub async fn search(
    State(state): State<Arc<AppState>>,
    query: Result<Query<SearchQuery>, QueryRejection>,
) -> Movies {
    let Query(q) = query?;
    let term = q.query.as_deref().map(str::trim).unwrap_or_default();
    if term.is_empty() {
        return Err(AppError::Validation("Query parameter is required".to_string()));
    }
    let page = page_or_first(q.page)?;

    let results = state
        .tmdb
        .search(term, page)
        .await
        .map_err(AppError::upstream("Failed to search movies"))?;
    Ok(Json(results))
}

pub async fn trending(
    State(state): State<Arc<AppState>>,
    query: Result<Query<TrendingQuery>, QueryRejection>,
) -> Movies {
    let Query(q) = query?;
    let page = page_or_first(q.page)?;

    let mut results = state
        .tmdb
        .trending(page)
        .await
        .map_err(AppError::upstream("Failed to fetch trending movies"))?;

    if q.recent_only.unwrap_or(false) {
        filters::recent_only(&mut results, jiff::Zoned::now().date());
    }
    Ok(Json(results))
}

pub async fn popular(
    State(state): State<Arc<AppState>>,
    query: Result<Query<PopularQuery>, QueryRejection>,
) -> Movies {
    let Query(q) = query?;
    let page = page_or_first(q.page)?;

    let mut results = state
        .tmdb
        .popular(page)
        .await
        .map_err(AppError::upstream("Failed to fetch popular movies"))?;

    if let Some(min) = q.min_rating {
        filters::min_rating(&mut results, min);
    }
    Ok(Json(results))
}

pub async fn discover(
    State(state): State<Arc<AppState>>,
    query: Result<Query<PageQuery>, QueryRejection>,
) -> Movies {
    let Query(q) = query?;
    let page = page_or_first(q.page)?;

    let results = state
        .tmdb
        .discover(page)
        .await
        .map_err(AppError::upstream("Failed to discover movies"))?;
    Ok(Json(results))
}

pub async fn by_genre(
    State(state): State<Arc<AppState>>,
    genre_id: Result<Path<i32>, PathRejection>,
    query: Result<Query<PageQuery>, QueryRejection>,
) -> Movies {
    let Path(genre_id) = genre_id?;
    let Query(q) = query?;
    let page = page_or_first(q.page)?;

    let results = state
        .tmdb
        .by_genre(genre_id, page)
        .await
        .map_err(|e| {
            AppError::from_tmdb(e, "Genre not found", "Failed to fetch movies by genre")
        })?;
    Ok(Json(results))
}

pub async fn movie(
    State(state): State<Arc<AppState>>,
    id: Result<Path<i32>, PathRejection>,
) -> AppResult<Json<MovieDetails>> {
    let Path(id) = id?;

    let details = state.tmdb.movie_with_videos(id).await.map_err(|e| {
        let message = e.upstream_message().unwrap_or("Movie not found").to_string();
        AppError::from_tmdb(e, &message, "Failed to fetch movie details")
    })?;
    Ok(Json(details))
}

pub async fn credits(
    State(state): State<Arc<AppState>>,
    id: Result<Path<i32>, PathRejection>,
) -> AppResult<Json<Credits>> {
    let Path(id) = id?;

    let credits = state
        .tmdb
        .credits(id)
        .await
        .map_err(|e| {
            AppError::from_tmdb(e, "Credits not found", "Failed to fetch movie credits")
        })?;
    Ok(Json(credits))
}

pub async fn similar(
    State(state): State<Arc<AppState>>,
    id: Result<Path<i32>, PathRejection>,
    query: Result<Query<PageQuery>, QueryRejection>,
) -> Movies {
    let Path(id) = id?;
    let Query(q) = query?;
    let page = page_or_first(q.page)?;

    let results = state
        .tmdb
        .similar(id, page)
        .await
        .map_err(|e| {
            AppError::from_tmdb(e, "Similar movies not found", "Failed to fetch similar movies")
        })?;
    Ok(Json(results))
}

pub async fn embed_link(
    State(state): State<Arc<AppState>>,
    id: Result<Path<i32>, PathRejection>,
) -> AppResult<Json<EmbedLink>> {
    let Path(id) = id?;
    Ok(Json(EmbedLink { url: embed::embed_url(&state.config.embed_base_url, id) }))
}

pub async fn genres(State(state): State<Arc<AppState>>) -> AppResult<Json<Vec<Genre>>> {
    let list = state.tmdb.genres().await.map_err(AppError::upstream("Failed to fetch genres"))?;
    Ok(Json(list.genres))
}

pub async fn add_watch_history(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<AddWatchHistoryRequest>, JsonRejection>,
) -> AppResult<(StatusCode, Json<Ack>)> {
    let Json(req) = payload?;
    let Some(movie_id) = req.movie_id.filter(|id| *id > 0) else {
        return Err(AppError::Validation("Movie ID is required".to_string()));
    };

    catalog::record_watch(&state.tmdb, &state.store, movie_id).await?;
    Ok((StatusCode::CREATED, Json(Ack::new("Added to watch history"))))
}

pub async fn watch_history(
    State(state): State<Arc<AppState>>,
) -> AppResult<Json<Vec<WatchHistoryEntry>>> {
    Ok(Json(catalog::watch_history(&state.store).await?))
}

pub async fn library_genres(State(state): State<Arc<AppState>>) -> AppResult<Json<Vec<Genre>>> {
    let genres = state.store.genres().await.map_err(AppError::persistence("Failed to fetch genres"))?;
    Ok(Json(genres.into_iter().map(|g| Genre { id: g.id, name: g.name }).collect()))
}

pub async fn library_genre_movies(
    State(state): State<Arc<AppState>>,
    genre_id: Result<Path<i32>, PathRejection>,
) -> AppResult<Json<Vec<CachedMovie>>> {
    let Path(genre_id) = genre_id?;
    let movies = state
        .store
        .movies_by_genre(genre_id)
        .await
        .map_err(AppError::persistence("Failed to fetch movies by genre"))?;
    Ok(Json(movies.into_iter().map(CachedMovie::from).collect()))
}

pub async fn watch_page(
    State(state): State<Arc<AppState>>,
    id: Result<Path<i32>, PathRejection>,
) -> Result<Html<String>, (StatusCode, Html<String>)> {
    let Ok(Path(id)) = id else {
        return Err((StatusCode::BAD_REQUEST, Html(templates::error_page("Invalid movie id"))));
    };

    match state.tmdb.movie(id).await {
        Ok(details) => {
            let player = Player::new(&state.config.embed_base_url, id);
            Ok(Html(templates::player_page(&details, &player, &state.config.image_base_url)))
        },
        Err(err) => {
            let err = AppError::from_tmdb(err, "Movie not found", "Failed to fetch movie details");
            Err((err.status(), Html(templates::error_page(&err.to_string()))))
        },
    }
}
