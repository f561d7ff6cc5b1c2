use futures::{StreamExt, stream};
use tracing::{debug, info, warn};

use crate::{
    entities::watch_history,
    error::{AppError, AppResult},
    listing,
    models::{Genre, WatchHistoryEntry},
    store::{MovieRecord, Store},
    tmdb::{Feed, FeedSource, TmdbClient},
};

const SEED_DETAIL_CONCURRENCY: usize = 4;

/// Records that `movie_id` was watched.
///
/// The movie must exist upstream. It is cached locally (with its genres) the
/// first time it is seen; a failure there is logged and does not stop the
/// history row from being written.
pub async fn record_watch(
    tmdb: &TmdbClient,
    store: &Store,
    movie_id: i32,
) -> AppResult<watch_history::Model> {
    let details = tmdb.movie(movie_id).await.map_err(|err| {
        if err.is_not_found() {
            AppError::NotFound("Movie not found".to_string())
        } else {
            AppError::upstream("Failed to add to watch history")(err)
        }
    })?;

    match store.get_movie(movie_id).await {
        Ok(Some(_)) => debug!(movie_id, "movie already cached"),
        Ok(None) => match store.cache_movie(&MovieRecord::from(&details)).await {
            Ok(inserted) => debug!(movie_id, inserted, "cached movie"),
            Err(err) => warn!(movie_id, error = %err, "failed to cache movie"),
        },
        Err(err) => warn!(movie_id, error = %err, "failed to look up cached movie"),
    }

    store
        .add_watch_history(movie_id, None)
        .await
        .map_err(AppError::persistence("Failed to add to watch history"))
}

pub async fn watch_history(store: &Store) -> AppResult<Vec<WatchHistoryEntry>> {
    let rows = store
        .watch_history()
        .await
        .map_err(AppError::persistence("Failed to fetch watch history"))?;
    Ok(rows.into_iter().map(WatchHistoryEntry::from).collect())
}

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct SeedReport {
    pub genres: usize,
    pub movies: usize,
}

/// Fills the local catalog with the upstream genre list and the first
/// `limit` trending movies. Rows that already exist are left alone; a movie
/// that fails to cache is logged and skipped.
pub async fn seed(tmdb: &TmdbClient, store: &Store, limit: usize) -> anyhow::Result<SeedReport> {
    let mut report = SeedReport::default();

    let genres: Vec<Genre> = tmdb.genres().await?.genres;
    for g in &genres {
        match store.add_genre(g).await {
            Ok(true) => report.genres += 1,
            Ok(false) => debug!(genre = %g.name, "genre already present"),
            Err(err) => warn!(genre = %g.name, error = %err, "failed to seed genre"),
        }
    }

    let trending =
        listing::collect(&FeedSource { client: tmdb, feed: Feed::Trending }, limit).await?;

    let records: Vec<MovieRecord> = stream::iter(trending.into_items())
        .map(|summary| {
            let genres = &genres;
            async move {
                // details carry the runtime; fall back to the list entry
                match tmdb.movie(summary.id).await {
                    Ok(details) => MovieRecord::from(&details),
                    Err(err) => {
                        warn!(movie_id = summary.id, error = %err, "failed to fetch details for seed");
                        MovieRecord::from_summary(&summary, genres)
                    },
                }
            }
        })
        .buffered(SEED_DETAIL_CONCURRENCY)
        .collect()
        .await;

    for record in &records {
        match store.cache_movie(record).await {
            Ok(true) => report.movies += 1,
            Ok(false) => debug!(movie_id = record.id, "movie already present"),
            Err(err) => warn!(movie_id = record.id, error = %err, "failed to seed movie"),
        }
    }

    info!(genres = report.genres, movies = report.movies, "seeded catalog");
    Ok(report)
}
