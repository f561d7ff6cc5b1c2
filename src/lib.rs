pub mod catalog;
pub mod config;
pub mod db;
pub mod embed;
pub mod entities;
pub mod error;
pub mod filters;
pub mod images;
pub mod listing;
pub mod models;
pub mod routes;
pub mod store;
pub mod templates;
pub mod tmdb;

use std::sync::Arc;

use axum::{
    Router,
    routing::{get, post},
};
use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::{config::Config, store::Store, tmdb::TmdbClient};

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub store: Store,
    pub tmdb: Arc<TmdbClient>,
}

impl AppState {
    /// Opens the database and builds the upstream client.
    pub async fn build(config: Config) -> anyhow::Result<Self> {
        let http = reqwest::Client::builder().user_agent("cinestream/0.1").build()?;

        let db = db::connect_and_migrate(&config.database_url).await?;

        let tmdb = TmdbClient::new(
            http,
            config.tmdb_api_key.clone(),
            config.tmdb_base_url.clone(),
            config.tmdb_rps,
        );

        Ok(Self { config: Arc::new(config), store: Store::new(db), tmdb: Arc::new(tmdb) })
    }
}

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/api/movies/search", get(routes::search))
        .route("/api/movies/trending", get(routes::trending))
        .route("/api/movies/popular", get(routes::popular))
        .route("/api/movies/discover", get(routes::discover))
        .route("/api/movies/genre/{id}", get(routes::by_genre))
        .route("/api/movies/{id}", get(routes::movie))
        .route("/api/movies/{id}/credits", get(routes::credits))
        .route("/api/movies/{id}/similar", get(routes::similar))
        .route("/api/movies/{id}/embed", get(routes::embed_link))
        .route("/api/genres", get(routes::genres))
        .route("/api/watch-history", post(routes::add_watch_history).get(routes::watch_history))
        .route("/api/library/genres", get(routes::library_genres))
        .route("/api/library/genres/{id}/movies", get(routes::library_genre_movies))
        .route("/watch/{id}", get(routes::watch_page))
        .with_state(state)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::new().allow_origin(Any).allow_headers(Any)),
        )
}

pub async fn serve(config: Config) -> anyhow::Result<()> {
    let addr = config.addr;
    let state = Arc::new(AppState::build(config).await?);

    if state.config.seed_on_start {
        if let Err(err) = catalog::seed(&state.tmdb, &state.store, state.config.seed_limit).await {
            tracing::warn!(error = %err, "catalog seed failed");
        }
    }

    let app = router(state);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(addr = %addr, "listening");
    axum::serve(listener, app).await?;

    Ok(())
}
