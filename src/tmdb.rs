use std::{num::NonZeroU32, sync::Arc};

use governor::{
    Quota, RateLimiter,
    clock::DefaultClock,
    state::{InMemoryState, NotKeyed},
};
use reqwest::StatusCode;
use serde::{Deserialize, de::DeserializeOwned};
use tracing::debug;

use crate::{
    listing::PageSource,
    models::{Credits, GenreList, MovieDetails, MovieSummary, Paged},
};

#[derive(Debug, thiserror::Error)]
pub enum TmdbError {
    #[error("TMDB request failed: {0}")]
    Network(#[from] reqwest::Error),

    #[error("TMDB responded with {status}")]
    Status { status: StatusCode, message: Option<String> },

    #[error("TMDB response could not be decoded: {0}")]
    Decode(#[from] serde_json::Error),
}

impl TmdbError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::Status { status: StatusCode::NOT_FOUND, .. })
    }

    /// The `status_message` TMDB put in its error body, if any.
    pub fn upstream_message(&self) -> Option<&str> {
        match self {
            Self::Status { message, .. } => message.as_deref(),
            _ => None,
        }
    }
}

pub type TmdbResult<T> = Result<T, TmdbError>;

pub struct TmdbClient {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
    limiter: Arc<RateLimiter<NotKeyed, InMemoryState, DefaultClock>>,
}

impl TmdbClient {
    pub fn new(client: reqwest::Client, api_key: String, base_url: String, rps: u32) -> Self {
        let per_second = NonZeroU32::new(rps).unwrap_or(NonZeroU32::MIN);
        let limiter = Arc::new(RateLimiter::direct(Quota::per_second(per_second)));
        Self { client, api_key, base_url, limiter }
    }

    /// GETs `path` under the base URL with the API key and `params` appended,
    /// decoding the body as `T`. Non-2xx answers become [`TmdbError::Status`].
    pub async fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        params: &[(&str, String)],
    ) -> TmdbResult<T> {
        self.limiter.until_ready().await;

        let url =
            format!("{}/{}", self.base_url.trim_end_matches('/'), path.trim_start_matches('/'));
        debug!(path = %path, params = ?params, "calling TMDB");

        let resp = self
            .client
            .get(url)
            .query(&[("api_key", self.api_key.as_str())])
            .query(params)
            .send()
            .await?;

        let status = resp.status();
        let body = resp.bytes().await?;

        if !status.is_success() {
            let message =
                serde_json::from_slice::<ErrorBody>(&body).ok().and_then(|b| b.status_message);
            debug!(path = %path, %status, message = ?message, "TMDB returned an error");
            return Err(TmdbError::Status { status, message });
        }

        Ok(serde_json::from_slice(&body)?)
    }

    pub async fn search(&self, query: &str, page: u32) -> TmdbResult<Paged<MovieSummary>> {
        self.get("search/movie", &[("query", query.to_string()), ("page", page.to_string())]).await
    }

    pub async fn trending(&self, page: u32) -> TmdbResult<Paged<MovieSummary>> {
        self.get("trending/movie/day", &[("page", page.to_string())]).await
    }

    pub async fn popular(&self, page: u32) -> TmdbResult<Paged<MovieSummary>> {
        self.get("movie/popular", &[("page", page.to_string())]).await
    }

    pub async fn discover(&self, page: u32) -> TmdbResult<Paged<MovieSummary>> {
        self.get(
            "discover/movie",
            &[("page", page.to_string()), ("sort_by", "popularity.desc".to_string())],
        )
        .await
    }

    pub async fn by_genre(&self, genre_id: i32, page: u32) -> TmdbResult<Paged<MovieSummary>> {
        self.get(
            "discover/movie",
            &[("with_genres", genre_id.to_string()), ("page", page.to_string())],
        )
        .await
    }

    pub async fn movie(&self, id: i32) -> TmdbResult<MovieDetails> {
        self.get(&format!("movie/{id}"), &[]).await
    }

    pub async fn movie_with_videos(&self, id: i32) -> TmdbResult<MovieDetails> {
        self.get(&format!("movie/{id}"), &[("append_to_response", "videos".to_string())]).await
    }

    pub async fn credits(&self, id: i32) -> TmdbResult<Credits> {
        self.get(&format!("movie/{id}/credits"), &[]).await
    }

    pub async fn similar(&self, id: i32, page: u32) -> TmdbResult<Paged<MovieSummary>> {
        self.get(&format!("movie/{id}/similar"), &[("page", page.to_string())]).await
    }

    pub async fn genres(&self) -> TmdbResult<GenreList> {
        self.get("genre/movie/list", &[]).await
    }

    pub async fn feed(&self, feed: Feed, page: u32) -> TmdbResult<Paged<MovieSummary>> {
        match feed {
            Feed::Trending => self.trending(page).await,
            Feed::Popular => self.popular(page).await,
            Feed::Discover => self.discover(page).await,
            Feed::Genre(id) => self.by_genre(id, page).await,
        }
    }
}

/// The paginated movie lists the listing controller can walk.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Feed {
    Trending,
    Popular,
    Discover,
    Genre(i32),
}

pub struct FeedSource<'a> {
    pub client: &'a TmdbClient,
    pub feed: Feed,
}

impl PageSource<MovieSummary> for FeedSource<'_> {
    type Error = TmdbError;

    async fn fetch(&self, page: u32) -> TmdbResult<Paged<MovieSummary>> {
        self.client.feed(self.feed, page).await
    }
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    status_message: Option<String>,
}
