use jiff::Timestamp;
use serde::{Deserialize, Serialize};

use crate::entities::{movie, watch_history};

/// The `{results, page, total_pages}` wrapper TMDB uses for every list.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct Paged<T> {
    pub page: u32,
    pub results: Vec<T>,
    pub total_pages: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_results: Option<u32>,
}

/// A movie as it appears inside list responses (trending, popular, discover,
/// search, similar).
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
#[serde(default)]
pub struct MovieSummary {
    pub id: i32,
    pub title: String,
    pub original_title: Option<String>,
    pub original_language: Option<String>,
    pub overview: Option<String>,
    pub poster_path: Option<String>,
    pub backdrop_path: Option<String>,
    pub release_date: Option<String>,
    pub vote_average: Option<f64>,
    pub vote_count: Option<u32>,
    pub popularity: Option<f64>,
    pub genre_ids: Vec<i32>,
    pub adult: bool,
}

#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
#[serde(default)]
pub struct MovieDetails {
    pub id: i32,
    pub title: String,
    pub original_title: Option<String>,
    pub tagline: Option<String>,
    pub overview: Option<String>,
    pub poster_path: Option<String>,
    pub backdrop_path: Option<String>,
    pub release_date: Option<String>,
    pub vote_average: Option<f64>,
    pub vote_count: Option<u32>,
    pub runtime: Option<i32>,
    pub status: Option<String>,
    pub homepage: Option<String>,
    pub imdb_id: Option<String>,
    pub genres: Vec<Genre>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub videos: Option<VideoList>,
}

#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
pub struct VideoList {
    #[serde(default)]
    pub results: Vec<Video>,
}

#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
#[serde(default)]
pub struct Video {
    pub key: String,
    pub name: String,
    pub site: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub official: Option<bool>,
}

#[derive(Clone, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
pub struct Genre {
    pub id: i32,
    pub name: String,
}

#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
pub struct GenreList {
    #[serde(default)]
    pub genres: Vec<Genre>,
}

#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
#[serde(default)]
pub struct Credits {
    pub id: i32,
    pub cast: Vec<CastMember>,
    pub crew: Vec<CrewMember>,
}

#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
#[serde(default)]
pub struct CastMember {
    pub id: i32,
    pub name: String,
    pub character: Option<String>,
    pub profile_path: Option<String>,
    pub order: Option<u32>,
}

#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
#[serde(default)]
pub struct CrewMember {
    pub id: i32,
    pub name: String,
    pub job: Option<String>,
    pub department: Option<String>,
    pub profile_path: Option<String>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct AddWatchHistoryRequest {
    #[serde(rename = "movieId")]
    pub movie_id: Option<i32>,
}

#[derive(Clone, Debug, Serialize)]
pub struct Ack {
    pub message: String,
}

impl Ack {
    pub fn new(message: impl Into<String>) -> Self {
        Self { message: message.into() }
    }
}

#[derive(Clone, Debug, Serialize)]
pub struct EmbedLink {
    pub url: String,
}

/// A locally cached movie, as returned by the watch-history and library
/// endpoints.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CachedMovie {
    pub id: i32,
    pub title: String,
    pub overview: Option<String>,
    pub poster_path: Option<String>,
    pub backdrop_path: Option<String>,
    pub release_date: Option<String>,
    pub vote_average: Option<String>,
    pub runtime: Option<i32>,
    pub created_at: Timestamp,
}

impl From<movie::Model> for CachedMovie {
    fn from(m: movie::Model) -> Self {
        Self {
            id: m.id,
            title: m.title,
            overview: m.overview,
            poster_path: m.poster_path,
            backdrop_path: m.backdrop_path,
            release_date: m.release_date,
            vote_average: m.vote_average,
            runtime: m.runtime,
            created_at: from_unix(m.created_at),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WatchHistoryEntry {
    pub id: i32,
    pub user_id: Option<i32>,
    pub movie_id: i32,
    pub watched_at: Timestamp,
    pub movie: Option<CachedMovie>,
}

impl From<(watch_history::Model, Option<movie::Model>)> for WatchHistoryEntry {
    fn from((entry, movie): (watch_history::Model, Option<movie::Model>)) -> Self {
        Self {
            id: entry.id,
            user_id: entry.user_id,
            movie_id: entry.movie_id,
            watched_at: from_unix(entry.watched_at),
            movie: movie.map(CachedMovie::from),
        }
    }
}

fn from_unix(seconds: i64) -> Timestamp {
    Timestamp::from_second(seconds).unwrap_or(Timestamp::UNIX_EPOCH)
}
