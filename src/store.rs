use sea_orm::{
    ColumnTrait, ConnectionTrait, DatabaseConnection, DbErr, EntityTrait, JoinType, QueryFilter,
    QueryOrder, QuerySelect, RelationTrait, Set, SqlErr, TransactionTrait, sea_query::OnConflict,
};

use crate::{
    entities::{genre, movie, movie_genre, watch_history},
    models::{Genre, MovieDetails, MovieSummary},
};

/// A movie about to be cached locally.
#[derive(Clone, Debug, PartialEq)]
pub struct MovieRecord {
    pub id: i32,
    pub title: String,
    pub overview: Option<String>,
    pub poster_path: Option<String>,
    pub backdrop_path: Option<String>,
    pub release_date: Option<String>,
    pub vote_average: Option<f64>,
    pub runtime: Option<i32>,
    pub genres: Vec<Genre>,
}

impl From<&MovieDetails> for MovieRecord {
    fn from(d: &MovieDetails) -> Self {
        Self {
            id: d.id,
            title: d.title.clone(),
            overview: d.overview.clone(),
            poster_path: d.poster_path.clone(),
            backdrop_path: d.backdrop_path.clone(),
            release_date: d.release_date.clone(),
            vote_average: d.vote_average,
            runtime: d.runtime,
            genres: d.genres.clone(),
        }
    }
}

impl MovieRecord {
    /// Builds a record from a list entry, which carries neither runtime nor
    /// genre names. `genres` resolves `genre_ids`; unknown ids are skipped.
    pub fn from_summary(s: &MovieSummary, genres: &[Genre]) -> Self {
        Self {
            id: s.id,
            title: s.title.clone(),
            overview: s.overview.clone(),
            poster_path: s.poster_path.clone(),
            backdrop_path: s.backdrop_path.clone(),
            release_date: s.release_date.clone(),
            vote_average: s.vote_average,
            runtime: None,
            genres: s
                .genre_ids
                .iter()
                .filter_map(|id| genres.iter().find(|g| g.id == *id).cloned())
                .collect(),
        }
    }
}

#[derive(Clone)]
pub struct Store {
    db: DatabaseConnection,
}

impl Store {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    pub fn db(&self) -> &DatabaseConnection {
        &self.db
    }

    pub async fn get_movie(&self, id: i32) -> Result<Option<movie::Model>, DbErr> {
        movie::Entity::find_by_id(id).one(&self.db).await
    }

    /// Inserts the movie, its genres and the links between them, skipping any
    /// row that already exists. Returns whether the movie row was new.
    ///
    /// Concurrent callers caching the same movie both succeed; the loser's
    /// inserts are no-ops.
    pub async fn cache_movie(&self, record: &MovieRecord) -> Result<bool, DbErr> {
        let txn = self.db.begin().await?;
        match write_movie(&txn, record).await {
            Ok(inserted) => {
                txn.commit().await?;
                Ok(inserted > 0)
            },
            Err(err) => {
                txn.rollback().await?;
                Err(err)
            },
        }
    }

    /// Returns whether the genre was new.
    pub async fn add_genre(&self, g: &Genre) -> Result<bool, DbErr> {
        Ok(insert_genre(&self.db, g).await?.inserted)
    }

    pub async fn genres(&self) -> Result<Vec<genre::Model>, DbErr> {
        genre::Entity::find().order_by_asc(genre::Column::Name).all(&self.db).await
    }

    pub async fn movies_by_genre(&self, genre_id: i32) -> Result<Vec<movie::Model>, DbErr> {
        movie::Entity::find()
            .join(JoinType::InnerJoin, movie::Relation::MovieGenre.def())
            .filter(movie_genre::Column::GenreId.eq(genre_id))
            .order_by_asc(movie::Column::Title)
            .all(&self.db)
            .await
    }

    pub async fn add_watch_history(
        &self,
        movie_id: i32,
        user_id: Option<i32>,
    ) -> Result<watch_history::Model, DbErr> {
        let entry = watch_history::ActiveModel {
            id: Default::default(),
            user_id: Set(user_id),
            movie_id: Set(movie_id),
            watched_at: Set(now_sec()),
        };
        watch_history::Entity::insert(entry).exec_with_returning(&self.db).await
    }

    /// All entries, most recent first, each with its cached movie if there is
    /// one.
    pub async fn watch_history(
        &self,
    ) -> Result<Vec<(watch_history::Model, Option<movie::Model>)>, DbErr> {
        watch_history::Entity::find()
            .find_also_related(movie::Entity)
            .order_by_desc(watch_history::Column::WatchedAt)
            .order_by_desc(watch_history::Column::Id)
            .all(&self.db)
            .await
    }
}

async fn write_movie<C: ConnectionTrait>(conn: &C, record: &MovieRecord) -> Result<u64, DbErr> {
    let model = movie::ActiveModel {
        id: Set(record.id),
        title: Set(record.title.clone()),
        overview: Set(record.overview.clone()),
        poster_path: Set(record.poster_path.clone()),
        backdrop_path: Set(record.backdrop_path.clone()),
        release_date: Set(record.release_date.clone()),
        vote_average: Set(record.vote_average.map(|v| v.to_string())),
        runtime: Set(record.runtime),
        created_at: Set(now_sec()),
    };

    let inserted = movie::Entity::insert(model)
        .on_conflict(OnConflict::column(movie::Column::Id).do_nothing().to_owned())
        .exec_without_returning(conn)
        .await?;

    for g in &record.genres {
        let stored = insert_genre(conn, g).await?;
        link_genre(conn, record.id, stored.id).await?;
    }

    Ok(inserted)
}

struct StoredGenre {
    id: i32,
    inserted: bool,
}

/// Inserts `g` unless its id is already present. When another id already
/// holds the same name, that row is reused and its id returned.
async fn insert_genre<C: ConnectionTrait>(conn: &C, g: &Genre) -> Result<StoredGenre, DbErr> {
    let model = genre::ActiveModel { id: Set(g.id), name: Set(g.name.clone()) };
    let result = genre::Entity::insert(model)
        .on_conflict(OnConflict::column(genre::Column::Id).do_nothing().to_owned())
        .exec_without_returning(conn)
        .await;

    match result {
        Ok(rows) => Ok(StoredGenre { id: g.id, inserted: rows > 0 }),
        Err(err) if matches!(err.sql_err(), Some(SqlErr::UniqueConstraintViolation(_))) => {
            let existing =
                genre::Entity::find().filter(genre::Column::Name.eq(&g.name)).one(conn).await?;
            match existing {
                Some(existing) => {
                    tracing::debug!(
                        genre_id = g.id,
                        existing_id = existing.id,
                        name = %g.name,
                        "genre name already stored under another id"
                    );
                    Ok(StoredGenre { id: existing.id, inserted: false })
                },
                None => Err(err),
            }
        },
        Err(err) => Err(err),
    }
}

async fn link_genre<C: ConnectionTrait>(
    conn: &C,
    movie_id: i32,
    genre_id: i32,
) -> Result<u64, DbErr> {
    let model = movie_genre::ActiveModel { movie_id: Set(movie_id), genre_id: Set(genre_id) };
    movie_genre::Entity::insert(model)
        .on_conflict(
            OnConflict::columns([movie_genre::Column::MovieId, movie_genre::Column::GenreId])
                .do_nothing()
                .to_owned(),
        )
        .exec_without_returning(conn)
        .await
}

fn now_sec() -> i64 {
    jiff::Timestamp::now().as_second()
}
