use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, ModelTrait,
    QueryFilter, QueryOrder, Set, SqlErr, TransactionTrait,
};
use tracing::debug;

use crate::{
    entities::{movie, movie_genre},
    error::{AppError, AppResult},
    models::{Movie, MovieChanges, NewMovie},
};

#[derive(Clone)]
pub struct MovieStore {
    db: DatabaseConnection,
}

impl MovieStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    pub async fn list(&self, year: Option<i32>) -> AppResult<Vec<Movie>> {
        let mut query = movie::Entity::find();
        if let Some(year) = year {
            query = query.filter(movie::Column::Year.eq(year));
        }

        let rows = query
            .order_by_asc(movie::Column::Id)
            .find_with_related(movie_genre::Entity)
            .all(&self.db)
            .await?;

        debug!(year = ?year, count = rows.len(), "listed movies");

        Ok(rows.into_iter().map(|(movie, genres)| Movie::from_rows(movie, genres)).collect())
    }

    pub async fn get(&self, imdb_id: &str) -> AppResult<Option<Movie>> {
        let Some(row) = find_row(&self.db, imdb_id).await? else {
            return Ok(None);
        };
        let genres = row
            .find_related(movie_genre::Entity)
            .order_by_asc(movie_genre::Column::Position)
            .all(&self.db)
            .await?;

        Ok(Some(Movie::from_rows(row, genres)))
    }

    pub async fn create(&self, new: NewMovie) -> AppResult<Movie> {
        let txn = self.db.begin().await?;

        let model = movie::ActiveModel {
            id: Default::default(),
            imdb_id: Set(new.imdb_id.clone()),
            title: Set(new.title),
            year: Set(new.year),
            rating: Set(new.rating),
            is_super_hero: Set(new.is_super_hero),
        };

        let row = match model.insert(&txn).await {
            Ok(row) => row,
            Err(err) if matches!(err.sql_err(), Some(SqlErr::UniqueConstraintViolation(_))) => {
                debug!(imdb_id = %new.imdb_id, "duplicate imdbID");
                return Err(AppError::Conflict("movie already exists".to_string()));
            },
            Err(err) => return Err(err.into()),
        };

        put_genres(&txn, row.id, &new.genres).await?;
        txn.commit().await?;

        debug!(id = row.id, imdb_id = %row.imdb_id, "created movie");

        Ok(Movie::with_genres(row, new.genres))
    }

    /// Returns `None` when no movie has this `imdb_id`.
    pub async fn update(&self, imdb_id: &str, changes: MovieChanges) -> AppResult<Option<Movie>> {
        let txn = self.db.begin().await?;

        let Some(existing) = find_row(&txn, imdb_id).await? else {
            return Ok(None);
        };

        let mut model: movie::ActiveModel = existing.clone().into();
        if let Some(title) = changes.title {
            model.title = Set(title);
        }
        if let Some(year) = changes.year {
            model.year = Set(year);
        }
        if let Some(rating) = changes.rating {
            model.rating = Set(rating);
        }
        if let Some(is_super_hero) = changes.is_super_hero {
            model.is_super_hero = Set(is_super_hero);
        }

        let row = if model.is_changed() { model.update(&txn).await? } else { existing };

        let movie = match changes.genres {
            Some(genres) => {
                movie_genre::Entity::delete_many()
                    .filter(movie_genre::Column::MovieId.eq(row.id))
                    .exec(&txn)
                    .await?;
                put_genres(&txn, row.id, &genres).await?;
                Movie::with_genres(row, genres)
            },
            None => {
                let genres = row
                    .find_related(movie_genre::Entity)
                    .order_by_asc(movie_genre::Column::Position)
                    .all(&txn)
                    .await?;
                Movie::from_rows(row, genres)
            },
        };

        txn.commit().await?;

        debug!(id = movie.id, imdb_id = %movie.imdb_id, "updated movie");

        Ok(Some(movie))
    }
}

async fn find_row<C: ConnectionTrait>(conn: &C, imdb_id: &str) -> AppResult<Option<movie::Model>> {
    let row =
        movie::Entity::find().filter(movie::Column::ImdbId.eq(imdb_id)).one(conn).await?;
    Ok(row)
}

async fn put_genres<C: ConnectionTrait>(
    conn: &C,
    movie_id: i32,
    genres: &[String],
) -> AppResult<()> {
    if genres.is_empty() {
        return Ok(());
    }

    let models = genres.iter().enumerate().map(|(position, name)| movie_genre::ActiveModel {
        id: Default::default(),
        movie_id: Set(movie_id),
        position: Set(position as i32),
        name: Set(name.clone()),
    });
    movie_genre::Entity::insert_many(models).exec(conn).await?;

    Ok(())
}
