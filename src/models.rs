use serde::{Deserialize, Deserializer, Serialize};

use crate::{
    entities::{movie, movie_genre},
    error::{AppError, AppResult},
};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Movie {
    pub id: i32,
    #[serde(rename = "imdbID")]
    pub imdb_id: String,
    pub title: String,
    pub year: i32,
    pub rating: f64,
    pub genres: Vec<String>,
    #[serde(rename = "isSuperHero")]
    pub is_super_hero: bool,
}

impl Movie {
    pub fn from_rows(movie: movie::Model, mut genres: Vec<movie_genre::Model>) -> Self {
        genres.sort_by_key(|g| g.position);
        Self::with_genres(movie, genres.into_iter().map(|g| g.name).collect())
    }

    pub fn with_genres(movie: movie::Model, genres: Vec<String>) -> Self {
        Self {
            id: movie.id,
            imdb_id: movie.imdb_id,
            title: movie.title,
            year: movie.year,
            rating: movie.rating,
            genres,
            is_super_hero: movie.is_super_hero,
        }
    }
}

/// Body of `POST /movies`. An `id` sent by the client is ignored.
#[derive(Debug, Deserialize)]
pub struct NewMovie {
    #[serde(rename = "imdbID")]
    pub imdb_id: String,
    pub title: String,
    pub year: i32,
    pub rating: f64,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub genres: Vec<String>,
    #[serde(rename = "isSuperHero", default)]
    pub is_super_hero: bool,
}

impl NewMovie {
    pub fn validate(mut self) -> AppResult<Self> {
        self.imdb_id = self.imdb_id.trim().to_string();
        if self.imdb_id.is_empty() {
            return Err(AppError::Validation("imdbID is required".to_string()));
        }
        if self.title.trim().is_empty() {
            return Err(AppError::Validation("title must not be empty".to_string()));
        }
        Ok(self)
    }
}

fn null_as_empty<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<String>, D::Error> {
    Ok(Option::<Vec<String>>::deserialize(deserializer)?.unwrap_or_default())
}

/// Body of `PUT /movies/{imdbID}`. Fields left out keep their stored value.
#[derive(Debug, Default, Deserialize)]
pub struct MovieChanges {
    pub title: Option<String>,
    pub year: Option<i32>,
    pub rating: Option<f64>,
    pub genres: Option<Vec<String>>,
    #[serde(rename = "isSuperHero")]
    pub is_super_hero: Option<bool>,
}

impl MovieChanges {
    pub fn validate(self) -> AppResult<Self> {
        if self.title.as_deref().is_some_and(|t| t.trim().is_empty()) {
            return Err(AppError::Validation("title must not be empty".to_string()));
        }
        Ok(self)
    }
}

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub year: Option<String>,
}

impl ListQuery {
    /// An absent or empty `year` means no filter.
    pub fn year(&self) -> AppResult<Option<i32>> {
        match self.year.as_deref().map(str::trim) {
            None | Some("") => Ok(None),
            Some(raw) => raw
                .parse()
                .map(Some)
                .map_err(|_| AppError::Validation(format!("invalid year: {raw}"))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn genre(position: i32, name: &str) -> movie_genre::Model {
        movie_genre::Model { id: position + 10, movie_id: 1, position, name: name.to_string() }
    }

    #[test]
    fn movie_uses_wire_field_names() {
        let movie = Movie {
            id: 7,
            imdb_id: "tt001".to_string(),
            title: "Alpha".to_string(),
            year: 2000,
            rating: 7.5,
            genres: vec!["Action".to_string()],
            is_super_hero: true,
        };
        let json = serde_json::to_value(&movie).unwrap();
        assert_eq!(json["id"], 7);
        assert_eq!(json["imdbID"], "tt001");
        assert_eq!(json["isSuperHero"], true);
        assert_eq!(json["genres"][0], "Action");
    }

    #[test]
    fn from_rows_orders_genres_by_position() {
        let row = movie::Model {
            id: 1,
            imdb_id: "tt001".to_string(),
            title: "Alpha".to_string(),
            year: 2000,
            rating: 7.5,
            is_super_hero: false,
        };
        let movie = Movie::from_rows(row, vec![genre(1, "Drama"), genre(0, "Action")]);
        assert_eq!(movie.genres, vec!["Action", "Drama"]);
    }

    #[test]
    fn new_movie_defaults_optional_fields() {
        let input: NewMovie = serde_json::from_str(
            r#"{"id":99,"imdbID":"tt001","title":"Alpha","year":2000,"rating":7.5}"#,
        )
        .unwrap();
        assert!(input.genres.is_empty());
        assert!(!input.is_super_hero);
    }

    #[test]
    fn new_movie_treats_null_genres_as_empty() {
        let input: NewMovie = serde_json::from_str(
            r#"{"imdbID":"tt001","title":"Alpha","year":2000,"rating":7.5,"genres":null}"#,
        )
        .unwrap();
        assert!(input.genres.is_empty());
    }

    #[test]
    fn new_movie_rejects_missing_imdb_id() {
        let result: Result<NewMovie, _> =
            serde_json::from_str(r#"{"title":"Alpha","year":2000,"rating":7.5}"#);
        assert!(result.is_err());
    }

    #[test]
    fn new_movie_validate_rejects_blank_fields() {
        let blank_id: NewMovie =
            serde_json::from_str(r#"{"imdbID":"  ","title":"Alpha","year":2000,"rating":7.5}"#)
                .unwrap();
        assert!(matches!(blank_id.validate(), Err(AppError::Validation(_))));

        let blank_title: NewMovie =
            serde_json::from_str(r#"{"imdbID":"tt001","title":"","year":2000,"rating":7.5}"#)
                .unwrap();
        assert!(matches!(blank_title.validate(), Err(AppError::Validation(_))));
    }

    #[test]
    fn movie_changes_allows_partial_body() {
        let changes: MovieChanges = serde_json::from_str(r#"{"rating":8.0}"#).unwrap();
        let changes = changes.validate().unwrap();
        assert_eq!(changes.rating, Some(8.0));
        assert!(changes.title.is_none());
        assert!(changes.genres.is_none());
    }

    #[test]
    fn movie_changes_rejects_blank_title() {
        let changes = MovieChanges { title: Some(" ".to_string()), ..Default::default() };
        assert!(matches!(changes.validate(), Err(AppError::Validation(_))));
    }

    #[test]
    fn list_query_parses_year() {
        let q = |year: Option<&str>| ListQuery { year: year.map(str::to_string) };
        assert_eq!(q(None).year().unwrap(), None);
        assert_eq!(q(Some("")).year().unwrap(), None);
        assert_eq!(q(Some("2000")).year().unwrap(), Some(2000));
        assert!(matches!(q(Some("twenty")).year(), Err(AppError::Validation(_))));
    }
}
