//! Public movie browsing on top of the metadata provider.

use std::sync::Arc;

use serde::Serialize;
use serde_json::Value;

use crate::clients::tmdb::{Genre, MovieDetails};
use crate::clients::{MetadataProvider, UpstreamError};
use crate::constants::limits::{DETAILS_CAST, DETAILS_CREW, DETAILS_SIMILAR, DETAILS_VIDEOS};
use crate::domain::{MovieId, Page};

/// Upstream listing served by a browse endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BrowseKind {
    Trending,
    Popular,
    TopRated,
    Upcoming,
    NowPlaying,
}

/// Details page payload: the upstream movie trimmed to what clients render.
#[derive(Debug, Clone, Serialize)]
pub struct MovieSummary {
    pub id: Option<i32>,
    pub title: Option<String>,
    pub overview: Option<String>,
    pub poster_path: Option<String>,
    pub backdrop_path: Option<String>,
    pub release_date: Option<String>,
    pub vote_average: Option<f64>,
    pub vote_count: Option<i64>,
    pub genres: Vec<Genre>,
    pub runtime: Option<i32>,
    pub budget: Option<i64>,
    pub revenue: Option<i64>,
    pub status: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cast: Option<Vec<Value>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub crew: Option<Vec<Value>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub videos: Option<Vec<Value>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub similar: Option<Vec<Value>>,
}

impl From<MovieDetails> for MovieSummary {
    fn from(details: MovieDetails) -> Self {
        let (cast, crew) = details.credits.map_or((None, None), |credits| {
            (
                Some(credits.cast.into_iter().take(DETAILS_CAST).collect()),
                Some(credits.crew.into_iter().take(DETAILS_CREW).collect()),
            )
        });

        let videos = details.videos.map(|list| {
            list.results
                .into_iter()
                .filter(|video| video.get("site").and_then(Value::as_str) == Some("YouTube"))
                .take(DETAILS_VIDEOS)
                .collect()
        });

        let similar = details
            .similar
            .map(|list| list.results.into_iter().take(DETAILS_SIMILAR).collect());

        Self {
            id: details.id,
            title: details.title,
            overview: details.overview,
            poster_path: details.poster_path,
            backdrop_path: details.backdrop_path,
            release_date: details.release_date,
            vote_average: details.vote_average,
            vote_count: details.vote_count,
            genres: details.genres,
            runtime: details.runtime,
            budget: details.budget,
            revenue: details.revenue,
            status: details.status,
            cast,
            crew,
            videos,
            similar,
        }
    }
}

const GENRES: [(i32, &str); 19] = [
    (28, "Action"),
    (12, "Adventure"),
    (16, "Animation"),
    (35, "Comedy"),
    (80, "Crime"),
    (99, "Documentary"),
    (18, "Drama"),
    (10751, "Family"),
    (14, "Fantasy"),
    (36, "History"),
    (27, "Horror"),
    (10402, "Music"),
    (9648, "Mystery"),
    (10749, "Romance"),
    (878, "Science Fiction"),
    (10770, "TV Movie"),
    (53, "Thriller"),
    (10752, "War"),
    (37, "Western"),
];

#[derive(Clone)]
pub struct CatalogService {
    metadata: Arc<dyn MetadataProvider>,
}

impl CatalogService {
    #[must_use]
    pub fn new(metadata: Arc<dyn MetadataProvider>) -> Self {
        Self { metadata }
    }

    pub async fn browse(&self, kind: BrowseKind, page: Page) -> Result<Value, UpstreamError> {
        match kind {
            BrowseKind::Trending => self.metadata.trending(page).await,
            BrowseKind::Popular => self.metadata.popular(page).await,
            BrowseKind::TopRated => self.metadata.top_rated(page).await,
            BrowseKind::Upcoming => self.metadata.upcoming(page).await,
            BrowseKind::NowPlaying => self.metadata.now_playing(page).await,
        }
    }

    pub async fn search(&self, query: &str, page: Page) -> Result<Value, UpstreamError> {
        self.metadata.search(query, page).await
    }

    pub async fn movie(&self, id: MovieId) -> Result<MovieSummary, UpstreamError> {
        self.metadata.movie_details(id).await.map(MovieSummary::from)
    }

    #[must_use]
    pub fn genres() -> Vec<Genre> {
        GENRES
            .iter()
            .map(|&(id, name)| Genre {
                id,
                name: name.to_string(),
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clients::tmdb::{Credits, ResultList};
    use serde_json::json;

    #[test]
    fn summary_trims_related_lists() {
        let details = MovieDetails {
            id: Some(550),
            title: Some("Fight Club".to_string()),
            credits: Some(Credits {
                cast: (0..15).map(|i| json!({ "order": i })).collect(),
                crew: (0..9).map(|i| json!({ "job": i })).collect(),
            }),
            videos: Some(ResultList {
                results: vec![
                    json!({"site": "Vimeo", "key": "v1"}),
                    json!({"site": "YouTube", "key": "y1"}),
                    json!({"site": "YouTube", "key": "y2"}),
                    json!({"site": "YouTube", "key": "y3"}),
                    json!({"site": "YouTube", "key": "y4"}),
                ],
            }),
            similar: Some(ResultList {
                results: (0..20).map(|i| json!({ "id": i })).collect(),
            }),
            ..MovieDetails::default()
        };

        let summary = MovieSummary::from(details);
        assert_eq!(summary.cast.unwrap().len(), DETAILS_CAST);
        assert_eq!(summary.crew.unwrap().len(), DETAILS_CREW);
        let videos = summary.videos.unwrap();
        assert_eq!(videos.len(), DETAILS_VIDEOS);
        assert!(videos.iter().all(|v| v["site"] == "YouTube"));
        assert_eq!(summary.similar.unwrap().len(), DETAILS_SIMILAR);
    }

    #[test]
    fn summary_omits_absent_sections() {
        let summary = MovieSummary::from(MovieDetails {
            id: Some(1),
            ..MovieDetails::default()
        });

        let json = serde_json::to_value(&summary).unwrap();
        assert!(json.get("cast").is_none());
        assert!(json.get("videos").is_none());
        assert_eq!(json["genres"], json!([]));
    }

    #[test]
    fn genre_list_is_static() {
        let genres = CatalogService::genres();
        assert_eq!(genres.len(), 19);
        assert_eq!(genres[0].name, "Action");
        assert!(genres.iter().any(|g| g.id == 878 && g.name == "Science Fiction"));
    }
}
