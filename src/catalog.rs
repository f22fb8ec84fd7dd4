use anyhow::Context;
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::future::Future;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::config::CatalogConfig;
use crate::error::CatalogError;
use crate::models::{MovieDetail, MovieSummary};

const SEARCH_FAILED: &str = "Something went wrong while fetching movies!";
const LOOKUP_FAILED: &str = "Something went wrong while fetching movie!";
const UNKNOWN_DOMAIN_ERROR: &str = "The movie database reported an unknown error";

/// The two requests the coordinators need from a movie catalog.
#[async_trait]
pub trait CatalogApi: Send + Sync {
    async fn search(&self, text: &str) -> Result<Vec<MovieSummary>, CatalogError>;
    async fn lookup(&self, id: &str) -> Result<MovieDetail, CatalogError>;
}

/// Client for OMDb-style catalogs (`?s=` search, `?i=` lookup).
#[derive(Debug, Clone)]
pub struct OmdbClient {
    client: Client,
    api_key: String,
    base_url: String,
}

impl OmdbClient {
    pub fn new(config: &CatalogConfig) -> anyhow::Result<Self> {
        let user_agent = format!("popcorn/{}", env!("CARGO_PKG_VERSION"));
        let client = Client::builder()
            .connect_timeout(config.connect_timeout)
            .timeout(config.timeout)
            .user_agent(user_agent)
            .build()
            .context("Failed to build catalog HTTP client")?;
        Ok(Self {
            client,
            api_key: config.api_key.clone(),
            base_url: config.base_url.clone(),
        })
    }

    fn url(&self, param: &str, value: &str) -> String {
        let sep = if self.base_url.contains('?') { '&' } else { '?' };
        format!(
            "{}{}apikey={}&{}={}",
            self.base_url,
            sep,
            urlencoding::encode(&self.api_key),
            param,
            urlencoding::encode(value)
        )
    }

    async fn get_json<T: for<'de> Deserialize<'de>>(
        &self,
        url: &str,
        failure: &str,
    ) -> Result<T, CatalogError> {
        let res = self.client.get(url).send().await.map_err(|e| {
            if e.is_timeout() {
                warn!("Catalog request timed out: {}", e);
            } else {
                warn!("Catalog request failed: {}", e);
            }
            CatalogError::Transport(failure.to_string())
        })?;
        let status = res.status();
        let text = res.text().await.map_err(|e| {
            warn!("Reading catalog body failed: {}", e);
            CatalogError::Transport(failure.to_string())
        })?;
        if !status.is_success() {
            warn!("Catalog returned status {}: {}", status, text);
            return Err(CatalogError::Transport(failure.to_string()));
        }
        serde_json::from_str(&text).map_err(|e| {
            warn!("Catalog JSON parse failed: {}", e);
            CatalogError::Transport(failure.to_string())
        })
    }
}

#[async_trait]
impl CatalogApi for OmdbClient {
    async fn search(&self, text: &str) -> Result<Vec<MovieSummary>, CatalogError> {
        debug!(query = %text, "Catalog search");
        let data: SearchResponse = self.get_json(&self.url("s", text), SEARCH_FAILED).await?;
        map_search(data)
    }

    async fn lookup(&self, id: &str) -> Result<MovieDetail, CatalogError> {
        debug!(id = %id, "Catalog lookup");
        let data: DetailResponse = self.get_json(&self.url("i", id), LOOKUP_FAILED).await?;
        map_detail(data)
    }
}

/// Races a catalog request against its cancellation token; cancellation wins ties.
pub(crate) async fn cancellable<T, F>(token: &CancellationToken, request: F) -> Result<T, CatalogError>
where
    F: Future<Output = Result<T, CatalogError>>,
{
    tokio::select! {
        biased;
        _ = token.cancelled() => Err(CatalogError::Cancelled),
        res = request => res,
    }
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(rename = "Search")]
    search: Option<Vec<SearchHit>>,
    #[serde(rename = "Response")]
    response: Option<String>,
    #[serde(rename = "Error")]
    error: Option<String>,
}

#[derive(Debug, Deserialize)]
struct SearchHit {
    #[serde(rename = "imdbID")]
    imdb_id: String,
    #[serde(rename = "Title", default)]
    title: String,
    #[serde(rename = "Year", default)]
    year: String,
    #[serde(rename = "Poster", default)]
    poster: String,
}

#[derive(Debug, Deserialize)]
struct DetailResponse {
    #[serde(rename = "imdbID", default)]
    imdb_id: String,
    #[serde(rename = "Title", default)]
    title: String,
    #[serde(rename = "Year", default)]
    year: String,
    #[serde(rename = "Poster", default)]
    poster: String,
    #[serde(rename = "Released", default)]
    released: String,
    #[serde(rename = "Runtime", default)]
    runtime: String,
    #[serde(rename = "Genre", default)]
    genre: String,
    #[serde(rename = "imdbRating", default)]
    imdb_rating: String,
    #[serde(rename = "Plot", default)]
    plot: String,
    #[serde(rename = "Actors", default)]
    actors: String,
    #[serde(rename = "Director", default)]
    director: String,
    #[serde(rename = "Response")]
    response: Option<String>,
    #[serde(rename = "Error")]
    error: Option<String>,
}

fn domain_error(response: Option<&str>, error: Option<String>) -> Option<CatalogError> {
    if let Some(msg) = error.filter(|m| !m.trim().is_empty()) {
        return Some(CatalogError::Domain(msg));
    }
    if response.is_some_and(|r| r.eq_ignore_ascii_case("false")) {
        return Some(CatalogError::Domain(UNKNOWN_DOMAIN_ERROR.to_string()));
    }
    None
}

fn map_search(data: SearchResponse) -> Result<Vec<MovieSummary>, CatalogError> {
    if let Some(err) = domain_error(data.response.as_deref(), data.error) {
        return Err(err);
    }
    Ok(data
        .search
        .unwrap_or_default()
        .into_iter()
        .map(|hit| MovieSummary {
            id: hit.imdb_id,
            title: hit.title,
            year: hit.year,
            poster_url: hit.poster,
        })
        .collect())
}

fn map_detail(data: DetailResponse) -> Result<MovieDetail, CatalogError> {
    if let Some(err) = domain_error(data.response.as_deref(), data.error) {
        return Err(err);
    }
    Ok(MovieDetail {
        id: data.imdb_id,
        title: data.title,
        year: data.year,
        poster_url: data.poster,
        release_date: data.released,
        runtime_label: data.runtime,
        genre: data.genre,
        imdb_rating: parse_rating(&data.imdb_rating),
        plot: data.plot,
        actors: data.actors,
        director: data.director,
    })
}

/// "8.8" -> 8.8; "N/A" and other junk -> 0.0.
pub fn parse_rating(input: &str) -> f32 {
    input
        .trim()
        .parse::<f32>()
        .ok()
        .filter(|r| r.is_finite())
        .unwrap_or(0.0)
}

pub fn parse_imdb_id(input: &str) -> Option<String> {
    let lower = input.trim().to_lowercase();
    if lower.starts_with("tt") && lower.len() > 2 && lower[2..].chars().all(|c| c.is_ascii_digit())
    {
        return Some(lower);
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maps_search_hits() {
        let data: SearchResponse = serde_json::from_str(
            r#"{"Search":[
                {"Title":"Inception","Year":"2010","imdbID":"tt1375666","Type":"movie","Poster":"https://img/inception.jpg"},
                {"Title":"Inception: The Cobol Job","Year":"2010","imdbID":"tt5295894","Type":"movie","Poster":"N/A"}
            ],"totalResults":"2","Response":"True"}"#,
        )
        .unwrap();
        let results = map_search(data).unwrap();
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].id, "tt1375666");
        assert_eq!(results[0].poster_url, "https://img/inception.jpg");
        assert_eq!(results[1].title, "Inception: The Cobol Job");
    }

    #[test]
    fn missing_search_field_is_empty() {
        let data: SearchResponse = serde_json::from_str(r#"{"Response":"True"}"#).unwrap();
        assert!(map_search(data).unwrap().is_empty());
    }

    #[test]
    fn error_field_is_domain_failure() {
        let data: SearchResponse =
            serde_json::from_str(r#"{"Response":"False","Error":"Movie not found!"}"#).unwrap();
        assert_eq!(
            map_search(data),
            Err(CatalogError::Domain("Movie not found!".to_string()))
        );

        let data: DetailResponse =
            serde_json::from_str(r#"{"Response":"False","Error":"Incorrect IMDb ID."}"#).unwrap();
        assert_eq!(
            map_detail(data),
            Err(CatalogError::Domain("Incorrect IMDb ID.".to_string()))
        );
    }

    #[test]
    fn false_response_without_message_still_fails() {
        let data: SearchResponse = serde_json::from_str(r#"{"Response":"False"}"#).unwrap();
        assert!(matches!(map_search(data), Err(CatalogError::Domain(msg)) if !msg.is_empty()));
    }

    #[test]
    fn maps_detail_fields() {
        let data: DetailResponse = serde_json::from_str(
            r#"{"Title":"The Matrix","Year":"1999","Rated":"R","Released":"31 Mar 1999",
                "Runtime":"136 min","Genre":"Action, Sci-Fi","Director":"Lana Wachowski, Lilly Wachowski",
                "Actors":"Keanu Reeves, Laurence Fishburne","Plot":"A hacker learns the truth.",
                "Poster":"https://img/matrix.jpg","imdbRating":"8.7","imdbID":"tt0133093","Response":"True"}"#,
        )
        .unwrap();
        let detail = map_detail(data).unwrap();
        assert_eq!(detail.id, "tt0133093");
        assert_eq!(detail.release_date, "31 Mar 1999");
        assert_eq!(detail.runtime_minutes(), 136);
        assert!((detail.imdb_rating - 8.7).abs() < f32::EPSILON);
        assert_eq!(detail.director, "Lana Wachowski, Lilly Wachowski");
    }

    #[test]
    fn parses_ratings_leniently() {
        assert_eq!(parse_rating("7.5"), 7.5);
        assert_eq!(parse_rating("N/A"), 0.0);
        assert_eq!(parse_rating("NaN"), 0.0);
    }

    #[test]
    fn recognizes_imdb_ids() {
        assert_eq!(parse_imdb_id(" TT0133093 "), Some("tt0133093".to_string()));
        assert_eq!(parse_imdb_id("tt"), None);
        assert_eq!(parse_imdb_id("the matrix"), None);
    }

    #[test]
    fn builds_query_urls() {
        let client = OmdbClient::new(&CatalogConfig::new("k3y")).unwrap();
        assert_eq!(
            client.url("s", "star wars"),
            "https://www.omdbapi.com/?apikey=k3y&s=star%20wars"
        );
    }
}
