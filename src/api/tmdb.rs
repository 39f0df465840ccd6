//! TMDB (The Movie Database) API client
//!
//! Provides movie listings, search, discovery and detail metadata.
//! API docs: https://developer.themoviedb.org/docs

use anyhow::Result;
use chrono::NaiveDate;
use reqwest::StatusCode;
use serde::Deserialize;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, warn};

use crate::config::{Config, DEFAULT_BASE_URL};
use crate::models::{
    Account, CastMember, Category, Collection, Credits, CrewMember, Genre, Movie, MovieDetail,
    MoviePage, ProductionCompany, ProductionCountry, SpokenLanguage,
};
use crate::query::{self, MovieQuery, QueryPlan, ResolverOptions};

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);
const DEFAULT_LANGUAGE: &str = "en-US";

/// v4 read access tokens are JWTs; anything shorter is a v3 API key
const BEARER_MIN_LEN: usize = 64;

/// TMDB API error types
#[derive(Error, Debug)]
pub enum TmdbError {
    #[error("Resource not found (404)")]
    NotFound,

    #[error("Invalid or missing credentials (401)")]
    Unauthorized,

    #[error("Rate limited (429), retries exhausted")]
    RateLimited,

    #[error("Server error: {0}")]
    ServerError(u16),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Request failed: {0}")]
    RequestFailed(#[from] reqwest::Error),
}

/// How the credential is presented to TMDB
#[derive(Debug, Clone, PartialEq, Eq)]
enum Auth {
    Bearer(String),
    ApiKey(String),
}

impl Auth {
    fn from_credential(credential: String) -> Self {
        if credential.len() >= BEARER_MIN_LEN {
            Auth::Bearer(credential)
        } else {
            Auth::ApiKey(credential)
        }
    }
}

/// TMDB API client
pub struct TmdbClient {
    auth: Auth,
    base_url: String,
    client: reqwest::Client,
    max_retries: u32,
    language: String,
    region: Option<String>,
}

impl TmdbClient {
    /// Create a new TMDB client with the given API key or access token
    pub fn new(credential: impl Into<String>) -> Self {
        Self::with_base_url(credential, DEFAULT_BASE_URL)
    }

    /// Create a client with a custom base URL (for testing)
    pub fn with_base_url(credential: impl Into<String>, base_url: impl Into<String>) -> Self {
        let client = http_client(DEFAULT_TIMEOUT).unwrap_or_else(|e| {
            warn!(error = %e, "HTTP client setup failed, using defaults without timeout");
            reqwest::Client::new()
        });
        Self::build(credential.into(), base_url.into(), client)
    }

    /// Create a client from loaded configuration
    pub fn from_config(config: &Config) -> Result<Self> {
        let credential = config.credential()?.to_string();
        let client =
            http_client(Duration::from_secs(config.timeout_secs)).map_err(TmdbError::from)?;
        Ok(Self::build(credential, config.base_url.clone(), client)
            .with_locale(config.language.clone(), config.region.clone()))
    }

    /// Language and region sent with listing, search and recommendation requests
    pub fn with_locale(mut self, language: impl Into<String>, region: Option<String>) -> Self {
        self.language = language.into();
        self.region = region;
        self
    }

    pub fn language(&self) -> &str {
        &self.language
    }

    fn build(credential: String, base_url: String, client: reqwest::Client) -> Self {
        Self {
            auth: Auth::from_credential(credential),
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
            max_retries: 3,
            language: DEFAULT_LANGUAGE.to_string(),
            region: None,
        }
    }

    /// Make an authenticated GET request with retry logic for rate limits
    async fn get<T: for<'de> Deserialize<'de>>(&self, endpoint: &str) -> Result<T> {
        let mut url = format!("{}{}", self.base_url, endpoint);
        if let Auth::ApiKey(key) = &self.auth {
            let sep = if endpoint.contains('?') { '&' } else { '?' };
            url = format!("{}{}api_key={}", url, sep, urlencoding::encode(key));
        }
        let mut retries = 0;

        loop {
            debug!(endpoint, attempt = retries + 1, "TMDB request");
            let mut request = self.client.get(&url).header("Accept", "application/json");
            if let Auth::Bearer(token) = &self.auth {
                request = request.header("Authorization", format!("Bearer {}", token));
            }
            let response = request.send().await.map_err(TmdbError::from)?;

            match response.status() {
                StatusCode::OK => {
                    let body = response.text().await.map_err(TmdbError::from)?;
                    let parsed: T = serde_json::from_str(&body).map_err(|e| {
                        TmdbError::InvalidResponse(format!("JSON parse error: {}", e))
                    })?;
                    return Ok(parsed);
                }
                StatusCode::NOT_FOUND => {
                    return Err(TmdbError::NotFound.into());
                }
                StatusCode::UNAUTHORIZED => {
                    return Err(TmdbError::Unauthorized.into());
                }
                StatusCode::TOO_MANY_REQUESTS => {
                    retries += 1;
                    if retries >= self.max_retries {
                        return Err(TmdbError::RateLimited.into());
                    }

                    // Get Retry-After header or default to exponential backoff
                    let wait_secs = response
                        .headers()
                        .get("Retry-After")
                        .and_then(|v| v.to_str().ok())
                        .and_then(|s| s.parse::<u64>().ok())
                        .unwrap_or(2u64.pow(retries));

                    warn!(endpoint, wait_secs, "TMDB rate limited, backing off");
                    tokio::time::sleep(Duration::from_secs(wait_secs)).await;
                    continue;
                }
                status => {
                    return Err(TmdbError::ServerError(status.as_u16()).into());
                }
            }
        }
    }

    async fn get_page(&self, endpoint: &str) -> Result<MoviePage> {
        let response: PageResponse = self.get(endpoint).await?;
        Ok(response.into_page())
    }

    /// Fixed category listing (`/movie/{category}`)
    pub async fn category(&self, category: Category, page: u32) -> Result<MoviePage> {
        let query = MovieQuery::new(category)
            .page(page)
            .language(self.language.as_str());
        let options = ResolverOptions {
            region: self.region.clone(),
            ..ResolverOptions::default()
        };
        self.execute(&query::resolve(&query, today(), &options)).await
    }

    pub async fn now_playing(&self, page: u32) -> Result<MoviePage> {
        self.category(Category::NowPlaying, page).await
    }

    pub async fn upcoming(&self, page: u32) -> Result<MoviePage> {
        self.category(Category::Upcoming, page).await
    }

    pub async fn popular(&self, page: u32) -> Result<MoviePage> {
        self.category(Category::Popular, page).await
    }

    /// Discover movies with arbitrary filter parameters
    pub async fn discover(&self, params: &[(String, String)]) -> Result<MoviePage> {
        let endpoint = format!("/discover/movie?{}", query::encode_params(params));
        self.get_page(&endpoint).await
    }

    /// Free-text movie search
    pub async fn search_movies(&self, text: &str, page: u32) -> Result<MoviePage> {
        let endpoint = format!(
            "/search/movie?query={}&page={}&language={}",
            urlencoding::encode(text),
            page.max(1),
            urlencoding::encode(&self.language)
        );
        self.get_page(&endpoint).await
    }

    /// Run a resolved plan, applying its client-side filter and sort
    pub async fn execute(&self, plan: &QueryPlan) -> Result<MoviePage> {
        let mut page = self.get_page(&plan.path_and_query()).await?;
        plan.post_process(&mut page.results);
        Ok(page)
    }

    /// Resolve a listing query against `today` and fetch it
    pub async fn movies(
        &self,
        query: &MovieQuery,
        today: NaiveDate,
        options: &ResolverOptions,
    ) -> Result<MoviePage> {
        let plan = query::resolve(query, today, options);
        self.execute(&plan).await
    }

    /// Get movie details by ID
    pub async fn movie_detail(&self, id: u64) -> Result<MovieDetail> {
        let response: DetailResponse = self.get(&format!("/movie/{}", id)).await?;
        Ok(response.into_detail())
    }

    /// Get cast and crew for a movie
    pub async fn movie_credits(&self, id: u64) -> Result<Credits> {
        let response: CreditsResponse = self.get(&format!("/movie/{}/credits", id)).await?;
        Ok(response.into_credits())
    }

    /// Get movies recommended from a movie
    pub async fn recommendations(&self, id: u64, page: u32) -> Result<MoviePage> {
        let endpoint = format!(
            "/movie/{}/recommendations?page={}&language={}",
            id,
            page.max(1),
            urlencoding::encode(&self.language)
        );
        self.get_page(&endpoint).await
    }

    /// Get the account the credential belongs to
    pub async fn account(&self) -> Result<Account> {
        let response: AccountResponse = self.get("/account").await?;
        Ok(response.into_account())
    }
}

fn today() -> NaiveDate {
    chrono::Local::now().date_naive()
}

fn http_client(timeout: Duration) -> Result<reqwest::Client, reqwest::Error> {
    reqwest::Client::builder().timeout(timeout).build()
}

// =============================================================================
// Response Structures (internal deserialization)
// =============================================================================

#[derive(Debug, Deserialize)]
struct PageResponse {
    #[serde(default = "first_page")]
    page: u32,
    #[serde(default)]
    total_pages: u32,
    #[serde(default)]
    total_results: u32,
    results: Vec<MovieRaw>,
}

fn first_page() -> u32 {
    1
}

impl PageResponse {
    fn into_page(self) -> MoviePage {
        MoviePage {
            page: self.page,
            total_pages: self.total_pages,
            total_results: self.total_results,
            results: self.results.into_iter().map(MovieRaw::into_movie).collect(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct MovieRaw {
    id: u64,
    title: Option<String>,
    original_title: Option<String>,
    original_language: Option<String>,
    overview: Option<String>,
    release_date: Option<String>,
    poster_path: Option<String>,
    backdrop_path: Option<String>,
    #[serde(default)]
    genre_ids: Vec<u32>,
    popularity: Option<f64>,
    vote_average: Option<f64>,
    vote_count: Option<u32>,
    #[serde(default)]
    adult: bool,
    #[serde(default)]
    video: bool,
}

impl MovieRaw {
    fn into_movie(self) -> Movie {
        let title = self.title.or_else(|| self.original_title.clone()).unwrap_or_default();
        Movie {
            id: self.id,
            original_title: self.original_title.unwrap_or_else(|| title.clone()),
            title,
            original_language: self.original_language.unwrap_or_default(),
            overview: self.overview.unwrap_or_default(),
            release_date: non_empty(self.release_date),
            poster_path: self.poster_path,
            backdrop_path: self.backdrop_path,
            genre_ids: self.genre_ids,
            popularity: self.popularity.unwrap_or(0.0),
            vote_average: self.vote_average.unwrap_or(0.0),
            vote_count: self.vote_count.unwrap_or(0),
            adult: self.adult,
            video: self.video,
        }
    }
}

#[derive(Debug, Deserialize)]
struct DetailResponse {
    id: u64,
    imdb_id: Option<String>,
    title: String,
    original_title: Option<String>,
    original_language: Option<String>,
    tagline: Option<String>,
    overview: Option<String>,
    status: Option<String>,
    release_date: Option<String>,
    runtime: Option<u32>,
    #[serde(default)]
    genres: Vec<Genre>,
    budget: Option<u64>,
    revenue: Option<u64>,
    homepage: Option<String>,
    popularity: Option<f64>,
    vote_average: Option<f64>,
    vote_count: Option<u32>,
    poster_path: Option<String>,
    backdrop_path: Option<String>,
    belongs_to_collection: Option<Collection>,
    #[serde(default)]
    production_companies: Vec<ProductionCompanyRaw>,
    #[serde(default)]
    production_countries: Vec<ProductionCountry>,
    #[serde(default)]
    spoken_languages: Vec<SpokenLanguage>,
    #[serde(default)]
    origin_country: Vec<String>,
    #[serde(default)]
    adult: bool,
    #[serde(default)]
    video: bool,
}

impl DetailResponse {
    fn into_detail(self) -> MovieDetail {
        MovieDetail {
            id: self.id,
            imdb_id: non_empty(self.imdb_id),
            original_title: self.original_title.unwrap_or_else(|| self.title.clone()),
            title: self.title,
            original_language: self.original_language.unwrap_or_default(),
            tagline: non_empty(self.tagline),
            overview: self.overview.unwrap_or_default(),
            status: self.status.unwrap_or_default(),
            release_date: non_empty(self.release_date),
            // TMDB reports unknown runtimes as 0
            runtime: self.runtime.filter(|r| *r > 0),
            genres: self.genres,
            budget: self.budget.unwrap_or(0),
            revenue: self.revenue.unwrap_or(0),
            homepage: non_empty(self.homepage),
            popularity: self.popularity.unwrap_or(0.0),
            vote_average: self.vote_average.unwrap_or(0.0),
            vote_count: self.vote_count.unwrap_or(0),
            poster_path: self.poster_path,
            backdrop_path: self.backdrop_path,
            belongs_to_collection: self.belongs_to_collection,
            production_companies: self
                .production_companies
                .into_iter()
                .map(ProductionCompanyRaw::into_company)
                .collect(),
            production_countries: self.production_countries,
            spoken_languages: self.spoken_languages,
            origin_country: self.origin_country,
            adult: self.adult,
            video: self.video,
        }
    }
}

#[derive(Debug, Deserialize)]
struct ProductionCompanyRaw {
    id: u64,
    name: String,
    logo_path: Option<String>,
    origin_country: Option<String>,
}

impl ProductionCompanyRaw {
    fn into_company(self) -> ProductionCompany {
        ProductionCompany {
            id: self.id,
            name: self.name,
            logo_path: self.logo_path,
            origin_country: self.origin_country.unwrap_or_default(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct CreditsResponse {
    id: u64,
    #[serde(default)]
    cast: Vec<CastRaw>,
    #[serde(default)]
    crew: Vec<CrewRaw>,
}

impl CreditsResponse {
    fn into_credits(self) -> Credits {
        let mut cast: Vec<CastMember> = self.cast.into_iter().map(CastRaw::into_member).collect();
        cast.sort_by_key(|c| c.order);
        Credits {
            id: self.id,
            cast,
            crew: self.crew.into_iter().map(CrewRaw::into_member).collect(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct CastRaw {
    id: u64,
    name: String,
    original_name: Option<String>,
    character: Option<String>,
    credit_id: Option<String>,
    order: Option<u32>,
    popularity: Option<f64>,
    profile_path: Option<String>,
    known_for_department: Option<String>,
}

impl CastRaw {
    fn into_member(self) -> CastMember {
        CastMember {
            id: self.id,
            original_name: self.original_name.unwrap_or_else(|| self.name.clone()),
            name: self.name,
            character: self.character.unwrap_or_default(),
            credit_id: self.credit_id.unwrap_or_default(),
            order: self.order.unwrap_or(u32::MAX),
            popularity: self.popularity.unwrap_or(0.0),
            profile_path: self.profile_path,
            known_for_department: self.known_for_department,
        }
    }
}

#[derive(Debug, Deserialize)]
struct CrewRaw {
    id: u64,
    name: String,
    original_name: Option<String>,
    department: Option<String>,
    job: Option<String>,
    credit_id: Option<String>,
    popularity: Option<f64>,
    profile_path: Option<String>,
}

impl CrewRaw {
    fn into_member(self) -> CrewMember {
        CrewMember {
            id: self.id,
            original_name: self.original_name.unwrap_or_else(|| self.name.clone()),
            name: self.name,
            department: self.department.unwrap_or_default(),
            job: self.job.unwrap_or_default(),
            credit_id: self.credit_id.unwrap_or_default(),
            popularity: self.popularity.unwrap_or(0.0),
            profile_path: self.profile_path,
        }
    }
}

#[derive(Debug, Deserialize)]
struct AccountResponse {
    id: u64,
    username: String,
    name: Option<String>,
    iso_639_1: Option<String>,
    iso_3166_1: Option<String>,
    #[serde(default)]
    include_adult: bool,
}

impl AccountResponse {
    fn into_account(self) -> Account {
        Account {
            id: self.id,
            username: self.username,
            name: self.name.unwrap_or_default(),
            iso_639_1: self.iso_639_1.unwrap_or_default(),
            iso_3166_1: self.iso_3166_1.unwrap_or_default(),
            include_adult: self.include_adult,
        }
    }
}

/// TMDB sends "" for unknown strings; treat it as absent
fn non_empty(s: Option<String>) -> Option<String> {
    s.filter(|v| !v.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_auth_selection() {
        assert_eq!(
            Auth::from_credential("abc123".into()),
            Auth::ApiKey("abc123".into())
        );
        let token = "x".repeat(BEARER_MIN_LEN);
        assert_eq!(Auth::from_credential(token.clone()), Auth::Bearer(token));
    }

    #[test]
    fn test_movie_raw_normalizes_empty_date() {
        let raw: MovieRaw = serde_json::from_str(
            r#"{"id": 7, "title": "Untitled", "release_date": "", "vote_average": 0}"#,
        )
        .unwrap();
        let movie = raw.into_movie();
        assert_eq!(movie.release_date, None);
        assert_eq!(movie.original_title, "Untitled");
        assert_eq!(movie.vote_count, 0);
    }

    #[test]
    fn test_credits_sorted_by_order() {
        let raw: CreditsResponse = serde_json::from_str(
            r#"{"id": 1, "cast": [
                {"id": 2, "name": "B", "order": 1},
                {"id": 1, "name": "A", "order": 0}
            ], "crew": []}"#,
        )
        .unwrap();
        let credits = raw.into_credits();
        assert_eq!(credits.cast[0].name, "A");
        assert_eq!(credits.cast[1].name, "B");
    }

    #[test]
    fn test_detail_zero_runtime_is_unknown() {
        let raw: DetailResponse =
            serde_json::from_str(r#"{"id": 5, "title": "T", "runtime": 0}"#).unwrap();
        assert_eq!(raw.into_detail().runtime, None);
    }
}
