//! Data structures and types for cinedex
//!
//! Contains all shared models used across the application organized by domain:
//! - **Listing**: categories, sort orders and paginated movie results
//! - **Detail**: full movie metadata, credits and crew summaries
//! - **Account**: the authenticated TMDB account
//! - **Preferences**: filters remembered between runs

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

// =============================================================================
// Listing Models
// =============================================================================

/// Movie listing category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    #[default]
    NowPlaying,
    Upcoming,
    Popular,
}

impl Category {
    pub const ALL: [Category; 3] = [Category::NowPlaying, Category::Upcoming, Category::Popular];

    /// Path segment used by the fixed `/movie/{category}` endpoints
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::NowPlaying => "now_playing",
            Category::Upcoming => "upcoming",
            Category::Popular => "popular",
        }
    }

    /// Whether the category is bounded by a release-date window
    pub fn is_time_bound(&self) -> bool {
        !matches!(self, Category::Popular)
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Category::NowPlaying => write!(f, "Now Playing"),
            Category::Upcoming => write!(f, "Upcoming"),
            Category::Popular => write!(f, "Popular"),
        }
    }
}

/// User-selectable sort order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortBy {
    Alphabetical,
    Rating,
    ReleaseDate,
}

impl SortBy {
    /// `sort_by` value understood by the discover endpoint
    pub fn api_value(&self) -> &'static str {
        match self {
            SortBy::Alphabetical => "title.asc",
            SortBy::Rating => "vote_average.desc",
            SortBy::ReleaseDate => "primary_release_date.desc",
        }
    }
}

impl fmt::Display for SortBy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SortBy::Alphabetical => write!(f, "By alphabetical order"),
            SortBy::Rating => write!(f, "By rating"),
            SortBy::ReleaseDate => write!(f, "By release date"),
        }
    }
}

/// Movie summary as returned by every TMDB listing endpoint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Movie {
    pub id: u64,
    pub title: String,
    pub original_title: String,
    pub original_language: String,
    pub overview: String,
    pub release_date: Option<String>,
    pub poster_path: Option<String>,
    pub backdrop_path: Option<String>,
    #[serde(default)]
    pub genre_ids: Vec<u32>,
    pub popularity: f64,
    pub vote_average: f64,
    pub vote_count: u32,
    #[serde(default)]
    pub adult: bool,
    #[serde(default)]
    pub video: bool,
}

impl Movie {
    /// Parsed release date, `None` when missing or malformed
    pub fn release_date(&self) -> Option<NaiveDate> {
        self.release_date.as_deref().and_then(parse_date)
    }

    pub fn year(&self) -> Option<i32> {
        use chrono::Datelike;
        self.release_date().map(|d| d.year())
    }
}

impl fmt::Display for Movie {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let year_str = self.year().map(|y| format!(" ({})", y)).unwrap_or_default();
        write!(f, "{}{} - ⭐ {:.1}", self.title, year_str, self.vote_average)
    }
}

impl From<&MovieDetail> for Movie {
    fn from(detail: &MovieDetail) -> Self {
        Movie {
            id: detail.id,
            title: detail.title.clone(),
            original_title: detail.original_title.clone(),
            original_language: detail.original_language.clone(),
            overview: detail.overview.clone(),
            release_date: detail.release_date.clone(),
            poster_path: detail.poster_path.clone(),
            backdrop_path: detail.backdrop_path.clone(),
            genre_ids: detail.genres.iter().map(|g| g.id).collect(),
            popularity: detail.popularity,
            vote_average: detail.vote_average,
            vote_count: detail.vote_count,
            adult: detail.adult,
            video: detail.video,
        }
    }
}

/// One page of a paginated listing
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MoviePage {
    pub page: u32,
    pub total_pages: u32,
    pub total_results: u32,
    pub results: Vec<Movie>,
}

impl MoviePage {
    pub fn has_more(&self) -> bool {
        self.page < self.total_pages
    }
}

// =============================================================================
// Detail Models
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Genre {
    pub id: u32,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Collection {
    pub id: u64,
    pub name: String,
    pub poster_path: Option<String>,
    pub backdrop_path: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductionCompany {
    pub id: u64,
    pub name: String,
    pub logo_path: Option<String>,
    pub origin_country: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductionCountry {
    pub iso_3166_1: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpokenLanguage {
    pub iso_639_1: String,
    pub english_name: String,
    pub name: String,
}

/// Detailed movie information from TMDB
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MovieDetail {
    pub id: u64,
    pub imdb_id: Option<String>,
    pub title: String,
    pub original_title: String,
    pub original_language: String,
    pub tagline: Option<String>,
    pub overview: String,
    pub status: String,
    pub release_date: Option<String>,
    pub runtime: Option<u32>,
    pub genres: Vec<Genre>,
    pub budget: u64,
    pub revenue: u64,
    pub homepage: Option<String>,
    pub popularity: f64,
    pub vote_average: f64,
    pub vote_count: u32,
    pub poster_path: Option<String>,
    pub backdrop_path: Option<String>,
    pub belongs_to_collection: Option<Collection>,
    pub production_companies: Vec<ProductionCompany>,
    pub production_countries: Vec<ProductionCountry>,
    pub spoken_languages: Vec<SpokenLanguage>,
    pub origin_country: Vec<String>,
    pub adult: bool,
    pub video: bool,
}

impl MovieDetail {
    /// User score as a percentage (0-100)
    pub fn user_score(&self) -> u8 {
        user_score(self.vote_average)
    }

    pub fn genre_names(&self) -> Vec<&str> {
        self.genres.iter().map(|g| g.name.as_str()).collect()
    }
}

impl fmt::Display for MovieDetail {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let released = self
            .release_date
            .as_deref()
            .and_then(format_release_date)
            .unwrap_or_else(|| "TBA".to_string());
        write!(
            f,
            "{} - {} - {} - {}%",
            self.title,
            released,
            self.runtime.map(format_runtime).unwrap_or_else(|| "?".into()),
            self.user_score()
        )
    }
}

/// Cast member from the credits endpoint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CastMember {
    pub id: u64,
    pub name: String,
    pub original_name: String,
    pub character: String,
    pub credit_id: String,
    pub order: u32,
    pub popularity: f64,
    pub profile_path: Option<String>,
    pub known_for_department: Option<String>,
}

/// Crew member from the credits endpoint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CrewMember {
    pub id: u64,
    pub name: String,
    pub original_name: String,
    pub department: String,
    pub job: String,
    pub credit_id: String,
    pub popularity: f64,
    pub profile_path: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Credits {
    pub id: u64,
    pub cast: Vec<CastMember>,
    pub crew: Vec<CrewMember>,
}

/// Crew member with every job they hold on a film
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CrewCredit {
    pub id: u64,
    pub name: String,
    pub roles: Vec<String>,
}

// =============================================================================
// Account Models
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Account {
    pub id: u64,
    pub username: String,
    pub name: String,
    pub iso_639_1: String,
    pub iso_3166_1: String,
    pub include_adult: bool,
}

// =============================================================================
// Preference Models
// =============================================================================

/// Home screen filters remembered between runs
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HomeFilters {
    #[serde(default)]
    pub category: Category,
    #[serde(default)]
    pub sort: Option<SortBy>,
    #[serde(default)]
    pub query: String,
}

impl HomeFilters {
    /// True when any filter differs from `applied` (enables a new search)
    pub fn differs_from(&self, applied: &HomeFilters) -> bool {
        self != applied
    }
}

// =============================================================================
// Formatting Helpers
// =============================================================================

/// Parse a TMDB `YYYY-MM-DD` date, tolerating empty strings
pub fn parse_date(s: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d").ok()
}

/// Format a release date like "Dec 17, 2025"
pub fn format_release_date(s: &str) -> Option<String> {
    parse_date(s).map(|d| d.format("%b %-d, %Y").to_string())
}

/// Format a runtime in minutes like "3h 17m"
pub fn format_runtime(minutes: u32) -> String {
    let hours = minutes / 60;
    let mins = minutes % 60;
    if hours == 0 {
        format!("{}m", mins)
    } else {
        format!("{}h {}m", hours, mins)
    }
}

/// Convert a 0-10 vote average into a 0-100 score
pub fn user_score(vote_average: f64) -> u8 {
    (vote_average * 10.0).round().clamp(0.0, 100.0) as u8
}

/// Full image URL for a poster/backdrop/profile path
pub fn poster_url(base: &str, size: &str, path: &str) -> String {
    format!("{}/{}{}", base.trim_end_matches('/'), size, path)
}
