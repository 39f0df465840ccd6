//! Query resolution for movie listings
//!
//! Maps a (category, sort, search) combination onto one TMDB request:
//! - no sort, no search: the fixed `/movie/{category}` endpoint
//! - sort only: `/discover/movie` with a server-side `sort_by` and the
//!   category expressed as a release-date window
//! - search (with or without sort): `/search/movie`, with sorting and the
//!   category window applied client-side to the returned page

use chrono::{Duration, NaiveDate};
use serde::Serialize;
use std::cmp::Ordering;

use crate::models::{Category, Movie, SortBy};

/// TMDB release types counted as "in theaters" (limited, theatrical)
const THEATRICAL_RELEASE_TYPES: &str = "2|3";

/// A listing request as the user expresses it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MovieQuery {
    pub category: Category,
    pub sort: Option<SortBy>,
    pub search: Option<String>,
    pub page: u32,
    pub language: String,
}

impl Default for MovieQuery {
    fn default() -> Self {
        Self {
            category: Category::default(),
            sort: None,
            search: None,
            page: 1,
            language: "en-US".to_string(),
        }
    }
}

impl MovieQuery {
    pub fn new(category: Category) -> Self {
        Self {
            category,
            ..Self::default()
        }
    }

    pub fn sort(mut self, sort: Option<SortBy>) -> Self {
        self.sort = sort;
        self
    }

    pub fn search(mut self, text: impl Into<String>) -> Self {
        self.search = Some(text.into());
        self
    }

    pub fn page(mut self, page: u32) -> Self {
        self.page = page;
        self
    }

    pub fn language(mut self, language: impl Into<String>) -> Self {
        self.language = language.into();
        self
    }

    /// Trimmed search text, `None` when blank
    pub fn search_text(&self) -> Option<&str> {
        self.search
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }
}

/// Tunables for resolution
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolverOptions {
    /// Days back from today that still count as "now playing"
    pub now_playing_days: u32,
    /// Days ahead of today that count as "upcoming"
    pub upcoming_days: u32,
    /// Minimum vote count when sorting by rating on discover
    pub min_votes_for_rating: u32,
    /// ISO 3166-1 region for release dates
    pub region: Option<String>,
}

impl Default for ResolverOptions {
    fn default() -> Self {
        Self {
            now_playing_days: 30,
            upcoming_days: 30,
            min_votes_for_rating: 200,
            region: None,
        }
    }
}

/// Inclusive release-date range
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DateWindow {
    pub from: NaiveDate,
    pub to: NaiveDate,
}

impl DateWindow {
    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.from && date <= self.to
    }
}

/// Which TMDB endpoint a plan targets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "category", rename_all = "snake_case")]
pub enum Endpoint {
    Category(Category),
    Discover,
    Search,
}

impl Endpoint {
    pub fn path(&self) -> String {
        match self {
            Endpoint::Category(c) => format!("/movie/{}", c.as_str()),
            Endpoint::Discover => "/discover/movie".to_string(),
            Endpoint::Search => "/search/movie".to_string(),
        }
    }
}

/// Sort applied locally after the response arrives
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ClientSort {
    By(SortBy),
    Popularity,
}

/// Fully resolved request plus any client-side post-processing
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QueryPlan {
    pub endpoint: Endpoint,
    pub params: Vec<(String, String)>,
    pub client_sort: Option<ClientSort>,
    pub client_window: Option<DateWindow>,
}

impl QueryPlan {
    /// Request path with a percent-encoded query string
    pub fn path_and_query(&self) -> String {
        let query = encode_params(&self.params);
        if query.is_empty() {
            self.endpoint.path()
        } else {
            format!("{}?{}", self.endpoint.path(), query)
        }
    }

    pub fn param(&self, key: &str) -> Option<&str> {
        self.params
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Apply the client-side window filter and sort to a page of results
    pub fn post_process(&self, movies: &mut Vec<Movie>) {
        if let Some(window) = self.client_window {
            movies.retain(|m| m.release_date().map(|d| window.contains(d)).unwrap_or(false));
        }
        match self.client_sort {
            Some(ClientSort::By(sort)) => sort_movies(movies, sort),
            Some(ClientSort::Popularity) => movies.sort_by(|a, b| {
                b.popularity
                    .partial_cmp(&a.popularity)
                    .unwrap_or(Ordering::Equal)
            }),
            None => {}
        }
    }
}

/// Encode `key=value` pairs joined by `&`
pub fn encode_params(params: &[(String, String)]) -> String {
    params
        .iter()
        .map(|(k, v)| format!("{}={}", urlencoding::encode(k), urlencoding::encode(v)))
        .collect::<Vec<_>>()
        .join("&")
}

/// Release-date window for a time-bound category
pub fn date_window(
    category: Category,
    today: NaiveDate,
    options: &ResolverOptions,
) -> Option<DateWindow> {
    match category {
        Category::NowPlaying => Some(DateWindow {
            from: days_before(today, options.now_playing_days),
            to: today,
        }),
        Category::Upcoming => Some(DateWindow {
            from: days_after(today, 1),
            to: days_after(today, options.upcoming_days),
        }),
        Category::Popular => None,
    }
}

// Saturate at the calendar bounds instead of panicking
fn days_before(date: NaiveDate, days: u32) -> NaiveDate {
    date.checked_sub_signed(Duration::days(i64::from(days)))
        .unwrap_or(NaiveDate::MIN)
}

fn days_after(date: NaiveDate, days: u32) -> NaiveDate {
    date.checked_add_signed(Duration::days(i64::from(days)))
        .unwrap_or(NaiveDate::MAX)
}

/// Decide endpoint, parameters and client-side processing for a query
pub fn resolve(query: &MovieQuery, today: NaiveDate, options: &ResolverOptions) -> QueryPlan {
    let page = query.page.max(1);
    let mut params = vec![
        ("page".to_string(), page.to_string()),
        ("language".to_string(), query.language.clone()),
    ];

    if let Some(text) = query.search_text() {
        params.insert(0, ("query".to_string(), text.to_string()));
        let client_sort = match (query.sort, query.category) {
            (Some(sort), _) => Some(ClientSort::By(sort)),
            (None, Category::Popular) => Some(ClientSort::Popularity),
            (None, _) => None,
        };
        return QueryPlan {
            endpoint: Endpoint::Search,
            params,
            client_sort,
            client_window: date_window(query.category, today, options),
        };
    }

    if let Some(region) = &options.region {
        params.push(("region".to_string(), region.clone()));
    }

    let Some(sort) = query.sort else {
        return QueryPlan {
            endpoint: Endpoint::Category(query.category),
            params,
            client_sort: None,
            client_window: None,
        };
    };

    params.push(("sort_by".to_string(), sort.api_value().to_string()));
    if let Some(window) = date_window(query.category, today, options) {
        params.push((
            "primary_release_date.gte".to_string(),
            window.from.format("%Y-%m-%d").to_string(),
        ));
        params.push((
            "primary_release_date.lte".to_string(),
            window.to.format("%Y-%m-%d").to_string(),
        ));
        params.push((
            "with_release_type".to_string(),
            THEATRICAL_RELEASE_TYPES.to_string(),
        ));
    }
    if sort == SortBy::Rating {
        params.push((
            "vote_count.gte".to_string(),
            options.min_votes_for_rating.to_string(),
        ));
    }

    QueryPlan {
        endpoint: Endpoint::Discover,
        params,
        client_sort: None,
        client_window: None,
    }
}

/// Stable in-place sort matching the server-side orders
pub fn sort_movies(movies: &mut [Movie], sort: SortBy) {
    match sort {
        SortBy::Alphabetical => {
            movies.sort_by_cached_key(|m| m.title.to_lowercase());
        }
        SortBy::Rating => movies.sort_by(|a, b| {
            b.vote_average
                .partial_cmp(&a.vote_average)
                .unwrap_or(Ordering::Equal)
                .then_with(|| b.vote_count.cmp(&a.vote_count))
        }),
        // Newest first, undated last
        SortBy::ReleaseDate => movies.sort_by(|a, b| match (a.release_date(), b.release_date()) {
            (Some(x), Some(y)) => y.cmp(&x),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        }),
    }
}
