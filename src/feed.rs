//! Paginated movie listing state
//!
//! Tracks the movies loaded so far for one query, the page cursor and the
//! loading state, and supports infinite-scroll style `load_more`.

use anyhow::Result;
use chrono::NaiveDate;
use tracing::warn;

use crate::api::TmdbClient;
use crate::models::{HomeFilters, Movie};
use crate::query::{MovieQuery, ResolverOptions};

// =============================================================================
// Loading State
// =============================================================================

/// Loading state for async operations
#[derive(Debug, Clone, PartialEq, Default)]
pub enum LoadingState {
    /// Idle - no loading in progress
    #[default]
    Idle,
    /// First page (or refresh) in flight
    Loading,
    /// Next page in flight
    LoadingMore,
    /// Error with message
    Error(String),
}

impl LoadingState {
    pub fn is_loading(&self) -> bool {
        matches!(self, LoadingState::Loading | LoadingState::LoadingMore)
    }

    pub fn is_error(&self) -> bool {
        matches!(self, LoadingState::Error(_))
    }

    pub fn message(&self) -> Option<&str> {
        match self {
            LoadingState::Error(msg) => Some(msg),
            _ => None,
        }
    }
}

// =============================================================================
// Query <-> Filters
// =============================================================================

impl HomeFilters {
    /// Listing query for these filters, starting at page 1
    pub fn to_query(&self, language: &str) -> MovieQuery {
        let query = MovieQuery::new(self.category)
            .sort(self.sort)
            .language(language);
        if self.query.trim().is_empty() {
            query
        } else {
            query.search(self.query.trim())
        }
    }
}

impl From<&MovieQuery> for HomeFilters {
    fn from(query: &MovieQuery) -> Self {
        HomeFilters {
            category: query.category,
            sort: query.sort,
            query: query.search_text().unwrap_or_default().to_string(),
        }
    }
}

// =============================================================================
// Movie Feed
// =============================================================================

/// Accumulated results for one listing query
#[derive(Debug, Clone)]
pub struct MovieFeed {
    query: MovieQuery,
    options: ResolverOptions,
    pub movies: Vec<Movie>,
    pub current_page: u32,
    pub total_pages: u32,
    pub loading: LoadingState,
}

impl MovieFeed {
    pub fn new(query: MovieQuery, options: ResolverOptions) -> Self {
        Self {
            current_page: query.page.max(1),
            query,
            options,
            movies: Vec::new(),
            total_pages: 1,
            loading: LoadingState::Idle,
        }
    }

    pub fn query(&self) -> &MovieQuery {
        &self.query
    }

    pub fn has_more(&self) -> bool {
        self.current_page < self.total_pages
    }

    /// Fetch `page`, replacing current results
    pub async fn fetch(&mut self, client: &TmdbClient, page: u32, today: NaiveDate) -> Result<()> {
        self.load(client, page, false, today).await
    }

    /// Append the next page; no-op when exhausted or already loading
    pub async fn load_more(&mut self, client: &TmdbClient, today: NaiveDate) -> Result<bool> {
        if self.loading.is_loading() || !self.has_more() {
            return Ok(false);
        }
        self.load(client, self.current_page + 1, true, today).await?;
        Ok(true)
    }

    /// Restart from page 1
    pub async fn refresh(&mut self, client: &TmdbClient, today: NaiveDate) -> Result<()> {
        self.current_page = 1;
        self.load(client, 1, false, today).await
    }

    async fn load(
        &mut self,
        client: &TmdbClient,
        page: u32,
        append: bool,
        today: NaiveDate,
    ) -> Result<()> {
        self.loading = if append {
            LoadingState::LoadingMore
        } else {
            LoadingState::Loading
        };

        let query = self.query.clone().page(page);
        match client.movies(&query, today, &self.options).await {
            Ok(result) => {
                if append {
                    self.movies.extend(result.results);
                } else {
                    self.movies = result.results;
                }
                self.total_pages = result.total_pages;
                self.current_page = page;
                self.loading = LoadingState::Idle;
                Ok(())
            }
            Err(e) => {
                warn!(page, error = %e, "failed to fetch movies");
                self.loading = LoadingState::Error(e.to_string());
                Err(e)
            }
        }
    }
}
