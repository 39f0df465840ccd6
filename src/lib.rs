//! cinedex - Scriptable movie browser for The Movie Database
//!
//! Lists movies by category, searches and sorts them, shows detail pages
//! with cast, crew and recommendations, and keeps a local watchlist.
//!
//! # Modules
//!
//! - `models` - Movies, pages, credits and preference types
//! - `query` - Maps category/sort/search onto a TMDB request plan
//! - `api` - TMDB HTTP client
//! - `feed` - Paginated listing state
//! - `detail` - Movie detail page assembly
//! - `store` - Local watchlist and filter persistence
//! - `config` - Config file and credential resolution
//! - `cli` / `commands` - Command line surface

pub mod api;
pub mod cli;
pub mod commands;
pub mod config;
pub mod detail;
pub mod feed;
pub mod models;
pub mod query;
pub mod store;

// Re-export commonly used types
pub use models::{
    Account, CastMember, Category, Credits, CrewMember, HomeFilters, Movie, MovieDetail,
    MoviePage, SortBy,
};

pub use api::{TmdbClient, TmdbError};
pub use config::Config;
pub use detail::{DetailOptions, MovieDetailPage};
pub use feed::{LoadingState, MovieFeed};
pub use query::{MovieQuery, QueryPlan, ResolverOptions};
pub use store::{Store, StoreError};
