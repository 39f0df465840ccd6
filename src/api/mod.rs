//! API clients for external services
//!
//! - TMDB: movie listings, search, discovery and detail metadata

pub mod tmdb;

pub use tmdb::{TmdbClient, TmdbError};
