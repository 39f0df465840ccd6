//! Integration tests for cinedex
//!
//! Tests are organized by component:
//! - tmdb_test: TMDB API client tests
//! - query_test: Query resolution and client-side sorting
//! - store_test: Watchlist and home filter persistence
//! - cli_test: Argument parsing and command handlers
//! - e2e_test: End-to-end flow tests (Browse -> Paginate -> Detail -> Watchlist)

// Note: Each test file is a separate integration test crate
// Tests are run individually by cargo, not via mod.rs
