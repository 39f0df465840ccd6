//! Local store tests
//!
//! Watchlist membership and ordering, home filter persistence, and
//! recovery from damaged store files.

use cinedex::models::{Category, HomeFilters, Movie, SortBy};
use cinedex::store::{Store, StoreError, HOME_FILTERS_KEY, WATCHLIST_KEY};
use tempfile::TempDir;

fn temp_store() -> (TempDir, Store) {
    let dir = tempfile::tempdir().unwrap();
    let store = Store::open(dir.path().join("cinedex").join("store.json"));
    (dir, store)
}

fn movie(id: u64, title: &str) -> Movie {
    Movie {
        id,
        title: title.to_string(),
        original_title: title.to_string(),
        original_language: "en".into(),
        overview: format!("{} overview", title),
        release_date: Some("2025-12-17".into()),
        poster_path: Some(format!("/{}.jpg", id)),
        backdrop_path: None,
        genre_ids: vec![878, 12],
        popularity: 10.0,
        vote_average: 7.1,
        vote_count: 300,
        adult: false,
        video: false,
    }
}

fn ids(movies: &[Movie]) -> Vec<u64> {
    movies.iter().map(|m| m.id).collect()
}

// =============================================================================
// Watchlist
// =============================================================================

#[test]
fn test_watchlist_keeps_insertion_order() {
    let (_dir, store) = temp_store();

    assert!(store.add_to_watchlist(&movie(3, "Heat")).unwrap());
    assert!(store.add_to_watchlist(&movie(1, "Alien")).unwrap());
    assert!(store.add_to_watchlist(&movie(2, "Ronin")).unwrap());

    assert_eq!(ids(&store.watchlist().unwrap()), vec![3, 1, 2]);
}

#[test]
fn test_watchlist_rejects_duplicate_ids() {
    let (_dir, store) = temp_store();

    assert!(store.add_to_watchlist(&movie(1, "Alien")).unwrap());
    assert!(!store.add_to_watchlist(&movie(1, "Alien (Director's Cut)")).unwrap());

    let list = store.watchlist().unwrap();
    assert_eq!(list.len(), 1);
    assert_eq!(list[0].title, "Alien");
}

#[test]
fn test_watchlist_remove() {
    let (_dir, store) = temp_store();
    store.add_to_watchlist(&movie(1, "Alien")).unwrap();
    store.add_to_watchlist(&movie(2, "Ronin")).unwrap();

    assert!(store.remove_from_watchlist(1).unwrap());
    assert!(!store.remove_from_watchlist(1).unwrap());
    assert!(!store.is_in_watchlist(1).unwrap());
    assert!(store.is_in_watchlist(2).unwrap());
}

#[test]
fn test_watchlist_toggle() {
    let (_dir, store) = temp_store();
    let heat = movie(949, "Heat");

    assert!(store.toggle_watchlist(&heat).unwrap());
    assert!(store.is_in_watchlist(949).unwrap());

    assert!(!store.toggle_watchlist(&heat).unwrap());
    assert!(store.watchlist().unwrap().is_empty());
}

#[test]
fn test_watchlist_round_trips_movie_fields() {
    let (_dir, store) = temp_store();
    let alien = movie(348, "Alien");
    store.add_to_watchlist(&alien).unwrap();

    // A fresh handle reads what the first one wrote
    let reopened = Store::open(store.path());
    assert_eq!(reopened.watchlist().unwrap(), vec![alien]);
}

#[test]
fn test_watchlist_persisted_as_json_array() {
    let (_dir, store) = temp_store();
    store.add_to_watchlist(&movie(1, "Alien")).unwrap();

    let text = std::fs::read_to_string(store.path()).unwrap();
    let doc: serde_json::Value = serde_json::from_str(&text).unwrap();
    let list = doc[WATCHLIST_KEY].as_array().unwrap();
    assert_eq!(list.len(), 1);
    assert_eq!(list[0]["id"], 1);
    assert_eq!(list[0]["title"], "Alien");
}

#[test]
fn test_undecodable_watchlist_reads_empty() {
    let (_dir, store) = temp_store();
    store.set(WATCHLIST_KEY, &"not a list").unwrap();

    assert!(store.watchlist().unwrap().is_empty());

    // Adding replaces the bad value
    assert!(store.add_to_watchlist(&movie(1, "Alien")).unwrap());
    assert_eq!(ids(&store.watchlist().unwrap()), vec![1]);
}

// =============================================================================
// Home Filters
// =============================================================================

#[test]
fn test_home_filters_default_when_unset() {
    let (_dir, store) = temp_store();
    let filters = store.home_filters().unwrap();
    assert_eq!(filters.category, Category::NowPlaying);
    assert!(filters.sort.is_none());
    assert!(filters.query.is_empty());
}

#[test]
fn test_home_filters_persist_and_reset() {
    let (_dir, store) = temp_store();
    let filters = HomeFilters {
        category: Category::Upcoming,
        sort: Some(SortBy::ReleaseDate),
        query: "dune".into(),
    };

    store.save_home_filters(&filters).unwrap();
    assert_eq!(store.home_filters().unwrap(), filters);

    assert!(store.reset_home_filters().unwrap());
    assert_eq!(store.home_filters().unwrap(), HomeFilters::default());
    assert!(!store.reset_home_filters().unwrap());
}

#[test]
fn test_filters_and_watchlist_share_one_file() {
    let (_dir, store) = temp_store();
    store.add_to_watchlist(&movie(1, "Alien")).unwrap();
    store
        .save_home_filters(&HomeFilters {
            category: Category::Popular,
            sort: Some(SortBy::Rating),
            query: String::new(),
        })
        .unwrap();

    assert_eq!(ids(&store.watchlist().unwrap()), vec![1]);
    assert_eq!(store.home_filters().unwrap().category, Category::Popular);

    let doc: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(store.path()).unwrap()).unwrap();
    assert!(doc.get(WATCHLIST_KEY).is_some());
    assert_eq!(doc[HOME_FILTERS_KEY]["sort"], "rating");
}

#[test]
fn test_partial_filters_fill_defaults() {
    let (_dir, store) = temp_store();
    std::fs::create_dir_all(store.path().parent().unwrap()).unwrap();
    std::fs::write(store.path(), r#"{"home_filters": {"category": "popular"}}"#).unwrap();

    let filters = store.home_filters().unwrap();
    assert_eq!(filters.category, Category::Popular);
    assert!(filters.sort.is_none());
    assert!(filters.query.is_empty());
}

// =============================================================================
// Damaged Files
// =============================================================================

#[test]
fn test_corrupt_file_reported_on_read() {
    let (_dir, store) = temp_store();
    std::fs::create_dir_all(store.path().parent().unwrap()).unwrap();
    std::fs::write(store.path(), "[1, 2, 3]").unwrap();

    assert!(matches!(store.watchlist(), Err(StoreError::Corrupt(_))));
}

#[test]
fn test_corrupt_file_replaced_on_write() {
    let (_dir, store) = temp_store();
    std::fs::create_dir_all(store.path().parent().unwrap()).unwrap();
    std::fs::write(store.path(), "{ not json").unwrap();

    store
        .save_home_filters(&HomeFilters {
            category: Category::Upcoming,
            ..HomeFilters::default()
        })
        .unwrap();

    assert_eq!(store.home_filters().unwrap().category, Category::Upcoming);
    assert!(store.watchlist().unwrap().is_empty());
}

#[test]
fn test_empty_file_is_empty_store() {
    let (_dir, store) = temp_store();
    std::fs::create_dir_all(store.path().parent().unwrap()).unwrap();
    std::fs::write(store.path(), "").unwrap();

    assert!(store.watchlist().unwrap().is_empty());
    assert!(store.add_to_watchlist(&movie(7, "Se7en")).unwrap());
}
