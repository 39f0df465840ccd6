//! Query resolver tests
//!
//! Covers endpoint selection, release-date windows, server-side vs
//! client-side sorting, and resolved plans executed against a mock TMDB.

use chrono::NaiveDate;
use cinedex::api::TmdbClient;
use cinedex::config::Config;
use cinedex::models::{Category, Movie, SortBy};
use cinedex::query::{
    resolve, sort_movies, ClientSort, DateWindow, Endpoint, MovieQuery, ResolverOptions,
};
use mockito::{Matcher, Server};

fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 3, 15).unwrap()
}

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn movie(id: u64, title: &str, release: Option<&str>, rating: f64, votes: u32) -> Movie {
    Movie {
        id,
        title: title.to_string(),
        original_title: title.to_string(),
        original_language: "en".into(),
        overview: String::new(),
        release_date: release.map(String::from),
        poster_path: None,
        backdrop_path: None,
        genre_ids: Vec::new(),
        popularity: id as f64,
        vote_average: rating,
        vote_count: votes,
        adult: false,
        video: false,
    }
}

fn ids(movies: &[Movie]) -> Vec<u64> {
    movies.iter().map(|m| m.id).collect()
}

// =============================================================================
// Endpoint Selection
// =============================================================================

#[test]
fn test_plain_category_uses_fixed_endpoint() {
    for category in Category::ALL {
        let plan = resolve(&MovieQuery::new(category), today(), &ResolverOptions::default());
        assert_eq!(plan.endpoint, Endpoint::Category(category));
        assert_eq!(plan.param("page"), Some("1"));
        assert_eq!(plan.param("language"), Some("en-US"));
        assert_eq!(plan.param("sort_by"), None);
        assert!(plan.client_sort.is_none());
        assert!(plan.client_window.is_none());
    }
    let plan = resolve(
        &MovieQuery::new(Category::Upcoming),
        today(),
        &ResolverOptions::default(),
    );
    assert_eq!(plan.path_and_query(), "/movie/upcoming?page=1&language=en-US");
}

#[test]
fn test_region_added_to_listing_requests() {
    let options = ResolverOptions {
        region: Some("GB".into()),
        ..ResolverOptions::default()
    };
    let plan = resolve(&MovieQuery::new(Category::NowPlaying), today(), &options);
    assert_eq!(plan.param("region"), Some("GB"));

    let search = resolve(
        &MovieQuery::new(Category::NowPlaying).search("heat"),
        today(),
        &options,
    );
    assert_eq!(search.param("region"), None);
}

#[test]
fn test_sort_switches_to_discover() {
    let query = MovieQuery::new(Category::Popular).sort(Some(SortBy::Alphabetical));
    let plan = resolve(&query, today(), &ResolverOptions::default());
    assert_eq!(plan.endpoint, Endpoint::Discover);
    assert_eq!(plan.param("sort_by"), Some("title.asc"));
    assert_eq!(plan.param("primary_release_date.gte"), None);
    assert_eq!(plan.param("vote_count.gte"), None);
    assert!(plan.client_sort.is_none());
}

#[test]
fn test_sort_values() {
    let cases = [
        (SortBy::Alphabetical, "title.asc"),
        (SortBy::Rating, "vote_average.desc"),
        (SortBy::ReleaseDate, "primary_release_date.desc"),
    ];
    for (sort, expected) in cases {
        let plan = resolve(
            &MovieQuery::new(Category::Popular).sort(Some(sort)),
            today(),
            &ResolverOptions::default(),
        );
        assert_eq!(plan.param("sort_by"), Some(expected));
    }
}

#[test]
fn test_now_playing_discover_window() {
    let query = MovieQuery::new(Category::NowPlaying).sort(Some(SortBy::ReleaseDate));
    let plan = resolve(&query, today(), &ResolverOptions::default());
    assert_eq!(plan.endpoint, Endpoint::Discover);
    assert_eq!(plan.param("primary_release_date.gte"), Some("2026-02-13"));
    assert_eq!(plan.param("primary_release_date.lte"), Some("2026-03-15"));
    assert_eq!(plan.param("with_release_type"), Some("2|3"));
}

#[test]
fn test_upcoming_discover_window() {
    let options = ResolverOptions {
        upcoming_days: 60,
        ..ResolverOptions::default()
    };
    let query = MovieQuery::new(Category::Upcoming).sort(Some(SortBy::Alphabetical));
    let plan = resolve(&query, today(), &options);
    assert_eq!(plan.param("primary_release_date.gte"), Some("2026-03-16"));
    assert_eq!(plan.param("primary_release_date.lte"), Some("2026-05-14"));
}

#[test]
fn test_rating_sort_requires_votes() {
    let options = ResolverOptions {
        min_votes_for_rating: 50,
        ..ResolverOptions::default()
    };
    let query = MovieQuery::new(Category::Upcoming).sort(Some(SortBy::Rating));
    let plan = resolve(&query, today(), &options);
    assert_eq!(plan.param("vote_count.gte"), Some("50"));
}

#[test]
fn test_window_crosses_year_boundary() {
    let query = MovieQuery::new(Category::NowPlaying).sort(Some(SortBy::Rating));
    let plan = resolve(&query, date(2026, 1, 10), &ResolverOptions::default());
    assert_eq!(plan.param("primary_release_date.gte"), Some("2025-12-11"));
    assert_eq!(plan.param("primary_release_date.lte"), Some("2026-01-10"));
}

#[test]
fn test_oversized_window_resolves_without_panic() {
    let options = ResolverOptions {
        now_playing_days: u32::MAX,
        ..ResolverOptions::default()
    };
    let query = MovieQuery::new(Category::NowPlaying).sort(Some(SortBy::Rating));
    let plan = resolve(&query, today(), &options);
    assert_eq!(
        plan.param("primary_release_date.gte"),
        Some(NaiveDate::MIN.format("%Y-%m-%d").to_string().as_str())
    );
    assert_eq!(plan.param("primary_release_date.lte"), Some("2026-03-15"));
}

#[test]
fn test_config_rejects_unusable_windows() {
    assert!(Config::from_toml("now_playing_days = 9223372036854775807").is_err());
    assert!(Config::from_toml("upcoming_days = -5").is_err());

    let config = Config::from_toml("upcoming_days = 45").unwrap();
    let query = MovieQuery::new(Category::Upcoming).sort(Some(SortBy::Alphabetical));
    let plan = resolve(&query, today(), &config.resolver_options());
    assert_eq!(plan.param("primary_release_date.gte"), Some("2026-03-16"));
    assert_eq!(plan.param("primary_release_date.lte"), Some("2026-04-29"));
}

#[test]
fn test_search_sorts_client_side() {
    let query = MovieQuery::new(Category::NowPlaying)
        .sort(Some(SortBy::Rating))
        .search("  alien ");
    let plan = resolve(&query, today(), &ResolverOptions::default());
    assert_eq!(plan.endpoint, Endpoint::Search);
    assert_eq!(plan.param("query"), Some("alien"));
    assert_eq!(plan.param("sort_by"), None);
    assert_eq!(plan.client_sort, Some(ClientSort::By(SortBy::Rating)));
    assert_eq!(
        plan.client_window,
        Some(DateWindow {
            from: date(2026, 2, 13),
            to: today(),
        })
    );
}

#[test]
fn test_search_popular_defaults_to_popularity() {
    let query = MovieQuery::new(Category::Popular).search("alien");
    let plan = resolve(&query, today(), &ResolverOptions::default());
    assert_eq!(plan.client_sort, Some(ClientSort::Popularity));
    assert!(plan.client_window.is_none());
}

#[test]
fn test_search_time_bound_keeps_relevance_order() {
    let query = MovieQuery::new(Category::Upcoming).search("alien");
    let plan = resolve(&query, today(), &ResolverOptions::default());
    assert!(plan.client_sort.is_none());
    assert!(plan.client_window.is_some());
}

#[test]
fn test_blank_search_is_ignored() {
    let query = MovieQuery::new(Category::Popular).search("   ");
    let plan = resolve(&query, today(), &ResolverOptions::default());
    assert_eq!(plan.endpoint, Endpoint::Category(Category::Popular));
}

// =============================================================================
// Client-side Sorting
// =============================================================================

#[test]
fn test_sort_alphabetical_case_insensitive() {
    let mut movies = vec![
        movie(1, "zodiac", None, 0.0, 0),
        movie(2, "Alien", None, 0.0, 0),
        movie(3, "batman", None, 0.0, 0),
    ];
    sort_movies(&mut movies, SortBy::Alphabetical);
    assert_eq!(ids(&movies), vec![2, 3, 1]);
}

#[test]
fn test_sort_rating_breaks_ties_by_votes() {
    let mut movies = vec![
        movie(1, "A", None, 7.0, 10),
        movie(2, "B", None, 8.5, 5),
        movie(3, "C", None, 7.0, 900),
    ];
    sort_movies(&mut movies, SortBy::Rating);
    assert_eq!(ids(&movies), vec![2, 3, 1]);
}

#[test]
fn test_sort_release_date_undated_last() {
    let mut movies = vec![
        movie(1, "A", None, 0.0, 0),
        movie(2, "B", Some("2020-05-01"), 0.0, 0),
        movie(3, "C", Some("2024-01-01"), 0.0, 0),
        movie(4, "D", Some("not a date"), 0.0, 0),
    ];
    sort_movies(&mut movies, SortBy::ReleaseDate);
    assert_eq!(ids(&movies), vec![3, 2, 1, 4]);
}

// =============================================================================
// Executed Plans
// =============================================================================

const SEARCH_RESULTS: &str = r#"{
    "page": 1,
    "total_pages": 1,
    "total_results": 4,
    "results": [
        {"id": 1, "title": "Alien: Earth Rising", "release_date": "2026-03-20", "vote_average": 6.1, "vote_count": 10, "popularity": 5.0},
        {"id": 2, "title": "Alien Romulus", "release_date": "2026-03-01", "vote_average": 7.2, "vote_count": 900, "popularity": 50.0},
        {"id": 3, "title": "Aliens", "release_date": "1986-07-18", "vote_average": 7.9, "vote_count": 9000, "popularity": 30.0},
        {"id": 4, "title": "Alien Nation", "release_date": "2026-03-10", "vote_average": 8.0, "vote_count": 3, "popularity": 1.0}
    ]
}"#;

#[tokio::test]
async fn test_search_with_sort_filters_and_sorts_locally() {
    let mut server = Server::new_async().await;

    let mock = server
        .mock("GET", "/search/movie")
        .match_query(Matcher::AllOf(vec![
            Matcher::UrlEncoded("query".into(), "alien".into()),
            Matcher::UrlEncoded("page".into(), "1".into()),
        ]))
        .with_status(200)
        .with_body(SEARCH_RESULTS)
        .create_async()
        .await;

    let client = TmdbClient::with_base_url("test_key", server.url());
    let query = MovieQuery::new(Category::NowPlaying)
        .sort(Some(SortBy::Rating))
        .search("alien");
    let page = client
        .movies(&query, today(), &ResolverOptions::default())
        .await
        .unwrap();

    mock.assert_async().await;

    // Only releases within the last 30 days remain, highest rated first
    assert_eq!(ids(&page.results), vec![4, 2]);
}

#[tokio::test]
async fn test_search_upcoming_keeps_future_releases() {
    let mut server = Server::new_async().await;

    let mock = server
        .mock("GET", "/search/movie")
        .match_query(Matcher::Any)
        .with_status(200)
        .with_body(SEARCH_RESULTS)
        .create_async()
        .await;

    let client = TmdbClient::with_base_url("test_key", server.url());
    let query = MovieQuery::new(Category::Upcoming).search("alien");
    let page = client
        .movies(&query, today(), &ResolverOptions::default())
        .await
        .unwrap();

    mock.assert_async().await;
    assert_eq!(ids(&page.results), vec![1]);
}

#[tokio::test]
async fn test_sorted_category_hits_discover() {
    let mut server = Server::new_async().await;

    let mock = server
        .mock("GET", "/discover/movie")
        .match_query(Matcher::AllOf(vec![
            Matcher::UrlEncoded("sort_by".into(), "primary_release_date.desc".into()),
            Matcher::UrlEncoded("primary_release_date.gte".into(), "2026-03-16".into()),
            Matcher::UrlEncoded("primary_release_date.lte".into(), "2026-04-14".into()),
            Matcher::UrlEncoded("page".into(), "2".into()),
        ]))
        .with_status(200)
        .with_body(SEARCH_RESULTS)
        .create_async()
        .await;

    let client = TmdbClient::with_base_url("test_key", server.url());
    let query = MovieQuery::new(Category::Upcoming)
        .sort(Some(SortBy::ReleaseDate))
        .page(2);
    let page = client
        .movies(&query, today(), &ResolverOptions::default())
        .await
        .unwrap();

    mock.assert_async().await;
    // Server order is trusted for discover results
    assert_eq!(ids(&page.results), vec![1, 2, 3, 4]);
}
