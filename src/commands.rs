//! CLI Command Handlers
//!
//! Implements all CLI commands by calling the appropriate backend services.
//! Each handler takes CLI args, the loaded Config and Output, returns ExitCode.

use chrono::NaiveDate;
use serde::Serialize;
use tracing::{debug, warn};

use crate::api::{TmdbClient, TmdbError};
use crate::cli::{
    AccountCmd, CreditsCmd, DetailCmd, ExitCode, FiltersAction, FiltersCmd, MoviesCmd, Output,
    RecommendCmd, WatchlistAction, WatchlistCmd, WatchlistStatus,
};
use crate::config::Config;
use crate::detail::{filter_cast, CrewSummary, DetailOptions, MovieDetailPage};
use crate::feed::MovieFeed;
use crate::models::{poster_url, Category, HomeFilters, Movie, SortBy};
use crate::query::{self, QueryPlan};
use crate::store::Store;

// =============================================================================
// Shared Helpers
// =============================================================================

/// Map an API/store failure onto a semantic exit code
pub fn exit_code_for(err: &anyhow::Error) -> ExitCode {
    match err.downcast_ref::<TmdbError>() {
        Some(TmdbError::NotFound) => ExitCode::NotFound,
        Some(TmdbError::Unauthorized) => ExitCode::AuthError,
        Some(_) => ExitCode::NetworkError,
        None => ExitCode::Error,
    }
}

fn client(config: &Config, output: &Output) -> Result<TmdbClient, ExitCode> {
    TmdbClient::from_config(config).map_err(|e| output.error(e.to_string(), ExitCode::InvalidArgs))
}

fn store(config: &Config, output: &Output) -> Result<Store, ExitCode> {
    config
        .store_path()
        .map(Store::open)
        .ok_or_else(|| output.error("Could not determine store location", ExitCode::Error))
}

fn local_today() -> NaiveDate {
    chrono::Local::now().date_naive()
}

fn print_or_fail<T: Serialize>(output: &Output, data: T, lines: &[String]) -> ExitCode {
    match output.print_lines(data, lines) {
        Ok(()) => ExitCode::Success,
        Err(e) => output.error(format!("Failed to serialize: {}", e), ExitCode::Error),
    }
}

fn movie_lines(movies: &[Movie]) -> Vec<String> {
    movies.iter().map(|m| format!("{:>8}  {}", m.id, m)).collect()
}

// =============================================================================
// Movies Command
// =============================================================================

#[derive(Serialize)]
struct ExplainOutput {
    today: NaiveDate,
    filters: HomeFilters,
    request: String,
    plan: QueryPlan,
}

#[derive(Serialize)]
struct ListingOutput {
    category: Category,
    #[serde(skip_serializing_if = "Option::is_none")]
    sort: Option<SortBy>,
    #[serde(skip_serializing_if = "String::is_empty")]
    query: String,
    page: u32,
    total_pages: u32,
    results: Vec<Movie>,
}

pub async fn movies_cmd(cmd: MoviesCmd, config: &Config, output: &Output) -> ExitCode {
    let store = config.store_path().map(Store::open);

    let filters = if cmd.uses_saved_filters() {
        store
            .as_ref()
            .and_then(|s| match s.home_filters() {
                Ok(filters) => Some(filters),
                Err(e) => {
                    warn!(error = %e, "could not read saved filters");
                    None
                }
            })
            .unwrap_or_default()
    } else {
        HomeFilters {
            category: cmd.category.map(Into::into).unwrap_or_default(),
            sort: cmd.sort.map(Into::into),
            query: cmd.search.clone().unwrap_or_default().trim().to_string(),
        }
    };

    if cmd.save {
        match &store {
            Some(store) => {
                if let Err(e) = store.save_home_filters(&filters) {
                    return output.error(format!("Failed to save filters: {}", e), ExitCode::Error);
                }
                output.info("Filters saved");
            }
            None => return output.error("Could not determine store location", ExitCode::Error),
        }
    }

    let today = cmd.today.unwrap_or_else(local_today);
    let options = config.resolver_options();
    let query = filters.to_query(&config.language).page(cmd.page);
    let plan = query::resolve(&query, today, &options);
    debug!(request = %plan.path_and_query(), "resolved listing query");

    if cmd.explain {
        let request = plan.path_and_query();
        let lines = vec![request.clone()];
        let explain = ExplainOutput {
            today,
            filters,
            request,
            plan,
        };
        return print_or_fail(output, explain, &lines);
    }

    let client = match client(config, output) {
        Ok(client) => client,
        Err(code) => return code,
    };

    output.info(format!("Fetching {} movies...", filters.category));

    let mut feed = MovieFeed::new(query, options);
    if let Err(e) = feed.fetch(&client, cmd.page.max(1), today).await {
        return output.error(format!("Listing failed: {}", e), exit_code_for(&e));
    }
    for _ in 1..cmd.pages {
        match feed.load_more(&client, today).await {
            Ok(true) => {}
            Ok(false) => break,
            Err(e) => return output.error(format!("Listing failed: {}", e), exit_code_for(&e)),
        }
    }

    let mut results = feed.movies;
    if let Some(limit) = cmd.limit {
        results.truncate(limit);
    }

    let lines = movie_lines(&results);
    let listing = ListingOutput {
        category: filters.category,
        sort: filters.sort,
        query: filters.query,
        page: feed.current_page,
        total_pages: feed.total_pages,
        results,
    };
    print_or_fail(output, listing, &lines)
}

// =============================================================================
// Detail / Credits / Recommend Commands
// =============================================================================

#[derive(Serialize)]
struct DetailOutput {
    #[serde(flatten)]
    page: MovieDetailPage,
    crew: CrewSummary,
    user_score: u8,
    #[serde(skip_serializing_if = "Option::is_none")]
    poster_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    in_watchlist: Option<bool>,
}

pub async fn detail_cmd(cmd: DetailCmd, config: &Config, output: &Output) -> ExitCode {
    let client = match client(config, output) {
        Ok(client) => client,
        Err(code) => return code,
    };

    output.info(format!("Getting details for: {}", cmd.id));

    let options = DetailOptions {
        include_credits: !cmd.no_credits,
        include_recommended: !cmd.no_recommended,
    };
    let page = match MovieDetailPage::load(&client, cmd.id, options).await {
        Ok(page) => page,
        Err(e) => return output.error(format!("Movie detail failed: {}", e), exit_code_for(&e)),
    };

    let in_watchlist = config
        .store_path()
        .map(Store::open)
        .and_then(|s| s.is_in_watchlist(cmd.id).ok());

    let movie = &page.movie;
    let mut lines = vec![movie.to_string()];
    if let Some(tagline) = &movie.tagline {
        lines.push(format!("\"{}\"", tagline));
    }
    lines.push(movie.genre_names().join(", "));
    lines.push(String::new());
    lines.push(movie.overview.clone());

    let crew = page.crew_summary();
    for director in &crew.directors {
        lines.push(format!("{} - {}", director.name, director.roles.join(", ")));
    }
    for writer in &crew.writers {
        lines.push(format!("{} - Writer", writer.name));
    }
    if let Some(credits) = &page.credits {
        lines.push(String::new());
        lines.push("Top Billed Cast:".to_string());
        for member in credits.cast.iter().take(10) {
            lines.push(format!("  {} as {}", member.name, member.character));
        }
    }
    if !page.recommended.is_empty() {
        lines.push(String::new());
        lines.push("Recommendations:".to_string());
        lines.extend(movie_lines(&page.recommended));
    }
    if in_watchlist == Some(true) {
        lines.push(String::new());
        lines.push("★ In your watchlist".to_string());
    }

    let detail = DetailOutput {
        user_score: movie.user_score(),
        poster_url: movie
            .poster_path
            .as_deref()
            .map(|p| poster_url(&config.image_base_url, "w500", p)),
        crew,
        in_watchlist,
        page,
    };
    print_or_fail(output, detail, &lines)
}

#[derive(Serialize)]
struct CreditsOutput {
    #[serde(flatten)]
    credits: crate::models::Credits,
    summary: CrewSummary,
}

pub async fn credits_cmd(cmd: CreditsCmd, config: &Config, output: &Output) -> ExitCode {
    let client = match client(config, output) {
        Ok(client) => client,
        Err(code) => return code,
    };

    match client.movie_credits(cmd.id).await {
        Ok(credits) => {
            let credits = if cmd.all_cast {
                credits
            } else {
                filter_cast(credits)
            };
            let summary = CrewSummary::from_crew(&credits.crew);
            let lines: Vec<String> = credits
                .cast
                .iter()
                .map(|c| format!("{} as {}", c.name, c.character))
                .collect();
            print_or_fail(output, CreditsOutput { credits, summary }, &lines)
        }
        Err(e) => output.error(format!("Credits failed: {}", e), exit_code_for(&e)),
    }
}

pub async fn recommend_cmd(cmd: RecommendCmd, config: &Config, output: &Output) -> ExitCode {
    let client = match client(config, output) {
        Ok(client) => client,
        Err(code) => return code,
    };

    match client.recommendations(cmd.id, cmd.page).await {
        Ok(mut page) => {
            if let Some(limit) = cmd.limit {
                page.results.truncate(limit);
            }
            let lines = movie_lines(&page.results);
            print_or_fail(output, page, &lines)
        }
        Err(e) => output.error(format!("Recommendations failed: {}", e), exit_code_for(&e)),
    }
}

// =============================================================================
// Watchlist Command
// =============================================================================

pub async fn watchlist_cmd(cmd: WatchlistCmd, config: &Config, output: &Output) -> ExitCode {
    let store = match store(config, output) {
        Ok(store) => store,
        Err(code) => return code,
    };

    match cmd.action {
        WatchlistAction::List => match store.watchlist() {
            Ok(movies) => {
                let mut lines = movie_lines(&movies);
                if lines.is_empty() {
                    lines.push("Your watchlist is empty".to_string());
                }
                print_or_fail(output, movies, &lines)
            }
            Err(e) => output.error(format!("Failed to read watchlist: {}", e), ExitCode::Error),
        },
        WatchlistAction::Add { id } => add_to_watchlist(&store, id, config, output).await,
        WatchlistAction::Remove { id } => match store.remove_from_watchlist(id) {
            Ok(changed) => {
                let status = WatchlistStatus {
                    id,
                    in_watchlist: false,
                    changed,
                };
                let line = if changed {
                    format!("Removed {} from watchlist", id)
                } else {
                    format!("{} was not in the watchlist", id)
                };
                print_or_fail(output, status, &[line])
            }
            Err(e) => output.error(format!("Failed to update watchlist: {}", e), ExitCode::Error),
        },
        WatchlistAction::Check { id } => match store.is_in_watchlist(id) {
            Ok(in_watchlist) => {
                let status = WatchlistStatus {
                    id,
                    in_watchlist,
                    changed: false,
                };
                let line = if in_watchlist { "yes" } else { "no" }.to_string();
                print_or_fail(output, status, &[line])
            }
            Err(e) => output.error(format!("Failed to read watchlist: {}", e), ExitCode::Error),
        },
        WatchlistAction::Toggle { id } => match store.is_in_watchlist(id) {
            Ok(true) => match store.remove_from_watchlist(id) {
                Ok(_) => {
                    let status = WatchlistStatus {
                        id,
                        in_watchlist: false,
                        changed: true,
                    };
                    print_or_fail(output, status, &[format!("Removed {} from watchlist", id)])
                }
                Err(e) => {
                    output.error(format!("Failed to update watchlist: {}", e), ExitCode::Error)
                }
            },
            Ok(false) => add_to_watchlist(&store, id, config, output).await,
            Err(e) => output.error(format!("Failed to read watchlist: {}", e), ExitCode::Error),
        },
    }
}

async fn add_to_watchlist(store: &Store, id: u64, config: &Config, output: &Output) -> ExitCode {
    // Saving an already-listed movie needs no network round trip
    match store.is_in_watchlist(id) {
        Ok(true) => {
            let status = WatchlistStatus {
                id,
                in_watchlist: true,
                changed: false,
            };
            return print_or_fail(output, status, &[format!("{} is already saved", id)]);
        }
        Ok(false) => {}
        Err(e) => {
            return output.error(format!("Failed to read watchlist: {}", e), ExitCode::Error)
        }
    }

    let client = match client(config, output) {
        Ok(client) => client,
        Err(code) => return code,
    };
    let detail = match client.movie_detail(id).await {
        Ok(detail) => detail,
        Err(e) => return output.error(format!("Movie detail failed: {}", e), exit_code_for(&e)),
    };

    let movie = Movie::from(&detail);
    match store.add_to_watchlist(&movie) {
        Ok(changed) => {
            let status = WatchlistStatus {
                id,
                in_watchlist: true,
                changed,
            };
            print_or_fail(output, status, &[format!("Added {} to watchlist", movie.title)])
        }
        Err(e) => output.error(format!("Failed to update watchlist: {}", e), ExitCode::Error),
    }
}

// =============================================================================
// Filters Command
// =============================================================================

pub async fn filters_cmd(cmd: FiltersCmd, config: &Config, output: &Output) -> ExitCode {
    let store = match store(config, output) {
        Ok(store) => store,
        Err(code) => return code,
    };

    match cmd.action {
        FiltersAction::Show => match store.home_filters() {
            Ok(filters) => {
                let mut lines = vec![format!("Category: {}", filters.category)];
                if let Some(sort) = filters.sort {
                    lines.push(format!("Sort: {}", sort));
                }
                if !filters.query.is_empty() {
                    lines.push(format!("Search: {}", filters.query));
                }
                print_or_fail(output, filters, &lines)
            }
            Err(e) => output.error(format!("Failed to read filters: {}", e), ExitCode::Error),
        },
        FiltersAction::Reset => match store.reset_home_filters() {
            Ok(_) => print_or_fail(output, HomeFilters::default(), &["Filters reset".into()]),
            Err(e) => output.error(format!("Failed to reset filters: {}", e), ExitCode::Error),
        },
    }
}

// =============================================================================
// Account Command
// =============================================================================

pub async fn account_cmd(_cmd: AccountCmd, config: &Config, output: &Output) -> ExitCode {
    let client = match client(config, output) {
        Ok(client) => client,
        Err(code) => return code,
    };

    match client.account().await {
        Ok(account) => {
            let lines = vec![format!(
                "{} ({}) - {}/{}",
                account.username, account.id, account.iso_639_1, account.iso_3166_1
            )];
            print_or_fail(output, account, &lines)
        }
        Err(e) => output.error(format!("Account lookup failed: {}", e), exit_code_for(&e)),
    }
}
