//! CLI - Command Line Interface for cinedex
//!
//! Every action is scriptable. All output is JSON-parseable.
//!
//! # Examples
//!
//! ```bash
//! # Browse a category, optionally sorted or searched
//! cinedex movies --category upcoming --sort rating
//! cinedex movies -Q "dune" -s release_date --json
//!
//! # Movie details and the watchlist
//! cinedex detail 83533
//! cinedex watchlist add 83533
//! cinedex watchlist list
//! ```

use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand, ValueEnum};
use serde::{Deserialize, Serialize};
use std::io::IsTerminal;
use std::path::PathBuf;

use crate::models::{Category, SortBy};

// =============================================================================
// Exit Codes
// =============================================================================

/// Exit codes for CLI operations (semantic for scripting)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum ExitCode {
    /// Success
    Success = 0,
    /// General error
    Error = 1,
    /// Invalid arguments or configuration
    InvalidArgs = 2,
    /// Network error
    NetworkError = 3,
    /// Movie not found
    NotFound = 4,
    /// Credential rejected
    AuthError = 5,
}

impl From<ExitCode> for i32 {
    fn from(code: ExitCode) -> i32 {
        code as i32
    }
}

impl From<ExitCode> for std::process::ExitCode {
    fn from(code: ExitCode) -> std::process::ExitCode {
        std::process::ExitCode::from(code as u8)
    }
}

// =============================================================================
// Main CLI Structure
// =============================================================================

/// cinedex - Browse The Movie Database from the command line
#[derive(Parser, Debug)]
#[command(
    name = "cinedex",
    version,
    about = "Browse The Movie Database and keep a local watchlist",
    long_about = "List now playing, upcoming and popular movies, search and sort them, \
                  inspect cast and crew, and keep a watchlist on this machine.\n\n\
                  Set TMDB_API_KEY (v3 key or v4 read access token) before use.",
    after_help = "EXAMPLES:\n\
                  cinedex movies                        Last used filters (default: now playing)\n\
                  cinedex movies -C popular -s rating   Popular movies by rating\n\
                  cinedex movies -Q \"alien\" --explain   Show the request without sending it\n\
                  cinedex detail 83533                  Detail page with cast and crew\n\
                  cinedex watchlist add 83533           Save a movie"
)]
pub struct Cli {
    /// Output format as JSON (default for non-TTY)
    #[arg(long, short = 'j', global = true)]
    pub json: bool,

    /// Suppress non-essential output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,

    /// Log requests and decisions to stderr
    #[arg(long, short = 'v', global = true)]
    pub verbose: bool,

    /// Path to config file
    #[arg(long, short = 'c', global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

impl Cli {
    /// Check if JSON output should be used
    pub fn should_json(&self) -> bool {
        self.json || !std::io::stdout().is_terminal()
    }
}

// =============================================================================
// Subcommands
// =============================================================================

#[derive(Subcommand, Debug)]
pub enum Command {
    /// List movies by category, sort and search text
    #[command(visible_alias = "ls")]
    Movies(MoviesCmd),

    /// Show a movie's detail page
    #[command(visible_alias = "i")]
    Detail(DetailCmd),

    /// Show cast and crew for a movie
    Credits(CreditsCmd),

    /// Movies recommended from a movie
    #[command(visible_alias = "rec")]
    Recommend(RecommendCmd),

    /// Manage the local watchlist
    #[command(visible_alias = "wl")]
    Watchlist(WatchlistCmd),

    /// Show or reset the remembered home filters
    Filters(FiltersCmd),

    /// Show the TMDB account behind the credential
    Account(AccountCmd),
}

// =============================================================================
// Movies Command
// =============================================================================

/// List movies for a category, optionally sorted or searched
#[derive(Args, Debug)]
pub struct MoviesCmd {
    /// Listing category
    #[arg(long = "category", short = 'C', value_enum)]
    pub category: Option<CategoryArg>,

    /// Sort order
    #[arg(long, short = 's', value_enum)]
    pub sort: Option<SortArg>,

    /// Free-text search
    #[arg(long = "query", short = 'Q')]
    pub search: Option<String>,

    /// First page to fetch
    #[arg(long, short = 'p', default_value = "1")]
    pub page: u32,

    /// Number of consecutive pages to fetch
    #[arg(long, default_value = "1")]
    pub pages: u32,

    /// Maximum number of results
    #[arg(long, short = 'l')]
    pub limit: Option<usize>,

    /// Print the resolved request instead of sending it
    #[arg(long)]
    pub explain: bool,

    /// Remember these filters for the next run
    #[arg(long)]
    pub save: bool,

    /// Treat this date (YYYY-MM-DD) as today for release windows
    #[arg(long, value_parser = parse_date_arg)]
    pub today: Option<NaiveDate>,
}

impl MoviesCmd {
    /// True when no filter flag was given (use remembered filters)
    pub fn uses_saved_filters(&self) -> bool {
        self.category.is_none() && self.sort.is_none() && self.search.is_none()
    }
}

fn parse_date_arg(s: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").map_err(|e| format!("expected YYYY-MM-DD: {}", e))
}

/// Category selection
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum CategoryArg {
    /// In theaters now
    #[value(name = "now_playing", alias = "now-playing")]
    NowPlaying,
    /// Releasing soon
    Upcoming,
    /// Most popular
    Popular,
}

impl From<CategoryArg> for Category {
    fn from(arg: CategoryArg) -> Self {
        match arg {
            CategoryArg::NowPlaying => Category::NowPlaying,
            CategoryArg::Upcoming => Category::Upcoming,
            CategoryArg::Popular => Category::Popular,
        }
    }
}

/// Sort selection
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortArg {
    /// Title A-Z
    #[value(alias = "title")]
    Alphabetical,
    /// Highest rated first
    Rating,
    /// Newest first
    #[value(name = "release_date", aliases = ["release-date", "date"])]
    ReleaseDate,
}

impl From<SortArg> for SortBy {
    fn from(arg: SortArg) -> Self {
        match arg {
            SortArg::Alphabetical => SortBy::Alphabetical,
            SortArg::Rating => SortBy::Rating,
            SortArg::ReleaseDate => SortBy::ReleaseDate,
        }
    }
}

// =============================================================================
// Detail Commands
// =============================================================================

/// Show a movie with credits and recommendations
#[derive(Args, Debug)]
pub struct DetailCmd {
    /// TMDB movie ID
    #[arg(required = true)]
    pub id: u64,

    /// Skip cast and crew
    #[arg(long)]
    pub no_credits: bool,

    /// Skip recommended movies
    #[arg(long)]
    pub no_recommended: bool,
}

/// Show cast and crew
#[derive(Args, Debug)]
pub struct CreditsCmd {
    /// TMDB movie ID
    #[arg(required = true)]
    pub id: u64,

    /// Include little-known cast members
    #[arg(long)]
    pub all_cast: bool,
}

/// Movies recommended from a movie
#[derive(Args, Debug)]
pub struct RecommendCmd {
    /// TMDB movie ID
    #[arg(required = true)]
    pub id: u64,

    /// Page to fetch
    #[arg(long, short = 'p', default_value = "1")]
    pub page: u32,

    /// Maximum number of results
    #[arg(long, short = 'l')]
    pub limit: Option<usize>,
}

// =============================================================================
// Watchlist Command
// =============================================================================

#[derive(Args, Debug)]
pub struct WatchlistCmd {
    #[command(subcommand)]
    pub action: WatchlistAction,
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum WatchlistAction {
    /// List saved movies
    #[command(visible_alias = "ls")]
    List,
    /// Save a movie (fetches its details)
    Add {
        /// TMDB movie ID
        id: u64,
    },
    /// Remove a saved movie
    #[command(visible_alias = "rm")]
    Remove {
        /// TMDB movie ID
        id: u64,
    },
    /// Check whether a movie is saved
    Check {
        /// TMDB movie ID
        id: u64,
    },
    /// Add if missing, remove if present
    Toggle {
        /// TMDB movie ID
        id: u64,
    },
}

// =============================================================================
// Filters / Account Commands
// =============================================================================

#[derive(Args, Debug)]
pub struct FiltersCmd {
    #[command(subcommand)]
    pub action: FiltersAction,
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum FiltersAction {
    /// Print remembered filters
    Show,
    /// Forget remembered filters
    Reset,
}

/// Show the TMDB account
#[derive(Args, Debug)]
pub struct AccountCmd {}

// =============================================================================
// JSON Output Types
// =============================================================================

/// Generic JSON output wrapper with status
#[derive(Debug, Serialize, Deserialize)]
pub struct JsonOutput<T: Serialize> {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "is_zero")]
    pub exit_code: i32,
}

fn is_zero(n: &i32) -> bool {
    *n == 0
}

impl<T: Serialize> JsonOutput<T> {
    /// Create success output with data
    pub fn success(data: T) -> Self {
        Self {
            data: Some(data),
            error: None,
            exit_code: 0,
        }
    }

    /// Create error output (no data)
    pub fn error_msg(msg: impl Into<String>, code: ExitCode) -> JsonOutput<()> {
        JsonOutput::<()> {
            data: None,
            error: Some(msg.into()),
            exit_code: code.into(),
        }
    }
}

/// Watchlist mutation result
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct WatchlistStatus {
    pub id: u64,
    pub in_watchlist: bool,
    pub changed: bool,
}

// =============================================================================
// Output Helpers
// =============================================================================

/// Output handler for consistent formatting
pub struct Output {
    pub json: bool,
    pub quiet: bool,
}

impl Output {
    pub fn new(cli: &Cli) -> Self {
        Self {
            json: cli.should_json(),
            quiet: cli.quiet,
        }
    }

    /// Print success data
    pub fn print<T: Serialize>(&self, data: T) -> anyhow::Result<()> {
        if self.json {
            let output = JsonOutput::success(data);
            println!("{}", serde_json::to_string_pretty(&output)?);
        } else {
            println!("{}", serde_json::to_string_pretty(&data)?);
        }
        Ok(())
    }

    /// Print human-readable lines, or the JSON form of `data`
    pub fn print_lines<T: Serialize>(&self, data: T, lines: &[String]) -> anyhow::Result<()> {
        if self.json {
            return self.print(data);
        }
        for line in lines {
            println!("{}", line);
        }
        Ok(())
    }

    /// Print error and return exit code
    pub fn error(&self, msg: impl Into<String>, code: ExitCode) -> ExitCode {
        let msg = msg.into();
        if self.json {
            let output = JsonOutput::<()>::error_msg(&msg, code);
            if let Ok(json) = serde_json::to_string_pretty(&output) {
                eprintln!("{}", json);
            }
        } else if !self.quiet {
            eprintln!("Error: {}", msg);
        }
        code
    }

    /// Print info message (suppressed in quiet mode)
    pub fn info(&self, msg: impl std::fmt::Display) {
        if !self.quiet && !self.json {
            eprintln!("{}", msg);
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
