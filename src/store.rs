//! Local preference store
//!
//! A JSON-file key-value store holding the watchlist and the last-used home
//! filters. Every mutation is a read/modify/write of the whole file; the last
//! writer wins.

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, warn};

use crate::models::{HomeFilters, Movie};

pub const WATCHLIST_KEY: &str = "watchlist";
pub const HOME_FILTERS_KEY: &str = "home_filters";

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Store I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Store file {0} is not a JSON object")]
    Corrupt(PathBuf),

    #[error("Serialization failed: {0}")]
    Json(#[from] serde_json::Error),
}

/// File-backed key-value store
#[derive(Debug, Clone)]
pub struct Store {
    path: PathBuf,
}

impl Store {
    pub fn open(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn io_err(&self, source: std::io::Error) -> StoreError {
        StoreError::Io {
            path: self.path.clone(),
            source,
        }
    }

    /// Read the whole document; a missing file is an empty store
    fn read_all(&self) -> Result<Map<String, Value>, StoreError> {
        let text = match std::fs::read_to_string(&self.path) {
            Ok(text) => text,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Map::new()),
            Err(e) => return Err(self.io_err(e)),
        };
        if text.trim().is_empty() {
            return Ok(Map::new());
        }
        match serde_json::from_str::<Value>(&text) {
            Ok(Value::Object(map)) => Ok(map),
            _ => Err(StoreError::Corrupt(self.path.clone())),
        }
    }

    fn write_all(&self, map: &Map<String, Value>) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| self.io_err(e))?;
        }
        let json = serde_json::to_string_pretty(map)?;
        let tmp = self.path.with_extension("json.tmp");
        std::fs::write(&tmp, json).map_err(|e| self.io_err(e))?;
        std::fs::rename(&tmp, &self.path).map_err(|e| self.io_err(e))?;
        Ok(())
    }

    /// Get a typed value; `None` when the key is absent or doesn't decode
    pub fn get<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, StoreError> {
        let mut map = self.read_all()?;
        let Some(value) = map.remove(key) else {
            return Ok(None);
        };
        match serde_json::from_value(value) {
            Ok(v) => Ok(Some(v)),
            Err(e) => {
                warn!(key, error = %e, "ignoring undecodable store value");
                Ok(None)
            }
        }
    }

    pub fn set<T: Serialize>(&self, key: &str, value: &T) -> Result<(), StoreError> {
        // A corrupt file is replaced rather than blocking every write
        let mut map = match self.read_all() {
            Ok(map) => map,
            Err(StoreError::Corrupt(path)) => {
                warn!(path = %path.display(), "store file corrupt, starting fresh");
                Map::new()
            }
            Err(e) => return Err(e),
        };
        map.insert(key.to_string(), serde_json::to_value(value)?);
        debug!(key, "store write");
        self.write_all(&map)
    }

    /// Remove a key, returning whether it existed
    pub fn remove(&self, key: &str) -> Result<bool, StoreError> {
        let mut map = self.read_all()?;
        if map.remove(key).is_none() {
            return Ok(false);
        }
        self.write_all(&map)?;
        Ok(true)
    }

    // =========================================================================
    // Watchlist
    // =========================================================================

    /// Saved movies in insertion order
    pub fn watchlist(&self) -> Result<Vec<Movie>, StoreError> {
        Ok(self.get(WATCHLIST_KEY)?.unwrap_or_default())
    }

    /// Add a movie unless one with the same id is already saved
    pub fn add_to_watchlist(&self, movie: &Movie) -> Result<bool, StoreError> {
        let mut list = self.watchlist()?;
        if list.iter().any(|m| m.id == movie.id) {
            return Ok(false);
        }
        list.push(movie.clone());
        self.set(WATCHLIST_KEY, &list)?;
        Ok(true)
    }

    pub fn remove_from_watchlist(&self, movie_id: u64) -> Result<bool, StoreError> {
        let mut list = self.watchlist()?;
        let before = list.len();
        list.retain(|m| m.id != movie_id);
        if list.len() == before {
            return Ok(false);
        }
        self.set(WATCHLIST_KEY, &list)?;
        Ok(true)
    }

    pub fn is_in_watchlist(&self, movie_id: u64) -> Result<bool, StoreError> {
        Ok(self.watchlist()?.iter().any(|m| m.id == movie_id))
    }

    /// Flip membership, returning whether the movie is now saved
    pub fn toggle_watchlist(&self, movie: &Movie) -> Result<bool, StoreError> {
        if self.remove_from_watchlist(movie.id)? {
            Ok(false)
        } else {
            self.add_to_watchlist(movie)
        }
    }

    // =========================================================================
    // Home Filters
    // =========================================================================

    pub fn home_filters(&self) -> Result<HomeFilters, StoreError> {
        Ok(self.get(HOME_FILTERS_KEY)?.unwrap_or_default())
    }

    pub fn save_home_filters(&self, filters: &HomeFilters) -> Result<(), StoreError> {
        self.set(HOME_FILTERS_KEY, filters)
    }

    pub fn reset_home_filters(&self) -> Result<bool, StoreError> {
        self.remove(HOME_FILTERS_KEY)
    }
}
