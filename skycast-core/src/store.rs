use anyhow::{Context, Result, anyhow};
use directories::ProjectDirs;
use serde::{Serialize, de::DeserializeOwned};
use std::{
    collections::HashMap,
    fs,
    path::PathBuf,
    sync::Mutex,
};

use crate::model::{FavoriteEntry, Theme};

const THEME_KEY: &str = "theme";
const HISTORY_KEY: &str = "history";
const FAVORITES_KEY: &str = "favorites";

/// Maximum number of retained history entries.
pub const HISTORY_LIMIT: usize = 5;

/// String-keyed, string-valued durable medium behind [`Preferences`].
///
/// Implementations only need whole-value get/set; all collection semantics
/// live in the wrapper.
pub trait PreferenceStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>>;
    fn set(&self, key: &str, value: &str) -> Result<()>;
}

/// Volatile backing, used by tests and ephemeral runs.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl PreferenceStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let entries = self
            .entries
            .lock()
            .map_err(|_| anyhow!("preference store lock poisoned"))?;
        Ok(entries.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let mut entries = self
            .entries
            .lock()
            .map_err(|_| anyhow!("preference store lock poisoned"))?;
        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// Durable backing: one file per key under the platform data directory.
#[derive(Debug)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    /// Store rooted at the platform-specific skycast data directory.
    pub fn open_default() -> Result<Self> {
        let dirs = ProjectDirs::from("dev", "skycast", "skycast")
            .ok_or_else(|| anyhow!("Could not determine platform data directory"))?;

        Ok(Self { dir: dirs.data_dir().join("prefs") })
    }

    /// Store rooted at an explicit directory.
    pub fn at(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn key_path(&self, key: &str) -> PathBuf {
        self.dir.join(key)
    }
}

impl PreferenceStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let path = self.key_path(key);
        if !path.exists() {
            return Ok(None);
        }

        let contents = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read preference file: {}", path.display()))?;

        Ok(Some(contents))
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        fs::create_dir_all(&self.dir).with_context(|| {
            format!("Failed to create preference directory: {}", self.dir.display())
        })?;

        let path = self.key_path(key);
        fs::write(&path, value)
            .with_context(|| format!("Failed to write preference file: {}", path.display()))
    }
}

/// Outcome of [`Preferences::toggle_favorite`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FavoriteToggle {
    Added,
    Removed,
}

impl FavoriteToggle {
    pub fn as_str(&self) -> &'static str {
        match self {
            FavoriteToggle::Added => "added",
            FavoriteToggle::Removed => "removed",
        }
    }
}

/// Typed access to the three persisted preference keys: theme, search
/// history, and favorites.
///
/// Every operation is a full read-modify-write of its collection. An
/// unreadable stored payload degrades to the empty collection rather than
/// failing the action.
pub struct Preferences<S> {
    store: S,
}

impl<S: PreferenceStore> Preferences<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn theme(&self) -> Result<Theme> {
        Ok(self
            .store
            .get(THEME_KEY)?
            .map(|value| Theme::from_stored(value.trim()))
            .unwrap_or_default())
    }

    pub fn set_theme(&self, theme: Theme) -> Result<()> {
        self.store.set(THEME_KEY, theme.as_str())
    }

    /// Recently searched place names, most recent first.
    pub fn history(&self) -> Result<Vec<String>> {
        self.read_list(HISTORY_KEY)
    }

    /// Record a search: any case-insensitive match is dropped, the new name
    /// goes to the front, and the list is trimmed to [`HISTORY_LIMIT`].
    pub fn push_history(&self, city: &str) -> Result<()> {
        let mut history = self.history()?;
        let lowered = city.to_lowercase();

        history.retain(|entry| entry.to_lowercase() != lowered);
        history.insert(0, city.to_string());
        history.truncate(HISTORY_LIMIT);

        self.write_list(HISTORY_KEY, &history)
    }

    /// Saved places, in insertion order.
    pub fn favorites(&self) -> Result<Vec<FavoriteEntry>> {
        self.read_list(FAVORITES_KEY)
    }

    /// Add the candidate, or remove the existing entry with the same
    /// case-insensitive name.
    pub fn toggle_favorite(&self, candidate: FavoriteEntry) -> Result<FavoriteToggle> {
        let mut favorites = self.favorites()?;
        let lowered = candidate.name.to_lowercase();
        let before = favorites.len();

        favorites.retain(|entry| entry.name.to_lowercase() != lowered);

        let toggle = if favorites.len() < before {
            FavoriteToggle::Removed
        } else {
            favorites.push(candidate);
            FavoriteToggle::Added
        };

        self.write_list(FAVORITES_KEY, &favorites)?;
        tracing::debug!("Favorite toggled: {}", toggle.as_str());
        Ok(toggle)
    }

    /// Remove by case-insensitive name. Absent names are a no-op, not an error.
    pub fn remove_favorite(&self, name: &str) -> Result<()> {
        let mut favorites = self.favorites()?;
        let lowered = name.to_lowercase();

        favorites.retain(|entry| entry.name.to_lowercase() != lowered);
        self.write_list(FAVORITES_KEY, &favorites)
    }

    pub fn is_favorite(&self, name: &str) -> Result<bool> {
        let lowered = name.to_lowercase();
        Ok(self
            .favorites()?
            .iter()
            .any(|entry| entry.name.to_lowercase() == lowered))
    }

    fn read_list<T: DeserializeOwned>(&self, key: &str) -> Result<Vec<T>> {
        let Some(raw) = self.store.get(key)? else {
            return Ok(Vec::new());
        };

        match serde_json::from_str(&raw) {
            Ok(list) => Ok(list),
            Err(err) => {
                tracing::warn!("Discarding unreadable `{key}` payload: {err}");
                Ok(Vec::new())
            }
        }
    }

    fn write_list<T: Serialize>(&self, key: &str, list: &[T]) -> Result<()> {
        let raw = serde_json::to_string(list)
            .with_context(|| format!("Failed to encode `{key}` list"))?;
        self.store.set(key, &raw)
    }
}
