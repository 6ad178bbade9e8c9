use crate::error::FavoritesError;
use std::collections::BTreeSet;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::debug;

/// Client-local set of favorite listing identifiers.
///
/// Toggling is read-modify-write with no protection against concurrent
/// writers; the last write wins.
pub trait FavoritesStore: Send + Sync {
    fn load(&self) -> Result<BTreeSet<String>, FavoritesError>;

    fn save(&self, ids: &BTreeSet<String>) -> Result<(), FavoritesError>;

    fn contains(&self, id: &str) -> Result<bool, FavoritesError> {
        Ok(self.load()?.contains(id))
    }

    /// Flip membership of `id` and return whether it is now a favorite
    fn toggle(&self, id: &str) -> Result<bool, FavoritesError> {
        let mut ids = self.load()?;
        let favorite = if ids.remove(id) {
            false
        } else {
            ids.insert(id.to_string());
            true
        };
        self.save(&ids)?;
        Ok(favorite)
    }
}

/// Favorites kept as a JSON array in a file
#[derive(Debug, Clone)]
pub struct FileFavorites {
    path: PathBuf,
}

impl FileFavorites {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl FavoritesStore for FileFavorites {
    fn load(&self) -> Result<BTreeSet<String>, FavoritesError> {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(BTreeSet::new()),
            Err(err) => return Err(err.into()),
        };
        if raw.trim().is_empty() {
            return Ok(BTreeSet::new());
        }
        let ids: Vec<String> = serde_json::from_str(&raw)?;
        Ok(ids.into_iter().collect())
    }

    fn save(&self, ids: &BTreeSet<String>) -> Result<(), FavoritesError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string(&ids.iter().collect::<Vec<_>>())?;
        fs::write(&self.path, json)?;
        debug!("Saved {} favorites to {}", ids.len(), self.path.display());
        Ok(())
    }
}

/// Favorites held in memory
#[derive(Debug, Default)]
pub struct MemoryFavorites {
    ids: Mutex<BTreeSet<String>>,
}

impl MemoryFavorites {
    pub fn new() -> Self {
        Self::default()
    }
}

impl FavoritesStore for MemoryFavorites {
    fn load(&self) -> Result<BTreeSet<String>, FavoritesError> {
        Ok(self.ids.lock().unwrap_or_else(|poisoned| poisoned.into_inner()).clone())
    }

    fn save(&self, ids: &BTreeSet<String>) -> Result<(), FavoritesError> {
        *self.ids.lock().unwrap_or_else(|poisoned| poisoned.into_inner()) = ids.clone();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_toggle_round_trip() {
        let favorites = MemoryFavorites::new();
        assert!(favorites.toggle("4937770").unwrap());
        assert!(favorites.contains("4937770").unwrap());
        assert!(!favorites.toggle("4937770").unwrap());
        assert!(favorites.load().unwrap().is_empty());
    }

    #[test]
    fn test_file_missing_or_blank_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let favorites = FileFavorites::new(dir.path().join("fav.json"));
        assert!(favorites.load().unwrap().is_empty());

        fs::write(favorites.path(), "").unwrap();
        assert!(favorites.load().unwrap().is_empty());
    }

    #[test]
    fn test_file_toggle_persists() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("fav.json");
        let favorites = FileFavorites::new(&path);
        favorites.toggle("a").unwrap();
        favorites.toggle("b").unwrap();

        let reopened = FileFavorites::new(&path);
        assert!(reopened.contains("a").unwrap());
        assert_eq!(fs::read_to_string(&path).unwrap(), r#"["a","b"]"#);

        reopened.toggle("a").unwrap();
        assert!(!favorites.contains("a").unwrap());
    }

    #[test]
    fn test_corrupt_file_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("fav.json");
        fs::write(&path, "{not json").unwrap();
        let err = FileFavorites::new(&path).load().unwrap_err();
        assert!(matches!(err, FavoritesError::Corrupt(_)));
    }
}
