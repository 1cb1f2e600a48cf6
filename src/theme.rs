//! Light/dark theme preference.
//!
//! A visitor picks `light`, `dark`, or `system` (follow the OS). The resolved
//! theme is what actually gets painted: `system` resolves to whatever the OS
//! reports. The toggle button flips the *resolved* theme and stores it as an
//! explicit choice, so toggling while following a dark OS stores `light`.
//!
//! The preference lives in a [`ThemeStore`] that is handed to whoever needs it
//! rather than kept in a global. Persistence goes through the [`KeyValueStore`]
//! trait:
//!
//! - [`MemoryStore`]: in-process map, for tests and one-shot renders
//! - [`JsonFileStore`]: a small JSON object on disk, used by the `theme` CLI
//!   command
//!
//! An unreadable or unknown stored value falls back to `system`.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::io;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use thiserror::Error;

/// Key under which the preference is stored.
pub const THEME_KEY: &str = "theme";

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Error, Debug, PartialEq, Eq)]
#[error("Unknown theme '{0}' (expected light, dark or system)")]
pub struct UnknownTheme(pub String);

/// What the visitor asked for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ThemePreference {
    Light,
    Dark,
    #[default]
    System,
}

impl ThemePreference {
    pub fn as_str(&self) -> &'static str {
        match self {
            ThemePreference::Light => "light",
            ThemePreference::Dark => "dark",
            ThemePreference::System => "system",
        }
    }

    /// The theme to paint, given what the OS currently reports.
    pub fn resolve(&self, system: ResolvedTheme) -> ResolvedTheme {
        match self {
            ThemePreference::Light => ResolvedTheme::Light,
            ThemePreference::Dark => ResolvedTheme::Dark,
            ThemePreference::System => system,
        }
    }
}

impl fmt::Display for ThemePreference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ThemePreference {
    type Err = UnknownTheme;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "light" => Ok(ThemePreference::Light),
            "dark" => Ok(ThemePreference::Dark),
            "system" => Ok(ThemePreference::System),
            _ => Err(UnknownTheme(s.to_string())),
        }
    }
}

/// The theme actually painted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResolvedTheme {
    #[default]
    Light,
    Dark,
}

impl ResolvedTheme {
    pub fn as_str(&self) -> &'static str {
        match self {
            ResolvedTheme::Light => "light",
            ResolvedTheme::Dark => "dark",
        }
    }

    pub fn opposite(&self) -> ResolvedTheme {
        match self {
            ResolvedTheme::Light => ResolvedTheme::Dark,
            ResolvedTheme::Dark => ResolvedTheme::Light,
        }
    }
}

impl fmt::Display for ResolvedTheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// String key-value persistence.
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError>;
    fn remove(&mut self, key: &str) -> Result<(), StoreError>;
}

/// In-memory store.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    values: BTreeMap<String, String>,
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        self.values.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), StoreError> {
        self.values.remove(key);
        Ok(())
    }
}

/// A flat JSON object on disk, rewritten on every change.
///
/// A missing or corrupt file reads as empty (a corrupt one is logged), so a
/// broken preferences file never prevents the site from rendering.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
    values: BTreeMap<String, String>,
}

impl JsonFileStore {
    pub fn open(path: &Path) -> Self {
        let values = read_values(path).unwrap_or_else(|e| {
            tracing::warn!(path = %path.display(), "{e}; ignoring stored preferences");
            BTreeMap::new()
        });
        Self {
            path: path.to_path_buf(),
            values,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn save(&self) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let json = serde_json::to_string_pretty(&self.values)?;
        std::fs::write(&self.path, json)?;
        Ok(())
    }
}

/// Stored values, or an empty map when the file does not exist yet.
fn read_values(path: &Path) -> Result<BTreeMap<String, String>, StoreError> {
    match std::fs::read_to_string(path) {
        Ok(content) => Ok(serde_json::from_str(&content)?),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(BTreeMap::new()),
        Err(e) => Err(e.into()),
    }
}

impl KeyValueStore for JsonFileStore {
    fn get(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        self.values.insert(key.to_string(), value.to_string());
        self.save()
    }

    fn remove(&mut self, key: &str) -> Result<(), StoreError> {
        self.values.remove(key);
        self.save()
    }
}

/// Theme preference backed by a key-value store.
#[derive(Debug)]
pub struct ThemeStore<S: KeyValueStore> {
    store: S,
    preference: ThemePreference,
}

impl<S: KeyValueStore> ThemeStore<S> {
    /// Read the stored preference, falling back to `default` when nothing
    /// usable is stored.
    pub fn load(store: S, default: ThemePreference) -> Self {
        let preference = match store.get(THEME_KEY) {
            Some(raw) => raw.parse::<ThemePreference>().unwrap_or_else(|e: UnknownTheme| {
                tracing::warn!("{e}; falling back to {default}");
                default
            }),
            None => default,
        };
        Self { store, preference }
    }

    pub fn preference(&self) -> ThemePreference {
        self.preference
    }

    pub fn resolved(&self, system: ResolvedTheme) -> ResolvedTheme {
        self.preference.resolve(system)
    }

    /// Store an explicit preference. `system` clears the stored key.
    pub fn set_preference(&mut self, preference: ThemePreference) -> Result<(), StoreError> {
        match preference {
            ThemePreference::System => self.store.remove(THEME_KEY)?,
            other => self.store.set(THEME_KEY, other.as_str())?,
        }
        self.preference = preference;
        tracing::debug!(theme = %preference, "theme preference changed");
        Ok(())
    }

    /// Flip the resolved theme and store the result as an explicit choice.
    pub fn toggle(&mut self, system: ResolvedTheme) -> Result<ResolvedTheme, StoreError> {
        let next = self.resolved(system).opposite();
        let preference = match next {
            ResolvedTheme::Light => ThemePreference::Light,
            ResolvedTheme::Dark => ThemePreference::Dark,
        };
        self.set_preference(preference)?;
        Ok(next)
    }

    pub fn into_inner(self) -> S {
        self.store
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn system_follows_os() {
        let store = ThemeStore::load(MemoryStore::default(), ThemePreference::System);
        assert_eq!(store.resolved(ResolvedTheme::Dark), ResolvedTheme::Dark);
        assert_eq!(store.resolved(ResolvedTheme::Light), ResolvedTheme::Light);
    }

    #[test]
    fn explicit_preference_ignores_os() {
        let mut store = ThemeStore::load(MemoryStore::default(), ThemePreference::System);
        store.set_preference(ThemePreference::Light).unwrap();
        assert_eq!(store.resolved(ResolvedTheme::Dark), ResolvedTheme::Light);
    }

    #[test]
    fn toggle_from_system_dark_stores_light() {
        let mut store = ThemeStore::load(MemoryStore::default(), ThemePreference::System);
        let next = store.toggle(ResolvedTheme::Dark).unwrap();
        assert_eq!(next, ResolvedTheme::Light);
        assert_eq!(store.preference(), ThemePreference::Light);
        assert_eq!(store.into_inner().get(THEME_KEY).as_deref(), Some("light"));
    }

    #[test]
    fn toggle_twice_returns_to_start() {
        let mut store = ThemeStore::load(MemoryStore::default(), ThemePreference::Dark);
        store.toggle(ResolvedTheme::Light).unwrap();
        store.toggle(ResolvedTheme::Light).unwrap();
        assert_eq!(store.preference(), ThemePreference::Dark);
    }

    #[test]
    fn system_preference_clears_key() {
        let mut store = ThemeStore::load(MemoryStore::default(), ThemePreference::System);
        store.set_preference(ThemePreference::Dark).unwrap();
        store.set_preference(ThemePreference::System).unwrap();
        assert_eq!(store.into_inner().get(THEME_KEY), None);
    }

    #[test]
    fn unknown_stored_value_falls_back() {
        let mut kv = MemoryStore::default();
        kv.set(THEME_KEY, "sepia").unwrap();
        let store = ThemeStore::load(kv, ThemePreference::System);
        assert_eq!(store.preference(), ThemePreference::System);
    }

    #[test]
    fn preference_parses_case_insensitively() {
        assert_eq!("Dark".parse::<ThemePreference>(), Ok(ThemePreference::Dark));
        assert_eq!(
            "sepia".parse::<ThemePreference>(),
            Err(UnknownTheme("sepia".to_string()))
        );
    }

    #[test]
    fn json_store_survives_reload() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("prefs/preferences.json");

        let mut store = ThemeStore::load(JsonFileStore::open(&path), ThemePreference::System);
        store.set_preference(ThemePreference::Dark).unwrap();

        let reloaded = ThemeStore::load(JsonFileStore::open(&path), ThemePreference::System);
        assert_eq!(reloaded.preference(), ThemePreference::Dark);
    }

    #[test]
    fn corrupt_json_store_reads_empty() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("preferences.json");
        std::fs::write(&path, "{not json").unwrap();
        let store = ThemeStore::load(JsonFileStore::open(&path), ThemePreference::Light);
        assert_eq!(store.preference(), ThemePreference::Light);
    }

    #[test]
    fn read_values_reports_corrupt_file_but_not_missing_one() {
        let tmp = TempDir::new().unwrap();
        let missing = tmp.path().join("absent.json");
        assert!(read_values(&missing).unwrap().is_empty());

        let corrupt = tmp.path().join("preferences.json");
        std::fs::write(&corrupt, "{not json").unwrap();
        assert!(matches!(read_values(&corrupt), Err(StoreError::Json(_))));

        // opening alone leaves the broken file for the user to inspect
        let _store = JsonFileStore::open(&corrupt);
        assert_eq!(std::fs::read_to_string(&corrupt).unwrap(), "{not json");
    }
}
