// Configuration module
// `key = value` settings file; `<prefix><key>` environment variables win over it

use parking_lot::Mutex;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Process-wide configuration instance
static CONFIG: once_cell::sync::Lazy<Mutex<Config>> =
    once_cell::sync::Lazy::new(|| Mutex::new(Config::new()));

/// Get a reference to the global config instance
pub fn get_config() -> &'static Mutex<Config> {
    &CONFIG
}

#[derive(Debug, Clone, Default)]
pub struct Config {
    values: HashMap<String, String>,
    source: Option<PathBuf>,
    env_prefix: String,
}

impl Config {
    pub fn new() -> Self {
        Self::default()
    }

    /// Read settings from `path`. Returns false when the file cannot be
    /// read; the environment prefix applies either way.
    pub fn set_source(&mut self, path: impl AsRef<Path>, env_prefix: &str) -> bool {
        self.source = Some(path.as_ref().to_path_buf());
        self.env_prefix = env_prefix.to_string();
        self.reload()
    }

    /// Re-read the current source file
    pub fn reload(&mut self) -> bool {
        self.values.clear();
        let Some(path) = &self.source else {
            return false;
        };
        match std::fs::read_to_string(path) {
            Ok(content) => {
                self.parse(&content);
                true
            }
            Err(_) => false,
        }
    }

    pub fn source(&self) -> Option<&Path> {
        self.source.as_deref()
    }

    /// Add the settings in `content`. Blank lines, `#`/`;` comments and
    /// `[section]` headers are skipped; a later key replaces an earlier one.
    pub fn parse(&mut self, content: &str) {
        for (number, line) in content.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() || line.starts_with(['#', ';', '[']) {
                continue;
            }

            let Some((key, value)) = line.split_once('=') else {
                tracing::warn!("Config line {} has no '=': {}", number + 1, line);
                continue;
            };
            let value = value.trim();
            let value = value
                .strip_prefix('"')
                .and_then(|v| v.strip_suffix('"'))
                .unwrap_or(value);
            self.values.insert(key.trim().to_string(), value.to_string());
        }
    }

    pub fn is_set(&self, key: &str) -> bool {
        self.raw(key).is_some()
    }

    /// Typed value of `key`; unparsable values are reported and ignored
    pub fn get<T: FromStr>(&self, key: &str) -> Option<T> {
        let raw = self.raw(key)?;
        match raw.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!("Config value {} = '{}' is not valid, using default", key, raw);
                None
            }
        }
    }

    pub fn get_or<T: FromStr>(&self, key: &str, default: T) -> T {
        self.get(key).unwrap_or(default)
    }

    /// String value of `key`, empty when unset
    pub fn get_string(&self, key: &str) -> String {
        self.raw(key).unwrap_or_default()
    }

    pub fn get_string_or(&self, key: &str, default: &str) -> String {
        self.raw(key).unwrap_or_else(|| default.to_string())
    }

    /// `1`, `true`, `yes` and `on` are true; any other set value is false
    pub fn get_bool_or(&self, key: &str, default: bool) -> bool {
        match self.raw(key) {
            Some(value) => matches!(
                value.to_ascii_lowercase().as_str(),
                "1" | "true" | "yes" | "on"
            ),
            None => default,
        }
    }

    fn raw(&self, key: &str) -> Option<String> {
        if !self.env_prefix.is_empty() {
            let env_key = format!("{}{}", self.env_prefix, key.replace('.', "_"));
            if let Ok(value) = std::env::var(env_key) {
                return Some(value);
            }
        }
        self.values.get(key).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::new();
        assert_eq!(config.get_or("nonexistent", 42), 42);
        assert_eq!(config.get_string_or("nonexistent", "hello"), "hello");
        assert!(config.get_bool_or("nonexistent", true));
        assert_eq!(config.get::<i32>("nonexistent"), None);
    }

    #[test]
    fn test_parse_values() {
        let mut config = Config::new();
        config.parse(
            "[mapview]\n# comment\nDataDir = \"./assets/\"\nTileScale = 2.5\nWireFrame = 0\nStartSectorX=60\nbroken line\n",
        );
        assert_eq!(config.get_string("DataDir"), "./assets/");
        assert_eq!(config.get_or("TileScale", 4.0f32), 2.5);
        assert!(!config.get_bool_or("WireFrame", true));
        assert_eq!(config.get_or("StartSectorX", 55), 60);
        assert!(!config.is_set("broken line"));
    }

    #[test]
    fn test_invalid_value_falls_back() {
        let mut config = Config::new();
        config.parse("TileScale = big\nEmpty = \"\"\n");
        assert_eq!(config.get_or("TileScale", 4.0f32), 4.0);
        assert!(config.is_set("Empty"));
        assert_eq!(config.get_string_or("Empty", "x"), "");
    }

    #[test]
    fn test_missing_file() {
        let mut config = Config::new();
        assert!(!config.set_source("/nonexistent/mapview.conf", ""));
        assert!(!config.is_set("DataDir"));
        assert_eq!(config.source(), Some(Path::new("/nonexistent/mapview.conf")));
    }

    #[test]
    fn test_reload_replaces_values() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("mapview.conf");

        std::fs::write(&path, "TileScale = 3\n").unwrap();
        let mut config = Config::new();
        assert!(config.set_source(&path, ""));
        assert_eq!(config.get_or("TileScale", 0.0f32), 3.0);

        std::fs::write(&path, "ShowWalls = no\n").unwrap();
        assert!(config.reload());
        assert!(!config.is_set("TileScale"));
        assert!(!config.get_bool_or("ShowWalls", true));
    }
}
