use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use serde_json::Value;
use tracing::{debug, warn};

use crate::{
    Error,
    model::{GlobalSettings, PersistedConfig, Source, new_source_id},
};

pub const CONFIG_FILE_NAME: &str = "config.json";
pub const LEGACY_SOURCE_NAME: &str = "Legacy Chat";

/// Where the host reads and writes the persisted document.
pub trait ConfigStore: Send + Sync {
    /// Never fails: a missing or corrupt document yields the default config.
    fn load(&self) -> PersistedConfig;
    fn save(&self, config: &PersistedConfig) -> Result<(), Error>;
}

/// Pretty-printed JSON file store.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// `config.json` in the platform config directory.
    pub fn default_location() -> Option<Self> {
        ProjectDirs::from("app", "streamlay", "Streamlay")
            .map(|dirs| Self::new(dirs.config_dir().join(CONFIG_FILE_NAME)))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read(&self) -> Result<Option<PersistedConfig>, Error> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        if content.trim().is_empty() {
            return Ok(None);
        }

        let value: Value = serde_json::from_str(&content)?;
        Ok(Some(parse_document(value)?))
    }
}

impl ConfigStore for JsonFileStore {
    fn load(&self) -> PersistedConfig {
        match self.read() {
            Ok(Some(config)) => {
                debug!(path = %self.path.display(), sources = config.sources.len(), "config loaded");
                config
            }
            Ok(None) => PersistedConfig::default(),
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "config unreadable, using defaults");
                PersistedConfig::default()
            }
        }
    }

    fn save(&self, config: &PersistedConfig) -> Result<(), Error> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(config)?;
        fs::write(&self.path, json)?;
        debug!(path = %self.path.display(), "config saved");
        Ok(())
    }
}

/// Parses a persisted document, migrating the single-source layout when the
/// document has no sources of its own.
pub fn parse_document(value: Value) -> Result<PersistedConfig, Error> {
    let has_sources = value
        .get("sources")
        .and_then(Value::as_array)
        .is_some_and(|sources| !sources.is_empty());

    let mut config = if has_sources {
        parse_current(value)
    } else {
        migrate_legacy(&value)
    };

    config.normalize();
    Ok(config)
}

/// Parses sources one at a time so a single unreadable entry does not take
/// the rest of the document down with it.
fn parse_current(mut value: Value) -> PersistedConfig {
    let sources = match value.get_mut("sources").map(Value::take) {
        Some(Value::Array(entries)) => entries,
        _ => Vec::new(),
    };

    let sources = sources
        .into_iter()
        .enumerate()
        .filter_map(|(index, entry)| match serde_json::from_value::<Source>(entry) {
            Ok(source) => Some(source),
            Err(e) => {
                warn!(index, error = %e, "dropping unreadable source");
                None
            }
        })
        .collect();

    let settings = value
        .get_mut("settings")
        .map(Value::take)
        .map(|settings| {
            serde_json::from_value::<GlobalSettings>(settings).unwrap_or_else(|e| {
                warn!(error = %e, "settings unreadable, using defaults");
                GlobalSettings::default()
            })
        })
        .unwrap_or_default();

    PersistedConfig { sources, settings }
}

fn migrate_legacy(value: &Value) -> PersistedConfig {
    let mut settings = value
        .get("settings")
        .cloned()
        .and_then(|settings| serde_json::from_value::<GlobalSettings>(settings).ok())
        .unwrap_or_default();

    if let Some(shortcut) = str_field(value, "menuShortcut").filter(|s| !s.is_empty()) {
        settings.menu_shortcut = shortcut.to_string();
    }
    if let Some(hide) = value.get("hideFromObs").and_then(Value::as_bool) {
        settings.hide_from_obs = hide;
    }

    let Some(url) = str_field(value, "url").filter(|url| !url.is_empty()) else {
        return PersistedConfig {
            sources: Vec::new(),
            settings,
        };
    };

    let defaults = Source::default();
    let source = Source {
        id: new_source_id(),
        name: LEGACY_SOURCE_NAME.to_string(),
        url: url.to_string(),
        css: str_field(value, "css").unwrap_or_default().to_string(),
        x: int_field(value, "x").unwrap_or(defaults.x),
        y: int_field(value, "y").unwrap_or(defaults.y),
        width: int_field(value, "width").unwrap_or(defaults.width),
        height: int_field(value, "height").unwrap_or(defaults.height),
        zoom: value.get("zoom").and_then(Value::as_f64).unwrap_or(1.0),
        ..defaults
    };

    debug!(url = %source.url, "migrated legacy single-source config");

    PersistedConfig {
        sources: vec![source],
        settings,
    }
}

fn str_field<'a>(value: &'a Value, key: &str) -> Option<&'a str> {
    value.get(key).and_then(Value::as_str)
}

fn int_field(value: &Value, key: &str) -> Option<i32> {
    value
        .get(key)
        .and_then(Value::as_f64)
        .map(|n| n.round() as i32)
}
