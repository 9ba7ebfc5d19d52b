//! Sources, global settings and the persisted document.
//!
//! Field names match the JSON document written to disk and exchanged with the
//! settings and overlay webviews, so everything is `camelCase`.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::geometry::{Bounds, SURFACE_MIN_SIZE};

pub type SourceId = String;

pub const DEFAULT_SOURCE_NAME: &str = "Source";
pub const DEFAULT_MENU_SHORTCUT: &str = "Shift+F1";

pub fn new_source_id() -> SourceId {
    uuid::Uuid::new_v4().to_string()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AudioSettings {
    pub muted: bool,
    #[serde(deserialize_with = "lenient::u32")]
    pub volume: u32,
}

impl Default for AudioSettings {
    fn default() -> Self {
        Self {
            muted: false,
            volume: 100,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Source {
    pub id: SourceId,
    pub name: String,
    pub url: String,
    #[serde(deserialize_with = "lenient::i32")]
    pub x: i32,
    #[serde(deserialize_with = "lenient::i32")]
    pub y: i32,
    #[serde(deserialize_with = "lenient::i32")]
    pub width: i32,
    #[serde(deserialize_with = "lenient::i32")]
    pub height: i32,
    #[serde(deserialize_with = "lenient::u32")]
    pub z_index: u32,
    pub opacity: f64,
    pub interact: bool,
    pub audio: AudioSettings,
    pub css: String,
    pub zoom: f64,
}

impl Default for Source {
    fn default() -> Self {
        Self {
            id: String::new(),
            name: DEFAULT_SOURCE_NAME.to_string(),
            url: String::new(),
            x: 100,
            y: 100,
            width: 400,
            height: 300,
            z_index: 1,
            opacity: 1.0,
            interact: false,
            audio: AudioSettings::default(),
            css: String::new(),
            zoom: 1.0,
        }
    }
}

impl Source {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: new_source_id(),
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn bounds(&self) -> Bounds {
        Bounds::new(self.x, self.y, self.width, self.height)
    }

    pub fn set_bounds(&mut self, bounds: Bounds) {
        self.x = bounds.x;
        self.y = bounds.y;
        self.width = bounds.width.max(SURFACE_MIN_SIZE);
        self.height = bounds.height.max(SURFACE_MIN_SIZE);
    }

    pub fn set_opacity(&mut self, opacity: f64) {
        self.opacity = clamp_opacity(opacity);
    }

    /// Clamps every field into its valid range.
    pub fn sanitize(&mut self) {
        self.width = self.width.max(SURFACE_MIN_SIZE);
        self.height = self.height.max(SURFACE_MIN_SIZE);
        self.opacity = clamp_opacity(self.opacity);
        self.audio.volume = self.audio.volume.min(100);
        if !self.zoom.is_finite() || self.zoom <= 0.0 {
            self.zoom = 1.0;
        }
        if self.name.trim().is_empty() {
            self.name = DEFAULT_SOURCE_NAME.to_string();
        }
    }
}

/// Numeric fields written by older builds or edited by hand may be fractional
/// or out of range; they round and clamp instead of failing the document.
mod lenient {
    use serde::{Deserialize, Deserializer};

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Number {
        Int(i64),
        Float(f64),
    }

    fn whole<'de, D: Deserializer<'de>>(deserializer: D) -> Result<i64, D::Error> {
        Ok(match Number::deserialize(deserializer)? {
            Number::Int(n) => n,
            // `as` saturates for out-of-range floats
            Number::Float(n) => n.round() as i64,
        })
    }

    pub fn i32<'de, D: Deserializer<'de>>(deserializer: D) -> Result<i32, D::Error> {
        Ok(whole(deserializer)?.clamp(i32::MIN.into(), i32::MAX.into()) as i32)
    }

    pub fn u32<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u32, D::Error> {
        Ok(whole(deserializer)?.clamp(0, u32::MAX.into()) as u32)
    }
}

fn clamp_opacity(opacity: f64) -> f64 {
    if opacity.is_nan() {
        1.0
    } else {
        opacity.clamp(0.0, 1.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct GlobalSettings {
    pub menu_shortcut: String,
    /// Optional second shortcut toggling source visibility. Empty means unset.
    pub toggle_shortcut: String,
    pub hide_from_obs: bool,
    pub language: String,
}

impl Default for GlobalSettings {
    fn default() -> Self {
        Self {
            menu_shortcut: DEFAULT_MENU_SHORTCUT.to_string(),
            toggle_shortcut: String::new(),
            hide_from_obs: false,
            language: "en".to_string(),
        }
    }
}

impl GlobalSettings {
    /// True when the hotkey registrations need to be redone.
    pub fn shortcuts_differ(&self, other: &GlobalSettings) -> bool {
        self.menu_shortcut != other.menu_shortcut || self.toggle_shortcut != other.toggle_shortcut
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PersistedConfig {
    pub sources: Vec<Source>,
    pub settings: GlobalSettings,
}

impl PersistedConfig {
    /// Sanitizes sources and repairs missing or duplicated ids.
    pub fn normalize(&mut self) {
        normalize_sources(&mut self.sources);
    }
}

pub fn normalize_sources(sources: &mut [Source]) {
    let mut seen = HashSet::new();
    for source in sources.iter_mut() {
        source.sanitize();
        if source.id.is_empty() || !seen.insert(source.id.clone()) {
            source.id = new_source_id();
            seen.insert(source.id.clone());
        }
    }
}

/// Rewrites `z_index` as 1..=N in list order.
pub fn reassign_z_indices(sources: &mut [Source]) {
    for (index, source) in sources.iter_mut().enumerate() {
        source.z_index = index as u32 + 1;
    }
}

/// Sorts by stacking order and makes it dense again.
pub fn sort_by_z_index(sources: &mut [Source]) {
    sources.sort_by_key(|source| source.z_index);
    reassign_z_indices(sources);
}

pub fn find_source<'a>(sources: &'a [Source], id: &str) -> Option<&'a Source> {
    sources.iter().find(|source| source.id == id)
}

pub fn find_source_mut<'a>(sources: &'a mut [Source], id: &str) -> Option<&'a mut Source> {
    sources.iter_mut().find(|source| source.id == id)
}
