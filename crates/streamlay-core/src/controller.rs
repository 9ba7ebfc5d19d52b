//! The settings controller: the canonical, user-edited copy of the sources
//! and global settings.

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::{
    Error,
    embed::{alert_box_url, embed_url},
    geometry::Bounds,
    host::FALLBACK_WORK_AREA,
    model::{
        GlobalSettings, PersistedConfig, Source, SourceId, find_source_mut, reassign_z_indices,
        sort_by_z_index,
    },
    protocol::HostEvent,
};

pub const NEW_SOURCE_NAME: &str = "New Source";
pub const ALERT_BOX_NAME: &str = "Alert Box";
pub const ALERT_BOX_SIZE: (i32, i32) = (600, 400);
pub const NO_URL_MESSAGE: &str = "Please add at least one source with a URL";
pub const LAUNCHED_MESSAGE: &str = "Overlay launched";

const YOUTUBE_CSS: &str = r#"/* YouTube chat, minimal */
body { background-color: transparent !important; }
yt-live-chat-renderer { background-color: transparent !important; }
yt-live-chat-text-message-renderer {
    font-family: 'Inter', sans-serif;
    font-size: 14px;
    color: #ffffff !important;
    text-shadow: 1px 1px 2px rgba(0,0,0,0.8);
}
yt-live-chat-header-renderer,
yt-live-chat-message-input-renderer {
    display: none !important;
}"#;

const TWITCH_CSS: &str = r#"/* Twitch chat, minimal */
body { background-color: transparent !important; }
.chat-room { background: transparent !important; }
.chat-line__message {
    font-family: 'Inter', sans-serif;
    color: #ffffff !important;
    text-shadow: 1px 1px 2px rgba(0,0,0,0.8);
}
.stream-chat-header,
.chat-input {
    display: none !important;
}"#;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CssPreset {
    Youtube,
    Twitch,
    Clear,
}

impl CssPreset {
    pub fn css(self) -> &'static str {
        match self {
            CssPreset::Youtube => YOUTUBE_CSS,
            CssPreset::Twitch => TWITCH_CSS,
            CssPreset::Clear => "",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "message", rename_all = "lowercase")]
pub enum Status {
    Idle,
    Info(String),
    Error(String),
}

/// Fields the form edits. `None` leaves a field alone.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SourcePatch {
    pub name: Option<String>,
    pub url: Option<String>,
    pub css: Option<String>,
    pub opacity: Option<f64>,
    pub interact: Option<bool>,
    pub muted: Option<bool>,
    pub volume: Option<u32>,
    pub zoom: Option<f64>,
}

/// Snapshot the settings window renders from.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SettingsView {
    pub config: PersistedConfig,
    pub selected: Option<SourceId>,
    pub pending_delete: Option<SourceId>,
    pub status: Status,
}

#[derive(Debug, Clone)]
pub struct SettingsController {
    config: PersistedConfig,
    selected: Option<SourceId>,
    pending_delete: Option<SourceId>,
    status: Status,
}

impl Default for SettingsController {
    fn default() -> Self {
        Self {
            config: PersistedConfig::default(),
            selected: None,
            pending_delete: None,
            status: Status::Idle,
        }
    }
}

impl SettingsController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn view(&self) -> SettingsView {
        SettingsView {
            config: self.config.clone(),
            selected: self.selected.clone(),
            pending_delete: self.pending_delete.clone(),
            status: self.status.clone(),
        }
    }

    pub fn config(&self) -> &PersistedConfig {
        &self.config
    }

    /// Replaces everything with the document the host loaded.
    pub fn hydrate(&mut self, mut config: PersistedConfig) {
        config.normalize();
        sort_by_z_index(&mut config.sources);
        self.config = config;
        self.pending_delete = None;
        self.keep_selection_valid();
        debug!(sources = self.config.sources.len(), "settings hydrated");
    }

    pub fn add_source(&mut self) -> HostEvent {
        let source = Source::new(NEW_SOURCE_NAME);
        self.push_source(source)
    }

    /// Adds an alert box centred on `work_area`, which falls back to the
    /// default display area.
    pub fn add_alert_box(&mut self, token: &str, work_area: Option<Bounds>) -> HostEvent {
        let area = work_area.unwrap_or(FALLBACK_WORK_AREA);
        let (width, height) = ALERT_BOX_SIZE;

        let mut source = Source::new(ALERT_BOX_NAME);
        source.url = alert_box_url(token);
        source.set_bounds(Bounds::centered_in(&area, width, height));
        self.push_source(source)
    }

    pub fn select(&mut self, id: &str) -> Result<(), Error> {
        if !self.contains(id) {
            return Err(Error::SourceNotFound(id.to_string()));
        }
        self.selected = Some(id.to_string());
        Ok(())
    }

    pub fn update_source(&mut self, id: &str, patch: SourcePatch) -> Result<HostEvent, Error> {
        let source = find_source_mut(&mut self.config.sources, id)
            .ok_or_else(|| Error::SourceNotFound(id.to_string()))?;

        if let Some(name) = patch.name {
            source.name = name;
        }
        if let Some(url) = patch.url {
            source.url = embed_url(&url);
        }
        if let Some(css) = patch.css {
            source.css = css;
        }
        if let Some(opacity) = patch.opacity {
            source.set_opacity(opacity);
        }
        if let Some(interact) = patch.interact {
            source.interact = interact;
        }
        if let Some(muted) = patch.muted {
            source.audio.muted = muted;
        }
        if let Some(volume) = patch.volume {
            source.audio.volume = volume;
        }
        if let Some(zoom) = patch.zoom {
            source.zoom = zoom;
        }
        source.sanitize();

        Ok(self.realtime())
    }

    pub fn apply_css_preset(&mut self, id: &str, preset: CssPreset) -> Result<HostEvent, Error> {
        let patch = SourcePatch {
            css: Some(preset.css().to_string()),
            ..SourcePatch::default()
        };
        self.update_source(id, patch)
    }

    /// First step of a delete; nothing changes until confirmed.
    pub fn request_delete(&mut self, id: &str) -> Result<(), Error> {
        if !self.contains(id) {
            return Err(Error::SourceNotFound(id.to_string()));
        }
        self.pending_delete = Some(id.to_string());
        Ok(())
    }

    pub fn cancel_delete(&mut self) {
        self.pending_delete = None;
    }

    pub fn confirm_delete(&mut self) -> Option<HostEvent> {
        let id = self.pending_delete.take()?;
        let index = self.config.sources.iter().position(|s| s.id == id)?;

        self.config.sources.remove(index);
        reassign_z_indices(&mut self.config.sources);
        info!(id = %id, "source deleted");

        if self.selected.as_deref() == Some(id.as_str()) {
            let next = index.min(self.config.sources.len().saturating_sub(1));
            self.selected = self.config.sources.get(next).map(|s| s.id.clone());
        }
        Some(self.realtime())
    }

    /// Moves a source to `to` in stacking order (0 is the bottom).
    pub fn reorder(&mut self, id: &str, to: usize) -> Result<HostEvent, Error> {
        let from = self
            .config
            .sources
            .iter()
            .position(|s| s.id == id)
            .ok_or_else(|| Error::SourceNotFound(id.to_string()))?;

        let source = self.config.sources.remove(from);
        let to = to.min(self.config.sources.len());
        self.config.sources.insert(to, source);
        reassign_z_indices(&mut self.config.sources);
        Ok(self.realtime())
    }

    pub fn update_settings(&mut self, settings: GlobalSettings) -> HostEvent {
        self.config.settings = settings;
        self.realtime()
    }

    /// Validates and produces the launch message. On failure only the status
    /// line changes.
    pub fn launch(&mut self) -> Option<HostEvent> {
        let has_url = self
            .config
            .sources
            .iter()
            .any(|source| !source.url.trim().is_empty());

        if !has_url {
            self.status = Status::Error(NO_URL_MESSAGE.to_string());
            return None;
        }

        self.status = Status::Info(LAUNCHED_MESSAGE.to_string());
        Some(HostEvent::LaunchOverlay(self.config.clone()))
    }

    /// Adopts geometry and opacity reported by the overlay. Every other field
    /// stays as edited here.
    pub fn on_sources_modified(&mut self, sources: &[Source]) {
        for incoming in sources {
            if let Some(source) = find_source_mut(&mut self.config.sources, &incoming.id) {
                source.set_bounds(incoming.bounds());
                source.set_opacity(incoming.opacity);
            }
        }
    }

    pub fn close_app(&self) -> HostEvent {
        HostEvent::CloseApp
    }

    fn push_source(&mut self, mut source: Source) -> HostEvent {
        source.z_index = self.config.sources.len() as u32 + 1;
        self.selected = Some(source.id.clone());
        self.config.sources.push(source);
        self.realtime()
    }

    fn realtime(&mut self) -> HostEvent {
        self.status = Status::Idle;
        HostEvent::UpdateSourcesRealtime(self.config.clone())
    }

    fn contains(&self, id: &str) -> bool {
        self.config.sources.iter().any(|s| s.id == id)
    }

    fn keep_selection_valid(&mut self) {
        let valid = self
            .selected
            .as_deref()
            .is_some_and(|id| self.contains(id));
        if !valid {
            self.selected = self.config.sources.first().map(|s| s.id.clone());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn with_sources(n: usize) -> SettingsController {
        let mut controller = SettingsController::new();
        for _ in 0..n {
            controller.add_source();
        }
        controller
    }

    fn ids(controller: &SettingsController) -> Vec<SourceId> {
        controller.config().sources.iter().map(|s| s.id.clone()).collect()
    }

    fn z_indices(controller: &SettingsController) -> Vec<u32> {
        controller.config().sources.iter().map(|s| s.z_index).collect()
    }

    #[test]
    fn launch_without_url_only_sets_status() {
        let mut controller = with_sources(1);
        assert_eq!(controller.launch(), None);
        assert_eq!(controller.view().status, Status::Error(NO_URL_MESSAGE.to_string()));
    }

    #[test]
    fn launch_sends_the_whole_document() {
        let mut controller = with_sources(2);
        let id = ids(&controller)[1].clone();
        controller
            .update_source(
                &id,
                SourcePatch {
                    url: Some("https://www.twitch.tv/somechannel".into()),
                    ..SourcePatch::default()
                },
            )
            .unwrap();

        let Some(HostEvent::LaunchOverlay(config)) = controller.launch() else {
            panic!("expected launch");
        };
        assert_eq!(config.sources.len(), 2);
        assert_eq!(config.sources[1].url, "https://www.twitch.tv/popout/somechannel/chat");
        assert_eq!(controller.view().status, Status::Info(LAUNCHED_MESSAGE.to_string()));
    }

    #[test]
    fn new_sources_stack_on_top_and_get_selected() {
        let controller = with_sources(3);
        assert_eq!(z_indices(&controller), [1, 2, 3]);
        assert_eq!(controller.view().selected.as_ref(), ids(&controller).last());
        assert!(controller.config().sources.iter().all(|s| s.name == NEW_SOURCE_NAME));
    }

    #[test]
    fn delete_needs_confirmation() {
        let mut controller = with_sources(3);
        let all = ids(&controller);

        controller.request_delete(&all[1]).unwrap();
        controller.cancel_delete();
        assert_eq!(controller.confirm_delete(), None);
        assert_eq!(ids(&controller).len(), 3);

        controller.select(&all[1]).unwrap();
        controller.request_delete(&all[1]).unwrap();
        assert!(matches!(
            controller.confirm_delete(),
            Some(HostEvent::UpdateSourcesRealtime(_))
        ));
        assert_eq!(ids(&controller), [all[0].clone(), all[2].clone()]);
        assert_eq!(z_indices(&controller), [1, 2]);
        assert_eq!(controller.view().selected.as_ref(), Some(&all[2]));
    }

    #[test]
    fn reorder_keeps_z_indices_dense() {
        let mut controller = with_sources(4);
        let all = ids(&controller);

        controller.reorder(&all[3], 0).unwrap();
        controller.reorder(&all[0], 99).unwrap();

        assert_eq!(
            ids(&controller),
            [all[3].clone(), all[1].clone(), all[2].clone(), all[0].clone()]
        );
        assert_eq!(z_indices(&controller), [1, 2, 3, 4]);
        assert!(controller.reorder("missing", 0).is_err());
    }

    #[test]
    fn surface_reports_only_move_geometry_and_opacity() {
        let mut controller = with_sources(1);
        let id = ids(&controller)[0].clone();
        controller
            .update_source(
                &id,
                SourcePatch {
                    name: Some("Chat".into()),
                    ..SourcePatch::default()
                },
            )
            .unwrap();

        let mut reported = controller.config().sources[0].clone();
        reported.x = 640;
        reported.width = 20;
        reported.opacity = 0.4;
        reported.name = "stale".into();
        controller.on_sources_modified(&[reported]);

        let source = &controller.config().sources[0];
        assert_eq!(source.x, 640);
        assert_eq!(source.width, crate::geometry::SURFACE_MIN_SIZE);
        assert_eq!(source.opacity, 0.4);
        assert_eq!(source.name, "Chat");
    }

    #[test]
    fn alert_box_is_centered_on_the_work_area() {
        let mut controller = SettingsController::new();
        controller.add_alert_box("tok", Some(Bounds::new(0, 0, 1600, 900)));

        let source = &controller.config().sources[0];
        assert_eq!(source.bounds(), Bounds::new(500, 250, 600, 400));
        assert_eq!(source.url, "https://streamlabs.com/alert-box/v3/tok");
        assert_eq!(source.name, ALERT_BOX_NAME);
    }

    #[test]
    fn css_preset_replaces_stylesheet() {
        let mut controller = with_sources(1);
        let id = ids(&controller)[0].clone();
        controller.apply_css_preset(&id, CssPreset::Youtube).unwrap();
        assert!(controller.config().sources[0].css.contains("yt-live-chat-renderer"));
        controller.apply_css_preset(&id, CssPreset::Clear).unwrap();
        assert!(controller.config().sources[0].css.is_empty());
    }

    #[test]
    fn hydrate_sorts_and_selects_first() {
        let mut config = PersistedConfig::default();
        for (id, z) in [("top", 9), ("bottom", 2)] {
            config.sources.push(Source {
                id: id.to_string(),
                z_index: z,
                ..Source::default()
            });
        }

        let mut controller = SettingsController::new();
        controller.hydrate(config);
        assert_eq!(ids(&controller), ["bottom", "top"]);
        assert_eq!(z_indices(&controller), [1, 2]);
        assert_eq!(controller.view().selected.as_deref(), Some("bottom"));
    }
}
