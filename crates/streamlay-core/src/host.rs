//! The overlay host: owns the overlay window, hotkeys and the persisted
//! document, and relays messages between the settings window and the surface.

use std::collections::HashMap;
use std::time::Duration;

use tokio::sync::mpsc::UnboundedSender;
use tracing::{debug, error, info, warn};

use crate::{
    Error,
    config::ConfigStore,
    geometry::{Bounds, WINDOW_MIN_SIZE},
    model::{GlobalSettings, PersistedConfig, Source, normalize_sources},
    protocol::{Dispatch, HostEvent, HotkeyAction, IgnoreMouse, SettingsEvent, SurfaceEvent},
    schedule::DebouncedTask,
};

pub const OVERLAY_LABEL: &str = "overlay";
pub const DEFAULT_PERSIST_DELAY: Duration = Duration::from_millis(500);
/// Used when the primary display cannot be queried.
pub const FALLBACK_WORK_AREA: Bounds = Bounds::new(0, 0, 1920, 1080);

/// Native window primitives, addressed by window label.
pub trait WindowBackend {
    fn window_exists(&self, label: &str) -> bool;
    /// Creates the borderless, transparent, always-on-top overlay.
    fn create_overlay(&self, label: &str, bounds: Bounds) -> Result<(), Error>;
    fn bounds(&self, label: &str) -> Result<Bounds, Error>;
    fn set_bounds(&self, label: &str, bounds: Bounds) -> Result<(), Error>;
    fn set_click_through(&self, label: &str, click_through: bool) -> Result<(), Error>;
    /// Excludes the window from screen capture.
    fn set_content_protected(&self, label: &str, protected: bool) -> Result<(), Error>;
    fn primary_work_area(&self) -> Option<Bounds>;
}

pub trait HotkeyRegistrar {
    fn unregister_all(&self) -> Result<(), Error>;
    fn register(&self, combo: &str, action: HotkeyAction) -> Result<(), Error>;
}

pub struct OverlayHost<W, K, S> {
    config: PersistedConfig,
    windows: W,
    hotkeys: K,
    store: S,
    inbox: UnboundedSender<HostEvent>,
    persist: DebouncedTask,
    persist_delay: Duration,
    dirty: bool,
    menu_open: bool,
    edit_mode: bool,
    settings_open: bool,
    click_through: HashMap<String, bool>,
}

impl<W, K, S> OverlayHost<W, K, S>
where
    W: WindowBackend,
    K: HotkeyRegistrar,
    S: ConfigStore,
{
    /// Loads the persisted document. `inbox` is the host's own inbox, used to
    /// deliver debounce deadlines.
    pub fn new(windows: W, hotkeys: K, store: S, inbox: UnboundedSender<HostEvent>) -> Self {
        let config = store.load();
        info!(sources = config.sources.len(), "host started");

        Self {
            config,
            windows,
            hotkeys,
            store,
            inbox,
            persist: DebouncedTask::new(),
            persist_delay: DEFAULT_PERSIST_DELAY,
            dirty: false,
            menu_open: false,
            edit_mode: false,
            settings_open: false,
            click_through: HashMap::new(),
        }
    }

    pub fn with_persist_delay(mut self, delay: Duration) -> Self {
        self.persist_delay = delay;
        self
    }

    pub fn config(&self) -> &PersistedConfig {
        &self.config
    }

    pub fn windows(&self) -> &W {
        &self.windows
    }

    /// Registers the configured hotkeys. Called once at startup.
    pub fn start(&mut self) {
        self.register_hotkeys();
    }

    pub fn handle(&mut self, event: HostEvent) -> Vec<Dispatch> {
        debug!(event = event.name(), "host event");

        match event {
            HostEvent::LaunchOverlay(config) => self.launch(config),
            HostEvent::UpdateSourcesRealtime(config) => self.update_realtime(config),
            HostEvent::CloseApp => self.close_app(),
            HostEvent::SourcesModified(sources) => self.sources_modified(sources),
            HostEvent::MenuOpened => {
                self.menu_open = true;
                self.set_overlay_click_through(false);
                Vec::new()
            }
            HostEvent::MenuClosed => {
                self.menu_open = false;
                self.set_overlay_click_through(!self.edit_mode);
                Vec::new()
            }
            HostEvent::SetIgnoreMouse(request) => {
                self.hover_request(request);
                Vec::new()
            }
            HostEvent::EditModeChanged(active) => {
                self.edit_mode = active;
                self.set_overlay_click_through(!(active || self.menu_open));
                Vec::new()
            }
            HostEvent::OverlayMove { window, delta } => {
                self.update_bounds(&window, |bounds| {
                    Ok(Bounds {
                        x: bounds.x + delta.x,
                        y: bounds.y + delta.y,
                        ..bounds
                    })
                });
                Vec::new()
            }
            HostEvent::OverlayResize { window, delta } => {
                self.update_bounds(&window, |bounds| {
                    Ok(bounds.resized(delta.x, delta.y, delta.edge, WINDOW_MIN_SIZE))
                });
                Vec::new()
            }
            HostEvent::TrimResize { window, delta } => {
                self.update_bounds(&window, |bounds| {
                    bounds.trimmed(delta.x, delta.y, delta.width, delta.height, WINDOW_MIN_SIZE)
                });
                Vec::new()
            }
            HostEvent::ToggleClickThrough { window } => {
                let next = !self.click_through_preference(&window);
                self.set_click_through(&window, next);
                Vec::new()
            }
            HostEvent::FrameMenu { window, open } => {
                // An open menu must be clickable; closing restores the preference.
                let click_through = !open && self.click_through_preference(&window);
                if let Err(e) = self.windows.set_click_through(&window, click_through) {
                    error!(window = %window, error = %e, "failed to set click-through");
                }
                Vec::new()
            }
            HostEvent::Hotkey(HotkeyAction::ToggleMenu) | HostEvent::ToggleMenu => {
                self.to_overlay(SurfaceEvent::ToggleMenu)
            }
            HostEvent::Hotkey(HotkeyAction::ToggleSources) | HostEvent::ToggleSourcesVisibility => {
                self.to_overlay(SurfaceEvent::ToggleSourcesVisibility)
            }
            HostEvent::ToggleEditMode => {
                if !self.windows.window_exists(OVERLAY_LABEL) {
                    debug!("edit mode toggle ignored, no overlay");
                    return Vec::new();
                }
                self.edit_mode = !self.edit_mode;
                self.set_overlay_click_through(!(self.edit_mode || self.menu_open));
                self.to_overlay(SurfaceEvent::ToggleEditMode(self.edit_mode))
            }
            HostEvent::SettingsOpened => {
                self.settings_open = true;
                vec![Dispatch::Settings(SettingsEvent::LoadSettings(self.config.clone()))]
            }
            HostEvent::SettingsClosed => {
                self.settings_open = false;
                Vec::new()
            }
            HostEvent::PersistDue => {
                if self.dirty {
                    self.persist_now();
                }
                Vec::new()
            }
        }
    }

    fn launch(&mut self, mut config: PersistedConfig) -> Vec<Dispatch> {
        config.normalize();
        self.config = config;
        info!(sources = self.config.sources.len(), "launching overlay");

        self.persist_now();
        self.register_hotkeys();

        if !self.ensure_overlay() {
            return Vec::new();
        }
        self.apply_window_settings();

        vec![Dispatch::Surface(SurfaceEvent::UpdateSources(
            self.config.sources.clone(),
        ))]
    }

    fn update_realtime(&mut self, mut config: PersistedConfig) -> Vec<Dispatch> {
        config.normalize();
        let previous = std::mem::replace(&mut self.config, config);
        self.schedule_persist();

        if previous.settings.shortcuts_differ(&self.config.settings) {
            self.register_hotkeys();
        }
        if previous.settings.hide_from_obs != self.config.settings.hide_from_obs {
            self.apply_window_settings();
        }

        vec![Dispatch::Surface(SurfaceEvent::UpdateSources(
            self.config.sources.clone(),
        ))]
    }

    fn sources_modified(&mut self, mut sources: Vec<Source>) -> Vec<Dispatch> {
        normalize_sources(&mut sources);
        self.config.sources = sources;
        self.schedule_persist();

        if self.settings_open {
            vec![Dispatch::Settings(SettingsEvent::SourcesModified(
                self.config.sources.clone(),
            ))]
        } else {
            Vec::new()
        }
    }

    fn close_app(&mut self) -> Vec<Dispatch> {
        if self.persist.cancel() || self.dirty {
            self.persist_now();
        }
        if let Err(e) = self.hotkeys.unregister_all() {
            warn!(error = %e, "failed to unregister hotkeys");
        }
        info!("closing");
        vec![Dispatch::Exit]
    }

    fn hover_request(&mut self, request: IgnoreMouse) {
        if self.menu_open || self.edit_mode {
            return;
        }
        self.set_overlay_click_through(request.ignore);
    }

    fn to_overlay(&self, event: SurfaceEvent) -> Vec<Dispatch> {
        if self.windows.window_exists(OVERLAY_LABEL) {
            vec![Dispatch::Surface(event)]
        } else {
            Vec::new()
        }
    }

    fn ensure_overlay(&mut self) -> bool {
        if self.windows.window_exists(OVERLAY_LABEL) {
            return true;
        }

        let area = self.windows.primary_work_area().unwrap_or_else(|| {
            warn!("primary display unavailable, using fallback bounds");
            FALLBACK_WORK_AREA
        });

        if let Err(e) = self.windows.create_overlay(OVERLAY_LABEL, area) {
            error!(error = %e, "failed to create overlay window");
            return false;
        }
        info!(?area, "overlay window created");

        // A fresh surface starts with its menu closed and edit mode off.
        self.menu_open = false;
        self.edit_mode = false;
        self.set_click_through(OVERLAY_LABEL, true);
        true
    }

    fn apply_window_settings(&self) {
        if !self.windows.window_exists(OVERLAY_LABEL) {
            return;
        }
        let protected = self.config.settings.hide_from_obs;
        if let Err(e) = self.windows.set_content_protected(OVERLAY_LABEL, protected) {
            error!(error = %e, "failed to set content protection");
        }
    }

    fn set_overlay_click_through(&mut self, click_through: bool) {
        if self.windows.window_exists(OVERLAY_LABEL) {
            self.set_click_through(OVERLAY_LABEL, click_through);
        }
    }

    fn click_through_preference(&self, label: &str) -> bool {
        self.click_through.get(label).copied().unwrap_or(true)
    }

    fn set_click_through(&mut self, label: &str, click_through: bool) {
        match self.windows.set_click_through(label, click_through) {
            Ok(()) => {
                self.click_through.insert(label.to_string(), click_through);
            }
            Err(e) => error!(window = label, error = %e, "failed to set click-through"),
        }
    }

    fn update_bounds(&self, label: &str, next: impl FnOnce(Bounds) -> Result<Bounds, Error>) {
        let result = self
            .windows
            .bounds(label)
            .and_then(next)
            .and_then(|bounds| self.windows.set_bounds(label, bounds));

        if let Err(e) = result {
            warn!(window = label, error = %e, "window geometry update rejected");
        }
    }

    fn register_hotkeys(&self) {
        if let Err(e) = self.hotkeys.unregister_all() {
            warn!(error = %e, "failed to unregister hotkeys");
        }

        let GlobalSettings {
            menu_shortcut,
            toggle_shortcut,
            ..
        } = &self.config.settings;

        for (combo, action) in [
            (menu_shortcut, HotkeyAction::ToggleMenu),
            (toggle_shortcut, HotkeyAction::ToggleSources),
        ] {
            if combo.trim().is_empty() {
                continue;
            }
            match self.hotkeys.register(combo, action) {
                Ok(()) => debug!(combo = %combo, ?action, "hotkey registered"),
                Err(e) => warn!(combo = %combo, error = %e, "hotkey registration failed"),
            }
        }
    }

    fn schedule_persist(&mut self) {
        self.dirty = true;
        let inbox = self.inbox.clone();
        self.persist.arm(self.persist_delay, async move {
            let _ = inbox.send(HostEvent::PersistDue);
        });
    }

    fn persist_now(&mut self) {
        self.persist.cancel();
        self.dirty = false;
        if let Err(e) = self.store.save(&self.config) {
            error!(error = %e, "failed to save config");
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use tokio::sync::mpsc::{self, UnboundedReceiver};

    use super::*;
    use crate::gesture::{MoveDelta, ResizeDelta, TrimDelta};
    use crate::geometry::Handle;

    #[derive(Clone, Default)]
    struct MockWindows {
        calls: Arc<Mutex<Vec<String>>>,
        windows: Arc<Mutex<HashMap<String, Bounds>>>,
        work_area: Option<Bounds>,
    }

    impl MockWindows {
        fn record(&self, call: String) {
            self.calls.lock().unwrap().push(call);
        }

        fn calls(&self) -> Vec<String> {
            std::mem::take(&mut *self.calls.lock().unwrap())
        }

        fn bounds_of(&self, label: &str) -> Bounds {
            self.windows.lock().unwrap()[label]
        }
    }

    impl WindowBackend for MockWindows {
        fn window_exists(&self, label: &str) -> bool {
            self.windows.lock().unwrap().contains_key(label)
        }

        fn create_overlay(&self, label: &str, bounds: Bounds) -> Result<(), Error> {
            self.record(format!("create:{label}"));
            self.windows.lock().unwrap().insert(label.to_string(), bounds);
            Ok(())
        }

        fn bounds(&self, label: &str) -> Result<Bounds, Error> {
            self.windows
                .lock()
                .unwrap()
                .get(label)
                .copied()
                .ok_or_else(|| Error::WindowNotFound(label.to_string()))
        }

        fn set_bounds(&self, label: &str, bounds: Bounds) -> Result<(), Error> {
            self.record(format!("bounds:{label}"));
            self.windows.lock().unwrap().insert(label.to_string(), bounds);
            Ok(())
        }

        fn set_click_through(&self, label: &str, click_through: bool) -> Result<(), Error> {
            self.record(format!("click-through:{label}:{click_through}"));
            Ok(())
        }

        fn set_content_protected(&self, label: &str, protected: bool) -> Result<(), Error> {
            self.record(format!("protected:{label}:{protected}"));
            Ok(())
        }

        fn primary_work_area(&self) -> Option<Bounds> {
            self.work_area
        }
    }

    #[derive(Clone, Default)]
    struct MockHotkeys {
        calls: Arc<Mutex<Vec<String>>>,
        failing: Option<String>,
    }

    impl HotkeyRegistrar for MockHotkeys {
        fn unregister_all(&self) -> Result<(), Error> {
            self.calls.lock().unwrap().push("unregister-all".to_string());
            Ok(())
        }

        fn register(&self, combo: &str, _: HotkeyAction) -> Result<(), Error> {
            if self.failing.as_deref() == Some(combo) {
                return Err(Error::Hotkey {
                    combo: combo.to_string(),
                    reason: "taken".to_string(),
                });
            }
            self.calls.lock().unwrap().push(format!("register:{combo}"));
            Ok(())
        }
    }

    #[derive(Clone, Default)]
    struct MemoryStore {
        saved: Arc<Mutex<Vec<PersistedConfig>>>,
    }

    impl ConfigStore for MemoryStore {
        fn load(&self) -> PersistedConfig {
            PersistedConfig::default()
        }

        fn save(&self, config: &PersistedConfig) -> Result<(), Error> {
            self.saved.lock().unwrap().push(config.clone());
            Ok(())
        }
    }

    struct Harness {
        host: OverlayHost<MockWindows, MockHotkeys, MemoryStore>,
        windows: MockWindows,
        hotkeys: MockHotkeys,
        store: MemoryStore,
        inbox: UnboundedReceiver<HostEvent>,
    }

    impl Harness {
        fn new() -> Self {
            Self::with(
                MockWindows {
                    work_area: Some(Bounds::new(0, 25, 2560, 1415)),
                    ..MockWindows::default()
                },
                MockHotkeys::default(),
            )
        }

        fn with(windows: MockWindows, hotkeys: MockHotkeys) -> Self {
            let store = MemoryStore::default();
            let (tx, inbox) = mpsc::unbounded_channel();
            let host = OverlayHost::new(windows.clone(), hotkeys.clone(), store.clone(), tx);
            Self {
                host,
                windows,
                hotkeys,
                store,
                inbox,
            }
        }

        fn saves(&self) -> usize {
            self.store.saved.lock().unwrap().len()
        }

        fn launch(&mut self, config: PersistedConfig) -> Vec<Dispatch> {
            self.host.handle(HostEvent::LaunchOverlay(config))
        }

        /// Feeds any fired debounce deadlines back into the host.
        fn pump(&mut self) {
            while let Ok(event) = self.inbox.try_recv() {
                self.host.handle(event);
            }
        }
    }

    fn config_with(urls: &[&str]) -> PersistedConfig {
        let mut config = PersistedConfig::default();
        for url in urls {
            let mut source = Source::new("Chat");
            source.url = url.to_string();
            config.sources.push(source);
        }
        config
    }

    #[test]
    fn launch_creates_overlay_and_pushes_sources() {
        let mut h = Harness::new();
        let out = h.launch(config_with(&["https://a"]));

        assert_eq!(h.saves(), 1);
        assert_eq!(h.windows.bounds_of(OVERLAY_LABEL), Bounds::new(0, 25, 2560, 1415));
        assert_eq!(
            h.windows.calls(),
            [
                "create:overlay",
                "click-through:overlay:true",
                "protected:overlay:false"
            ]
        );
        assert_eq!(
            *h.hotkeys.calls.lock().unwrap(),
            ["unregister-all", "register:Shift+F1"]
        );
        let [Dispatch::Surface(SurfaceEvent::UpdateSources(sources))] = out.as_slice() else {
            panic!("unexpected dispatch {out:?}");
        };
        assert_eq!(sources[0].url, "https://a");
    }

    #[test]
    fn second_launch_reuses_the_window() {
        let mut h = Harness::new();
        h.launch(config_with(&["https://a"]));
        h.windows.calls();

        let mut config = config_with(&["https://a"]);
        config.settings.hide_from_obs = true;
        h.launch(config);

        assert_eq!(h.windows.calls(), ["protected:overlay:true"]);
        assert_eq!(h.saves(), 2);
    }

    #[test]
    fn missing_display_falls_back_to_default_area() {
        let mut h = Harness::with(MockWindows::default(), MockHotkeys::default());
        h.launch(PersistedConfig::default());
        assert_eq!(h.windows.bounds_of(OVERLAY_LABEL), FALLBACK_WORK_AREA);
    }

    #[test]
    fn failed_hotkey_is_not_fatal() {
        let hotkeys = MockHotkeys {
            failing: Some("Shift+F1".to_string()),
            ..MockHotkeys::default()
        };
        let mut h = Harness::with(MockWindows::default(), hotkeys);
        let mut config = config_with(&["https://a"]);
        config.settings.toggle_shortcut = "Alt+H".to_string();

        let out = h.launch(config);
        assert_eq!(out.len(), 1);
        assert_eq!(*h.hotkeys.calls.lock().unwrap(), ["unregister-all", "register:Alt+H"]);
    }

    #[tokio::test(start_paused = true)]
    async fn realtime_updates_are_saved_once_after_debounce() {
        let mut h = Harness::new();
        h.launch(config_with(&["https://a"]));
        assert_eq!(h.saves(), 1);

        for url in ["https://b", "https://c", "https://d"] {
            let out = h.host.handle(HostEvent::UpdateSourcesRealtime(config_with(&[url])));
            assert_eq!(out.len(), 1);
            tokio::time::sleep(Duration::from_millis(100)).await;
            h.pump();
        }
        assert_eq!(h.saves(), 1);

        tokio::time::sleep(DEFAULT_PERSIST_DELAY).await;
        h.pump();
        assert_eq!(h.saves(), 2);
        assert_eq!(h.store.saved.lock().unwrap()[1].sources[0].url, "https://d");
    }

    #[tokio::test(start_paused = true)]
    async fn launch_cancels_pending_debounced_write() {
        let mut h = Harness::new();
        h.host.handle(HostEvent::SourcesModified(config_with(&["https://a"]).sources));
        h.launch(config_with(&["https://b"]));
        assert_eq!(h.saves(), 1);

        tokio::time::sleep(DEFAULT_PERSIST_DELAY * 2).await;
        h.pump();
        assert_eq!(h.saves(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn close_app_flushes_and_unregisters() {
        let mut h = Harness::new();
        h.host.handle(HostEvent::SourcesModified(config_with(&["https://a"]).sources));
        h.hotkeys.calls.lock().unwrap().clear();

        let out = h.host.handle(HostEvent::CloseApp);
        assert_eq!(out, [Dispatch::Exit]);
        assert_eq!(h.saves(), 1);
        assert_eq!(*h.hotkeys.calls.lock().unwrap(), ["unregister-all"]);
    }

    #[tokio::test(start_paused = true)]
    async fn sources_modified_reaches_settings_only_when_open() {
        let mut h = Harness::new();
        let sources = config_with(&["https://a"]).sources;

        assert!(h.host.handle(HostEvent::SourcesModified(sources.clone())).is_empty());

        let out = h.host.handle(HostEvent::SettingsOpened);
        assert!(matches!(
            out.as_slice(),
            [Dispatch::Settings(SettingsEvent::LoadSettings(config))] if config.sources == sources
        ));

        let out = h.host.handle(HostEvent::SourcesModified(sources.clone()));
        assert_eq!(
            out,
            [Dispatch::Settings(SettingsEvent::SourcesModified(sources))]
        );
    }

    #[test]
    fn menu_and_edit_mode_keep_the_window_interactive() {
        let mut h = Harness::new();
        h.launch(PersistedConfig::default());
        h.windows.calls();

        h.host.handle(HostEvent::MenuOpened);
        h.host.handle(HostEvent::SetIgnoreMouse(IgnoreMouse::PASS_THROUGH));
        h.host.handle(HostEvent::EditModeChanged(true));
        h.host.handle(HostEvent::MenuClosed);
        assert_eq!(
            h.windows.calls(),
            [
                "click-through:overlay:false",
                "click-through:overlay:false",
                "click-through:overlay:false"
            ]
        );

        h.host.handle(HostEvent::EditModeChanged(false));
        h.host.handle(HostEvent::SetIgnoreMouse(IgnoreMouse::INTERACTIVE));
        assert_eq!(
            h.windows.calls(),
            ["click-through:overlay:true", "click-through:overlay:false"]
        );
    }

    #[test]
    fn tray_edit_mode_toggle_reaches_surface() {
        let mut h = Harness::new();
        h.launch(PersistedConfig::default());

        let out = h.host.handle(HostEvent::ToggleEditMode);
        assert_eq!(out, [Dispatch::Surface(SurfaceEvent::ToggleEditMode(true))]);
        let out = h.host.handle(HostEvent::ToggleEditMode);
        assert_eq!(out, [Dispatch::Surface(SurfaceEvent::ToggleEditMode(false))]);
    }

    #[test]
    fn edit_mode_toggle_before_launch_keeps_overlay_click_through() {
        let mut h = Harness::new();
        assert!(h.host.handle(HostEvent::ToggleEditMode).is_empty());

        h.launch(PersistedConfig::default());
        assert_eq!(
            h.windows.calls(),
            [
                "create:overlay",
                "click-through:overlay:true",
                "protected:overlay:false"
            ]
        );

        h.host.handle(HostEvent::SetIgnoreMouse(IgnoreMouse::INTERACTIVE));
        assert_eq!(h.windows.calls(), ["click-through:overlay:false"]);

        let out = h.host.handle(HostEvent::ToggleEditMode);
        assert_eq!(out, [Dispatch::Surface(SurfaceEvent::ToggleEditMode(true))]);
    }

    #[test]
    fn hotkeys_are_dropped_without_overlay() {
        let mut h = Harness::new();
        assert!(h.host.handle(HostEvent::Hotkey(HotkeyAction::ToggleMenu)).is_empty());

        h.launch(PersistedConfig::default());
        assert_eq!(
            h.host.handle(HostEvent::Hotkey(HotkeyAction::ToggleSources)),
            [Dispatch::Surface(SurfaceEvent::ToggleSourcesVisibility)]
        );
    }

    #[test]
    fn legacy_frame_deltas_move_the_sending_window() {
        let mut h = Harness::new();
        h.windows
            .windows
            .lock()
            .unwrap()
            .insert("frame".to_string(), Bounds::new(100, 100, 300, 300));

        h.host.handle(HostEvent::OverlayMove {
            window: "frame".into(),
            delta: MoveDelta { x: 5, y: -5 },
        });
        assert_eq!(h.windows.bounds_of("frame"), Bounds::new(105, 95, 300, 300));

        h.host.handle(HostEvent::OverlayResize {
            window: "frame".into(),
            delta: ResizeDelta {
                x: 250,
                y: 0,
                edge: Handle::W.edges(),
            },
        });
        assert_eq!(h.windows.bounds_of("frame"), Bounds::new(355, 95, WINDOW_MIN_SIZE, 300));
    }

    #[test]
    fn invalid_trim_keeps_last_bounds() {
        let mut h = Harness::new();
        let start = Bounds::new(0, 0, 300, 300);
        h.windows.windows.lock().unwrap().insert("frame".to_string(), start);

        h.host.handle(HostEvent::TrimResize {
            window: "frame".into(),
            delta: TrimDelta {
                x: 0,
                y: 0,
                width: -300,
                height: 0,
            },
        });
        assert_eq!(h.windows.bounds_of("frame"), start);
        assert!(h.windows.calls().is_empty());
    }

    #[test]
    fn click_through_toggle_flips_per_window() {
        let mut h = Harness::new();
        h.windows
            .windows
            .lock()
            .unwrap()
            .insert("frame".to_string(), Bounds::new(0, 0, 300, 300));

        h.host.handle(HostEvent::ToggleClickThrough { window: "frame".into() });
        h.host.handle(HostEvent::ToggleClickThrough { window: "frame".into() });
        assert_eq!(
            h.windows.calls(),
            ["click-through:frame:false", "click-through:frame:true"]
        );
    }

    #[test]
    fn frame_menu_restores_click_through_preference() {
        let mut h = Harness::new();
        h.windows
            .windows
            .lock()
            .unwrap()
            .insert("frame".to_string(), Bounds::new(0, 0, 300, 300));

        let menu = |open| HostEvent::FrameMenu {
            window: "frame".into(),
            open,
        };
        h.host.handle(menu(true));
        h.host.handle(menu(false));
        h.host.handle(HostEvent::ToggleClickThrough { window: "frame".into() });
        h.host.handle(menu(true));
        h.host.handle(menu(false));

        assert_eq!(
            h.windows.calls(),
            [
                "click-through:frame:false",
                "click-through:frame:true",
                "click-through:frame:false",
                "click-through:frame:false",
                "click-through:frame:false"
            ]
        );
    }
}
