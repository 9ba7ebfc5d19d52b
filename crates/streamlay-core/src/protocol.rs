//! Messages exchanged between the settings window, the host and the overlay.
//!
//! On the wire every message is `{ "event": <kebab-case name>, "payload": ... }`;
//! messages without a payload omit the field.

use serde::{Deserialize, Serialize};

use crate::{
    gesture::{MoveDelta, ResizeDelta, TrimDelta},
    model::{PersistedConfig, Source},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct IgnoreMouse {
    pub ignore: bool,
    /// Keep forwarding pointer moves while ignoring clicks, so hover
    /// detection keeps working.
    pub forward: bool,
}

impl IgnoreMouse {
    pub const PASS_THROUGH: IgnoreMouse = IgnoreMouse {
        ignore: true,
        forward: true,
    };
    pub const INTERACTIVE: IgnoreMouse = IgnoreMouse {
        ignore: false,
        forward: false,
    };
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum HotkeyAction {
    ToggleMenu,
    ToggleSources,
}

/// Everything the host reacts to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", content = "payload", rename_all = "kebab-case")]
pub enum HostEvent {
    // from the settings window
    LaunchOverlay(PersistedConfig),
    UpdateSourcesRealtime(PersistedConfig),
    CloseApp,

    // from the render surface
    SourcesModified(Vec<Source>),
    MenuOpened,
    MenuClosed,
    SetIgnoreMouse(IgnoreMouse),
    EditModeChanged(bool),

    // from a legacy frame window
    OverlayMove { window: String, delta: MoveDelta },
    OverlayResize { window: String, delta: ResizeDelta },
    TrimResize { window: String, delta: TrimDelta },
    ToggleClickThrough { window: String },
    FrameMenu { window: String, open: bool },

    // from the runtime
    Hotkey(HotkeyAction),
    ToggleEditMode,
    ToggleSourcesVisibility,
    ToggleMenu,
    SettingsOpened,
    SettingsClosed,

    /// The debounce window for a pending write has elapsed.
    #[serde(skip)]
    PersistDue,
}

/// Host to render surface.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", content = "payload", rename_all = "kebab-case")]
pub enum SurfaceEvent {
    UpdateSources(Vec<Source>),
    ToggleMenu,
    ToggleEditMode(bool),
    ToggleSourcesVisibility,
}

/// Host to settings window.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", content = "payload", rename_all = "kebab-case")]
pub enum SettingsEvent {
    LoadSettings(PersistedConfig),
    SourcesModified(Vec<Source>),
}

/// Where the host routes its output.
#[derive(Debug, Clone, PartialEq)]
pub enum Dispatch {
    Surface(SurfaceEvent),
    Settings(SettingsEvent),
    Exit,
}

impl HostEvent {
    pub fn name(&self) -> &'static str {
        match self {
            HostEvent::LaunchOverlay(_) => "launch-overlay",
            HostEvent::UpdateSourcesRealtime(_) => "update-sources-realtime",
            HostEvent::CloseApp => "close-app",
            HostEvent::SourcesModified(_) => "sources-modified",
            HostEvent::MenuOpened => "menu-opened",
            HostEvent::MenuClosed => "menu-closed",
            HostEvent::SetIgnoreMouse(_) => "set-ignore-mouse",
            HostEvent::EditModeChanged(_) => "edit-mode-changed",
            HostEvent::OverlayMove { .. } => "overlay-move",
            HostEvent::OverlayResize { .. } => "overlay-resize",
            HostEvent::TrimResize { .. } => "trim-resize",
            HostEvent::ToggleClickThrough { .. } => "toggle-click-through",
            HostEvent::FrameMenu { .. } => "frame-menu",
            HostEvent::Hotkey(_) => "hotkey",
            HostEvent::ToggleEditMode => "toggle-edit-mode",
            HostEvent::ToggleSourcesVisibility => "toggle-sources-visibility",
            HostEvent::ToggleMenu => "toggle-menu",
            HostEvent::SettingsOpened => "settings-opened",
            HostEvent::SettingsClosed => "settings-closed",
            HostEvent::PersistDue => "persist-due",
        }
    }
}
