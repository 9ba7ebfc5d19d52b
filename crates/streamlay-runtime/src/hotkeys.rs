use streamlay_core::{Error, HostEvent, HotkeyAction, host::HotkeyRegistrar};
use tauri::{AppHandle, Manager};
use tauri_plugin_global_shortcut::{GlobalShortcutExt, ShortcutState};
use tokio::sync::mpsc::UnboundedSender;
use tracing::{debug, warn};

use crate::frames::Frames;

/// Global shortcuts forwarded to the host inbox as `HostEvent::Hotkey`.
pub struct GlobalHotkeys {
    app: AppHandle,
    host: UnboundedSender<HostEvent>,
}

impl GlobalHotkeys {
    pub fn new(app: AppHandle, host: UnboundedSender<HostEvent>) -> Self {
        Self { app, host }
    }
}

impl HotkeyRegistrar for GlobalHotkeys {
    fn unregister_all(&self) -> Result<(), Error> {
        self.app
            .global_shortcut()
            .unregister_all()
            .map_err(|e| Error::Hotkey {
                combo: "*".to_string(),
                reason: e.to_string(),
            })
    }

    fn register(&self, combo: &str, action: HotkeyAction) -> Result<(), Error> {
        let host = self.host.clone();
        self.app
            .global_shortcut()
            .on_shortcut(combo, move |app, shortcut, event| {
                if event.state() != ShortcutState::Pressed {
                    return;
                }
                debug!(?shortcut, ?action, "hotkey pressed");
                if let Err(e) = host.send(HostEvent::Hotkey(action)) {
                    warn!(?action, error = %e, "hotkey dropped");
                }
                // Frame windows have no host-side menu state.
                if action == HotkeyAction::ToggleMenu {
                    app.state::<Frames>().toggle_menus();
                }
            })
            .map_err(|e| Error::Hotkey {
                combo: combo.to_string(),
                reason: e.to_string(),
            })
    }
}
