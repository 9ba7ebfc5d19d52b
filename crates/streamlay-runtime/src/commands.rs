use std::sync::{Mutex, MutexGuard};

use streamlay_core::{
    Error, GlobalSettings, HostEvent, SettingsEvent, SourceId, find_source,
    controller::{CssPreset, SettingsController, SettingsView, SourcePatch},
    frame::{FrameChrome, FrameMenuAction, FramePointer},
    host::WindowBackend,
    surface::{MenuAction, PointerInput, SurfaceInput},
};
use tauri::{AppHandle, Emitter, Manager, State, WebviewWindow, command};
use tauri_plugin_dialog::{DialogExt, MessageDialogButtons, MessageDialogKind};
use tokio::sync::mpsc::UnboundedSender;
use tracing::{error, warn};

use crate::{SETTINGS_LABEL, frames, overlay::TauriWindowBackend};

pub struct HostInbox(pub UnboundedSender<HostEvent>);
pub struct SurfaceInbox(pub UnboundedSender<SurfaceInput>);
#[derive(Default)]
pub struct SettingsState(pub Mutex<SettingsController>);

impl HostInbox {
    pub fn send(&self, event: HostEvent) -> Result<(), Error> {
        self.0.send(event).map_err(|_| Error::ChannelClosed("host"))
    }
}

impl SurfaceInbox {
    fn send(&self, input: SurfaceInput) -> Result<(), String> {
        self.0
            .send(input)
            .map_err(|_| Error::ChannelClosed("surface").to_string())
    }
}

impl SettingsState {
    fn lock(&self) -> Result<MutexGuard<'_, SettingsController>, String> {
        self.0.lock().map_err(|e| e.to_string())
    }

    /// Applies an edit and forwards the message it produced to the host.
    fn edit(
        &self,
        host: &HostInbox,
        f: impl FnOnce(&mut SettingsController) -> Result<Option<HostEvent>, Error>,
    ) -> Result<SettingsView, String> {
        let mut controller = self.lock()?;
        if let Some(event) = f(&mut controller).map_err(|e| e.to_string())? {
            host.send(event).map_err(|e| e.to_string())?;
        }
        Ok(controller.view())
    }
}

/// Applies a host message to the settings controller and re-renders the form.
pub fn deliver_settings(app: &AppHandle, event: SettingsEvent) {
    let state = app.state::<SettingsState>();
    let view = match state.0.lock() {
        Ok(mut controller) => {
            match event {
                SettingsEvent::LoadSettings(config) => controller.hydrate(config),
                SettingsEvent::SourcesModified(sources) => controller.on_sources_modified(&sources),
            }
            controller.view()
        }
        Err(e) => {
            error!(error = %e, "settings state poisoned");
            return;
        }
    };
    emit_view(app, view);
}

fn emit_view(app: &AppHandle, view: SettingsView) {
    if let Err(e) = app.emit_to(SETTINGS_LABEL, "settings-view", view) {
        warn!(error = %e, "failed to refresh settings window");
    }
}

// Settings window

#[command]
pub fn settings_view(state: State<'_, SettingsState>) -> Result<SettingsView, String> {
    Ok(state.lock()?.view())
}

#[command]
pub fn settings_add_source(
    state: State<'_, SettingsState>,
    host: State<'_, HostInbox>,
) -> Result<SettingsView, String> {
    state.edit(&host, |c| Ok(Some(c.add_source())))
}

#[command]
pub fn settings_add_alert_box(
    app: AppHandle,
    state: State<'_, SettingsState>,
    host: State<'_, HostInbox>,
    token: String,
) -> Result<SettingsView, String> {
    let work_area = TauriWindowBackend::new(app).primary_work_area();
    state.edit(&host, |c| Ok(Some(c.add_alert_box(&token, work_area))))
}

#[command]
pub fn settings_select(state: State<'_, SettingsState>, id: SourceId) -> Result<SettingsView, String> {
    let mut controller = state.lock()?;
    controller.select(&id).map_err(|e| e.to_string())?;
    Ok(controller.view())
}

#[command]
pub fn settings_update_source(
    state: State<'_, SettingsState>,
    host: State<'_, HostInbox>,
    id: SourceId,
    patch: SourcePatch,
) -> Result<SettingsView, String> {
    state.edit(&host, |c| c.update_source(&id, patch).map(Some))
}

#[command]
pub fn settings_apply_css_preset(
    state: State<'_, SettingsState>,
    host: State<'_, HostInbox>,
    id: SourceId,
    preset: CssPreset,
) -> Result<SettingsView, String> {
    state.edit(&host, |c| c.apply_css_preset(&id, preset).map(Some))
}

#[command]
pub fn settings_reorder(
    state: State<'_, SettingsState>,
    host: State<'_, HostInbox>,
    id: SourceId,
    to: usize,
) -> Result<SettingsView, String> {
    state.edit(&host, |c| c.reorder(&id, to).map(Some))
}

#[command]
pub fn settings_update_settings(
    state: State<'_, SettingsState>,
    host: State<'_, HostInbox>,
    settings: GlobalSettings,
) -> Result<SettingsView, String> {
    state.edit(&host, |c| Ok(Some(c.update_settings(settings))))
}

#[command]
pub fn settings_launch(
    state: State<'_, SettingsState>,
    host: State<'_, HostInbox>,
) -> Result<SettingsView, String> {
    state.edit(&host, |c| Ok(c.launch()))
}

#[command]
pub fn settings_close_app(
    state: State<'_, SettingsState>,
    host: State<'_, HostInbox>,
) -> Result<(), String> {
    state.edit(&host, |c| Ok(Some(c.close_app()))).map(|_| ())
}

/// Marks the source for deletion and asks for confirmation; the answer
/// arrives later as a `settings-view` event.
#[command]
pub fn settings_request_delete(
    app: AppHandle,
    state: State<'_, SettingsState>,
    id: SourceId,
) -> Result<SettingsView, String> {
    let (name, view) = {
        let mut controller = state.lock()?;
        controller.request_delete(&id).map_err(|e| e.to_string())?;
        let name = find_source(&controller.config().sources, &id)
            .map(|source| source.name.clone())
            .unwrap_or_default();
        (name, controller.view())
    };

    let handle = app.clone();
    app.dialog()
        .message(format!("Delete \"{name}\"? This cannot be undone."))
        .title("Delete Source")
        .kind(MessageDialogKind::Warning)
        .buttons(MessageDialogButtons::OkCancelCustom(
            "Delete".to_string(),
            "Cancel".to_string(),
        ))
        .show(move |confirmed| resolve_delete(&handle, confirmed));

    Ok(view)
}

fn resolve_delete(app: &AppHandle, confirmed: bool) {
    let state = app.state::<SettingsState>();
    let view = {
        let Ok(mut controller) = state.0.lock() else {
            return;
        };
        if !confirmed {
            controller.cancel_delete();
        } else if let Some(event) = controller.confirm_delete() {
            if let Err(e) = app.state::<HostInbox>().send(event) {
                warn!(error = %e, "failed to forward delete");
            }
        }
        controller.view()
    };
    emit_view(app, view);
}

/// Pops a source out into its own frame window.
#[command]
pub fn settings_open_frame(
    app: AppHandle,
    state: State<'_, SettingsState>,
    host: State<'_, HostInbox>,
    id: SourceId,
) -> Result<String, String> {
    let source = {
        let controller = state.lock()?;
        find_source(&controller.config().sources, &id)
            .cloned()
            .ok_or_else(|| Error::SourceNotFound(id.clone()).to_string())?
    };
    frames::open(&app, &source, host.0.clone()).map_err(|e| e.to_string())
}

// Overlay chrome

#[command]
pub fn surface_pointer(surface: State<'_, SurfaceInbox>, input: PointerInput) -> Result<(), String> {
    surface.send(SurfaceInput::Pointer(input))
}

#[command]
pub fn surface_frame(surface: State<'_, SurfaceInbox>) -> Result<(), String> {
    surface.send(SurfaceInput::Frame)
}

#[command]
pub fn surface_menu(surface: State<'_, SurfaceInbox>, action: MenuAction) -> Result<(), String> {
    surface.send(SurfaceInput::Menu(action))
}

#[command]
pub fn surface_header_opacity(
    surface: State<'_, SurfaceInbox>,
    id: SourceId,
    opacity: f64,
) -> Result<(), String> {
    surface.send(SurfaceInput::HeaderOpacity { id, opacity })
}

// Frame windows

#[command]
pub fn frame_pointer(app: AppHandle, window: WebviewWindow, input: FramePointer) -> Result<(), String> {
    frames::pointer(&app, window.label(), input).map_err(|e| e.to_string())
}

#[command]
pub fn frame_tick(app: AppHandle, window: WebviewWindow) -> Result<(), String> {
    frames::tick(&app, window.label()).map_err(|e| e.to_string())
}

#[command]
pub fn frame_menu(
    app: AppHandle,
    window: WebviewWindow,
    action: FrameMenuAction,
) -> Result<FrameChrome, String> {
    frames::menu_action(&app, window.label(), action).map_err(|e| e.to_string())
}

#[command]
pub fn frame_close(app: AppHandle, window: WebviewWindow) -> Result<(), String> {
    frames::close(&app, window.label()).map_err(|e| e.to_string())
}
