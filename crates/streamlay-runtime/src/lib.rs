mod commands;
mod frames;
mod hotkeys;
mod logging;
mod overlay;
mod tray;

use std::env;
use std::time::Duration;

use streamlay_core::{
    Dispatch, HostEvent, JsonFileStore, OverlayHost, RenderSurface,
    config::CONFIG_FILE_NAME,
    surface::SurfaceInput,
};
use tauri::{AppHandle, Manager, WindowEvent};
use tokio::sync::mpsc::{self, UnboundedSender};
use tracing::{info, warn};

use crate::{
    commands::{HostInbox, SettingsState, SurfaceInbox},
    frames::Frames,
    hotkeys::GlobalHotkeys,
    overlay::{ChildViewFactory, TauriSurfaceLink, TauriWindowBackend},
};

pub const SETTINGS_LABEL: &str = "settings";

/// Starts the host and surface actors and registers their inboxes as state.
fn start_actors(app: &AppHandle) -> Result<(), Box<dyn std::error::Error>> {
    let (host_tx, mut host_rx) = mpsc::unbounded_channel::<HostEvent>();
    let (surface_tx, mut surface_rx) = mpsc::unbounded_channel::<SurfaceInput>();

    let store = match app.path().app_data_dir() {
        Ok(dir) => JsonFileStore::new(dir.join(CONFIG_FILE_NAME)),
        Err(e) => {
            warn!(error = %e, "app data dir unavailable, using the default location");
            JsonFileStore::default_location().ok_or("no location for the config file")?
        }
    };
    info!(path = %store.path().display(), "config file");

    let mut host = OverlayHost::new(
        TauriWindowBackend::new(app.clone()),
        GlobalHotkeys::new(app.clone(), host_tx.clone()),
        store,
        host_tx.clone(),
    );
    if let Some(delay) = persist_delay() {
        host = host.with_persist_delay(delay);
    }

    let mut surface = RenderSurface::new(
        ChildViewFactory::new(app.clone(), surface_tx.clone()),
        TauriSurfaceLink::new(app.clone(), host_tx.clone()),
        surface_tx.clone(),
    );

    app.manage(HostInbox(host_tx));
    app.manage(SurfaceInbox(surface_tx.clone()));

    let handle = app.clone();
    let to_surface = surface_tx.clone();
    tauri::async_runtime::spawn(async move {
        host.start();
        while let Some(event) = host_rx.recv().await {
            for dispatch in host.handle(event) {
                route(&handle, &to_surface, dispatch);
            }
        }
    });

    tauri::async_runtime::spawn(async move {
        while let Some(input) = surface_rx.recv().await {
            surface.handle(input);
        }
    });

    overlay::spawn_hover_poll(app.clone(), surface_tx);
    Ok(())
}

fn route(app: &AppHandle, surface: &UnboundedSender<SurfaceInput>, dispatch: Dispatch) {
    match dispatch {
        Dispatch::Surface(event) => {
            if surface.send(SurfaceInput::Host(event)).is_err() {
                warn!("surface inbox closed");
            }
        }
        Dispatch::Settings(event) => commands::deliver_settings(app, event),
        Dispatch::Exit => app.exit(0),
    }
}

/// `STREAMLAY_PERSIST_DEBOUNCE_MS` overrides the host's persist debounce.
fn persist_delay() -> Option<Duration> {
    let raw = env::var("STREAMLAY_PERSIST_DEBOUNCE_MS").ok()?;
    match raw.trim().parse() {
        Ok(ms) => Some(Duration::from_millis(ms)),
        Err(_) => {
            warn!(value = %raw, "ignoring invalid STREAMLAY_PERSIST_DEBOUNCE_MS");
            None
        }
    }
}

#[cfg_attr(mobile, tauri::mobile_entry_point)]
pub fn run() {
    logging::init();

    tauri::Builder::default()
        .plugin(tauri_plugin_global_shortcut::Builder::new().build())
        .plugin(tauri_plugin_dialog::init())
        .manage(SettingsState::default())
        .manage(Frames::default())
        .invoke_handler(tauri::generate_handler![
            commands::settings_view,
            commands::settings_add_source,
            commands::settings_add_alert_box,
            commands::settings_select,
            commands::settings_update_source,
            commands::settings_apply_css_preset,
            commands::settings_reorder,
            commands::settings_update_settings,
            commands::settings_launch,
            commands::settings_close_app,
            commands::settings_request_delete,
            commands::settings_open_frame,
            commands::surface_pointer,
            commands::surface_frame,
            commands::surface_menu,
            commands::surface_header_opacity,
            commands::frame_pointer,
            commands::frame_tick,
            commands::frame_menu,
            commands::frame_close,
        ])
        .setup(|app| {
            start_actors(app.handle())?;
            tray::setup_tray(app)?;
            tray::open_settings_window(app.handle())?;
            Ok(())
        })
        .on_window_event(|window, event| match event {
            // Closing the settings window only hides it; quitting goes through the tray.
            WindowEvent::CloseRequested { api, .. } if window.label() == SETTINGS_LABEL => {
                api.prevent_close();
                if let Err(e) = window.hide() {
                    warn!(error = %e, "failed to hide settings window");
                }
                if let Err(e) = window.state::<HostInbox>().send(HostEvent::SettingsClosed) {
                    warn!(error = %e, "settings close not delivered");
                }
            }
            WindowEvent::Destroyed if window.label().starts_with("frame-") => {
                window.state::<Frames>().remove(window.label());
            }
            _ => {}
        })
        .run(tauri::generate_context!())
        .expect("error running Streamlay");
}
