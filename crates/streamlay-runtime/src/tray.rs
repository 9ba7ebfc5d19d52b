use streamlay_core::HostEvent;
use tauri::{
    App, AppHandle, Manager, WebviewUrl, WebviewWindowBuilder,
    image::Image,
    menu::{MenuBuilder, MenuItemBuilder, PredefinedMenuItem},
    tray::{TrayIconBuilder, TrayIconEvent},
};
use tracing::{error, warn};

use crate::{SETTINGS_LABEL, commands::HostInbox, frames::Frames};

const TRAY_ICON: &[u8] = include_bytes!("../icons/32x32.png");

pub fn setup_tray(app: &App) -> Result<(), Box<dyn std::error::Error>> {
    let settings = MenuItemBuilder::with_id("settings", "Settings...").build(app)?;
    let toggle_menu = MenuItemBuilder::with_id("toggle_menu", "Toggle Overlay Menu").build(app)?;
    let edit_mode = MenuItemBuilder::with_id("edit_mode", "Toggle Edit Mode").build(app)?;
    let sources = MenuItemBuilder::with_id("sources", "Show / Hide Sources").build(app)?;
    let separator = PredefinedMenuItem::separator(app)?;
    let quit = MenuItemBuilder::with_id("quit", "Quit Streamlay").build(app)?;

    let menu = MenuBuilder::new(app)
        .item(&settings)
        .item(&toggle_menu)
        .item(&edit_mode)
        .item(&sources)
        .item(&separator)
        .item(&quit)
        .build()?;

    let _tray = TrayIconBuilder::new()
        .icon(Image::from_bytes(TRAY_ICON)?)
        .menu(&menu)
        .tooltip("Streamlay")
        .on_menu_event(|app, event| {
            handle_menu_event(app, event.id.as_ref());
        })
        .on_tray_icon_event(|tray, event| {
            if let TrayIconEvent::DoubleClick { .. } = event {
                if let Err(e) = open_settings_window(tray.app_handle()) {
                    error!(error = %e, "failed to open settings window");
                }
            }
        })
        .build(app)?;

    Ok(())
}

/// Opens the settings window, or shows and focuses it if it already exists.
pub fn open_settings_window(app: &AppHandle) -> Result<(), tauri::Error> {
    if let Some(window) = app.get_webview_window(SETTINGS_LABEL) {
        window.show()?;
        window.set_focus()?;
    } else {
        WebviewWindowBuilder::new(app, SETTINGS_LABEL, WebviewUrl::App("index.html".into()))
            .title("Streamlay Settings")
            .inner_size(900.0, 650.0)
            .min_inner_size(700.0, 500.0)
            .center()
            .decorations(true)
            .resizable(true)
            .visible(true)
            .build()?;
    }

    send(app, HostEvent::SettingsOpened);
    Ok(())
}

fn send(app: &AppHandle, event: HostEvent) {
    if let Err(e) = app.state::<HostInbox>().send(event) {
        warn!(error = %e, "tray action dropped");
    }
}

fn handle_menu_event(app: &AppHandle, id: &str) {
    match id {
        "settings" => {
            if let Err(e) = open_settings_window(app) {
                error!(error = %e, "failed to open settings window");
            }
        }
        "toggle_menu" => {
            send(app, HostEvent::ToggleMenu);
            app.state::<Frames>().toggle_menus();
        }
        "edit_mode" => send(app, HostEvent::ToggleEditMode),
        "sources" => send(app, HostEvent::ToggleSourcesVisibility),
        "quit" => send(app, HostEvent::CloseApp),
        _ => {}
    }
}
