use streamlay_core::{Bounds, Error, host::WindowBackend};
use tauri::{AppHandle, Manager, WebviewUrl, WebviewWindow, WebviewWindowBuilder, window::Color};
use tracing::debug;

use super::platform::{configure_overlay, place};

/// Page drawing the overlay chrome: source headers, resize handles and the menu.
const OVERLAY_PAGE: &str = "overlay.html";

/// Native windows, looked up by label on every call.
pub struct TauriWindowBackend {
    app: AppHandle,
}

impl TauriWindowBackend {
    pub fn new(app: AppHandle) -> Self {
        Self { app }
    }

    fn window(&self, label: &str) -> Result<WebviewWindow, Error> {
        self.app
            .get_webview_window(label)
            .ok_or_else(|| Error::WindowNotFound(label.to_string()))
    }
}

fn window_error(e: tauri::Error) -> Error {
    Error::Window(e.to_string())
}

impl WindowBackend for TauriWindowBackend {
    fn window_exists(&self, label: &str) -> bool {
        self.app.get_webview_window(label).is_some()
    }

    fn create_overlay(&self, label: &str, bounds: Bounds) -> Result<(), Error> {
        // Created hidden; `place` shows it once positioned.
        let window = WebviewWindowBuilder::new(&self.app, label, WebviewUrl::App(OVERLAY_PAGE.into()))
            .title("Streamlay Overlay")
            .inner_size(f64::from(bounds.width), f64::from(bounds.height))
            .decorations(false)
            .transparent(true)
            .background_color(Color(0, 0, 0, 0))
            .always_on_top(true)
            .skip_taskbar(true)
            .resizable(false)
            .shadow(false)
            .focused(false)
            .visible(false)
            .build()
            .map_err(window_error)?;

        configure_overlay(&window)?;
        place(&window, bounds)
    }

    fn bounds(&self, label: &str) -> Result<Bounds, Error> {
        let window = self.window(label)?;
        let scale = window.scale_factor().map_err(window_error)?;
        let position = window
            .outer_position()
            .map_err(window_error)?
            .to_logical::<i32>(scale);
        let size = window
            .inner_size()
            .map_err(window_error)?
            .to_logical::<i32>(scale);

        Ok(Bounds::new(position.x, position.y, size.width, size.height))
    }

    fn set_bounds(&self, label: &str, bounds: Bounds) -> Result<(), Error> {
        debug!(window = label, ?bounds, "placing window");
        place(&self.window(label)?, bounds)
    }

    fn set_click_through(&self, label: &str, click_through: bool) -> Result<(), Error> {
        self.window(label)?
            .set_ignore_cursor_events(click_through)
            .map_err(window_error)
    }

    fn set_content_protected(&self, label: &str, protected: bool) -> Result<(), Error> {
        self.window(label)?
            .set_content_protected(protected)
            .map_err(window_error)
    }

    fn primary_work_area(&self) -> Option<Bounds> {
        let monitor = self.app.primary_monitor().ok().flatten()?;
        let scale = monitor.scale_factor();
        let area = monitor.work_area();
        let position = area.position.to_logical::<i32>(scale);
        let size = area.size.to_logical::<i32>(scale);

        Some(Bounds::new(position.x, position.y, size.width, size.height))
    }
}
