//! Tauri side of the overlay: the native window, source webviews and the
//! link carrying the surface's outbound traffic.

mod backend;
pub mod platform;
mod view;

use std::time::Duration;

use streamlay_core::{
    HostEvent, Point,
    host::OVERLAY_LABEL,
    surface::{MenuState, SurfaceInput, SurfaceLink},
    throttle::FrameScheduler,
};
use tauri::{AppHandle, Emitter, Manager};
use tokio::sync::mpsc::UnboundedSender;
use tokio::time::MissedTickBehavior;
use tracing::{debug, warn};

pub use backend::TauriWindowBackend;
pub use view::ChildViewFactory;
pub(crate) use view::{audio_script, css_script};

const HOVER_POLL_INTERVAL: Duration = Duration::from_millis(50);
const REQUEST_FRAME_SCRIPT: &str =
    "requestAnimationFrame(function () { window.__TAURI__.core.invoke('surface_frame'); });";

pub struct TauriSurfaceLink {
    app: AppHandle,
    host: UnboundedSender<HostEvent>,
}

impl TauriSurfaceLink {
    pub fn new(app: AppHandle, host: UnboundedSender<HostEvent>) -> Self {
        Self { app, host }
    }
}

impl FrameScheduler for TauriSurfaceLink {
    fn request_frame(&self) {
        let Some(window) = self.app.get_webview_window(OVERLAY_LABEL) else {
            return;
        };
        if let Err(e) = window.eval(REQUEST_FRAME_SCRIPT) {
            warn!(error = %e, "failed to request a frame");
        }
    }
}

impl SurfaceLink for TauriSurfaceLink {
    fn send(&self, event: HostEvent) {
        debug!(event = event.name(), "surface -> host");
        if self.host.send(event).is_err() {
            warn!("host inbox closed");
        }
    }

    fn show_menu(&self, menu: MenuState) {
        if let Err(e) = self.app.emit_to(OVERLAY_LABEL, "menu-state", menu) {
            warn!(error = %e, "failed to update overlay menu");
        }
    }
}

/// Feeds the cursor position, relative to the overlay, to the surface.
///
/// A click-through window receives no pointer events, so hover has to be
/// observed from outside the webview.
pub fn spawn_hover_poll(app: AppHandle, inbox: UnboundedSender<SurfaceInput>) {
    tauri::async_runtime::spawn(async move {
        let mut ticker = tokio::time::interval(HOVER_POLL_INTERVAL);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        let mut last = None;

        loop {
            ticker.tick().await;
            let Some(point) = cursor_in_overlay(&app) else {
                continue;
            };
            if last == Some(point) {
                continue;
            }
            last = Some(point);
            if inbox.send(SurfaceInput::Hover(point)).is_err() {
                break;
            }
        }
    });
}

fn cursor_in_overlay(app: &AppHandle) -> Option<Point> {
    let window = app.get_webview_window(OVERLAY_LABEL)?;
    let cursor = app.cursor_position().ok()?;
    let origin = window.inner_position().ok()?;
    let scale = window.scale_factor().ok()?;

    let x = (cursor.x - f64::from(origin.x)) / scale;
    let y = (cursor.y - f64::from(origin.y)) / scale;
    Some(Point::new(x.round() as i32, y.round() as i32))
}
