//! Pop-out frame windows: one source page in its own window, moved, resized
//! and trimmed through a [`FrameInputLayer`].
//!
//! The window's only webview is the third-party page itself; the handles and
//! the menu are drawn by `ui/frame-chrome.js`, injected before the page loads.

use std::collections::HashMap;
use std::sync::Mutex;

use streamlay_core::{
    Error, HostEvent, Source,
    frame::{FrameChrome, FrameInputLayer, FrameLink, FrameMenuAction, FramePointer},
    throttle::FrameScheduler,
};
use tauri::{AppHandle, Emitter, Manager, Url, WebviewUrl, WebviewWindowBuilder, webview::PageLoadEvent, window::Color};
use tokio::sync::mpsc::UnboundedSender;
use tracing::{debug, info, warn};

use crate::overlay::{self, platform};

const CHROME_SCRIPT: &str = include_str!("../ui/frame-chrome.js");
const REQUEST_FRAME_SCRIPT: &str =
    "requestAnimationFrame(function () { window.__TAURI__.core.invoke('frame_tick'); });";

fn frame_label(source_id: &str) -> String {
    format!("frame-{source_id}")
}

pub struct TauriFrameLink {
    app: AppHandle,
    label: String,
    host: UnboundedSender<HostEvent>,
}

impl FrameScheduler for TauriFrameLink {
    fn request_frame(&self) {
        let Some(window) = self.app.get_webview_window(&self.label) else {
            return;
        };
        if let Err(e) = window.eval(REQUEST_FRAME_SCRIPT) {
            warn!(window = %self.label, error = %e, "failed to request a frame");
        }
    }
}

impl FrameLink for TauriFrameLink {
    fn send(&self, event: HostEvent) {
        if self.host.send(event).is_err() {
            warn!("host inbox closed");
        }
    }

    fn show(&self, chrome: FrameChrome) {
        if let Err(e) = self.app.emit_to(self.label.as_str(), "frame-chrome", chrome) {
            warn!(window = %self.label, error = %e, "failed to update frame chrome");
        }
    }
}

/// Input layers of the open frame windows, by window label.
#[derive(Default)]
pub struct Frames(Mutex<HashMap<String, FrameInputLayer<TauriFrameLink>>>);

impl Frames {
    /// Runs `f` against the layer of `label`.
    pub fn with<T>(
        &self,
        label: &str,
        f: impl FnOnce(&mut FrameInputLayer<TauriFrameLink>) -> T,
    ) -> Result<T, Error> {
        let mut layers = self.0.lock().map_err(|e| Error::Window(e.to_string()))?;
        let layer = layers
            .get_mut(label)
            .ok_or_else(|| Error::WindowNotFound(label.to_string()))?;
        Ok(f(layer))
    }

    pub fn toggle_menus(&self) {
        let Ok(mut layers) = self.0.lock() else {
            return;
        };
        for layer in layers.values_mut() {
            layer.toggle_menu();
        }
    }

    fn insert(&self, label: String, layer: FrameInputLayer<TauriFrameLink>) {
        if let Ok(mut layers) = self.0.lock() {
            layers.insert(label, layer);
        }
    }

    pub fn remove(&self, label: &str) {
        if let Ok(mut layers) = self.0.lock() {
            layers.remove(label);
        }
    }
}

/// Opens `source` in a frame window, or focuses the one already open.
/// Frame windows start click-through, like the overlay.
pub fn open(app: &AppHandle, source: &Source, host: UnboundedSender<HostEvent>) -> Result<String, Error> {
    let label = frame_label(&source.id);
    if let Some(window) = app.get_webview_window(&label) {
        window.set_focus().map_err(|e| Error::Window(e.to_string()))?;
        return Ok(label);
    }

    let url = Url::parse(&source.url).map_err(|e| Error::Injection {
        id: source.id.clone(),
        reason: format!("invalid url {}: {e}", source.url),
    })?;

    let (css, zoom, audio) = (source.css.clone(), source.zoom, source.audio);
    let id = source.id.clone();
    let window = WebviewWindowBuilder::new(app, &label, WebviewUrl::External(url))
        .title(&source.name)
        .inner_size(f64::from(source.width), f64::from(source.height))
        .decorations(false)
        .transparent(true)
        .background_color(Color(0, 0, 0, 0))
        .always_on_top(true)
        .skip_taskbar(true)
        .shadow(false)
        .visible(false)
        .initialization_script(CHROME_SCRIPT)
        .on_page_load(move |webview, payload| {
            if !matches!(payload.event(), PageLoadEvent::Finished) {
                return;
            }
            debug!(id = %id, "frame page loaded");
            let mut scripts = vec![overlay::audio_script(audio)];
            if !css.is_empty() {
                scripts.push(overlay::css_script(&css));
            }
            for script in scripts {
                if let Err(e) = webview.eval(&script) {
                    warn!(id = %id, error = %e, "frame injection failed");
                }
            }
            if zoom != 1.0 {
                if let Err(e) = webview.set_zoom(zoom) {
                    warn!(id = %id, error = %e, "failed to zoom frame");
                }
            }
        })
        .build()
        .map_err(|e| Error::Window(e.to_string()))?;

    platform::configure_overlay(&window)?;
    platform::place(&window, source.bounds())?;
    window
        .set_ignore_cursor_events(true)
        .map_err(|e| Error::Window(e.to_string()))?;

    let link = TauriFrameLink {
        app: app.clone(),
        label: label.clone(),
        host,
    };
    app.state::<Frames>()
        .insert(label.clone(), FrameInputLayer::new(label.clone(), link));

    info!(window = %label, "frame window opened");
    Ok(label)
}

pub fn pointer(app: &AppHandle, label: &str, input: FramePointer) -> Result<(), Error> {
    app.state::<Frames>().with(label, |layer| layer.pointer(input))
}

pub fn tick(app: &AppHandle, label: &str) -> Result<(), Error> {
    app.state::<Frames>().with(label, |layer| layer.frame())
}

pub fn menu_action(app: &AppHandle, label: &str, action: FrameMenuAction) -> Result<FrameChrome, Error> {
    app.state::<Frames>().with(label, |layer| {
        layer.menu_action(action);
        layer.chrome()
    })
}

pub fn close(app: &AppHandle, label: &str) -> Result<(), Error> {
    app.state::<Frames>().remove(label);
    if let Some(window) = app.get_webview_window(label) {
        window.close().map_err(|e| Error::Window(e.to_string()))?;
    }
    Ok(())
}
