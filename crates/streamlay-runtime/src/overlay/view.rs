//! Sources rendered as child webviews of the overlay window.
//!
//! The overlay's own webview draws the chrome (headers, handles and menu);
//! every layout change of a source is mirrored to it as a `source-layout`
//! event.

use serde::Serialize;
use streamlay_core::{
    AudioSettings, Error, Source, SourceId,
    host::OVERLAY_LABEL,
    surface::{Presentation, SourceView, SurfaceInput, ViewFactory},
};
use tauri::{
    AppHandle, Emitter, LogicalPosition, LogicalSize, Manager, Url, Webview, WebviewBuilder,
    WebviewUrl, webview::PageLoadEvent,
};
use tokio::sync::mpsc::UnboundedSender;
use tracing::{debug, warn};

const STYLE_ELEMENT_ID: &str = "__streamlay_css";
const BLANK_PAGE: &str = "about:blank";

#[derive(Clone, Serialize)]
#[serde(rename_all = "camelCase")]
struct SourceLayout<'a> {
    id: &'a str,
    #[serde(flatten)]
    presentation: &'a Presentation,
}

pub struct SourceWebview {
    id: SourceId,
    webview: Webview,
}

impl SourceWebview {
    fn eval(&self, script: &str) -> Result<(), Error> {
        self.webview.eval(script).map_err(|e| Error::Injection {
            id: self.id.clone(),
            reason: e.to_string(),
        })
    }

    fn window_error(&self, e: tauri::Error) -> Error {
        Error::Window(format!("source {}: {e}", self.id))
    }
}

impl SourceView for SourceWebview {
    fn apply(&self, presentation: &Presentation) -> Result<(), Error> {
        let bounds = presentation.bounds;
        self.webview
            .set_position(LogicalPosition::new(bounds.x, bounds.y))
            .and_then(|()| {
                self.webview
                    .set_size(LogicalSize::new(bounds.width, bounds.height))
            })
            .and_then(|()| {
                if presentation.hidden {
                    self.webview.hide()
                } else {
                    self.webview.show()
                }
            })
            .map_err(|e| self.window_error(e))?;

        self.set_opacity(presentation.opacity)?;

        let layout = SourceLayout {
            id: &self.id,
            presentation,
        };
        self.webview
            .emit_to(OVERLAY_LABEL, "source-layout", layout)
            .map_err(|e| self.window_error(e))
    }

    fn navigate(&self, url: &str) -> Result<(), Error> {
        let url = parse_url(&self.id, url)?;
        self.webview.navigate(url).map_err(|e| self.window_error(e))
    }

    fn inject_css(&self, css: &str) -> Result<(), Error> {
        self.eval(&css_script(css))
    }

    fn set_zoom(&self, zoom: f64) -> Result<(), Error> {
        self.webview.set_zoom(zoom).map_err(|e| self.window_error(e))
    }

    fn set_audio(&self, audio: AudioSettings) -> Result<(), Error> {
        self.eval(&audio_script(audio))
    }

    fn set_opacity(&self, opacity: f64) -> Result<(), Error> {
        self.eval(&format!(
            "document.documentElement.style.opacity = '{}';",
            opacity.clamp(0.0, 1.0)
        ))
    }

    fn close(&self) -> Result<(), Error> {
        if let Err(e) = self.webview.emit_to(OVERLAY_LABEL, "source-removed", &self.id) {
            warn!(id = %self.id, error = %e, "failed to notify overlay of removed source");
        }
        self.webview.close().map_err(|e| self.window_error(e))
    }
}

/// Creates source views inside the overlay window.
pub struct ChildViewFactory {
    app: AppHandle,
    inbox: UnboundedSender<SurfaceInput>,
}

impl ChildViewFactory {
    pub fn new(app: AppHandle, inbox: UnboundedSender<SurfaceInput>) -> Self {
        Self { app, inbox }
    }
}

impl ViewFactory for ChildViewFactory {
    type View = SourceWebview;

    fn create(&self, source: &Source, presentation: &Presentation) -> Result<SourceWebview, Error> {
        let window = self
            .app
            .get_window(OVERLAY_LABEL)
            .ok_or_else(|| Error::WindowNotFound(OVERLAY_LABEL.to_string()))?;

        let url = if source.url.is_empty() {
            BLANK_PAGE
        } else {
            source.url.as_str()
        };
        let url = parse_url(&source.id, url)?;

        let id = source.id.clone();
        let inbox = self.inbox.clone();
        let builder = WebviewBuilder::new(format!("source-{}", source.id), WebviewUrl::External(url))
            .transparent(true)
            .on_page_load(move |_webview, payload| {
                if matches!(payload.event(), PageLoadEvent::Finished) {
                    debug!(id = %id, url = %payload.url(), "source page loaded");
                    if let Err(e) = inbox.send(SurfaceInput::ContentReady(id.clone())) {
                        warn!(id = %id, error = %e, "surface inbox closed");
                    }
                }
            });

        let bounds = presentation.bounds;
        let webview = window
            .add_child(
                builder,
                LogicalPosition::new(bounds.x, bounds.y),
                LogicalSize::new(bounds.width, bounds.height),
            )
            .map_err(|e| Error::Window(format!("source {}: {e}", source.id)))?;

        let view = SourceWebview {
            id: source.id.clone(),
            webview,
        };
        view.apply(presentation)?;
        Ok(view)
    }
}

fn parse_url(id: &str, url: &str) -> Result<Url, Error> {
    Url::parse(url).map_err(|e| Error::Injection {
        id: id.to_string(),
        reason: format!("invalid url {url}: {e}"),
    })
}

/// Replaces the stylesheet injected by a previous call.
pub(crate) fn css_script(css: &str) -> String {
    let css = serde_json::to_string(css).unwrap_or_else(|_| "\"\"".to_string());
    format!(
        r#"(function () {{
  var el = document.getElementById('{STYLE_ELEMENT_ID}');
  if (!el) {{
    el = document.createElement('style');
    el.id = '{STYLE_ELEMENT_ID}';
    (document.head || document.documentElement).appendChild(el);
  }}
  el.textContent = {css};
}})();"#
    )
}

/// Applies mute and volume to every media element, including ones the page
/// adds later.
pub(crate) fn audio_script(audio: AudioSettings) -> String {
    let volume = f64::from(audio.volume.min(100)) / 100.0;
    format!(
        r#"(function () {{
  window.__streamlayAudio = {{ muted: {muted}, volume: {volume} }};
  var enforce = function () {{
    var audio = window.__streamlayAudio;
    document.querySelectorAll('video, audio').forEach(function (el) {{
      if (el.muted !== audio.muted) el.muted = audio.muted;
      if (el.volume !== audio.volume) el.volume = audio.volume;
    }});
  }};
  enforce();
  if (!window.__streamlayAudioObserver) {{
    window.__streamlayAudioObserver = new MutationObserver(enforce);
    window.__streamlayAudioObserver.observe(document.documentElement, {{ childList: true, subtree: true }});
    document.addEventListener('volumechange', enforce, true);
  }}
}})();"#,
        muted = audio.muted,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn css_is_embedded_as_a_string_literal() {
        let script = css_script("body { content: \"x\" }\n");
        assert!(script.contains(r#"el.textContent = "body { content: \"x\" }\n";"#));
    }

    #[test]
    fn audio_volume_is_a_fraction() {
        let script = audio_script(AudioSettings {
            muted: true,
            volume: 40,
        });
        assert!(script.contains("muted: true, volume: 0.4"));
    }
}
