//! The overlay render surface.
//!
//! Owns the surface copy of the source list, keeps one view per source in
//! sync with it, runs canvas gestures and decides when the overlay window
//! should stop being click-through.

use std::collections::HashMap;
use std::time::Duration;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc::UnboundedSender;
use tracing::{debug, warn};

use crate::{
    Error,
    geometry::{Bounds, Handle, Point},
    gesture::{DragGesture, ResizeGesture},
    model::{AudioSettings, Source, SourceId, find_source, find_source_mut},
    protocol::{HostEvent, IgnoreMouse, SurfaceEvent},
    schedule::DebouncedTask,
    throttle::FrameScheduler,
};

/// Height of the drag header drawn above each source in edit mode.
pub const HEADER_HEIGHT: i32 = 28;
pub const OPACITY_COMMIT_DELAY: Duration = Duration::from_millis(200);

/// How a source is laid out and decorated. Views are only touched when this
/// changes.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Presentation {
    pub bounds: Bounds,
    pub z_index: u32,
    pub opacity: f64,
    /// Receives pointer events instead of passing them through.
    pub interactive: bool,
    /// Header and resize handles are shown.
    pub editing: bool,
    pub hidden: bool,
    pub name: String,
}

impl Presentation {
    fn of(source: &Source, state: &OverlayRuntimeState) -> Self {
        Self {
            bounds: source.bounds(),
            z_index: source.z_index,
            opacity: source.opacity,
            interactive: source.interact && !state.edit_mode,
            editing: state.edit_mode,
            hidden: state.sources_hidden,
            name: source.name.clone(),
        }
    }
}

/// An embedded browser surface showing one source.
pub trait SourceView {
    fn apply(&self, presentation: &Presentation) -> Result<(), Error>;
    fn navigate(&self, url: &str) -> Result<(), Error>;
    /// Replaces the stylesheet injected by a previous call.
    fn inject_css(&self, css: &str) -> Result<(), Error>;
    fn set_zoom(&self, zoom: f64) -> Result<(), Error>;
    fn set_audio(&self, audio: AudioSettings) -> Result<(), Error>;
    fn set_opacity(&self, opacity: f64) -> Result<(), Error>;
    fn close(&self) -> Result<(), Error>;
}

pub trait ViewFactory {
    type View: SourceView;

    /// Creates the view and starts loading `source.url`.
    fn create(&self, source: &Source, presentation: &Presentation) -> Result<Self::View, Error>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MenuState {
    pub open: bool,
    pub edit_mode: bool,
    pub sources_hidden: bool,
}

/// Outbound side of the surface.
pub trait SurfaceLink: FrameScheduler {
    fn send(&self, event: HostEvent);
    fn show_menu(&self, menu: MenuState);
}

/// All mutable surface state.
#[derive(Debug, Clone, Default)]
pub struct OverlayRuntimeState {
    pub sources: Vec<Source>,
    pub edit_mode: bool,
    pub menu_open: bool,
    pub sources_hidden: bool,
    /// Last click-through decision sent to the host.
    pub pointer_captured: bool,
}

impl OverlayRuntimeState {
    fn menu(&self) -> MenuState {
        MenuState {
            open: self.menu_open,
            edit_mode: self.edit_mode,
            sources_hidden: self.sources_hidden,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Part {
    Header,
    Body,
    Handle(Handle),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PointerTarget {
    pub id: SourceId,
    pub part: Part,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum PointerInput {
    Down { target: PointerTarget, point: Point },
    Move { point: Point },
    Up { point: Point },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MenuAction {
    ToggleEditMode,
    ToggleSourcesVisibility,
    Close,
}

/// Inbox of the surface actor.
#[derive(Debug, Clone, PartialEq)]
pub enum SurfaceInput {
    Host(SurfaceEvent),
    Pointer(PointerInput),
    Frame,
    ContentReady(SourceId),
    Hover(Point),
    Menu(MenuAction),
    HeaderOpacity { id: SourceId, opacity: f64 },
    CommitOpacity { id: SourceId, opacity: f64 },
}

#[derive(Debug)]
enum Gesture {
    Drag(DragGesture),
    Resize(ResizeGesture),
}

struct Entry<V> {
    view: V,
    presentation: Presentation,
    url: String,
    css: String,
    zoom: f64,
    audio: AudioSettings,
    ready: bool,
}

pub struct RenderSurface<F: ViewFactory, L> {
    state: OverlayRuntimeState,
    views: IndexMap<SourceId, Entry<F::View>>,
    factory: F,
    link: L,
    inbox: UnboundedSender<SurfaceInput>,
    gesture: Option<Gesture>,
    opacity_commits: HashMap<SourceId, DebouncedTask>,
}

impl<F: ViewFactory, L: SurfaceLink> RenderSurface<F, L> {
    pub fn new(factory: F, link: L, inbox: UnboundedSender<SurfaceInput>) -> Self {
        Self {
            state: OverlayRuntimeState::default(),
            views: IndexMap::new(),
            factory,
            link,
            inbox,
            gesture: None,
            opacity_commits: HashMap::new(),
        }
    }

    pub fn state(&self) -> &OverlayRuntimeState {
        &self.state
    }

    pub fn handle(&mut self, input: SurfaceInput) {
        match input {
            SurfaceInput::Host(SurfaceEvent::UpdateSources(sources)) => self.render(sources),
            SurfaceInput::Host(SurfaceEvent::ToggleMenu) => self.set_menu(!self.state.menu_open),
            SurfaceInput::Host(SurfaceEvent::ToggleEditMode(active)) => self.set_edit_mode(active),
            SurfaceInput::Host(SurfaceEvent::ToggleSourcesVisibility) => self.toggle_sources_visibility(),
            SurfaceInput::Pointer(pointer) => self.pointer(pointer),
            SurfaceInput::Frame => self.frame(),
            SurfaceInput::ContentReady(id) => self.content_ready(&id),
            SurfaceInput::Hover(point) => self.hover(point),
            SurfaceInput::Menu(action) => self.menu_action(action),
            SurfaceInput::HeaderOpacity { id, opacity } => self.header_opacity(id, opacity),
            SurfaceInput::CommitOpacity { id, opacity } => self.commit_opacity(&id, opacity),
        }
    }

    /// Replaces the surface copy of the list and reconciles the views.
    pub fn render(&mut self, sources: Vec<Source>) {
        self.state.sources = sources;
        self.refresh();
    }

    /// Reconciles views against the current list without a round trip
    /// through the host.
    pub fn refresh(&mut self) {
        let state = &self.state;

        self.views.retain(|id, entry| {
            if find_source(&state.sources, id).is_some() {
                return true;
            }
            debug!(id = %id, "removing source view");
            if let Err(e) = entry.view.close() {
                warn!(id = %id, error = %e, "failed to close source view");
            }
            false
        });
        self.opacity_commits
            .retain(|id, _| find_source(&state.sources, id).is_some());

        for source in &state.sources {
            let presentation = Presentation::of(source, state);

            if let Some(entry) = self.views.get_mut(&source.id) {
                update_entry(entry, source, presentation);
                continue;
            }

            match self.factory.create(source, &presentation) {
                Ok(view) => {
                    debug!(id = %source.id, url = %source.url, "created source view");
                    self.views.insert(
                        source.id.clone(),
                        Entry {
                            view,
                            presentation,
                            url: source.url.clone(),
                            css: source.css.clone(),
                            zoom: source.zoom,
                            audio: source.audio,
                            ready: false,
                        },
                    );
                }
                Err(e) => warn!(id = %source.id, error = %e, "failed to create source view"),
            }
        }
    }

    fn set_menu(&mut self, open: bool) {
        self.state.menu_open = open;
        self.state.edit_mode = open;
        self.refresh();
        self.link.show_menu(self.state.menu());
        self.link.send(HostEvent::EditModeChanged(open));

        if open {
            self.link.send(HostEvent::MenuOpened);
        } else if !self.state.edit_mode {
            self.link.send(HostEvent::MenuClosed);
        }
    }

    fn set_edit_mode(&mut self, active: bool) {
        if self.state.edit_mode == active {
            return;
        }
        self.state.edit_mode = active;
        self.refresh();
        self.link.show_menu(self.state.menu());
    }

    fn toggle_sources_visibility(&mut self) {
        self.state.sources_hidden = !self.state.sources_hidden;
        debug!(hidden = self.state.sources_hidden, "toggled source visibility");
        self.refresh();
        self.link.show_menu(self.state.menu());
    }

    fn menu_action(&mut self, action: MenuAction) {
        match action {
            MenuAction::ToggleEditMode => {
                self.set_edit_mode(!self.state.edit_mode);
                self.link.send(HostEvent::EditModeChanged(self.state.edit_mode));
            }
            MenuAction::ToggleSourcesVisibility => self.toggle_sources_visibility(),
            MenuAction::Close => self.set_menu(false),
        }
    }

    fn pointer(&mut self, input: PointerInput) {
        match input {
            PointerInput::Down { target, point } => self.pointer_down(target, point),
            PointerInput::Move { point } => self.pointer_move(point),
            PointerInput::Up { .. } => self.pointer_up(),
        }
    }

    fn pointer_down(&mut self, target: PointerTarget, point: Point) {
        if !self.state.edit_mode || self.gesture.is_some() {
            return;
        }
        let Some(source) = find_source(&self.state.sources, &target.id) else {
            return;
        };

        let bounds = source.bounds();
        self.gesture = Some(match target.part {
            Part::Header | Part::Body => Gesture::Drag(DragGesture::begin(target.id, point, bounds)),
            Part::Handle(handle) => {
                Gesture::Resize(ResizeGesture::begin(target.id, handle.edges(), point, bounds))
            }
        });
    }

    fn pointer_move(&mut self, point: Point) {
        match &mut self.gesture {
            Some(Gesture::Drag(drag)) => {
                let bounds = drag.pointer_move(point, &self.link);
                if let Some(source) = find_source_mut(&mut self.state.sources, &drag.id) {
                    source.x = bounds.x;
                    source.y = bounds.y;
                }
            }
            Some(Gesture::Resize(resize)) => resize.pointer_move(point, &self.link),
            None => {}
        }
    }

    fn frame(&mut self) {
        let update = match &mut self.gesture {
            Some(Gesture::Drag(drag)) => drag.on_frame().map(|bounds| (drag.id.clone(), bounds)),
            Some(Gesture::Resize(resize)) => {
                resize.on_frame().map(|bounds| (resize.id.clone(), bounds))
            }
            None => None,
        };

        if let Some((id, bounds)) = update {
            self.apply_live_bounds(&id, bounds);
        }
    }

    fn pointer_up(&mut self) {
        let Some(gesture) = self.gesture.take() else {
            return;
        };

        let (id, last) = match gesture {
            Gesture::Drag(mut drag) => {
                let last = drag.finish();
                (drag.id, last)
            }
            Gesture::Resize(mut resize) => {
                let last = resize.finish();
                (resize.id, last)
            }
        };

        if let Some(bounds) = last {
            self.apply_live_bounds(&id, bounds);
        }
        debug!(id = %id, "gesture finished");
        self.notify_modified();
    }

    fn apply_live_bounds(&mut self, id: &str, bounds: Bounds) {
        match find_source_mut(&mut self.state.sources, id) {
            Some(source) => source.set_bounds(bounds),
            None => return,
        }
        let Some(source) = find_source(&self.state.sources, id) else {
            return;
        };
        let presentation = Presentation::of(source, &self.state);

        if let Some(entry) = self.views.get_mut(id) {
            apply_presentation(id, entry, presentation);
        }
    }

    fn content_ready(&mut self, id: &str) {
        let Some(entry) = self.views.get_mut(id) else {
            return;
        };
        entry.ready = true;
        debug!(id = %id, "source content ready");

        if !entry.css.is_empty() {
            log_injection(id, "css", entry.view.inject_css(&entry.css));
        }
        if entry.zoom != 1.0 {
            log_injection(id, "zoom", entry.view.set_zoom(entry.zoom));
        }
        log_injection(id, "audio", entry.view.set_audio(entry.audio));
    }

    fn hover(&mut self, point: Point) {
        if self.gesture.is_some() {
            return;
        }

        let capture = self.hit_test(point).is_some_and(|source| {
            self.state.edit_mode || source.interact
        });

        if capture != self.state.pointer_captured {
            self.state.pointer_captured = capture;
            let request = if capture {
                IgnoreMouse::INTERACTIVE
            } else {
                IgnoreMouse::PASS_THROUGH
            };
            self.link.send(HostEvent::SetIgnoreMouse(request));
        }
    }

    /// Topmost visible source under `point`. In edit mode the header strip
    /// above a source counts as part of it.
    fn hit_test(&self, point: Point) -> Option<&Source> {
        if self.state.sources_hidden {
            return None;
        }
        let header = if self.state.edit_mode { HEADER_HEIGHT } else { 0 };

        self.state
            .sources
            .iter()
            .filter(|source| {
                let bounds = source.bounds();
                Bounds::new(bounds.x, bounds.y - header, bounds.width, bounds.height + header)
                    .contains(point)
            })
            .max_by_key(|source| source.z_index)
    }

    fn header_opacity(&mut self, id: SourceId, opacity: f64) {
        let opacity = opacity.clamp(0.0, 1.0);
        let Some(entry) = self.views.get_mut(&id) else {
            return;
        };
        if let Err(e) = entry.view.set_opacity(opacity) {
            warn!(id = %id, error = %e, "failed to apply opacity");
        }
        entry.presentation.opacity = opacity;

        let inbox = self.inbox.clone();
        let commit = SurfaceInput::CommitOpacity {
            id: id.clone(),
            opacity,
        };
        self.opacity_commits
            .entry(id)
            .or_default()
            .arm(OPACITY_COMMIT_DELAY, async move {
                let _ = inbox.send(commit);
            });
    }

    fn commit_opacity(&mut self, id: &str, opacity: f64) {
        self.opacity_commits.remove(id);
        let Some(source) = find_source_mut(&mut self.state.sources, id) else {
            return;
        };
        source.set_opacity(opacity);
        self.notify_modified();
    }

    fn notify_modified(&self) {
        self.link
            .send(HostEvent::SourcesModified(self.state.sources.clone()));
    }
}

fn update_entry<V: SourceView>(entry: &mut Entry<V>, source: &Source, presentation: Presentation) {
    let id = source.id.as_str();
    apply_presentation(id, entry, presentation);

    if source.url != entry.url && !source.url.is_empty() {
        debug!(id = %id, url = %source.url, "reloading source");
        match entry.view.navigate(&source.url) {
            Ok(()) => entry.ready = false,
            Err(e) => warn!(id = %id, error = %e, "failed to load source url"),
        }
        entry.url = source.url.clone();
    }

    if source.audio != entry.audio {
        entry.audio = source.audio;
        if entry.ready {
            log_injection(id, "audio", entry.view.set_audio(source.audio));
        }
    }

    if source.css != entry.css {
        entry.css = source.css.clone();
        if entry.ready {
            log_injection(id, "css", entry.view.inject_css(&source.css));
        }
    }

    if source.zoom != entry.zoom {
        entry.zoom = source.zoom;
        if entry.ready {
            log_injection(id, "zoom", entry.view.set_zoom(source.zoom));
        }
    }
}

fn apply_presentation<V: SourceView>(id: &str, entry: &mut Entry<V>, presentation: Presentation) {
    if presentation == entry.presentation {
        return;
    }
    match entry.view.apply(&presentation) {
        Ok(()) => entry.presentation = presentation,
        Err(e) => warn!(id = %id, error = %e, "failed to update source view"),
    }
}

fn log_injection(id: &str, what: &str, result: Result<(), Error>) {
    if let Err(e) = result {
        warn!(id = %id, what, error = %e, "injection failed");
    }
}
