//! Input layer of a single-source frame window.
//!
//! A frame window shows one third-party page. Transform mode moves and
//! resizes the window itself; trim mode crops the page by dragging its edges.
//! The two modes are never active together.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{
    geometry::{Handle, Point},
    gesture::{Crop, TrimGesture, WindowMoveGesture, WindowResizeGesture},
    protocol::HostEvent,
    throttle::FrameScheduler,
};

/// What the frame window draws on top of the page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FrameChrome {
    pub transform: bool,
    pub trim: bool,
    pub menu_open: bool,
    pub crop: Crop,
}

pub trait FrameLink: FrameScheduler {
    fn send(&self, event: HostEvent);
    fn show(&self, chrome: FrameChrome);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "on", content = "handle", rename_all = "lowercase")]
pub enum FrameTarget {
    /// The page area; drags the window in transform mode.
    Body,
    Resize(Handle),
    Trim(Handle),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum FramePointer {
    Down { target: FrameTarget, point: Point },
    Move { point: Point },
    Up { point: Point },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FrameMenuAction {
    Transform,
    Trim,
    ResetTrim,
    ToggleClickThrough,
    Close,
}

#[derive(Debug)]
enum FrameGesture {
    Move(WindowMoveGesture),
    Resize(WindowResizeGesture),
    Trim(TrimGesture),
}

pub struct FrameInputLayer<L> {
    window: String,
    chrome: FrameChrome,
    gesture: Option<FrameGesture>,
    link: L,
}

impl<L: FrameLink> FrameInputLayer<L> {
    pub fn new(window: impl Into<String>, link: L) -> Self {
        Self {
            window: window.into(),
            chrome: FrameChrome::default(),
            gesture: None,
            link,
        }
    }

    pub fn chrome(&self) -> FrameChrome {
        self.chrome
    }

    pub fn set_transform(&mut self, active: bool) {
        if active {
            self.chrome.trim = false;
        }
        self.chrome.transform = active;
        self.link.show(self.chrome);
    }

    pub fn set_trim(&mut self, active: bool) {
        if active {
            self.chrome.transform = false;
        }
        self.chrome.trim = active;
        self.link.show(self.chrome);
    }

    pub fn reset_trim(&mut self) {
        self.chrome.crop = Crop::default();
        self.chrome.menu_open = false;
        self.link.show(self.chrome);
        self.send_menu_state();
    }

    pub fn toggle_menu(&mut self) {
        self.chrome.menu_open = !self.chrome.menu_open;
        self.link.show(self.chrome);
        self.send_menu_state();
    }

    pub fn menu_action(&mut self, action: FrameMenuAction) {
        debug!(window = %self.window, ?action, "frame menu");
        match action {
            FrameMenuAction::Transform => self.set_transform(!self.chrome.transform),
            FrameMenuAction::Trim => self.set_trim(!self.chrome.trim),
            FrameMenuAction::ResetTrim => self.reset_trim(),
            FrameMenuAction::ToggleClickThrough => {
                // Close the menu before the window stops taking clicks.
                if self.chrome.menu_open {
                    self.toggle_menu();
                }
                self.link.send(HostEvent::ToggleClickThrough {
                    window: self.window.clone(),
                });
            }
            FrameMenuAction::Close => {
                if self.chrome.menu_open {
                    self.toggle_menu();
                }
            }
        }
    }

    pub fn pointer(&mut self, input: FramePointer) {
        match input {
            FramePointer::Down { target, point } => self.pointer_down(target, point),
            FramePointer::Move { point } => self.pointer_move(point),
            FramePointer::Up { .. } => self.pointer_up(),
        }
    }

    /// Frame callback: sends whatever the active gesture accumulated.
    pub fn frame(&mut self) {
        let event = self
            .gesture
            .as_mut()
            .and_then(|gesture| drain(&self.window, gesture, false));
        if let Some(event) = event {
            self.link.send(event);
        }
    }

    fn pointer_down(&mut self, target: FrameTarget, point: Point) {
        if self.gesture.is_some() {
            return;
        }

        let gesture = match target {
            FrameTarget::Body if self.chrome.transform => {
                FrameGesture::Move(WindowMoveGesture::begin(point))
            }
            FrameTarget::Resize(handle) if self.chrome.transform => {
                FrameGesture::Resize(WindowResizeGesture::begin(handle.edges(), point))
            }
            FrameTarget::Trim(handle) if self.chrome.trim => {
                FrameGesture::Trim(TrimGesture::begin(handle.edges(), point))
            }
            _ => return,
        };
        self.gesture = Some(gesture);
    }

    fn pointer_move(&mut self, point: Point) {
        match &mut self.gesture {
            Some(FrameGesture::Move(gesture)) => gesture.pointer_move(point, &self.link),
            Some(FrameGesture::Resize(gesture)) => gesture.pointer_move(point, &self.link),
            Some(FrameGesture::Trim(gesture)) => {
                let before = self.chrome.crop;
                gesture.pointer_move(point, &mut self.chrome.crop, &self.link);
                if self.chrome.crop != before {
                    self.link.show(self.chrome);
                }
            }
            None => {}
        }
    }

    fn pointer_up(&mut self) {
        let Some(mut gesture) = self.gesture.take() else {
            return;
        };
        if let Some(event) = drain(&self.window, &mut gesture, true) {
            self.link.send(event);
        }
    }

    fn send_menu_state(&self) {
        self.link.send(HostEvent::FrameMenu {
            window: self.window.clone(),
            open: self.chrome.menu_open,
        });
    }
}

fn drain(window: &str, gesture: &mut FrameGesture, finish: bool) -> Option<HostEvent> {
    let window = window.to_string();
    match gesture {
        FrameGesture::Move(g) => {
            let delta = if finish { g.finish() } else { g.on_frame() }?;
            Some(HostEvent::OverlayMove { window, delta })
        }
        FrameGesture::Resize(g) => {
            let delta = if finish { g.finish() } else { g.on_frame() }?;
            Some(HostEvent::OverlayResize { window, delta })
        }
        FrameGesture::Trim(g) => {
            let delta = if finish { g.finish() } else { g.on_frame() }?;
            Some(HostEvent::TrimResize { window, delta })
        }
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;

    use super::*;
    use crate::gesture::{MoveDelta, TrimDelta};

    #[derive(Default)]
    struct MockLink {
        sent: RefCell<Vec<HostEvent>>,
        shown: RefCell<Vec<FrameChrome>>,
        frames: RefCell<usize>,
    }

    impl FrameScheduler for MockLink {
        fn request_frame(&self) {
            *self.frames.borrow_mut() += 1;
        }
    }

    impl FrameLink for MockLink {
        fn send(&self, event: HostEvent) {
            self.sent.borrow_mut().push(event);
        }

        fn show(&self, chrome: FrameChrome) {
            self.shown.borrow_mut().push(chrome);
        }
    }

    fn layer() -> FrameInputLayer<MockLink> {
        FrameInputLayer::new("frame", MockLink::default())
    }

    fn down(target: FrameTarget, x: i32, y: i32) -> FramePointer {
        FramePointer::Down {
            target,
            point: Point::new(x, y),
        }
    }

    fn to(x: i32, y: i32) -> FramePointer {
        FramePointer::Move { point: Point::new(x, y) }
    }

    #[test]
    fn transform_and_trim_are_exclusive() {
        let mut frame = layer();
        frame.menu_action(FrameMenuAction::Transform);
        assert!(frame.chrome().transform);

        frame.menu_action(FrameMenuAction::Trim);
        assert!(frame.chrome().trim && !frame.chrome().transform);

        frame.menu_action(FrameMenuAction::Transform);
        assert!(frame.chrome().transform && !frame.chrome().trim);

        for chrome in frame.link.shown.borrow().iter() {
            assert!(!(chrome.transform && chrome.trim));
        }
    }

    #[test]
    fn handles_only_work_in_their_mode() {
        let mut frame = layer();
        frame.set_trim(true);
        frame.pointer(down(FrameTarget::Body, 0, 0));
        frame.pointer(to(10, 10));
        frame.pointer(FramePointer::Up { point: Point::new(10, 10) });
        assert!(frame.link.sent.borrow().is_empty());
    }

    #[test]
    fn move_is_throttled_and_flushed_on_release() {
        let mut frame = layer();
        frame.set_transform(true);
        frame.pointer(down(FrameTarget::Body, 0, 0));
        frame.pointer(to(3, 3));
        frame.pointer(to(10, 10));
        frame.frame();
        frame.pointer(to(11, 11));
        frame.pointer(FramePointer::Up { point: Point::new(11, 11) });
        frame.frame();

        assert_eq!(*frame.link.frames.borrow(), 2);
        let sent = frame.link.sent.borrow();
        assert_eq!(
            *sent,
            [
                HostEvent::OverlayMove {
                    window: "frame".into(),
                    delta: MoveDelta { x: 10, y: 10 }
                },
                HostEvent::OverlayMove {
                    window: "frame".into(),
                    delta: MoveDelta { x: 1, y: 1 }
                },
            ]
        );
    }

    #[test]
    fn west_trim_shifts_crop_and_shrinks_window() {
        let mut frame = layer();
        frame.set_trim(true);
        frame.pointer(down(FrameTarget::Trim(Handle::W), 0, 0));
        frame.pointer(to(20, 0));
        frame.pointer(FramePointer::Up { point: Point::new(20, 0) });

        assert_eq!(frame.chrome().crop.left, 20);
        assert_eq!(
            *frame.link.sent.borrow(),
            [HostEvent::TrimResize {
                window: "frame".into(),
                delta: TrimDelta {
                    x: 20,
                    y: 0,
                    width: -20,
                    height: 0
                }
            }]
        );

        frame.menu_action(FrameMenuAction::ResetTrim);
        assert_eq!(frame.chrome().crop, Crop::default());
    }

    #[test]
    fn click_through_toggle_names_the_window() {
        let mut frame = layer();
        frame.menu_action(FrameMenuAction::ToggleClickThrough);
        assert_eq!(
            *frame.link.sent.borrow(),
            [HostEvent::ToggleClickThrough {
                window: "frame".into()
            }]
        );
    }

    #[test]
    fn click_through_toggle_closes_an_open_menu_first() {
        let mut frame = layer();
        frame.toggle_menu();
        frame.link.sent.borrow_mut().clear();

        frame.menu_action(FrameMenuAction::ToggleClickThrough);
        assert!(!frame.chrome().menu_open);
        assert_eq!(
            *frame.link.sent.borrow(),
            [
                HostEvent::FrameMenu {
                    window: "frame".into(),
                    open: false
                },
                HostEvent::ToggleClickThrough {
                    window: "frame".into()
                }
            ]
        );
    }
}
