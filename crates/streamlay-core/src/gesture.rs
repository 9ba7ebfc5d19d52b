//! Pointer gestures: canvas drag/resize on the render surface and the
//! move/resize/trim gestures of the legacy frame layer.
//!
//! Every gesture is `Idle -> Active -> Idle`. Constructing one is the
//! pointer-down, `pointer_move` feeds samples, `on_frame` drains the emitter
//! and `finish` is the pointer-up flush.

use serde::{Deserialize, Serialize};

use crate::{
    geometry::{Bounds, Edges, Point, SURFACE_MIN_SIZE},
    model::SourceId,
    throttle::{Accumulate, DeltaEmitter, FrameScheduler, Latest},
};

/// Window offset, payload of `overlay-move`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct MoveDelta {
    pub x: i32,
    pub y: i32,
}

impl Accumulate for MoveDelta {
    fn merge(&mut self, sample: Self) {
        self.x += sample.x;
        self.y += sample.y;
    }

    fn is_zero(&self) -> bool {
        self.x == 0 && self.y == 0
    }
}

/// Pointer offset against an edge, payload of `overlay-resize`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ResizeDelta {
    pub x: i32,
    pub y: i32,
    pub edge: Edges,
}

impl Accumulate for ResizeDelta {
    fn merge(&mut self, sample: Self) {
        self.x += sample.x;
        self.y += sample.y;
        self.edge = sample.edge;
    }

    fn is_zero(&self) -> bool {
        self.x == 0 && self.y == 0
    }
}

/// Change of origin and size produced by dragging one or two edges.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct GeometryDelta {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

/// Payload of `trim-resize`.
pub type TrimDelta = GeometryDelta;

impl GeometryDelta {
    /// West and north edges move the origin and shrink the size by the same
    /// amount; east and south only grow the size.
    pub fn from_edges(dx: i32, dy: i32, edges: Edges) -> Self {
        let mut delta = Self::default();
        if edges.west {
            delta.x += dx;
            delta.width -= dx;
        }
        if edges.east {
            delta.width += dx;
        }
        if edges.north {
            delta.y += dy;
            delta.height -= dy;
        }
        if edges.south {
            delta.height += dy;
        }
        delta
    }

    /// Adds the delta to `bounds` and clamps the size to `floor`.
    pub fn apply(&self, bounds: Bounds, floor: i32) -> Bounds {
        Bounds {
            x: bounds.x + self.x,
            y: bounds.y + self.y,
            width: (bounds.width + self.width).max(floor),
            height: (bounds.height + self.height).max(floor),
        }
    }
}

impl Accumulate for GeometryDelta {
    fn merge(&mut self, sample: Self) {
        self.x += sample.x;
        self.y += sample.y;
        self.width += sample.width;
        self.height += sample.height;
    }

    fn is_zero(&self) -> bool {
        self.x == 0 && self.y == 0 && self.width == 0 && self.height == 0
    }
}

/// How far the framed content is shifted out of view on each side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Crop {
    pub top: i32,
    pub right: i32,
    pub bottom: i32,
    pub left: i32,
}

impl Crop {
    fn shift(&mut self, dx: i32, dy: i32, edges: Edges) {
        if edges.west {
            self.left += dx;
        }
        if edges.east {
            self.right -= dx;
        }
        if edges.north {
            self.top += dy;
        }
        if edges.south {
            self.bottom -= dy;
        }
    }
}

/// Canvas drag. The model copy follows the pointer on every sample; only the
/// view update waits for the frame.
#[derive(Debug)]
pub struct DragGesture {
    pub id: SourceId,
    start_pointer: Point,
    start_bounds: Bounds,
    view: DeltaEmitter<Latest<Bounds>>,
}

impl DragGesture {
    pub fn begin(id: SourceId, pointer: Point, bounds: Bounds) -> Self {
        Self {
            id,
            start_pointer: pointer,
            start_bounds: bounds,
            view: DeltaEmitter::new(),
        }
    }

    /// Returns the bounds to write into the model right away.
    pub fn pointer_move(&mut self, pointer: Point, scheduler: &impl FrameScheduler) -> Bounds {
        let offset = pointer - self.start_pointer;
        let bounds = Bounds {
            x: self.start_bounds.x + offset.x,
            y: self.start_bounds.y + offset.y,
            ..self.start_bounds
        };
        self.view.push(Latest::new(bounds), scheduler);
        bounds
    }

    pub fn on_frame(&mut self) -> Option<Bounds> {
        self.view.on_frame().and_then(Latest::into_inner)
    }

    pub fn finish(&mut self) -> Option<Bounds> {
        self.view.finish().and_then(Latest::into_inner)
    }
}

/// Canvas resize from one of the corner handles.
#[derive(Debug)]
pub struct ResizeGesture {
    pub id: SourceId,
    edges: Edges,
    start_bounds: Bounds,
    last_pointer: Point,
    total: GeometryDelta,
    emitter: DeltaEmitter<GeometryDelta>,
}

impl ResizeGesture {
    pub fn begin(id: SourceId, edges: Edges, pointer: Point, bounds: Bounds) -> Self {
        Self {
            id,
            edges,
            start_bounds: bounds,
            last_pointer: pointer,
            total: GeometryDelta::default(),
            emitter: DeltaEmitter::new(),
        }
    }

    pub fn pointer_move(&mut self, pointer: Point, scheduler: &impl FrameScheduler) {
        let step = pointer - self.last_pointer;
        self.last_pointer = pointer;
        self.emitter
            .push(GeometryDelta::from_edges(step.x, step.y, self.edges), scheduler);
    }

    /// Bounds to apply to model and view, if anything moved since the last frame.
    pub fn on_frame(&mut self) -> Option<Bounds> {
        let delta = self.emitter.on_frame()?;
        Some(self.advance(delta))
    }

    pub fn finish(&mut self) -> Option<Bounds> {
        let delta = self.emitter.finish()?;
        Some(self.advance(delta))
    }

    fn advance(&mut self, delta: GeometryDelta) -> Bounds {
        self.total.merge(delta);
        self.total.apply(self.start_bounds, SURFACE_MIN_SIZE)
    }
}

/// Legacy frame: moves the whole window by pointer offsets.
#[derive(Debug)]
pub struct WindowMoveGesture {
    last_pointer: Point,
    emitter: DeltaEmitter<MoveDelta>,
}

impl WindowMoveGesture {
    pub fn begin(pointer: Point) -> Self {
        Self {
            last_pointer: pointer,
            emitter: DeltaEmitter::new(),
        }
    }

    pub fn pointer_move(&mut self, pointer: Point, scheduler: &impl FrameScheduler) {
        let step = pointer - self.last_pointer;
        self.last_pointer = pointer;
        self.emitter.push(MoveDelta { x: step.x, y: step.y }, scheduler);
    }

    pub fn on_frame(&mut self) -> Option<MoveDelta> {
        self.emitter.on_frame()
    }

    pub fn finish(&mut self) -> Option<MoveDelta> {
        self.emitter.finish()
    }
}

/// Legacy frame: resizes the window from an edge or corner handle.
#[derive(Debug)]
pub struct WindowResizeGesture {
    edges: Edges,
    last_pointer: Point,
    emitter: DeltaEmitter<ResizeDelta>,
}

impl WindowResizeGesture {
    pub fn begin(edges: Edges, pointer: Point) -> Self {
        Self {
            edges,
            last_pointer: pointer,
            emitter: DeltaEmitter::new(),
        }
    }

    pub fn pointer_move(&mut self, pointer: Point, scheduler: &impl FrameScheduler) {
        let step = pointer - self.last_pointer;
        self.last_pointer = pointer;
        let sample = ResizeDelta {
            x: step.x,
            y: step.y,
            edge: self.edges,
        };
        self.emitter.push(sample, scheduler);
    }

    pub fn on_frame(&mut self) -> Option<ResizeDelta> {
        self.emitter.on_frame()
    }

    pub fn finish(&mut self) -> Option<ResizeDelta> {
        self.emitter.finish()
    }
}

/// Legacy frame: crops content by dragging an edge. The window shrinks with
/// the crop and the content is shifted so the visible part stays in place.
#[derive(Debug)]
pub struct TrimGesture {
    edges: Edges,
    last_pointer: Point,
    emitter: DeltaEmitter<TrimDelta>,
}

impl TrimGesture {
    pub fn begin(edges: Edges, pointer: Point) -> Self {
        Self {
            edges,
            last_pointer: pointer,
            emitter: DeltaEmitter::new(),
        }
    }

    /// Updates `crop` immediately and queues the window delta.
    pub fn pointer_move(&mut self, pointer: Point, crop: &mut Crop, scheduler: &impl FrameScheduler) {
        let step = pointer - self.last_pointer;
        self.last_pointer = pointer;
        crop.shift(step.x, step.y, self.edges);
        self.emitter
            .push(GeometryDelta::from_edges(step.x, step.y, self.edges), scheduler);
    }

    pub fn on_frame(&mut self) -> Option<TrimDelta> {
        self.emitter.on_frame()
    }

    pub fn finish(&mut self) -> Option<TrimDelta> {
        self.emitter.finish()
    }
}
