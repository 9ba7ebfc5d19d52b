//! Integer pixel geometry shared by the surface, the legacy frame layer and
//! the host window manager.

use std::fmt;
use std::ops::{Add, Sub};

use serde::{Deserialize, Serialize};

use crate::Error;

/// Smallest source size the render surface will lay out.
pub const SURFACE_MIN_SIZE: i32 = 50;
/// Smallest overlay window size the host will apply.
pub const WINDOW_MIN_SIZE: i32 = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

impl Sub for Point {
    type Output = Point;

    fn sub(self, rhs: Point) -> Point {
        Point::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl Add for Point {
    type Output = Point;

    fn add(self, rhs: Point) -> Point {
        Point::new(self.x + rhs.x, self.y + rhs.y)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Bounds {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl Bounds {
    pub const fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn origin(&self) -> Point {
        Point::new(self.x, self.y)
    }

    pub fn contains(&self, point: Point) -> bool {
        point.x >= self.x
            && point.y >= self.y
            && point.x < self.x + self.width
            && point.y < self.y + self.height
    }

    /// A `width` x `height` rectangle centred in `area`.
    pub fn centered_in(area: &Bounds, width: i32, height: i32) -> Bounds {
        let x = area.x + ((area.width - width) as f64 / 2.0).round() as i32;
        let y = area.y + ((area.height - height) as f64 / 2.0).round() as i32;
        Bounds::new(x, y, width, height)
    }

    /// Applies a pointer offset to the given edges and clamps the size to
    /// `floor`. West and north edges move the origin by the full offset even
    /// when the size hits the floor.
    pub fn resized(&self, dx: i32, dy: i32, edges: Edges, floor: i32) -> Bounds {
        let mut next = *self;

        if edges.east {
            next.width += dx;
        }
        if edges.south {
            next.height += dy;
        }
        if edges.west {
            next.width -= dx;
            next.x += dx;
        }
        if edges.north {
            next.height -= dy;
            next.y += dy;
        }

        next.width = next.width.max(floor);
        next.height = next.height.max(floor);
        next
    }

    /// Grows or shrinks the rectangle by a crop delta. Non-positive results
    /// are rejected; anything smaller than `floor` is clamped to it.
    pub fn trimmed(&self, x: i32, y: i32, width: i32, height: i32, floor: i32) -> Result<Bounds, Error> {
        let next = Bounds::new(self.x + x, self.y + y, self.width + width, self.height + height);

        if next.width <= 0 || next.height <= 0 {
            return Err(Error::InvalidGeometry {
                width: next.width,
                height: next.height,
            });
        }

        Ok(Bounds {
            width: next.width.max(floor),
            height: next.height.max(floor),
            ..next
        })
    }
}

/// Which edges a resize or trim affects. Serialized as the legacy edge code
/// (`"n"`, `"se"`, ...).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct Edges {
    pub north: bool,
    pub south: bool,
    pub east: bool,
    pub west: bool,
}

impl Edges {
    pub fn from_code(code: &str) -> Self {
        Self {
            north: code.contains('n'),
            south: code.contains('s'),
            east: code.contains('e'),
            west: code.contains('w'),
        }
    }

    pub fn is_empty(&self) -> bool {
        !(self.north || self.south || self.east || self.west)
    }
}

impl fmt::Display for Edges {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.north {
            f.write_str("n")?;
        }
        if self.south {
            f.write_str("s")?;
        }
        if self.east {
            f.write_str("e")?;
        }
        if self.west {
            f.write_str("w")?;
        }
        Ok(())
    }
}

impl From<String> for Edges {
    fn from(code: String) -> Self {
        Edges::from_code(&code)
    }
}

impl From<Edges> for String {
    fn from(edges: Edges) -> Self {
        edges.to_string()
    }
}

/// Grab handles around a source or frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Handle {
    N,
    S,
    E,
    W,
    Ne,
    Nw,
    Se,
    Sw,
}

impl Handle {
    /// Corner handles drawn on every source.
    pub const CORNERS: [Handle; 4] = [Handle::Nw, Handle::Ne, Handle::Sw, Handle::Se];
    /// Edge handles used by trim mode.
    pub const SIDES: [Handle; 4] = [Handle::N, Handle::S, Handle::E, Handle::W];

    pub fn edges(self) -> Edges {
        Edges::from_code(self.code())
    }

    pub fn code(self) -> &'static str {
        match self {
            Handle::N => "n",
            Handle::S => "s",
            Handle::E => "e",
            Handle::W => "w",
            Handle::Ne => "ne",
            Handle::Nw => "nw",
            Handle::Se => "se",
            Handle::Sw => "sw",
        }
    }
}
