use std::fmt;
use std::ops::{Add, Sub};

use cg_core::Transform;

/// A point in board pixels.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Point {
    /// Horizontal coordinate.
    pub x: f64,
    /// Vertical coordinate.
    pub y: f64,
}

impl Point {
    /// Create a point.
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Euclidean distance to `other`.
    pub fn distance(self, other: Point) -> f64 {
        distance(self, other)
    }
}

impl Add for Point {
    type Output = Point;

    fn add(self, rhs: Point) -> Point {
        Point::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl Sub for Point {
    type Output = Point;

    fn sub(self, rhs: Point) -> Point {
        Point::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl fmt::Display for Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// An axis-aligned rectangle; `(x, y)` is the top-left corner.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    /// Left edge.
    pub x: f64,
    /// Top edge.
    pub y: f64,
    /// Width.
    pub width: f64,
    /// Height.
    pub height: f64,
}

impl Rect {
    /// Create a rectangle.
    pub const fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Top-left corner.
    pub fn origin(&self) -> Point {
        Point::new(self.x, self.y)
    }

    /// `(x + w/2, y + h/2)`.
    pub fn center(&self) -> Point {
        Point::new(self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    /// The top-left corner a `width` × `height` box needs to be centered in
    /// this rectangle.
    pub fn centered_origin(&self, width: f64, height: f64) -> Point {
        let c = self.center();
        Point::new(c.x - width / 2.0, c.y - height / 2.0)
    }

    /// Returns true if `p` lies inside or on the edge.
    pub fn contains(&self, p: Point) -> bool {
        p.x >= self.x && p.x <= self.x + self.width && p.y >= self.y && p.y <= self.y + self.height
    }
}

impl From<&Transform> for Rect {
    fn from(t: &Transform) -> Self {
        Self::new(t.x, t.y, t.width, t.height)
    }
}

impl From<Transform> for Rect {
    fn from(t: Transform) -> Self {
        Self::from(&t)
    }
}

/// Euclidean distance between two points.
pub fn distance(a: Point, b: Point) -> f64 {
    let dx = a.x - b.x;
    let dy = a.y - b.y;
    (dx * dx + dy * dy).sqrt()
}

/// Center of a transform's box.
pub fn center(t: &Transform) -> Point {
    Rect::from(t).center()
}

/// `t` moved so that its center coincides with `target`'s center.
/// Size, rotation and stacking are kept.
pub fn centered_on(t: &Transform, target: &Transform) -> Transform {
    let origin = Rect::from(target).centered_origin(t.width, t.height);
    t.with_position(origin.x, origin.y)
}
