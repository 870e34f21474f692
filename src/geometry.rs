//! Geometry primitives shared by views, outputs and damage tracking
//!
//! All coordinates are integer pixels. Global (layout) coordinates, output-local
//! coordinates and view-local coordinates all use the same types; which space a
//! value lives in is documented at each use site.

use serde::{Deserialize, Serialize};

/// A point in some pixel coordinate space
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

/// A width/height pair
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Size {
    pub width: u32,
    pub height: u32,
}

impl Size {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }
}

/// Axis-aligned rectangle for window positioning, output placement and damage
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Rectangle {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
}

impl Rectangle {
    /// Creates a new rectangle
    ///
    /// # Example
    ///
    /// ```
    /// use wayview::geometry::Rectangle;
    ///
    /// let rect = Rectangle::new(100, 100, 200, 150);
    /// assert_eq!(rect.area(), 30000);
    /// ```
    pub fn new(x: i32, y: i32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn from_loc_and_size(loc: Point, size: Size) -> Self {
        Self::new(loc.x, loc.y, size.width, size.height)
    }

    /// Creates a rectangle from two corners, in any order
    pub fn from_corners(x1: i32, y1: i32, x2: i32, y2: i32) -> Self {
        let x = x1.min(x2);
        let y = y1.min(y2);
        let width = x1.max(x2).abs_diff(x);
        let height = y1.max(y2).abs_diff(y);

        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn loc(&self) -> Point {
        Point::new(self.x, self.y)
    }

    pub fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }

    /// Exclusive right edge
    pub fn right(&self) -> i32 {
        self.x + self.width as i32
    }

    /// Exclusive bottom edge
    pub fn bottom(&self) -> i32 {
        self.y + self.height as i32
    }

    pub fn area(&self) -> u64 {
        self.width as u64 * self.height as u64
    }

    pub fn is_empty(&self) -> bool {
        self.size().is_empty()
    }

    pub fn with_loc(&self, loc: Point) -> Self {
        Self::from_loc_and_size(loc, self.size())
    }

    pub fn with_size(&self, size: Size) -> Self {
        Self::from_loc_and_size(self.loc(), size)
    }

    /// Returns this rectangle shifted by `(dx, dy)`
    pub fn translated(&self, dx: i32, dy: i32) -> Self {
        Self::new(self.x + dx, self.y + dy, self.width, self.height)
    }

    /// Checks if this rectangle intersects another
    ///
    /// Two rectangles intersect if they share any pixels.
    pub fn intersects(&self, other: &Rectangle) -> bool {
        !(self.right() <= other.x
            || other.right() <= self.x
            || self.bottom() <= other.y
            || other.bottom() <= self.y)
    }

    /// Checks if this rectangle touches another within `threshold` pixels
    pub fn is_adjacent(&self, other: &Rectangle, threshold: u32) -> bool {
        let t = threshold as i32;
        let h_adjacent = (self.right() + t >= other.x && self.x <= other.right() + t)
            && (self.y < other.bottom() && other.y < self.bottom());

        let v_adjacent = (self.bottom() + t >= other.y && self.y <= other.bottom() + t)
            && (self.x < other.right() && other.x < self.right());

        h_adjacent || v_adjacent
    }

    /// Smallest rectangle containing both
    pub fn union(&self, other: &Rectangle) -> Rectangle {
        let x1 = self.x.min(other.x);
        let y1 = self.y.min(other.y);
        let x2 = self.right().max(other.right());
        let y2 = self.bottom().max(other.bottom());

        Rectangle::from_corners(x1, y1, x2, y2)
    }

    /// Computes the intersection of two rectangles
    ///
    /// Returns `None` if they don't intersect.
    pub fn intersection(&self, other: &Rectangle) -> Option<Rectangle> {
        if !self.intersects(other) {
            return None;
        }

        let x1 = self.x.max(other.x);
        let y1 = self.y.max(other.y);
        let x2 = self.right().min(other.right());
        let y2 = self.bottom().min(other.bottom());

        Some(Rectangle::from_corners(x1, y1, x2, y2))
    }

    /// Half-open containment: the right and bottom edges are outside
    pub fn contains_point(&self, x: i32, y: i32) -> bool {
        x >= self.x && x < self.right() && y >= self.y && y < self.bottom()
    }

    pub fn contains_rect(&self, other: &Rectangle) -> bool {
        other.x >= self.x
            && other.y >= self.y
            && other.right() <= self.right()
            && other.bottom() <= self.bottom()
    }
}
