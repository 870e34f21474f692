//! Damage regions
//!
//! A [`Region`] is an unordered set of rectangles marking pixels that need
//! repainting. Regions are not normalized on insertion; overlapping rectangles
//! are allowed and are only merged when an output drains its damage.

use crate::geometry::Rectangle;

/// A set of rectangles awaiting repaint
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Region {
    rects: Vec<Rectangle>,
}

impl Region {
    pub fn new() -> Self {
        Self { rects: Vec::new() }
    }

    /// Region covering a single rectangle (empty rectangles are dropped)
    pub fn from_rect(rect: Rectangle) -> Self {
        let mut region = Self::new();
        region.add(rect);
        region
    }

    pub fn add(&mut self, rect: Rectangle) {
        if !rect.is_empty() {
            self.rects.push(rect);
        }
    }

    pub fn extend(&mut self, other: &Region) {
        self.rects.extend_from_slice(&other.rects);
    }

    pub fn rects(&self) -> &[Rectangle] {
        &self.rects
    }

    pub fn len(&self) -> usize {
        self.rects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rects.is_empty()
    }

    pub fn clear(&mut self) {
        self.rects.clear();
    }

    /// Returns a copy shifted by `(dx, dy)`; `self` is left untouched
    pub fn translated(&self, dx: i32, dy: i32) -> Region {
        Region {
            rects: self.rects.iter().map(|r| r.translated(dx, dy)).collect(),
        }
    }

    /// Returns the parts of this region that fall inside `bounds`
    pub fn clipped(&self, bounds: &Rectangle) -> Region {
        Region {
            rects: self
                .rects
                .iter()
                .filter_map(|r| r.intersection(bounds))
                .collect(),
        }
    }

    pub fn bounding_box(&self) -> Option<Rectangle> {
        let mut iter = self.rects.iter();
        let first = *iter.next()?;
        Some(iter.fold(first, |acc, r| acc.union(r)))
    }

    pub fn contains_point(&self, x: i32, y: i32) -> bool {
        self.rects.iter().any(|r| r.contains_point(x, y))
    }

    /// Merges overlapping and adjacent rectangles in place
    ///
    /// The result covers at least every pixel the input covered.
    pub fn merge(&mut self, threshold: u32) {
        if self.rects.len() <= 1 {
            return;
        }

        self.rects.sort_by_key(|r| (r.y, r.x));

        let mut merged: Vec<Rectangle> = Vec::with_capacity(self.rects.len());
        let mut current = self.rects[0];
        for rect in &self.rects[1..] {
            if current.intersects(rect) || current.is_adjacent(rect, threshold) {
                current = current.union(rect);
            } else {
                merged.push(current);
                current = *rect;
            }
        }
        merged.push(current);

        self.rects = merged;
    }

    pub fn into_rects(self) -> Vec<Rectangle> {
        self.rects
    }
}

impl From<Rectangle> for Region {
    fn from(rect: Rectangle) -> Self {
        Region::from_rect(rect)
    }
}

impl FromIterator<Rectangle> for Region {
    fn from_iter<I: IntoIterator<Item = Rectangle>>(iter: I) -> Self {
        let mut region = Region::new();
        for rect in iter {
            region.add(rect);
        }
        region
    }
}
