// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Axis-aligned room boxes

use nalgebra::Point2;

/// One side of an axis-aligned box, in `(x1, y1, x2, y2)` order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Side {
    X1,
    Y1,
    X2,
    Y2,
}

impl Side {
    /// All four sides in index order
    pub const ALL: [Side; 4] = [Side::X1, Side::Y1, Side::X2, Side::Y2];

    /// Index of the side in `(x1, y1, x2, y2)`
    pub fn index(self) -> usize {
        match self {
            Side::X1 => 0,
            Side::Y1 => 1,
            Side::X2 => 2,
            Side::Y2 => 3,
        }
    }
}

/// Axis-aligned box `(x1, y1, x2, y2)`; well-formed boxes have `x1 < x2` and `y1 < y2`
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Rect {
    pub x1: f64,
    pub y1: f64,
    pub x2: f64,
    pub y2: f64,
}

impl Rect {
    pub fn new(x1: f64, y1: f64, x2: f64, y2: f64) -> Self {
        Self { x1, y1, x2, y2 }
    }

    /// Bounding box of a point set
    pub fn from_points(points: &[Point2<f64>]) -> Option<Self> {
        let first = points.first()?;
        let mut rect = Rect::new(first.x, first.y, first.x, first.y);
        for p in points.iter().skip(1) {
            rect.x1 = rect.x1.min(p.x);
            rect.y1 = rect.y1.min(p.y);
            rect.x2 = rect.x2.max(p.x);
            rect.y2 = rect.y2.max(p.y);
        }
        Some(rect)
    }

    pub fn width(&self) -> f64 {
        self.x2 - self.x1
    }

    pub fn height(&self) -> f64 {
        self.y2 - self.y1
    }

    /// Area, zero for degenerate or inverted boxes
    pub fn area(&self) -> f64 {
        self.width().max(0.0) * self.height().max(0.0)
    }

    pub fn center(&self) -> Point2<f64> {
        Point2::new((self.x1 + self.x2) / 2.0, (self.y1 + self.y2) / 2.0)
    }

    /// True when the box has no interior
    pub fn is_degenerate(&self) -> bool {
        self.width() <= 0.0 || self.height() <= 0.0
    }

    pub fn is_finite(&self) -> bool {
        self.x1.is_finite() && self.y1.is_finite() && self.x2.is_finite() && self.y2.is_finite()
    }

    pub fn side(&self, side: Side) -> f64 {
        match side {
            Side::X1 => self.x1,
            Side::Y1 => self.y1,
            Side::X2 => self.x2,
            Side::Y2 => self.y2,
        }
    }

    pub fn set_side(&mut self, side: Side, value: f64) {
        match side {
            Side::X1 => self.x1 = value,
            Side::Y1 => self.y1 = value,
            Side::X2 => self.x2 = value,
            Side::Y2 => self.y2 = value,
        }
    }

    /// Closed-interval overlap test: boxes that only touch still intersect
    pub fn intersects(&self, other: &Rect) -> bool {
        self.x1 <= other.x2 && self.x2 >= other.x1 && self.y1 <= other.y2 && self.y2 >= other.y1
    }

    /// Overlap with positive area, if any
    pub fn intersection(&self, other: &Rect) -> Option<Rect> {
        let rect = Rect::new(
            self.x1.max(other.x1),
            self.y1.max(other.y1),
            self.x2.min(other.x2),
            self.y2.min(other.y2),
        );
        if rect.is_degenerate() {
            None
        } else {
            Some(rect)
        }
    }

    pub fn overlap_area(&self, other: &Rect) -> f64 {
        self.intersection(other).map_or(0.0, |r| r.area())
    }

    /// Smallest box containing both boxes
    pub fn union_bounds(&self, other: &Rect) -> Rect {
        Rect::new(
            self.x1.min(other.x1),
            self.y1.min(other.y1),
            self.x2.max(other.x2),
            self.y2.max(other.y2),
        )
    }

    /// Per-side comparison with tolerance
    pub fn approx_eq(&self, other: &Rect, epsilon: f64) -> bool {
        Side::ALL
            .iter()
            .all(|&s| (self.side(s) - other.side(s)).abs() <= epsilon)
    }

    /// Counter-clockwise corner ring
    pub fn to_contour(&self) -> Vec<Point2<f64>> {
        vec![
            Point2::new(self.x1, self.y1),
            Point2::new(self.x2, self.y1),
            Point2::new(self.x2, self.y2),
            Point2::new(self.x1, self.y2),
        ]
    }
}
