// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Polygons with holes and multi-part regions
//!
//! Boolean operations can split a shape into several disjoint pieces. [`Region`]
//! makes that explicit so callers always decide what to do with extra fragments
//! instead of silently assuming a single ring.

use crate::error::{Error, Result};
use crate::rect::Rect;
use nalgebra::Point2;

/// Rings enclosing less than this are treated as slivers
const MIN_RING_AREA: f64 = 1e-9;

/// Traversal direction of a vertex ring
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Winding {
    CounterClockwise,
    Clockwise,
}

/// Consecutive vertex pairs, wrapping back to the first vertex
fn ring_edges(ring: &[Point2<f64>]) -> impl Iterator<Item = (&Point2<f64>, &Point2<f64>)> {
    let next = ring.iter().skip(1).chain(ring.first());
    ring.iter().zip(next)
}

/// Shoelace area, positive for counter-clockwise rings
pub(crate) fn signed_area(ring: &[Point2<f64>]) -> f64 {
    ring_edges(ring)
        .map(|(p, q)| p.x * q.y - q.x * p.y)
        .sum::<f64>()
        / 2.0
}

pub(crate) fn encloses_area(ring: &[Point2<f64>]) -> bool {
    ring.len() >= 3 && signed_area(ring).abs() > MIN_RING_AREA
}

/// Copy of `ring` traversed in the given direction
pub(crate) fn oriented(ring: &[Point2<f64>], winding: Winding) -> Vec<Point2<f64>> {
    let area = signed_area(ring);
    let reverse = match winding {
        Winding::CounterClockwise => area < 0.0,
        Winding::Clockwise => area > 0.0,
    };
    if reverse {
        ring.iter().rev().copied().collect()
    } else {
        ring.to_vec()
    }
}

/// Polygon with optional holes
#[derive(Debug, Clone, PartialEq)]
pub struct Polygon2D {
    /// Outer boundary (counter-clockwise)
    pub outer: Vec<Point2<f64>>,
    /// Holes (clockwise)
    pub holes: Vec<Vec<Point2<f64>>>,
}

impl Polygon2D {
    /// Create a polygon without holes, normalising the winding
    pub fn new(outer: Vec<Point2<f64>>) -> Self {
        Self {
            outer: oriented(&outer, Winding::CounterClockwise),
            holes: Vec::new(),
        }
    }

    pub fn add_hole(&mut self, hole: Vec<Point2<f64>>) {
        self.holes.push(oriented(&hole, Winding::Clockwise));
    }

    /// Enclosed area (outer minus holes)
    pub fn area(&self) -> f64 {
        let holes: f64 = self
            .holes
            .iter()
            .map(|h| signed_area(h).abs())
            .sum();
        (signed_area(&self.outer).abs() - holes).max(0.0)
    }

    pub fn bounds(&self) -> Option<Rect> {
        Rect::from_points(&self.outer)
    }

    /// Area-weighted centroid, holes included
    pub fn centroid(&self) -> Option<Point2<f64>> {
        let mut weight = 0.0;
        let mut cx = 0.0;
        let mut cy = 0.0;

        let outer = std::iter::once((&self.outer, 1.0));
        let holes = self.holes.iter().map(|h| (h, -1.0));
        for (ring, sign) in outer.chain(holes) {
            let Some((area, centroid)) = ring_centroid(ring) else {
                continue;
            };
            let a = area.abs() * sign;
            weight += a;
            cx += centroid.x * a;
            cy += centroid.y * a;
        }

        if weight.abs() < f64::EPSILON {
            return None;
        }
        Some(Point2::new(cx / weight, cy / weight))
    }

    /// Outer vertex ring without a repeated closing vertex
    pub fn ring(&self) -> Vec<Point2<f64>> {
        let mut ring = self.outer.clone();
        while ring.len() > 1 && ring.first() == ring.last() {
            ring.pop();
        }
        ring
    }
}

/// Result of a 2D boolean operation
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Region {
    #[default]
    Empty,
    Polygon(Polygon2D),
    MultiPolygon(Vec<Polygon2D>),
}

impl Region {
    /// Wrap a list of disjoint polygons, picking the matching variant
    pub fn from_polygons(mut polygons: Vec<Polygon2D>) -> Self {
        match polygons.len() {
            0 => Region::Empty,
            1 => Region::Polygon(polygons.remove(0)),
            _ => Region::MultiPolygon(polygons),
        }
    }

    /// Region covered by a box; degenerate boxes cover nothing
    pub fn from_rect(rect: &Rect) -> Self {
        if rect.is_degenerate() {
            Region::Empty
        } else {
            Region::Polygon(Polygon2D::new(rect.to_contour()))
        }
    }

    /// Region enclosed by a single ring
    pub fn from_ring(ring: &[Point2<f64>]) -> Result<Self> {
        if ring.len() < 3 {
            return Err(Error::InvalidPolygon(format!(
                "ring must have at least 3 vertices, got {}",
                ring.len()
            )));
        }
        if !encloses_area(ring) {
            return Ok(Region::Empty);
        }
        Ok(Region::Polygon(Polygon2D::new(ring.to_vec())))
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Region::Empty)
    }

    /// Disjoint pieces of the region
    pub fn fragments(&self) -> &[Polygon2D] {
        match self {
            Region::Empty => &[],
            Region::Polygon(p) => std::slice::from_ref(p),
            Region::MultiPolygon(parts) => parts,
        }
    }

    pub fn area(&self) -> f64 {
        self.fragments().iter().map(Polygon2D::area).sum()
    }

    /// Envelope of every fragment
    pub fn bounds(&self) -> Option<Rect> {
        self.fragments()
            .iter()
            .filter_map(Polygon2D::bounds)
            .reduce(|a, b| a.union_bounds(&b))
    }

    /// Fragment with the largest area; the first one wins ties
    pub fn largest(&self) -> Option<&Polygon2D> {
        let mut best: Option<&Polygon2D> = None;
        for part in self.fragments() {
            if best.map_or(true, |b| part.area() > b.area()) {
                best = Some(part);
            }
        }
        best
    }
}

/// Signed area and centroid of one ring
fn ring_centroid(ring: &[Point2<f64>]) -> Option<(f64, Point2<f64>)> {
    let area = signed_area(ring);
    if area.abs() < f64::EPSILON {
        return None;
    }

    let (cx, cy) = ring_edges(ring).fold((0.0, 0.0), |(cx, cy), (p, q)| {
        let cross = p.x * q.y - q.x * p.y;
        (cx + (p.x + q.x) * cross, cy + (p.y + q.y) * cross)
    });

    let factor = 1.0 / (6.0 * area);
    Some((area, Point2::new(cx * factor, cy * factor)))
}
