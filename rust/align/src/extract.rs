// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Final room polygons
//!
//! Each room is the building outline intersected with its box, minus the
//! boxes of every room that follows it in the carving order.

use crate::error::{InvalidInput, Result};
use crate::types::{Boundary, Point2D};
use floorplan_align_geometry::{bool2d, Rect, Region};

/// Carve non-overlapping room polygons out of the building outline
///
/// `order` must be a permutation of the room indices. Returns the updated
/// boxes and one vertex ring per room (empty when nothing is left of the
/// room). A room that splits into pieces keeps the envelope of all pieces as
/// its box and the largest piece as its ring.
pub fn extract_polygons(
    boxes: &[Rect],
    boundary: &Boundary,
    order: &[usize],
) -> Result<(Vec<Rect>, Vec<Vec<Point2D>>)> {
    if !is_permutation(order, boxes.len()) {
        return Err(InvalidInput::InvalidOrder { rooms: boxes.len() }.into());
    }
    let outline = boundary.polygon()?;
    let regions: Vec<Region> = boxes.iter().map(Region::from_rect).collect();

    let mut updated = boxes.to_vec();
    let mut rings = vec![Vec::new(); boxes.len()];

    for (position, &room) in order.iter().enumerate() {
        let later: Vec<Region> = order[position + 1..]
            .iter()
            .map(|&other| regions[other].clone())
            .collect();

        let inside = bool2d::intersection(&outline, &regions[room]);
        let carved = bool2d::difference_all(&inside, &later);

        match &carved {
            Region::Empty => {
                tracing::debug!(room, "Room has no area left after carving");
            }
            Region::Polygon(polygon) => {
                if let Some(bounds) = polygon.bounds() {
                    updated[room] = bounds;
                }
                rings[room] = to_ring(&polygon.ring());
            }
            Region::MultiPolygon(_) => {
                tracing::debug!(
                    room,
                    pieces = carved.fragments().len(),
                    "Room carved into disjoint pieces"
                );
                if let Some(bounds) = carved.bounds() {
                    updated[room] = bounds;
                }
                if let Some(largest) = carved.largest() {
                    rings[room] = to_ring(&largest.ring());
                }
            }
        }
    }

    Ok((updated, rings))
}

fn is_permutation(order: &[usize], rooms: usize) -> bool {
    if order.len() != rooms {
        return false;
    }
    let mut seen = vec![false; rooms];
    order
        .iter()
        .all(|&room| room < rooms && !std::mem::replace(&mut seen[room], true))
}

fn to_ring(points: &[nalgebra::Point2<f64>]) -> Vec<Point2D> {
    points.iter().map(Point2D::from_nalgebra).collect()
}
