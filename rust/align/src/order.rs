// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Carving order and gap redistribution

use crate::error::{InvalidInput, Result};
use crate::types::{primary_room, Boundary, RoomType};
use floorplan_align_geometry::{bool2d, Rect, Region};

/// Minimum overlap area that makes two rooms compete for space
const OVERLAP_TOLERANCE: f64 = 1e-6;

/// Directed overlap graph as an adjacency matrix: `edges[i][j]` means `i -> j`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OverlapGraph {
    edges: Vec<Vec<bool>>,
}

impl OverlapGraph {
    /// Edge from the smaller room to the larger room for every overlapping pair
    ///
    /// Equal areas point from the lower index to the higher one.
    pub fn from_boxes(boxes: &[Rect]) -> Self {
        let n = boxes.len();
        let mut edges = vec![vec![false; n]; n];

        for i in 0..n {
            for j in (i + 1)..n {
                if boxes[i].overlap_area(&boxes[j]) <= OVERLAP_TOLERANCE {
                    continue;
                }
                if boxes[i].area() <= boxes[j].area() {
                    edges[i][j] = true;
                } else {
                    edges[j][i] = true;
                }
            }
        }

        Self { edges }
    }

    pub fn has_edges(&self) -> bool {
        self.edges.iter().any(|row| row.iter().any(|&e| e))
    }

    pub fn has_edge(&self, from: usize, to: usize) -> bool {
        self.edges[from][to]
    }

    /// In-degree of `node` counting only edges from nodes still `remaining`
    fn in_degree(&self, node: usize, remaining: &[bool]) -> usize {
        (0..self.edges.len())
            .filter(|&from| remaining[from] && self.has_edge(from, node))
            .count()
    }
}

/// Sequence nodes by repeatedly removing every source node
///
/// When a cycle leaves no source, nodes with in-degree 1 are taken instead;
/// if there are none of those either, every remaining node is taken. Each
/// step appends its nodes in ascending index order, so the loop always makes
/// progress and returns a permutation.
pub fn find_room_order(graph: &OverlapGraph) -> Vec<usize> {
    let n = graph.edges.len();
    let mut remaining = vec![true; n];
    let mut order = Vec::with_capacity(n);

    while order.len() < n {
        let degrees: Vec<(usize, usize)> = (0..n)
            .filter(|&node| remaining[node])
            .map(|node| (node, graph.in_degree(node, &remaining)))
            .collect();

        let mut step: Vec<usize> = degrees
            .iter()
            .filter(|(_, d)| *d == 0)
            .map(|(node, _)| *node)
            .collect();
        if step.is_empty() {
            tracing::debug!("Overlap cycle, falling back to in-degree 1 nodes");
            step = degrees
                .iter()
                .filter(|(_, d)| *d == 1)
                .map(|(node, _)| *node)
                .collect();
        }
        if step.is_empty() {
            step = degrees.iter().map(|(node, _)| *node).collect();
        }

        for node in step {
            remaining[node] = false;
            order.push(node);
        }
    }

    order
}

/// Clip rooms to the building, decide the carving order and fill gaps
///
/// Returns the updated boxes and the carving order. Rooms later in the order
/// keep area they share with rooms earlier in the order, so a small room
/// overlapping a large one is carved out of it.
pub fn regularize(
    boxes: &[Rect],
    boundary: &Boundary,
    room_types: &[RoomType],
) -> Result<(Vec<Rect>, Vec<usize>)> {
    if boxes.len() != room_types.len() {
        return Err(InvalidInput::LengthMismatch {
            boxes: boxes.len(),
            room_types: room_types.len(),
        }
        .into());
    }
    let outline = boundary.polygon()?;
    let mut boxes = clip_to_outline(boxes, &outline);

    let graph = OverlapGraph::from_boxes(&boxes);
    let mut order = if graph.has_edges() {
        find_room_order(&graph)
    } else {
        (0..boxes.len()).collect()
    };
    order.reverse();

    if let Some(primary) = primary_room(room_types) {
        fill_gaps(&mut boxes, &outline, primary);
    }

    Ok((boxes, order))
}

/// Replace each box with the bounds of its part inside the building
fn clip_to_outline(boxes: &[Rect], outline: &Region) -> Vec<Rect> {
    boxes
        .iter()
        .enumerate()
        .map(|(room, rect)| {
            let inside = bool2d::intersection(outline, &Region::from_rect(rect));
            match inside.bounds() {
                Some(bounds) => bounds,
                None => {
                    tracing::warn!(room, "Room lies outside the building");
                    *rect
                }
            }
        })
        .collect()
}

/// Hand floor area not claimed by any secondary room to the primary room
///
/// The largest piece (by overlap with the primary room) becomes the primary
/// room's box. Detached pieces are merged into whichever room's centre is
/// nearest to the piece's centroid.
fn fill_gaps(boxes: &mut [Rect], outline: &Region, primary: usize) {
    let secondary: Vec<Region> = boxes
        .iter()
        .enumerate()
        .filter(|(room, _)| *room != primary)
        .filter_map(|(room, rect)| {
            if rect.is_degenerate() {
                tracing::warn!(room, "Skipping empty room box during gap filling");
                None
            } else {
                Some(Region::from_rect(rect))
            }
        })
        .collect();

    let gap = bool2d::difference_all(outline, &secondary);
    let pieces = gap.fragments();

    match pieces {
        [] => {
            tracing::debug!(primary, "No unclaimed area left for the primary room");
        }
        [single] => {
            if let Some(bounds) = single.bounds() {
                boxes[primary] = bounds;
            }
        }
        _ => {
            let primary_box = Region::from_rect(&boxes[primary]);
            let overlaps: Vec<f64> = pieces
                .iter()
                .map(|piece| {
                    bool2d::intersection(&Region::Polygon(piece.clone()), &primary_box).area()
                })
                .collect();
            let main = first_max(&overlaps);

            let current: &[Rect] = boxes;
            let targets: Vec<Option<usize>> = pieces
                .iter()
                .map(|piece| {
                    piece
                        .centroid()
                        .and_then(|c| nearest_room(current, c.x, c.y))
                })
                .collect();

            tracing::debug!(pieces = pieces.len(), main, "Redistributing detached gap pieces");

            for (k, piece) in pieces.iter().enumerate() {
                if k == main {
                    if let Some(bounds) = piece.bounds() {
                        boxes[primary] = bounds;
                    }
                    continue;
                }
                let Some(target) = targets[k] else {
                    continue;
                };
                let merged = bool2d::union(
                    &Region::from_rect(&boxes[target]),
                    &Region::Polygon(piece.clone()),
                );
                if let Some(bounds) = merged.bounds() {
                    boxes[target] = bounds;
                }
            }
        }
    }
}

/// Index of the first maximum
fn first_max(values: &[f64]) -> usize {
    let mut best = 0;
    for (i, &value) in values.iter().enumerate() {
        if value > values[best] {
            best = i;
        }
    }
    best
}

/// Room whose box centre is closest to `(x, y)`; the first one wins ties
fn nearest_room(boxes: &[Rect], x: f64, y: f64) -> Option<usize> {
    let mut best: Option<(usize, f64)> = None;
    for (room, rect) in boxes.iter().enumerate() {
        let center = rect.center();
        let distance = (center.x - x).hypot(center.y - y);
        if best.map_or(true, |(_, d)| distance < d) {
            best = Some((room, distance));
        }
    }
    best.map(|(room, _)| room)
}
