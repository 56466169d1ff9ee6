// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Constraint propagation across the room adjacency graph
//!
//! Edges are processed one at a time, always picking the unprocessed edge
//! whose two rooms have the most pinned sides, so alignment spreads outward
//! from rooms already fixed to the boundary. Each edge applies the rule of its
//! relation to the pair of boxes:
//!
//! | relation | rule (slack `t`) |
//! |---|---|
//! | left-of | `v.x1 ~ u.x2` at `t`; `v.y1 ~ u.y1`, `v.y2 ~ u.y2` at `t/2` |
//! | above | `v.y1 ~ u.y2` at `t`; `v.x1 ~ u.x1`, `v.x2 ~ u.x2` at `t/2` |
//! | below | `v.y2 ~ u.y1` at `t`; `v.x1 ~ u.x1`, `v.x2 ~ u.x2` at `t/2` |
//! | right-of | `v.x2 ~ u.x1` at `t`; `v.y1 ~ u.y1`, `v.y2 ~ u.y2` at `t/2` |
//! | inside | every side of `v` hard-attached onto `u` at `t` |
//! | surrounding | every side of `u` hard-attached onto `v` at `t` |
//! | corners | the nearer side of `v` to `u`'s facing side, per axis, at `t/2` |

use crate::error::{InvalidInput, Result};
use crate::types::{AdjacencyEdge, AdjacencyRelation, Constraint, StageOutput, UpdatedMask};
use floorplan_align_geometry::{Rect, Side};

/// A box side of one room
type SideRef = (usize, Side);

/// Propagate alignment constraints along adjacency edges
///
/// `updated` seeds the pinned flags (usually the wall aligner's output).
/// Exactly one edge is processed per iteration, so the loop runs `edges.len()`
/// times. If an edge collapses a box along an axis, that axis is restored to
/// its value from before this stage and unpinned.
///
/// Fails when `updated` covers a different number of rooms than `boxes` or
/// when an edge names a room that does not exist.
pub fn align_neighbor(
    boxes: &[Rect],
    edges: &[AdjacencyEdge],
    updated: &UpdatedMask,
    threshold: f64,
) -> Result<StageOutput> {
    let rooms = boxes.len();
    if updated.rooms() != rooms {
        return Err(InvalidInput::MaskMismatch {
            mask: updated.rooms(),
            rooms,
        }
        .into());
    }
    for (index, edge) in edges.iter().enumerate() {
        if let Some(room) = [edge.u, edge.v].into_iter().find(|&room| room >= rooms) {
            return Err(InvalidInput::EdgeOutOfRange {
                edge: index,
                room,
                rooms,
            }
            .into());
        }
    }

    let mut aligner = PairAligner {
        original: boxes,
        boxes: boxes.to_vec(),
        updated: updated.clone(),
        constraints: Vec::new(),
    };

    let mut processed = vec![false; edges.len()];
    while let Some(index) = next_edge(edges, &processed, &aligner.updated) {
        processed[index] = true;
        let edge = edges[index];

        aligner.apply(&edge, threshold);
        aligner.revert_collapsed(edge.u);
        aligner.revert_collapsed(edge.v);
    }

    tracing::debug!(
        edges = edges.len(),
        constraints = aligner.constraints.len(),
        "Neighbour alignment complete"
    );

    Ok(StageOutput {
        constraints: aligner.constraints,
        boxes: aligner.boxes,
        updated: aligner.updated,
    })
}

/// Unprocessed edge with the most pinned sides across its two rooms
///
/// Scores are recomputed on every call since each processed edge can pin more
/// sides. The lowest index wins ties.
fn next_edge(edges: &[AdjacencyEdge], processed: &[bool], updated: &UpdatedMask) -> Option<usize> {
    let mut best: Option<(usize, usize)> = None;
    for (index, edge) in edges.iter().enumerate() {
        if processed[index] {
            continue;
        }
        let score = updated.pinned_count(edge.u) + updated.pinned_count(edge.v);
        if best.map_or(true, |(_, s)| score > s) {
            best = Some((index, score));
        }
    }
    best.map(|(index, _)| index)
}

struct PairAligner<'a> {
    /// Boxes as they were when the stage started
    original: &'a [Rect],
    boxes: Vec<Rect>,
    updated: UpdatedMask,
    constraints: Vec<Constraint>,
}

impl PairAligner<'_> {
    fn apply(&mut self, edge: &AdjacencyEdge, t: f64) {
        let (u, v) = (edge.u, edge.v);
        match edge.relation {
            AdjacencyRelation::LeftAbove => {
                self.align_corner_x(u, v, true, t);
                self.align_corner_y(u, v, true, t);
            }
            AdjacencyRelation::LeftBelow => {
                self.align_corner_x(u, v, true, t);
                self.align_corner_y(u, v, false, t);
            }
            AdjacencyRelation::LeftOf => {
                self.align((v, Side::X1), (u, Side::X2), t, false);
                self.align((v, Side::Y1), (u, Side::Y1), t / 2.0, false);
                self.align((v, Side::Y2), (u, Side::Y2), t / 2.0, false);
            }
            AdjacencyRelation::Above => {
                self.align((v, Side::Y1), (u, Side::Y2), t, false);
                self.align((v, Side::X1), (u, Side::X1), t / 2.0, false);
                self.align((v, Side::X2), (u, Side::X2), t / 2.0, false);
            }
            AdjacencyRelation::Inside => {
                for side in Side::ALL {
                    self.align((v, side), (u, side), t, true);
                }
            }
            AdjacencyRelation::Surrounding => {
                for side in Side::ALL {
                    self.align((u, side), (v, side), t, true);
                }
            }
            AdjacencyRelation::Below => {
                self.align((v, Side::Y2), (u, Side::Y1), t, false);
                self.align((v, Side::X1), (u, Side::X1), t / 2.0, false);
                self.align((v, Side::X2), (u, Side::X2), t / 2.0, false);
            }
            AdjacencyRelation::RightOf => {
                self.align((v, Side::X2), (u, Side::X1), t, false);
                self.align((v, Side::Y1), (u, Side::Y1), t / 2.0, false);
                self.align((v, Side::Y2), (u, Side::Y2), t / 2.0, false);
            }
            AdjacencyRelation::RightAbove => {
                self.align_corner_x(u, v, false, t);
                self.align_corner_y(u, v, true, t);
            }
            AdjacencyRelation::RightBelow => {
                self.align_corner_x(u, v, false, t);
                self.align_corner_y(u, v, false, t);
            }
        }
    }

    /// Corner relations on the x axis: `u`'s side facing `v` is the reference
    fn align_corner_x(&mut self, u: usize, v: usize, u_is_left: bool, t: f64) {
        let (near, far) = if u_is_left {
            (Side::X1, Side::X2)
        } else {
            (Side::X2, Side::X1)
        };
        self.align_corner(u, v, near, far, t);
    }

    /// Corner relations on the y axis: `u`'s side facing `v` is the reference
    fn align_corner_y(&mut self, u: usize, v: usize, u_is_above: bool, t: f64) {
        let (near, far) = if u_is_above {
            (Side::Y1, Side::Y2)
        } else {
            (Side::Y2, Side::Y1)
        };
        self.align_corner(u, v, near, far, t);
    }

    /// Align whichever of `v`'s `near`/`far` sides is closer to `u`'s `far` side
    fn align_corner(&mut self, u: usize, v: usize, near: Side, far: Side, t: f64) {
        let reference = self.original[u].side(far);
        let d_near = (self.original[v].side(near) - reference).abs();
        let d_far = (self.original[v].side(far) - reference).abs();

        let chosen = if d_near <= d_far { near } else { far };
        self.align((v, chosen), (u, far), t / 2.0, false);
    }

    /// Pairwise alignment primitive
    ///
    /// The gap test uses the coordinates from before this stage. Within slack:
    /// a pinned side is copied onto an unpinned one; two unpinned sides either
    /// hard-attach (`a` copied onto `b`) or meet at their midpoint; two pinned
    /// sides are left alone. Written sides are pinned and recorded.
    fn align(&mut self, a: SideRef, b: SideRef, slack: f64, hard_attach: bool) {
        let gap = (self.original[a.0].side(a.1) - self.original[b.0].side(b.1)).abs();
        if gap > slack {
            return;
        }

        let a_value = self.boxes[a.0].side(a.1);
        let b_value = self.boxes[b.0].side(b.1);
        let value = match (self.is_pinned(a), self.is_pinned(b)) {
            (true, true) => return,
            (true, false) => a_value,
            (false, true) => b_value,
            (false, false) if hard_attach => a_value,
            (false, false) => (a_value + b_value) / 2.0,
        };

        for (room, side) in [a, b] {
            self.boxes[room].set_side(side, value);
            self.updated.pin(room, side);
            self.constraints.push(Constraint::new(room, side, value));
        }
    }

    fn is_pinned(&self, (room, side): SideRef) -> bool {
        self.updated.is_pinned(room, side)
    }

    /// Restore any axis of `room` that lost its extent
    fn revert_collapsed(&mut self, room: usize) {
        for (low, high) in [(Side::X1, Side::X2), (Side::Y1, Side::Y2)] {
            let rect = &self.boxes[room];
            if rect.side(high) - rect.side(low) > 0.0 {
                continue;
            }

            tracing::debug!(room, ?low, ?high, "Reverting collapsed box axis");
            let original = self.original[room];
            for side in [low, high] {
                self.boxes[room].set_side(side, original.side(side));
                self.updated.unpin(room, side);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use approx::assert_relative_eq;

    fn edge(u: usize, v: usize, relation: AdjacencyRelation) -> AdjacencyEdge {
        AdjacencyEdge::new(u, v, relation)
    }

    #[test]
    fn test_left_of_copies_pinned_side() {
        let boxes = vec![
            Rect::new(0.0, 0.0, 50.0, 50.0),
            Rect::new(55.0, 0.0, 100.0, 50.0),
        ];
        let mut updated = UpdatedMask::new(2);
        updated.pin(0, Side::X2);

        let output = align_neighbor(
            &boxes,
            &[edge(0, 1, AdjacencyRelation::LeftOf)],
            &updated,
            24.0,
        )
        .unwrap();

        assert_eq!(output.boxes[0], Rect::new(0.0, 0.0, 50.0, 50.0));
        assert_eq!(output.boxes[1], Rect::new(50.0, 0.0, 100.0, 50.0));
        assert!(output.updated.is_pinned(1, Side::X1));
        assert!(output.updated.is_pinned(1, Side::Y1));
        assert!(output.updated.is_pinned(0, Side::Y2));
    }

    #[test]
    fn test_left_of_meets_at_midpoint_when_unpinned() {
        let boxes = vec![
            Rect::new(0.0, 0.0, 50.0, 50.0),
            Rect::new(56.0, 4.0, 100.0, 50.0),
        ];
        let output = align_neighbor(
            &boxes,
            &[edge(0, 1, AdjacencyRelation::LeftOf)],
            &UpdatedMask::new(2),
            24.0,
        )
        .unwrap();

        assert_relative_eq!(output.boxes[0].x2, 53.0);
        assert_relative_eq!(output.boxes[1].x1, 53.0);
        assert_relative_eq!(output.boxes[0].y1, 2.0);
        assert_relative_eq!(output.boxes[1].y1, 2.0);
    }

    #[test]
    fn test_sides_beyond_slack_are_untouched() {
        let boxes = vec![
            Rect::new(0.0, 0.0, 50.0, 50.0),
            Rect::new(80.0, 20.0, 120.0, 50.0),
        ];
        let output = align_neighbor(
            &boxes,
            &[edge(0, 1, AdjacencyRelation::LeftOf)],
            &UpdatedMask::new(2),
            24.0,
        )
        .unwrap();

        // x gap 30 > 24 and y1 gap 20 > 12: only the bottoms align
        assert_eq!(output.boxes[1].x1, 80.0);
        assert_eq!(output.boxes[1].y1, 20.0);
        assert_eq!(output.constraints.len(), 2);
    }

    #[test]
    fn test_both_pinned_is_left_alone() {
        let boxes = vec![
            Rect::new(0.0, 0.0, 50.0, 50.0),
            Rect::new(52.0, 0.0, 100.0, 50.0),
        ];
        let mut updated = UpdatedMask::new(2);
        updated.pin_all(0);
        updated.pin_all(1);

        let output = align_neighbor(
            &boxes,
            &[edge(0, 1, AdjacencyRelation::LeftOf)],
            &updated,
            24.0,
        )
        .unwrap();
        assert_eq!(output.boxes, boxes);
        assert!(output.constraints.is_empty());
    }

    #[test]
    fn test_inside_hard_attaches_v_onto_u() {
        let boxes = vec![
            Rect::new(0.0, 0.0, 100.0, 100.0),
            Rect::new(5.0, 5.0, 40.0, 90.0),
        ];
        let output = align_neighbor(
            &boxes,
            &[edge(0, 1, AdjacencyRelation::Inside)],
            &UpdatedMask::new(2),
            24.0,
        )
        .unwrap();

        // Sides within slack copy v's value onto u; x2 is 60 apart and stays
        assert_eq!(output.boxes[0], Rect::new(5.0, 5.0, 100.0, 90.0));
        assert_eq!(output.boxes[1], boxes[1]);
    }

    #[test]
    fn test_surrounding_hard_attaches_u_onto_v() {
        let boxes = vec![
            Rect::new(0.0, 0.0, 100.0, 100.0),
            Rect::new(5.0, 5.0, 40.0, 90.0),
        ];
        let output = align_neighbor(
            &boxes,
            &[edge(0, 1, AdjacencyRelation::Surrounding)],
            &UpdatedMask::new(2),
            24.0,
        )
        .unwrap();

        assert_eq!(output.boxes[0], boxes[0]);
        assert_eq!(output.boxes[1], Rect::new(0.0, 0.0, 40.0, 100.0));
    }

    #[test]
    fn test_left_above_uses_facing_side() {
        // u sits up and to the left of v
        let boxes = vec![
            Rect::new(0.0, 0.0, 40.0, 40.0),
            Rect::new(44.0, 46.0, 100.0, 100.0),
        ];
        let mut updated = UpdatedMask::new(2);
        updated.pin(0, Side::X2);
        updated.pin(0, Side::Y2);

        let output = align_neighbor(
            &boxes,
            &[edge(0, 1, AdjacencyRelation::LeftAbove)],
            &updated,
            24.0,
        )
        .unwrap();

        assert_eq!(output.boxes[1], Rect::new(40.0, 40.0, 100.0, 100.0));
    }

    #[test]
    fn test_right_below_picks_nearer_side_of_v() {
        // v's right side (x2 = 58) is nearer u.x1 = 60 than its left side
        let boxes = vec![
            Rect::new(60.0, 60.0, 100.0, 100.0),
            Rect::new(20.0, 0.0, 58.0, 62.0),
        ];
        let mut updated = UpdatedMask::new(2);
        updated.pin_all(0);

        let output = align_neighbor(
            &boxes,
            &[edge(0, 1, AdjacencyRelation::RightBelow)],
            &updated,
            24.0,
        )
        .unwrap();

        assert_eq!(output.boxes[1].x2, 60.0);
        assert_eq!(output.boxes[1].y2, 60.0);
    }

    #[test]
    fn test_collapsed_axis_is_reverted() {
        // v is a thin strip at the bottom of u; snapping v.y1 onto u.y2 collapses it
        let boxes = vec![
            Rect::new(0.0, 0.0, 50.0, 60.0),
            Rect::new(0.0, 52.0, 50.0, 60.0),
        ];
        let mut updated = UpdatedMask::new(2);
        updated.pin(0, Side::Y2);
        updated.pin(1, Side::Y2);

        let output = align_neighbor(
            &boxes,
            &[edge(0, 1, AdjacencyRelation::Above)],
            &updated,
            24.0,
        )
        .unwrap();

        // v.y1 took u.y2 = 60 and lost its height, so the y axis is restored
        assert_eq!(output.boxes[1].y1, 52.0);
        assert_eq!(output.boxes[1].y2, 60.0);
        assert!(!output.updated.is_pinned(1, Side::Y1));
        assert!(!output.updated.is_pinned(1, Side::Y2));
        // The x axis alignment stands
        assert!(output.updated.is_pinned(1, Side::X1));
        assert!(output.boxes.iter().all(|b| !b.is_degenerate()));
    }

    #[test]
    fn test_edges_with_more_pinned_sides_go_first() {
        // Room 1 is shared: edge 1 (fully pinned room 2) must win and fix
        // room 1's x1 before edge 0 can average it with room 0.
        let boxes = vec![
            Rect::new(0.0, 0.0, 40.0, 40.0),
            Rect::new(44.0, 0.0, 80.0, 40.0),
            Rect::new(0.0, 50.0, 42.0, 90.0),
        ];
        let mut updated = UpdatedMask::new(3);
        updated.pin_all(2);
        let edges = [
            edge(0, 1, AdjacencyRelation::LeftOf),
            edge(2, 1, AdjacencyRelation::Below),
        ];

        let output = align_neighbor(&boxes, &edges, &updated, 24.0).unwrap();

        // Edge 1: room 1 below room 2 -> v.y2 (40) ~ u.y1 (50) -> 50;
        //         x1 44 ~ 0 out of half slack, x2 80 ~ 42 out
        assert_eq!(output.boxes[1].y2, 50.0);
        // Edge 0: x1 of room 1 and x2 of room 0 unpinned -> midpoint 42
        assert_relative_eq!(output.boxes[1].x1, 42.0);
        assert_relative_eq!(output.boxes[0].x2, 42.0);
        // y2 of room 1 is pinned at 50, room 0's y2 (40) within 12 copies it
        assert_eq!(output.boxes[0].y2, 50.0);
    }

    #[test]
    fn test_rerun_keeps_settled_layout() {
        let boxes = vec![
            Rect::new(0.0, 0.0, 50.0, 50.0),
            Rect::new(55.0, 3.0, 100.0, 48.0),
            Rect::new(2.0, 58.0, 100.0, 100.0),
        ];
        let edges = [
            edge(0, 1, AdjacencyRelation::LeftOf),
            edge(0, 2, AdjacencyRelation::Above),
        ];

        let first = align_neighbor(&boxes, &edges, &UpdatedMask::new(3), 24.0).unwrap();
        let second = align_neighbor(&first.boxes, &edges, &first.updated, 24.0).unwrap();
        assert_eq!(first.boxes, second.boxes);
    }

    #[test]
    fn test_rerun_can_move_a_side_skipped_on_first_pass() {
        // Room 0's bottom moves from 0 to 6 on the first pass. Room 1's
        // bottom is 13 away from the old value, so it is skipped; on a
        // second pass it is only 7 away from the pinned 6 and gets copied.
        let boxes = vec![
            Rect::new(0.0, 0.0, 50.0, 50.0),
            Rect::new(55.0, 13.0, 100.0, 50.0),
            Rect::new(0.0, -20.0, 50.0, 12.0),
        ];
        let edges = [
            edge(2, 0, AdjacencyRelation::Above),
            edge(0, 1, AdjacencyRelation::LeftOf),
        ];

        let first = align_neighbor(&boxes, &edges, &UpdatedMask::new(3), 24.0).unwrap();
        assert_eq!(first.boxes[0], Rect::new(0.0, 6.0, 50.0, 50.0));
        assert_eq!(first.boxes[1], Rect::new(50.0, 13.0, 100.0, 50.0));
        assert!(!first.updated.is_pinned(1, Side::Y1));

        let second = align_neighbor(&first.boxes, &edges, &first.updated, 24.0).unwrap();
        assert_eq!(second.boxes[1], Rect::new(50.0, 6.0, 100.0, 50.0));
        assert_eq!(second.boxes[0], first.boxes[0]);
    }

    #[test]
    fn test_edge_naming_missing_room_is_rejected() {
        let boxes = vec![Rect::new(0.0, 0.0, 50.0, 50.0)];
        let result = align_neighbor(
            &boxes,
            &[edge(0, 3, AdjacencyRelation::LeftOf)],
            &UpdatedMask::new(1),
            24.0,
        );
        assert_eq!(
            result,
            Err(Error::InvalidInput(InvalidInput::EdgeOutOfRange {
                edge: 0,
                room: 3,
                rooms: 1
            }))
        );
    }

    #[test]
    fn test_mask_size_must_match_boxes() {
        let boxes = vec![
            Rect::new(0.0, 0.0, 50.0, 50.0),
            Rect::new(50.0, 0.0, 100.0, 50.0),
        ];
        let result = align_neighbor(&boxes, &[], &UpdatedMask::new(1), 24.0);
        assert_eq!(
            result,
            Err(Error::InvalidInput(InvalidInput::MaskMismatch { mask: 1, rooms: 2 }))
        );
    }
}
