// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Wall snapping and front door clearance

use crate::types::{Boundary, Constraint, Door, RoomType, StageOutput, UpdatedMask};
use floorplan_align_geometry::{bool2d, Rect, Region, Side};

/// Distance reported for sides without a compatible wall
pub const NO_MATCH_DISTANCE: f64 = 256.0;

/// Tolerance when deciding whether a shrunk box actually moved
const BOUNDS_EPSILON: f64 = 1e-9;

/// Nearest wall found for one box side
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SideMatch {
    /// Coordinate of the wall the side would snap to
    pub value: f64,
    pub distance: f64,
    /// Index of the wall in the structural ring, `None` when unmatched
    pub segment: Option<usize>,
}

impl SideMatch {
    pub const UNMATCHED: SideMatch = SideMatch {
        value: NO_MATCH_DISTANCE,
        distance: NO_MATCH_DISTANCE,
        segment: None,
    };

    pub fn is_matched(&self) -> bool {
        self.segment.is_some()
    }
}

/// Clearance rectangle in front of the door
///
/// The door's bounding box is extended by `threshold` on the side given by
/// the orientation code; unknown codes leave it unextended.
pub fn entrance_zone(door: &Door, threshold: f64) -> Rect {
    let [a, b] = door.segment;
    let mut zone = Rect::new(a.x.min(b.x), a.y.min(b.y), a.x.max(b.x), a.y.max(b.y));

    match door.orientation {
        0 => zone.y2 += threshold,
        1 => zone.x1 -= threshold,
        2 => zone.y1 -= threshold,
        3 => zone.x2 += threshold,
        _ => {}
    }

    zone
}

/// Nearest compatible boundary wall for each side of `rect`, in `Side` order
///
/// Vertical walls compete for the left and right sides, horizontal walls for
/// the top and bottom. A wall only qualifies for a side when it lies strictly
/// outside that side; the near side is tried first and the far side only when
/// the near side rejects the wall.
pub fn nearest_wall_sides(rect: &Rect, boundary: &Boundary) -> [SideMatch; 4] {
    let mut matches = [SideMatch::UNMATCHED; 4];

    for wall in boundary.wall_segments() {
        if wall.is_vertical() {
            let sx = wall.start.x;
            let sy1 = wall.start.y.min(wall.end.y);
            let sy2 = wall.start.y.max(wall.end.y);
            let gap = range_gap(sy1, sy2, rect.y1, rect.y2);

            let offset1 = rect.x1 - sx;
            let offset2 = rect.x2 - sx;
            let dist1 = offset1.hypot(gap);
            let dist2 = offset2.hypot(gap);

            let left = &matches[Side::X1.index()];
            if dist1 < left.distance && dist1 <= dist2 && offset1 > 0.0 {
                matches[Side::X1.index()] = SideMatch {
                    value: sx,
                    distance: dist1,
                    segment: Some(wall.index),
                };
            } else if dist2 < matches[Side::X2.index()].distance && offset2 < 0.0 {
                matches[Side::X2.index()] = SideMatch {
                    value: sx,
                    distance: dist2,
                    segment: Some(wall.index),
                };
            }
        } else {
            let sy = wall.start.y;
            let sx1 = wall.start.x.min(wall.end.x);
            let sx2 = wall.start.x.max(wall.end.x);
            let gap = range_gap(sx1, sx2, rect.x1, rect.x2);

            let offset1 = rect.y1 - sy;
            let offset2 = rect.y2 - sy;
            let dist1 = offset1.hypot(gap);
            let dist2 = offset2.hypot(gap);

            let top = &matches[Side::Y1.index()];
            if dist1 <= dist2 && dist1 < top.distance && offset1 > 0.0 {
                matches[Side::Y1.index()] = SideMatch {
                    value: sy,
                    distance: dist1,
                    segment: Some(wall.index),
                };
            } else if dist2 < matches[Side::Y2.index()].distance && offset2 < 0.0 {
                matches[Side::Y2.index()] = SideMatch {
                    value: sy,
                    distance: dist2,
                    segment: Some(wall.index),
                };
            }
        }
    }

    matches
}

/// Gap between the wall's extent `[s1, s2]` and the box's extent `[b1, b2]`
fn range_gap(s1: f64, s2: f64, b1: f64, b2: f64) -> f64 {
    if s2 <= b1 {
        b1 - s2
    } else if s1 >= b2 {
        s1 - b2
    } else {
        0.0
    }
}

/// Bounds of `rect - entrance`, keeping the largest piece when it splits
pub fn shrink_to_avoid(rect: &Rect, entrance: &Rect) -> Rect {
    let remaining = bool2d::difference(&Region::from_rect(rect), &Region::from_rect(entrance));

    let bounds = match &remaining {
        Region::Empty => None,
        Region::Polygon(poly) => poly.bounds(),
        Region::MultiPolygon(_) => remaining.largest().and_then(|p| p.bounds()),
    };

    bounds.unwrap_or(*rect)
}

/// Snap room sides to nearby boundary walls and clear the door zone
///
/// Sides within `threshold` of a compatible wall take the wall's coordinate
/// and are pinned. Rooms other than the living room and entrance that reach
/// into the door clearance are shrunk away from it.
pub fn align_with_boundary(
    boxes: &[Rect],
    boundary: &Boundary,
    threshold: f64,
    room_types: &[RoomType],
) -> StageOutput {
    let mut new_boxes = boxes.to_vec();
    let mut updated = UpdatedMask::new(boxes.len());
    let mut constraints = Vec::new();

    for (room, rect) in new_boxes.iter_mut().enumerate() {
        let matches = nearest_wall_sides(rect, boundary);
        for side in Side::ALL {
            let m = matches[side.index()];
            if m.is_matched() && m.distance <= threshold {
                rect.set_side(side, m.value);
                updated.pin(room, side);
                constraints.push(Constraint::new(room, side, m.value));
            }
        }
    }

    let Some(door) = boundary.door() else {
        return StageOutput {
            constraints,
            boxes: new_boxes,
            updated,
        };
    };
    let entrance = entrance_zone(&door, threshold);

    for (room, rect) in new_boxes.iter_mut().enumerate() {
        let exempt = room_types.get(room).is_some_and(|t| t.is_door_exempt());
        if exempt || !rect.intersects(&entrance) {
            continue;
        }

        *rect = shrink_to_avoid(rect, &entrance);
        if !rect.approx_eq(&boxes[room], BOUNDS_EPSILON) {
            tracing::debug!(room, "Shrunk room clear of the door zone");
            updated.pin_all(room);
        }
    }

    StageOutput {
        constraints,
        boxes: new_boxes,
        updated,
    }
}
