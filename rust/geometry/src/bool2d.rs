// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! 2D Boolean Operations on Room Regions
//!
//! Intersection, difference and union of [`Region`]s using the i_overlay crate.
//! Results keep every disjoint fragment; callers choose how to treat
//! multi-part output.

use crate::polygon::{encloses_area, oriented, Polygon2D, Region, Winding};
use i_overlay::core::fill_rule::FillRule;
use i_overlay::core::overlay_rule::OverlayRule;
use i_overlay::float::single::SingleFloatOverlay;
use nalgebra::Point2;

/// Intersection: `subject ∩ clip`
pub fn intersection(subject: &Region, clip: &Region) -> Region {
    if subject.is_empty() || clip.is_empty() {
        return Region::Empty;
    }
    overlay(subject, &region_to_paths(clip), OverlayRule::Intersect)
}

/// Difference: `subject - clip`
pub fn difference(subject: &Region, clip: &Region) -> Region {
    if subject.is_empty() || clip.is_empty() {
        return subject.clone();
    }
    overlay(subject, &region_to_paths(clip), OverlayRule::Difference)
}

/// Subtract several clip regions in a single boolean operation
///
/// Overlapping clips are merged by the non-zero fill rule, so the result is
/// the same as subtracting them one by one.
pub fn difference_all(subject: &Region, clips: &[Region]) -> Region {
    if subject.is_empty() {
        return Region::Empty;
    }

    let clip: Vec<Vec<[f64; 2]>> = clips.iter().flat_map(region_to_paths).collect();
    if clip.is_empty() {
        return subject.clone();
    }
    overlay(subject, &clip, OverlayRule::Difference)
}

/// Union: `subject ∪ clip`
pub fn union(subject: &Region, clip: &Region) -> Region {
    if subject.is_empty() {
        return clip.clone();
    }
    if clip.is_empty() {
        return subject.clone();
    }
    overlay(subject, &region_to_paths(clip), OverlayRule::Union)
}

// ============================================================================
// Internal Helper Functions
// ============================================================================

fn overlay(subject: &Region, clip: &Vec<Vec<[f64; 2]>>, rule: OverlayRule) -> Region {
    let subject = region_to_paths(subject);

    // Non-zero keeps overlapping clip rectangles from cancelling each other out
    let shapes = subject.overlay(clip, rule, FillRule::NonZero);

    shapes_to_region(&shapes)
}

/// Convert a Region to i_overlay path format (outer rings CCW, holes CW)
fn region_to_paths(region: &Region) -> Vec<Vec<[f64; 2]>> {
    let mut paths = Vec::new();
    for part in region.fragments() {
        paths.push(contour_to_path(&oriented(&part.outer, Winding::CounterClockwise)));
        for hole in &part.holes {
            paths.push(contour_to_path(&oriented(hole, Winding::Clockwise)));
        }
    }
    paths
}

/// Convert a Point2 contour to i_overlay path format
fn contour_to_path(contour: &[Point2<f64>]) -> Vec<[f64; 2]> {
    contour.iter().map(|p| [p.x, p.y]).collect()
}

fn path_to_contour(path: &[[f64; 2]]) -> Vec<Point2<f64>> {
    path.iter().map(|p| Point2::new(p[0], p[1])).collect()
}

/// Convert i_overlay result shapes back to a Region
///
/// i_overlay returns Vec<Vec<Vec<[f64; 2]>>> where:
/// - Outer Vec: list of shapes
/// - Middle Vec: list of contours per shape (first is outer, rest are holes)
/// - Inner Vec: list of points per contour
fn shapes_to_region(shapes: &[Vec<Vec<[f64; 2]>>]) -> Region {
    let mut polygons = Vec::with_capacity(shapes.len());

    for shape in shapes {
        let Some(outer) = shape.first() else {
            continue;
        };
        let outer = path_to_contour(outer);
        if !encloses_area(&outer) {
            continue;
        }

        let mut polygon = Polygon2D::new(outer);
        for contour in shape.iter().skip(1) {
            let hole = path_to_contour(contour);
            if encloses_area(&hole) {
                polygon.add_hole(hole);
            }
        }
        polygons.push(polygon);
    }

    Region::from_polygons(polygons)
}
