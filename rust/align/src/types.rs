// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Core types for floor plan alignment

use crate::error::{Error, InvalidInput, Result};
use floorplan_align_geometry::{Rect, Region, Side};
use nalgebra::Point2;
use serde::{Deserialize, Serialize};

/// A 2D point (simplified for serialization)
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct Point2D {
    pub x: f64,
    pub y: f64,
}

impl Point2D {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn to_nalgebra(&self) -> Point2<f64> {
        Point2::new(self.x, self.y)
    }

    pub fn from_nalgebra(p: &Point2<f64>) -> Self {
        Self { x: p.x, y: p.y }
    }
}

/// One vertex of the building outline
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct BoundaryVertex {
    pub x: f64,
    pub y: f64,
    /// Orientation code (0-3) of the edge starting at this vertex; odd = vertical
    pub direction: u8,
    /// Inserted point (e.g. a door endpoint), not part of the structural outline
    #[serde(default)]
    pub synthetic: bool,
}

impl BoundaryVertex {
    pub fn new(x: f64, y: f64, direction: u8, synthetic: bool) -> Self {
        Self {
            x,
            y,
            direction,
            synthetic,
        }
    }

    pub fn point(&self) -> Point2D {
        Point2D::new(self.x, self.y)
    }
}

/// Straight wall between two consecutive structural vertices
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WallSegment {
    pub start: Point2D,
    pub end: Point2D,
    pub direction: u8,
    /// Position of the start vertex in the structural ring
    pub index: usize,
}

impl WallSegment {
    pub fn is_vertical(&self) -> bool {
        self.direction % 2 == 1
    }
}

/// Front door taken from the first two points of the outline
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Door {
    pub segment: [Point2D; 2],
    /// 0 extends the clearance towards +y, 1 towards -x, 2 towards -y, 3 towards +x
    pub orientation: u8,
}

/// Building outline as an ordered vertex ring
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(transparent)]
pub struct Boundary {
    pub vertices: Vec<BoundaryVertex>,
}

impl Boundary {
    pub fn new(vertices: Vec<BoundaryVertex>) -> Self {
        Self { vertices }
    }

    /// Vertices of the structural outline (synthetic points removed)
    pub fn structural_vertices(&self) -> impl Iterator<Item = &BoundaryVertex> {
        self.vertices.iter().filter(|v| !v.synthetic)
    }

    /// Structural walls, closing back to the first vertex
    pub fn wall_segments(&self) -> Vec<WallSegment> {
        let structural: Vec<&BoundaryVertex> = self.structural_vertices().collect();
        let n = structural.len();
        (0..n)
            .map(|i| {
                let start = structural[i];
                let end = structural[(i + 1) % n];
                WallSegment {
                    start: start.point(),
                    end: end.point(),
                    direction: start.direction,
                    index: i,
                }
            })
            .collect()
    }

    /// Structural building polygon
    pub fn polygon(&self) -> Result<Region> {
        let ring: Vec<Point2<f64>> = self
            .structural_vertices()
            .map(|v| Point2::new(v.x, v.y))
            .collect();
        if ring.len() < 3 {
            return Err(Error::InvalidInput(InvalidInput::BoundaryTooSmall {
                vertices: ring.len(),
            }));
        }
        Ok(Region::from_ring(&ring)?)
    }

    /// Door segment and orientation, read from the raw ring
    pub fn door(&self) -> Option<Door> {
        match self.vertices.as_slice() {
            [first, second, ..] => Some(Door {
                segment: [first.point(), second.point()],
                orientation: first.direction,
            }),
            _ => None,
        }
    }
}

/// Room category label
///
/// Labels form an open set; the named constants cover the usual vocabulary.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(transparent)]
pub struct RoomType(pub u8);

impl RoomType {
    pub const LIVING_ROOM: RoomType = RoomType(0);
    pub const MASTER_ROOM: RoomType = RoomType(1);
    pub const KITCHEN: RoomType = RoomType(2);
    pub const BATHROOM: RoomType = RoomType(3);
    pub const DINING_ROOM: RoomType = RoomType(4);
    pub const CHILD_ROOM: RoomType = RoomType(5);
    pub const STUDY_ROOM: RoomType = RoomType(6);
    pub const SECOND_ROOM: RoomType = RoomType(7);
    pub const GUEST_ROOM: RoomType = RoomType(8);
    pub const BALCONY: RoomType = RoomType(9);
    pub const ENTRANCE: RoomType = RoomType(10);
    pub const STORAGE: RoomType = RoomType(11);

    /// The room that absorbs unclaimed floor area
    pub fn is_primary(self) -> bool {
        self == RoomType::LIVING_ROOM
    }

    /// Rooms allowed to overlap the door clearance zone
    pub fn is_door_exempt(self) -> bool {
        self == RoomType::LIVING_ROOM || self == RoomType::ENTRANCE
    }
}

/// Index of the primary room: the first living room, or room 0
pub fn primary_room(room_types: &[RoomType]) -> Option<usize> {
    if room_types.is_empty() {
        return None;
    }
    Some(room_types.iter().position(|t| t.is_primary()).unwrap_or(0))
}

/// Spatial relation of room `u` to room `v`
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(try_from = "u8", into = "u8")]
pub enum AdjacencyRelation {
    LeftAbove,
    LeftBelow,
    LeftOf,
    Above,
    Inside,
    Surrounding,
    Below,
    RightOf,
    RightAbove,
    RightBelow,
}

impl AdjacencyRelation {
    pub fn code(self) -> u8 {
        match self {
            AdjacencyRelation::LeftAbove => 0,
            AdjacencyRelation::LeftBelow => 1,
            AdjacencyRelation::LeftOf => 2,
            AdjacencyRelation::Above => 3,
            AdjacencyRelation::Inside => 4,
            AdjacencyRelation::Surrounding => 5,
            AdjacencyRelation::Below => 6,
            AdjacencyRelation::RightOf => 7,
            AdjacencyRelation::RightAbove => 8,
            AdjacencyRelation::RightBelow => 9,
        }
    }
}

impl TryFrom<u8> for AdjacencyRelation {
    type Error = String;

    fn try_from(code: u8) -> std::result::Result<Self, Self::Error> {
        Ok(match code {
            0 => AdjacencyRelation::LeftAbove,
            1 => AdjacencyRelation::LeftBelow,
            2 => AdjacencyRelation::LeftOf,
            3 => AdjacencyRelation::Above,
            4 => AdjacencyRelation::Inside,
            5 => AdjacencyRelation::Surrounding,
            6 => AdjacencyRelation::Below,
            7 => AdjacencyRelation::RightOf,
            8 => AdjacencyRelation::RightAbove,
            9 => AdjacencyRelation::RightBelow,
            other => return Err(format!("unknown adjacency relation code {}", other)),
        })
    }
}

impl From<AdjacencyRelation> for u8 {
    fn from(relation: AdjacencyRelation) -> u8 {
        relation.code()
    }
}

/// Edge of the room adjacency graph, as supplied by the caller
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct RawEdge {
    pub u: usize,
    pub v: usize,
    pub relation: u8,
}

/// Validated adjacency edge
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct AdjacencyEdge {
    /// Reference room
    pub u: usize,
    /// Related room
    pub v: usize,
    pub relation: AdjacencyRelation,
}

impl AdjacencyEdge {
    pub fn new(u: usize, v: usize, relation: AdjacencyRelation) -> Self {
        Self { u, v, relation }
    }

    pub fn touches(&self, room: usize) -> bool {
        self.u == room || self.v == room
    }
}

/// Per-room, per-side flags marking coordinates fixed by an alignment decision
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(transparent)]
pub struct UpdatedMask {
    sides: Vec<[bool; 4]>,
}

impl UpdatedMask {
    pub fn new(rooms: usize) -> Self {
        Self {
            sides: vec![[false; 4]; rooms],
        }
    }

    /// Number of rooms covered
    pub(crate) fn rooms(&self) -> usize {
        self.sides.len()
    }

    pub fn is_pinned(&self, room: usize, side: Side) -> bool {
        self.sides[room][side.index()]
    }

    pub fn pin(&mut self, room: usize, side: Side) {
        self.sides[room][side.index()] = true;
    }

    pub fn unpin(&mut self, room: usize, side: Side) {
        self.sides[room][side.index()] = false;
    }

    pub fn pin_all(&mut self, room: usize) {
        self.sides[room] = [true; 4];
    }

    /// Number of pinned sides of one room
    pub fn pinned_count(&self, room: usize) -> usize {
        self.sides[room].iter().filter(|&&p| p).count()
    }
}

/// Audit record of a pinned side
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct Constraint {
    pub room: usize,
    pub side: Side,
    pub value: f64,
}

impl Constraint {
    pub fn new(room: usize, side: Side, value: f64) -> Self {
        Self { room, side, value }
    }
}

/// Output of an aligner stage
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StageOutput {
    pub constraints: Vec<Constraint>,
    pub boxes: Vec<Rect>,
    pub updated: UpdatedMask,
}

/// Alignment tolerances
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct AlignConfig {
    /// Maximum distance for snapping a box side onto a boundary wall
    pub wall_threshold: f64,
    /// Extra slack added to `wall_threshold` when aligning neighbouring rooms
    pub neighbor_margin: f64,
    /// Drop adjacency edges touching the living room before neighbour alignment
    pub skip_living_room_edges: bool,
}

impl AlignConfig {
    pub fn neighbor_threshold(&self) -> f64 {
        self.wall_threshold + self.neighbor_margin
    }
}

impl Default for AlignConfig {
    fn default() -> Self {
        Self {
            wall_threshold: 18.0,
            neighbor_margin: 6.0,
            skip_living_room_edges: true,
        }
    }
}

/// Everything the pipeline consumes
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FloorPlanInput {
    pub boundary: Boundary,
    pub boxes: Vec<Rect>,
    pub room_types: Vec<RoomType>,
    #[serde(default)]
    pub edges: Vec<RawEdge>,
}

/// Final room layout
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AlignmentResult {
    /// Updated box per room
    pub boxes: Vec<Rect>,
    /// Carving order: earlier rooms cede overlapping area to later ones
    pub order: Vec<usize>,
    /// Vertex ring per room, empty when the room has no area left
    pub room_polygons: Vec<Vec<Point2D>>,
    /// Every side pinned by wall or neighbour alignment
    pub constraints: Vec<Constraint>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square_boundary() -> Boundary {
        Boundary::new(vec![
            BoundaryVertex::new(0.0, 0.0, 0, false),
            BoundaryVertex::new(100.0, 0.0, 1, false),
            BoundaryVertex::new(100.0, 100.0, 2, false),
            BoundaryVertex::new(0.0, 100.0, 3, false),
        ])
    }

    #[test]
    fn test_relation_codes_round_trip() {
        for code in 0..10u8 {
            let relation = AdjacencyRelation::try_from(code).unwrap();
            assert_eq!(relation.code(), code);
        }
        assert!(AdjacencyRelation::try_from(10).is_err());
    }

    #[test]
    fn test_wall_segments_skip_synthetic_vertices() {
        let mut boundary = square_boundary();
        boundary
            .vertices
            .insert(1, BoundaryVertex::new(40.0, 0.0, 0, true));
        let walls = boundary.wall_segments();
        assert_eq!(walls.len(), 4);
        assert_eq!(walls[0].end, Point2D::new(100.0, 0.0));
        assert!(walls[1].is_vertical());
        assert_eq!(walls[3].end, Point2D::new(0.0, 0.0));
    }

    #[test]
    fn test_door_uses_raw_ring() {
        let mut boundary = square_boundary();
        boundary
            .vertices
            .insert(0, BoundaryVertex::new(40.0, 0.0, 2, true));
        let door = boundary.door().unwrap();
        assert_eq!(door.segment[0], Point2D::new(40.0, 0.0));
        assert_eq!(door.segment[1], Point2D::new(0.0, 0.0));
        assert_eq!(door.orientation, 2);
    }

    #[test]
    fn test_polygon_requires_three_structural_vertices() {
        let boundary = Boundary::new(vec![
            BoundaryVertex::new(0.0, 0.0, 0, false),
            BoundaryVertex::new(10.0, 0.0, 1, false),
            BoundaryVertex::new(10.0, 10.0, 2, true),
        ]);
        assert!(matches!(
            boundary.polygon(),
            Err(Error::InvalidInput(InvalidInput::BoundaryTooSmall { vertices: 2 }))
        ));
        assert!((square_boundary().polygon().unwrap().area() - 10000.0).abs() < 1e-9);
    }

    #[test]
    fn test_primary_room_fallback() {
        assert_eq!(primary_room(&[]), None);
        assert_eq!(primary_room(&[RoomType::KITCHEN, RoomType::BATHROOM]), Some(0));
        assert_eq!(
            primary_room(&[RoomType::KITCHEN, RoomType::LIVING_ROOM]),
            Some(1)
        );
    }

    #[test]
    fn test_updated_mask() {
        let mut mask = UpdatedMask::new(2);
        mask.pin(1, Side::X2);
        mask.pin(1, Side::Y1);
        assert_eq!(mask.pinned_count(1), 2);
        mask.unpin(1, Side::X2);
        assert!(!mask.is_pinned(1, Side::X2));
        mask.pin_all(0);
        assert_eq!(mask.pinned_count(0), 4);
    }

    #[test]
    fn test_config_defaults() {
        let config = AlignConfig::default();
        assert_eq!(config.neighbor_threshold(), 24.0);
        assert!(config.skip_living_room_edges);
    }
}
