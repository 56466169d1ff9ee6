// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! # Floor Plan Alignment
//!
//! Turns roughly predicted room boxes into a clean, non-overlapping room
//! layout inside a building outline.
//!
//! ## Pipeline
//!
//! - **Wall alignment**: box sides snap onto nearby boundary walls and rooms
//!   are kept out of the entrance zone
//! - **Neighbour alignment**: adjacent rooms share walls, driven by the
//!   caller's adjacency graph
//! - **Order resolution**: rooms are clipped to the building, overlaps are
//!   ranked by area and unclaimed floor goes to the living room
//! - **Extraction**: each room is carved out of the outline in order
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use floorplan_align::{align_floor_plan, AlignConfig, FloorPlanInput};
//!
//! let input: FloorPlanInput = serde_json::from_str(&json)?;
//! let result = align_floor_plan(&input, &AlignConfig::default())?;
//!
//! for (room, ring) in result.room_polygons.iter().enumerate() {
//!     println!("room {}: {} vertices", room, ring.len());
//! }
//! ```

pub mod error;
pub mod extract;
pub mod neighbors;
pub mod order;
pub mod types;
pub mod walls;

pub use error::{Error, InvalidInput, Result};
pub use extract::extract_polygons;
pub use neighbors::align_neighbor;
pub use order::{find_room_order, regularize, OverlapGraph};
pub use types::{
    AdjacencyEdge, AdjacencyRelation, AlignConfig, AlignmentResult, Boundary, BoundaryVertex,
    Constraint, FloorPlanInput, Point2D, RawEdge, RoomType, StageOutput, UpdatedMask,
};
pub use walls::align_with_boundary;

pub use floorplan_align_geometry::{Rect, Side};

/// Check the input contract and convert raw edges to typed ones
pub fn validate(input: &FloorPlanInput) -> Result<Vec<AdjacencyEdge>> {
    let vertices = input.boundary.structural_vertices().count();
    if vertices < 3 {
        return Err(InvalidInput::BoundaryTooSmall { vertices }.into());
    }

    let rooms = input.boxes.len();
    if rooms != input.room_types.len() {
        return Err(InvalidInput::LengthMismatch {
            boxes: rooms,
            room_types: input.room_types.len(),
        }
        .into());
    }

    if let Some(room) = input.boxes.iter().position(|b| !b.is_finite()) {
        return Err(InvalidInput::NonFiniteBox { room }.into());
    }

    input
        .edges
        .iter()
        .enumerate()
        .map(|(index, raw)| -> Result<AdjacencyEdge> {
            for room in [raw.u, raw.v] {
                if room >= rooms {
                    return Err(InvalidInput::EdgeOutOfRange {
                        edge: index,
                        room,
                        rooms,
                    }
                    .into());
                }
            }
            let relation = AdjacencyRelation::try_from(raw.relation).map_err(|_| {
                InvalidInput::UnknownRelation {
                    edge: index,
                    code: raw.relation,
                }
            })?;
            Ok(AdjacencyEdge::new(raw.u, raw.v, relation))
        })
        .collect()
}

/// Remove the edges that touch the first living room, if there is one
fn drop_living_room_edges(edges: &mut Vec<AdjacencyEdge>, room_types: &[RoomType]) {
    let Some(living) = room_types.iter().position(|t| t.is_primary()) else {
        return;
    };
    let before = edges.len();
    edges.retain(|edge| !edge.touches(living));
    if edges.len() != before {
        tracing::debug!(
            room = living,
            dropped = before - edges.len(),
            "Ignoring adjacency edges that touch the living room"
        );
    }
}

/// Run the full alignment pipeline
pub fn align_floor_plan(input: &FloorPlanInput, config: &AlignConfig) -> Result<AlignmentResult> {
    let mut edges = validate(input)?;
    let rooms = input.boxes.len();

    tracing::info!(
        rooms,
        edges = edges.len(),
        boundary_vertices = input.boundary.vertices.len(),
        "Aligning floor plan"
    );

    if config.skip_living_room_edges {
        drop_living_room_edges(&mut edges, &input.room_types);
    }

    let walls = align_with_boundary(
        &input.boxes,
        &input.boundary,
        config.wall_threshold,
        &input.room_types,
    );
    tracing::debug!(constraints = walls.constraints.len(), "Wall alignment done");

    let neighbors = align_neighbor(
        &walls.boxes,
        &edges,
        &walls.updated,
        config.neighbor_threshold(),
    )?;
    tracing::debug!(
        constraints = neighbors.constraints.len(),
        "Neighbour alignment done"
    );

    let (regular, order) = regularize(&neighbors.boxes, &input.boundary, &input.room_types)?;
    tracing::debug!(?order, "Carving order resolved");

    let (boxes, room_polygons) = extract_polygons(&regular, &input.boundary, &order)?;

    let empty = room_polygons.iter().filter(|ring| ring.is_empty()).count();
    tracing::info!(rooms, empty_rooms = empty, "Floor plan aligned");

    let mut constraints = walls.constraints;
    constraints.extend(neighbors.constraints);

    Ok(AlignmentResult {
        boxes,
        order,
        room_polygons,
        constraints,
    })
}
