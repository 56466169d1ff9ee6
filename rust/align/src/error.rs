// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Error types for floor plan alignment.
//!
//! Only input-contract violations surface as errors. Rooms that fall outside
//! the building, collapse, or form overlap cycles are recovered in place.

/// Result type alias for alignment operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur during alignment.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum Error {
    /// The caller supplied inputs that cannot be processed.
    #[error("invalid input: {0}")]
    InvalidInput(#[from] InvalidInput),

    /// Geometry construction failed.
    #[error("geometry error: {0}")]
    Geometry(#[from] floorplan_align_geometry::Error),
}

/// Input-contract violations.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum InvalidInput {
    /// The structural boundary has fewer than 3 vertices.
    #[error("boundary needs at least 3 structural vertices, got {vertices}")]
    BoundaryTooSmall { vertices: usize },

    /// `boxes` and `room_types` disagree on the number of rooms.
    #[error("{boxes} boxes but {room_types} room types")]
    LengthMismatch { boxes: usize, room_types: usize },

    /// An adjacency edge names a room that does not exist.
    #[error("edge {edge} references room {room}, but there are only {rooms} rooms")]
    EdgeOutOfRange { edge: usize, room: usize, rooms: usize },

    /// An adjacency edge carries a relation code outside 0-9.
    #[error("edge {edge} has unknown relation code {code}")]
    UnknownRelation { edge: usize, code: u8 },

    /// A room box has a NaN or infinite coordinate.
    #[error("room {room} has a non-finite box coordinate")]
    NonFiniteBox { room: usize },

    /// A carving order is not a permutation of the room indices.
    #[error("carving order is not a permutation of {rooms} rooms")]
    InvalidOrder { rooms: usize },

    /// The pinned-side mask covers a different number of rooms than the boxes.
    #[error("updated mask covers {mask} rooms but there are {rooms} boxes")]
    MaskMismatch { mask: usize, rooms: usize },
}
