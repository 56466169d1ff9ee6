// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Floor plan alignment geometry
//!
//! Axis-aligned room boxes, polygons with holes, and 2D boolean operations
//! (via i_overlay) used to carve room shapes out of a building outline.

pub mod bool2d;
pub mod error;
pub mod polygon;
pub mod rect;

// Re-export nalgebra types for convenience
pub use nalgebra::Point2;

pub use bool2d::{difference, difference_all, intersection, union};
pub use error::{Error, Result};
pub use polygon::{Polygon2D, Region};
pub use rect::{Rect, Side};
