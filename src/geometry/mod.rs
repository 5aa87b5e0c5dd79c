// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polycut Inc.

//! Geometry module - polygon meshes, BSP trees and boolean operations

mod analytics;
mod bbox;
mod bsp;
mod csg;
mod material;
mod mesh;
mod plane;
mod polygon;
pub mod primitives;
mod vertex;

pub use analytics::{analyze, MeshStats};
pub use bbox::BoundingBox;
pub use bsp::{BspNode, ClipMode};
pub use material::Material;
pub use mesh::Mesh;
pub use plane::{Plane, PlaneComparison};
pub use polygon::Polygon;
pub use vertex::Vertex;
