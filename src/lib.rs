// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polycut Inc.

//! Polycut CSG Engine
//!
//! Constructive solid geometry over polygon-soup meshes. Boolean volume
//! operations (union, subtract, intersect, xor and material stenciling)
//! classify and re-split polygons against each operand's solid via BSP
//! trees; plane splitting and capped clipping carve meshes directly.

pub mod error;
pub mod geometry;
pub mod utils;

pub use error::ValidationError;
pub use geometry::{
    analyze, BoundingBox, BspNode, ClipMode, Material, Mesh, MeshStats, Plane, PlaneComparison,
    Polygon, Vertex,
};
pub use utils::math::EPSILON;
