// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polycut Inc.

//! Mesh statistics: volume, surface area and bounds

use crate::geometry::bbox::BoundingBox;
use crate::geometry::mesh::Mesh;
use serde::{Deserialize, Serialize};

/// Aggregate measurements of a mesh.
///
/// `volume` is the signed volume enclosed by the surface; for a closed,
/// outward-wound mesh it is positive, and a mesh subtracted from itself
/// integrates to zero.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MeshStats {
    pub volume: f64,
    pub surface_area: f64,
    pub bounds: BoundingBox,
    pub polygon_count: usize,
    pub vertex_count: usize,
}

/// Analyze a mesh and compute its statistics
pub fn analyze(mesh: &Mesh) -> MeshStats {
    MeshStats {
        volume: signed_volume(mesh),
        surface_area: mesh.polygons().iter().map(|p| p.area()).sum(),
        bounds: mesh.bounds(),
        polygon_count: mesh.polygon_count(),
        vertex_count: mesh.vertex_count(),
    }
}

/// Signed volume by summing tetrahedra between the origin and each
/// triangle of the triangulated surface (divergence theorem).
fn signed_volume(mesh: &Mesh) -> f64 {
    let mut volume = 0.0;
    for polygon in mesh.polygons() {
        for triangle in polygon.triangulate() {
            let verts = triangle.vertices();
            let (a, b, c) = (
                verts[0].position.coords,
                verts[1].position.coords,
                verts[2].position.coords,
            );
            volume += a.dot(&b.cross(&c)) / 6.0;
        }
    }
    volume
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::primitives;
    use nalgebra::Vector3;
    use std::f64::consts::PI;

    #[test]
    fn test_cube_stats() {
        let cube = primitives::cube(Vector3::new(2.0, 2.0, 2.0), true, None);
        let stats = analyze(&cube);
        assert!((stats.volume - 8.0).abs() < 1e-9);
        assert!((stats.surface_area - 24.0).abs() < 1e-9);
        assert_eq!(stats.polygon_count, 6);
    }

    #[test]
    fn test_inverted_cube_has_negative_volume() {
        let cube = primitives::cube(Vector3::new(2.0, 2.0, 2.0), true, None);
        let stats = analyze(&cube.inverted());
        assert!((stats.volume + 8.0).abs() < 1e-9);
    }

    #[test]
    fn test_sphere_volume_converges() {
        let sphere = primitives::sphere(1.0, 48, None);
        let stats = analyze(&sphere);
        let exact = 4.0 / 3.0 * PI;
        // discrete sphere is inscribed, so slightly smaller
        assert!(stats.volume > 0.9 * exact);
        assert!(stats.volume < exact);
    }

    #[test]
    fn test_empty_mesh_stats() {
        let stats = analyze(&Mesh::empty());
        assert_eq!(stats.volume, 0.0);
        assert_eq!(stats.polygon_count, 0);
    }
}
