// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polycut Inc.

//! Polygon-soup mesh representation

use crate::geometry::bbox::BoundingBox;
use crate::geometry::polygon::Polygon;
use nalgebra::{Matrix4, Rotation3, Vector3};
use serde::{Deserialize, Serialize};

/// An unordered collection of polygons describing a surface.
///
/// Polygons are independent; no connectivity is maintained. Meshes fed to
/// the boolean operations are expected to be closed and consistently
/// wound, but the type itself imposes neither.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Mesh {
    polygons: Vec<Polygon>,
}

impl Mesh {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn from_polygons(polygons: Vec<Polygon>) -> Self {
        Self { polygons }
    }

    pub fn polygons(&self) -> &[Polygon] {
        &self.polygons
    }

    pub fn into_polygons(self) -> Vec<Polygon> {
        self.polygons
    }

    pub fn polygon_count(&self) -> usize {
        self.polygons.len()
    }

    pub fn vertex_count(&self) -> usize {
        self.polygons.iter().map(|p| p.vertices().len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.polygons.is_empty()
    }

    /// Axis-aligned bounds over all vertex positions
    pub fn bounds(&self) -> BoundingBox {
        BoundingBox::from_points(
            self.polygons
                .iter()
                .flat_map(|p| p.vertices().iter().map(|v| &v.position)),
        )
    }

    /// Every polygon flipped; turns a solid inside out
    pub fn inverted(&self) -> Mesh {
        Mesh {
            polygons: self.polygons.iter().map(Polygon::inverted).collect(),
        }
    }

    /// Concatenate another mesh's polygons (no CSG)
    pub fn merge(&mut self, other: &Mesh) {
        self.polygons.extend_from_slice(&other.polygons);
    }

    /// Transform all polygons by a matrix
    pub fn transform(&mut self, matrix: &Matrix4<f64>) {
        for polygon in &mut self.polygons {
            polygon.transform(matrix);
        }
    }

    pub fn transformed(&self, matrix: &Matrix4<f64>) -> Mesh {
        let mut mesh = self.clone();
        mesh.transform(matrix);
        mesh
    }

    pub fn translated(&self, offset: &Vector3<f64>) -> Mesh {
        self.transformed(&Matrix4::new_translation(offset))
    }

    pub fn rotated(&self, rotation: &Rotation3<f64>) -> Mesh {
        self.transformed(&rotation.to_homogeneous())
    }

    /// Greedily merges polygons that share an edge and are compatible:
    /// sibling fragments of one split, or never-split coplanar neighbours
    /// with the same material. Coarsens boolean output.
    pub fn merged_polygons(&self) -> Mesh {
        let mut polygons = self.polygons.clone();
        let mut i = 0;
        while i < polygons.len() {
            let mut merged_any = false;
            let mut j = i + 1;
            while j < polygons.len() {
                if let Some(merged) = polygons[i].merge(&polygons[j]) {
                    polygons[i] = merged;
                    polygons.remove(j);
                    merged_any = true;
                } else {
                    j += 1;
                }
            }
            if !merged_any {
                i += 1;
            }
        }
        Mesh { polygons }
    }
}
