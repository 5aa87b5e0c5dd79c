// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polycut Inc.

//! Mesh vertices with position, normal and texture coordinate

use crate::utils::math::EPSILON;
use nalgebra::{Matrix4, Point3, Vector3};
use serde::{Deserialize, Serialize};

/// Vertex with position, normal and texture coordinate.
///
/// The texture coordinate is carried as a vector so splits can interpolate
/// it alongside position and normal without caring about its layout.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Vertex {
    pub position: Point3<f64>,
    pub normal: Vector3<f64>,
    pub texcoord: Vector3<f64>,
}

impl Vertex {
    pub fn new(position: Point3<f64>, normal: Vector3<f64>) -> Self {
        Self {
            position,
            normal,
            texcoord: Vector3::zeros(),
        }
    }

    pub fn with_texcoord(position: Point3<f64>, normal: Vector3<f64>, texcoord: Vector3<f64>) -> Self {
        Self {
            position,
            normal,
            texcoord,
        }
    }

    /// Linearly interpolates position, normal and texture coordinate
    pub fn lerp(&self, other: &Vertex, t: f64) -> Vertex {
        Vertex {
            position: self.position + (other.position - self.position) * t,
            normal: self.normal.lerp(&other.normal, t),
            texcoord: self.texcoord.lerp(&other.texcoord, t),
        }
    }

    /// Returns the vertex with its normal flipped
    pub fn inverted(&self) -> Vertex {
        Vertex {
            position: self.position,
            normal: -self.normal,
            texcoord: self.texcoord,
        }
    }

    /// Attribute-wise tolerance equality
    pub fn approx_eq(&self, other: &Vertex) -> bool {
        (self.position - other.position).norm() < EPSILON
            && (self.normal - other.normal).norm() < EPSILON
            && (self.texcoord - other.texcoord).norm() < EPSILON
    }

    /// Transform position and normal by a matrix.
    ///
    /// Normals use the inverse transpose so non-uniform scales stay correct.
    pub fn transform(&mut self, matrix: &Matrix4<f64>) {
        self.position = matrix.transform_point(&self.position);
        let normal_matrix = matrix
            .try_inverse()
            .map(|m| m.transpose())
            .unwrap_or(*matrix);
        self.normal = normal_matrix.transform_vector(&self.normal).normalize();
    }
}
