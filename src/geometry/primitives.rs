// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polycut Inc.

//! Geometric primitives generator

use crate::geometry::material::Material;
use crate::geometry::mesh::Mesh;
use crate::geometry::polygon::Polygon;
use crate::geometry::vertex::Vertex;
use nalgebra::{Point3, Vector3};
use std::f64::consts::PI;

/// Axis-aligned cuboid as six quads.
///
/// With `center` the cuboid is centred on the origin, otherwise it spans
/// from the origin to `size`.
pub fn cube(size: Vector3<f64>, center: bool, material: Option<Material>) -> Mesh {
    let (min, max) = if center {
        (
            Point3::new(-size.x / 2.0, -size.y / 2.0, -size.z / 2.0),
            Point3::new(size.x / 2.0, size.y / 2.0, size.z / 2.0),
        )
    } else {
        (Point3::origin(), Point3::new(size.x, size.y, size.z))
    };

    let positions = [
        Point3::new(min.x, min.y, min.z),
        Point3::new(max.x, min.y, min.z),
        Point3::new(max.x, max.y, min.z),
        Point3::new(min.x, max.y, min.z),
        Point3::new(min.x, min.y, max.z),
        Point3::new(max.x, min.y, max.z),
        Point3::new(max.x, max.y, max.z),
        Point3::new(min.x, max.y, max.z),
    ];

    // 6 quads wound anticlockwise seen from outside
    let faces: [([usize; 4], Vector3<f64>); 6] = [
        ([4, 5, 6, 7], Vector3::new(0.0, 0.0, 1.0)),
        ([1, 0, 3, 2], Vector3::new(0.0, 0.0, -1.0)),
        ([5, 1, 2, 6], Vector3::new(1.0, 0.0, 0.0)),
        ([0, 4, 7, 3], Vector3::new(-1.0, 0.0, 0.0)),
        ([7, 6, 2, 3], Vector3::new(0.0, 1.0, 0.0)),
        ([0, 1, 5, 4], Vector3::new(0.0, -1.0, 0.0)),
    ];
    let uvs = [
        Vector3::new(0.0, 0.0, 0.0),
        Vector3::new(1.0, 0.0, 0.0),
        Vector3::new(1.0, 1.0, 0.0),
        Vector3::new(0.0, 1.0, 0.0),
    ];

    let polygons = faces
        .iter()
        .filter_map(|(indices, normal)| {
            let vertices = indices
                .iter()
                .zip(uvs)
                .map(|(&index, uv)| Vertex::with_texcoord(positions[index], *normal, uv))
                .collect();
            Polygon::new(vertices, material)
        })
        .collect();

    Mesh::from_polygons(polygons)
}

/// UV sphere: latitude bands of planar trapezoids with triangle caps at
/// the poles. `segments` is the slice count around the equator; 0 selects
/// the default of 32.
pub fn sphere(radius: f64, segments: u32, material: Option<Material>) -> Mesh {
    let slices = if segments > 0 { segments.max(3) } else { 32 };
    let stacks = (slices / 2).max(2);

    let point_at = |stack: u32, slice: u32| -> Point3<f64> {
        let theta = PI * stack as f64 / stacks as f64;
        let phi = 2.0 * PI * slice as f64 / slices as f64;
        Point3::new(
            radius * theta.sin() * phi.cos(),
            radius * theta.sin() * phi.sin(),
            radius * theta.cos(),
        )
    };
    let vertex_at = |stack: u32, slice: u32| -> Vertex {
        let position = point_at(stack, slice);
        let normal = position.coords.normalize();
        let uv = Vector3::new(
            slice as f64 / slices as f64,
            1.0 - stack as f64 / stacks as f64,
            0.0,
        );
        Vertex::with_texcoord(position, normal, uv)
    };

    let mut polygons = Vec::new();
    for stack in 0..stacks {
        for slice in 0..slices {
            let next_slice = slice + 1;
            let ring = if stack == 0 {
                // north cap triangle
                vec![
                    vertex_at(0, slice),
                    vertex_at(1, slice),
                    vertex_at(1, next_slice),
                ]
            } else if stack == stacks - 1 {
                // south cap triangle
                vec![
                    vertex_at(stack, slice),
                    vertex_at(stack + 1, slice),
                    vertex_at(stack, next_slice),
                ]
            } else {
                vec![
                    vertex_at(stack, slice),
                    vertex_at(stack + 1, slice),
                    vertex_at(stack + 1, next_slice),
                    vertex_at(stack, next_slice),
                ]
            };
            if let Some(polygon) = Polygon::new(ring, material) {
                polygons.push(polygon);
            }
        }
    }

    Mesh::from_polygons(polygons)
}
