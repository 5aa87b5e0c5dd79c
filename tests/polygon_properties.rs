// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polycut Inc.

//! Polygon-level properties exercised through the public API

use approx::assert_relative_eq;
use nalgebra::{Point3, Vector3};
use polycut::{Plane, Polygon, Vertex, EPSILON};

fn vertex(x: f64, y: f64) -> Vertex {
    Vertex::new(Point3::new(x, y, 0.0), Vector3::z())
}

fn square() -> Polygon {
    Polygon::new(
        vec![
            vertex(0.0, 0.0),
            vertex(2.0, 0.0),
            vertex(2.0, 2.0),
            vertex(0.0, 2.0),
        ],
        None,
    )
    .unwrap()
}

// L shape with a beveled inner corner: 7 vertices, no colinear triple
fn l_shape_7() -> Polygon {
    Polygon::new(
        vec![
            vertex(0.0, 0.0),
            vertex(3.0, 0.0),
            vertex(3.0, 1.0),
            vertex(1.5, 1.0),
            vertex(1.0, 1.5),
            vertex(1.0, 3.0),
            vertex(0.0, 3.0),
        ],
        None,
    )
    .unwrap()
}

#[test]
fn test_split_fragments_partition_the_polygon() {
    let polygon = square();
    let plane = Plane::new(Vector3::new(1.0, 1.0, 0.0), 1.0);
    let mut coplanar = Vec::new();
    let mut front = Vec::new();
    let mut back = Vec::new();
    let mut id = 0;
    polygon.split(&plane, &mut coplanar, &mut front, &mut back, &mut id);

    assert!(coplanar.is_empty());
    assert!(!front.is_empty());
    assert!(!back.is_empty());
    let total: f64 = front.iter().chain(&back).map(|p| p.area()).sum();
    assert_relative_eq!(total, polygon.area(), epsilon = 1e-9);
    // fragments land strictly on their side, up to tolerance on the cut
    for fragment in &front {
        for v in fragment.vertices() {
            assert!(plane.signed_distance(&v.position) > -1e-9);
        }
    }
    for fragment in &back {
        for v in fragment.vertices() {
            assert!(plane.signed_distance(&v.position) < 1e-9);
        }
    }
}

#[test]
fn test_triangulation_covers_polygon_with_agreeing_normals() {
    let polygon = l_shape_7();
    let triangles = polygon.triangulate();

    assert_eq!(triangles.len(), 5);
    let total: f64 = triangles.iter().map(|t| t.area()).sum();
    assert_relative_eq!(total, polygon.area(), epsilon = 1e-9);
    for triangle in &triangles {
        assert_eq!(triangle.vertices().len(), 3);
        assert!(triangle.area() > EPSILON);
        assert!(triangle.plane().normal.dot(&polygon.plane().normal) > 0.0);
    }
}

#[test]
fn test_tessellation_yields_convex_cover() {
    let polygon = l_shape_7();
    let pieces = polygon.tessellate();

    assert!(!pieces.is_empty());
    let total: f64 = pieces.iter().map(|p| p.area()).sum();
    assert_relative_eq!(total, polygon.area(), epsilon = 1e-9);
    for piece in &pieces {
        assert!(piece.is_convex());
    }
}

#[test]
fn test_double_inversion_is_identity() {
    let polygon = l_shape_7();
    let twice = polygon.inverted().inverted();

    assert!(twice.plane().approx_eq(polygon.plane()));
    for (a, b) in twice.vertices().iter().zip(polygon.vertices()) {
        assert!(a.approx_eq(b));
    }
}

#[test]
fn test_contains_point_matches_edge_plane_test() {
    let polygon = square();
    let samples = [
        (1.0, 1.0),
        (0.0, 0.0),
        (2.0, 1.0),
        (2.5, 1.0),
        (-0.1, 1.0),
        (1.0, 2.0),
        (1.999, 1.999),
    ];
    for (x, y) in samples {
        let point = Point3::new(x, y, 0.0);
        let via_containment = polygon.contains_point(&point);
        let via_edge_planes = polygon.plane().contains_point(&point)
            && polygon
                .edge_planes()
                .iter()
                .all(|edge| edge.signed_distance(&point) <= EPSILON);
        assert_eq!(
            via_containment, via_edge_planes,
            "disagreement at ({}, {})",
            x, y
        );
    }
}

#[test]
fn test_contains_point_rejects_off_plane() {
    let polygon = square();
    assert!(!polygon.contains_point(&Point3::new(1.0, 1.0, 0.1)));
}

#[test]
fn test_merge_roundtrip_after_split() {
    let polygon = square();
    let plane = Plane::new(Vector3::x(), 1.0);
    let mut coplanar = Vec::new();
    let mut front = Vec::new();
    let mut back = Vec::new();
    let mut id = 0;
    polygon.split(&plane, &mut coplanar, &mut front, &mut back, &mut id);

    let rejoined = front[0].merge(&back[0]).expect("sibling fragments merge");
    assert_relative_eq!(rejoined.area(), polygon.area(), epsilon = 1e-9);
    assert_eq!(rejoined.vertices().len(), 4);
}

#[test]
fn test_unsplit_polygons_with_different_materials_do_not_merge() {
    let a = square();
    let b = Polygon::new(
        vec![
            vertex(2.0, 0.0),
            vertex(4.0, 0.0),
            vertex(4.0, 2.0),
            vertex(2.0, 2.0),
        ],
        Some(polycut::Material::new(1)),
    )
    .unwrap();
    assert!(a.merge(&b).is_none());
}
