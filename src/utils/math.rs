// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polycut Inc.

//! Math utilities and the crate-wide geometric tolerance

use nalgebra::{Point3, Vector3};

/// Tolerance used for every geometric comparison in the crate.
///
/// Distances, dot products and cross-product magnitudes within this bound
/// are treated as zero. Calibrated for unit-scale geometry.
pub const EPSILON: f64 = 1e-8;

/// Check if two floats are approximately equal
pub fn approx_eq(a: f64, b: f64, epsilon: f64) -> bool {
    (a - b).abs() < epsilon
}

/// Check if two points coincide within `EPSILON`
pub fn points_coincide(a: &Point3<f64>, b: &Point3<f64>) -> bool {
    (a - b).norm() < EPSILON
}

/// Check if two unit vectors point the same way within `EPSILON`
pub fn directions_coincide(a: &Vector3<f64>, b: &Vector3<f64>) -> bool {
    (a - b).norm() < EPSILON
}

/// Linear interpolation
pub fn lerp(a: f64, b: f64, t: f64) -> f64 {
    a + (b - a) * t
}

/// Calculate the normal of a triangle given three vertices.
///
/// Returns `None` when the points are colinear.
pub fn triangle_normal(
    p0: &Point3<f64>,
    p1: &Point3<f64>,
    p2: &Point3<f64>,
) -> Option<Vector3<f64>> {
    let cross = (p1 - p0).cross(&(p2 - p1));
    let norm = cross.norm();
    if norm < EPSILON {
        return None;
    }
    Some(cross / norm)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_approx_eq() {
        assert!(approx_eq(1.0, 1.0 + EPSILON / 2.0, EPSILON));
        assert!(!approx_eq(1.0, 1.1, EPSILON));
    }

    #[test]
    fn test_lerp() {
        assert_eq!(lerp(0.0, 10.0, 0.5), 5.0);
        assert_eq!(lerp(0.0, 10.0, 0.0), 0.0);
        assert_eq!(lerp(0.0, 10.0, 1.0), 10.0);
    }

    #[test]
    fn test_triangle_normal() {
        let n = triangle_normal(
            &Point3::origin(),
            &Point3::new(1.0, 0.0, 0.0),
            &Point3::new(0.0, 1.0, 0.0),
        )
        .unwrap();
        assert!(directions_coincide(&n, &Vector3::z()));
    }

    #[test]
    fn test_triangle_normal_colinear() {
        let n = triangle_normal(
            &Point3::origin(),
            &Point3::new(1.0, 0.0, 0.0),
            &Point3::new(2.0, 0.0, 0.0),
        );
        assert!(n.is_none());
    }
}
