// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polycut Inc.

//! Directed planes and tolerance-based point/polygon classification

use crate::utils::math::{directions_coincide, EPSILON};
use nalgebra::{Point3, Vector3};
use serde::{Deserialize, Serialize};

/// Position of a point or polygon relative to a plane.
///
/// The variants form a two-bit lattice: `Spanning` is the bitwise union of
/// `Front` and `Back`, so folding per-vertex comparisons with [`union`]
/// yields the polygon-level classification directly.
///
/// [`union`]: PlaneComparison::union
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum PlaneComparison {
    /// On the plane, within tolerance
    Coplanar = 0,
    /// Strictly on the positive (normal) side
    Front = 1,
    /// Strictly on the negative side
    Back = 2,
    /// On both sides
    Spanning = 3,
}

impl PlaneComparison {
    /// Combine two comparisons; `Front | Back = Spanning`.
    pub fn union(self, other: PlaneComparison) -> PlaneComparison {
        match self as u8 | other as u8 {
            0 => PlaneComparison::Coplanar,
            1 => PlaneComparison::Front,
            2 => PlaneComparison::Back,
            _ => PlaneComparison::Spanning,
        }
    }

    /// Classify a signed distance to the plane
    pub fn from_distance(distance: f64) -> PlaneComparison {
        if distance > EPSILON {
            PlaneComparison::Front
        } else if distance < -EPSILON {
            PlaneComparison::Back
        } else {
            PlaneComparison::Coplanar
        }
    }
}

/// A directed plane `{ p : normal · p = w }` with unit normal.
///
/// The normal points to the "front" half-space. Equality between planes is
/// tolerance-based via [`Plane::approx_eq`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Plane {
    /// Unit normal pointing to the front side
    pub normal: Vector3<f64>,
    /// Signed distance from the origin along the normal
    pub w: f64,
}

impl Plane {
    /// Creates a plane from a normal and offset. The normal is normalized.
    pub fn new(normal: Vector3<f64>, w: f64) -> Self {
        let n = normal.normalize();
        Self { normal: n, w }
    }

    /// Creates the plane through three points wound anticlockwise.
    ///
    /// Returns `None` when the points are colinear.
    pub fn from_points(a: &Point3<f64>, b: &Point3<f64>, c: &Point3<f64>) -> Option<Self> {
        let cross = (b - a).cross(&(c - a));
        let len = cross.norm();
        if len < EPSILON {
            return None;
        }
        let normal = cross / len;
        Some(Self {
            normal,
            w: normal.dot(&a.coords),
        })
    }

    /// Signed distance from `point` to the plane; positive is in front.
    #[inline]
    pub fn signed_distance(&self, point: &Point3<f64>) -> f64 {
        self.normal.dot(&point.coords) - self.w
    }

    /// Classifies a point against the plane with tolerance
    #[inline]
    pub fn compare_point(&self, point: &Point3<f64>) -> PlaneComparison {
        PlaneComparison::from_distance(self.signed_distance(point))
    }

    /// True when `point` lies on the plane within tolerance
    pub fn contains_point(&self, point: &Point3<f64>) -> bool {
        self.compare_point(point) == PlaneComparison::Coplanar
    }

    /// Flips the plane in place to face the opposite direction
    pub fn flip(&mut self) {
        self.normal = -self.normal;
        self.w = -self.w;
    }

    /// Returns a copy facing the opposite direction
    pub fn flipped(&self) -> Self {
        Self {
            normal: -self.normal,
            w: -self.w,
        }
    }

    /// Tolerance equality: same facing and same offset
    pub fn approx_eq(&self, other: &Plane) -> bool {
        directions_coincide(&self.normal, &other.normal) && (self.w - other.w).abs() < EPSILON
    }

    /// An orthonormal basis (u, v) spanning the plane.
    ///
    /// Built from the coordinate axis least aligned with the normal, so the
    /// result is stable for axis-aligned planes.
    pub fn basis(&self) -> (Vector3<f64>, Vector3<f64>) {
        let reference = if self.normal.x.abs() <= self.normal.y.abs()
            && self.normal.x.abs() <= self.normal.z.abs()
        {
            Vector3::x()
        } else if self.normal.y.abs() <= self.normal.z.abs() {
            Vector3::y()
        } else {
            Vector3::z()
        };
        let u = self.normal.cross(&reference).normalize();
        let v = self.normal.cross(&u);
        (u, v)
    }

    /// Projection of `point` onto the plane
    pub fn project_point(&self, point: &Point3<f64>) -> Point3<f64> {
        point - self.normal * self.signed_distance(point)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_comparison_union() {
        use PlaneComparison::*;
        assert_eq!(Coplanar.union(Front), Front);
        assert_eq!(Front.union(Back), Spanning);
        assert_eq!(Back.union(Coplanar), Back);
        assert_eq!(Spanning.union(Front), Spanning);
    }

    #[test]
    fn test_from_points() {
        let plane = Plane::from_points(
            &Point3::origin(),
            &Point3::new(1.0, 0.0, 0.0),
            &Point3::new(0.0, 1.0, 0.0),
        )
        .unwrap();
        assert!(directions_coincide(&plane.normal, &Vector3::z()));
        assert!(plane.w.abs() < EPSILON);
    }

    #[test]
    fn test_from_points_colinear() {
        let plane = Plane::from_points(
            &Point3::origin(),
            &Point3::new(1.0, 0.0, 0.0),
            &Point3::new(2.0, 0.0, 0.0),
        );
        assert!(plane.is_none());
    }

    #[test]
    fn test_compare_point() {
        let plane = Plane::new(Vector3::z(), 0.0);
        assert_eq!(
            plane.compare_point(&Point3::new(0.0, 0.0, 1.0)),
            PlaneComparison::Front
        );
        assert_eq!(
            plane.compare_point(&Point3::new(0.0, 0.0, -1.0)),
            PlaneComparison::Back
        );
        assert_eq!(
            plane.compare_point(&Point3::new(3.0, -2.0, 0.0)),
            PlaneComparison::Coplanar
        );
    }

    #[test]
    fn test_flip() {
        let plane = Plane::new(Vector3::z(), 2.0);
        let flipped = plane.flipped();
        assert!(directions_coincide(&flipped.normal, &-Vector3::z()));
        assert_eq!(flipped.w, -2.0);
        assert!(flipped.flipped().approx_eq(&plane));
    }

    #[test]
    fn test_basis_is_orthonormal() {
        let plane = Plane::new(Vector3::new(1.0, 2.0, 3.0), 0.5);
        let (u, v) = plane.basis();
        assert!(u.dot(&plane.normal).abs() < EPSILON);
        assert!(v.dot(&plane.normal).abs() < EPSILON);
        assert!(u.dot(&v).abs() < EPSILON);
        assert!((u.norm() - 1.0).abs() < EPSILON);
        assert!((v.norm() - 1.0).abs() < EPSILON);
    }

    #[test]
    fn test_project_point() {
        let plane = Plane::new(Vector3::z(), 1.0);
        let projected = plane.project_point(&Point3::new(2.0, 3.0, 5.0));
        assert!((projected - Point3::new(2.0, 3.0, 1.0)).norm() < EPSILON);
    }
}
