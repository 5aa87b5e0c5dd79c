// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polycut Inc.

//! Boolean volume operations on meshes.
//!
//! All operations build transient BSP trees over the operands' polygon
//! soups, clip each soup against the other solid, and assemble the kept
//! fragments. The two build-and-clip phases of a binary operation are
//! independent and run under `rayon::join`.

use crate::geometry::bbox::BoundingBox;
use crate::geometry::bsp::{BspNode, ClipMode};
use crate::geometry::material::Material;
use crate::geometry::mesh::Mesh;
use crate::geometry::plane::Plane;
use crate::geometry::polygon::Polygon;
use crate::geometry::vertex::Vertex;
use crate::utils::math::EPSILON;
use log::debug;

/// The second clip phase of a binary operation draws fragment ids from the
/// upper half of the range, keeping ids unique across the whole operation.
const SECOND_PHASE_ID_BASE: u32 = u32::MAX / 2;

fn invert(polygons: Vec<Polygon>) -> impl Iterator<Item = Polygon> {
    polygons.into_iter().map(|p| p.inverted())
}

impl Mesh {
    /// Volume union of two solids.
    ///
    /// The shared boundary is contributed by exactly one operand: this
    /// mesh is clipped strictly outside the other, the other inclusively.
    pub fn union(&self, other: &Mesh) -> Mesh {
        if !self.bounds().intersects(&other.bounds()) {
            let mut polygons = self.polygons().to_vec();
            polygons.extend_from_slice(other.polygons());
            return Mesh::from_polygons(polygons);
        }
        let (mut kept, other_kept) = rayon::join(
            || {
                let mut id = 0;
                BspNode::build(other.polygons().to_vec(), &mut id).clip(
                    self.polygons(),
                    ClipMode::GreaterThan,
                    &mut id,
                )
            },
            || {
                let mut id = SECOND_PHASE_ID_BASE;
                BspNode::build(self.polygons().to_vec(), &mut id).clip(
                    other.polygons(),
                    ClipMode::GreaterThanEqual,
                    &mut id,
                )
            },
        );
        kept.extend(other_kept);
        debug!(
            "union: {} + {} -> {} polygons",
            self.polygon_count(),
            other.polygon_count(),
            kept.len()
        );
        Mesh::from_polygons(kept)
    }

    /// Volume subtraction: this solid minus `other`.
    pub fn subtract(&self, other: &Mesh) -> Mesh {
        if !self.bounds().intersects(&other.bounds()) {
            return self.clone();
        }
        let (mut kept, other_inside) = rayon::join(
            || {
                let mut id = 0;
                BspNode::build(other.polygons().to_vec(), &mut id).clip(
                    self.polygons(),
                    ClipMode::GreaterThan,
                    &mut id,
                )
            },
            || {
                let mut id = SECOND_PHASE_ID_BASE;
                BspNode::build(self.polygons().to_vec(), &mut id).clip(
                    other.polygons(),
                    ClipMode::LessThan,
                    &mut id,
                )
            },
        );
        kept.extend(invert(other_inside));
        debug!(
            "subtract: {} - {} -> {} polygons",
            self.polygon_count(),
            other.polygon_count(),
            kept.len()
        );
        Mesh::from_polygons(kept)
    }

    /// Volume intersection of two solids.
    pub fn intersect(&self, other: &Mesh) -> Mesh {
        if !self.bounds().intersects(&other.bounds()) {
            return Mesh::empty();
        }
        let (mut kept, other_kept) = rayon::join(
            || {
                let mut id = 0;
                BspNode::build(other.polygons().to_vec(), &mut id).clip(
                    self.polygons(),
                    ClipMode::LessThan,
                    &mut id,
                )
            },
            || {
                let mut id = SECOND_PHASE_ID_BASE;
                BspNode::build(self.polygons().to_vec(), &mut id).clip(
                    other.polygons(),
                    ClipMode::LessThanEqual,
                    &mut id,
                )
            },
        );
        kept.extend(other_kept);
        Mesh::from_polygons(kept)
    }

    /// Symmetric difference: everything covered by exactly one operand.
    ///
    /// Assembled as `A_out ∪ invert(B_in) ∪ invert(A_in) ∪ B_out`. Both
    /// sides use strict modes, so coincident boundary faces cancel.
    pub fn xor(&self, other: &Mesh) -> Mesh {
        if !self.bounds().intersects(&other.bounds()) {
            let mut polygons = self.polygons().to_vec();
            polygons.extend_from_slice(other.polygons());
            return Mesh::from_polygons(polygons);
        }
        let ((self_out, self_in), (other_out, other_in)) = rayon::join(
            || {
                let mut id = 0;
                let tree = BspNode::build(other.polygons().to_vec(), &mut id);
                (
                    tree.clip(self.polygons(), ClipMode::GreaterThan, &mut id),
                    tree.clip(self.polygons(), ClipMode::LessThan, &mut id),
                )
            },
            || {
                let mut id = SECOND_PHASE_ID_BASE;
                let tree = BspNode::build(self.polygons().to_vec(), &mut id);
                (
                    tree.clip(other.polygons(), ClipMode::GreaterThan, &mut id),
                    tree.clip(other.polygons(), ClipMode::LessThan, &mut id),
                )
            },
        );
        let mut kept = self_out;
        kept.extend(invert(other_in));
        kept.extend(invert(self_in));
        kept.extend(other_out);
        Mesh::from_polygons(kept)
    }

    /// Keeps this mesh's shape but repaints the part covered by `other`
    /// with `other`'s material.
    ///
    /// The paint is taken from `other`'s first polygon; fragments keep
    /// their own material when `other` is empty.
    pub fn stencil(&self, other: &Mesh) -> Mesh {
        if !self.bounds().intersects(&other.bounds()) {
            return self.clone();
        }
        let mut id = 0;
        let tree = BspNode::build(other.polygons().to_vec(), &mut id);
        let mut kept = tree.clip(self.polygons(), ClipMode::GreaterThan, &mut id);
        let covered = tree.clip(self.polygons(), ClipMode::LessThanEqual, &mut id);
        match other.polygons().first().map(|p| p.material()) {
            Some(paint) => kept.extend(covered.into_iter().map(|p| p.with_material(paint))),
            None => kept.extend(covered),
        }
        Mesh::from_polygons(kept)
    }

    /// Splits the mesh along a plane.
    ///
    /// Coplanar polygons go to the front side iff they face the plane's
    /// way. A side with no polygons is `None`.
    pub fn split(&self, plane: &Plane) -> (Option<Mesh>, Option<Mesh>) {
        let (front, back) = self.split_polygons(plane);
        let wrap = |polygons: Vec<Polygon>| {
            if polygons.is_empty() {
                None
            } else {
                Some(Mesh::from_polygons(polygons))
            }
        };
        (wrap(front), wrap(back))
    }

    fn split_polygons(&self, plane: &Plane) -> (Vec<Polygon>, Vec<Polygon>) {
        let mut front = Vec::new();
        let mut back = Vec::new();
        let mut id = 0;
        for polygon in self.polygons() {
            let mut coplanar = Vec::new();
            polygon.split(plane, &mut coplanar, &mut front, &mut back, &mut id);
            for fragment in coplanar {
                if fragment.plane().normal.dot(&plane.normal) > 0.0 {
                    front.push(fragment);
                } else {
                    back.push(fragment);
                }
            }
        }
        (front, back)
    }

    /// Keeps the part of the mesh in front of the plane, optionally
    /// capping the cut with a polygon of the `fill` material.
    ///
    /// The cap is a large back-facing square at the plane, sized from the
    /// clipped mesh's bounds and carved to the cut profile against the
    /// original solid.
    pub fn clip(&self, plane: &Plane, fill: Option<Material>) -> Mesh {
        let (mut front, _) = self.split_polygons(plane);
        if front.is_empty() {
            return Mesh::empty();
        }
        if let Some(material) = fill {
            let bounds = BoundingBox::from_points(
                front
                    .iter()
                    .flat_map(|p| p.vertices().iter().map(|v| &v.position)),
            );
            let center = plane.project_point(&bounds.center());
            let radius = bounds
                .corners()
                .iter()
                .map(|corner| (plane.project_point(corner) - center).norm())
                .fold(0.0, f64::max);
            if radius > EPSILON {
                let (u, v) = plane.basis();
                let normal = -plane.normal;
                let ring = [u + v, u - v, -u - v, -u + v]
                    .into_iter()
                    .map(|direction| Vertex::new(center + direction * radius, normal))
                    .collect();
                if let Some(cap) = Polygon::new(ring, Some(material)) {
                    let mut id = 0;
                    let tree = BspNode::build(self.polygons().to_vec(), &mut id);
                    front.extend(tree.clip(&[cap], ClipMode::LessThan, &mut id));
                }
            }
        }
        Mesh::from_polygons(front)
    }

    /// Union of many meshes.
    ///
    /// Bounds-disjoint groups are combined by concatenation; CSG work is
    /// only spent where boxes overlap.
    pub fn union_of(meshes: &[Mesh]) -> Mesh {
        Self::multimerge(meshes, Mesh::union)
    }

    /// Symmetric difference of many meshes
    pub fn xor_of(meshes: &[Mesh]) -> Mesh {
        Self::multimerge(meshes, Mesh::xor)
    }

    /// First mesh minus all following meshes
    pub fn difference_of(meshes: &[Mesh]) -> Mesh {
        let Some((first, rest)) = meshes.split_first() else {
            return Mesh::empty();
        };
        rest.iter().fold(first.clone(), |acc, mesh| acc.subtract(mesh))
    }

    /// Intersection of all meshes; empty as soon as an operand is disjoint
    pub fn intersection_of(meshes: &[Mesh]) -> Mesh {
        let Some((first, rest)) = meshes.split_first() else {
            return Mesh::empty();
        };
        let mut result = first.clone();
        for mesh in rest {
            result = result.intersect(mesh);
            if result.is_empty() {
                break;
            }
        }
        result
    }

    /// First mesh repainted by all following meshes in turn
    pub fn stencil_of(meshes: &[Mesh]) -> Mesh {
        let Some((first, rest)) = meshes.split_first() else {
            return Mesh::empty();
        };
        rest.iter().fold(first.clone(), |acc, mesh| acc.stencil(mesh))
    }

    /// Reduction for commutative, associative operations.
    ///
    /// Each accumulator folds in every later mesh whose bounds intersect
    /// it, re-scanning after each growth; accumulators that end up
    /// bounds-disjoint are committed by concatenation.
    fn multimerge(meshes: &[Mesh], op: fn(&Mesh, &Mesh) -> Mesh) -> Mesh {
        let mut pending: Vec<(Mesh, BoundingBox)> =
            meshes.iter().map(|m| (m.clone(), m.bounds())).collect();
        let mut combined: Vec<Polygon> = Vec::new();
        let mut index = 0;
        while index < pending.len() {
            loop {
                let mut folded = false;
                let mut j = index + 1;
                while j < pending.len() {
                    if pending[index].1.intersects(&pending[j].1) {
                        let (other, _) = pending.remove(j);
                        let merged = op(&pending[index].0, &other);
                        let bounds = merged.bounds();
                        pending[index] = (merged, bounds);
                        folded = true;
                    } else {
                        j += 1;
                    }
                }
                if !folded {
                    break;
                }
            }
            combined.extend_from_slice(pending[index].0.polygons());
            index += 1;
        }
        debug!("multimerge: {} meshes -> {} polygons", meshes.len(), combined.len());
        Mesh::from_polygons(combined)
    }
}

#[cfg(test)]
mod tests {
    use crate::geometry::analytics::analyze;
    use crate::geometry::material::Material;
    use crate::geometry::mesh::Mesh;
    use crate::geometry::plane::Plane;
    use crate::geometry::primitives;
    use nalgebra::Vector3;

    fn cube2() -> Mesh {
        primitives::cube(Vector3::new(2.0, 2.0, 2.0), true, None)
    }

    #[test]
    fn test_union_overlapping_cubes_volume() {
        let a = cube2();
        let b = cube2().translated(&Vector3::new(1.0, 0.0, 0.0));
        let result = a.union(&b);
        // 8 + 8 - 4 overlapping
        assert!((analyze(&result).volume - 12.0).abs() < 1e-6);
    }

    #[test]
    fn test_union_identical_is_identity() {
        let a = cube2();
        let result = a.union(&a);
        let stats = analyze(&result);
        assert!((stats.volume - 8.0).abs() < 1e-6);
        assert!(stats.bounds.approx_eq(&a.bounds(), 1e-9));
    }

    #[test]
    fn test_subtract_overlapping_cubes_volume() {
        let a = cube2();
        let b = cube2().translated(&Vector3::new(1.0, 0.0, 0.0));
        let result = a.subtract(&b);
        assert!((analyze(&result).volume - 4.0).abs() < 1e-6);
    }

    #[test]
    fn test_subtract_self_has_zero_volume() {
        let a = cube2();
        let result = a.subtract(&a);
        assert!(analyze(&result).volume.abs() < 1e-6);
    }

    #[test]
    fn test_intersect_overlapping_cubes_volume() {
        let a = cube2();
        let b = cube2().translated(&Vector3::new(1.0, 0.0, 0.0));
        let result = a.intersect(&b);
        assert!((analyze(&result).volume - 4.0).abs() < 1e-6);
    }

    #[test]
    fn test_xor_overlapping_cubes_volume() {
        let a = cube2();
        let b = cube2().translated(&Vector3::new(1.0, 0.0, 0.0));
        let result = a.xor(&b);
        // union minus intersection
        assert!((analyze(&result).volume - 8.0).abs() < 1e-6);
    }

    #[test]
    fn test_xor_self_is_empty_volume() {
        let a = cube2();
        let result = a.xor(&a);
        assert!(analyze(&result).volume.abs() < 1e-6);
    }

    #[test]
    fn test_stencil_paints_covered_region() {
        let a = cube2();
        let paint = Material::new(42);
        let b = primitives::cube(Vector3::new(1.0, 4.0, 4.0), true, Some(paint));
        let result = a.stencil(&b);

        let stats = analyze(&result);
        assert!((stats.volume - 8.0).abs() < 1e-6);
        assert!(result.polygons().iter().any(|p| p.material() == Some(paint)));
        assert!(result.polygons().iter().any(|p| p.material().is_none()));
    }

    #[test]
    fn test_split_produces_both_halves() {
        let plane = Plane::new(Vector3::z(), 0.0);
        let (front, back) = cube2().split(&plane);
        let front = front.unwrap();
        let back = back.unwrap();
        assert!(front.bounds().min.z.abs() < 1e-9);
        assert!(back.bounds().max.z.abs() < 1e-9);
    }

    #[test]
    fn test_split_off_mesh_plane() {
        let plane = Plane::new(Vector3::z(), 10.0);
        let (front, back) = cube2().split(&plane);
        assert!(front.is_none());
        assert!(back.is_some());
    }

    #[test]
    fn test_clip_with_fill_is_watertight() {
        let plane = Plane::new(Vector3::z(), 0.5);
        let fill = Material::new(7);
        let result = cube2().clip(&plane, Some(fill));

        // front slab: 2 x 2 x 0.5
        assert!((analyze(&result).volume - 2.0).abs() < 1e-6);
        let cap = result
            .polygons()
            .iter()
            .find(|p| p.material() == Some(fill))
            .expect("cap polygon present");
        assert!((cap.plane().normal + Vector3::z()).norm() < 1e-9);
    }

    #[test]
    fn test_union_of_disjoint_concatenates() {
        let a = cube2();
        let b = cube2().translated(&Vector3::new(10.0, 0.0, 0.0));
        let result = Mesh::union_of(&[a.clone(), b.clone()]);
        assert_eq!(
            result.polygon_count(),
            a.polygon_count() + b.polygon_count()
        );
    }

    #[test]
    fn test_union_of_mixed_groups() {
        let a = cube2();
        let b = cube2().translated(&Vector3::new(1.0, 0.0, 0.0));
        let far = cube2().translated(&Vector3::new(20.0, 0.0, 0.0));
        let result = Mesh::union_of(&[a, b, far.clone()]);
        let stats = analyze(&result);
        assert!((stats.volume - 20.0).abs() < 1e-6);
        assert!(stats.bounds.intersects(&far.bounds()));
    }

    #[test]
    fn test_difference_of_chain() {
        let a = cube2();
        let b = cube2().translated(&Vector3::new(1.5, 0.0, 0.0));
        let c = cube2().translated(&Vector3::new(-1.5, 0.0, 0.0));
        let result = Mesh::difference_of(&[a, b, c]);
        // each neighbour carves a 0.5 x 2 x 2 slab out of the 8
        assert!((analyze(&result).volume - 4.0).abs() < 1e-6);
    }

    #[test]
    fn test_intersection_of_disjoint_is_empty() {
        let a = cube2();
        let b = cube2().translated(&Vector3::new(10.0, 0.0, 0.0));
        assert!(Mesh::intersection_of(&[a, b]).is_empty());
    }
}
