// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polycut Inc.

//! Binary space partitioning over polygon soups.
//!
//! A tree built from the surface of a closed mesh encodes the solid's
//! interior as the back side of every node plane. [`BspNode::clip`] then
//! filters arbitrary polygons to the parts inside or outside that solid,
//! with the boundary belonging to either side depending on [`ClipMode`].

use crate::geometry::plane::Plane;
use crate::geometry::polygon::Polygon;
use log::trace;

/// Which side of the solid a clip keeps, and whether the boundary counts.
///
/// The asymmetry between the strict and inclusive variants is what lets a
/// boolean operation keep a shared boundary face exactly once: one operand
/// is clipped strictly, the other inclusively.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClipMode {
    /// Keep parts strictly outside the solid
    GreaterThan,
    /// Keep parts outside or on the boundary
    GreaterThanEqual,
    /// Keep parts strictly inside the solid
    LessThan,
    /// Keep parts inside or on the boundary
    LessThanEqual,
}

impl ClipMode {
    /// Outside modes emit survivors at open front leaves, inside modes at
    /// open back leaves.
    fn keeps_front(self) -> bool {
        matches!(self, ClipMode::GreaterThan | ClipMode::GreaterThanEqual)
    }

    /// Route a coplanar fragment whose normal agrees (`same_facing`) or
    /// disagrees with the node plane. The strict outside mode and the
    /// inclusive inside mode push same-facing boundary polygons toward the
    /// interior; their counterparts push them toward the exterior.
    fn routes_coplanar_front(self, same_facing: bool) -> bool {
        match self {
            ClipMode::GreaterThan | ClipMode::LessThanEqual => !same_facing,
            ClipMode::GreaterThanEqual | ClipMode::LessThan => same_facing,
        }
    }
}

/// Node of a BSP tree over polygons.
#[derive(Debug, Clone)]
pub enum BspNode {
    /// Open region with no further subdivision
    Empty,
    /// Subdivision by `plane` with polygons lying on it
    Branch {
        plane: Plane,
        coplanar: Vec<Polygon>,
        front: Box<BspNode>,
        back: Box<BspNode>,
    },
}

impl BspNode {
    /// Builds a tree from a polygon soup.
    ///
    /// The first polygon's plane splits the rest; coplanar polygons facing
    /// the same way adhere to the node, anti-facing ones are routed back.
    /// Polygons split along the way draw fresh ids from `next_id`.
    pub fn build(polygons: Vec<Polygon>, next_id: &mut u32) -> BspNode {
        let count = polygons.len();
        let node = Self::build_node(polygons, next_id);
        trace!("built BSP over {} polygons", count);
        node
    }

    fn build_node(polygons: Vec<Polygon>, next_id: &mut u32) -> BspNode {
        let Some(first) = polygons.first() else {
            return BspNode::Empty;
        };
        let plane = *first.plane();

        let mut coplanar = Vec::new();
        let mut front = Vec::new();
        let mut back = Vec::new();
        for polygon in &polygons {
            let mut on_plane = Vec::new();
            polygon.split(&plane, &mut on_plane, &mut front, &mut back, next_id);
            for fragment in on_plane {
                if fragment.plane().normal.dot(&plane.normal) > 0.0 {
                    coplanar.push(fragment);
                } else {
                    back.push(fragment);
                }
            }
        }

        BspNode::Branch {
            plane,
            coplanar,
            front: Box::new(Self::build_node(front, next_id)),
            back: Box::new(Self::build_node(back, next_id)),
        }
    }

    /// Number of polygons stored in the tree
    pub fn polygon_count(&self) -> usize {
        match self {
            BspNode::Empty => 0,
            BspNode::Branch {
                coplanar,
                front,
                back,
                ..
            } => coplanar.len() + front.polygon_count() + back.polygon_count(),
        }
    }

    /// Returns the parts of `polygons` selected by `mode` against the
    /// solid this tree encodes.
    pub fn clip(&self, polygons: &[Polygon], mode: ClipMode, next_id: &mut u32) -> Vec<Polygon> {
        let mut kept = Vec::new();
        match self {
            // No solid: everything is outside
            BspNode::Empty => {
                if mode.keeps_front() {
                    kept.extend_from_slice(polygons);
                }
            }
            _ => self.clip_node(polygons.to_vec(), mode, next_id, &mut kept),
        }
        kept
    }

    fn clip_node(
        &self,
        polygons: Vec<Polygon>,
        mode: ClipMode,
        next_id: &mut u32,
        kept: &mut Vec<Polygon>,
    ) {
        let BspNode::Branch {
            plane, front, back, ..
        } = self
        else {
            return;
        };

        let mut coplanar = Vec::new();
        let mut front_parts = Vec::new();
        let mut back_parts = Vec::new();
        for polygon in &polygons {
            polygon.split(plane, &mut coplanar, &mut front_parts, &mut back_parts, next_id);
        }
        for fragment in coplanar {
            let same_facing = fragment.plane().normal.dot(&plane.normal) > 0.0;
            if mode.routes_coplanar_front(same_facing) {
                front_parts.push(fragment);
            } else {
                back_parts.push(fragment);
            }
        }

        match front.as_ref() {
            BspNode::Empty => {
                if mode.keeps_front() {
                    kept.append(&mut front_parts);
                }
            }
            node => node.clip_node(front_parts, mode, next_id, kept),
        }
        match back.as_ref() {
            BspNode::Empty => {
                if !mode.keeps_front() {
                    kept.append(&mut back_parts);
                }
            }
            node => node.clip_node(back_parts, mode, next_id, kept),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::primitives;
    use crate::geometry::vertex::Vertex;
    use nalgebra::{Point3, Vector3};

    fn cube_tree() -> BspNode {
        let cube = primitives::cube(Vector3::new(2.0, 2.0, 2.0), true, None);
        let mut id = 0;
        BspNode::build(cube.polygons().to_vec(), &mut id)
    }

    fn square_at(z: f64, half: f64) -> Polygon {
        Polygon::new(
            vec![
                Vertex::new(Point3::new(-half, -half, z), Vector3::z()),
                Vertex::new(Point3::new(half, -half, z), Vector3::z()),
                Vertex::new(Point3::new(half, half, z), Vector3::z()),
                Vertex::new(Point3::new(-half, half, z), Vector3::z()),
            ],
            None,
        )
        .unwrap()
    }

    #[test]
    fn test_empty_tree() {
        let mut id = 0;
        let tree = BspNode::build(Vec::new(), &mut id);
        let probe = [square_at(0.0, 0.5)];

        assert_eq!(tree.polygon_count(), 0);
        assert_eq!(tree.clip(&probe, ClipMode::GreaterThan, &mut id).len(), 1);
        assert_eq!(tree.clip(&probe, ClipMode::LessThan, &mut id).len(), 0);
    }

    #[test]
    fn test_build_retains_surface() {
        let tree = cube_tree();
        assert_eq!(tree.polygon_count(), 6);
    }

    #[test]
    fn test_clip_interior_polygon() {
        let tree = cube_tree();
        let probe = [square_at(0.0, 0.5)];
        let mut id = 0;

        assert!(tree.clip(&probe, ClipMode::GreaterThan, &mut id).is_empty());
        assert!(tree.clip(&probe, ClipMode::GreaterThanEqual, &mut id).is_empty());
        assert_eq!(tree.clip(&probe, ClipMode::LessThan, &mut id).len(), 1);
        assert_eq!(tree.clip(&probe, ClipMode::LessThanEqual, &mut id).len(), 1);
    }

    #[test]
    fn test_clip_exterior_polygon() {
        let tree = cube_tree();
        let probe = [square_at(5.0, 0.5)];
        let mut id = 0;

        assert_eq!(tree.clip(&probe, ClipMode::GreaterThan, &mut id).len(), 1);
        assert!(tree.clip(&probe, ClipMode::LessThan, &mut id).is_empty());
    }

    #[test]
    fn test_clip_spanning_polygon_splits() {
        let tree = cube_tree();
        // square poking out of the +x face, half inside, half outside
        let probe = [Polygon::new(
            vec![
                Vertex::new(Point3::new(0.0, -0.5, 0.0), Vector3::z()),
                Vertex::new(Point3::new(2.0, -0.5, 0.0), Vector3::z()),
                Vertex::new(Point3::new(2.0, 0.5, 0.0), Vector3::z()),
                Vertex::new(Point3::new(0.0, 0.5, 0.0), Vector3::z()),
            ],
            None,
        )
        .unwrap()];
        let mut id = 0;

        let outside = tree.clip(&probe, ClipMode::GreaterThan, &mut id);
        let inside = tree.clip(&probe, ClipMode::LessThan, &mut id);
        assert!(!outside.is_empty());
        assert!(!inside.is_empty());

        let outside_area: f64 = outside.iter().map(|p| p.area()).sum();
        let inside_area: f64 = inside.iter().map(|p| p.area()).sum();
        assert!((outside_area - 1.0).abs() < 1e-6);
        assert!((inside_area - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_boundary_routing_is_mode_dependent() {
        let tree = cube_tree();
        // same-facing copy of the cube's top face
        let probe = [square_at(1.0, 1.0)];
        let mut id = 0;

        assert!(tree.clip(&probe, ClipMode::GreaterThan, &mut id).is_empty());
        assert_eq!(tree.clip(&probe, ClipMode::GreaterThanEqual, &mut id).len(), 1);
        assert!(tree.clip(&probe, ClipMode::LessThan, &mut id).is_empty());
        assert_eq!(tree.clip(&probe, ClipMode::LessThanEqual, &mut id).len(), 1);
    }
}
