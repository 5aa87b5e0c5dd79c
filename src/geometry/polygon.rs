// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polycut Inc.

//! Planar polygon faces: validation, splitting, tessellation and merging

use crate::error::ValidationError;
use crate::geometry::material::Material;
use crate::geometry::plane::{Plane, PlaneComparison};
use crate::geometry::vertex::Vertex;
use crate::utils::math::{points_coincide, EPSILON};
use nalgebra::{Matrix4, Point3, Vector3};
use serde::{Deserialize, Serialize};

/// Axis-aligned plane a polygon is projected onto for 2D tests.
///
/// Chosen as the plane whose normal is closest to the polygon normal, so
/// the projection never collapses the polygon.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FlatteningPlane {
    Xy,
    Xz,
    Yz,
}

impl FlatteningPlane {
    fn for_normal(normal: &Vector3<f64>) -> Self {
        let (ax, ay, az) = (normal.x.abs(), normal.y.abs(), normal.z.abs());
        if az >= ax && az >= ay {
            FlatteningPlane::Xy
        } else if ay >= ax {
            FlatteningPlane::Xz
        } else {
            FlatteningPlane::Yz
        }
    }

    fn project(&self, point: &Point3<f64>) -> (f64, f64) {
        match self {
            FlatteningPlane::Xy => (point.x, point.y),
            FlatteningPlane::Xz => (point.x, point.z),
            FlatteningPlane::Yz => (point.y, point.z),
        }
    }
}

/// Area-weighted polygon normal (Newell's method). Magnitude is twice the
/// enclosed area, so it doubles as the degeneracy test.
fn newell_vector(vertices: &[Vertex]) -> Vector3<f64> {
    let mut normal = Vector3::zeros();
    let n = vertices.len();
    for i in 0..n {
        let a = vertices[i].position;
        let b = vertices[(i + 1) % n].position;
        normal.x += (a.y - b.y) * (a.z + b.z);
        normal.y += (a.z - b.z) * (a.x + b.x);
        normal.z += (a.x - b.x) * (a.y + b.y);
    }
    normal
}

fn ring_is_convex(vertices: &[Vertex], normal: &Vector3<f64>) -> bool {
    let n = vertices.len();
    for i in 0..n {
        let p0 = vertices[i].position;
        let p1 = vertices[(i + 1) % n].position;
        let p2 = vertices[(i + 2) % n].position;
        let cross = (p1 - p0).cross(&(p2 - p1));
        if cross.dot(normal) < -EPSILON {
            return false;
        }
    }
    true
}

/// Strict interior test for the ear-clipping containment check. Points on
/// the triangle boundary do not count as inside.
fn point_strictly_in_triangle(
    point: &Point3<f64>,
    a: &Point3<f64>,
    b: &Point3<f64>,
    c: &Point3<f64>,
    normal: &Vector3<f64>,
) -> bool {
    for (p, q) in [(a, b), (b, c), (c, a)] {
        if (q - p).cross(&(point - p)).dot(normal) <= EPSILON {
            return false;
        }
    }
    true
}

/// Drop adjacent coincident vertices from a ring
fn dedup_ring(vertices: &mut Vec<Vertex>) {
    let mut i = 0;
    while vertices.len() > 1 && i < vertices.len() {
        let next = (i + 1) % vertices.len();
        if points_coincide(&vertices[i].position, &vertices[next].position) {
            vertices.remove(next);
        } else {
            i += 1;
        }
    }
}

/// A planar, possibly non-convex face of a mesh.
///
/// Vertices wind anticlockwise as seen from the front of [`plane`]. The
/// `id` tags fragments produced by splitting: `0` means the polygon was
/// never split; fragments of one split share a fresh nonzero id so a later
/// merge pass can recognize them as siblings.
///
/// [`plane`]: Polygon::plane
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Polygon {
    vertices: Vec<Vertex>,
    plane: Plane,
    is_convex: bool,
    material: Option<Material>,
    id: u32,
}

impl Polygon {
    /// Creates a validated polygon, or `None` for invalid input.
    ///
    /// See [`Polygon::try_new`] for the rejection reasons.
    pub fn new(vertices: Vec<Vertex>, material: Option<Material>) -> Option<Polygon> {
        Self::try_new(vertices, material).ok()
    }

    /// Creates a validated polygon.
    ///
    /// Requires at least three vertices with no adjacent coincident pair,
    /// an enclosed area above tolerance, and all vertices on a common
    /// plane. The plane is derived from the vertex ring; convexity is
    /// detected by walking the edges.
    pub fn try_new(
        vertices: Vec<Vertex>,
        material: Option<Material>,
    ) -> Result<Polygon, ValidationError> {
        if vertices.len() < 3 {
            return Err(ValidationError::InsufficientVertices(vertices.len()));
        }
        let n = vertices.len();
        for i in 0..n {
            let j = (i + 1) % n;
            if points_coincide(&vertices[i].position, &vertices[j].position) {
                return Err(ValidationError::CoincidentVertices);
            }
        }
        let newell = newell_vector(&vertices);
        let double_area = newell.norm();
        if double_area < EPSILON {
            return Err(ValidationError::DegenerateArea);
        }
        let normal = newell / double_area;
        let w = vertices
            .iter()
            .map(|v| normal.dot(&v.position.coords))
            .sum::<f64>()
            / n as f64;
        let plane = Plane { normal, w };
        if vertices
            .iter()
            .any(|v| plane.signed_distance(&v.position).abs() > EPSILON)
        {
            return Err(ValidationError::NonPlanar);
        }
        let is_convex = ring_is_convex(&vertices, &plane.normal);
        Ok(Polygon {
            vertices,
            plane,
            is_convex,
            material,
            id: 0,
        })
    }

    /// Assembles a polygon from precomputed parts. Used on split and merge
    /// paths where the invariants are known to hold.
    pub(crate) fn new_unchecked(
        vertices: Vec<Vertex>,
        plane: Plane,
        is_convex: bool,
        material: Option<Material>,
        id: u32,
    ) -> Polygon {
        debug_assert!(vertices.len() >= 3);
        debug_assert!(vertices
            .iter()
            .all(|v| plane.signed_distance(&v.position).abs() <= EPSILON * 8.0));
        Polygon {
            vertices,
            plane,
            is_convex,
            material,
            id,
        }
    }

    pub fn vertices(&self) -> &[Vertex] {
        &self.vertices
    }

    pub fn plane(&self) -> &Plane {
        &self.plane
    }

    pub fn is_convex(&self) -> bool {
        self.is_convex
    }

    pub fn material(&self) -> Option<Material> {
        self.material
    }

    pub(crate) fn id(&self) -> u32 {
        self.id
    }

    /// Returns the polygon with its material replaced
    pub fn with_material(mut self, material: Option<Material>) -> Polygon {
        self.material = material;
        self
    }

    /// Twice the signed area is the Newell vector magnitude
    pub fn area(&self) -> f64 {
        newell_vector(&self.vertices).norm() / 2.0
    }

    /// Classifies the polygon against a plane by folding per-vertex
    /// comparisons; short-circuits once both sides are seen.
    pub fn compare(&self, plane: &Plane) -> PlaneComparison {
        let mut result = PlaneComparison::Coplanar;
        for vertex in &self.vertices {
            result = result.union(plane.compare_point(&vertex.position));
            if result == PlaneComparison::Spanning {
                break;
            }
        }
        result
    }

    /// Splits the polygon along `plane`, appending the pieces to the
    /// caller's buckets.
    ///
    /// Non-spanning polygons are placed whole. A spanning polygon first
    /// claims a fresh id from `next_id` when it has none, so both emitted
    /// halves (and the pieces of a tessellated concave input) stay
    /// recognizable as siblings; non-convex spanning polygons are
    /// tessellated and each convex piece is split.
    pub fn split(
        &self,
        plane: &Plane,
        coplanar: &mut Vec<Polygon>,
        front: &mut Vec<Polygon>,
        back: &mut Vec<Polygon>,
        next_id: &mut u32,
    ) {
        match self.compare(plane) {
            PlaneComparison::Coplanar => coplanar.push(self.clone()),
            PlaneComparison::Front => front.push(self.clone()),
            PlaneComparison::Back => back.push(self.clone()),
            PlaneComparison::Spanning => {
                let mut polygon = self.clone();
                if polygon.id == 0 {
                    *next_id += 1;
                    polygon.id = *next_id;
                }
                if !polygon.is_convex {
                    for piece in polygon.tessellate() {
                        piece.split(plane, coplanar, front, back, next_id);
                    }
                } else {
                    polygon.split_convex(plane, front, back);
                }
            }
        }
    }

    /// Edge walk for a convex polygon known to span `plane`
    fn split_convex(&self, plane: &Plane, front: &mut Vec<Polygon>, back: &mut Vec<Polygon>) {
        let n = self.vertices.len();
        let comparisons: Vec<PlaneComparison> = self
            .vertices
            .iter()
            .map(|v| plane.compare_point(&v.position))
            .collect();

        let mut front_verts: Vec<Vertex> = Vec::with_capacity(n + 1);
        let mut back_verts: Vec<Vertex> = Vec::with_capacity(n + 1);

        for i in 0..n {
            let j = (i + 1) % n;
            let vi = &self.vertices[i];
            match comparisons[i] {
                PlaneComparison::Front => front_verts.push(*vi),
                PlaneComparison::Back => back_verts.push(*vi),
                _ => {
                    front_verts.push(*vi);
                    back_verts.push(*vi);
                }
            }
            let straddles = matches!(
                (comparisons[i], comparisons[j]),
                (PlaneComparison::Front, PlaneComparison::Back)
                    | (PlaneComparison::Back, PlaneComparison::Front)
            );
            if straddles {
                let vj = &self.vertices[j];
                let edge = vj.position - vi.position;
                let t = ((plane.w - plane.normal.dot(&vi.position.coords))
                    / plane.normal.dot(&edge))
                .clamp(0.0, 1.0);
                let crossing = vi.lerp(vj, t);
                front_verts.push(crossing);
                back_verts.push(crossing);
            }
        }

        self.emit_fragment(front_verts, front);
        self.emit_fragment(back_verts, back);
    }

    /// Emit a split half if it survives degeneracy checks; halves that
    /// collapse to the cut line are dropped.
    fn emit_fragment(&self, mut verts: Vec<Vertex>, side: &mut Vec<Polygon>) {
        dedup_ring(&mut verts);
        if verts.len() < 3 {
            return;
        }
        if newell_vector(&verts).norm() < EPSILON {
            return;
        }
        side.push(Polygon::new_unchecked(
            verts,
            self.plane,
            true,
            self.material,
            self.id,
        ));
    }

    /// Triangulates the polygon by ear clipping.
    ///
    /// Handles concave rings. Colinear vertices sitting between their
    /// neighbours are removed as redundant. If two full revolutions pass
    /// without clipping an ear the input is pathological and whatever has
    /// been collected so far is returned.
    pub fn triangulate(&self) -> Vec<Polygon> {
        if self.vertices.len() == 3 {
            return vec![self.clone()];
        }
        let mut verts = self.vertices.clone();
        let mut triangles = Vec::with_capacity(verts.len() - 2);
        let mut i = 0usize;
        let mut stalled = 0usize;

        while verts.len() > 3 {
            if stalled >= verts.len() * 2 {
                break;
            }
            let n = verts.len();
            i %= n;
            let i1 = (i + 1) % n;
            let i2 = (i + 2) % n;
            let (v0, v1, v2) = (verts[i], verts[i1], verts[i2]);
            let e0 = v1.position - v0.position;
            let e1 = v2.position - v1.position;
            let cross = e0.cross(&e1);

            if cross.norm() < EPSILON {
                if e0.dot(&e1) > 0.0 {
                    // v1 sits between v0 and v2
                    verts.remove(i1);
                    stalled = 0;
                } else {
                    i += 1;
                    stalled += 1;
                }
                continue;
            }
            if cross.dot(&self.plane.normal) <= 0.0 {
                // reflex corner
                i += 1;
                stalled += 1;
                continue;
            }
            let blocked = verts.iter().enumerate().any(|(k, v)| {
                k != i
                    && k != i1
                    && k != i2
                    && point_strictly_in_triangle(
                        &v.position,
                        &v0.position,
                        &v1.position,
                        &v2.position,
                        &self.plane.normal,
                    )
            });
            if blocked {
                i += 1;
                stalled += 1;
                continue;
            }
            triangles.push(Polygon::new_unchecked(
                vec![v0, v1, v2],
                self.plane,
                true,
                self.material,
                self.id,
            ));
            verts.remove(i1);
            stalled = 0;
        }

        if verts.len() == 3 {
            let cross =
                (verts[1].position - verts[0].position).cross(&(verts[2].position - verts[1].position));
            if cross.dot(&self.plane.normal) > EPSILON {
                triangles.push(Polygon::new_unchecked(
                    verts,
                    self.plane,
                    true,
                    self.material,
                    self.id,
                ));
            }
        }
        triangles
    }

    /// Decomposes the polygon into convex pieces.
    ///
    /// Convex input is returned as-is; otherwise the triangulation is
    /// greedily coarsened by rejoining adjacent pieces whose union stays
    /// convex.
    pub fn tessellate(&self) -> Vec<Polygon> {
        if self.is_convex {
            return vec![self.clone()];
        }
        let mut pieces = self.triangulate();
        loop {
            let mut joined_at = None;
            'search: for i in 0..pieces.len() {
                for j in (i + 1)..pieces.len() {
                    if let Some(joined) = pieces[i].join(&pieces[j]) {
                        if joined.is_convex {
                            joined_at = Some((i, j, joined));
                            break 'search;
                        }
                    }
                }
            }
            match joined_at {
                Some((i, j, joined)) => {
                    pieces[i] = joined;
                    pieces.remove(j);
                }
                None => break,
            }
        }
        pieces
    }

    /// Merges two polygons sharing an edge into one.
    ///
    /// Permitted when materials and planes match and either both polygons
    /// were never split (`id == 0`) or both carry the same nonzero id
    /// (siblings of one split). Returns `None` when not applicable.
    pub fn merge(&self, other: &Polygon) -> Option<Polygon> {
        if self.material != other.material {
            return None;
        }
        if !self.plane.approx_eq(&other.plane) {
            return None;
        }
        let siblings = self.id != 0 && self.id == other.id;
        let unsplit = self.id == 0 && other.id == 0;
        if !(siblings || unsplit) {
            return None;
        }
        self.join(other)
    }

    /// Stitches two polygons along a shared edge, without the material and
    /// id compatibility checks of [`Polygon::merge`].
    ///
    /// Requires exactly two shared vertices forming an edge traversed in
    /// opposite directions by the two rings. Join vertices whose adjacent
    /// edges become colinear are removed.
    fn join(&self, other: &Polygon) -> Option<Polygon> {
        let n = self.vertices.len();
        let m = other.vertices.len();

        let mut shared: Vec<(usize, usize)> = Vec::new();
        for (i, v) in self.vertices.iter().enumerate() {
            for (j, w) in other.vertices.iter().enumerate() {
                if v.approx_eq(w) {
                    shared.push((i, j));
                    if shared.len() > 2 {
                        return None;
                    }
                }
            }
        }
        if shared.len() != 2 {
            return None;
        }

        // Orient the pair as a directed edge a -> b of self
        let ((ia, ja), (ib, jb)) = (shared[0], shared[1]);
        let (ia, ja, ib, jb) = if (ia + 1) % n == ib {
            (ia, ja, ib, jb)
        } else if (ib + 1) % n == ia {
            (ib, jb, ia, ja)
        } else {
            return None;
        };
        // Other must traverse the edge b -> a
        if (jb + 1) % m != ja {
            return None;
        }

        // Walk self from b around to a, then other's run strictly between
        // a and b
        let mut ring: Vec<Vertex> = Vec::with_capacity(n + m - 2);
        for k in 0..n {
            ring.push(self.vertices[(ib + k) % n]);
        }
        for k in 1..(m - 1) {
            ring.push(other.vertices[(ja + k) % m]);
        }

        // Drop join vertices whose neighbouring edges are colinear.
        // After the walk, a sits at index n - 1 and b at index 0.
        let mut drop_indices: Vec<usize> = Vec::new();
        for idx in [n - 1, 0] {
            let len = ring.len();
            let prev = ring[(idx + len - 1) % len].position;
            let here = ring[idx].position;
            let next = ring[(idx + 1) % len].position;
            let e0 = here - prev;
            let e1 = next - here;
            let norms = e0.norm() * e1.norm();
            if norms > 0.0 && e0.cross(&e1).norm() / norms < EPSILON && e0.dot(&e1) > 0.0 {
                drop_indices.push(idx);
            }
        }
        drop_indices.sort_unstable_by(|a, b| b.cmp(a));
        for idx in drop_indices {
            ring.remove(idx);
        }

        dedup_ring(&mut ring);
        if ring.len() < 3 || newell_vector(&ring).norm() < EPSILON {
            return None;
        }
        let is_convex = ring_is_convex(&ring, &self.plane.normal);
        Some(Polygon::new_unchecked(
            ring,
            self.plane,
            is_convex,
            self.material,
            self.id,
        ))
    }

    /// True when `point` lies on the polygon, boundary included.
    ///
    /// Off-plane points are rejected first; the rest is a crossing-number
    /// test in the projection that keeps the polygon non-degenerate.
    pub fn contains_point(&self, point: &Point3<f64>) -> bool {
        if !self.plane.contains_point(point) {
            return false;
        }
        let flattening = FlatteningPlane::for_normal(&self.plane.normal);
        let (px, py) = flattening.project(point);

        // Boundary counts as inside: check edges first
        let n = self.vertices.len();
        for i in 0..n {
            let a = self.vertices[i].position;
            let b = self.vertices[(i + 1) % n].position;
            let edge = b - a;
            let to_point = point - a;
            let len_sq = edge.norm_squared();
            if len_sq > 0.0 {
                let t = (to_point.dot(&edge) / len_sq).clamp(0.0, 1.0);
                if (to_point - edge * t).norm() < EPSILON {
                    return true;
                }
            }
        }

        let mut inside = false;
        let mut j = n - 1;
        for i in 0..n {
            let (ax, ay) = flattening.project(&self.vertices[i].position);
            let (bx, by) = flattening.project(&self.vertices[j].position);
            if (ay > py) != (by > py) {
                let x = ax + (py - ay) * (bx - ax) / (by - ay);
                if px < x {
                    inside = !inside;
                }
            }
            j = i;
        }
        inside
    }

    /// Returns the polygon facing the other way: reversed ring, flipped
    /// vertex normals, flipped plane.
    pub fn inverted(&self) -> Polygon {
        let vertices = self
            .vertices
            .iter()
            .rev()
            .map(|v| v.inverted())
            .collect();
        Polygon {
            vertices,
            plane: self.plane.flipped(),
            is_convex: self.is_convex,
            material: self.material,
            id: self.id,
        }
    }

    /// One plane per directed edge, normal pointing away from the polygon.
    ///
    /// A point lies inside a convex polygon iff it is in the back
    /// half-space of every edge plane.
    pub fn edge_planes(&self) -> Vec<Plane> {
        let n = self.vertices.len();
        (0..n)
            .map(|i| {
                let p0 = self.vertices[i].position;
                let p1 = self.vertices[(i + 1) % n].position;
                let normal = (p1 - p0).cross(&self.plane.normal).normalize();
                Plane {
                    normal,
                    w: normal.dot(&p0.coords),
                }
            })
            .collect()
    }

    /// Clips `polygon` against this polygon's edge planes.
    ///
    /// The part of `polygon` covered by `self` lands in `inside`, the rest
    /// in `outside`. Non-convex operands are tessellated first.
    pub fn clip(
        &self,
        polygon: &Polygon,
        inside: &mut Vec<Polygon>,
        outside: &mut Vec<Polygon>,
        next_id: &mut u32,
    ) {
        if !polygon.is_convex {
            for piece in polygon.tessellate() {
                self.clip(&piece, inside, outside, next_id);
            }
            return;
        }
        if !self.is_convex {
            polygon.clip_to(&self.tessellate(), inside, outside, next_id);
            return;
        }
        let mut remainder = polygon.clone();
        for edge_plane in self.edge_planes() {
            let mut coplanar = Vec::new();
            let mut front = Vec::new();
            let mut back = Vec::new();
            remainder.split(&edge_plane, &mut coplanar, &mut front, &mut back, next_id);
            outside.append(&mut front);
            back.append(&mut coplanar);
            match back.pop() {
                Some(fragment) => remainder = fragment,
                None => return,
            }
        }
        inside.push(remainder);
    }

    /// Clips this polygon against a sequence of convex clippers.
    ///
    /// The outside remainder of each stage feeds the next; whatever
    /// survives every clipper is outside them all.
    pub fn clip_to(
        &self,
        clippers: &[Polygon],
        inside: &mut Vec<Polygon>,
        outside: &mut Vec<Polygon>,
        next_id: &mut u32,
    ) {
        let mut working = vec![self.clone()];
        for clipper in clippers {
            let mut remaining = Vec::new();
            for polygon in working.drain(..) {
                clipper.clip(&polygon, inside, &mut remaining, next_id);
            }
            working = remaining;
            if working.is_empty() {
                return;
            }
        }
        outside.append(&mut working);
    }

    /// Transform the polygon by a matrix, rebuilding the cached plane from
    /// the transformed ring.
    pub fn transform(&mut self, matrix: &Matrix4<f64>) {
        for vertex in &mut self.vertices {
            vertex.transform(matrix);
        }
        let newell = newell_vector(&self.vertices);
        let norm = newell.norm();
        if norm > EPSILON {
            let normal = newell / norm;
            let w = self
                .vertices
                .iter()
                .map(|v| normal.dot(&v.position.coords))
                .sum::<f64>()
                / self.vertices.len() as f64;
            self.plane = Plane { normal, w };
        }
    }
}
