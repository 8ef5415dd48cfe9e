/*
===========================================================================
Copyright (C) 1999-2005 Id Software, Inc.

This file is part of Quake III Arena source code.

Quake III Arena source code is free software; you can redistribute it
and/or modify it under the terms of the GNU General Public License as
published by the Free Software Foundation; either version 2 of the License,
or (at your option) any later version.

Quake III Arena source code is distributed in the hope that it will be
useful, but WITHOUT ANY WARRANTY; without even the implied warranty of
MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
GNU General Public License for more details.

You should have received a copy of the GNU General Public License
along with Foobar; if not, write to the Free Software
Foundation, Inc., 51 Franklin St, Fifth Floor, Boston, MA  02110-1301  USA
===========================================================================
*/
// cm_disp.rs -- displacement collision trees

use crate::prelude::*;
use crate::qcommon::cm_load::Error;
use crate::qcommon::cm_local::CollisionBspData;
use crate::qfiles::*;
use log::warn;
use std::ops::Range;

pub const DISPCOLL_DIST_EPSILON: f32 = 0.03125;

// grid cells per side at which a node stops splitting
const DISPCOLL_LEAF_CELLS: usize = 2;

// twice the area below which a triangle is dropped
const DISPCOLL_DEGENERATE_AREA: f32 = 1e-4;

#[derive(Copy, Clone, Debug)]
pub struct DispTri {
    pub verts: [vec3_t; 3],
    pub plane: cplane_t,
    pub bounds: vec3_bounds,
    pub quadrant: u8,
}

impl DispTri {
    fn new(verts: [vec3_t; 3], quadrant: u8) -> Option<DispTri> {
        let cross = (verts[1] - verts[0]).cross(verts[2] - verts[0]);
        if cross.length() < DISPCOLL_DEGENERATE_AREA {
            return None;
        }
        let normal = cross.normalize()?;
        Some(DispTri {
            verts,
            plane: cplane_t::new(normal, normal.dot(verts[0])),
            bounds: vec3_bounds::from_points(verts.iter().copied()),
            quadrant,
        })
    }

    /// `p` is assumed to lie on the triangle's plane.
    fn contains_coplanar_point(&self, p: vec3_t) -> bool {
        let n = self.plane.normal;
        for i in 0..3 {
            let a = self.verts[i];
            let b = self.verts[(i + 1) % 3];
            let edge = b - a;
            if edge.cross(p - a).dot(n) < -DISPCOLL_DIST_EPSILON * edge.length() {
                return false;
            }
        }
        true
    }
}

#[derive(Clone, Debug)]
enum DispNodeKind {
    Branch([usize; 4]),
    Leaf(Range<usize>),
}

#[derive(Clone, Debug)]
struct DispNode {
    bounds: vec3_bounds,
    kind: DispNodeKind,
}

/// Nearest triangle struck by a tree query.
#[derive(Copy, Clone, Debug)]
pub struct DispHit {
    pub fraction: f32,
    pub plane: cplane_t,
    pub tri: usize,
    pub quadrant: u8,
    pub surface_props: u16,
    pub backface: bool,
}

/// Bounding volume hierarchy over one terrain patch. The patch grid is split
/// as a quadtree, and the triangles of every tree leaf are stored contiguously.
#[derive(Clone, Debug)]
pub struct DispCollTree {
    power: u32,
    contents: ContentsFlag,
    flags: DispInfoFlag,
    surface_index: u16,
    surface_props: [u16; 4],
    stab_dir: vec3_t,
    nodes: Vec<DispNode>,
    tris: Vec<DispTri>,
}

fn quadrant_of(cx: usize, cy: usize, cells: usize) -> u8 {
    let half = cells / 2;
    ((cx >= half) as u8) | (((cy >= half) as u8) << 1)
}

impl DispCollTree {
    pub fn create(info: &ddispinfo_t) -> Result<DispCollTree, Error> {
        if info.power < MIN_MAP_DISP_POWER || info.power > MAX_MAP_DISP_POWER {
            return Err(Error::String(format!(
                "DispCollTree::create: bad power {}",
                info.power
            )));
        }
        let side = info.side_verts();
        if info.verts.len() != side * side {
            return Err(Error::String(format!(
                "DispCollTree::create: expected {} verts, got {}",
                side * side,
                info.verts.len()
            )));
        }

        let cells = side - 1;
        let mut tree = DispCollTree {
            power: info.power,
            contents: info.contents,
            flags: info.flags,
            surface_index: info.surface_index,
            surface_props: info.surface_props,
            stab_dir: v3(0.0, 0.0, 1.0),
            nodes: Vec::new(),
            tris: Vec::with_capacity(cells * cells * 2),
        };
        tree.build_node(info, 0, 0, cells);

        let skipped = cells * cells * 2 - tree.tris.len();
        if skipped != 0 {
            warn!(
                "DispCollTree::create: skipped {} degenerate triangles",
                skipped
            );
        }

        let mut normal_sum = vec3_origin;
        for tri in tree.tris.iter() {
            normal_sum += tri.plane.normal;
        }
        if let Some(dir) = normal_sum.normalize() {
            tree.stab_dir = dir;
        }
        Ok(tree)
    }

    fn build_node(&mut self, info: &ddispinfo_t, x: usize, y: usize, size: usize) -> usize {
        let index = self.nodes.len();
        self.nodes.push(DispNode {
            bounds: ClearBounds(),
            kind: DispNodeKind::Leaf(0..0),
        });

        let side = info.side_verts();
        let (bounds, kind) = if size <= DISPCOLL_LEAF_CELLS {
            let first = self.tris.len();
            let mut bounds = ClearBounds();
            let vert = |i: usize, j: usize| info.verts[j * side + i];
            for cy in y..y + size {
                for cx in x..x + size {
                    let quadrant = quadrant_of(cx, cy, side - 1);
                    let v00 = vert(cx, cy);
                    let v10 = vert(cx + 1, cy);
                    let v11 = vert(cx + 1, cy + 1);
                    let v01 = vert(cx, cy + 1);
                    for verts in [[v00, v10, v11], [v00, v11, v01]] {
                        if let Some(tri) = DispTri::new(verts, quadrant) {
                            bounds = bounds.union(&tri.bounds);
                            self.tris.push(tri);
                        }
                    }
                }
            }
            (bounds, DispNodeKind::Leaf(first..self.tris.len()))
        } else {
            let half = size / 2;
            let children = [
                self.build_node(info, x, y, half),
                self.build_node(info, x + half, y, half),
                self.build_node(info, x, y + half, half),
                self.build_node(info, x + half, y + half, half),
            ];
            let bounds = children
                .iter()
                .fold(ClearBounds(), |b, &c| b.union(&self.nodes[c].bounds));
            (bounds, DispNodeKind::Branch(children))
        };

        self.nodes[index] = DispNode {
            bounds: bounds.expanded(vec3_t::from_scalar(DISPCOLL_DIST_EPSILON)),
            kind,
        };
        index
    }

    pub fn power(&self) -> u32 {
        self.power
    }

    pub fn contents(&self) -> ContentsFlag {
        self.contents
    }

    pub fn flags(&self) -> DispInfoFlag {
        self.flags
    }

    pub fn surface_index(&self) -> u16 {
        self.surface_index
    }

    /// World-space bounds, padded by `DISPCOLL_DIST_EPSILON`.
    pub fn bounds(&self) -> vec3_bounds {
        self.nodes[0].bounds
    }

    pub fn stab_dir(&self) -> vec3_t {
        self.stab_dir
    }

    pub fn tri_count(&self) -> usize {
        self.tris.len()
    }

    pub fn tri(&self, index: usize) -> &DispTri {
        &self.tris[index]
    }

    pub fn surface_props(&self, quadrant: usize) -> u16 {
        assert!(quadrant < 4, "DispCollTree::surface_props: bad quadrant {}", quadrant);
        self.surface_props[quadrant]
    }

    /// Depth-first walk. `tri_fn` returns true to stop the walk.
    fn walk(
        &self,
        node: usize,
        enter: &impl Fn(&vec3_bounds) -> bool,
        tri_fn: &mut impl FnMut(usize, &DispTri) -> bool,
    ) -> bool {
        let n = &self.nodes[node];
        if !enter(&n.bounds) {
            return false;
        }
        match &n.kind {
            DispNodeKind::Branch(children) => {
                for &child in children.iter() {
                    if self.walk(child, enter, tri_fn) {
                        return true;
                    }
                }
                false
            }
            DispNodeKind::Leaf(range) => {
                for i in range.clone() {
                    if tri_fn(i, &self.tris[i]) {
                        return true;
                    }
                }
                false
            }
        }
    }

    fn make_hit(&self, tri: usize, fraction: f32, plane: cplane_t, backface: bool) -> DispHit {
        let quadrant = self.tris[tri].quadrant;
        DispHit {
            fraction,
            plane,
            tri,
            quadrant,
            surface_props: self.surface_props[quadrant as usize],
            backface,
        }
    }

    /// Nearest triangle crossed by the segment `start + t * delta`, for
    /// `t < max_fraction`. Back faces count only when `cull_backfaces` is off.
    pub fn aabb_tree_ray(
        &self,
        start: vec3_t,
        delta: vec3_t,
        inv_delta: vec3_t,
        max_fraction: f32,
        cull_backfaces: bool,
    ) -> Option<DispHit> {
        let end = start + delta;
        let mut best: Option<(usize, f32, bool)> = None;
        let mut best_fraction = max_fraction;

        self.walk(
            0,
            &|b| IsBoxIntersectingRay(b.mins, b.maxs, start, delta, inv_delta, 0.0),
            &mut |i, tri| {
                let d1 = tri.plane.distance_to(start);
                let d2 = tri.plane.distance_to(end);
                let backface = if d1 > 0.0 && d2 <= 0.0 {
                    false
                } else if !cull_backfaces && d1 < 0.0 && d2 >= 0.0 {
                    true
                } else {
                    return false;
                };

                let t = d1 / (d1 - d2);
                if !tri.contains_coplanar_point(start.lerp(end, t)) {
                    return false;
                }

                // pull back off the surface
                let fraction = if backface {
                    (d1 + DISPCOLL_DIST_EPSILON) / (d1 - d2)
                } else {
                    (d1 - DISPCOLL_DIST_EPSILON) / (d1 - d2)
                };
                let fraction = fraction.max(0.0);
                if fraction < best_fraction {
                    best_fraction = fraction;
                    best = Some((i, fraction, backface));
                }
                false
            },
        );

        best.map(|(i, fraction, backface)| {
            let plane = self.tris[i].plane;
            let plane = if backface {
                cplane_t::new(-plane.normal, -plane.dist)
            } else {
                plane
            };
            self.make_hit(i, fraction, plane, backface)
        })
    }

    /// Nearest front-facing triangle struck by a box of half-size `extents`
    /// swept along `start + t * delta`.
    pub fn aabb_tree_sweep_aabb(
        &self,
        start: vec3_t,
        delta: vec3_t,
        inv_delta: vec3_t,
        extents: vec3_t,
        max_fraction: f32,
    ) -> Option<DispHit> {
        let end = start + delta;
        let mut best: Option<(usize, f32, cplane_t)> = None;
        let mut best_fraction = max_fraction;

        self.walk(
            0,
            &|b| {
                IsBoxIntersectingRay(
                    b.mins - extents,
                    b.maxs + extents,
                    start,
                    delta,
                    inv_delta,
                    0.0,
                )
            },
            &mut |i, tri| {
                if let Some((fraction, plane)) = sweep_aabb_to_tri(tri, start, end, extents) {
                    if fraction < best_fraction {
                        best_fraction = fraction;
                        best = Some((i, fraction, plane));
                    }
                }
                false
            },
        );

        best.map(|(i, fraction, plane)| self.make_hit(i, fraction, plane, false))
    }

    /// True if any triangle touches the box.
    pub fn aabb_tree_intersect_aabb(&self, mins: vec3_t, maxs: vec3_t) -> bool {
        let query = vec3_bounds::new(mins, maxs);
        let center = query.center();
        let half = query.extents();
        self.walk(0, &|b| b.intersects(&query), &mut |_, tri| {
            tri.bounds.intersects(&query) && tri_box_overlap(center, half, tri)
        })
    }

    /// Appends up to `max` candidate triangles whose bounds touch the sphere
    /// and returns how many were added.
    pub fn aabb_tree_get_tris_in_sphere(
        &self,
        center: vec3_t,
        radius: f32,
        out: &mut Vec<usize>,
        max: usize,
    ) -> usize {
        let first = out.len();
        if max == 0 {
            return 0;
        }
        self.walk(
            0,
            &|b| b.intersects_sphere(center, radius),
            &mut |i, tri| {
                if tri.bounds.intersects_sphere(center, radius) {
                    out.push(i);
                }
                out.len() - first >= max
            },
        );
        out.len() - first
    }

    /// Every triangle whose bounds touch `region`.
    pub fn aabb_tree_get_tris_in_region(&self, region: &vec3_bounds, out: &mut Vec<usize>) {
        self.walk(0, &|b| b.intersects(region), &mut |i, tri| {
            if tri.bounds.intersects(region) {
                out.push(i);
            }
            false
        });
    }
}

// cross products shorter than this are not used as separating planes
const DISPCOLL_MIN_AXIS_LENGTH2: f32 = 1e-12;

/// Clips the swept box against the triangle treated as a thin brush: the
/// surface plane, the back plane, three edge planes, six axial bevels and the
/// nine edge by axis planes, which together bound the box/triangle Minkowski
/// sum exactly.
fn sweep_aabb_to_tri(
    tri: &DispTri,
    start: vec3_t,
    end: vec3_t,
    extents: vec3_t,
) -> Option<(f32, cplane_t)> {
    const BACK_PLANE: usize = 1;

    let n = tri.plane.normal;
    let mut planes = [(vec3_origin, 0.0f32); 20];
    planes[0] = (n, tri.plane.dist);
    planes[BACK_PLANE] = (-n, -tri.plane.dist);
    for i in 0..3 {
        let a = tri.verts[i];
        let b = tri.verts[(i + 1) % 3];
        let edge_normal = (b - a).cross(n).normalize()?;
        planes[2 + i] = (edge_normal, edge_normal.dot(a));
    }
    for axis in 0..3 {
        let u = vec3_t::unit(axis);
        planes[5 + axis * 2] = (u, tri.bounds.maxs[axis]);
        planes[6 + axis * 2] = (-u, -tri.bounds.mins[axis]);
    }
    let mut num_planes = 11;
    for i in 0..3 {
        let a = tri.verts[i];
        let edge = tri.verts[(i + 1) % 3] - a;
        let other = tri.verts[(i + 2) % 3] - a;
        for j in 0..3 {
            let axis = vec3_t::unit(j).cross(edge);
            if axis.length2() < DISPCOLL_MIN_AXIS_LENGTH2 {
                continue;
            }
            let mut axis = match axis.normalize() {
                Some(axis) => axis,
                None => continue,
            };
            // the plane through the edge must have the third vertex behind it
            let side = axis.dot(other);
            if side.abs() < 1e-5 {
                // parallel to the face, already bounded by the surface planes
                continue;
            }
            if side > 0.0 {
                axis = -axis;
            }
            planes[num_planes] = (axis, axis.dot(a));
            num_planes += 1;
        }
    }

    let mut enterfrac = -1.0f32;
    let mut leavefrac = 1.0f32;
    let mut lead: Option<usize> = None;
    let mut startout = false;

    for (k, &(normal, dist)) in planes[..num_planes].iter().enumerate() {
        let dist = dist + normal.dot_abs(extents);
        let d1 = normal.dot(start) - dist;
        let d2 = normal.dot(end) - dist;

        if d1 > 0.0 {
            startout = true;
        }

        // completely in front of face, no intersection
        if d1 > 0.0 && d2 > 0.0 {
            return None;
        }
        if d1 <= 0.0 && d2 <= 0.0 {
            continue;
        }

        if d1 > d2 {
            // enter
            let f = (d1 - DISPCOLL_DIST_EPSILON).max(0.0) / (d1 - d2);
            if f > enterfrac {
                enterfrac = f;
                lead = Some(k);
            }
        } else {
            // leave
            let f = (d1 + DISPCOLL_DIST_EPSILON) / (d1 - d2);
            if f < leavefrac {
                leavefrac = f;
            }
        }
    }

    // starting embedded is left to the position test
    if !startout {
        return None;
    }
    let lead = lead?;
    if lead == BACK_PLANE || enterfrac >= leavefrac {
        return None;
    }
    let (normal, dist) = planes[lead];
    Some((enterfrac.max(0.0), cplane_t::new(normal, dist)))
}

/// Separating-axis test between a triangle and a box given by its center and
/// half size.
fn tri_box_overlap(center: vec3_t, half: vec3_t, tri: &DispTri) -> bool {
    let v = [
        tri.verts[0] - center,
        tri.verts[1] - center,
        tri.verts[2] - center,
    ];

    let outside = |axis: vec3_t| {
        let p0 = axis.dot(v[0]);
        let p1 = axis.dot(v[1]);
        let p2 = axis.dot(v[2]);
        let r = axis.dot_abs(half);
        p0.min(p1).min(p2) > r || p0.max(p1).max(p2) < -r
    };

    // box faces
    for i in 0..3 {
        if outside(vec3_t::unit(i)) {
            return false;
        }
    }

    // triangle face
    if outside(tri.plane.normal) {
        return false;
    }

    // edge cross products
    for i in 0..3 {
        let edge = v[(i + 1) % 3] - v[i];
        for j in 0..3 {
            let axis = vec3_t::unit(j).cross(edge);
            if axis.length2() < DISPCOLL_MIN_AXIS_LENGTH2 {
                continue;
            }
            if outside(axis) {
                return false;
            }
        }
    }
    true
}

/*
===============================================================================

VIRTUAL MESH

===============================================================================
*/

/// What the physics subsystem needs to build a lazy collision proxy for one
/// displacement.
pub trait VirtualMeshProvider {
    fn world_bounds(&self) -> vec3_bounds;
    fn triangle_count(&self) -> usize;
    fn triangle(&self, index: usize) -> [vec3_t; 3];
    fn tris_in_region(&self, region: &vec3_bounds, out: &mut Vec<usize>);
    fn hull_bytes(&self) -> Option<&[u8]>;
}

/// Borrows the tree, so triangle data lives in exactly one place.
#[derive(Copy, Clone, Debug)]
pub struct DispVirtualMesh<'a> {
    tree: &'a DispCollTree,
    hull: Option<&'a [u8]>,
}

impl<'a> VirtualMeshProvider for DispVirtualMesh<'a> {
    fn world_bounds(&self) -> vec3_bounds {
        self.tree.bounds()
    }

    fn triangle_count(&self) -> usize {
        self.tree.tri_count()
    }

    fn triangle(&self, index: usize) -> [vec3_t; 3] {
        self.tree.tri(index).verts
    }

    fn tris_in_region(&self, region: &vec3_bounds, out: &mut Vec<usize>) {
        self.tree.aabb_tree_get_tris_in_region(region, out)
    }

    fn hull_bytes(&self) -> Option<&[u8]> {
        self.hull
    }
}

pub fn CM_GetDispVirtualMesh(bsp: &CollisionBspData, disp_index: usize) -> Option<DispVirtualMesh<'_>> {
    let tree = bsp.disp_trees.get(disp_index)?;
    Some(DispVirtualMesh {
        tree,
        hull: bsp.disp_hull_bytes(disp_index),
    })
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// Flat patch at height `z`, `cell` units per grid step, starting at the
    /// origin.
    pub(crate) fn flat_disp(power: u32, cell: f32, z: f32) -> ddispinfo_t {
        let side = (1usize << power) + 1;
        let mut verts = Vec::with_capacity(side * side);
        for j in 0..side {
            for i in 0..side {
                verts.push(v3(i as f32 * cell, j as f32 * cell, z));
            }
        }
        ddispinfo_t {
            power,
            verts,
            contents: CONTENTS_SOLID,
            flags: 0,
            surface_index: SURFACE_INDEX_INVALID,
            surface_props: [10, 11, 12, 13],
        }
    }

    /// Flat power-4 patch, 256 units square, with the center vertex raised.
    pub(crate) fn spike_disp(height: f32) -> ddispinfo_t {
        let mut info = flat_disp(4, 16.0, 0.0);
        let side = info.side_verts();
        info.verts[8 * side + 8][2] = height;
        info
    }

    fn inv(d: vec3_t) -> vec3_t {
        d.map(|c| if c != 0.0 { 1.0 / c } else { f32::MAX })
    }

    #[test]
    fn build_flat_patch() {
        let _ = env_logger::builder().is_test(true).try_init();
        let tree = DispCollTree::create(&flat_disp(4, 16.0, 0.0)).unwrap();
        assert_eq!(tree.tri_count(), 16 * 16 * 2);
        assert!(tree.stab_dir().is_close_to(v3(0.0, 0.0, 1.0), 1e-5));

        let b = tree.bounds();
        assert!(b.mins[0] < 0.0 && b.maxs[0] > 256.0);
        assert!(b.mins[2] < 0.0 && b.maxs[2] > 0.0);
    }

    #[test]
    fn node_bounds_contain_their_triangles() {
        let tree = DispCollTree::create(&spike_disp(100.0)).unwrap();
        for node in tree.nodes.iter() {
            if let DispNodeKind::Leaf(range) = &node.kind {
                for tri in &tree.tris[range.clone()] {
                    for &v in tri.verts.iter() {
                        for i in 0..3 {
                            assert!(node.bounds.mins[i] < v[i]);
                            assert!(node.bounds.maxs[i] > v[i]);
                        }
                    }
                }
            }
        }
    }

    #[test]
    fn bad_input_is_an_error() {
        let mut info = flat_disp(2, 16.0, 0.0);
        info.verts.pop();
        assert!(DispCollTree::create(&info).is_err());

        let mut info = flat_disp(2, 16.0, 0.0);
        info.power = 7;
        assert!(DispCollTree::create(&info).is_err());
    }

    #[test]
    fn degenerate_triangles_are_skipped() {
        let _ = env_logger::builder().is_test(true).try_init();
        let mut info = flat_disp(2, 16.0, 0.0);
        let side = info.side_verts();
        // collapse the first column of cells to zero width
        for j in 0..side {
            info.verts[j * side + 1] = info.verts[j * side];
        }
        let tree = DispCollTree::create(&info).unwrap();
        assert_eq!(tree.tri_count(), 4 * 4 * 2 - 8);
    }

    #[test]
    fn ray_hits_front_face() {
        let tree = DispCollTree::create(&flat_disp(4, 16.0, 0.0)).unwrap();
        let start = v3(70.0, 53.0, 100.0);
        let delta = v3(0.0, 0.0, -200.0);
        let hit = tree.aabb_tree_ray(start, delta, inv(delta), 1.0, true).unwrap();
        assert!(crate::is_close_to(hit.fraction, 0.5, 0.001));
        assert!(hit.fraction < 0.5);
        assert_eq!(hit.plane.normal, v3(0.0, 0.0, 1.0));
        assert!(!hit.backface);
        assert_eq!(hit.quadrant, 0);
        assert_eq!(hit.surface_props, 10);

        // a nearer hit already exists
        assert!(tree.aabb_tree_ray(start, delta, inv(delta), 0.25, true).is_none());
    }

    #[test]
    fn ray_back_faces_are_optional() {
        let tree = DispCollTree::create(&flat_disp(4, 16.0, 0.0)).unwrap();
        let start = v3(200.0, 180.0, -10.0);
        let delta = v3(0.0, 0.0, 1000.0);
        assert!(tree.aabb_tree_ray(start, delta, inv(delta), 1.0, true).is_none());

        let hit = tree.aabb_tree_ray(start, delta, inv(delta), 1.0, false).unwrap();
        assert!(hit.backface);
        assert_eq!(hit.quadrant, 3);
        assert_eq!(hit.plane.normal, v3(0.0, 0.0, -1.0));
    }

    #[test]
    fn ray_misses_beside_patch() {
        let tree = DispCollTree::create(&flat_disp(2, 16.0, 0.0)).unwrap();
        let start = v3(100.0, 10.0, 10.0);
        let delta = v3(0.0, 0.0, -20.0);
        assert!(tree.aabb_tree_ray(start, delta, inv(delta), 1.0, true).is_none());
    }

    #[test]
    fn sweep_lands_on_flat_patch() {
        let tree = DispCollTree::create(&flat_disp(4, 16.0, 0.0)).unwrap();
        let start = v3(70.0, 53.0, 100.0);
        let delta = v3(0.0, 0.0, -200.0);
        let extents = v3(8.0, 8.0, 8.0);
        let hit = tree
            .aabb_tree_sweep_aabb(start, delta, inv(delta), extents, 1.0)
            .unwrap();
        // the box bottom touches z = 0 when its center is at z = 8
        assert!(crate::is_close_to(hit.fraction, 92.0 / 200.0, 0.001));
        assert_eq!(hit.plane.normal, v3(0.0, 0.0, 1.0));
    }

    #[test]
    fn sweep_ignores_back_faces() {
        let tree = DispCollTree::create(&flat_disp(4, 16.0, 0.0)).unwrap();
        let start = v3(70.0, 53.0, -100.0);
        let delta = v3(0.0, 0.0, 200.0);
        let extents = v3(4.0, 4.0, 4.0);
        assert!(tree
            .aabb_tree_sweep_aabb(start, delta, inv(delta), extents, 1.0)
            .is_none());
    }

    #[test]
    fn sweep_inside_bounds_without_touching_triangles() {
        let tree = DispCollTree::create(&spike_disp(100.0)).unwrap();
        let extents = v3(2.0, 2.0, 2.0);
        let start = v3(138.0, 100.0, 95.0);
        let end = v3(138.0, 156.0, 95.0);
        let delta = end - start;

        // broad phase accepts the whole sweep
        let grown = tree.bounds().expanded(extents);
        assert!(grown.contains_point(start));
        assert!(grown.contains_point(end));

        assert!(tree
            .aabb_tree_sweep_aabb(start, delta, inv(delta), extents, 1.0)
            .is_none());

        // lowering the box onto the spike does hit
        let down = v3(0.0, 0.0, -200.0);
        let hit = tree
            .aabb_tree_sweep_aabb(v3(130.0, 130.0, 150.0), down, inv(down), extents, 1.0)
            .unwrap();
        assert!(hit.fraction > 0.0 && hit.fraction < 1.0);
    }

    /// Small deterministic generator so the sweep cases are reproducible.
    struct Lcg(u64);

    impl Lcg {
        fn next_f32(&mut self, lo: f32, hi: f32) -> f32 {
            self.0 = self
                .0
                .wrapping_mul(6364136223846793005)
                .wrapping_add(1442695040888963407);
            let unit = (self.0 >> 40) as f32 / (1u64 << 24) as f32;
            lo + (hi - lo) * unit
        }

        fn next_v3(&mut self, lo: f32, hi: f32) -> vec3_t {
            v3(self.next_f32(lo, hi), self.next_f32(lo, hi), self.next_f32(lo, hi))
        }
    }

    #[test]
    fn sweep_hits_only_where_the_box_touches() {
        let _ = env_logger::builder().is_test(true).try_init();
        let mut rng = Lcg(0x5eed);
        let slack = vec3_t::from_scalar(0.1);
        let mut hits = 0;

        for _ in 0..1500 {
            let verts = [rng.next_v3(-10.0, 10.0), rng.next_v3(-10.0, 10.0), rng.next_v3(-10.0, 10.0)];
            let tri = match DispTri::new(verts, 0) {
                Some(tri) => tri,
                None => continue,
            };
            let extents = rng.next_v3(0.5, 4.0);
            let start = rng.next_v3(-20.0, 20.0);
            let end = rng.next_v3(-20.0, 20.0);
            if tri_box_overlap(start, extents + slack, &tri) {
                continue;
            }

            let (fraction, _) = match sweep_aabb_to_tri(&tri, start, end, extents) {
                Some(hit) => hit,
                None => continue,
            };
            hits += 1;
            assert!((0.0..=1.0).contains(&fraction));

            // some point of the path must actually touch the triangle
            let touches = (0..=2000).any(|k| {
                let p = start.lerp(end, k as f32 / 2000.0);
                tri_box_overlap(p, extents + slack, &tri)
            });
            assert!(
                touches,
                "phantom hit at {} for {:?} from {:?} to {:?} extents {:?}",
                fraction, verts, start, end, extents
            );
        }
        assert!(hits > 20, "only {} hits", hits);
    }

    #[test]
    fn sweep_passes_beside_a_slanted_edge() {
        // z - x stays at 2.3 along the path, so only the plane through the
        // diagonal edge with normal y x edge keeps the box off the triangle
        let tri = DispTri::new([v3(0.0, 0.0, 0.0), v3(10.0, 10.0, 10.0), v3(10.0, 0.0, 0.0)], 0).unwrap();
        let extents = v3(1.0, 1.0, 1.0);
        let start = v3(1.0, 6.0, 3.3);
        let end = v3(7.0, 6.0, 9.3);
        assert!(!(0..=100).any(|k| tri_box_overlap(start.lerp(end, k as f32 / 100.0), extents, &tri)));
        assert!(sweep_aabb_to_tri(&tri, start, end, extents).is_none());

        // one unit closer along x the box does clip the edge
        let hit = sweep_aabb_to_tri(&tri, start + v3(1.0, 0.0, 0.0), end + v3(1.0, 0.0, 0.0), extents);
        assert!(hit.is_some());
    }

    #[test]
    fn intersect_aabb() {
        let tree = DispCollTree::create(&spike_disp(100.0)).unwrap();
        assert!(tree.aabb_tree_intersect_aabb(v3(60.0, 60.0, -4.0), v3(70.0, 70.0, 4.0)));
        assert!(!tree.aabb_tree_intersect_aabb(v3(60.0, 60.0, 4.0), v3(70.0, 70.0, 10.0)));
        // above the spike flanks, inside the patch bounds
        assert!(!tree.aabb_tree_intersect_aabb(v3(136.0, 98.0, 93.0), v3(140.0, 158.0, 97.0)));
        assert!(tree.aabb_tree_intersect_aabb(v3(126.0, 126.0, 90.0), v3(130.0, 130.0, 99.0)));
    }

    #[test]
    fn tris_in_sphere_respects_cap() {
        let tree = DispCollTree::create(&flat_disp(4, 16.0, 0.0)).unwrap();
        let mut out = Vec::new();
        let n = tree.aabb_tree_get_tris_in_sphere(v3(128.0, 128.0, 0.0), 20.0, &mut out, 1000);
        assert_eq!(n, out.len());
        assert!(n >= 8);
        for &i in out.iter() {
            assert!(tree.tri(i).bounds.intersects_sphere(v3(128.0, 128.0, 0.0), 20.0));
        }

        out.clear();
        assert_eq!(tree.aabb_tree_get_tris_in_sphere(v3(128.0, 128.0, 0.0), 20.0, &mut out, 3), 3);
        assert_eq!(out.len(), 3);
    }

    #[test]
    fn surface_props_by_quadrant() {
        let tree = DispCollTree::create(&flat_disp(2, 16.0, 0.0)).unwrap();
        assert_eq!(tree.surface_props(0), 10);
        assert_eq!(tree.surface_props(3), 13);
    }

    #[test]
    #[should_panic]
    fn surface_props_bad_quadrant() {
        let tree = DispCollTree::create(&flat_disp(2, 16.0, 0.0)).unwrap();
        tree.surface_props(4);
    }

    #[test]
    fn virtual_mesh_borrows_tree() {
        let tree = DispCollTree::create(&flat_disp(2, 16.0, 0.0)).unwrap();
        let mesh = DispVirtualMesh {
            tree: &tree,
            hull: None,
        };
        assert_eq!(mesh.triangle_count(), 32);
        let mut out = Vec::new();
        mesh.tris_in_region(
            &vec3_bounds::new(v3(1.0, 1.0, -1.0), v3(2.0, 2.0, 1.0)),
            &mut out,
        );
        assert_eq!(out.len(), 2);
        assert_eq!(mesh.triangle(out[0])[0], v3(0.0, 0.0, 0.0));
        assert!(mesh.hull_bytes().is_none());
    }
}
