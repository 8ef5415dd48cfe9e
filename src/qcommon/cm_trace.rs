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
// cm_trace.rs -- swept and positional box traces through the world tree

use crate::perf::{c_brush_traces, c_disp_traces, c_traces};
use crate::prelude::*;
use crate::qcommon::cm_disp::DISPCOLL_DIST_EPSILON;
use crate::qcommon::cm_local::*;
use crate::qcommon::cm_test::CM_BoxLeafnumsHeadnode;
use crate::qcommon::cm_tracework::{traceWork_t, TraceStats};
use log::trace;

// enterfrac before any plane has been crossed going in
const NEVER_UPDATED: f32 = -9999.0;

// minimum normal z for a displacement hit to count as floor
const DISP_WALKABLE_Z: f32 = 0.7;
const DISP_BUILDABLE_Z: f32 = 0.8;

const MAX_UNSWEPT_LEAFS: usize = 1024;

pub fn CM_ClearTrace(trace: &mut trace_t) {
    *trace = trace_t::default();
}

fn CM_SetTraceSurface(bsp: &CollisionBspData, trace: &mut trace_t, surface_index: u16) {
    let surface = bsp.GetSurfaceAtIndex(surface_index);
    trace.worldSurfaceIndex = surface_index;
    trace.surfaceFlags = surface.flags;
    trace.surfaceProps = surface.surfaceProps;
}

/*
================
CM_ComputeTraceEndpoints

Fills in startpos and endpos from the fractions. A trace that never left
solid (fractionleftsolid == 1) ends where it started.
================
*/
pub fn CM_ComputeTraceEndpoints(ray: &Ray_t, trace: &mut trace_t) {
    // the ray start is the center of the extents
    let start = ray.start + ray.start_offset;

    trace.endpos = if trace.fraction == 1.0 {
        start + ray.delta
    } else {
        VectorMA(start, trace.fraction, ray.delta)
    };

    if trace.fractionleftsolid == 0.0 {
        trace.startpos = start;
    } else {
        if trace.fractionleftsolid == 1.0 {
            trace.startsolid = true;
            trace.allsolid = true;
            trace.fraction = 0.0;
            trace.endpos = start;
        }
        trace.startpos = VectorMA(start, trace.fractionleftsolid, ray.delta);
    }
}

/*
===============================================================================

POSITION TESTING

===============================================================================
*/

fn CM_TestBoxInBrush(bsp: &CollisionBspData, tw: &mut traceWork_t, brush: &cbrush_t) {
    if brush.numsides == 0 {
        return;
    }

    for side in brush.sides(bsp).iter() {
        let plane = side.plane(bsp);

        // push the plane out apropriately for mins/maxs
        let mut ofs = vec3_origin;
        for j in 0..3 {
            ofs[j] = if plane.normal[j] < 0.0 {
                tw.maxs[j]
            } else {
                tw.mins[j]
            };
        }
        let dist = plane.dist - ofs.dot(plane.normal);
        let d1 = tw.start.dot(plane.normal) - dist;

        // if completely in front of face, no intersection
        if d1 > 0.0 {
            return;
        }
    }

    // inside this brush
    tw.trace.startsolid = true;
    tw.trace.allsolid = true;
    tw.trace.fraction = 0.0;
    tw.trace.fractionleftsolid = 1.0;
    tw.trace.contents = brush.contents;
}

/// Picks the stab direction for a point that may be under the terrain. The
/// first relevant displacement whose bounds hold the point wins; otherwise
/// the first relevant displacement's direction is used and anything under it
/// counts as solid.
fn CM_PreStab(
    bsp: &CollisionBspData,
    tw: &traceWork_t,
    disps: &[usize],
) -> Option<(vec3_t, ContentsFlag)> {
    let mut fallback = None;
    for &disp_index in disps.iter() {
        let tree = &bsp.disp_trees[disp_index];
        if tree.contents() & tw.contents == 0 {
            continue;
        }
        if fallback.is_none() {
            fallback = Some((tree.stab_dir(), CONTENTS_SOLID));
        }
        if tree.bounds().expanded(tw.extents).contains_point(tw.start) {
            return Some((tree.stab_dir(), tree.contents()));
        }
    }
    fallback
}

/// Casts a ray from `tw.start` along `dir` through the tree, as a nested
/// trace, and reports whether the nearest displacement it meets faces away
/// from the start. Everything in `tw` except the visit state of the nested
/// level is left as it was.
pub fn CM_DispStab(bsp: &CollisionBspData, tw: &mut traceWork_t, dir: vec3_t) -> bool {
    let saved = tw.snapshot();
    tw.visits.push();

    let start = tw.start;
    tw.end = start + dir * MAX_TRACE_LENGTH;
    tw.delta = tw.end - start;
    tw.invDelta = tw.delta.map(|d| if d != 0.0 { 1.0 / d } else { f32::MAX });
    tw.mins = vec3_origin;
    tw.maxs = vec3_origin;
    tw.extents = vec3_origin;
    tw.ispoint = true;
    tw.isswept = true;
    tw.test_brushes = false;
    tw.cull_backfaces = false;

    CM_ClearTrace(&mut tw.trace);
    tw.dispHit = false;
    tw.dispBackface = false;
    tw.dispStabDir = dir;

    let (headnode, p1, p2) = (tw.headnode, tw.start, tw.end);
    CM_RecursiveHullCheck(bsp, tw, headnode, 0.0, 1.0, p1, p2);

    let inside = tw.dispHit && tw.dispBackface;
    trace!("CM_DispStab: start {:?} dir {:?} inside {}", start, dir, inside);

    tw.visits.pop();
    tw.restore(&saved);
    inside
}

fn CM_TestInDispTree(bsp: &CollisionBspData, tw: &mut traceWork_t, disps: &[usize]) {
    if !tw.ispoint {
        // box/tree intersection first
        let abs_mins = tw.start + tw.mins;
        let abs_maxs = tw.start + tw.maxs;
        for &disp_index in disps.iter() {
            if !tw.visits.visit_disp(disp_index) {
                continue;
            }
            let tree = &bsp.disp_trees[disp_index];
            if tree.contents() & tw.contents == 0 {
                continue;
            }
            if tree.flags() & DISP_INFO_FLAG_NO_HULL_COLLISION != 0 {
                continue;
            }
            tw.stats.disp_tests += 1;
            if tree.aabb_tree_intersect_aabb(abs_mins, abs_maxs) {
                tw.trace.startsolid = true;
                tw.trace.allsolid = true;
                tw.trace.fraction = 0.0;
                tw.trace.fractionleftsolid = 0.0;
                tw.trace.contents = tree.contents();
                return;
            }
        }
    }

    // a point, or a box that touched no triangles; stab to see which side
    // of the terrain it is on
    // the stab is not deduplicated: a patch listed by several leaves is
    // stabbed again for each of them
    let (dir, contents) = match CM_PreStab(bsp, tw, disps) {
        Some(stab) => stab,
        None => return,
    };
    if CM_DispStab(bsp, tw, dir) {
        tw.trace.startsolid = true;
        tw.trace.allsolid = true;
        tw.trace.fraction = 0.0;
        tw.trace.fractionleftsolid = 0.0;
        tw.trace.contents = contents;
    }
}

fn CM_TestInLeaf(bsp: &CollisionBspData, tw: &mut traceWork_t, leafnum: usize) {
    let leaf = &bsp.leafs[leafnum];

    // test box position against all brushes in the leaf
    for &brushnum in leaf.leaf_brushes_index(bsp).iter() {
        if !tw.visits.visit_brush(brushnum) {
            continue; // already checked this brush in another leaf
        }
        let b = &bsp.brushes[brushnum];
        if b.contents & tw.contents == 0 {
            continue;
        }
        tw.stats.brush_tests += 1;
        CM_TestBoxInBrush(bsp, tw, b);
        if tw.trace.allsolid {
            return;
        }
    }

    if bsp.cm_nodisp.as_bool() || leaf.dispCount == 0 {
        return;
    }
    CM_TestInDispTree(bsp, tw, leaf.leaf_disps(bsp));
}

/// A trace with no motion. Every leaf the box touches is tested in place.
fn CM_UnsweptBoxTrace(bsp: &CollisionBspData, tw: &mut traceWork_t, ray: &Ray_t, headnode: NodeRef) {
    let mut leafs = [0usize; MAX_UNSWEPT_LEAFS];
    let (numleafs, _) = CM_BoxLeafnumsHeadnode(
        bsp,
        ray.start,
        ray.extents + vec3_t::from_scalar(1.0),
        &mut leafs,
        headnode,
    );

    let mut found_non_solid = false;
    for &leafnum in leafs[..numleafs].iter() {
        // leaves holding terrain are only partly solid
        let leaf = &bsp.leafs[leafnum];
        if leaf.contents & CONTENTS_SOLID == 0 || leaf.dispCount > 0 {
            found_non_solid = true;
        }

        CM_TestInLeaf(bsp, tw, leafnum);
        if tw.trace.allsolid {
            break;
        }
    }

    if !found_non_solid {
        tw.trace.allsolid = true;
        tw.trace.startsolid = true;
        tw.trace.fraction = 0.0;
        tw.trace.fractionleftsolid = 1.0;
    }
}

/*
===============================================================================

TRACING

===============================================================================
*/

/// Nodraw brushes that only block sight can be skipped by traces that ask
/// for it.
fn IsNoDrawBrush(bsp: &CollisionBspData, contents_mask: ContentsFlag, brush: &cbrush_t) -> bool {
    if contents_mask & CONTENTS_IGNORE_NODRAW_OPAQUE == 0 {
        return false;
    }
    if brush.contents & contents_mask != CONTENTS_OPAQUE {
        return false;
    }
    brush
        .sides(bsp)
        .iter()
        .any(|side| bsp.GetSurfaceAtIndex(side.surfaceIndex).flags & SURF_NODRAW != 0)
}

/*
================
CM_ClipBoxToBrush

Finds the latest time the trace crosses a plane towards the interior and the
earliest time it crosses a plane towards the exterior. Point traces ignore
bevel planes.
================
*/
fn CM_ClipBoxToBrush(bsp: &CollisionBspData, tw: &mut traceWork_t, brush: &cbrush_t) {
    if brush.numsides == 0 {
        return;
    }

    c_brush_traces.add_one();

    let mut enterfrac = NEVER_UPDATED;
    let mut leavefrac = 1.0f32;
    let mut clipplane: Option<&cplane_t> = None;
    let mut leadside: Option<&cbrushside_t> = None;
    let mut getout = false;
    let mut startout = false;

    for side in brush.sides(bsp).iter() {
        if tw.ispoint && side.bBevel {
            continue;
        }
        let plane = side.plane(bsp);

        let dist = if tw.ispoint {
            plane.dist
        } else {
            // push the plane out apropriately for mins/maxs
            plane.dist + plane.normal.dot_abs(tw.extents)
        };

        let d1 = tw.start.dot(plane.normal) - dist;
        let d2 = tw.end.dot(plane.normal) - dist;

        if d2 > 0.0 {
            getout = true; // endpoint is not in solid
        }
        if d1 > 0.0 {
            startout = true;
        }

        // if completely in front of face, no intersection with the entire brush
        if d1 > 0.0 && d2 > 0.0 {
            return;
        }

        // if it doesn't cross the plane, the plane isn't relevent
        if d1 <= 0.0 && d2 <= 0.0 {
            continue;
        }

        // crosses face
        if d1 > d2 {
            // enter
            let f = fmax(d1 - DIST_EPSILON, 0.0) / (d1 - d2);
            if f > enterfrac {
                enterfrac = f;
                clipplane = Some(plane);
                leadside = Some(side);
            }
        } else {
            // leave
            let f = (d1 + DIST_EPSILON) / (d1 - d2);
            if f < leavefrac {
                leavefrac = f;
            }
        }
    }

    // we entered this brush after leaving the previous one, so we are still
    // outside; only points track fractionleftsolid
    if tw.ispoint && startout && tw.trace.fractionleftsolid - enterfrac > 0.0 {
        startout = false;
    }

    if !startout {
        // original point was inside brush
        tw.trace.startsolid = true;
        tw.trace.contents = brush.contents;

        if !getout {
            tw.trace.allsolid = true;
            tw.trace.fraction = 0.0;
            tw.trace.fractionleftsolid = 1.0;
        } else if leavefrac != 1.0 && leavefrac > tw.trace.fractionleftsolid {
            // leavefrac == 1 means it was never updated
            tw.trace.fractionleftsolid = leavefrac;
            if tw.trace.fraction <= leavefrac {
                tw.trace.fraction = 1.0;
                CM_SetTraceSurface(bsp, &mut tw.trace, SURFACE_INDEX_INVALID);
            }
        }
        return;
    }

    // we haven't hit anything at all until we've left
    if enterfrac < leavefrac && enterfrac > NEVER_UPDATED && enterfrac < tw.trace.fraction {
        if let (Some(plane), Some(side)) = (clipplane, leadside) {
            tw.trace.fraction = fmax(enterfrac, 0.0);
            tw.trace.plane = *plane;
            tw.trace.contents = brush.contents;
            tw.trace.disp_flags = 0;
            tw.dispHit = false;
            CM_SetTraceSurface(bsp, &mut tw.trace, side.surfaceIndex);
        }
    }
}

/// Fills in the displacement flags when the nearest hit so far came from a
/// displacement.
fn CM_PostTraceToDispTree(tw: &mut traceWork_t) {
    if !tw.dispHit {
        return;
    }

    let mut flags = DISPSURF_FLAG_SURFACE;
    let z = tw.trace.plane.normal[2];
    if z >= DISP_WALKABLE_Z {
        flags |= DISPSURF_FLAG_WALKABLE;
    }
    if z >= DISP_BUILDABLE_Z {
        flags |= DISPSURF_FLAG_BUILDABLE;
    }
    if tw.dispHitQuadrant & 1 != 0 {
        flags |= DISPSURF_FLAG_SURFPROP1;
    }
    if tw.dispHitQuadrant & 2 != 0 {
        flags |= DISPSURF_FLAG_SURFPROP2;
    }
    tw.trace.disp_flags = flags;
}

fn CM_TraceToDispList(bsp: &CollisionBspData, tw: &mut traceWork_t, disps: &[usize]) {
    for &disp_index in disps.iter() {
        let tree = &bsp.disp_trees[disp_index];

        // only check trees that match the contents
        if tree.contents() & tw.contents == 0 {
            continue;
        }
        let skip = if tw.ispoint {
            DISP_INFO_FLAG_NO_RAY_COLLISION
        } else {
            DISP_INFO_FLAG_NO_HULL_COLLISION
        };
        if tree.flags() & skip != 0 {
            continue;
        }

        if tw.isswept && !tw.visits.visit_disp(disp_index) {
            continue;
        }

        let bounds = tree.bounds().expanded(tw.extents);
        if !IsBoxIntersectingRay(
            bounds.mins,
            bounds.maxs,
            tw.start,
            tw.delta,
            tw.invDelta,
            DISPCOLL_DIST_EPSILON,
        ) {
            continue;
        }

        tw.stats.disp_tests += 1;
        c_disp_traces.add_one();

        let hit = if tw.ispoint {
            tree.aabb_tree_ray(
                tw.start,
                tw.delta,
                tw.invDelta,
                tw.trace.fraction,
                tw.cull_backfaces,
            )
        } else {
            tree.aabb_tree_sweep_aabb(tw.start, tw.delta, tw.invDelta, tw.extents, tw.trace.fraction)
        };

        if let Some(hit) = hit {
            if hit.fraction < tw.trace.fraction {
                tw.trace.fraction = hit.fraction;
                tw.trace.plane = hit.plane;
                tw.trace.contents = tree.contents();
                CM_SetTraceSurface(bsp, &mut tw.trace, tree.surface_index());
                tw.trace.surfaceProps = hit.surface_props;
                tw.dispHit = true;
                tw.dispBackface = hit.backface;
                tw.dispHitQuadrant = hit.quadrant;
            }
        }

        if tw.trace.fraction == 0.0 {
            break;
        }
    }

    CM_PostTraceToDispTree(tw);
}

fn CM_TraceToLeaf(bsp: &CollisionBspData, tw: &mut traceWork_t, leafnum: usize) {
    let leaf = &bsp.leafs[leafnum];

    if tw.test_brushes {
        // trace line against all brushes in the leaf
        for &brushnum in leaf.leaf_brushes_index(bsp).iter() {
            if !tw.visits.visit_brush(brushnum) {
                continue; // already checked this brush in another leaf
            }
            let b = &bsp.brushes[brushnum];
            if b.contents & tw.contents == 0 {
                continue;
            }
            if IsNoDrawBrush(bsp, tw.contents, b) {
                continue;
            }

            tw.stats.brush_tests += 1;
            CM_ClipBoxToBrush(bsp, tw, b);
            if tw.trace.fraction == 0.0 {
                return;
            }
        }

        if tw.trace.startsolid {
            return;
        }
    }

    if bsp.cm_nodisp.as_bool() || leaf.dispCount == 0 {
        return;
    }
    CM_TraceToDispList(bsp, tw, leaf.leaf_disps(bsp));
}

/// Traverse all the contacted leafs from the start to the end position.
/// If the trace is a point, they will be exactly in order, but for larger
/// trace volumes it is possible to hit something in a later leaf with
/// a smaller intercept fraction.
fn CM_RecursiveHullCheck(
    bsp: &CollisionBspData,
    tw: &mut traceWork_t,
    mut num: NodeRef,
    p1f: f32,
    p2f: f32,
    p1: vec3_t,
    p2: vec3_t,
) {
    if tw.trace.fraction <= p1f {
        return; // already hit something nearer
    }

    // find the point distances to the seperating plane
    // and the offset for the size of the box
    let (node, t1, t2, offset) = loop {
        let n = match num {
            NodeRef::Leaf(leafnum) => {
                CM_TraceToLeaf(bsp, tw, leafnum);
                return;
            }
            NodeRef::Internal(n) => n,
        };
        let node = &bsp.nodes[n];
        let plane = node.plane(bsp);

        let (t1, t2, offset) = if plane.type_ < 3 {
            let t = plane.type_ as usize;
            (p1[t] - plane.dist, p2[t] - plane.dist, tw.extents[t])
        } else {
            let offset = if tw.ispoint {
                0.0
            } else {
                plane.normal.dot_abs(tw.extents)
            };
            (plane.distance_to(p1), plane.distance_to(p2), offset)
        };

        // see which sides we need to consider
        if t1 > offset && t2 > offset {
            num = node.children[0];
            continue;
        }
        if t1 < -offset && t2 < -offset {
            num = node.children[1];
            continue;
        }
        break (node, t1, t2, offset);
    };

    // put the crosspoint DIST_EPSILON pixels on the near side
    let (side, frac, frac2) = if t1 < t2 {
        let idist = 1.0 / (t1 - t2);
        (
            Side::BACK,
            (t1 - offset - DIST_EPSILON) * idist,
            (t1 + offset + DIST_EPSILON) * idist,
        )
    } else if t1 > t2 {
        let idist = 1.0 / (t1 - t2);
        (
            Side::FRONT,
            (t1 + offset + DIST_EPSILON) * idist,
            (t1 - offset - DIST_EPSILON) * idist,
        )
    } else {
        (Side::FRONT, 1.0, 0.0)
    };

    // move up to the node
    let frac = frac.max(0.0).min(1.0);
    let midf = p1f + (p2f - p1f) * frac;
    let mid = p1.lerp(p2, frac);
    CM_RecursiveHullCheck(bsp, tw, node.children[side.index()], p1f, midf, p1, mid);

    // go past the node
    let frac2 = frac2.max(0.0).min(1.0);
    let midf = p1f + (p2f - p1f) * frac2;
    let mid = p1.lerp(p2, frac2);
    CM_RecursiveHullCheck(bsp, tw, node.children[side.other().index()], midf, p2f, mid, p2);
}

//======================================================================

/// Runs one trace on an already checked-out context. The per-trace stats in
/// `tw` describe this trace when it returns.
pub(crate) fn CM_BoxTraceWithWork(
    bsp: &CollisionBspData,
    tw: &mut traceWork_t,
    ray: &Ray_t,
    headnode: NodeRef,
    brushmask: ContentsFlag,
    compute_endpoints: bool,
) -> trace_t {
    c_traces.add_one();

    CM_ClearTrace(&mut tw.trace);
    tw.stats = TraceStats::default();

    // map not loaded
    if bsp.nodes.is_empty() {
        return tw.trace;
    }

    tw.setup(ray, headnode, brushmask);

    if !ray.is_swept {
        // position test special case
        CM_UnsweptBoxTrace(bsp, tw, ray, headnode);
    } else {
        // general sweeping through world
        let (p1, p2) = (tw.start, tw.end);
        CM_RecursiveHullCheck(bsp, tw, headnode, 0.0, 1.0, p1, p2);
    }

    if compute_endpoints {
        CM_ComputeTraceEndpoints(ray, &mut tw.trace);
    }
    tw.trace
}

pub fn CM_BoxTrace(
    bsp: &CollisionBspData,
    ray: &Ray_t,
    headnode: NodeRef,
    brushmask: ContentsFlag,
    compute_endpoints: bool,
) -> trace_t {
    let mut tw = bsp.begin_trace();
    CM_BoxTraceWithWork(bsp, &mut tw, ray, headnode, brushmask, compute_endpoints)
}

/// Sweeps the box `mins..maxs` from `start` to `end` through the world.
pub fn CM_TraceBox(
    bsp: &CollisionBspData,
    start: vec3_t,
    end: vec3_t,
    mins: vec3_t,
    maxs: vec3_t,
    brushmask: ContentsFlag,
) -> trace_t {
    let ray = Ray_t::new_box(start, end, mins, maxs);
    CM_BoxTrace(bsp, &ray, bsp.world_headnode(), brushmask, true)
}

/*
==================
CM_TransformedBoxTrace

Handles offseting and rotation of the end points for moving and
rotating entities
==================
*/
pub fn CM_TransformedBoxTrace(
    bsp: &CollisionBspData,
    ray: &Ray_t,
    headnode: NodeRef,
    brushmask: ContentsFlag,
    origin: vec3_t,
    angles: vec3_t,
) -> trace_t {
    let rotated = angles[0] != 0.0 || angles[1] != 0.0 || angles[2] != 0.0;
    let local_to_world = AngleMatrix(angles, origin);

    let mut ray_l = *ray;
    if rotated {
        // rotate the box's true origin and reapply the offset, so every trace
        // with the same centering gets the same transform
        let world_origin = ray.start + ray.start_offset;
        ray_l.delta = VectorIRotate(ray.delta, &local_to_world);
        ray_l.start = VectorITransform(world_origin, &local_to_world) - ray.start_offset;
    } else {
        ray_l.start = ray.start - origin;
    }

    // sweep the box through the model, don't compute endpoints
    let mut trace = CM_BoxTrace(bsp, &ray_l, headnode, brushmask, false);

    // put the hit plane back in world space
    if trace.fraction != 1.0 {
        let normal = if rotated {
            VectorRotate(trace.plane.normal, &local_to_world)
        } else {
            trace.plane.normal
        };
        trace.plane = cplane_t::new(normal, trace.plane.dist + normal.dot(origin));
    }

    CM_ComputeTraceEndpoints(ray, &mut trace);
    trace
}

/*
===============================================================================

RAY LEAF LISTING

===============================================================================
*/

fn CM_RayLeafnums_r(
    bsp: &CollisionBspData,
    ray: &Ray_t,
    mut num: NodeRef,
    p1f: f32,
    p2f: f32,
    list: &mut [usize],
    count: &mut usize,
) {
    let (node, t1, t2, offset) = loop {
        let n = match num {
            NodeRef::Leaf(leafnum) => {
                if *count < list.len() {
                    list[*count] = leafnum;
                    *count += 1;
                } else {
                    trace!("CM_RayLeafnums_r: max leaf count along ray exceeded");
                }
                return;
            }
            NodeRef::Internal(n) => n,
        };
        let node = &bsp.nodes[n];
        let plane = node.plane(bsp);

        let d = plane.distance_to(ray.start);
        let dd = plane.normal.dot(ray.delta);
        let t1 = d + p1f * dd;
        let t2 = d + p2f * dd;
        let offset = if plane.type_ < 3 {
            ray.extents[plane.type_ as usize]
        } else {
            plane.normal.dot_abs(ray.extents)
        };

        if t1 > offset && t2 > offset {
            num = node.children[0];
            continue;
        }
        if t1 < -offset && t2 < -offset {
            num = node.children[1];
            continue;
        }
        break (node, t1, t2, offset);
    };

    let (side, frac, frac2) = if t1 < t2 {
        let idist = 1.0 / (t1 - t2);
        (
            Side::BACK,
            (t1 - offset - DIST_EPSILON) * idist,
            (t1 + offset + DIST_EPSILON) * idist,
        )
    } else if t1 > t2 {
        let idist = 1.0 / (t1 - t2);
        (
            Side::FRONT,
            (t1 + offset + DIST_EPSILON) * idist,
            (t1 - offset - DIST_EPSILON) * idist,
        )
    } else {
        (Side::FRONT, 1.0, 0.0)
    };

    let frac = frac.max(0.0).min(1.0);
    let midf = p1f + (p2f - p1f) * frac;
    CM_RayLeafnums_r(bsp, ray, node.children[side.index()], p1f, midf, list, count);

    let frac2 = frac2.max(0.0).min(1.0);
    let midf = p1f + (p2f - p1f) * frac2;
    CM_RayLeafnums_r(bsp, ray, node.children[side.other().index()], midf, p2f, list, count);
}

/// Leaves the ray passes through, nearest first. Returns how many were
/// stored.
pub fn CM_RayLeafnums(bsp: &CollisionBspData, ray: &Ray_t, list: &mut [usize]) -> usize {
    if bsp.nodes.is_empty() {
        return 0;
    }
    let mut count = 0;
    CM_RayLeafnums_r(bsp, ray, bsp.world_headnode(), 0.0, 1.0, list, &mut count);
    count
}
