// definitions shared by the collision model and its callers

use crate::game::surfaceflags::*;
use crate::vec3::*;

pub const PLANE_X: u8 = 0;
pub const PLANE_Y: u8 = 1;
pub const PLANE_Z: u8 = 2;
pub const PLANE_ANYX: u8 = 3;
pub const PLANE_ANYY: u8 = 4;
pub const PLANE_ANYZ: u8 = 5;

pub const COORD_EXTENT: f32 = 2.0 * 16384.0;

/// Longest possible diagonal through the world.
pub const MAX_TRACE_LENGTH: f32 = 1.732_050_8 * COORD_EXTENT;

/// Index of a surface that does not exist.
pub const SURFACE_INDEX_INVALID: u16 = 0xffff;

#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct cplane_t {
    pub normal: vec3_t,
    pub dist: f32,
    pub type_: u8,    // for fast side tests
    pub signbits: u8, // signx + (signy<<1) + (signz<<2), used as lookup during collision
}

impl cplane_t {
    pub fn new(normal: vec3_t, dist: f32) -> cplane_t {
        cplane_t {
            normal,
            dist,
            type_: PlaneTypeForNormal(normal),
            signbits: normal.sign_bits(),
        }
    }

    pub fn distance_to(&self, p: vec3_t) -> f32 {
        if self.type_ < 3 {
            p[self.type_ as usize] - self.dist
        } else {
            self.normal.dot(p) - self.dist
        }
    }
}

/// Only positive unit normals are axial; the fast paths read `p[type]`.
pub fn PlaneTypeForNormal(normal: vec3_t) -> u8 {
    if normal[0] == 1.0 {
        PLANE_X
    } else if normal[1] == 1.0 {
        PLANE_Y
    } else if normal[2] == 1.0 {
        PLANE_Z
    } else {
        let a = normal.abs();
        if a[0] >= a[1] && a[0] >= a[2] {
            PLANE_ANYX
        } else if a[1] >= a[0] && a[1] >= a[2] {
            PLANE_ANYY
        } else {
            PLANE_ANYZ
        }
    }
}

/// Returns 1 for a box entirely in front of the plane, 2 for entirely behind,
/// and 3 when the plane splits it.
pub fn BoxOnPlaneSide(emins: vec3_t, emaxs: vec3_t, p: &cplane_t) -> i32 {
    // fast axial cases
    if p.type_ < 3 {
        let t = p.type_ as usize;
        if p.dist <= emins[t] {
            return 1;
        }
        if p.dist >= emaxs[t] {
            return 2;
        }
        return 3;
    }

    let center = emins.mid(emaxs);
    let extents = emaxs - center;
    let d = p.normal.dot(center) - p.dist;
    let r = p.normal.dot_abs(extents);

    let mut sides = 0;
    if d + r >= 0.0 {
        sides = 1;
    }
    if d - r < 0.0 {
        sides |= 2;
    }
    sides
}

/// A trace segment, optionally swept with an axis-aligned box.
///
/// `start` is the box center. `start_offset` is the vector from the center back
/// to the caller's original start point.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct Ray_t {
    pub start: vec3_t,
    pub delta: vec3_t,
    pub start_offset: vec3_t,
    pub extents: vec3_t,
    pub is_ray: bool,
    pub is_swept: bool,
}

impl Ray_t {
    pub fn new(start: vec3_t, end: vec3_t) -> Ray_t {
        let delta = end - start;
        Ray_t {
            start,
            delta,
            start_offset: vec3_t::ORIGIN,
            extents: vec3_t::ORIGIN,
            is_ray: true,
            is_swept: delta.length2() != 0.0,
        }
    }

    pub fn new_box(start: vec3_t, end: vec3_t, mins: vec3_t, maxs: vec3_t) -> Ray_t {
        let delta = end - start;
        let extents = (maxs - mins) * 0.5;
        let offset = (mins + maxs) * 0.5;
        Ray_t {
            start: start + offset,
            delta,
            start_offset: -offset,
            extents,
            is_ray: extents.length2() < 1e-6,
            is_swept: delta.length2() != 0.0,
        }
    }

    /// Per-axis reciprocal of the delta; zero components map to `f32::MAX`.
    pub fn inv_delta(&self) -> vec3_t {
        self.delta
            .map(|d| if d != 0.0 { 1.0 / d } else { f32::MAX })
    }
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct trace_t {
    pub allsolid: bool,          // if true, plane is not valid
    pub startsolid: bool,        // if true, the initial point was in a solid area
    pub fraction: f32,           // time completed, 1.0 = didn't hit anything
    pub fractionleftsolid: f32,  // time we left a solid, only valid if we started in solid
    pub startpos: vec3_t,
    pub endpos: vec3_t,          // final position
    pub plane: cplane_t,         // surface normal at impact
    pub contents: ContentsFlag,  // contents on other side of surface hit
    pub surfaceFlags: SurfaceFlag,
    pub surfaceProps: u16,
    pub worldSurfaceIndex: u16,  // index into CollisionBspData::map_surfaces
    pub disp_flags: DispSurfFlag,
}

impl Default for trace_t {
    fn default() -> trace_t {
        trace_t {
            allsolid: false,
            startsolid: false,
            fraction: 1.0,
            fractionleftsolid: 0.0,
            startpos: vec3_t::ORIGIN,
            endpos: vec3_t::ORIGIN,
            plane: cplane_t::default(),
            contents: CONTENTS_EMPTY,
            surfaceFlags: 0,
            surfaceProps: 0,
            worldSurfaceIndex: SURFACE_INDEX_INVALID,
            disp_flags: 0,
        }
    }
}

impl trace_t {
    pub fn did_hit(&self) -> bool {
        self.fraction < 1.0 || self.allsolid || self.startsolid
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn box_on_plane_side_axial_and_general() {
        let p = cplane_t::new(v3(0.0, 0.0, 1.0), 64.0);
        assert_eq!(p.type_, PLANE_Z);
        assert_eq!(BoxOnPlaneSide(v3(0.0, 0.0, 70.0), v3(1.0, 1.0, 80.0), &p), 1);
        assert_eq!(BoxOnPlaneSide(v3(0.0, 0.0, 0.0), v3(1.0, 1.0, 10.0), &p), 2);
        assert_eq!(BoxOnPlaneSide(v3(0.0, 0.0, 60.0), v3(1.0, 1.0, 70.0), &p), 3);

        let n = v3(1.0, 1.0, 0.0).normalize().unwrap();
        let p = cplane_t::new(n, 0.0);
        assert_eq!(p.type_, PLANE_ANYX);
        assert_eq!(cplane_t::new(v3(-1.0, 0.0, 0.0), 8.0).type_, PLANE_ANYX);
        assert_eq!(cplane_t::new(v3(-1.0, 0.0, 0.0), 8.0).distance_to(v3(-10.0, 0.0, 0.0)), 2.0);
        assert_eq!(BoxOnPlaneSide(v3(1.0, 1.0, 0.0), v3(2.0, 2.0, 1.0), &p), 1);
        assert_eq!(BoxOnPlaneSide(v3(-1.0, -1.0, 0.0), v3(1.0, 1.0, 1.0), &p), 3);
    }

    #[test]
    fn zero_box_is_a_ray() {
        let r = Ray_t::new_box(v3(0.0, 0.0, 0.0), v3(10.0, 0.0, 0.0), vec3_origin, vec3_origin);
        assert!(r.is_ray);
        assert!(r.is_swept);
        assert_eq!(r, Ray_t::new(v3(0.0, 0.0, 0.0), v3(10.0, 0.0, 0.0)));

        let r = Ray_t::new_box(v3(0.0, 0.0, 0.0), v3(0.0, 0.0, 0.0), v3(-16.0, -16.0, 0.0), v3(16.0, 16.0, 72.0));
        assert!(!r.is_ray);
        assert!(!r.is_swept);
        assert_eq!(r.start, v3(0.0, 0.0, 36.0));
        assert_eq!(r.extents, v3(16.0, 16.0, 36.0));
    }
}
