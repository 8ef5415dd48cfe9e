// stateless support routines shared by the collision code

use crate::vec3::*;

pub const PITCH: usize = 0; // up / down
pub const YAW: usize = 1; // left / right
pub const ROLL: usize = 2; // fall over

pub fn DEG2RAD(a: f32) -> f32 {
    a * (core::f32::consts::PI / 180.0)
}

pub fn DotProduct(x: vec3_t, y: vec3_t) -> f32 {
    x.dot(y)
}

pub fn VectorMA(v: vec3_t, s: f32, b: vec3_t) -> vec3_t {
    v + b * s
}

pub fn VectorSet(x: f32, y: f32, z: f32) -> vec3_t {
    v3(x, y, z)
}

/// Returns (forward, right, up).
pub fn AngleVectors(angles: vec3_t) -> (vec3_t, vec3_t, vec3_t) {
    let (sy, cy) = DEG2RAD(angles[YAW]).sin_cos();
    let (sp, cp) = DEG2RAD(angles[PITCH]).sin_cos();
    let (sr, cr) = DEG2RAD(angles[ROLL]).sin_cos();

    let forward = v3(cp * cy, cp * sy, -sp);
    let right = v3(
        -1.0 * sr * sp * cy + -1.0 * cr * -sy,
        -1.0 * sr * sp * sy + -1.0 * cr * cy,
        -1.0 * sr * cp,
    );
    let up = v3(
        cr * sp * cy + -sr * -sy,
        cr * sp * sy + -sr * cy,
        cr * cp,
    );
    (forward, right, up)
}

/// A rotation in the first three columns and a translation in the last.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct matrix3x4_t(pub [[f32; 4]; 3]);

impl matrix3x4_t {
    pub fn row(&self, i: usize) -> vec3_t {
        v3(self.0[i][0], self.0[i][1], self.0[i][2])
    }

    pub fn column(&self, i: usize) -> vec3_t {
        v3(self.0[0][i], self.0[1][i], self.0[2][i])
    }

    pub fn origin(&self) -> vec3_t {
        self.column(3)
    }
}

pub fn AngleMatrix(angles: vec3_t, origin: vec3_t) -> matrix3x4_t {
    let (sy, cy) = DEG2RAD(angles[YAW]).sin_cos();
    let (sp, cp) = DEG2RAD(angles[PITCH]).sin_cos();
    let (sr, cr) = DEG2RAD(angles[ROLL]).sin_cos();

    let crcy = cr * cy;
    let crsy = cr * sy;
    let srcy = sr * cy;
    let srsy = sr * sy;

    // matrix = (YAW * PITCH) * ROLL
    matrix3x4_t([
        [cp * cy, sp * srcy - crsy, sp * crcy + srsy, origin[0]],
        [cp * sy, sp * srsy + crcy, sp * crsy - srcy, origin[1]],
        [-sp, sr * cp, cr * cp, origin[2]],
    ])
}

pub fn VectorRotate(in1: vec3_t, m: &matrix3x4_t) -> vec3_t {
    v3(in1.dot(m.row(0)), in1.dot(m.row(1)), in1.dot(m.row(2)))
}

/// Rotates by the transpose, which is the inverse for a pure rotation.
pub fn VectorIRotate(in1: vec3_t, m: &matrix3x4_t) -> vec3_t {
    v3(
        in1.dot(m.column(0)),
        in1.dot(m.column(1)),
        in1.dot(m.column(2)),
    )
}

pub fn VectorTransform(in1: vec3_t, m: &matrix3x4_t) -> vec3_t {
    VectorRotate(in1, m) + m.origin()
}

pub fn VectorITransform(in1: vec3_t, m: &matrix3x4_t) -> vec3_t {
    VectorIRotate(in1 - m.origin(), m)
}

/// Slab test of the segment `origin + t * delta, t in [0,1]` against a box
/// grown by `tolerance` on every side.
pub fn IsBoxIntersectingRay(
    box_min: vec3_t,
    box_max: vec3_t,
    origin: vec3_t,
    delta: vec3_t,
    inv_delta: vec3_t,
    tolerance: f32,
) -> bool {
    let mut tmin = -f32::MAX;
    let mut tmax = f32::MAX;

    for i in 0..3 {
        // parallel case
        if delta[i].abs() < 1e-8 {
            if origin[i] < box_min[i] - tolerance || origin[i] > box_max[i] + tolerance {
                return false;
            }
            continue;
        }

        let mut t1 = (box_min[i] - tolerance - origin[i]) * inv_delta[i];
        let mut t2 = (box_max[i] + tolerance - origin[i]) * inv_delta[i];
        if t1 > t2 {
            core::mem::swap(&mut t1, &mut t2);
        }
        if t1 > tmin {
            tmin = t1;
        }
        if t2 < tmax {
            tmax = t2;
        }
        if tmin > tmax || tmax < 0.0 || tmin > 1.0 {
            return false;
        }
    }
    true
}
