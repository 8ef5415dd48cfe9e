use crate::num_utils::{fmax, fmin};

pub type vec_t = f32;

#[derive(Copy, Clone, Debug, Default, PartialEq)]
#[repr(C)]
pub struct vec3_t(pub [f32; 3]);

pub const vec3_origin: vec3_t = vec3_t([0.0, 0.0, 0.0]);

pub fn v3(x: f32, y: f32, z: f32) -> vec3_t {
    vec3_t([x, y, z])
}

impl vec3_t {
    pub const ORIGIN: vec3_t = vec3_t([0.0, 0.0, 0.0]);

    pub fn from_scalar(f: f32) -> vec3_t {
        vec3_t([f, f, f])
    }

    pub fn dot(self, other: vec3_t) -> f32 {
        self.0[0] * other.0[0] + self.0[1] * other.0[1] + self.0[2] * other.0[2]
    }

    /// Sum of the absolute per-axis products. This is the distance a box with
    /// half-size `extents` reaches along `self` when `self` is a plane normal.
    pub fn dot_abs(self, extents: vec3_t) -> f32 {
        (self.0[0] * extents.0[0]).abs()
            + (self.0[1] * extents.0[1]).abs()
            + (self.0[2] * extents.0[2]).abs()
    }

    pub fn cross(self, v2: vec3_t) -> vec3_t {
        vec3_t([
            self[1] * v2[2] - self[2] * v2[1],
            self[2] * v2[0] - self[0] * v2[2],
            self[0] * v2[1] - self[1] * v2[0],
        ])
    }

    pub fn scale(self, s: vec_t) -> vec3_t {
        vec3_t([self.0[0] * s, self.0[1] * s, self.0[2] * s])
    }

    pub fn length(self) -> vec_t {
        self.dot(self).sqrt()
    }

    pub fn length2(self) -> vec_t {
        self.dot(self)
    }

    pub fn is_zero(self) -> bool {
        self.0[0] == 0.0 && self.0[1] == 0.0 && self.0[2] == 0.0
    }

    pub fn unit(axis: usize) -> vec3_t {
        match axis {
            0 => v3(1.0, 0.0, 0.0),
            1 => v3(0.0, 1.0, 0.0),
            2 => v3(0.0, 0.0, 1.0),
            _ => panic!("invalid axis {}", axis),
        }
    }

    pub fn map_to_array<T>(self, f: impl Fn(f32) -> T) -> [T; 3] {
        [f(self.0[0]), f(self.0[1]), f(self.0[2])]
    }

    pub fn map(self, f: impl Fn(f32) -> f32) -> vec3_t {
        vec3_t(self.map_to_array(f))
    }

    pub fn map2(self, other: vec3_t, f: impl Fn(f32, f32) -> f32) -> vec3_t {
        vec3_t([
            f(self.0[0], other.0[0]),
            f(self.0[1], other.0[1]),
            f(self.0[2], other.0[2]),
        ])
    }

    pub fn abs(self) -> vec3_t {
        self.map(f32::abs)
    }

    pub fn mid(self: vec3_t, b: vec3_t) -> vec3_t {
        (self + b) * 0.5
    }

    pub fn lerp(self, b: vec3_t, t: vec_t) -> vec3_t {
        self + (b - self) * t
    }

    pub fn is_close_to(self, other: vec3_t, epsilon: vec_t) -> bool {
        let d = self - other;
        d[0].abs() < epsilon && d[1].abs() < epsilon && d[2].abs() < epsilon
    }

    pub fn min(self, other: vec3_t) -> vec3_t {
        self.map2(other, fmin)
    }
    pub fn max(self, other: vec3_t) -> vec3_t {
        self.map2(other, fmax)
    }

    pub fn normalize(&self) -> Option<vec3_t> {
        let length = self.length();
        if length != 0.0 {
            Some(self.scale(1.0 / length))
        } else {
            None
        }
    }

    /// Bit i is set when component i is negative.
    pub fn sign_bits(self) -> u8 {
        ((self[0] < 0.0) as u8) | (((self[1] < 0.0) as u8) << 1) | (((self[2] < 0.0) as u8) << 2)
    }
}

impl std::ops::Neg for vec3_t {
    type Output = vec3_t;
    fn neg(self) -> Self::Output {
        vec3_t([-self.0[0], -self.0[1], -self.0[2]])
    }
}

impl core::ops::Index<usize> for vec3_t {
    type Output = vec_t;
    fn index(&self, index: usize) -> &vec_t {
        &self.0[index]
    }
}

impl core::ops::IndexMut<usize> for vec3_t {
    fn index_mut(&mut self, index: usize) -> &mut vec_t {
        &mut self.0[index]
    }
}

impl core::ops::Add<vec3_t> for vec3_t {
    type Output = vec3_t;
    fn add(self, other: vec3_t) -> vec3_t {
        vec3_t([self[0] + other[0], self[1] + other[1], self[2] + other[2]])
    }
}

impl core::ops::AddAssign<vec3_t> for vec3_t {
    fn add_assign(&mut self, other: vec3_t) {
        self.0[0] += other.0[0];
        self.0[1] += other.0[1];
        self.0[2] += other.0[2];
    }
}

impl core::ops::Sub<vec3_t> for vec3_t {
    type Output = vec3_t;
    fn sub(self, other: vec3_t) -> vec3_t {
        vec3_t([self[0] - other[0], self[1] - other[1], self[2] - other[2]])
    }
}

impl core::ops::SubAssign<vec3_t> for vec3_t {
    fn sub_assign(&mut self, other: vec3_t) {
        self.0[0] -= other.0[0];
        self.0[1] -= other.0[1];
        self.0[2] -= other.0[2];
    }
}

impl core::ops::Mul<vec_t> for vec3_t {
    type Output = vec3_t;
    fn mul(self, other: vec_t) -> vec3_t {
        vec3_t([self[0] * other, self[1] * other, self[2] * other])
    }
}

impl core::ops::Mul<vec3_t> for vec_t {
    type Output = vec3_t;
    fn mul(self, other: vec3_t) -> vec3_t {
        vec3_t([self * other[0], self * other[1], self * other[2]])
    }
}

impl core::ops::MulAssign<vec_t> for vec3_t {
    fn mul_assign(&mut self, other: vec_t) {
        self[0] *= other;
        self[1] *= other;
        self[2] *= other;
    }
}

impl core::convert::From<[vec_t; 3]> for vec3_t {
    fn from(v: [vec_t; 3]) -> vec3_t {
        vec3_t(v)
    }
}

impl core::convert::From<vec3_t> for [vec_t; 3] {
    fn from(v: vec3_t) -> [vec_t; 3] {
        v.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dot_abs_is_box_reach() {
        let n = v3(0.0, -1.0, 0.0);
        assert_eq!(n.dot_abs(v3(4.0, 8.0, 16.0)), 8.0);
        let d = v3(1.0, -1.0, 0.0);
        assert_eq!(d.dot_abs(v3(2.0, 3.0, 5.0)), 5.0);
    }

    #[test]
    fn cross_of_axes() {
        assert_eq!(vec3_t::unit(0).cross(vec3_t::unit(1)), vec3_t::unit(2));
        assert_eq!(v3(-1.0, 2.0, -0.5).sign_bits(), 0b101);
    }
}
