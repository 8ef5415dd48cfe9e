use crate::vec3::*;

#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct vec3_bounds {
    pub mins: vec3_t,
    pub maxs: vec3_t,
}

/// Inverted bounds that any added point will replace.
pub fn ClearBounds() -> vec3_bounds {
    vec3_bounds {
        mins: vec3_t::from_scalar(f32::MAX),
        maxs: vec3_t::from_scalar(-f32::MAX),
    }
}

pub fn AddPointToBounds(v: vec3_t, bounds: &mut vec3_bounds) {
    for i in 0..3 {
        let val = v[i];
        if val < bounds.mins[i] {
            bounds.mins[i] = val;
        }
        if val > bounds.maxs[i] {
            bounds.maxs[i] = val;
        }
    }
}

impl vec3_bounds {
    pub fn new(mins: vec3_t, maxs: vec3_t) -> vec3_bounds {
        vec3_bounds { mins, maxs }
    }

    pub fn from_points(points: impl IntoIterator<Item = vec3_t>) -> vec3_bounds {
        let mut b = ClearBounds();
        for p in points {
            AddPointToBounds(p, &mut b);
        }
        b
    }

    pub fn is_cleared(&self) -> bool {
        (0..3).any(|i| self.mins[i] > self.maxs[i])
    }

    pub fn union(&self, other: &vec3_bounds) -> vec3_bounds {
        vec3_bounds {
            mins: self.mins.min(other.mins),
            maxs: self.maxs.max(other.maxs),
        }
    }

    /// Grows the box by `amount` on every side.
    pub fn expanded(&self, amount: vec3_t) -> vec3_bounds {
        vec3_bounds {
            mins: self.mins - amount,
            maxs: self.maxs + amount,
        }
    }

    pub fn center(&self) -> vec3_t {
        self.mins.mid(self.maxs)
    }

    pub fn extents(&self) -> vec3_t {
        self.maxs - self.center()
    }

    pub fn contains_point(&self, p: vec3_t) -> bool {
        (0..3).all(|i| p[i] >= self.mins[i] && p[i] <= self.maxs[i])
    }

    pub fn intersects(&self, other: &vec3_bounds) -> bool {
        (0..3).all(|i| self.mins[i] <= other.maxs[i] && self.maxs[i] >= other.mins[i])
    }

    pub fn intersects_sphere(&self, center: vec3_t, radius: f32) -> bool {
        let mut dist2 = 0.0;
        for i in 0..3 {
            if center[i] < self.mins[i] {
                let d = self.mins[i] - center[i];
                dist2 += d * d;
            } else if center[i] > self.maxs[i] {
                let d = center[i] - self.maxs[i];
                dist2 += d * d;
            }
        }
        dist2 <= radius * radius
    }
}
