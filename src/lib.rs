#![allow(non_snake_case)]
#![allow(non_camel_case_types)]
#![allow(non_upper_case_globals)]

pub mod bounds;
pub mod cvar;
pub mod game;
pub mod perf;
pub mod q_math;
pub mod q_shared;
pub mod qcommon;
pub mod qfiles;
pub mod vec3;

pub mod prelude {
    pub use crate::bounds::*;
    pub use crate::cvar::*;
    pub use crate::game::surfaceflags::*;
    pub use crate::num_utils::*;
    pub use crate::q_math::*;
    pub use crate::q_shared::*;
    pub use crate::side::*;
    pub use crate::vec3::*;
}

pub use crate::qcommon::cm_load::{BspLumps, Error};
pub use crate::qcommon::cm_local::CollisionBspData;
pub use crate::qcommon::cm_test::CM_PointContents;
pub use crate::qcommon::cm_trace::CM_TraceBox;

pub fn is_close_to(a: f32, b: f32, epsilon: f32) -> bool {
    let d = a - b;
    d.abs() <= epsilon
}

mod side {
    #[derive(Copy, Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Default, Hash)]
    pub struct Side(pub u8);
    impl Side {
        pub const FRONT: Side = Side(0);
        pub const BACK: Side = Side(1);
        pub fn index(self) -> usize {
            self.0 as usize
        }
        pub fn other(self) -> Side {
            Side(self.0 ^ 1)
        }
    }
}

pub mod num_utils {
    pub fn fmin(a: f32, b: f32) -> f32 {
        if b < a {
            b
        } else {
            a
        }
    }
    pub fn fmax(a: f32, b: f32) -> f32 {
        if b > a {
            b
        } else {
            a
        }
    }
}

fn range_len(start: usize, count: usize) -> std::ops::Range<usize> {
    start..start + count
}

pub mod encoding {
    pub fn get_le_u16(bytes: &[u8]) -> u16 {
        (bytes[0] as u16) | (bytes[1] as u16) << 8
    }

    pub fn get_le_u32(bytes: &[u8]) -> u32 {
        (bytes[0] as u32)
            | (bytes[1] as u32) << 8
            | (bytes[2] as u32) << 16
            | (bytes[3] as u32) << 24
    }

    pub fn get_le_i32(bytes: &[u8]) -> i32 {
        get_le_u32(bytes) as i32
    }
}
