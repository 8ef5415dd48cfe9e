use std::sync::atomic::{AtomicI32, Ordering};

/// A named integer console variable. Reads and writes are relaxed atomics, so a
/// cvar can live in shared, otherwise immutable state.
pub struct cvar_t {
    pub name: &'static str,
    value: AtomicI32,
}

impl cvar_t {
    pub const fn new(name: &'static str, value: i32) -> Self {
        Self {
            name,
            value: AtomicI32::new(value),
        }
    }

    pub fn as_i32(&self) -> i32 {
        self.value.load(Ordering::Relaxed)
    }

    pub fn as_bool(&self) -> bool {
        self.as_i32() != 0
    }

    pub fn set(&self, value: i32) {
        log::debug!("{} = {}", self.name, value);
        self.value.store(value, Ordering::Relaxed);
    }
}

impl core::fmt::Debug for cvar_t {
    fn fmt(&self, fmt: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(fmt, "{} = {}", self.name, self.as_i32())
    }
}
