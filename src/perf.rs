use std::sync::atomic::{AtomicU64, Ordering};

pub struct StaticCounter {
    name: &'static str,
    value: AtomicU64,
}

impl StaticCounter {
    pub const fn new(name: &'static str) -> StaticCounter {
        StaticCounter {
            name,
            value: AtomicU64::new(0),
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn add_one(&self) {
        self.value.fetch_add(1, Ordering::Relaxed);
    }
    pub fn add_usize(&self, n: usize) {
        self.value.fetch_add(n as u64, Ordering::Relaxed);
    }
    pub fn get(&self) -> u64 {
        self.value.load(Ordering::Relaxed)
    }
    pub fn reset(&self) {
        self.value.store(0, Ordering::Relaxed);
    }
}

pub static c_traces: StaticCounter = StaticCounter::new("c_traces");
pub static c_brush_traces: StaticCounter = StaticCounter::new("c_brush_traces");
pub static c_disp_traces: StaticCounter = StaticCounter::new("c_disp_traces");
pub static c_pointcontents: StaticCounter = StaticCounter::new("c_pointcontents");

/// Snapshot of the process-wide collision counters.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub struct CollisionCounts {
    pub traces: u64,
    pub brush_traces: u64,
    pub disp_traces: u64,
    pub point_contents: u64,
}

impl CollisionCounts {
    pub fn snapshot() -> CollisionCounts {
        CollisionCounts {
            traces: c_traces.get(),
            brush_traces: c_brush_traces.get(),
            disp_traces: c_disp_traces.get(),
            point_contents: c_pointcontents.get(),
        }
    }

    pub fn reset() {
        for c in [&c_traces, &c_brush_traces, &c_disp_traces, &c_pointcontents] {
            c.reset();
        }
    }
}
