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
// cm_tracework.rs -- pooled per-trace scratch state

use crate::prelude::*;
use crate::qcommon::cm_local::NodeRef;
use crate::qcommon::cm_visit::VisitCache;
use parking_lot::Mutex;

/// Narrow-phase call counts for one trace.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub struct TraceStats {
    pub brush_tests: u32,
    pub disp_tests: u32,
}

pub struct traceWork_t {
    pub start: vec3_t,
    pub end: vec3_t,
    pub mins: vec3_t,    // relative to the box center
    pub maxs: vec3_t,
    pub extents: vec3_t, // half size of the box being swept
    pub delta: vec3_t,
    pub invDelta: vec3_t,
    pub contents: ContentsFlag, // the trace mask
    pub ispoint: bool,          // optimized case
    pub isswept: bool,
    pub headnode: NodeRef,

    pub test_brushes: bool,   // off while stabbing displacements
    pub cull_backfaces: bool, // off while stabbing displacements

    pub trace: trace_t, // returned from trace call

    pub dispHit: bool,
    pub dispBackface: bool,
    pub dispHitQuadrant: u8,
    pub dispStabDir: vec3_t,

    pub visits: VisitCache,
    pub stats: TraceStats,
}

/// The inputs of a trace, saved around a nested stab.
#[derive(Copy, Clone, Debug)]
pub struct TraceWorkSnapshot {
    start: vec3_t,
    end: vec3_t,
    mins: vec3_t,
    maxs: vec3_t,
    extents: vec3_t,
    delta: vec3_t,
    invDelta: vec3_t,
    contents: ContentsFlag,
    ispoint: bool,
    isswept: bool,
    test_brushes: bool,
    cull_backfaces: bool,
    trace: trace_t,
    dispHit: bool,
    dispBackface: bool,
    dispHitQuadrant: u8,
    dispStabDir: vec3_t,
}

impl traceWork_t {
    pub fn new(num_brushes: usize, num_disps: usize) -> traceWork_t {
        traceWork_t {
            start: vec3_origin,
            end: vec3_origin,
            mins: vec3_origin,
            maxs: vec3_origin,
            extents: vec3_origin,
            delta: vec3_origin,
            invDelta: vec3_origin,
            contents: 0,
            ispoint: true,
            isswept: false,
            headnode: NodeRef::default(),
            test_brushes: true,
            cull_backfaces: true,
            trace: trace_t::default(),
            dispHit: false,
            dispBackface: false,
            dispHitQuadrant: 0,
            dispStabDir: vec3_origin,
            visits: VisitCache::new(num_brushes, num_disps),
            stats: TraceStats::default(),
        }
    }

    /// Loads the geometry of `ray` and resets every per-trace flag.
    pub fn setup(&mut self, ray: &Ray_t, headnode: NodeRef, brushmask: ContentsFlag) {
        self.dispHit = false;
        self.dispBackface = false;
        self.dispHitQuadrant = 0;
        self.dispStabDir = vec3_origin;
        self.contents = brushmask;
        self.start = ray.start;
        self.end = ray.start + ray.delta;
        self.mins = -ray.extents;
        self.maxs = ray.extents;
        self.extents = ray.extents;
        self.delta = ray.delta;
        self.invDelta = ray.inv_delta();
        self.ispoint = ray.is_ray;
        self.isswept = ray.is_swept;
        self.headnode = headnode;
        self.test_brushes = true;
        self.cull_backfaces = true;
    }

    pub fn snapshot(&self) -> TraceWorkSnapshot {
        TraceWorkSnapshot {
            start: self.start,
            end: self.end,
            mins: self.mins,
            maxs: self.maxs,
            extents: self.extents,
            delta: self.delta,
            invDelta: self.invDelta,
            contents: self.contents,
            ispoint: self.ispoint,
            isswept: self.isswept,
            test_brushes: self.test_brushes,
            cull_backfaces: self.cull_backfaces,
            trace: self.trace,
            dispHit: self.dispHit,
            dispBackface: self.dispBackface,
            dispHitQuadrant: self.dispHitQuadrant,
            dispStabDir: self.dispStabDir,
        }
    }

    pub fn restore(&mut self, s: &TraceWorkSnapshot) {
        self.start = s.start;
        self.end = s.end;
        self.mins = s.mins;
        self.maxs = s.maxs;
        self.extents = s.extents;
        self.delta = s.delta;
        self.invDelta = s.invDelta;
        self.contents = s.contents;
        self.ispoint = s.ispoint;
        self.isswept = s.isswept;
        self.test_brushes = s.test_brushes;
        self.cull_backfaces = s.cull_backfaces;
        self.trace = s.trace;
        self.dispHit = s.dispHit;
        self.dispBackface = s.dispBackface;
        self.dispHitQuadrant = s.dispHitQuadrant;
        self.dispStabDir = s.dispStabDir;
    }
}

/// Free list of trace contexts. Grows when several threads trace at once.
#[derive(Default)]
pub struct TraceWorkPool {
    free: Mutex<Vec<Box<traceWork_t>>>,
}

impl TraceWorkPool {
    pub fn new() -> TraceWorkPool {
        TraceWorkPool::default()
    }

    pub fn begin_trace(&self, num_brushes: usize, num_disps: usize) -> TraceGuard<'_> {
        let pooled = self.free.lock().pop();
        let mut tw = match pooled {
            Some(mut tw) => {
                if tw.visits.num_brushes() != num_brushes || tw.visits.num_disps() != num_disps {
                    tw.visits.resize(num_brushes, num_disps);
                }
                tw
            }
            None => Box::new(traceWork_t::new(num_brushes, num_disps)),
        };
        tw.visits.push();
        TraceGuard {
            pool: self,
            tw: Some(tw),
        }
    }

    pub fn free_count(&self) -> usize {
        self.free.lock().len()
    }
}

/// A checked-out trace context. Dropping it ends the trace.
pub struct TraceGuard<'a> {
    pool: &'a TraceWorkPool,
    tw: Option<Box<traceWork_t>>,
}

impl<'a> core::ops::Deref for TraceGuard<'a> {
    type Target = traceWork_t;
    fn deref(&self) -> &traceWork_t {
        self.tw.as_deref().unwrap_or_else(|| unreachable!())
    }
}

impl<'a> core::ops::DerefMut for TraceGuard<'a> {
    fn deref_mut(&mut self) -> &mut traceWork_t {
        self.tw.as_deref_mut().unwrap_or_else(|| unreachable!())
    }
}

impl<'a> Drop for TraceGuard<'a> {
    fn drop(&mut self) {
        if let Some(mut tw) = self.tw.take() {
            if std::thread::panicking() {
                // the visit stack is in an unknown state; let it go
                return;
            }
            tw.visits.pop();
            assert_eq!(tw.visits.depth(), 0, "EndTrace: unbalanced visit depth");
            self.pool.free.lock().push(tw);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pool_reuses_contexts() {
        let pool = TraceWorkPool::new();
        {
            let tw = pool.begin_trace(10, 2);
            assert_eq!(tw.visits.depth(), 1);
        }
        assert_eq!(pool.free_count(), 1);
        {
            let _a = pool.begin_trace(10, 2);
            assert_eq!(pool.free_count(), 0);
            // a second concurrent checkout grows the pool
            let _b = pool.begin_trace(10, 2);
        }
        assert_eq!(pool.free_count(), 2);
    }

    #[test]
    fn pool_resizes_on_count_change() {
        let pool = TraceWorkPool::new();
        drop(pool.begin_trace(3, 1));
        let mut tw = pool.begin_trace(7, 4);
        assert_eq!(tw.visits.num_brushes(), 7);
        assert_eq!(tw.visits.num_disps(), 4);
        assert!(tw.visits.visit_brush(7));
        assert!(tw.visits.visit_disp(3));
    }

    #[test]
    fn snapshot_restores_trace_inputs() {
        let mut tw = traceWork_t::new(0, 0);
        let ray = Ray_t::new(v3(0.0, 0.0, 0.0), v3(0.0, 0.0, 64.0));
        tw.setup(&ray, NodeRef::Internal(0), MASK_SOLID);
        tw.trace.fraction = 0.25;
        let saved = tw.snapshot();

        tw.setup(&Ray_t::new(v3(5.0, 5.0, 5.0), v3(5.0, 5.0, 5.0)), NodeRef::Leaf(0), 0);
        tw.trace = trace_t::default();
        tw.restore(&saved);

        assert_eq!(tw.start, v3(0.0, 0.0, 0.0));
        assert_eq!(tw.end, v3(0.0, 0.0, 64.0));
        assert_eq!(tw.contents, MASK_SOLID);
        assert!(tw.isswept);
        assert_eq!(tw.trace.fraction, 0.25);
    }
}
