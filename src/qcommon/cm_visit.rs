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
// cm_visit.rs -- "already tested during this trace" marks

use crate::qcommon::cm_local::MAX_CHECK_COUNT_DEPTH;

pub type Generation = u32;

/// Last generation at which each id was visited. Zero means never.
#[derive(Clone, Debug, Default)]
pub struct PerIdLastSeen {
    last_seen: Vec<Generation>,
}

impl PerIdLastSeen {
    pub fn with_len(len: usize) -> PerIdLastSeen {
        PerIdLastSeen {
            last_seen: vec![0; len],
        }
    }

    pub fn len(&self) -> usize {
        self.last_seen.len()
    }

    pub fn is_empty(&self) -> bool {
        self.last_seen.is_empty()
    }

    pub fn resize(&mut self, len: usize) {
        self.last_seen.clear();
        self.last_seen.resize(len, 0);
    }

    pub fn clear(&mut self) {
        for g in self.last_seen.iter_mut() {
            *g = 0;
        }
    }

    /// Marks `id` and returns true if it had not been marked at `gen`.
    pub fn visit(&mut self, id: usize, gen: Generation) -> bool {
        let slot = &mut self.last_seen[id];
        if *slot == gen {
            false
        } else {
            *slot = gen;
            true
        }
    }

    pub fn was_visited(&self, id: usize, gen: Generation) -> bool {
        self.last_seen[id] == gen
    }
}

#[derive(Clone, Debug, Default)]
struct VisitDepth {
    generation: Generation,
    brushes: PerIdLastSeen,
    disps: PerIdLastSeen,
}

impl VisitDepth {
    fn advance(&mut self) {
        self.generation = self.generation.wrapping_add(1);
        if self.generation == 0 {
            // every stored value could now collide with a future generation
            log::trace!("VisitDepth: generation wrapped, clearing");
            self.brushes.clear();
            self.disps.clear();
            self.generation = 1;
        }
    }
}

/// Per-trace dedup of brush and displacement tests, with one table pair for
/// each nesting level.
#[derive(Clone, Debug, Default)]
pub struct VisitCache {
    depths: [VisitDepth; MAX_CHECK_COUNT_DEPTH],
    /// number of pushed levels; the active one is `depths[depth - 1]`
    depth: usize,
    num_brushes: usize,
    num_disps: usize,
}

impl VisitCache {
    pub fn new(num_brushes: usize, num_disps: usize) -> VisitCache {
        let mut cache = VisitCache::default();
        cache.resize(num_brushes, num_disps);
        cache
    }

    /// Sizes the tables for a world. Brush tables get one spare slot.
    pub fn resize(&mut self, num_brushes: usize, num_disps: usize) {
        assert_eq!(self.depth, 0, "VisitCache::resize during a trace");
        for d in self.depths.iter_mut() {
            d.generation = 0;
            d.brushes.resize(num_brushes + 1);
            d.disps.resize(num_disps);
        }
        self.num_brushes = num_brushes;
        self.num_disps = num_disps;
    }

    pub fn num_brushes(&self) -> usize {
        self.num_brushes
    }

    pub fn num_disps(&self) -> usize {
        self.num_disps
    }

    pub fn depth(&self) -> usize {
        self.depth
    }

    pub fn push(&mut self) {
        assert!(
            self.depth < MAX_CHECK_COUNT_DEPTH,
            "VisitCache::push: nested deeper than {}",
            MAX_CHECK_COUNT_DEPTH
        );
        self.depth += 1;
        self.current_mut().advance();
    }

    pub fn pop(&mut self) {
        assert!(self.depth > 0, "VisitCache::pop: unbalanced");
        self.depth -= 1;
    }

    pub fn generation(&self) -> Generation {
        self.current().generation
    }

    fn current(&self) -> &VisitDepth {
        assert!(self.depth > 0, "VisitCache: no trace in progress");
        &self.depths[self.depth - 1]
    }

    fn current_mut(&mut self) -> &mut VisitDepth {
        assert!(self.depth > 0, "VisitCache: no trace in progress");
        &mut self.depths[self.depth - 1]
    }

    pub fn visit_brush(&mut self, brush: usize) -> bool {
        let d = self.current_mut();
        d.brushes.visit(brush, d.generation)
    }

    pub fn visit_disp(&mut self, disp: usize) -> bool {
        let d = self.current_mut();
        d.disps.visit(disp, d.generation)
    }

    pub fn brush_visited(&self, brush: usize) -> bool {
        let d = self.current();
        d.brushes.was_visited(brush, d.generation)
    }

    pub fn disp_visited(&self, disp: usize) -> bool {
        let d = self.current();
        d.disps.was_visited(disp, d.generation)
    }

    #[cfg(test)]
    fn set_generation(&mut self, generation: Generation) {
        self.current_mut().generation = generation;
    }
}
