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

use crate::prelude::*;
use crate::qcommon::cm_disp::DispCollTree;
use crate::qcommon::cm_tracework::{TraceGuard, TraceWorkPool};
use crate::qfiles::*;
use crate::range_len;
use parking_lot::RwLock;
use std::borrow::Cow;
use std::ops::Range;

pub const MAX_CHECK_COUNT_DEPTH: usize = 2;

// 1/32 epsilon to keep floating point happy
pub const DIST_EPSILON: f32 = 0.03125;

/// Unsigned the way it was stored in the map, but decoded into a tag.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum NodeRef {
    Internal(usize),
    Leaf(usize),
}

impl NodeRef {
    pub fn from_raw(n: i32) -> NodeRef {
        if n < 0 {
            NodeRef::Leaf((-1 - n) as usize)
        } else {
            NodeRef::Internal(n as usize)
        }
    }

    pub fn to_raw(self) -> i32 {
        match self {
            NodeRef::Internal(n) => n as i32,
            NodeRef::Leaf(l) => -1 - l as i32,
        }
    }
}

impl Default for NodeRef {
    fn default() -> NodeRef {
        NodeRef::Leaf(0)
    }
}

#[derive(Clone, Debug)]
pub struct cnode_t {
    /// index into CollisionBspData::planes
    pub plane_index: usize,
    pub children: [NodeRef; 2],
}

impl cnode_t {
    pub fn plane<'a>(&self, bsp: &'a CollisionBspData) -> &'a cplane_t {
        &bsp.planes[self.plane_index]
    }
}

#[derive(Clone, Debug, Default)]
pub struct cleaf_t {
    pub contents: ContentsFlag,
    pub cluster: i32,
    pub area: i32,
    pub flags: LeafFlag,

    pub firstleafbrush: usize,
    pub numleafbrushes: usize,

    pub dispListStart: usize,
    pub dispCount: usize,
}

impl cleaf_t {
    pub fn leaf_brushes_range(&self) -> Range<usize> {
        range_len(self.firstleafbrush, self.numleafbrushes)
    }

    pub fn leaf_brushes_index<'a>(&self, bsp: &'a CollisionBspData) -> &'a [usize] {
        &bsp.leafbrushes[self.leaf_brushes_range()]
    }

    pub fn leaf_brushes<'a>(
        &self,
        bsp: &'a CollisionBspData,
    ) -> impl Iterator<Item = &'a cbrush_t> {
        self.leaf_brushes_index(bsp)
            .iter()
            .map(move |&i| &bsp.brushes[i])
    }

    pub fn disp_list_range(&self) -> Range<usize> {
        range_len(self.dispListStart, self.dispCount)
    }

    pub fn leaf_disps<'a>(&self, bsp: &'a CollisionBspData) -> &'a [usize] {
        &bsp.disp_list[self.disp_list_range()]
    }
}

#[derive(Clone, Debug, Default)]
pub struct cmodel_t {
    pub mins: vec3_t,
    pub maxs: vec3_t,
    pub origin: vec3_t, // for sounds or lights
    pub headnode: NodeRef,
}

#[derive(Clone, Debug, Default)]
pub struct cbrushside_t {
    /// index into CollisionBspData::planes
    pub plane_index: usize,
    pub surfaceIndex: u16,
    pub bBevel: bool,
}

impl cbrushside_t {
    pub fn plane<'a>(&self, bsp: &'a CollisionBspData) -> &'a cplane_t {
        &bsp.planes[self.plane_index]
    }
}

#[derive(Clone, Debug, Default)]
pub struct cbrush_t {
    pub contents: ContentsFlag,
    pub numsides: usize,

    /// index into CollisionBspData::brushsides
    pub firstbrushside: usize,
}

impl cbrush_t {
    pub fn sides<'a>(&self, bsp: &'a CollisionBspData) -> &'a [cbrushside_t] {
        &bsp.brushsides[range_len(self.firstbrushside, self.numsides)]
    }
}

#[derive(Clone, Debug)]
pub struct csurface_t {
    pub name: Cow<'static, str>,
    pub flags: SurfaceFlag,
    pub surfaceProps: u16,
}

/// Stands in for every side that has no surface.
pub static nullsurface: csurface_t = csurface_t {
    name: Cow::Borrowed("**empty**"),
    flags: 0,
    surfaceProps: 0,
};

#[derive(Clone, Debug, Default)]
pub struct carea_t {
    pub numareaportals: usize,
    pub firstareaportal: usize,
}

impl carea_t {
    pub fn portals<'a>(&self, bsp: &'a CollisionBspData) -> &'a [dareaportal_t] {
        &bsp.areaportals[range_len(self.firstareaportal, self.numareaportals)]
    }
}

/// The part of the world that changes while a level runs.
#[derive(Clone, Debug, Default)]
pub struct AreaPortalState {
    /// indexed by portal key; key 0 is never used
    pub portalopen: Vec<bool>,
    pub floodnum: Vec<i32>,
    pub floodvalid: Vec<i32>,
    pub floodvalid_count: i32,
}

/// One loaded level. Built by `CollisionBspData::from_lumps` and shared
/// read-only by every thread that traces against it.
pub struct CollisionBspData {
    pub name: String,

    pub planes: Vec<cplane_t>,
    pub nodes: Vec<cnode_t>,
    pub leafs: Vec<cleaf_t>,
    pub leafbrushes: Vec<usize>,
    pub brushes: Vec<cbrush_t>,
    pub brushsides: Vec<cbrushside_t>,
    pub cmodels: Vec<cmodel_t>,
    pub map_surfaces: Vec<csurface_t>,

    pub numclusters: usize,
    pub vis: Option<dvis_t>,

    pub entity_string: Option<String>,

    pub areas: Vec<carea_t>,
    pub areaportals: Vec<dareaportal_t>,
    pub area_state: RwLock<AreaPortalState>,

    // ORed contents of every leaf, for fast rejects
    pub allcontents: ContentsFlag,

    pub disp_trees: Vec<DispCollTree>,
    /// leaf -> displacement runs, see cleaf_t::dispListStart
    pub disp_list: Vec<usize>,
    pub phys_disp: Vec<u8>,
    pub phys_disp_ranges: Vec<Option<Range<usize>>>,

    pub map_noareas: cvar_t,
    pub cm_nodisp: cvar_t,

    pub trace_pool: TraceWorkPool,
}

impl CollisionBspData {
    pub fn world_headnode(&self) -> NodeRef {
        self.cmodels
            .first()
            .map(|m| m.headnode)
            .unwrap_or_default()
    }

    pub fn GetSurfaceAtIndex(&self, surfaceIndex: u16) -> &csurface_t {
        if surfaceIndex == SURFACE_INDEX_INVALID {
            return &nullsurface;
        }
        &self.map_surfaces[surfaceIndex as usize]
    }

    /// Checks out per-trace scratch state. It goes back to the pool when the
    /// guard drops.
    pub fn begin_trace(&self) -> TraceGuard<'_> {
        self.trace_pool
            .begin_trace(self.brushes.len(), self.disp_trees.len())
    }

    /// Embedded physics hull for a displacement, if the map carried one.
    pub fn disp_hull_bytes(&self, disp_index: usize) -> Option<&[u8]> {
        let range = self.phys_disp_ranges.get(disp_index)?.clone()?;
        Some(&self.phys_disp[range])
    }
}

impl core::fmt::Debug for CollisionBspData {
    fn fmt(&self, fmt: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        fmt.debug_struct("CollisionBspData")
            .field("name", &self.name)
            .field("planes", &self.planes.len())
            .field("nodes", &self.nodes.len())
            .field("leafs", &self.leafs.len())
            .field("brushes", &self.brushes.len())
            .field("cmodels", &self.cmodels.len())
            .field("disp_trees", &self.disp_trees.len())
            .field("areas", &self.areas.len())
            .finish()
    }
}

pub struct leafList_t {
    pub center: vec3_t,
    pub extents: vec3_t,
    pub topnode: Option<usize>,
    pub prev_topnode: Option<usize>,
}

impl leafList_t {
    pub fn new(center: vec3_t, extents: vec3_t) -> leafList_t {
        leafList_t {
            center,
            extents,
            topnode: None,
            prev_topnode: None,
        }
    }

    pub fn from_bounds(mins: vec3_t, maxs: vec3_t) -> leafList_t {
        let b = vec3_bounds::new(mins, maxs);
        leafList_t::new(b.center(), b.extents())
    }
}
