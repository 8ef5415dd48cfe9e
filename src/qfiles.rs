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

// decoded BSP lumps consumed by the collision model

use crate::prelude::*;

pub const MAX_MAP_MODELS: usize = 1024;
pub const MAX_MAP_AREAS: usize = 256;
pub const MAX_MAP_AREAPORTALS: usize = 1024;
pub const MAX_MAP_DISPINFO: usize = 0x10000;

pub const DVIS_PVS: usize = 0;
pub const DVIS_PAS: usize = 1;

pub const MIN_MAP_DISP_POWER: u32 = 2;
pub const MAX_MAP_DISP_POWER: u32 = 4;

#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct dplane_t {
    pub normal: vec3_t,
    pub dist: f32,
}

/// Negative children are `-(leaf + 1)`.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct dnode_t {
    pub planenum: i32,
    pub children: [i32; 2],
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct dleaf_t {
    pub contents: ContentsFlag,
    pub cluster: i32,
    pub area: i32,
    pub flags: LeafFlag,
    pub firstleafbrush: u32,
    pub numleafbrushes: u32,
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct dbrush_t {
    pub firstside: u32,
    pub numsides: u32,
    pub contents: ContentsFlag,
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct dbrushside_t {
    pub planenum: u32,
    pub texinfo: i32, // -1 for no surface
    pub bevel: bool,
}

#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct dmodel_t {
    pub mins: vec3_t,
    pub maxs: vec3_t,
    pub origin: vec3_t,
    pub headnode: i32,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct dsurface_t {
    pub name: String,
    pub flags: SurfaceFlag,
    pub surface_props: u16,
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct darea_t {
    pub numareaportals: u32,
    pub firstareaportal: u32,
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct dareaportal_t {
    pub portal_key: u16, // entities have a key called portalnumber (and in vbsp a variable called areaportalnum) which is used to bind them to the area portals by comparing with this value
    pub otherarea: u16,  // the area this portal looks into
    pub planenum: u32,   // plane of the portal, facing away from the area that owns it
}

/// Terrain patch: a `(2^power + 1)` square grid of world-space vertices,
/// stored row by row.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ddispinfo_t {
    pub power: u32,
    pub verts: Vec<vec3_t>,
    pub contents: ContentsFlag,
    pub flags: DispInfoFlag,
    pub surface_index: u16,
    pub surface_props: [u16; 4],
}

impl ddispinfo_t {
    pub fn side_verts(&self) -> usize {
        (1usize << self.power) + 1
    }
}

/// Visibility lump header. `bitofs[cluster][DVIS_PVS | DVIS_PAS]` are byte
/// offsets of the compressed rows, measured from the start of the lump.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct dvis_t {
    pub numclusters: u32,
    pub bitofs: Vec<[u32; 2]>,
    pub data: Vec<u8>, // the whole lump, header included
}
