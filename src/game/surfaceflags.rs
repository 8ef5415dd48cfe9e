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

// contents flags are seperate bits
// a given brush can contribute multiple content bits

pub type ContentsFlag = u32;

pub const CONTENTS_EMPTY               :ContentsFlag = 0;
pub const CONTENTS_SOLID               :ContentsFlag = 0x1;        // an eye is never valid in a solid
pub const CONTENTS_WINDOW              :ContentsFlag = 0x2;        // translucent, but not watery (glass)
pub const CONTENTS_AUX                 :ContentsFlag = 0x4;
pub const CONTENTS_GRATE               :ContentsFlag = 0x8;        // alpha-tested "grate" textures
pub const CONTENTS_SLIME               :ContentsFlag = 0x10;
pub const CONTENTS_WATER               :ContentsFlag = 0x20;
pub const CONTENTS_BLOCKLOS            :ContentsFlag = 0x40;       // block AI line of sight
pub const CONTENTS_OPAQUE              :ContentsFlag = 0x80;       // things that cannot be seen through
pub const CONTENTS_TESTFOGVOLUME       :ContentsFlag = 0x100;
pub const CONTENTS_BLOCKLIGHT          :ContentsFlag = 0x400;
pub const CONTENTS_TEAM1               :ContentsFlag = 0x800;
pub const CONTENTS_TEAM2               :ContentsFlag = 0x1000;
pub const CONTENTS_IGNORE_NODRAW_OPAQUE:ContentsFlag = 0x2000;     // ignore CONTENTS_OPAQUE on surfaces that have SURF_NODRAW
pub const CONTENTS_MOVEABLE            :ContentsFlag = 0x4000;
pub const CONTENTS_AREAPORTAL          :ContentsFlag = 0x8000;

pub const CONTENTS_PLAYERCLIP          :ContentsFlag = 0x10000;
pub const CONTENTS_MONSTERCLIP         :ContentsFlag = 0x20000;

pub const CONTENTS_ORIGIN              :ContentsFlag = 0x1000000;  // removed before bsping an entity
pub const CONTENTS_MONSTER             :ContentsFlag = 0x2000000;  // should never be on a brush, only in game
pub const CONTENTS_DEBRIS              :ContentsFlag = 0x4000000;
pub const CONTENTS_DETAIL              :ContentsFlag = 0x8000000;  // brushes to be added after vis leafs
pub const CONTENTS_TRANSLUCENT         :ContentsFlag = 0x10000000; // auto set if any surface has trans
pub const CONTENTS_LADDER              :ContentsFlag = 0x20000000;
pub const CONTENTS_HITBOX              :ContentsFlag = 0x40000000; // use accurate hitboxes on trace

pub const MASK_ALL                     :ContentsFlag = 0xFFFFFFFF;
pub const MASK_SOLID                   :ContentsFlag = CONTENTS_SOLID | CONTENTS_MOVEABLE | CONTENTS_WINDOW | CONTENTS_MONSTER | CONTENTS_GRATE;
pub const MASK_PLAYERSOLID             :ContentsFlag = MASK_SOLID | CONTENTS_PLAYERCLIP;
pub const MASK_NPCSOLID                :ContentsFlag = MASK_SOLID | CONTENTS_MONSTERCLIP;
pub const MASK_WATER                   :ContentsFlag = CONTENTS_WATER | CONTENTS_MOVEABLE | CONTENTS_SLIME;
pub const MASK_OPAQUE                  :ContentsFlag = CONTENTS_SOLID | CONTENTS_MOVEABLE | CONTENTS_OPAQUE;
pub const MASK_VISIBLE                 :ContentsFlag = MASK_OPAQUE | CONTENTS_IGNORE_NODRAW_OPAQUE;
pub const MASK_SHOT                    :ContentsFlag = CONTENTS_SOLID | CONTENTS_MOVEABLE | CONTENTS_MONSTER | CONTENTS_WINDOW | CONTENTS_DEBRIS | CONTENTS_HITBOX;

pub type SurfaceFlag = u16;
pub const SURF_LIGHT                   :SurfaceFlag = 0x1;     // value will hold the light strength
pub const SURF_SKY2D                   :SurfaceFlag = 0x2;     // don't draw, indicates we should skylight + draw 2d sky but not draw the 3D skybox
pub const SURF_SKY                     :SurfaceFlag = 0x4;     // don't draw, but add to skybox
pub const SURF_WARP                    :SurfaceFlag = 0x8;     // turbulent water warp
pub const SURF_TRANS                   :SurfaceFlag = 0x10;
pub const SURF_NOPORTAL                :SurfaceFlag = 0x20;    // the surface can not have a portal placed on it
pub const SURF_TRIGGER                 :SurfaceFlag = 0x40;
pub const SURF_NODRAW                  :SurfaceFlag = 0x80;    // don't bother referencing the texture
pub const SURF_HINT                    :SurfaceFlag = 0x100;   // make a primary bsp splitter
pub const SURF_SKIP                    :SurfaceFlag = 0x200;   // completely ignore, allowing non-closed brushes
pub const SURF_NOLIGHT                 :SurfaceFlag = 0x400;   // Don't calculate light
pub const SURF_BUMPLIGHT               :SurfaceFlag = 0x800;
pub const SURF_NOSHADOWS               :SurfaceFlag = 0x1000;
pub const SURF_NODECALS                :SurfaceFlag = 0x2000;
pub const SURF_NOCHOP                  :SurfaceFlag = 0x4000;
pub const SURF_HITBOX                  :SurfaceFlag = 0x8000;

// trace_t::disp_flags, filled in when a trace ends on a displacement
pub type DispSurfFlag = u16;
pub const DISPSURF_FLAG_SURFACE        :DispSurfFlag = 1 << 0;
pub const DISPSURF_FLAG_WALKABLE       :DispSurfFlag = 1 << 1;
pub const DISPSURF_FLAG_BUILDABLE      :DispSurfFlag = 1 << 2;
pub const DISPSURF_FLAG_SURFPROP1      :DispSurfFlag = 1 << 3;
pub const DISPSURF_FLAG_SURFPROP2      :DispSurfFlag = 1 << 4;

// ddispinfo_t::flags
pub type DispInfoFlag = u32;
pub const DISP_INFO_FLAG_NO_PHYSICS_COLLISION :DispInfoFlag = 1 << 1;
pub const DISP_INFO_FLAG_NO_HULL_COLLISION    :DispInfoFlag = 1 << 2;
pub const DISP_INFO_FLAG_NO_RAY_COLLISION     :DispInfoFlag = 1 << 3;

// cleaf_t::flags
pub type LeafFlag = u16;
pub const LEAF_FLAGS_SKY                    :LeafFlag = 0x01;
pub const LEAF_FLAGS_RADIAL                 :LeafFlag = 0x02;
pub const LEAF_FLAGS_SKY2D                  :LeafFlag = 0x04;
pub const LEAF_FLAGS_CONTAINS_DETAILOBJECTS :LeafFlag = 0x08;
