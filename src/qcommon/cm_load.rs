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
// cm_load.rs -- building the collision world from decoded lumps

use crate::encoding::{get_le_i32, get_le_u16, get_le_u32};
use crate::prelude::*;
use crate::qcommon::cm_disp::DispCollTree;
use crate::qcommon::cm_displeaf::CM_DispTreeLeafnum;
use crate::qcommon::cm_local::*;
use crate::qcommon::cm_test::CM_InitAreaPortalState;
use crate::qcommon::cm_tracework::TraceWorkPool;
use crate::qfiles::*;
use log::{debug, warn};
use parking_lot::RwLock;
use std::borrow::Cow;
use std::ops::Range;

/// Everything a level loader hands over. Indices are the raw values stored in
/// the map and are validated by `CollisionBspData::from_lumps`.
#[derive(Clone, Debug, Default)]
pub struct BspLumps {
    pub name: String,
    pub planes: Vec<dplane_t>,
    pub nodes: Vec<dnode_t>,
    pub leafs: Vec<dleaf_t>,
    pub leafbrushes: Vec<u32>,
    pub brushes: Vec<dbrush_t>,
    pub brushsides: Vec<dbrushside_t>,
    pub models: Vec<dmodel_t>,
    pub surfaces: Vec<dsurface_t>,
    pub areas: Vec<darea_t>,
    pub areaportals: Vec<dareaportal_t>,
    /// the raw visibility lump; empty when the map was not vised
    pub visibility: Vec<u8>,
    pub dispinfo: Vec<ddispinfo_t>,
    /// the raw displacement physics lump; may be empty
    pub physdisp: Vec<u8>,
    pub entities: String,
    /// portal keys of area portals that can never close
    pub always_open_portals: Vec<u16>,
}

pub struct FileLoader<'a> {
    data: &'a [u8],
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Error {
    BadFileRange,
    RequiredLumpEmpty,
    Msg(&'static str),
    Str(&'static str),
    String(String),
}

impl<'a> FileLoader<'a> {
    pub fn new(data: &'a [u8]) -> FileLoader<'a> {
        FileLoader { data }
    }

    pub fn get_range(&self, range: Range<usize>) -> Result<&'a [u8], Error> {
        if range.start <= range.end && range.end <= self.data.len() {
            Ok(&self.data[range])
        } else {
            Err(Error::BadFileRange)
        }
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

fn check_index(what: &'static str, index: i64, count: usize) -> Result<usize, Error> {
    if index < 0 || index as usize >= count {
        return Err(Error::String(format!(
            "{}: bad index {} (count {})",
            what, index, count
        )));
    }
    Ok(index as usize)
}

fn check_range(what: &'static str, first: u32, num: u32, count: usize) -> Result<(), Error> {
    if first as usize + num as usize > count {
        return Err(Error::String(format!(
            "{}: range {}+{} exceeds {}",
            what, first, num, count
        )));
    }
    Ok(())
}

fn check_node_ref(
    what: &'static str,
    raw: i32,
    num_nodes: usize,
    num_leafs: usize,
) -> Result<NodeRef, Error> {
    let node = NodeRef::from_raw(raw);
    let ok = match node {
        NodeRef::Internal(n) => n < num_nodes,
        NodeRef::Leaf(l) => l < num_leafs,
    };
    if !ok {
        return Err(Error::String(format!("{}: bad child {}", what, raw)));
    }
    Ok(node)
}

pub fn CMod_LoadPlanes(in_: &[dplane_t]) -> Result<Vec<cplane_t>, Error> {
    Ok(in_
        .iter()
        .map(|p| cplane_t::new(p.normal, p.dist))
        .collect())
}

pub fn CMod_LoadSurfaces(in_: &[dsurface_t]) -> Result<Vec<csurface_t>, Error> {
    if in_.len() >= SURFACE_INDEX_INVALID as usize {
        return Err(Error::Msg("CMod_LoadSurfaces: too many surfaces"));
    }
    Ok(in_
        .iter()
        .map(|s| csurface_t {
            name: Cow::Owned(s.name.clone()),
            flags: s.flags,
            surfaceProps: s.surface_props,
        })
        .collect())
}

pub fn CMod_LoadBrushSides(
    in_: &[dbrushside_t],
    num_planes: usize,
    num_surfaces: usize,
) -> Result<Vec<cbrushside_t>, Error> {
    in_.iter()
        .map(|side| {
            let plane_index = check_index("CMod_LoadBrushSides", side.planenum as i64, num_planes)?;
            let surfaceIndex = if side.texinfo < 0 {
                SURFACE_INDEX_INVALID
            } else {
                check_index("CMod_LoadBrushSides", side.texinfo as i64, num_surfaces)? as u16
            };
            Ok(cbrushside_t {
                plane_index,
                surfaceIndex,
                bBevel: side.bevel,
            })
        })
        .collect()
}

pub fn CMod_LoadBrushes(in_: &[dbrush_t], num_brushsides: usize) -> Result<Vec<cbrush_t>, Error> {
    in_.iter()
        .map(|b| {
            check_range("CMod_LoadBrushes", b.firstside, b.numsides, num_brushsides)?;
            Ok(cbrush_t {
                contents: b.contents,
                numsides: b.numsides as usize,
                firstbrushside: b.firstside as usize,
            })
        })
        .collect()
}

pub fn CMod_LoadLeafBrushes(in_: &[u32], num_brushes: usize) -> Result<Vec<usize>, Error> {
    in_.iter()
        .map(|&b| check_index("CMod_LoadLeafBrushes", b as i64, num_brushes))
        .collect()
}

pub struct LoadLeafsOutput {
    pub leafs: Vec<cleaf_t>,
    pub num_clusters: usize,
}

/// Leaf contents are widened by the contents of every brush in the leaf.
pub fn CMod_LoadLeafs(
    in_: &[dleaf_t],
    leafbrushes: &[usize],
    brushes: &[cbrush_t],
    num_areas: usize,
) -> Result<LoadLeafsOutput, Error> {
    if in_.is_empty() {
        return Err(Error::Str("Map with no leafs"));
    }
    let mut num_clusters: usize = 0;
    let leafs = in_
        .iter()
        .map(|l| {
            check_range(
                "CMod_LoadLeafs",
                l.firstleafbrush,
                l.numleafbrushes,
                leafbrushes.len(),
            )?;
            check_index("CMod_LoadLeafs: area", l.area as i64, num_areas)?;
            if l.cluster >= 0 {
                num_clusters = num_clusters.max(l.cluster as usize + 1);
            }
            let first = l.firstleafbrush as usize;
            let count = l.numleafbrushes as usize;
            let contents = leafbrushes[first..first + count]
                .iter()
                .fold(l.contents, |c, &b| c | brushes[b].contents);
            Ok(cleaf_t {
                contents,
                cluster: l.cluster,
                area: l.area,
                flags: l.flags,
                firstleafbrush: first,
                numleafbrushes: count,
                dispListStart: 0,
                dispCount: 0,
            })
        })
        .collect::<Result<Vec<cleaf_t>, Error>>()?;
    Ok(LoadLeafsOutput {
        leafs,
        num_clusters,
    })
}

pub fn CMod_LoadNodes(
    in_: &[dnode_t],
    num_planes: usize,
    num_leafs: usize,
) -> Result<Vec<cnode_t>, Error> {
    in_.iter()
        .map(|n| {
            Ok(cnode_t {
                plane_index: check_index("CMod_LoadNodes", n.planenum as i64, num_planes)?,
                children: [
                    check_node_ref("CMod_LoadNodes", n.children[0], in_.len(), num_leafs)?,
                    check_node_ref("CMod_LoadNodes", n.children[1], in_.len(), num_leafs)?,
                ],
            })
        })
        .collect()
}

pub fn CMod_LoadSubmodels(
    in_: &[dmodel_t],
    num_nodes: usize,
    num_leafs: usize,
) -> Result<Vec<cmodel_t>, Error> {
    if in_.is_empty() {
        return Err(Error::Str("Map with no models"));
    }
    if in_.len() > MAX_MAP_MODELS {
        return Err(Error::Msg("MAX_MAP_MODELS exceeded"));
    }
    in_.iter()
        .map(|m| {
            Ok(cmodel_t {
                // spread the mins / maxs by a pixel
                mins: m.mins - vec3_t::from_scalar(1.0),
                maxs: m.maxs + vec3_t::from_scalar(1.0),
                origin: m.origin,
                headnode: check_node_ref("CMod_LoadSubmodels", m.headnode, num_nodes, num_leafs)?,
            })
        })
        .collect()
}

/// A map without area data gets a single area 0.
pub fn CMod_LoadAreas(in_: &[darea_t], num_areaportals: usize) -> Result<Vec<carea_t>, Error> {
    if in_.len() > MAX_MAP_AREAS {
        return Err(Error::Msg("MAX_MAP_AREAS exceeded"));
    }
    if in_.is_empty() {
        return Ok(vec![carea_t::default()]);
    }
    in_.iter()
        .map(|a| {
            check_range("CMod_LoadAreas", a.firstareaportal, a.numareaportals, num_areaportals)?;
            Ok(carea_t {
                numareaportals: a.numareaportals as usize,
                firstareaportal: a.firstareaportal as usize,
            })
        })
        .collect()
}

pub fn CMod_LoadAreaPortals(
    in_: &[dareaportal_t],
    num_areas: usize,
    num_planes: usize,
) -> Result<Vec<dareaportal_t>, Error> {
    if in_.len() > MAX_MAP_AREAPORTALS {
        return Err(Error::Msg("MAX_MAP_AREAPORTALS exceeded"));
    }
    for p in in_.iter() {
        check_index("CMod_LoadAreaPortals: otherarea", p.otherarea as i64, num_areas)?;
        check_index("CMod_LoadAreaPortals: planenum", p.planenum as i64, num_planes)?;
        if p.portal_key as usize > in_.len() {
            warn!(
                "CMod_LoadAreaPortals: portal key {} beyond portal count {}",
                p.portal_key,
                in_.len()
            );
        }
    }
    Ok(in_.to_vec())
}

const VIS_HEADER: usize = 4;

pub fn CMod_LoadVisibility(lump: &[u8]) -> Result<Option<dvis_t>, Error> {
    if lump.is_empty() {
        return Ok(None);
    }
    let file = FileLoader::new(lump);
    let numclusters = get_le_i32(file.get_range(0..VIS_HEADER)?);
    if numclusters < 0 {
        return Err(Error::Str("Invalid vis lump"));
    }
    let numclusters = numclusters as usize;
    let table = file.get_range(VIS_HEADER..VIS_HEADER + numclusters * 8)?;
    let bitofs = table
        .chunks_exact(8)
        .map(|ofs| {
            let pvs = get_le_u32(&ofs[0..4]);
            let pas = get_le_u32(&ofs[4..8]);
            if pvs as usize > lump.len() || pas as usize > lump.len() {
                return Err(Error::BadFileRange);
            }
            Ok([pvs, pas])
        })
        .collect::<Result<Vec<[u32; 2]>, Error>>()?;
    Ok(Some(dvis_t {
        numclusters: numclusters as u32,
        bitofs,
        data: lump.to_vec(),
    }))
}

pub fn CMod_LoadDispInfo(
    in_: &[ddispinfo_t],
    num_surfaces: usize,
) -> Result<Vec<DispCollTree>, Error> {
    if in_.len() > MAX_MAP_DISPINFO {
        return Err(Error::Msg("MAX_MAP_DISPINFO exceeded"));
    }
    in_.iter()
        .map(|info| {
            if info.surface_index != SURFACE_INDEX_INVALID {
                check_index("CMod_LoadDispInfo: surface", info.surface_index as i64, num_surfaces)?;
            }
            DispCollTree::create(info)
        })
        .collect()
}

/// Splits the physics lump into one hull byte range per displacement.
/// `None` means the displacement has no precomputed hull.
pub fn CMod_LoadPhysDisp(
    lump: &[u8],
    num_disps: usize,
) -> Result<Vec<Option<Range<usize>>>, Error> {
    if lump.is_empty() {
        return Ok(vec![None; num_disps]);
    }
    let file = FileLoader::new(lump);
    let count = get_le_u16(file.get_range(0..2)?) as usize;
    if count != num_disps {
        return Err(Error::String(format!(
            "CMod_LoadPhysDisp: lump has {} displacements, map has {}",
            count, num_disps
        )));
    }

    let table_end = 2 + count * 2;
    if file.len() < table_end {
        return Ok(vec![None; num_disps]);
    }
    let sizes = file.get_range(2..table_end)?;

    let mut offset = table_end;
    let mut ranges = Vec::with_capacity(count);
    for size in sizes.chunks_exact(2).map(get_le_u16) {
        if size == 0 {
            ranges.push(None);
            continue;
        }
        let range = offset..offset + size as usize;
        file.get_range(range.clone())?;
        offset = range.end;
        ranges.push(Some(range));
    }
    Ok(ranges)
}

impl CollisionBspData {
    pub fn from_lumps(lumps: &BspLumps) -> Result<CollisionBspData, Error> {
        debug!("CollisionBspData::from_lumps( {} )", lumps.name);

        let planes = CMod_LoadPlanes(&lumps.planes)?;
        let map_surfaces = CMod_LoadSurfaces(&lumps.surfaces)?;
        let brushsides = CMod_LoadBrushSides(&lumps.brushsides, planes.len(), map_surfaces.len())?;
        let brushes = CMod_LoadBrushes(&lumps.brushes, brushsides.len())?;
        let leafbrushes = CMod_LoadLeafBrushes(&lumps.leafbrushes, brushes.len())?;
        let areas = CMod_LoadAreas(&lumps.areas, lumps.areaportals.len())?;
        let areaportals = CMod_LoadAreaPortals(&lumps.areaportals, areas.len(), planes.len())?;
        let LoadLeafsOutput {
            leafs,
            num_clusters,
        } = CMod_LoadLeafs(&lumps.leafs, &leafbrushes, &brushes, areas.len())?;
        let nodes = CMod_LoadNodes(&lumps.nodes, planes.len(), leafs.len())?;
        let cmodels = CMod_LoadSubmodels(&lumps.models, nodes.len(), leafs.len())?;
        let vis = CMod_LoadVisibility(&lumps.visibility)?;
        let disp_trees = CMod_LoadDispInfo(&lumps.dispinfo, map_surfaces.len())?;
        let phys_disp_ranges = CMod_LoadPhysDisp(&lumps.physdisp, disp_trees.len())?;

        debug!(
            "{} planes, {} nodes, {} leafs, {} brushes, {} brushsides, {} models, {} displacements",
            planes.len(),
            nodes.len(),
            leafs.len(),
            brushes.len(),
            brushsides.len(),
            cmodels.len(),
            disp_trees.len()
        );

        let numclusters = match &vis {
            Some(vis) => vis.numclusters as usize,
            None => num_clusters,
        };

        let mut bsp = CollisionBspData {
            name: lumps.name.clone(),
            planes,
            nodes,
            leafs,
            leafbrushes,
            brushes,
            brushsides,
            cmodels,
            map_surfaces,
            numclusters,
            vis,
            entity_string: Some(lumps.entities.clone()),
            areas,
            areaportals,
            area_state: RwLock::new(AreaPortalState::default()),
            allcontents: 0,
            disp_trees,
            disp_list: Vec::new(),
            phys_disp: lumps.physdisp.clone(),
            phys_disp_ranges,
            map_noareas: cvar_t::new("map_noareas", 0),
            cm_nodisp: cvar_t::new("cm_nodisp", 0),
            trace_pool: TraceWorkPool::new(),
        };

        CM_DispTreeLeafnum(&mut bsp);

        bsp.allcontents = bsp.leafs.iter().fold(0, |c, leaf| c | leaf.contents);

        CM_InitAreaPortalState(&bsp, &lumps.always_open_portals);

        Ok(bsp)
    }
}

pub fn CM_NumClusters(bsp: &CollisionBspData) -> usize {
    bsp.numclusters
}

pub fn CM_NumInlineModels(bsp: &CollisionBspData) -> usize {
    bsp.cmodels.len()
}

/// Empty once the string has been discarded.
pub fn CM_EntityString(bsp: &CollisionBspData) -> &str {
    bsp.entity_string.as_deref().unwrap_or("")
}

pub fn CM_DiscardEntityString(bsp: &mut CollisionBspData) {
    bsp.entity_string = None;
}

/// Parses `"*N"` model names. Map names (`"maps/..."`) are the world model.
pub fn CM_InlineModel<'a>(bsp: &'a CollisionBspData, name: &str) -> Option<&'a cmodel_t> {
    if name.starts_with("maps/") {
        return bsp.cmodels.first();
    }
    let num: usize = name.strip_prefix('*')?.parse().ok()?;
    if num < 1 || num >= bsp.cmodels.len() {
        return None;
    }
    Some(&bsp.cmodels[num])
}

pub fn CM_InlineModelNumber(bsp: &CollisionBspData, index: i32) -> Option<&cmodel_t> {
    if index < 0 {
        return None;
    }
    bsp.cmodels.get(index as usize)
}

pub fn CM_LeafContents(bsp: &CollisionBspData, leafnum: usize) -> ContentsFlag {
    assert!(leafnum < bsp.leafs.len());
    bsp.leafs[leafnum].contents
}

pub fn CM_LeafCluster(bsp: &CollisionBspData, leafnum: usize) -> i32 {
    assert!(leafnum < bsp.leafs.len());
    bsp.leafs[leafnum].cluster
}

pub fn CM_LeafArea(bsp: &CollisionBspData, leafnum: usize) -> i32 {
    assert!(leafnum < bsp.leafs.len());
    bsp.leafs[leafnum].area
}

pub fn CM_LeafFlags(bsp: &CollisionBspData, leafnum: usize) -> LeafFlag {
    assert!(leafnum < bsp.leafs.len());
    bsp.leafs[leafnum].flags
}

pub fn CM_ModelBounds(bsp: &CollisionBspData, model: usize) -> vec3_bounds {
    let cmod = &bsp.cmodels[model];
    vec3_bounds {
        mins: cmod.mins,
        maxs: cmod.maxs,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::qcommon::cm_testworld::*;

    fn vis_lump(numclusters: i32, offsets: &[[u32; 2]], rows: &[u8]) -> Vec<u8> {
        let mut lump = numclusters.to_le_bytes().to_vec();
        for ofs in offsets {
            lump.extend_from_slice(&ofs[0].to_le_bytes());
            lump.extend_from_slice(&ofs[1].to_le_bytes());
        }
        lump.extend_from_slice(rows);
        lump
    }

    fn load_error(lumps: &BspLumps) -> Error {
        match CollisionBspData::from_lumps(lumps) {
            Ok(_) => panic!("{} loaded", lumps.name),
            Err(e) => e,
        }
    }

    fn error_text(e: &Error) -> String {
        match e {
            Error::String(s) => s.clone(),
            other => format!("{:?}", other),
        }
    }

    #[test]
    fn leaf_contents_include_brushes() {
        let _ = env_logger::builder().is_test(true).try_init();
        let mut w = single_box_lumps();
        w.lumps.leafs[0].contents = CONTENTS_WATER;
        let bsp = w.build();
        assert_eq!(CM_LeafContents(&bsp, 0), CONTENTS_SOLID | CONTENTS_WATER);
        assert_eq!(CM_LeafContents(&bsp, 1), 0);
        assert_eq!(bsp.allcontents, CONTENTS_SOLID | CONTENTS_WATER);
    }

    #[test]
    fn clusters_and_areas_without_lumps() {
        let bsp = single_box_world();
        // no vis lump, so counted from the leaves
        assert_eq!(CM_NumClusters(&bsp), 1);
        assert!(bsp.vis.is_none());
        assert_eq!(bsp.areas.len(), 1);
        assert_eq!(CM_LeafCluster(&bsp, 0), -1);
        assert_eq!(CM_LeafArea(&bsp, 3), 0);
        assert_eq!(CM_LeafFlags(&bsp, 3), 0);
    }

    #[test]
    fn empty_map_is_rejected() {
        let e = load_error(&BspLumps::default());
        assert_eq!(e, Error::Str("Map with no leafs"));

        let mut w = single_box_lumps();
        w.lumps.models.clear();
        assert_eq!(load_error(&w.lumps), Error::Str("Map with no models"));
    }

    #[test]
    fn bad_indices_are_rejected() {
        let mut w = single_box_lumps();
        w.lumps.leafbrushes[0] = 9;
        assert!(error_text(&load_error(&w.lumps)).starts_with("CMod_LoadLeafBrushes"));

        let mut w = single_box_lumps();
        w.lumps.nodes[0].children[0] = 50;
        assert!(error_text(&load_error(&w.lumps)).contains("bad child 50"));

        let mut w = single_box_lumps();
        w.lumps.nodes[5].children[1] = -20;
        assert!(error_text(&load_error(&w.lumps)).contains("bad child -20"));

        let mut w = single_box_lumps();
        w.lumps.brushsides[2].planenum = 1000;
        assert!(error_text(&load_error(&w.lumps)).starts_with("CMod_LoadBrushSides"));

        let mut w = single_box_lumps();
        w.lumps.brushes[0].numsides = 7;
        assert!(error_text(&load_error(&w.lumps)).starts_with("CMod_LoadBrushes"));

        let mut w = portal_lumps();
        w.lumps.leafs[0].area = 9;
        assert!(error_text(&load_error(&w.lumps)).starts_with("CMod_LoadLeafs: area"));

        let mut w = portal_lumps();
        w.lumps.areaportals[3].otherarea = 12;
        assert!(error_text(&load_error(&w.lumps)).starts_with("CMod_LoadAreaPortals"));
    }

    #[test]
    fn disp_surface_index_is_checked() {
        let mut w = terrain_lumps();
        w.lumps.dispinfo[0].surface_index = 5;
        assert!(error_text(&load_error(&w.lumps)).starts_with("CMod_LoadDispInfo: surface"));

        // no surface at all is allowed
        let mut w = terrain_lumps();
        w.lumps.dispinfo[0].surface_index = SURFACE_INDEX_INVALID;
        let bsp = w.build();
        let tr = crate::qcommon::cm_trace::CM_TraceBox(
            &bsp,
            v3(70.0, 53.0, 100.0),
            v3(70.0, 53.0, -100.0),
            vec3_origin,
            vec3_origin,
            MASK_SOLID,
        );
        assert!(tr.fraction < 1.0);
        assert_eq!(tr.worldSurfaceIndex, SURFACE_INDEX_INVALID);
    }

    #[test]
    fn submodels_are_spread_by_a_unit() {
        let bsp = single_box_world();
        assert_eq!(CM_NumInlineModels(&bsp), 2);
        let b = CM_ModelBounds(&bsp, 0);
        assert_eq!(b.mins, vec3_t::from_scalar(-4097.0));
        assert_eq!(b.maxs, vec3_t::from_scalar(4097.0));
        assert_eq!(bsp.cmodels[1].headnode, NodeRef::Internal(4));
    }

    #[test]
    fn inline_model_names() {
        let bsp = single_box_world();
        let world = &bsp.cmodels[0] as *const cmodel_t;
        let door = &bsp.cmodels[1] as *const cmodel_t;
        let found = |name: &str| CM_InlineModel(&bsp, name).map(|m| m as *const cmodel_t);

        assert_eq!(found("*1"), Some(door));
        assert_eq!(found("maps/q3dm1.bsp"), Some(world));
        assert_eq!(found("*0"), None);
        assert_eq!(found("*2"), None);
        assert_eq!(found("*"), None);
        assert_eq!(found("*x"), None);
        assert_eq!(found("door"), None);

        assert!(CM_InlineModelNumber(&bsp, 1).is_some());
        assert!(CM_InlineModelNumber(&bsp, 2).is_none());
        assert!(CM_InlineModelNumber(&bsp, -1).is_none());
    }

    #[test]
    fn entity_string_can_be_discarded() {
        let mut w = single_box_lumps();
        w.lumps.entities = "{ \"classname\" \"worldspawn\" }".to_string();
        let mut bsp = w.build();
        assert_eq!(CM_EntityString(&bsp), "{ \"classname\" \"worldspawn\" }");
        CM_DiscardEntityString(&mut bsp);
        assert_eq!(CM_EntityString(&bsp), "");
    }

    #[test]
    fn visibility_lump() {
        assert_eq!(CMod_LoadVisibility(&[]), Ok(None));

        let lump = vis_lump(2, &[[20, 20], [21, 21]], &[0x01, 0x03]);
        let vis = CMod_LoadVisibility(&lump).unwrap().unwrap();
        assert_eq!(vis.numclusters, 2);
        assert_eq!(vis.bitofs, vec![[20, 20], [21, 21]]);
        assert_eq!(vis.data.len(), 22);

        // offset past the end of the lump
        let lump = vis_lump(1, &[[40, 12]], &[0x01]);
        assert_eq!(CMod_LoadVisibility(&lump), Err(Error::BadFileRange));

        // offset table cut short
        let lump = vis_lump(3, &[[20, 20]], &[]);
        assert_eq!(CMod_LoadVisibility(&lump), Err(Error::BadFileRange));

        let lump = vis_lump(-1, &[], &[]);
        assert_eq!(CMod_LoadVisibility(&lump), Err(Error::Str("Invalid vis lump")));
    }

    #[test]
    fn physdisp_lump() {
        assert_eq!(CMod_LoadPhysDisp(&[], 2), Ok(vec![None, None]));

        let lump = [2, 0, 3, 0, 0, 0, 0xa, 0xb, 0xc];
        assert_eq!(CMod_LoadPhysDisp(&lump, 2), Ok(vec![Some(6..9), None]));

        // size table cut short
        assert_eq!(CMod_LoadPhysDisp(&[2, 0, 3], 2), Ok(vec![None, None]));

        // hull runs past the end
        assert_eq!(
            CMod_LoadPhysDisp(&[1, 0, 8, 0, 1, 2], 1),
            Err(Error::BadFileRange)
        );

        assert!(error_text(&CMod_LoadPhysDisp(&lump, 3).unwrap_err()).contains("lump has 2"));
    }

    #[test]
    fn disp_hull_bytes() {
        let mut w = terrain_lumps();
        w.lumps.physdisp = vec![1, 0, 2, 0, 0xaa, 0xbb];
        let bsp = w.build();
        assert_eq!(bsp.disp_hull_bytes(0), Some(&[0xaa, 0xbb][..]));
        assert_eq!(bsp.disp_hull_bytes(1), None);

        let bsp = terrain_world();
        assert_eq!(bsp.disp_hull_bytes(0), None);
    }

    #[test]
    fn negative_texinfo_has_no_surface() {
        let bsp = terrain_world();
        let side = &bsp.brushes[0].sides(&bsp)[0];
        assert_eq!(side.surfaceIndex, SURFACE_INDEX_INVALID);
        assert_eq!(bsp.GetSurfaceAtIndex(side.surfaceIndex).name, "**empty**");
        assert_eq!(bsp.GetSurfaceAtIndex(0).name, "grass");
    }
}
