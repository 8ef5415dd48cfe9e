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
// cm_displeaf.rs -- which leaves each displacement touches

use crate::qcommon::cm_local::*;
use crate::qcommon::cm_test::CM_BoxLeafnums_r;
use log::debug;
use rayon::prelude::*;

/// Below this many displacements the walks run on the calling thread.
pub const PARALLEL_DISP_THRESHOLD: usize = 64;

/// Leaves of the world tree touched by one displacement's bounds.
fn CM_DispLeafList(bsp: &CollisionBspData, disp_index: usize) -> Vec<usize> {
    let bounds = bsp.disp_trees[disp_index].bounds();
    let mut ll = leafList_t::from_bounds(bounds.mins, bounds.maxs);
    let mut leaves: Vec<usize> = Vec::new();
    CM_BoxLeafnums_r(bsp, &mut ll, bsp.world_headnode(), &mut |leafnum| {
        leaves.push(leafnum);
        None
    });
    leaves.sort_unstable();
    leaves.dedup();
    leaves
}

/// Builds `disp_list` and each leaf's run into it, and widens leaf contents
/// by the contents of the displacements inside.
pub fn CM_DispTreeLeafnum(bsp: &mut CollisionBspData) {
    for leaf in bsp.leafs.iter_mut() {
        leaf.dispListStart = 0;
        leaf.dispCount = 0;
    }
    bsp.disp_list.clear();

    let count = bsp.disp_trees.len();
    if count == 0 {
        return;
    }

    let per_disp: Vec<Vec<usize>> = {
        let bsp: &CollisionBspData = bsp;
        if count >= PARALLEL_DISP_THRESHOLD {
            (0..count)
                .into_par_iter()
                .map(|i| CM_DispLeafList(bsp, i))
                .collect()
        } else {
            (0..count).map(|i| CM_DispLeafList(bsp, i)).collect()
        }
    };

    let mut per_leaf: Vec<Vec<usize>> = vec![Vec::new(); bsp.leafs.len()];
    for (disp, leaves) in per_disp.iter().enumerate() {
        for &leafnum in leaves.iter() {
            per_leaf[leafnum].push(disp);
        }
    }

    let mut disp_list = Vec::with_capacity(per_disp.iter().map(Vec::len).sum());
    for (leafnum, disps) in per_leaf.iter().enumerate() {
        let leaf = &mut bsp.leafs[leafnum];
        leaf.dispListStart = disp_list.len();
        leaf.dispCount = disps.len();
        for &disp in disps.iter() {
            leaf.contents |= bsp.disp_trees[disp].contents();
            disp_list.push(disp);
        }
    }

    debug!(
        "CM_DispTreeLeafnum: {} displacements, {} leaf references",
        count,
        disp_list.len()
    );
    bsp.disp_list = disp_list;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::prelude::*;
    use crate::qcommon::cm_testworld::*;

    #[test]
    fn disp_spans_both_leaves() {
        let _ = env_logger::builder().is_test(true).try_init();
        let bsp = terrain_world();
        assert_eq!(bsp.disp_trees.len(), 1);
        for leafnum in 0..2 {
            let leaf = &bsp.leafs[leafnum];
            assert_eq!(leaf.leaf_disps(&bsp), &[0]);
            assert_ne!(leaf.contents & CONTENTS_SOLID, 0);
        }
        assert_ne!(bsp.allcontents & CONTENTS_SOLID, 0);
    }

    #[test]
    fn disp_contents_subset_of_leaf_contents() {
        let bsp = many_disp_world(PARALLEL_DISP_THRESHOLD + 6);
        for leaf in bsp.leafs.iter() {
            for &d in leaf.leaf_disps(&bsp) {
                let c = bsp.disp_trees[d].contents();
                assert_eq!(leaf.contents & c, c);
            }
        }
    }

    #[test]
    fn parallel_and_serial_builds_agree() {
        let big = many_disp_world(PARALLEL_DISP_THRESHOLD + 6);
        let serial: Vec<Vec<usize>> = (0..big.disp_trees.len())
            .map(|i| CM_DispLeafList(&big, i))
            .collect();
        for (disp, leaves) in serial.iter().enumerate() {
            assert!(!leaves.is_empty());
            for &leafnum in leaves.iter() {
                assert!(big.leafs[leafnum].leaf_disps(&big).contains(&disp));
            }
        }
        let total: usize = serial.iter().map(Vec::len).sum();
        assert_eq!(big.disp_list.len(), total);
    }
}
