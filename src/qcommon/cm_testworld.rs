//! Small hand-built worlds shared by the collision tests.

use crate::prelude::*;
use crate::qcommon::cm_disp::tests::flat_disp;
use crate::qcommon::cm_load::BspLumps;
use crate::qcommon::cm_local::CollisionBspData;
use crate::qfiles::*;

pub struct WorldBuilder {
    pub lumps: BspLumps,
}

impl WorldBuilder {
    pub fn new(name: &str) -> WorldBuilder {
        WorldBuilder {
            lumps: BspLumps {
                name: name.to_string(),
                ..BspLumps::default()
            },
        }
    }

    pub fn plane(&mut self, normal: vec3_t, dist: f32) -> u32 {
        self.lumps.planes.push(dplane_t { normal, dist });
        (self.lumps.planes.len() - 1) as u32
    }

    pub fn surface(&mut self, name: &str, flags: SurfaceFlag, surface_props: u16) -> i32 {
        self.lumps.surfaces.push(dsurface_t {
            name: name.to_string(),
            flags,
            surface_props,
        });
        (self.lumps.surfaces.len() - 1) as i32
    }

    /// Axial box brush. Sides are +x, -x, +y, -y, +z, -z, so its planes are
    /// the six planes added last.
    pub fn box_brush(
        &mut self,
        mins: vec3_t,
        maxs: vec3_t,
        contents: ContentsFlag,
        texinfo: i32,
    ) -> u32 {
        let firstside = self.lumps.brushsides.len() as u32;
        for axis in 0..3 {
            let n = vec3_t::unit(axis);
            let front = self.plane(n, maxs[axis]);
            let back = self.plane(-n, -mins[axis]);
            for planenum in [front, back] {
                self.lumps.brushsides.push(dbrushside_t {
                    planenum,
                    texinfo,
                    bevel: false,
                });
            }
        }
        self.lumps.brushes.push(dbrush_t {
            firstside,
            numsides: 6,
            contents,
        });
        (self.lumps.brushes.len() - 1) as u32
    }

    /// Returns the raw child value that refers to the new leaf.
    pub fn leaf(&mut self, cluster: i32, area: i32, brushes: &[u32]) -> i32 {
        let firstleafbrush = self.lumps.leafbrushes.len() as u32;
        self.lumps.leafbrushes.extend_from_slice(brushes);
        self.lumps.leafs.push(dleaf_t {
            contents: 0,
            cluster,
            area,
            flags: 0,
            firstleafbrush,
            numleafbrushes: brushes.len() as u32,
        });
        -(self.lumps.leafs.len() as i32)
    }

    pub fn node(&mut self, planenum: u32, front: i32, back: i32) -> i32 {
        self.lumps.nodes.push(dnode_t {
            planenum: planenum as i32,
            children: [front, back],
        });
        (self.lumps.nodes.len() - 1) as i32
    }

    pub fn model(&mut self, mins: vec3_t, maxs: vec3_t, headnode: i32) {
        self.lumps.models.push(dmodel_t {
            mins,
            maxs,
            origin: vec3_origin,
            headnode,
        });
    }

    pub fn disp(&mut self, info: ddispinfo_t) {
        self.lumps.dispinfo.push(info);
    }

    pub fn build(&self) -> CollisionBspData {
        match CollisionBspData::from_lumps(&self.lumps) {
            Ok(bsp) => bsp,
            Err(e) => panic!("{}: {:?}", self.lumps.name, e),
        }
    }
}

fn world_bounds() -> (vec3_t, vec3_t) {
    (vec3_t::from_scalar(-4096.0), vec3_t::from_scalar(4096.0))
}

/// One solid 100 unit cube centered on the origin.
///
/// Leaf 0 is the inside of the cube. Node `i` splits on the cube's side `i`
/// (+x, -x, +y, -y, +z, -z), with leaf `i + 1` in front and node `i + 1`
/// behind; node 5 has leaf 0 behind it. Model 1 is the same tree from node 4.
pub fn single_box_lumps() -> WorldBuilder {
    let mut w = WorldBuilder::new("single_box");
    let concrete = w.surface("concrete", 0, 3);
    let brush = w.box_brush(
        vec3_t::from_scalar(-50.0),
        vec3_t::from_scalar(50.0),
        CONTENTS_SOLID,
        concrete,
    );
    w.leaf(-1, 0, &[brush]);
    for _ in 0..6 {
        w.leaf(0, 0, &[]);
    }
    for i in 0..6 {
        let back = if i == 5 { -1 } else { i as i32 + 1 };
        w.node(i, -(i as i32 + 2), back);
    }
    let (mins, maxs) = world_bounds();
    w.model(mins, maxs, 0);
    w.model(vec3_t::from_scalar(-50.0), vec3_t::from_scalar(50.0), 4);
    w
}

pub fn single_box_world() -> CollisionBspData {
    single_box_lumps().build()
}

/// Splitting plane at z = 64. Leaf 0 (cluster 0) is below, leaf 1 (cluster 1)
/// above, holding a solid slab from z = 64 to 128. Cluster 0 sees only
/// itself, cluster 1 sees both.
pub fn plane_world() -> CollisionBspData {
    let mut w = WorldBuilder::new("plane");
    let brush = w.box_brush(v3(-100.0, -100.0, 64.0), v3(100.0, 100.0, 128.0), CONTENTS_SOLID, -1);
    let split = w.plane(v3(0.0, 0.0, 1.0), 64.0);
    let below = w.leaf(0, 0, &[]);
    let above = w.leaf(1, 0, &[brush]);
    w.node(split, above, below);
    let (mins, maxs) = world_bounds();
    w.model(mins, maxs, 0);

    let mut vis = Vec::new();
    vis.extend_from_slice(&2i32.to_le_bytes());
    for ofs in [20u32, 20, 21, 21] {
        vis.extend_from_slice(&ofs.to_le_bytes());
    }
    vis.extend_from_slice(&[0x01, 0x03]);
    w.lumps.visibility = vis;
    w.build()
}

/// A small solid brush straddling the x = 0 splitter, so both leaves list it.
pub fn shared_brush_world() -> CollisionBspData {
    let mut w = WorldBuilder::new("shared_brush");
    let brush = w.box_brush(v3(-16.0, 100.0, -16.0), v3(16.0, 116.0, 16.0), CONTENTS_SOLID, -1);
    let split = w.plane(v3(1.0, 0.0, 0.0), 0.0);
    let back = w.leaf(0, 0, &[brush]);
    let front = w.leaf(0, 0, &[brush]);
    w.node(split, front, back);
    let (mins, maxs) = world_bounds();
    w.model(mins, maxs, 0);
    w.build()
}

/// A flat 256 unit terrain patch at z = 0 over both sides of the x = 128
/// splitter, and a solid block from (200, 200, 50) to (240, 240, 90) in the
/// front leaf.
pub fn terrain_lumps() -> WorldBuilder {
    let mut w = WorldBuilder::new("terrain");
    let grass = w.surface("grass", SURF_NODECALS, 7);
    let block = w.box_brush(v3(200.0, 200.0, 50.0), v3(240.0, 240.0, 90.0), CONTENTS_SOLID, -1);
    let split = w.plane(v3(1.0, 0.0, 0.0), 128.0);
    let back = w.leaf(0, 0, &[]);
    let front = w.leaf(0, 0, &[block]);
    w.node(split, front, back);
    let (mins, maxs) = world_bounds();
    w.model(mins, maxs, 0);

    let mut info = flat_disp(4, 16.0, 0.0);
    info.surface_index = grass as u16;
    w.disp(info);
    w
}

pub fn terrain_world() -> CollisionBspData {
    terrain_lumps().build()
}

/// `n` small patches in a row along x, alternating solid and water, over an
/// x = 0 splitter.
pub fn many_disp_world(n: usize) -> CollisionBspData {
    let mut w = WorldBuilder::new("many_disp");
    let split = w.plane(v3(1.0, 0.0, 0.0), 0.0);
    let back = w.leaf(0, 0, &[]);
    let front = w.leaf(0, 0, &[]);
    w.node(split, front, back);
    let (mins, maxs) = world_bounds();
    w.model(mins, maxs, 0);

    let x0 = -(n as f32) * 10.0;
    for i in 0..n {
        let mut info = flat_disp(2, 4.0, 0.0);
        let offset = v3(x0 + i as f32 * 20.0, 0.0, 0.0);
        for v in info.verts.iter_mut() {
            *v += offset;
        }
        info.contents = if i % 2 == 0 {
            CONTENTS_SOLID
        } else {
            CONTENTS_WATER
        };
        w.disp(info);
    }
    w.build()
}

/// Three areas in a row along x: area 1 for x < 0, area 2 up to x = 100,
/// area 3 beyond. Portal key 1 joins areas 1 and 2, key 2 joins 2 and 3.
pub fn portal_lumps() -> WorldBuilder {
    let mut w = WorldBuilder::new("portals");
    let p0 = w.plane(v3(1.0, 0.0, 0.0), 0.0);
    let p1 = w.plane(v3(1.0, 0.0, 0.0), 100.0);

    let portal = |portal_key: u16, otherarea: u16, planenum: u32| dareaportal_t {
        portal_key,
        otherarea,
        planenum,
    };
    w.lumps.areaportals = vec![
        portal(1, 2, p0),
        portal(1, 1, p0),
        portal(2, 3, p1),
        portal(2, 2, p1),
    ];
    let area = |numareaportals: u32, firstareaportal: u32| darea_t {
        numareaportals,
        firstareaportal,
    };
    w.lumps.areas = vec![area(0, 0), area(1, 0), area(2, 1), area(1, 3)];

    let west = w.leaf(0, 1, &[]);
    let middle = w.leaf(0, 2, &[]);
    let east = w.leaf(0, 3, &[]);
    // node 0 is the root; node 1 is its front child
    w.node(p0, 1, west);
    w.node(p1, east, middle);
    let (mins, maxs) = world_bounds();
    w.model(mins, maxs, 0);
    w
}

pub fn portal_world() -> CollisionBspData {
    portal_lumps().build()
}
