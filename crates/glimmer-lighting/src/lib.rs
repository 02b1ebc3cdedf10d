//! Packed per-chunk light storage and block-light flood fill.
#![forbid(unsafe_code)]

use glimmer_blocks::{Block, BlockRegistry};
use glimmer_chunk::{CHUNK_SPLITS, Chunk, ChunkCoord, ChunkMap};
use hashbrown::HashMap;

mod queue;
pub use queue::{LightNode, LightQueue};


/// Highest value either light channel can hold.
pub const MAX_LIGHT_LEVEL: u8 = 3;
/// Complete darkness.
pub const MIN_LIGHT_LEVEL: u8 = 0;

/// Per-chunk light cells, one byte per voxel. Each byte packs two independent
/// channels: bits 4-7 carry global/sunlight, bits 0-3 carry block light
/// (`GGGGBBBB`). Both channels stay within `MAX_LIGHT_LEVEL`; a write above
/// that is a contract violation, not a runtime state.
#[derive(Clone, Debug)]
pub struct LightMap {
    sx: usize,
    sy: usize,
    sz: usize,
    cells: Vec<u8>,
}

impl LightMap {
    pub fn new(sx: usize, sy: usize, sz: usize) -> Self {
        Self {
            sx,
            sy,
            sz,
            cells: vec![0; sx * sy * sz],
        }
    }

    #[inline]
    fn idx(&self, x: usize, y: usize, z: usize) -> usize {
        assert!(
            x < self.sx && y < self.sy && z < self.sz,
            "light coordinate ({x},{y},{z}) outside {}x{}x{}",
            self.sx,
            self.sy,
            self.sz
        );
        (y * self.sz + z) * self.sx + x
    }

    #[inline]
    pub fn global_light(&self, x: usize, y: usize, z: usize) -> u8 {
        (self.cells[self.idx(x, y, z)] >> 4) & 0x0F
    }

    #[inline]
    pub fn set_global_light(&mut self, x: usize, y: usize, z: usize, value: u8) {
        assert!(
            value <= MAX_LIGHT_LEVEL,
            "global light {value} above MAX_LIGHT_LEVEL"
        );
        let i = self.idx(x, y, z);
        self.cells[i] = (self.cells[i] & 0x0F) | (value << 4);
    }

    #[inline]
    pub fn block_light(&self, x: usize, y: usize, z: usize) -> u8 {
        self.cells[self.idx(x, y, z)] & 0x0F
    }

    #[inline]
    pub fn set_block_light(&mut self, x: usize, y: usize, z: usize, value: u8) {
        assert!(
            value <= MAX_LIGHT_LEVEL,
            "block light {value} above MAX_LIGHT_LEVEL"
        );
        let i = self.idx(x, y, z);
        self.cells[i] = (self.cells[i] & 0xF0) | value;
    }
}

/// Resolves a world-space column position to a loaded chunk. Absence is a
/// propagation boundary, never an error. All chunks returned by one source
/// share the dimensions of the [`LightingStore`] querying it.
pub trait ChunkSource {
    fn chunk_at_world(&self, wx: i32, wz: i32) -> Option<&Chunk>;
}

impl ChunkSource for ChunkMap {
    #[inline]
    fn chunk_at_world(&self, wx: i32, wz: i32) -> Option<&Chunk> {
        ChunkMap::chunk_at_world(self, wx, wz)
    }
}

/// Marks one render sub-region of a chunk stale. Fire-and-forget: the engine
/// never observes the rebuild.
pub trait RenderInvalidator {
    fn invalidate_region(&mut self, coord: ChunkCoord, region: usize);
}

/// Discards invalidations; for callers with no render state.
impl RenderInvalidator for () {
    fn invalidate_region(&mut self, _coord: ChunkCoord, _region: usize) {}
}

#[inline]
fn light_passable(b: Block, reg: &BlockRegistry) -> bool {
    if b == Block::AIR {
        return true;
    }
    reg.get(b.id).map(|ty| ty.propagates_light).unwrap_or(false)
}

#[inline]
fn skylight_transparent(b: Block, reg: &BlockRegistry) -> bool {
    if b == Block::AIR {
        return true;
    }
    reg.get(b.id).map(|ty| !ty.blocks_skylight).unwrap_or(false)
}

/// Owns one [`LightMap`] per loaded chunk and runs block-light propagation
/// across them. Single-threaded: a propagation run mutates whatever chunks it
/// reaches, so callers serialize runs that can overlap.
pub struct LightingStore {
    sx: usize,
    sy: usize,
    sz: usize,
    maps: HashMap<ChunkCoord, LightMap>,
}

impl LightingStore {
    pub fn new(sx: usize, sy: usize, sz: usize) -> Self {
        Self {
            sx,
            sy,
            sz,
            maps: HashMap::new(),
        }
    }

    /// Allocate the chunk's light map, zero-filled on both channels.
    /// Re-initializing an existing chunk resets it to dark.
    pub fn init_chunk(&mut self, coord: ChunkCoord) {
        self.maps
            .insert(coord, LightMap::new(self.sx, self.sy, self.sz));
    }

    /// Drop the chunk's light map when the chunk is unloaded.
    pub fn remove_chunk(&mut self, coord: ChunkCoord) {
        self.maps.remove(&coord);
    }

    #[inline]
    pub fn light_map(&self, coord: ChunkCoord) -> Option<&LightMap> {
        self.maps.get(&coord)
    }

    #[inline]
    fn map_ref(&self, coord: ChunkCoord) -> &LightMap {
        self.maps.get(&coord).unwrap_or_else(|| {
            panic!(
                "lighting not initialized for chunk ({}, {})",
                coord.cx, coord.cz
            )
        })
    }

    #[inline]
    fn map_mut(&mut self, coord: ChunkCoord) -> &mut LightMap {
        self.maps.get_mut(&coord).unwrap_or_else(|| {
            panic!(
                "lighting not initialized for chunk ({}, {})",
                coord.cx, coord.cz
            )
        })
    }

    #[inline]
    pub fn block_light(&self, coord: ChunkCoord, x: usize, y: usize, z: usize) -> u8 {
        self.map_ref(coord).block_light(x, y, z)
    }

    #[inline]
    pub fn global_light(&self, coord: ChunkCoord, x: usize, y: usize, z: usize) -> u8 {
        self.map_ref(coord).global_light(x, y, z)
    }

    /// Fill the global channel from a top-down column scan: every voxel with an
    /// unobstructed sky path above it gets `MAX_LIGHT_LEVEL`, everything at or
    /// below the first occluder gets 0. The block channel is untouched, and no
    /// lateral propagation of the global channel is performed.
    pub fn seed_skylight(&mut self, chunk: &Chunk, reg: &BlockRegistry) {
        assert!(
            chunk.sx == self.sx && chunk.sy == self.sy && chunk.sz == self.sz,
            "chunk dimensions do not match the lighting store"
        );
        let map = self.map_mut(chunk.coord);
        for z in 0..chunk.sz {
            for x in 0..chunk.sx {
                let mut open_above = true;
                for y in (0..chunk.sy).rev() {
                    if open_above && !skylight_transparent(chunk.get_local(x, y, z), reg) {
                        open_above = false;
                    }
                    let level = if open_above {
                        MAX_LIGHT_LEVEL
                    } else {
                        MIN_LIGHT_LEVEL
                    };
                    map.set_global_light(x, y, z, level);
                }
            }
        }
    }

    /// Set the block-light channel at one voxel and flood the change outward.
    ///
    /// The source voxel takes `value` as-is: no decay, no passability check.
    /// From there the fill spreads breadth-first to the six face neighbors,
    /// losing one level per hop, entering only light-passable voxels and only
    /// where the candidate level would not lower the stored one. Horizontal
    /// steps resolve through `chunks`, so the fill crosses loaded chunk seams
    /// and stops silently at unloaded ones; vertical steps stay inside the
    /// column. When the queue drains, every touched chunk has each of its
    /// render sub-regions invalidated exactly once.
    #[allow(clippy::too_many_arguments)]
    pub fn set_block_light<C: ChunkSource, R: RenderInvalidator>(
        &mut self,
        chunks: &C,
        reg: &BlockRegistry,
        coord: ChunkCoord,
        x: usize,
        y: usize,
        z: usize,
        value: u8,
        invalidator: &mut R,
    ) {
        let mut queue = LightQueue::new();
        let mut touched: Vec<ChunkCoord> = Vec::new();

        self.map_mut(coord).set_block_light(x, y, z, value);
        queue.push(x, y, z, coord);
        touched.push(coord);

        let mut nodes = 0usize;
        while let Some(n) = queue.pop() {
            nodes += 1;
            let level = self.map_ref(n.coord).block_light(n.x, n.y, n.z);

            let wx = n.coord.cx * self.sx as i32 + n.x as i32;
            let wz = n.coord.cz * self.sz as i32 + n.z as i32;

            // Horizontal neighbors resolve by world position, so chunk edges
            // fall through to the adjacent chunk when one is loaded.
            self.spread(chunks, reg, &mut queue, &mut touched, wx - 1, n.y, wz, level);
            self.spread(chunks, reg, &mut queue, &mut touched, wx + 1, n.y, wz, level);
            self.spread(chunks, reg, &mut queue, &mut touched, wx, n.y, wz - 1, level);
            self.spread(chunks, reg, &mut queue, &mut touched, wx, n.y, wz + 1, level);
            // Vertical neighbors never cross chunks.
            if n.y > 0 {
                self.spread(chunks, reg, &mut queue, &mut touched, wx, n.y - 1, wz, level);
            }
            if n.y + 1 < self.sy {
                self.spread(chunks, reg, &mut queue, &mut touched, wx, n.y + 1, wz, level);
            }
        }

        log::debug!(
            target: "light",
            "block light set chunk=({},{}) local=({x},{y},{z}) value={value} nodes={nodes} chunks={}",
            coord.cx,
            coord.cz,
            touched.len()
        );

        for c in touched {
            for region in 0..CHUNK_SPLITS {
                invalidator.invalidate_region(c, region);
            }
        }
    }

    /// One candidate step of the fill: decay `level` into the voxel at world
    /// position (wx, y, wz) if a chunk is loaded there and the voxel accepts
    /// the light.
    #[allow(clippy::too_many_arguments)]
    fn spread<C: ChunkSource>(
        &mut self,
        chunks: &C,
        reg: &BlockRegistry,
        queue: &mut LightQueue,
        touched: &mut Vec<ChunkCoord>,
        wx: i32,
        y: usize,
        wz: i32,
        level: u8,
    ) {
        if level <= MIN_LIGHT_LEVEL {
            return;
        }
        // Unloaded neighbor: the fill stops at the world edge.
        let Some(chunk) = chunks.chunk_at_world(wx, wz) else {
            return;
        };
        let lx = wx.rem_euclid(self.sx as i32) as usize;
        let lz = wz.rem_euclid(self.sz as i32) as usize;
        // Opaque voxels absorb light.
        if !light_passable(chunk.get_local(lx, y, lz), reg) {
            return;
        }
        let target = chunk.coord;
        let Some(map) = self.maps.get_mut(&target) else {
            return;
        };
        if map.block_light(lx, y, lz) + MIN_LIGHT_LEVEL <= level {
            map.set_block_light(lx, y, lz, level - 1);
            queue.push(lx, y, lz, target);
            if !touched.contains(&target) {
                touched.push(target);
            }
        }
    }
}
