//! Chunk storage and the world-coordinate chunk index.
#![forbid(unsafe_code)]

use glimmer_blocks::Block;
use hashbrown::HashMap;

/// Render sub-regions per chunk, rebuilt independently.
pub const CHUNK_SPLITS: usize = 4;

/// Column coordinate of a chunk. Chunks span the full world height, so there
/// is no vertical component.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct ChunkCoord {
    pub cx: i32,
    pub cz: i32,
}

impl ChunkCoord {
    #[inline]
    pub const fn new(cx: i32, cz: i32) -> Self {
        Self { cx, cz }
    }

    #[inline]
    pub fn offset(self, dx: i32, dz: i32) -> Self {
        Self {
            cx: self.cx + dx,
            cz: self.cz + dz,
        }
    }
}

impl From<(i32, i32)> for ChunkCoord {
    fn from(value: (i32, i32)) -> Self {
        Self::new(value.0, value.1)
    }
}

impl From<ChunkCoord> for (i32, i32) {
    fn from(value: ChunkCoord) -> Self {
        (value.cx, value.cz)
    }
}

#[derive(Clone, Debug)]
pub struct Chunk {
    pub coord: ChunkCoord,
    pub sx: usize,
    pub sy: usize,
    pub sz: usize,
    pub blocks: Vec<Block>,
}

impl Chunk {
    #[inline]
    pub fn idx(&self, x: usize, y: usize, z: usize) -> usize {
        (y * self.sz + z) * self.sx + x
    }

    #[inline]
    pub fn get_local(&self, x: usize, y: usize, z: usize) -> Block {
        self.blocks[self.idx(x, y, z)]
    }

    #[inline]
    pub fn set_local(&mut self, x: usize, y: usize, z: usize, b: Block) {
        let i = self.idx(x, y, z);
        self.blocks[i] = b;
    }

    #[inline]
    pub fn base_x(&self) -> i32 {
        self.coord.cx * self.sx as i32
    }

    #[inline]
    pub fn base_z(&self) -> i32 {
        self.coord.cz * self.sz as i32
    }

    pub fn from_blocks_local(
        coord: ChunkCoord,
        sx: usize,
        sy: usize,
        sz: usize,
        blocks: Vec<Block>,
    ) -> Self {
        let mut b = blocks;
        let expect = sx * sy * sz;
        if b.len() != expect {
            b.resize(expect, Block::AIR);
        }
        Chunk {
            coord,
            sx,
            sy,
            sz,
            blocks: b,
        }
    }

    pub fn filled(coord: ChunkCoord, sx: usize, sy: usize, sz: usize, b: Block) -> Self {
        Chunk {
            coord,
            sx,
            sy,
            sz,
            blocks: vec![b; sx * sy * sz],
        }
    }
}

/// World-coordinate chunk index. All chunks share the map's horizontal
/// dimensions, so a world position maps to exactly one column.
pub struct ChunkMap {
    sx: usize,
    sz: usize,
    chunks: HashMap<ChunkCoord, Chunk>,
}

impl ChunkMap {
    pub fn new(sx: usize, sz: usize) -> Self {
        Self {
            sx,
            sz,
            chunks: HashMap::new(),
        }
    }

    #[inline]
    pub fn coord_at_world(&self, wx: i32, wz: i32) -> ChunkCoord {
        ChunkCoord::new(
            wx.div_euclid(self.sx as i32),
            wz.div_euclid(self.sz as i32),
        )
    }

    pub fn insert(&mut self, chunk: Chunk) -> Option<Chunk> {
        self.chunks.insert(chunk.coord, chunk)
    }

    pub fn remove(&mut self, coord: ChunkCoord) -> Option<Chunk> {
        self.chunks.remove(&coord)
    }

    #[inline]
    pub fn get(&self, coord: ChunkCoord) -> Option<&Chunk> {
        self.chunks.get(&coord)
    }

    #[inline]
    pub fn get_mut(&mut self, coord: ChunkCoord) -> Option<&mut Chunk> {
        self.chunks.get_mut(&coord)
    }

    #[inline]
    pub fn chunk_at_world(&self, wx: i32, wz: i32) -> Option<&Chunk> {
        self.chunks.get(&self.coord_at_world(wx, wz))
    }

    pub fn coords(&self) -> impl Iterator<Item = ChunkCoord> + '_ {
        self.chunks.keys().copied()
    }

    pub fn len(&self) -> usize {
        self.chunks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flattening_is_unique_and_in_bounds() {
        let c = Chunk::filled(ChunkCoord::new(0, 0), 3, 4, 5, Block::AIR);
        let mut seen = vec![false; 3 * 4 * 5];
        for y in 0..4 {
            for z in 0..5 {
                for x in 0..3 {
                    let i = c.idx(x, y, z);
                    assert!(i < seen.len());
                    assert!(!seen[i]);
                    seen[i] = true;
                }
            }
        }
    }

    #[test]
    fn world_lookup_handles_negative_coords() {
        let mut map = ChunkMap::new(16, 16);
        map.insert(Chunk::filled(ChunkCoord::new(-1, 0), 16, 8, 16, Block::AIR));
        assert_eq!(map.coord_at_world(-1, 0), ChunkCoord::new(-1, 0));
        assert_eq!(map.coord_at_world(-16, 15), ChunkCoord::new(-1, 0));
        assert_eq!(map.coord_at_world(-17, 0), ChunkCoord::new(-2, 0));
        assert!(map.chunk_at_world(-1, 5).is_some());
        assert!(map.chunk_at_world(0, 5).is_none());
    }

    #[test]
    fn map_mutation_and_coord_ops() {
        let mut map = ChunkMap::new(8, 8);
        let origin = ChunkCoord::new(0, 0);
        let east = origin.offset(1, 0);
        assert_eq!(east, ChunkCoord::from((1, 0)));
        assert_eq!(<(i32, i32)>::from(east), (1, 0));
        map.insert(Chunk::filled(origin, 8, 4, 8, Block::AIR));
        map.insert(Chunk::filled(east, 8, 4, 8, Block::AIR));
        assert_eq!(map.len(), 2);
        map.get_mut(east).unwrap().set_local(0, 0, 0, Block::new(1));
        assert_eq!(map.get(east).unwrap().get_local(0, 0, 0), Block::new(1));
        assert!(map.remove(origin).is_some());
        assert!(!map.is_empty());
        assert_eq!(map.coords().count(), 1);
    }

    #[test]
    fn from_blocks_local_pads_short_input() {
        let c = Chunk::from_blocks_local(ChunkCoord::new(2, 3), 2, 2, 2, vec![Block::new(1); 3]);
        assert_eq!(c.blocks.len(), 8);
        assert_eq!(c.get_local(1, 1, 1), Block::AIR);
        assert_eq!(c.base_x(), 4);
        assert_eq!(c.base_z(), 6);
    }
}
