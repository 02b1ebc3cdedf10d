use glimmer_blocks::config::{BlockDef, BlocksConfig};
use glimmer_blocks::{Block, BlockRegistry};
use glimmer_chunk::{Chunk, ChunkCoord, ChunkMap};
use glimmer_lighting::{LightingStore, MAX_LIGHT_LEVEL};
use proptest::prelude::*;

fn air_only_registry() -> BlockRegistry {
    BlockRegistry::from_config(BlocksConfig {
        blocks: vec![BlockDef {
            name: "air".into(),
            id: Some(0),
            solid: Some(false),
            blocks_skylight: Some(false),
            propagates_light: Some(true),
            emission: None,
        }],
        unknown_block: None,
    })
    .unwrap()
}

fn dims() -> impl Strategy<Value = (usize, usize, usize)> {
    (4usize..=6, 2usize..=5, 4usize..=6)
}

fn edits(
    sx: usize,
    sy: usize,
    sz: usize,
) -> impl Strategy<Value = Vec<(usize, usize, usize, u8)>> {
    prop::collection::vec(
        (0..sx, 0..sy, 0..sz, 0u8..=MAX_LIGHT_LEVEL),
        1..12,
    )
}

proptest! {
    // Any sequence of valid placements keeps every stored value, on both
    // channels, within [0, MAX_LIGHT_LEVEL].
    #[test]
    fn levels_stay_in_range(((sx, sy, sz), ops) in dims().prop_flat_map(|d| {
        let (sx, sy, sz) = d;
        edits(sx, sy, sz).prop_map(move |ops| (d, ops))
    })) {
        let reg = air_only_registry();
        let coord = ChunkCoord::new(0, 0);
        let mut chunks = ChunkMap::new(sx, sz);
        chunks.insert(Chunk::filled(coord, sx, sy, sz, Block::AIR));
        let mut store = LightingStore::new(sx, sy, sz);
        store.init_chunk(coord);

        for (x, y, z, value) in ops {
            store.set_block_light(&chunks, &reg, coord, x, y, z, value, &mut ());
        }

        for y in 0..sy {
            for z in 0..sz {
                for x in 0..sx {
                    prop_assert!(store.block_light(coord, x, y, z) <= MAX_LIGHT_LEVEL);
                    // The block-light fill never writes the global channel.
                    prop_assert_eq!(store.global_light(coord, x, y, z), 0);
                }
            }
        }
    }

    // A single seed in an all-transparent chunk produces exactly
    // max(0, L - manhattan distance) everywhere.
    #[test]
    fn single_seed_matches_distance_decay(
        (sx, sy, sz) in dims(),
        seed_bits in (0.0f64..1.0, 0.0f64..1.0, 0.0f64..1.0),
        value in 1u8..=MAX_LIGHT_LEVEL,
    ) {
        let (fx, fy, fz) = seed_bits;
        let seed = (
            ((sx as f64) * fx) as usize % sx,
            ((sy as f64) * fy) as usize % sy,
            ((sz as f64) * fz) as usize % sz,
        );
        let reg = air_only_registry();
        let coord = ChunkCoord::new(0, 0);
        let mut chunks = ChunkMap::new(sx, sz);
        chunks.insert(Chunk::filled(coord, sx, sy, sz, Block::AIR));
        let mut store = LightingStore::new(sx, sy, sz);
        store.init_chunk(coord);

        store.set_block_light(&chunks, &reg, coord, seed.0, seed.1, seed.2, value, &mut ());

        for y in 0..sy {
            for z in 0..sz {
                for x in 0..sx {
                    let d = (x as i32 - seed.0 as i32).abs()
                        + (y as i32 - seed.1 as i32).abs()
                        + (z as i32 - seed.2 as i32).abs();
                    let expected = (value as i32 - d).max(0) as u8;
                    prop_assert_eq!(store.block_light(coord, x, y, z), expected);
                }
            }
        }
    }

    // A seed on the +X edge reaches the adjacent loaded chunk's mirrored edge
    // with exactly one level of decay.
    #[test]
    fn seam_mirror_loses_one_level(
        (sx, sy, sz) in dims(),
        y_frac in 0.0f64..1.0,
        z_frac in 0.0f64..1.0,
        value in 1u8..=MAX_LIGHT_LEVEL,
    ) {
        let y = ((sy as f64) * y_frac) as usize % sy;
        let z = ((sz as f64) * z_frac) as usize % sz;
        let reg = air_only_registry();
        let home = ChunkCoord::new(0, 0);
        let east = ChunkCoord::new(1, 0);
        let mut chunks = ChunkMap::new(sx, sz);
        let mut store = LightingStore::new(sx, sy, sz);
        for coord in [home, east] {
            chunks.insert(Chunk::filled(coord, sx, sy, sz, Block::AIR));
            store.init_chunk(coord);
        }

        store.set_block_light(&chunks, &reg, home, sx - 1, y, z, value, &mut ());

        prop_assert_eq!(store.block_light(home, sx - 1, y, z), value);
        prop_assert_eq!(store.block_light(east, 0, y, z), value - 1);
    }
}
