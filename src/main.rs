use std::error::Error;
use std::path::PathBuf;

use clap::Parser;
use glimmer_blocks::{Block, BlockRegistry};
use glimmer_chunk::{Chunk, ChunkCoord, ChunkMap};
use glimmer_lighting::{LightingStore, MAX_LIGHT_LEVEL, RenderInvalidator};

const DEFAULT_BLOCKS: &str = include_str!("../assets/voxels/blocks.toml");

#[derive(Parser, Debug)]
#[command(name = "glimmer", about = "Voxel lighting engine demo")]
struct Args {
    /// Chunk width on x and z
    #[arg(long, default_value_t = 16)]
    width: usize,
    /// Chunk height
    #[arg(long, default_value_t = 8)]
    height: usize,
    /// Loaded chunk radius around the origin chunk
    #[arg(long, default_value_t = 1)]
    radius: i32,
    /// Light level to place; defaults to the torch block's emission
    #[arg(long)]
    level: Option<u8>,
    /// Path to a blocks.toml overriding the built-in registry
    #[arg(long)]
    blocks: Option<PathBuf>,
}

struct LoggingInvalidator {
    regions: usize,
}

impl RenderInvalidator for LoggingInvalidator {
    fn invalidate_region(&mut self, coord: ChunkCoord, region: usize) {
        self.regions += 1;
        log::debug!(
            target: "render",
            "rebuild requested chunk=({},{}) region={region}",
            coord.cx,
            coord.cz
        );
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    let reg = match &args.blocks {
        Some(path) => BlockRegistry::load_from_path(path)?,
        None => BlockRegistry::from_toml_str(DEFAULT_BLOCKS)?,
    };
    let air = reg
        .make_block_by_name("air")
        .ok_or("registry has no air block")?;
    let stone = reg
        .make_block_by_name("stone")
        .ok_or("registry has no stone block")?;
    let torch_emission = reg
        .id_by_name("torch")
        .and_then(|id| reg.get(id))
        .map(|ty| ty.emission)
        .unwrap_or(MAX_LIGHT_LEVEL);
    let level = args.level.unwrap_or(torch_emission);
    if level > MAX_LIGHT_LEVEL {
        return Err(format!("light level {level} above MAX_LIGHT_LEVEL ({MAX_LIGHT_LEVEL})").into());
    }

    let (sx, sy, sz) = (args.width, args.height, args.width);
    if sx == 0 || sy == 0 {
        return Err("chunk dimensions must be nonzero".into());
    }
    if args.radius < 0 {
        return Err("radius must be non-negative".into());
    }
    let mut chunks = ChunkMap::new(sx, sz);
    let mut store = LightingStore::new(sx, sy, sz);
    for cz in -args.radius..=args.radius {
        for cx in -args.radius..=args.radius {
            let coord = ChunkCoord::new(cx, cz);
            let mut chunk = Chunk::filled(coord, sx, sy, sz, air);
            for z in 0..sz {
                for x in 0..sx {
                    chunk.set_local(x, 0, z, stone);
                }
            }
            store.init_chunk(coord);
            store.seed_skylight(&chunk, &reg);
            chunks.insert(chunk);
        }
    }
    log::info!(
        "world ready: {} chunks of {sx}x{sy}x{sz}",
        chunks.len()
    );

    // Place the light on the origin chunk's -X edge, one block above the
    // floor, so the fill crosses into the western neighbor.
    let coord = ChunkCoord::new(0, 0);
    let (x, y, z) = (0, 1usize.min(sy - 1), sz / 2);
    let mut invalidator = LoggingInvalidator { regions: 0 };
    store.set_block_light(&chunks, &reg, coord, x, y, z, level, &mut invalidator);
    log::info!(
        "placed block light {level} at chunk=(0,0) local=({x},{y},{z}); {} render regions invalidated",
        invalidator.regions
    );

    print_slice(&chunks, &store, &reg, y);
    Ok(())
}

/// Dump one horizontal slice of the loaded world: block-light digits for
/// passable voxels, `#` for everything else.
fn print_slice(chunks: &ChunkMap, store: &LightingStore, reg: &BlockRegistry, y: usize) {
    println!("block light at y={y}:");
    let mut min_x = i32::MAX;
    let mut max_x = i32::MIN;
    let mut min_z = i32::MAX;
    let mut max_z = i32::MIN;
    for coord in chunks.coords() {
        let chunk = chunks.get(coord).expect("listed chunk");
        min_x = min_x.min(chunk.base_x());
        max_x = max_x.max(chunk.base_x() + chunk.sx as i32 - 1);
        min_z = min_z.min(chunk.base_z());
        max_z = max_z.max(chunk.base_z() + chunk.sz as i32 - 1);
    }
    for wz in min_z..=max_z {
        let mut line = String::new();
        for wx in min_x..=max_x {
            let Some(chunk) = chunks.chunk_at_world(wx, wz) else {
                line.push(' ');
                continue;
            };
            let lx = wx.rem_euclid(chunk.sx as i32) as usize;
            let lz = wz.rem_euclid(chunk.sz as i32) as usize;
            let b = chunk.get_local(lx, y, lz);
            let passable = b == Block::AIR
                || reg.get(b.id).map(|ty| ty.propagates_light).unwrap_or(false);
            if passable {
                let v = store.block_light(chunk.coord, lx, y, lz);
                line.push(char::from_digit(v as u32, 10).unwrap_or('?'));
            } else {
                line.push('#');
            }
        }
        println!("{line}");
    }
}
