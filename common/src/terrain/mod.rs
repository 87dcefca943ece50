pub mod biome;
pub mod block;
pub mod structure;

// Reexports
pub use self::{
    biome::{Biome, BiomeKind, BiomeSpawnSettings, MobSpawnCost, SpawnTable, SpawnerData},
    block::{Block, BlockKind, FluidKind},
    structure::{StructureKind, StructureStart},
};

use serde::{Deserialize, Serialize};
use vek::*;

// TerrainChunkSize

#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct TerrainChunkSize;

/// Base two logarithm of the number of blocks along either horizontal axis of
/// a chunk.
pub const TERRAIN_CHUNK_BLOCKS_LG: u32 = 4;

impl TerrainChunkSize {
    pub const RECT_SIZE: Vec2<u32> = Vec2 {
        x: 1 << TERRAIN_CHUNK_BLOCKS_LG,
        y: 1 << TERRAIN_CHUNK_BLOCKS_LG,
    };

    /// Key of the chunk containing the given block column.
    #[inline]
    pub fn pos_key(wpos: Vec2<i32>) -> Vec2<i32> { wpos.map(|e| e >> TERRAIN_CHUNK_BLOCKS_LG) }

    /// Key of the chunk containing the given block.
    #[inline]
    pub fn block_key(wpos: Vec3<i32>) -> Vec2<i32> { Self::pos_key(wpos.xy()) }

    /// World position of the lowest corner of the chunk column.
    #[inline]
    pub fn key_to_wpos(key: Vec2<i32>) -> Vec2<i32> {
        key.map(|e| e << TERRAIN_CHUNK_BLOCKS_LG)
    }

    /// Whether the given column lies inside the chunk with the given key.
    #[inline]
    pub fn contains(key: Vec2<i32>, wpos: Vec2<i32>) -> bool { Self::pos_key(wpos) == key }
}

/// Converts a continuous position into the position of the block it lies in.
/// As everywhere else, `z` is up.
#[inline]
pub fn block_pos(pos: Vec3<f64>) -> Vec3<i32> { pos.map(|e| e.floor() as i32) }

/// The height tracked per column of a chunk.
#[derive(Copy, Clone, Debug, Eq, Hash, PartialEq, Serialize, Deserialize)]
pub enum Heightmap {
    /// First air above the highest non-air block.
    WorldSurface,
    /// First free cell above the highest block that blocks motion or holds a
    /// fluid, ignoring leaves.
    MotionBlockingNoLeaves,
    /// First free cell above the highest solid block, ignoring fluids.
    OceanFloor,
}

impl Heightmap {
    /// Whether a block counts towards the height of this map.
    pub fn is_opaque(&self, block: Block) -> bool {
        match self {
            Heightmap::WorldSurface => !block.is_air(),
            Heightmap::MotionBlockingNoLeaves => {
                (block.is_solid() || block.is_liquid()) && block.kind() != BlockKind::Leaves
            },
            Heightmap::OceanFloor => block.is_solid(),
        }
    }
}
