//! The world surface the natural spawner reads from and writes to.
//!
//! Positions are `z`-up: chunks are keyed by their `(x, y)` column and
//! heights are `z` coordinates.

use common::{
    resources::Difficulty,
    terrain::{Biome, Block, FluidKind, Heightmap, StructureKind, StructureStart},
    Entity, EntityRegistry,
};
use vek::*;

/// A loaded chunk.
pub trait ChunkAccess {
    fn key(&self) -> Vec2<i32>;

    /// The coarse biome at a position inside the chunk.
    fn biome(&self, pos: Vec3<i32>) -> &Biome;
}

/// Looks chunks up by key. Lookups are synchronous; a missing chunk is
/// simply skipped.
pub trait ChunkGetter {
    type Chunk: ChunkAccess + Clone;

    fn chunk(&self, key: Vec2<i32>) -> Option<Self::Chunk>;

    /// Runs `f` on the chunk with the given key, if it is loaded.
    fn query(&self, key: Vec2<i32>, f: impl FnOnce(&Self::Chunk)) {
        if let Some(chunk) = self.chunk(key) {
            f(&chunk);
        }
    }
}

pub trait StructureManager {
    fn structures(&self) -> &[StructureStart];

    /// A structure of the given kind whose bounds contain `pos`.
    fn structure_at(&self, pos: Vec3<i32>, kind: StructureKind) -> Option<&StructureStart> {
        self.structures()
            .iter()
            .find(|start| start.kind == kind && start.contains(pos))
    }

    /// A structure of the given kind with a piece containing `pos`.
    fn structure_with_piece_at(
        &self,
        pos: Vec3<i32>,
        kind: StructureKind,
    ) -> Option<&StructureStart> {
        self.structures()
            .iter()
            .find(|start| start.kind == kind && start.piece_contains(pos))
    }
}

pub trait ChunkGenerator {
    fn biome(&self, pos: Vec3<i32>) -> &Biome;
}

/// Strict overlap, boxes that only touch don't intersect.
pub fn aabbs_intersect(a: &Aabb<f64>, b: &Aabb<f64>) -> bool {
    a.min.x < b.max.x
        && b.min.x < a.max.x
        && a.min.y < b.max.y
        && b.min.y < a.max.y
        && a.min.z < b.max.z
        && b.min.z < a.max.z
}

/// The block positions an AABB touches.
pub fn aabb_blocks(aabb: &Aabb<f64>) -> impl Iterator<Item = Vec3<i32>> {
    let min = aabb.min.map(|e| e.floor() as i32);
    let max = aabb.max.map(|e| e.ceil() as i32);
    (min.z..max.z).flat_map(move |z| {
        (min.y..max.y).flat_map(move |y| (min.x..max.x).map(move |x| Vec3::new(x, y, z)))
    })
}

pub trait Level: ChunkGetter {
    fn registry(&self) -> &EntityRegistry;

    fn structure_manager(&self) -> &dyn StructureManager;

    fn chunk_generator(&self) -> &dyn ChunkGenerator;

    fn block(&self, pos: Vec3<i32>) -> Block;

    fn fluid(&self, pos: Vec3<i32>) -> FluidKind { self.block(pos).fluid() }

    /// Lowest buildable `z`.
    fn min_build_height(&self) -> i32;

    /// One above the highest buildable `z`.
    fn max_build_height(&self) -> i32;

    fn sea_level(&self) -> i32;

    /// Whether the dimension has a solid roof (the nether does).
    fn has_ceiling(&self) -> bool { false }

    fn difficulty(&self) -> Difficulty;

    fn sky_light(&self, pos: Vec3<i32>) -> u8;

    fn block_light(&self, pos: Vec3<i32>) -> u8;

    /// How much the current time of day and weather dim sky light.
    fn sky_darken(&self) -> u8 { 0 }

    fn raw_brightness(&self, pos: Vec3<i32>) -> u8 {
        self.sky_light(pos)
            .saturating_sub(self.sky_darken())
            .max(self.block_light(pos))
    }

    /// First free `z` above the column according to the given heightmap.
    fn height(&self, heightmap: Heightmap, x: i32, y: i32) -> i32;

    fn biome(&self, pos: Vec3<i32>) -> &Biome { self.chunk_generator().biome(pos) }

    fn players(&self) -> &[Vec3<f64>];

    fn nearest_player(&self, pos: Vec3<f64>) -> Option<Vec3<f64>> {
        self.players().iter().copied().min_by(|a, b| {
            a.distance_squared(pos)
                .partial_cmp(&b.distance_squared(pos))
                .unwrap_or(std::cmp::Ordering::Equal)
        })
    }

    fn shared_spawn_pos(&self) -> Vec3<i32>;

    /// Whether the chunk is loaded deeply enough to tick entities.
    fn is_natural_spawning_allowed(&self, key: Vec2<i32>) -> bool;

    fn is_within_world_border(&self, pos: Vec3<i32>) -> bool;

    /// Entities that ride nothing. Riders are reached through their vehicle's
    /// `passengers`.
    fn entities(&self) -> Box<dyn Iterator<Item = &Entity> + '_>;

    /// Adds the entity and its passengers to the world.
    fn add_entity(&mut self, entity: Entity);

    /// Whether nothing in the terrain collides with the box.
    fn no_collision(&self, aabb: &Aabb<f64>) -> bool {
        aabb_blocks(aabb).all(|pos| {
            !self.block(pos).is_solid()
                || !aabbs_intersect(aabb, &Aabb {
                    min: pos.as_(),
                    max: (pos + 1).as_(),
                })
        })
    }

    fn contains_any_liquid(&self, aabb: &Aabb<f64>) -> bool {
        aabb_blocks(aabb).any(|pos| !self.fluid(pos).is_empty())
    }

    /// Whether no entity that blocks building overlaps the box.
    fn is_unobstructed(&self, aabb: &Aabb<f64>) -> bool {
        self.entities()
            .filter(|e| e.kind.blocks_building)
            .all(|e| !aabbs_intersect(&e.aabb(), aabb))
    }
}
