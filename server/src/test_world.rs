//! An in-memory world for exercising the spawner without a real server.

use crate::level::{ChunkAccess, ChunkGenerator, ChunkGetter, Level, StructureManager};
use common::{
    resources::Difficulty,
    terrain::{Biome, Block, BlockKind, Heightmap, StructureStart, TerrainChunkSize},
    Entity, EntityRegistry,
};
use hashbrown::HashMap;
use std::{ops::Range, sync::Arc};
use vek::*;

#[derive(Clone, Debug)]
pub struct TestChunk {
    key: Vec2<i32>,
    biome: Arc<Biome>,
}

impl ChunkAccess for TestChunk {
    fn key(&self) -> Vec2<i32> { self.key }

    fn biome(&self, _pos: Vec3<i32>) -> &Biome { &self.biome }
}

/// One biome per chunk, falling back to a world-wide default.
pub struct TestBiomes {
    default: Arc<Biome>,
    chunks: HashMap<Vec2<i32>, Arc<Biome>>,
}

impl TestBiomes {
    fn at_key(&self, key: Vec2<i32>) -> &Arc<Biome> {
        self.chunks.get(&key).unwrap_or(&self.default)
    }
}

impl ChunkGenerator for TestBiomes {
    fn biome(&self, pos: Vec3<i32>) -> &Biome { self.at_key(TerrainChunkSize::block_key(pos)) }
}

#[derive(Default)]
pub struct TestStructures(Vec<StructureStart>);

impl StructureManager for TestStructures {
    fn structures(&self) -> &[StructureStart] { &self.0 }
}

pub struct TestWorld {
    pub registry: EntityRegistry,
    biomes: TestBiomes,
    structures: TestStructures,
    /// Horizontal slabs of a single block kind, later ones on top.
    layers: Vec<(Range<i32>, Block)>,
    blocks: HashMap<Vec3<i32>, Block>,
    block_lights: HashMap<Vec3<i32>, u8>,
    pub min_build_height: i32,
    pub max_build_height: i32,
    pub sea_level: i32,
    pub has_ceiling: bool,
    pub difficulty: Difficulty,
    /// Sky light at and above the surface, none below it.
    pub sky_light: u8,
    pub sky_darken: u8,
    pub players: Vec<Vec3<f64>>,
    pub spawn_pos: Vec3<i32>,
    /// Chunks within this many chunks of the origin are loaded.
    pub loaded_radius: i32,
    /// Half the side of the square world border, in blocks.
    pub border_radius: i32,
    pub entities: Vec<Entity>,
}

impl TestWorld {
    /// An empty, dark world of air.
    pub fn new(biome: Biome) -> Self {
        Self {
            registry: EntityRegistry::vanilla(),
            biomes: TestBiomes {
                default: Arc::new(biome),
                chunks: HashMap::new(),
            },
            structures: TestStructures::default(),
            layers: Vec::new(),
            blocks: HashMap::new(),
            block_lights: HashMap::new(),
            min_build_height: -64,
            max_build_height: 320,
            sea_level: 63,
            has_ceiling: false,
            difficulty: Difficulty::Normal,
            sky_light: 0,
            sky_darken: 0,
            players: Vec::new(),
            spawn_pos: Vec3::new(100_000, 100_000, 64),
            loaded_radius: 16,
            border_radius: 29_999_984,
            entities: Vec::new(),
        }
    }

    /// A world filled with `kind` from the bottom up to, but excluding, `top`.
    pub fn flat(biome: Biome, kind: BlockKind, top: i32) -> Self {
        let mut world = Self::new(biome);
        let bottom = world.min_build_height;
        world.with_layer(bottom..top, kind)
    }

    pub fn with_layer(mut self, z: Range<i32>, kind: BlockKind) -> Self {
        self.layers.push((z, Block::new(kind)));
        self
    }

    pub fn with_chunk_biome(mut self, key: Vec2<i32>, biome: Biome) -> Self {
        self.biomes.chunks.insert(key, Arc::new(biome));
        self
    }

    pub fn with_structure(mut self, start: StructureStart) -> Self {
        self.structures.0.push(start);
        self
    }

    pub fn with_player(mut self, pos: Vec3<f64>) -> Self {
        self.players.push(pos);
        self
    }

    pub fn with_sky_light(mut self, sky_light: u8) -> Self {
        self.sky_light = sky_light;
        self
    }

    pub fn set_block(&mut self, pos: Vec3<i32>, kind: BlockKind) {
        self.blocks.insert(pos, Block::new(kind));
    }

    pub fn set_block_light(&mut self, pos: Vec3<i32>, light: u8) {
        self.block_lights.insert(pos, light);
    }

    pub fn is_loaded(&self, key: Vec2<i32>) -> bool {
        key.x.abs() <= self.loaded_radius && key.y.abs() <= self.loaded_radius
    }

    /// Entities whose kind has the given id.
    pub fn count_kind(&self, id: &str) -> usize {
        self.entities.iter().filter(|e| e.kind.id == id).count()
    }
}

impl ChunkGetter for TestWorld {
    type Chunk = TestChunk;

    fn chunk(&self, key: Vec2<i32>) -> Option<TestChunk> {
        self.is_loaded(key).then(|| TestChunk {
            key,
            biome: Arc::clone(self.biomes.at_key(key)),
        })
    }
}

impl Level for TestWorld {
    fn registry(&self) -> &EntityRegistry { &self.registry }

    fn structure_manager(&self) -> &dyn StructureManager { &self.structures }

    fn chunk_generator(&self) -> &dyn ChunkGenerator { &self.biomes }

    fn block(&self, pos: Vec3<i32>) -> Block {
        if pos.z < self.min_build_height || pos.z >= self.max_build_height {
            return Block::air();
        }
        if let Some(block) = self.blocks.get(&pos) {
            return *block;
        }
        self.layers
            .iter()
            .rev()
            .find(|(z, _)| z.contains(&pos.z))
            .map_or(Block::air(), |(_, block)| *block)
    }

    fn min_build_height(&self) -> i32 { self.min_build_height }

    fn max_build_height(&self) -> i32 { self.max_build_height }

    fn sea_level(&self) -> i32 { self.sea_level }

    fn has_ceiling(&self) -> bool { self.has_ceiling }

    fn difficulty(&self) -> Difficulty { self.difficulty }

    fn sky_light(&self, pos: Vec3<i32>) -> u8 {
        if !self.has_ceiling && pos.z >= self.height(Heightmap::WorldSurface, pos.x, pos.y) {
            self.sky_light
        } else {
            0
        }
    }

    fn block_light(&self, pos: Vec3<i32>) -> u8 {
        self.block_lights.get(&pos).copied().unwrap_or(0)
    }

    fn sky_darken(&self) -> u8 { self.sky_darken }

    fn height(&self, heightmap: Heightmap, x: i32, y: i32) -> i32 {
        (self.min_build_height..self.max_build_height)
            .rev()
            .find(|z| heightmap.is_opaque(self.block(Vec3::new(x, y, *z))))
            .map_or(self.min_build_height, |z| z + 1)
    }

    fn players(&self) -> &[Vec3<f64>] { &self.players }

    fn shared_spawn_pos(&self) -> Vec3<i32> { self.spawn_pos }

    fn is_natural_spawning_allowed(&self, key: Vec2<i32>) -> bool { self.is_loaded(key) }

    fn is_within_world_border(&self, pos: Vec3<i32>) -> bool {
        pos.x.abs() < self.border_radius && pos.y.abs() < self.border_radius
    }

    fn entities(&self) -> Box<dyn Iterator<Item = &Entity> + '_> { Box::new(self.entities.iter()) }

    fn add_entity(&mut self, entity: Entity) { self.entities.push(entity); }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flat_world_heights() {
        let world = TestWorld::flat(Biome::grassland(), BlockKind::Rock, 64)
            .with_layer(63..64, BlockKind::Grass);
        assert_eq!(world.block(Vec3::new(3, -7, 63)).kind(), BlockKind::Grass);
        assert_eq!(world.block(Vec3::new(3, -7, 62)).kind(), BlockKind::Rock);
        assert!(world.block(Vec3::new(3, -7, 64)).is_air());
        assert_eq!(world.height(Heightmap::WorldSurface, 3, -7), 64);
        assert_eq!(world.height(Heightmap::OceanFloor, 3, -7), 64);
    }

    #[test]
    fn sky_light_only_above_the_surface() {
        let mut world = TestWorld::flat(Biome::grassland(), BlockKind::Rock, 64).with_sky_light(15);
        assert_eq!(world.sky_light(Vec3::new(0, 0, 64)), 15);
        assert_eq!(world.sky_light(Vec3::new(0, 0, 40)), 0);
        world.set_block(Vec3::new(0, 0, 70), BlockKind::Rock);
        assert_eq!(world.sky_light(Vec3::new(0, 0, 64)), 0);
    }

    #[test]
    fn chunks_outside_the_loaded_area_are_missing() {
        let world = TestWorld::new(Biome::grassland());
        assert!(world.chunk(Vec2::new(16, -16)).is_some());
        assert!(world.chunk(Vec2::new(17, 0)).is_none());
    }
}
