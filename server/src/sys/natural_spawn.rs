use crate::{
    level::{ChunkAccess, ChunkGetter, Level},
    settings::GameRules,
    spawn::NaturalSpawner,
};
use common::{
    resources::Tick,
    terrain::{TerrainChunkSize, TERRAIN_CHUNK_BLOCKS_LG},
    CategoryCounts,
};
use hashbrown::HashSet;
use rand::{seq::SliceRandom, Rng};
use std::time::Instant;
use tracing::trace;
use vek::*;

/// What a spawning tick did.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SpawnReport {
    /// Chunks spawning was attempted in.
    pub chunks: usize,
    pub spawned: CategoryCounts,
}

/// The loaded chunks close enough to a player to spawn mobs in, ordered by
/// key.
pub fn spawnable_chunks<L: Level>(level: &L, radius: i32) -> Vec<L::Chunk> {
    let mut keys = HashSet::new();
    for player in level.players() {
        let centre = TerrainChunkSize::pos_key(player.xy().map(|e| e.floor() as i32));
        for dy in -radius..=radius {
            for dx in -radius..=radius {
                keys.insert(centre + Vec2::new(dx, dy));
            }
        }
    }
    let mut keys = keys
        .into_iter()
        .filter(|key| level.is_natural_spawning_allowed(*key))
        .collect::<Vec<_>>();
    keys.sort_unstable_by_key(|key| (key.x, key.y));
    keys.into_iter().filter_map(|key| level.chunk(key)).collect()
}

/// Runs natural spawning for one tick of the world.
pub fn tick<L: Level, R: Rng + ?Sized>(
    level: &mut L,
    spawner: &NaturalSpawner,
    rules: &GameRules,
    tick: Tick,
    rng: &mut R,
) -> SpawnReport {
    let start = Instant::now();
    let settings = spawner.settings();

    let mut chunks = spawnable_chunks(level, settings.spawn_chunk_radius);
    let mut state = spawner.create_state(
        chunks.len() as u32,
        level.entities(),
        &*level,
        spawner.new_local_cap(),
    );

    let spawn_persistent = tick.0 % settings.persistent_spawn_interval.max(1) == 0;
    let spawn_monsters = rules.spawn_monsters && level.difficulty().allows_monsters();
    let spawn_friendlies = rules.spawn_friendlies;

    let mut report = SpawnReport::default();
    let categories = spawner.filtered_spawning_categories(
        &state,
        spawn_friendlies,
        spawn_monsters,
        spawn_persistent,
    );
    if rules.do_mob_spawning && !categories.is_empty() {
        chunks.shuffle(rng);
        for chunk in &chunks {
            let centre = TerrainChunkSize::key_to_wpos(chunk.key())
                + (1 << (TERRAIN_CHUNK_BLOCKS_LG - 1));
            if !level.is_within_world_border(centre.with_z(level.sea_level())) {
                continue;
            }
            report.chunks += 1;
            let placed = spawner.spawn_for_chunk(
                level,
                chunk,
                &mut state,
                rng,
                spawn_friendlies,
                spawn_monsters,
                spawn_persistent,
            );
            for (category, n) in placed.iter() {
                report.spawned.add(category, n);
            }
        }
    }

    trace!(
        spawnable = chunks.len(),
        chunks = report.chunks,
        spawned = report.spawned.total(),
        elapsed = ?start.elapsed(),
        "Natural spawning tick"
    );
    report
}
