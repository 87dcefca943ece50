//! Natural spawning of mobs around players and in freshly generated chunks.

pub mod local_cap;
pub mod placement;
pub mod potential;
pub mod state;
pub mod table;

// Reexports
pub use self::{
    local_cap::LocalMobCapCalculator,
    potential::PotentialCalculator,
    state::{SpawnState, MAGIC_NUMBER},
    table::{SpawnContext, SpawnTableResolver, SpawnTableResolvers},
};

use self::placement::{
    check_spawn_rules, is_spawn_position_ok, mob_check_spawn_obstruction, mob_check_spawn_rules,
};
use crate::{
    error::Error,
    level::{ChunkAccess, ChunkGetter, Level},
    settings::SpawnSettings,
};
use common::{
    entity::SpawnPlacementType,
    mob::MobCategory,
    terrain::{
        biome::MAX_CREATURE_PROBABILITY, block_pos, Biome, BiomeKind, Heightmap, SpawnTable,
        SpawnerData, TerrainChunkSize,
    },
    CategoryCounts, Entity, EntityRegistry, EntityType, SpawnGroupData,
};
use rand::Rng;
use std::sync::Arc;
use tracing::{debug, warn};
use vek::*;

/// Chance for a fish school in a river to be skipped.
const RIVER_WATER_AMBIENT_SKIP_CHANCE: f32 = 0.98;

/// Callbacks wired into a placement run: a veto on each candidate and a
/// notification for each placed mob.
pub trait SpawnHooks<C> {
    fn accept(&mut self, kind: &Arc<EntityType>, pos: Vec3<i32>, chunk: &C) -> bool;

    fn spawned(&mut self, entity: &Entity, chunk: &C);
}

/// The tick-time hooks: the category must still be under both caps at the
/// candidate's chunk, and the candidate must fit the density budget.
impl<C: ChunkAccess> SpawnHooks<C> for SpawnState {
    fn accept(&mut self, kind: &Arc<EntityType>, pos: Vec3<i32>, chunk: &C) -> bool {
        self.can_spawn_for_category(kind.category, TerrainChunkSize::block_key(pos))
            && self.can_spawn(kind, pos, chunk)
    }

    fn spawned(&mut self, entity: &Entity, chunk: &C) { self.after_spawn(entity, chunk); }
}

/// Instantiates a mob of the kind at `pos`.
pub fn mob_for_spawn(kind: &Arc<EntityType>, pos: Vec3<f64>) -> Result<Entity, Error> {
    if !kind.is_mob {
        return Err(Error::NotAMob(kind.id.clone()));
    }
    Ok(Entity::new(Arc::clone(kind), pos))
}

fn resolve_kind(registry: &EntityRegistry, id: &str) -> Result<Arc<EntityType>, Error> {
    registry
        .get(id)
        .cloned()
        .ok_or_else(|| Error::UnknownEntityKind(id.to_owned()))
}

/// Rolls the per-individual spawn data of a fresh mob and mounts its rider,
/// if one turns up. Returns the group data for the next member of the
/// cluster.
pub fn finalize_spawn<R: Rng + ?Sized>(
    registry: &EntityRegistry,
    entity: &mut Entity,
    rng: &mut R,
    group: Option<SpawnGroupData>,
) -> Option<SpawnGroupData> {
    let kind = Arc::clone(&entity.kind);
    let group = match entity.as_mob_mut() {
        Some(mob) => mob.finalize_spawn(&kind, rng, group),
        None => group,
    };

    if let Some(rider) = &kind.rider {
        if rng.gen::<f32>() < rider.chance {
            let passenger =
                resolve_kind(registry, &rider.kind).and_then(|k| mob_for_spawn(&k, entity.pos));
            match passenger {
                Ok(mut passenger) => {
                    let rider_kind = Arc::clone(&passenger.kind);
                    if let Some(mob) = passenger.as_mob_mut() {
                        mob.finalize_spawn(&rider_kind, rng, None);
                    }
                    entity.passengers.push(passenger);
                    entity.move_to(entity.pos, entity.yaw);
                },
                Err(e) => warn!(?e, "Failed to create rider"),
            }
        }
    }

    group
}

/// Block column position `pos` refers to, offset to the centre of the block.
fn column_centre(pos: Vec3<i32>) -> Vec3<f64> {
    Vec3::new(pos.x as f64 + 0.5, pos.y as f64 + 0.5, pos.z as f64)
}

/// Searches downward from the top of a column for the first position a mob
/// of the kind could stand at during chunk generation.
pub fn top_non_colliding_pos<L: Level>(level: &L, kind: &EntityType, x: i32, y: i32) -> Vec3<i32> {
    let min_z = level.min_build_height();
    let mut pos = Vec3::new(x, y, level.height(kind.heightmap(), x, y));

    if level.has_ceiling() {
        // Through the roof, then down to the floor
        loop {
            pos.z -= 1;
            if level.block(pos).is_air() || pos.z <= min_z {
                break;
            }
        }
        loop {
            pos.z -= 1;
            if !level.block(pos).is_air() || pos.z <= min_z {
                break;
            }
        }
    }

    if kind.placement == SpawnPlacementType::OnGround {
        let below = pos - Vec3::unit_z();
        if level.block(below).is_pathfindable() {
            return below;
        }
    }
    pos
}

/// The natural mob spawner. Holds only configuration, all per-tick state
/// lives in [`SpawnState`].
pub struct NaturalSpawner {
    settings: SpawnSettings,
    tables: SpawnTableResolvers,
}

impl NaturalSpawner {
    pub fn new(settings: SpawnSettings) -> Self {
        let tables = SpawnTableResolvers::new(&settings.structure_overrides);
        Self { settings, tables }
    }

    /// Adds a spawn table resolver ahead of the built-in ones.
    pub fn with_resolver(mut self, resolver: impl SpawnTableResolver + 'static) -> Self {
        self.tables = self.tables.with_resolver(resolver);
        self
    }

    pub fn settings(&self) -> &SpawnSettings { &self.settings }

    pub fn new_local_cap(&self) -> LocalMobCapCalculator {
        LocalMobCapCalculator::new(self.settings.local_cap_radius)
    }

    /// Builds the spawn state of a tick from every live entity, passengers
    /// included. Settled mobs and `Misc` entities don't count, nor do entities
    /// in unloaded chunks.
    pub fn create_state<'a, G: ChunkGetter>(
        &self,
        spawnable_chunk_count: u32,
        entities: impl IntoIterator<Item = &'a Entity>,
        chunk_getter: &G,
        mut local_cap: LocalMobCapCalculator,
    ) -> SpawnState {
        let mut potential = PotentialCalculator::new();
        let mut counts = CategoryCounts::default();

        for entity in entities.into_iter().flat_map(Entity::self_and_passengers) {
            if !entity.is_spawn_eligible() {
                continue;
            }
            let category = entity.category();
            let pos = entity.block_pos();
            chunk_getter.query(TerrainChunkSize::block_key(pos), |chunk| {
                if let Some(cost) = chunk.biome(pos).spawn_settings.spawn_cost(&entity.kind.id) {
                    potential.add_charge(pos, cost.charge);
                }
                if entity.as_mob().is_some() {
                    local_cap.add_mob(chunk.key(), category);
                }
                counts.add(category, 1);
            });
        }

        SpawnState::new(spawnable_chunk_count, counts, potential, local_cap)
            .with_chunk_area_divisor(self.settings.chunk_area_divisor)
    }

    /// Categories allowed by the flags whose global cap still has headroom.
    pub fn filtered_spawning_categories(
        &self,
        state: &SpawnState,
        spawn_friendlies: bool,
        spawn_monsters: bool,
        spawn_persistent: bool,
    ) -> Vec<MobCategory> {
        MobCategory::SPAWNING
            .iter()
            .copied()
            .filter(|c| {
                category_allowed(*c, spawn_friendlies, spawn_monsters, spawn_persistent)
                    && state.mob_category_counts().get(*c) < state.category_cap(*c)
            })
            .collect()
    }

    /// Runs one placement attempt per allowed category in the chunk.
    /// Returns the number of mobs placed per category.
    #[allow(clippy::too_many_arguments)]
    pub fn spawn_for_chunk<L: Level, R: Rng + ?Sized>(
        &self,
        level: &mut L,
        chunk: &L::Chunk,
        state: &mut SpawnState,
        rng: &mut R,
        spawn_friendlies: bool,
        spawn_monsters: bool,
        spawn_persistent: bool,
    ) -> CategoryCounts {
        let mut placed = CategoryCounts::default();
        for category in MobCategory::SPAWNING {
            if category_allowed(category, spawn_friendlies, spawn_monsters, spawn_persistent)
                && state.can_spawn_for_category(category, chunk.key())
            {
                let n = self.spawn_category_for_chunk(category, level, chunk, rng, state);
                placed.add(category, n);
            }
        }
        placed
    }

    /// Picks a random position in the chunk, below the surface, and tries to
    /// place mobs around it.
    pub fn spawn_category_for_chunk<L, R, H>(
        &self,
        category: MobCategory,
        level: &mut L,
        chunk: &L::Chunk,
        rng: &mut R,
        hooks: &mut H,
    ) -> u32
    where
        L: Level,
        R: Rng + ?Sized,
        H: SpawnHooks<L::Chunk>,
    {
        let pos = self.random_pos_within(level, chunk, rng);
        if pos.z < level.min_build_height() + 1 {
            return 0;
        }
        self.spawn_category_for_position(category, level, chunk, pos, rng, hooks)
    }

    fn random_pos_within<L: Level, R: Rng + ?Sized>(
        &self,
        level: &L,
        chunk: &L::Chunk,
        rng: &mut R,
    ) -> Vec3<i32> {
        let min = TerrainChunkSize::key_to_wpos(chunk.key());
        let size = TerrainChunkSize::RECT_SIZE.map(|e| e as i32);
        let x = min.x + rng.gen_range(0..size.x);
        let y = min.y + rng.gen_range(0..size.y);
        let min_z = level.min_build_height();
        let top = level.height(Heightmap::WorldSurface, x, y).max(min_z);
        Vec3::new(x, y, rng.gen_range(min_z..=top))
    }

    /// Places up to `packs_per_position` packs of mobs around `origin`.
    /// Returns how many mobs were placed.
    pub fn spawn_category_for_position<L, R, H>(
        &self,
        category: MobCategory,
        level: &mut L,
        chunk: &L::Chunk,
        origin: Vec3<i32>,
        rng: &mut R,
        hooks: &mut H,
    ) -> u32
    where
        L: Level,
        R: Rng + ?Sized,
        H: SpawnHooks<L::Chunk>,
    {
        if level.block(origin).is_redstone_conductor() {
            return 0;
        }

        let jitter = self.settings.pack_jitter.max(1);
        let mut placed = 0;
        for _ in 0..self.settings.packs_per_position {
            let mut pos = origin;
            let mut drawn: Option<(SpawnerData, Arc<EntityType>)> = None;
            let mut group = None;
            let mut pack_size = (rng.gen::<f32>() * 4.0).ceil() as u32;
            let mut pack_placed = 0;

            let mut i = 0;
            while i < pack_size {
                i += 1;
                pos.x += rng.gen_range(0..jitter) - rng.gen_range(0..jitter);
                pos.y += rng.gen_range(0..jitter) - rng.gen_range(0..jitter);
                let centre = column_centre(pos);

                let Some(player) = level.nearest_player(centre) else {
                    break;
                };
                let dist_sqr = player.distance_squared(centre);
                if !self.is_right_distance_to_player_and_spawn_point(level, chunk, pos, dist_sqr) {
                    continue;
                }

                if drawn.is_none() {
                    let Some(data) = self.random_spawn_mob_at(level, category, pos, rng) else {
                        break;
                    };
                    let kind = match resolve_kind(level.registry(), &data.kind) {
                        Ok(kind) => kind,
                        Err(e) => {
                            warn!(?e, "Failed to create mob");
                            return placed;
                        },
                    };
                    pack_size = data.min_count
                        + rng.gen_range(0..=data.max_count.saturating_sub(data.min_count));
                    drawn = Some((data, kind));
                }
                let Some((data, kind)) = &drawn else {
                    break;
                };

                if !self.is_valid_spawn_position_for_type(
                    level, category, data, kind, pos, dist_sqr, rng,
                ) || !hooks.accept(kind, pos, chunk)
                {
                    continue;
                }

                let mut entity = match mob_for_spawn(kind, centre) {
                    Ok(entity) => entity,
                    Err(e) => {
                        warn!(?e, "Failed to create mob");
                        return placed;
                    },
                };
                entity.move_to(centre, rng.gen::<f32>() * 360.0);
                if !is_valid_position_for_mob(level, &entity, dist_sqr) {
                    continue;
                }

                group = finalize_spawn(level.registry(), &mut entity, rng, group);
                placed += 1;
                pack_placed += 1;
                hooks.spawned(&entity, chunk);
                level.add_entity(entity);

                if placed >= kind.max_spawn_cluster_size {
                    debug!(%category, kind = %kind.id, ?origin, placed, "Spawn cluster full");
                    return placed;
                }
                if kind.is_max_group_size_reached(pack_placed) {
                    break;
                }
            }
        }
        if placed > 0 {
            debug!(%category, ?origin, placed, "Spawned mobs");
        }
        placed
    }

    fn is_right_distance_to_player_and_spawn_point<L: Level>(
        &self,
        level: &L,
        chunk: &L::Chunk,
        pos: Vec3<i32>,
        dist_sqr: f64,
    ) -> bool {
        if dist_sqr <= self.settings.min_player_distance_sqr() {
            return false;
        }
        let spawn_centre = level.shared_spawn_pos().map(|e| e as f64 + 0.5);
        if spawn_centre.distance_squared(column_centre(pos))
            < self.settings.spawn_protection_radius_sqr()
        {
            return false;
        }
        let key = TerrainChunkSize::block_key(pos);
        key == chunk.key() || level.is_natural_spawning_allowed(key)
    }

    /// The spawn table that applies at a position.
    pub fn mobs_at<'a, L: Level>(
        &'a self,
        level: &'a L,
        category: MobCategory,
        pos: Vec3<i32>,
    ) -> &'a SpawnTable {
        self.tables.mobs_at(&SpawnContext {
            category,
            pos,
            below: level.block(pos - Vec3::unit_z()),
            biome: level.biome(pos),
            structures: level.structure_manager(),
        })
    }

    fn random_spawn_mob_at<L: Level, R: Rng + ?Sized>(
        &self,
        level: &L,
        category: MobCategory,
        pos: Vec3<i32>,
        rng: &mut R,
    ) -> Option<SpawnerData> {
        if category == MobCategory::WaterAmbient
            && level.biome(pos).kind == BiomeKind::River
            && rng.gen::<f32>() < RIVER_WATER_AMBIENT_SKIP_CHANCE
        {
            return None;
        }
        self.mobs_at(level, category, pos)
            .lottery()
            .choose_with(rng)
            .cloned()
    }

    /// Whether the drawn entry is still available where the pack has moved.
    pub fn can_spawn_mob_at<L: Level>(
        &self,
        level: &L,
        category: MobCategory,
        data: &SpawnerData,
        pos: Vec3<i32>,
    ) -> bool {
        self.mobs_at(level, category, pos).contains(data)
    }

    #[allow(clippy::too_many_arguments)]
    fn is_valid_spawn_position_for_type<L: Level, R: Rng + ?Sized>(
        &self,
        level: &L,
        category: MobCategory,
        data: &SpawnerData,
        kind: &EntityType,
        pos: Vec3<i32>,
        dist_sqr: f64,
        rng: &mut R,
    ) -> bool {
        if kind.category == MobCategory::Misc {
            return false;
        }
        if !kind.can_spawn_far_from_player && dist_sqr > kind.category.despawn_distance_sqr() {
            return false;
        }
        if !kind.summonable || !self.can_spawn_mob_at(level, category, data, pos) {
            return false;
        }
        if !is_spawn_position_ok(kind.placement, level, pos, kind) {
            return false;
        }
        if !check_spawn_rules(kind, level, pos, rng) {
            return false;
        }
        level.no_collision(&kind.aabb_at(column_centre(pos)))
    }

    /// One-shot creature pass over a freshly generated chunk. Returns the
    /// number of mobs placed.
    pub fn spawn_mobs_for_chunk_generation<L: Level, R: Rng + ?Sized>(
        &self,
        level: &mut L,
        biome: &Biome,
        key: Vec2<i32>,
        rng: &mut R,
    ) -> u32 {
        let settings = &biome.spawn_settings;
        let table = settings.mobs(MobCategory::Creature);
        if table.is_empty() {
            return 0;
        }

        let min = TerrainChunkSize::key_to_wpos(key);
        let size = TerrainChunkSize::RECT_SIZE.map(|e| e as i32);
        let jitter = self.settings.chunk_generation_jitter.max(1);
        let probability = settings.creature_probability.min(MAX_CREATURE_PROBABILITY);
        let mut placed = 0;

        while rng.gen::<f32>() < probability {
            let Some(data) = table.lottery().choose_with(rng) else {
                continue;
            };
            let kind = match resolve_kind(level.registry(), &data.kind) {
                Ok(kind) => kind,
                Err(e) => {
                    warn!(?e, "Failed to create mob");
                    continue;
                },
            };
            let count =
                data.min_count + rng.gen_range(0..=data.max_count.saturating_sub(data.min_count));
            let mut group = None;
            let origin = min + Vec2::new(rng.gen_range(0..size.x), rng.gen_range(0..size.y));
            let mut column = origin;

            for _ in 0..count {
                let mut spawned = false;
                let mut attempt = 0;
                while !spawned && attempt < self.settings.chunk_generation_attempts {
                    attempt += 1;
                    let pos = top_non_colliding_pos(level, &kind, column.x, column.y);
                    if kind.summonable && is_spawn_position_ok(kind.placement, level, pos, &kind) {
                        let margin = kind.width as f64;
                        let lo = min.map(|e| e as f64 + margin);
                        let hi = min.map(|e| e as f64) + size.map(|e| e as f64) - margin;
                        let spawn_pos = Vec3::new(
                            (column.x as f64).max(lo.x).min(hi.x),
                            (column.y as f64).max(lo.y).min(hi.y),
                            pos.z as f64,
                        );
                        if !level.no_collision(&kind.aabb_at(spawn_pos))
                            || !check_spawn_rules(&kind, level, block_pos(spawn_pos), rng)
                        {
                            continue;
                        }
                        match mob_for_spawn(&kind, spawn_pos) {
                            Ok(mut entity) => {
                                entity.move_to(spawn_pos, rng.gen::<f32>() * 360.0);
                                if mob_check_spawn_rules(level, &entity)
                                    && mob_check_spawn_obstruction(level, &entity)
                                {
                                    group =
                                        finalize_spawn(level.registry(), &mut entity, rng, group);
                                    level.add_entity(entity);
                                    placed += 1;
                                    spawned = true;
                                }
                            },
                            Err(e) => {
                                warn!(?e, "Failed to create mob");
                                continue;
                            },
                        }
                    }

                    column += jitter_step(rng, jitter);
                    while !TerrainChunkSize::contains(key, column) {
                        column = origin + jitter_step(rng, jitter);
                    }
                }
            }
        }

        if placed > 0 {
            debug!(?key, biome = ?biome.kind, placed, "Populated generated chunk");
        }
        placed
    }
}

fn jitter_step<R: Rng + ?Sized>(rng: &mut R, jitter: i32) -> Vec2<i32> {
    Vec2::new(
        rng.gen_range(0..jitter) - rng.gen_range(0..jitter),
        rng.gen_range(0..jitter) - rng.gen_range(0..jitter),
    )
}

fn category_allowed(
    category: MobCategory,
    spawn_friendlies: bool,
    spawn_monsters: bool,
    spawn_persistent: bool,
) -> bool {
    (spawn_friendlies || !category.is_friendly())
        && (spawn_monsters || category.is_friendly())
        && (spawn_persistent || !category.is_persistent())
}

/// The mob's own last word on a position it has been moved to.
pub fn is_valid_position_for_mob<L: Level>(level: &L, entity: &Entity, dist_sqr: f64) -> bool {
    if dist_sqr > entity.category().despawn_distance_sqr() && entity.kind.remove_when_far_away {
        return false;
    }
    mob_check_spawn_rules(level, entity) && mob_check_spawn_obstruction(level, entity)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn category_gates() {
        use MobCategory::*;
        assert!(category_allowed(Monster, false, true, false));
        assert!(!category_allowed(Monster, true, false, true));
        assert!(!category_allowed(Creature, true, true, false));
        assert!(category_allowed(Creature, true, false, true));
        assert!(category_allowed(Ambient, true, false, false));
        assert!(!category_allowed(WaterAmbient, false, true, true));
    }

    #[test]
    fn non_mobs_cant_be_spawned() {
        let item = Arc::new(EntityType::object("item"));
        assert!(matches!(
            mob_for_spawn(&item, Vec3::zero()),
            Err(Error::NotAMob(kind)) if kind == "item"
        ));
        let zombie = Arc::new(EntityType::mob("zombie", MobCategory::Monster));
        let entity = mob_for_spawn(&zombie, Vec3::new(1.0, 2.0, 3.0)).unwrap();
        assert!(entity.as_mob().is_some());
    }

    #[test]
    fn unknown_kind() {
        let registry = EntityRegistry::vanilla();
        assert!(matches!(
            resolve_kind(&registry, "wolf"),
            Err(Error::UnknownEntityKind(kind)) if kind == "wolf"
        ));
    }

    #[test]
    fn rider_is_mounted() {
        let registry = EntityRegistry::vanilla();
        let spider = EntityType::mob("spider", MobCategory::Monster)
            .with_size(1.4, 0.9)
            .with_rider("skeleton", 1.0);
        let mut entity = Entity::new(Arc::new(spider), Vec3::new(0.5, 0.5, 64.0));
        let mut rng = rand::thread_rng();
        finalize_spawn(&registry, &mut entity, &mut rng, None);
        assert_eq!(entity.passengers.len(), 1);
        assert_eq!(entity.passengers[0].kind.id, "skeleton");
        assert!((entity.passengers[0].pos.z - 64.9).abs() < 1e-6);
        assert_eq!(entity.self_and_passengers().len(), 2);
    }
}
