use super::{local_cap::LocalMobCapCalculator, potential::PotentialCalculator};
use crate::level::ChunkAccess;
use common::{mob::MobCategory, terrain::TerrainChunkSize, CategoryCounts, Entity, EntityType};
use std::sync::Arc;
use vek::*;

/// Divisor of the global category cap: the area, in chunks, of the spawning
/// neighbourhood of a single player.
pub const MAGIC_NUMBER: u32 = 17 * 17;

/// Per-tick spawning bookkeeping. Built once per tick by
/// [`super::NaturalSpawner::create_state`] and dropped at the end of it.
#[derive(Clone, Debug)]
pub struct SpawnState {
    spawnable_chunk_count: u32,
    chunk_area_divisor: u32,
    mob_category_counts: CategoryCounts,
    spawn_potential: PotentialCalculator,
    local_mob_cap: LocalMobCapCalculator,
    last_checked_pos: Option<Vec3<i32>>,
    last_checked_type: Option<Arc<EntityType>>,
    last_charge: f64,
}

impl SpawnState {
    pub fn new(
        spawnable_chunk_count: u32,
        mob_category_counts: CategoryCounts,
        spawn_potential: PotentialCalculator,
        local_mob_cap: LocalMobCapCalculator,
    ) -> Self {
        Self {
            spawnable_chunk_count,
            chunk_area_divisor: MAGIC_NUMBER,
            mob_category_counts,
            spawn_potential,
            local_mob_cap,
            last_checked_pos: None,
            last_checked_type: None,
            last_charge: 0.0,
        }
    }

    pub fn with_chunk_area_divisor(mut self, divisor: u32) -> Self {
        self.chunk_area_divisor = divisor.max(1);
        self
    }

    pub fn spawnable_chunk_count(&self) -> u32 { self.spawnable_chunk_count }

    pub fn mob_category_counts(&self) -> &CategoryCounts { &self.mob_category_counts }

    pub fn spawn_potential(&self) -> &PotentialCalculator { &self.spawn_potential }

    pub fn local_mob_cap(&self) -> &LocalMobCapCalculator { &self.local_mob_cap }

    /// The global population ceiling of a category this tick.
    pub fn category_cap(&self, category: MobCategory) -> u32 {
        (category.max_instances_per_chunk() as u64 * self.spawnable_chunk_count as u64
            / self.chunk_area_divisor as u64) as u32
    }

    /// Whether the global and local caps of the category both have headroom
    /// at the given chunk.
    pub fn can_spawn_for_category(&self, category: MobCategory, key: Vec2<i32>) -> bool {
        self.mob_category_counts.get(category) < self.category_cap(category)
            && self.local_mob_cap.can_spawn(category, key)
    }

    /// The density check: whether placing a mob of the kind at `pos` keeps
    /// the potential energy within its biome's budget. Kinds without a spawn
    /// cost are always accepted.
    pub fn can_spawn<C: ChunkAccess>(
        &mut self,
        kind: &Arc<EntityType>,
        pos: Vec3<i32>,
        chunk: &C,
    ) -> bool {
        self.last_checked_pos = Some(pos);
        self.last_checked_type = Some(Arc::clone(kind));
        match chunk.biome(pos).spawn_settings.spawn_cost(&kind.id) {
            None => {
                self.last_charge = 0.0;
                true
            },
            Some(cost) => {
                self.last_charge = cost.charge;
                let energy = self
                    .spawn_potential
                    .potential_energy_change(pos, cost.charge);
                energy <= cost.energy_budget
            },
        }
    }

    /// Records a freshly spawned mob so later attempts this tick see it.
    pub fn after_spawn<C: ChunkAccess>(&mut self, entity: &Entity, chunk: &C) {
        let pos = entity.block_pos();
        let same_as_checked = self.last_checked_pos == Some(pos)
            && self
                .last_checked_type
                .as_ref()
                .is_some_and(|kind| Arc::ptr_eq(kind, &entity.kind));
        let charge = if same_as_checked {
            self.last_charge
        } else {
            chunk
                .biome(pos)
                .spawn_settings
                .spawn_cost(&entity.kind.id)
                .map_or(0.0, |cost| cost.charge)
        };
        self.spawn_potential.add_charge(pos, charge);

        let category = entity.category();
        self.mob_category_counts.add(category, 1);
        self.local_mob_cap.add_mob(TerrainChunkSize::block_key(pos), category);
    }
}
