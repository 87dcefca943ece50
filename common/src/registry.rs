use crate::{
    entity::{EntityType, SpawnPlacementType, SpawnRule, WalkPreference},
    mob::MobCategory,
};
use hashbrown::HashMap;
use std::sync::Arc;

/// Every entity type the server knows about, by identifier.
#[derive(Clone, Debug, Default)]
pub struct EntityRegistry {
    types: HashMap<String, Arc<EntityType>>,
}

impl EntityRegistry {
    pub fn new() -> Self { Self::default() }

    pub fn register(&mut self, kind: EntityType) -> Arc<EntityType> {
        let kind = Arc::new(kind);
        self.types.insert(kind.id.clone(), Arc::clone(&kind));
        kind
    }

    pub fn with(mut self, kind: EntityType) -> Self {
        self.register(kind);
        self
    }

    pub fn get(&self, id: &str) -> Option<&Arc<EntityType>> { self.types.get(id) }

    pub fn contains(&self, id: &str) -> bool { self.types.contains_key(id) }

    pub fn len(&self) -> usize { self.types.len() }

    pub fn is_empty(&self) -> bool { self.types.is_empty() }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<EntityType>> { self.types.values() }

    /// The stock set of overworld and nether mobs.
    pub fn vanilla() -> Self {
        use MobCategory::*;

        Self::new()
            // Monsters
            .with(EntityType::mob("zombie", Monster).with_size(0.6, 1.95))
            .with(EntityType::mob("skeleton", Monster).with_size(0.6, 1.99))
            .with(
                EntityType::mob("spider", Monster)
                    .with_size(1.4, 0.9)
                    .with_rider("skeleton", 0.01),
            )
            .with(EntityType::mob("creeper", Monster).with_size(0.6, 1.7))
            .with(EntityType::mob("enderman", Monster).with_size(0.6, 2.9))
            .with(
                EntityType::mob("drowned", Monster)
                    .with_size(0.6, 1.95)
                    .with_placement(SpawnPlacementType::InWater)
                    .with_spawn_rule(SpawnRule::DarkWater)
                    .with_walk_preference(WalkPreference::Neutral),
            )
            .with(
                EntityType::mob("pillager", Monster)
                    .with_size(0.6, 1.95)
                    .with_variants(4)
                    .with_leader(),
            )
            .with(
                EntityType::mob("blaze", Monster)
                    .with_size(0.6, 1.8)
                    .with_spawn_rule(SpawnRule::AnyLightMonster)
                    .with_walk_preference(WalkPreference::Neutral)
                    .fire_immune(),
            )
            .with(
                EntityType::mob("zombified_piglin", Monster)
                    .with_size(0.6, 1.95)
                    .with_spawn_rule(SpawnRule::AnyLightMonster)
                    .with_walk_preference(WalkPreference::Neutral)
                    .fire_immune(),
            )
            .with(
                EntityType::mob("wither_skeleton", Monster)
                    .with_size(0.7, 2.4)
                    .fire_immune(),
            )
            .with(
                EntityType::mob("magma_cube", Monster)
                    .with_size(1.04, 1.04)
                    .with_spawn_rule(SpawnRule::AnyLightMonster)
                    .with_walk_preference(WalkPreference::Neutral)
                    .with_variants(3)
                    .fire_immune(),
            )
            .with(
                EntityType::mob("ghast", Monster)
                    .with_size(4.0, 4.0)
                    .with_spawn_rule(SpawnRule::AnyLightMonster)
                    .with_walk_preference(WalkPreference::Neutral)
                    .with_max_spawn_cluster_size(1)
                    .fire_immune(),
            )
            // Creatures
            .with(
                EntityType::mob("sheep", Creature)
                    .with_size(0.9, 1.3)
                    .with_variants(16),
            )
            .with(EntityType::mob("pig", Creature).with_size(0.9, 0.9))
            .with(EntityType::mob("chicken", Creature).with_size(0.4, 0.7))
            .with(EntityType::mob("cow", Creature).with_size(0.9, 1.4))
            // Ambient
            .with(
                EntityType::mob("bat", Ambient)
                    .with_size(0.5, 0.9)
                    .with_spawn_rule(SpawnRule::Ambient),
            )
            // Water
            .with(EntityType::mob("squid", WaterCreature).with_size(0.8, 0.8))
            .with(
                EntityType::mob("cod", WaterAmbient)
                    .with_size(0.5, 0.3)
                    .with_max_spawn_cluster_size(8)
                    .with_max_group_size(8),
            )
            // Not mobs
            .with(EntityType::object("item"))
            .with(
                EntityType::object("boat")
                    .with_size(1.375, 0.5625)
                    .blocks_building(),
            )
            .with(EntityType::object("marker").not_summonable())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vanilla_covers_default_biomes() {
        use crate::terrain::{structure::FORTRESS_ENEMIES, Biome};

        let registry = EntityRegistry::vanilla();
        let biomes = [
            Biome::grassland(),
            Biome::ocean(),
            Biome::river(),
            Biome::nether_wastes(),
            Biome::soul_sand_valley(),
        ];
        for biome in &biomes {
            for table in biome.spawn_settings.spawners.values() {
                for data in table.iter() {
                    assert!(registry.contains(&data.kind), "missing {}", data.kind);
                }
            }
        }
        for data in FORTRESS_ENEMIES.iter() {
            assert!(registry.contains(&data.kind), "missing {}", data.kind);
        }
    }

    #[test]
    fn riders_are_registered() {
        let registry = EntityRegistry::vanilla();
        for kind in registry.iter() {
            if let Some(rider) = &kind.rider {
                assert!(registry.contains(&rider.kind));
            }
        }
    }

    #[test]
    fn register_replaces() {
        let mut registry = EntityRegistry::new();
        registry.register(EntityType::mob("zombie", MobCategory::Monster));
        registry.register(EntityType::mob("zombie", MobCategory::Monster).with_size(1.0, 1.0));
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.get("zombie").map(|k| k.width), Some(1.0));
    }
}
