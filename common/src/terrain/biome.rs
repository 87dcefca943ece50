use crate::{lottery::Lottery, mob::MobCategory};
use hashbrown::HashMap;
use serde::{Deserialize, Serialize};

#[derive(Copy, Clone, Debug, Eq, Hash, PartialEq, Serialize, Deserialize)]
pub enum BiomeKind {
    Void,
    Grassland,
    Ocean,
    River,
    Mountain,
    Snowlands,
    Desert,
    Swamp,
    Forest,
    NetherWastes,
    SoulSandValley,
}

/// One entry of a biome spawn table.
#[derive(Clone, Debug, Eq, Hash, PartialEq, Serialize, Deserialize)]
pub struct SpawnerData {
    /// Entity type identifier, see `EntityRegistry`.
    pub kind: String,
    pub weight: u32,
    pub min_count: u32,
    pub max_count: u32,
}

impl SpawnerData {
    pub fn new(kind: impl Into<String>, weight: u32, min_count: u32, max_count: u32) -> Self {
        let min_count = min_count.max(1);
        Self {
            kind: kind.into(),
            weight,
            min_count,
            max_count: max_count.max(min_count),
        }
    }
}

/// Density parameters for a mob type in a biome. Mobs with a cost repel new
/// spawns of the same biome's costed types.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MobSpawnCost {
    pub energy_budget: f64,
    pub charge: f64,
}

impl MobSpawnCost {
    pub fn new(energy_budget: f64, charge: f64) -> Self {
        Self {
            energy_budget,
            charge,
        }
    }
}

/// A weighted list of spawner entries.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "Vec<SpawnerData>", into = "Vec<SpawnerData>")]
pub struct SpawnTable(Lottery<SpawnerData>);

impl From<Vec<SpawnerData>> for SpawnTable {
    fn from(entries: Vec<SpawnerData>) -> Self {
        Self(Lottery::from(
            entries
                .into_iter()
                .map(|e| (e.weight as f32, e))
                .collect::<Vec<_>>(),
        ))
    }
}

impl From<SpawnTable> for Vec<SpawnerData> {
    fn from(table: SpawnTable) -> Self { table.iter().cloned().collect() }
}

impl SpawnTable {
    pub fn lottery(&self) -> &Lottery<SpawnerData> { &self.0 }

    pub fn iter(&self) -> impl Iterator<Item = &SpawnerData> { self.0.iter().map(|(_, e)| e) }

    pub fn contains(&self, data: &SpawnerData) -> bool { self.iter().any(|e| e == data) }

    pub fn is_empty(&self) -> bool { self.0.is_empty() }
}

pub const MAX_CREATURE_PROBABILITY: f32 = 0.999_999_9;

/// The mob settings of a biome: what spawns there naturally, and at which
/// density cost.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct BiomeSpawnSettings {
    /// Chance, repeated as a geometric series, of placing a creature pack when
    /// a chunk is generated.
    pub creature_probability: f32,
    pub spawners: HashMap<MobCategory, SpawnTable>,
    pub spawn_costs: HashMap<String, MobSpawnCost>,
}

impl Default for BiomeSpawnSettings {
    fn default() -> Self {
        Self {
            creature_probability: 0.1,
            spawners: HashMap::new(),
            spawn_costs: HashMap::new(),
        }
    }
}

lazy_static::lazy_static! {
    static ref EMPTY_TABLE: SpawnTable = SpawnTable::default();
}

impl BiomeSpawnSettings {
    /// Kept below 1, or chunk generation would never stop placing packs.
    pub fn with_creature_probability(mut self, probability: f32) -> Self {
        self.creature_probability = probability.clamp(0.0, MAX_CREATURE_PROBABILITY);
        self
    }

    pub fn with_spawner(mut self, category: MobCategory, data: SpawnerData) -> Self {
        let mut entries =
            Vec::<SpawnerData>::from(self.spawners.remove(&category).unwrap_or_default());
        entries.push(data);
        self.spawners.insert(category, SpawnTable::from(entries));
        self
    }

    pub fn with_spawn_cost(mut self, kind: impl Into<String>, cost: MobSpawnCost) -> Self {
        self.spawn_costs.insert(kind.into(), cost);
        self
    }

    pub fn mobs(&self, category: MobCategory) -> &SpawnTable {
        self.spawners.get(&category).unwrap_or(&EMPTY_TABLE)
    }

    pub fn spawn_cost(&self, kind: &str) -> Option<MobSpawnCost> {
        self.spawn_costs.get(kind).copied()
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Biome {
    pub kind: BiomeKind,
    pub spawn_settings: BiomeSpawnSettings,
}

impl Biome {
    pub fn new(kind: BiomeKind, spawn_settings: BiomeSpawnSettings) -> Self {
        Self {
            kind,
            spawn_settings,
        }
    }

    /// A biome nothing spawns in.
    pub fn void() -> Self { Self::new(BiomeKind::Void, BiomeSpawnSettings::default()) }

    pub fn grassland() -> Self {
        use MobCategory::*;
        Self::new(
            BiomeKind::Grassland,
            BiomeSpawnSettings::default()
                .with_spawner(Creature, SpawnerData::new("sheep", 12, 4, 4))
                .with_spawner(Creature, SpawnerData::new("pig", 10, 4, 4))
                .with_spawner(Creature, SpawnerData::new("chicken", 10, 4, 4))
                .with_spawner(Creature, SpawnerData::new("cow", 8, 4, 4))
                .with_spawner(Ambient, SpawnerData::new("bat", 10, 8, 8))
                .with_spawner(Monster, SpawnerData::new("spider", 100, 4, 4))
                .with_spawner(Monster, SpawnerData::new("zombie", 95, 4, 4))
                .with_spawner(Monster, SpawnerData::new("skeleton", 100, 4, 4))
                .with_spawner(Monster, SpawnerData::new("creeper", 100, 4, 4))
                .with_spawner(Monster, SpawnerData::new("enderman", 10, 1, 4)),
        )
    }

    pub fn ocean() -> Self {
        use MobCategory::*;
        Self::new(
            BiomeKind::Ocean,
            BiomeSpawnSettings::default()
                .with_spawner(WaterCreature, SpawnerData::new("squid", 1, 1, 4))
                .with_spawner(WaterAmbient, SpawnerData::new("cod", 10, 3, 6))
                .with_spawner(Ambient, SpawnerData::new("bat", 10, 8, 8))
                .with_spawner(Monster, SpawnerData::new("drowned", 5, 1, 1))
                .with_spawner(Monster, SpawnerData::new("zombie", 95, 4, 4)),
        )
    }

    pub fn river() -> Self {
        use MobCategory::*;
        Self::new(
            BiomeKind::River,
            BiomeSpawnSettings::default()
                .with_spawner(WaterCreature, SpawnerData::new("squid", 2, 1, 4))
                .with_spawner(WaterAmbient, SpawnerData::new("cod", 5, 1, 5))
                .with_spawner(Monster, SpawnerData::new("drowned", 100, 1, 1))
                .with_spawner(Ambient, SpawnerData::new("bat", 10, 8, 8)),
        )
    }

    pub fn nether_wastes() -> Self {
        use MobCategory::*;
        Self::new(
            BiomeKind::NetherWastes,
            BiomeSpawnSettings::default()
                .with_spawner(Monster, SpawnerData::new("ghast", 50, 4, 4))
                .with_spawner(Monster, SpawnerData::new("zombified_piglin", 100, 4, 4))
                .with_spawner(Monster, SpawnerData::new("magma_cube", 2, 4, 4))
                .with_spawner(Monster, SpawnerData::new("enderman", 1, 4, 4)),
        )
    }

    pub fn soul_sand_valley() -> Self {
        use MobCategory::*;
        Self::new(
            BiomeKind::SoulSandValley,
            BiomeSpawnSettings::default()
                .with_spawner(Monster, SpawnerData::new("skeleton", 20, 5, 5))
                .with_spawner(Monster, SpawnerData::new("ghast", 50, 4, 4))
                .with_spawner(Monster, SpawnerData::new("enderman", 1, 4, 4))
                .with_spawn_cost("skeleton", MobSpawnCost::new(0.7, 0.15))
                .with_spawn_cost("ghast", MobSpawnCost::new(0.7, 0.15))
                .with_spawn_cost("enderman", MobSpawnCost::new(0.7, 0.15)),
        )
    }
}
