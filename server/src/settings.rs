use crate::error::Error;
use common::{
    mob::MobCategory,
    terrain::{structure::FORTRESS_ENEMIES, SpawnerData, StructureKind},
};
use serde::{Deserialize, Serialize};
use std::{fs, io::prelude::*, path::Path};
use tracing::{error, warn};

/// Tunables of the natural spawner.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpawnSettings {
    /// Mobs never spawn this close to a player.
    pub min_player_distance: f64,
    /// Mobs never spawn this close to the shared world spawn.
    pub spawn_protection_radius: f64,
    /// Packs tried per spawn position.
    pub packs_per_position: u32,
    /// Each step of a pack moves the cursor by up to this many blocks on
    /// either horizontal axis.
    pub pack_jitter: i32,
    /// The global cap of a category is its per-chunk maximum times the number
    /// of spawnable chunks, divided by this.
    pub chunk_area_divisor: u32,
    /// Radius, in chunks, of the neighbourhood covered by the local cap.
    pub local_cap_radius: i32,
    /// Persistent categories only spawn once every this many ticks.
    pub persistent_spawn_interval: u64,
    /// Chunks within this many chunks of a player are spawnable.
    pub spawn_chunk_radius: i32,
    pub chunk_generation_jitter: i32,
    pub chunk_generation_attempts: u32,
    pub structure_overrides: StructureSpawnOverrides,
}

impl Default for SpawnSettings {
    fn default() -> Self {
        Self {
            min_player_distance: 24.0,
            spawn_protection_radius: 24.0,
            packs_per_position: 3,
            pack_jitter: 6,
            chunk_area_divisor: 289,
            local_cap_radius: 8,
            persistent_spawn_interval: 400,
            spawn_chunk_radius: 8,
            chunk_generation_jitter: 5,
            chunk_generation_attempts: 4,
            structure_overrides: StructureSpawnOverrides::default(),
        }
    }
}

impl SpawnSettings {
    pub fn load(path: &Path) -> Self {
        if let Ok(file) = fs::File::open(path) {
            match ron::de::from_reader(file) {
                Ok(x) => x,
                Err(e) => {
                    warn!(?e, "Failed to parse spawn settings! Fallback to default.");
                    Self::default()
                },
            }
        } else {
            let default_settings = Self::default();

            if let Err(e) = default_settings.save_to_file(path) {
                error!(?e, "Failed to create default spawn settings file!");
            }
            default_settings
        }
    }

    pub fn from_ron_str(s: &str) -> Result<Self, Error> { Ok(ron::from_str(s)?) }

    pub fn save_to_file(&self, path: &Path) -> Result<(), Error> {
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir)?;
        }
        let mut config_file = fs::File::create(path)?;

        let s: &str = &ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::default())?;
        config_file.write_all(s.as_bytes())?;
        Ok(())
    }

    #[inline]
    pub fn min_player_distance_sqr(&self) -> f64 { self.min_player_distance.powi(2) }

    #[inline]
    pub fn spawn_protection_radius_sqr(&self) -> f64 { self.spawn_protection_radius.powi(2) }
}

/// A spawn table that replaces the biome's inside a structure.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StructureSpawnOverride {
    pub structure: StructureKind,
    pub category: MobCategory,
    /// Only positions inside one of the structure's pieces count, rather than
    /// anywhere inside its bounds.
    pub piece_only: bool,
    pub spawners: Vec<SpawnerData>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StructureSpawnOverrides {
    /// Monsters spawned on nether bricks inside a fortress.
    pub fortress: Vec<SpawnerData>,
    pub structures: Vec<StructureSpawnOverride>,
}

impl Default for StructureSpawnOverrides {
    fn default() -> Self {
        Self {
            fortress: FORTRESS_ENEMIES.clone(),
            structures: vec![StructureSpawnOverride {
                structure: StructureKind::PillagerOutpost,
                category: MobCategory::Monster,
                piece_only: false,
                spawners: vec![SpawnerData::new("pillager", 1, 1, 1)],
            }],
        }
    }
}

/// World rules toggled by operators.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameRules {
    pub do_mob_spawning: bool,
    pub spawn_monsters: bool,
    pub spawn_friendlies: bool,
}

impl Default for GameRules {
    fn default() -> Self {
        Self {
            do_mob_spawning: true,
            spawn_monsters: true,
            spawn_friendlies: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_file_fills_defaults() {
        let settings = SpawnSettings::from_ron_str("(packs_per_position: 5)").unwrap();
        assert_eq!(settings.packs_per_position, 5);
        assert_eq!(settings.chunk_area_divisor, 289);
        assert_eq!(settings.structure_overrides.fortress.len(), 5);
    }

    #[test]
    fn garbage_is_an_error() {
        assert!(matches!(
            SpawnSettings::from_ron_str("(packs_per_position: \"three\")"),
            Err(Error::Ron(_))
        ));
    }

    #[test]
    fn save_then_load() {
        let dir = std::env::temp_dir().join(format!("natural-spawner-{}", std::process::id()));
        let path = dir.join("spawn_settings.ron");
        let settings = SpawnSettings {
            local_cap_radius: 3,
            ..SpawnSettings::default()
        };
        settings.save_to_file(&path).unwrap();
        assert_eq!(SpawnSettings::load(&path), settings);
        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn missing_file_writes_default() {
        let dir = std::env::temp_dir().join(format!(
            "natural-spawner-default-{}",
            std::process::id()
        ));
        let path = dir.join("spawn_settings.ron");
        let _ = fs::remove_dir_all(&dir);
        assert_eq!(SpawnSettings::load(&path), SpawnSettings::default());
        assert!(path.exists());
        let _ = fs::remove_dir_all(&dir);
    }
}
