#![deny(unsafe_code)]
#![allow(clippy::option_map_unit_fn)]
#![deny(clippy::clone_on_ref_ptr)]

pub mod error;
pub mod level;
pub mod settings;
pub mod spawn;
pub mod sys;
pub mod test_world;

// Reexports
pub use crate::{
    error::Error,
    level::{ChunkAccess, ChunkGenerator, ChunkGetter, Level, StructureManager},
    settings::{GameRules, SpawnSettings, StructureSpawnOverride, StructureSpawnOverrides},
    spawn::{NaturalSpawner, SpawnHooks, SpawnState},
    sys::natural_spawn::{tick, SpawnReport},
};
