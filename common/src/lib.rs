#![deny(unsafe_code)]
#![allow(clippy::option_map_unit_fn)]
#![deny(clippy::clone_on_ref_ptr)]

pub mod entity;
pub mod lottery;
pub mod mob;
pub mod registry;
pub mod resources;
pub mod terrain;

// Reexports
pub use crate::{
    entity::{Entity, EntityType, Mob, SpawnGroupData},
    mob::{CategoryCounts, MobCategory},
    registry::EntityRegistry,
};
