//! Environmental checks of a spawn position.

use crate::level::Level;
use common::{
    entity::{SpawnPlacementType, SpawnRule, WalkPreference},
    terrain::{Block, BlockKind, FluidKind},
    Entity, EntityType,
};
use rand::Rng;
use vek::*;

/// Waters below sea level deeper than this are too deep for surface
/// swimmers.
const SURFACE_WATER_DEPTH: i32 = 13;

/// Whether the block at a position leaves room for a mob to stand in it.
pub fn is_valid_empty_spawn_block(block: Block, kind: &EntityType) -> bool {
    !block.is_collision_shape_full_block()
        && !block.is_signal_source()
        && block.fluid().is_empty()
        && !block.prevents_mob_spawning_inside()
        && !block.is_dangerous(kind.fire_immune)
}

pub fn is_spawn_position_ok<L: Level>(
    placement: SpawnPlacementType,
    level: &L,
    pos: Vec3<i32>,
    kind: &EntityType,
) -> bool {
    if placement == SpawnPlacementType::NoRestrictions {
        return true;
    }
    if !level.is_within_world_border(pos) {
        return false;
    }
    let above = pos + Vec3::unit_z();
    match placement {
        SpawnPlacementType::InWater => {
            level.fluid(pos) == FluidKind::Water && !level.block(above).is_redstone_conductor()
        },
        SpawnPlacementType::InLava => level.fluid(pos) == FluidKind::Lava,
        SpawnPlacementType::OnGround => {
            level
                .block(pos - Vec3::unit_z())
                .is_valid_spawn_floor(kind.fire_immune)
                && is_valid_empty_spawn_block(level.block(pos), kind)
                && is_valid_empty_spawn_block(level.block(above), kind)
        },
        SpawnPlacementType::NoRestrictions => true,
    }
}

/// Monsters need darkness: a random sky light threshold, no block light and
/// a random overall brightness threshold.
pub fn is_dark_enough_to_spawn<L: Level, R: Rng + ?Sized>(
    level: &L,
    pos: Vec3<i32>,
    rng: &mut R,
) -> bool {
    if level.sky_light(pos) > rng.gen_range(0..32) {
        return false;
    }
    if level.block_light(pos) > 0 {
        return false;
    }
    level.raw_brightness(pos) <= rng.gen_range(0..8)
}

fn check_mob_spawn_rules<L: Level>(level: &L, pos: Vec3<i32>, kind: &EntityType) -> bool {
    level
        .block(pos - Vec3::unit_z())
        .is_valid_spawn_floor(kind.fire_immune)
}

/// The per-type spawn predicate.
pub fn check_spawn_rules<L: Level, R: Rng + ?Sized>(
    kind: &EntityType,
    level: &L,
    pos: Vec3<i32>,
    rng: &mut R,
) -> bool {
    let below = pos - Vec3::unit_z();
    let above = pos + Vec3::unit_z();
    match kind.spawn_rule {
        SpawnRule::Always => true,
        SpawnRule::Mob => check_mob_spawn_rules(level, pos, kind),
        SpawnRule::Monster => {
            level.difficulty().allows_monsters()
                && is_dark_enough_to_spawn(level, pos, rng)
                && check_mob_spawn_rules(level, pos, kind)
        },
        SpawnRule::AnyLightMonster => {
            level.difficulty().allows_monsters() && check_mob_spawn_rules(level, pos, kind)
        },
        SpawnRule::DarkWater => {
            level.difficulty().allows_monsters()
                && level.fluid(pos) == FluidKind::Water
                && is_dark_enough_to_spawn(level, pos, rng)
        },
        SpawnRule::Animal => {
            level.block(below).kind() == BlockKind::Grass && level.raw_brightness(pos) > 8
        },
        SpawnRule::WaterAnimal => {
            let sea_level = level.sea_level();
            pos.z >= sea_level - SURFACE_WATER_DEPTH
                && pos.z <= sea_level
                && level.fluid(below) == FluidKind::Water
                && level.block(above).kind() == BlockKind::Water
        },
        SpawnRule::Ambient => {
            pos.z < level.sea_level()
                && level.raw_brightness(pos) <= rng.gen_range(0..4)
                && check_mob_spawn_rules(level, pos, kind)
        },
    }
}

/// How much a mob of the kind likes standing at `pos`.
pub fn walk_target_value<L: Level>(kind: &EntityType, level: &L, pos: Vec3<i32>) -> f32 {
    let brightness = level.raw_brightness(pos) as f32 / 15.0;
    match kind.walk_preference {
        WalkPreference::Neutral => 0.0,
        WalkPreference::Dark => 0.5 - brightness,
        WalkPreference::Grass => {
            if level.block(pos - Vec3::unit_z()).kind() == BlockKind::Grass {
                10.0
            } else {
                brightness - 0.5
            }
        },
    }
}

/// The mob's own veto on where it was placed.
pub fn mob_check_spawn_rules<L: Level>(level: &L, entity: &Entity) -> bool {
    walk_target_value(&entity.kind, level, entity.block_pos()) >= 0.0
}

/// Swimmers only need to be clear of blocking entities, everything else must
/// also be out of liquids.
pub fn mob_check_spawn_obstruction<L: Level>(level: &L, entity: &Entity) -> bool {
    let aabb = entity.aabb();
    match entity.kind.placement {
        SpawnPlacementType::InWater | SpawnPlacementType::InLava => level.is_unobstructed(&aabb),
        SpawnPlacementType::OnGround | SpawnPlacementType::NoRestrictions => {
            !level.contains_any_liquid(&aabb) && level.is_unobstructed(&aabb)
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_world::TestWorld;
    use common::{resources::Difficulty, terrain::Biome};
    use rand::{rngs::StdRng, SeedableRng};
    use std::sync::Arc;

    fn kind(world: &TestWorld, id: &str) -> Arc<EntityType> {
        Arc::clone(world.registry.get(id).unwrap())
    }

    fn rock() -> TestWorld { TestWorld::flat(Biome::grassland(), BlockKind::Rock, 64) }

    #[test]
    fn ground_needs_floor_and_headroom() {
        let mut world = rock();
        let zombie = kind(&world, "zombie");
        let pos = Vec3::new(3, 3, 64);
        assert!(is_spawn_position_ok(SpawnPlacementType::OnGround, &world, pos, &zombie));
        assert!(!is_spawn_position_ok(
            SpawnPlacementType::OnGround,
            &world,
            pos - Vec3::unit_z(),
            &zombie
        ));

        world.set_block(pos + Vec3::unit_z(), BlockKind::Rock);
        assert!(!is_spawn_position_ok(SpawnPlacementType::OnGround, &world, pos, &zombie));
        assert!(is_spawn_position_ok(SpawnPlacementType::NoRestrictions, &world, pos, &zombie));

        let pos = Vec3::new(5, 5, 64);
        world.set_block(pos, BlockKind::Rail);
        assert!(!is_spawn_position_ok(SpawnPlacementType::OnGround, &world, pos, &zombie));

        let pos = Vec3::new(7, 7, 64);
        world.set_block(pos - Vec3::unit_z(), BlockKind::Bedrock);
        assert!(!is_spawn_position_ok(SpawnPlacementType::OnGround, &world, pos, &zombie));
    }

    #[test]
    fn magma_floor_only_for_the_fire_immune() {
        let mut world = rock();
        let pos = Vec3::new(0, 0, 64);
        world.set_block(pos - Vec3::unit_z(), BlockKind::Magma);
        assert!(!is_spawn_position_ok(
            SpawnPlacementType::OnGround,
            &world,
            pos,
            &kind(&world, "zombie")
        ));
        assert!(is_spawn_position_ok(
            SpawnPlacementType::OnGround,
            &world,
            pos,
            &kind(&world, "blaze")
        ));
    }

    #[test]
    fn outside_the_border() {
        let mut world = rock();
        world.border_radius = 10;
        let zombie = kind(&world, "zombie");
        assert!(!is_spawn_position_ok(
            SpawnPlacementType::OnGround,
            &world,
            Vec3::new(12, 0, 64),
            &zombie
        ));
    }

    #[test]
    fn swimmers_need_water() {
        let world = rock().with_layer(50..64, BlockKind::Water);
        let squid = kind(&world, "squid");
        let mut rng = StdRng::seed_from_u64(0);
        assert!(is_spawn_position_ok(squid.placement, &world, Vec3::new(0, 0, 60), &squid));
        assert!(!is_spawn_position_ok(squid.placement, &world, Vec3::new(0, 0, 64), &squid));
        assert!(check_spawn_rules(&squid, &world, Vec3::new(0, 0, 60), &mut rng));
        // Too deep
        assert!(!check_spawn_rules(&squid, &world, Vec3::new(0, 0, 49), &mut rng));
    }

    #[test]
    fn monsters_need_darkness() {
        let mut world = rock();
        let zombie = kind(&world, "zombie");
        let pos = Vec3::new(0, 0, 64);
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..32 {
            assert!(check_spawn_rules(&zombie, &world, pos, &mut rng));
        }

        world.set_block_light(pos, 3);
        for _ in 0..32 {
            assert!(!check_spawn_rules(&zombie, &world, pos, &mut rng));
        }

        world.set_block_light(pos, 0);
        world.difficulty = Difficulty::Peaceful;
        assert!(!check_spawn_rules(&zombie, &world, pos, &mut rng));
    }

    #[test]
    fn fire_immune_nether_mobs_ignore_light() {
        let mut world = rock().with_sky_light(15);
        let blaze = kind(&world, "blaze");
        let pos = Vec3::new(0, 0, 64);
        world.set_block_light(pos, 15);
        let mut rng = StdRng::seed_from_u64(3);
        assert!(check_spawn_rules(&blaze, &world, pos, &mut rng));
    }

    #[test]
    fn animals_need_lit_grass() {
        let world = rock().with_layer(63..64, BlockKind::Grass).with_sky_light(15);
        let cow = kind(&world, "cow");
        let mut rng = StdRng::seed_from_u64(0);
        assert!(check_spawn_rules(&cow, &world, Vec3::new(0, 0, 64), &mut rng));

        let dark = rock().with_layer(63..64, BlockKind::Grass);
        assert!(!check_spawn_rules(&cow, &dark, Vec3::new(0, 0, 64), &mut rng));

        let bare = rock().with_sky_light(15);
        assert!(!check_spawn_rules(&cow, &bare, Vec3::new(0, 0, 64), &mut rng));
    }

    #[test]
    fn walk_targets() {
        let lit = rock().with_sky_light(15);
        let dark = rock();
        let pos = Vec3::new(0, 0, 64);
        let zombie = kind(&lit, "zombie");
        assert!(walk_target_value(&zombie, &lit, pos) < 0.0);
        assert!((walk_target_value(&zombie, &dark, pos) - 0.5).abs() < f32::EPSILON);

        let grass = rock().with_layer(63..64, BlockKind::Grass);
        let cow = kind(&grass, "cow");
        assert_eq!(walk_target_value(&cow, &grass, pos), 10.0);
        assert!(walk_target_value(&cow, &dark, pos) < 0.0);

        let entity = Entity::new(zombie, Vec3::new(0.5, 0.5, 64.0));
        assert!(mob_check_spawn_rules(&dark, &entity));
        assert!(!mob_check_spawn_rules(&lit, &entity));
    }

    #[test]
    fn obstruction() {
        let mut world = rock();
        let zombie = kind(&world, "zombie");
        let entity = Entity::new(Arc::clone(&zombie), Vec3::new(0.5, 0.5, 64.0));
        assert!(mob_check_spawn_obstruction(&world, &entity));

        let boat = Entity::new(kind(&world, "boat"), Vec3::new(0.7, 0.5, 64.0));
        world.entities.push(boat);
        assert!(!mob_check_spawn_obstruction(&world, &entity));

        let mut wet = rock();
        wet.set_block(Vec3::new(0, 0, 65), BlockKind::Water);
        assert!(!mob_check_spawn_obstruction(&wet, &entity));

        // Items don't get in the way
        let mut littered = rock();
        let item = Entity::new(kind(&littered, "item"), Vec3::new(0.5, 0.5, 64.0));
        littered.entities.push(item);
        assert!(mob_check_spawn_obstruction(&littered, &entity));
    }
}
