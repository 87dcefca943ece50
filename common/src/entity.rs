use crate::{
    mob::MobCategory,
    terrain::{block_pos, Heightmap},
};
use rand::prelude::*;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use vek::*;

/// Chance for a non-leading member of a creature group to be a baby.
pub const BABY_CHANCE: f32 = 0.05;

/// The environmental placement rule an entity type requires.
#[derive(Copy, Clone, Debug, Eq, Hash, PartialEq, Serialize, Deserialize)]
pub enum SpawnPlacementType {
    OnGround,
    InWater,
    InLava,
    NoRestrictions,
}

impl SpawnPlacementType {
    /// The heightmap used to find a column's spawn height at chunk
    /// generation.
    pub fn heightmap(&self) -> Heightmap {
        match self {
            SpawnPlacementType::InWater | SpawnPlacementType::InLava => Heightmap::OceanFloor,
            SpawnPlacementType::OnGround | SpawnPlacementType::NoRestrictions => {
                Heightmap::MotionBlockingNoLeaves
            },
        }
    }
}

/// Per-type spawn predicate, evaluated against the level at the candidate
/// position.
#[derive(Copy, Clone, Debug, Eq, Hash, PartialEq, Serialize, Deserialize)]
pub enum SpawnRule {
    Always,
    /// The block below must be a valid spawn floor.
    Mob,
    /// Not peaceful, dark enough, and a valid floor.
    Monster,
    /// Not peaceful and a valid floor, whatever the light.
    AnyLightMonster,
    /// Not peaceful, dark enough, and submerged.
    DarkWater,
    /// Grass below and bright enough.
    Animal,
    /// Within the band just below sea level, surrounded by water.
    WaterAnimal,
    /// Below sea level and dark enough.
    Ambient,
}

/// How much a mob likes to stand somewhere. A negative value at the spawn
/// position vetoes the spawn.
#[derive(Copy, Clone, Debug, Eq, Hash, PartialEq, Serialize, Deserialize)]
pub enum WalkPreference {
    Neutral,
    Dark,
    Grass,
}

/// Chance of a rider mounting a freshly spawned mob.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Rider {
    pub kind: String,
    pub chance: f32,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EntityType {
    pub id: String,
    pub category: MobCategory,
    /// Whether this type may be created by commands or spawners at all.
    pub summonable: bool,
    /// Whether instances are mobs (and so have spawn rules, persistence and
    /// group behaviour).
    pub is_mob: bool,
    pub can_spawn_far_from_player: bool,
    pub fire_immune: bool,
    pub width: f32,
    pub height: f32,
    pub placement: SpawnPlacementType,
    pub spawn_rule: SpawnRule,
    pub walk_preference: WalkPreference,
    /// A single natural spawn attempt stops once it has placed this many.
    pub max_spawn_cluster_size: u32,
    /// A pack stops once it has placed this many.
    pub max_group_size: Option<u32>,
    /// Number of visual variants rolled at spawn, shared across a group.
    pub variants: u8,
    /// The first member of a group leads it.
    pub has_leader: bool,
    pub remove_when_far_away: bool,
    /// Instances obstruct mobs spawning inside them (boats, minecarts).
    pub blocks_building: bool,
    pub rider: Option<Rider>,
}

impl EntityType {
    /// A mob type with the usual defaults for its category.
    pub fn mob(id: impl Into<String>, category: MobCategory) -> Self {
        let (placement, spawn_rule, walk_preference) = match category {
            MobCategory::Monster => (
                SpawnPlacementType::OnGround,
                SpawnRule::Monster,
                WalkPreference::Dark,
            ),
            MobCategory::Creature => (
                SpawnPlacementType::OnGround,
                SpawnRule::Animal,
                WalkPreference::Grass,
            ),
            MobCategory::Ambient => (
                SpawnPlacementType::OnGround,
                SpawnRule::Ambient,
                WalkPreference::Neutral,
            ),
            MobCategory::WaterCreature | MobCategory::WaterAmbient => (
                SpawnPlacementType::InWater,
                SpawnRule::WaterAnimal,
                WalkPreference::Neutral,
            ),
            MobCategory::Misc => (
                SpawnPlacementType::NoRestrictions,
                SpawnRule::Always,
                WalkPreference::Neutral,
            ),
        };
        Self {
            id: id.into(),
            category,
            summonable: true,
            is_mob: true,
            can_spawn_far_from_player: false,
            fire_immune: false,
            width: 0.6,
            height: 1.8,
            placement,
            spawn_rule,
            walk_preference,
            max_spawn_cluster_size: 4,
            max_group_size: None,
            variants: 0,
            has_leader: false,
            remove_when_far_away: !category.is_persistent(),
            blocks_building: false,
            rider: None,
        }
    }

    /// A non-mob entity such as a dropped item.
    pub fn object(id: impl Into<String>) -> Self {
        Self {
            is_mob: false,
            width: 0.25,
            height: 0.25,
            remove_when_far_away: false,
            ..Self::mob(id, MobCategory::Misc)
        }
    }

    pub fn with_size(mut self, width: f32, height: f32) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    pub fn with_placement(mut self, placement: SpawnPlacementType) -> Self {
        self.placement = placement;
        self
    }

    pub fn with_spawn_rule(mut self, spawn_rule: SpawnRule) -> Self {
        self.spawn_rule = spawn_rule;
        self
    }

    pub fn with_walk_preference(mut self, walk_preference: WalkPreference) -> Self {
        self.walk_preference = walk_preference;
        self
    }

    pub fn with_max_spawn_cluster_size(mut self, size: u32) -> Self {
        self.max_spawn_cluster_size = size;
        self
    }

    pub fn with_max_group_size(mut self, size: u32) -> Self {
        self.max_group_size = Some(size);
        self
    }

    pub fn with_variants(mut self, variants: u8) -> Self {
        self.variants = variants;
        self
    }

    pub fn with_leader(mut self) -> Self {
        self.has_leader = true;
        self
    }

    pub fn with_rider(mut self, kind: impl Into<String>, chance: f32) -> Self {
        self.rider = Some(Rider {
            kind: kind.into(),
            chance,
        });
        self
    }

    pub fn blocks_building(mut self) -> Self {
        self.blocks_building = true;
        self
    }

    pub fn fire_immune(mut self) -> Self {
        self.fire_immune = true;
        self
    }

    pub fn far_from_player(mut self) -> Self {
        self.can_spawn_far_from_player = true;
        self
    }

    pub fn not_summonable(mut self) -> Self {
        self.summonable = false;
        self
    }

    pub fn heightmap(&self) -> Heightmap { self.placement.heightmap() }

    /// Collision box of an instance standing at `pos`, centred horizontally.
    pub fn aabb_at(&self, pos: Vec3<f64>) -> Aabb<f64> {
        let half = self.width as f64 / 2.0;
        Aabb {
            min: Vec3::new(pos.x - half, pos.y - half, pos.z),
            max: Vec3::new(pos.x + half, pos.y + half, pos.z + self.height as f64),
        }
    }

    pub fn is_max_group_size_reached(&self, placed: u32) -> bool {
        self.max_group_size.is_some_and(|max| placed >= max)
    }
}

/// Group state threaded through every member of a freshly spawned cluster.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct SpawnGroupData {
    pub variant: Option<u8>,
    pub members: u32,
}

/// Mob-only state of an entity.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Mob {
    /// Named, tamed or otherwise pinned mobs never despawn.
    pub persistence_required: bool,
    /// Mobs kept alive by something they carry or ride.
    pub custom_persistence: bool,
    pub variant: Option<u8>,
    pub is_leader: bool,
    pub is_baby: bool,
}

impl Mob {
    pub fn is_settled(&self) -> bool { self.persistence_required || self.custom_persistence }

    /// Rolls per-individual spawn data, inheriting the group's shared rolls.
    /// Returns the group data for the next member of the cluster.
    pub fn finalize_spawn<R: Rng + ?Sized>(
        &mut self,
        kind: &EntityType,
        rng: &mut R,
        group: Option<SpawnGroupData>,
    ) -> Option<SpawnGroupData> {
        let mut group = group.unwrap_or_default();

        if kind.variants > 0 {
            let variant = *group
                .variant
                .get_or_insert_with(|| rng.gen_range(0..kind.variants));
            self.variant = Some(variant);
        }

        self.is_leader = kind.has_leader && group.members == 0;
        self.is_baby = kind.category == MobCategory::Creature
            && group.members > 0
            && rng.gen::<f32>() < BABY_CHANCE;

        group.members += 1;
        Some(group)
    }
}

#[derive(Clone, Debug)]
pub struct Entity {
    pub kind: Arc<EntityType>,
    pub pos: Vec3<f64>,
    pub yaw: f32,
    pub mob: Option<Mob>,
    pub passengers: Vec<Entity>,
}

impl Entity {
    pub fn new(kind: Arc<EntityType>, pos: Vec3<f64>) -> Self {
        let mob = kind.is_mob.then(Mob::default);
        Self {
            kind,
            pos,
            yaw: 0.0,
            mob,
            passengers: Vec::new(),
        }
    }

    pub fn with_mob(mut self, mob: Mob) -> Self {
        if self.kind.is_mob {
            self.mob = Some(mob);
        }
        self
    }

    pub fn as_mob(&self) -> Option<&Mob> { self.mob.as_ref() }

    pub fn as_mob_mut(&mut self) -> Option<&mut Mob> { self.mob.as_mut() }

    pub fn category(&self) -> MobCategory { self.kind.category }

    pub fn block_pos(&self) -> Vec3<i32> { block_pos(self.pos) }

    pub fn move_to(&mut self, pos: Vec3<f64>, yaw: f32) {
        self.pos = pos;
        self.yaw = yaw;
        let kind = &self.kind;
        for passenger in &mut self.passengers {
            passenger.pos = pos + Vec3::unit_z() * kind.height as f64;
        }
    }

    pub fn aabb(&self) -> Aabb<f64> { self.kind.aabb_at(self.pos) }

    /// Whether this entity counts towards the natural spawn caps. Settled
    /// mobs and `Misc` entities don't.
    pub fn is_spawn_eligible(&self) -> bool {
        self.category().is_spawning() && !self.as_mob().is_some_and(Mob::is_settled)
    }

    /// This entity and all its passengers, depth first.
    pub fn self_and_passengers(&self) -> Vec<&Entity> {
        let mut out = vec![self];
        for passenger in &self.passengers {
            out.extend(passenger.self_and_passengers());
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;

    #[test]
    fn aabb_is_centred() {
        let zombie = EntityType::mob("zombie", MobCategory::Monster).with_size(0.6, 1.95);
        let aabb = zombie.aabb_at(Vec3::new(10.5, -3.5, 64.0));
        assert!((aabb.min.x - 10.2).abs() < 1e-6);
        assert!((aabb.max.y + 3.2).abs() < 1e-6);
        assert!((aabb.max.z - 65.95).abs() < 1e-6);
    }

    #[test]
    fn spawn_eligibility() {
        let zombie = Arc::new(EntityType::mob("zombie", MobCategory::Monster));
        let item = Arc::new(EntityType::object("item"));
        let pos = Vec3::zero();

        assert!(Entity::new(Arc::clone(&zombie), pos).is_spawn_eligible());
        assert!(!Entity::new(item, pos).is_spawn_eligible());
        let named = Entity::new(Arc::clone(&zombie), pos).with_mob(Mob {
            persistence_required: true,
            ..Mob::default()
        });
        assert!(!named.is_spawn_eligible());
        let carrying = Entity::new(zombie, pos).with_mob(Mob {
            custom_persistence: true,
            ..Mob::default()
        });
        assert!(!carrying.is_spawn_eligible());
    }

    #[test]
    fn objects_are_not_mobs() {
        let item = Entity::new(Arc::new(EntityType::object("item")), Vec3::zero());
        assert!(item.as_mob().is_none());
    }

    #[test]
    fn group_shares_variant_and_has_one_leader() {
        let kind = EntityType::mob("pillager", MobCategory::Monster)
            .with_variants(4)
            .with_leader();
        let mut rng = StdRng::seed_from_u64(3);
        let mut group = None;
        let mut mobs = Vec::new();
        for _ in 0..4 {
            let mut mob = Mob::default();
            group = mob.finalize_spawn(&kind, &mut rng, group);
            mobs.push(mob);
        }
        let variant = mobs[0].variant;
        assert!(variant.is_some());
        assert!(mobs.iter().all(|m| m.variant == variant));
        assert_eq!(mobs.iter().filter(|m| m.is_leader).count(), 1);
        assert!(mobs[0].is_leader);
        assert_eq!(group.map(|g| g.members), Some(4));
    }

    #[test]
    fn first_creature_is_never_a_baby() {
        let kind = EntityType::mob("cow", MobCategory::Creature);
        let mut rng = StdRng::seed_from_u64(11);
        for _ in 0..100 {
            let mut mob = Mob::default();
            mob.finalize_spawn(&kind, &mut rng, None);
            assert!(!mob.is_baby);
        }
    }

    #[test]
    fn group_size_limit() {
        let cod = EntityType::mob("cod", MobCategory::WaterAmbient).with_max_group_size(8);
        assert!(!cod.is_max_group_size_reached(7));
        assert!(cod.is_max_group_size_reached(8));
        let zombie = EntityType::mob("zombie", MobCategory::Monster);
        assert!(!zombie.is_max_group_size_reached(100));
    }
}
