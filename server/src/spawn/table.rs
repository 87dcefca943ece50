use crate::{
    level::StructureManager,
    settings::{StructureSpawnOverride, StructureSpawnOverrides},
};
use common::{
    mob::MobCategory,
    terrain::{Biome, Block, BlockKind, SpawnTable, StructureKind},
};
use vek::*;

/// What a resolver gets to look at when picking a spawn table.
pub struct SpawnContext<'a> {
    pub category: MobCategory,
    pub pos: Vec3<i32>,
    /// The block the mob would stand on.
    pub below: Block,
    pub biome: &'a Biome,
    pub structures: &'a dyn StructureManager,
}

/// One link of the spawn table chain. The first resolver to answer decides
/// the table.
pub trait SpawnTableResolver: Send + Sync {
    fn resolve<'a>(&'a self, ctx: &SpawnContext<'a>) -> Option<&'a SpawnTable>;
}

/// Monsters on nether bricks inside a fortress come from the fortress table,
/// whatever the biome.
pub struct FortressResolver {
    table: SpawnTable,
}

impl FortressResolver {
    pub fn new(table: SpawnTable) -> Self { Self { table } }
}

impl SpawnTableResolver for FortressResolver {
    fn resolve<'a>(&'a self, ctx: &SpawnContext<'a>) -> Option<&'a SpawnTable> {
        let in_fortress = ctx.category == MobCategory::Monster
            && ctx.below.kind() == BlockKind::NetherBricks
            && ctx
                .structures
                .structure_at(ctx.pos, StructureKind::NetherFortress)
                .is_some_and(|start| start.is_valid());
        in_fortress.then_some(&self.table)
    }
}

struct StructureOverride {
    structure: StructureKind,
    category: MobCategory,
    piece_only: bool,
    table: SpawnTable,
}

/// Configured per-structure tables.
pub struct StructureOverrideResolver {
    overrides: Vec<StructureOverride>,
}

impl StructureOverrideResolver {
    pub fn new(overrides: &[StructureSpawnOverride]) -> Self {
        Self {
            overrides: overrides
                .iter()
                .map(|o| StructureOverride {
                    structure: o.structure,
                    category: o.category,
                    piece_only: o.piece_only,
                    table: SpawnTable::from(o.spawners.clone()),
                })
                .collect(),
        }
    }
}

impl SpawnTableResolver for StructureOverrideResolver {
    fn resolve<'a>(&'a self, ctx: &SpawnContext<'a>) -> Option<&'a SpawnTable> {
        self.overrides
            .iter()
            .filter(|o| o.category == ctx.category)
            .find(|o| {
                let start = if o.piece_only {
                    ctx.structures.structure_with_piece_at(ctx.pos, o.structure)
                } else {
                    ctx.structures.structure_at(ctx.pos, o.structure)
                };
                start.is_some_and(|start| start.is_valid())
            })
            .map(|o| &o.table)
    }
}

/// The biome's own table. Always answers.
pub struct BiomeResolver;

impl SpawnTableResolver for BiomeResolver {
    fn resolve<'a>(&'a self, ctx: &SpawnContext<'a>) -> Option<&'a SpawnTable> {
        Some(ctx.biome.spawn_settings.mobs(ctx.category))
    }
}

/// The resolver chain, evaluated in order.
pub struct SpawnTableResolvers {
    resolvers: Vec<Box<dyn SpawnTableResolver>>,
    empty: SpawnTable,
}

impl SpawnTableResolvers {
    pub fn new(overrides: &StructureSpawnOverrides) -> Self {
        Self {
            resolvers: vec![
                Box::new(FortressResolver::new(SpawnTable::from(
                    overrides.fortress.clone(),
                ))),
                Box::new(StructureOverrideResolver::new(&overrides.structures)),
                Box::new(BiomeResolver),
            ],
            empty: SpawnTable::default(),
        }
    }

    /// Inserts a resolver ahead of every existing one.
    pub fn with_resolver(mut self, resolver: impl SpawnTableResolver + 'static) -> Self {
        self.resolvers.insert(0, Box::new(resolver));
        self
    }

    pub fn mobs_at<'a>(&'a self, ctx: &SpawnContext<'a>) -> &'a SpawnTable {
        self.resolvers
            .iter()
            .find_map(|resolver| resolver.resolve(ctx))
            .unwrap_or(&self.empty)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use common::terrain::{SpawnerData, StructureStart};

    struct Structures(Vec<StructureStart>);

    impl StructureManager for Structures {
        fn structures(&self) -> &[StructureStart] { &self.0 }
    }

    fn fortress() -> Structures {
        Structures(vec![StructureStart::new(StructureKind::NetherFortress, vec![
            Aabb {
                min: Vec3::new(0, 0, 60),
                max: Vec3::new(32, 32, 80),
            },
        ])])
    }

    fn kinds(table: &SpawnTable) -> Vec<&str> { table.iter().map(|e| e.kind.as_str()).collect() }

    #[test]
    fn fortress_overrides_biome_on_nether_bricks() {
        let resolvers = SpawnTableResolvers::new(&StructureSpawnOverrides::default());
        let biome = Biome::nether_wastes();
        let structures = fortress();
        let ctx = SpawnContext {
            category: MobCategory::Monster,
            pos: Vec3::new(10, 10, 65),
            below: Block::new(BlockKind::NetherBricks),
            biome: &biome,
            structures: &structures,
        };
        assert!(kinds(resolvers.mobs_at(&ctx)).contains(&"wither_skeleton"));

        // Netherrack floor inside the fortress uses the biome
        let ctx = SpawnContext {
            below: Block::new(BlockKind::Netherrack),
            ..ctx
        };
        assert!(kinds(resolvers.mobs_at(&ctx)).contains(&"ghast"));

        // Nether bricks outside of it as well
        let ctx = SpawnContext {
            below: Block::new(BlockKind::NetherBricks),
            pos: Vec3::new(100, 10, 65),
            ..ctx
        };
        assert!(kinds(resolvers.mobs_at(&ctx)).contains(&"ghast"));
    }

    #[test]
    fn fortress_only_applies_to_monsters() {
        let resolvers = SpawnTableResolvers::new(&StructureSpawnOverrides::default());
        let biome = Biome::nether_wastes();
        let structures = fortress();
        let ctx = SpawnContext {
            category: MobCategory::Creature,
            pos: Vec3::new(10, 10, 65),
            below: Block::new(BlockKind::NetherBricks),
            biome: &biome,
            structures: &structures,
        };
        assert!(resolvers.mobs_at(&ctx).is_empty());
    }

    #[test]
    fn structure_override_and_custom_resolver() {
        struct OnlyCreepers(SpawnTable);

        impl SpawnTableResolver for OnlyCreepers {
            fn resolve<'a>(&'a self, ctx: &SpawnContext<'a>) -> Option<&'a SpawnTable> {
                (ctx.pos.z < 0).then_some(&self.0)
            }
        }

        let structures = Structures(vec![StructureStart::new(
            StructureKind::PillagerOutpost,
            vec![Aabb {
                min: Vec3::new(-8, -8, 60),
                max: Vec3::new(8, 8, 90),
            }],
        )]);
        let biome = Biome::grassland();
        let resolvers = SpawnTableResolvers::new(&StructureSpawnOverrides::default()).with_resolver(
            OnlyCreepers(SpawnTable::from(vec![SpawnerData::new("creeper", 1, 1, 1)])),
        );
        let ctx = SpawnContext {
            category: MobCategory::Monster,
            pos: Vec3::new(0, 0, 70),
            below: Block::new(BlockKind::Grass),
            biome: &biome,
            structures: &structures,
        };
        assert_eq!(kinds(resolvers.mobs_at(&ctx)), ["pillager"]);
        let ctx = SpawnContext {
            pos: Vec3::new(0, 0, -10),
            ..ctx
        };
        assert_eq!(kinds(resolvers.mobs_at(&ctx)), ["creeper"]);
    }

    #[test]
    fn piece_only_override_ignores_gaps_between_pieces() {
        let hut = |piece_only| StructureSpawnOverrides {
            fortress: Vec::new(),
            structures: vec![StructureSpawnOverride {
                structure: StructureKind::SwampHut,
                category: MobCategory::Monster,
                piece_only,
                spawners: vec![SpawnerData::new("witch", 1, 1, 1)],
            }],
        };
        let structures = Structures(vec![StructureStart::new(StructureKind::SwampHut, vec![
            Aabb {
                min: Vec3::new(0, 0, 60),
                max: Vec3::new(4, 4, 70),
            },
            Aabb {
                min: Vec3::new(12, 0, 60),
                max: Vec3::new(16, 4, 70),
            },
        ])]);
        let biome = Biome::grassland();
        let in_piece = SpawnContext {
            category: MobCategory::Monster,
            pos: Vec3::new(2, 2, 65),
            below: Block::new(BlockKind::Wood),
            biome: &biome,
            structures: &structures,
        };
        let in_gap = SpawnContext {
            pos: Vec3::new(8, 2, 65),
            ..in_piece
        };

        let bounds = SpawnTableResolvers::new(&hut(false));
        assert_eq!(kinds(bounds.mobs_at(&in_piece)), ["witch"]);
        assert_eq!(kinds(bounds.mobs_at(&in_gap)), ["witch"]);

        let pieces = SpawnTableResolvers::new(&hut(true));
        assert_eq!(kinds(pieces.mobs_at(&in_piece)), ["witch"]);
        assert!(kinds(pieces.mobs_at(&in_gap)).contains(&"zombie"));
    }
}
