use super::biome::SpawnerData;
use lazy_static::lazy_static;
use serde::{Deserialize, Serialize};
use vek::*;

#[derive(Copy, Clone, Debug, Eq, Hash, PartialEq, Serialize, Deserialize)]
pub enum StructureKind {
    NetherFortress,
    OceanMonument,
    SwampHut,
    PillagerOutpost,
}

lazy_static! {
    /// Monsters that spawn on the nether brick floors of a fortress, whatever
    /// the surrounding biome.
    pub static ref FORTRESS_ENEMIES: Vec<SpawnerData> = vec![
        SpawnerData::new("blaze", 10, 2, 3),
        SpawnerData::new("zombified_piglin", 5, 4, 4),
        SpawnerData::new("wither_skeleton", 8, 5, 5),
        SpawnerData::new("skeleton", 2, 5, 5),
        SpawnerData::new("magma_cube", 3, 4, 4),
    ];
}

/// A placed structure. `bounds` encloses every piece; both are inclusive
/// block boxes.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StructureStart {
    pub kind: StructureKind,
    pub bounds: Aabb<i32>,
    pub pieces: Vec<Aabb<i32>>,
}

fn box_contains(aabb: &Aabb<i32>, pos: Vec3<i32>) -> bool {
    pos.x >= aabb.min.x
        && pos.y >= aabb.min.y
        && pos.z >= aabb.min.z
        && pos.x <= aabb.max.x
        && pos.y <= aabb.max.y
        && pos.z <= aabb.max.z
}

impl StructureStart {
    /// A structure made of the given pieces, bounded by their union.
    pub fn new(kind: StructureKind, pieces: Vec<Aabb<i32>>) -> Self {
        let bounds = pieces
            .iter()
            .copied()
            .reduce(|a, b| Aabb {
                min: Vec3::partial_min(a.min, b.min),
                max: Vec3::partial_max(a.max, b.max),
            })
            .unwrap_or(Aabb {
                min: Vec3::zero(),
                max: Vec3::zero(),
            });
        Self {
            kind,
            bounds,
            pieces,
        }
    }

    /// A start without pieces failed to generate and doesn't count.
    pub fn is_valid(&self) -> bool { !self.pieces.is_empty() }

    pub fn contains(&self, pos: Vec3<i32>) -> bool { box_contains(&self.bounds, pos) }

    pub fn piece_contains(&self, pos: Vec3<i32>) -> bool {
        self.pieces.iter().any(|piece| box_contains(piece, pos))
    }
}
