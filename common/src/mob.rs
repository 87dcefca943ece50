use enum_map::EnumMap;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Coarse spawning class of an entity type. Every category has its own
/// population caps and despawn rules.
#[derive(
    Copy,
    Clone,
    Debug,
    Eq,
    Hash,
    PartialEq,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    enum_map::Enum,
)]
pub enum MobCategory {
    Monster,
    Creature,
    Ambient,
    WaterCreature,
    WaterAmbient,
    Misc,
}

impl MobCategory {
    /// Categories that take part in natural spawning, in spawning order.
    /// `Misc` never does.
    pub const SPAWNING: [MobCategory; 5] = [
        MobCategory::Monster,
        MobCategory::Creature,
        MobCategory::Ambient,
        MobCategory::WaterCreature,
        MobCategory::WaterAmbient,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            MobCategory::Monster => "monster",
            MobCategory::Creature => "creature",
            MobCategory::Ambient => "ambient",
            MobCategory::WaterCreature => "water_creature",
            MobCategory::WaterAmbient => "water_ambient",
            MobCategory::Misc => "misc",
        }
    }

    /// Maximum number of individuals per loaded chunk area. The global cap
    /// scales this by the number of spawnable chunks.
    pub fn max_instances_per_chunk(&self) -> u32 {
        match self {
            MobCategory::Monster => 70,
            MobCategory::Creature => 10,
            MobCategory::Ambient => 15,
            MobCategory::WaterCreature => 5,
            MobCategory::WaterAmbient => 20,
            MobCategory::Misc => 0,
        }
    }

    pub fn is_friendly(&self) -> bool { !matches!(self, MobCategory::Monster) }

    /// Persistent categories are exempt from distance despawning and only
    /// spawn on the slow persistent cycle.
    pub fn is_persistent(&self) -> bool {
        matches!(self, MobCategory::Creature | MobCategory::Misc)
    }

    pub fn despawn_distance(&self) -> u32 {
        match self {
            MobCategory::WaterAmbient => 64,
            _ => 128,
        }
    }

    #[inline]
    pub fn despawn_distance_sqr(&self) -> f64 {
        let d = self.despawn_distance() as f64;
        d * d
    }

    pub fn is_spawning(&self) -> bool { !matches!(self, MobCategory::Misc) }
}

impl fmt::Display for MobCategory {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result { write!(f, "{}", self.name()) }
}

/// A counter per mob category.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
pub struct CategoryCounts(EnumMap<MobCategory, u32>);

impl CategoryCounts {
    #[inline]
    pub fn get(&self, category: MobCategory) -> u32 { self.0[category] }

    #[inline]
    pub fn add(&mut self, category: MobCategory, n: u32) { self.0[category] += n; }

    #[inline]
    pub fn set(&mut self, category: MobCategory, n: u32) { self.0[category] = n; }

    pub fn total(&self) -> u32 { self.0.values().sum() }

    pub fn iter(&self) -> impl Iterator<Item = (MobCategory, u32)> + '_ {
        self.0.iter().map(|(c, n)| (c, *n))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn misc_never_spawns() {
        assert!(!MobCategory::SPAWNING.contains(&MobCategory::Misc));
        assert!(!MobCategory::Misc.is_spawning());
        assert!(MobCategory::SPAWNING.iter().all(|c| c.is_spawning()));
    }

    #[test]
    fn category_flags() {
        assert!(!MobCategory::Monster.is_friendly());
        assert!(MobCategory::Creature.is_persistent());
        assert!(!MobCategory::Ambient.is_persistent());
        assert_eq!(MobCategory::WaterAmbient.despawn_distance_sqr(), 4096.0);
    }

    #[test]
    fn counts_are_per_category() {
        let mut counts = CategoryCounts::default();
        counts.add(MobCategory::Monster, 3);
        counts.add(MobCategory::Ambient, 1);
        counts.add(MobCategory::Monster, 1);
        assert_eq!(counts.get(MobCategory::Monster), 4);
        assert_eq!(counts.get(MobCategory::Creature), 0);
        assert_eq!(counts.total(), 5);
        assert_eq!(counts.iter().count(), 6);
        assert_eq!(counts.iter().next(), Some((MobCategory::Monster, 4)));
    }
}
