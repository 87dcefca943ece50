use common::{mob::MobCategory, CategoryCounts};
use hashbrown::HashMap;
use vek::*;

/// Caps mobs per category in the square neighbourhood of chunks around a
/// chunk. Each mob counts towards every chunk within `radius` chunks of its
/// own, so a chunk's count is the population of its neighbourhood.
#[derive(Clone, Debug)]
pub struct LocalMobCapCalculator {
    radius: i32,
    counts: HashMap<Vec2<i32>, CategoryCounts>,
}

impl LocalMobCapCalculator {
    pub fn new(radius: i32) -> Self {
        Self {
            radius: radius.max(0),
            counts: HashMap::new(),
        }
    }

    pub fn radius(&self) -> i32 { self.radius }

    pub fn add_mob(&mut self, key: Vec2<i32>, category: MobCategory) {
        let r = self.radius;
        for dy in -r..=r {
            for dx in -r..=r {
                self.counts
                    .entry(key + Vec2::new(dx, dy))
                    .or_default()
                    .add(category, 1);
            }
        }
    }

    /// Number of mobs of the category within the neighbourhood of the chunk.
    pub fn count(&self, category: MobCategory, key: Vec2<i32>) -> u32 {
        self.counts.get(&key).map_or(0, |counts| counts.get(category))
    }

    pub fn can_spawn(&self, category: MobCategory, key: Vec2<i32>) -> bool {
        self.count(category, key) < category.max_instances_per_chunk()
    }
}
