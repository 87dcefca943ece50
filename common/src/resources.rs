use serde::{Deserialize, Serialize};

/// A resource that stores the world difficulty.
#[derive(Copy, Clone, Debug, Default, Eq, Hash, PartialEq, Serialize, Deserialize)]
pub enum Difficulty {
    Peaceful,
    Easy,
    #[default]
    Normal,
    Hard,
}

impl Difficulty {
    pub fn allows_monsters(&self) -> bool { !matches!(self, Difficulty::Peaceful) }
}

/// A resource that stores the tick (i.e: simulation step) counter.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Tick(pub u64);
