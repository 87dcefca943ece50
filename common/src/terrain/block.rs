use serde::{Deserialize, Serialize};
use std::ops::Deref;

#[derive(Copy, Clone, Debug, Hash, Eq, PartialEq, Serialize, Deserialize)]
#[repr(u8)]
pub enum BlockKind {
    Air = 0x00, // Air counts as a fluid
    Water = 0x01,
    Lava = 0x02,
    // 0x03 <= x < 0x10 are reserved for other fluids. These are 2^n aligned to allow bitwise
    // checking of common conditions, `is_fluid` is just `block_kind & 0xF0 == 0`.
    Rock = 0x10,
    Bedrock = 0x11,
    NetherBricks = 0x12,
    Netherrack = 0x13,
    Magma = 0x14,
    Grass = 0x20,
    Snow = 0x21,
    Earth = 0x30,
    Sand = 0x31,
    Gravel = 0x32,
    Wood = 0x40,
    Leaves = 0x41,
    Glass = 0x50,
    // 0x60 <= x < 0x70 are blocks that don't fill their whole cell
    Rail = 0x60,
    RedstoneTorch = 0x61,
    Fire = 0x62,
    Cactus = 0x63,
    ShortGrass = 0x64,
}

impl BlockKind {
    #[inline]
    pub const fn is_air(&self) -> bool { matches!(self, BlockKind::Air) }

    /// Determine whether the block kind is a gas or a liquid.
    #[inline]
    pub const fn is_fluid(&self) -> bool { *self as u8 & 0xF0 == 0x00 }

    #[inline]
    pub const fn is_liquid(&self) -> bool { self.is_fluid() && !self.is_air() }

    /// Blocks that only partially fill their cell (rails, torches, plants).
    #[inline]
    pub const fn is_partial(&self) -> bool { *self as u8 & 0xF0 == 0x60 }

    /// Determine whether the block fills its whole cell.
    #[inline]
    pub const fn is_filled(&self) -> bool { !self.is_fluid() && !self.is_partial() }
}

/// The fluid occupying a block, if any.
#[derive(Copy, Clone, Debug, Eq, Hash, PartialEq, Serialize, Deserialize)]
pub enum FluidKind {
    Empty,
    Water,
    Lava,
}

impl FluidKind {
    #[inline]
    pub fn is_empty(&self) -> bool { matches!(self, FluidKind::Empty) }
}

#[derive(Copy, Clone, Debug, Eq, Hash, PartialEq, Serialize, Deserialize)]
pub struct Block {
    kind: BlockKind,
}

impl Deref for Block {
    type Target = BlockKind;

    fn deref(&self) -> &Self::Target { &self.kind }
}

impl Block {
    #[inline]
    pub const fn new(kind: BlockKind) -> Self { Self { kind } }

    #[inline]
    pub const fn air() -> Self { Self::new(BlockKind::Air) }

    #[inline]
    pub fn kind(&self) -> BlockKind { self.kind }

    #[inline]
    pub fn fluid(&self) -> FluidKind {
        match self.kind {
            BlockKind::Water => FluidKind::Water,
            BlockKind::Lava => FluidKind::Lava,
            _ => FluidKind::Empty,
        }
    }

    /// Whether the block has any collision at all.
    #[inline]
    pub fn is_solid(&self) -> bool {
        !self.is_fluid()
            && !matches!(
                self.kind,
                BlockKind::Rail | BlockKind::RedstoneTorch | BlockKind::Fire | BlockKind::ShortGrass
            )
    }

    /// Whether the collision shape is the full unit cube.
    #[inline]
    pub fn is_collision_shape_full_block(&self) -> bool { self.is_filled() }

    /// Opaque full blocks conduct redstone. Glass, leaves and anything partial
    /// don't.
    #[inline]
    pub fn is_redstone_conductor(&self) -> bool {
        self.is_filled() && !matches!(self.kind, BlockKind::Glass | BlockKind::Leaves)
    }

    #[inline]
    pub fn is_signal_source(&self) -> bool { matches!(self.kind, BlockKind::RedstoneTorch) }

    #[inline]
    pub fn prevents_mob_spawning_inside(&self) -> bool { matches!(self.kind, BlockKind::Rail) }

    /// Blocks that hurt whatever stands in them.
    #[inline]
    pub fn is_dangerous(&self, fire_immune: bool) -> bool {
        match self.kind {
            BlockKind::Fire | BlockKind::Magma => !fire_immune,
            BlockKind::Cactus => true,
            _ => false,
        }
    }

    /// Whether a mob may stand on top of this block.
    #[inline]
    pub fn is_valid_spawn_floor(&self, fire_immune: bool) -> bool {
        match self.kind {
            BlockKind::Bedrock | BlockKind::Glass | BlockKind::Leaves => false,
            BlockKind::Magma => fire_immune,
            _ => self.is_collision_shape_full_block(),
        }
    }

    /// Whether a land-walking mob can path through this block.
    #[inline]
    pub fn is_pathfindable(&self) -> bool { !self.is_solid() && self.fluid().is_empty() }
}

impl From<BlockKind> for Block {
    fn from(kind: BlockKind) -> Self { Self::new(kind) }
}
