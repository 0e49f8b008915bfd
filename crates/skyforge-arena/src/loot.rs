//! Loot table: fills chests with random items when a round starts.
//!
//! Each of a chest's 27 slots independently has a 1 in 3 chance of
//! getting a stack. A filled slot picks a category uniformly, an item
//! uniformly within it, and a quantity by the category's rule.

use std::ops::RangeInclusive;

use rand::Rng;
use serde::{Deserialize, Serialize};
use skyforge_protocol::ItemStack;

/// Slots in a single chest.
pub const CHEST_SLOTS: usize = 27;

/// Chance (as `numerator / denominator`) that a given slot is filled.
const FILL_NUMERATOR: u32 = 1;
const FILL_DENOMINATOR: u32 = 3;

// ---------------------------------------------------------------------------
// ChestContents
// ---------------------------------------------------------------------------

/// The full contents of one chest, slot by slot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChestContents {
    slots: [Option<ItemStack>; CHEST_SLOTS],
}

impl ChestContents {
    /// A cleared chest.
    pub fn empty() -> Self {
        Self {
            slots: [None; CHEST_SLOTS],
        }
    }

    pub fn get(&self, slot: usize) -> Option<ItemStack> {
        self.slots.get(slot).copied().flatten()
    }

    pub fn set(&mut self, slot: usize, item: Option<ItemStack>) {
        if let Some(entry) = self.slots.get_mut(slot) {
            *entry = item;
        }
    }

    pub fn slots(&self) -> &[Option<ItemStack>] {
        &self.slots
    }

    /// Number of slots holding a stack.
    pub fn filled(&self) -> usize {
        self.slots.iter().filter(|s| s.is_some()).count()
    }
}

impl Default for ChestContents {
    fn default() -> Self {
        Self::empty()
    }
}

// ---------------------------------------------------------------------------
// Categories
// ---------------------------------------------------------------------------

/// Item categories. The category decides how many of an item a stack has.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LootCategory {
    /// Tools and weapons: always one.
    Tools,
    /// Armor pieces: always one.
    Armor,
    /// Stackable food: 5 to 64.
    Food,
    /// Building blocks: 5 to 64.
    Blocks,
    /// Ores, ingots, and other materials: 1 to 5.
    Materials,
}

impl LootCategory {
    /// The quantity range a stack of this category is rolled from.
    pub fn quantity(self) -> RangeInclusive<u8> {
        match self {
            Self::Tools | Self::Armor => 1..=1,
            Self::Food | Self::Blocks => 5..=64,
            Self::Materials => 1..=5,
        }
    }
}

/// A category and the item ids it draws from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LootPool {
    pub category: LootCategory,
    pub items: Vec<u16>,
}

// ---------------------------------------------------------------------------
// LootTable
// ---------------------------------------------------------------------------

/// Categorized item pools used to fill loot containers.
///
/// `Default` is the classic five-pool table. Pools with no items are
/// skipped when rolling so a trimmed custom table cannot produce empty
/// stacks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LootTable {
    pub pools: Vec<LootPool>,
}

impl Default for LootTable {
    fn default() -> Self {
        Self {
            pools: vec![
                LootPool {
                    category: LootCategory::Tools,
                    items: vec![
                        256, 257, 258, 267, 268, 269, 270, 271, 272, 273, 274, 275, 276, 277,
                        278, 279,
                    ],
                },
                LootPool {
                    category: LootCategory::Armor,
                    items: (298..=317).collect(),
                },
                LootPool {
                    category: LootCategory::Food,
                    items: vec![319, 320, 297, 391, 392, 393, 396, 400, 411, 412, 423, 424],
                },
                LootPool {
                    category: LootCategory::Blocks,
                    items: vec![1, 2, 3, 4, 5, 12, 13, 14, 15, 16, 17, 18, 82, 35, 45],
                },
                LootPool {
                    category: LootCategory::Materials,
                    items: vec![263, 264, 265, 266, 280, 297, 322],
                },
            ],
        }
    }
}

impl LootTable {
    /// Rolls a freshly cleared chest.
    pub fn fill<R: Rng>(&self, rng: &mut R) -> ChestContents {
        let mut chest = ChestContents::empty();
        let pools: Vec<&LootPool> = self.pools.iter().filter(|p| !p.items.is_empty()).collect();
        if pools.is_empty() {
            return chest;
        }

        for slot in 0..CHEST_SLOTS {
            if rng.random_ratio(FILL_NUMERATOR, FILL_DENOMINATOR) {
                let pool = pools[rng.random_range(0..pools.len())];
                chest.set(slot, Some(Self::roll_stack(pool, rng)));
            }
        }
        chest
    }

    fn roll_stack<R: Rng>(pool: &LootPool, rng: &mut R) -> ItemStack {
        let id = pool.items[rng.random_range(0..pool.items.len())];
        let count = rng.random_range(pool.category.quantity());
        ItemStack::new(id, count)
    }

    /// The category an item id belongs to in this table, first match.
    pub fn category_of(&self, item: u16) -> Option<LootCategory> {
        self.pools
            .iter()
            .find(|p| p.items.contains(&item))
            .map(|p| p.category)
    }
}
