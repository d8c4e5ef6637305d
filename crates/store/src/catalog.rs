//! Static catalog of category building blocks.
//!
//! Blocks flagged `is_default` are the categories every user sees: their
//! preferences heal back to visible on each reconciliation pass.

use unicode_normalization::{UnicodeNormalization, char::is_combining_mark};

use crate::{ExpenseCategory, NewCategory};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BuildingBlock {
    /// Stable key stored on categories seeded from this block.
    pub key: &'static str,
    pub name: &'static str,
    pub color: &'static str,
    pub icon: &'static str,
    pub is_default: bool,
}

impl BuildingBlock {
    /// Payload creating a category from this block.
    pub fn new_category(&self) -> NewCategory {
        NewCategory {
            name: self.name.to_string(),
            color: self.color.to_string(),
            icon: Some(self.icon.to_string()),
            builtin_key: Some(self.key.to_string()),
        }
    }
}

pub const BUILDING_BLOCKS: &[BuildingBlock] = &[
    BuildingBlock {
        key: "food",
        name: "Food",
        color: "#F59E0B",
        icon: "bowl",
        is_default: true,
    },
    BuildingBlock {
        key: "veterinary",
        name: "Veterinary",
        color: "#EF4444",
        icon: "stethoscope",
        is_default: true,
    },
    BuildingBlock {
        key: "medication",
        name: "Medication",
        color: "#8B5CF6",
        icon: "pill",
        is_default: true,
    },
    BuildingBlock {
        key: "grooming",
        name: "Grooming",
        color: "#EC4899",
        icon: "scissors",
        is_default: true,
    },
    BuildingBlock {
        key: "toys",
        name: "Toys",
        color: "#10B981",
        icon: "ball",
        is_default: false,
    },
    BuildingBlock {
        key: "accessories",
        name: "Accessories",
        color: "#06B6D4",
        icon: "collar",
        is_default: false,
    },
    BuildingBlock {
        key: "insurance",
        name: "Insurance",
        color: "#3B82F6",
        icon: "shield",
        is_default: false,
    },
    BuildingBlock {
        key: "training",
        name: "Training",
        color: "#84CC16",
        icon: "whistle",
        is_default: false,
    },
    BuildingBlock {
        key: "boarding",
        name: "Boarding",
        color: "#F97316",
        icon: "house",
        is_default: false,
    },
    BuildingBlock {
        key: "other",
        name: "Other",
        color: "#6B7280",
        icon: "dots",
        is_default: false,
    },
];

/// Catalog lookups used by the reconciler.
#[derive(Debug, Clone, Copy)]
pub struct Catalog {
    blocks: &'static [BuildingBlock],
}

impl Default for Catalog {
    fn default() -> Self {
        Self::new(BUILDING_BLOCKS)
    }
}

impl Catalog {
    pub const fn new(blocks: &'static [BuildingBlock]) -> Self {
        Self { blocks }
    }

    pub fn blocks(&self) -> &'static [BuildingBlock] {
        self.blocks
    }

    pub fn by_key(&self, key: &str) -> Option<&'static BuildingBlock> {
        self.blocks.iter().find(|block| block.key == key)
    }

    /// Block a category belongs to: by its `builtin_key` tag when present,
    /// otherwise by normalised display name.
    pub fn block_for(&self, category: &ExpenseCategory) -> Option<&'static BuildingBlock> {
        if let Some(key) = category.builtin_key.as_deref() {
            return self.by_key(key);
        }
        let norm = normalize_key(&category.name)?;
        self.blocks
            .iter()
            .find(|block| normalize_key(block.name).as_deref() == Some(norm.as_str()))
    }

    pub fn is_default(&self, category: &ExpenseCategory) -> bool {
        self.block_for(category).is_some_and(|block| block.is_default)
    }
}

/// Lower-case, accent-free, single-spaced form of a category name.
pub(crate) fn normalize_key(input: &str) -> Option<String> {
    let mut out = String::new();
    let mut prev_space = false;
    for ch in input.trim().nfkd() {
        if is_combining_mark(ch) {
            continue;
        }
        if ch.is_alphanumeric() {
            out.extend(ch.to_lowercase());
            prev_space = false;
        } else if !out.is_empty() && !prev_space {
            out.push(' ');
            prev_space = true;
        }
    }
    let normalized = out.trim();
    if normalized.is_empty() {
        None
    } else {
        Some(normalized.to_string())
    }
}
