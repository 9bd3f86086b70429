//! Collection (journal) view model.
//!
//! Each plant has five variant slots: the perfect result and one slot per
//! non-perfect quality tier. A slot shows its unlocked sprite once the ledger
//! records it, and the plant's silhouette otherwise.

use serde::Serialize;
use tracing::{debug, warn};

use crate::config::{Config, PlantConfig};
use crate::core::scoring::{CORRECT_POINTS, MAX_QUALITY};
use crate::storage::{LedgerStore, ProgressStore};

/// Quality tiers with their own collection slot, in display order. The 100
/// tier is represented by the perfect slot.
pub const MUTATION_SLOT_TIERS: [u8; 4] = [75, 50, 25, 0];

/// Which variant a slot stands for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "kind", content = "tier")]
pub enum Variant {
    Perfect,
    Mutation(u8),
}

impl Variant {
    /// Number of mutations the variant's sprite depicts.
    pub fn mutation_count(&self) -> u8 {
        match self {
            Variant::Perfect => 0,
            Variant::Mutation(tier) => {
                let missing = MAX_QUALITY - (*tier).min(MAX_QUALITY);
                missing / CORRECT_POINTS as u8
            }
        }
    }

    pub fn label(&self) -> String {
        match self {
            Variant::Perfect => "perfect".to_string(),
            Variant::Mutation(tier) => format!("{}%", tier),
        }
    }
}

/// One slot of a collection entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VariantSlot {
    pub variant: Variant,
    pub unlocked: bool,
    /// Sprite to show: the variant's sprite when unlocked, the silhouette
    /// otherwise. `None` when neither is configured.
    pub sprite: Option<String>,
}

/// Unlock state of one plant, ready to display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CollectionEntry {
    pub plant_id: String,
    pub name: String,
    pub perfect_unlocked: bool,
    /// Perfect slot first, then 75, 50, 25, 0.
    pub slots: Vec<VariantSlot>,
}

impl CollectionEntry {
    pub fn load<S: LedgerStore>(plant: &PlantConfig, progress: &ProgressStore<S>) -> Self {
        let perfect_unlocked = progress.is_perfect_unlocked(&plant.id);
        let tiers = progress.unlocked_tiers(&plant.id);

        let slots = std::iter::once((Variant::Perfect, perfect_unlocked))
            .chain(
                MUTATION_SLOT_TIERS
                    .iter()
                    .map(|&tier| (Variant::Mutation(tier), tiers.contains(&tier))),
            )
            .map(|(variant, unlocked)| slot(plant, variant, unlocked))
            .collect();

        debug!(plant = %plant.id, perfect_unlocked, ?tiers, "collection entry loaded");

        Self {
            plant_id: plant.id.clone(),
            name: plant.name.clone(),
            perfect_unlocked,
            slots,
        }
    }

    /// Sprite for the journal page: the perfect sprite once unlocked, the
    /// silhouette before that.
    pub fn journal_sprite(&self) -> Option<&str> {
        self.slots.first().and_then(|slot| slot.sprite.as_deref())
    }

    pub fn unlocked_count(&self) -> usize {
        self.slots.iter().filter(|slot| slot.unlocked).count()
    }
}

fn slot(plant: &PlantConfig, variant: Variant, unlocked: bool) -> VariantSlot {
    let silhouette = plant.visuals.silhouette_sprite.as_deref();
    let sprite = if unlocked {
        match plant.visuals.result_sprite(variant.mutation_count()) {
            Some(sprite) => Some(sprite),
            None => {
                warn!(
                    plant = %plant.id,
                    variant = %variant.label(),
                    "unlocked sprite not configured"
                );
                silhouette
            }
        }
    } else {
        silhouette
    };

    if sprite.is_none() {
        warn!(plant = %plant.id, variant = %variant.label(), "no sprite to show");
    }

    VariantSlot {
        variant,
        unlocked,
        sprite: sprite.map(str::to_owned),
    }
}

/// The whole journal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Collection {
    pub entries: Vec<CollectionEntry>,
    /// Plants whose perfect variant is unlocked.
    pub perfect_count: usize,
    pub total: usize,
}

impl Collection {
    /// Build entries for every catalog plant.
    pub fn load<S: LedgerStore>(config: &Config, progress: &ProgressStore<S>) -> Self {
        let entries: Vec<CollectionEntry> = config
            .plants
            .iter()
            .map(|plant| CollectionEntry::load(plant, progress))
            .collect();
        let perfect_count = entries.iter().filter(|e| e.perfect_unlocked).count();

        Self {
            total: entries.len(),
            perfect_count,
            entries,
        }
    }
}
