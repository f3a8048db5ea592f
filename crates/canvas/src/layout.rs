//! Deterministic placement of wall entries into 2D canvas coordinates.
//!
//! Entries are laid out on a sunflower (Vogel) spiral: entry `i` lands at
//! radius `spacing * sqrt(i)` and angle `i * GOLDEN_ANGLE`, plus a small
//! jitter derived from the entry id. The spiral gives near-uniform density
//! without any pairwise collision solving, and its radius grows
//! monotonically with the placement index, so placement order doubles as
//! the reveal order: the wall fills outward from the anchor.

use crate::entry::{EntryId, SignatureRecord};
use glam::Vec2;
use log::debug;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

/// The golden angle in radians, `2π(1 − 1/φ)`.
pub const GOLDEN_ANGLE: f32 = 2.399_963_2;

/// Tuning knobs for signature placement.
#[derive(Debug, Clone, PartialEq)]
pub struct LayoutConfig {
    /// Radial step between successive placements. Roughly the distance
    /// between neighboring signatures.
    pub spacing: f32,
    /// Maximum per-axis offset applied to each placement so the spiral does
    /// not read as a rigid pattern.
    pub jitter: f32,
    /// World-space point the wall grows outward from.
    pub anchor: Vec2,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        LayoutConfig {
            spacing: 150.0,
            jitter: 16.0,
            anchor: Vec2::ZERO,
        }
    }
}

/// One entry placed on the canvas. Produced once per layout pass and never
/// mutated afterward.
#[derive(Debug, Clone, PartialEq)]
pub struct SignaturePosition {
    pub id: EntryId,
    /// World-space center of the element.
    pub world: Vec2,
    pub record: SignatureRecord,
}

/// The result of one layout pass: positions for every entry, plus the order
/// in which they should animate into view.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Layout {
    pub positions: Vec<SignaturePosition>,
    /// Permutation of the position ids; consumed ring-by-ring by the reveal
    /// composer.
    pub reveal_order: Vec<EntryId>,
}

impl Layout {
    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }
}

/// Jitter offset for an entry, derived entirely from its id so that the
/// same entry always lands in the same spot.
fn jitter_for(id: &EntryId, amplitude: f32) -> Vec2 {
    let amplitude = amplitude.max(0.0);
    let mut hasher = DefaultHasher::new();
    id.as_str().hash(&mut hasher);
    let mut rng = StdRng::seed_from_u64(hasher.finish());
    Vec2::new(
        rng.random_range(-amplitude..=amplitude),
        rng.random_range(-amplitude..=amplitude),
    )
}

/// Maps an ordered list of entries to world-space positions and a reveal
/// order.
///
/// Pure and deterministic: the same records in the same order always produce
/// the same layout. An empty input produces an empty layout. Duplicate ids
/// violate the caller contract; each input element still gets its own
/// position and the function never panics.
pub fn compute_layout(records: &[SignatureRecord], config: &LayoutConfig) -> Layout {
    let mut positions = Vec::with_capacity(records.len());
    let mut reveal_order = Vec::with_capacity(records.len());

    for (index, record) in records.iter().enumerate() {
        let radius = config.spacing * (index as f32).sqrt();
        let angle = index as f32 * GOLDEN_ANGLE;
        let world = config.anchor
            + Vec2::new(radius * angle.cos(), radius * angle.sin())
            + jitter_for(&record.id, config.jitter);

        positions.push(SignaturePosition {
            id: record.id.clone(),
            world,
            record: record.clone(),
        });
        reveal_order.push(record.id.clone());
    }

    Layout {
        positions,
        reveal_order,
    }
}

/// Memoizes [`compute_layout`] on the entry-id list and config.
///
/// Re-renders hand the same record list back every pass; the cache makes
/// that free. The key deliberately ignores record payloads: placement
/// depends only on ids and order, which is also what "the entry set
/// changed" means for the feed.
#[derive(Default)]
pub struct LayoutCache {
    key: Option<(Vec<EntryId>, LayoutConfig)>,
    value: Option<Arc<Layout>>,
}

impl LayoutCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the cached layout when ids and config are unchanged,
    /// recomputing otherwise.
    pub fn get_or_compute(
        &mut self,
        records: &[SignatureRecord],
        config: &LayoutConfig,
    ) -> Arc<Layout> {
        let hit = match (&self.key, &self.value) {
            (Some((ids, cached_config)), Some(_)) => {
                cached_config == config
                    && ids.len() == records.len()
                    && ids.iter().zip(records).all(|(id, record)| *id == record.id)
            }
            _ => false,
        };

        if !hit {
            debug!("layout recomputed for {} entries", records.len());
            let layout = Arc::new(compute_layout(records, config));
            self.key = Some((
                records.iter().map(|r| r.id.clone()).collect(),
                config.clone(),
            ));
            self.value = Some(layout);
        }

        // Freshly stored above when it was not a hit
        self.value
            .clone()
            .unwrap_or_else(|| Arc::new(Layout::default()))
    }

    /// Drops the cached layout so the next call recomputes.
    pub fn invalidate(&mut self) {
        self.key = None;
        self.value = None;
    }
}
