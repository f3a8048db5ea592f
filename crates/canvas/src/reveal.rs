//! Staggered reveal of signatures, ring by ring.
//!
//! Elements animate into view in small batches ("rings") rather than one by
//! one. The ring index wraps at `ring_count`, so total reveal latency stays
//! bounded no matter how many signatures a wall collects. The core holds no
//! timers; the shell ticks elapsed time and asks the schedule which
//! elements have become visible.

use crate::entry::EntryId;
use std::collections::HashMap;
use std::time::Duration;

/// Timing constants for the reveal animation.
#[derive(Debug, Clone, PartialEq)]
pub struct RevealConfig {
    /// Number of elements sharing one stagger delay.
    pub ring_size: usize,
    /// Number of distinct delays before the ring index wraps.
    pub ring_count: usize,
    /// Delay before the first ring appears.
    pub base_delay: Duration,
    /// Additional delay per ring.
    pub stagger: Duration,
}

impl Default for RevealConfig {
    fn default() -> Self {
        RevealConfig {
            ring_size: 5,
            ring_count: 8,
            base_delay: Duration::from_millis(80),
            stagger: Duration::from_millis(120),
        }
    }
}

/// Ring an element belongs to, given its rank in the reveal order.
pub fn ring_index(reveal_index: usize, config: &RevealConfig) -> usize {
    (reveal_index / config.ring_size.max(1)) % config.ring_count.max(1)
}

/// Reveal delay for an element, given its rank in the reveal order.
pub fn reveal_delay(reveal_index: usize, config: &RevealConfig) -> Duration {
    config.base_delay + config.stagger * ring_index(reveal_index, config) as u32
}

/// Precomputed reveal delays for one layout pass.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RevealSchedule {
    delays: HashMap<EntryId, Duration>,
    max_delay: Duration,
}

impl RevealSchedule {
    pub fn new(reveal_order: &[EntryId], config: &RevealConfig) -> Self {
        let mut delays = HashMap::with_capacity(reveal_order.len());
        let mut max_delay = Duration::ZERO;

        for (index, id) in reveal_order.iter().enumerate() {
            let delay = reveal_delay(index, config);
            max_delay = max_delay.max(delay);
            delays.insert(id.clone(), delay);
        }

        RevealSchedule { delays, max_delay }
    }

    pub fn len(&self) -> usize {
        self.delays.len()
    }

    pub fn is_empty(&self) -> bool {
        self.delays.is_empty()
    }

    /// Delay before `id` becomes visible. Ids outside the schedule reveal
    /// immediately.
    pub fn delay_of(&self, id: &EntryId) -> Duration {
        self.delays.get(id).copied().unwrap_or(Duration::ZERO)
    }

    /// Whether `id` has become visible `elapsed` time after mount.
    pub fn revealed(&self, id: &EntryId, elapsed: Duration) -> bool {
        elapsed >= self.delay_of(id)
    }

    /// Upper bound on the reveal animation, independent of element count.
    pub fn max_delay(&self) -> Duration {
        self.max_delay
    }
}
