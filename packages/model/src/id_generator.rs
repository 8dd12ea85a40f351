use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, OnceLock};
use std::time::{SystemTime, UNIX_EPOCH};

use crate::component::ComponentId;

/// Hands out strictly increasing component ids.
///
/// The default generator is seeded from the wall clock in milliseconds so
/// fresh ids sort after ids persisted by earlier sessions.
#[derive(Debug)]
pub struct IdGenerator {
    next: AtomicU64,
}

static GLOBAL: OnceLock<Arc<IdGenerator>> = OnceLock::new();

impl IdGenerator {
    pub fn new() -> Self {
        Self::starting_at(clock_millis())
    }

    /// Generator whose first id is `first` (clamped to 1).
    pub fn starting_at(first: ComponentId) -> Self {
        Self {
            next: AtomicU64::new(first.max(1)),
        }
    }

    /// Process-wide generator shared by every editor that doesn't bring its own.
    pub fn global() -> Arc<IdGenerator> {
        Arc::clone(GLOBAL.get_or_init(|| Arc::new(IdGenerator::new())))
    }

    pub fn next_id(&self) -> ComponentId {
        self.next.fetch_add(1, Ordering::Relaxed)
    }

    /// Ensure no future id is `<= id`.
    pub fn reserve_through(&self, id: ComponentId) {
        self.next.fetch_max(id.saturating_add(1), Ordering::Relaxed);
    }

    /// The id the next call to [`next_id`](Self::next_id) would return.
    pub fn peek(&self) -> ComponentId {
        self.next.load(Ordering::Relaxed)
    }
}

impl Default for IdGenerator {
    fn default() -> Self {
        Self::new()
    }
}

fn clock_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(1)
}
