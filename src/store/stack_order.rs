//! Persisted stack ordering of clients
//!
//! The order controls which client's area draws innermost in a stacked
//! rendering. It is reconciled whenever the enabled-client set changes:
//! survivors keep their relative order, newcomers append in the input's
//! order, stale entries drop out. A no-op reconciliation returns the
//! borrowed input so callers can skip the redundant persistence
//! write. That identity is required behavior, not an optimization nicety.

use std::borrow::Cow;

use crate::store::{get_typed, set_typed, KeyValueStore};
use crate::types::ClientId;

/// Default storage key for the stack order
pub const STACK_ORDER_KEY: &str = "chart.stack-order";

/// Persisted draw-order permutation of enabled clients
#[derive(Debug, Clone)]
pub struct StackOrderStore {
    storage_key: String,
}

impl Default for StackOrderStore {
    fn default() -> Self {
        Self::new(STACK_ORDER_KEY)
    }
}

impl StackOrderStore {
    /// Create a store with the given storage key
    pub fn new(storage_key: impl Into<String>) -> Self {
        Self {
            storage_key: storage_key.into(),
        }
    }

    /// Load the persisted order, empty when nothing was stored
    pub fn load(&self, store: &dyn KeyValueStore) -> Vec<ClientId> {
        get_typed(store, &self.storage_key).unwrap_or_default()
    }

    /// Persist the order; failure is logged and swallowed
    pub fn save(&self, store: &mut dyn KeyValueStore, order: &[ClientId]) {
        if let Err(e) = set_typed(store, &self.storage_key, &order) {
            tracing::warn!("Failed to persist stack order: {}", e);
        }
    }
}

/// Adjust a persisted order to a changed enabled-client set
///
/// Survivors of `current` that are still enabled keep their relative order;
/// enabled clients missing from `current` append in `enabled`'s order. The
/// result is a permutation of `enabled`: no duplicates, no omissions, no
/// stale entries. When nothing changes the borrowed input comes back
/// unchanged, letting callers skip the persistence write.
pub fn reconcile<'a>(current: &'a [ClientId], enabled: &[ClientId]) -> Cow<'a, [ClientId]> {
    let kept: Vec<&ClientId> = current.iter().filter(|id| enabled.contains(*id)).collect();
    let added: Vec<&ClientId> = enabled.iter().filter(|id| !current.contains(*id)).collect();

    if kept.len() == current.len() && added.is_empty() {
        return Cow::Borrowed(current);
    }

    Cow::Owned(kept.into_iter().chain(added).cloned().collect())
}

/// Move one client to the front (innermost draw position)
pub fn move_to_front(current: &[ClientId], id: &ClientId) -> Vec<ClientId> {
    std::iter::once(id.clone())
        .chain(current.iter().filter(|c| *c != id).cloned())
        .collect()
}
