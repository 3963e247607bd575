//! Shared, replace-on-write holder for the current plan.

use std::sync::Arc;

use tokio::sync::watch;

use crate::model::CookingPlan;

/// The session's current plan, if any.
///
/// Writers replace the whole value; readers take cheap `Arc` snapshots and
/// never observe a half-applied plan. Clones share the same slot. When
/// several writers race, the last `replace` to run is what everyone sees.
#[derive(Debug, Clone)]
pub struct PlanSlot {
    tx: Arc<watch::Sender<Option<Arc<CookingPlan>>>>,
}

impl PlanSlot {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(None);
        Self { tx: Arc::new(tx) }
    }

    /// Current plan snapshot.
    pub fn current(&self) -> Option<Arc<CookingPlan>> {
        self.tx.borrow().clone()
    }

    pub fn is_empty(&self) -> bool {
        self.tx.borrow().is_none()
    }

    /// Install a new plan, returning the one it displaced.
    pub fn replace(&self, plan: CookingPlan) -> Option<Arc<CookingPlan>> {
        self.tx.send_replace(Some(Arc::new(plan)))
    }

    /// Drop the current plan.
    pub fn clear(&self) -> Option<Arc<CookingPlan>> {
        self.tx.send_replace(None)
    }

    /// Receiver notified on every replace or clear.
    pub fn subscribe(&self) -> watch::Receiver<Option<Arc<CookingPlan>>> {
        self.tx.subscribe()
    }
}

impl Default for PlanSlot {
    fn default() -> Self {
        Self::new()
    }
}
