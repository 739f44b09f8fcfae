//! Entitlement gate.
//!
//! Locking is a selection policy for the caller. The pipeline renders any
//! filter it is given, premium or not.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::catalog::{Catalog, FilterDefinition, FilterId};

/// Whether `filter` may be selected given the user's pro status.
pub fn is_unlocked(filter: &FilterDefinition, pro_status: bool) -> bool {
    !filter.is_premium_only() || pro_status
}

/// Live view of the user's pro status, owned outside the engine.
///
/// Read on every decision and never cached.
pub trait EntitlementSource: Send + Sync {
    fn is_pro(&self) -> bool;
}

impl EntitlementSource for bool {
    fn is_pro(&self) -> bool {
        *self
    }
}

impl EntitlementSource for AtomicBool {
    fn is_pro(&self) -> bool {
        self.load(Ordering::Acquire)
    }
}

impl<T: EntitlementSource + ?Sized> EntitlementSource for Arc<T> {
    fn is_pro(&self) -> bool {
        (**self).is_pro()
    }
}

/// Selectability of one catalog entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterAvailability {
    pub id: FilterId,
    pub unlocked: bool,
}

/// Selectability of every entry of `catalog`, in order.
pub fn availability(catalog: &Catalog, source: &dyn EntitlementSource) -> Vec<FilterAvailability> {
    let pro = source.is_pro();
    catalog
        .iter()
        .map(|filter| FilterAvailability {
            id: filter.id().clone(),
            unlocked: is_unlocked(filter, pro),
        })
        .collect()
}
