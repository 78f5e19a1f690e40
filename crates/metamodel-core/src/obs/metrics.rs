use crate::model::types::ElementKind;
use serde::{Deserialize, Serialize};
use std::{cell::RefCell, collections::BTreeMap};

///
/// EventState
/// Ephemeral, in-memory counters for bootstrap and path construction.
///

#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub struct EventState {
    pub ops: EventOps,

    /// Plural attributes built, by element kind.
    pub plural_elements: BTreeMap<ElementKind, u64>,

    // Shape of the most recent successful bootstrap
    pub last_managed_types: u64,
    pub last_attributes: u64,
}

///
/// EventOps
///

#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub struct EventOps {
    // Bootstrap
    pub bootstrap_runs: u64,
    pub bootstrap_failures: u64,
    pub attributes_built: u64,
    pub plural_attributes_built: u64,

    // Query paths
    pub paths_created: u64,
    pub plural_paths_created: u64,
}

thread_local! {
    static EVENT_STATE: RefCell<EventState> = RefCell::new(EventState::default());
}

/// Borrow metrics immutably.
pub(crate) fn with_state<R>(f: impl FnOnce(&EventState) -> R) -> R {
    EVENT_STATE.with(|m| f(&m.borrow()))
}

/// Borrow metrics mutably.
pub(crate) fn with_state_mut<R>(f: impl FnOnce(&mut EventState) -> R) -> R {
    EVENT_STATE.with(|m| f(&mut m.borrow_mut()))
}

/// Reset all counters.
pub(crate) fn reset_all() {
    with_state_mut(|m| *m = EventState::default());
}

///
/// EventReport
///

#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub struct EventReport {
    /// Ephemeral counters since the last reset.
    pub counters: Option<EventState>,

    /// Share of plural attributes that are associations (entity elements).
    pub association_ratio: f64,
}

#[expect(clippy::cast_precision_loss)]
pub(crate) fn report() -> EventReport {
    let snap = with_state(Clone::clone);

    let plural = snap.ops.plural_attributes_built;
    let entity = snap
        .plural_elements
        .get(&ElementKind::Entity)
        .copied()
        .unwrap_or_default();
    let association_ratio = if plural > 0 {
        entity as f64 / plural as f64
    } else {
        0.0
    };

    EventReport {
        counters: Some(snap),
        association_ratio,
    }
}

///
/// TESTS
///
