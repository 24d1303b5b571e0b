use serde::Serialize;
use std::{
    collections::BTreeMap,
    sync::{LazyLock, Mutex},
};

static METRICS: LazyLock<Mutex<EventState>> = LazyLock::new(|| Mutex::new(EventState::default()));

///
/// EventState
/// Ephemeral, in-memory counters for repository operations.
///

#[derive(Clone, Debug, Default, Serialize)]
pub struct EventState {
    pub ops: EventOps,
    pub entities: BTreeMap<String, EntityCounters>,
}

///
/// EventOps
///

#[derive(Clone, Debug, Default, Serialize)]
pub struct EventOps {
    // Repository entrypoints
    pub save_calls: u64,
    pub load_calls: u64,
    pub exists_calls: u64,
    pub delete_calls: u64,
    pub map_write_calls: u64,
    pub map_read_calls: u64,
    pub map_delete_calls: u64,
    pub script_calls: u64,

    // Rows touched
    pub rows_loaded: u64,
    pub rows_deleted: u64,
}

///
/// EntityCounters
///

#[derive(Clone, Debug, Default, Serialize)]
pub struct EntityCounters {
    pub save_calls: u64,
    pub load_calls: u64,
    pub exists_calls: u64,
    pub delete_calls: u64,
    pub script_calls: u64,
    pub rows_loaded: u64,
    pub rows_deleted: u64,
}

///
/// Event
/// One counted repository operation.
///

#[derive(Clone, Copy, Debug)]
pub(crate) enum Event {
    Save,
    Load { rows: u64 },
    Exists,
    Delete { rows: u64 },
    MapWrite,
    MapRead,
    MapDelete,
    Script,
}

/// Record one operation against an entity's counters.
pub(crate) fn record(entity: &'static str, event: Event) {
    let mut state = METRICS.lock().expect("metrics lock poisoned");
    let counters = state.entities.entry(entity.to_string()).or_default();

    match event {
        Event::Save => {
            counters.save_calls += 1;
        }
        Event::Load { rows } => {
            counters.load_calls += 1;
            counters.rows_loaded += rows;
        }
        Event::Exists => {
            counters.exists_calls += 1;
        }
        Event::Delete { rows } => {
            counters.delete_calls += 1;
            counters.rows_deleted += rows;
        }
        Event::Script => {
            counters.script_calls += 1;
        }
        Event::MapWrite | Event::MapRead | Event::MapDelete => {}
    }

    let ops = &mut state.ops;
    match event {
        Event::Save => ops.save_calls += 1,
        Event::Load { rows } => {
            ops.load_calls += 1;
            ops.rows_loaded += rows;
        }
        Event::Exists => ops.exists_calls += 1,
        Event::Delete { rows } => {
            ops.delete_calls += 1;
            ops.rows_deleted += rows;
        }
        Event::MapWrite => ops.map_write_calls += 1,
        Event::MapRead => ops.map_read_calls += 1,
        Event::MapDelete => ops.map_delete_calls += 1,
        Event::Script => ops.script_calls += 1,
    }
}

/// Point-in-time snapshot of all counters.
#[must_use]
pub fn metrics_report() -> EventState {
    METRICS.lock().expect("metrics lock poisoned").clone()
}

/// Zero every counter.
pub fn metrics_reset() {
    *METRICS.lock().expect("metrics lock poisoned") = EventState::default();
}
