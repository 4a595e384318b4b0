#![allow(dead_code)]

use std::{cell::RefCell, rc::Rc, sync::Mutex};

use budget_sync::{
    BudgetSyncClient, ClientConfig, ConfigManager, EntityState, EntityStore, InMemoryRestServer,
    Transport,
};
use bsync_core::Clock;
use bsync_domain::Entity;
use chrono::{DateTime, TimeZone, Utc};
use once_cell::sync::Lazy;
use tempfile::TempDir;

/// Holds TempDir guards so temporary folders live for the duration of the test run.
static TEST_DIRS: Lazy<Mutex<Vec<TempDir>>> = Lazy::new(|| Mutex::new(Vec::new()));

/// Epoch milliseconds every fixture clock reports.
pub const FIXED_MILLIS: i64 = 1_714_564_800_000;

pub struct FixedClock;

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        Utc.timestamp_millis_opt(FIXED_MILLIS)
            .single()
            .unwrap_or_default()
    }
}

/// A client wired to its own in-memory server.
pub struct Harness {
    pub server: Rc<InMemoryRestServer>,
    pub client: BudgetSyncClient,
}

pub fn harness() -> Harness {
    harness_with(ClientConfig::default())
}

pub fn harness_with(config: ClientConfig) -> Harness {
    budget_sync::init();
    let server = Rc::new(InMemoryRestServer::new(&config.api_base));
    let transport: Rc<dyn Transport> = server.clone();
    let client = BudgetSyncClient::with_clock(transport, Rc::new(FixedClock), config)
        .expect("valid config");
    Harness { server, client }
}

/// Creates an isolated config manager backed by a unique directory.
pub fn temp_config_manager() -> ConfigManager {
    let temp = TempDir::new().expect("create temp dir");
    let base = temp.path().to_path_buf();
    TEST_DIRS.lock().expect("lock temp dir registry").push(temp);
    ConfigManager::with_base_dir(base).expect("create config manager for temp dir")
}

/// Records every snapshot a store publishes.
pub fn record<E: Entity>(store: &EntityStore<E>) -> Rc<RefCell<Vec<EntityState<E>>>> {
    let snapshots = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&snapshots);
    store.subscribe(move |state| sink.borrow_mut().push(state.clone()));
    snapshots
}
