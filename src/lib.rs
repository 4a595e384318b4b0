#![doc(test(attr(deny(warnings))))]

//! Budget Sync keeps a local, normalized view of budgets and their incomes and
//! outcomes in step with a remote REST service, and drives the create/edit/delete
//! workflows against it.
//!
//! The moving parts live in the `bsync-*` crates; this crate wires them into a
//! [`BudgetSyncClient`] and owns process-level setup.

pub mod client;
pub mod errors;
pub mod system_clock;
pub mod utils;

pub use bsync_config::{ClientConfig, ConfigError, ConfigManager, OrderingMode};
pub use bsync_core::{
    Draft, EntityGateway, EntityState, EntityStore, FormSession, ListParams, Pending,
    ResponseOrdering, SubscriptionId, SyncError, Transport,
};
pub use bsync_domain::{Budget, BudgetRef, EntityKind, Income, Outcome};
pub use bsync_transport_memory::InMemoryRestServer;
pub use client::BudgetSyncClient;
pub use errors::ClientError;
pub use system_clock::SystemClock;

/// Initializes global tracing with the default filter and logs build metadata.
pub fn init() {
    init_with(&ClientConfig::default());
}

/// Like [`init`], honouring the config's `log_filter`. Only the first call
/// installs a subscriber.
pub fn init_with(config: &ClientConfig) {
    utils::init_tracing(config.log_filter.as_deref());
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn init_does_not_panic() {
        super::init();
        super::init_with(&ClientConfig {
            log_filter: Some("budget_sync=debug".into()),
            ..ClientConfig::default()
        });
    }

    #[test]
    fn build_metadata_is_embedded() {
        let meta = utils::build_info::current();
        assert_eq!(meta.version, env!("CARGO_PKG_VERSION"));
        assert!(meta.to_string().starts_with("budget_sync "));
    }
}
