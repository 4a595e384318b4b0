//! bsync-core
//!
//! Client-side synchronization of budget entities with the REST service:
//! request envelopes, per-kind stores, gateways, reference resolution and form sessions.
//! Depends on bsync-domain. No concrete transport, no rendering.

pub mod envelope;
pub mod error;
pub mod form;
pub mod gateway;
pub mod reference;
pub mod store;
pub mod time;
pub mod transport;

pub use envelope::*;
pub use error::SyncError;
pub use form::FormSession;
pub use gateway::{EntityGateway, GatewaySettings, ListParams, Pending, CACHE_BUSTER_PARAM};
pub use reference::{
    extract_budget_reference, lookup_budget, owner_of, resolve_budget_reference, sanitize, Draft,
    NO_BUDGET_SELECTED,
};
pub use store::{reduce, EntityState, EntityStore, ResponseOrdering, SubscriptionId};
pub use time::Clock;
pub use transport::{HttpRequest, HttpResponse, Method, Transport};
