//! Per-kind state container driven by request lifecycle events.

use std::{
    cell::{Cell, RefCell},
    collections::BTreeSet,
    fmt,
    rc::Rc,
};

use bsync_domain::Entity;
use tracing::{trace, warn};

use crate::envelope::{
    Lifecycle, Operation, Payload, Phase, RequestToken, Slot, StoreEvent,
};

/// Which landed response may write a slot when several are in flight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ResponseOrdering {
    /// Only the most recently issued request for a slot may write it.
    #[default]
    LatestRequest,
    /// Every response is applied in delivery order; a slow earlier response
    /// overwrites a faster later one.
    LastResponse,
}

/// Request bookkeeping kept alongside the data.
///
/// `list` and `entity` hold the newest request allowed to write each slot and
/// are cleared once it lands. `fetching` and `mutating` hold every request of
/// that class still in flight; they drive `loading` and `updating`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PendingTokens {
    pub list: Option<RequestToken>,
    pub entity: Option<RequestToken>,
    pub fetching: BTreeSet<RequestToken>,
    pub mutating: BTreeSet<RequestToken>,
}

impl PendingTokens {
    fn get(&self, slot: Slot) -> Option<RequestToken> {
        match slot {
            Slot::List => self.list,
            Slot::Entity => self.entity,
        }
    }

    fn set(&mut self, slot: Slot, token: Option<RequestToken>) {
        match slot {
            Slot::List => self.list = token,
            Slot::Entity => self.entity = token,
        }
    }

    fn in_flight(&mut self, operation: Operation) -> &mut BTreeSet<RequestToken> {
        if operation.is_mutation() {
            &mut self.mutating
        } else {
            &mut self.fetching
        }
    }
}

/// Snapshot of one entity kind's client-side view.
#[derive(Debug, Clone, PartialEq)]
pub struct EntityState<E> {
    /// List-view cache, replaced wholesale on every successful list fetch.
    pub entities: Vec<E>,
    /// Detail/edit-view cache; the default value is the empty entity.
    pub entity: E,
    pub loading: bool,
    pub updating: bool,
    pub update_success: bool,
    pub error: Option<String>,
    pub pending: PendingTokens,
}

impl<E: Default> Default for EntityState<E> {
    fn default() -> Self {
        Self {
            entities: Vec::new(),
            entity: E::default(),
            loading: false,
            updating: false,
            update_success: false,
            error: None,
            pending: PendingTokens::default(),
        }
    }
}

impl<E> EntityState<E> {
    pub fn has_error(&self) -> bool {
        self.error.is_some()
    }

    pub fn is_busy(&self) -> bool {
        self.loading || self.updating
    }

    fn settle_flags(&mut self) {
        self.loading = !self.pending.fetching.is_empty();
        self.updating = !self.pending.mutating.is_empty();
    }
}

/// Applies one event to a state snapshot. Pure: no I/O, no clock, no logging.
///
/// A completion always settles its own request class, so `loading` and
/// `updating` drop once nothing of that class is in flight. Whether it may
/// also write `entities`/`entity` is decided by [`accepts`].
pub fn reduce<E: Entity>(
    state: &EntityState<E>,
    event: &StoreEvent<E>,
    ordering: ResponseOrdering,
) -> EntityState<E> {
    let envelope = match event {
        StoreEvent::Reset => return EntityState::default(),
        StoreEvent::Request(envelope) => envelope,
    };
    let operation = envelope.action.operation;
    let slot = operation.slot();
    let token = envelope.token;
    let mut next = state.clone();

    let outcome = match &envelope.lifecycle {
        Lifecycle::Requested => {
            next.error = None;
            next.update_success = false;
            next.pending.in_flight(operation).insert(token);
            next.pending.set(slot, Some(token));
            next.settle_flags();
            return next;
        }
        Lifecycle::Succeeded(payload) => Ok(payload),
        Lifecycle::Failed(message) => Err(message),
    };

    let was_in_flight = next.pending.in_flight(operation).remove(&token);
    match ordering {
        ResponseOrdering::LatestRequest => {
            // Issued before a reset.
            if !was_in_flight {
                return next;
            }
            next.settle_flags();
        }
        ResponseOrdering::LastResponse => {
            if outcome.is_err() {
                next.loading = false;
                next.updating = false;
            } else if operation.is_mutation() {
                next.updating = false;
            } else {
                next.loading = false;
            }
        }
    }

    let writes = accepts(state, slot, token, ordering);
    if writes {
        next.pending.set(slot, None);
    }

    match outcome {
        Err(message) => {
            if writes || operation.is_mutation() {
                next.update_success = false;
                next.error = Some(message.clone());
            }
        }
        Ok(payload) => {
            if operation.is_mutation() && !next.updating {
                next.update_success = true;
            }
            if writes {
                match (payload, operation) {
                    (Payload::List(entities), Operation::FetchList) => {
                        next.entities = entities.clone();
                    }
                    (
                        Payload::Entity(entity),
                        Operation::Fetch | Operation::Create | Operation::Update,
                    ) => {
                        next.entity = entity.clone();
                    }
                    (_, Operation::Delete) => next.entity = E::default(),
                    // Payload shape does not match the operation.
                    _ => {}
                }
            }
        }
    }
    next
}

/// Whether a completion for `slot` carrying `token` may write the slot's data.
pub fn accepts<E>(
    state: &EntityState<E>,
    slot: Slot,
    token: RequestToken,
    ordering: ResponseOrdering,
) -> bool {
    match ordering {
        ResponseOrdering::LastResponse => true,
        ResponseOrdering::LatestRequest => state.pending.get(slot) == Some(token),
    }
}

/// Handle returned by [`EntityStore::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Listener<E> = Rc<dyn Fn(&EntityState<E>)>;

struct StoreInner<E: Entity> {
    state: RefCell<EntityState<E>>,
    listeners: RefCell<Vec<(SubscriptionId, Listener<E>)>>,
    next_token: Cell<u64>,
    next_subscription: Cell<u64>,
    ordering: ResponseOrdering,
}

/// Shared handle to one kind's state. Cloning yields another handle to the
/// same store; writes go through the owning gateway only.
pub struct EntityStore<E: Entity> {
    inner: Rc<StoreInner<E>>,
}

impl<E: Entity> Clone for EntityStore<E> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<E: Entity> fmt::Debug for EntityStore<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EntityStore")
            .field("kind", &E::KIND)
            .field("state", &*self.inner.state.borrow())
            .finish()
    }
}

impl<E: Entity> Default for EntityStore<E> {
    fn default() -> Self {
        Self::new(ResponseOrdering::default())
    }
}

impl<E: Entity> EntityStore<E> {
    pub fn new(ordering: ResponseOrdering) -> Self {
        Self {
            inner: Rc::new(StoreInner {
                state: RefCell::new(EntityState::default()),
                listeners: RefCell::new(Vec::new()),
                next_token: Cell::new(0),
                next_subscription: Cell::new(0),
                ordering,
            }),
        }
    }

    pub fn ordering(&self) -> ResponseOrdering {
        self.inner.ordering
    }

    /// Returns a snapshot of the current state.
    pub fn state(&self) -> EntityState<E> {
        self.inner.state.borrow().clone()
    }

    /// Reads the current state without cloning it.
    pub fn read<R>(&self, f: impl FnOnce(&EntityState<E>) -> R) -> R {
        f(&self.inner.state.borrow())
    }

    /// Registers a listener invoked after every transition that changed the state.
    pub fn subscribe(&self, listener: impl Fn(&EntityState<E>) + 'static) -> SubscriptionId {
        let id = SubscriptionId(self.inner.next_subscription.get());
        self.inner.next_subscription.set(id.0 + 1);
        self.inner
            .listeners
            .borrow_mut()
            .push((id, Rc::new(listener)));
        id
    }

    /// Removes a listener. Returns `false` if it was already gone.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut listeners = self.inner.listeners.borrow_mut();
        let before = listeners.len();
        listeners.retain(|(existing, _)| *existing != id);
        listeners.len() != before
    }

    pub(crate) fn issue_token(&self) -> RequestToken {
        let token = self.inner.next_token.get() + 1;
        self.inner.next_token.set(token);
        RequestToken(token)
    }

    /// Reduces one event into the store and notifies listeners if anything changed.
    /// In production the owning gateway is the only caller.
    pub fn dispatch(&self, event: impl Into<StoreEvent<E>>) {
        let event = event.into();
        let changed = {
            let mut state = self.inner.state.borrow_mut();
            let next = reduce(&*state, &event, self.inner.ordering);
            if let StoreEvent::Request(envelope) = &event {
                if envelope.phase() != Phase::Requested
                    && !accepts(
                        &*state,
                        envelope.action.operation.slot(),
                        envelope.token,
                        self.inner.ordering,
                    )
                {
                    warn!(
                        "{} {} superseded, not writing its data (slot awaits {:?})",
                        envelope.name(),
                        envelope.token,
                        state.pending.get(envelope.action.operation.slot())
                    );
                }
                trace!("{} {}", envelope.name(), envelope.token);
            } else {
                trace!("{}/RESET", E::KIND.name());
            }
            let changed = next != *state;
            *state = next;
            changed
        };
        if changed {
            self.notify();
        }
    }

    fn notify(&self) {
        let listeners: Vec<Listener<E>> = self
            .inner
            .listeners
            .borrow()
            .iter()
            .map(|(_, listener)| Rc::clone(listener))
            .collect();
        let snapshot = self.state();
        for listener in listeners {
            listener(&snapshot);
        }
    }
}
