//! Request lifecycle events: one symbolic action, three realized phases.

use std::fmt;

use bsync_domain::EntityKind;

/// The five request-backed operations a store reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    FetchList,
    Fetch,
    Create,
    Update,
    Delete,
}

/// Store slot an operation writes on completion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Slot {
    List,
    Entity,
}

impl Operation {
    pub fn slot(self) -> Slot {
        match self {
            Operation::FetchList => Slot::List,
            _ => Slot::Entity,
        }
    }

    /// Create, update and delete drive the `updating` flag; fetches drive `loading`.
    pub fn is_mutation(self) -> bool {
        matches!(
            self,
            Operation::Create | Operation::Update | Operation::Delete
        )
    }

    fn verb(self) -> &'static str {
        match self {
            Operation::FetchList | Operation::Fetch => "FETCH",
            Operation::Create => "CREATE",
            Operation::Update => "UPDATE",
            Operation::Delete => "DELETE",
        }
    }
}

/// Symbolic action identifier, e.g. `income/FETCH_INCOME_LIST`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ActionType {
    pub kind: EntityKind,
    pub operation: Operation,
}

impl ActionType {
    pub fn new(kind: EntityKind, operation: Operation) -> Self {
        Self { kind, operation }
    }

    /// Name of the action in the given phase, e.g. `outcome/DELETE_OUTCOME_REJECTED`.
    pub fn phased(&self, phase: Phase) -> String {
        format!("{}{}", self, phase.suffix())
    }
}

impl fmt::Display for ActionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let namespace = self.kind.name();
        let upper = namespace.to_ascii_uppercase();
        write!(f, "{}/{}_{}", namespace, self.operation.verb(), upper)?;
        if self.operation == Operation::FetchList {
            f.write_str("_LIST")?;
        }
        Ok(())
    }
}

/// The three derived phases of an action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Phase {
    Requested,
    Succeeded,
    Failed,
}

impl Phase {
    pub fn suffix(self) -> &'static str {
        match self {
            Phase::Requested => "_PENDING",
            Phase::Succeeded => "_FULFILLED",
            Phase::Failed => "_REJECTED",
        }
    }
}

/// Monotonic per-store ticket handed out when a request is issued.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RequestToken(pub u64);

impl fmt::Display for RequestToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Data carried by a successful completion.
#[derive(Debug, Clone, PartialEq)]
pub enum Payload<E> {
    List(Vec<E>),
    Entity(E),
    Empty,
}

/// Realized phase plus its data.
#[derive(Debug, Clone, PartialEq)]
pub enum Lifecycle<E> {
    Requested,
    Succeeded(Payload<E>),
    Failed(String),
}

/// A phase-tagged request event, as dispatched into an entity store.
#[derive(Debug, Clone, PartialEq)]
pub struct RequestEnvelope<E> {
    pub action: ActionType,
    pub token: RequestToken,
    pub lifecycle: Lifecycle<E>,
}

impl<E> RequestEnvelope<E> {
    pub fn requested(action: ActionType, token: RequestToken) -> Self {
        Self {
            action,
            token,
            lifecycle: Lifecycle::Requested,
        }
    }

    pub fn succeeded(action: ActionType, token: RequestToken, payload: Payload<E>) -> Self {
        Self {
            action,
            token,
            lifecycle: Lifecycle::Succeeded(payload),
        }
    }

    pub fn failed(action: ActionType, token: RequestToken, message: impl Into<String>) -> Self {
        Self {
            action,
            token,
            lifecycle: Lifecycle::Failed(message.into()),
        }
    }

    pub fn phase(&self) -> Phase {
        match self.lifecycle {
            Lifecycle::Requested => Phase::Requested,
            Lifecycle::Succeeded(_) => Phase::Succeeded,
            Lifecycle::Failed(_) => Phase::Failed,
        }
    }

    /// Fully qualified event name, e.g. `budget/FETCH_BUDGET_LIST_FULFILLED`.
    pub fn name(&self) -> String {
        self.action.phased(self.phase())
    }
}

/// Everything a store can receive.
#[derive(Debug, Clone, PartialEq)]
pub enum StoreEvent<E> {
    Request(RequestEnvelope<E>),
    Reset,
}

impl<E> From<RequestEnvelope<E>> for StoreEvent<E> {
    fn from(envelope: RequestEnvelope<E>) -> Self {
        StoreEvent::Request(envelope)
    }
}
