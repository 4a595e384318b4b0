//! Shared traits and enums for the synchronized entity kinds.

use std::fmt;

use serde::{de::DeserializeOwned, Deserialize, Serialize};

/// Exposes the server-assigned identifier, absent on unpersisted instances.
pub trait Identifiable {
    fn id(&self) -> Option<&str>;

    /// Returns `true` once the server has assigned an identifier.
    fn is_persisted(&self) -> bool {
        self.id().is_some_and(|id| !id.is_empty())
    }
}

/// Associates an entity with an optional owning budget.
pub trait BelongsToBudget {
    fn budget_id(&self) -> Option<&str>;
}

/// Everything the store and gateway need from an entity representation.
///
/// `Default` is the empty entity (`{}`) a store holds before anything is loaded
/// and after a delete or reset.
pub trait Entity:
    Identifiable + Clone + fmt::Debug + Default + PartialEq + Serialize + DeserializeOwned + 'static
{
    const KIND: EntityKind;
}

/// Enumerates the entity kinds exposed by the REST service.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum EntityKind {
    Budget,
    Income,
    Outcome,
}

impl EntityKind {
    pub const ALL: [EntityKind; 3] = [EntityKind::Budget, EntityKind::Income, EntityKind::Outcome];

    /// Singular lower-case name, used as the action namespace (`income/...`).
    pub fn name(self) -> &'static str {
        match self {
            EntityKind::Budget => "budget",
            EntityKind::Income => "income",
            EntityKind::Outcome => "outcome",
        }
    }

    /// REST collection segment (`/api/{collection}`).
    pub fn collection(self) -> &'static str {
        match self {
            EntityKind::Budget => "budgets",
            EntityKind::Income => "incomes",
            EntityKind::Outcome => "outcomes",
        }
    }

    /// Resolves a collection segment back to its kind.
    pub fn from_collection(collection: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.collection() == collection)
    }

    /// Whether submissions of this kind carry a reference to their owning budget.
    pub fn references_budget(self) -> bool {
        matches!(self, EntityKind::Income | EntityKind::Outcome)
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            EntityKind::Budget => "Budget",
            EntityKind::Income => "Income",
            EntityKind::Outcome => "Outcome",
        };
        f.write_str(label)
    }
}

/// Shallow reference to a budget, carrying only its identifier.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct BudgetRef {
    pub id: String,
}

impl BudgetRef {
    pub fn new(id: impl Into<String>) -> Self {
        Self { id: id.into() }
    }
}
