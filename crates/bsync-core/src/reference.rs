//! Submission payloads: sanitizing drafts and folding the owning budget into them.

use bsync_domain::{BelongsToBudget, Budget, Identifiable};
use serde::Serialize;
use serde_json::{Map, Value};

use crate::SyncError;

/// Form-selection value meaning "no budget chosen".
pub const NO_BUDGET_SELECTED: &str = "0";

/// Field under which dependents carry their owning budget.
pub const BUDGET_FIELD: &str = "budget";

/// Loosely typed entity fields as collected from a form, before submission.
///
/// Values stay raw JSON so that whatever the user typed reaches the server,
/// which owns validation.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Draft {
    fields: Map<String, Value>,
}

impl Draft {
    pub fn new() -> Self {
        Self::default()
    }

    /// Serializes a typed entity into a draft.
    pub fn from_entity<E: Serialize>(entity: &E) -> Result<Self, SyncError> {
        Self::from_value(serde_json::to_value(entity)?)
    }

    pub fn from_value(value: Value) -> Result<Self, SyncError> {
        match value {
            Value::Object(fields) => Ok(Self { fields }),
            other => Err(SyncError::InvalidPayload(format!(
                "expected a JSON object, got {other}"
            ))),
        }
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.set(key, value);
        self
    }

    pub fn set(&mut self, key: impl Into<String>, value: impl Into<Value>) -> &mut Self {
        self.fields.insert(key.into(), value.into());
        self
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.fields.remove(key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.fields.contains_key(key)
    }

    /// Overlays `values` on top of this draft; overlaid keys win.
    pub fn merge(mut self, values: Draft) -> Self {
        self.fields.extend(values.fields);
        self
    }

    /// Identifier, when present as a non-empty string.
    pub fn id(&self) -> Option<&str> {
        self.fields
            .get("id")
            .and_then(Value::as_str)
            .filter(|id| !id.is_empty())
    }

    pub fn fields(&self) -> &Map<String, Value> {
        &self.fields
    }

    pub fn sanitized(&self) -> Draft {
        Draft {
            fields: sanitize(&self.fields),
        }
    }

    pub fn into_value(self) -> Value {
        Value::Object(self.fields)
    }
}

impl From<Map<String, Value>> for Draft {
    fn from(fields: Map<String, Value>) -> Self {
        Self { fields }
    }
}

/// Drops every key whose value is exactly the empty string. `0`, `false`,
/// `null` and nested objects are kept as they are.
pub fn sanitize(fields: &Map<String, Value>) -> Map<String, Value> {
    fields
        .iter()
        .filter(|(_, value)| !matches!(value, Value::String(text) if text.is_empty()))
        .map(|(key, value)| (key.clone(), value.clone()))
        .collect()
}

/// Folds the selected budget into `draft` as `{ "id": budget_id }`. An empty
/// selection or [`NO_BUDGET_SELECTED`] removes the reference entirely.
pub fn resolve_budget_reference(mut draft: Draft, budget_id: &str) -> Draft {
    let budget_id = budget_id.trim();
    if budget_id.is_empty() || budget_id == NO_BUDGET_SELECTED {
        draft.remove(BUDGET_FIELD);
        return draft;
    }
    let mut reference = Map::new();
    reference.insert("id".into(), Value::String(budget_id.to_string()));
    draft.set(BUDGET_FIELD, Value::Object(reference));
    draft
}

/// Reads the budget identifier back out of a draft's reference field.
pub fn extract_budget_reference(draft: &Draft) -> Option<String> {
    draft
        .get(BUDGET_FIELD)
        .and_then(|reference| reference.get("id"))
        .and_then(Value::as_str)
        .filter(|id| !id.is_empty())
        .map(str::to_string)
}

/// Finds a budget by identifier in a list-view cache.
pub fn lookup_budget<'a>(budgets: &'a [Budget], budget_id: &str) -> Option<&'a Budget> {
    budgets
        .iter()
        .find(|budget| budget.id() == Some(budget_id))
}

/// Resolves the full owning budget of a dependent from the known budgets.
pub fn owner_of<'a, E: BelongsToBudget>(entity: &E, budgets: &'a [Budget]) -> Option<&'a Budget> {
    entity
        .budget_id()
        .and_then(|budget_id| lookup_budget(budgets, budget_id))
}
