//! Incomes and outcomes: amounts that optionally belong to a budget.

use serde::{Deserialize, Serialize};

use crate::common::*;

/// Declares an amount-carrying entity with an optional budget reference.
macro_rules! budget_entry {
    ($(#[$meta:meta])* $name:ident => $kind:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
        pub struct $name {
            #[serde(default, skip_serializing_if = "Option::is_none")]
            pub id: Option<String>,
            #[serde(default, skip_serializing_if = "Option::is_none")]
            pub amount: Option<f64>,
            #[serde(default, skip_serializing_if = "Option::is_none")]
            pub budget: Option<BudgetRef>,
        }

        impl $name {
            pub fn new(amount: f64) -> Self {
                Self {
                    id: None,
                    amount: Some(amount),
                    budget: None,
                }
            }

            pub fn with_id(mut self, id: impl Into<String>) -> Self {
                self.id = Some(id.into());
                self
            }

            pub fn in_budget(mut self, budget_id: impl Into<String>) -> Self {
                self.budget = Some(BudgetRef::new(budget_id));
                self
            }
        }

        impl Identifiable for $name {
            fn id(&self) -> Option<&str> {
                self.id.as_deref()
            }
        }

        impl BelongsToBudget for $name {
            fn budget_id(&self) -> Option<&str> {
                self.budget.as_ref().map(|budget| budget.id.as_str())
            }
        }

        impl Entity for $name {
            const KIND: EntityKind = EntityKind::$kind;
        }
    };
}

budget_entry! {
    /// Money flowing into a budget.
    Income => Income
}

budget_entry! {
    /// Money spent out of a budget.
    Outcome => Outcome
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Budget;

    #[test]
    fn unset_fields_are_not_serialized() {
        let json = serde_json::to_value(Income::new(42.0)).unwrap();
        assert_eq!(json, serde_json::json!({ "amount": 42.0 }));
    }

    #[test]
    fn budget_reference_serializes_as_shallow_object() {
        let outcome = Outcome::new(10.0).with_id("o1").in_budget("b1");
        let json = serde_json::to_value(&outcome).unwrap();
        assert_eq!(
            json,
            serde_json::json!({ "id": "o1", "amount": 10.0, "budget": { "id": "b1" } })
        );
        assert_eq!(outcome.budget_id(), Some("b1"));
    }

    #[test]
    fn server_payload_with_extra_fields_still_decodes() {
        let budget: Budget = serde_json::from_value(serde_json::json!({
            "id": "1",
            "title": "Home",
            "description": "Monthly",
            "incomes": [],
        }))
        .unwrap();
        assert_eq!(budget.id(), Some("1"));
        assert_eq!(budget.title.as_deref(), Some("Home"));
    }

    #[test]
    fn empty_entity_is_not_persisted() {
        assert!(!Income::default().is_persisted());
        assert!(Income::default().with_id("9").is_persisted());
    }

    #[test]
    fn collections_resolve_back_to_kinds() {
        for kind in EntityKind::ALL {
            assert_eq!(EntityKind::from_collection(kind.collection()), Some(kind));
        }
        assert_eq!(EntityKind::from_collection("transactions"), None);
        assert!(!EntityKind::Budget.references_budget());
        assert!(EntityKind::Outcome.references_budget());
    }
}
