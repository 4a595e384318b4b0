//! Budget records, the owners of incomes and outcomes.

use serde::{Deserialize, Serialize};

use crate::common::*;

/// A named budget. Incomes and outcomes point at it by identifier; the budget
/// itself never embeds them on the client.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Budget {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl Budget {
    pub fn new(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            id: None,
            title: Some(title.into()),
            description: Some(description.into()),
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }
}

impl Identifiable for Budget {
    fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }
}

impl Entity for Budget {
    const KIND: EntityKind = EntityKind::Budget;
}
