//! Create/edit workflow for one entity, independent of any rendering.

use std::cell::Cell;

use bsync_domain::{BelongsToBudget, Budget, Entity, Identifiable};
use futures::future;

use crate::{
    gateway::{EntityGateway, ListParams, Pending},
    reference::{self, Draft},
    store::{EntityState, SubscriptionId},
};

/// A mounted create or edit form.
///
/// Forms for kinds that reference a budget also drive the budget gateway so the
/// owner can be picked from every known budget.
#[derive(Debug, Clone)]
pub struct FormSession<E: Entity> {
    gateway: EntityGateway<E>,
    budgets: Option<EntityGateway<Budget>>,
    entity_id: Option<String>,
}

impl<E: Entity> FormSession<E> {
    /// Form for a new entity.
    pub fn create(gateway: EntityGateway<E>, budgets: Option<EntityGateway<Budget>>) -> Self {
        Self {
            gateway,
            budgets,
            entity_id: None,
        }
    }

    /// Form editing the entity identified by `id`.
    pub fn edit(
        gateway: EntityGateway<E>,
        budgets: Option<EntityGateway<Budget>>,
        id: impl Into<String>,
    ) -> Self {
        Self {
            gateway,
            budgets,
            entity_id: Some(id.into()).filter(|id: &String| !id.is_empty()),
        }
    }

    pub fn is_new(&self) -> bool {
        self.entity_id.is_none()
    }

    pub fn gateway(&self) -> &EntityGateway<E> {
        &self.gateway
    }

    /// Loads what the form needs. A new form discards any stale current entity;
    /// an edit form fetches its entity. Both requests are issued before this returns.
    pub fn mount(&self) -> Pending<()> {
        let entity = match &self.entity_id {
            None => {
                self.gateway.reset();
                None
            }
            Some(id) => Some(self.gateway.get(id)),
        };
        let owners = self
            .budgets
            .as_ref()
            .filter(|_| E::KIND.references_budget())
            .map(|budgets| budgets.list(ListParams::default()));

        Box::pin(async move {
            let (entity, owners) = future::join(
                async move {
                    match entity {
                        Some(pending) => pending.await.map(|_| ()),
                        None => Ok(()),
                    }
                },
                async move {
                    match owners {
                        Some(pending) => pending.await.map(|_| ()),
                        None => Ok(()),
                    }
                },
            )
            .await;
            entity.and(owners)
        })
    }

    /// Identifiers of every budget the owner can be chosen from.
    pub fn budget_options(&self) -> Vec<String> {
        self.budgets
            .as_ref()
            .map(|budgets| {
                budgets.store().read(|state| {
                    state
                        .entities
                        .iter()
                        .filter_map(|budget| budget.id().map(str::to_string))
                        .collect()
                })
            })
            .unwrap_or_default()
    }

    /// Merges `values` over the current entity and saves the result.
    ///
    /// `budget_selection` is the picked owner for dependent kinds; an empty
    /// selection or `"0"` submits no owner. `None` leaves the merged draft as is.
    pub fn submit(&self, values: Draft, budget_selection: Option<&str>) -> Pending<E> {
        let current = self.gateway.store().read(|state| state.entity.clone());
        let base = match Draft::from_entity(&current) {
            Ok(draft) => draft,
            Err(err) => return Box::pin(future::ready(Err(err))),
        };
        let mut draft = base.merge(values);
        if self.is_new() {
            draft.remove("id");
        }
        if let Some(selection) = budget_selection.filter(|_| E::KIND.references_budget()) {
            draft = reference::resolve_budget_reference(draft, selection);
        }
        self.gateway.submit(draft)
    }

    /// True when `next` is the transition where a save landed, i.e. the form
    /// should close and return to the list.
    ///
    /// The flag is cleared again by the list refresh that follows every save, so
    /// this is meant to be evaluated on consecutive snapshots.
    pub fn should_close(previous: &EntityState<E>, next: &EntityState<E>) -> bool {
        !previous.update_success && next.update_success
    }

    /// Invokes `on_close` every time a save lands on this form's store.
    /// Drop the subscription with [`EntityStore::unsubscribe`](crate::EntityStore::unsubscribe).
    pub fn watch_close(&self, on_close: impl Fn(&E) + 'static) -> SubscriptionId {
        let store = self.gateway.store();
        let previous = Cell::new(store.read(|state| state.update_success));
        store.subscribe(move |state| {
            if !previous.replace(state.update_success) && state.update_success {
                on_close(&state.entity);
            }
        })
    }
}

impl<E: Entity + BelongsToBudget> FormSession<E> {
    /// Owning budget of the current entity, looked up in the budget store.
    pub fn owner(&self) -> Option<Budget> {
        let current = self.gateway.store().read(|state| state.entity.clone());
        self.owner_for(&current)
    }

    pub fn owner_for(&self, entity: &E) -> Option<Budget> {
        let budgets = self.budgets.as_ref()?;
        budgets
            .store()
            .read(|state| reference::owner_of(entity, &state.entities).cloned())
    }
}
