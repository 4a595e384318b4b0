//! The client context: one store and gateway per entity kind, built once and
//! handed to whoever needs them.

use std::rc::Rc;

use bsync_config::{ClientConfig, ConfigManager, OrderingMode};
use bsync_core::{
    Clock, EntityGateway, FormSession, GatewaySettings, ResponseOrdering, Transport,
};
use bsync_domain::{Budget, Income, Outcome};
use tracing::info;

use crate::{errors::ClientError, system_clock::SystemClock};

/// Shared budget/income/outcome gateways over a single transport.
///
/// Cloning is cheap and yields handles to the same stores.
#[derive(Debug, Clone)]
pub struct BudgetSyncClient {
    config: ClientConfig,
    budgets: EntityGateway<Budget>,
    incomes: EntityGateway<Income>,
    outcomes: EntityGateway<Outcome>,
}

impl BudgetSyncClient {
    /// Client over `transport` using the system clock for cache busting.
    pub fn new(transport: Rc<dyn Transport>, config: ClientConfig) -> Result<Self, ClientError> {
        Self::with_clock(transport, Rc::new(SystemClock), config)
    }

    pub fn with_clock(
        transport: Rc<dyn Transport>,
        clock: Rc<dyn Clock>,
        config: ClientConfig,
    ) -> Result<Self, ClientError> {
        config.validate()?;
        let settings = gateway_settings(&config);
        info!(
            api_base = %config.api_base,
            ordering = %config.response_ordering,
            "budget sync client ready"
        );
        Ok(Self {
            budgets: EntityGateway::new(Rc::clone(&transport), Rc::clone(&clock), &settings),
            incomes: EntityGateway::new(Rc::clone(&transport), Rc::clone(&clock), &settings),
            outcomes: EntityGateway::new(transport, clock, &settings),
            config,
        })
    }

    /// Client configured from the file managed by `manager`.
    pub fn from_config(
        transport: Rc<dyn Transport>,
        manager: &ConfigManager,
    ) -> Result<Self, ClientError> {
        Self::new(transport, manager.load()?)
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn budgets(&self) -> &EntityGateway<Budget> {
        &self.budgets
    }

    pub fn incomes(&self) -> &EntityGateway<Income> {
        &self.incomes
    }

    pub fn outcomes(&self) -> &EntityGateway<Outcome> {
        &self.outcomes
    }

    /// Create form when `id` is `None`, edit form otherwise.
    pub fn budget_form(&self, id: Option<&str>) -> FormSession<Budget> {
        match id {
            Some(id) => FormSession::edit(self.budgets.clone(), None, id),
            None => FormSession::create(self.budgets.clone(), None),
        }
    }

    pub fn income_form(&self, id: Option<&str>) -> FormSession<Income> {
        let budgets = Some(self.budgets.clone());
        match id {
            Some(id) => FormSession::edit(self.incomes.clone(), budgets, id),
            None => FormSession::create(self.incomes.clone(), budgets),
        }
    }

    pub fn outcome_form(&self, id: Option<&str>) -> FormSession<Outcome> {
        let budgets = Some(self.budgets.clone());
        match id {
            Some(id) => FormSession::edit(self.outcomes.clone(), budgets, id),
            None => FormSession::create(self.outcomes.clone(), budgets),
        }
    }

    /// Returns all three stores to their initial state.
    pub fn reset_all(&self) {
        self.budgets.reset();
        self.incomes.reset();
        self.outcomes.reset();
    }
}

/// Maps persisted client settings onto gateway settings.
pub fn gateway_settings(config: &ClientConfig) -> GatewaySettings {
    GatewaySettings {
        api_base: config.api_base.clone(),
        cache_busting: config.cache_busting,
        ordering: match config.response_ordering {
            OrderingMode::LatestRequest => ResponseOrdering::LatestRequest,
            OrderingMode::LastResponse => ResponseOrdering::LastResponse,
        },
    }
}
