mod common;

use std::rc::Rc;

use budget_sync::{
    client::gateway_settings, BudgetSyncClient, ClientConfig, ClientError, EntityKind,
    InMemoryRestServer, OrderingMode, ResponseOrdering, Transport,
};
use bsync_core::{ActionType, Operation, Phase};
use common::temp_config_manager;

#[test]
fn client_reads_persisted_settings() {
    let manager = temp_config_manager();
    manager
        .save(&ClientConfig {
            api_base: "backend/api".into(),
            cache_busting: false,
            response_ordering: OrderingMode::LastResponse,
            log_filter: None,
        })
        .expect("save");
    let transport: Rc<dyn Transport> = Rc::new(InMemoryRestServer::new("backend/api"));

    let client = BudgetSyncClient::from_config(transport, &manager).expect("client");

    assert_eq!(client.budgets().collection_path(), "/backend/api/budgets");
    assert_eq!(client.outcomes().collection_path(), "/backend/api/outcomes");
    assert_eq!(
        client.incomes().store().ordering(),
        ResponseOrdering::LastResponse
    );
}

#[test]
fn missing_config_file_means_defaults() {
    let manager = temp_config_manager();
    let transport: Rc<dyn Transport> = Rc::new(InMemoryRestServer::default());

    let client = BudgetSyncClient::from_config(transport, &manager).expect("client");

    assert_eq!(client.config(), &ClientConfig::default());
    assert_eq!(client.incomes().collection_path(), "/api/incomes");
}

#[test]
fn invalid_settings_are_refused() {
    let transport: Rc<dyn Transport> = Rc::new(InMemoryRestServer::default());
    let config = ClientConfig {
        api_base: "api?debug".into(),
        ..ClientConfig::default()
    };

    let err = BudgetSyncClient::new(transport, config).unwrap_err();

    assert!(matches!(err, ClientError::Config(_)));
    assert_eq!(err.status(), None);
}

#[test]
fn gateway_settings_follow_the_config() {
    let settings = gateway_settings(&ClientConfig::default());
    assert_eq!(settings.api_base, "api");
    assert!(settings.cache_busting);
    assert_eq!(settings.ordering, ResponseOrdering::LatestRequest);
}

#[test]
fn clones_share_the_same_stores() {
    let transport: Rc<dyn Transport> = Rc::new(InMemoryRestServer::default());
    let client = BudgetSyncClient::new(transport, ClientConfig::default()).expect("client");
    let other = client.clone();

    let seen = Rc::new(std::cell::Cell::new(0));
    let counter = Rc::clone(&seen);
    other
        .budgets()
        .store()
        .subscribe(move |_| counter.set(counter.get() + 1));
    drop(client.budgets().get("anything"));

    assert_eq!(seen.get(), 1);
    assert!(other.budgets().store().state().loading);
}

#[test]
fn action_names_per_kind() {
    let names: Vec<String> = EntityKind::ALL
        .into_iter()
        .flat_map(|kind| {
            [
                Operation::FetchList,
                Operation::Fetch,
                Operation::Create,
                Operation::Update,
                Operation::Delete,
            ]
            .into_iter()
            .map(move |operation| ActionType::new(kind, operation).phased(Phase::Succeeded))
        })
        .collect();

    insta::assert_snapshot!(names.join("\n"), @r"
    budget/FETCH_BUDGET_LIST_FULFILLED
    budget/FETCH_BUDGET_FULFILLED
    budget/CREATE_BUDGET_FULFILLED
    budget/UPDATE_BUDGET_FULFILLED
    budget/DELETE_BUDGET_FULFILLED
    income/FETCH_INCOME_LIST_FULFILLED
    income/FETCH_INCOME_FULFILLED
    income/CREATE_INCOME_FULFILLED
    income/UPDATE_INCOME_FULFILLED
    income/DELETE_INCOME_FULFILLED
    outcome/FETCH_OUTCOME_LIST_FULFILLED
    outcome/FETCH_OUTCOME_FULFILLED
    outcome/CREATE_OUTCOME_FULFILLED
    outcome/UPDATE_OUTCOME_FULFILLED
    outcome/DELETE_OUTCOME_FULFILLED
    ");
}
