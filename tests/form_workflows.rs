mod common;

use std::{cell::RefCell, rc::Rc};

use budget_sync::{Draft, FormSession, Income};
use bsync_core::{Method, NO_BUDGET_SELECTED};
use common::{harness, record};
use futures::executor::block_on;
use serde_json::json;

#[test]
fn new_income_form_offers_every_budget_and_embeds_the_pick() {
    let h = harness();
    let home = h.server.seed("budgets", json!({ "title": "Home" })).expect("seed");
    let trip = h.server.seed("budgets", json!({ "title": "Trip" })).expect("seed");
    let form = h.client.income_form(None);
    assert!(form.is_new());

    block_on(form.mount()).expect("mount");
    assert_eq!(form.budget_options(), vec![home, trip.clone()]);

    let saved = block_on(form.submit(Draft::new().with("amount", "12.5"), Some(trip.as_str())))
        .expect("submit");

    assert_eq!(saved.amount, Some(12.5));
    assert_eq!(saved.budget.as_ref().map(|budget| budget.id.as_str()), Some(trip.as_str()));
    assert_eq!(form.owner().and_then(|budget| budget.title).as_deref(), Some("Trip"));

    let post = h
        .server
        .requests()
        .into_iter()
        .find(|request| request.method == Method::Post)
        .expect("post");
    assert_eq!(
        post.body,
        Some(json!({ "amount": "12.5", "budget": { "id": trip.clone() } }))
    );
    // Only the shallow reference is persisted.
    assert_eq!(h.server.records("incomes")[0]["budget"], json!({ "id": trip.clone() }));
}

#[test]
fn sentinel_selection_submits_no_owner() {
    let h = harness();
    let form = h.client.outcome_form(None);
    block_on(form.mount()).expect("mount");

    let saved = block_on(form.submit(
        Draft::new().with("amount", 4).with("budget", json!({ "id": "stale" })),
        Some(NO_BUDGET_SELECTED),
    ))
    .expect("submit");

    assert!(saved.budget.is_none());
    let post = h
        .server
        .requests()
        .into_iter()
        .find(|request| request.method == Method::Post)
        .expect("post");
    assert_eq!(post.body, Some(json!({ "amount": 4 })));
}

#[test]
fn edit_form_loads_entity_and_sends_full_replacement() {
    let h = harness();
    let budget = h.server.seed("budgets", json!({ "title": "Home" })).expect("seed");
    let id = h
        .server
        .seed("incomes", json!({ "amount": 10, "budget": { "id": budget } }))
        .expect("seed");
    let form = h.client.income_form(Some(id.as_str()));

    block_on(form.mount()).expect("mount");

    assert!(!form.is_new());
    let loaded = h.client.incomes().store().state().entity;
    assert_eq!(loaded.id.as_deref(), Some(id.as_str()));
    assert_eq!(form.owner().and_then(|owner| owner.id), Some(budget.clone()));

    block_on(form.submit(Draft::new().with("amount", 11), Some(budget.as_str()))).expect("update");

    let put = h
        .server
        .requests()
        .into_iter()
        .find(|request| request.method == Method::Put)
        .expect("put");
    assert_eq!(
        put.body,
        Some(json!({ "id": id.clone(), "amount": 11, "budget": { "id": budget.clone() } }))
    );
}

#[test]
fn new_form_drops_a_stale_current_entity() {
    let h = harness();
    let id = h.server.seed("incomes", json!({ "amount": 1 })).expect("seed");
    block_on(h.client.incomes().get(&id)).expect("get");

    let form = h.client.income_form(None);
    block_on(form.mount()).expect("mount");
    assert_eq!(h.client.incomes().store().state().entity, Income::default());

    block_on(form.submit(Draft::new().with("id", id.as_str()).with("amount", 2), None))
        .expect("create");

    assert_eq!(h.server.request_count(Method::Post, "/api/incomes"), 1);
    assert_eq!(h.server.request_count(Method::Put, "/api/incomes"), 0);
    assert_eq!(h.server.records("incomes").len(), 2);
}

#[test]
fn budget_form_does_not_touch_other_gateways() {
    let h = harness();
    let form = h.client.budget_form(None);

    block_on(form.mount()).expect("mount");
    assert!(form.budget_options().is_empty());
    assert!(h.server.requests().is_empty());

    let err = block_on(form.submit(Draft::new().with("description", "untitled"), None))
        .unwrap_err();
    assert_eq!(err.status(), Some(400));
}

#[test]
fn form_closes_exactly_when_a_save_lands() {
    let h = harness();
    let form = h.client.budget_form(None);
    let snapshots = record(h.client.budgets().store());
    let closed = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&closed);
    form.watch_close(move |budget| sink.borrow_mut().push(budget.title.clone()));

    block_on(form.submit(Draft::new().with("title", ""), None)).unwrap_err();
    block_on(form.submit(Draft::new().with("title", "Home"), None)).expect("create");

    assert_eq!(*closed.borrow(), vec![Some("Home".to_string())]);
    let snapshots = snapshots.borrow();
    let edges = snapshots
        .windows(2)
        .filter(|pair| FormSession::should_close(&pair[0], &pair[1]))
        .count();
    assert_eq!(edges, 1);
}
