//! REST operations per entity kind, each tagged with its request lifecycle.

use std::{fmt, rc::Rc};

use bsync_domain::Entity;
use futures::future::{self, LocalBoxFuture};
use serde_json::Value;
use tracing::{debug, warn};

use crate::{
    envelope::{ActionType, Operation, Payload, RequestEnvelope, RequestToken, StoreEvent},
    reference::Draft,
    store::{EntityStore, ResponseOrdering},
    time::Clock,
    transport::{HttpRequest, HttpResponse, Method, Transport},
    SyncError,
};

/// Query parameter appended to list URLs so no cached response is served.
pub const CACHE_BUSTER_PARAM: &str = "cacheBuster";

/// An issued operation. The request event has already been dispatched; the
/// completion event is dispatched when this future is driven to the end.
pub type Pending<T> = LocalBoxFuture<'static, Result<T, SyncError>>;

/// Settings shared by every gateway of a client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GatewaySettings {
    pub api_base: String,
    pub cache_busting: bool,
    pub ordering: ResponseOrdering,
}

impl Default for GatewaySettings {
    fn default() -> Self {
        Self {
            api_base: "api".into(),
            cache_busting: true,
            ordering: ResponseOrdering::default(),
        }
    }
}

impl GatewaySettings {
    /// `/{api_base}/{collection}` with redundant slashes collapsed.
    pub fn collection_path(&self, collection: &str) -> String {
        let base = self.api_base.trim_matches('/');
        if base.is_empty() {
            format!("/{collection}")
        } else {
            format!("/{base}/{collection}")
        }
    }
}

/// Paging parameters accepted by `list`. The server ignores them today; they
/// are forwarded as `page`, `size` and `sort` query parameters when set.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListParams {
    pub page: Option<u32>,
    pub size: Option<u32>,
    pub sort: Option<String>,
}

impl ListParams {
    pub fn page(page: u32, size: u32) -> Self {
        Self {
            page: Some(page),
            size: Some(size),
            sort: None,
        }
    }

    pub fn sorted_by(mut self, sort: impl Into<String>) -> Self {
        self.sort = Some(sort.into());
        self
    }

    fn apply(&self, mut request: HttpRequest) -> HttpRequest {
        if let Some(page) = self.page {
            request = request.with_query("page", page);
        }
        if let Some(size) = self.size {
            request = request.with_query("size", size);
        }
        if let Some(sort) = &self.sort {
            request = request.with_query("sort", sort);
        }
        request
    }
}

/// Issues list/get/save/delete for one entity kind and is the only writer of
/// that kind's store.
pub struct EntityGateway<E: Entity> {
    store: EntityStore<E>,
    transport: Rc<dyn Transport>,
    clock: Rc<dyn Clock>,
    collection_path: Rc<str>,
    cache_busting: bool,
}

impl<E: Entity> Clone for EntityGateway<E> {
    fn clone(&self) -> Self {
        Self {
            store: self.store.clone(),
            transport: Rc::clone(&self.transport),
            clock: Rc::clone(&self.clock),
            collection_path: Rc::clone(&self.collection_path),
            cache_busting: self.cache_busting,
        }
    }
}

impl<E: Entity> fmt::Debug for EntityGateway<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EntityGateway")
            .field("kind", &E::KIND)
            .field("collection_path", &self.collection_path)
            .field("cache_busting", &self.cache_busting)
            .finish()
    }
}

impl<E: Entity> EntityGateway<E> {
    pub fn new(
        transport: Rc<dyn Transport>,
        clock: Rc<dyn Clock>,
        settings: &GatewaySettings,
    ) -> Self {
        Self {
            store: EntityStore::new(settings.ordering),
            transport,
            clock,
            collection_path: settings.collection_path(E::KIND.collection()).into(),
            cache_busting: settings.cache_busting,
        }
    }

    /// Read access to the store this gateway writes.
    pub fn store(&self) -> &EntityStore<E> {
        &self.store
    }

    pub fn collection_path(&self) -> &str {
        &self.collection_path
    }

    fn item_path(&self, id: &str) -> String {
        format!("{}/{}", self.collection_path, id)
    }

    /// Fetches the whole collection into the list-view cache.
    pub fn list(&self, params: ListParams) -> Pending<Vec<E>> {
        let action = ActionType::new(E::KIND, Operation::FetchList);
        let mut request = HttpRequest::new(Method::Get, self.collection_path.to_string());
        if self.cache_busting {
            request = request.with_query(CACHE_BUSTER_PARAM, self.clock.epoch_millis());
        }
        let request = params.apply(request);
        let token = self.begin(action, &request);

        let gateway = self.clone();
        Box::pin(async move {
            let result = gateway
                .exchange(request)
                .await
                .and_then(|body| decode::<Vec<E>>(body));
            gateway.settle(action, token, result, |entities| {
                Payload::List(entities.clone())
            })
        })
    }

    /// Fetches a single entity into the detail-view cache.
    pub fn get(&self, id: &str) -> Pending<E> {
        let action = ActionType::new(E::KIND, Operation::Fetch);
        let request = HttpRequest::new(Method::Get, self.item_path(id));
        let token = self.begin(action, &request);

        let gateway = self.clone();
        Box::pin(async move {
            let result = gateway
                .exchange(request)
                .await
                .and_then(|body| decode::<E>(body));
            gateway.settle(action, token, result, |entity| Payload::Entity(entity.clone()))
        })
    }

    /// Creates the entity when it has no identifier, replaces it otherwise.
    pub fn save(&self, entity: &E) -> Pending<E> {
        match Draft::from_entity(entity) {
            Ok(draft) => self.submit(draft),
            Err(err) => {
                let action = ActionType::new(E::KIND, mutation_for(entity.id()));
                let token = self.store.issue_token();
                self.store.dispatch(RequestEnvelope::requested(action, token));
                let result = self.settle(action, token, Err(err), |_: &E| Payload::Empty);
                Box::pin(future::ready(result))
            }
        }
    }

    /// Saves loosely typed form values. Empty-string fields are dropped before
    /// transmission; the list is re-fetched after a successful save.
    pub fn submit(&self, draft: Draft) -> Pending<E> {
        let payload = draft.sanitized();
        let operation = mutation_for(payload.id());
        let action = ActionType::new(E::KIND, operation);
        let method = match operation {
            Operation::Update => Method::Put,
            _ => Method::Post,
        };
        let request = HttpRequest::new(method, self.collection_path.to_string())
            .with_body(payload.into_value());
        let token = self.begin(action, &request);

        let gateway = self.clone();
        Box::pin(async move {
            let result = gateway
                .exchange(request)
                .await
                .and_then(|body| decode::<E>(body));
            let saved = gateway.settle(action, token, result, |entity| {
                Payload::Entity(entity.clone())
            })?;
            gateway.refresh().await;
            Ok(saved)
        })
    }

    /// Deletes by identifier, clears the detail-view cache and re-fetches the list.
    pub fn delete(&self, id: &str) -> Pending<()> {
        let action = ActionType::new(E::KIND, Operation::Delete);
        let request = HttpRequest::new(Method::Delete, self.item_path(id));
        let token = self.begin(action, &request);

        let gateway = self.clone();
        Box::pin(async move {
            let result = gateway.exchange(request).await.map(|_| ());
            gateway.settle(action, token, result, |_| Payload::Empty)?;
            gateway.refresh().await;
            Ok(())
        })
    }

    /// Returns the store to its initial empty state.
    pub fn reset(&self) {
        debug!("resetting {} store", E::KIND.name());
        self.store.dispatch(StoreEvent::Reset);
    }

    async fn refresh(&self) {
        // The outcome is already folded into the store.
        if let Err(err) = self.list(ListParams::default()).await {
            debug!("post-mutation refresh of {} failed: {}", E::KIND.name(), err);
        }
    }

    fn begin(&self, action: ActionType, request: &HttpRequest) -> RequestToken {
        let token = self.store.issue_token();
        debug!("REST request {} {} ({} {})", request.method, request.url(), action, token);
        self.store.dispatch(RequestEnvelope::requested(action, token));
        token
    }

    fn settle<T>(
        &self,
        action: ActionType,
        token: RequestToken,
        result: Result<T, SyncError>,
        payload: impl FnOnce(&T) -> Payload<E>,
    ) -> Result<T, SyncError> {
        match &result {
            Ok(value) => {
                self.store
                    .dispatch(RequestEnvelope::succeeded(action, token, payload(value)));
            }
            Err(err) => {
                warn!("{} {} failed: {}", action, token, err);
                self.store
                    .dispatch(RequestEnvelope::failed(action, token, err.to_string()));
            }
        }
        result
    }

    async fn exchange(&self, request: HttpRequest) -> Result<Option<Value>, SyncError> {
        let path = request.path.clone();
        let response = self
            .transport
            .execute(request)
            .await
            .map_err(SyncError::Transport)?;
        if response.is_success() {
            Ok(response.body)
        } else {
            Err(failure_from(&path, response))
        }
    }
}

fn mutation_for(id: Option<&str>) -> Operation {
    match id {
        Some(id) if !id.is_empty() => Operation::Update,
        _ => Operation::Create,
    }
}

fn decode<T: serde::de::DeserializeOwned>(body: Option<Value>) -> Result<T, SyncError> {
    let body = body.ok_or_else(|| SyncError::Decode("response body is empty".into()))?;
    Ok(serde_json::from_value(body)?)
}

fn failure_from(path: &str, response: HttpResponse) -> SyncError {
    let message = response
        .body
        .as_ref()
        .and_then(error_message)
        .unwrap_or_else(|| format!("HTTP {}", response.status));
    if response.status == 404 {
        SyncError::NotFound(format!("{path}: {message}"))
    } else {
        SyncError::Server {
            status: response.status,
            message,
        }
    }
}

/// Picks a human readable message out of a server error body.
fn error_message(body: &Value) -> Option<String> {
    ["title", "message", "detail"]
        .iter()
        .find_map(|key| body.get(*key).and_then(Value::as_str))
        .filter(|message| !message.is_empty())
        .map(str::to_string)
}
