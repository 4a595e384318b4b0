//! bsync-transport-memory
//!
//! In-process REST backend for the budget, income and outcome collections.
//! Behaves like the production resources closely enough for gateway tests and
//! offline demos: id assignment, `idexists`/`idnull` rejections, 404s and
//! field validation.

use std::{
    cell::{Cell, RefCell},
    collections::HashMap,
};

use async_trait::async_trait;
use bsync_core::{HttpRequest, HttpResponse, Method, Transport};
use bsync_domain::EntityKind;
use serde_json::{json, Map, Value};
use tracing::debug;
use uuid::Uuid;

type Record = Map<String, Value>;

/// A REST server held entirely in memory.
///
/// Records keep their insertion order; updates replace in place.
#[derive(Debug)]
pub struct InMemoryRestServer {
    base: String,
    collections: RefCell<HashMap<EntityKind, Vec<Record>>>,
    requests: RefCell<Vec<HttpRequest>>,
    offline: Cell<bool>,
}

impl Default for InMemoryRestServer {
    fn default() -> Self {
        Self::new("api")
    }
}

impl InMemoryRestServer {
    /// Serves the collections under `/{api_base}`.
    pub fn new(api_base: &str) -> Self {
        let base = api_base.trim_matches('/');
        Self {
            base: if base.is_empty() {
                String::new()
            } else {
                format!("/{base}")
            },
            collections: RefCell::new(HashMap::new()),
            requests: RefCell::new(Vec::new()),
            offline: Cell::new(false),
        }
    }

    /// Every request received so far, in arrival order.
    pub fn requests(&self) -> Vec<HttpRequest> {
        self.requests.borrow().clone()
    }

    /// Number of received requests matching `method` and `path` exactly.
    pub fn request_count(&self, method: Method, path: &str) -> usize {
        self.requests
            .borrow()
            .iter()
            .filter(|request| request.method == method && request.path == path)
            .count()
    }

    pub fn clear_requests(&self) {
        self.requests.borrow_mut().clear();
    }

    /// While offline every call fails before producing a response.
    pub fn set_offline(&self, offline: bool) {
        self.offline.set(offline);
    }

    /// Preloads a record, keeping its `id` or assigning one. Returns the id.
    pub fn seed(&self, collection: &str, value: Value) -> Option<String> {
        let kind = EntityKind::from_collection(collection)?;
        let Value::Object(mut record) = value else {
            return None;
        };
        let id = match record_id(&record) {
            Some(id) => id,
            None => {
                let id = Uuid::new_v4().to_string();
                record.insert("id".into(), Value::String(id.clone()));
                id
            }
        };
        self.upsert(kind, record);
        Some(id)
    }

    /// Stored records of a collection, as persisted (references stay shallow).
    pub fn records(&self, collection: &str) -> Vec<Value> {
        EntityKind::from_collection(collection)
            .and_then(|kind| self.collections.borrow().get(&kind).cloned())
            .unwrap_or_default()
            .into_iter()
            .map(Value::Object)
            .collect()
    }

    fn route(&self, request: &HttpRequest) -> HttpResponse {
        let Some(rest) = request.path.strip_prefix(self.base.as_str()) else {
            return not_found(&request.path);
        };
        let segments: Vec<&str> = rest.split('/').filter(|part| !part.is_empty()).collect();
        let (kind, id) = match segments.as_slice() {
            [collection] => (EntityKind::from_collection(collection), None),
            [collection, id] => (EntityKind::from_collection(collection), Some(*id)),
            _ => (None, None),
        };
        let Some(kind) = kind else {
            return not_found(&request.path);
        };

        match (request.method, id) {
            (Method::Get, None) => self.list(kind),
            (Method::Get, Some(id)) => self.fetch(kind, id, &request.path),
            (Method::Post, None) => self.create(kind, request.body.as_ref()),
            (Method::Put, None) => self.update(kind, request.body.as_ref()),
            (Method::Delete, Some(id)) => self.delete(kind, id),
            _ => error_response(405, "Method Not Allowed", "error.http.405", None),
        }
    }

    fn list(&self, kind: EntityKind) -> HttpResponse {
        let records = self
            .collections
            .borrow()
            .get(&kind)
            .cloned()
            .unwrap_or_default();
        let body = records
            .into_iter()
            .map(|record| self.expand(record))
            .collect::<Vec<_>>();
        HttpResponse::ok(Value::Array(body))
    }

    fn fetch(&self, kind: EntityKind, id: &str, path: &str) -> HttpResponse {
        match self.find(kind, id) {
            Some(record) => HttpResponse::ok(self.expand(record)),
            None => not_found(path),
        }
    }

    fn create(&self, kind: EntityKind, body: Option<&Value>) -> HttpResponse {
        let mut record = match self.accept(kind, body) {
            Ok(record) => record,
            Err(response) => return response,
        };
        if record_id(&record).is_some() {
            return alert(
                400,
                &format!("A new {} cannot already have an ID", kind.name()),
                kind,
                "idexists",
            );
        }
        record.insert("id".into(), Value::String(Uuid::new_v4().to_string()));
        self.upsert(kind, record.clone());
        HttpResponse::new(201, Some(self.expand(record)))
    }

    fn update(&self, kind: EntityKind, body: Option<&Value>) -> HttpResponse {
        let record = match self.accept(kind, body) {
            Ok(record) => record,
            Err(response) => return response,
        };
        if record_id(&record).is_none() {
            return alert(400, "Invalid id", kind, "idnull");
        }
        self.upsert(kind, record.clone());
        HttpResponse::ok(self.expand(record))
    }

    fn delete(&self, kind: EntityKind, id: &str) -> HttpResponse {
        if let Some(records) = self.collections.borrow_mut().get_mut(&kind) {
            records.retain(|record| record_id(record).as_deref() != Some(id));
        }
        HttpResponse::empty(200)
    }

    /// Decodes and validates a request body the way the resource layer would.
    fn accept(&self, kind: EntityKind, body: Option<&Value>) -> Result<Record, HttpResponse> {
        let Some(Value::Object(record)) = body else {
            return Err(error_response(
                400,
                "Bad Request",
                "error.http.400",
                Some("Required request body is missing or not an object"),
            ));
        };
        let mut record = record.clone();

        if let Some(amount) = record.get("amount").cloned() {
            match coerce_number(&amount) {
                Some(number) => {
                    record.insert("amount".into(), number);
                }
                None => {
                    return Err(error_response(
                        400,
                        "Bad Request",
                        "error.http.400",
                        Some(format!("JSON parse error: cannot read `{amount}` as a number").as_str()),
                    ))
                }
            }
        }

        if kind == EntityKind::Budget
            && !matches!(record.get("title"), Some(Value::String(_)))
        {
            return Err(validation_error(kind, "title"));
        }

        if kind.references_budget() {
            if let Some(reference) = record.get("budget").cloned() {
                match reference.get("id").and_then(Value::as_str) {
                    Some(id) => {
                        record.insert("budget".into(), json!({ "id": id }));
                    }
                    None if reference.is_null() => {
                        record.remove("budget");
                    }
                    None => return Err(validation_error(kind, "budget")),
                }
            }
        }

        Ok(record)
    }

    fn find(&self, kind: EntityKind, id: &str) -> Option<Record> {
        self.collections
            .borrow()
            .get(&kind)?
            .iter()
            .find(|record| record_id(record).as_deref() == Some(id))
            .cloned()
    }

    fn upsert(&self, kind: EntityKind, record: Record) {
        let id = record_id(&record);
        let mut collections = self.collections.borrow_mut();
        let records = collections.entry(kind).or_default();
        match records
            .iter_mut()
            .find(|existing| id.is_some() && record_id(existing) == id)
        {
            Some(existing) => *existing = record,
            None => records.push(record),
        }
    }

    /// Replaces a shallow budget reference with the full budget, as an eager
    /// many-to-one join would.
    fn expand(&self, mut record: Record) -> Value {
        let budget_id = record
            .get("budget")
            .and_then(|reference| reference.get("id"))
            .and_then(Value::as_str)
            .map(str::to_string);
        if let Some(budget) = budget_id.and_then(|id| self.find(EntityKind::Budget, &id)) {
            record.insert("budget".into(), Value::Object(budget));
        }
        Value::Object(record)
    }
}

#[async_trait(?Send)]
impl Transport for InMemoryRestServer {
    async fn execute(&self, request: HttpRequest) -> Result<HttpResponse, String> {
        self.requests.borrow_mut().push(request.clone());
        if self.offline.get() {
            debug!("offline: refusing {} {}", request.method, request.url());
            return Err(format!("connection refused: {}", request.path));
        }
        let response = self.route(&request);
        debug!(
            "{} {} -> {}",
            request.method,
            request.url(),
            response.status
        );
        Ok(response)
    }
}

fn record_id(record: &Record) -> Option<String> {
    match record.get("id")? {
        Value::String(id) if !id.is_empty() => Some(id.clone()),
        Value::Number(id) => Some(id.to_string()),
        _ => None,
    }
}

/// Numbers pass through; numeric strings are coerced like a lenient JSON
/// binder would. `null` stays `null`.
fn coerce_number(value: &Value) -> Option<Value> {
    match value {
        Value::Number(_) | Value::Null => Some(value.clone()),
        Value::String(text) => {
            let parsed: f64 = text.trim().parse().ok()?;
            serde_json::Number::from_f64(parsed).map(Value::Number)
        }
        _ => None,
    }
}

fn error_response(status: u16, title: &str, message: &str, detail: Option<&str>) -> HttpResponse {
    let mut body = json!({
        "title": title,
        "status": status,
        "message": message,
    });
    if let Some(detail) = detail {
        body["detail"] = Value::String(detail.to_string());
    }
    HttpResponse::new(status, Some(body))
}

fn alert(status: u16, title: &str, kind: EntityKind, error_key: &str) -> HttpResponse {
    HttpResponse::new(
        status,
        Some(json!({
            "title": title,
            "status": status,
            "message": format!("error.{error_key}"),
            "entityName": kind.name(),
            "errorKey": error_key,
        })),
    )
}

fn validation_error(kind: EntityKind, field: &str) -> HttpResponse {
    HttpResponse::new(
        400,
        Some(json!({
            "title": "Method argument not valid",
            "status": 400,
            "message": "error.validation",
            "fieldErrors": [{
                "objectName": kind.name(),
                "field": field,
                "message": "NotNull",
            }],
        })),
    )
}

fn not_found(path: &str) -> HttpResponse {
    error_response(404, "Not Found", "error.http.404", Some(path))
}
