//! In-process stub of the POS backend.
//!
//! Accepts one access token at a time. Tests rotate it to force the client
//! through the refresh path.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use axum::{
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Value};
use tokio::net::TcpListener;

use tillpoint_client::{
    ClientConfig, MemorySessionStore, PosClient, SessionContext, SessionData, REQUEST_ID_HEADER,
};

pub struct Stub {
    pub valid_token: Mutex<String>,
    pub refresh_ok: AtomicBool,
    pub refresh_calls: AtomicUsize,
    pub request_ids: Mutex<Vec<String>>,
    pub bodies: Mutex<Vec<(String, Value)>>,
    pub bills: Mutex<Value>,
    pub queries: Mutex<Vec<String>>,
}

impl Stub {
    pub fn new() -> Arc<Self> {
        Arc::new(Stub {
            valid_token: Mutex::new("access-1".to_string()),
            refresh_ok: AtomicBool::new(true),
            refresh_calls: AtomicUsize::new(0),
            request_ids: Mutex::new(Vec::new()),
            bodies: Mutex::new(Vec::new()),
            bills: Mutex::new(json!({"results": [bill(1042)]})),
            queries: Mutex::new(Vec::new()),
        })
    }

    /// Server-side token rotation: the client's current token stops working.
    pub fn rotate_token(&self, token: &str) {
        *self.valid_token.lock().unwrap() = token.to_string();
    }

    pub fn set_bills(&self, body: Value) {
        *self.bills.lock().unwrap() = body;
    }

    pub fn last_body(&self) -> (String, Value) {
        self.bodies.lock().unwrap().last().cloned().unwrap()
    }

    fn authorized(&self, headers: &HeaderMap) -> bool {
        let expected = format!("Bearer {}", self.valid_token.lock().unwrap());
        headers
            .get("authorization")
            .and_then(|v| v.to_str().ok())
            .is_some_and(|v| v == expected)
    }

    fn record(&self, path: &str, headers: &HeaderMap, body: &Value) {
        if let Some(id) = headers.get(REQUEST_ID_HEADER).and_then(|v| v.to_str().ok()) {
            self.request_ids.lock().unwrap().push(id.to_string());
        }
        self.bodies
            .lock()
            .unwrap()
            .push((path.to_string(), body.clone()));
    }
}

pub fn bill(id: i64) -> Value {
    json!({
        "id": id,
        "bill_number": format!("INV-{id}"),
        "created_at": "2024-03-05T10:15:00Z",
        "customer": {"name": "Asha", "phone": "9876543210"},
        "items": [
            {"id": 1, "product_id": 10, "name": "Ceiling Fan", "quantity": 2,
             "unit_price": "1250.00", "returned_qty": 0, "final_amount": "2500.00",
             "serial_number": "FAN-001"},
            {"id": 2, "product_id": 11, "name": "LED Bulb", "quantity": 4,
             "unit_price": "99.00", "is_returned": true}
        ],
        "payments": [{"method": "cash", "amount": "2896.00"}],
        "final_amount": "2896.00"
    })
}

fn unauthorized() -> axum::response::Response {
    (
        StatusCode::UNAUTHORIZED,
        Json(json!({"detail": "Given token not valid for any token type", "code": "token_not_valid"})),
    )
        .into_response()
}

// =============================================================================
// Handlers
// =============================================================================

async fn login(Json(body): Json<Value>) -> axum::response::Response {
    if body["username"] == "cashier" && body["password"] == "secret" {
        Json(json!({"access": "access-1", "refresh": "refresh-1", "branch": "Andheri"}))
            .into_response()
    } else {
        (
            StatusCode::UNAUTHORIZED,
            Json(json!({"detail": "No active account found with the given credentials"})),
        )
            .into_response()
    }
}

async fn refresh(State(stub): State<Arc<Stub>>, Json(body): Json<Value>) -> axum::response::Response {
    stub.refresh_calls.fetch_add(1, Ordering::SeqCst);
    if stub.refresh_ok.load(Ordering::SeqCst) && body["refresh"] == "refresh-1" {
        let token = stub.valid_token.lock().unwrap().clone();
        Json(json!({"access": token})).into_response()
    } else {
        (
            StatusCode::UNAUTHORIZED,
            Json(json!({"detail": "Token is invalid or expired"})),
        )
            .into_response()
    }
}

async fn search_bills(
    State(stub): State<Arc<Stub>>,
    headers: HeaderMap,
    Query(params): Query<HashMap<String, String>>,
) -> axum::response::Response {
    if !stub.authorized(&headers) {
        return unauthorized();
    }
    stub.queries
        .lock()
        .unwrap()
        .push(params.get("q").cloned().unwrap_or_default());
    Json(stub.bills.lock().unwrap().clone()).into_response()
}

async fn submit_return(
    State(stub): State<Arc<Stub>>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> axum::response::Response {
    stub.record("return", &headers, &body);
    if !stub.authorized(&headers) {
        return unauthorized();
    }
    Json(json!({"message": "Return processed"})).into_response()
}

async fn submit_replacement(
    State(stub): State<Arc<Stub>>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> axum::response::Response {
    stub.record("replace", &headers, &body);
    if !stub.authorized(&headers) {
        return unauthorized();
    }
    (
        StatusCode::BAD_REQUEST,
        Json(json!({"detail": {"message": "Serial number already registered", "serial": "FAN-900"}})),
    )
        .into_response()
}

async fn branch_stock(
    State(stub): State<Arc<Stub>>,
    headers: HeaderMap,
    Path(product_id): Path<i64>,
) -> axum::response::Response {
    if !stub.authorized(&headers) {
        return unauthorized();
    }
    let quantity = if product_id == 10 { 5 } else { 0 };
    Json(json!([
        {"branch_id": 1, "branch_name": "Andheri", "quantity": 9},
        {"branch_id": 2, "branch_name": "Bandra", "quantity": quantity},
        {"branch_id": 3, "branch_name": "Thane", "quantity": 0}
    ]))
    .into_response()
}

async fn received_transfers(
    State(stub): State<Arc<Stub>>,
    headers: HeaderMap,
) -> axum::response::Response {
    if !stub.authorized(&headers) {
        return unauthorized();
    }
    Json(json!({"data": [
        {"id": 7, "product": 10, "product_name": "Ceiling Fan", "from_branch": "Andheri",
         "to_branch": "Bandra", "quantity": 2, "status": "pending", "notes": "urgent"}
    ]}))
    .into_response()
}

async fn update_transfer(
    State(stub): State<Arc<Stub>>,
    headers: HeaderMap,
    Path(transfer_id): Path<i64>,
    Json(body): Json<Value>,
) -> axum::response::Response {
    stub.record(&format!("transfer/{transfer_id}"), &headers, &body);
    if !stub.authorized(&headers) {
        return unauthorized();
    }
    Json(json!({"status": "accepted"})).into_response()
}

async fn update_due(State(stub): State<Arc<Stub>>, headers: HeaderMap) -> axum::response::Response {
    if !stub.authorized(&headers) {
        return unauthorized();
    }
    (StatusCode::BAD_GATEWAY, "upstream down").into_response()
}

async fn racks(State(stub): State<Arc<Stub>>, headers: HeaderMap) -> axum::response::Response {
    if !stub.authorized(&headers) {
        return unauthorized();
    }
    Json(json!({"count": 2, "next": null})).into_response()
}

async fn allocations(State(stub): State<Arc<Stub>>, headers: HeaderMap) -> axum::response::Response {
    if !stub.authorized(&headers) {
        return unauthorized();
    }
    Json(json!({"results": [
        {"id": "10-501", "product_name": "Ceiling Fan", "quantity": 3, "rack_id": null}
    ]}))
    .into_response()
}

async fn allocate(
    State(stub): State<Arc<Stub>>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> axum::response::Response {
    stub.record("allocate", &headers, &body);
    if !stub.authorized(&headers) {
        return unauthorized();
    }
    StatusCode::NO_CONTENT.into_response()
}

// =============================================================================
// Harness
// =============================================================================

pub fn router(stub: Arc<Stub>) -> Router {
    Router::new()
        .route("/api/token/", post(login))
        .route("/api/token/refresh/", post(refresh))
        .route("/api/pos/bills/search/", get(search_bills))
        .route("/api/pos/bill/return/", post(submit_return))
        .route("/api/pos/replace/create/", post(submit_replacement))
        .route("/api/pos/products/{id}/branch-stock/", get(branch_stock))
        .route("/api/pos/transfers/received/", get(received_transfers))
        .route("/api/pos/transfer/update/{id}/", post(update_transfer))
        .route("/api/pos/due/update/", post(update_due))
        .route("/api/pos/racks/", get(racks))
        .route("/api/pos/stock/allocations/", get(allocations))
        .route("/api/pos/stock/allocate/", post(allocate))
        .with_state(stub)
}

/// Serves the stub on an ephemeral port and returns its base URL.
pub async fn spawn(stub: Arc<Stub>) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router(stub)).await.unwrap();
    });
    format!("http://{addr}/")
}

/// Client already holding `access-1` / `refresh-1`.
pub async fn logged_in_client(stub: Arc<Stub>) -> PosClient {
    let base = spawn(stub).await;
    let store = Arc::new(MemorySessionStore::with_data(SessionData {
        access_token: Some("access-1".into()),
        refresh_token: Some("refresh-1".into()),
        branch: Some("Andheri".into()),
    }));
    let session = Arc::new(SessionContext::load(store).unwrap());
    PosClient::new(&ClientConfig::with_base_url(base), session).unwrap()
}

pub async fn anonymous_client(stub: Arc<Stub>) -> PosClient {
    let base = spawn(stub).await;
    PosClient::new(
        &ClientConfig::with_base_url(base),
        Arc::new(SessionContext::in_memory()),
    )
    .unwrap()
}
