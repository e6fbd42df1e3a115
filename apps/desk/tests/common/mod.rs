//! In-process POS backend for desk workflows.
//!
//! Serves one bill, records what the desk sends and flips the bill to paid
//! once a due payment lands.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Value};
use tokio::net::TcpListener;

use tillpoint_client::{
    ClientConfig, Debouncer, MemorySessionStore, PosClient, SessionContext, SessionData,
};
use tillpoint_desk::state::AppState;

/// A query the stub answers late, so a newer search overtakes it.
pub const SLOW_QUERY: &str = "slow";

pub struct Stub {
    pub bill: Mutex<Value>,
    pub reject_returns: AtomicBool,
    pub queries: Mutex<Vec<String>>,
    pub bodies: Mutex<Vec<(String, Value)>>,
}

impl Stub {
    pub fn new(bill: Value) -> Arc<Self> {
        Arc::new(Stub {
            bill: Mutex::new(bill),
            reject_returns: AtomicBool::new(false),
            queries: Mutex::new(Vec::new()),
            bodies: Mutex::new(Vec::new()),
        })
    }

    pub fn sent(&self, path: &str) -> Vec<Value> {
        self.bodies
            .lock()
            .unwrap()
            .iter()
            .filter(|(p, _)| p == path)
            .map(|(_, body)| body.clone())
            .collect()
    }

    fn record(&self, path: &str, body: &Value) {
        self.bodies
            .lock()
            .unwrap()
            .push((path.to_string(), body.clone()));
    }
}

/// Bill 1042: a serialised fan (qty 2) for ₹2500.
pub fn bill(pay_later: bool) -> Value {
    let payments = if pay_later {
        json!([])
    } else {
        json!([{"method": "cash", "amount": "2500.00"}])
    };
    json!({
        "id": 1042,
        "bill_number": "INV-1042",
        "created_at": "2024-03-05T10:15:00Z",
        "customer": {"name": "Asha", "phone": "9876543210"},
        "items": [
            {"id": 1, "product_id": 10, "name": "Ceiling Fan", "quantity": 2,
             "unit_price": "1250.00", "returned_qty": 0, "final_amount": "2500.00",
             "serial_number": "FAN-001"}
        ],
        "payments": payments,
        "final_amount": "2500.00"
    })
}

// =============================================================================
// Handlers
// =============================================================================

async fn search_bills(
    State(stub): State<Arc<Stub>>,
    Query(params): Query<HashMap<String, String>>,
) -> axum::response::Response {
    let query = params.get("q").cloned().unwrap_or_default();
    stub.queries.lock().unwrap().push(query.clone());
    if query == SLOW_QUERY {
        tokio::time::sleep(Duration::from_millis(300)).await;
    }
    let bill = stub.bill.lock().unwrap().clone();
    Json(json!({"results": [bill]})).into_response()
}

async fn submit_return(State(stub): State<Arc<Stub>>, Json(body): Json<Value>) -> axum::response::Response {
    stub.record("return", &body);
    if stub.reject_returns.load(Ordering::SeqCst) {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({"non_field_errors": ["Bill locked for audit"]})),
        )
            .into_response();
    }
    Json(json!({"message": "Return processed"})).into_response()
}

async fn submit_replacement(
    State(stub): State<Arc<Stub>>,
    Json(body): Json<Value>,
) -> axum::response::Response {
    stub.record("replace", &body);
    Json(json!({"message": "Replacement created"})).into_response()
}

async fn update_due(State(stub): State<Arc<Stub>>, Json(body): Json<Value>) -> axum::response::Response {
    stub.record("due", &body);
    *stub.bill.lock().unwrap() = bill(false);
    Json(json!({"message": "Due cleared"})).into_response()
}

// =============================================================================
// Harness
// =============================================================================

pub fn router(stub: Arc<Stub>) -> Router {
    Router::new()
        .route("/api/pos/bills/search/", get(search_bills))
        .route("/api/pos/bill/return/", post(submit_return))
        .route("/api/pos/replace/create/", post(submit_replacement))
        .route("/api/pos/due/update/", post(update_due))
        .with_state(stub)
}

/// Desk state logged in against a freshly served stub.
pub async fn desk(stub: Arc<Stub>) -> AppState {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router(stub)).await.unwrap();
    });

    let store = Arc::new(MemorySessionStore::with_data(SessionData {
        access_token: Some("access-1".into()),
        refresh_token: Some("refresh-1".into()),
        branch: Some("Andheri".into()),
    }));
    let session = Arc::new(SessionContext::load(store).unwrap());
    let client = PosClient::new(&ClientConfig::with_base_url(format!("http://{addr}/")), session)
        .unwrap();
    AppState::new(client, Debouncer::new(Duration::from_millis(350)))
}
