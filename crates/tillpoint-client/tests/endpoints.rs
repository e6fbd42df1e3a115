//! Endpoint decoding and error surfacing against the stub backend.

mod common;

use serde_json::json;

use common::{bill, logged_in_client, Stub};
use tillpoint_client::ClientError;
use tillpoint_core::flow::{DueDraft, DueTender};
use tillpoint_core::requests::{ReplacementItem, ReplacementRequest};
use tillpoint_core::{
    Bill, Customer, Money, ReplacementType, StockDestination, StockItemId, TransferAction,
    TransferStatus,
};

#[tokio::test]
async fn bill_search_normalizes_items() {
    let stub = Stub::new();
    let client = logged_in_client(stub.clone()).await;

    let bills = client.search_bills("  INV-1042 ").await.unwrap();
    assert_eq!(stub.queries.lock().unwrap().as_slice(), ["INV-1042"]);

    let bill = &bills[0];
    assert_eq!(bill.bill_number, "INV-1042");
    assert!(!bill.is_pay_later);
    assert!(bill.date.is_some());

    let bulb = bill.item(2).unwrap();
    assert_eq!(bulb.returned_qty, 4);
    assert!(!bulb.is_selectable());
    assert_eq!(bill.selectable_items().count(), 1);
}

#[tokio::test]
async fn bill_search_accepts_every_known_envelope() {
    let stub = Stub::new();
    let client = logged_in_client(stub.clone()).await;

    for body in [
        json!([bill(1), bill(2)]),
        json!({"data": [bill(1), bill(2)]}),
        json!({"bills": [bill(1), bill(2)]}),
    ] {
        stub.set_bills(body);
        assert_eq!(client.search_bills("INV").await.unwrap().len(), 2);
    }

    stub.set_bills(bill(9));
    assert_eq!(client.search_bills("INV-9").await.unwrap()[0].id, 9);

    stub.set_bills(json!({"results": []}));
    assert!(client.search_bills("nobody").await.unwrap().is_empty());
}

#[tokio::test]
async fn unknown_envelope_fails_loudly() {
    let stub = Stub::new();
    stub.set_bills(json!({"count": 0, "items_found": []}));
    let client = logged_in_client(stub).await;

    let err = client.search_bills("INV").await.unwrap_err();
    assert!(matches!(err, ClientError::Decode { .. }));

    let err = client.racks().await.unwrap_err();
    assert!(matches!(err, ClientError::Decode { .. }));
}

#[tokio::test]
async fn blank_search_is_rejected_locally() {
    let stub = Stub::new();
    let client = logged_in_client(stub.clone()).await;

    let err = client.search_bills("   ").await.unwrap_err();
    assert!(matches!(err, ClientError::Validation(_)));
    assert!(stub.queries.lock().unwrap().is_empty());
}

#[tokio::test]
async fn structured_error_detail_is_preserved() {
    let stub = Stub::new();
    let client = logged_in_client(stub).await;

    let request = ReplacementRequest {
        bill_id: 1042,
        replacement_type: ReplacementType::Warranty,
        destination: StockDestination::Vendor,
        items: vec![ReplacementItem {
            bill_item_id: 1,
            quantity: 1,
            old_serial_number: Some("FAN-001".into()),
            new_serial_number: Some("FAN-900".into()),
            new_product_id: None,
            new_price: None,
            discount_type: None,
            discount_value: None,
        }],
        payment: None,
        refund: None,
    };

    match client.submit_replacement(&request).await.unwrap_err() {
        ClientError::Api {
            status,
            message,
            detail,
        } => {
            assert_eq!(status, 400);
            assert_eq!(message, "Serial number already registered");
            assert_eq!(detail.unwrap()["serial"], "FAN-900");
        }
        other => panic!("expected Api error, got {other:?}"),
    }
}

#[tokio::test]
async fn gateway_errors_are_retryable() {
    let stub = Stub::new();
    let client = logged_in_client(stub).await;

    let bill = Bill {
        id: 5,
        bill_number: "INV-5".into(),
        date: None,
        customer: Customer {
            name: "Ravi".into(),
            phone: None,
            due_balance: Money::from_rupees(1200),
        },
        items: Vec::new(),
        payments: Vec::new(),
        final_amount: Money::from_rupees(1200),
        is_pay_later: true,
    };

    let mut draft = DueDraft::new(&bill).unwrap();
    draft.set_cash(Money::from_rupees(500));
    assert_eq!(draft.tender(), Some(DueTender::Cash(Money::from_rupees(500))));
    let request = draft.build_request().unwrap();

    let err = client.update_due(&request).await.unwrap_err();
    assert_eq!(err.status(), Some(502));
    assert!(err.is_retryable());
    assert_eq!(err.to_string(), "upstream down (HTTP 502)");
}

#[tokio::test]
async fn branch_stock_and_transfers() {
    let stub = Stub::new();
    let client = logged_in_client(stub.clone()).await;

    let stock = client.branch_stock(10).await.unwrap();
    assert_eq!(stock.len(), 3);
    assert_eq!(stock[1].quantity, 5);

    let received = client.received_transfers().await.unwrap();
    assert_eq!(received[0].status, TransferStatus::Pending);
    assert!(received[0].is_actionable());

    let receipt = client.update_transfer(7, TransferAction::Accept).await.unwrap();
    assert_eq!(receipt.message.as_deref(), Some("accepted"));
    let (path, body) = stub.last_body();
    assert_eq!(path, "transfer/7");
    assert_eq!(body, json!({"action": "accept"}));
}

#[tokio::test]
async fn stock_allocation_round() {
    let stub = Stub::new();
    let client = logged_in_client(stub.clone()).await;

    let items = client.stock_allocations().await.unwrap();
    let id: StockItemId = "10-501".parse().unwrap();
    assert_eq!(items[0].id, id);

    let receipt = client.allocate(id, 4).await.unwrap();
    assert!(receipt.body.is_null());
    let (_, body) = stub.last_body();
    assert_eq!(
        body,
        json!({"product_id": 10, "quantity_record_id": 501, "rack_id": 4})
    );
}
