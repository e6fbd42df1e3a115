//! # Wire Decoders
//!
//! One decoder per endpoint. Raw records mirror what the backend sends
//! (with the aliases it has been seen to use), then convert into core types
//! with their invariants checked.
//!
//! ## List Envelopes
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Body shape                         │ Result                            │
//! │  ───────────────────────────────────┼────────────────────────────────── │
//! │  [ {...}, {...} ]                   │ list                              │
//! │  { "results": [ ... ] }             │ list                              │
//! │  { "data":    [ ... ] }             │ list                              │
//! │  { "<endpoint key>": [ ... ] }      │ list  (bills, products, ...)      │
//! │  { "id": ..., ... }                 │ one record (if endpoint allows)   │
//! │  anything else                      │ Decode error, never an empty list │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;

use tillpoint_core::money::decimal;
use tillpoint_core::{
    Bill, BillItem, BillPayment, BranchStock, CandidateProduct, Customer, Money, Rack, StockItem,
    StockItemId, TransferRequest, TransferStatus,
};

use crate::error::{ClientError, ClientResult};

// =============================================================================
// Envelope
// =============================================================================

/// Which wrapper keys an endpoint may use, and whether a bare object counts.
#[derive(Debug, Clone, Copy)]
pub struct Envelope {
    pub endpoint: &'static str,
    pub key: &'static str,
    pub single_allowed: bool,
}

impl Envelope {
    pub const BILLS: Envelope = Envelope {
        endpoint: "bill search",
        key: "bills",
        single_allowed: true,
    };
    pub const PRODUCTS: Envelope = Envelope {
        endpoint: "product search",
        key: "products",
        single_allowed: false,
    };
    pub const BRANCH_STOCK: Envelope = Envelope {
        endpoint: "branch stock",
        key: "branches",
        single_allowed: false,
    };
    pub const TRANSFERS: Envelope = Envelope {
        endpoint: "transfers",
        key: "transfers",
        single_allowed: false,
    };
    pub const RACKS: Envelope = Envelope {
        endpoint: "racks",
        key: "racks",
        single_allowed: false,
    };
    pub const ALLOCATIONS: Envelope = Envelope {
        endpoint: "stock allocations",
        key: "items",
        single_allowed: false,
    };

    /// Pulls the record list out of a response body.
    pub fn unwrap(&self, body: Value) -> ClientResult<Vec<Value>> {
        match body {
            Value::Array(items) => Ok(items),
            Value::Object(mut map) => {
                for key in ["results", "data", self.key] {
                    if let Some(inner) = map.remove(key) {
                        return match inner {
                            Value::Array(items) => Ok(items),
                            Value::Object(_) if self.single_allowed => Ok(vec![inner]),
                            other => Err(ClientError::decode(
                                self.endpoint,
                                format!("'{key}' holds {}, expected a list", kind(&other)),
                            )),
                        };
                    }
                }
                if self.single_allowed && map.contains_key("id") {
                    return Ok(vec![Value::Object(map)]);
                }
                let keys: Vec<&String> = map.keys().collect();
                Err(ClientError::decode(
                    self.endpoint,
                    format!("unrecognized object with keys {keys:?}"),
                ))
            }
            other => Err(ClientError::decode(
                self.endpoint,
                format!("expected a list, got {}", kind(&other)),
            )),
        }
    }

    /// Unwraps and converts every record; one bad record fails the call.
    pub fn decode<R, T>(&self, body: Value) -> ClientResult<Vec<T>>
    where
        R: DeserializeOwned,
        T: TryFrom<R, Error = String>,
    {
        self.unwrap(body)?
            .into_iter()
            .enumerate()
            .map(|(i, value)| {
                let raw: R = serde_json::from_value(value)
                    .map_err(|e| ClientError::decode(self.endpoint, format!("record {i}: {e}")))?;
                T::try_from(raw)
                    .map_err(|e| ClientError::decode(self.endpoint, format!("record {i}: {e}")))
            })
            .collect()
    }
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "a list",
        Value::Object(_) => "an object",
    }
}

/// Accepts RFC 3339, naive ISO date-times (taken as UTC) and bare dates.
fn parse_timestamp(raw: Option<String>) -> Option<DateTime<Utc>> {
    let raw = raw?;
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f") {
        return Some(naive.and_utc());
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S") {
        return Some(naive.and_utc());
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

// =============================================================================
// Bills
// =============================================================================

#[derive(Debug, Deserialize)]
pub struct RawCustomer {
    #[serde(default, alias = "customer_name")]
    name: Option<String>,
    #[serde(default, alias = "mobile", alias = "phone_number")]
    phone: Option<String>,
    #[serde(default, alias = "due", with = "decimal")]
    due_balance: Money,
}

#[derive(Debug, Deserialize)]
pub struct RawPayment {
    #[serde(default, alias = "payment_method")]
    method: Option<String>,
    #[serde(default, with = "decimal")]
    amount: Money,
}

#[derive(Debug, Deserialize)]
pub struct RawBillItem {
    id: i64,
    #[serde(default, alias = "product")]
    product_id: Option<i64>,
    #[serde(alias = "product_name")]
    name: String,
    #[serde(default, alias = "model_name")]
    model: Option<String>,
    quantity: i64,
    #[serde(default, alias = "price", with = "decimal")]
    unit_price: Money,
    #[serde(default, alias = "returned_quantity")]
    returned_qty: Option<i64>,
    #[serde(default)]
    is_returned: Option<bool>,
    #[serde(default)]
    returned: Option<bool>,
    #[serde(default, alias = "serial_no")]
    serial_number: Option<String>,
    #[serde(default, alias = "total", with = "decimal")]
    final_amount: Money,
    #[serde(default, alias = "salesman", alias = "sales_person")]
    salesperson: Option<String>,
}

impl TryFrom<RawBillItem> for BillItem {
    type Error = String;

    fn try_from(raw: RawBillItem) -> Result<Self, Self::Error> {
        if raw.quantity < 0 {
            return Err(format!("item {} has negative quantity {}", raw.id, raw.quantity));
        }
        let flagged = raw.is_returned.or(raw.returned).unwrap_or(false);
        let returned_qty = match (raw.returned_qty, flagged) {
            (Some(q), _) => q,
            (None, true) => raw.quantity,
            (None, false) => 0,
        };
        if returned_qty < 0 || returned_qty > raw.quantity {
            return Err(format!(
                "item {} has returned quantity {} outside 0..={}",
                raw.id, returned_qty, raw.quantity
            ));
        }
        Ok(BillItem {
            id: raw.id,
            product_id: raw.product_id.unwrap_or_default(),
            name: raw.name,
            model: non_blank(raw.model),
            quantity: raw.quantity,
            unit_price: raw.unit_price,
            returned_qty,
            is_returned: flagged || (raw.quantity > 0 && returned_qty == raw.quantity),
            serial_number: non_blank(raw.serial_number),
            final_amount: raw.final_amount,
            salesperson: non_blank(raw.salesperson),
        })
    }
}

#[derive(Debug, Deserialize)]
pub struct RawBill {
    id: i64,
    #[serde(alias = "invoice_number", alias = "bill_no")]
    bill_number: String,
    #[serde(default, alias = "created_at", alias = "bill_date")]
    date: Option<String>,
    #[serde(default)]
    customer: Option<RawCustomer>,
    #[serde(default)]
    customer_name: Option<String>,
    #[serde(default, alias = "customer_phone")]
    phone: Option<String>,
    #[serde(default, alias = "bill_items")]
    items: Vec<RawBillItem>,
    #[serde(default)]
    payments: Vec<RawPayment>,
    #[serde(default, alias = "total_amount", with = "decimal")]
    final_amount: Money,
}

impl TryFrom<RawBill> for Bill {
    type Error = String;

    fn try_from(raw: RawBill) -> Result<Self, Self::Error> {
        let items = raw
            .items
            .into_iter()
            .map(BillItem::try_from)
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| format!("bill {}: {e}", raw.bill_number))?;

        let customer = match raw.customer {
            Some(c) => Customer {
                name: non_blank(c.name).unwrap_or_else(|| "Walk-in".to_string()),
                phone: non_blank(c.phone),
                due_balance: c.due_balance,
            },
            None => Customer {
                name: non_blank(raw.customer_name).unwrap_or_else(|| "Walk-in".to_string()),
                phone: non_blank(raw.phone),
                due_balance: Money::zero(),
            },
        };

        let payments: Vec<BillPayment> = raw
            .payments
            .into_iter()
            .map(|p| BillPayment {
                method: p.method.unwrap_or_else(|| "unknown".to_string()),
                amount: p.amount,
            })
            .collect();

        Ok(Bill {
            id: raw.id,
            bill_number: raw.bill_number,
            date: parse_timestamp(raw.date),
            customer,
            items,
            is_pay_later: payments.is_empty(),
            payments,
            final_amount: raw.final_amount,
        })
    }
}

// =============================================================================
// Products & Branch Stock
// =============================================================================

#[derive(Debug, Deserialize)]
pub struct RawProduct {
    id: i64,
    #[serde(alias = "product_name")]
    name: String,
    #[serde(default, alias = "model_name")]
    model: Option<String>,
    #[serde(alias = "price", with = "decimal")]
    selling_price: Money,
    #[serde(default, alias = "stock", alias = "quantity")]
    stock_qty: i64,
}

impl TryFrom<RawProduct> for CandidateProduct {
    type Error = String;

    fn try_from(raw: RawProduct) -> Result<Self, Self::Error> {
        if raw.selling_price.is_negative() {
            return Err(format!("product {} has a negative price", raw.id));
        }
        Ok(CandidateProduct {
            id: raw.id,
            name: raw.name,
            model: non_blank(raw.model),
            selling_price: raw.selling_price,
            stock_qty: raw.stock_qty,
        })
    }
}

#[derive(Debug, Deserialize)]
pub struct RawBranchStock {
    #[serde(alias = "branch")]
    branch_id: i64,
    #[serde(alias = "name")]
    branch_name: String,
    #[serde(alias = "stock", alias = "available_quantity")]
    quantity: i64,
}

impl TryFrom<RawBranchStock> for BranchStock {
    type Error = String;

    fn try_from(raw: RawBranchStock) -> Result<Self, Self::Error> {
        Ok(BranchStock {
            branch_id: raw.branch_id,
            branch_name: raw.branch_name,
            quantity: raw.quantity.max(0),
        })
    }
}

// =============================================================================
// Transfers
// =============================================================================

#[derive(Debug, Deserialize)]
pub struct RawTransfer {
    id: i64,
    #[serde(default, alias = "product")]
    product_id: Option<i64>,
    #[serde(default)]
    product_name: Option<String>,
    #[serde(alias = "from_branch_name")]
    from_branch: String,
    #[serde(alias = "to_branch_name")]
    to_branch: String,
    quantity: i64,
    status: String,
    #[serde(default)]
    notes: Option<String>,
    #[serde(default)]
    created_at: Option<String>,
}

impl TryFrom<RawTransfer> for TransferRequest {
    type Error = String;

    fn try_from(raw: RawTransfer) -> Result<Self, Self::Error> {
        let status: TransferStatus = raw
            .status
            .parse()
            .map_err(|_| format!("transfer {} has unknown status {:?}", raw.id, raw.status))?;
        Ok(TransferRequest {
            id: raw.id,
            product_id: raw.product_id.unwrap_or_default(),
            product_name: non_blank(raw.product_name).unwrap_or_else(|| "Unnamed product".into()),
            from_branch: raw.from_branch,
            to_branch: raw.to_branch,
            quantity: raw.quantity,
            status,
            notes: non_blank(raw.notes),
            created_at: parse_timestamp(raw.created_at),
        })
    }
}

// =============================================================================
// Racks & Allocation
// =============================================================================

#[derive(Debug, Deserialize)]
pub struct RawRack {
    id: i64,
    #[serde(alias = "rack_name")]
    name: String,
}

impl TryFrom<RawRack> for Rack {
    type Error = String;

    fn try_from(raw: RawRack) -> Result<Self, Self::Error> {
        Ok(Rack {
            id: raw.id,
            name: raw.name,
        })
    }
}

#[derive(Debug, Deserialize)]
pub struct RawStockItem {
    #[serde(default)]
    id: Option<Value>,
    #[serde(default)]
    product_id: Option<i64>,
    #[serde(default)]
    quantity_record_id: Option<i64>,
    #[serde(alias = "name")]
    product_name: String,
    quantity: i64,
    #[serde(default, alias = "rack")]
    rack_id: Option<i64>,
    #[serde(default)]
    rack_name: Option<String>,
}

impl TryFrom<RawStockItem> for StockItem {
    type Error = String;

    fn try_from(raw: RawStockItem) -> Result<Self, Self::Error> {
        let id = match (raw.product_id, raw.quantity_record_id, raw.id) {
            (Some(product_id), Some(quantity_record_id), _) => StockItemId {
                product_id,
                quantity_record_id,
            },
            (_, _, Some(Value::String(compound))) => {
                compound.parse().map_err(|e: tillpoint_core::ValidationError| e.to_string())?
            }
            (_, _, other) => {
                return Err(format!("stock row has no usable id: {other:?}"));
            }
        };
        Ok(StockItem {
            id,
            product_name: raw.product_name,
            quantity: raw.quantity,
            rack_id: raw.rack_id,
            rack_name: non_blank(raw.rack_name),
        })
    }
}

// =============================================================================
// Auth
// =============================================================================

#[derive(Debug, Deserialize)]
pub struct TokenPair {
    #[serde(alias = "access_token")]
    pub access: String,
    #[serde(alias = "refresh_token")]
    pub refresh: String,
    #[serde(default, alias = "branch_name")]
    pub branch: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct RefreshedToken {
    #[serde(alias = "access_token")]
    pub access: String,
    /// Present when the backend rotates refresh tokens.
    #[serde(default, alias = "refresh_token")]
    pub refresh: Option<String>,
}

// =============================================================================
// Error Bodies
// =============================================================================

/// Best-effort human message from a non-2xx body.
///
/// Looks at `detail`, `error`, `message`, then field errors
/// (`{"quantity": ["Too many"]}`), then the raw text. A structured `detail`
/// object is returned alongside so callers can show it.
pub fn error_message(body: &str) -> (String, Option<Value>) {
    let Ok(value) = serde_json::from_str::<Value>(body) else {
        let text = body.trim();
        return if text.is_empty() || text.len() > 200 || text.starts_with('<') {
            ("Request failed".to_string(), None)
        } else {
            (text.to_string(), None)
        };
    };

    let Value::Object(map) = &value else {
        return match value {
            Value::String(s) if !s.trim().is_empty() => (s, None),
            Value::Array(items) => (join_messages(&items).unwrap_or_else(fallback), None),
            _ => (fallback(), None),
        };
    };

    match map.get("detail") {
        Some(Value::String(s)) => return (s.clone(), None),
        Some(detail @ Value::Object(inner)) => {
            let message = ["message", "detail", "error"]
                .iter()
                .find_map(|k| inner.get(*k).and_then(Value::as_str))
                .map(str::to_string)
                .unwrap_or_else(|| detail.to_string());
            return (message, Some(detail.clone()));
        }
        _ => {}
    }
    for key in ["error", "message"] {
        if let Some(Value::String(s)) = map.get(key) {
            return (s.clone(), None);
        }
    }

    // Form-level errors lead, then fields sorted by name.
    let messages = |errors: &Value| match errors {
        Value::Array(items) => join_messages(items),
        Value::String(s) => Some(s.clone()),
        _ => None,
    };
    let mut parts: Vec<String> = map
        .get("non_field_errors")
        .and_then(messages)
        .into_iter()
        .collect();
    let mut fields: Vec<(&String, &Value)> = map
        .iter()
        .filter(|(k, _)| *k != "non_field_errors")
        .collect();
    fields.sort_by(|a, b| a.0.cmp(b.0));
    for (field, errors) in fields {
        if let Some(text) = messages(errors) {
            parts.push(format!("{field}: {text}"));
        }
    }
    if parts.is_empty() {
        (fallback(), None)
    } else {
        (parts.join("; "), None)
    }
}

fn join_messages(items: &[Value]) -> Option<String> {
    let texts: Vec<&str> = items.iter().filter_map(Value::as_str).collect();
    (!texts.is_empty()).then(|| texts.join(", "))
}

fn fallback() -> String {
    "Request failed".to_string()
}

/// Optional confirmation text in a mutation response.
pub fn success_message(body: &Value) -> Option<String> {
    ["message", "detail", "status"]
        .iter()
        .find_map(|k| body.get(*k).and_then(Value::as_str))
        .map(str::to_string)
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn bill_json(id: i64) -> Value {
        json!({
            "id": id,
            "bill_number": format!("INV-{id}"),
            "date": "2024-03-05T10:15:00Z",
            "customer": {"name": "Asha", "phone": "9876543210", "due_balance": "0.00"},
            "items": [
                {"id": 1, "product_id": 10, "name": "Fan", "quantity": 2,
                 "unit_price": "1200.00", "returned_qty": 1, "final_amount": 2200},
                {"id": 2, "product": 11, "product_name": "Bulb", "quantity": 1,
                 "price": 99.5, "returned": true}
            ],
            "payments": [{"method": "cash", "amount": "2299.50"}],
            "final_amount": "2299.50"
        })
    }

    #[test]
    fn test_all_envelopes_decode() {
        let shapes = [
            json!([bill_json(1)]),
            json!({"results": [bill_json(1)]}),
            json!({"data": [bill_json(1)]}),
            json!({"bills": [bill_json(1)]}),
            bill_json(1),
        ];
        for shape in shapes {
            let bills: Vec<Bill> = Envelope::BILLS.decode::<RawBill, Bill>(shape).unwrap();
            assert_eq!(bills.len(), 1);
            assert_eq!(bills[0].bill_number, "INV-1");
        }
    }

    #[test]
    fn test_unknown_shapes_fail_loudly() {
        for shape in [
            json!({"count": 0}),
            json!({"results": null}),
            json!("oops"),
            json!(42),
        ] {
            let err = Envelope::BILLS.decode::<RawBill, Bill>(shape).unwrap_err();
            assert!(matches!(err, ClientError::Decode { .. }));
        }
        let err = Envelope::RACKS
            .decode::<RawRack, Rack>(json!({"id": 1, "name": "A1"}))
            .unwrap_err();
        assert!(matches!(err, ClientError::Decode { .. }));
    }

    #[test]
    fn test_empty_list_is_not_an_error() {
        let bills = Envelope::BILLS
            .decode::<RawBill, Bill>(json!({"results": []}))
            .unwrap();
        assert!(bills.is_empty());
    }

    #[test]
    fn test_bill_normalization() {
        let bills = Envelope::BILLS
            .decode::<RawBill, Bill>(json!([bill_json(7)]))
            .unwrap();
        let bill = &bills[0];
        assert!(!bill.is_pay_later);
        assert!(bill.date.is_some());
        assert_eq!(bill.final_amount, Money::from_paise(229_950));

        let fan = &bill.items[0];
        assert_eq!(fan.returned_qty, 1);
        assert!(!fan.is_returned);
        assert!(fan.is_selectable());

        let bulb = &bill.items[1];
        assert_eq!(bulb.product_id, 11);
        assert_eq!(bulb.unit_price, Money::from_paise(9950));
        assert_eq!(bulb.returned_qty, 1);
        assert!(bulb.is_returned);
        assert!(!bulb.is_selectable());
    }

    #[test]
    fn test_pay_later_derived_from_missing_payments() {
        let mut raw = bill_json(3);
        raw["payments"] = json!([]);
        let bills = Envelope::BILLS.decode::<RawBill, Bill>(raw).unwrap();
        assert!(bills[0].is_pay_later);
    }

    #[test]
    fn test_returned_qty_above_quantity_rejected() {
        let mut raw = bill_json(3);
        raw["items"][0]["returned_qty"] = json!(5);
        let err = Envelope::BILLS.decode::<RawBill, Bill>(raw).unwrap_err();
        assert!(err.to_string().contains("returned quantity 5"));
    }

    #[test]
    fn test_stock_item_ids() {
        let items = Envelope::ALLOCATIONS
            .decode::<RawStockItem, StockItem>(json!({"results": [
                {"id": "12-340", "product_name": "Fan", "quantity": 4, "rack_id": null},
                {"product_id": 13, "quantity_record_id": 341, "name": "Bulb",
                 "quantity": 2, "rack": 3, "rack_name": "A1"}
            ]}))
            .unwrap();
        assert_eq!(items[0].id.to_string(), "12-340");
        assert_eq!(items[1].id.to_string(), "13-341");
        assert_eq!(items[1].rack_id, Some(3));

        let bad = Envelope::ALLOCATIONS.decode::<RawStockItem, StockItem>(json!([
            {"id": "garbage", "product_name": "Fan", "quantity": 1}
        ]));
        assert!(bad.is_err());
    }

    #[test]
    fn test_transfer_status_aliases() {
        let transfers = Envelope::TRANSFERS
            .decode::<RawTransfer, TransferRequest>(json!({"transfers": [
                {"id": 1, "product": 5, "product_name": "Mixer", "from_branch": "Andheri",
                 "to_branch": "Bandra", "quantity": 2, "status": "Accepted"}
            ]}))
            .unwrap();
        assert_eq!(transfers[0].status, TransferStatus::Approved);
    }

    #[test]
    fn test_error_message_extraction() {
        assert_eq!(error_message(r#"{"detail": "Bill not found"}"#).0, "Bill not found");
        assert_eq!(error_message(r#"{"error": "Out of stock"}"#).0, "Out of stock");
        assert_eq!(
            error_message(r#"{"quantity": ["Exceeds remaining"], "non_field_errors": ["Closed"]}"#).0,
            "Closed; quantity: Exceeds remaining"
        );
        assert_eq!(
            error_message(
                r#"{"zone": "Unknown", "amount": ["Too high", "Not a number"], "non_field_errors": ["Bill locked"]}"#
            )
            .0,
            "Bill locked; amount: Too high, Not a number; zone: Unknown"
        );

        let (msg, detail) =
            error_message(r#"{"detail": {"message": "Too far from store", "distance_m": 420}}"#);
        assert_eq!(msg, "Too far from store");
        assert_eq!(detail.unwrap()["distance_m"], 420);

        assert_eq!(error_message("<html>502</html>").0, "Request failed");
        assert_eq!(error_message("").0, "Request failed");
    }

    #[test]
    fn test_timestamp_formats() {
        assert!(parse_timestamp(Some("2024-03-05T10:15:00+05:30".into())).is_some());
        assert!(parse_timestamp(Some("2024-03-05T10:15:00.123".into())).is_some());
        assert!(parse_timestamp(Some("2024-03-05".into())).is_some());
        assert!(parse_timestamp(Some("yesterday".into())).is_none());
        assert!(parse_timestamp(None).is_none());
    }
}
