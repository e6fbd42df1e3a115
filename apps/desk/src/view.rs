//! # Rendering
//!
//! Plain-text views of desk state. Every step of the bill workflow has
//! exactly one view, chosen by an exhaustive match.
//!
//! ```text
//! [1042] Bill INV-1042  05 Mar 2024  Asha (9876543210)  total ₹2896.00  paid ₹2896.00
//!   #1  Ceiling Fan          2 × ₹1250.00   returned 0   [FAN-001]
//!   #2  LED Bulb             4 × ₹99.00     returned 4   (fully returned)
//! ```

use std::fmt::Write;

use chrono::{DateTime, Local, Utc};

use tillpoint_core::flow::{DueDraft, ReplacementDraft, ReplacementKind, ReturnDraft, TransferDraft};
use tillpoint_core::{
    Balance, Bill, BillItem, DeskStep, Rack, Settlement, StockItem, TransferRequest,
};

pub fn step(step: &DeskStep) -> String {
    match step {
        DeskStep::Search => "Search a bill: search <bill no. | name | phone>".to_string(),
        DeskStep::SelectBill { bills } => {
            let mut out = format!("{} bills found, pick one with `bill <id>`:\n", bills.len());
            for bill in bills {
                let _ = writeln!(out, "  {}", bill_line(bill));
            }
            out
        }
        DeskStep::SelectItem { bill } => {
            let mut out = bill_view(bill);
            out.push_str("Pick an item with `item <id>`");
            if bill.is_pay_later && bill.due_amount().is_positive() {
                out.push_str(", or collect the due with `due`");
            }
            out
        }
        DeskStep::ChooseAction { bill, item } => format!(
            "{}\n  {}\nChoose `return` or `replace`",
            bill_line(bill),
            item_line(item)
        ),
        DeskStep::Return { bill, draft } => format!("{}\n{}", bill_line(bill), return_view(draft)),
        DeskStep::Replace { bill, draft } => {
            format!("{}\n{}", bill_line(bill), replacement_view(draft))
        }
        DeskStep::CollectDue { bill, draft } => format!("{}\n{}", bill_line(bill), due_view(draft)),
    }
}

fn bill_line(bill: &Bill) -> String {
    let date = local(bill.date, "%d %b %Y");
    let phone = bill
        .customer
        .phone
        .as_deref()
        .map(|p| format!(" ({p})"))
        .unwrap_or_default();
    let payment = if bill.is_pay_later {
        format!("pay later, due {}", bill.due_amount())
    } else {
        format!("paid {}", bill.paid())
    };
    format!(
        "[{}] Bill {}  {}  {}{}  total {}  {}",
        bill.id, bill.bill_number, date, bill.customer.name, phone, bill.final_amount, payment
    )
}

/// Backend timestamps are UTC; the desk shows local time.
fn local(at: Option<DateTime<Utc>>, format: &str) -> String {
    at.map(|d| d.with_timezone(&Local).format(format).to_string())
        .unwrap_or_else(|| "-".to_string())
}

fn bill_view(bill: &Bill) -> String {
    let mut out = bill_line(bill);
    out.push('\n');
    for item in &bill.items {
        let _ = writeln!(out, "  {}", item_line(item));
    }
    out
}

fn item_line(item: &BillItem) -> String {
    let mut line = format!(
        "#{:<3} {:<24} {} × {}  returned {}",
        item.id, item.name, item.quantity, item.unit_price, item.returned_qty
    );
    if let Some(model) = &item.model {
        let _ = write!(line, "  model {model}");
    }
    if let Some(serial) = item.serial() {
        let _ = write!(line, "  [{serial}]");
    }
    if !item.is_selectable() {
        line.push_str("  (fully returned)");
    }
    line
}

fn or_dash<T: ToString>(value: Option<T>) -> String {
    value.map(|v| v.to_string()).unwrap_or_else(|| "-".to_string())
}

pub fn return_view(draft: &ReturnDraft) -> String {
    let amount = match draft.refund_amount() {
        Ok(amount) => amount.to_string(),
        Err(e) => format!("({e})"),
    };
    let refund = if draft.needs_refund_method() {
        format!("refund {amount} via {}", or_dash(draft.refund_method()))
    } else {
        format!("pay-later bill, no refund ({amount} off the due)")
    };
    format!(
        "RETURN {} × {} (max {})\n  {}\n  stock: {}\n  next: qty <n> | refund cash|online | dest stock|vendor | submit",
        draft.quantity(),
        draft.item().name,
        draft.item().remaining_qty(),
        refund,
        or_dash(draft.destination()),
    )
}

pub fn replacement_view(draft: &ReplacementDraft) -> String {
    let mut out = format!(
        "REPLACE {} × {} (max {})  stock: {}\n",
        draft.quantity(),
        draft.item().name,
        draft.item().remaining_qty(),
        or_dash(draft.destination())
    );
    match draft.kind() {
        None => out.push_str("  choose: replace warranty | replace dissatisfaction"),
        Some(ReplacementKind::Warranty { new_serial }) => {
            let _ = write!(out, "  warranty swap, old serial {}", or_dash(draft.item().serial()));
            if draft.requires_new_serial() {
                let _ = write!(out, ", new serial {}", or_dash(new_serial.as_deref()));
            }
            out.push_str("\n  next: serial <no.> | dest stock|vendor | submit");
        }
        Some(ReplacementKind::Dissatisfaction {
            candidates,
            product,
            discount,
            settlement,
        }) => {
            match product {
                Some(p) => {
                    let _ = writeln!(out, "  new product: [{}] {} @ {}", p.id, p.name, p.selling_price);
                }
                None if candidates.is_empty() => out.push_str("  find <name | model | barcode>\n"),
                None => {
                    for c in candidates {
                        let _ = writeln!(
                            out,
                            "  [{}] {} {}  {}  stock {}",
                            c.id,
                            c.name,
                            c.model.as_deref().unwrap_or(""),
                            c.selling_price,
                            c.stock_qty
                        );
                    }
                    out.push_str("  pick <id>\n");
                }
            }
            if let Some(d) = discount {
                let _ = writeln!(out, "  discount: {d}");
            }
            match draft.quote() {
                Ok(Some(quote)) => {
                    let _ = writeln!(
                        out,
                        "  paid {}  new {}  discount {}  new total {}",
                        quote.original_paid,
                        quote.new_product_total,
                        quote.discount_amount,
                        quote.discounted_new_total
                    );
                    let _ = writeln!(out, "  {}", balance_line(quote.balance()));
                }
                Ok(None) => {}
                Err(e) => {
                    let _ = writeln!(out, "  cannot price: {e}");
                }
            }
            if let Some(s) = settlement {
                let _ = writeln!(out, "  settled: {}", settlement_line(s));
            }
            out.push_str("  next: find | pick | drop | discount | settle | dest | submit");
        }
    }
    out
}

pub fn balance_line(balance: Balance) -> String {
    match balance {
        Balance::CustomerPays(m) => format!("customer pays {m}"),
        Balance::RefundDue(m) => format!("refund {m} to customer"),
        Balance::Even => "no money changes hands".to_string(),
    }
}

fn settlement_line(settlement: &Settlement) -> String {
    match settlement {
        Settlement::Payment(p) => match (p.cash_amount, p.upi_amount) {
            (Some(c), Some(u)) if p.method == tillpoint_core::PaymentMethod::Split => {
                format!("collect {} (cash {c} + upi {u})", p.amount)
            }
            _ => format!("collect {} by {}", p.amount, p.method),
        },
        Settlement::Refund(r) => format!("refund {} by {}", r.amount, r.method),
    }
}

pub fn due_view(draft: &DueDraft) -> String {
    let tender = match draft.tender() {
        None => "-".to_string(),
        Some(t) => match t {
            tillpoint_core::flow::DueTender::Cash(m) => format!("cash {m}"),
            tillpoint_core::flow::DueTender::Upi(m) => format!("upi {m}"),
            tillpoint_core::flow::DueTender::Split { cash, upi } => {
                format!("cash {cash} + upi {upi}")
            }
        },
    };
    format!(
        "DUE on {}: {}\n  tender: {}\n  next: due cash <amt> | due upi <amt> | due split <cash> <upi> | submit",
        draft.bill_number(),
        draft.due(),
        tender
    )
}

pub fn transfer_draft(draft: &TransferDraft) -> String {
    let mut out = format!("TRANSFER product {}\n", draft.product_id());
    if draft.sources().is_empty() {
        out.push_str("  no other branch holds this product\n");
    }
    for s in draft.sources() {
        let marker = if draft.source().is_some_and(|c| c.branch_id == s.branch_id) {
            "*"
        } else {
            " "
        };
        let _ = writeln!(out, " {marker}[{}] {:<20} {} available", s.branch_id, s.branch_name, s.quantity);
    }
    let _ = write!(
        out,
        "  quantity {}\n  next: from <branch id> | transfer qty <n> | transfer note <text> | transfer send",
        draft.quantity()
    );
    out
}

pub fn transfers(title: &str, list: &[TransferRequest]) -> String {
    if list.is_empty() {
        return format!("{title}: none");
    }
    let mut out = format!("{title}:\n");
    for t in list {
        let _ = writeln!(
            out,
            "  [{}] {}  {} × {}  {} → {}  {}{}",
            t.id,
            local(t.created_at, "%d %b %H:%M"),
            t.quantity,
            t.product_name,
            t.from_branch,
            t.to_branch,
            t.status,
            t.notes.as_deref().map(|n| format!("  \"{n}\"")).unwrap_or_default()
        );
    }
    out.trim_end().to_string()
}

pub fn racks(racks: &[Rack]) -> String {
    if racks.is_empty() {
        return "No racks configured".to_string();
    }
    racks
        .iter()
        .map(|r| format!("  [{}] {}", r.id, r.name))
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn stock(items: &[StockItem]) -> String {
    if items.is_empty() {
        return "No stock rows".to_string();
    }
    items
        .iter()
        .map(|i| {
            format!(
                "  {:<10} {:<24} qty {:<4} rack {}",
                i.id.to_string(),
                i.product_name,
                i.quantity,
                i.rack_name.as_deref().unwrap_or("unallocated")
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use tillpoint_core::{Customer, Money};

    fn item(id: i64, quantity: i64, returned: i64) -> BillItem {
        BillItem {
            id,
            product_id: 10 + id,
            name: format!("Item {id}"),
            model: None,
            quantity,
            unit_price: Money::from_rupees(100),
            returned_qty: returned,
            is_returned: returned == quantity,
            serial_number: Some("SN-1".into()),
            final_amount: Money::from_rupees(100 * quantity),
            salesperson: None,
        }
    }

    fn bill(pay_later: bool) -> Bill {
        Bill {
            id: 1,
            bill_number: "INV-1042".into(),
            date: None,
            customer: Customer {
                name: "Asha".into(),
                phone: None,
                due_balance: Money::zero(),
            },
            items: vec![item(1, 2, 0), item(2, 1, 1)],
            payments: Vec::new(),
            final_amount: Money::from_rupees(300),
            is_pay_later: pay_later,
        }
    }

    #[test]
    fn test_item_list_marks_returned_lines() {
        let text = step(&DeskStep::SelectItem { bill: bill(false) });
        assert!(text.contains("INV-1042"));
        assert!(text.contains("[SN-1]"));
        assert_eq!(text.matches("(fully returned)").count(), 1);
        assert!(!text.contains("`due`"));
    }

    #[test]
    fn test_pay_later_offers_due_collection() {
        let text = step(&DeskStep::SelectItem { bill: bill(true) });
        assert!(text.contains("pay later, due ₹300.00"));
        assert!(text.contains("`due`"));
    }

    #[test]
    fn test_return_view_on_pay_later() {
        let b = bill(true);
        let draft = ReturnDraft::new(&b, &b.items[0]);
        let text = return_view(&draft);
        assert!(text.contains("no refund"));
        assert!(text.contains("max 2"));
    }

    #[test]
    fn test_balance_lines() {
        assert_eq!(
            balance_line(Balance::CustomerPays(Money::from_rupees(100))),
            "customer pays ₹100.00"
        );
        assert_eq!(balance_line(Balance::Even), "no money changes hands");
    }
}
