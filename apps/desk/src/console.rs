//! # Console
//!
//! Turns one line of cashier input into a [`Command`] and runs it.
//!
//! ```text
//! "refund cash" ──► parse ──► Command::Refund(Cash) ──► dispatch ──► commands::returns
//!                     │
//!                     └── bad input ──► DeskError (USAGE), nothing else happens
//! ```
//!
//! Parsing never touches state, so every verb's grammar is tested without
//! a backend.

use tillpoint_core::flow::DueTender;
use tillpoint_core::{
    Discount, DiscountRate, Money, RefundMethod, ReplacementType, SettlementMethod,
    StockDestination, TransferAction,
};

use crate::commands::{self, auth, bill, due, replace, returns, stock, transfer};
use crate::error::{DeskError, DeskResult};
use crate::state::AppState;

pub const HELP: &str = "\
session    login <user> <password> | logout | status
bills      search <bill no | phone | name> | bill <id> | item <id>
return     return | qty <n> | refund cash|online | dest stock|vendor | submit
replace    replace [warranty|dissatisfaction] | qty <n> | dest stock|vendor
           serial <new serial>                      (warranty)
           find <query> | pick <id> | drop          (dissatisfaction)
           discount <n>% | discount fixed <amt> | discount none
           settle cash | settle upi | settle split <cash> <upi> | submit
due        due | due cash <amt> | due upi <amt> | due split <cash> <upi> | submit
transfer   transfer <product id> | sources | from <branch id> [qty]
           transfer qty <n> | transfer note <text> | transfer send | transfer cancel
           sent | received | accept <id> | reject <id>
stock      racks | stock | allocate <productId-recordId> <rack id>
desk       back | cancel | show | help | quit";

/// A parsed console line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Login { username: String, password: String },
    Logout,
    Status,
    Search(String),
    Bill(i64),
    Item(i64),
    Return,
    Replace(Option<ReplacementType>),
    Quantity(i64),
    Refund(RefundMethod),
    Destination(StockDestination),
    Serial(String),
    Find(String),
    Pick(i64),
    Drop,
    Discount(Option<Discount>),
    Settle(SettlementMethod),
    Submit,
    Due(Option<DueTender>),
    TransferStart(i64),
    TransferQuantity(i64),
    TransferNote(String),
    TransferSend,
    TransferCancel,
    Sources,
    From { branch_id: i64, quantity: Option<i64> },
    Sent,
    Received,
    Respond { id: i64, action: TransferAction },
    Racks,
    Stock,
    Allocate { item: String, rack_id: i64 },
    Back,
    Cancel,
    Show,
    Help,
    Quit,
}

impl Command {
    /// Read-only fetches guarded by the sequencer. These run in the
    /// background so the cashier can keep typing; everything else runs
    /// in line order.
    pub fn is_lookup(&self) -> bool {
        matches!(
            self,
            Command::Search(_)
                | Command::Find(_)
                | Command::TransferStart(_)
                | Command::Sources
                | Command::Sent
                | Command::Received
                | Command::Stock
        )
    }
}

// =============================================================================
// Parsing
// =============================================================================

fn usage(line: &str) -> DeskError {
    DeskError::usage(format!("Usage: {line}"))
}

fn int(raw: Option<&str>, what: &str) -> DeskResult<i64> {
    raw.ok_or_else(|| usage(what))?
        .parse()
        .map_err(|_| usage(what))
}

fn discount(args: &[&str]) -> DeskResult<Option<Discount>> {
    const FORM: &str = "discount <n>% | discount pct <n> | discount fixed <amt> | discount none";
    match args {
        ["none"] | ["off"] => Ok(None),
        ["pct" | "percent", n] => Ok(Some(Discount::Percentage(
            DiscountRate::parse_percentage(n)?,
        ))),
        ["fixed", amt] => Ok(Some(Discount::Fixed(Money::parse_decimal(amt)?))),
        [n] if n.ends_with('%') => Ok(Some(Discount::Percentage(
            DiscountRate::parse_percentage(n.trim_end_matches('%'))?,
        ))),
        _ => Err(usage(FORM)),
    }
}

fn settlement(args: &[&str]) -> DeskResult<SettlementMethod> {
    const FORM: &str = "settle cash | settle upi | settle split <cash> <upi>";
    match args {
        ["cash"] => Ok(SettlementMethod::Cash),
        ["upi" | "online"] => Ok(SettlementMethod::Upi),
        ["split", cash, upi] => Ok(SettlementMethod::Split {
            cash: Money::parse_decimal(cash)?,
            upi: Money::parse_decimal(upi)?,
        }),
        _ => Err(usage(FORM)),
    }
}

fn due_tender(args: &[&str]) -> DeskResult<Option<DueTender>> {
    const FORM: &str = "due | due cash <amt> | due upi <amt> | due split <cash> <upi>";
    match args {
        [] => Ok(None),
        ["cash", amt] => Ok(Some(DueTender::Cash(Money::parse_decimal(amt)?))),
        ["upi" | "online", amt] => Ok(Some(DueTender::Upi(Money::parse_decimal(amt)?))),
        ["split", cash, upi] => Ok(Some(DueTender::Split {
            cash: Money::parse_decimal(cash)?,
            upi: Money::parse_decimal(upi)?,
        })),
        _ => Err(usage(FORM)),
    }
}

fn transfer_command(args: &[&str], rest: &str) -> DeskResult<Command> {
    const FORM: &str =
        "transfer <product id> | transfer qty <n> | transfer note <text> | transfer send | transfer cancel";
    match args {
        ["send"] => Ok(Command::TransferSend),
        ["cancel"] => Ok(Command::TransferCancel),
        ["qty", n] => Ok(Command::TransferQuantity(int(Some(*n), "transfer qty <n>")?)),
        ["note", ..] => Ok(Command::TransferNote(
            rest.trim_start().trim_start_matches("note").trim().to_string(),
        )),
        [pid] => Ok(Command::TransferStart(int(Some(*pid), FORM)?)),
        _ => Err(usage(FORM)),
    }
}

/// Parses one input line. Blank lines parse to [`Command::Show`].
pub fn parse(line: &str) -> DeskResult<Command> {
    let line = line.trim();
    let (verb, rest) = line.split_once(char::is_whitespace).unwrap_or((line, ""));
    let args: Vec<&str> = rest.split_whitespace().collect();
    let first = args.first().copied();

    let command = match verb.to_lowercase().as_str() {
        "" | "show" => Command::Show,
        "help" | "?" => Command::Help,
        "quit" | "exit" => Command::Quit,
        "login" => match args.as_slice() {
            [user, _, ..] => Command::Login {
                username: user.to_string(),
                password: rest.trim_start()[user.len()..].trim().to_string(),
            },
            _ => return Err(usage("login <user> <password>")),
        },
        "logout" => Command::Logout,
        "status" => Command::Status,
        "search" => Command::Search(rest.trim().to_string()),
        "bill" => Command::Bill(int(first, "bill <id>")?),
        "item" => Command::Item(int(first, "item <id>")?),
        "return" => Command::Return,
        "replace" => Command::Replace(first.map(str::parse::<ReplacementType>).transpose()?),
        "qty" => Command::Quantity(int(first, "qty <n>")?),
        "refund" => Command::Refund(
            first
                .ok_or_else(|| usage("refund cash|online"))?
                .parse::<RefundMethod>()?,
        ),
        "dest" => Command::Destination(
            first
                .ok_or_else(|| usage("dest stock|vendor"))?
                .parse::<StockDestination>()?,
        ),
        "serial" => Command::Serial(rest.trim().to_string()),
        "find" => Command::Find(rest.trim().to_string()),
        "pick" => Command::Pick(int(first, "pick <product id>")?),
        "drop" => Command::Drop,
        "discount" => Command::Discount(discount(&args)?),
        "settle" => Command::Settle(settlement(&args)?),
        "submit" => Command::Submit,
        "due" => Command::Due(due_tender(&args)?),
        "transfer" => transfer_command(&args, rest)?,
        "sources" => Command::Sources,
        "from" => Command::From {
            branch_id: int(first, "from <branch id> [qty]")?,
            quantity: args
                .get(1)
                .map(|q| int(Some(*q), "from <branch id> [qty]"))
                .transpose()?,
        },
        "sent" => Command::Sent,
        "received" => Command::Received,
        "accept" | "reject" => Command::Respond {
            id: int(first, "accept|reject <transfer id>")?,
            action: verb.parse::<TransferAction>()?,
        },
        "racks" => Command::Racks,
        "stock" => Command::Stock,
        "allocate" => match args.as_slice() {
            [item, rack] => Command::Allocate {
                item: item.to_string(),
                rack_id: int(Some(*rack), "allocate <productId-recordId> <rack id>")?,
            },
            _ => return Err(usage("allocate <productId-recordId> <rack id>")),
        },
        "back" => Command::Back,
        "cancel" => Command::Cancel,
        other => {
            return Err(DeskError::usage(format!(
                "Unknown command `{other}`. Type `help` for the list."
            )))
        }
    };
    Ok(command)
}

// =============================================================================
// Dispatch
// =============================================================================

/// Runs a parsed command and returns the text to print.
pub async fn dispatch(app: &AppState, command: Command) -> DeskResult<String> {
    match command {
        Command::Login { username, password } => auth::login(app, &username, &password).await,
        Command::Logout => auth::logout(app).await,
        Command::Status => auth::status(app).await,
        Command::Search(query) => bill::search(app, &query).await,
        Command::Bill(id) => bill::choose(app, id),
        Command::Item(id) => bill::select_item(app, id),
        Command::Return => returns::begin(app),
        Command::Replace(kind) => replace::begin(app, kind),
        Command::Quantity(qty) => commands::set_quantity(app, qty),
        Command::Refund(method) => returns::set_refund_method(app, method),
        Command::Destination(dest) => commands::set_destination(app, dest),
        Command::Serial(serial) => replace::set_serial(app, &serial),
        Command::Find(query) => replace::find(app, &query).await,
        Command::Pick(id) => replace::pick(app, id),
        Command::Drop => replace::drop_product(app),
        Command::Discount(d) => replace::set_discount(app, d),
        Command::Settle(method) => replace::settle(app, method),
        Command::Submit => commands::submit(app).await,
        Command::Due(None) => due::begin(app),
        Command::Due(Some(tender)) => due::set_tender(app, tender),
        Command::TransferStart(pid) => transfer::start(app, pid).await,
        Command::TransferQuantity(qty) => transfer::set_quantity(app, qty),
        Command::TransferNote(notes) => transfer::set_notes(app, &notes),
        Command::TransferSend => transfer::send(app).await,
        Command::TransferCancel => transfer::discard(app),
        Command::Sources => transfer::refresh_sources(app).await,
        Command::From {
            branch_id,
            quantity,
        } => transfer::choose_source(app, branch_id, quantity),
        Command::Sent => transfer::sent(app).await,
        Command::Received => transfer::received(app).await,
        Command::Respond { id, action } => transfer::respond(app, id, action).await,
        Command::Racks => stock::racks(app).await,
        Command::Stock => stock::stock(app).await,
        Command::Allocate { item, rack_id } => stock::allocate(app, &item, rack_id).await,
        Command::Back => commands::back(app),
        Command::Cancel => commands::cancel(app),
        Command::Show => commands::show(app),
        Command::Help => Ok(HELP.to_string()),
        Command::Quit => Ok(String::new()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;

    #[test]
    fn test_parse_bill_workflow() {
        assert_eq!(
            parse("search  Asha K ").unwrap(),
            Command::Search("Asha K".into())
        );
        assert_eq!(parse("bill 7").unwrap(), Command::Bill(7));
        assert_eq!(parse("ITEM 3").unwrap(), Command::Item(3));
        assert_eq!(parse("").unwrap(), Command::Show);
        assert_eq!(
            parse("refund upi").unwrap(),
            Command::Refund(RefundMethod::Online)
        );
        assert_eq!(
            parse("dest vendor").unwrap(),
            Command::Destination(StockDestination::Vendor)
        );
    }

    #[test]
    fn test_parse_login_keeps_password_spaces() {
        assert_eq!(
            parse("login asha open sesame").unwrap(),
            Command::Login {
                username: "asha".into(),
                password: "open sesame".into()
            }
        );
        assert_eq!(parse("login asha").unwrap_err().code, ErrorCode::Usage);
    }

    #[test]
    fn test_parse_replacement_verbs() {
        assert_eq!(parse("replace").unwrap(), Command::Replace(None));
        assert_eq!(
            parse("replace warranty").unwrap(),
            Command::Replace(Some(ReplacementType::Warranty))
        );
        assert_eq!(
            parse("replace exchange").unwrap_err().code,
            ErrorCode::ValidationError
        );
        assert_eq!(
            parse("discount 12.5%").unwrap(),
            Command::Discount(Some(Discount::Percentage(DiscountRate::from_bps(1250))))
        );
        assert_eq!(
            parse("discount fixed 100").unwrap(),
            Command::Discount(Some(Discount::Fixed(Money::from_rupees(100))))
        );
        assert_eq!(parse("discount none").unwrap(), Command::Discount(None));
        assert_eq!(
            parse("discount 120%").unwrap_err().code,
            ErrorCode::ValidationError
        );
        assert_eq!(
            parse("discount 12.555%").unwrap_err().code,
            ErrorCode::ValidationError
        );
        assert_eq!(
            parse("settle split 100 50.50").unwrap(),
            Command::Settle(SettlementMethod::Split {
                cash: Money::from_rupees(100),
                upi: Money::from_paise(5050),
            })
        );
        assert_eq!(parse("settle card").unwrap_err().code, ErrorCode::Usage);
    }

    #[test]
    fn test_parse_due_and_transfers() {
        assert_eq!(parse("due").unwrap(), Command::Due(None));
        assert_eq!(
            parse("due upi 300").unwrap(),
            Command::Due(Some(DueTender::Upi(Money::from_rupees(300))))
        );
        assert_eq!(parse("transfer 42").unwrap(), Command::TransferStart(42));
        assert_eq!(parse("transfer send").unwrap(), Command::TransferSend);
        assert_eq!(
            parse("transfer note  urgent, by Friday").unwrap(),
            Command::TransferNote("urgent, by Friday".into())
        );
        assert_eq!(
            parse("from 3 2").unwrap(),
            Command::From {
                branch_id: 3,
                quantity: Some(2)
            }
        );
        assert_eq!(
            parse("reject 9").unwrap(),
            Command::Respond {
                id: 9,
                action: TransferAction::Reject
            }
        );
    }

    #[test]
    fn test_parse_allocate_and_errors() {
        assert_eq!(
            parse("allocate 12-4 3").unwrap(),
            Command::Allocate {
                item: "12-4".into(),
                rack_id: 3
            }
        );
        assert_eq!(parse("allocate 12-4").unwrap_err().code, ErrorCode::Usage);
        assert_eq!(parse("bill seven").unwrap_err().code, ErrorCode::Usage);
        assert_eq!(parse("frobnicate").unwrap_err().code, ErrorCode::Usage);
    }

    #[test]
    fn test_only_fetches_run_in_background() {
        assert!(parse("search INV-7").unwrap().is_lookup());
        assert!(parse("find fan").unwrap().is_lookup());
        assert!(parse("stock").unwrap().is_lookup());
        assert!(!parse("submit").unwrap().is_lookup());
        assert!(!parse("transfer send").unwrap().is_lookup());
        assert!(!parse("accept 9").unwrap().is_lookup());
        assert!(!parse("cancel").unwrap().is_lookup());
    }

    #[tokio::test]
    async fn test_help_needs_no_backend() {
        let app = crate::commands::tests::offline_app();
        let text = dispatch(&app, Command::Help).await.unwrap();
        assert!(text.contains("allocate"));
    }
}
