//! # Tillpoint Desk Library
//!
//! The terminal front desk for returns, replacements, due collection,
//! inter-branch transfers and rack allocation.
//!
//! ## Module Organization
//! ```text
//! tillpoint_desk/
//! ├── lib.rs          ◄─── You are here (startup & input loop)
//! ├── console.rs      ◄─── Line ──► Command parsing and dispatch
//! ├── view.rs         ◄─── Plain-text rendering of each step
//! ├── state/
//! │   ├── mod.rs      ◄─── AppState
//! │   ├── desk.rs     ◄─── Bill workflow (Desk state machine)
//! │   ├── transfer.rs ◄─── Transfer draft, sent/received lists
//! │   └── stock.rs    ◄─── Racks and allocation rows
//! ├── commands/
//! │   ├── mod.rs      ◄─── Shared verbs (qty, dest, submit, back, cancel)
//! │   ├── auth.rs     ◄─── login / logout / status
//! │   ├── bill.rs     ◄─── search / bill / item
//! │   ├── returns.rs  ◄─── return flow
//! │   ├── replace.rs  ◄─── warranty and dissatisfaction replacements
//! │   ├── due.rs      ◄─── pay-later due collection
//! │   ├── transfer.rs ◄─── inter-branch transfers
//! │   └── stock.rs    ◄─── racks and allocation
//! └── error.rs        ◄─── DeskError shown to the cashier
//! ```

pub mod commands;
pub mod console;
pub mod error;
pub mod state;
pub mod view;

use std::path::PathBuf;
use std::sync::Arc;

use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::task::{JoinError, JoinSet};
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use tillpoint_client::{
    ClientConfig, Debouncer, FileSessionStore, PosClient, SessionContext, SessionStore,
};

use console::Command;
use error::DeskResult;
use state::AppState;

/// Runs the desk until `quit` or end of input.
///
/// ## Startup Sequence
/// ```text
/// ┌─────────────────────────────────────────────────────────────────────────┐
/// │                       Desk Startup                                      │
/// │                                                                         │
/// │  1. Initialize Logging ───────────────────────────────────────────────► │
/// │     • tracing-subscriber with env filter, written to stderr             │
/// │     • Default: info, tillpoint=debug; RUST_LOG overrides                │
/// │                                                                         │
/// │  2. Load Configuration ───────────────────────────────────────────────► │
/// │     • defaults → desk.toml → TILLPOINT_* environment                    │
/// │                                                                         │
/// │  3. Restore Session ──────────────────────────────────────────────────► │
/// │     • session.json in the data dir (tokens + branch)                    │
/// │     • unreadable location: in-memory session, login every run          │
/// │                                                                         │
/// │  4. Read Commands ────────────────────────────────────────────────────► │
/// │     • one line at a time from stdin, output to stdout                   │
/// │     • lookups (search, find, stock...) run in the background; a newer   │
/// │       one of the same kind supersedes the older                         │
/// │     • everything else runs in line order                                │
/// └─────────────────────────────────────────────────────────────────────────┘
/// ```
pub async fn run(config_path: Option<PathBuf>) -> Result<(), Box<dyn std::error::Error>> {
    init_tracing();

    let config = ClientConfig::load(config_path)?;
    let session = Arc::new(open_session(&config));
    let client = PosClient::new(&config, session)?;
    let app = AppState::new(client, Debouncer::new(config.debounce()));
    info!(debounce = ?config.debounce(), "Tillpoint desk started");

    println!("{}", commands::auth::status(&app).await?);
    println!("Type `help` for commands.");

    let app = Arc::new(app);
    let mut lookups: JoinSet<DeskResult<String>> = JoinSet::new();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        tokio::select! {
            Some(done) = lookups.join_next(), if !lookups.is_empty() => print_outcome(done),
            line = lines.next_line() => {
                let Some(line) = line? else { break };
                let command = match console::parse(&line) {
                    Ok(command) => command,
                    Err(e) => {
                        println!("{e}");
                        continue;
                    }
                };
                if command == Command::Quit {
                    break;
                }
                if command.is_lookup() {
                    let app = Arc::clone(&app);
                    lookups.spawn(async move { console::dispatch(&app, command).await });
                } else {
                    print_outcome(Ok(console::dispatch(&app, command).await));
                }
            }
        }
    }
    while let Some(done) = lookups.join_next().await {
        print_outcome(done);
    }

    info!("Tillpoint desk stopped");
    Ok(())
}

fn print_outcome(outcome: Result<DeskResult<String>, JoinError>) {
    match outcome {
        Ok(Ok(text)) => println!("{text}"),
        Ok(Err(e)) => println!("{e}"),
        Err(e) => error!(error = %e, "Lookup task failed"),
    }
}

fn open_session(config: &ClientConfig) -> SessionContext {
    let Some(path) = config.session_path() else {
        warn!("No data directory available, session kept in memory");
        return SessionContext::in_memory();
    };
    let store: Arc<dyn SessionStore> = Arc::new(FileSessionStore::new(path));
    SessionContext::load(store).unwrap_or_else(|e| {
        warn!(error = %e, "Could not read saved session, starting logged out");
        SessionContext::in_memory()
    })
}

/// Initializes the tracing subscriber for structured logging.
///
/// ## Log Levels
/// - `RUST_LOG=debug` - Show debug messages
/// - `RUST_LOG=tillpoint_client=trace` - Trace the HTTP layer only
/// - Default: info, with debug for the tillpoint crates
///
/// Logs go to stderr so they never interleave with desk output.
fn init_tracing() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info,tillpoint=debug"));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}
