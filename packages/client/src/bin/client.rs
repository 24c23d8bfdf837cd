//! Idobata chat client.
//!
//! Connects to a chat server over one WebSocket connection, registers a
//! display name, and then exchanges messages from stdin. Presence, private
//! targets, and read receipts are rendered inline; the session resumes
//! silently on restart as long as the resumption token is present.
//!
//! Run with:
//! ```not_rust
//! cargo run --bin idobata-client -- --name alice
//! cargo run --bin idobata-client -- -n bob -u ws://127.0.0.1:8080
//! ```

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;

use idobata_client::infrastructure::endpoint;
use idobata_client::runner::run_client;
use idobata_client::session::FileSessionStore;
use idobata_shared::logger::setup_logger;

#[derive(Parser, Debug)]
#[command(name = "idobata-client")]
#[command(about = "WebSocket chat client with presence, private messages, and read receipts", long_about = None)]
struct Args {
    /// Display name to register with (3-20 chars: letters, digits, '.', '_').
    /// Optional when a resumable session token exists.
    #[arg(short, long)]
    name: Option<String>,

    /// WebSocket server URL (overrides the computed endpoint)
    #[arg(short, long)]
    url: Option<String>,

    /// Host used to compute the endpoint when --url is not given; loopback
    /// hosts get the local development server, anything else production
    #[arg(long, default_value = "127.0.0.1")]
    host: String,

    /// Path of the session resumption token file
    #[arg(long)]
    session_file: Option<PathBuf>,
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    setup_logger(env!("CARGO_BIN_NAME"), "info");

    let args = Args::parse();

    let url = args.url.unwrap_or_else(|| endpoint::resolve(&args.host));
    let session_path = args.session_file.unwrap_or_else(FileSessionStore::default_path);
    let store = Arc::new(FileSessionStore::new(session_path));

    if let Err(e) = run_client(url, args.name, store).await {
        tracing::error!("Client error: {}", e);
        std::process::exit(1);
    }
}
