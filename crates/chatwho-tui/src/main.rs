//! chatwho TUI entry point.

use std::{fs::File, path::PathBuf, sync::Mutex, time::Duration};

use chatwho_app::{App, RoomCode, Runtime, RuntimeConfig, SystemEnv, pick_name};
use chatwho_core::{OrphanUpdatePolicy, ReconcilerConfig};
use chatwho_tui::{ChannelTarget, TerminalDriver};
use clap::Parser;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// chatwho terminal client
#[derive(Parser, Debug)]
#[command(name = "chatwho-tui")]
#[command(about = "Terminal client for chatwho rooms")]
#[command(version)]
struct Args {
    /// Room server base URL (e.g. `https://chat.example.dev`)
    ///
    /// If not provided, runs against an in-process room whose assistant
    /// streams every message back.
    #[arg(short, long)]
    server: Option<String>,

    /// Room code to join. A random one is generated if omitted.
    #[arg(short, long)]
    room: Option<String>,

    /// Display name. A random one is picked if omitted.
    #[arg(short, long)]
    name: Option<String>,

    /// Party (room namespace) on the server.
    #[arg(long, default_value = "chat")]
    party: String,

    /// Hold up to this many updates that arrive before their message.
    ///
    /// By default such updates are dropped.
    #[arg(long)]
    buffer_updates: Option<usize>,

    /// Write logs to this file. The terminal is in raw mode, so logging is
    /// off unless a file is given.
    #[arg(long)]
    log_file: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info")]
    log_level: String,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    if let Some(path) = &args.log_file {
        let file = File::create(path)?;
        let filter =
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&args.log_level));

        tracing_subscriber::registry()
            .with(fmt::layer().with_writer(Mutex::new(file)).with_ansi(false))
            .with(filter)
            .init();
    }

    let env = SystemEnv::new();
    let room = match &args.room {
        Some(code) => RoomCode::parse(code)?,
        None => RoomCode::generate(&env),
    };
    let user = args.name.unwrap_or_else(|| pick_name(&env).to_string());

    let orphan_updates = args
        .buffer_updates
        .map_or(OrphanUpdatePolicy::Drop, |limit| OrphanUpdatePolicy::Buffer { limit });
    let config = ReconcilerConfig { orphan_updates, ..ReconcilerConfig::default() };

    let target = match args.server {
        Some(server) => ChannelTarget::Remote { server, party: args.party },
        None => ChannelTarget::InProcess { stream_delay: Duration::from_millis(60) },
    };

    tracing::info!(%room, %user, ?target, "starting chatwho-tui");

    let app = App::new(env, room, user, config);
    let driver = TerminalDriver::new(target)?;
    let app = Runtime::new(driver, app, RuntimeConfig::default()).run().await?;

    tracing::info!(
        room = %app.room(),
        messages = app.transcript().len(),
        stats = ?app.reconciler().stats(),
        "chatwho-tui exited"
    );

    Ok(())
}
