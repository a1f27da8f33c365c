//! Slider widget served over WebSocket.
//!
//! Every connection gets its own integer slider. The frontend speaks raw
//! kernel frames as JSON text:
//!
//!   {"msg_type": "comm_msg", "comm_id": "<hex>", "data": {"method": "update", "state": {"value": 42}}}
//!
//! Run:
//!   cargo run -p widgetsync-demo-slider -- --port 8001 --config slider.toml

mod config;
mod server;
mod slider;

use clap::Parser;
use std::net::SocketAddr;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(about = "Serve a synchronized slider widget over WebSocket")]
struct Args {
    /// Port to listen on.
    #[arg(long, env = "SLIDER_PORT", default_value_t = 8001)]
    port: u16,

    /// TOML file with the slider's initial state.
    #[arg(long, env = "SLIDER_CONFIG")]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env().add_directive("widgetsync_demo_slider=info".parse()?),
        )
        .init();

    let args = Args::parse();
    let config = config::load(args.config.as_deref())?;
    let addr: SocketAddr = ([127, 0, 0, 1], args.port).into();

    tracing::info!("Starting slider '{}' on {}", config.description, addr);

    server::run(addr, config).await
}
