//! Path-prefix HTTP gateway.
//!
//! # Architecture Overview
//!
//! ```text
//!                    ┌──────────────────────────────────────────────┐
//!                    │                   GATEWAY                     │
//!   Client Request   │  ┌────────┐   ┌──────────┐   ┌────────────┐  │
//!   ─────────────────┼─▶│  http  │──▶│ routing  │──▶│ forwarder  │──┼──▶ Upstream
//!                    │  │ server │   │  table   │   │ (deadline) │  │    (account,
//!   Client Response  │  └────────┘   └──────────┘   └────────────┘  │     post, ...)
//!   ◀────────────────┼──────────────── relayed response ◀───────────┼───
//!                    │                                              │
//!                    │  config · observability · lifecycle          │
//!                    └──────────────────────────────────────────────┘
//! ```

use std::path::PathBuf;

use clap::Parser;

use path_gateway::lifecycle::startup;

#[derive(Parser)]
#[command(name = "path-gateway")]
#[command(about = "Path-prefix HTTP gateway", long_about = None)]
struct Cli {
    /// Path to the TOML configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override `listener.bind_address`.
    #[arg(short, long)]
    bind: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let config = startup::load(cli.config.as_deref(), cli.bind)?;
    startup::run(config).await?;
    Ok(())
}
