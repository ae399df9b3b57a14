//! # bdi - Agent Program Runner
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────┐
//! │              apps/bdi (THE BINARY)           │
//! │                                              │
//! │  ┌─────────────┐      ┌──────────────────┐  │
//! │  │   CLI       │ ───▶ │ program + runner │  │
//! │  │  (clap)     │      │  (TOML, cycle)   │  │
//! │  └─────────────┘      └────────┬─────────┘  │
//! │                                ▼             │
//! │                        ┌──────────────┐      │
//! │                        │   bdi-core   │      │
//! │                        │ (THE LOGIC)  │      │
//! │                        └──────────────┘      │
//! └──────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```bash
//! bdi --program blocks.toml check
//! bdi --program blocks.toml run --cycles 20 --seed 7
//! BDI_LOG_FORMAT=json RUST_LOG=bdi_core=debug bdi run
//! ```

use bdi::cli;
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

// =============================================================================
// APPLICATION ENTRY POINT
// =============================================================================

fn main() {
    // BDI_LOG_FORMAT=json enables machine-parseable output.
    let log_format = std::env::var("BDI_LOG_FORMAT").unwrap_or_else(|_| "text".to_string());

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "bdi=info,bdi_core=info".into());

    match log_format.as_str() {
        "json" => {
            tracing_subscriber::registry()
                .with(filter)
                .with(tracing_subscriber::fmt::layer().json())
                .init();
        }
        _ => {
            tracing_subscriber::registry()
                .with(filter)
                .with(tracing_subscriber::fmt::layer())
                .init();
        }
    }

    let cli = cli::Cli::parse();

    if !cli.quiet && !cli.json_mode {
        print_banner();
    }

    if let Err(e) = cli::execute(cli) {
        tracing::error!("Error: {}", e);
        std::process::exit(1);
    }
}

/// Print the startup banner.
fn print_banner() {
    println!(
        r#"
  bdi v{}

  Beliefs • Desires • Intentions
"#,
        env!("CARGO_PKG_VERSION")
    );
}
