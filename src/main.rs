//! gemchat entry point.
//!
//! Startup sequence:
//!   1. Load .env (if present)
//!   2. Parse CLI args
//!   3. Load config (env overrides applied)
//!   4. Init logger
//!   5. Build the LLM provider (fatal here if GOOGLE_API_KEY is missing)
//!   6. Spawn Ctrl-C -> shutdown signal watcher
//!   7. Run the console until quit or shutdown

use std::path::Path;
use std::process;

use tokio_util::sync::CancellationToken;
use tracing::info;

use gemchat::chat::TurnController;
use gemchat::console;
use gemchat::error::AppError;
use gemchat::llm::providers;
use gemchat::session::Session;
use gemchat::{config, logger};

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        eprintln!("error: {e}");
        process::exit(1);
    }
}

async fn run() -> Result<(), AppError> {
    // Load .env if present; ignore errors (file is optional).
    let _ = dotenvy::dotenv();

    let args = parse_cli_args();

    let config = config::load(args.config_path.as_deref().map(Path::new))?;

    logger::init(&config.log_level)?;

    info!(
        provider = %config.llm.provider,
        model = %config.llm.gemini.model,
        log_level = %config.log_level,
        "config loaded"
    );

    // Fails before any interaction when the key is missing: startup
    // configuration errors are fatal, generation errors later are not.
    let provider = providers::build(&config.llm, config.api_key.clone())?;
    let controller = TurnController::new(provider);

    let session = Session::new();

    // Shared shutdown token: Ctrl-C cancels it, the console watches it.
    let shutdown = CancellationToken::new();
    {
        let shutdown = shutdown.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                shutdown.cancel();
            }
        });
    }

    console::run(session, &controller, shutdown).await
}

// ── CLI arg parsing ──────────────────────────────────────────────────────────

struct Args {
    config_path: Option<String>,
}

fn parse_cli_args() -> Args {
    let mut config_path = None;
    let mut iter = std::env::args().skip(1);

    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--config" | "-c" => {
                config_path = iter.next();
            }
            "--help" | "-h" => {
                print_help();
                process::exit(0);
            }
            other => {
                eprintln!("unknown argument: {other}");
                print_help();
                process::exit(2);
            }
        }
    }

    Args { config_path }
}

fn print_help() {
    eprintln!("usage: gemchat [--config <path>]");
    eprintln!();
    eprintln!("flags:");
    eprintln!("  --config, -c <path>   config file (default: config/default.toml)");
    eprintln!("  --help,   -h          print this help");
    eprintln!();
    eprintln!("environment:");
    eprintln!("  GOOGLE_API_KEY        required for the gemini provider (.env is read)");
    eprintln!("  GEMCHAT_LOG_LEVEL     override the configured log level");
}
