//! `gemchat-models`: diagnostic listing of the Gemini models available to
//! the configured API key.
//!
//! Standalone: shares config and the provider with the chat binary but is
//! not part of its call graph.
//!
//! # Usage
//!
//! ```text
//! gemchat-models [--config <path>]
//!
//! Flags:
//!   --config, -c <path>   config file (default: config/default.toml)
//!   --help,   -h          print this help
//! ```
//!
//! Prints whether the API key was found, the model count, and one line per
//! model: its identifier and supported generation methods.

use std::path::Path;
use std::process;

use gemchat::config;
use gemchat::error::AppError;
use gemchat::llm::ProviderError;
use gemchat::llm::providers::gemini::GeminiProvider;

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

    println!("API key found: {}", config.api_key.is_some());
    let key = config
        .api_key
        .ok_or(ProviderError::MissingApiKey("GOOGLE_API_KEY"))?;

    let g = &config.llm.gemini;
    let provider =
        GeminiProvider::new(g.api_base_url.clone(), g.model.clone(), g.timeout_seconds, key)?;

    let models = provider.list_models().await?;

    println!("Number of models found: {}", models.len());
    for model in &models {
        println!("{} {:?}", model.name, model.supported_generation_methods);
    }

    Ok(())
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
    eprintln!("usage: gemchat-models [--config <path>]");
    eprintln!();
    eprintln!("flags:");
    eprintln!("  --config, -c <path>   config file (default: config/default.toml)");
    eprintln!("  --help,   -h          print this help");
    eprintln!();
    eprintln!("environment:");
    eprintln!("  GOOGLE_API_KEY        required (.env in the working directory is read)");
}
