//! Note Drafter - AI-assisted article drafting service for note.com
//!
//! Entry point for the service. Handles CLI argument parsing,
//! logging initialization, and server bootstrap.

use anyhow::Context;
use note_drafter::config::Config;
use note_drafter::{app, utils};
use std::path::PathBuf;

/// Application name for logging
const APP_NAME: &str = "note-drafter";

/// Options taken from the command line
#[derive(Debug, Default)]
struct Flags {
    config_path: Option<PathBuf>,
    addr: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    init_logging();

    log::info!("Starting Note Drafter");

    // Parse command line arguments
    let flags = parse_args();

    let config = load_config(&flags)?;
    config.validate().context("Invalid configuration")?;

    let state = app::AppState::from_config(&config).context("Could not create backend clients")?;
    let router = app::router(state);

    let listener = tokio::net::TcpListener::bind(&config.server.addr)
        .await
        .with_context(|| format!("Could not bind to {}", config.server.addr))?;
    log::info!("Listening on http://{}", config.server.addr);

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    log::info!("Note Drafter stopped");
    Ok(())
}

/// Initialize the logging system
fn init_logging() {
    // Set default log level if not specified
    if std::env::var("RUST_LOG").is_err() {
        std::env::set_var("RUST_LOG", "info,note_drafter=debug");
    }

    env_logger::Builder::from_default_env()
        .format_timestamp_millis()
        .init();
}

/// Load the configuration file, then apply environment and CLI overrides
fn load_config(flags: &Flags) -> anyhow::Result<Config> {
    let mut config = match &flags.config_path {
        Some(path) => {
            let path = utils::path::expand_tilde(path);
            let mut config = Config::load_from(&path)
                .with_context(|| format!("Could not load {}", path.display()))?;
            config.apply_env_overrides();
            config
        }
        None => Config::load().context("Could not load configuration")?,
    };

    if let Some(addr) = &flags.addr {
        config.server.addr = addr.clone();
    }

    Ok(config)
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        log::error!("Could not listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    log::info!("Shutdown requested");
}

/// Parse command line arguments
fn parse_args() -> Flags {
    let args: Vec<String> = std::env::args().collect();
    let mut flags = Flags::default();

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "-h" | "--help" => {
                print_help();
                std::process::exit(0);
            }
            "-v" | "--version" => {
                print_version();
                std::process::exit(0);
            }
            "-c" | "--config" => {
                if i + 1 < args.len() {
                    flags.config_path = Some(PathBuf::from(&args[i + 1]));
                    i += 1;
                } else {
                    eprintln!("Error: --config requires a path argument");
                    std::process::exit(1);
                }
            }
            "-a" | "--addr" => {
                if i + 1 < args.len() {
                    flags.addr = Some(args[i + 1].clone());
                    i += 1;
                } else {
                    eprintln!("Error: --addr requires a host:port argument");
                    std::process::exit(1);
                }
            }
            arg => {
                eprintln!("Unknown option: {}", arg);
                eprintln!("Use --help for usage information");
                std::process::exit(1);
            }
        }
        i += 1;
    }

    flags
}

/// Print help message
fn print_help() {
    println!(
        r#"Note Drafter - AI-assisted article drafting for note.com

USAGE:
    note-drafter [OPTIONS]

OPTIONS:
    -h, --help              Show this help message
    -v, --version           Show version information
    -c, --config <PATH>     Read configuration from PATH
    -a, --addr <HOST:PORT>  Listen address (default 127.0.0.1:3000)

ENVIRONMENT:
    GEMINI_API_KEY          Gemini API key
    GEMINI_MODEL            Gemini model (default gemini-2.0-pro)
    NOTE_EMAIL              note account email
    NOTE_PASSWORD           note account password
    NOTE_DRAFTER_ADDR       Listen address
    RUST_LOG                Log filter (default info,note_drafter=debug)

ENDPOINTS:
    POST /api/generate      Generate an article from a blog idea
    POST /api/preview       Normalize an article and render preview HTML
    POST /api/export        Render an article as a standalone HTML page
    POST /api/publish       Save an article as a note draft
    GET  /health            Service status
"#
    );
}

/// Print version information
fn print_version() {
    println!("{} {}", APP_NAME, env!("CARGO_PKG_VERSION"));
}
