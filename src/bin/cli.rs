//! Share Resolver CLI
//!
//! Serve the HTTP surface or resolve a single link from the terminal.

use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use share_resolver::{
    config::load_config,
    error::Result,
    models::{ApiResponse, ContentItem},
    pipeline::Resolver,
    server,
    utils::http::ReqwestClient,
};

/// Short-video share link resolver
#[derive(Parser, Debug)]
#[command(
    name = "share-resolver",
    version,
    about = "Resolve Douyin / Kuaishou / Xiaohongshu / TikTok share links"
)]
struct Cli {
    /// Path to the configuration file
    #[arg(short, long, default_value = "data/config.toml")]
    config: PathBuf,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the HTTP server
    Serve {
        /// Listen host (overrides config)
        #[arg(long)]
        host: Option<String>,

        /// Listen port (overrides config)
        #[arg(long)]
        port: Option<u16>,
    },

    /// Resolve share text and print the JSON envelope
    Resolve {
        /// Share text or link
        text: String,
    },

    /// Validate the configuration file
    Validate,
}

/// Initialize logging based on verbosity flag.
fn init_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp_secs()
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let mut config = load_config(&cli.config)?;

    match cli.command {
        Command::Serve { host, port } => {
            if let Some(host) = host {
                config.server.host = host;
            }
            if let Some(port) = port {
                config.server.port = port;
            }
            server::serve(&config).await?;
        }

        Command::Resolve { text } => {
            let client = Arc::new(ReqwestClient::new(&config.http)?);
            let resolver = Resolver::from_config(&config, client);

            let (envelope, failed) = match resolver.resolve(&text).await {
                Ok(resolution) => {
                    log::info!(
                        "Resolved via {} after {} failed attempts",
                        resolution.strategy,
                        resolution.attempts.len()
                    );
                    (ApiResponse::ok(resolution.item), false)
                }
                Err(e) => {
                    log::error!("Resolve failed: {e}");
                    (ApiResponse::<ContentItem>::err(e.user_message()), true)
                }
            };

            println!("{}", serde_json::to_string_pretty(&envelope)?);
            if failed {
                std::process::exit(1);
            }
        }

        Command::Validate => {
            log::info!("Validating configuration...");
            // load_config already validated; report what is enabled.
            let resolver = &config.resolver;
            log::info!(
                "✓ Config OK: share_page={}, item_api={}, providers=[{}]",
                resolver.share_page,
                resolver.item_api,
                resolver
                    .providers
                    .iter()
                    .filter(|p| p.enabled)
                    .map(|p| p.kind.name())
                    .collect::<Vec<_>>()
                    .join(", ")
            );
            log::info!("Listen address: {}", config.server.addr());
        }
    }

    Ok(())
}
