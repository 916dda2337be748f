use anyhow::Result;
use clap::{Parser, Subcommand};
use colored::Colorize;

use tweets2feed::config::Config;
use tweets2feed::render::feed::signed_feed_path;
use tweets2feed::signing::Signer;
use tweets2feed::twitter::username;

/// tweets2feed: signed Atom feeds for Twitter user timelines.
///
/// Serves `/{username}.atom?signature=...` feeds and a small form that
/// hands out the signed links.
#[derive(Parser)]
#[command(name = "tweets2feed", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the HTTP server
    #[cfg(feature = "web")]
    Serve {
        /// Port to listen on (default: 8080)
        #[arg(long, default_value = "8080")]
        port: u16,

        /// Address to bind (default: 0.0.0.0)
        #[arg(long, default_value = "0.0.0.0")]
        bind: String,
    },

    /// Print the signed feed path for a username
    Sign {
        /// The screen name to sign (e.g. alangbem)
        username: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (silently ignore if missing)
    let _ = dotenvy::dotenv();

    // Set up structured logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("tweets2feed=info")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        #[cfg(feature = "web")]
        Commands::Serve { port, bind } => {
            let config = Config::load()?;
            config.require_secret()?;
            config.require_twitter()?;

            if config.dev_mode {
                tracing::info!("Development mode: response caching disabled");
            }

            let client = tweets2feed::twitter::client::TwitterClient::new(&config)?;
            let state = tweets2feed::web::AppState::new(config, std::sync::Arc::new(client))?;
            tweets2feed::web::run_server(state, port, &bind).await?;
        }

        Commands::Sign { username: candidate } => {
            let config = Config::load()?;
            config.require_secret()?;

            let name = match username::validate(candidate.trim()) {
                Ok(name) => name,
                Err(reason) => anyhow::bail!("Invalid username {candidate:?}: {reason}"),
            };

            let signer = Signer::new(config.secret.clone());
            if !signer.is_enabled() {
                println!(
                    "{}",
                    "Warning: signing is disabled, the server will refuse this path.".yellow()
                );
            }
            println!("{}", signed_feed_path(&signer, name).bold());
        }
    }

    Ok(())
}
