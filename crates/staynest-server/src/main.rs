//! # StayNest Server
//!
//! Main binary: runs the REST API, applies migrations, and promotes accounts
//! to admin from the command line.

use anyhow::Context;
use clap::{Parser, Subcommand};
use staynest_api::{build_router, mailer::Mailer, payments::StripeClient, AppState};
use staynest_common::config::AppConfig;
use staynest_db::{repository::users, storage::MediaStore, Database};
use std::{net::SocketAddr, time::Instant};

#[derive(Debug, Parser)]
#[command(name = "staynest", about = "Vacation-rental marketplace backend", version)]
struct Cli {
    /// Emit logs as JSON lines
    #[arg(long, global = true, env = "STAYNEST_LOG_JSON")]
    log_json: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Run the HTTP API (default)
    Serve {
        /// Skip database migrations on startup
        #[arg(long)]
        no_migrate: bool,
    },
    /// Apply pending database migrations and exit
    Migrate,
    /// Grant the admin role to an existing account
    PromoteAdmin {
        /// Email of the account to promote
        email: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Load configuration
    let config = staynest_common::config::init().context("Failed to load configuration")?;

    init_tracing(cli.log_json);

    match cli.command.unwrap_or(Command::Serve { no_migrate: false }) {
        Command::Serve { no_migrate } => serve(config, no_migrate).await,
        Command::Migrate => {
            let db = Database::connect(config).await?;
            db.migrate().await
        }
        Command::PromoteAdmin { email } => {
            let db = Database::connect(config).await?;
            match users::promote_by_email(&db.pool, &email).await? {
                Some(user) => {
                    tracing::info!(user_id = %user.id, email = %user.email, "Promoted to admin");
                    Ok(())
                }
                None => anyhow::bail!("No account with email {email}"),
            }
        }
    }
}

fn init_tracing(json: bool) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "staynest=debug,tower_http=debug".into());

    if json {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_target(true)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(true)
            .with_thread_ids(true)
            .init();
    }
}

async fn serve(config: &'static AppConfig, no_migrate: bool) -> anyhow::Result<()> {
    let started_at = Instant::now();
    tracing::info!("Starting StayNest v{}", env!("CARGO_PKG_VERSION"));

    let db = Database::connect(config).await?;
    if no_migrate {
        tracing::warn!("Skipping migrations (--no-migrate)");
    } else {
        db.migrate().await?;
    }

    // === Media storage (S3 / MinIO, or local disk) ===
    let storage = MediaStore::from_config(&config.storage);
    storage.prepare().await?;
    match storage.local_root() {
        Some(root) => tracing::info!(dir = %root.display(), "Media stored on local disk"),
        None => tracing::info!(bucket = %config.storage.bucket, "Object storage ready"),
    }

    // === Outbound services ===
    let mailer = Mailer::from_config(&config.mail)?;
    let stripe = StripeClient::from_config(&config.stripe)?;
    if stripe.is_none() {
        tracing::warn!("stripe.secret_key is empty; payment endpoints will answer 503");
    }

    let router = build_router(AppState {
        db,
        storage,
        mailer,
        stripe,
        started_at,
    });

    let addr = SocketAddr::new(
        config
            .server
            .host
            .parse()
            .with_context(|| format!("Invalid server.host '{}'", config.server.host))?,
        config.server.port,
    );
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("REST API listening on http://{addr}");

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Shut down cleanly");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {e}");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serve_is_the_default_command() {
        let cli = Cli::try_parse_from(["staynest"]).unwrap();
        assert!(cli.command.is_none());
        assert!(!cli.log_json);
    }

    #[test]
    fn parses_subcommands() {
        let cli = Cli::try_parse_from(["staynest", "--log-json", "serve", "--no-migrate"]).unwrap();
        assert!(cli.log_json);
        assert!(matches!(cli.command, Some(Command::Serve { no_migrate: true })));

        let cli = Cli::try_parse_from(["staynest", "promote-admin", "ada@example.com"]).unwrap();
        assert!(matches!(cli.command, Some(Command::PromoteAdmin { ref email }) if email == "ada@example.com"));
    }

    #[test]
    fn promote_requires_an_email() {
        assert!(Cli::try_parse_from(["staynest", "promote-admin"]).is_err());
    }
}
