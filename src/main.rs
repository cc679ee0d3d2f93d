use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use diesel::PgConnection;
use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, Pool};
use diesel_migrations::{EmbeddedMigrations, MigrationHarness, embed_migrations};
use tracing::info;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use pdtlog::commands::{handle_create_admin, handle_run};
use pdtlog::web::PgPool;

const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

#[derive(Parser)]
#[command(name = "pdtlog", about = "PDT logbook service", version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the API server
    Run {
        /// Interface to bind to
        #[arg(long, default_value = "0.0.0.0")]
        interface: String,
        /// Port to listen on
        #[arg(long, default_value_t = 8080)]
        port: u16,
    },
    /// Apply pending database migrations and exit
    Migrate,
    /// Create the initial admin account from ADMIN_* environment variables
    CreateAdmin,
}

fn build_pool(database_url: &str) -> Result<PgPool> {
    let manager = ConnectionManager::<PgConnection>::new(database_url);
    Pool::builder()
        .build(manager)
        .context("Failed to create database connection pool")
}

fn run_migrations(database_url: &str) -> Result<()> {
    let mut conn = PgConnection::establish(database_url)
        .context("Failed to connect to database for migrations")?;
    let applied = conn
        .run_pending_migrations(MIGRATIONS)
        .map_err(|e| anyhow::anyhow!("Failed to run migrations: {}", e))?;
    if applied.is_empty() {
        info!("Database schema is up to date");
    } else {
        info!("Applied {} migration(s)", applied.len());
    }
    Ok(())
}

fn init_sentry() -> Option<sentry::ClientInitGuard> {
    let dsn = std::env::var("SENTRY_DSN").ok()?;
    Some(sentry::init((
        dsn,
        sentry::ClientOptions {
            release: sentry::release_name!(),
            ..Default::default()
        },
    )))
}

fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer())
        .with(sentry_tracing::layer())
        .init();

    // Keep the guard alive for the lifetime of the process
    let _sentry_guard = init_sentry();

    let cli = Cli::parse();

    let database_url =
        std::env::var("DATABASE_URL").context("DATABASE_URL must be set in the environment")?;

    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?
        .block_on(async {
            match cli.command {
                Commands::Run { interface, port } => {
                    run_migrations(&database_url)?;
                    let pool = build_pool(&database_url)?;
                    handle_run(pool, interface, port).await
                }
                Commands::Migrate => run_migrations(&database_url),
                Commands::CreateAdmin => {
                    run_migrations(&database_url)?;
                    let pool = build_pool(&database_url)?;
                    handle_create_admin(pool).await
                }
            }
        })
}
