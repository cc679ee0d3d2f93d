//! Shared helpers for database-backed integration tests.
//!
//! Each test creates its own PostgreSQL database on the server named by
//! `TEST_DATABASE_URL` (default `postgresql://localhost/pdtlog_test`),
//! runs the embedded migrations on it, and drops it again when the
//! `TestDatabase` handle goes out of scope. Tests are serialized with
//! `serial_test` so database creation never races.

use anyhow::{Context, Result};
use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, Pool};
use diesel_migrations::{EmbeddedMigrations, MigrationHarness, embed_migrations};

const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations/");

type PgPool = Pool<ConnectionManager<PgConnection>>;

pub struct TestDatabase {
    db_name: String,
    pool: PgPool,
    admin_url: String,
}

impl TestDatabase {
    pub async fn new() -> Result<Self> {
        dotenvy::dotenv().ok();

        let base_url = std::env::var("TEST_DATABASE_URL")
            .unwrap_or_else(|_| "postgresql://localhost/pdtlog_test".to_string());

        // Admin operations go through the stock 'postgres' database
        let admin_url = base_url.replace("/pdtlog_test", "/postgres");

        let suffix: u64 = {
            use rand::RngCore;
            rand::rng().next_u64()
        };
        let db_name = format!("pdtlog_test_{suffix:016x}");
        let db_url = base_url.replace("/pdtlog_test", &format!("/{db_name}"));

        {
            let admin_url = admin_url.clone();
            let db_name = db_name.clone();
            let db_url = db_url.clone();

            tokio::task::spawn_blocking(move || {
                let mut admin_conn = PgConnection::establish(&admin_url)
                    .context("Failed to connect to PostgreSQL. Is it running?")?;
                diesel::sql_query(format!("CREATE DATABASE {db_name}"))
                    .execute(&mut admin_conn)
                    .with_context(|| format!("Failed to create test database {db_name}"))?;

                let mut conn = PgConnection::establish(&db_url)
                    .with_context(|| format!("Failed to connect to {db_name}"))?;
                conn.run_pending_migrations(MIGRATIONS)
                    .map_err(|e| anyhow::anyhow!("Failed to run migrations: {e}"))?;

                Ok::<(), anyhow::Error>(())
            })
            .await??;
        }

        let manager = ConnectionManager::<PgConnection>::new(&db_url);
        let pool = Pool::builder()
            .max_size(5)
            .build(manager)
            .with_context(|| format!("Failed to build connection pool for {db_name}"))?;

        Ok(TestDatabase {
            db_name,
            pool,
            admin_url,
        })
    }

    pub fn pool(&self) -> PgPool {
        self.pool.clone()
    }
}

impl Drop for TestDatabase {
    fn drop(&mut self) {
        // Best-effort cleanup; FORCE kicks out any pooled connections
        if let Ok(mut admin_conn) = PgConnection::establish(&self.admin_url) {
            let dropped =
                diesel::sql_query(format!("DROP DATABASE {} WITH (FORCE)", self.db_name))
                    .execute(&mut admin_conn);
            if let Err(e) = dropped {
                eprintln!("Failed to drop test database {}: {}", self.db_name, e);
            }
        }
    }
}
