use anyhow::{Context, Result};
use tracing::info;

use crate::users_repo::UsersRepository;
use crate::web::PgPool;

/// Bootstrap the first admin account from environment variables. Safe to
/// run repeatedly; an existing account with the same email is left alone.
pub async fn handle_create_admin(pool: PgPool) -> Result<()> {
    let email = std::env::var("ADMIN_EMAIL").context("ADMIN_EMAIL must be set")?;
    let password = std::env::var("ADMIN_PASSWORD").context("ADMIN_PASSWORD must be set")?;
    let first_name = std::env::var("ADMIN_FIRST_NAME").unwrap_or_else(|_| "Admin".to_string());
    let last_name = std::env::var("ADMIN_LAST_NAME").unwrap_or_else(|_| "Admin".to_string());

    let users_repo = UsersRepository::new(pool);
    let created = users_repo
        .create_admin(first_name, last_name, email.clone(), &password)
        .await?;

    if created {
        info!("Created admin account {}", email);
    }

    Ok(())
}
