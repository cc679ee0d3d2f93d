use anyhow::Result;
use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use chrono::Utc;
use diesel::prelude::*;
use tracing::info;
use uuid::Uuid;

use crate::users::{User, UserModel};
use crate::validation::map_constraint_violation;
use crate::web::PgPool;

/// Hash a password with argon2 and a fresh salt.
pub fn hash_password(password: &str) -> Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| anyhow::anyhow!("Failed to hash password: {}", e))?;
    Ok(hash.to_string())
}

/// Verify a password against a stored argon2 hash.
pub fn verify_password(password: &str, hash: &str) -> Result<bool> {
    let parsed = PasswordHash::new(hash)
        .map_err(|e| anyhow::anyhow!("Invalid password hash: {}", e))?;
    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok())
}

#[derive(Clone)]
pub struct UsersRepository {
    pool: PgPool,
}

impl UsersRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Get user by ID
    pub async fn get_by_id(&self, user_id: Uuid) -> Result<Option<User>> {
        use crate::schema::users::dsl::*;

        let pool = self.pool.clone();

        let result = tokio::task::spawn_blocking(move || {
            let mut conn = pool.get()?;

            let user_model: Option<UserModel> = users
                .filter(id.eq(user_id))
                .select(UserModel::as_select())
                .first(&mut conn)
                .optional()?;

            Ok::<Option<UserModel>, anyhow::Error>(user_model)
        })
        .await??;

        Ok(result.map(|model| model.into()))
    }

    /// Get user by email (lowercased before lookup)
    pub async fn get_by_email(&self, email_param: &str) -> Result<Option<User>> {
        use crate::schema::users::dsl::*;

        let pool = self.pool.clone();
        let email_val = email_param.trim().to_lowercase();

        let result = tokio::task::spawn_blocking(move || {
            let mut conn = pool.get()?;

            let user_model: Option<UserModel> = users
                .filter(email.eq(&email_val))
                .select(UserModel::as_select())
                .first(&mut conn)
                .optional()?;

            Ok::<Option<UserModel>, anyhow::Error>(user_model)
        })
        .await??;

        Ok(result.map(|model| model.into()))
    }

    /// Verify credentials; returns the user on success, None otherwise.
    pub async fn authenticate(&self, email: &str, password: &str) -> Result<Option<User>> {
        let Some(user) = self.get_by_email(email).await? else {
            return Ok(None);
        };

        if verify_password(password, &user.password_hash)? {
            Ok(Some(user))
        } else {
            Ok(None)
        }
    }

    /// Set a new password for a user. Returns false when the user does not
    /// exist.
    pub async fn set_password(&self, user_id: Uuid, password: &str) -> Result<bool> {
        use crate::schema::users::dsl::*;

        let pool = self.pool.clone();
        let hash = hash_password(password)?;

        let rows_affected = tokio::task::spawn_blocking(move || {
            let mut conn = pool.get()?;

            let rows = diesel::update(users.filter(id.eq(user_id)))
                .set((password_hash.eq(&hash), updated_at.eq(Utc::now())))
                .execute(&mut conn)?;

            Ok::<usize, anyhow::Error>(rows)
        })
        .await??;

        Ok(rows_affected > 0)
    }

    /// Idempotent admin bootstrap for deployment time. Returns false when an
    /// account with this email already exists (nothing is changed then).
    pub async fn create_admin(
        &self,
        first_name: String,
        last_name: String,
        email_param: String,
        password: &str,
    ) -> Result<bool> {
        use crate::schema::users;

        if self.get_by_email(&email_param).await?.is_some() {
            info!("Admin account {} already exists, skipping", email_param);
            return Ok(false);
        }

        let user = User::new(
            first_name,
            last_name,
            email_param,
            hash_password(password)?,
            true,
        );

        let pool = self.pool.clone();
        let user_model: UserModel = user.into();

        tokio::task::spawn_blocking(move || {
            let mut conn = pool.get()?;

            diesel::insert_into(users::table)
                .values(&user_model)
                .execute(&mut conn)
                .map_err(|e| {
                    map_constraint_violation(
                        e,
                        &[("users_email_key", "email", "an account with this email already exists")],
                    )
                })?;

            Ok::<(), anyhow::Error>(())
        })
        .await??;

        Ok(true)
    }
}
