use anyhow::Result;
use chrono::Utc;
use diesel::prelude::*;
use rand::distr::{Alphanumeric, SampleString};
use uuid::Uuid;

use crate::flight_operations::{FlightOperation, FlightOperationModel};
use crate::pilots::{Pilot, PilotInput, PilotModel};
use crate::users::{User, UserModel, is_valid_email};
use crate::users_repo::hash_password;
use crate::validation::{ValidationErrors, map_constraint_violation};
use crate::web::PgPool;

const UNIQUE_CONSTRAINTS: &[(&str, &str, &str)] = &[
    (
        "pilots_license_number_key",
        "license_number",
        "a pilot with this license number already exists",
    ),
    (
        "pilots_user_id_key",
        "user_id",
        "this account already has a pilot profile",
    ),
    (
        "users_email_key",
        "email",
        "an account with this email already exists",
    ),
];

/// Repository for pilot profiles and their linked user accounts
#[derive(Clone)]
pub struct PilotsRepository {
    pool: PgPool,
}

impl PilotsRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create a user account and its pilot profile as one atomic unit.
    ///
    /// The account gets a generated temporary password, returned to the
    /// caller exactly once so it can be handed to the pilot. Any failure
    /// rolls back both rows.
    pub async fn create_pilot(
        &self,
        first_name: String,
        last_name: String,
        email: String,
        is_admin: bool,
        input: PilotInput,
    ) -> Result<(Pilot, User, String)> {
        use crate::schema::{pilots, users};

        let temp_password = Alphanumeric.sample_string(&mut rand::rng(), 12);
        let user = User::new(
            first_name,
            last_name,
            email,
            hash_password(&temp_password)?,
            is_admin,
        );
        let pilot = Pilot::new(user.id, input);

        let mut errors = ValidationErrors::new();
        if !is_valid_email(&user.email) {
            errors.push("email", "must be a valid email address");
        }
        if let Err(pilot_errors) = pilot.validate() {
            errors.0.extend(pilot_errors.0);
        }
        errors.into_result()?;

        let pool = self.pool.clone();
        let user_model: UserModel = user.clone().into();
        let pilot_model: PilotModel = pilot.clone().into();

        tokio::task::spawn_blocking(move || {
            let mut conn = pool.get()?;

            conn.transaction(|conn| {
                diesel::insert_into(users::table)
                    .values(&user_model)
                    .execute(conn)?;

                diesel::insert_into(pilots::table)
                    .values(&pilot_model)
                    .execute(conn)?;

                Ok::<(), diesel::result::Error>(())
            })
            .map_err(|e| map_constraint_violation(e, UNIQUE_CONSTRAINTS))?;

            Ok::<(), anyhow::Error>(())
        })
        .await??;

        Ok((pilot, user, temp_password))
    }

    /// Get a pilot with their user account by pilot ID
    pub async fn get_by_id(&self, pilot_id: Uuid) -> Result<Option<(Pilot, User)>> {
        use crate::schema::{pilots, users};

        let pool = self.pool.clone();

        let result = tokio::task::spawn_blocking(move || {
            let mut conn = pool.get()?;

            let row: Option<(PilotModel, UserModel)> = pilots::table
                .inner_join(users::table)
                .filter(pilots::id.eq(pilot_id))
                .select((PilotModel::as_select(), UserModel::as_select()))
                .first(&mut conn)
                .optional()?;

            Ok::<Option<(PilotModel, UserModel)>, anyhow::Error>(row)
        })
        .await??;

        Ok(result.map(|(pilot, user)| (pilot.into(), user.into())))
    }

    /// Get the pilot profile belonging to a user account, if any
    pub async fn get_by_user_id(&self, user_id_val: Uuid) -> Result<Option<Pilot>> {
        use crate::schema::pilots::dsl::*;

        let pool = self.pool.clone();

        let result = tokio::task::spawn_blocking(move || {
            let mut conn = pool.get()?;

            let pilot_model: Option<PilotModel> = pilots
                .filter(user_id.eq(user_id_val))
                .select(PilotModel::as_select())
                .first(&mut conn)
                .optional()?;

            Ok::<Option<PilotModel>, anyhow::Error>(pilot_model)
        })
        .await??;

        Ok(result.map(|model| model.into()))
    }

    /// Get all active pilots with their user accounts, ordered by last name
    pub async fn get_active(&self) -> Result<Vec<(Pilot, User)>> {
        use crate::schema::{pilots, users};

        let pool = self.pool.clone();

        let results = tokio::task::spawn_blocking(move || {
            let mut conn = pool.get()?;

            let rows: Vec<(PilotModel, UserModel)> = pilots::table
                .inner_join(users::table)
                .filter(pilots::is_active.eq(true))
                .order((users::last_name.asc(), users::first_name.asc()))
                .select((PilotModel::as_select(), UserModel::as_select()))
                .load(&mut conn)?;

            Ok::<Vec<(PilotModel, UserModel)>, anyhow::Error>(rows)
        })
        .await??;

        Ok(results
            .into_iter()
            .map(|(pilot, user)| (pilot.into(), user.into()))
            .collect())
    }

    /// Get the count of active pilots
    pub async fn count_active(&self) -> Result<i64> {
        use crate::schema::pilots::dsl::*;

        let pool = self.pool.clone();

        let count_val = tokio::task::spawn_blocking(move || {
            let mut conn = pool.get()?;

            let count_val = pilots
                .filter(is_active.eq(true))
                .count()
                .get_result::<i64>(&mut conn)?;

            Ok::<i64, anyhow::Error>(count_val)
        })
        .await??;

        Ok(count_val)
    }

    /// Update a pilot's license fields and account fields as one atomic
    /// unit. Returns None when the pilot does not exist.
    pub async fn update_pilot(
        &self,
        pilot_id: Uuid,
        first_name: String,
        last_name: String,
        email: String,
        is_admin: bool,
        input: PilotInput,
    ) -> Result<Option<(Pilot, User)>> {
        use crate::schema::{pilots, users};

        let Some((mut pilot, mut user)) = self.get_by_id(pilot_id).await? else {
            return Ok(None);
        };

        pilot.apply(input);
        user.first_name = first_name.trim().to_string();
        user.last_name = last_name.trim().to_string();
        user.email = email.trim().to_lowercase();
        user.is_admin = is_admin;
        user.updated_at = Utc::now();

        let mut errors = ValidationErrors::new();
        if !is_valid_email(&user.email) {
            errors.push("email", "must be a valid email address");
        }
        if let Err(pilot_errors) = pilot.validate() {
            errors.0.extend(pilot_errors.0);
        }
        errors.into_result()?;

        let pool = self.pool.clone();
        let user_model: UserModel = user.clone().into();
        let pilot_model: PilotModel = pilot.clone().into();

        tokio::task::spawn_blocking(move || {
            let mut conn = pool.get()?;

            conn.transaction(|conn| {
                diesel::update(users::table.filter(users::id.eq(user_model.id)))
                    .set(&user_model)
                    .execute(conn)?;

                diesel::update(pilots::table.filter(pilots::id.eq(pilot_model.id)))
                    .set(&pilot_model)
                    .execute(conn)?;

                Ok::<(), diesel::result::Error>(())
            })
            .map_err(|e| map_constraint_violation(e, UNIQUE_CONSTRAINTS))?;

            Ok::<(), anyhow::Error>(())
        })
        .await??;

        Ok(Some((pilot, user)))
    }

    /// Soft-disable a pilot. The row survives so existing operations keep
    /// their reference; the pilot just disappears from entry forms.
    pub async fn soft_delete(&self, pilot_id: Uuid) -> Result<bool> {
        use crate::schema::pilots::dsl::*;

        let pool = self.pool.clone();

        let rows_affected = tokio::task::spawn_blocking(move || {
            let mut conn = pool.get()?;

            let rows = diesel::update(pilots.filter(id.eq(pilot_id)))
                .set((is_active.eq(false), updated_at.eq(Utc::now())))
                .execute(&mut conn)?;

            Ok::<usize, anyhow::Error>(rows)
        })
        .await??;

        Ok(rows_affected > 0)
    }

    /// Get all operations flown by a pilot, most recent page first
    pub async fn get_operations_for_pilot(&self, pilot_id_val: Uuid) -> Result<Vec<FlightOperation>> {
        use crate::schema::{flight_operations, pdt_pages};

        let pool = self.pool.clone();

        let results = tokio::task::spawn_blocking(move || {
            let mut conn = pool.get()?;

            let models: Vec<FlightOperationModel> = flight_operations::table
                .inner_join(pdt_pages::table)
                .filter(flight_operations::pilot_id.eq(pilot_id_val))
                .order((
                    pdt_pages::pdt_date.desc(),
                    flight_operations::departure_time.asc(),
                ))
                .select(FlightOperationModel::as_select())
                .load(&mut conn)?;

            Ok::<Vec<FlightOperationModel>, anyhow::Error>(models)
        })
        .await??;

        Ok(results.into_iter().map(|model| model.into()).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use diesel::PgConnection;
    use diesel::r2d2::{ConnectionManager, Pool};

    // Never connected; validation failures must short-circuit before
    // the repository touches the pool
    fn offline_pool() -> PgPool {
        let manager = ConnectionManager::<PgConnection>::new("postgresql://localhost/unused");
        Pool::builder().max_size(1).build_unchecked(manager)
    }

    fn pilot_input() -> PilotInput {
        PilotInput {
            license_number: "PL-001".to_string(),
            phone_number: "+48123456789".to_string(),
            sepl_valid_until: None,
            medical_valid_until: None,
            is_active: true,
        }
    }

    #[tokio::test]
    async fn test_create_pilot_rejects_malformed_email() {
        let repo = PilotsRepository::new(offline_pool());

        let err = repo
            .create_pilot(
                "Jan".to_string(),
                "Kowalski".to_string(),
                "not-an-email".to_string(),
                false,
                pilot_input(),
            )
            .await
            .unwrap_err();

        let errors = err.downcast::<ValidationErrors>().unwrap();
        assert_eq!(errors.0[0].field, "email");
    }
}
