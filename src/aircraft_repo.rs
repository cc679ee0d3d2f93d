use anyhow::Result;
use diesel::prelude::*;
use uuid::Uuid;

use crate::aircraft::{Aircraft, AircraftInput, AircraftModel};
use crate::flight_operations::{FlightOperation, FlightOperationModel};
use crate::validation::{map_constraint_violation, map_delete_protected};
use crate::web::PgPool;

const UNIQUE_CONSTRAINTS: &[(&str, &str, &str)] = &[
    (
        "aircraft_serial_number_key",
        "serial_number",
        "an aircraft with this serial number already exists",
    ),
    (
        "aircraft_registration_marks_key",
        "registration_marks",
        "an aircraft with these registration marks already exists",
    ),
];

/// Repository for the aircraft fleet
#[derive(Clone)]
pub struct AircraftRepository {
    pool: PgPool,
}

impl AircraftRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create a new aircraft from caller input
    pub async fn create(&self, input: AircraftInput) -> Result<Aircraft> {
        use crate::schema::aircraft;

        let new_aircraft = Aircraft::new(input);
        new_aircraft.validate()?;

        let pool = self.pool.clone();
        let aircraft_model: AircraftModel = new_aircraft.clone().into();

        tokio::task::spawn_blocking(move || {
            let mut conn = pool.get()?;

            diesel::insert_into(aircraft::table)
                .values(&aircraft_model)
                .execute(&mut conn)
                .map_err(|e| map_constraint_violation(e, UNIQUE_CONSTRAINTS))?;

            Ok::<(), anyhow::Error>(())
        })
        .await??;

        Ok(new_aircraft)
    }

    /// Update an aircraft. Returns None when it does not exist.
    pub async fn update(&self, aircraft_id: Uuid, input: AircraftInput) -> Result<Option<Aircraft>> {
        use crate::schema::aircraft;

        let Some(mut existing) = self.get_by_id(aircraft_id).await? else {
            return Ok(None);
        };

        existing.apply(input);
        existing.validate()?;

        let pool = self.pool.clone();
        let aircraft_model: AircraftModel = existing.clone().into();

        tokio::task::spawn_blocking(move || {
            let mut conn = pool.get()?;

            diesel::update(aircraft::table.filter(aircraft::id.eq(aircraft_model.id)))
                .set(&aircraft_model)
                .execute(&mut conn)
                .map_err(|e| map_constraint_violation(e, UNIQUE_CONSTRAINTS))?;

            Ok::<(), anyhow::Error>(())
        })
        .await??;

        Ok(Some(existing))
    }

    /// Get an aircraft by its ID
    pub async fn get_by_id(&self, aircraft_id: Uuid) -> Result<Option<Aircraft>> {
        use crate::schema::aircraft::dsl::*;

        let pool = self.pool.clone();

        let result = tokio::task::spawn_blocking(move || {
            let mut conn = pool.get()?;

            let aircraft_model: Option<AircraftModel> = aircraft
                .filter(id.eq(aircraft_id))
                .select(AircraftModel::as_select())
                .first(&mut conn)
                .optional()?;

            Ok::<Option<AircraftModel>, anyhow::Error>(aircraft_model)
        })
        .await??;

        Ok(result.map(|model| model.into()))
    }

    /// Get all active aircraft, ordered by registration marks
    pub async fn get_active(&self) -> Result<Vec<Aircraft>> {
        use crate::schema::aircraft::dsl::*;

        let pool = self.pool.clone();

        let results = tokio::task::spawn_blocking(move || {
            let mut conn = pool.get()?;

            let aircraft_models: Vec<AircraftModel> = aircraft
                .filter(is_active.eq(true))
                .order(registration_marks.asc())
                .select(AircraftModel::as_select())
                .load(&mut conn)?;

            Ok::<Vec<AircraftModel>, anyhow::Error>(aircraft_models)
        })
        .await??;

        Ok(results.into_iter().map(|model| model.into()).collect())
    }

    /// Get the count of active aircraft
    pub async fn count_active(&self) -> Result<i64> {
        use crate::schema::aircraft::dsl::*;

        let pool = self.pool.clone();

        let count = tokio::task::spawn_blocking(move || {
            let mut conn = pool.get()?;

            let count = aircraft
                .filter(is_active.eq(true))
                .count()
                .get_result::<i64>(&mut conn)?;

            Ok::<i64, anyhow::Error>(count)
        })
        .await??;

        Ok(count)
    }

    /// Hard-delete an aircraft. Fails with `DeleteProtected` while any PDT
    /// page still references it; soft-disable via `is_active` is the normal
    /// path.
    pub async fn delete(&self, aircraft_id: Uuid) -> Result<bool> {
        use crate::schema::aircraft::dsl::*;

        let pool = self.pool.clone();

        let rows_affected = tokio::task::spawn_blocking(move || {
            let mut conn = pool.get()?;

            let rows = diesel::delete(aircraft.filter(id.eq(aircraft_id)))
                .execute(&mut conn)
                .map_err(|e| map_delete_protected(e, "aircraft"))?;

            Ok::<usize, anyhow::Error>(rows)
        })
        .await??;

        Ok(rows_affected > 0)
    }

    /// Get every operation recorded on any PDT page of this aircraft, most
    /// recent page first. This is the operation set the statistics engine
    /// aggregates over.
    pub async fn get_operations_for_aircraft(
        &self,
        aircraft_id_val: Uuid,
    ) -> Result<Vec<FlightOperation>> {
        use crate::schema::{flight_operations, pdt_pages};

        let pool = self.pool.clone();

        let results = tokio::task::spawn_blocking(move || {
            let mut conn = pool.get()?;

            let models: Vec<FlightOperationModel> = flight_operations::table
                .inner_join(pdt_pages::table)
                .filter(pdt_pages::aircraft_id.eq(aircraft_id_val))
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
