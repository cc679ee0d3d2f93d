use anyhow::Result;
use chrono::NaiveDate;
use diesel::prelude::*;
use uuid::Uuid;

use crate::flight_operations::{FlightOperation, FlightOperationModel, NewFlightOperation};
use crate::pdt_pages::{PdtPage, PdtPageInput, PdtPageModel};
use crate::validation::{ValidationErrors, map_constraint_violation, map_delete_protected};
use crate::web::PgPool;

const WRITE_CONSTRAINTS: &[(&str, &str, &str)] = &[
    (
        "unique_aircraft_pdt_page",
        "page_number",
        "this aircraft already has a page with this number",
    ),
    (
        "pdt_pages_aircraft_id_fkey",
        "aircraft_id",
        "unknown aircraft",
    ),
    (
        "flight_operations_pilot_id_fkey",
        "pilot_id",
        "unknown pilot",
    ),
];

/// Optional filters for listing PDT pages
#[derive(Debug, Clone, Default)]
pub struct PdtPageFilter {
    pub aircraft_id: Option<Uuid>,
    pub date_from: Option<NaiveDate>,
    pub date_to: Option<NaiveDate>,
}

/// Repository for PDT pages and their owned flight operations
#[derive(Clone)]
pub struct PdtPagesRepository {
    pool: PgPool,
}

impl PdtPagesRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Validate a page and its operation set without touching the database.
    /// A page with zero operations is rejected: a logbook page recording no
    /// flights has no meaning.
    fn validate_group(
        page: &PdtPage,
        operations: &[FlightOperation],
    ) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();

        if let Err(page_errors) = page.validate() {
            errors.0.extend(page_errors.0);
        }
        if operations.is_empty() {
            errors.push("flight_operations", "at least one flight operation is required");
        }
        for op in operations {
            if let Err(op_errors) = op.validate() {
                errors.0.extend(op_errors.0);
            }
        }

        errors.into_result()
    }

    /// Create a PDT page together with its flight operations as one atomic
    /// unit. Any failure (validation, constraint, connection) rolls the
    /// whole group back; no orphaned page is ever visible.
    pub async fn create_with_operations(
        &self,
        input: PdtPageInput,
        operations: Vec<NewFlightOperation>,
    ) -> Result<(PdtPage, Vec<FlightOperation>)> {
        use crate::schema::{flight_operations, pdt_pages};

        let page = PdtPage::new(input);
        let operations: Vec<FlightOperation> = operations
            .into_iter()
            .map(|op| op.into_operation(page.id))
            .collect();
        Self::validate_group(&page, &operations)?;

        let pool = self.pool.clone();
        let page_model: PdtPageModel = page.clone().into();
        let operation_models: Vec<FlightOperationModel> =
            operations.iter().cloned().map(Into::into).collect();

        tokio::task::spawn_blocking(move || {
            let mut conn = pool.get()?;

            conn.transaction(|conn| {
                diesel::insert_into(pdt_pages::table)
                    .values(&page_model)
                    .execute(conn)?;

                diesel::insert_into(flight_operations::table)
                    .values(&operation_models)
                    .execute(conn)?;

                Ok::<(), diesel::result::Error>(())
            })
            .map_err(|e| map_constraint_violation(e, WRITE_CONSTRAINTS))?;

            Ok::<(), anyhow::Error>(())
        })
        .await??;

        Ok((page, operations))
    }

    /// Update a page and replace its whole operation set as one atomic
    /// unit. Returns None when the page does not exist.
    pub async fn update_with_operations(
        &self,
        page_id: Uuid,
        input: PdtPageInput,
        operations: Vec<NewFlightOperation>,
    ) -> Result<Option<(PdtPage, Vec<FlightOperation>)>> {
        use crate::schema::{flight_operations, pdt_pages};

        let Some(mut page) = self.get_by_id(page_id).await? else {
            return Ok(None);
        };

        page.apply(input);
        let operations: Vec<FlightOperation> = operations
            .into_iter()
            .map(|op| op.into_operation(page.id))
            .collect();
        Self::validate_group(&page, &operations)?;

        let pool = self.pool.clone();
        let page_model: PdtPageModel = page.clone().into();
        let operation_models: Vec<FlightOperationModel> =
            operations.iter().cloned().map(Into::into).collect();

        tokio::task::spawn_blocking(move || {
            let mut conn = pool.get()?;

            conn.transaction(|conn| {
                diesel::update(pdt_pages::table.filter(pdt_pages::id.eq(page_model.id)))
                    .set(&page_model)
                    .execute(conn)?;

                diesel::delete(
                    flight_operations::table
                        .filter(flight_operations::pdt_page_id.eq(page_model.id)),
                )
                .execute(conn)?;

                diesel::insert_into(flight_operations::table)
                    .values(&operation_models)
                    .execute(conn)?;

                Ok::<(), diesel::result::Error>(())
            })
            .map_err(|e| map_constraint_violation(e, WRITE_CONSTRAINTS))?;

            Ok::<(), anyhow::Error>(())
        })
        .await??;

        Ok(Some((page, operations)))
    }

    /// Get a page by its ID
    pub async fn get_by_id(&self, page_id: Uuid) -> Result<Option<PdtPage>> {
        use crate::schema::pdt_pages::dsl::*;

        let pool = self.pool.clone();

        let result = tokio::task::spawn_blocking(move || {
            let mut conn = pool.get()?;

            let page_model: Option<PdtPageModel> = pdt_pages
                .filter(id.eq(page_id))
                .select(PdtPageModel::as_select())
                .first(&mut conn)
                .optional()?;

            Ok::<Option<PdtPageModel>, anyhow::Error>(page_model)
        })
        .await??;

        Ok(result.map(|model| model.into()))
    }

    /// Get the operations recorded on a page, in departure order
    pub async fn get_operations_for_page(&self, page_id: Uuid) -> Result<Vec<FlightOperation>> {
        use crate::schema::flight_operations::dsl::*;

        let pool = self.pool.clone();

        let results = tokio::task::spawn_blocking(move || {
            let mut conn = pool.get()?;

            let models: Vec<FlightOperationModel> = flight_operations
                .filter(pdt_page_id.eq(page_id))
                .order(departure_time.asc())
                .select(FlightOperationModel::as_select())
                .load(&mut conn)?;

            Ok::<Vec<FlightOperationModel>, anyhow::Error>(models)
        })
        .await??;

        Ok(results.into_iter().map(|model| model.into()).collect())
    }

    /// List pages, optionally filtered by aircraft and/or date range, most
    /// recent first
    pub async fn list(&self, filter: PdtPageFilter) -> Result<Vec<PdtPage>> {
        use crate::schema::pdt_pages::dsl::*;

        let pool = self.pool.clone();

        let results = tokio::task::spawn_blocking(move || {
            let mut conn = pool.get()?;

            let mut query = pdt_pages.into_boxed();
            if let Some(aircraft_id_val) = filter.aircraft_id {
                query = query.filter(aircraft_id.eq(aircraft_id_val));
            }
            if let Some(from) = filter.date_from {
                query = query.filter(pdt_date.ge(from));
            }
            if let Some(to) = filter.date_to {
                query = query.filter(pdt_date.le(to));
            }

            let page_models: Vec<PdtPageModel> = query
                .order((pdt_date.desc(), page_number.desc()))
                .select(PdtPageModel::as_select())
                .load(&mut conn)?;

            Ok::<Vec<PdtPageModel>, anyhow::Error>(page_models)
        })
        .await??;

        Ok(results.into_iter().map(|model| model.into()).collect())
    }

    /// Get the most recently created pages (dashboard)
    pub async fn get_recent(&self, limit: i64) -> Result<Vec<PdtPage>> {
        use crate::schema::pdt_pages::dsl::*;

        let pool = self.pool.clone();

        let results = tokio::task::spawn_blocking(move || {
            let mut conn = pool.get()?;

            let page_models: Vec<PdtPageModel> = pdt_pages
                .order(created_at.desc())
                .limit(limit)
                .select(PdtPageModel::as_select())
                .load(&mut conn)?;

            Ok::<Vec<PdtPageModel>, anyhow::Error>(page_models)
        })
        .await??;

        Ok(results.into_iter().map(|model| model.into()).collect())
    }

    /// Get the total count of pages
    pub async fn count(&self) -> Result<i64> {
        use crate::schema::pdt_pages::dsl::*;

        let pool = self.pool.clone();

        let count_val = tokio::task::spawn_blocking(move || {
            let mut conn = pool.get()?;

            let count_val = pdt_pages.count().get_result::<i64>(&mut conn)?;

            Ok::<i64, anyhow::Error>(count_val)
        })
        .await??;

        Ok(count_val)
    }

    /// Get the total count of flight operations
    pub async fn count_operations(&self) -> Result<i64> {
        use crate::schema::flight_operations::dsl::*;

        let pool = self.pool.clone();

        let count_val = tokio::task::spawn_blocking(move || {
            let mut conn = pool.get()?;

            let count_val = flight_operations.count().get_result::<i64>(&mut conn)?;

            Ok::<i64, anyhow::Error>(count_val)
        })
        .await??;

        Ok(count_val)
    }

    /// Delete a page. Its operations go with it (owned composition, DELETE
    /// CASCADE); nothing else references pages.
    pub async fn delete(&self, page_id: Uuid) -> Result<bool> {
        use crate::schema::pdt_pages::dsl::*;

        let pool = self.pool.clone();

        let rows_affected = tokio::task::spawn_blocking(move || {
            let mut conn = pool.get()?;

            let rows = diesel::delete(pdt_pages.filter(id.eq(page_id)))
                .execute(&mut conn)
                .map_err(|e| map_delete_protected(e, "PDT page"))?;

            Ok::<usize, anyhow::Error>(rows)
        })
        .await??;

        Ok(rows_affected > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bigdecimal::BigDecimal;
    use chrono::NaiveTime;
    use std::str::FromStr;

    fn page_input() -> PdtPageInput {
        PdtPageInput {
            aircraft_id: Uuid::now_v7(),
            pdt_date: NaiveDate::from_ymd_opt(2024, 6, 1).unwrap(),
            page_number: "042/2024".to_string(),
            persons_on_board: 2,
            fuel_added: BigDecimal::from(0),
            fuel_at_start: BigDecimal::from_str("90.00").unwrap(),
            oil_added: BigDecimal::from(0),
            oil_at_start: BigDecimal::from_str("5.50").unwrap(),
            last_operation_notes: String::new(),
        }
    }

    fn operation(page: &PdtPage) -> FlightOperation {
        FlightOperation::new(
            page.id,
            Uuid::now_v7(),
            NaiveTime::from_hms_opt(9, 0, 0).unwrap(),
            "EPWA".to_string(),
            NaiveTime::from_hms_opt(10, 0, 0).unwrap(),
            "EPKK".to_string(),
            1,
            BigDecimal::from_str("100.50").unwrap(),
        )
    }

    #[test]
    fn test_validate_group_requires_an_operation() {
        let page = PdtPage::new(page_input());
        let errors = PdtPagesRepository::validate_group(&page, &[]).unwrap_err();
        assert_eq!(errors.0[0].field, "flight_operations");
    }

    #[test]
    fn test_validate_group_collects_member_errors() {
        let page = PdtPage::new(page_input());
        let mut op = operation(&page);
        op.number_of_landings = 0;
        let errors = PdtPagesRepository::validate_group(&page, &[op]).unwrap_err();
        assert!(errors.0.iter().any(|e| e.field == "number_of_landings"));
    }

    #[test]
    fn test_validate_group_accepts_complete_page() {
        let page = PdtPage::new(page_input());
        let op = operation(&page);
        assert!(PdtPagesRepository::validate_group(&page, &[op]).is_ok());
    }
}
