use bigdecimal::BigDecimal;
use chrono::{DateTime, NaiveDate, Utc};
use diesel::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::validation::ValidationErrors;

/// One physical PDT logbook page: one aircraft, one date, one or more
/// flight operations
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PdtPage {
    /// Unique identifier for this page
    pub id: Uuid,

    /// Aircraft the page belongs to (foreign key to aircraft table)
    pub aircraft_id: Uuid,

    /// Date the page was written out
    pub pdt_date: NaiveDate,

    /// Page number as printed on the paper logbook; unique per aircraft
    pub page_number: String,

    /// Persons on board (>= 1)
    pub persons_on_board: i16,

    /// Fuel added before the first start, litres
    pub fuel_added: BigDecimal,

    /// Fuel on board at the first start, litres
    pub fuel_at_start: BigDecimal,

    /// Oil added before the first start, litres
    pub oil_added: BigDecimal,

    /// Oil on board at the first start, litres
    pub oil_at_start: BigDecimal,

    /// Free-text remarks about the last operation / defects
    pub last_operation_notes: String,

    /// Database timestamps
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Caller-supplied fields for creating or updating a page
#[derive(Debug, Clone, Deserialize)]
pub struct PdtPageInput {
    pub aircraft_id: Uuid,
    pub pdt_date: NaiveDate,
    pub page_number: String,
    pub persons_on_board: i16,
    pub fuel_added: BigDecimal,
    pub fuel_at_start: BigDecimal,
    pub oil_added: BigDecimal,
    pub oil_at_start: BigDecimal,
    #[serde(default)]
    pub last_operation_notes: String,
}

impl PdtPage {
    pub fn new(input: PdtPageInput) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::now_v7(),
            aircraft_id: input.aircraft_id,
            pdt_date: input.pdt_date,
            page_number: input.page_number.trim().to_string(),
            persons_on_board: input.persons_on_board,
            fuel_added: input.fuel_added,
            fuel_at_start: input.fuel_at_start,
            oil_added: input.oil_added,
            oil_at_start: input.oil_at_start,
            last_operation_notes: input.last_operation_notes,
            created_at: now,
            updated_at: now,
        }
    }

    /// Overwrite the caller-editable fields, keeping id and created_at.
    pub fn apply(&mut self, input: PdtPageInput) {
        self.aircraft_id = input.aircraft_id;
        self.pdt_date = input.pdt_date;
        self.page_number = input.page_number.trim().to_string();
        self.persons_on_board = input.persons_on_board;
        self.fuel_added = input.fuel_added;
        self.fuel_at_start = input.fuel_at_start;
        self.oil_added = input.oil_added;
        self.oil_at_start = input.oil_at_start;
        self.last_operation_notes = input.last_operation_notes;
        self.updated_at = Utc::now();
    }

    pub fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        let zero = BigDecimal::from(0);

        if self.page_number.is_empty() {
            errors.push("page_number", "must not be empty");
        }
        if self.persons_on_board < 1 {
            errors.push("persons_on_board", "must be at least 1");
        }
        if self.fuel_added < zero {
            errors.push("fuel_added", "must not be negative");
        }
        if self.fuel_at_start < zero {
            errors.push("fuel_at_start", "must not be negative");
        }
        if self.oil_added < zero {
            errors.push("oil_added", "must not be negative");
        }
        if self.oil_at_start < zero {
            errors.push("oil_at_start", "must not be negative");
        }

        errors.into_result()
    }
}

/// Diesel model for the pdt_pages table - used for database operations
#[derive(Debug, Clone, Queryable, Selectable, Insertable, AsChangeset, Serialize, Deserialize)]
#[diesel(table_name = crate::schema::pdt_pages)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct PdtPageModel {
    pub id: Uuid,
    pub aircraft_id: Uuid,
    pub pdt_date: NaiveDate,
    pub page_number: String,
    pub persons_on_board: i16,
    pub fuel_added: BigDecimal,
    pub fuel_at_start: BigDecimal,
    pub oil_added: BigDecimal,
    pub oil_at_start: BigDecimal,
    pub last_operation_notes: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<PdtPage> for PdtPageModel {
    fn from(page: PdtPage) -> Self {
        Self {
            id: page.id,
            aircraft_id: page.aircraft_id,
            pdt_date: page.pdt_date,
            page_number: page.page_number,
            persons_on_board: page.persons_on_board,
            fuel_added: page.fuel_added,
            fuel_at_start: page.fuel_at_start,
            oil_added: page.oil_added,
            oil_at_start: page.oil_at_start,
            last_operation_notes: page.last_operation_notes,
            created_at: page.created_at,
            updated_at: page.updated_at,
        }
    }
}

impl From<PdtPageModel> for PdtPage {
    fn from(model: PdtPageModel) -> Self {
        Self {
            id: model.id,
            aircraft_id: model.aircraft_id,
            pdt_date: model.pdt_date,
            page_number: model.page_number,
            persons_on_board: model.persons_on_board,
            fuel_added: model.fuel_added,
            fuel_at_start: model.fuel_at_start,
            oil_added: model.oil_added,
            oil_at_start: model.oil_at_start,
            last_operation_notes: model.last_operation_notes,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}
