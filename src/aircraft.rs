use bigdecimal::BigDecimal;
use chrono::{DateTime, NaiveDate, Utc};
use diesel::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::hours;
use crate::validation::ValidationErrors;

/// One physical aircraft in the operator's fleet
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Aircraft {
    /// Unique identifier for this aircraft
    pub id: Uuid,

    /// Manufacturer name (e.g. "GOGETAIR")
    pub manufacturer: String,

    /// Type designation (e.g. "G 750")
    pub aircraft_type: String,

    /// Serial number, unique across the fleet
    pub serial_number: String,

    /// Registration marks (e.g. "S5-MMB"), unique across the fleet
    pub registration_marks: String,

    /// Flight hours carried over from before this system, HHH.MM convention
    pub base_flight_hours: BigDecimal,

    /// Landings carried over from before this system
    pub base_landings: i32,

    /// Date the next scheduled maintenance is due
    pub next_service_date: Option<NaiveDate>,

    /// Engine-hour threshold for the next scheduled maintenance, HHH.MM
    pub next_service_hours: Option<BigDecimal>,

    /// Airworthiness review certificate expiry
    pub arc_valid_until: Option<NaiveDate>,

    /// Insurance expiry
    pub insurance_valid_until: Option<NaiveDate>,

    /// Soft-disable flag; inactive aircraft are hidden from entry forms
    pub is_active: bool,

    /// Database timestamps
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Caller-supplied fields for creating or updating an aircraft
#[derive(Debug, Clone, Deserialize)]
pub struct AircraftInput {
    pub manufacturer: String,
    pub aircraft_type: String,
    pub serial_number: String,
    pub registration_marks: String,
    #[serde(default = "zero_decimal")]
    pub base_flight_hours: BigDecimal,
    #[serde(default)]
    pub base_landings: i32,
    pub next_service_date: Option<NaiveDate>,
    pub next_service_hours: Option<BigDecimal>,
    pub arc_valid_until: Option<NaiveDate>,
    pub insurance_valid_until: Option<NaiveDate>,
    #[serde(default = "default_true")]
    pub is_active: bool,
}

fn zero_decimal() -> BigDecimal {
    BigDecimal::from(0)
}

fn default_true() -> bool {
    true
}

impl Aircraft {
    /// Create a new aircraft from caller input. Registration marks are
    /// uppercased on input.
    pub fn new(input: AircraftInput) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::now_v7(),
            manufacturer: input.manufacturer.trim().to_string(),
            aircraft_type: input.aircraft_type.trim().to_string(),
            serial_number: input.serial_number.trim().to_string(),
            registration_marks: input.registration_marks.trim().to_uppercase(),
            base_flight_hours: input.base_flight_hours,
            base_landings: input.base_landings,
            next_service_date: input.next_service_date,
            next_service_hours: input.next_service_hours,
            arc_valid_until: input.arc_valid_until,
            insurance_valid_until: input.insurance_valid_until,
            is_active: input.is_active,
            created_at: now,
            updated_at: now,
        }
    }

    /// Overwrite the caller-editable fields, keeping id and created_at.
    pub fn apply(&mut self, input: AircraftInput) {
        self.manufacturer = input.manufacturer.trim().to_string();
        self.aircraft_type = input.aircraft_type.trim().to_string();
        self.serial_number = input.serial_number.trim().to_string();
        self.registration_marks = input.registration_marks.trim().to_uppercase();
        self.base_flight_hours = input.base_flight_hours;
        self.base_landings = input.base_landings;
        self.next_service_date = input.next_service_date;
        self.next_service_hours = input.next_service_hours;
        self.arc_valid_until = input.arc_valid_until;
        self.insurance_valid_until = input.insurance_valid_until;
        self.is_active = input.is_active;
        self.updated_at = Utc::now();
    }

    pub fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();

        if self.manufacturer.is_empty() {
            errors.push("manufacturer", "must not be empty");
        }
        if self.aircraft_type.is_empty() {
            errors.push("aircraft_type", "must not be empty");
        }
        if self.serial_number.is_empty() {
            errors.push("serial_number", "must not be empty");
        }
        if self.registration_marks.is_empty() {
            errors.push("registration_marks", "must not be empty");
        }
        if !hours::validate_clock_decimal(&self.base_flight_hours) {
            errors.push(
                "base_flight_hours",
                "must be a non-negative HHH.MM value (minutes 00-59)",
            );
        }
        if let Some(service_hours) = &self.next_service_hours
            && !hours::validate_clock_decimal(service_hours)
        {
            errors.push(
                "next_service_hours",
                "must be a non-negative HHH.MM value (minutes 00-59)",
            );
        }
        if self.base_landings < 0 {
            errors.push("base_landings", "must not be negative");
        }

        errors.into_result()
    }

    /// Display name, e.g. "S5-MMB (GOGETAIR G 750)"
    pub fn display_name(&self) -> String {
        format!(
            "{} ({} {})",
            self.registration_marks, self.manufacturer, self.aircraft_type
        )
    }

    /// Base flight hours formatted as "H:MM".
    pub fn base_flight_hours_formatted(&self) -> String {
        hours::format_hours_hhmm(&self.base_flight_hours)
    }

    /// Next-service threshold formatted as "H:MM", if set.
    pub fn next_service_hours_formatted(&self) -> Option<String> {
        self.next_service_hours.as_ref().map(hours::format_hours_hhmm)
    }
}

/// Diesel model for the aircraft table - used for database operations
#[derive(Debug, Clone, Queryable, Selectable, Insertable, AsChangeset, Serialize, Deserialize)]
#[diesel(table_name = crate::schema::aircraft)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct AircraftModel {
    pub id: Uuid,
    pub manufacturer: String,
    pub aircraft_type: String,
    pub serial_number: String,
    pub registration_marks: String,
    pub base_flight_hours: BigDecimal,
    pub base_landings: i32,
    pub next_service_date: Option<NaiveDate>,
    pub next_service_hours: Option<BigDecimal>,
    pub arc_valid_until: Option<NaiveDate>,
    pub insurance_valid_until: Option<NaiveDate>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Aircraft> for AircraftModel {
    fn from(aircraft: Aircraft) -> Self {
        Self {
            id: aircraft.id,
            manufacturer: aircraft.manufacturer,
            aircraft_type: aircraft.aircraft_type,
            serial_number: aircraft.serial_number,
            registration_marks: aircraft.registration_marks,
            base_flight_hours: aircraft.base_flight_hours,
            base_landings: aircraft.base_landings,
            next_service_date: aircraft.next_service_date,
            next_service_hours: aircraft.next_service_hours,
            arc_valid_until: aircraft.arc_valid_until,
            insurance_valid_until: aircraft.insurance_valid_until,
            is_active: aircraft.is_active,
            created_at: aircraft.created_at,
            updated_at: aircraft.updated_at,
        }
    }
}

impl From<AircraftModel> for Aircraft {
    fn from(model: AircraftModel) -> Self {
        Self {
            id: model.id,
            manufacturer: model.manufacturer,
            aircraft_type: model.aircraft_type,
            serial_number: model.serial_number,
            registration_marks: model.registration_marks,
            base_flight_hours: model.base_flight_hours,
            base_landings: model.base_landings,
            next_service_date: model.next_service_date,
            next_service_hours: model.next_service_hours,
            arc_valid_until: model.arc_valid_until,
            insurance_valid_until: model.insurance_valid_until,
            is_active: model.is_active,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}
