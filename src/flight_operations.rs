use bigdecimal::BigDecimal;
use chrono::{DateTime, Duration, NaiveTime, Utc};
use diesel::prelude::*;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::hours;
use crate::validation::ValidationErrors;

/// 4-letter ICAO location identifier (e.g. EPWA, LJLJ)
static ICAO_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[A-Z]{4}$").unwrap());

/// One recorded takeoff/landing cycle on a PDT page
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FlightOperation {
    /// Unique identifier for this operation
    pub id: Uuid,

    /// PDT page this operation belongs to (owning composition)
    pub pdt_page_id: Uuid,

    /// Pilot who flew the operation (foreign key to pilots table)
    pub pilot_id: Uuid,

    /// Departure time of day (wall clock, no date component)
    pub departure_time: NaiveTime,

    /// Departure location as a 4-letter ICAO code
    pub departure_location: String,

    /// Landing time of day; may be numerically earlier than departure for
    /// overnight flights
    pub landing_time: NaiveTime,

    /// Landing location as a 4-letter ICAO code
    pub landing_location: String,

    /// Number of landings performed in this operation (>= 1)
    pub number_of_landings: i16,

    /// Engine-hour counter reading after the flight
    pub engine_hours_after_flight: BigDecimal,

    /// Database timestamps
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl FlightOperation {
    /// Create a new flight operation. ICAO codes are uppercased on input.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        pdt_page_id: Uuid,
        pilot_id: Uuid,
        departure_time: NaiveTime,
        departure_location: String,
        landing_time: NaiveTime,
        landing_location: String,
        number_of_landings: i16,
        engine_hours_after_flight: BigDecimal,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::now_v7(),
            pdt_page_id,
            pilot_id,
            departure_time,
            departure_location: departure_location.trim().to_uppercase(),
            landing_time,
            landing_location: landing_location.trim().to_uppercase(),
            number_of_landings,
            engine_hours_after_flight,
            created_at: now,
            updated_at: now,
        }
    }

    /// Elapsed time between departure and landing.
    ///
    /// Both times are wall-clock times of day. A landing that is numerically
    /// earlier than the departure is assumed to have happened the following
    /// day, so the duration wraps by 24 hours instead of going negative.
    /// The result is always in [0, 24h). Never stored; derived on demand.
    pub fn flight_time(&self) -> Duration {
        let mut duration = self.landing_time - self.departure_time;
        if duration < Duration::zero() {
            duration = duration + Duration::days(1);
        }
        duration
    }

    /// Flight time formatted as "H:MM".
    pub fn flight_time_formatted(&self) -> String {
        hours::format_duration_hhmm(self.flight_time())
    }

    pub fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();

        if !ICAO_RE.is_match(&self.departure_location) {
            errors.push(
                "departure_location",
                "must be a 4-letter ICAO code (e.g. EPWA)",
            );
        }
        if !ICAO_RE.is_match(&self.landing_location) {
            errors.push(
                "landing_location",
                "must be a 4-letter ICAO code (e.g. EPWA)",
            );
        }
        if self.number_of_landings < 1 {
            errors.push("number_of_landings", "must be at least 1");
        }
        // Raw meter reading, not a clock value: any non-negative decimal is fine
        if self.engine_hours_after_flight < BigDecimal::from(0) {
            errors.push("engine_hours_after_flight", "must not be negative");
        }

        errors.into_result()
    }
}

/// Payload for one operation when creating or replacing a page's operation
/// set. The owning page id is assigned by the repository.
#[derive(Debug, Clone, Deserialize)]
pub struct NewFlightOperation {
    pub pilot_id: Uuid,
    pub departure_time: NaiveTime,
    pub departure_location: String,
    pub landing_time: NaiveTime,
    pub landing_location: String,
    pub number_of_landings: i16,
    pub engine_hours_after_flight: BigDecimal,
}

impl NewFlightOperation {
    pub fn into_operation(self, pdt_page_id: Uuid) -> FlightOperation {
        FlightOperation::new(
            pdt_page_id,
            self.pilot_id,
            self.departure_time,
            self.departure_location,
            self.landing_time,
            self.landing_location,
            self.number_of_landings,
            self.engine_hours_after_flight,
        )
    }
}

/// Diesel model for the flight_operations table - used for database operations
#[derive(Debug, Clone, Queryable, Selectable, Insertable, AsChangeset, Serialize, Deserialize)]
#[diesel(table_name = crate::schema::flight_operations)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct FlightOperationModel {
    pub id: Uuid,
    pub pdt_page_id: Uuid,
    pub pilot_id: Uuid,
    pub departure_time: NaiveTime,
    pub departure_location: String,
    pub landing_time: NaiveTime,
    pub landing_location: String,
    pub number_of_landings: i16,
    pub engine_hours_after_flight: BigDecimal,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<FlightOperation> for FlightOperationModel {
    fn from(op: FlightOperation) -> Self {
        Self {
            id: op.id,
            pdt_page_id: op.pdt_page_id,
            pilot_id: op.pilot_id,
            departure_time: op.departure_time,
            departure_location: op.departure_location,
            landing_time: op.landing_time,
            landing_location: op.landing_location,
            number_of_landings: op.number_of_landings,
            engine_hours_after_flight: op.engine_hours_after_flight,
            created_at: op.created_at,
            updated_at: op.updated_at,
        }
    }
}

impl From<FlightOperationModel> for FlightOperation {
    fn from(model: FlightOperationModel) -> Self {
        Self {
            id: model.id,
            pdt_page_id: model.pdt_page_id,
            pilot_id: model.pilot_id,
            departure_time: model.departure_time,
            departure_location: model.departure_location,
            landing_time: model.landing_time,
            landing_location: model.landing_location,
            number_of_landings: model.number_of_landings,
            engine_hours_after_flight: model.engine_hours_after_flight,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn time(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    fn operation(departure: NaiveTime, landing: NaiveTime) -> FlightOperation {
        FlightOperation::new(
            Uuid::now_v7(),
            Uuid::now_v7(),
            departure,
            "EPWA".to_string(),
            landing,
            "EPKK".to_string(),
            1,
            BigDecimal::from_str("1542.30").unwrap(),
        )
    }

    #[test]
    fn test_flight_time_same_day() {
        let op = operation(time(10, 15), time(12, 45));
        assert_eq!(op.flight_time(), Duration::hours(2) + Duration::minutes(30));
        assert_eq!(op.flight_time_formatted(), "2:30");
    }

    #[test]
    fn test_flight_time_zero() {
        let op = operation(time(10, 0), time(10, 0));
        assert_eq!(op.flight_time(), Duration::zero());
    }

    #[test]
    fn test_flight_time_overnight_wrap() {
        // Landing at 01:30 the next morning after a 23:00 departure
        let op = operation(time(23, 0), time(1, 30));
        assert_eq!(op.flight_time(), Duration::hours(2) + Duration::minutes(30));
        assert!(op.flight_time() > Duration::zero());
        assert!(op.flight_time() < Duration::days(1));
    }

    #[test]
    fn test_new_uppercases_locations() {
        let op = FlightOperation::new(
            Uuid::now_v7(),
            Uuid::now_v7(),
            time(9, 0),
            "epwa".to_string(),
            time(10, 0),
            " epkk ".to_string(),
            1,
            BigDecimal::from(0),
        );
        assert_eq!(op.departure_location, "EPWA");
        assert_eq!(op.landing_location, "EPKK");
        assert!(op.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_bad_icao() {
        let mut op = operation(time(9, 0), time(10, 0));
        op.departure_location = "EPW".to_string();
        let errors = op.validate().unwrap_err();
        assert_eq!(errors.0[0].field, "departure_location");
    }

    #[test]
    fn test_validate_rejects_zero_landings() {
        let mut op = operation(time(9, 0), time(10, 0));
        op.number_of_landings = 0;
        let errors = op.validate().unwrap_err();
        assert_eq!(errors.0[0].field, "number_of_landings");
    }

    #[test]
    fn test_validate_accepts_tenth_based_meter_reading() {
        // Engine hour meters count in tenths, so .70 is an ordinary reading
        let mut op = operation(time(9, 0), time(10, 0));
        op.engine_hours_after_flight = BigDecimal::from_str("1542.70").unwrap();
        assert!(op.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_negative_meter_reading() {
        let mut op = operation(time(9, 0), time(10, 0));
        op.engine_hours_after_flight = BigDecimal::from_str("-0.10").unwrap();
        let errors = op.validate().unwrap_err();
        assert_eq!(errors.0[0].field, "engine_hours_after_flight");
    }
}
