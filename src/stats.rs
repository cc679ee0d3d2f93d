//! Derived flight statistics and the date-urgency classifier.
//!
//! Everything here is a pure function over the live operation set; nothing is
//! cached. Aggregates are recomputed from the records handed in by the
//! repositories at query time.

use bigdecimal::BigDecimal;
use chrono::{Duration, Months, NaiveDate};
use serde::Serialize;

use crate::aircraft::Aircraft;
use crate::flight_operations::FlightOperation;
use crate::hours;

/// Urgency bucket for an upcoming expiry or maintenance date
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DateStatus {
    /// Three or more months out
    Ok,
    /// Between one and three months out
    Warning,
    /// Less than one month out, or already past
    Danger,
}

/// Classify an optional date against `today` using calendar-month windows.
///
/// Returns None when no date is set (not applicable). An already-expired date
/// maps to Danger, same as one expiring within the month.
pub fn date_status(date: Option<NaiveDate>, today: NaiveDate) -> Option<DateStatus> {
    let date = date?;
    let three_months = today
        .checked_add_months(Months::new(3))
        .unwrap_or(NaiveDate::MAX);
    let one_month = today
        .checked_add_months(Months::new(1))
        .unwrap_or(NaiveDate::MAX);

    if date >= three_months {
        Some(DateStatus::Ok)
    } else if date >= one_month {
        Some(DateStatus::Warning)
    } else {
        Some(DateStatus::Danger)
    }
}

/// Sum the durations of all operations in the set.
pub fn total_flight_time(operations: &[FlightOperation]) -> Duration {
    operations
        .iter()
        .fold(Duration::zero(), |total, op| total + op.flight_time())
}

/// Total flight hours for an aircraft: base hours plus every operation's
/// duration, formatted as "H:MM". With no operations this is exactly the
/// base hours.
pub fn total_flight_hours(base_flight_hours: &BigDecimal, operations: &[FlightOperation]) -> String {
    let total =
        hours::clock_decimal_to_duration(base_flight_hours) + total_flight_time(operations);
    hours::format_duration_hhmm(total)
}

/// Total landings: base count plus the landings of every operation.
pub fn total_landings(base_landings: i32, operations: &[FlightOperation]) -> i64 {
    base_landings as i64
        + operations
            .iter()
            .map(|op| op.number_of_landings as i64)
            .sum::<i64>()
}

/// Highest engine-hour reading across the operation set; 0.00 when empty
/// (a display convention, not "unknown").
pub fn max_engine_hours(operations: &[FlightOperation]) -> BigDecimal {
    operations
        .iter()
        .map(|op| &op.engine_hours_after_flight)
        .max()
        .cloned()
        .unwrap_or_else(|| BigDecimal::from(0).with_scale(2))
}

/// Aggregate statistics for one aircraft
#[derive(Debug, Clone, Serialize)]
pub struct AircraftStats {
    /// Base hours plus all operation durations, "H:MM"
    pub total_flight_hours: String,
    /// Base landings plus all operation landings
    pub total_landings: i64,
    /// Engine-hour high-water mark
    pub max_engine_hours: BigDecimal,
}

pub fn aircraft_stats(aircraft: &Aircraft, operations: &[FlightOperation]) -> AircraftStats {
    AircraftStats {
        total_flight_hours: total_flight_hours(&aircraft.base_flight_hours, operations),
        total_landings: total_landings(aircraft.base_landings, operations),
        max_engine_hours: max_engine_hours(operations),
    }
}

/// Aggregate statistics for one pilot
#[derive(Debug, Clone, Serialize)]
pub struct PilotStats {
    /// Number of operations flown
    pub total_flights: i64,
    /// Landings across all operations
    pub total_landings: i64,
    /// Time flown across all operations, "H:MM"
    pub total_flight_hours: String,
}

pub fn pilot_stats(operations: &[FlightOperation]) -> PilotStats {
    PilotStats {
        total_flights: operations.len() as i64,
        total_landings: total_landings(0, operations),
        total_flight_hours: hours::format_duration_hhmm(total_flight_time(operations)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aircraft::{Aircraft, AircraftInput};
    use chrono::NaiveTime;
    use std::str::FromStr;
    use uuid::Uuid;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn time(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    fn dec(s: &str) -> BigDecimal {
        BigDecimal::from_str(s).unwrap()
    }

    fn operation(departure: NaiveTime, landing: NaiveTime, landings: i16, engine: &str) -> FlightOperation {
        FlightOperation::new(
            Uuid::now_v7(),
            Uuid::now_v7(),
            departure,
            "EPWA".to_string(),
            landing,
            "EPKK".to_string(),
            landings,
            dec(engine),
        )
    }

    fn aircraft(base_hours: &str, base_landings: i32) -> Aircraft {
        Aircraft::new(AircraftInput {
            manufacturer: "GOGETAIR".to_string(),
            aircraft_type: "G 750".to_string(),
            serial_number: "SN-0042".to_string(),
            registration_marks: "S5-MMB".to_string(),
            base_flight_hours: dec(base_hours),
            base_landings,
            next_service_date: None,
            next_service_hours: None,
            arc_valid_until: None,
            insurance_valid_until: None,
            is_active: true,
        })
    }

    #[test]
    fn test_date_status_boundaries() {
        let today = date(2024, 1, 15);

        assert_eq!(date_status(None, today), None);
        // Exactly 3 months out is already comfortable
        assert_eq!(date_status(Some(date(2024, 4, 15)), today), Some(DateStatus::Ok));
        assert_eq!(date_status(Some(date(2024, 4, 14)), today), Some(DateStatus::Warning));
        assert_eq!(date_status(Some(date(2024, 3, 15)), today), Some(DateStatus::Warning));
        // Exactly 1 month out still counts as approaching
        assert_eq!(date_status(Some(date(2024, 2, 15)), today), Some(DateStatus::Warning));
        assert_eq!(date_status(Some(date(2024, 2, 14)), today), Some(DateStatus::Danger));
        // Already expired collapses into Danger
        assert_eq!(date_status(Some(date(2023, 12, 1)), today), Some(DateStatus::Danger));
    }

    #[test]
    fn test_date_status_month_end_clamping() {
        // Jan 31 + 1 month clamps to the end of February
        let today = date(2024, 1, 31);
        assert_eq!(date_status(Some(date(2024, 2, 29)), today), Some(DateStatus::Warning));
        assert_eq!(date_status(Some(date(2024, 2, 28)), today), Some(DateStatus::Danger));
    }

    #[test]
    fn test_aircraft_stats_empty_operation_set() {
        let craft = aircraft("123.30", 250);
        let stats = aircraft_stats(&craft, &[]);
        assert_eq!(stats.total_flight_hours, "123:30");
        assert_eq!(stats.total_landings, 250);
        assert_eq!(stats.max_engine_hours, dec("0.00"));
    }

    #[test]
    fn test_aircraft_stats_aggregation() {
        let craft = aircraft("10.30", 5);
        let ops = vec![
            operation(time(9, 0), time(10, 15), 2, "101.50"),
            operation(time(11, 0), time(11, 45), 1, "102.40"),
        ];
        let stats = aircraft_stats(&craft, &ops);
        // 10:30 base + 1:15 + 0:45 = 12:30
        assert_eq!(stats.total_flight_hours, "12:30");
        assert_eq!(stats.total_landings, 8);
        assert_eq!(stats.max_engine_hours, dec("102.40"));
    }

    #[test]
    fn test_aggregation_additivity() {
        let craft = aircraft("0.00", 0);
        let mut ops = vec![operation(time(9, 0), time(10, 0), 1, "1.00")];
        assert_eq!(aircraft_stats(&craft, &ops).total_flight_hours, "1:00");

        // Adding one operation of duration D grows the total by exactly D
        ops.push(operation(time(12, 0), time(12, 40), 1, "2.10"));
        assert_eq!(aircraft_stats(&craft, &ops).total_flight_hours, "1:40");
    }

    #[test]
    fn test_total_includes_overnight_operations() {
        let craft = aircraft("0.00", 0);
        let ops = vec![operation(time(23, 30), time(0, 30), 1, "5.00")];
        assert_eq!(aircraft_stats(&craft, &ops).total_flight_hours, "1:00");
    }

    #[test]
    fn test_pilot_stats() {
        let ops = vec![
            operation(time(9, 0), time(10, 0), 3, "1.00"),
            operation(time(11, 0), time(12, 30), 1, "2.50"),
        ];
        let stats = pilot_stats(&ops);
        assert_eq!(stats.total_flights, 2);
        assert_eq!(stats.total_landings, 4);
        assert_eq!(stats.total_flight_hours, "2:30");
    }
}
