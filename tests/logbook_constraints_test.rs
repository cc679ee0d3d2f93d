mod common;

use bigdecimal::BigDecimal;
use chrono::{NaiveDate, NaiveTime};
use common::TestDatabase;
use pdtlog::aircraft::{Aircraft, AircraftInput};
use pdtlog::aircraft_repo::AircraftRepository;
use pdtlog::flight_operations::NewFlightOperation;
use pdtlog::pdt_pages::PdtPageInput;
use pdtlog::pdt_pages_repo::PdtPagesRepository;
use pdtlog::pilots::{Pilot, PilotInput};
use pdtlog::pilots_repo::PilotsRepository;
use pdtlog::validation::{DeleteProtected, ValidationErrors};
use pdtlog::web::PgPool;
use serial_test::serial;
use std::str::FromStr;
use uuid::Uuid;

async fn setup_test_db() -> TestDatabase {
    TestDatabase::new()
        .await
        .expect("Failed to create test database")
}

fn aircraft_input(serial: &str, marks: &str) -> AircraftInput {
    AircraftInput {
        manufacturer: "Cessna".to_string(),
        aircraft_type: "C152".to_string(),
        serial_number: serial.to_string(),
        registration_marks: marks.to_string(),
        base_flight_hours: BigDecimal::from(0),
        base_landings: 0,
        next_service_date: None,
        next_service_hours: None,
        arc_valid_until: None,
        insurance_valid_until: None,
        is_active: true,
    }
}

async fn create_aircraft(pool: PgPool, serial: &str, marks: &str) -> Aircraft {
    AircraftRepository::new(pool)
        .create(aircraft_input(serial, marks))
        .await
        .expect("Failed to create aircraft")
}

async fn create_pilot(pool: PgPool, license: &str, email: &str) -> Pilot {
    let input = PilotInput {
        license_number: license.to_string(),
        phone_number: "+48123456789".to_string(),
        sepl_valid_until: None,
        medical_valid_until: None,
        is_active: true,
    };
    let (pilot, _user, _temp_password) = PilotsRepository::new(pool)
        .create_pilot(
            "Jan".to_string(),
            "Kowalski".to_string(),
            email.to_string(),
            false,
            input,
        )
        .await
        .expect("Failed to create pilot");
    pilot
}

fn page_input(aircraft_id: Uuid, page_number: &str) -> PdtPageInput {
    PdtPageInput {
        aircraft_id,
        pdt_date: NaiveDate::from_ymd_opt(2024, 6, 1).unwrap(),
        page_number: page_number.to_string(),
        persons_on_board: 2,
        fuel_added: BigDecimal::from(0),
        fuel_at_start: BigDecimal::from_str("90.00").unwrap(),
        oil_added: BigDecimal::from(0),
        oil_at_start: BigDecimal::from_str("5.50").unwrap(),
        last_operation_notes: String::new(),
    }
}

fn operation(pilot_id: Uuid) -> NewFlightOperation {
    NewFlightOperation {
        pilot_id,
        departure_time: NaiveTime::from_hms_opt(9, 0, 0).unwrap(),
        departure_location: "EPWA".to_string(),
        landing_time: NaiveTime::from_hms_opt(10, 0, 0).unwrap(),
        landing_location: "EPKK".to_string(),
        number_of_landings: 1,
        engine_hours_after_flight: BigDecimal::from_str("100.50").unwrap(),
    }
}

#[tokio::test]
#[serial]
async fn test_duplicate_serial_number_maps_to_field_error() {
    let test_db = setup_test_db().await;
    let pool = test_db.pool();
    let repo = AircraftRepository::new(pool.clone());

    create_aircraft(pool, "SN-100", "SP-ABC").await;

    // Same serial under different marks must surface as a field error,
    // not an opaque database failure
    let err = repo
        .create(aircraft_input("SN-100", "SP-XYZ"))
        .await
        .unwrap_err();
    let errors = err
        .downcast::<ValidationErrors>()
        .expect("expected a validation error");
    assert_eq!(errors.0.len(), 1);
    assert_eq!(errors.0[0].field, "serial_number");
}

#[tokio::test]
#[serial]
async fn test_duplicate_page_number_for_same_aircraft_rejected() {
    let test_db = setup_test_db().await;
    let pool = test_db.pool();
    let pages_repo = PdtPagesRepository::new(pool.clone());

    let aircraft = create_aircraft(pool.clone(), "SN-100", "SP-ABC").await;
    let pilot = create_pilot(pool, "PL-001", "jan@example.com").await;

    pages_repo
        .create_with_operations(page_input(aircraft.id, "001"), vec![operation(pilot.id)])
        .await
        .expect("Failed to create first page");

    let err = pages_repo
        .create_with_operations(page_input(aircraft.id, "001"), vec![operation(pilot.id)])
        .await
        .unwrap_err();
    let errors = err
        .downcast::<ValidationErrors>()
        .expect("expected a validation error");
    assert_eq!(errors.0[0].field, "page_number");
}

#[tokio::test]
#[serial]
async fn test_page_create_rolls_back_when_one_operation_is_bad() {
    let test_db = setup_test_db().await;
    let pool = test_db.pool();
    let pages_repo = PdtPagesRepository::new(pool.clone());

    let aircraft = create_aircraft(pool.clone(), "SN-100", "SP-ABC").await;
    let pilot = create_pilot(pool, "PL-001", "jan@example.com").await;

    // Second operation references a pilot that does not exist; the
    // whole page write must roll back, including the first operation
    let err = pages_repo
        .create_with_operations(
            page_input(aircraft.id, "001"),
            vec![operation(pilot.id), operation(Uuid::now_v7())],
        )
        .await
        .unwrap_err();
    let errors = err
        .downcast::<ValidationErrors>()
        .expect("expected a validation error");
    assert_eq!(errors.0[0].field, "pilot_id");

    assert_eq!(pages_repo.count().await.unwrap(), 0);
    assert_eq!(pages_repo.count_operations().await.unwrap(), 0);
}

#[tokio::test]
#[serial]
async fn test_aircraft_delete_protected_while_pages_exist() {
    let test_db = setup_test_db().await;
    let pool = test_db.pool();
    let aircraft_repo = AircraftRepository::new(pool.clone());
    let pages_repo = PdtPagesRepository::new(pool.clone());

    let aircraft = create_aircraft(pool.clone(), "SN-100", "SP-ABC").await;
    let pilot = create_pilot(pool, "PL-001", "jan@example.com").await;

    let (page, _ops) = pages_repo
        .create_with_operations(page_input(aircraft.id, "001"), vec![operation(pilot.id)])
        .await
        .expect("Failed to create page");

    let err = aircraft_repo.delete(aircraft.id).await.unwrap_err();
    let protected = err
        .downcast::<DeleteProtected>()
        .expect("expected delete protection");
    assert_eq!(protected.entity, "aircraft");

    // Once the page is gone the aircraft can be deleted
    assert!(pages_repo.delete(page.id).await.unwrap());
    assert!(aircraft_repo.delete(aircraft.id).await.unwrap());
}

#[tokio::test]
#[serial]
async fn test_page_delete_cascades_to_operations() {
    let test_db = setup_test_db().await;
    let pool = test_db.pool();
    let pages_repo = PdtPagesRepository::new(pool.clone());

    let aircraft = create_aircraft(pool.clone(), "SN-100", "SP-ABC").await;
    let pilot = create_pilot(pool, "PL-001", "jan@example.com").await;

    let (page, ops) = pages_repo
        .create_with_operations(
            page_input(aircraft.id, "001"),
            vec![operation(pilot.id), operation(pilot.id)],
        )
        .await
        .expect("Failed to create page");
    assert_eq!(ops.len(), 2);
    assert_eq!(pages_repo.count_operations().await.unwrap(), 2);

    assert!(pages_repo.delete(page.id).await.unwrap());
    assert_eq!(pages_repo.count().await.unwrap(), 0);
    assert_eq!(pages_repo.count_operations().await.unwrap(), 0);
}
