//! PDT logbook service for a small aircraft operator: aircraft and pilot
//! records, daily technical log (PDT) pages with their flight operations,
//! and the derived statistics the operator reads off them.

pub mod actions;
pub mod aircraft;
pub mod aircraft_repo;
pub mod auth;
pub mod commands;
pub mod flight_operations;
pub mod hours;
pub mod pdt_pages;
pub mod pdt_pages_repo;
pub mod pilots;
pub mod pilots_repo;
pub mod schema;
pub mod stats;
pub mod users;
pub mod users_repo;
pub mod validation;
pub mod web;
