use chrono::{DateTime, NaiveDate, Utc};
use diesel::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::validation::ValidationErrors;

/// License data for one pilot, linked one-to-one with a user account
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Pilot {
    /// Unique identifier for this pilot
    pub id: Uuid,

    /// Owning account (foreign key to users table, one pilot per account)
    pub user_id: Uuid,

    /// License number (e.g. "PL.FCL.42752.PPL(A)"), unique across pilots
    pub license_number: String,

    /// Contact phone number
    pub phone_number: String,

    /// SEPL(A) rating expiry
    pub sepl_valid_until: Option<NaiveDate>,

    /// Medical certificate expiry
    pub medical_valid_until: Option<NaiveDate>,

    /// Soft-disable flag; inactive pilots are hidden from entry forms
    pub is_active: bool,

    /// Database timestamps
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Caller-supplied license fields for creating or updating a pilot
#[derive(Debug, Clone, Deserialize)]
pub struct PilotInput {
    pub license_number: String,
    pub phone_number: String,
    pub sepl_valid_until: Option<NaiveDate>,
    pub medical_valid_until: Option<NaiveDate>,
    #[serde(default = "default_true")]
    pub is_active: bool,
}

fn default_true() -> bool {
    true
}

impl Pilot {
    pub fn new(user_id: Uuid, input: PilotInput) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::now_v7(),
            user_id,
            license_number: input.license_number.trim().to_string(),
            phone_number: input.phone_number.trim().to_string(),
            sepl_valid_until: input.sepl_valid_until,
            medical_valid_until: input.medical_valid_until,
            is_active: input.is_active,
            created_at: now,
            updated_at: now,
        }
    }

    /// Overwrite the caller-editable fields, keeping id and the user link.
    pub fn apply(&mut self, input: PilotInput) {
        self.license_number = input.license_number.trim().to_string();
        self.phone_number = input.phone_number.trim().to_string();
        self.sepl_valid_until = input.sepl_valid_until;
        self.medical_valid_until = input.medical_valid_until;
        self.is_active = input.is_active;
        self.updated_at = Utc::now();
    }

    pub fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();

        if self.license_number.is_empty() {
            errors.push("license_number", "must not be empty");
        }
        if self.phone_number.is_empty() {
            errors.push("phone_number", "must not be empty");
        }

        errors.into_result()
    }
}

/// Diesel model for the pilots table - used for database operations
#[derive(Debug, Clone, Queryable, Selectable, Insertable, AsChangeset, Serialize, Deserialize)]
#[diesel(table_name = crate::schema::pilots)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct PilotModel {
    pub id: Uuid,
    pub user_id: Uuid,
    pub license_number: String,
    pub phone_number: String,
    pub sepl_valid_until: Option<NaiveDate>,
    pub medical_valid_until: Option<NaiveDate>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Pilot> for PilotModel {
    fn from(pilot: Pilot) -> Self {
        Self {
            id: pilot.id,
            user_id: pilot.user_id,
            license_number: pilot.license_number,
            phone_number: pilot.phone_number,
            sepl_valid_until: pilot.sepl_valid_until,
            medical_valid_until: pilot.medical_valid_until,
            is_active: pilot.is_active,
            created_at: pilot.created_at,
            updated_at: pilot.updated_at,
        }
    }
}

impl From<PilotModel> for Pilot {
    fn from(model: PilotModel) -> Self {
        Self {
            id: model.id,
            user_id: model.user_id,
            license_number: model.license_number,
            phone_number: model.phone_number,
            sepl_valid_until: model.sepl_valid_until,
            medical_valid_until: model.medical_valid_until,
            is_active: model.is_active,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input() -> PilotInput {
        PilotInput {
            license_number: "PL.FCL.42752.PPL(A)".to_string(),
            phone_number: "+48 608 163 560".to_string(),
            sepl_valid_until: None,
            medical_valid_until: None,
            is_active: true,
        }
    }

    #[test]
    fn test_new_pilot_validates() {
        let pilot = Pilot::new(Uuid::now_v7(), input());
        assert!(pilot.validate().is_ok());
        assert!(pilot.is_active);
    }

    #[test]
    fn test_validate_rejects_empty_license() {
        let mut bad = input();
        bad.license_number = "".to_string();
        let pilot = Pilot::new(Uuid::now_v7(), bad);
        let errors = pilot.validate().unwrap_err();
        assert_eq!(errors.0[0].field, "license_number");
    }
}
