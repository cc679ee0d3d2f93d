use chrono::{DateTime, Utc};
use diesel::prelude::*;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// Deliberately loose: one @, something on each side, a dot in the domain
static EMAIL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap());

pub fn is_valid_email(email: &str) -> bool {
    EMAIL_RE.is_match(email)
}

/// Account identity a pilot logs in with. License data lives on the Pilot
/// record; this model owns only authentication and the admin flag.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub is_admin: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    pub fn new(
        first_name: String,
        last_name: String,
        email: String,
        password_hash: String,
        is_admin: bool,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::now_v7(),
            first_name: first_name.trim().to_string(),
            last_name: last_name.trim().to_string(),
            email: email.trim().to_lowercase(),
            password_hash,
            is_admin,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }

    pub fn to_user_info(&self) -> UserInfo {
        UserInfo {
            id: self.id,
            first_name: self.first_name.clone(),
            last_name: self.last_name.clone(),
            email: self.email.clone(),
            is_admin: self.is_admin,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub token: String,
    pub user: UserInfo,
}

/// Public view of a user, safe to serialize in responses
#[derive(Debug, Serialize)]
pub struct UserInfo {
    pub id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub is_admin: bool,
}

impl From<User> for UserInfo {
    fn from(user: User) -> Self {
        user.to_user_info()
    }
}

/// Diesel model for the users table - used for database operations
#[derive(Debug, Clone, Queryable, Selectable, Insertable, AsChangeset, Serialize, Deserialize)]
#[diesel(table_name = crate::schema::users)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct UserModel {
    pub id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub password_hash: String,
    pub is_admin: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<User> for UserModel {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            first_name: user.first_name,
            last_name: user.last_name,
            email: user.email,
            password_hash: user.password_hash,
            is_admin: user.is_admin,
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}

impl From<UserModel> for User {
    fn from(model: UserModel) -> Self {
        Self {
            id: model.id,
            first_name: model.first_name,
            last_name: model.last_name,
            email: model.email,
            password_hash: model.password_hash,
            is_admin: model.is_admin,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_normalizes_email() {
        let user = User::new(
            "Jan".to_string(),
            "Kowalski".to_string(),
            " Jan.Kowalski@Example.COM ".to_string(),
            "hash".to_string(),
            false,
        );
        assert_eq!(user.email, "jan.kowalski@example.com");
        assert_eq!(user.full_name(), "Jan Kowalski");
    }

    #[test]
    fn test_user_info_hides_password_hash() {
        let user = User::new(
            "Jan".to_string(),
            "Kowalski".to_string(),
            "jan@example.com".to_string(),
            "hash".to_string(),
            true,
        );
        let serialized = serde_json::to_string(&user).unwrap();
        assert!(!serialized.contains("hash"));
        assert!(user.to_user_info().is_admin);
    }

    #[test]
    fn test_email_format() {
        assert!(is_valid_email("jan@example.com"));
        assert!(is_valid_email("jan.kowalski+pdt@aeroklub.org.pl"));
        assert!(!is_valid_email(""));
        assert!(!is_valid_email("jan"));
        assert!(!is_valid_email("jan@"));
        assert!(!is_valid_email("@example.com"));
        assert!(!is_valid_email("jan@example"));
        assert!(!is_valid_email("jan kowalski@example.com"));
    }
}
