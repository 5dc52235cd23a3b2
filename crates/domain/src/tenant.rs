//! Cooperative (tenant) entity and join-code rules.

use std::fmt::{Display, Formatter};

use chrono::{DateTime, Utc};
use coopra_core::{AppError, AppResult, TenantId};
use serde::{Deserialize, Serialize};

use crate::email::EmailAddress;

/// Number of random characters after the `COOP-` prefix.
pub const JOIN_CODE_SUFFIX_LENGTH: usize = 6;

const JOIN_CODE_PREFIX: &str = "COOP-";
const JOIN_CODE_ALPHABET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

/// Self-service enrollment code, stored and matched uppercase.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct JoinCode(String);

impl JoinCode {
    /// Parses caller input into a join code.
    ///
    /// Matching is case-insensitive on input: the value is trimmed and
    /// uppercased before the format check.
    pub fn parse(value: impl Into<String>) -> AppResult<Self> {
        let value = value.into();
        let normalized = value.trim().to_uppercase();

        let suffix = normalized.strip_prefix(JOIN_CODE_PREFIX).ok_or_else(|| {
            AppError::Validation("invalid join code, please check the code and try again".to_owned())
        })?;

        if suffix.len() != JOIN_CODE_SUFFIX_LENGTH
            || !suffix.bytes().all(|byte| JOIN_CODE_ALPHABET.contains(&byte))
        {
            return Err(AppError::Validation(
                "invalid join code, please check the code and try again".to_owned(),
            ));
        }

        Ok(Self(normalized))
    }

    /// Builds a join code from one random byte per suffix character.
    ///
    /// Each byte indexes the uppercase alphanumeric alphabet, so any source of
    /// entropy produces a well-formed code.
    #[must_use]
    pub fn from_random_bytes(bytes: [u8; JOIN_CODE_SUFFIX_LENGTH]) -> Self {
        let mut code = String::from(JOIN_CODE_PREFIX);
        for byte in bytes {
            let index = usize::from(byte) % JOIN_CODE_ALPHABET.len();
            code.push(char::from(JOIN_CODE_ALPHABET[index]));
        }

        Self(code)
    }

    /// Returns the canonical uppercase code.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl Display for JoinCode {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        write!(formatter, "{}", self.0)
    }
}

/// A cooperative: the unit of tenancy for every other record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Cooperative {
    /// Tenant identifier.
    pub id: TenantId,
    /// Globally unique display name.
    pub name: String,
    /// Free-form description shown during enrollment.
    pub description: String,
    /// Physical location.
    pub location: String,
    /// Public contact email.
    pub contact_email: EmailAddress,
    /// Public contact phone.
    pub contact_phone: String,
    /// Subject of the single managing user.
    pub manager_subject: String,
    /// Enrollment code.
    pub join_code: JoinCode,
    /// Soft-deactivation flag; cooperatives are never hard-deleted.
    pub is_active: bool,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}

impl Cooperative {
    /// Creates a cooperative after validating its registration fields.
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        location: impl Into<String>,
        contact_email: impl Into<String>,
        contact_phone: impl Into<String>,
        manager_subject: impl Into<String>,
        join_code: JoinCode,
        now: DateTime<Utc>,
    ) -> AppResult<Self> {
        let name = name.into().trim().to_owned();
        let description = description.into().trim().to_owned();
        let location = location.into().trim().to_owned();
        let contact_phone = contact_phone.into().trim().to_owned();

        if name.len() < 3 {
            return Err(AppError::Validation(
                "cooperative name must be at least 3 characters long".to_owned(),
            ));
        }

        if description.is_empty() || location.is_empty() || contact_phone.is_empty() {
            return Err(AppError::Validation(
                "description, location and contact phone are required".to_owned(),
            ));
        }

        Ok(Self {
            id: TenantId::new(),
            name,
            description,
            location,
            contact_email: EmailAddress::new(contact_email)?,
            contact_phone,
            manager_subject: manager_subject.into(),
            join_code,
            is_active: true,
            created_at: now,
        })
    }
}
