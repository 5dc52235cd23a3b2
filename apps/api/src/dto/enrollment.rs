use chrono::{DateTime, Utc};
use coopra_core::TenantId;
use coopra_domain::Cooperative;
use serde::{Deserialize, Serialize};

/// Incoming payload for cooperative registration.
#[derive(Debug, Deserialize)]
pub struct CreateCooperativeRequest {
    pub name: String,
    pub description: String,
    pub location: String,
    pub contact_email: String,
    pub contact_phone: String,
}

/// Incoming payload for joining a cooperative by code.
#[derive(Debug, Deserialize)]
pub struct JoinCooperativeRequest {
    pub join_code: String,
}

/// API representation of a cooperative.
#[derive(Debug, Serialize)]
pub struct CooperativeResponse {
    pub id: TenantId,
    pub name: String,
    pub description: String,
    pub location: String,
    pub contact_email: String,
    pub contact_phone: String,
    pub join_code: String,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

impl From<Cooperative> for CooperativeResponse {
    fn from(cooperative: Cooperative) -> Self {
        Self {
            id: cooperative.id,
            name: cooperative.name,
            description: cooperative.description,
            location: cooperative.location,
            contact_email: cooperative.contact_email.as_str().to_owned(),
            contact_phone: cooperative.contact_phone,
            join_code: cooperative.join_code.as_str().to_owned(),
            is_active: cooperative.is_active,
            created_at: cooperative.created_at,
        }
    }
}
