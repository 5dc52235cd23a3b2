use coopra_core::{Principal, TenantId};
use serde::{Deserialize, Serialize};

use super::CooperativeResponse;

/// Health response payload.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
}

/// Incoming payload for bootstrap-token login.
#[derive(Debug, Deserialize)]
pub struct SessionRequest {
    pub subject: String,
    pub token: String,
    pub display_name: Option<String>,
    pub email: Option<String>,
}

/// API representation of the authenticated caller.
#[derive(Debug, Serialize)]
pub struct PrincipalResponse {
    pub subject: String,
    pub display_name: String,
    pub email: Option<String>,
    pub tenant_id: Option<TenantId>,
    pub cooperative: Option<CooperativeResponse>,
}

impl PrincipalResponse {
    pub fn from_principal(principal: &Principal, cooperative: Option<CooperativeResponse>) -> Self {
        Self {
            subject: principal.subject().to_owned(),
            display_name: principal.display_name().to_owned(),
            email: principal.email().map(str::to_owned),
            tenant_id: principal.tenant_id(),
            cooperative,
        }
    }
}
