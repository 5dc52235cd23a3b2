//! Cooperative enrollment: tenant resolution, creation and joining.

use std::sync::Arc;

use chrono::Utc;
use coopra_core::{AppError, AppResult, Principal, TenantId};
use coopra_domain::{Cooperative, JOIN_CODE_SUFFIX_LENGTH, JoinCode};

use crate::tenancy_ports::{CooperativeRepository, SubjectDirectory};

/// Bounded number of join-code generation attempts before giving up.
pub const JOIN_CODE_ATTEMPTS: usize = 10;

/// Fields required to register a new cooperative.
#[derive(Debug, Clone)]
pub struct CreateCooperativeInput {
    /// Globally unique display name, at least 3 characters.
    pub name: String,
    /// Free-form description.
    pub description: String,
    /// Physical location.
    pub location: String,
    /// Public contact email.
    pub contact_email: String,
    /// Public contact phone.
    pub contact_phone: String,
}

/// Application service for cooperative enrollment.
///
/// This is the only component that turns an unscoped [`Principal`] into a
/// cooperative scope; everything downstream requires the resolved tenant.
#[derive(Clone)]
pub struct EnrollmentService {
    cooperatives: Arc<dyn CooperativeRepository>,
    subjects: Arc<dyn SubjectDirectory>,
}

impl EnrollmentService {
    /// Creates an enrollment service from its repositories.
    #[must_use]
    pub fn new(
        cooperatives: Arc<dyn CooperativeRepository>,
        subjects: Arc<dyn SubjectDirectory>,
    ) -> Self {
        Self {
            cooperatives,
            subjects,
        }
    }

    /// Returns the cooperative a subject belongs to, if any.
    pub async fn tenant_for_subject(&self, subject: &str) -> AppResult<Option<TenantId>> {
        self.subjects.tenant_for_subject(subject).await
    }

    /// Returns the caller's cooperative record.
    pub async fn cooperative_for(&self, principal: &Principal) -> AppResult<Cooperative> {
        let identity = principal.require_tenant()?;
        self.cooperatives
            .find(identity.tenant_id())
            .await?
            .ok_or_else(|| {
                AppError::NotFound(format!("cooperative '{}' not found", identity.tenant_id()))
            })
    }

    /// Registers a new cooperative managed by the caller.
    ///
    /// Only permitted for a principal with no cooperative attached and not
    /// already managing one. The join code is generated by retrying a random
    /// suffix against the uniqueness constraint up to
    /// [`JOIN_CODE_ATTEMPTS`] times.
    pub async fn create_cooperative(
        &self,
        principal: &Principal,
        input: CreateCooperativeInput,
    ) -> AppResult<Cooperative> {
        if self
            .subjects
            .tenant_for_subject(principal.subject())
            .await?
            .is_some()
        {
            return Err(AppError::AlreadyMember);
        }

        if self
            .cooperatives
            .find_by_manager(principal.subject())
            .await?
            .is_some()
        {
            return Err(AppError::AlreadyManages);
        }

        let join_code = self.generate_unique_join_code().await?;

        let cooperative = Cooperative::new(
            input.name,
            input.description,
            input.location,
            input.contact_email,
            input.contact_phone,
            principal.subject(),
            join_code,
            Utc::now(),
        )?;

        self.cooperatives.insert(cooperative.clone()).await?;
        self.subjects
            .attach_subject(cooperative.id, principal.subject())
            .await?;

        Ok(cooperative)
    }

    /// Joins the active cooperative matching a join code.
    ///
    /// Matching is case-insensitive on input; codes are stored uppercase.
    pub async fn join_cooperative(
        &self,
        principal: &Principal,
        join_code: &str,
    ) -> AppResult<Cooperative> {
        if self
            .subjects
            .tenant_for_subject(principal.subject())
            .await?
            .is_some()
        {
            return Err(AppError::AlreadyMember);
        }

        let join_code = JoinCode::parse(join_code)?;

        let cooperative = self
            .cooperatives
            .find_by_join_code(&join_code)
            .await?
            .ok_or_else(|| {
                AppError::Validation(
                    "invalid join code, please check the code and try again".to_owned(),
                )
            })?;

        if !cooperative.is_active {
            return Err(AppError::Validation(
                "this cooperative is no longer active".to_owned(),
            ));
        }

        self.subjects
            .attach_subject(cooperative.id, principal.subject())
            .await?;

        Ok(cooperative)
    }

    async fn generate_unique_join_code(&self) -> AppResult<JoinCode> {
        for _ in 0..JOIN_CODE_ATTEMPTS {
            let candidate = random_join_code()?;
            if !self.cooperatives.join_code_exists(&candidate).await? {
                return Ok(candidate);
            }
        }

        Err(AppError::JoinCodeExhausted)
    }
}

fn random_join_code() -> AppResult<JoinCode> {
    let mut bytes = [0u8; JOIN_CODE_SUFFIX_LENGTH];
    getrandom::fill(&mut bytes)
        .map_err(|error| AppError::Internal(format!("failed to gather entropy: {error}")))?;

    Ok(JoinCode::from_random_bytes(bytes))
}

#[cfg(test)]
mod tests;
