use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use coopra_core::{AppError, AppResult, Principal, TenantId};
use coopra_domain::{Cooperative, JoinCode};
use tokio::sync::Mutex;

use super::{CreateCooperativeInput, EnrollmentService};
use crate::tenancy_ports::{CooperativeRepository, SubjectDirectory};

#[derive(Default)]
struct FakeDirectory {
    cooperatives: Mutex<HashMap<TenantId, Cooperative>>,
    subjects: Mutex<HashMap<String, TenantId>>,
    saturate_join_codes: bool,
}

impl FakeDirectory {
    fn new() -> Self {
        Self::default()
    }

    fn saturated() -> Self {
        Self {
            saturate_join_codes: true,
            ..Self::default()
        }
    }
}

#[async_trait]
impl CooperativeRepository for FakeDirectory {
    async fn insert(&self, cooperative: Cooperative) -> AppResult<()> {
        let mut cooperatives = self.cooperatives.lock().await;

        if cooperatives
            .values()
            .any(|existing| existing.name == cooperative.name)
        {
            return Err(AppError::Conflict(format!(
                "a cooperative named '{}' already exists",
                cooperative.name
            )));
        }

        if cooperatives
            .values()
            .any(|existing| existing.manager_subject == cooperative.manager_subject)
        {
            return Err(AppError::AlreadyManages);
        }

        cooperatives.insert(cooperative.id, cooperative);
        Ok(())
    }

    async fn find(&self, tenant_id: TenantId) -> AppResult<Option<Cooperative>> {
        Ok(self.cooperatives.lock().await.get(&tenant_id).cloned())
    }

    async fn find_by_join_code(&self, join_code: &JoinCode) -> AppResult<Option<Cooperative>> {
        Ok(self
            .cooperatives
            .lock()
            .await
            .values()
            .find(|cooperative| &cooperative.join_code == join_code)
            .cloned())
    }

    async fn find_by_manager(&self, subject: &str) -> AppResult<Option<Cooperative>> {
        Ok(self
            .cooperatives
            .lock()
            .await
            .values()
            .find(|cooperative| cooperative.manager_subject == subject)
            .cloned())
    }

    async fn join_code_exists(&self, join_code: &JoinCode) -> AppResult<bool> {
        if self.saturate_join_codes {
            return Ok(true);
        }

        Ok(self
            .cooperatives
            .lock()
            .await
            .values()
            .any(|cooperative| &cooperative.join_code == join_code))
    }
}

#[async_trait]
impl SubjectDirectory for FakeDirectory {
    async fn tenant_for_subject(&self, subject: &str) -> AppResult<Option<TenantId>> {
        Ok(self.subjects.lock().await.get(subject).copied())
    }

    async fn attach_subject(&self, tenant_id: TenantId, subject: &str) -> AppResult<()> {
        let mut subjects = self.subjects.lock().await;
        if subjects.contains_key(subject) {
            return Err(AppError::AlreadyMember);
        }

        subjects.insert(subject.to_owned(), tenant_id);
        Ok(())
    }
}

fn service_with(directory: Arc<FakeDirectory>) -> EnrollmentService {
    EnrollmentService::new(directory.clone(), directory)
}

fn principal(subject: &str) -> Principal {
    Principal::new(subject, subject, None, None)
}

fn create_input(name: &str) -> CreateCooperativeInput {
    CreateCooperativeInput {
        name: name.to_owned(),
        description: "Village savings group".to_owned(),
        location: "Kumasi".to_owned(),
        contact_email: "hello@example.org".to_owned(),
        contact_phone: "+233201234567".to_owned(),
    }
}

#[tokio::test]
async fn creating_a_cooperative_attaches_the_manager() {
    let directory = Arc::new(FakeDirectory::new());
    let service = service_with(directory.clone());

    let created = service
        .create_cooperative(&principal("auth0|ada"), create_input("Unity Farmers"))
        .await;
    assert!(created.is_ok());

    if let Ok(cooperative) = created {
        assert!(cooperative.is_active);
        assert!(cooperative.join_code.as_str().starts_with("COOP-"));

        let attached = directory.tenant_for_subject("auth0|ada").await;
        assert_eq!(attached.ok().flatten(), Some(cooperative.id));
    }
}

#[tokio::test]
async fn a_subject_with_a_cooperative_cannot_create_another() {
    let directory = Arc::new(FakeDirectory::new());
    let service = service_with(directory);

    let first = service
        .create_cooperative(&principal("auth0|ada"), create_input("Unity Farmers"))
        .await;
    assert!(first.is_ok());

    let second = service
        .create_cooperative(&principal("auth0|ada"), create_input("Second Group"))
        .await;
    assert!(matches!(second, Err(AppError::AlreadyMember)));
}

#[tokio::test]
async fn short_cooperative_name_is_rejected() {
    let directory = Arc::new(FakeDirectory::new());
    let service = service_with(directory);

    let created = service
        .create_cooperative(&principal("auth0|ada"), create_input("Ab"))
        .await;
    assert!(matches!(created, Err(AppError::Validation(_))));
}

#[tokio::test]
async fn join_code_generation_gives_up_after_bounded_attempts() {
    let directory = Arc::new(FakeDirectory::saturated());
    let service = service_with(directory);

    let created = service
        .create_cooperative(&principal("auth0|ada"), create_input("Unity Farmers"))
        .await;
    assert!(matches!(created, Err(AppError::JoinCodeExhausted)));
}

#[tokio::test]
async fn lowercase_join_code_resolves_the_stored_cooperative() {
    let directory = Arc::new(FakeDirectory::new());
    let service = service_with(directory.clone());

    let created = service
        .create_cooperative(&principal("auth0|ada"), create_input("Unity Farmers"))
        .await;
    assert!(created.is_ok());

    if let Ok(cooperative) = created {
        let lowered = cooperative.join_code.as_str().to_lowercase();
        let joined = service
            .join_cooperative(&principal("auth0|grace"), &lowered)
            .await;
        assert_eq!(joined.map(|value| value.id).ok(), Some(cooperative.id));
    }
}

#[tokio::test]
async fn unknown_join_code_is_rejected() {
    let directory = Arc::new(FakeDirectory::new());
    let service = service_with(directory);

    let joined = service
        .join_cooperative(&principal("auth0|grace"), "COOP-ZZZZZZ")
        .await;
    assert!(matches!(joined, Err(AppError::Validation(_))));
}

#[tokio::test]
async fn inactive_cooperative_cannot_be_joined() {
    let directory = Arc::new(FakeDirectory::new());
    let service = service_with(directory.clone());

    let created = service
        .create_cooperative(&principal("auth0|ada"), create_input("Unity Farmers"))
        .await;
    assert!(created.is_ok());

    if let Ok(cooperative) = created {
        if let Some(stored) = directory
            .cooperatives
            .lock()
            .await
            .get_mut(&cooperative.id)
        {
            stored.is_active = false;
        }

        let joined = service
            .join_cooperative(&principal("auth0|grace"), cooperative.join_code.as_str())
            .await;
        assert!(matches!(joined, Err(AppError::Validation(_))));
    }
}

#[tokio::test]
async fn an_attached_subject_cannot_join_again() {
    let directory = Arc::new(FakeDirectory::new());
    let service = service_with(directory);

    let created = service
        .create_cooperative(&principal("auth0|ada"), create_input("Unity Farmers"))
        .await;
    assert!(created.is_ok());

    if let Ok(cooperative) = created {
        let joined = service
            .join_cooperative(&principal("auth0|ada"), cooperative.join_code.as_str())
            .await;
        assert!(matches!(joined, Err(AppError::AlreadyMember)));
    }
}

#[tokio::test]
async fn unattached_principal_resolves_to_no_tenant() {
    let directory = Arc::new(FakeDirectory::new());
    let service = service_with(directory);

    let resolved = service.cooperative_for(&principal("auth0|ada")).await;
    assert!(matches!(resolved, Err(AppError::NoTenant)));
}

#[tokio::test]
async fn created_at_is_set_on_registration() {
    let directory = Arc::new(FakeDirectory::new());
    let service = service_with(directory);

    let before = Utc::now();
    let created = service
        .create_cooperative(&principal("auth0|ada"), create_input("Unity Farmers"))
        .await;
    assert!(created.is_ok());
    if let Ok(cooperative) = created {
        assert!(cooperative.created_at >= before);
    }
}
