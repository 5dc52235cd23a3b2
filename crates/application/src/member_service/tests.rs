use std::sync::Arc;

use coopra_core::{AppError, TenantId, UserIdentity};
use coopra_domain::{MemberRole, MemberStatus};

use super::{AddMemberInput, MemberService, UpdateMemberInput};
use crate::ledger_ports::MemberRepository;
use crate::test_support::FakeMembers;

fn identity(tenant_id: TenantId) -> UserIdentity {
    UserIdentity::new("auth0|ada", "Ada", None, tenant_id)
}

fn add_input(name: &str, email: &str) -> AddMemberInput {
    AddMemberInput {
        name: name.to_owned(),
        email: email.to_owned(),
        phone: "+2348012345678".to_owned(),
        role: MemberRole::Member,
        contribution_plan: 100.0,
    }
}

#[tokio::test]
async fn registered_member_starts_active_with_zero_total() {
    let members = Arc::new(FakeMembers::default());
    let service = MemberService::new(members);
    let identity = identity(TenantId::new());

    let member = service
        .add_member(&identity, add_input("Ada Obi", "ada@example.com"))
        .await;
    assert!(member.is_ok());
    if let Ok(member) = member {
        assert_eq!(member.status, MemberStatus::Active);
        assert_eq!(member.total_contributions, 0.0);
        assert_eq!(member.tenant_id, identity.tenant_id());
    }
}

#[tokio::test]
async fn duplicate_email_is_a_conflict() {
    let members = Arc::new(FakeMembers::default());
    let service = MemberService::new(members);
    let identity = identity(TenantId::new());

    let first = service
        .add_member(&identity, add_input("Ada Obi", "ada@example.com"))
        .await;
    assert!(first.is_ok());

    let second = service
        .add_member(&identity, add_input("Other Ada", "ada@example.com"))
        .await;
    assert!(matches!(second, Err(AppError::Conflict(_))));
}

#[tokio::test]
async fn members_are_invisible_across_cooperatives() {
    let members = Arc::new(FakeMembers::default());
    let service = MemberService::new(members);
    let here = identity(TenantId::new());
    let elsewhere = identity(TenantId::new());

    let member = service
        .add_member(&here, add_input("Ada Obi", "ada@example.com"))
        .await;
    assert!(member.is_ok());

    if let Ok(member) = member {
        let lookup = service.get_member(&elsewhere, member.id).await;
        assert!(matches!(lookup, Err(AppError::NotFound(_))));

        let listed = service.list_members(&elsewhere).await;
        assert_eq!(listed.map(|rows| rows.len()).ok(), Some(0));
    }
}

#[tokio::test]
async fn profile_update_replaces_fields_but_not_the_ledger() {
    let members = Arc::new(FakeMembers::default());
    let service = MemberService::new(members.clone());
    let identity = identity(TenantId::new());

    let member = service
        .add_member(&identity, add_input("Ada Obi", "ada@example.com"))
        .await;
    assert!(member.is_ok());

    if let Ok(member) = member {
        members
            .credit_contribution(identity.tenant_id(), member.id, 250.0)
            .await
            .ok();

        let updated = service
            .update_member(
                &identity,
                member.id,
                UpdateMemberInput {
                    name: "Ada A. Obi".to_owned(),
                    email: "ada@example.com".to_owned(),
                    phone: "+2348000000000".to_owned(),
                    role: MemberRole::Admin,
                    status: MemberStatus::Inactive,
                    contribution_plan: 150.0,
                },
            )
            .await;
        assert!(updated.is_ok());
        if let Ok(updated) = updated {
            assert_eq!(updated.name, "Ada A. Obi");
            assert_eq!(updated.role, MemberRole::Admin);
            assert_eq!(updated.status, MemberStatus::Inactive);
            assert_eq!(updated.total_contributions, 250.0);
        }
    }
}

#[tokio::test]
async fn negative_contribution_plan_is_rejected() {
    let members = Arc::new(FakeMembers::default());
    let service = MemberService::new(members);
    let identity = identity(TenantId::new());

    let mut input = add_input("Ada Obi", "ada@example.com");
    input.contribution_plan = -1.0;
    let member = service.add_member(&identity, input).await;
    assert!(matches!(member, Err(AppError::Validation(_))));
}
