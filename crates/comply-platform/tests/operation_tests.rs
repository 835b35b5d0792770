//! End-to-end use-case tests over the in-memory store: the full
//! authorize -> validate -> execute-in-transaction path, including audit
//! records and rollback on commit failure.

use std::sync::Arc;

use comply_platform::answer::entity::AnswerStatus;
use comply_platform::answer::operations::{SubmitAnswer, SubmitAnswerCommand};
use comply_platform::audit::entity::{AuditAction, AuditRecord};
use comply_platform::framework::entity::{Category, Framework, FrameworkVersion};
use comply_platform::framework::operations::{
    AddClause, AddClauseCommand, AddVersion, AddVersionCommand, CreateFramework,
    CreateFrameworkCommand, DeleteFramework, DeleteFrameworkCommand, UpdateFramework,
    UpdateFrameworkCommand,
};
use comply_platform::identity::entity::permissions;
use comply_platform::identity::operations::{CreateUser, CreateUserCommand};
use comply_platform::organization::operations::{
    AddDepartment, AddDepartmentCommand, AddMember, AddMemberCommand, CreateOrganization,
    CreateOrganizationCommand,
};
use comply_platform::store::{MemStore, Store};
use comply_platform::usecase::Entity;
use comply_platform::{PlatformError, Principal, UnitOfWork};

fn admin() -> Principal {
    Principal::authenticated(42, "admin")
        .with_permissions(permissions::frameworks::ALL.iter().copied())
        .with_permissions(permissions::organizations::ALL.iter().copied())
        .with_permissions(permissions::identity::ALL.iter().copied())
        .with_permissions(permissions::answers::ALL.iter().copied())
}

fn viewer() -> Principal {
    Principal::authenticated(7, "viewer").with_permissions([permissions::frameworks::VIEW])
}

fn create_command(name: &str) -> CreateFrameworkCommand {
    CreateFrameworkCommand {
        code: "ISO-27001".to_string(),
        name: name.to_string(),
        description: None,
    }
}

async fn audit_records(store: &MemStore) -> Vec<AuditRecord> {
    store
        .scan(AuditRecord::FAMILY)
        .await
        .unwrap()
        .into_iter()
        .map(|doc| serde_json::from_value(doc).unwrap())
        .collect()
}

#[tokio::test]
async fn test_create_framework_persists_row_and_audit() {
    let store = Arc::new(MemStore::new());
    let op = CreateFramework::new(store.clone());

    let framework = op
        .execute(&admin(), create_command("ISO 27001"))
        .await
        .unwrap();
    assert_eq!(framework.code, "ISO-27001");
    assert_eq!(store.count(Framework::FAMILY), 1);

    let audits = audit_records(&store).await;
    assert_eq!(audits.len(), 1);
    assert_eq!(audits[0].action, AuditAction::Create);
    assert_eq!(audits[0].entity_name, Framework::NAME);
    assert_eq!(audits[0].entity_key, framework.id);
    assert_eq!(audits[0].actor_user_id, Some(42));
}

#[tokio::test]
async fn test_create_framework_forbidden_without_permission() {
    let store = Arc::new(MemStore::new());
    let op = CreateFramework::new(store.clone());

    let err = op
        .execute(&viewer(), create_command("ISO 27001"))
        .await
        .unwrap_err();
    assert!(matches!(err, PlatformError::Forbidden { .. }));

    // Authorization runs before anything is written.
    assert_eq!(store.count(Framework::FAMILY), 0);
    assert_eq!(store.count(AuditRecord::FAMILY), 0);
}

#[tokio::test]
async fn test_create_framework_unauthenticated_is_unauthorized() {
    let store = Arc::new(MemStore::new());
    let op = CreateFramework::new(store.clone());

    let err = op
        .execute(&Principal::anonymous(), create_command("ISO 27001"))
        .await
        .unwrap_err();
    assert!(matches!(err, PlatformError::Unauthorized { .. }));
}

#[tokio::test]
async fn test_create_framework_short_name_fails_validation() {
    let store = Arc::new(MemStore::new());
    let op = CreateFramework::new(store.clone());

    let err = op.execute(&admin(), create_command("AB")).await.unwrap_err();
    match err {
        PlatformError::Validation { failures } => {
            assert_eq!(failures.len(), 1);
            assert_eq!(failures[0].field, "name");
        }
        other => panic!("expected validation error, got {other:?}"),
    }
    assert_eq!(store.count(Framework::FAMILY), 0);
}

#[tokio::test]
async fn test_create_framework_duplicate_code_conflicts() {
    let store = Arc::new(MemStore::new());
    let op = CreateFramework::new(store.clone());

    op.execute(&admin(), create_command("ISO 27001")).await.unwrap();
    let err = op
        .execute(&admin(), create_command("ISO 27001 again"))
        .await
        .unwrap_err();

    assert!(matches!(err, PlatformError::AlreadyExists { .. }));
    assert_eq!(store.count(Framework::FAMILY), 1);
    assert_eq!(store.count(AuditRecord::FAMILY), 1);
}

#[tokio::test]
async fn test_commit_failure_leaves_no_partial_state() {
    let store = Arc::new(MemStore::new());
    let op = CreateFramework::new(store.clone());

    store.fail_next_commit();
    let err = op
        .execute(&admin(), create_command("ISO 27001"))
        .await
        .unwrap_err();

    assert!(matches!(err, PlatformError::Infrastructure { .. }));
    assert_eq!(store.count(Framework::FAMILY), 0);
    assert_eq!(store.count(AuditRecord::FAMILY), 0);
}

#[tokio::test]
async fn test_update_framework_audits_update() {
    let store = Arc::new(MemStore::new());
    let created = CreateFramework::new(store.clone())
        .execute(&admin(), create_command("ISO 27001"))
        .await
        .unwrap();

    let updated = UpdateFramework::new(store.clone())
        .execute(
            &admin(),
            UpdateFrameworkCommand {
                framework_id: created.id.clone(),
                name: "ISO 27001:2022".to_string(),
                description: Some("Information security".to_string()),
            },
        )
        .await
        .unwrap();
    assert_eq!(updated.name, "ISO 27001:2022");

    let audits = audit_records(&store).await;
    assert_eq!(audits.len(), 2);
    assert!(audits.iter().any(|a| a.action == AuditAction::Update));
}

#[tokio::test]
async fn test_delete_framework_with_versions_is_rejected() {
    let store = Arc::new(MemStore::new());
    let principal = admin();
    let created = CreateFramework::new(store.clone())
        .execute(&principal, create_command("ISO 27001"))
        .await
        .unwrap();
    AddVersion::new(store.clone())
        .execute(
            &principal,
            AddVersionCommand {
                framework_id: created.id.clone(),
                label: "2022".to_string(),
                effective_from: None,
            },
        )
        .await
        .unwrap();

    let err = DeleteFramework::new(store.clone())
        .execute(
            &principal,
            DeleteFrameworkCommand {
                framework_id: created.id.clone(),
            },
        )
        .await
        .unwrap_err();

    assert!(matches!(err, PlatformError::BadRequest { .. }));
    assert_eq!(store.count(Framework::FAMILY), 1);
}

#[tokio::test]
async fn test_delete_framework_audits_delete() {
    let store = Arc::new(MemStore::new());
    let principal = admin();
    let created = CreateFramework::new(store.clone())
        .execute(&principal, create_command("ISO 27001"))
        .await
        .unwrap();

    DeleteFramework::new(store.clone())
        .execute(
            &principal,
            DeleteFrameworkCommand {
                framework_id: created.id.clone(),
            },
        )
        .await
        .unwrap();

    assert_eq!(store.count(Framework::FAMILY), 0);
    let audits = audit_records(&store).await;
    assert_eq!(audits.len(), 2);
    assert!(audits.iter().any(|a| a.action == AuditAction::Delete));
}

#[tokio::test]
async fn test_add_clause_writes_clause_and_checklist_atomically() {
    let store = Arc::new(MemStore::new());
    let principal = admin();
    let framework = CreateFramework::new(store.clone())
        .execute(&principal, create_command("ISO 27001"))
        .await
        .unwrap();
    let version = AddVersion::new(store.clone())
        .execute(
            &principal,
            AddVersionCommand {
                framework_id: framework.id.clone(),
                label: "2022".to_string(),
                effective_from: None,
            },
        )
        .await
        .unwrap();

    // Category seeded directly; there is no public category operation.
    let category = seed_category(&store, &principal, &version).await;

    let clause = AddClause::new(store.clone())
        .execute(
            &principal,
            AddClauseCommand {
                version_id: version.id.clone(),
                category_id: category.id.clone(),
                reference: "A.5.1".to_string(),
                title: "Policies for information security".to_string(),
                text: "Policies shall be defined and approved.".to_string(),
                checklist: vec!["Policy exists".to_string(), "Policy approved".to_string()],
            },
        )
        .await
        .unwrap();

    assert_eq!(store.count("clauses"), 1);
    assert_eq!(store.count("check_lists"), 2);

    // One audit record per staged entity, all in the same commit.
    let audits = audit_records(&store).await;
    assert!(audits
        .iter()
        .any(|a| a.entity_name == "Clause" && a.entity_key == clause.id));
    assert_eq!(audits.iter().filter(|a| a.entity_name == "CheckList").count(), 2);
}

#[tokio::test]
async fn test_add_clause_commit_failure_leaves_no_clause_or_checklist_rows() {
    let store = Arc::new(MemStore::new());
    let principal = admin();
    let framework = CreateFramework::new(store.clone())
        .execute(&principal, create_command("ISO 27001"))
        .await
        .unwrap();
    let version = AddVersion::new(store.clone())
        .execute(
            &principal,
            AddVersionCommand {
                framework_id: framework.id.clone(),
                label: "2022".to_string(),
                effective_from: None,
            },
        )
        .await
        .unwrap();
    let category = seed_category(&store, &principal, &version).await;
    let audits_before = store.count(AuditRecord::FAMILY);

    store.fail_next_commit();
    let err = AddClause::new(store.clone())
        .execute(
            &principal,
            AddClauseCommand {
                version_id: version.id.clone(),
                category_id: category.id.clone(),
                reference: "A.5.1".to_string(),
                title: "Policies for information security".to_string(),
                text: "Policies shall be defined and approved.".to_string(),
                checklist: vec!["Policy exists".to_string(), "Policy approved".to_string()],
            },
        )
        .await
        .unwrap_err();

    // The clause, both checklist items, and their audit records were staged
    // in one transaction; none of them survive the failed commit.
    assert!(matches!(err, PlatformError::Infrastructure { .. }));
    assert_eq!(store.count("clauses"), 0);
    assert_eq!(store.count("check_lists"), 0);
    assert_eq!(store.count(AuditRecord::FAMILY), audits_before);
}

#[tokio::test]
async fn test_add_clause_rejects_category_from_other_version() {
    let store = Arc::new(MemStore::new());
    let principal = admin();
    let framework = CreateFramework::new(store.clone())
        .execute(&principal, create_command("ISO 27001"))
        .await
        .unwrap();
    let add_version = AddVersion::new(store.clone());
    let v1 = add_version
        .execute(
            &principal,
            AddVersionCommand {
                framework_id: framework.id.clone(),
                label: "2013".to_string(),
                effective_from: None,
            },
        )
        .await
        .unwrap();
    let v2 = add_version
        .execute(
            &principal,
            AddVersionCommand {
                framework_id: framework.id.clone(),
                label: "2022".to_string(),
                effective_from: None,
            },
        )
        .await
        .unwrap();
    let category_of_v1 = seed_category(&store, &principal, &v1).await;

    let err = AddClause::new(store.clone())
        .execute(
            &principal,
            AddClauseCommand {
                version_id: v2.id.clone(),
                category_id: category_of_v1.id.clone(),
                reference: "A.5.1".to_string(),
                title: "Policies".to_string(),
                text: "Text".to_string(),
                checklist: vec![],
            },
        )
        .await
        .unwrap_err();

    assert!(matches!(err, PlatformError::BadRequest { .. }));
    assert_eq!(store.count("clauses"), 0);
}

#[tokio::test]
async fn test_organization_membership_flow() {
    let store = Arc::new(MemStore::new());
    let principal = admin();

    let organization = CreateOrganization::new(store.clone())
        .execute(
            &principal,
            CreateOrganizationCommand {
                registration_code: "12345678".to_string(),
                name: "Acme Corp".to_string(),
            },
        )
        .await
        .unwrap();
    let department = AddDepartment::new(store.clone())
        .execute(
            &principal,
            AddDepartmentCommand {
                organization_id: organization.id.clone(),
                name: "Security".to_string(),
            },
        )
        .await
        .unwrap();
    let user = CreateUser::new(store.clone())
        .execute(
            &principal,
            CreateUserCommand {
                email: "ada@example.com".to_string(),
                display_name: "Ada".to_string(),
            },
        )
        .await
        .unwrap();

    let membership = AddMember::new(store.clone())
        .execute(
            &principal,
            AddMemberCommand {
                organization_id: organization.id.clone(),
                user_id: user.id.clone(),
                department_id: Some(department.id.clone()),
            },
        )
        .await
        .unwrap();
    assert_eq!(membership.department_id.as_deref(), Some(department.id.as_str()));

    // Same user cannot be added twice.
    let err = AddMember::new(store.clone())
        .execute(
            &principal,
            AddMemberCommand {
                organization_id: organization.id.clone(),
                user_id: user.id.clone(),
                department_id: None,
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, PlatformError::AlreadyExists { .. }));
    assert_eq!(store.count("memberships"), 1);
}

#[tokio::test]
async fn test_add_member_rejects_department_of_other_organization() {
    let store = Arc::new(MemStore::new());
    let principal = admin();
    let create_org = CreateOrganization::new(store.clone());

    let org_a = create_org
        .execute(
            &principal,
            CreateOrganizationCommand {
                registration_code: "11111111".to_string(),
                name: "Org A".to_string(),
            },
        )
        .await
        .unwrap();
    let org_b = create_org
        .execute(
            &principal,
            CreateOrganizationCommand {
                registration_code: "22222222".to_string(),
                name: "Org B".to_string(),
            },
        )
        .await
        .unwrap();
    let dept_b = AddDepartment::new(store.clone())
        .execute(
            &principal,
            AddDepartmentCommand {
                organization_id: org_b.id.clone(),
                name: "Security".to_string(),
            },
        )
        .await
        .unwrap();
    let user = CreateUser::new(store.clone())
        .execute(
            &principal,
            CreateUserCommand {
                email: "ada@example.com".to_string(),
                display_name: "Ada".to_string(),
            },
        )
        .await
        .unwrap();

    let err = AddMember::new(store.clone())
        .execute(
            &principal,
            AddMemberCommand {
                organization_id: org_a.id.clone(),
                user_id: user.id.clone(),
                department_id: Some(dept_b.id.clone()),
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, PlatformError::BadRequest { .. }));
}

#[tokio::test]
async fn test_submit_answer_creates_then_updates() {
    let store = Arc::new(MemStore::new());
    let principal = admin();

    let organization = CreateOrganization::new(store.clone())
        .execute(
            &principal,
            CreateOrganizationCommand {
                registration_code: "12345678".to_string(),
                name: "Acme Corp".to_string(),
            },
        )
        .await
        .unwrap();
    let clause = seed_clause(&store, &principal).await;

    let submit = SubmitAnswer::new(store.clone());
    let first = submit
        .execute(
            &principal,
            SubmitAnswerCommand {
                organization_id: organization.id.clone(),
                clause_id: clause.clone(),
                status: "NON_COMPLIANT".to_string(),
                note: None,
            },
        )
        .await
        .unwrap();
    assert_eq!(first.status, AnswerStatus::NonCompliant);

    let second = submit
        .execute(
            &principal,
            SubmitAnswerCommand {
                organization_id: organization.id.clone(),
                clause_id: clause.clone(),
                status: "COMPLIANT".to_string(),
                note: Some("Remediated".to_string()),
            },
        )
        .await
        .unwrap();
    assert_eq!(second.id, first.id);
    assert_eq!(second.status, AnswerStatus::Compliant);
    assert_eq!(store.count("answers"), 1);
}

#[tokio::test]
async fn test_submit_answer_unknown_status_fails_validation() {
    let store = Arc::new(MemStore::new());

    let err = SubmitAnswer::new(store.clone())
        .execute(
            &admin(),
            SubmitAnswerCommand {
                organization_id: "org".to_string(),
                clause_id: "clause".to_string(),
                status: "MAYBE".to_string(),
                note: None,
            },
        )
        .await
        .unwrap_err();

    match err {
        PlatformError::Validation { failures } => {
            assert_eq!(failures.len(), 1);
            assert_eq!(failures[0].field, "status");
        }
        other => panic!("expected validation error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_audit_trail_queryable_per_entity() {
    let store = Arc::new(MemStore::new());
    let principal = admin();
    let created = CreateFramework::new(store.clone())
        .execute(&principal, create_command("ISO 27001"))
        .await
        .unwrap();
    UpdateFramework::new(store.clone())
        .execute(
            &principal,
            UpdateFrameworkCommand {
                framework_id: created.id.clone(),
                name: "ISO 27001:2022".to_string(),
                description: None,
            },
        )
        .await
        .unwrap();

    let mut uow = UnitOfWork::new(store.clone(), principal);
    let trail = uow
        .audits()
        .for_entity(Framework::NAME, &created.id)
        .await
        .unwrap();

    assert_eq!(trail.len(), 2);
    assert_eq!(trail[0].action, AuditAction::Create);
    assert_eq!(trail[1].action, AuditAction::Update);
}

// Helpers that seed entities without a dedicated use case.

async fn seed_category(
    store: &Arc<MemStore>,
    principal: &Principal,
    version: &FrameworkVersion,
) -> Category {
    let mut uow = UnitOfWork::new(store.clone() as Arc<dyn Store>, principal.clone());
    uow.begin_transaction().await.unwrap();
    let category = Category::new(version.id.clone(), "A.5", "Organizational controls", 0);
    uow.categories().create(&category).await.unwrap();
    uow.complete().await.unwrap();
    uow.commit_transaction().await.unwrap();
    category
}

async fn seed_clause(store: &Arc<MemStore>, principal: &Principal) -> String {
    let framework = CreateFramework::new(store.clone())
        .execute(principal, create_command("ISO 27001"))
        .await
        .unwrap();
    let version = AddVersion::new(store.clone())
        .execute(
            principal,
            AddVersionCommand {
                framework_id: framework.id.clone(),
                label: "2022".to_string(),
                effective_from: None,
            },
        )
        .await
        .unwrap();
    let category = seed_category(store, principal, &version).await;
    let clause = AddClause::new(store.clone())
        .execute(
            principal,
            AddClauseCommand {
                version_id: version.id.clone(),
                category_id: category.id.clone(),
                reference: "A.5.1".to_string(),
                title: "Policies for information security".to_string(),
                text: "Policies shall be defined and approved.".to_string(),
                checklist: vec![],
            },
        )
        .await
        .unwrap();
    clause.id
}
