use hub_policy::{
    Assertion, Context, CurrentUser, Entity, EntityType, Environment, HubLicense, Operator,
    PermissionId, PermissionPolicy, PermissionResolver, PolicyEngine, PolicyRegistry,
    PolicyRegistryError, ReasonCode, ResolverSettings, ResponseCategory, ServiceStatus,
};
use pretty_assertions::assert_eq;
use serde_json::json;
use testresult::TestResult;

fn engine(
    policies: impl IntoIterator<Item = PermissionPolicy>,
) -> Result<PolicyEngine, PolicyRegistryError> {
    Ok(PolicyEngine::new(
        PolicyRegistry::builder().register(policies).build()?,
    ))
}

#[test]
fn it_grants_permissions_without_gates() -> TestResult {
    let engine = engine([PermissionPolicy::new("hub:site:view")])?;
    let response = engine.resolve("hub:site:view", &Context::anonymous(), None);

    assert!(response.access);
    assert_eq!(response.code, ReasonCode::Granted);
    assert_eq!(response.response, ResponseCategory::Granted);
    assert_eq!(response.message, "Permission hub:site:view is granted.");
    Ok(())
}

#[test]
fn it_surfaces_the_root_cause_through_dependency_chains() -> TestResult {
    let engine = engine([
        PermissionPolicy::new("a").depends_on("b"),
        PermissionPolicy::new("b").depends_on("c"),
        PermissionPolicy::new("c").requires_service("discussions"),
    ])?;
    let context = Context::anonymous().with_service("discussions", ServiceStatus::Offline);

    let root = engine.resolve("c", &context, None);
    let response = engine.resolve("a", &context, None);

    assert_eq!(response.code, ReasonCode::ServiceUnavailable);
    assert_eq!(response, root);
    Ok(())
}

#[test_log::test]
fn it_terminates_on_dependency_cycles() -> TestResult {
    let engine = engine([
        PermissionPolicy::new("a").depends_on("b"),
        PermissionPolicy::new("b").depends_on("a"),
    ])?;

    let response = engine.resolve("a", &Context::anonymous(), None);
    assert!(!response.access);
    assert_eq!(response.code, ReasonCode::CyclicDependency);
    assert_eq!(response.response, ResponseCategory::InvalidPolicy);
    Ok(())
}

#[test_log::test]
fn it_denies_unknown_permissions() -> TestResult {
    let engine = engine([PermissionPolicy::new("a").depends_on("missing")])?;

    let direct = engine.resolve("nope", &Context::anonymous(), None);
    assert_eq!(direct.code, ReasonCode::UnknownPermission);
    assert_eq!(direct.response, ResponseCategory::InvalidPermission);

    let indirect = engine.resolve("a", &Context::anonymous(), None);
    assert_eq!(indirect.code, ReasonCode::UnknownPermission);
    Ok(())
}

#[test]
fn it_checks_session_gates_before_dependencies() -> TestResult {
    let engine = engine([
        PermissionPolicy::new("hub:feature:broken").depends_on("hub:feature:missing"),
        PermissionPolicy::new("hub:project:create")
            .depends_on("hub:feature:broken")
            .requires_authentication(),
    ])?;

    let response = engine.resolve("hub:project:create", &Context::anonymous(), None);
    assert_eq!(response.code, ReasonCode::NotAuthenticated);
    Ok(())
}

#[test]
fn it_applies_environment_license_and_privilege_gates() -> TestResult {
    let engine = engine([PermissionPolicy::new("hub:site:create")
        .in_environments([Environment::Production, Environment::Enterprise])
        .requires_authentication()
        .with_licenses([HubLicense::HubPremium])
        .requires_privilege("portal:user:createItem")])?;
    let user = CurrentUser::new("casey");

    let devext = Context::authenticated(user.clone()).with_environment(Environment::Devext);
    assert_eq!(
        engine.resolve("hub:site:create", &devext, None).code,
        ReasonCode::UnavailableEnvironment
    );

    let basic = Context::authenticated(user.clone()).with_license(HubLicense::HubBasic);
    assert_eq!(
        engine.resolve("hub:site:create", &basic, None).code,
        ReasonCode::InsufficientLicense
    );

    let premium = Context::authenticated(user.clone()).with_license(HubLicense::HubPremium);
    let response = engine.resolve("hub:site:create", &premium, None);
    assert_eq!(response.code, ReasonCode::InsufficientPrivilege);
    assert_eq!(response.response, ResponseCategory::PrivilegeRequired);

    let publisher = Context::authenticated(user.with_privilege("portal:user:createItem"))
        .with_license(HubLicense::HubPremium);
    assert!(engine.resolve("hub:site:create", &publisher, None).access);
    Ok(())
}

#[test]
fn it_evaluates_entity_assertions_with_references() -> TestResult {
    let engine = engine([PermissionPolicy::new("hub:project:shareToOrg")
        .requires_authentication()
        .with_assertion(Assertion::new(
            "entity:orgId",
            Operator::Eq,
            json!("context:currentUser.orgId"),
        ))])?;
    let project = Entity::new("p-1", EntityType::HubProject, "casey").with_org("org-1");

    let member = Context::authenticated(CurrentUser::new("jordan").with_org("org-1"));
    assert!(engine.resolve("hub:project:shareToOrg", &member, Some(&project)).access);

    let outsider = Context::authenticated(CurrentUser::new("riley").with_org("org-2"));
    let response = engine.resolve("hub:project:shareToOrg", &outsider, Some(&project));
    assert_eq!(response.code, ReasonCode::AssertionFailed);
    assert_eq!(
        response.message,
        "Permission hub:project:shareToOrg requires entity:orgId eq \"context:currentUser.orgId\"."
    );
    Ok(())
}

#[test]
fn it_evaluates_shared_dependencies_once_per_call() -> TestResult {
    let registry = PolicyRegistry::builder()
        .register([
            PermissionPolicy::new("hub:project:workspace")
                .depends_on("hub:project:edit")
                .depends_on("hub:project:view"),
            PermissionPolicy::new("hub:project:edit").depends_on("hub:project"),
            PermissionPolicy::new("hub:project:view").depends_on("hub:project"),
            PermissionPolicy::new("hub:project"),
        ])
        .build()?;
    let settings = ResolverSettings::default();
    let resolver = PermissionResolver::new(&registry, &settings);
    let id = PermissionId::from("hub:project:workspace");

    let (response, stats) = resolver.resolve_with_stats(&id, &Context::anonymous(), None);
    assert!(response.access);
    assert_eq!(stats.evaluated, 4);
    assert_eq!(stats.cache_hits, 1);

    let (_, again) = resolver.resolve_with_stats(&id, &Context::anonymous(), None);
    assert_eq!(again, stats);
    Ok(())
}
