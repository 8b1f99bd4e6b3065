//! Capability decisions for entity workspaces.
//!
//! A capability is granted when its owner switch on the entity is on and
//! every permission its rule lists resolves to access. The owner switch is
//! checked first and short-circuits the permission checks entirely.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{
    Capability, CapabilityAccessResponse, CapabilityPolicy, Context, Entity,
    PermissionAccessResponse, PermissionResolver, PolicyRegistry, ReasonCode, ResolverSettings,
};

/// Capability summary of one entity.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkspaceCapabilities {
    /// Capabilities the current session may use
    pub granted: Vec<Capability>,
    /// Every evaluated capability, in rule registration order
    pub details: Vec<CapabilityAccessResponse>,
}

impl WorkspaceCapabilities {
    pub fn is_granted(&self, capability: Capability) -> bool {
        self.granted.contains(&capability)
    }

    /// Decision recorded for `capability`, if a rule exists for it.
    pub fn detail(&self, capability: Capability) -> Option<&CapabilityAccessResponse> {
        self.details
            .iter()
            .find(|detail| detail.capability == capability.as_str())
    }
}

/// Evaluates capability rules against entities.
#[derive(Debug, Clone, Copy)]
pub struct CapabilityResolver<'a> {
    registry: &'a PolicyRegistry,
    permissions: PermissionResolver<'a>,
}

impl<'a> CapabilityResolver<'a> {
    pub fn new(registry: &'a PolicyRegistry, settings: &'a ResolverSettings) -> Self {
        Self {
            registry,
            permissions: PermissionResolver::new(registry, settings),
        }
    }

    /// Decide whether `rule` is available on `entity` for the session.
    ///
    /// The reported code and message come from the last permission of the
    /// rule, unless some permission was denied, in which case they come
    /// from the first denial. `responses` always carries every permission
    /// decision in rule order.
    pub fn check_capability_access(
        &self,
        rule: &CapabilityPolicy,
        context: &Context,
        entity: &Entity,
    ) -> CapabilityAccessResponse {
        let capability = rule.capability;

        if !entity.capabilities.is_enabled(capability) {
            debug!(
                capability = capability.as_str(),
                entity = %entity.id,
                "capability disabled by owner"
            );
            return CapabilityAccessResponse::rejected(
                capability,
                ReasonCode::Disabled,
                format!(
                    "Owner {} has disabled {capability} capability.",
                    entity.owner
                ),
            );
        }

        let responses: Vec<PermissionAccessResponse> = rule
            .permissions
            .iter()
            .map(|id| self.permissions.resolve(id, context, Some(entity)))
            .collect();

        let access = responses.iter().all(|response| response.access);
        let reported = if access {
            responses.last()
        } else {
            responses.iter().find(|response| !response.access)
        };

        let Some(reported) = reported.cloned() else {
            // Registered rules always list permissions; hand-built ones may not.
            return CapabilityAccessResponse::rejected(
                capability,
                ReasonCode::InvalidCapability,
                format!(
                    "Capability {capability} of {} lists no permissions.",
                    rule.entity_type
                ),
            );
        };

        debug!(
            capability = capability.as_str(),
            entity = %entity.id,
            access,
            code = %reported.code,
            "capability evaluated"
        );

        CapabilityAccessResponse {
            capability: capability.into(),
            decision: reported,
            responses,
        }
    }

    /// Evaluate every capability rule registered for the entity's type.
    pub fn get_workspace_capabilities(
        &self,
        entity: &Entity,
        context: &Context,
    ) -> WorkspaceCapabilities {
        let mut workspace = WorkspaceCapabilities::default();
        for rule in self.registry.capability_rules(entity.entity_type) {
            let response = self.check_capability_access(rule, context, entity);
            if response.access() {
                workspace.granted.push(rule.capability);
            }
            workspace.details.push(response);
        }
        workspace
    }

    /// Check a capability by name against the rule of the entity's type.
    #[deprecated(note = "look the rule up and use `check_capability_access`")]
    pub fn check_capability(
        &self,
        capability: &str,
        entity: &Entity,
        context: &Context,
    ) -> CapabilityAccessResponse {
        let Ok(parsed) = capability.parse::<Capability>() else {
            debug!(capability, "unrecognized capability");
            return CapabilityAccessResponse {
                capability: capability.to_string(),
                decision: PermissionAccessResponse {
                    access: false,
                    code: ReasonCode::Disabled,
                    response: ReasonCode::InvalidCapability.category(),
                    message: format!("Capability {capability} is not recognized."),
                },
                responses: Vec::new(),
            };
        };

        match self.registry.capability_rule(entity.entity_type, parsed) {
            Some(rule) => self.check_capability_access(rule, context, entity),
            None => CapabilityAccessResponse::rejected(
                parsed,
                ReasonCode::Disabled,
                format!(
                    "Capability {parsed} is not available for {}.",
                    entity.entity_type
                ),
            ),
        }
    }
}

#[cfg(test)]
#[allow(deprecated)]
mod tests {
    use super::*;
    use crate::{CurrentUser, EntityCapabilities, EntityType, PermissionPolicy, ResponseCategory};
    use pretty_assertions::assert_eq;
    use testresult::TestResult;

    fn registry() -> Result<PolicyRegistry, crate::PolicyRegistryError> {
        PolicyRegistry::builder()
            .register([
                PermissionPolicy::new("hub:project:view"),
                PermissionPolicy::new("hub:project:edit")
                    .requires_authentication()
                    .requires_edit(),
                PermissionPolicy::new("hub:project:delete")
                    .requires_authentication()
                    .requires_delete(),
                PermissionPolicy::new("hub:project:manage")
                    .requires_authentication()
                    .requires_privilege("portal:admin:updateItems"),
            ])
            .register_capabilities([
                CapabilityPolicy::new(
                    EntityType::HubProject,
                    Capability::Details,
                    ["hub:project:view"],
                ),
                CapabilityPolicy::new(
                    EntityType::HubProject,
                    Capability::Settings,
                    ["hub:project:edit"],
                ),
                CapabilityPolicy::new(
                    EntityType::HubProject,
                    Capability::Collaborators,
                    ["hub:project:edit", "hub:project:manage", "hub:project:delete"],
                ),
            ])
            .build()
    }

    fn project() -> Entity {
        Entity::new("p-1", EntityType::HubProject, "casey").with_raw_capabilities(
            EntityCapabilities::new()
                .with("details", true)
                .with("settings", true)
                .with("collaborators", true),
        )
    }

    fn owner() -> Context {
        Context::authenticated(CurrentUser::new("casey"))
    }

    #[test]
    fn it_refuses_disabled_capabilities_without_evaluating() -> TestResult {
        let registry = registry()?;
        let settings = ResolverSettings::default();
        let resolver = CapabilityResolver::new(&registry, &settings);
        let entity =
            project().with_raw_capabilities(EntityCapabilities::new().with("details", false));

        let rule = registry
            .capability_rule(EntityType::HubProject, Capability::Details)
            .ok_or("missing rule")?;
        let response = resolver.check_capability_access(rule, &owner(), &entity);

        assert!(!response.access());
        assert_eq!(response.code(), ReasonCode::Disabled);
        assert_eq!(response.decision.response, ResponseCategory::NotAvailable);
        assert_eq!(
            response.decision.message,
            "Owner casey has disabled details capability."
        );
        assert!(response.responses.is_empty());
        Ok(())
    }

    #[test]
    fn it_reports_the_last_response_when_granted() -> TestResult {
        let registry = registry()?;
        let settings = ResolverSettings::default();
        let resolver = CapabilityResolver::new(&registry, &settings);
        let context = Context::authenticated(
            CurrentUser::new("casey").with_privilege("portal:admin:updateItems"),
        );

        let rule = registry
            .capability_rule(EntityType::HubProject, Capability::Collaborators)
            .ok_or("missing rule")?;
        let response = resolver.check_capability_access(rule, &context, &project());

        assert!(response.access());
        assert_eq!(response.responses.len(), 3);
        assert_eq!(response.decision, response.responses[2]);
        Ok(())
    }

    #[test]
    fn it_reports_the_first_failure_when_denied() -> TestResult {
        let registry = registry()?;
        let settings = ResolverSettings::default();
        let resolver = CapabilityResolver::new(&registry, &settings);
        // Not the owner: edit and delete fail, manage fails on privilege.
        let context = Context::authenticated(CurrentUser::new("jordan"));

        let rule = registry
            .capability_rule(EntityType::HubProject, Capability::Collaborators)
            .ok_or("missing rule")?;
        let response = resolver.check_capability_access(rule, &context, &project());

        assert!(!response.access());
        assert_eq!(response.code(), ReasonCode::NotAuthorized);
        assert_eq!(response.decision, response.responses[0]);
        assert_eq!(
            response.responses[1].code,
            ReasonCode::InsufficientPrivilege
        );
        Ok(())
    }

    #[test]
    fn it_partitions_workspace_capabilities() -> TestResult {
        let registry = registry()?;
        let settings = ResolverSettings::default();
        let resolver = CapabilityResolver::new(&registry, &settings);

        let workspace = resolver.get_workspace_capabilities(&project(), &Context::anonymous());

        assert_eq!(workspace.granted, vec![Capability::Details]);
        assert_eq!(workspace.details.len(), 3);
        assert_eq!(
            workspace
                .detail(Capability::Settings)
                .map(CapabilityAccessResponse::code),
            Some(ReasonCode::NotAuthenticated)
        );
        Ok(())
    }

    #[test]
    fn it_rejects_unknown_capability_names() -> TestResult {
        let registry = registry()?;
        let settings = ResolverSettings::default();
        let resolver = CapabilityResolver::new(&registry, &settings);

        let response = resolver.check_capability("workspace", &project(), &owner());
        assert_eq!(response.capability, "workspace");
        assert_eq!(response.code(), ReasonCode::Disabled);
        assert_eq!(response.decision.response, ResponseCategory::InvalidCapability);

        let response = resolver.check_capability("events", &project(), &owner());
        assert_eq!(response.code(), ReasonCode::Disabled);
        assert_eq!(response.decision.response, ResponseCategory::NotAvailable);

        let response = resolver.check_capability("settings", &project(), &owner());
        assert!(response.access());
        Ok(())
    }

    #[test]
    fn it_fails_closed_on_rules_without_permissions() -> TestResult {
        let registry = PolicyRegistry::builder().build()?;
        let settings = ResolverSettings::default();
        let resolver = CapabilityResolver::new(&registry, &settings);
        let rule = CapabilityPolicy::new(
            EntityType::HubProject,
            Capability::Settings,
            Vec::<&str>::new(),
        );

        let response = resolver.check_capability_access(&rule, &owner(), &project());
        assert!(!response.access());
        assert_eq!(response.code(), ReasonCode::InvalidCapability);
        Ok(())
    }
}
