use std::collections::HashMap;

use crate::{
    Context, Entity, PermissionAccessResponse, PermissionId, PermissionPolicy, PolicyRegistry,
    ReasonCode, ResolverSettings,
};

/// Counters describing one top-level resolution.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ResolutionStats {
    /// Policies whose gates were evaluated.
    pub evaluated: usize,
    /// Lookups answered from the per-call cache.
    pub cache_hits: usize,
}

/// Resolves permission ids into access decisions.
///
/// Resolution walks the dependency graph depth first. Each top-level call
/// gets a fresh memo of finished results, so a dependency shared by many
/// permissions is evaluated once per call, and nothing is carried over to
/// the next call.
#[derive(Debug, Clone, Copy)]
pub struct PermissionResolver<'a> {
    registry: &'a PolicyRegistry,
    settings: &'a ResolverSettings,
}

impl<'a> PermissionResolver<'a> {
    pub fn new(registry: &'a PolicyRegistry, settings: &'a ResolverSettings) -> Self {
        Self { registry, settings }
    }

    /// Decide whether `id` is granted for the session and entity.
    pub fn resolve(
        &self,
        id: &PermissionId,
        context: &Context,
        entity: Option<&Entity>,
    ) -> PermissionAccessResponse {
        self.resolve_with_stats(id, context, entity).0
    }

    /// Like [`PermissionResolver::resolve`], also reporting how much work
    /// the call did.
    pub fn resolve_with_stats(
        &self,
        id: &PermissionId,
        context: &Context,
        entity: Option<&Entity>,
    ) -> (PermissionAccessResponse, ResolutionStats) {
        let mut resolution = Resolution {
            resolver: *self,
            context,
            entity,
            cache: HashMap::new(),
            stats: ResolutionStats::default(),
        };
        let response = resolution.resolve(id, &mut Vec::new());
        (response, resolution.stats)
    }
}

/// State of one top-level call.
struct Resolution<'a, 'c> {
    resolver: PermissionResolver<'a>,
    context: &'c Context,
    entity: Option<&'c Entity>,
    cache: HashMap<PermissionId, PermissionAccessResponse>,
    stats: ResolutionStats,
}

impl Resolution<'_, '_> {
    /// `path` holds the permissions currently being resolved, outermost
    /// first.
    fn resolve(
        &mut self,
        id: &PermissionId,
        path: &mut Vec<PermissionId>,
    ) -> PermissionAccessResponse {
        if path.contains(id) {
            tracing::warn!(permission = %id, path = ?path, "cyclic permission dependency");
            return PermissionAccessResponse::cyclic_dependency(id);
        }

        if let Some(cached) = self.cache.get(id) {
            tracing::trace!(permission = %id, "permission resolved from cache");
            self.stats.cache_hits += 1;
            return cached.clone();
        }

        let registry = self.resolver.registry;
        let response = match registry.permission(id.as_str()) {
            Some(policy) => {
                path.push(id.clone());
                let response = self.evaluate(policy, path);
                path.pop();
                response
            }
            None => {
                tracing::warn!(permission = %id, "unknown permission");
                PermissionAccessResponse::unknown_permission(id)
            }
        };

        if !response.access {
            tracing::debug!(permission = %id, code = %response.code, "permission denied");
        }
        self.cache.insert(id.clone(), response.clone());
        response
    }

    fn evaluate(
        &mut self,
        policy: &PermissionPolicy,
        path: &mut Vec<PermissionId>,
    ) -> PermissionAccessResponse {
        self.stats.evaluated += 1;

        if let Some(denial) = self.check_session(policy) {
            return denial;
        }

        for dependency in &policy.dependencies {
            let response = self.resolve(dependency, path);
            if !response.access {
                return response;
            }
        }

        if let Some(denial) = self.check_entity(policy) {
            return denial;
        }

        let id = &policy.id;
        if let Some(assertion) = policy
            .assertions
            .iter()
            .find(|assertion| !assertion.evaluate(self.context, self.entity))
        {
            return PermissionAccessResponse::denied(
                ReasonCode::AssertionFailed,
                format!("Permission {id} requires {assertion}."),
            );
        }

        PermissionAccessResponse::granted(id)
    }

    /// Gates that only look at the session: environment, feature stage,
    /// services, authentication, license and privileges, in that order.
    fn check_session(&self, policy: &PermissionPolicy) -> Option<PermissionAccessResponse> {
        let id = &policy.id;
        let context = self.context;

        if !policy.environments.is_empty() && !policy.environments.contains(&context.environment)
        {
            return Some(PermissionAccessResponse::denied(
                ReasonCode::UnavailableEnvironment,
                format!(
                    "Permission {id} is not available in the {} environment.",
                    context.environment
                ),
            ));
        }

        if !policy.availability.is_empty()
            && !policy
                .availability
                .iter()
                .any(|stage| self.resolver.settings.is_stage_enabled(*stage, context))
        {
            return Some(PermissionAccessResponse::denied(
                ReasonCode::UnavailableFeature,
                format!("Permission {id} is not enabled for this environment."),
            ));
        }

        if let Some(service) = policy
            .services
            .iter()
            .find(|service| !context.is_service_online(service))
        {
            return Some(PermissionAccessResponse::denied(
                ReasonCode::ServiceUnavailable,
                format!("Permission {id} requires the {service} service, which is not online."),
            ));
        }

        if policy.authenticated && !context.is_authenticated() {
            return Some(PermissionAccessResponse::denied(
                ReasonCode::NotAuthenticated,
                format!("Permission {id} requires a signed in user."),
            ));
        }

        if !policy.licenses.is_empty()
            && !context
                .license
                .is_some_and(|license| policy.licenses.contains(&license))
        {
            return Some(PermissionAccessResponse::denied(
                ReasonCode::InsufficientLicense,
                format!("Permission {id} is not included in the organization's license."),
            ));
        }

        if let Some(privilege) = policy.privileges.iter().find(|privilege| {
            !context
                .current_user
                .as_ref()
                .is_some_and(|user| user.has_privilege(privilege))
        }) {
            return Some(PermissionAccessResponse::denied(
                ReasonCode::InsufficientPrivilege,
                format!("Permission {id} requires the {privilege} privilege."),
            ));
        }

        None
    }

    fn check_entity(&self, policy: &PermissionPolicy) -> Option<PermissionAccessResponse> {
        let id = &policy.id;
        let missing = policy.required_rights().find(|right| {
            match (self.context.current_user.as_ref(), self.entity) {
                (Some(user), Some(entity)) => !right.is_held_by(user, entity),
                _ => true,
            }
        })?;

        Some(PermissionAccessResponse::denied(
            ReasonCode::NotAuthorized,
            format!("Permission {id} requires the right to {missing} the entity."),
        ))
    }
}
