use crate::{
    CapabilityAccessResponse, CapabilityPolicy, CapabilityResolver, Context, Entity,
    PermissionAccessResponse, PermissionId, PermissionResolver, PolicyRegistry,
    PolicyRegistryError, ResolverSettings, WorkspaceCapabilities,
};

/// Owns a registry and the settings used to resolve against it.
///
/// The engine is immutable once built and can be shared between threads by
/// reference.
#[derive(Debug, Clone)]
pub struct PolicyEngine {
    registry: PolicyRegistry,
    settings: ResolverSettings,
}

impl PolicyEngine {
    pub fn new(registry: PolicyRegistry) -> Self {
        Self {
            registry,
            settings: ResolverSettings::default(),
        }
    }

    /// Engine over the bundled rule tables with default settings.
    pub fn builtin() -> Result<Self, PolicyRegistryError> {
        Ok(Self::new(PolicyRegistry::builtin()?))
    }

    pub fn with_settings(mut self, settings: ResolverSettings) -> Self {
        self.settings = settings;
        self
    }

    pub fn registry(&self) -> &PolicyRegistry {
        &self.registry
    }

    pub fn settings(&self) -> &ResolverSettings {
        &self.settings
    }

    pub fn permissions(&self) -> PermissionResolver<'_> {
        PermissionResolver::new(&self.registry, &self.settings)
    }

    pub fn capabilities(&self) -> CapabilityResolver<'_> {
        CapabilityResolver::new(&self.registry, &self.settings)
    }

    pub fn resolve(
        &self,
        id: impl Into<PermissionId>,
        context: &Context,
        entity: Option<&Entity>,
    ) -> PermissionAccessResponse {
        self.permissions().resolve(&id.into(), context, entity)
    }

    pub fn check_capability_access(
        &self,
        rule: &CapabilityPolicy,
        context: &Context,
        entity: &Entity,
    ) -> CapabilityAccessResponse {
        self.capabilities()
            .check_capability_access(rule, context, entity)
    }

    pub fn get_workspace_capabilities(
        &self,
        entity: &Entity,
        context: &Context,
    ) -> WorkspaceCapabilities {
        self.capabilities()
            .get_workspace_capabilities(entity, context)
    }

    #[deprecated(note = "look the rule up and use `check_capability_access`")]
    #[allow(deprecated)]
    pub fn check_capability(
        &self,
        capability: &str,
        entity: &Entity,
        context: &Context,
    ) -> CapabilityAccessResponse {
        self.capabilities()
            .check_capability(capability, entity, context)
    }
}
