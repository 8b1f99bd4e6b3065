use std::collections::{BTreeMap, HashMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::{
    Capability, CapabilityPolicy, EntityCapabilities, EntityType, PermissionPolicy,
    PolicyRegistryError, process_entity_capabilities,
};

static NO_CAPABILITIES: EntityCapabilities = EntityCapabilities::empty();

/// Rules contributed by one module, usually one entity type.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RuleSet {
    /// Entity type `default_capabilities` belong to.
    #[serde(default)]
    pub entity_type: Option<EntityType>,
    #[serde(default)]
    pub default_capabilities: EntityCapabilities,
    #[serde(default)]
    pub permissions: Vec<PermissionPolicy>,
    #[serde(default)]
    pub capabilities: Vec<CapabilityPolicy>,
}

impl RuleSet {
    /// Parse a rule set from its JSON form. `name` only labels errors.
    pub fn from_json(name: &str, json: &str) -> Result<Self, PolicyRegistryError> {
        serde_json::from_str(json)
            .map_err(|error| PolicyRegistryError::invalid_rule_set(name, error))
    }
}

/// Accumulates rules from any number of modules before freezing them into a
/// [`PolicyRegistry`].
#[derive(Debug, Default)]
pub struct RegistryBuilder {
    permissions: Vec<PermissionPolicy>,
    capabilities: Vec<CapabilityPolicy>,
    defaults: BTreeMap<EntityType, EntityCapabilities>,
}

impl RegistryBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add permission rules.
    pub fn register(mut self, policies: impl IntoIterator<Item = PermissionPolicy>) -> Self {
        self.permissions.extend(policies);
        self
    }

    /// Add capability rules.
    pub fn register_capabilities(
        mut self,
        rules: impl IntoIterator<Item = CapabilityPolicy>,
    ) -> Self {
        self.capabilities.extend(rules);
        self
    }

    /// Declare the default capability set of an entity type. Later
    /// declarations for the same type extend earlier ones.
    pub fn register_defaults(
        mut self,
        entity_type: EntityType,
        defaults: &EntityCapabilities,
    ) -> Self {
        let entry = self.defaults.entry(entity_type).or_default();
        for (name, enabled) in defaults.iter() {
            entry.set(name, enabled);
        }
        self
    }

    /// Add everything a rule set declares.
    pub fn register_rule_set(self, rule_set: RuleSet) -> Self {
        let RuleSet {
            entity_type,
            default_capabilities,
            permissions,
            capabilities,
        } = rule_set;

        let builder = match entity_type {
            Some(entity_type) => self.register_defaults(entity_type, &default_capabilities),
            None => self,
        };
        builder.register(permissions).register_capabilities(capabilities)
    }

    /// Parse and add a JSON rule set.
    pub fn register_json(self, name: &str, json: &str) -> Result<Self, PolicyRegistryError> {
        Ok(self.register_rule_set(RuleSet::from_json(name, json)?))
    }

    /// Freeze the rules. Fails on duplicate ids, duplicate capability rules
    /// and capability rules without permissions; the dependency graph itself
    /// is not validated here.
    pub fn build(self) -> Result<PolicyRegistry, PolicyRegistryError> {
        let mut index = HashMap::with_capacity(self.permissions.len());
        for (position, policy) in self.permissions.iter().enumerate() {
            if index.insert(policy.id.clone(), position).is_some() {
                return Err(PolicyRegistryError::DuplicatePermission {
                    id: policy.id.clone(),
                });
            }
        }

        let mut seen = HashSet::with_capacity(self.capabilities.len());
        for rule in &self.capabilities {
            if rule.permissions.is_empty() {
                return Err(PolicyRegistryError::EmptyCapabilityRule {
                    entity_type: rule.entity_type,
                    capability: rule.capability,
                });
            }
            if !seen.insert((rule.entity_type, rule.capability)) {
                return Err(PolicyRegistryError::DuplicateCapability {
                    entity_type: rule.entity_type,
                    capability: rule.capability,
                });
            }
        }

        tracing::debug!(
            permissions = self.permissions.len(),
            capabilities = self.capabilities.len(),
            "built policy registry"
        );

        Ok(PolicyRegistry {
            permissions: self.permissions,
            index,
            capabilities: self.capabilities,
            defaults: self.defaults,
        })
    }
}

/// Immutable, id-indexed collection of permission and capability rules.
#[derive(Debug, Clone)]
pub struct PolicyRegistry {
    permissions: Vec<PermissionPolicy>,
    index: HashMap<crate::PermissionId, usize>,
    capabilities: Vec<CapabilityPolicy>,
    defaults: BTreeMap<EntityType, EntityCapabilities>,
}

impl PolicyRegistry {
    pub fn builder() -> RegistryBuilder {
        RegistryBuilder::new()
    }

    /// Permission rule registered under `id`.
    pub fn permission(&self, id: &str) -> Option<&PermissionPolicy> {
        self.index.get(id).map(|position| &self.permissions[*position])
    }

    /// All permission rules in registration order.
    pub fn permissions(&self) -> impl Iterator<Item = &PermissionPolicy> {
        self.permissions.iter()
    }

    /// Capability rules declared for `entity_type`, in registration order.
    pub fn capability_rules(
        &self,
        entity_type: EntityType,
    ) -> impl Iterator<Item = &CapabilityPolicy> {
        self.capabilities
            .iter()
            .filter(move |rule| rule.entity_type == entity_type)
    }

    /// The rule for one capability of one entity type.
    pub fn capability_rule(
        &self,
        entity_type: EntityType,
        capability: Capability,
    ) -> Option<&CapabilityPolicy> {
        self.capability_rules(entity_type)
            .find(|rule| rule.capability == capability)
    }

    /// Default capability set of `entity_type`; empty when none was declared.
    pub fn default_capabilities(&self, entity_type: EntityType) -> &EntityCapabilities {
        self.defaults.get(&entity_type).unwrap_or(&NO_CAPABILITIES)
    }

    /// Sanitize owner overrides against the defaults of `entity_type`.
    pub fn entity_capabilities(
        &self,
        entity_type: EntityType,
        overrides: &EntityCapabilities,
    ) -> EntityCapabilities {
        process_entity_capabilities(overrides, self.default_capabilities(entity_type))
    }

    pub fn len(&self) -> usize {
        self.permissions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.permissions.is_empty()
    }
}
