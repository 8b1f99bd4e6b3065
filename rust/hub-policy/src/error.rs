use crate::{Capability, EntityType, PermissionId};

/// Errors raised while assembling a [`crate::PolicyRegistry`].
///
/// Access decisions never produce these; a denial is reported as a
/// [`crate::PermissionAccessResponse`] instead.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PolicyRegistryError {
    /// Two permission rules share an id.
    #[error("Permission {id} is registered more than once")]
    DuplicatePermission {
        /// The repeated id.
        id: PermissionId,
    },

    /// Two capability rules target the same capability of one entity type.
    #[error("Capability {capability} of {entity_type} is registered more than once")]
    DuplicateCapability {
        entity_type: EntityType,
        capability: Capability,
    },

    /// A capability rule lists no permissions.
    #[error("Capability {capability} of {entity_type} lists no permissions")]
    EmptyCapabilityRule {
        entity_type: EntityType,
        capability: Capability,
    },

    /// A rule set could not be parsed.
    #[error("Invalid rule set {name}: {message}")]
    InvalidRuleSet {
        /// Name of the rule set (file name for bundled tables).
        name: String,
        /// Parser diagnostic.
        message: String,
    },
}

impl PolicyRegistryError {
    pub(crate) fn invalid_rule_set(name: impl Into<String>, error: serde_json::Error) -> Self {
        Self::InvalidRuleSet {
            name: name.into(),
            message: error.to_string(),
        }
    }
}
