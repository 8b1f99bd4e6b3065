use serde::{Deserialize, Serialize};

use crate::{Assertion, Availability, Environment, HubLicense, PermissionId};

/// Declarative rule describing when a permission is granted.
///
/// Every field other than `id` is a gate; an empty list or an unset flag
/// means the gate does not apply. Rules are plain data so that rule tables
/// can be shipped as JSON and compared in tests.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PermissionPolicy {
    pub id: PermissionId,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub dependencies: Vec<PermissionId>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub environments: Vec<Environment>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub availability: Vec<Availability>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub services: Vec<String>,
    #[serde(default, skip_serializing_if = "is_false")]
    pub authenticated: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub licenses: Vec<HubLicense>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub privileges: Vec<String>,
    #[serde(default, skip_serializing_if = "is_false")]
    pub entity_owner: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    pub entity_edit: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    pub entity_delete: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    pub entity_configurable: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub assertions: Vec<Assertion>,
}

fn is_false(value: &bool) -> bool {
    !*value
}

impl PermissionPolicy {
    /// Policy with no gates, always granted once registered.
    pub fn new(id: impl Into<PermissionId>) -> Self {
        Self {
            id: id.into(),
            ..Self::default()
        }
    }

    pub fn depends_on(mut self, dependency: impl Into<PermissionId>) -> Self {
        self.dependencies.push(dependency.into());
        self
    }

    pub fn in_environments(mut self, environments: impl IntoIterator<Item = Environment>) -> Self {
        self.environments.extend(environments);
        self
    }

    pub fn with_availability(mut self, stages: impl IntoIterator<Item = Availability>) -> Self {
        self.availability.extend(stages);
        self
    }

    pub fn requires_service(mut self, service: impl Into<String>) -> Self {
        self.services.push(service.into());
        self
    }

    pub fn requires_authentication(mut self) -> Self {
        self.authenticated = true;
        self
    }

    pub fn with_licenses(mut self, licenses: impl IntoIterator<Item = HubLicense>) -> Self {
        self.licenses.extend(licenses);
        self
    }

    pub fn requires_privilege(mut self, privilege: impl Into<String>) -> Self {
        self.privileges.push(privilege.into());
        self
    }

    pub fn requires_owner(mut self) -> Self {
        self.entity_owner = true;
        self
    }

    pub fn requires_edit(mut self) -> Self {
        self.entity_edit = true;
        self
    }

    pub fn requires_delete(mut self) -> Self {
        self.entity_delete = true;
        self
    }

    pub fn requires_configurable(mut self) -> Self {
        self.entity_configurable = true;
        self
    }

    pub fn with_assertion(mut self, assertion: Assertion) -> Self {
        self.assertions.push(assertion);
        self
    }
}
