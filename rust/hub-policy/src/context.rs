use std::collections::BTreeMap;
use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::selector::leaf;
use crate::Lookup;

/// Deployment environment the caller runs in.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    Devext,
    Qaext,
    #[default]
    Production,
    Enterprise,
}

impl Display for Environment {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Environment::Devext => "devext",
            Environment::Qaext => "qaext",
            Environment::Production => "production",
            Environment::Enterprise => "enterprise",
        })
    }
}

/// Release stage of a feature.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Availability {
    Alpha,
    Beta,
    General,
}

/// License tier of the organization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum HubLicense {
    HubBasic,
    HubPremium,
    EnterpriseSites,
}

/// Reported status of a backend service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ServiceStatus {
    Online,
    Offline,
    NotAvailable,
}

/// Role of a user within their organization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrgRole {
    OrgAdmin,
    OrgPublisher,
    OrgUser,
}

/// Group capability that lets members update items shared with the group.
pub const UPDATE_ITEM_CONTROL: &str = "updateitemcontrol";

/// A group the current user belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserGroup {
    pub id: String,
    #[serde(default)]
    pub capabilities: Vec<String>,
}

impl UserGroup {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            capabilities: Vec::new(),
        }
    }

    pub fn with_capability(mut self, capability: impl Into<String>) -> Self {
        self.capabilities.push(capability.into());
        self
    }

    /// Whether membership allows updating items shared with this group.
    pub fn can_update_items(&self) -> bool {
        self.capabilities.iter().any(|c| c == UPDATE_ITEM_CONTROL)
    }
}

/// The signed in user of a session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CurrentUser {
    pub username: String,
    #[serde(default)]
    pub org_id: Option<String>,
    #[serde(default)]
    pub role: Option<OrgRole>,
    #[serde(default)]
    pub privileges: Vec<String>,
    #[serde(default)]
    pub groups: Vec<UserGroup>,
}

impl CurrentUser {
    pub fn new(username: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            org_id: None,
            role: None,
            privileges: Vec::new(),
            groups: Vec::new(),
        }
    }

    pub fn with_org(mut self, org_id: impl Into<String>) -> Self {
        self.org_id = Some(org_id.into());
        self
    }

    pub fn with_role(mut self, role: OrgRole) -> Self {
        self.role = Some(role);
        self
    }

    pub fn with_privilege(mut self, privilege: impl Into<String>) -> Self {
        self.privileges.push(privilege.into());
        self
    }

    pub fn with_group(mut self, group: UserGroup) -> Self {
        self.groups.push(group);
        self
    }

    pub fn has_privilege(&self, privilege: &str) -> bool {
        self.privileges.iter().any(|p| p == privilege)
    }

    /// Org admin of the given organization.
    pub fn is_org_admin_of(&self, org_id: Option<&str>) -> bool {
        self.role == Some(OrgRole::OrgAdmin)
            && org_id.is_some()
            && self.org_id.as_deref() == org_id
    }
}

impl Lookup for CurrentUser {
    fn lookup(&self, path: &[&str]) -> Option<Value> {
        let Some((field, rest)) = path.split_first() else {
            return serde_json::to_value(self).ok();
        };
        match *field {
            "username" => leaf(Value::from(self.username.as_str()), rest),
            "orgId" => leaf(Value::from(self.org_id.clone()?), rest),
            "role" => leaf(serde_json::to_value(self.role?).ok()?, rest),
            "privileges" => leaf(Value::from(self.privileges.clone()), rest),
            "groups" => serde_json::to_value(&self.groups).ok()?.lookup(rest),
            "groupIds" => leaf(
                self.groups
                    .iter()
                    .map(|group| Value::from(group.id.as_str()))
                    .collect(),
                rest,
            ),
            _ => None,
        }
    }
}

/// Read-only snapshot of the session a decision is made for.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Context {
    #[serde(default)]
    pub current_user: Option<CurrentUser>,
    #[serde(default)]
    pub org_id: Option<String>,
    #[serde(default)]
    pub license: Option<HubLicense>,
    #[serde(default)]
    pub services: BTreeMap<String, ServiceStatus>,
    #[serde(default)]
    pub environment: Environment,
    /// Feature stages the organization opted into on top of the ones the
    /// environment enables.
    #[serde(default)]
    pub feature_stages: Vec<Availability>,
}

impl Context {
    /// Session without a signed in user.
    pub fn anonymous() -> Self {
        Self::default()
    }

    /// Session for `user`, scoped to the user's organization.
    pub fn authenticated(user: CurrentUser) -> Self {
        Self {
            org_id: user.org_id.clone(),
            current_user: Some(user),
            ..Self::default()
        }
    }

    pub fn with_org(mut self, org_id: impl Into<String>) -> Self {
        self.org_id = Some(org_id.into());
        self
    }

    pub fn with_license(mut self, license: HubLicense) -> Self {
        self.license = Some(license);
        self
    }

    pub fn with_service(mut self, name: impl Into<String>, status: ServiceStatus) -> Self {
        self.services.insert(name.into(), status);
        self
    }

    pub fn with_environment(mut self, environment: Environment) -> Self {
        self.environment = environment;
        self
    }

    pub fn with_feature_stage(mut self, stage: Availability) -> Self {
        self.feature_stages.push(stage);
        self
    }

    pub fn is_authenticated(&self) -> bool {
        self.current_user.is_some()
    }

    /// Whether `service` is reported online. Unknown services are offline.
    pub fn is_service_online(&self, service: &str) -> bool {
        self.services.get(service) == Some(&ServiceStatus::Online)
    }
}

impl Lookup for Context {
    fn lookup(&self, path: &[&str]) -> Option<Value> {
        let Some((field, rest)) = path.split_first() else {
            return serde_json::to_value(self).ok();
        };
        match *field {
            "isAuthenticated" => leaf(Value::Bool(self.is_authenticated()), rest),
            "currentUser" => self.current_user.as_ref()?.lookup(rest),
            "orgId" => leaf(Value::from(self.org_id.clone()?), rest),
            "license" | "hubLicense" => leaf(serde_json::to_value(self.license?).ok()?, rest),
            "environment" => leaf(serde_json::to_value(self.environment).ok()?, rest),
            "services" => serde_json::to_value(&self.services).ok()?.lookup(rest),
            "featureStages" => leaf(serde_json::to_value(&self.feature_stages).ok()?, rest),
            _ => None,
        }
    }
}
