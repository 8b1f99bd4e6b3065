use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::selector::leaf;
use crate::{EntityCapabilities, Lookup, PolicyRegistry};

/// Kind of domain entity a rule set applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum EntityType {
    #[serde(rename = "Hub Project")]
    HubProject,
    #[serde(rename = "Hub Site Application")]
    HubSite,
    #[serde(rename = "Hub Initiative")]
    HubInitiative,
    #[serde(rename = "Hub Page")]
    HubPage,
    #[serde(rename = "Hub Content")]
    Content,
    #[serde(rename = "Group")]
    Group,
}

impl EntityType {
    /// Every entity type known to the engine.
    pub const ALL: [EntityType; 6] = [
        EntityType::HubProject,
        EntityType::HubSite,
        EntityType::HubInitiative,
        EntityType::HubPage,
        EntityType::Content,
        EntityType::Group,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            EntityType::HubProject => "Hub Project",
            EntityType::HubSite => "Hub Site Application",
            EntityType::HubInitiative => "Hub Initiative",
            EntityType::HubPage => "Hub Page",
            EntityType::Content => "Hub Content",
            EntityType::Group => "Group",
        }
    }
}

impl Display for EntityType {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for EntityType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        EntityType::ALL
            .into_iter()
            .find(|entity_type| entity_type.as_str() == s)
            .ok_or_else(|| format!("Unknown entity type: {s}"))
    }
}

/// Item-level control the current user was granted on the entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemControl {
    Admin,
    Update,
}

/// A domain entity as seen by the policy engine.
///
/// Only the fields rules reason about are typed; anything else the caller
/// wants assertions to see goes into `properties`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Entity {
    pub id: String,
    #[serde(rename = "type")]
    pub entity_type: EntityType,
    pub owner: String,
    #[serde(default)]
    pub org_id: Option<String>,
    #[serde(default)]
    pub item_control: Option<ItemControl>,
    #[serde(default)]
    pub group_ids: Vec<String>,
    /// Group whose members collaborate on this entity.
    #[serde(default)]
    pub collaboration_group_id: Option<String>,
    #[serde(default)]
    pub type_keywords: Vec<String>,
    #[serde(default)]
    pub access: Option<String>,
    #[serde(default)]
    pub capabilities: EntityCapabilities,
    #[serde(default)]
    pub properties: Map<String, Value>,
}

impl Entity {
    pub fn new(id: impl Into<String>, entity_type: EntityType, owner: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            entity_type,
            owner: owner.into(),
            org_id: None,
            item_control: None,
            group_ids: Vec::new(),
            collaboration_group_id: None,
            type_keywords: Vec::new(),
            access: None,
            capabilities: EntityCapabilities::default(),
            properties: Map::new(),
        }
    }

    pub fn with_org(mut self, org_id: impl Into<String>) -> Self {
        self.org_id = Some(org_id.into());
        self
    }

    pub fn with_item_control(mut self, item_control: ItemControl) -> Self {
        self.item_control = Some(item_control);
        self
    }

    pub fn with_group(mut self, group_id: impl Into<String>) -> Self {
        self.group_ids.push(group_id.into());
        self
    }

    pub fn with_collaboration_group(mut self, group_id: impl Into<String>) -> Self {
        self.collaboration_group_id = Some(group_id.into());
        self
    }

    pub fn with_type_keyword(mut self, keyword: impl Into<String>) -> Self {
        self.type_keywords.push(keyword.into());
        self
    }

    pub fn with_access(mut self, access: impl Into<String>) -> Self {
        self.access = Some(access.into());
        self
    }

    pub fn with_property(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.properties.insert(name.into(), value.into());
        self
    }

    /// Set the capability state from owner overrides, sanitized against the
    /// defaults `registry` declares for this entity type.
    pub fn with_capabilities(
        mut self,
        registry: &PolicyRegistry,
        overrides: &EntityCapabilities,
    ) -> Self {
        self.capabilities = registry.entity_capabilities(self.entity_type, overrides);
        self
    }

    /// Set capability state verbatim, without sanitizing.
    pub fn with_raw_capabilities(mut self, capabilities: EntityCapabilities) -> Self {
        self.capabilities = capabilities;
        self
    }

    pub fn is_owned_by(&self, username: &str) -> bool {
        self.owner == username
    }

    /// Whether the entity is shared with `group_id`, directly or as its
    /// collaboration group.
    pub fn is_associated_with_group(&self, group_id: &str) -> bool {
        self.group_ids.iter().any(|id| id == group_id)
            || self.collaboration_group_id.as_deref() == Some(group_id)
    }
}

fn strings(values: &[String]) -> Value {
    values.iter().map(|v| Value::from(v.as_str())).collect()
}

impl Lookup for Entity {
    fn lookup(&self, path: &[&str]) -> Option<Value> {
        let Some((field, rest)) = path.split_first() else {
            return serde_json::to_value(self).ok();
        };
        match *field {
            "id" => leaf(Value::from(self.id.as_str()), rest),
            "type" => leaf(Value::from(self.entity_type.as_str()), rest),
            "owner" => leaf(Value::from(self.owner.as_str()), rest),
            "orgId" => leaf(Value::from(self.org_id.clone()?), rest),
            "itemControl" => leaf(serde_json::to_value(self.item_control?).ok()?, rest),
            "groupIds" => leaf(strings(&self.group_ids), rest),
            "collaborationGroupId" => leaf(Value::from(self.collaboration_group_id.clone()?), rest),
            "typeKeywords" => leaf(strings(&self.type_keywords), rest),
            "access" => leaf(Value::from(self.access.clone()?), rest),
            "capabilities" => serde_json::to_value(&self.capabilities).ok()?.lookup(rest),
            "properties" => Value::Object(self.properties.clone()).lookup(rest),
            _ => None,
        }
    }
}
