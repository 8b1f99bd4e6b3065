use std::collections::BTreeMap;
use std::fmt::{Display, Formatter};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::{EntityType, PermissionId};

/// Entity-level feature toggle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Capability {
    Overview,
    Details,
    Settings,
    Collaborators,
    Content,
    Metrics,
    Discussions,
    Events,
    Followers,
    Pages,
    Projects,
    Members,
}

impl Capability {
    /// Every recognized capability.
    pub const ALL: [Capability; 12] = [
        Capability::Overview,
        Capability::Details,
        Capability::Settings,
        Capability::Collaborators,
        Capability::Content,
        Capability::Metrics,
        Capability::Discussions,
        Capability::Events,
        Capability::Followers,
        Capability::Pages,
        Capability::Projects,
        Capability::Members,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Capability::Overview => "overview",
            Capability::Details => "details",
            Capability::Settings => "settings",
            Capability::Collaborators => "collaborators",
            Capability::Content => "content",
            Capability::Metrics => "metrics",
            Capability::Discussions => "discussions",
            Capability::Events => "events",
            Capability::Followers => "followers",
            Capability::Pages => "pages",
            Capability::Projects => "projects",
            Capability::Members => "members",
        }
    }
}

impl Display for Capability {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<Capability> for String {
    fn from(value: Capability) -> Self {
        value.as_str().to_string()
    }
}

/// Error returned when parsing a name that is not a known [`Capability`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown capability: {0}")]
pub struct UnknownCapability(pub String);

impl FromStr for Capability {
    type Err = UnknownCapability;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Capability::ALL
            .into_iter()
            .find(|capability| capability.as_str() == s)
            .ok_or_else(|| UnknownCapability(s.to_string()))
    }
}

/// Rule tying a capability of an entity type to the permissions it needs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CapabilityPolicy {
    pub entity_type: EntityType,
    pub capability: Capability,
    /// Permissions checked in order; must not be empty.
    pub permissions: Vec<PermissionId>,
}

impl CapabilityPolicy {
    pub fn new<I, P>(entity_type: EntityType, capability: Capability, permissions: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PermissionId>,
    {
        Self {
            entity_type,
            capability,
            permissions: permissions.into_iter().map(Into::into).collect(),
        }
    }
}

/// Owner-controlled capability switches of an entity.
///
/// Keys are kept as plain names so that state loaded from storage may carry
/// names the engine does not know; [`process_entity_capabilities`] drops
/// those.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntityCapabilities(BTreeMap<String, bool>);

impl EntityCapabilities {
    pub fn new() -> Self {
        Self::default()
    }

    /// Empty set, usable in constant contexts.
    pub const fn empty() -> Self {
        Self(BTreeMap::new())
    }

    /// State of `name`, if present.
    pub fn get(&self, name: &str) -> Option<bool> {
        self.0.get(name).copied()
    }

    /// Whether `capability` is switched on. Absent means off.
    pub fn is_enabled(&self, capability: Capability) -> bool {
        self.get(capability.as_str()).unwrap_or(false)
    }

    pub fn set(&mut self, name: impl Into<String>, enabled: bool) {
        self.0.insert(name.into(), enabled);
    }

    pub fn with(mut self, name: impl Into<String>, enabled: bool) -> Self {
        self.set(name, enabled);
        self
    }

    pub fn contains(&self, name: &str) -> bool {
        self.0.contains_key(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, bool)> {
        self.0.iter().map(|(name, enabled)| (name.as_str(), *enabled))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<K: Into<String>> FromIterator<(K, bool)> for EntityCapabilities {
    fn from_iter<T: IntoIterator<Item = (K, bool)>>(iter: T) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }
}

/// Merge owner overrides onto the defaults of an entity type and drop every
/// name the defaults do not declare.
///
/// Overrides win per key. The result only ever contains keys of
/// `defaults`, and applying the function again with the same defaults is a
/// no-op.
pub fn process_entity_capabilities(
    entity_capabilities: &EntityCapabilities,
    defaults: &EntityCapabilities,
) -> EntityCapabilities {
    let mut merged = defaults.clone();
    for (name, enabled) in entity_capabilities.iter() {
        if defaults.contains(name) {
            merged.set(name, enabled);
        } else {
            tracing::trace!(capability = name, "dropping undeclared capability");
        }
    }
    merged
}
