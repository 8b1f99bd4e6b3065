use std::borrow::Borrow;
use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};

/// Hierarchical, colon-delimited identifier of a permission
/// (e.g. `hub:project:workspace:settings`).
///
/// The id is an opaque registry key. The segment helpers exist for
/// diagnostics and rule listings, resolution never interprets them.
#[derive(
    Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct PermissionId(String);

impl PermissionId {
    /// Separator between segments of a permission id.
    pub const SEPARATOR: char = ':';

    /// Create a permission id from its string form.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// The id as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Iterate over the colon-delimited segments.
    pub fn segments(&self) -> impl Iterator<Item = &str> {
        self.0.split(Self::SEPARATOR)
    }

    /// Namespace segment (`hub` in `hub:project:edit`).
    pub fn namespace(&self) -> &str {
        self.segments().next().unwrap_or_default()
    }

    /// Id made of every segment but the last one, if there is more than one.
    pub fn parent(&self) -> Option<PermissionId> {
        self.0
            .rsplit_once(Self::SEPARATOR)
            .map(|(parent, _)| PermissionId::new(parent))
    }
}

impl Display for PermissionId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for PermissionId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for PermissionId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl Borrow<str> for PermissionId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for PermissionId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
