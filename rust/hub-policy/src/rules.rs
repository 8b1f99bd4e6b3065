//! Rule tables bundled with the crate.

use crate::{PolicyRegistry, PolicyRegistryError, RegistryBuilder};

/// Bundled rule sets as `(name, json)` pairs, in registration order.
pub const BUILTIN_RULE_SETS: [(&str, &str); 7] = [
    ("platform", include_str!("../rules/platform.json")),
    ("project", include_str!("../rules/project.json")),
    ("site", include_str!("../rules/site.json")),
    ("initiative", include_str!("../rules/initiative.json")),
    ("page", include_str!("../rules/page.json")),
    ("group", include_str!("../rules/group.json")),
    ("content", include_str!("../rules/content.json")),
];

impl RegistryBuilder {
    /// Add every bundled rule set.
    pub fn with_builtin_rules(self) -> Result<Self, PolicyRegistryError> {
        BUILTIN_RULE_SETS
            .into_iter()
            .try_fold(self, |builder, (name, json)| builder.register_json(name, json))
    }
}

impl PolicyRegistry {
    /// Registry holding exactly the bundled rule sets.
    pub fn builtin() -> Result<Self, PolicyRegistryError> {
        RegistryBuilder::new().with_builtin_rules()?.build()
    }
}
