use std::collections::BTreeMap;

use hub_policy::{
    Context, CurrentUser, Entity, EntityCapabilities, EntityType, HubLicense, PolicyEngine,
    process_entity_capabilities,
};
use proptest::prelude::*;

const NAMES: [&str; 8] = [
    "overview",
    "details",
    "settings",
    "collaborators",
    "metrics",
    "events",
    "shenanigans",
    "workspace",
];

fn capabilities() -> impl Strategy<Value = EntityCapabilities> {
    prop::collection::btree_map(prop::sample::select(NAMES.to_vec()), any::<bool>(), 0..8)
        .prop_map(|map: BTreeMap<&'static str, bool>| map.into_iter().collect())
}

proptest! {
    #[test]
    fn it_is_idempotent(overrides in capabilities(), defaults in capabilities()) {
        let once = process_entity_capabilities(&overrides, &defaults);
        let twice = process_entity_capabilities(&once, &defaults);
        prop_assert_eq!(once, twice);
    }

    #[test]
    fn it_only_keeps_declared_names(overrides in capabilities(), defaults in capabilities()) {
        let processed = process_entity_capabilities(&overrides, &defaults);
        for name in processed.names() {
            prop_assert!(defaults.contains(name));
        }
        prop_assert_eq!(processed.len(), defaults.len());
    }

    #[test]
    fn it_never_grants_more_than_it_evaluates(
        overrides in capabilities(),
        entity_type in prop::sample::select(EntityType::ALL.to_vec()),
        signed_in in any::<bool>(),
        owner in any::<bool>(),
    ) {
        let engine = PolicyEngine::builtin().map_err(|e| TestCaseError::fail(e.to_string()))?;
        let entity = Entity::new("e-1", entity_type, "casey")
            .with_capabilities(engine.registry(), &overrides);
        let session = if signed_in {
            Context::authenticated(CurrentUser::new(if owner { "casey" } else { "jordan" }))
        } else {
            Context::anonymous()
        };
        let context = session.with_license(HubLicense::HubPremium);

        let workspace = engine.get_workspace_capabilities(&entity, &context);
        prop_assert!(workspace.granted.len() <= workspace.details.len());
        for capability in &workspace.granted {
            prop_assert!(entity.capabilities.is_enabled(*capability));
        }
    }
}
