use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::{Availability, Context, Environment};

/// Configuration of the permission resolver.
///
/// `availability` lists, per deployment environment, the feature stages a
/// permission may be in and still resolve. Environments without an entry
/// enable nothing beyond what the session opted into.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolverSettings {
    #[serde(default)]
    pub availability: BTreeMap<Environment, Vec<Availability>>,
}

impl Default for ResolverSettings {
    fn default() -> Self {
        use Availability::*;

        Self {
            availability: BTreeMap::from([
                (Environment::Devext, vec![Alpha, Beta, General]),
                (Environment::Qaext, vec![Alpha, Beta, General]),
                (Environment::Production, vec![Beta, General]),
                (Environment::Enterprise, vec![General]),
            ]),
        }
    }
}

impl ResolverSettings {
    /// Settings with no stage enabled anywhere.
    pub fn empty() -> Self {
        Self {
            availability: BTreeMap::new(),
        }
    }

    /// Replace the stages enabled in `environment`.
    pub fn with_availability(
        mut self,
        environment: Environment,
        stages: impl IntoIterator<Item = Availability>,
    ) -> Self {
        self.availability
            .insert(environment, stages.into_iter().collect());
        self
    }

    /// Whether `stage` is enabled for the session, either by its
    /// environment or by an explicit opt-in.
    pub fn is_stage_enabled(&self, stage: Availability, context: &Context) -> bool {
        context.feature_stages.contains(&stage)
            || self
                .availability
                .get(&context.environment)
                .is_some_and(|stages| stages.contains(&stage))
    }
}
