use std::collections::BTreeMap;
use std::fs;
use std::io::Write;
use std::path::Path;
use std::process::ExitCode;

use anyhow::{Context as _, Result};
use hub_policy::{
    CapabilityPolicy, Context, Entity, EntityCapabilities, EntityType, PermissionId,
    PolicyEngine, PolicyRegistry, ResolverSettings,
};
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::{Command, HubPolicyCli};

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let contents =
        fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    serde_json::from_str(&contents).with_context(|| format!("parsing {}", path.display()))
}

/// Engine over the bundled rules plus every `--rules` file, configured by
/// `--settings`.
pub fn load_engine(cli: &HubPolicyCli) -> Result<PolicyEngine> {
    let mut builder = PolicyRegistry::builder().with_builtin_rules()?;
    for path in &cli.rules {
        let json =
            fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
        builder = builder.register_json(&path.display().to_string(), &json)?;
    }
    let registry = builder.build().context("assembling policy registry")?;

    let settings = match &cli.settings {
        Some(path) => read_json::<ResolverSettings>(path)?,
        None => ResolverSettings::default(),
    };

    tracing::debug!(
        permissions = registry.len(),
        extra_rule_sets = cli.rules.len(),
        "loaded policy engine"
    );
    Ok(PolicyEngine::new(registry).with_settings(settings))
}

/// Read an entity and sanitize its capability overrides against the
/// defaults of its type.
fn load_entity(engine: &PolicyEngine, path: &Path) -> Result<Entity> {
    let entity: Entity = read_json(path)?;
    let overrides = entity.capabilities.clone();
    Ok(entity.with_capabilities(engine.registry(), &overrides))
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct RuleListing<'a> {
    permissions: Vec<&'a PermissionId>,
    capabilities: Vec<&'a CapabilityPolicy>,
    default_capabilities: BTreeMap<EntityType, &'a EntityCapabilities>,
}

fn list_rules(registry: &PolicyRegistry, entity_type: Option<EntityType>) -> RuleListing<'_> {
    let types: Vec<EntityType> = match entity_type {
        Some(entity_type) => vec![entity_type],
        None => EntityType::ALL.to_vec(),
    };

    RuleListing {
        permissions: registry.permissions().map(|policy| &policy.id).collect(),
        capabilities: types
            .iter()
            .flat_map(|entity_type| registry.capability_rules(*entity_type))
            .collect(),
        default_capabilities: types
            .iter()
            .map(|entity_type| (*entity_type, registry.default_capabilities(*entity_type)))
            .filter(|(_, defaults)| !defaults.is_empty())
            .collect(),
    }
}

fn print_json(out: &mut impl Write, value: &impl Serialize) -> Result<()> {
    serde_json::to_writer_pretty(&mut *out, value)?;
    writeln!(out)?;
    Ok(())
}

/// Execute the parsed command, writing its JSON result to `out`.
///
/// `check` exits with failure when the permission is denied.
pub fn run(cli: &HubPolicyCli, out: &mut impl Write) -> Result<ExitCode> {
    let engine = load_engine(cli)?;

    match &cli.command {
        Command::Check {
            permission,
            context,
            entity,
        } => {
            let context: Context = read_json(context)?;
            let entity = entity
                .as_deref()
                .map(|path| load_entity(&engine, path))
                .transpose()?;

            let response = engine.resolve(permission.as_str(), &context, entity.as_ref());
            print_json(out, &response)?;
            Ok(if response.access {
                ExitCode::SUCCESS
            } else {
                ExitCode::FAILURE
            })
        }
        Command::Capabilities { context, entity } => {
            let context: Context = read_json(context)?;
            let entity = load_entity(&engine, entity)?;

            let workspace = engine.get_workspace_capabilities(&entity, &context);
            print_json(out, &workspace)?;
            Ok(ExitCode::SUCCESS)
        }
        Command::Rules { entity_type } => {
            print_json(out, &list_rules(engine.registry(), *entity_type))?;
            Ok(ExitCode::SUCCESS)
        }
    }
}
