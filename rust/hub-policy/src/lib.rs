//! Permission and capability policy engine for Hub entities.
//!
//! The engine answers two questions for a session ([`Context`]) and an
//! optional domain entity ([`Entity`]):
//!
//! - is a named permission such as `hub:project:edit` granted, and if not,
//!   why not ([`PermissionAccessResponse`])
//! - which owner-controlled capabilities of the entity may the session use
//!   ([`WorkspaceCapabilities`])
//!
//! # Quick Example
//!
//! ```rust
//! use hub_policy::{Context, CurrentUser, Entity, EntityCapabilities, EntityType, HubLicense,
//!     PolicyEngine, ReasonCode};
//!
//! # fn main() -> Result<(), hub_policy::PolicyRegistryError> {
//! let engine = PolicyEngine::builtin()?;
//!
//! let project = Entity::new("p-1", EntityType::HubProject, "casey")
//!     .with_capabilities(engine.registry(), &EntityCapabilities::new());
//!
//! let owner = Context::authenticated(CurrentUser::new("casey"))
//!     .with_license(HubLicense::HubPremium);
//! assert!(engine.resolve("hub:project:edit", &owner, Some(&project)).access);
//!
//! let visitor = Context::anonymous().with_license(HubLicense::HubPremium);
//! assert_eq!(
//!     engine.resolve("hub:project:edit", &visitor, Some(&project)).code,
//!     ReasonCode::NotAuthenticated
//! );
//! # Ok(())
//! # }
//! ```
//!
//! # Rules
//!
//! Rules are plain data. A [`PermissionPolicy`] lists the gates a
//! permission must pass: deployment environment, feature stage, backend
//! services, authentication, license, privileges, dependencies on other
//! permissions, structural rights over the entity and finally
//! [`Assertion`]s. Gates are checked in that order and the first failure
//! decides the response. A failing dependency is reported as is, so the
//! caller sees the root cause rather than the permission that was asked
//! for.
//!
//! A [`CapabilityPolicy`] ties a capability of an entity type to the
//! permissions it needs. The entity's own capability switch is checked
//! before any of them.
//!
//! Rules are collected with a [`RegistryBuilder`] and frozen into a
//! [`PolicyRegistry`]. The crate ships rule sets for every
//! [`EntityType`], see [`PolicyRegistry::builtin`].
//!
//! # Failure model
//!
//! Denials are values. Unknown permissions, dependency cycles and
//! unparseable assertions all resolve to `access: false` with a reason
//! code. Only assembling a registry can fail, with [`PolicyRegistryError`].

mod error;
pub use error::*;

mod id;
pub use id::*;

mod response;
pub use response::*;

mod selector;
pub use selector::*;

mod context;
pub use context::*;

mod entity;
pub use entity::*;

mod capability;
pub use capability::*;

mod assertion;
pub use assertion::*;

mod policy;
pub use policy::*;

mod settings;
pub use settings::*;

mod registry;
pub use registry::*;

mod authority;
pub use authority::*;

mod resolver;
pub use resolver::*;

mod workspace;
pub use workspace::*;

mod engine;
pub use engine::*;

mod rules;
pub use rules::*;
