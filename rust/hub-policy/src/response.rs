use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};

use crate::PermissionId;

/// Machine readable reason attached to every access decision.
///
/// Each code belongs to exactly one [`ResponseCategory`], see
/// [`ReasonCode::category`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ReasonCode {
    /// Every gate passed
    Granted,
    /// Permission id is not in the registry
    UnknownPermission,
    /// Permission depends on itself through its dependency graph
    CyclicDependency,
    /// Permission requires a signed in user
    NotAuthenticated,
    /// User lacks a required privilege
    InsufficientPrivilege,
    /// Organization license tier is not allowed
    InsufficientLicense,
    /// A required backend service is not online
    ServiceUnavailable,
    /// Permission is not offered in the current deployment environment
    UnavailableEnvironment,
    /// Feature stage of the permission is not enabled
    UnavailableFeature,
    /// User has no structural right over the entity
    NotAuthorized,
    /// A rule assertion did not hold
    AssertionFailed,
    /// Owner disabled the capability on the entity
    Disabled,
    /// Capability name is not recognized
    InvalidCapability,
}

impl ReasonCode {
    /// Category reported alongside this code.
    pub fn category(&self) -> ResponseCategory {
        match self {
            ReasonCode::Granted => ResponseCategory::Granted,
            ReasonCode::UnknownPermission => ResponseCategory::InvalidPermission,
            ReasonCode::CyclicDependency => ResponseCategory::InvalidPolicy,
            ReasonCode::NotAuthenticated => ResponseCategory::NotAuthenticated,
            ReasonCode::InsufficientPrivilege => ResponseCategory::PrivilegeRequired,
            ReasonCode::InsufficientLicense => ResponseCategory::NotLicensed,
            ReasonCode::ServiceUnavailable
            | ReasonCode::UnavailableEnvironment
            | ReasonCode::UnavailableFeature
            | ReasonCode::Disabled => ResponseCategory::NotAvailable,
            ReasonCode::NotAuthorized => ResponseCategory::NotAuthorized,
            ReasonCode::AssertionFailed => ResponseCategory::AssertionFailed,
            ReasonCode::InvalidCapability => ResponseCategory::InvalidCapability,
        }
    }

    /// Kebab-case name, identical to the serialized form.
    pub fn as_str(&self) -> &'static str {
        match self {
            ReasonCode::Granted => "granted",
            ReasonCode::UnknownPermission => "unknown-permission",
            ReasonCode::CyclicDependency => "cyclic-dependency",
            ReasonCode::NotAuthenticated => "not-authenticated",
            ReasonCode::InsufficientPrivilege => "insufficient-privilege",
            ReasonCode::InsufficientLicense => "insufficient-license",
            ReasonCode::ServiceUnavailable => "service-unavailable",
            ReasonCode::UnavailableEnvironment => "unavailable-environment",
            ReasonCode::UnavailableFeature => "unavailable-feature",
            ReasonCode::NotAuthorized => "not-authorized",
            ReasonCode::AssertionFailed => "assertion-failed",
            ReasonCode::Disabled => "disabled",
            ReasonCode::InvalidCapability => "invalid-capability",
        }
    }
}

impl Display for ReasonCode {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Coarse classification of a decision, suitable for choosing what to
/// render (sign-in prompt, upgrade notice, hidden control...).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ResponseCategory {
    Granted,
    InvalidPolicy,
    InvalidPermission,
    NotAuthenticated,
    PrivilegeRequired,
    NotLicensed,
    NotAvailable,
    NotAuthorized,
    AssertionFailed,
    InvalidCapability,
}

/// Outcome of resolving a single permission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PermissionAccessResponse {
    /// Whether the permission is granted
    pub access: bool,
    /// Reason for the decision
    pub code: ReasonCode,
    /// Category derived from `code`
    pub response: ResponseCategory,
    /// Human readable explanation
    pub message: String,
}

impl PermissionAccessResponse {
    /// Successful resolution of `id`.
    pub fn granted(id: &PermissionId) -> Self {
        Self {
            access: true,
            code: ReasonCode::Granted,
            response: ResponseCategory::Granted,
            message: format!("Permission {id} is granted."),
        }
    }

    /// Denial with the given reason.
    pub fn denied(code: ReasonCode, message: impl Into<String>) -> Self {
        Self {
            access: false,
            code,
            response: code.category(),
            message: message.into(),
        }
    }

    pub fn unknown_permission(id: &PermissionId) -> Self {
        Self::denied(
            ReasonCode::UnknownPermission,
            format!("Permission {id} is not registered."),
        )
    }

    pub fn cyclic_dependency(id: &PermissionId) -> Self {
        Self::denied(
            ReasonCode::CyclicDependency,
            format!("Permission {id} depends on itself."),
        )
    }
}

/// Outcome of checking a capability rule against an entity.
///
/// The flattened fields report the aggregated decision, `responses` holds
/// one entry per permission of the rule, in rule order. `capability` is the
/// name that was asked for, which is not necessarily a recognized one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CapabilityAccessResponse {
    pub capability: String,
    #[serde(flatten)]
    pub decision: PermissionAccessResponse,
    pub responses: Vec<PermissionAccessResponse>,
}

impl CapabilityAccessResponse {
    /// Whether the capability is available.
    pub fn access(&self) -> bool {
        self.decision.access
    }

    /// Reason code of the aggregated decision.
    pub fn code(&self) -> ReasonCode {
        self.decision.code
    }

    /// Decision for a capability that was rejected before any permission
    /// was evaluated.
    pub fn rejected(
        capability: impl Into<String>,
        code: ReasonCode,
        message: impl Into<String>,
    ) -> Self {
        Self {
            capability: capability.into(),
            decision: PermissionAccessResponse::denied(code, message),
            responses: Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Capability;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn it_maps_codes_to_categories() {
        assert_eq!(
            ReasonCode::CyclicDependency.category(),
            ResponseCategory::InvalidPolicy
        );
        assert_eq!(
            ReasonCode::UnknownPermission.category(),
            ResponseCategory::InvalidPermission
        );
        assert_eq!(ReasonCode::Disabled.category(), ResponseCategory::NotAvailable);
        assert_eq!(
            ReasonCode::InvalidCapability.category(),
            ResponseCategory::InvalidCapability
        );
    }

    #[test]
    fn it_keeps_display_in_sync_with_serde() {
        for code in [
            ReasonCode::Granted,
            ReasonCode::UnavailableEnvironment,
            ReasonCode::InsufficientPrivilege,
            ReasonCode::AssertionFailed,
        ] {
            assert_eq!(
                serde_json::to_value(code).unwrap(),
                json!(code.to_string())
            );
        }
    }

    #[test]
    fn it_flattens_capability_response() {
        let response = CapabilityAccessResponse::rejected(
            Capability::Details,
            ReasonCode::Disabled,
            "Owner casey has disabled details capability.",
        );

        assert_eq!(
            serde_json::to_value(&response).unwrap(),
            json!({
                "capability": "details",
                "access": false,
                "code": "disabled",
                "response": "not-available",
                "message": "Owner casey has disabled details capability.",
                "responses": []
            })
        );
    }
}
