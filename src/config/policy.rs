//! Typed build policy
//!
//! The merged policy tree deserializes into [`BuildPolicy`]. Unknown keys
//! in any layer are rejected so a typo cannot silently fall back to a
//! built-in value.

use regex_lite::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::defaults::BuiltinPolicy;
use super::PolicyError;
use crate::signing::{Environment, SigningIdentity, SigningPolicy, DEVELOPMENT_IDENTITY};

/// Java package-name shape shared by application ids and namespaces.
const PACKAGE_NAME_PATTERN: &str = r"^[A-Za-z][A-Za-z0-9_]*(\.[A-Za-z][A-Za-z0-9_]*)+$";

/// Fixed attributes of the app module, identical across variants
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AppPolicy {
    pub application_id: String,
    pub namespace: String,
    pub compile_sdk: u32,
    pub min_sdk: u32,
    pub target_sdk: u32,
    pub ndk_version: String,
    pub jvm_target: String,
    pub flutter_source: String,
}

/// Fallbacks used when the overlay has no version entries
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct VersionDefaults {
    pub code: u32,
    pub name: String,
}

/// Plugins applied to the build graph
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PluginPolicy {
    /// Applied to every variant
    #[serde(default)]
    pub always: Vec<String>,

    /// Registered only for variants that activate it
    pub distribution: String,
}

/// Fully merged, validated build policy
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BuildPolicy {
    pub app: AppPolicy,
    pub version: VersionDefaults,
    pub environment: Environment,
    pub signing: SigningPolicy,
    pub plugins: PluginPolicy,
    #[serde(default)]
    pub dependencies: Vec<String>,
}

impl BuildPolicy {
    /// The built-in policy with no file or CLI layers
    pub fn builtin() -> Result<Self, PolicyError> {
        Self::from_value(BuiltinPolicy::default().to_value())
    }

    /// Deserialize and validate a merged policy tree
    pub fn from_value(value: Value) -> Result<Self, PolicyError> {
        let policy: Self = serde_json::from_value(value)
            .map_err(|e| PolicyError::ParseError(format!("invalid policy: {}", e)))?;
        policy.validate()?;
        Ok(policy)
    }

    /// Validate cross-field constraints
    pub fn validate(&self) -> Result<(), PolicyError> {
        let package_name = Regex::new(PACKAGE_NAME_PATTERN)
            .map_err(|e| PolicyError::ValidationError(format!("package-name pattern: {}", e)))?;

        if !package_name.is_match(&self.app.application_id) {
            return Err(PolicyError::ValidationError(format!(
                "app.application_id '{}' is not a valid package name",
                self.app.application_id
            )));
        }
        if !package_name.is_match(&self.app.namespace) {
            return Err(PolicyError::ValidationError(format!(
                "app.namespace '{}' is not a valid package name",
                self.app.namespace
            )));
        }

        let app = &self.app;
        if app.min_sdk == 0 {
            return Err(PolicyError::ValidationError(
                "app.min_sdk must be greater than 0".to_string(),
            ));
        }
        if app.min_sdk > app.target_sdk || app.target_sdk > app.compile_sdk {
            return Err(PolicyError::ValidationError(format!(
                "SDK levels must satisfy min_sdk <= target_sdk <= compile_sdk (got {} / {} / {})",
                app.min_sdk, app.target_sdk, app.compile_sdk
            )));
        }

        if self.signing.identities.contains_key(DEVELOPMENT_IDENTITY) {
            return Err(PolicyError::ValidationError(format!(
                "signing.identities.{} is implicit and cannot be redefined",
                DEVELOPMENT_IDENTITY
            )));
        }

        for (environment, name) in [
            ("development", &self.signing.bindings.debug.development),
            ("production", &self.signing.bindings.debug.production),
        ] {
            if name != DEVELOPMENT_IDENTITY {
                return Err(PolicyError::ValidationError(format!(
                    "signing.bindings.debug.{} must be '{}' (got '{}')",
                    environment, DEVELOPMENT_IDENTITY, name
                )));
            }
        }

        let development = SigningIdentity::development().fingerprint();
        if let Some((name, _)) = self
            .signing
            .identities
            .iter()
            .find(|(_, identity)| identity.fingerprint() == development)
        {
            return Err(PolicyError::ValidationError(format!(
                "signing.identities.{} duplicates the development key store; bind '{}' instead",
                name, DEVELOPMENT_IDENTITY
            )));
        }

        if self.plugins.distribution.trim().is_empty() {
            return Err(PolicyError::ValidationError(
                "plugins.distribution must not be empty".to_string(),
            ));
        }

        Ok(())
    }
}
