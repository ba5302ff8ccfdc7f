//! Signing identities and the variant × environment binding table.
//!
//! Two identities always exist: the dedicated release identity declared in
//! policy, and the implicit development identity (the Android debug key
//! store). The binding table says which one each variant uses in each
//! environment. Binding `release` to the development identity is the only
//! way the two variants can share an identity, and it is reported as a
//! fallback.
//!
//! Key-store files are referenced by path only and never opened.

use serde::{Deserialize, Serialize, Serializer};
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::{debug, warn};

use crate::error::ConfigurationError;
use crate::variant::BuildVariant;

/// Name of the implicit development identity.
pub const DEVELOPMENT_IDENTITY: &str = "debug";

/// Name of the release identity declared by the built-in policy.
pub const RELEASE_IDENTITY: &str = "release";

/// Placeholder written in place of secrets.
pub const REDACTED: &str = "[REDACTED]";

/// Deployment environment; the second index of the binding table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    Development,
    Production,
}

impl Environment {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Development => "development",
            Self::Production => "production",
        }
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Environment {
    type Err = ConfigurationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "development" => Ok(Self::Development),
            "production" => Ok(Self::Production),
            other => Err(ConfigurationError::UnknownEnvironment(other.to_string())),
        }
    }
}

/// Credential bundle used to sign an artifact.
///
/// Passwords never serialize; they are written as `[REDACTED]`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SigningIdentity {
    pub key_alias: String,

    #[serde(serialize_with = "redact")]
    pub key_password: String,

    /// Key-store file, relative to the app module directory unless absolute.
    pub store_file: PathBuf,

    #[serde(serialize_with = "redact")]
    pub store_password: String,
}

fn redact<S: Serializer>(_secret: &str, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(REDACTED)
}

impl SigningIdentity {
    /// The Android debug key store every SDK install generates.
    pub fn development() -> Self {
        Self {
            key_alias: "androiddebugkey".to_string(),
            key_password: "android".to_string(),
            store_file: PathBuf::from("~/.android/debug.keystore"),
            store_password: "android".to_string(),
        }
    }

    /// Key-store location resolved against the app module directory.
    pub fn store_path(&self, app_dir: &Path) -> PathBuf {
        if self.store_file.is_absolute() {
            self.store_file.clone()
        } else {
            app_dir.join(&self.store_file)
        }
    }

    /// SHA-256 over alias and store reference; safe to log and compare.
    pub fn fingerprint(&self) -> String {
        let mut hasher = Sha256::new();
        hasher.update(self.key_alias.as_bytes());
        hasher.update([0u8]);
        hasher.update(self.store_file.to_string_lossy().as_bytes());
        hex::encode(hasher.finalize())
    }
}

/// Identity names a variant binds to, per environment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct VariantBinding {
    pub development: String,
    pub production: String,
}

impl VariantBinding {
    pub fn for_environment(&self, environment: Environment) -> &str {
        match environment {
            Environment::Development => &self.development,
            Environment::Production => &self.production,
        }
    }
}

/// The binding table, indexed by variant then environment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SigningBindings {
    pub debug: VariantBinding,
    pub release: VariantBinding,
}

impl SigningBindings {
    pub fn identity_name(&self, variant: BuildVariant, environment: Environment) -> &str {
        match variant {
            BuildVariant::Debug => self.debug.for_environment(environment),
            BuildVariant::Release => self.release.for_environment(environment),
        }
    }
}

/// Declared identities plus the binding table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SigningPolicy {
    /// Named identities, excluding the implicit development identity.
    #[serde(default)]
    pub identities: BTreeMap<String, SigningIdentity>,

    pub bindings: SigningBindings,

    /// Require declared key-store files to exist before binding them.
    #[serde(default)]
    pub verify_store_files: bool,
}

/// The identity bound to one variant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoundIdentity {
    pub name: String,
    pub identity: SigningIdentity,
    /// Release signing with the development key, under any name.
    pub fallback: bool,
}

impl SigningPolicy {
    /// Look up an identity by name, including the implicit one.
    pub fn identity(&self, name: &str) -> Option<SigningIdentity> {
        if name == DEVELOPMENT_IDENTITY {
            return Some(SigningIdentity::development());
        }
        self.identities.get(name).cloned()
    }

    /// Bind the identity the table assigns to `variant` in `environment`.
    ///
    /// `app_dir` anchors relative key-store paths when
    /// `verify_store_files` is set.
    pub fn bind(
        &self,
        variant: BuildVariant,
        environment: Environment,
        app_dir: &Path,
    ) -> Result<BoundIdentity, ConfigurationError> {
        let name = self.bindings.identity_name(variant, environment);
        let unavailable = |reason: String| ConfigurationError::SigningIdentityUnavailable {
            variant,
            environment,
            reason,
        };

        if variant == BuildVariant::Debug && name != DEVELOPMENT_IDENTITY {
            return Err(unavailable(format!(
                "debug must use the '{}' identity, not '{}'",
                DEVELOPMENT_IDENTITY, name
            )));
        }

        let identity = self
            .identity(name)
            .ok_or_else(|| unavailable(format!("no signing identity named '{}'", name)))?;

        if self.verify_store_files && name != DEVELOPMENT_IDENTITY {
            let store = identity.store_path(app_dir);
            if !store.is_file() {
                return Err(unavailable(format!(
                    "key store '{}' for identity '{}' not found",
                    store.display(),
                    name
                )));
            }
        }

        let fallback = variant == BuildVariant::Release
            && identity.fingerprint() == SigningIdentity::development().fingerprint();
        if fallback {
            warn!(
                %variant,
                %environment,
                "release bound to the development signing identity; artifact is not releasable"
            );
        }
        debug!(%variant, %environment, identity = name, fingerprint = %identity.fingerprint(), "bound signing identity");

        Ok(BoundIdentity {
            name: name.to_string(),
            identity,
            fallback,
        })
    }
}
