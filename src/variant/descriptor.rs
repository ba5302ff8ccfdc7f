//! The resolved, immutable per-variant build descriptor.

use chrono::{DateTime, Utc};
use serde::Serialize;
use sha2::{Digest, Sha256};
use variant_props::Diagnostic;

use super::{BuildVariant, DebugSymbolLevel};
use crate::config::AppPolicy;
use crate::error::ConfigurationError;
use crate::signing::{BoundIdentity, Environment, SigningIdentity};

/// Schema version for variant descriptors
pub const DESCRIPTOR_SCHEMA_VERSION: u32 = 1;

/// Schema identifier
pub const DESCRIPTOR_SCHEMA_ID: &str = "android-variants/variant_descriptor@1";

/// Fields left out of the descriptor key because they differ per run.
const VOLATILE_FIELDS: &[&str] = &["descriptor_key", "session_id", "created_at"];

/// Everything the build engine needs to package one variant.
///
/// Fields are private: a descriptor is produced once by
/// [`VariantDescriptorBuilder`](super::VariantDescriptorBuilder) and only
/// read afterwards.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VariantDescriptor {
    schema_version: u32,
    schema_id: String,
    variant: BuildVariant,
    environment: Environment,
    #[serde(flatten)]
    app: AppPolicy,
    version_code: u32,
    version_name: String,
    signing_identity: String,
    signing: SigningIdentity,
    signing_fingerprint: String,
    signing_fallback: bool,
    minify: bool,
    shrink_resources: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    debug_symbol_level: Option<DebugSymbolLevel>,
    plugins: Vec<String>,
    plugin_activation: bool,
    conditional_plugins: Vec<String>,
    dependencies: Vec<String>,
    diagnostics: Vec<Diagnostic>,
    descriptor_key: String,
    session_id: String,
    created_at: DateTime<Utc>,
}

/// Inputs gathered by the builder before the descriptor is sealed.
pub(super) struct DescriptorParts {
    pub variant: BuildVariant,
    pub environment: Environment,
    pub app: AppPolicy,
    pub version_code: u32,
    pub version_name: String,
    pub bound: BoundIdentity,
    pub plugins: Vec<String>,
    pub distribution_plugin: String,
    pub dependencies: Vec<String>,
    pub diagnostics: Vec<Diagnostic>,
    pub session_id: String,
}

impl VariantDescriptor {
    /// Seal the parts into a descriptor and compute its key.
    pub(super) fn seal(parts: DescriptorParts) -> Result<Self, ConfigurationError> {
        let policy = parts.variant.policy();
        let conditional_plugins = if policy.plugin_activation {
            vec![parts.distribution_plugin]
        } else {
            Vec::new()
        };

        let mut descriptor = Self {
            schema_version: DESCRIPTOR_SCHEMA_VERSION,
            schema_id: DESCRIPTOR_SCHEMA_ID.to_string(),
            variant: parts.variant,
            environment: parts.environment,
            app: parts.app,
            version_code: parts.version_code,
            version_name: parts.version_name,
            signing_identity: parts.bound.name,
            signing_fingerprint: parts.bound.identity.fingerprint(),
            signing: parts.bound.identity,
            signing_fallback: parts.bound.fallback,
            minify: policy.minify,
            shrink_resources: policy.shrink_resources,
            debug_symbol_level: policy.debug_symbol_level,
            plugins: parts.plugins,
            plugin_activation: policy.plugin_activation,
            conditional_plugins,
            dependencies: parts.dependencies,
            diagnostics: parts.diagnostics,
            descriptor_key: String::new(),
            session_id: parts.session_id,
            created_at: Utc::now(),
        };
        descriptor.descriptor_key = descriptor.compute_key()?;
        Ok(descriptor)
    }

    /// SHA-256 hex digest of the JCS (RFC 8785) form of the
    /// deterministic fields.
    pub fn compute_key(&self) -> Result<String, ConfigurationError> {
        let mut value = serde_json::to_value(self)
            .map_err(|e| ConfigurationError::DescriptorKey(e.to_string()))?;
        if let Some(map) = value.as_object_mut() {
            for field in VOLATILE_FIELDS {
                map.remove(*field);
            }
        }

        let jcs_bytes = serde_json_canonicalizer::to_vec(&value)
            .map_err(|e| ConfigurationError::DescriptorKey(e.to_string()))?;

        let mut hasher = Sha256::new();
        hasher.update(&jcs_bytes);
        Ok(hex::encode(hasher.finalize()))
    }

    pub fn variant(&self) -> BuildVariant {
        self.variant
    }

    pub fn environment(&self) -> Environment {
        self.environment
    }

    pub fn application_id(&self) -> &str {
        &self.app.application_id
    }

    pub fn namespace(&self) -> &str {
        &self.app.namespace
    }

    pub fn min_sdk(&self) -> u32 {
        self.app.min_sdk
    }

    pub fn target_sdk(&self) -> u32 {
        self.app.target_sdk
    }

    pub fn compile_sdk(&self) -> u32 {
        self.app.compile_sdk
    }

    pub fn ndk_version(&self) -> &str {
        &self.app.ndk_version
    }

    pub fn jvm_target(&self) -> &str {
        &self.app.jvm_target
    }

    pub fn flutter_source(&self) -> &str {
        &self.app.flutter_source
    }

    pub fn version_code(&self) -> u32 {
        self.version_code
    }

    pub fn version_name(&self) -> &str {
        &self.version_name
    }

    /// Name of the bound identity in the signing table.
    pub fn signing_identity_name(&self) -> &str {
        &self.signing_identity
    }

    pub fn signing_identity(&self) -> &SigningIdentity {
        &self.signing
    }

    pub fn signing_fingerprint(&self) -> &str {
        &self.signing_fingerprint
    }

    /// Release explicitly bound to the development identity.
    pub fn signing_fallback(&self) -> bool {
        self.signing_fallback
    }

    pub fn minify(&self) -> bool {
        self.minify
    }

    pub fn shrink_resources(&self) -> bool {
        self.shrink_resources
    }

    pub fn debug_symbol_level(&self) -> Option<DebugSymbolLevel> {
        self.debug_symbol_level
    }

    /// Plugins applied regardless of variant.
    pub fn plugins(&self) -> &[String] {
        &self.plugins
    }

    pub fn plugin_activation(&self) -> bool {
        self.plugin_activation
    }

    /// Plugins to register because this variant activates them.
    pub fn conditional_plugins(&self) -> &[String] {
        &self.conditional_plugins
    }

    pub fn dependencies(&self) -> &[String] {
        &self.dependencies
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    pub fn descriptor_key(&self) -> &str {
        &self.descriptor_key
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Serialize to JSON (pretty printed, passwords redacted)
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}
