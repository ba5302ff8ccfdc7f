//! Builds one [`VariantDescriptor`] per requested variant.

use std::path::{Path, PathBuf};
use tracing::{debug, info};
use variant_props::{keys, PropertyResolver};

use super::descriptor::{DescriptorParts, VariantDescriptor};
use super::BuildVariant;
use crate::config::BuildPolicy;
use crate::error::ConfigurationError;

/// Resolves variant descriptors for one resolution session.
///
/// The policy and the property resolver are injected; the builder holds no
/// other state, so variants are built independently of each other and the
/// overlay is read at most once for the whole session.
#[derive(Debug)]
pub struct VariantDescriptorBuilder<'a> {
    policy: &'a BuildPolicy,
    properties: &'a PropertyResolver,
    app_dir: PathBuf,
    session_id: String,
}

impl<'a> VariantDescriptorBuilder<'a> {
    /// `app_dir` is the Android app module directory; relative key-store
    /// paths are resolved against it.
    pub fn new(policy: &'a BuildPolicy, properties: &'a PropertyResolver, app_dir: impl Into<PathBuf>) -> Self {
        Self {
            policy,
            properties,
            app_dir: app_dir.into(),
            session_id: ulid::Ulid::new().to_string().to_lowercase(),
        }
    }

    /// Use a fixed session id instead of a generated one.
    pub fn with_session_id(mut self, session_id: impl Into<String>) -> Self {
        self.session_id = session_id.into();
        self
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    pub fn app_dir(&self) -> &Path {
        &self.app_dir
    }

    /// Parse a variant tag and build it.
    pub fn build_named(&self, tag: &str) -> Result<VariantDescriptor, ConfigurationError> {
        self.build(tag.parse()?)
    }

    /// Resolve the descriptor for `variant`.
    ///
    /// Every error is fatal for this variant; nothing is retried or
    /// replaced by a degraded value.
    pub fn build(&self, variant: BuildVariant) -> Result<VariantDescriptor, ConfigurationError> {
        let policy = self.policy;
        let environment = policy.environment;

        let version_code = self
            .properties
            .resolve_u32(&keys::VERSION_CODE, policy.version.code)?;
        let version_name = self
            .properties
            .resolve(&keys::VERSION_NAME, &policy.version.name)?;
        debug!(%variant, version_code, version_name = %version_name, "resolved version");

        let bound = policy.signing.bind(variant, environment, &self.app_dir)?;

        let descriptor = VariantDescriptor::seal(DescriptorParts {
            variant,
            environment,
            app: policy.app.clone(),
            version_code,
            version_name,
            bound,
            plugins: policy.plugins.always.clone(),
            distribution_plugin: policy.plugins.distribution.clone(),
            dependencies: policy.dependencies.clone(),
            diagnostics: self.properties.diagnostics(),
            session_id: self.session_id.clone(),
        })?;

        info!(
            %variant,
            %environment,
            key = descriptor.descriptor_key(),
            plugin_activation = descriptor.plugin_activation(),
            "resolved variant descriptor"
        );
        Ok(descriptor)
    }

    /// Build every variant, keeping each result separate so one failing
    /// variant does not hide the other.
    pub fn build_all(&self) -> Vec<(BuildVariant, Result<VariantDescriptor, ConfigurationError>)> {
        BuildVariant::ALL
            .into_iter()
            .map(|variant| (variant, self.build(variant)))
            .collect()
    }
}
