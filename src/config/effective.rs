//! Effective build policy with full provenance
//!
//! Captures the merged, validated policy plus where each value came from.
//! The serialized form has secrets redacted; the typed policy does not.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use tracing::debug;

use super::defaults::BuiltinPolicy;
use super::merge::{merge_layers, overrides_from_assignments, PolicyOrigin};
use super::policy::BuildPolicy;
use crate::layout::ProjectLayout;
use crate::signing::{Environment, REDACTED};

/// Schema version for effective_policy
pub const SCHEMA_VERSION: u32 = 1;

/// Schema identifier
pub const SCHEMA_ID: &str = "android-variants/effective_policy@1";

/// Key fragments whose values are secrets
const SECRET_KEYS: &[&str] = &["password", "secret", "token", "credential"];

/// A contributing policy source
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PolicySource {
    pub origin: PolicyOrigin,

    /// File path (None for builtin/cli)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,

    /// SHA-256 digest of raw file bytes (None for builtin/cli)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub digest: Option<String>,
}

/// Effective policy with provenance
#[derive(Debug, Clone, Serialize)]
pub struct EffectivePolicy {
    pub schema_version: u32,
    pub schema_id: String,
    pub created_at: DateTime<Utc>,

    /// The merged policy tree, secrets redacted
    pub config: Value,

    /// Contributing sources in precedence order
    pub sources: Vec<PolicySource>,

    /// Leaf path -> layer that set it
    pub provenance: BTreeMap<String, PolicyOrigin>,

    /// Redacted key paths
    pub redactions: Vec<String>,

    #[serde(skip)]
    policy: BuildPolicy,
}

impl EffectivePolicy {
    /// Build the effective policy from built-in defaults, an optional
    /// policy file and optional CLI overrides.
    ///
    /// A policy file path that does not exist contributes nothing.
    pub fn build(policy_path: Option<&Path>, cli_overrides: Option<Value>) -> Result<Self, PolicyError> {
        let mut layers = Vec::new();
        let mut sources = Vec::new();

        layers.push((PolicyOrigin::Builtin, BuiltinPolicy::default().to_value()));
        sources.push(PolicySource {
            origin: PolicyOrigin::Builtin,
            path: None,
            digest: None,
        });

        if let Some(path) = policy_path {
            if path.exists() {
                let (value, digest) = Self::load_toml_file(path)?;
                debug!(path = %path.display(), %digest, "loaded policy file");
                layers.push((PolicyOrigin::File, value));
                sources.push(PolicySource {
                    origin: PolicyOrigin::File,
                    path: Some(path.to_string_lossy().to_string()),
                    digest: Some(digest),
                });
            } else {
                debug!(path = %path.display(), "no policy file, using built-in policy");
            }
        }

        if let Some(cli) = cli_overrides {
            layers.push((PolicyOrigin::Cli, cli));
            sources.push(PolicySource {
                origin: PolicyOrigin::Cli,
                path: None,
                digest: None,
            });
        }

        let merged = merge_layers(layers);
        let policy = BuildPolicy::from_value(merged.value.clone())?;

        let mut config = merged.value;
        let redactions = Self::redact_secrets(&mut config);

        Ok(Self {
            schema_version: SCHEMA_VERSION,
            schema_id: SCHEMA_ID.to_string(),
            created_at: Utc::now(),
            config,
            sources,
            provenance: merged.provenance,
            redactions,
            policy,
        })
    }

    /// Build the policy for one project invocation.
    ///
    /// Without `policy_path` the project's `variants.toml` is used if it
    /// exists; an explicit `policy_path` must exist. `environment` is
    /// checked and then applied after `overrides`, so it wins over both
    /// the file and any `environment=` assignment.
    pub fn for_layout(
        layout: &ProjectLayout,
        policy_path: Option<&Path>,
        overrides: &[String],
        environment: Option<&str>,
    ) -> Result<Self, PolicyError> {
        let path = match policy_path {
            Some(path) if !path.exists() => {
                return Err(PolicyError::IoError(format!(
                    "policy file {} not found",
                    path.display()
                )));
            }
            Some(path) => path.to_path_buf(),
            None => layout.policy_path(),
        };

        let mut assignments = overrides.to_vec();
        if let Some(environment) = environment {
            let environment: Environment = environment
                .parse()
                .map_err(|e: crate::error::ConfigurationError| {
                    PolicyError::ValidationError(e.to_string())
                })?;
            assignments.push(format!("environment={}", environment));
        }

        let cli = if assignments.is_empty() {
            None
        } else {
            Some(overrides_from_assignments(&assignments)?)
        };

        Self::build(Some(path.as_path()), cli)
    }

    /// The typed policy, secrets intact
    pub fn policy(&self) -> &BuildPolicy {
        &self.policy
    }

    pub fn into_policy(self) -> BuildPolicy {
        self.policy
    }

    /// Load and parse a TOML file, returning the value and digest
    fn load_toml_file(path: &Path) -> Result<(Value, String), PolicyError> {
        let bytes = fs::read(path).map_err(|e| PolicyError::IoError(e.to_string()))?;

        let mut hasher = Sha256::new();
        hasher.update(&bytes);
        let digest = hex::encode(hasher.finalize());

        let contents = String::from_utf8(bytes)
            .map_err(|e| PolicyError::ParseError(format!("Invalid UTF-8: {}", e)))?;

        let toml_value: toml::Value = toml::from_str(&contents)
            .map_err(|e| PolicyError::ParseError(format!("TOML parse error: {}", e)))?;

        Ok((Self::toml_to_json(toml_value), digest))
    }

    /// Convert TOML Value to JSON Value
    fn toml_to_json(toml: toml::Value) -> Value {
        match toml {
            toml::Value::String(s) => Value::String(s),
            toml::Value::Integer(i) => Value::Number(i.into()),
            toml::Value::Float(f) => serde_json::Number::from_f64(f)
                .map(Value::Number)
                .unwrap_or(Value::Null),
            toml::Value::Boolean(b) => Value::Bool(b),
            toml::Value::Datetime(dt) => Value::String(dt.to_string()),
            toml::Value::Array(arr) => Value::Array(arr.into_iter().map(Self::toml_to_json).collect()),
            toml::Value::Table(table) => Value::Object(
                table
                    .into_iter()
                    .map(|(k, v)| (k, Self::toml_to_json(v)))
                    .collect(),
            ),
        }
    }

    /// Redact secrets in place, returning the redacted paths
    fn redact_secrets(value: &mut Value) -> Vec<String> {
        let mut redactions = Vec::new();
        Self::redact_recursive(value, String::new(), &mut redactions);
        redactions
    }

    fn redact_recursive(value: &mut Value, path: String, redactions: &mut Vec<String>) {
        match value {
            Value::Object(map) => {
                for (key, val) in map.iter_mut() {
                    let key_lower = key.to_lowercase();
                    let current_path = if path.is_empty() {
                        key.clone()
                    } else {
                        format!("{}.{}", path, key)
                    };

                    let is_secret = SECRET_KEYS.iter().any(|s| key_lower.contains(s));
                    if is_secret && !val.is_object() && !val.is_array() {
                        *val = Value::String(REDACTED.to_string());
                        redactions.push(current_path);
                    } else {
                        Self::redact_recursive(val, current_path, redactions);
                    }
                }
            }
            Value::Array(arr) => {
                for (i, val) in arr.iter_mut().enumerate() {
                    Self::redact_recursive(val, format!("{}[{}]", path, i), redactions);
                }
            }
            _ => {}
        }
    }

    /// Serialize to JSON
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Get a redacted config value by dotted path
    pub fn get(&self, path: &str) -> Option<&Value> {
        let mut current = &self.config;
        for part in path.split('.') {
            current = current.get(part)?;
        }
        Some(current)
    }

    pub fn get_str(&self, path: &str) -> Option<&str> {
        self.get(path).and_then(|v| v.as_str())
    }

    pub fn get_u64(&self, path: &str) -> Option<u64> {
        self.get(path).and_then(|v| v.as_u64())
    }
}

/// Policy errors
#[derive(Debug, thiserror::Error)]
pub enum PolicyError {
    #[error("IO error: {0}")]
    IoError(String),

    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("Validation error: {0}")]
    ValidationError(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::{NamedTempFile, TempDir};

    fn project_with_policy(contents: Option<&str>) -> (TempDir, ProjectLayout) {
        let dir = TempDir::new().unwrap();
        let layout = ProjectLayout::new(dir.path());
        if let Some(contents) = contents {
            fs::write(layout.policy_path(), contents).unwrap();
        }
        (dir, layout)
    }

    #[test]
    fn test_build_with_defaults_only() {
        let effective = EffectivePolicy::build(None, None).unwrap();

        assert_eq!(effective.schema_version, SCHEMA_VERSION);
        assert_eq!(effective.get_u64("app.compile_sdk"), Some(35));
        assert_eq!(effective.get_str("environment"), Some("production"));
        assert_eq!(effective.sources.len(), 1);
        assert_eq!(effective.sources[0].origin, PolicyOrigin::Builtin);
    }

    #[test]
    fn test_build_with_cli_override() {
        let cli = serde_json::json!({"environment": "development"});
        let effective = EffectivePolicy::build(None, Some(cli)).unwrap();

        assert_eq!(effective.policy().environment, Environment::Development);
        assert_eq!(effective.provenance["environment"], PolicyOrigin::Cli);
    }

    #[test]
    fn test_policy_file_layer() {
        let mut temp = NamedTempFile::new().unwrap();
        writeln!(temp, "[app]").unwrap();
        writeln!(temp, "min_sdk = 28").unwrap();
        writeln!(temp, "[signing]").unwrap();
        writeln!(temp, "verify_store_files = true").unwrap();

        let effective = EffectivePolicy::build(Some(temp.path()), None).unwrap();

        assert_eq!(effective.policy().app.min_sdk, 28);
        assert!(effective.policy().signing.verify_store_files);
        assert_eq!(effective.provenance["app.min_sdk"], PolicyOrigin::File);
        assert_eq!(effective.provenance["app.target_sdk"], PolicyOrigin::Builtin);
        assert_eq!(effective.sources.len(), 2);
        assert_eq!(effective.sources[1].digest.as_ref().unwrap().len(), 64);
    }

    #[test]
    fn test_cli_wins_over_file() {
        let mut temp = NamedTempFile::new().unwrap();
        writeln!(temp, "environment = \"development\"").unwrap();

        let cli = serde_json::json!({"environment": "production"});
        let effective = EffectivePolicy::build(Some(temp.path()), Some(cli)).unwrap();

        assert_eq!(effective.policy().environment, Environment::Production);
    }

    #[test]
    fn test_missing_policy_file_is_skipped() {
        let effective =
            EffectivePolicy::build(Some(Path::new("/nonexistent/variants.toml")), None).unwrap();
        assert_eq!(effective.sources.len(), 1);
    }

    #[test]
    fn test_invalid_toml() {
        let mut temp = NamedTempFile::new().unwrap();
        writeln!(temp, "[app").unwrap();

        let err = EffectivePolicy::build(Some(temp.path()), None).unwrap_err();
        assert!(err.to_string().contains("TOML parse error"));
    }

    #[test]
    fn test_secret_redaction() {
        let effective = EffectivePolicy::build(None, None).unwrap();

        assert_eq!(
            effective.get_str("signing.identities.release.key_password"),
            Some(REDACTED)
        );
        assert_eq!(
            effective.get_str("signing.identities.release.store_password"),
            Some(REDACTED)
        );
        assert_eq!(
            effective.get_str("signing.identities.release.key_alias"),
            Some("upload")
        );
        assert!(effective
            .redactions
            .contains(&"signing.identities.release.key_password".to_string()));

        // The typed policy keeps the real value for signing.
        assert_eq!(
            effective.policy().signing.identities["release"].key_password,
            "android"
        );
    }

    #[test]
    fn test_serialized_policy_has_no_secrets() {
        let effective = EffectivePolicy::build(None, None).unwrap();
        let json = effective.to_json().unwrap();
        assert!(!json.contains("\"android\""));
    }

    #[test]
    fn test_validation_error_surfaces() {
        let cli = serde_json::json!({"app": {"min_sdk": 40}});
        let err = EffectivePolicy::build(None, Some(cli)).unwrap_err();
        assert!(matches!(err, PolicyError::ValidationError(_)));
    }

    #[test]
    fn test_for_layout_default_policy_is_optional() {
        let (_dir, layout) = project_with_policy(None);
        let effective = EffectivePolicy::for_layout(&layout, None, &[], None).unwrap();
        assert_eq!(effective.sources.len(), 1);

        let (_dir, layout) = project_with_policy(Some("[app]\nmin_sdk = 30\n"));
        let effective = EffectivePolicy::for_layout(&layout, None, &[], None).unwrap();
        assert_eq!(effective.policy().app.min_sdk, 30);
        assert_eq!(effective.sources[1].origin, PolicyOrigin::File);
    }

    #[test]
    fn test_for_layout_explicit_policy_must_exist() {
        let (dir, layout) = project_with_policy(None);
        let missing = dir.path().join("staging.toml");

        let err = EffectivePolicy::for_layout(&layout, Some(missing.as_path()), &[], None).unwrap_err();
        assert!(matches!(err, PolicyError::IoError(_)));
        assert!(err.to_string().contains("staging.toml"));
    }

    #[test]
    fn test_for_layout_environment_wins() {
        let (_dir, layout) = project_with_policy(Some("environment = \"development\"\n"));
        let overrides = vec!["environment=development".to_string()];

        let effective =
            EffectivePolicy::for_layout(&layout, None, &overrides, Some("production")).unwrap();
        assert_eq!(effective.policy().environment, Environment::Production);
        assert_eq!(effective.provenance["environment"], PolicyOrigin::Cli);
    }

    #[test]
    fn test_for_layout_rejects_unknown_environment() {
        let (_dir, layout) = project_with_policy(None);
        let err = EffectivePolicy::for_layout(&layout, None, &[], Some("staging")).unwrap_err();
        assert!(matches!(err, PolicyError::ValidationError(_)));
        assert!(err.to_string().contains("staging"));
    }
}
