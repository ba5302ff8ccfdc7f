//! Errors raised while resolving a variant descriptor.
//!
//! Every variant here is fatal for the variant being built. The one
//! non-fatal condition, a missing overlay file, is a
//! [`Diagnostic`](variant_props::Diagnostic) rather than an error.

use variant_props::PropertyError;

use crate::config::PolicyError;
use crate::signing::Environment;
use crate::variant::BuildVariant;

/// Fatal configuration failure for a single variant.
#[derive(Debug, thiserror::Error)]
pub enum ConfigurationError {
    #[error("unknown build variant '{0}' (expected 'debug' or 'release')")]
    UnknownVariant(String),

    #[error("unknown environment '{0}' (expected 'development' or 'production')")]
    UnknownEnvironment(String),

    #[error("property '{key}' must be a non-negative integer, got '{value}'")]
    MalformedNumericProperty { key: String, value: String },

    #[error("no signing identity available for {variant} ({environment}): {reason}")]
    SigningIdentityUnavailable {
        variant: BuildVariant,
        environment: Environment,
        reason: String,
    },

    #[error("overlay error: {0}")]
    Overlay(PropertyError),

    #[error("policy error: {0}")]
    Policy(#[from] PolicyError),

    #[error("descriptor key error: {0}")]
    DescriptorKey(String),
}

impl From<PropertyError> for ConfigurationError {
    fn from(err: PropertyError) -> Self {
        match err {
            PropertyError::MalformedNumericProperty { key, value } => {
                Self::MalformedNumericProperty { key, value }
            }
            other => Self::Overlay(other),
        }
    }
}
