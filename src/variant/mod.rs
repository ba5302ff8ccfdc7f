//! Build variants and their fixed per-variant policy.
//!
//! The variant set is closed: `debug` and `release`. Anything else is a
//! configuration error, not an extension point.

mod builder;
mod descriptor;

pub use builder::VariantDescriptorBuilder;
pub use descriptor::{VariantDescriptor, DESCRIPTOR_SCHEMA_ID, DESCRIPTOR_SCHEMA_VERSION};

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::ConfigurationError;

/// One of the two fixed build variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BuildVariant {
    Debug,
    Release,
}

impl BuildVariant {
    /// Every variant, in build order.
    pub const ALL: [BuildVariant; 2] = [BuildVariant::Debug, BuildVariant::Release];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Debug => "debug",
            Self::Release => "release",
        }
    }

    /// Fixed optimization and tooling policy for this variant.
    pub fn policy(self) -> VariantPolicy {
        match self {
            Self::Debug => VariantPolicy {
                minify: false,
                shrink_resources: false,
                debug_symbol_level: None,
                plugin_activation: false,
            },
            Self::Release => VariantPolicy {
                minify: true,
                shrink_resources: true,
                debug_symbol_level: Some(DebugSymbolLevel::SymbolTable),
                plugin_activation: true,
            },
        }
    }
}

impl fmt::Display for BuildVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BuildVariant {
    type Err = ConfigurationError;

    /// Exact, case-sensitive match on the variant tag.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "debug" => Ok(Self::Debug),
            "release" => Ok(Self::Release),
            other => Err(ConfigurationError::UnknownVariant(other.to_string())),
        }
    }
}

/// Native debug-symbol retention level packaged with the build.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DebugSymbolLevel {
    SymbolTable,
}

/// Per-variant flags that do not depend on any external input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VariantPolicy {
    pub minify: bool,
    pub shrink_resources: bool,
    pub debug_symbol_level: Option<DebugSymbolLevel>,
    /// Whether the distribution plugin is registered for this variant.
    pub plugin_activation: bool,
}
