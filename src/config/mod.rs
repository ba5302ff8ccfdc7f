//! Build policy merge system
//!
//! Implements the 3-layer policy merge:
//! 1. Built-in policy
//! 2. Policy file (e.g. android/variants.toml)
//! 3. CLI overrides (`--set key=value`)

mod defaults;
mod effective;
mod merge;
mod policy;

pub use defaults::BuiltinPolicy;
pub use effective::{EffectivePolicy, PolicyError, PolicySource};
pub use merge::{deep_merge, merge_layers, overrides_from_assignments, MergedLayers, PolicyOrigin};
pub use policy::{AppPolicy, BuildPolicy, PluginPolicy, VersionDefaults};
