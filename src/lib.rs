//! Android build-variant configuration resolver
//!
//! Resolves, for each build variant of a Flutter app's Android module, the
//! application id and SDK levels, the version metadata from
//! `local.properties`, the signing identity, and whether the distribution
//! plugin is activated. The result is an immutable [`VariantDescriptor`]
//! that the build engine consumes; conditional plugins are registered by
//! the engine through [`plugin::register_plugins`].
//!
//! ```no_run
//! use android_variants::{BuildPolicy, BuildVariant, ProjectLayout, PropertyResolver, VariantDescriptorBuilder};
//!
//! let layout = ProjectLayout::new("android");
//! let policy = BuildPolicy::builtin().unwrap();
//! let properties = PropertyResolver::new(layout.overlay_path());
//! let builder = VariantDescriptorBuilder::new(&policy, &properties, layout.app_dir());
//! let release = builder.build(BuildVariant::Release).unwrap();
//! assert!(release.plugin_activation());
//! ```

pub mod config;
pub mod error;
pub mod layout;
pub mod plugin;
pub mod signing;
pub mod variant;

pub use config::{BuildPolicy, EffectivePolicy, PolicyError};
pub use error::ConfigurationError;
pub use layout::ProjectLayout;
pub use plugin::{register_plugins, PluginRegistry, RecordingRegistry};
pub use signing::{Environment, SigningIdentity, SigningPolicy};
pub use variant::{BuildVariant, DebugSymbolLevel, VariantDescriptor, VariantDescriptorBuilder};
pub use variant_props::{Diagnostic, PropertyError, PropertyKey, PropertyResolver, PropertyStore};
