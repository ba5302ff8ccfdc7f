//! Plugin registration seam between descriptors and the build engine.
//!
//! Descriptors only declare which conditional plugins a variant activates.
//! The engine owns the registry and performs the registration by calling
//! [`register_plugins`] with its [`PluginRegistry`] implementation.

use serde::Serialize;
use tracing::info;

use crate::variant::{BuildVariant, VariantDescriptor};

/// Plugin-registration hook exposed by the build engine.
pub trait PluginRegistry {
    /// Register `plugin_id` on the build-graph node of `variant`.
    fn register(&mut self, variant: BuildVariant, plugin_id: &str);
}

/// Register the conditional plugins of `descriptor` if it activates them.
///
/// Returns the number of plugins registered; zero when the variant does
/// not activate any.
pub fn register_plugins<R: PluginRegistry + ?Sized>(descriptor: &VariantDescriptor, registry: &mut R) -> usize {
    if !descriptor.plugin_activation() {
        return 0;
    }

    for plugin_id in descriptor.conditional_plugins() {
        info!(variant = %descriptor.variant(), plugin = %plugin_id, "registering conditional plugin");
        registry.register(descriptor.variant(), plugin_id);
    }
    descriptor.conditional_plugins().len()
}

/// A registration made against a [`RecordingRegistry`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Registration {
    pub variant: BuildVariant,
    pub plugin_id: String,
}

/// Registry that only records what it was asked to register.
#[derive(Debug, Clone, Default)]
pub struct RecordingRegistry {
    registrations: Vec<Registration>,
}

impl RecordingRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn registrations(&self) -> &[Registration] {
        &self.registrations
    }

    /// Plugins registered for `variant`, in registration order.
    pub fn plugins_for(&self, variant: BuildVariant) -> Vec<&str> {
        self.registrations
            .iter()
            .filter(|r| r.variant == variant)
            .map(|r| r.plugin_id.as_str())
            .collect()
    }
}

impl PluginRegistry for RecordingRegistry {
    fn register(&mut self, variant: BuildVariant, plugin_id: &str) {
        self.registrations.push(Registration {
            variant,
            plugin_id: plugin_id.to_string(),
        });
    }
}
