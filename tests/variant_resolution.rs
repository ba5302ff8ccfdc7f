//! End-to-end variant resolution against on-disk Android projects.
//!
//! Covers the overlay scenarios (absent, numeric, malformed), the fixed
//! debug/release policy, and conditional plugin registration.

mod fixtures;

use android_variants::{
    register_plugins, BuildPolicy, BuildVariant, ConfigurationError, DebugSymbolLevel,
    Diagnostic, PropertyResolver, RecordingRegistry, VariantDescriptorBuilder,
};
use fixtures::{overlay_fixture, AndroidProject};

fn builtin() -> BuildPolicy {
    BuildPolicy::builtin().unwrap()
}

// =============================================================================
// Overlay scenarios
// =============================================================================

#[test]
fn test_absent_overlay_resolves_default() {
    let project = AndroidProject::new();
    let properties = PropertyResolver::new(project.layout.overlay_path());

    assert_eq!(properties.resolve("flutter.versionCode", "1").unwrap(), "1");
}

#[test]
fn test_absent_overlay_descriptor_uses_defaults_and_reports_diagnostic() {
    let project = AndroidProject::new();
    let policy = builtin();
    let properties = PropertyResolver::new(project.layout.overlay_path());
    let builder = VariantDescriptorBuilder::new(&policy, &properties, project.layout.app_dir());

    let descriptor = builder.build(BuildVariant::Release).unwrap();

    assert_eq!(descriptor.version_code(), 1);
    assert_eq!(descriptor.version_name(), "1.0");
    assert_eq!(
        descriptor.diagnostics(),
        [Diagnostic::MissingOverlayFile {
            path: project.layout.overlay_path()
        }]
    );
}

#[test]
fn test_overlay_version_code_42() {
    let project = AndroidProject::with_overlay("flutter.versionCode=42\n");
    let policy = builtin();
    let properties = PropertyResolver::new(project.layout.overlay_path());
    let builder = VariantDescriptorBuilder::new(&policy, &properties, project.layout.app_dir());

    let descriptor = builder.build(BuildVariant::Release).unwrap();

    assert_eq!(descriptor.version_code(), 42);
    assert_eq!(descriptor.version_name(), "1.0");
    assert!(descriptor.diagnostics().is_empty());
}

#[test]
fn test_overlay_malformed_version_code() {
    let project = AndroidProject::with_overlay("flutter.versionCode=abc\n");
    let policy = builtin();
    let properties = PropertyResolver::new(project.layout.overlay_path());
    let builder = VariantDescriptorBuilder::new(&policy, &properties, project.layout.app_dir());

    match builder.build(BuildVariant::Release) {
        Err(ConfigurationError::MalformedNumericProperty { key, value }) => {
            assert_eq!(key, "flutter.versionCode");
            assert_eq!(value, "abc");
        }
        other => panic!("expected MalformedNumericProperty, got {other:?}"),
    }
}

#[test]
fn test_flutter_generated_overlay() {
    let policy = builtin();
    let properties = PropertyResolver::new(overlay_fixture());
    let builder = VariantDescriptorBuilder::new(&policy, &properties, "app");

    let descriptor = builder.build(BuildVariant::Release).unwrap();
    assert_eq!(descriptor.version_code(), 57);
    assert_eq!(descriptor.version_name(), "2.1.0");

    assert_eq!(
        properties.resolve("sdk.dir", "").unwrap(),
        "C:\\Users\\dev\\AppData\\Local\\Android\\sdk"
    );
}

#[test]
fn test_overlay_read_once_per_session() {
    let project = AndroidProject::with_overlay("flutter.versionCode=10\nflutter.versionName=1.0.10\n");
    let policy = builtin();
    let properties = PropertyResolver::new(project.layout.overlay_path());
    let builder = VariantDescriptorBuilder::new(&policy, &properties, project.layout.app_dir());

    let debug = builder.build(BuildVariant::Debug).unwrap();
    project.write_overlay("flutter.versionCode=11\nflutter.versionName=1.0.11\n");
    let release = builder.build(BuildVariant::Release).unwrap();

    assert_eq!(debug.version_code(), release.version_code());
    assert_eq!(debug.version_name(), release.version_name());
}

#[test]
fn test_unreadable_overlay_is_fatal() {
    let project = AndroidProject::with_overlay("flutter.versionName=\\u12\n");
    let policy = builtin();
    let properties = PropertyResolver::new(project.layout.overlay_path());
    let builder = VariantDescriptorBuilder::new(&policy, &properties, project.layout.app_dir());

    assert!(matches!(
        builder.build(BuildVariant::Debug),
        Err(ConfigurationError::Overlay(_))
    ));
}

// =============================================================================
// Variant policy
// =============================================================================

#[test]
fn test_unknown_variant() {
    let project = AndroidProject::new();
    let policy = builtin();
    let properties = PropertyResolver::new(project.layout.overlay_path());
    let builder = VariantDescriptorBuilder::new(&policy, &properties, project.layout.app_dir());

    let err = builder.build_named("canary").unwrap_err();
    assert!(matches!(err, ConfigurationError::UnknownVariant(ref tag) if tag == "canary"));
    assert!(err.to_string().contains("canary"));
}

#[test]
fn test_plugin_activation_by_variant() {
    let project = AndroidProject::new();
    let policy = builtin();
    let properties = PropertyResolver::new(project.layout.overlay_path());
    let builder = VariantDescriptorBuilder::new(&policy, &properties, project.layout.app_dir());

    assert!(builder.build(BuildVariant::Release).unwrap().plugin_activation());
    assert!(!builder.build(BuildVariant::Debug).unwrap().plugin_activation());
}

#[test]
fn test_release_and_debug_signing_differ() {
    let project = AndroidProject::new();
    let policy = builtin();
    let properties = PropertyResolver::new(project.layout.overlay_path());
    let builder = VariantDescriptorBuilder::new(&policy, &properties, project.layout.app_dir());

    let release = builder.build(BuildVariant::Release).unwrap();
    let debug = builder.build(BuildVariant::Debug).unwrap();

    assert_ne!(release.signing_identity(), debug.signing_identity());
    assert_ne!(release.signing_fingerprint(), debug.signing_fingerprint());
    assert!(!release.signing_fallback());
}

#[test]
fn test_release_optimizations() {
    let project = AndroidProject::new();
    let policy = builtin();
    let properties = PropertyResolver::new(project.layout.overlay_path());
    let builder = VariantDescriptorBuilder::new(&policy, &properties, project.layout.app_dir());

    let release = builder.build(BuildVariant::Release).unwrap();
    assert!(release.minify());
    assert!(release.shrink_resources());
    assert_eq!(release.debug_symbol_level(), Some(DebugSymbolLevel::SymbolTable));

    let debug = builder.build(BuildVariant::Debug).unwrap();
    assert!(!debug.minify());
    assert!(!debug.shrink_resources());
    assert_eq!(debug.debug_symbol_level(), None);
}

#[test]
fn test_static_attributes() {
    let project = AndroidProject::new();
    let policy = builtin();
    let properties = PropertyResolver::new(project.layout.overlay_path());
    let builder = VariantDescriptorBuilder::new(&policy, &properties, project.layout.app_dir());

    for variant in BuildVariant::ALL {
        let d = builder.build(variant).unwrap();
        assert_eq!(d.application_id(), "com.xburnsx.toutie_budget");
        assert_eq!(d.namespace(), "com.xburnsx.toutie_budget");
        assert_eq!((d.min_sdk(), d.target_sdk(), d.compile_sdk()), (26, 35, 35));
        assert_eq!(d.ndk_version(), "27.0.12077973");
        assert_eq!(d.jvm_target(), "11");
        assert_eq!(d.flutter_source(), "../..");
        assert_eq!(d.dependencies(), ["androidx.core:core-splashscreen:1.0.1"]);
        assert!(d.plugins().iter().any(|p| p == "dev.flutter.flutter-gradle-plugin"));
        assert!(!d.plugins().iter().any(|p| p == "com.google.firebase.appdistribution"));
    }
}

// =============================================================================
// Plugin registration
// =============================================================================

#[test]
fn test_engine_registers_distribution_plugin_for_release_only() {
    let project = AndroidProject::new();
    let policy = builtin();
    let properties = PropertyResolver::new(project.layout.overlay_path());
    let builder = VariantDescriptorBuilder::new(&policy, &properties, project.layout.app_dir());
    let mut registry = RecordingRegistry::new();

    for (_, result) in builder.build_all() {
        register_plugins(&result.unwrap(), &mut registry);
    }

    assert_eq!(
        registry.plugins_for(BuildVariant::Release),
        vec!["com.google.firebase.appdistribution"]
    );
    assert!(registry.plugins_for(BuildVariant::Debug).is_empty());
}
