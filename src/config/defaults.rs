//! Built-in build policy (layer 1)
//!
//! Hardcoded values for the app's Android module. Everything here can be
//! replaced by a policy file or CLI override, but never per variant.

use serde::{Deserialize, Serialize};

/// Built-in policy values
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BuiltinPolicy {
    /// Application id, identical for every variant
    pub application_id: String,

    /// Kotlin/Java namespace of the app module
    pub namespace: String,

    /// SDK bounds (compile 35, min 26, target 35)
    pub compile_sdk: u32,
    pub min_sdk: u32,
    pub target_sdk: u32,

    /// NDK used for native code
    pub ndk_version: String,

    /// Java source/target compatibility and Kotlin JVM target
    pub jvm_target: String,

    /// Flutter project root relative to the app module
    pub flutter_source: String,

    /// Version fallbacks when the overlay has no value
    pub version_code: u32,
    pub version_name: String,

    /// Environment selecting the signing binding column (default: production)
    pub environment: String,

    /// Release upload key
    pub release_key_alias: String,
    pub release_key_password: String,
    pub release_store_file: String,
    pub release_store_password: String,

    /// Plugins applied to every variant, in application order
    pub plugins: Vec<String>,

    /// Distribution plugin, registered only when a variant activates it
    pub distribution_plugin: String,

    /// Library dependencies of the app module
    pub dependencies: Vec<String>,
}

impl Default for BuiltinPolicy {
    fn default() -> Self {
        Self {
            application_id: "com.xburnsx.toutie_budget".to_string(),
            namespace: "com.xburnsx.toutie_budget".to_string(),
            compile_sdk: 35,
            min_sdk: 26,
            target_sdk: 35,
            ndk_version: "27.0.12077973".to_string(),
            jvm_target: "11".to_string(),
            flutter_source: "../..".to_string(),
            version_code: 1,
            version_name: "1.0".to_string(),
            environment: "production".to_string(),
            release_key_alias: "upload".to_string(),
            release_key_password: "android".to_string(),
            release_store_file: "upload-keystore.jks".to_string(),
            release_store_password: "android".to_string(),
            plugins: vec![
                "com.android.application".to_string(),
                "kotlin-android".to_string(),
                "com.google.gms.google-services".to_string(),
                "dev.flutter.flutter-gradle-plugin".to_string(),
            ],
            distribution_plugin: "com.google.firebase.appdistribution".to_string(),
            dependencies: vec!["androidx.core:core-splashscreen:1.0.1".to_string()],
        }
    }
}

impl BuiltinPolicy {
    /// Convert to the JSON shape of [`BuildPolicy`](super::BuildPolicy) for merging
    pub fn to_value(&self) -> serde_json::Value {
        serde_json::json!({
            "app": {
                "application_id": self.application_id,
                "namespace": self.namespace,
                "compile_sdk": self.compile_sdk,
                "min_sdk": self.min_sdk,
                "target_sdk": self.target_sdk,
                "ndk_version": self.ndk_version,
                "jvm_target": self.jvm_target,
                "flutter_source": self.flutter_source
            },
            "version": {
                "code": self.version_code,
                "name": self.version_name
            },
            "environment": self.environment,
            "signing": {
                "identities": {
                    "release": {
                        "key_alias": self.release_key_alias,
                        "key_password": self.release_key_password,
                        "store_file": self.release_store_file,
                        "store_password": self.release_store_password
                    }
                },
                "bindings": {
                    "debug": {
                        "development": "debug",
                        "production": "debug"
                    },
                    "release": {
                        "development": "release",
                        "production": "release"
                    }
                },
                "verify_store_files": false
            },
            "plugins": {
                "always": self.plugins,
                "distribution": self.distribution_plugin
            },
            "dependencies": self.dependencies
        })
    }
}
