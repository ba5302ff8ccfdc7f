//! Overlay property store for Android build configuration.
//!
//! Reads the untracked `local.properties` overlay once per resolution
//! session and answers exact-match lookups against it, falling back to
//! caller-supplied defaults. A missing overlay file is not an error: the
//! store degrades to empty and a [`Diagnostic`] is recorded.

mod error;
mod parser;
mod resolver;
mod store;

pub use error::{Diagnostic, PropertyError};
pub use parser::parse_properties;
pub use resolver::PropertyResolver;
pub use store::{PropertyKey, PropertyStore};

/// File name of the overlay, relative to the Android project root.
pub const OVERLAY_FILE_NAME: &str = "local.properties";

/// Well-known overlay keys written by the Flutter and Android tooling.
pub mod keys {
    use crate::PropertyKey;

    /// Integer version code of the build.
    pub const VERSION_CODE: PropertyKey = PropertyKey::from_static("flutter.versionCode");

    /// Human-readable version name of the build.
    pub const VERSION_NAME: PropertyKey = PropertyKey::from_static("flutter.versionName");

    /// Location of the Flutter SDK.
    pub const FLUTTER_SDK: PropertyKey = PropertyKey::from_static("flutter.sdk");

    /// Location of the Android SDK.
    pub const ANDROID_SDK: PropertyKey = PropertyKey::from_static("sdk.dir");
}
