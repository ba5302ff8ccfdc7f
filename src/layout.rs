//! Fixed file locations inside an Android project directory.

use std::path::{Path, PathBuf};
use variant_props::OVERLAY_FILE_NAME;

/// Default policy file name, next to the overlay.
pub const POLICY_FILE_NAME: &str = "variants.toml";

/// App module directory name.
pub const APP_MODULE_DIR: &str = "app";

/// Paths derived from the Android project root (the `android/` directory
/// of a Flutter project).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectLayout {
    root: PathBuf,
}

impl ProjectLayout {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// `local.properties` overlay.
    pub fn overlay_path(&self) -> PathBuf {
        self.root.join(OVERLAY_FILE_NAME)
    }

    /// Optional policy file layer.
    pub fn policy_path(&self) -> PathBuf {
        self.root.join(POLICY_FILE_NAME)
    }

    /// App module; relative key-store paths resolve against it.
    pub fn app_dir(&self) -> PathBuf {
        self.root.join(APP_MODULE_DIR)
    }
}
