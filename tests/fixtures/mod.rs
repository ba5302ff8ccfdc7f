//! Test fixtures for variant resolution
//!
//! This module provides:
//! - Sample policy files (tests/fixtures/policies)
//! - A sample Flutter-generated overlay (tests/fixtures/overlays)
//! - A throwaway Android project directory backed by a TempDir

#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};

use android_variants::ProjectLayout;
use tempfile::TempDir;

/// Path to a policy fixture by file name
pub fn policy_fixture(name: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests/fixtures/policies")
        .join(name)
}

/// Path to the sample overlay written by `flutter build`
pub fn overlay_fixture() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/overlays/local.properties")
}

/// An Android project directory (`android/` with an `app/` module) that
/// lives as long as the value.
pub struct AndroidProject {
    _dir: TempDir,
    pub layout: ProjectLayout,
}

impl AndroidProject {
    /// Project without `local.properties`
    pub fn new() -> Self {
        let dir = TempDir::new().unwrap();
        let root = dir.path().join("android");
        fs::create_dir_all(root.join("app")).unwrap();
        Self {
            layout: ProjectLayout::new(root),
            _dir: dir,
        }
    }

    /// Project whose `local.properties` has the given contents
    pub fn with_overlay(contents: &str) -> Self {
        let project = Self::new();
        project.write_overlay(contents);
        project
    }

    pub fn write_overlay(&self, contents: &str) {
        fs::write(self.layout.overlay_path(), contents).unwrap();
    }

    pub fn write_policy(&self, contents: &str) {
        fs::write(self.layout.policy_path(), contents).unwrap();
    }

    /// Create an opaque key-store file under the app module
    pub fn write_key_store(&self, relative: &str) {
        let path = self.layout.app_dir().join(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(path, b"not a real key store").unwrap();
    }
}
