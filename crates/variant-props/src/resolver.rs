//! Session-scoped property resolution with lazy, one-time overlay loading.

use std::cell::OnceCell;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::error::{Diagnostic, PropertyError};
use crate::store::PropertyStore;

#[derive(Debug)]
struct LoadedOverlay {
    store: PropertyStore,
    diagnostic: Option<Diagnostic>,
}

/// Resolves overlay keys against a lazily loaded [`PropertyStore`].
///
/// The overlay is read at most once per resolver: the first lookup loads
/// it and every later lookup sees that same snapshot, even if the file
/// changes on disk in between.
#[derive(Debug)]
pub struct PropertyResolver {
    path: PathBuf,
    overlay: OnceCell<LoadedOverlay>,
}

impl PropertyResolver {
    /// Resolver backed by the overlay file at `path`. Nothing is read yet.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            overlay: OnceCell::new(),
        }
    }

    /// Resolver over an already loaded store; `path` is only informational.
    pub fn from_store(path: impl Into<PathBuf>, store: PropertyStore) -> Self {
        Self {
            path: path.into(),
            overlay: OnceCell::from(LoadedOverlay {
                store,
                diagnostic: None,
            }),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Whether the overlay has been loaded in this session.
    pub fn is_loaded(&self) -> bool {
        self.overlay.get().is_some()
    }

    /// The overlay store, loading it on first use.
    pub fn store(&self) -> Result<&PropertyStore, PropertyError> {
        Ok(&self.loaded()?.store)
    }

    /// Non-fatal conditions met while loading. Empty until the first lookup.
    pub fn diagnostics(&self) -> Vec<Diagnostic> {
        self.overlay
            .get()
            .and_then(|o| o.diagnostic.clone())
            .into_iter()
            .collect()
    }

    /// Stored value for `key`, or `default` when the key is absent.
    ///
    /// A missing key or a missing overlay file never fails; only an
    /// overlay that exists but cannot be read or parsed does.
    pub fn resolve(&self, key: impl AsRef<str>, default: &str) -> Result<String, PropertyError> {
        let key = key.as_ref();
        let value = match self.store()?.get(key) {
            Some(value) => value.to_string(),
            None => {
                debug!(key, default, "property not in overlay, using default");
                default.to_string()
            }
        };
        Ok(value)
    }

    /// Resolve `key` and parse it as a non-negative 32-bit integer.
    ///
    /// A value that is present but not an integer is fatal.
    pub fn resolve_u32(&self, key: impl AsRef<str>, default: u32) -> Result<u32, PropertyError> {
        let key = key.as_ref();
        let raw = self.resolve(key, &default.to_string())?;
        raw.parse::<u32>()
            .map_err(|_| PropertyError::MalformedNumericProperty {
                key: key.to_string(),
                value: raw,
            })
    }

    fn loaded(&self) -> Result<&LoadedOverlay, PropertyError> {
        if let Some(overlay) = self.overlay.get() {
            return Ok(overlay);
        }
        let overlay = load_overlay(&self.path)?;
        Ok(self.overlay.get_or_init(|| overlay))
    }
}

fn load_overlay(path: &Path) -> Result<LoadedOverlay, PropertyError> {
    match fs::read(path) {
        Ok(bytes) => {
            let text = String::from_utf8(bytes).map_err(|e| PropertyError::OverlayUnreadable {
                path: path.to_path_buf(),
                source: io::Error::new(io::ErrorKind::InvalidData, e),
            })?;
            let store = PropertyStore::parse(&text, path)?;
            debug!(path = %path.display(), entries = store.len(), "loaded overlay");
            Ok(LoadedOverlay {
                store,
                diagnostic: None,
            })
        }
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            let diagnostic = Diagnostic::MissingOverlayFile {
                path: path.to_path_buf(),
            };
            warn!("{}", diagnostic);
            Ok(LoadedOverlay {
                store: PropertyStore::empty(),
                diagnostic: Some(diagnostic),
            })
        }
        Err(source) => Err(PropertyError::OverlayUnreadable {
            path: path.to_path_buf(),
            source,
        }),
    }
}
