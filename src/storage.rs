//! Key/value storage backends for saved graphs.
//!
//! The editor never touches browser or filesystem storage directly; it goes
//! through [`KeyValueStore`] so the persistence layer can be exercised with
//! [`MemoryStore`] in tests.

use crate::error::EditorError;
use std::collections::HashMap;

/// Minimal string storage capability.
pub trait KeyValueStore {
    /// Reads the value stored under `key`, if any.
    fn get(&self, key: &str) -> Result<Option<String>, EditorError>;

    /// Stores `value` under `key`, replacing any previous value.
    fn set(&mut self, key: &str, value: &str) -> Result<(), EditorError>;

    /// Deletes the value stored under `key`. Missing keys are not an error.
    fn remove(&mut self, key: &str) -> Result<(), EditorError>;
}

/// In-memory store, used in tests and as a last-resort fallback.
#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    entries: HashMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, EditorError> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), EditorError> {
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), EditorError> {
        self.entries.remove(key);
        Ok(())
    }
}

/// Stores each key as a `<key>.json` file inside a directory (native only).
#[cfg(not(target_arch = "wasm32"))]
#[derive(Debug, Clone)]
pub struct DirStore {
    dir: std::path::PathBuf,
}

#[cfg(not(target_arch = "wasm32"))]
impl DirStore {
    /// Creates a store rooted at `dir`. The directory is created on first write.
    pub fn new(dir: impl Into<std::path::PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Store rooted in eframe's per-application data directory, or the working
    /// directory when the platform has none.
    pub fn for_app() -> Self {
        let dir = eframe::storage_dir(crate::constants::APP_ID)
            .unwrap_or_else(|| std::path::PathBuf::from("."));
        Self::new(dir)
    }

    fn path_for(&self, key: &str) -> std::path::PathBuf {
        self.dir.join(format!("{key}.json"))
    }
}

#[cfg(not(target_arch = "wasm32"))]
impl KeyValueStore for DirStore {
    fn get(&self, key: &str) -> Result<Option<String>, EditorError> {
        match std::fs::read_to_string(self.path_for(key)) {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), EditorError> {
        std::fs::create_dir_all(&self.dir)?;
        std::fs::write(self.path_for(key), value)?;
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), EditorError> {
        match std::fs::remove_file(self.path_for(key)) {
            Err(e) if e.kind() != std::io::ErrorKind::NotFound => Err(e.into()),
            _ => Ok(()),
        }
    }
}

/// Browser `localStorage` (WASM only).
#[cfg(target_arch = "wasm32")]
pub struct BrowserStore {
    storage: web_sys::Storage,
}

#[cfg(target_arch = "wasm32")]
impl BrowserStore {
    /// Opens the window's local storage.
    pub fn open() -> Result<Self, EditorError> {
        let window =
            web_sys::window().ok_or_else(|| EditorError::Storage("No window found".into()))?;
        let storage = window
            .local_storage()
            .map_err(|e| EditorError::Storage(format!("{e:?}")))?
            .ok_or_else(|| EditorError::Storage("localStorage is disabled".into()))?;
        Ok(Self { storage })
    }
}

#[cfg(target_arch = "wasm32")]
impl KeyValueStore for BrowserStore {
    fn get(&self, key: &str) -> Result<Option<String>, EditorError> {
        self.storage
            .get_item(key)
            .map_err(|e| EditorError::Storage(format!("{e:?}")))
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), EditorError> {
        self.storage
            .set_item(key, value)
            .map_err(|e| EditorError::Storage(format!("{e:?}")))
    }

    fn remove(&mut self, key: &str) -> Result<(), EditorError> {
        self.storage
            .remove_item(key)
            .map_err(|e| EditorError::Storage(format!("{e:?}")))
    }
}

/// Picks the platform's default store: `localStorage` on the web, the app data
/// directory natively. Falls back to memory when the browser denies storage.
pub fn default_store() -> Box<dyn KeyValueStore> {
    #[cfg(target_arch = "wasm32")]
    {
        match BrowserStore::open() {
            Ok(store) => Box::new(store),
            Err(e) => {
                log::warn!("{e}; saved graphs will not survive a reload");
                Box::new(MemoryStore::new())
            }
        }
    }

    #[cfg(not(target_arch = "wasm32"))]
    {
        Box::new(DirStore::for_app())
    }
}
