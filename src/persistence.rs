//! Saving, loading, exporting and importing graph snapshots.
//!
//! Two independent paths exist: a local snapshot kept in a [`KeyValueStore`]
//! under the variant's key, and a downloadable JSON document stamped with a
//! `created` timestamp. Neither path validates the graph.

use crate::config::EditorVariant;
use crate::error::EditorError;
use crate::graph::GraphModel;
use crate::snapshot::Snapshot;
use crate::storage::KeyValueStore;
use chrono::{DateTime, SecondsFormat, Utc};

/// Moves snapshots between a [`GraphModel`] and storage or files.
pub struct PersistenceBridge {
    store: Box<dyn KeyValueStore>,
    variant: EditorVariant,
}

impl PersistenceBridge {
    /// Creates a bridge for `variant` backed by `store`.
    pub fn new(store: Box<dyn KeyValueStore>, variant: EditorVariant) -> Self {
        Self { store, variant }
    }

    /// The variant whose storage key is in use.
    pub fn variant(&self) -> EditorVariant {
        self.variant
    }

    /// Switches to another variant's storage key.
    pub fn set_variant(&mut self, variant: EditorVariant) {
        self.variant = variant;
    }

    /// Stores the graph's snapshot, overwriting any previous one.
    pub fn save(&mut self, graph: &GraphModel) -> Result<(), EditorError> {
        let json = graph.serialize().to_json()?;
        self.store.set(self.variant.storage_key(), &json)?;
        log::info!(
            "Saved {} nodes under '{}'",
            graph.nodes().len(),
            self.variant.storage_key()
        );
        Ok(())
    }

    /// Reads the stored snapshot.
    ///
    /// # Returns
    ///
    /// `Ok(None)` when nothing has been saved, or an error if the stored value
    /// is malformed or the store is unavailable.
    pub fn load(&self) -> Result<Option<Snapshot>, EditorError> {
        match self.store.get(self.variant.storage_key())? {
            Some(json) => Ok(Some(Snapshot::from_json(&json)?)),
            None => Ok(None),
        }
    }

    /// Replaces `graph` with the stored snapshot if one exists.
    ///
    /// # Returns
    ///
    /// `true` if a snapshot was loaded. On error the graph is left untouched.
    pub fn load_into(&self, graph: &mut GraphModel) -> Result<bool, EditorError> {
        match self.load()? {
            Some(snapshot) => {
                graph.deserialize(snapshot);
                log::info!("Loaded {} nodes from storage", graph.nodes().len());
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Deletes the stored snapshot.
    pub fn clear(&mut self) -> Result<(), EditorError> {
        self.store.remove(self.variant.storage_key())
    }

    /// Pretty-printed export document with a `created` timestamp.
    pub fn export_document(
        graph: &GraphModel,
        created: DateTime<Utc>,
    ) -> Result<String, EditorError> {
        let mut snapshot = graph.serialize();
        snapshot.created = Some(created.to_rfc3339_opts(SecondsFormat::Millis, true));
        Ok(snapshot.to_json_pretty()?)
    }

    /// Parses a previously exported document.
    pub fn import_document(json: &str) -> Result<Snapshot, EditorError> {
        Ok(Snapshot::from_json(json)?)
    }
}
