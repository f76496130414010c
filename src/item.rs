//! Media items — the payload the preparser works on.

use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::watch;
use uuid::Uuid;

/// Type classification of a media item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemType {
    /// Unclassified item.
    Unknown,
    /// Local or remote regular media file.
    File,
    /// Browsable directory.
    Directory,
    /// Optical disc.
    Disc,
    /// Live or on-demand stream.
    Stream,
    /// Playlist file expanding into sub-items.
    Playlist,
    /// Logical grouping node.
    Node,
}

/// Terminal status of one preparse request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PreparseStatus {
    /// The item was not eligible and never entered the pool.
    Skipped,
    /// Metadata extraction failed to start or ended in error.
    Failed,
    /// Extraction did not finish before the deadline (or was cancelled).
    Timeout,
    /// Metadata extraction completed.
    Done,
}

/// Fields read and written under the item lock.
#[derive(Debug)]
struct ItemMeta {
    item_type: ItemType,
    network: bool,
    meta: serde_json::Value,
}

/// A media item submitted for metadata extraction.
///
/// Shared across the pool, the input subsystem and the fetcher via `Arc`; the
/// pool holds one reference for the lifetime of each task. Type and network
/// classification live behind an internal lock, the preparse outcome is
/// published through a watch channel exactly once.
#[derive(Debug)]
pub struct Item {
    id: Uuid,
    uri: String,
    name: String,
    created_at: DateTime<Utc>,
    locked: Mutex<ItemMeta>,
    preparsed: AtomicBool,
    signalled: AtomicBool,
    ended_tx: watch::Sender<Option<PreparseStatus>>,
}

impl Item {
    /// Create a new item.
    pub fn new(
        uri: impl Into<String>,
        name: impl Into<String>,
        item_type: ItemType,
        network: bool,
    ) -> Self {
        let (ended_tx, _) = watch::channel(None);
        Self {
            id: Uuid::new_v4(),
            uri: uri.into(),
            name: name.into(),
            created_at: Utc::now(),
            locked: Mutex::new(ItemMeta {
                item_type,
                network,
                meta: serde_json::Value::Null,
            }),
            preparsed: AtomicBool::new(false),
            signalled: AtomicBool::new(false),
            ended_tx,
        }
    }

    /// Unique item ID.
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Item location.
    pub fn uri(&self) -> &str {
        &self.uri
    }

    /// Display name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// When the item was created.
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Current type classification.
    pub fn item_type(&self) -> ItemType {
        self.locked.lock().unwrap().item_type
    }

    /// Whether the item is hosted on the network.
    pub fn is_network(&self) -> bool {
        self.locked.lock().unwrap().network
    }

    /// Type and network flag read under one lock acquisition, so eligibility
    /// decisions see a consistent pair.
    pub fn classification(&self) -> (ItemType, bool) {
        let locked = self.locked.lock().unwrap();
        (locked.item_type, locked.network)
    }

    /// Reclassify the item (playlist expansion may refine the type).
    pub fn set_item_type(&self, item_type: ItemType) {
        self.locked.lock().unwrap().item_type = item_type;
    }

    /// Extracted metadata, `Null` until a preparse run stores some.
    pub fn meta(&self) -> serde_json::Value {
        self.locked.lock().unwrap().meta.clone()
    }

    /// Store extracted metadata.
    pub fn set_meta(&self, meta: serde_json::Value) {
        self.locked.lock().unwrap().meta = meta;
    }

    /// Whether a preparse run has completed for this item.
    pub fn is_preparsed(&self) -> bool {
        self.preparsed.load(Ordering::SeqCst)
    }

    /// Mark the item as preparsed.
    pub fn set_preparsed(&self, preparsed: bool) {
        self.preparsed.store(preparsed, Ordering::SeqCst);
    }

    /// Publish the terminal preparse status.
    ///
    /// Only the first call wins; later calls are ignored so every submission
    /// produces at most one end-of-preparse notification.
    pub fn signal_preparse_ended(&self, status: PreparseStatus) {
        if self.signalled.swap(true, Ordering::SeqCst) {
            tracing::debug!(item = %self.id, ?status, "Duplicate preparse-ended signal ignored");
            return;
        }
        self.ended_tx.send_replace(Some(status));
    }

    /// Whether the terminal status has been signalled.
    pub fn is_signalled(&self) -> bool {
        self.signalled.load(Ordering::SeqCst)
    }

    /// Subscribe to the end-of-preparse notification.
    pub fn subscribe_preparse(&self) -> watch::Receiver<Option<PreparseStatus>> {
        self.ended_tx.subscribe()
    }

    /// Wait until the preparse run for this item has ended.
    pub async fn wait_preparse_ended(&self) -> PreparseStatus {
        let mut rx = self.subscribe_preparse();
        loop {
            if let Some(status) = *rx.borrow_and_update() {
                return status;
            }
            // Sender lives inside this item, so the channel cannot close.
            rx.changed().await.expect("item outlives its watch channel");
        }
    }
}
