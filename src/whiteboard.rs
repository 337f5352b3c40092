use log::{debug, error, info};
use serde::{Deserialize, Serialize};

use crate::{
    clock_id, load_records, now_millis, save_collection, KeyValueStore, Result, WorkdeskError,
    WHITEBOARD_KEY,
};

/// A text block pinned somewhere on the whiteboard
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WhiteboardItem {
    pub id: u64,
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub x: f64,
    #[serde(default)]
    pub y: f64,
    /// At most one item is being edited at a time
    #[serde(default)]
    pub is_editing: bool,
}

pub struct Whiteboard<S: KeyValueStore> {
    backend: S,
    items: Vec<WhiteboardItem>,
}

impl<S: KeyValueStore> Whiteboard<S> {
    pub fn open(backend: S) -> Self {
        let items = load_records(&backend, WHITEBOARD_KEY)
            .into_option()
            .unwrap_or_default();
        Self { backend, items }
    }

    pub fn items(&self) -> &[WhiteboardItem] {
        &self.items
    }

    pub fn item(&self, id: u64) -> Option<&WhiteboardItem> {
        self.items.iter().find(|i| i.id == id)
    }

    /// Drops a new empty block at (x, y) and makes it the one being edited
    pub fn add_item(&mut self, x: f64, y: f64) -> u64 {
        self.add_item_at(x, y, now_millis())
    }

    pub fn add_item_at(&mut self, x: f64, y: f64, now_ms: i64) -> u64 {
        for item in &mut self.items {
            item.is_editing = false;
        }
        let id = clock_id(now_ms, self.items.iter().map(|i| i.id));
        self.items.push(WhiteboardItem {
            id,
            text: String::new(),
            x,
            y,
            is_editing: true,
        });
        debug!("Added whiteboard item {} at ({}, {})", id, x, y);
        self.persist();
        id
    }

    pub fn update_position(&mut self, id: u64, x: f64, y: f64) -> Result<()> {
        let item = self.item_mut(id)?;
        item.x = x;
        item.y = y;
        self.persist();
        Ok(())
    }

    /// Sets the text of a block and ends its editing state
    pub fn update_text(&mut self, id: u64, text: impl Into<String>) -> Result<()> {
        let item = self.item_mut(id)?;
        item.text = text.into();
        item.is_editing = false;
        self.persist();
        Ok(())
    }

    pub fn remove_item(&mut self, id: u64) -> bool {
        let before = self.items.len();
        self.items.retain(|i| i.id != id);
        if self.items.len() == before {
            return false;
        }
        self.persist();
        true
    }

    pub fn clear_all(&mut self) {
        info!("Clearing {} whiteboard items", self.items.len());
        self.items.clear();
        self.persist();
    }

    pub fn save(&mut self) -> Result<()> {
        save_collection(&mut self.backend, WHITEBOARD_KEY, &self.items)
    }

    pub fn into_backend(self) -> S {
        self.backend
    }

    fn item_mut(&mut self, id: u64) -> Result<&mut WhiteboardItem> {
        self.items
            .iter_mut()
            .find(|i| i.id == id)
            .ok_or(WorkdeskError::ItemNotFound { id })
    }

    fn persist(&mut self) {
        if let Err(e) = self.save() {
            error!("Failed to save whiteboard: {}", e);
        }
    }
}
