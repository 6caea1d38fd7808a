//! Items, item groups and the item/property actions reported by targets.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// An item: its evaluated include plus metadata in declaration order.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Item {
    pub name: Arc<str>,
    pub metadata: Vec<(Arc<str>, Arc<str>)>,
}

impl Item {
    /// Look up a metadata value by key.
    pub fn metadata(&self, key: &str) -> Option<&str> {
        self.metadata
            .iter()
            .find(|(k, _)| &**k == key)
            .map(|(_, v)| &**v)
    }
}

/// A named collection of items, e.g. all `Compile` items.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemGroup {
    pub name: Arc<str>,
    pub items: Vec<Item>,
}

impl ItemGroup {
    /// Includes of all items, in order.
    pub fn item_names(&self) -> impl Iterator<Item = &str> {
        self.items.iter().map(|i| &*i.name)
    }
}

/// Items added to or removed from a group while a target ran.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemAction {
    pub timestamp: DateTime<Utc>,
    pub is_addition: bool,
    pub item_group: ItemGroup,
}

/// A property assigned while a target ran.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PropertySet {
    pub timestamp: DateTime<Utc>,
    pub name: Arc<str>,
    pub value: Arc<str>,
}
