//! Item, item group, item action and property-set records.

use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::builder::errors::ModelError;

#[derive(Debug, Clone)]
pub struct ItemInfo {
    pub name: Arc<str>,
    pub metadata: Vec<(Arc<str>, Arc<str>)>,
}

impl ItemInfo {
    pub fn new(name: Arc<str>) -> Self {
        ItemInfo {
            name,
            metadata: Vec::new(),
        }
    }

    /// Add a metadata pair. Keys are unique per item.
    pub fn add_metadata(&mut self, key: Arc<str>, value: Arc<str>) -> Result<(), ModelError> {
        if self.metadata.iter().any(|(k, _)| *k == key) {
            return Err(ModelError::DuplicateMetadata {
                item: self.name.to_string(),
                key: key.to_string(),
            });
        }
        self.metadata.push((key, value));
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct ItemGroupInfo {
    pub name: Arc<str>,
    pub items: Vec<ItemInfo>,
}

impl ItemGroupInfo {
    pub fn new(name: Arc<str>) -> Self {
        ItemGroupInfo {
            name,
            items: Vec::new(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ItemActionInfo {
    pub timestamp: DateTime<Utc>,
    pub is_addition: bool,
    pub item_group: ItemGroupInfo,
}

#[derive(Debug, Clone)]
pub struct PropertySetInfo {
    pub timestamp: DateTime<Utc>,
    pub name: Arc<str>,
    pub value: Arc<str>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_duplicate_metadata_rejected() {
        let mut item = ItemInfo::new(Arc::from("a.cs"));
        item.add_metadata(Arc::from("Link"), Arc::from("x")).unwrap();

        let err = item
            .add_metadata(Arc::from("Link"), Arc::from("y"))
            .unwrap_err();
        assert_eq!(
            err,
            ModelError::DuplicateMetadata {
                item: "a.cs".to_string(),
                key: "Link".to_string()
            }
        );
        // First value is kept
        assert_eq!(item.metadata.len(), 1);
        assert_eq!(&*item.metadata[0].1, "x");
    }
}
