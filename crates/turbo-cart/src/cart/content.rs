//! The ordered item collection of a cart instance.

use crate::cart::item::CartItem;
use crate::ids::RowId;
use serde::{Deserialize, Serialize};

/// Cart lines keyed by row id, in insertion order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CartContent(Vec<CartItem>);

impl CartContent {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, row_id: &RowId) -> Option<&CartItem> {
        self.0.iter().find(|item| &item.row_id == row_id)
    }

    pub fn get_mut(&mut self, row_id: &RowId) -> Option<&mut CartItem> {
        self.0.iter_mut().find(|item| &item.row_id == row_id)
    }

    pub fn contains(&self, row_id: &RowId) -> bool {
        self.position(row_id).is_some()
    }

    pub fn position(&self, row_id: &RowId) -> Option<usize> {
        self.0.iter().position(|item| &item.row_id == row_id)
    }

    /// Replace the line with the same row id in place, or append.
    pub fn upsert(&mut self, item: CartItem) {
        match self.position(&item.row_id) {
            Some(index) => self.0[index] = item,
            None => self.0.push(item),
        }
    }

    /// Append a line. Callers make sure the row id is new.
    pub fn push(&mut self, item: CartItem) {
        self.0.push(item);
    }

    /// Put `item` where the line `row_id` is. Returns false if there is none.
    pub fn replace(&mut self, row_id: &RowId, item: CartItem) -> bool {
        match self.position(row_id) {
            Some(index) => {
                self.0[index] = item;
                true
            }
            None => false,
        }
    }

    pub fn remove(&mut self, row_id: &RowId) -> Option<CartItem> {
        let index = self.position(row_id)?;
        Some(self.0.remove(index))
    }

    pub fn iter(&self) -> std::slice::Iter<'_, CartItem> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Sum of quantities.
    pub fn quantity(&self) -> i64 {
        self.0.iter().map(|item| item.quantity).sum()
    }

    pub fn into_vec(self) -> Vec<CartItem> {
        self.0
    }
}

impl From<Vec<CartItem>> for CartContent {
    fn from(items: Vec<CartItem>) -> Self {
        let mut content = Self::new();
        for item in items {
            content.upsert(item);
        }
        content
    }
}

impl<'a> IntoIterator for &'a CartContent {
    type Item = &'a CartItem;
    type IntoIter = std::slice::Iter<'a, CartItem>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl IntoIterator for CartContent {
    type Item = CartItem;
    type IntoIter = std::vec::IntoIter<CartItem>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cart::item::ItemOptions;

    fn item(id: i64, qty: i64) -> CartItem {
        CartItem::new(id, format!("Item {id}"), 1.0, qty, ItemOptions::new()).unwrap()
    }

    #[test]
    fn test_upsert_keeps_position() {
        let mut content = CartContent::new();
        content.push(item(1, 1));
        content.push(item(2, 1));
        content.upsert(item(1, 5));

        let quantities: Vec<i64> = content.iter().map(|i| i.quantity).collect();
        assert_eq!(quantities, vec![5, 1]);
        assert_eq!(content.quantity(), 6);
    }

    #[test]
    fn test_remove() {
        let mut content = CartContent::from(vec![item(1, 1), item(2, 2)]);
        let row = content.iter().next().unwrap().row_id.clone();

        assert!(content.remove(&row).is_some());
        assert!(content.remove(&row).is_none());
        assert_eq!(content.len(), 1);
        assert!(!content.contains(&row));
    }

    #[test]
    fn test_from_vec_dedups_by_row_id() {
        let content = CartContent::from(vec![item(1, 1), item(1, 3)]);
        assert_eq!(content.len(), 1);
        assert_eq!(content.quantity(), 3);
    }

    #[test]
    fn test_serializes_as_list() {
        let content = CartContent::from(vec![item(1, 1)]);
        let value = serde_json::to_value(&content).unwrap();
        assert!(value.is_array());
        let back: CartContent = serde_json::from_value(value).unwrap();
        assert_eq!(back, content);
    }
}
