//! Todo data structures

use serde::{Deserialize, Serialize};

/// A single task record
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TodoItem {
    /// Opaque identifier, stable for the item's lifetime
    pub id: String,

    /// User supplied content
    pub text: String,

    /// Completion flag. Older lists omit it entirely.
    #[serde(default, skip_serializing_if = "is_false")]
    pub completed: bool,
}

fn is_false(value: &bool) -> bool {
    !*value
}

impl TodoItem {
    pub fn new(id: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            text: text.into(),
            completed: false,
        }
    }
}

/// Ordered list of todo items, serialized as a bare JSON array.
///
/// The mutators are pure data transformations and report whether the list
/// actually changed, so callers can skip persisting no-ops.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(transparent)]
pub struct TodoList {
    items: Vec<TodoItem>,
}

impl TodoList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, TodoItem> {
        self.items.iter()
    }

    pub fn items(&self) -> &[TodoItem] {
        &self.items
    }

    pub fn get(&self, id: &str) -> Option<&TodoItem> {
        self.items.iter().find(|item| item.id == id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.get(id).is_some()
    }

    /// Append an item at the end of the list
    pub fn push(&mut self, item: TodoItem) {
        self.items.push(item);
    }

    /// Remove the item with the given id, returning it if present
    pub fn remove(&mut self, id: &str) -> Option<TodoItem> {
        let index = self.items.iter().position(|item| item.id == id)?;
        Some(self.items.remove(index))
    }

    /// Flip the completion flag of the item with the given id
    pub fn toggle_complete(&mut self, id: &str) -> bool {
        match self.items.iter_mut().find(|item| item.id == id) {
            Some(item) => {
                item.completed = !item.completed;
                true
            }
            None => false,
        }
    }

    /// Replace the text of the item with the given id.
    ///
    /// Returns `false` when the id is unknown or the text is unchanged.
    pub fn edit(&mut self, id: &str, text: &str) -> bool {
        match self.items.iter_mut().find(|item| item.id == id) {
            Some(item) if item.text != text => {
                item.text = text.to_string();
                true
            }
            _ => false,
        }
    }

    pub fn completed_count(&self) -> usize {
        self.items.iter().filter(|item| item.completed).count()
    }

    /// Progress line for display, e.g. `2/5 completed`
    pub fn summary(&self) -> String {
        format!("{}/{} completed", self.completed_count(), self.len())
    }
}

impl From<Vec<TodoItem>> for TodoList {
    fn from(items: Vec<TodoItem>) -> Self {
        Self { items }
    }
}

impl From<TodoList> for Vec<TodoItem> {
    fn from(list: TodoList) -> Self {
        list.items
    }
}

impl<'a> IntoIterator for &'a TodoList {
    type Item = &'a TodoItem;
    type IntoIter = std::slice::Iter<'a, TodoItem>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}
