//! Exact-address labels for annotating rendered nodes

use std::collections::HashMap;

/// Human-readable names for known addresses.
///
/// Built once by the caller and handed to the renderer; lookups match the
/// node address exactly and never influence traversal.
#[derive(Debug, Clone, Default)]
pub struct LabelTable {
    labels: HashMap<usize, String>,
}

impl LabelTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, address: usize, label: impl Into<String>) {
        self.labels.insert(address, label.into());
    }

    /// Label a value's own address with its type name
    pub fn label_value<T: ?Sized>(&mut self, value: &T) {
        let address = value as *const T as *const u8 as usize;
        self.insert(address, std::any::type_name::<T>());
    }

    pub fn label_for(&self, address: usize) -> Option<&str> {
        self.labels.get(&address).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }
}

impl<S: Into<String>> FromIterator<(usize, S)> for LabelTable {
    fn from_iter<I: IntoIterator<Item = (usize, S)>>(iter: I) -> Self {
        Self {
            labels: iter.into_iter().map(|(a, l)| (a, l.into())).collect(),
        }
    }
}
