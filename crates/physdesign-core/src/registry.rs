use std::collections::HashMap;
use std::marker::PhantomData;

use crate::ids::EntityId;

/// A name-keyed collection that owns its entries.
///
/// Ids are assigned densely in insertion order. A second insertion under an
/// existing name is refused with a warning and leaves the first entry intact.
#[derive(Debug, Clone)]
pub struct NamedRegistry<I: EntityId, T> {
    kind: String,
    entries: Vec<T>,
    by_name: HashMap<String, I>,
}

impl<I: EntityId, T> NamedRegistry<I, T> {
    /// `kind` names the entries in diagnostics, e.g. `"Site"`.
    pub fn new(kind: &str) -> Self {
        Self {
            kind: kind.to_string(),
            entries: Vec::new(),
            by_name: HashMap::new(),
        }
    }

    /// Insert a new entry built from its freshly assigned id.
    ///
    /// Returns `None` if the name is taken; `build` is not called then.
    pub fn insert_with(&mut self, name: &str, build: impl FnOnce(I) -> T) -> Option<I> {
        if self.by_name.contains_key(name) {
            log::warn!("{} {} was already defined. Skipping ...", self.kind, name);
            return None;
        }
        let id = I::from_index(self.entries.len());
        self.entries.push(build(id));
        self.by_name.insert(name.to_string(), id);
        Some(id)
    }

    pub fn reserve(&mut self, additional: usize) {
        self.entries.reserve(additional);
        self.by_name.reserve(additional);
    }

    pub fn get(&self, id: I) -> Option<&T> {
        self.entries.get(id.index())
    }

    pub fn get_mut(&mut self, id: I) -> Option<&mut T> {
        self.entries.get_mut(id.index())
    }

    pub fn id_of(&self, name: &str) -> Option<I> {
        self.by_name.get(name).copied()
    }

    pub fn get_by_name(&self, name: &str) -> Option<&T> {
        self.id_of(name).and_then(|id| self.get(id))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.by_name.contains_key(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = (I, &T)> {
        self.entries
            .iter()
            .enumerate()
            .map(|(i, entry)| (I::from_index(i), entry))
    }

    pub fn values(&self) -> &[T] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// A sparse per-entity attribute table keyed by a stable entity id.
///
/// Backed by a vector indexed by the id; slots are filled once at
/// ingestion time and mutated in place afterwards.
#[derive(Debug, Clone)]
pub struct AttributeTable<I: EntityId, T> {
    slots: Vec<Option<T>>,
    _id: PhantomData<I>,
}

impl<I: EntityId, T> AttributeTable<I, T> {
    pub fn with_capacity(capacity: usize) -> Self {
        let mut slots = Vec::with_capacity(capacity);
        slots.resize_with(capacity, || None);
        Self {
            slots,
            _id: PhantomData,
        }
    }

    /// Store the record for `id`, returning the previous one if present.
    pub fn insert(&mut self, id: I, value: T) -> Option<T> {
        let index = id.index();
        if index >= self.slots.len() {
            self.slots.resize_with(index + 1, || None);
        }
        self.slots[index].replace(value)
    }

    pub fn get(&self, id: I) -> Option<&T> {
        self.slots.get(id.index()).and_then(Option::as_ref)
    }

    pub fn get_mut(&mut self, id: I) -> Option<&mut T> {
        self.slots.get_mut(id.index()).and_then(Option::as_mut)
    }

    pub fn contains(&self, id: I) -> bool {
        self.get(id).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = (I, &T)> {
        self.slots
            .iter()
            .enumerate()
            .filter_map(|(i, slot)| slot.as_ref().map(|v| (I::from_index(i), v)))
    }

    /// Number of populated slots.
    pub fn len(&self) -> usize {
        self.slots.iter().filter(|s| s.is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.iter().all(Option::is_none)
    }
}

impl<I: EntityId, T> Default for AttributeTable<I, T> {
    fn default() -> Self {
        Self::with_capacity(0)
    }
}
