/// Indexed storage with reuse of freed slots.
///
/// A `Slab` hands out small `usize` keys that stay valid until the value
/// is removed. Vacant slots form an intrusive free list, so both insertion
/// and removal are O(1) and keys are reused in LIFO order.
pub(crate) struct Slab<T> {
    entries: Vec<Entry<T>>,

    /// Head of the free list; `entries.len()` when no slot is vacant.
    next: usize,

    len: usize,
}

enum Entry<T> {
    Occupied(T),

    /// Vacant slot pointing at the next vacant one.
    Vacant(usize),
}

impl<T> Slab<T> {
    pub(crate) fn new() -> Self {
        Self {
            entries: Vec::new(),
            next: 0,
            len: 0,
        }
    }

    /// Returns the key the next [`insert`](Self::insert) will use.
    pub(crate) fn vacant_key(&self) -> usize {
        self.next
    }

    /// Stores `value` and returns its key.
    pub(crate) fn insert(&mut self, value: T) -> usize {
        let key = self.next;

        if key == self.entries.len() {
            self.entries.push(Entry::Occupied(value));
            self.next = key + 1;
        } else {
            match std::mem::replace(&mut self.entries[key], Entry::Occupied(value)) {
                Entry::Vacant(next) => self.next = next,
                Entry::Occupied(_) => unreachable!("free list points at an occupied slot"),
            }
        }

        self.len += 1;
        key
    }

    /// Removes and returns the value stored under `key`, if any.
    pub(crate) fn remove(&mut self, key: usize) -> Option<T> {
        let entry = self.entries.get_mut(key)?;

        if matches!(entry, Entry::Vacant(_)) {
            return None;
        }

        match std::mem::replace(entry, Entry::Vacant(self.next)) {
            Entry::Occupied(value) => {
                self.next = key;
                self.len -= 1;
                Some(value)
            }
            Entry::Vacant(_) => None,
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.len
    }

    #[cfg(test)]
    pub(crate) fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Removes every value, in key order.
    pub(crate) fn drain(&mut self) -> Vec<T> {
        let entries = std::mem::take(&mut self.entries);
        self.next = 0;
        self.len = 0;

        entries
            .into_iter()
            .filter_map(|entry| match entry {
                Entry::Occupied(value) => Some(value),
                Entry::Vacant(_) => None,
            })
            .collect()
    }
}
