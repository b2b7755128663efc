//! Open-addressing, string-keyed hash table (spec.md §4.3).
//!
//! Backs both the VM's global-variable table (`Table<Value>`) and the
//! heap's string intern set (`Table<()>`, used as a set). Keys are always
//! interned strings (`Rc<Object>`); normal lookups compare key identity
//! (`Rc::ptr_eq`), which is safe precisely because interning guarantees
//! identity equals content equality. [`Table::find_string`] is the one
//! exception: it is how interning itself is implemented, so it must
//! compare by content before an `Rc` for the candidate string exists.

#[cfg(test)]
mod table_test;

use std::rc::Rc;

use crate::object::Object;

/// Grow once capacity crosses this fraction full.
const MAX_LOAD_FACTOR: f64 = 0.75;

/// One slot in the table's backing array.
enum Slot<V> {
    Empty,
    Tombstone,
    Occupied { key: Rc<Object>, value: V },
}

/// Open-addressing hash table keyed by interned string identity.
pub struct Table<V> {
    entries: Vec<Slot<V>>,
    /// Occupied slots plus tombstones — what drives the load-factor growth
    /// check, matching the source's accounting (tombstone reuse does not
    /// increment this further, since the tombstone was already counted).
    count: usize,
}

impl<V> Default for Table<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V> Table<V> {
    #[must_use]
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
            count: 0,
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.count
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    fn capacity(&self) -> usize {
        self.entries.len()
    }

    /// Probe starting at `hash`, honoring the "halt at the first truly
    /// empty slot, never at a tombstone" rule so later insertions at the
    /// same bucket are still found past a prior deletion.
    fn find_slot_for_key<F>(&self, hash: u32, matches: F) -> usize
    where
        F: Fn(&Rc<Object>) -> bool,
    {
        let cap = self.capacity();
        let mut index = hash as usize % cap;
        let mut first_tombstone: Option<usize> = None;
        loop {
            match &self.entries[index] {
                Slot::Empty => return first_tombstone.unwrap_or(index),
                Slot::Tombstone => {
                    if first_tombstone.is_none() {
                        first_tombstone = Some(index);
                    }
                }
                Slot::Occupied { key, .. } => {
                    if matches(key) {
                        return index;
                    }
                }
            }
            index = (index + 1) % cap;
        }
    }

    fn grow(&mut self) {
        let new_capacity = if self.capacity() < 8 { 8 } else { self.capacity() * 2 };
        let mut new_entries: Vec<Slot<V>> = Vec::with_capacity(new_capacity);
        new_entries.resize_with(new_capacity, || Slot::Empty);

        let old_entries = std::mem::replace(&mut self.entries, new_entries);
        self.count = 0;
        for slot in old_entries {
            if let Slot::Occupied { key, value } = slot {
                let hash = string_hash(&key);
                let index = self.find_slot_for_key(hash, |k| Rc::ptr_eq(k, &key));
                self.entries[index] = Slot::Occupied { key, value };
                self.count += 1;
            }
        }
    }

    fn ensure_capacity(&mut self) {
        if self.capacity() == 0
            || (self.count + 1) as f64 > self.capacity() as f64 * MAX_LOAD_FACTOR
        {
            self.grow();
        }
    }

    /// Insert or overwrite `key => value`. Returns `true` iff the key was
    /// newly inserted (a tombstone reuse does not count as "new" for the
    /// load-factor bookkeeping, matching the source's contract, but still
    /// reports `true` to the caller since no prior value existed).
    pub fn set(&mut self, key: Rc<Object>, value: V) -> bool {
        self.ensure_capacity();
        let hash = string_hash(&key);
        let index = self.find_slot_for_key(hash, |k| Rc::ptr_eq(k, &key));

        let is_new_key = !matches!(self.entries[index], Slot::Occupied { .. });
        let was_tombstone = matches!(self.entries[index], Slot::Tombstone);
        self.entries[index] = Slot::Occupied { key, value };
        if is_new_key && !was_tombstone {
            self.count += 1;
        }
        is_new_key
    }

    #[must_use]
    pub fn get(&self, key: &Rc<Object>) -> Option<&V> {
        if self.capacity() == 0 {
            return None;
        }
        let hash = string_hash(key);
        let index = self.find_slot_for_key(hash, |k| Rc::ptr_eq(k, key));
        match &self.entries[index] {
            Slot::Occupied { value, .. } => Some(value),
            _ => None,
        }
    }

    #[must_use]
    pub fn get_mut(&mut self, key: &Rc<Object>) -> Option<&mut V> {
        if self.capacity() == 0 {
            return None;
        }
        let hash = string_hash(key);
        let index = self.find_slot_for_key(hash, |k| Rc::ptr_eq(k, key));
        match &mut self.entries[index] {
            Slot::Occupied { value, .. } => Some(value),
            _ => None,
        }
    }

    /// Turn the slot into a tombstone. Returns `true` iff a value was present.
    pub fn delete(&mut self, key: &Rc<Object>) -> bool {
        if self.capacity() == 0 {
            return false;
        }
        let hash = string_hash(key);
        let index = self.find_slot_for_key(hash, |k| Rc::ptr_eq(k, key));
        if matches!(self.entries[index], Slot::Occupied { .. }) {
            self.entries[index] = Slot::Tombstone;
            true
        } else {
            false
        }
    }

    /// Intern-lookup by raw content: probe by hash, compare length then
    /// bytes. Used to find an already-interned string before allocating a
    /// new one. Must halt at the first truly empty slot, never a tombstone
    /// (otherwise a tombstone left by a deleted interned string could hide
    /// a live one further down the probe sequence).
    #[must_use]
    pub fn find_string(&self, chars: &str, hash: u32) -> Option<Rc<Object>> {
        if self.capacity() == 0 {
            return None;
        }
        let cap = self.capacity();
        let mut index = hash as usize % cap;
        loop {
            match &self.entries[index] {
                Slot::Empty => return None,
                Slot::Tombstone => {}
                Slot::Occupied { key, .. } => {
                    if let Some(s) = key.as_string() {
                        if s.hash == hash && &*s.chars == chars {
                            return Some(Rc::clone(key));
                        }
                    }
                }
            }
            index = (index + 1) % cap;
        }
    }
}

fn string_hash(key: &Rc<Object>) -> u32 {
    key.as_string().map_or(0, |s| s.hash)
}
