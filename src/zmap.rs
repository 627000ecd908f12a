//! Associative arrays
//!
//! A `ZMap` keeps its entries in a [`ZList`] of slots in insertion order and
//! finds them through a separate open-addressing index. Index cells hold
//! `0` for never used, `-1` for a deleted entry (tombstone) or `n` for slot
//! `n - 1`. The index size is a power of two, and the probe sequence is the
//! one CPython's dict uses: after the first miss, upper bits of the hash are
//! folded in through a shifting `perturb` value. Once `perturb` reaches zero
//! the recurrence `i = 5 * i + 1 (mod 2^k)` visits every cell, so a probe
//! always finds an empty cell while the table is below its load limit.
//!
//! Deleting an entry leaves its slot in place, marked dead. Dead slots and
//! tombstones are dropped when the index is rebuilt, which happens before an
//! insert that would push `count + deleted` past 80% of the index size.

use crate::value::Value;
use crate::zlist::ZList;
use crate::zstring::ZString;

const MIN_TABLE_SIZE: usize = 8;
const PERTURB_SHIFT: u32 = 5;
const EMPTY: i32 = 0;
const TOMBSTONE: i32 = -1;

/// One key/value entry
#[derive(Debug, Clone)]
pub struct ZMapSlot {
    hash: u32,
    key: ZString,
    pub value: Value,
    deleted: bool,
}

impl ZMapSlot {
    pub fn key(&self) -> &ZString {
        &self.key
    }

    /// Cached hash of the key
    pub fn hash(&self) -> u32 {
        self.hash
    }
}

#[derive(Debug, Clone, Copy)]
enum Probe {
    Found { pos: usize, slot: usize },
    Vacant(usize),
}

#[derive(Debug, Clone)]
pub struct ZMap {
    mask: usize,
    index: Vec<i32>,
    limit: usize,
    count: usize,
    deleted: usize,
    slots: ZList<ZMapSlot>,
}

impl Default for ZMap {
    fn default() -> Self {
        Self::new()
    }
}

/// FNV-1a over the key bytes
pub fn hash_bytes(bytes: &[u8]) -> u32 {
    let mut h: u32 = 0x811c_9dc5;
    for &b in bytes {
        h ^= u32::from(b);
        h = h.wrapping_mul(0x0100_0193);
    }
    h
}

fn limit_for(size: usize) -> usize {
    size * 8 / 10
}

impl ZMap {
    pub fn new() -> Self {
        Self {
            mask: MIN_TABLE_SIZE - 1,
            index: vec![EMPTY; MIN_TABLE_SIZE],
            limit: limit_for(MIN_TABLE_SIZE),
            count: 0,
            deleted: 0,
            slots: ZList::new(),
        }
    }

    /// Number of live entries
    #[inline]
    pub fn len(&self) -> usize {
        self.count
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Deleted entries not yet reclaimed by a rebuild
    #[inline]
    pub fn deleted(&self) -> usize {
        self.deleted
    }

    /// Index size (always a power of two)
    #[inline]
    pub fn table_size(&self) -> usize {
        self.mask + 1
    }

    /// Occupancy at which the next insert rebuilds the index
    #[inline]
    pub fn limit(&self) -> usize {
        self.limit
    }

    fn probe(&self, hash: u32, key: &[u8]) -> Probe {
        let mut perturb = hash as usize;
        let mut i = perturb & self.mask;
        let mut first_tombstone = None;
        loop {
            match self.index[i] {
                EMPTY => return Probe::Vacant(first_tombstone.unwrap_or(i)),
                TOMBSTONE => {
                    first_tombstone.get_or_insert(i);
                }
                n => {
                    let slot = (n - 1) as usize;
                    let entry = &self.slots[slot];
                    if entry.hash == hash && entry.key.as_bytes() == key {
                        return Probe::Found { pos: i, slot };
                    }
                }
            }
            perturb >>= PERTURB_SHIFT;
            i = (i.wrapping_mul(5).wrapping_add(perturb).wrapping_add(1)) & self.mask;
        }
    }

    /// First never-used cell on the probe path of `hash`
    fn empty_position(&self, hash: u32) -> usize {
        let mut perturb = hash as usize;
        let mut i = perturb & self.mask;
        while self.index[i] != EMPTY {
            perturb >>= PERTURB_SHIFT;
            i = (i.wrapping_mul(5).wrapping_add(perturb).wrapping_add(1)) & self.mask;
        }
        i
    }

    pub fn find(&self, key: &ZString) -> Option<&Value> {
        match self.probe(hash_bytes(key.as_bytes()), key.as_bytes()) {
            Probe::Found { slot, .. } => Some(&self.slots[slot].value),
            Probe::Vacant(_) => None,
        }
    }

    pub fn find_mut(&mut self, key: &ZString) -> Option<&mut Value> {
        match self.probe(hash_bytes(key.as_bytes()), key.as_bytes()) {
            Probe::Found { slot, .. } => Some(&mut self.slots[slot].value),
            Probe::Vacant(_) => None,
        }
    }

    pub fn contains_key(&self, key: &ZString) -> bool {
        self.find(key).is_some()
    }

    /// Find the entry for `key`, creating it with an uninitialized value
    /// when absent.
    pub fn find_or_insert(&mut self, key: &ZString) -> &mut ZMapSlot {
        let hash = hash_bytes(key.as_bytes());
        let pos = match self.probe(hash, key.as_bytes()) {
            Probe::Found { slot, .. } => return &mut self.slots[slot],
            Probe::Vacant(pos) if self.count + self.deleted < self.limit => pos,
            Probe::Vacant(_) => {
                self.rebuild();
                self.empty_position(hash)
            }
        };
        let slot = self.slots.append(ZMapSlot {
            hash,
            key: key.clone(),
            value: Value::Uninitialized,
            deleted: false,
        });
        self.index[pos] = (slot + 1) as i32;
        self.count += 1;
        &mut self.slots[slot]
    }

    /// Insert or overwrite
    pub fn insert(&mut self, key: &ZString, value: Value) {
        self.find_or_insert(key).value = value;
    }

    /// Remove `key`, returning whether it was present
    pub fn delete(&mut self, key: &ZString) -> bool {
        match self.probe(hash_bytes(key.as_bytes()), key.as_bytes()) {
            Probe::Found { pos, slot } => {
                self.index[pos] = TOMBSTONE;
                let entry = &mut self.slots[slot];
                entry.deleted = true;
                entry.value = Value::Uninitialized;
                self.count -= 1;
                self.deleted += 1;
                true
            }
            Probe::Vacant(_) => false,
        }
    }

    /// Remove every entry, keeping the index size
    pub fn clear(&mut self) {
        self.index.fill(EMPTY);
        self.slots.clear();
        self.count = 0;
        self.deleted = 0;
    }

    /// Rebuild the index without tombstones, doubling it when live entries
    /// fill more than half the load limit.
    fn rebuild(&mut self) {
        let mut size = self.mask + 1;
        if self.count >= self.limit / 2 {
            size *= 2;
        }
        tracing::debug!(
            live = self.count,
            deleted = self.deleted,
            from = self.mask + 1,
            to = size,
            "zmap rebuild"
        );

        let mut old = std::mem::replace(&mut self.slots, ZList::with_capacity(self.count));
        self.mask = size - 1;
        self.limit = limit_for(size);
        self.index = vec![EMPTY; size];
        self.deleted = 0;

        for entry in old.drain_all().filter(|e| !e.deleted) {
            let pos = self.empty_position(entry.hash);
            let slot = self.slots.append(entry);
            self.index[pos] = (slot + 1) as i32;
        }
        debug_assert_eq!(self.slots.len(), self.count);
    }

    /// Live entries in insertion order
    pub fn iter(&self) -> impl Iterator<Item = (&ZString, &Value)> {
        self.slots
            .iter()
            .filter(|e| !e.deleted)
            .map(|e| (&e.key, &e.value))
    }

    /// Snapshot of the live keys, safe to hold while the map changes
    pub fn keys(&self) -> Vec<ZString> {
        self.iter().map(|(k, _)| k.clone()).collect()
    }
}
