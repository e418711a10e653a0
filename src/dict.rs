//! The slot table: probe-driven insert/get/remove over open-addressed slots.

use core::fmt;
use core::mem;

use rand::Rng;
use tracing::{debug, trace};

use crate::error::DictError;
use crate::hash::murmur2;
use crate::perm::PermTable;

/// Starting slot count. Growth doubles it, so capacity is always 15 << k.
const DEFAULT_CAPACITY: usize = 15;

/// Growth fires once live + tombstoned slots reach 2/3 of capacity.
#[inline]
fn grow_threshold(capacity: usize) -> usize {
    (capacity << 1) / 3
}

/// One occupied-or-tombstoned slot. The strings stay owned by the entry
/// until an update or a tombstone revival replaces them.
#[derive(Debug)]
struct Entry {
    key: String,
    value: String,
    deleted: bool,
}

/// Double-hashed probe cursor over a table of `len` slots.
///
/// All index arithmetic is wrapping u32, reduced modulo `len` after every
/// update, so `len` must fit in u32 (enforced at growth time).
struct Probe {
    idx: u32,
    step: u32,
    attempt: u32,
    len: u32,
}

impl Probe {
    fn start(perm: &PermTable, key: &[u8], len: u32) -> Self {
        let idx = murmur2(key, 0) % len;
        let mut step = perm.probe_step(key);
        if step % len == 0 {
            // A step that reduces to 0 would pin the cursor in place.
            step = 1;
        }
        Probe {
            idx,
            step,
            attempt: 1,
            len,
        }
    }

    #[inline]
    fn slot(&self) -> usize {
        self.idx as usize
    }

    /// Hybrid advance: the double-hash term `attempt * step`, then a
    /// murmur2 perturbation re-seeded with the new attempt number. The
    /// perturbation applies on every advance from the second probe onward,
    /// which breaks up the clustering a fixed stride alone would produce.
    fn advance(&mut self, key: &[u8]) {
        self.idx = self.idx.wrapping_add(self.attempt.wrapping_mul(self.step)) % self.len;
        self.attempt = self.attempt.wrapping_add(1);
        self.idx = self.idx.wrapping_add(murmur2(key, self.attempt)) % self.len;
    }
}

/// An open-addressing string dictionary with double-hashed probing and
/// tombstone deletion.
///
/// Counters: `taken` is the number of live entries, `filled` counts live
/// and tombstoned slots. Growth triggers on `filled`, so delete-heavy
/// workloads cannot let tombstones degrade probe length indefinitely -
/// tombstones are reclaimed wholesale when the table doubles.
pub struct Dict {
    slots: Vec<Option<Entry>>,
    taken: usize,
    filled: usize,
    perm: PermTable,
}

fn fresh_slots(capacity: usize) -> Vec<Option<Entry>> {
    let mut slots = Vec::with_capacity(capacity);
    slots.resize_with(capacity, || None);
    slots
}

impl Dict {
    /// An empty dictionary with the default starting capacity and a
    /// permutation table shuffled from `thread_rng`.
    pub fn new() -> Self {
        Self::with_rng(&mut rand::thread_rng())
    }

    /// Like [`new`](Dict::new), but shuffles the permutation table from the
    /// caller's RNG. Handy for reproducible instances in tests.
    pub fn with_rng<R: Rng + ?Sized>(rng: &mut R) -> Self {
        Dict {
            slots: fresh_slots(DEFAULT_CAPACITY),
            taken: 0,
            filled: 0,
            perm: PermTable::generate(rng),
        }
    }

    /// Number of live entries.
    pub fn len(&self) -> usize {
        self.taken
    }

    pub fn is_empty(&self) -> bool {
        self.taken == 0
    }

    /// Current slot count.
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Live plus tombstoned slots - the counter growth triggers on.
    pub fn filled(&self) -> usize {
        self.filled
    }

    /// Inserts or updates a key.
    ///
    /// Returns the previous value when a live entry was updated, `None`
    /// when a fresh slot (or a tombstone left by this key) was claimed.
    /// The growth check runs first, so an insert that merely updates an
    /// existing key still grows a saturated table.
    pub fn insert(&mut self, key: String, value: String) -> Result<Option<String>, DictError> {
        if self.filled >= grow_threshold(self.slots.len()) {
            self.grow()?;
        }
        self.insert_raw(key, value)
    }

    /// Probe-and-place without the growth check; shared by `insert` and
    /// the re-insertion loop in `grow`.
    fn insert_raw(&mut self, key: String, value: String) -> Result<Option<String>, DictError> {
        let capacity = self.slots.len();
        let mut probe = Probe::start(&self.perm, key.as_bytes(), capacity as u32);

        // Stop at the first empty slot or at this key's own entry, live or
        // tombstoned. Bounded so a degenerate probe cannot spin forever.
        let mut remaining = capacity;
        loop {
            match &self.slots[probe.slot()] {
                Some(entry) if entry.key != key => {
                    if remaining == 0 {
                        return Err(DictError::ProbeExhausted { capacity });
                    }
                    remaining -= 1;
                    probe.advance(key.as_bytes());
                }
                _ => break,
            }
        }

        let slot = &mut self.slots[probe.slot()];
        match slot {
            None => {
                *slot = Some(Entry {
                    key,
                    value,
                    deleted: false,
                });
                self.taken += 1;
                self.filled += 1;
                Ok(None)
            }
            Some(entry) if entry.deleted => {
                // Revive the tombstone this key left behind. The old value
                // was logically deleted, so nothing is returned.
                entry.key = key;
                entry.value = value;
                entry.deleted = false;
                self.taken += 1;
                Ok(None)
            }
            Some(entry) => Ok(Some(mem::replace(&mut entry.value, value))),
        }
    }

    /// Returns the value stored for `key`, if any.
    pub fn get(&self, key: &str) -> Option<&str> {
        let idx = self.find_live(key)?;
        self.slots[idx].as_ref().map(|e| e.value.as_str())
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.find_live(key).is_some()
    }

    /// Tombstones the entry for `key`. Returns whether an entry was
    /// removed; removing an absent key is a no-op.
    pub fn remove(&mut self, key: &str) -> bool {
        match self.find_live(key) {
            Some(idx) => {
                if let Some(entry) = self.slots[idx].as_mut() {
                    entry.deleted = true;
                    self.taken -= 1;
                }
                true
            }
            None => false,
        }
    }

    /// Drops every entry and the slot array, returning the table to its
    /// freshly-constructed state. The permutation table is kept.
    pub fn clear(&mut self) {
        self.slots = fresh_slots(DEFAULT_CAPACITY);
        self.taken = 0;
        self.filled = 0;
        trace!("slot table cleared");
    }

    /// Live entries in current slot order. No ordering guarantee beyond
    /// "whatever slot order currently holds entries".
    pub fn iter(&self) -> Iter<'_> {
        Iter {
            inner: self.slots.iter(),
        }
    }

    /// Shared probe loop for `get`/`remove`: an empty slot means absent,
    /// tombstones are skipped whatever key they carry. A tombstone must
    /// never terminate the walk, or keys inserted past a deleted collision
    /// would turn unreachable. Exhausting `capacity` probes counts as
    /// absent.
    fn find_live(&self, key: &str) -> Option<usize> {
        let capacity = self.slots.len();
        let mut probe = Probe::start(&self.perm, key.as_bytes(), capacity as u32);

        for _ in 0..=capacity {
            match &self.slots[probe.slot()] {
                None => return None,
                Some(entry) if !entry.deleted && entry.key == key => return Some(probe.slot()),
                _ => probe.advance(key.as_bytes()),
            }
        }
        None
    }

    /// Doubles the table: live entries are staged in slot-scan order,
    /// tombstones dropped for good, and everything re-probes against the
    /// new capacity. The doubled array is fully allocated before a single
    /// entry moves, and every allocation goes through `try_reserve` - on
    /// failure the table releases all it owns and reports the error
    /// instead of surviving in a half-resized state.
    fn grow(&mut self) -> Result<(), DictError> {
        let old_capacity = self.slots.len();
        let new_capacity = old_capacity
            .checked_mul(2)
            .filter(|&c| c <= u32::MAX as usize)
            .ok_or(DictError::CapacityOverflow)?;

        let mut live = Vec::new();
        if let Err(e) = live.try_reserve_exact(self.taken) {
            self.clear();
            return Err(e.into());
        }
        for slot in &mut self.slots {
            if let Some(entry) = slot.take() {
                if !entry.deleted {
                    live.push(entry);
                }
            }
        }

        let mut slots = Vec::new();
        if let Err(e) = slots.try_reserve_exact(new_capacity) {
            self.clear();
            return Err(e.into());
        }
        slots.resize_with(new_capacity, || None);

        let reclaimed = self.filled - self.taken;
        self.slots = slots;
        self.taken = 0;
        self.filled = 0;

        for entry in live {
            if let Err(e) = self.insert_raw(entry.key, entry.value) {
                self.clear();
                return Err(e);
            }
        }

        debug!(old_capacity, new_capacity, reclaimed, "slot table grown");
        Ok(())
    }
}

impl Default for Dict {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Dict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

/// Iterator over live `(key, value)` pairs in slot order.
pub struct Iter<'a> {
    inner: core::slice::Iter<'a, Option<Entry>>,
}

impl<'a> Iterator for Iter<'a> {
    type Item = (&'a str, &'a str);

    fn next(&mut self) -> Option<Self::Item> {
        for slot in self.inner.by_ref() {
            if let Some(entry) = slot {
                if !entry.deleted {
                    return Some((entry.key.as_str(), entry.value.as_str()));
                }
            }
        }
        None
    }
}

impl<'a> IntoIterator for &'a Dict {
    type Item = (&'a str, &'a str);
    type IntoIter = Iter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn dict(seed: u64) -> Dict {
        Dict::with_rng(&mut StdRng::seed_from_u64(seed))
    }

    fn put(d: &mut Dict, k: &str, v: &str) -> Option<String> {
        d.insert(k.to_string(), v.to_string()).expect("insert ok")
    }

    /// Invariant: a fresh table has the default capacity and zero counters.
    #[test]
    fn fresh_table_shape() {
        let d = dict(0);
        assert_eq!(d.capacity(), 15);
        assert_eq!(d.len(), 0);
        assert_eq!(d.filled(), 0);
        assert!(d.is_empty());
    }

    /// Invariant: get on an empty table is absent for any key, including
    /// the empty string.
    #[test]
    fn empty_table_lookups_miss() {
        let d = dict(1);
        assert_eq!(d.get("car"), None);
        assert_eq!(d.get(""), None);
        assert!(!d.contains_key("anything"));
    }

    /// Invariant: re-inserting the same pair changes neither counter;
    /// updating changes only the value and returns the old one.
    #[test]
    fn idempotent_and_update_semantics() {
        let mut d = dict(2);
        assert_eq!(put(&mut d, "k", "v1"), None);
        let (taken, filled) = (d.len(), d.filled());

        assert_eq!(put(&mut d, "k", "v1"), Some("v1".to_string()));
        assert_eq!((d.len(), d.filled()), (taken, filled));

        assert_eq!(put(&mut d, "k", "v2"), Some("v1".to_string()));
        assert_eq!(d.get("k"), Some("v2"));
        assert_eq!((d.len(), d.filled()), (taken, filled));
    }

    /// Invariant: removal tombstones the slot - `taken` falls, `filled`
    /// stays - and reviving the same key reuses it without touching
    /// `filled`.
    #[test]
    fn tombstone_counters_and_revival() {
        let mut d = dict(3);
        put(&mut d, "k", "v");
        assert_eq!((d.len(), d.filled()), (1, 1));

        assert!(d.remove("k"));
        assert_eq!((d.len(), d.filled()), (0, 1));
        assert_eq!(d.get("k"), None);

        // Revival claims the tombstone: no old value comes back.
        assert_eq!(put(&mut d, "k", "v2"), None);
        assert_eq!((d.len(), d.filled()), (1, 1));
        assert_eq!(d.get("k"), Some("v2"));
    }

    /// Invariant: removing an absent key is a no-op and reports false.
    #[test]
    fn remove_absent_is_noop() {
        let mut d = dict(4);
        put(&mut d, "present", "x");
        assert!(!d.remove("absent"));
        assert_eq!((d.len(), d.filled()), (1, 1));
    }

    /// Invariant: growth fires at filled >= (2 * capacity) / 3 and exactly
    /// doubles. Pinned walk from the starting capacity: threshold is 10.
    #[test]
    fn growth_threshold_and_doubling() {
        let mut d = dict(5);
        for i in 0..9 {
            put(&mut d, &format!("k{i}"), "v");
        }
        assert_eq!(d.capacity(), 15);

        // filled reaches 10 here; the next insert grows first.
        put(&mut d, "k9", "v");
        assert_eq!(d.capacity(), 15);
        put(&mut d, "k10", "v");
        assert_eq!(d.capacity(), 30);

        for i in 0..11 {
            assert_eq!(d.get(&format!("k{i}")), Some("v"));
        }
    }

    /// Invariant: tombstones count toward the growth trigger and are
    /// dropped wholesale by the resize. Pinned sequence: 9 inserts + 9
    /// removals leave filled == 9; two more inserts cross the threshold
    /// and the doubled table holds only the two live keys.
    #[test]
    fn resize_reclaims_tombstones() {
        let mut d = dict(6);
        for i in 0..9 {
            put(&mut d, &format!("t{i}"), "v");
        }
        for i in 0..9 {
            assert!(d.remove(&format!("t{i}")));
        }
        assert_eq!((d.len(), d.filled()), (0, 9));

        put(&mut d, "trigger", "a");
        assert_eq!(d.capacity(), 15);
        put(&mut d, "trigger2", "b");

        assert_eq!(d.capacity(), 30);
        assert_eq!((d.len(), d.filled()), (2, 2));
        for i in 0..9 {
            assert_eq!(d.get(&format!("t{i}")), None, "tombstoned key survived resize");
        }
        assert_eq!(d.get("trigger"), Some("a"));
        assert_eq!(d.get("trigger2"), Some("b"));
    }

    /// Invariant: distinct-key insert+delete churn still forces growth -
    /// the trigger tracks `filled`, which deletions never decrease.
    #[test]
    fn churn_on_distinct_keys_grows() {
        let mut d = dict(7);
        for i in 0..12 {
            let k = format!("churn{i}");
            put(&mut d, &k, "v");
            assert!(d.remove(&k));
        }
        assert_eq!(d.len(), 0);
        assert!(d.capacity() > 15, "churn never grew the table");
    }

    /// Invariant: every key from a bulk load stays retrievable across the
    /// resizes it causes. 93 distinct keys from capacity 15 settle at 240
    /// (four doublings) with no tombstones.
    #[test]
    fn bulk_load_across_resizes() {
        let mut d = dict(8);
        for i in 0..93 {
            put(&mut d, &format!("key{i}"), &format!("val{i}"));
        }
        assert_eq!(d.capacity(), 240);
        assert_eq!((d.len(), d.filled()), (93, 93));
        for i in 0..93 {
            assert_eq!(d.get(&format!("key{i}")).map(|v| v.to_string()), Some(format!("val{i}")));
        }
    }

    /// Invariant: a deleted slot does not cut off keys that probed past it;
    /// reuse of the slot keeps them reachable. Exercised densely: delete
    /// every other key, verify the rest, revive, verify all.
    #[test]
    fn tombstones_preserve_probe_chains() {
        let mut d = dict(9);
        let keys: Vec<String> = (0..60).map(|i| format!("key{i}")).collect();
        for k in &keys {
            put(&mut d, k, "orig");
        }
        for k in keys.iter().step_by(2) {
            assert!(d.remove(k));
        }
        for (i, k) in keys.iter().enumerate() {
            let expect = if i % 2 == 0 { None } else { Some("orig") };
            assert_eq!(d.get(k), expect);
        }
        for k in keys.iter().step_by(2) {
            put(&mut d, k, "revived");
        }
        for (i, k) in keys.iter().enumerate() {
            let expect = if i % 2 == 0 { "revived" } else { "orig" };
            assert_eq!(d.get(k), Some(expect));
        }
    }

    /// Invariant: the empty key hashes and probes like any other string.
    #[test]
    fn empty_key_is_ordinary() {
        let mut d = dict(10);
        assert_eq!(put(&mut d, "", "void"), None);
        assert_eq!(d.get(""), Some("void"));
        assert!(d.remove(""));
        assert_eq!(d.get(""), None);
    }

    /// Invariant: clear returns the table to its fresh state and it stays
    /// usable afterwards.
    #[test]
    fn clear_and_reuse() {
        let mut d = dict(11);
        for i in 0..40 {
            put(&mut d, &format!("k{i}"), "v");
        }
        assert!(d.capacity() > 15);

        d.clear();
        assert_eq!(d.capacity(), 15);
        assert_eq!((d.len(), d.filled()), (0, 0));
        assert_eq!(d.get("k0"), None);

        put(&mut d, "again", "works");
        assert_eq!(d.get("again"), Some("works"));
    }

    /// Invariant: iteration yields each live entry exactly once and skips
    /// tombstones; Debug renders the same live view.
    #[test]
    fn iteration_skips_tombstones() {
        let mut d = dict(12);
        put(&mut d, "a", "1");
        put(&mut d, "b", "2");
        put(&mut d, "c", "3");
        d.remove("b");

        let mut seen: Vec<(String, String)> = d
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        seen.sort();
        assert_eq!(
            seen,
            vec![
                ("a".to_string(), "1".to_string()),
                ("c".to_string(), "3".to_string())
            ]
        );

        let rendered = format!("{d:?}");
        assert!(rendered.contains("\"a\""));
        assert!(!rendered.contains("\"b\""));
    }

    /// Invariant: the counters never violate taken <= filled <= capacity,
    /// and capacity is always 15 << k, across a mixed workload.
    #[test]
    fn counter_invariants_under_mixed_ops() {
        let mut d = dict(13);
        for i in 0..200 {
            let k = format!("k{}", i % 37);
            if i % 5 == 4 {
                d.remove(&k);
            } else {
                put(&mut d, &k, &format!("v{i}"));
            }
            assert!(d.len() <= d.filled());
            assert!(d.filled() <= d.capacity());
            let mut cap = d.capacity();
            while cap > 15 {
                assert_eq!(cap % 2, 0);
                cap /= 2;
            }
            assert_eq!(cap, 15);
        }
    }
}
