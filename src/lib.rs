//! oa-dict: an open-addressing string dictionary with a double-hashed
//! probe sequence, tombstone deletion, and doubling growth.
//!
//! Internal Design:
//!
//! Summary
//! - Goal: a small associative table (string key → string value) whose
//!   value is the hashing/probing/resizing algorithm, built in layers so
//!   each piece can be reasoned about independently.
//! - Layers:
//!   - `hash`: pure 32-bit mixing functions - a MurmurHash2 variant
//!     (initial slot hash, and the re-seeded perturbation term used while
//!     probing), a rotate-and-XOR bit spreader, and a golden-ratio
//!     multiplicative fold.
//!   - `perm`: a per-instance 256-entry shuffled permutation of 0..=255.
//!     It seeds the secondary hash from the key's byte length, so keys of
//!     different lengths diverge before a single key byte is mixed.
//!   - `dict`: the slot table - `Vec<Option<Entry>>` plus the `taken`
//!     (live) and `filled` (live + tombstoned) counters, and the
//!     probe-driven insert/get/remove/growth machinery.
//!
//! Probe sequence
//! - The first slot is `murmur2(key, 0) % capacity`; the fixed step is the
//!   secondary hash (forced to 1 if it reduces to 0 modulo capacity).
//! - Each advance adds `attempt * step`, then perturbs with
//!   `murmur2(key, attempt)` re-seeded by the attempt counter. The hybrid
//!   step clusters less than pure double hashing at the cost of one extra
//!   hash per probe.
//! - All probe walks are bounded by the slot count: lookups treat
//!   exhaustion as absent, inserts report it as an error.
//!
//! Deletion and growth
//! - `remove` tombstones the slot (`deleted = true`), keeping the probe
//!   chain intact for keys that collided past it; `taken` falls, `filled`
//!   does not.
//! - Growth triggers when `filled` reaches 2/3 of capacity - tombstones
//!   count, so delete-heavy churn cannot degrade probe length forever.
//!   The table doubles, live entries re-probe against the new capacity,
//!   and tombstones are dropped for good.
//!
//! Constraints
//! - Single-threaded: mutation goes through `&mut self`; there is no
//!   internal locking and no concurrent-reader story.
//! - Keys and values are owned `String`s; no generic key/value types.
//! - Iteration order is whatever slot order currently holds entries.
//!
//! Failure boundaries
//! - Lookup miss is `None`, never an error.
//! - Growth allocates via `try_reserve`; on failure the table releases
//!   everything it owns and returns [`DictError::Alloc`] rather than
//!   surviving half-resized (or aborting the process).
//!
//! Notes and non-goals
//! - No persistence, no transactions, no iteration-order guarantees.
//! - The REPL/demo driver that feeds word pairs into the table lives
//!   outside this crate; `iter()` and the `Debug` impl are its
//!   diagnostics hooks.

mod dict;
mod dict_proptest;
mod error;
mod hash;
mod perm;

// Public surface
pub use dict::{Dict, Iter};
pub use error::DictError;
