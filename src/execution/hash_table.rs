//! Single-threaded, open-addressing hash table used by both hash join (build
//! side) and hash aggregation (group table).
//!
//! The directory is a power-of-two array of chain heads; rows live in an
//! append-only block and are linked by index rather than moved when the
//! directory grows. Growth doubles the directory once the load factor
//! crosses 0.5 and only re-links existing rows, it never copies row data.

use crate::common::error::PrismDBResult;
use crate::types::Value;

/// Supported join kinds. `Mark`/`Single` joins are out of scope here; every
/// other SQL join reduces to one of these four probe strategies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinType {
    Inner,
    Left,
    Semi,
    Anti,
}

/// murmur-style 64-bit mix, applied once per key column and combined with
/// rotate+xor so that multi-column keys don't collapse onto single-column
/// hashes of one of their parts.
#[inline]
fn mix64(mut x: u64) -> u64 {
    x ^= x >> 33;
    x = x.wrapping_mul(0xff51afd7ed558ccd);
    x ^= x >> 33;
    x = x.wrapping_mul(0xc4ceb9fe1a85ec53);
    x ^= x >> 33;
    x
}

fn hash_value(value: &Value) -> u64 {
    match value {
        Value::Null => 0,
        Value::Boolean(b) => mix64(*b as u64),
        Value::TinyInt(v) => mix64(*v as i64 as u64),
        Value::SmallInt(v) => mix64(*v as i64 as u64),
        Value::Integer(v) => mix64(*v as i64 as u64),
        Value::BigInt(v) => mix64(*v as u64),
        Value::HugeInt { high, low } => mix64((*high as u64) ^ (*low as u64)),
        Value::Float(v) => mix64(v.to_bits() as u64),
        Value::Double(v) => mix64(v.to_bits()),
        Value::Date(v) => mix64(*v as i64 as u64),
        Value::Time(v) => mix64(*v as u64),
        Value::Timestamp(v) => mix64(*v as u64),
        Value::Varchar(s) | Value::Char(s) => {
            let mut h = 0xcbf29ce484222325u64;
            for b in s.as_bytes() {
                h ^= *b as u64;
                h = h.wrapping_mul(0x100000001b3);
            }
            mix64(h)
        }
        other => mix64(other.get_size() as u64),
    }
}

/// Hash a composite key: each column's hash is rotated by its position then
/// xor-combined, so permuting column order changes the result.
fn hash_key(key: &[Value]) -> u64 {
    let mut h = 0u64;
    for (i, v) in key.iter().enumerate() {
        let column_hash = hash_value(v).rotate_left((i as u32 * 17) % 64);
        h ^= column_hash;
    }
    h
}

fn key_has_null(key: &[Value]) -> bool {
    key.iter().any(|v| v.is_null())
}

/// One stored row: its key, its payload, the hash that placed it, and the
/// index of the next row in its chain (or `None` at the chain's end).
#[derive(Debug, Clone)]
struct Row {
    hash: u64,
    key: Vec<Value>,
    payload: Vec<Value>,
    next: Option<usize>,
}

/// Build-side hash table: open addressing on a power-of-two directory of
/// chain heads, linear probing only at the directory level (collisions within
/// a bucket are resolved by the row chain, not by probing further buckets).
#[derive(Debug)]
pub struct JoinHashTable {
    directory: Vec<Option<usize>>,
    rows: Vec<Row>,
    mask: u64,
}

impl JoinHashTable {
    const INITIAL_DIRECTORY_SIZE: usize = 8;

    pub fn new() -> Self {
        Self {
            directory: vec![None; Self::INITIAL_DIRECTORY_SIZE],
            rows: Vec::new(),
            mask: (Self::INITIAL_DIRECTORY_SIZE - 1) as u64,
        }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    fn slot(&self, hash: u64) -> usize {
        (hash & self.mask) as usize
    }

    fn load_factor(&self) -> f64 {
        self.rows.len() as f64 / self.directory.len() as f64
    }

    /// Insert one build-side row. Null keys are stored (needed by e.g. a
    /// future MARK join) but `probe` never matches against them, per SQL
    /// null semantics.
    pub fn insert(&mut self, key: Vec<Value>, payload: Vec<Value>) {
        if self.load_factor() > 0.5 {
            self.grow();
        }
        let hash = hash_key(&key);
        let idx = self.rows.len();
        let slot = self.slot(hash);
        let head = self.directory[slot];
        self.rows.push(Row {
            hash,
            key,
            payload,
            next: head,
        });
        self.directory[slot] = Some(idx);
    }

    /// Double the directory and re-link every existing row into its new slot.
    /// Row storage itself is untouched - only `directory` and `next` pointers
    /// change.
    fn grow(&mut self) {
        let new_size = self.directory.len() * 2;
        let mut new_directory = vec![None; new_size];
        let new_mask = (new_size - 1) as u64;

        for (idx, row) in self.rows.iter_mut().enumerate() {
            let slot = (row.hash & new_mask) as usize;
            row.next = new_directory[slot];
            new_directory[slot] = Some(idx);
        }

        self.directory = new_directory;
        self.mask = new_mask;
    }

    /// Begin a probe for one left-side key, returning a cursor over the
    /// matching chain. Null probe keys never match, mirroring SQL semantics.
    pub fn probe(&self, key: &[Value]) -> ScanStructure<'_> {
        if key_has_null(key) {
            return ScanStructure {
                table: self,
                key: key.to_vec(),
                cursor: None,
            };
        }
        let hash = hash_key(key);
        let slot = self.slot(hash);
        ScanStructure {
            table: self,
            key: key.to_vec(),
            cursor: self.directory[slot],
        }
    }
}

impl Default for JoinHashTable {
    fn default() -> Self {
        Self::new()
    }
}

/// Per-left-row probe cursor. `next()` walks the chain for this key, skipping
/// hash collisions that don't match on the actual key columns, and returns
/// one matching payload at a time.
pub struct ScanStructure<'a> {
    table: &'a JoinHashTable,
    key: Vec<Value>,
    cursor: Option<usize>,
}

impl<'a> ScanStructure<'a> {
    /// Produce the next matching row's payload, or `None` when the chain is
    /// exhausted.
    pub fn next(&mut self) -> PrismDBResult<Option<&'a [Value]>> {
        while let Some(idx) = self.cursor {
            let row = &self.table.rows[idx];
            self.cursor = row.next;
            if row.key == self.key {
                return Ok(Some(&row.payload));
            }
        }
        Ok(None)
    }

    /// True if at least one match exists (used by semi/anti joins, which
    /// don't need to enumerate every match).
    pub fn has_any_match(mut self) -> PrismDBResult<bool> {
        Ok(self.next()?.is_some())
    }
}
