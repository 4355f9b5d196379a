//! Per-call string deduplication tables.
//!
//! A table lives for exactly one encode or decode pass: constructed (or
//! cleared) at the start of the call, consulted while the tree is walked,
//! discarded when the call returns. Nothing is shared between calls, so
//! concurrent codecs on independent instances never interfere.
//!
//! Strings deduplicate within an equivalence *bucket* of locations, and
//! table IDs count up from zero **per bucket**. A back-reference record
//! carries only the ID; both sides recompute the bucket from structural
//! position, which is what lets a grouping mismatch between peers surface as
//! an unknown back-reference instead of silently wrong strings.

use std::collections::HashMap;

use crate::location::{StringLocation, LOCATION_COUNT};

/// How string locations are folded into dedup buckets.
///
/// Must match between the encoder and decoder of a stream.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DedupMode {
    /// Two buckets: the four `*_KEY` locations share one, every other
    /// non-void location shares the other. Repeated keys across sibling
    /// objects are the dominant redundancy pattern, so one key bucket
    /// captures most of the win while keeping tables small.
    #[default]
    Grouped,
    /// Every location is its own bucket.
    Exact,
}

const KEY_BUCKET: usize = 0;
const TEXT_BUCKET: usize = 1;

/// Bucket index for a location, or `None` for [`StringLocation::Void`],
/// which never participates in deduplication.
fn bucket_of(mode: DedupMode, loc: StringLocation) -> Option<usize> {
    if loc == StringLocation::Void {
        return None;
    }
    match mode {
        DedupMode::Grouped => Some(if loc.is_key() { KEY_BUCKET } else { TEXT_BUCKET }),
        DedupMode::Exact => Some(loc.index()),
    }
}

/// Encode-side table: (bucket, content) → assigned ID.
pub(crate) struct StringTable {
    mode: DedupMode,
    buckets: Vec<HashMap<String, u32>>,
}

impl StringTable {
    pub(crate) fn new(mode: DedupMode) -> Self {
        Self {
            mode,
            buckets: (0..LOCATION_COUNT).map(|_| HashMap::new()).collect(),
        }
    }

    pub(crate) fn mode(&self) -> DedupMode {
        self.mode
    }

    /// Discards every assignment, ready for the next call.
    pub(crate) fn clear(&mut self) {
        for bucket in &mut self.buckets {
            bucket.clear();
        }
    }

    /// Looks up `s` in the bucket for `loc`. Returns the existing ID on a
    /// hit; on a miss assigns the bucket's next sequential ID, records it,
    /// and returns `None` so the caller emits a literal.
    pub(crate) fn probe_insert(&mut self, loc: StringLocation, s: &str) -> Option<u32> {
        let bucket = &mut self.buckets[bucket_of(self.mode, loc)?];
        if let Some(&id) = bucket.get(s) {
            return Some(id);
        }
        let id = bucket.len() as u32;
        bucket.insert(s.to_string(), id);
        None
    }
}

/// Decode-side table: per-bucket list of decoded literals, indexed by ID.
pub(crate) struct StringPool {
    mode: DedupMode,
    buckets: Vec<Vec<String>>,
}

impl StringPool {
    pub(crate) fn new(mode: DedupMode) -> Self {
        Self {
            mode,
            buckets: (0..LOCATION_COUNT).map(|_| Vec::new()).collect(),
        }
    }

    pub(crate) fn mode(&self) -> DedupMode {
        self.mode
    }

    pub(crate) fn clear(&mut self) {
        for bucket in &mut self.buckets {
            bucket.clear();
        }
    }

    /// Records a decoded literal under the bucket for `loc`, mirroring the
    /// ID the encoder assigned it.
    pub(crate) fn admit(&mut self, loc: StringLocation, s: &str) {
        if let Some(b) = bucket_of(self.mode, loc) {
            self.buckets[b].push(s.to_string());
        }
    }

    /// Resolves a back-reference ID within the bucket for `loc`.
    pub(crate) fn resolve(&self, loc: StringLocation, id: u32) -> Option<&str> {
        let b = bucket_of(self.mode, loc)?;
        self.buckets[b].get(id as usize).map(String::as_str)
    }
}
