//! Concurrent record of every URL admitted to the frontier

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;

/// Maps canonical URLs to the depth at which they were first admitted
///
/// `try_admit` is the only way to add a URL, and it is a single atomic
/// check-and-insert: for any URL, exactly one caller ever sees `true`.
#[derive(Debug, Default)]
pub struct VisitedSet {
    seen: DashMap<String, u32>,
}

impl VisitedSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records `url` at `depth` if it has never been admitted
    ///
    /// # Returns
    ///
    /// * `true` - This call inserted the URL; the caller owns creating its task
    /// * `false` - The URL was already admitted (possibly by a concurrent caller)
    pub fn try_admit(&self, url: &str, depth: u32) -> bool {
        match self.seen.entry(url.to_string()) {
            Entry::Occupied(_) => false,
            Entry::Vacant(slot) => {
                slot.insert(depth);
                true
            }
        }
    }

    /// Depth at which `url` was first admitted, if it was
    pub fn depth_of(&self, url: &str) -> Option<u32> {
        self.seen.get(url).map(|depth| *depth)
    }

    /// Number of unique URLs discovered so far
    pub fn len(&self) -> usize {
        self.seen.len()
    }

    pub fn is_empty(&self) -> bool {
        self.seen.is_empty()
    }
}
