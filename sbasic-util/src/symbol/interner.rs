//! Concurrent string table backing [`Symbol`](super::Symbol).
//!
//! Lock-free via `DashMap`, following the same shape as the teacher's
//! interner: hash the string, probe on collision, leak the backing storage
//! to get a `'static str` so `Symbol::as_str` never needs a lifetime.

use std::hash::{Hash, Hasher};
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::LazyLock;

use ahash::AHasher;
use dashmap::DashMap;

use super::Symbol;

pub(super) static STRING_TABLE: LazyLock<StringTable> = LazyLock::new(StringTable::new);

pub struct StringTable {
    map: DashMap<u64, (&'static str, u32)>,
    reverse: DashMap<u32, &'static str>,
    next_index: AtomicU32,
}

const MAX_PROBES: u64 = 32;
const PROBE_STRIDE: u64 = 0x9e37_79b9_7f4a_7c15;

impl StringTable {
    fn new() -> Self {
        Self {
            map: DashMap::with_capacity(256),
            reverse: DashMap::with_capacity(256),
            next_index: AtomicU32::new(0),
        }
    }

    fn hash_of(s: &str) -> u64 {
        let mut hasher = AHasher::default();
        s.hash(&mut hasher);
        hasher.finish()
    }

    fn intern_raw(&self, s: &str) -> Symbol {
        let hash = Self::hash_of(s);

        if let Some(entry) = self.map.get(&hash) {
            if entry.value().0 == s {
                return Symbol {
                    index: entry.value().1,
                };
            }
        }

        for i in 0..MAX_PROBES {
            let probe = hash.wrapping_add(i.wrapping_mul(PROBE_STRIDE));
            match self.map.entry(probe) {
                dashmap::mapref::entry::Entry::Occupied(entry) => {
                    if entry.get().0 == s {
                        return Symbol {
                            index: entry.get().1,
                        };
                    }
                }
                dashmap::mapref::entry::Entry::Vacant(entry) => {
                    let interned: &'static str = Box::leak(s.to_string().into_boxed_str());
                    let idx = self.next_index.fetch_add(1, Ordering::Relaxed);
                    entry.insert((interned, idx));
                    self.reverse.insert(idx, interned);
                    return Symbol { index: idx };
                }
            }
        }

        unreachable!("string table probing exhausted {MAX_PROBES} slots")
    }

    pub fn intern_ci(&self, s: &str) -> Symbol {
        if s.chars().all(|c| !c.is_ascii_lowercase()) {
            self.intern_raw(s)
        } else {
            self.intern_raw(&s.to_ascii_uppercase())
        }
    }

    pub fn intern_exact(&self, s: &str) -> Symbol {
        self.intern_raw(s)
    }

    pub fn get(&self, symbol: Symbol) -> Option<&'static str> {
        self.reverse.get(&symbol.index).map(|entry| *entry.value())
    }
}
