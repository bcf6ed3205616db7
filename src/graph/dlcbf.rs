//! d-left counting Bloom filter (DLCBF): a concurrent approximate counter
//! over canonical k-mers.
//!
//! Ported from `examples/original_source/src/bloom.c` (`dcjones/pique`'s
//! `bloom_t`), which itself implements the construction from Bonomi et al.
//! 2006. Cells are packed 24-bit words (14-bit fingerprint, 10-bit
//! saturating counter) grouped into `d = 4` subtables of `n` buckets of `m`
//! cells each. Locking granularity is one mutex per 16-bucket block per
//! subtable (§4.3, §9 design note on typed accessors over raw pointer
//! punning — here a `Mutex<Vec<Cell>>` per lock group stands in for pique's
//! `uint8_t*` + `pthread_mutex_t*` pair).

use std::sync::{Mutex, MutexGuard};

use super::kmer::{self, Kmer};

const NUM_SUBTABLES: usize = 4;

/// Bits [10..24) of the packed cell.
const FINGERPRINT_MASK: u32 = 0x00ff_fc00;
/// Bits [0..10) of the packed cell.
const COUNTER_MASK: u32 = 0x0000_03ff;
/// 2^10 - 1: the counter saturation value.
const COUNTER_MAX: u32 = COUNTER_MASK;

const BUCKETS_PER_LOCK: usize = 16;

/// Default cells per bucket. Fixed rather than exposed as a knob beyond the
/// constructor, per §9's design note ("I'm fixing cells per block... I don't
/// want to expose it as an option" in the original source).
pub const DEFAULT_CELLS_PER_BUCKET: usize = 8;

/// A packed (fingerprint, counter) cell. Fingerprint `0` means "empty" —
/// an actual hash fingerprint of 0 is treated as a (bounded, accepted)
/// false negative, per spec.
#[derive(Clone, Copy, Default, PartialEq, Eq)]
struct Cell(u32);

impl Cell {
    #[inline]
    fn fingerprint(self) -> u32 {
        self.0 & FINGERPRINT_MASK
    }

    #[inline]
    fn counter(self) -> u32 {
        self.0 & COUNTER_MASK
    }

    #[inline]
    fn is_empty(self) -> bool {
        self.fingerprint() == 0
    }

    #[inline]
    fn pack(fingerprint: u32, counter: u32) -> Cell {
        Cell(fingerprint | (counter & COUNTER_MASK))
    }

    #[inline]
    fn with_counter(self, counter: u32) -> Cell {
        Cell((self.0 & FINGERPRINT_MASK) | (counter & COUNTER_MASK))
    }
}

struct Subtable {
    groups: Vec<Mutex<Vec<Cell>>>,
    n: usize,
    m: usize,
}

impl Subtable {
    fn new(n: usize, m: usize) -> Self {
        let num_groups = n.div_ceil(BUCKETS_PER_LOCK);
        let groups = (0..num_groups)
            .map(|gi| {
                let buckets_in_group = BUCKETS_PER_LOCK.min(n - gi * BUCKETS_PER_LOCK);
                Mutex::new(vec![Cell::default(); buckets_in_group * m])
            })
            .collect();
        Subtable { groups, n, m }
    }

    #[inline]
    fn group_and_offset(&self, bucket: usize) -> (usize, usize) {
        let group = bucket / BUCKETS_PER_LOCK;
        let local_bucket = bucket % BUCKETS_PER_LOCK;
        (group, local_bucket * self.m)
    }

    fn clear(&self) {
        for g in &self.groups {
            let mut guard = g.lock().unwrap();
            for c in guard.iter_mut() {
                *c = Cell::default();
            }
        }
    }

    fn copy(&self) -> Subtable {
        let groups = self
            .groups
            .iter()
            .map(|g| Mutex::new(g.lock().unwrap().clone()))
            .collect();
        Subtable { groups, n: self.n, m: self.m }
    }
}

pub struct Dlcbf {
    subtables: [Subtable; NUM_SUBTABLES],
    n: usize,
    m: usize,
}

impl Dlcbf {
    /// Allocate a filter with `n` buckets per subtable and `m` cells per
    /// bucket (`d = 4` subtables, fixed).
    pub fn new(n: usize, m: usize) -> Self {
        assert!(n > 0, "DLCBF requires at least one bucket per subtable");
        assert!(m > 0, "DLCBF requires at least one cell per bucket");
        Dlcbf {
            subtables: [
                Subtable::new(n, m),
                Subtable::new(n, m),
                Subtable::new(n, m),
                Subtable::new(n, m),
            ],
            n,
            m,
        }
    }

    /// Buckets-per-subtable implied by an upper bound `n_kmers` on distinct
    /// k-mers and `m` cells per bucket, per spec.md §6 / pique's
    /// `dbg_alloc`: `n_kmers / d / m`.
    pub fn buckets_for(n_kmers: u64, m: usize) -> usize {
        ((n_kmers / NUM_SUBTABLES as u64 / m as u64).max(1)) as usize
    }

    #[inline]
    fn hashes(&self, x: Kmer) -> (u32, [usize; NUM_SUBTABLES]) {
        let h0 = kmer::hash(x);
        let fp = (h0 as u32) & FINGERPRINT_MASK;
        let mut buckets = [0usize; NUM_SUBTABLES];
        let mut h_prev = h0;
        for b in buckets.iter_mut() {
            h_prev = kmer::hash_mix(h0, h_prev);
            *b = (h_prev % self.n as u64) as usize;
        }
        (fp, buckets)
    }

    /// Scan each subtable's candidate bucket in turn, locking and unlocking
    /// as we go (no cross-subtable lock holding), invoking `f` on a match.
    fn locate_and<R>(&self, x: Kmer, mut f: impl FnMut(&mut Cell) -> R) -> Option<R> {
        let (fp, buckets) = self.hashes(x);
        for i in 0..NUM_SUBTABLES {
            let st = &self.subtables[i];
            let (group, offset) = st.group_and_offset(buckets[i]);
            let mut guard = st.groups[group].lock().unwrap();
            if let Some(cell) = guard[offset..offset + st.m]
                .iter_mut()
                .find(|c| c.fingerprint() == fp)
            {
                return Some(f(cell));
            }
        }
        None
    }

    /// `get(x)`: current approximate count, or 0 if absent.
    pub fn get(&self, x: Kmer) -> u32 {
        self.locate_and(x, |c| c.counter()).unwrap_or(0)
    }

    /// `del(x)`: clear the cell (both fingerprint and counter). No-op if
    /// absent.
    pub fn del(&self, x: Kmer) {
        self.locate_and(x, |c| *c = Cell::default());
    }

    /// `inc(x) = add(x, 1)`.
    pub fn inc(&self, x: Kmer) -> u32 {
        self.add(x, 1)
    }

    /// `add(x, delta)`: find an existing cell for `x` and bump its counter
    /// (saturating), or place it in the least-occupied candidate bucket
    /// across all `d` subtables (ties broken to the lowest subtable index —
    /// "d-left"). Returns 0, silently, if every candidate bucket is full.
    pub fn add(&self, x: Kmer, delta: u32) -> u32 {
        let (fp, buckets) = self.hashes(x);

        // Holds a locked guard per subtable that still has an empty
        // candidate cell (so the d-left decision is made with every
        // remaining candidate still locked against concurrent placement).
        let mut guards: Vec<Option<MutexGuard<'_, Vec<Cell>>>> =
            (0..NUM_SUBTABLES).map(|_| None).collect();
        let mut candidate_offset = [None::<usize>; NUM_SUBTABLES];
        let mut bucket_occupancy = [0usize; NUM_SUBTABLES];

        for i in 0..NUM_SUBTABLES {
            let st = &self.subtables[i];
            let (group, offset) = st.group_and_offset(buckets[i]);
            let mut guard = st.groups[group].lock().unwrap();

            let bucket = &mut guard[offset..offset + st.m];
            let mut match_idx = None;
            let mut empty_idx = None;
            for (j, cell) in bucket.iter().enumerate() {
                if cell.fingerprint() == fp {
                    match_idx = Some(j);
                    break;
                } else if cell.is_empty() {
                    empty_idx = Some(j);
                    break;
                }
            }

            if let Some(j) = match_idx {
                let idx = offset + j;
                let new_count = guard[idx].counter().saturating_add(delta).min(COUNTER_MAX);
                guard[idx] = guard[idx].with_counter(new_count);
                // `guard` (and every earlier-acquired guard in `guards`)
                // drops here, unlocking subtables 0..=i in order.
                return new_count;
            }

            match empty_idx {
                Some(j) => {
                    candidate_offset[i] = Some(offset + j);
                    bucket_occupancy[i] = j;
                    guards[i] = Some(guard);
                }
                None => {
                    // Full bucket: no candidate here, unlock immediately.
                    bucket_occupancy[i] = st.m;
                }
            }
        }

        // d-left: pick the least-occupied candidate bucket, ties to the
        // lowest subtable index (first strictly-smaller wins, so earlier
        // indices are preferred on ties).
        let mut chosen = None;
        let mut min_occupancy = usize::MAX;
        for i in 0..NUM_SUBTABLES {
            if candidate_offset[i].is_some() && bucket_occupancy[i] < min_occupancy {
                min_occupancy = bucket_occupancy[i];
                chosen = Some(i);
            }
        }

        match chosen {
            Some(i) => {
                let idx = candidate_offset[i].unwrap();
                let d = delta.min(COUNTER_MAX);
                guards[i].as_mut().unwrap()[idx] = Cell::pack(fp, d);
                d
            }
            None => 0,
        }
    }

    /// Zero every cell in every subtable.
    pub fn clear(&self) {
        for st in &self.subtables {
            st.clear();
        }
    }

    /// Deep copy (new mutexes, same contents).
    pub fn copy(&self) -> Dlcbf {
        Dlcbf {
            subtables: std::array::from_fn(|i| self.subtables[i].copy()),
            n: self.n,
            m: self.m,
        }
    }
}
