//! Insertion-order indexed k-mer set: a serial, quadratic-probed hash table
//! assigning 1-based indices in insertion order.
//!
//! Ported from `examples/original_source/src/kmerset.c` (`dcjones/pique`'s
//! `kmerset_t`). Used only in the single-threaded emit phase (C8 Phase C) to
//! assign node indices to edge endpoints.

use super::kmer::{self, Kmer};

/// Near-powers-of-two, suitable as quadratic-probing table sizes.
const PRIMES: [u32; 28] = [
    53, 97, 193, 389, 769, 1543, 3079, 6151, 12289, 24593, 49157, 98317, 196613, 393241, 786433,
    1572869, 3145739, 6291469, 12582917, 25165843, 50331653, 100663319, 201326611, 402653189,
    805306457, 1610612741, 3221225473, 4294967291,
];

const MAX_LOAD: f64 = 0.7;

#[inline]
fn probe(h: u32, i: u32) -> u32 {
    h.wrapping_add(i / 2).wrapping_add((i.wrapping_mul(i)) / 2)
}

#[derive(Clone, Copy, Default)]
struct Cell {
    kmer: Kmer,
    idx: u32,
}

pub struct KmerSet {
    xs: Vec<Cell>,
    size: usize, // index into PRIMES
    n: usize,    // number of non-empty cells == next index to assign
    max_n: usize,
}

impl KmerSet {
    pub fn new() -> Self {
        let capacity = PRIMES[0] as usize;
        KmerSet {
            xs: vec![Cell::default(); capacity],
            size: 0,
            n: 0,
            max_n: (MAX_LOAD * capacity as f64) as usize,
        }
    }

    /// Number of distinct k-mers inserted.
    pub fn size(&self) -> usize {
        self.n
    }

    fn table_size(&self) -> u32 {
        PRIMES[self.size]
    }

    fn expand(&mut self) {
        self.size += 1;
        let new_cap = self.table_size() as usize;
        let mut xs = vec![Cell::default(); new_cap];

        for cell in self.xs.iter().filter(|c| c.idx != 0) {
            let h = kmer::hash(cell.kmer) as u32;
            let mut probe_num = 1u32;
            let mut k = (h % new_cap as u32) as usize;
            loop {
                if xs[k].idx == 0 {
                    xs[k] = *cell;
                    break;
                }
                k = (probe(h, { probe_num += 1; probe_num }) % new_cap as u32) as usize;
            }
        }

        self.xs = xs;
        self.max_n = (MAX_LOAD * new_cap as f64) as usize;
    }

    /// Insert `x`, assigning it the next 1-based index if not already
    /// present. A no-op if `x` is already in the set (idempotent, per
    /// spec.md §8 invariant 6).
    pub fn add(&mut self, x: Kmer) {
        if self.n >= self.max_n {
            self.expand();
        }

        let table_size = self.table_size();
        let h = kmer::hash(x) as u32;
        let mut probe_num = 1u32;
        let mut k = (h % table_size) as usize;

        loop {
            if self.xs[k].idx == 0 {
                self.n += 1;
                self.xs[k] = Cell { kmer: x, idx: self.n as u32 };
                return;
            } else if self.xs[k].kmer == x {
                return;
            }
            probe_num += 1;
            k = (probe(h, probe_num) % table_size) as usize;
        }
    }

    /// 1-based index of `x`, or 0 if absent.
    pub fn get(&self, x: Kmer) -> u32 {
        let table_size = self.table_size();
        let h = kmer::hash(x) as u32;
        let start = (h % table_size) as usize;
        let mut probe_num = 1u32;
        let mut k = start;

        loop {
            if self.xs[k].idx == 0 {
                return 0;
            } else if self.xs[k].kmer == x {
                return self.xs[k].idx;
            }
            probe_num += 1;
            k = (probe(h, probe_num) % table_size) as usize;
            if k == start {
                return 0;
            }
        }
    }
}

impl Default for KmerSet {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn indices_assigned_in_insertion_order() {
        let mut s = KmerSet::new();
        let xs: Vec<Kmer> = (100..150).collect();
        for &x in &xs {
            s.add(x);
        }
        for (i, &x) in xs.iter().enumerate() {
            assert_eq!(s.get(x), (i + 1) as u32);
        }
        assert_eq!(s.size(), xs.len());
    }

    #[test]
    fn add_is_idempotent() {
        let mut s = KmerSet::new();
        s.add(42);
        let idx = s.get(42);
        s.add(42);
        assert_eq!(s.get(42), idx);
        assert_eq!(s.size(), 1);
    }

    #[test]
    fn absent_key_returns_zero() {
        let s = KmerSet::new();
        assert_eq!(s.get(999), 0);
    }

    #[test]
    fn survives_expansion_past_first_table() {
        let mut s = KmerSet::new();
        // First table is 53 slots at 0.7 load => expands around 37 inserts.
        let n = 500;
        for x in 0..n {
            s.add(x as Kmer);
        }
        assert_eq!(s.size(), n);
        for x in 0..n {
            assert_eq!(s.get(x as Kmer), (x + 1) as u32);
        }
    }
}
