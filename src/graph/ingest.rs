//! Ingest driver (C7): parses reads, slides the k-mer window, and feeds both
//! the DLCBF (C3) and the seed cache (C4).
//!
//! Grounded on `examples/original_source/src/dbg.c`'s `dbg_add_twobit_seq`
//! for the window-then-canonicalize-then-feed sequence, and on the teacher's
//! `rayon`-driven chromosome loop in `src/bin/reference.rs::run()` for the
//! worker-pool shape — generalized here from a `par_iter` over a known
//! collection to a `rayon::scope` of fixed workers pulling one record at a
//! time from behind a single input mutex (§4.7, §5).

use std::io::BufRead;
use std::sync::Mutex;

use anyhow::{Context, Result};

use super::dlcbf::Dlcbf;
use super::kmer;
use super::reads::RecordReader;
use super::rng::Rng;
use super::seedcache::SeedCache;

/// Base seed for each worker's own `Rng`, matching `dcjones/pique`'s
/// `kmercache_alloc`'s literal `12345` (`kmercache.c:28`); folded with the
/// worker index so each of the `num_threads` per-thread generators
/// (`dbg_add_twobit_seq`'s `rng` argument, `dbg.c:173`) is still
/// deterministic from the run's thread count.
const INGEST_RNG_SEED: u32 = 12345;

/// Running ingest totals, merged across worker threads. Shaped after the
/// teacher's `FastqMersExtractionCounters` (`src/cli/counters.rs`).
#[derive(Debug, Default, Clone, Copy)]
pub struct IngestStats {
    pub reads: u64,
    pub bases: u64,
    pub kmers_fed: u64,
    pub ambiguous_runs: u64,
}

impl std::ops::AddAssign for IngestStats {
    fn add_assign(&mut self, other: Self) {
        self.reads += other.reads;
        self.bases += other.bases;
        self.kmers_fed += other.kmers_fed;
        self.ambiguous_runs += other.ambiguous_runs;
    }
}

/// Feed every record from `reader` into `dlcbf` and `seeds`, using
/// `num_threads` workers drawing from a single shared input mutex (§4.7,
/// §5), each with its own `Rng` fed into the seed cache's eviction roll
/// (§4.2, §4.4). `on_record` is invoked once per consumed read, from
/// whichever worker consumed it — used to drive a progress bar.
///
/// Returns an error if the underlying reader failed mid-stream (a genuine
/// `io::Error`, as opposed to a malformed record, which is dropped silently
/// per §7) — propagated from [`RecordReader::into_error`].
pub fn ingest<R: BufRead + Send>(
    reader: R,
    k: usize,
    num_threads: usize,
    dlcbf: &Dlcbf,
    seeds: &SeedCache,
    on_record: impl Fn() + Sync,
) -> Result<IngestStats> {
    let records = Mutex::new(RecordReader::new(reader));
    let mask = kmer::mask(k);
    let totals = Mutex::new(IngestStats::default());
    let num_threads = num_threads.max(1);

    rayon::scope(|scope| {
        for thread_idx in 0..num_threads {
            let records = &records;
            let totals = &totals;
            let on_record = &on_record;
            scope.spawn(move |_| {
                let mut rng = Rng::new(INGEST_RNG_SEED.wrapping_add(thread_idx as u32));
                let mut local = IngestStats::default();
                loop {
                    let record = records.lock().unwrap().next();
                    let record = match record {
                        Some(r) => r,
                        None => break,
                    };
                    local.reads += 1;
                    feed_read(&record.seq, k, mask, dlcbf, seeds, &mut rng, &mut local);
                    on_record();
                }
                *totals.lock().unwrap() += local;
            });
        }
    });

    let reader = records.into_inner().unwrap();
    if let Some(err) = reader.into_error() {
        return Err(err).context("reading input records");
    }

    Ok(totals.into_inner().unwrap())
}

/// Slide a k-mer window over `seq`, breaking the window at any base that
/// does not encode to {A,C,G,T} (ambiguous bases are skipped, not treated as
/// an error — §7, and the spec's non-goal of dropping whole reads on
/// ambiguity).
fn feed_read(
    seq: &[u8],
    k: usize,
    mask: kmer::Kmer,
    dlcbf: &Dlcbf,
    seeds: &SeedCache,
    rng: &mut Rng,
    stats: &mut IngestStats,
) {
    let mut window: kmer::Kmer = 0;
    let mut window_len = 0usize;
    let mut in_ambiguous_run = false;

    for &b in seq {
        stats.bases += 1;
        match kmer::encode_base(b) {
            Some(code) => {
                in_ambiguous_run = false;
                window = ((window << 2) | code as kmer::Kmer) & mask;
                window_len += 1;
                if window_len >= k {
                    let y = kmer::canonical(window, k);
                    dlcbf.add(y, 1);
                    seeds.inc(y, rng);
                    stats.kmers_fed += 1;
                }
            }
            None => {
                if !in_ambiguous_run {
                    stats.ambiguous_runs += 1;
                    in_ambiguous_run = true;
                }
                window = 0;
                window_len = 0;
            }
        }
    }
}
