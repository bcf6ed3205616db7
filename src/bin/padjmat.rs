//! Binary entry point: parses the CLI (§6), ingests reads into the DLCBF
//! and seed cache (§4.7), traverses to build the edge list (§4.8), and
//! emits the chosen sparse-matrix format.
//!
//! Grounded on the teacher's `src/bin/reference.rs` `main()`/`run()` split,
//! `println!("Start: ...")` phase narration, and `ProgressBar` usage.

use std::io::{self, BufReader, BufWriter, Write};
use std::time::Instant;

use anyhow::{Context, Result};
use indicatif::{ProgressBar, ProgressStyle};

use padjmat::cli::io::open_inputs;
use padjmat::cli::{Cli, OutputFormat};
use padjmat::graph::dlcbf::{Dlcbf, DEFAULT_CELLS_PER_BUCKET};
use padjmat::graph::format::{hb::write_harwell_boeing, mm::write_matrix_market};
use padjmat::graph::ingest::ingest;
use padjmat::graph::kmer::MAX_K;
use padjmat::graph::seedcache::{SeedCache, DEFAULT_CAPACITY};
use padjmat::graph::traverse::traverse;

use clap::Parser;

fn main() {
    if let Err(e) = run() {
        eprintln!("{:?}", e);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let start_time = Instant::now();
    let opt = Cli::parse();

    if opt.k == 0 || opt.k > MAX_K {
        anyhow::bail!("-k must be between 1 and {MAX_K} (got {})", opt.k);
    }

    rayon::ThreadPoolBuilder::new()
        .num_threads(opt.threads.max(1))
        .build_global()
        .context("building Rayon thread pool")?;

    let buckets = Dlcbf::buckets_for(opt.n, DEFAULT_CELLS_PER_BUCKET);
    let dlcbf = Dlcbf::new(buckets, DEFAULT_CELLS_PER_BUCKET);
    let seeds = SeedCache::new(DEFAULT_CAPACITY);

    if opt.verbose {
        println!("Start: Ingesting reads (k={}, n-kmers={}, threads={})", opt.k, opt.n, opt.threads);
    }

    let input = open_inputs(&opt.inputs)?;
    let reader = BufReader::new(input);

    let pb = if opt.verbose {
        let pb = ProgressBar::new_spinner();
        pb.set_style(
            ProgressStyle::default_spinner()
                .template("       {spinner} {pos} reads ingested [{elapsed_precise}]")
                .unwrap(),
        );
        Some(pb)
    } else {
        None
    };

    let stats = ingest(reader, opt.k, opt.threads, &dlcbf, &seeds, || {
        if let Some(pb) = &pb {
            pb.inc(1);
        }
    })?;

    if let Some(pb) = pb {
        pb.finish_with_message("| Finished ingesting");
    }

    if opt.verbose {
        println!(
            "Start: Traversing ({} reads, {} bases, {} kmers fed, {} ambiguous runs)",
            stats.reads, stats.bases, stats.kmers_fed, stats.ambiguous_runs
        );
    }

    let graph = traverse(&dlcbf, &seeds, opt.k, opt.threads, opt.dedup_edges);

    if opt.verbose {
        println!(
            "Start: Writing output ({} nodes, {} edges)",
            graph.node_count,
            graph.edges.len()
        );
    }

    let stdout = io::stdout();
    let mut out = BufWriter::new(stdout.lock());
    match opt.format {
        OutputFormat::Mm => write_matrix_market(&mut out, &graph)?,
        OutputFormat::Hb => write_harwell_boeing(&mut out, &graph)?,
    }
    out.flush().context("flushing output")?;

    if opt.verbose {
        println!("Elapsed time: {:.2?}", start_time.elapsed());
    }

    Ok(())
}

