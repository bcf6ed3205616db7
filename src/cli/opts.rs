use std::path::PathBuf;

use clap::{Parser, ValueEnum};

/// Output sparse-matrix format (§6: "Implicit: output format selector").
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Matrix Market coordinate integer general (default).
    Mm,
    /// Harwell-Boeing RUA integer.
    Hb,
}

/// Command-line options for the De Bruijn graph adjacency-matrix builder.
#[derive(Parser, Debug)]
#[command(
    name = "padjmat",
    about = "Build a sparse weighted De Bruijn graph adjacency matrix from FASTQ/FASTA reads",
    version
)]
pub struct Cli {
    /// Input FASTQ/FASTA files [path, repeatable]. Reads stdin if none given.
    #[clap(value_parser, help_heading = "Core")]
    pub inputs: Vec<PathBuf>,

    /// Upper bound on distinct k-mers; sizes the DLCBF as n/d/m buckets per
    /// subtable (d=4, m=8) [integer]
    #[clap(short = 'n', long = "n-kmers", default_value = "100000000", help_heading = "Core")]
    pub n: u64,

    /// K-mer size (2k must fit in the kmer word width) [integer]
    #[clap(short = 'k', long, default_value = "25", help_heading = "Core")]
    pub k: usize,

    /// Worker thread count [integer]
    #[clap(short = 't', long = "threads", default_value = "1", help_heading = "Core")]
    pub threads: usize,

    /// Output sparse-matrix format
    #[clap(short = 'f', long = "format", value_enum, default_value_t = OutputFormat::Mm, help_heading = "Core")]
    pub format: OutputFormat,

    /// Suppress exact-duplicate (u, v) edges during emission [flag]
    ///
    /// Off by default: emitting the same edge more than once is faithful,
    /// acknowledged behavior of the traversal (spec.md §9).
    #[clap(long, help_heading = "Core")]
    pub dedup_edges: bool,

    /// Verbose progress reporting [flag]
    #[clap(short = 'v', long, help_heading = "Core")]
    pub verbose: bool,
}
