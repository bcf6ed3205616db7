//! Matrix Market coordinate integer general writer.
//!
//! Grounded on spec.md §6's format description and the (abandoned)
//! `mm_write_banner`/`mm_write_mtx_crd_size` calls in
//! `examples/original_source/src/dbg.c::dbg_dump`, which sketch the intended
//! banner sequence without ever emitting edges. Written in the teacher's
//! `BufWriter`-wrapped style (`src/reference/write.rs`).

use std::io::Write;

use anyhow::{Context, Result};

use crate::graph::traverse::Graph;

const BANNER: &str = "%%MatrixMarket matrix coordinate integer general";

/// Write `graph` to `out` as Matrix Market coordinate integer general
/// (§6, §8 invariant 7): a banner line, `<N> <N> <M>`, then one `<u> <v> <c>`
/// line per edge, all 1-based.
pub fn write_matrix_market(out: &mut impl Write, graph: &Graph) -> Result<()> {
    writeln!(out, "{BANNER}").context("writing Matrix Market banner")?;
    writeln!(out, "{} {} {}", graph.node_count, graph.node_count, graph.edges.len())
        .context("writing Matrix Market size line")?;
    for &(u, v, count) in &graph.edges {
        writeln!(out, "{u} {v} {count}").context("writing Matrix Market data line")?;
    }
    Ok(())
}
