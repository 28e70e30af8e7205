//! Output module for presenting crawl results
//!
//! Rankings are printed one entry per line, `<library> <occurrences>`, in
//! rank order.

use crate::crawler::RankedEntry;
use std::io::{self, Write};

/// Writes a ranking to `out`, one entry per line
pub fn write_ranking<W: Write>(out: &mut W, ranking: &[RankedEntry]) -> io::Result<()> {
    for entry in ranking {
        writeln!(out, "{}", entry)?;
    }
    out.flush()
}

/// Prints a ranking to stdout
pub fn print_ranking(ranking: &[RankedEntry]) -> io::Result<()> {
    let stdout = io::stdout();
    let mut out = stdout.lock();
    write_ranking(&mut out, ranking)
}
