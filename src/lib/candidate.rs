//! The accepted-candidate output record.

use crate::pileup::Symbol;
use smartstring::{LazyCompact, SmartString};
use std::fmt;

/// One accepted candidate site.
///
/// Formats as a single space-separated line:
/// `ctg pos ref depth` followed by the six `(symbol, count)` pairs in
/// descending count order.
#[derive(Debug, Clone)]
pub struct Candidate {
    /// Contig name.
    pub ctg: SmartString<LazyCompact>,
    /// 1-based position.
    pub pos: u32,
    /// Normalized reference base (may be `N`).
    pub ref_base: char,
    /// Base-call depth; excludes indel boundary events.
    pub depth: u32,
    /// Six-bucket breakdown sorted by descending count.
    pub counts: [(Symbol, u32); 6],
}

impl fmt::Display for Candidate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {} {}", self.ctg, self.pos, self.ref_base, self.depth)?;
        for (symbol, count) in &self.counts {
            write!(f, " {} {}", symbol.as_str(), count)?;
        }
        Ok(())
    }
}
