//! Per-position tallies and the sliding pileup accumulator.
//!
//! [`Tally`] holds the six observation counters for one reference position,
//! keyed by the closed [`Symbol`] enum. [`Pileup`] maps reference coordinates
//! to tallies, created lazily on first touch and evicted wholesale once the
//! streaming driver decides no further read can reach them.

use rustc_hash::FxHashMap;
use std::cmp::Reverse;

/// One countable pileup observation.
///
/// Insertions and deletions are boundary events attributed to the last
/// aligned base before the indel; they are tallied but never count toward
/// depth.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Symbol {
    A,
    C,
    G,
    T,
    Ins,
    Del,
}

impl Symbol {
    /// All symbols in tie-break order: nucleotides first, then indel events.
    pub const ALL: [Symbol; 6] = [
        Symbol::A,
        Symbol::C,
        Symbol::G,
        Symbol::T,
        Symbol::Ins,
        Symbol::Del,
    ];

    /// Map a query base to its tally symbol, normalizing IUPAC ambiguity
    /// codes to one of A/C/G/T. `N` and unknown bytes are not counted.
    #[inline]
    pub fn from_base(base: u8) -> Option<Symbol> {
        match base {
            b'A' | b'R' | b'W' | b'M' | b'D' | b'H' | b'V' => Some(Symbol::A),
            b'C' | b'Y' | b'S' | b'B' => Some(Symbol::C),
            b'G' | b'K' => Some(Symbol::G),
            b'T' | b'U' => Some(Symbol::T),
            _ => None,
        }
    }

    /// The single-character label used on output lines.
    pub fn as_str(self) -> &'static str {
        match self {
            Symbol::A => "A",
            Symbol::C => "C",
            Symbol::G => "G",
            Symbol::T => "T",
            Symbol::Ins => "I",
            Symbol::Del => "D",
        }
    }

    /// Byte form of the label, used when comparing against a reference base.
    #[inline]
    pub fn as_byte(self) -> u8 {
        self.as_str().as_bytes()[0]
    }
}

/// Normalize a reference base the same way query bases are normalized, except
/// that `N` passes through unchanged. Returns `None` for bytes outside the
/// IUPAC alphabet, which callers treat as a skip.
#[inline]
pub fn normalize_reference_base(base: u8) -> Option<u8> {
    if base == b'N' {
        return Some(b'N');
    }
    Symbol::from_base(base).map(Symbol::as_byte)
}

/// Observation counters for a single reference position.
///
/// Counters are only ever incremented; a tally leaves the pileup by wholesale
/// eviction, never by decrement.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Tally {
    counts: [u32; 6],
}

impl Tally {
    #[inline]
    pub fn bump(&mut self, symbol: Symbol) {
        self.counts[symbol as usize] += 1;
    }

    #[inline]
    pub fn count(&self, symbol: Symbol) -> u32 {
        self.counts[symbol as usize]
    }

    /// Read depth at this position: base calls only, indel boundary events
    /// excluded.
    #[inline]
    pub fn depth(&self) -> u32 {
        self.count(Symbol::A) + self.count(Symbol::C) + self.count(Symbol::G) + self.count(Symbol::T)
    }

    /// The six `(symbol, count)` pairs sorted by descending count.
    ///
    /// The sort is stable, so ties keep the [`Symbol::ALL`] order.
    pub fn sorted_counts(&self) -> [(Symbol, u32); 6] {
        let mut pairs = [(Symbol::A, 0u32); 6];
        for (slot, symbol) in pairs.iter_mut().zip(Symbol::ALL) {
            *slot = (symbol, self.count(symbol));
        }
        pairs.sort_by_key(|&(_, count)| Reverse(count));
        pairs
    }
}

/// Sliding mapping from reference coordinate to [`Tally`].
///
/// Owned exclusively by the streaming driver; at any time it holds only
/// coordinates that some future read could still touch.
#[derive(Debug, Default)]
pub struct Pileup {
    tallies: FxHashMap<u32, Tally>,
}

impl Pileup {
    pub fn new() -> Self {
        Self::default()
    }

    /// Increment `symbol` at `pos`, creating an all-zero tally when absent.
    #[inline]
    pub fn touch(&mut self, pos: u32, symbol: Symbol) {
        self.tallies.entry(pos).or_default().bump(symbol);
    }

    /// Remove and return the tally at `pos`.
    pub fn evict(&mut self, pos: u32) -> Option<Tally> {
        self.tallies.remove(&pos)
    }

    /// Held coordinates strictly below `horizon`, ascending.
    pub fn positions_below(&self, horizon: u32) -> Vec<u32> {
        let mut positions: Vec<u32> = self
            .tallies
            .keys()
            .copied()
            .filter(|&pos| pos < horizon)
            .collect();
        positions.sort_unstable();
        positions
    }

    /// All held coordinates, ascending. Used for the final drain at end of
    /// stream.
    pub fn all_positions(&self) -> Vec<u32> {
        let mut positions: Vec<u32> = self.tallies.keys().copied().collect();
        positions.sort_unstable();
        positions
    }

    pub fn get(&self, pos: u32) -> Option<&Tally> {
        self.tallies.get(&pos)
    }

    pub fn len(&self) -> usize {
        self.tallies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tallies.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn touch_creates_and_increments() {
        let mut pileup = Pileup::new();
        pileup.touch(100, Symbol::A);
        pileup.touch(100, Symbol::A);
        pileup.touch(100, Symbol::C);
        let tally = pileup.get(100).unwrap();
        assert_eq!(tally.count(Symbol::A), 2);
        assert_eq!(tally.count(Symbol::C), 1);
        assert_eq!(tally.depth(), 3);
    }

    #[test]
    fn indel_events_do_not_count_toward_depth() {
        let mut tally = Tally::default();
        tally.bump(Symbol::A);
        tally.bump(Symbol::Ins);
        tally.bump(Symbol::Del);
        assert_eq!(tally.depth(), 1);
    }

    #[test]
    fn ambiguity_codes_normalize_to_acgt() {
        assert_eq!(Symbol::from_base(b'R'), Some(Symbol::A));
        assert_eq!(Symbol::from_base(b'Y'), Some(Symbol::C));
        assert_eq!(Symbol::from_base(b'K'), Some(Symbol::G));
        assert_eq!(Symbol::from_base(b'U'), Some(Symbol::T));
        assert_eq!(Symbol::from_base(b'N'), None);
        assert_eq!(Symbol::from_base(b'.'), None);
    }

    #[test]
    fn reference_n_passes_through() {
        assert_eq!(normalize_reference_base(b'N'), Some(b'N'));
        assert_eq!(normalize_reference_base(b'W'), Some(b'A'));
        assert_eq!(normalize_reference_base(b'?'), None);
    }

    #[test]
    fn sorted_counts_breaks_ties_in_symbol_order() {
        let mut tally = Tally::default();
        tally.bump(Symbol::G);
        tally.bump(Symbol::T);
        let pairs = tally.sorted_counts();
        assert_eq!(pairs[0], (Symbol::G, 1));
        assert_eq!(pairs[1], (Symbol::T, 1));
        // zero-count ties keep enum order
        assert_eq!(pairs[2].0, Symbol::A);
        assert_eq!(pairs[3].0, Symbol::C);
    }

    #[test]
    fn eviction_is_wholesale() {
        let mut pileup = Pileup::new();
        pileup.touch(5, Symbol::T);
        assert_eq!(pileup.evict(5).unwrap().count(Symbol::T), 1);
        assert!(pileup.evict(5).is_none());
        assert!(pileup.is_empty());
    }

    #[test]
    fn positions_below_is_strict_and_sorted() {
        let mut pileup = Pileup::new();
        for pos in [30, 10, 20, 40] {
            pileup.touch(pos, Symbol::A);
        }
        assert_eq!(pileup.positions_below(30), vec![10, 20]);
        assert_eq!(pileup.all_positions(), vec![10, 20, 30, 40]);
    }
}
