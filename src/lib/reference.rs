//! The fetched reference window.
//!
//! When a contig range is requested, only an expanded slice of the contig is
//! fetched and the window carries the offset of its first base; when a bare
//! contig is requested the whole sequence is fetched and the offset is zero.
//! Preserving this dual-offset lookup exactly is what keeps candidate
//! reference bases aligned with pileup coordinates.

use crate::pileup::normalize_reference_base;

/// An uppercase reference slice plus the 0-based coordinate of its first base.
pub struct ReferenceWindow {
    seq: Vec<u8>,
    offset: u32,
}

impl ReferenceWindow {
    pub fn new(seq: Vec<u8>, offset: u32) -> Self {
        Self { seq, offset }
    }

    pub fn len(&self) -> usize {
        self.seq.len()
    }

    pub fn is_empty(&self) -> bool {
        self.seq.is_empty()
    }

    /// Normalized reference base at a 0-based contig coordinate.
    ///
    /// Returns `None` when the coordinate falls outside the fetched window or
    /// the base is not a recognized IUPAC code; callers skip the position.
    pub fn base_at(&self, pos: u32) -> Option<u8> {
        let idx = pos.checked_sub(self.offset)? as usize;
        let base = *self.seq.get(idx)?;
        normalize_reference_base(base)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn whole_contig_window_uses_zero_offset() {
        let window = ReferenceWindow::new(b"ACGT".to_vec(), 0);
        assert_eq!(window.base_at(0), Some(b'A'));
        assert_eq!(window.base_at(3), Some(b'T'));
        assert_eq!(window.base_at(4), None);
    }

    #[test]
    fn ranged_window_shifts_by_fetch_offset() {
        // fetched from 1-based 1001, so offset is 1000
        let window = ReferenceWindow::new(b"ACGT".to_vec(), 1000);
        assert_eq!(window.base_at(1000), Some(b'A'));
        assert_eq!(window.base_at(1003), Some(b'T'));
        assert_eq!(window.base_at(999), None);
        assert_eq!(window.base_at(1004), None);
    }

    #[test]
    fn ambiguity_codes_normalize_and_unknowns_skip() {
        let window = ReferenceWindow::new(b"RN?".to_vec(), 0);
        assert_eq!(window.base_at(0), Some(b'A'));
        assert_eq!(window.base_at(1), Some(b'N'));
        assert_eq!(window.base_at(2), None);
    }
}
