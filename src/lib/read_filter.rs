//! A trait and default implementation of a read admission filter.
//!
//! The main trait is [`ReadFilter`], which decides whether an alignment
//! record may contribute to the pileup at all. [`CandidateReadFilter`] is the
//! standard implementation: it rejects reads below a minimum mapping quality,
//! reads without a usable CIGAR, and reads that are mostly soft-clipped.

use crate::cigar::{aligned_fraction, MIN_ALIGNED_FRACTION};
use crate::sam::SamRecord;

/// A trait for filtering reads before they touch the pileup.
///
/// `filter_read` returns `true` if the read passes the filter and should be
/// accumulated, `false` if it should be skipped with no side effects.
pub trait ReadFilter {
    fn filter_read(&self, read: &SamRecord) -> bool;
}

/// Admission filter for candidate extraction.
pub struct CandidateReadFilter {
    /// Minimum mapping quality for a read to pass filtering.
    min_mapq: u8,
}

impl CandidateReadFilter {
    pub fn new(min_mapq: u8) -> Self {
        Self { min_mapq }
    }
}

impl ReadFilter for CandidateReadFilter {
    /// A read passes when its mapping quality meets the minimum, its CIGAR is
    /// present, and at least [`MIN_ALIGNED_FRACTION`] of its CIGAR span is
    /// aligned rather than soft-clipped.
    #[inline]
    fn filter_read(&self, read: &SamRecord) -> bool {
        if read.mapq < self.min_mapq {
            return false;
        }
        if read.cigar == "*" {
            return false;
        }
        aligned_fraction(&read.cigar) >= MIN_ALIGNED_FRACTION
    }
}
