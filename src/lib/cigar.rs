//! CIGAR handling for textual alignment records.
//!
//! A CIGAR string is a sequence of `<length><opcode>` pairs describing how a
//! read's bases align to the reference. [`CigarTokenizer`] exposes the pairs
//! as a lazy iterator; [`aligned_fraction`] computes the admission heuristic
//! used to reject heavily soft-clipped reads.

/// Minimum fraction of a read's CIGAR span that must be aligned (not
/// soft-clipped) for the read to contribute to the pileup.
pub const MIN_ALIGNED_FRACTION: f64 = 0.55;

/// Lazily tokenizes a CIGAR string into `(length, opcode)` pairs.
///
/// Iteration ends at the end of the string or at the first byte that does not
/// fit the `<digits><opcode>` grammar; a malformed tail is silently dropped.
/// The unavailable-CIGAR sentinel `*` yields no tokens.
pub struct CigarTokenizer<'a> {
    bytes: &'a [u8],
    idx: usize,
}

impl<'a> CigarTokenizer<'a> {
    pub fn new(cigar: &'a str) -> Self {
        Self {
            bytes: cigar.as_bytes(),
            idx: 0,
        }
    }
}

impl<'a> Iterator for CigarTokenizer<'a> {
    type Item = (u32, u8);

    fn next(&mut self) -> Option<(u32, u8)> {
        let mut length: u32 = 0;
        let mut saw_digit = false;
        while let Some(&b) = self.bytes.get(self.idx) {
            if b.is_ascii_digit() {
                length = length.wrapping_mul(10).wrapping_add(u32::from(b - b'0'));
                saw_digit = true;
                self.idx += 1;
            } else {
                break;
            }
        }
        if !saw_digit {
            return None;
        }
        let op = *self.bytes.get(self.idx)?;
        if !op.is_ascii_alphabetic() && op != b'=' {
            return None;
        }
        self.idx += 1;
        Some((length, op))
    }
}

/// Fraction of a read's CIGAR-spanned positions that are aligned.
///
/// Computed as `1 - soft_clipped / (total_span + 1)`; the `+1` in the
/// denominator keeps a zero-span CIGAR from dividing by zero. Reads below
/// [`MIN_ALIGNED_FRACTION`] are skipped by the admission filter.
pub fn aligned_fraction(cigar: &str) -> f64 {
    let mut soft_clipped: u64 = 0;
    let mut total_span: u64 = 0;
    for (length, op) in CigarTokenizer::new(cigar) {
        if op == b'S' {
            soft_clipped += u64::from(length);
        }
        total_span += u64::from(length);
    }
    1.0 - soft_clipped as f64 / (total_span + 1) as f64
}
