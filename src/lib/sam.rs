//! Parsing of textual alignment records.
//!
//! The alignment collaborator emits SAM-formatted lines. Only the fields the
//! pileup needs are retained; everything else is dropped at parse time.

use smartstring::{LazyCompact, SmartString};

/// The subset of one SAM alignment line consumed by the pileup engine.
#[derive(Debug, Clone)]
pub struct SamRecord {
    /// Reference sequence name.
    pub rname: SmartString<LazyCompact>,
    /// 0-based leftmost mapping position.
    pub pos: u32,
    /// Mapping quality.
    pub mapq: u8,
    /// Compact alignment operation string; `*` when unavailable.
    pub cigar: String,
    /// Query sequence, uppercased.
    pub seq: Vec<u8>,
}

impl SamRecord {
    /// Returns `true` for SAM header lines (`@HD`, `@SQ`, ...).
    #[inline]
    pub fn is_header(line: &str) -> bool {
        line.starts_with('@')
    }

    /// Parse one alignment line.
    ///
    /// Returns `None` for lines with fewer than the 11 mandatory SAM fields
    /// or with unparseable position/quality values; such records are skipped,
    /// never treated as fatal.
    pub fn parse(line: &str) -> Option<SamRecord> {
        let fields: Vec<&str> = line.split_whitespace().collect();
        if fields.len() < 11 {
            return None;
        }
        let pos: u64 = fields[3].parse().ok()?;
        if pos == 0 {
            // POS 0 marks an unplaced record
            return None;
        }
        let mapq: u8 = fields[4].parse().ok()?;
        Some(SamRecord {
            rname: SmartString::from(fields[2]),
            pos: (pos - 1) as u32,
            mapq,
            cigar: fields[5].to_string(),
            seq: fields[9].as_bytes().to_ascii_uppercase(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const LINE: &str = "r1\t0\tchr20\t1001\t60\t5M\t*\t0\t0\tacgta\tIIIII";

    #[test]
    fn parses_needed_fields() {
        let rec = SamRecord::parse(LINE).unwrap();
        assert_eq!(rec.rname, "chr20");
        assert_eq!(rec.pos, 1000);
        assert_eq!(rec.mapq, 60);
        assert_eq!(rec.cigar, "5M");
        assert_eq!(rec.seq, b"ACGTA");
    }

    #[test]
    fn rejects_short_and_invalid_lines() {
        assert!(SamRecord::parse("r1\t0\tchr20").is_none());
        assert!(SamRecord::parse("r1\t0\tchr20\tx\t60\t5M\t*\t0\t0\tACGTA\t*").is_none());
        assert!(SamRecord::parse("r1\t4\t*\t0\t0\t*\t*\t0\t0\tACGTA\t*").is_none());
    }

    #[test]
    fn recognizes_header_lines() {
        assert!(SamRecord::is_header("@SQ\tSN:chr20\tLN:64444167"));
        assert!(!SamRecord::is_header(LINE));
    }
}
