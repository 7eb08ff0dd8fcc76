//! The streaming driver.
//!
//! One pass over the alignment stream: admit records, decode their CIGAR into
//! pileup touches, and after each accepted record drain every position
//! strictly behind the record's start through the filter pipeline. Because
//! input is coordinate-sorted, a position behind the newest read's start can
//! never be touched again, so the pileup never holds more than roughly one
//! read length plus indel span of positions at a time. At end of stream the
//! remaining positions are drained in ascending order.

use crate::cigar::CigarTokenizer;
use crate::filter::PositionFilter;
use crate::pileup::{Pileup, Symbol};
use crate::read_filter::ReadFilter;
use crate::reference::ReferenceWindow;
use crate::sam::SamRecord;
use anyhow::Result;
use smartstring::{LazyCompact, SmartString};
use std::io::{BufRead, Write};

/// Streaming candidate extractor for one contig.
pub struct Driver<F: ReadFilter> {
    ctg: SmartString<LazyCompact>,
    read_filter: F,
    filter: PositionFilter,
    reference: ReferenceWindow,
    pileup: Pileup,
    reads_processed: u64,
}

impl<F: ReadFilter> Driver<F> {
    pub fn new(
        ctg: &str,
        read_filter: F,
        filter: PositionFilter,
        reference: ReferenceWindow,
    ) -> Self {
        Self {
            ctg: SmartString::from(ctg),
            read_filter,
            filter,
            reference,
            pileup: Pileup::new(),
            reads_processed: 0,
        }
    }

    /// Consume the alignment stream and write accepted candidates to `sink`.
    ///
    /// Returns the number of reads that passed admission. Candidates come out
    /// strictly ascending, each position at most once.
    pub fn run<R: BufRead, W: Write>(&mut self, records: R, sink: &mut W) -> Result<u64> {
        for line in records.lines() {
            let line = line?;
            if line.is_empty() || SamRecord::is_header(&line) {
                continue;
            }
            let record = match SamRecord::parse(&line) {
                Some(record) => record,
                None => continue,
            };
            if record.rname != self.ctg {
                continue;
            }
            if !self.read_filter.filter_read(&record) {
                continue;
            }
            self.reads_processed += 1;
            self.accumulate(&record);
            for pos in self.pileup.positions_below(record.pos) {
                self.flush(pos, sink)?;
            }
        }
        for pos in self.pileup.all_positions() {
            self.flush(pos, sink)?;
        }
        Ok(self.reads_processed)
    }

    /// Decode one record's CIGAR into pileup touches.
    fn accumulate(&mut self, record: &SamRecord) {
        let mut ref_pos = record.pos;
        let mut query_pos = 0usize;
        for (length, op) in CigarTokenizer::new(&record.cigar) {
            match op {
                b'S' => query_pos += length as usize,
                b'M' | b'=' | b'X' => {
                    for _ in 0..length {
                        let base = record.seq.get(query_pos).copied();
                        if let Some(symbol) = base.and_then(Symbol::from_base) {
                            self.pileup.touch(ref_pos, symbol);
                        }
                        ref_pos += 1;
                        query_pos += 1;
                    }
                }
                b'I' => {
                    // boundary event on the last aligned base before the indel
                    if let Some(pos) = ref_pos.checked_sub(1) {
                        self.pileup.touch(pos, Symbol::Ins);
                    }
                    query_pos += length as usize;
                }
                b'D' => {
                    if let Some(pos) = ref_pos.checked_sub(1) {
                        self.pileup.touch(pos, Symbol::Del);
                    }
                    ref_pos += length;
                }
                // H, N, P and anything else: no pileup effect
                _ => {}
            }
        }
    }

    /// Evict one closed position and emit it if the pipeline accepts.
    ///
    /// A position whose reference base cannot be resolved is skipped, not an
    /// error.
    fn flush<W: Write>(&mut self, pos: u32, sink: &mut W) -> Result<()> {
        let tally = match self.pileup.evict(pos) {
            Some(tally) => tally,
            None => return Ok(()),
        };
        let ref_base = match self.reference.base_at(pos) {
            Some(base) => base,
            None => return Ok(()),
        };
        if let Some(candidate) = self.filter.evaluate(pos, &tally, ref_base) {
            writeln!(sink, "{}", candidate)?;
        }
        Ok(())
    }

    pub fn reads_processed(&self) -> u64 {
        self.reads_processed
    }

    pub fn filter(&self) -> &PositionFilter {
        &self.filter
    }
}
