//! Genomic regions and BED interval membership.
//!
//! [`Region`] models the 1-based inclusive region strings understood by
//! samtools. [`BedIndex`] answers per-base membership queries against an
//! optional BED inclusion file, one interval tree per contig.

use anyhow::{Context, Result};
use bio::io::bed;
use rust_lapper::{Interval, Lapper};
use rustc_hash::FxHashMap;
use std::path::Path;

/// A 1-based inclusive genomic region, or a whole contig when unbounded.
#[derive(Debug, Clone)]
pub struct Region {
    pub ctg: String,
    pub start: Option<u32>,
    pub end: Option<u32>,
}

impl Region {
    pub fn contig(ctg: &str) -> Self {
        Self {
            ctg: ctg.to_string(),
            start: None,
            end: None,
        }
    }

    pub fn span(ctg: &str, start: u32, end: u32) -> Self {
        Self {
            ctg: ctg.to_string(),
            start: Some(start),
            end: Some(end),
        }
    }

    /// The `ctg` or `ctg:start-end` form passed to samtools.
    pub fn samtools_string(&self) -> String {
        match (self.start, self.end) {
            (Some(start), Some(end)) => format!("{}:{}-{}", self.ctg, start, end),
            _ => self.ctg.clone(),
        }
    }
}

/// Point-membership index over the intervals of a BED file.
pub struct BedIndex {
    lappers: FxHashMap<String, Lapper<u32, ()>>,
}

impl BedIndex {
    /// Load a BED file, merging overlapping intervals per contig.
    pub fn from_path<P: AsRef<Path> + std::fmt::Debug>(path: P) -> Result<Self> {
        let mut reader = bed::Reader::from_file(&path)
            .with_context(|| format!("Failed to open BED {}", path.as_ref().display()))?;
        let mut per_ctg: FxHashMap<String, Vec<Interval<u32, ()>>> = FxHashMap::default();
        for record in reader.records() {
            let record = record
                .with_context(|| format!("Invalid BED record in {}", path.as_ref().display()))?;
            per_ctg
                .entry(record.chrom().to_string())
                .or_default()
                .push(Interval {
                    start: record.start() as u32,
                    stop: record.end() as u32,
                    val: (),
                });
        }
        let lappers = per_ctg
            .into_iter()
            .map(|(ctg, intervals)| {
                let mut lapper = Lapper::new(intervals);
                lapper.merge_overlaps();
                (ctg, lapper)
            })
            .collect();
        Ok(Self { lappers })
    }

    pub fn has_contig(&self, ctg: &str) -> bool {
        self.lappers.contains_key(ctg)
    }

    /// Whether the 0-based position is covered by any interval on `ctg`.
    pub fn contains(&self, ctg: &str, pos: u32) -> bool {
        self.lappers
            .get(ctg)
            .map(|lapper| lapper.find(pos, pos + 1).next().is_some())
            .unwrap_or(false)
    }
}
