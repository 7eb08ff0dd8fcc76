//! # Candidate Extraction
//!
//! Wires the configuration surface to the streaming engine: validates the
//! reference index and BED contig, fetches the reference window, builds the
//! proximity sets for training mode, spawns `samtools view`, and runs the
//! driver against the resulting stream.

use anyhow::{bail, Result};
use lazy_static::lazy_static;
use log::*;
use std::path::{Path, PathBuf};
use structopt::StructOpt;
use varsieve_lib::core::io::get_writer;
use varsieve_lib::driver::Driver;
use varsieve_lib::filter::{
    PositionFilter, Sampling, DEFAULT_NEAR_PROBABILITY, DEFAULT_OUTPUT_PROBABILITY,
    DEFAULT_OUTSIDE_PROBABILITY,
};
use varsieve_lib::proximity::{
    load_variants, near_variants_from, NEAR_VARIANT_INNER, NEAR_VARIANT_OUTER,
};
use varsieve_lib::read_filter::CandidateReadFilter;
use varsieve_lib::reference::ReferenceWindow;
use varsieve_lib::regions::{BedIndex, Region};
use varsieve_lib::samtools::{
    finish_view, reference_sequence_from, spawn_view, EXPAND_REFERENCE_REGION,
};

lazy_static! {
    /// DEFAULT_OUTPUT_PROBABILITY as a str, for the structopt default.
    static ref DEFAULT_OUTPUT_PROBABILITY_STR: String = DEFAULT_OUTPUT_PROBABILITY.to_string();
}

/// Extract 1-based variant candidates from a coordinate-sorted BAM.
#[derive(StructOpt)]
#[structopt(rename_all = "kebab-case", author, name = "varsieve")]
pub struct ExtractArgs {
    /// Sorted BAM file input.
    #[structopt(long, short = "b", default_value = "input.bam")]
    pub bam: PathBuf,

    /// Reference fasta file input; a matching .fai index must exist.
    #[structopt(long, short = "r", default_value = "ref.fa")]
    pub reference: PathBuf,

    /// Emit candidates only inside the regions of this BED file, intersected
    /// with --contig/--start/--end.
    #[structopt(long)]
    pub bed: Option<PathBuf>,

    /// Candidate output path (gzip-compressed). Omit or pass "-" for raw
    /// lines on stdout.
    #[structopt(long, short = "o")]
    pub output: Option<PathBuf>,

    /// Known-variant sites file (plain or gzipped; first two columns are
    /// contig and 1-based position). With --train, biases sampling toward
    /// positions near these sites.
    #[structopt(long)]
    pub variants: Option<PathBuf>,

    /// Minimum allele frequency of the first non-reference allele for a site
    /// to be considered a candidate.
    #[structopt(long, default_value = "0.125")]
    pub threshold: f64,

    /// Minimum coverage required at a candidate site.
    #[structopt(long, default_value = "4")]
    pub min_coverage: f64,

    /// Minimum mapping quality; lower-quality reads are skipped.
    #[structopt(long, default_value = "0")]
    pub min_mapq: u8,

    /// Build a training dataset: subsample positions probabilistically and
    /// force --threshold to 0.
    #[structopt(long)]
    pub train: bool,

    /// Per-position output probability for --train without --variants.
    #[structopt(long, default_value = DEFAULT_OUTPUT_PROBABILITY_STR.as_str())]
    pub output_prob: f64,

    /// The contig to process.
    #[structopt(long, default_value = "chr17")]
    pub contig: String,

    /// 1-based inclusive start of the region to process.
    #[structopt(long)]
    pub start: Option<u32>,

    /// 1-based inclusive end of the region to process.
    #[structopt(long)]
    pub end: Option<u32>,

    /// Path to the samtools executable.
    #[structopt(long, default_value = "samtools")]
    pub samtools: String,

    /// RNG seed for reproducible training-mode sampling.
    #[structopt(long)]
    pub seed: Option<u64>,
}

pub fn run_extract(args: ExtractArgs) -> Result<()> {
    info!(
        "Extracting candidates from {} on {}",
        args.bam.display(),
        args.contig
    );

    let fai = format!("{}.fai", args.reference.display());
    if !Path::new(&fai).is_file() {
        bail!("Fasta index {} doesn't exist", fai);
    }

    // Both collaborators work on the same fetched region: when a contig range
    // is requested it is expanded on both sides so boundary-overlapping reads
    // still resolve their reference bases, and the window offset follows the
    // expanded start. A bare contig fetches everything at offset 0.
    let ctg_range = match (args.start, args.end) {
        (Some(start), Some(end)) => Some((start, end)),
        _ => None,
    };
    let (fetch_region, ref_offset) = match ctg_range {
        Some((start, end)) => {
            let fetch_start = start.saturating_sub(EXPAND_REFERENCE_REGION).max(1);
            let fetch_end = end.saturating_add(EXPAND_REFERENCE_REGION);
            (
                Region::span(&args.contig, fetch_start, fetch_end),
                fetch_start - 1,
            )
        }
        None => (Region::contig(&args.contig), 0),
    };

    let sequence = reference_sequence_from(&args.samtools, &args.reference, &fetch_region)?;
    if sequence.is_empty() {
        bail!(
            "Failed to load reference sequence from {}",
            args.reference.display()
        );
    }
    let reference = ReferenceWindow::new(sequence, ref_offset);

    let bed = args.bed.as_ref().map(BedIndex::from_path).transpose()?;
    if let Some(bed) = &bed {
        if !bed.has_contig(&args.contig) {
            bail!(
                "Contig {} not present in BED {}",
                args.contig,
                args.bed.as_ref().unwrap().display()
            );
        }
    }

    // The training set must not be biased toward high-confidence calls.
    let threshold = if args.train { 0.0 } else { args.threshold };

    let sampling = if args.train {
        match &args.variants {
            Some(path) => {
                let variants_by_ctg = load_variants(path)?;
                let near_by_ctg =
                    near_variants_from(&variants_by_ctg, NEAR_VARIANT_INNER, NEAR_VARIANT_OUTER);
                let variants = variants_by_ctg
                    .get(&args.contig)
                    .cloned()
                    .unwrap_or_default();
                let near = near_by_ctg.get(&args.contig).cloned().unwrap_or_default();
                info!(
                    "Proximity sampling on {}: {} variants, {} near-variant positions",
                    args.contig,
                    variants.len(),
                    near.len()
                );
                Sampling::Proximity {
                    variants,
                    near,
                    near_probability: DEFAULT_NEAR_PROBABILITY,
                    outside_probability: DEFAULT_OUTSIDE_PROBABILITY,
                }
            }
            None => Sampling::Uniform {
                probability: args.output_prob,
            },
        }
    } else {
        Sampling::Always
    };

    let filter = PositionFilter::new(
        &args.contig,
        ctg_range,
        bed,
        sampling,
        args.min_coverage,
        threshold,
        args.seed,
    );

    let (child, alignments) = spawn_view(&args.samtools, &args.bam, &fetch_region)?;
    let mut writer = get_writer(&args.output, 1, 6)?;
    let mut driver = Driver::new(
        &args.contig,
        CandidateReadFilter::new(args.min_mapq),
        filter,
        reference,
    );
    let reads_processed = driver.run(alignments, &mut writer)?;
    writer.flush()?;
    drop(writer);
    finish_view(child)?;

    if let Some((near, outside)) = driver.filter().proximity_counts() {
        info!("Candidates near variants: {}", near);
        info!("Candidates outside variants: {}", outside);
    }
    if reads_processed == 0 {
        warn!(
            "No read has been processed; either the region has no coverage or the BAM input ({}) is wrong",
            args.bam.display()
        );
    }
    Ok(())
}
