//! varsieve - streaming variant-candidate extraction
//!
//! varsieve scans coordinate-sorted alignments for one contig against its
//! reference and emits candidate variant sites: positions whose observed base
//! composition plausibly differs from the reference, subject to coverage and
//! allele-frequency thresholds. A training mode instead emits a
//! probabilistically subsampled set of positions, biased toward the
//! neighborhood of known true variants, for building labeled datasets.
//!
//! # Usage
//!
//! ```bash
//! # Candidates for one contig, to stdout
//! varsieve --bam input.bam --reference ref.fa --contig chr20
//!
//! # Restrict to a range and a BED, write gzip-compressed output
//! varsieve --bam input.bam --reference ref.fa --contig chr20 \
//!     --start 1000000 --end 2000000 --bed capture.bed --output can.gz
//!
//! # Training-data generation around known variants
//! varsieve --bam input.bam --reference ref.fa --contig chr20 \
//!     --train --variants known_sites.txt.gz --seed 17
//! ```

extern crate varsieve_lib;
pub mod commands;
use anyhow::Result;
use env_logger::Env;
use log::*;
use structopt::StructOpt;
use varsieve_lib::core::errors::is_broken_pipe;

fn main() -> Result<()> {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();
    if let Err(err) = commands::run_extract(commands::ExtractArgs::from_args()) {
        if is_broken_pipe(&err) {
            std::process::exit(0);
        }
        error!("{}", err);
        std::process::exit(1);
    }
    Ok(())
}
