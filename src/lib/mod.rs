//! varsieve: streaming extraction of variant candidate sites.
//!
//! The library makes a single left-to-right pass over coordinate-sorted
//! alignment records for one contig, tallies per-position base and indel
//! observations in a bounded sliding pileup window, and emits positions whose
//! base composition plausibly differs from the reference, in strictly
//! ascending order.
//!
//! # Modules
//!
//! - [`cigar`]: CIGAR tokenization and the soft-clip admission heuristic
//! - [`pileup`]: per-position tallies and the sliding pileup accumulator
//! - [`sam`]: parsing of textual alignment records
//! - [`read_filter`]: read admission filtering
//! - [`filter`]: the per-position acceptance pipeline and sampling modes
//! - [`proximity`]: near-variant position sets for training-data generation
//! - [`regions`]: genomic regions and BED interval membership
//! - [`reference`]: the fetched reference window
//! - [`samtools`]: spawning of the external alignment/reference collaborators
//! - [`driver`]: the streaming state machine tying everything together

pub mod candidate;
pub mod cigar;
pub mod core;
pub mod driver;
pub mod filter;
pub mod pileup;
pub mod proximity;
pub mod read_filter;
pub mod reference;
pub mod regions;
pub mod sam;
pub mod samtools;
