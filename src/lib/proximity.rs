//! Known-variant position sets and the near-variant proximity index.
//!
//! Training-data generation biases sampling toward positions close to (but
//! not exactly at) known true variants. The index is built once from the
//! known-variant file before any position filtering begins and is immutable
//! afterward.

use crate::core::io::get_text_reader;
use anyhow::{Context, Result};
use rustc_hash::{FxHashMap, FxHashSet};
use std::io::BufRead;
use std::path::Path;

/// 1-based positions on one contig.
pub type PositionSet = FxHashSet<u32>;

/// Position sets keyed by contig name.
pub type ContigPositions = FxHashMap<String, PositionSet>;

/// Offsets with magnitude in `[INNER, OUTER]` of a variant are "near" it;
/// offsets strictly inside the inner band are excluded from the near set
/// entirely, even when another variant would otherwise claim them.
pub const NEAR_VARIANT_INNER: u32 = 15;
pub const NEAR_VARIANT_OUTER: u32 = 16;

/// Load known-variant positions from a (possibly gzipped) sites file.
///
/// Only the first two whitespace-separated fields are read: contig name and
/// 1-based position. Lines that do not fit are skipped.
pub fn load_variants<P: AsRef<Path>>(path: P) -> Result<ContigPositions> {
    let reader = get_text_reader(&path)
        .with_context(|| format!("Failed to open variant sites {}", path.as_ref().display()))?;
    variants_from(reader)
}

/// Parse variant positions from any line source. See [`load_variants`].
pub fn variants_from<R: BufRead>(reader: R) -> Result<ContigPositions> {
    let mut variants = ContigPositions::default();
    for line in reader.lines() {
        let line = line?;
        let mut fields = line.split_whitespace();
        let (ctg, pos) = match (fields.next(), fields.next()) {
            (Some(ctg), Some(pos)) => (ctg, pos),
            _ => continue,
        };
        let pos: u32 = match pos.parse() {
            Ok(pos) => pos,
            Err(_) => continue,
        };
        variants.entry(ctg.to_string()).or_default().insert(pos);
    }
    Ok(variants)
}

/// Build the near-variant sets for every contig in `variants`.
///
/// For each variant, offsets in `[-outer, -inner] ∪ [inner, outer]` become
/// near-variant positions unless they are themselves variants or already
/// claimed; offsets strictly inside the inner band are collected into an
/// exclusion set and subtracted at the end, so a position too close to any
/// variant is never "near". Non-positive coordinates are skipped.
pub fn near_variants_from(variants: &ContigPositions, inner: u32, outer: u32) -> ContigPositions {
    let mut near_by_ctg = ContigPositions::default();
    for (ctg, positions) in variants {
        let mut near = PositionSet::default();
        let mut excluded = PositionSet::default();
        for &pos in positions {
            for offset in -(outer as i64)..=(outer as i64) {
                let shifted = pos as i64 + offset;
                if shifted <= 0 {
                    continue;
                }
                let shifted = shifted as u32;
                let magnitude = offset.unsigned_abs() as u32;
                if magnitude < inner {
                    excluded.insert(shifted);
                } else if magnitude <= outer
                    && !positions.contains(&shifted)
                    && !near.contains(&shifted)
                {
                    near.insert(shifted);
                }
            }
        }
        near.retain(|pos| !excluded.contains(pos));
        near_by_ctg.insert(ctg.clone(), near);
    }
    near_by_ctg
}
