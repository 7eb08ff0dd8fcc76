//! The per-position acceptance pipeline.
//!
//! Once the streaming driver closes a position, it runs through four stages:
//! region membership, the sampling decision (training mode only), the depth
//! test, and the allele-frequency test. Accepted positions become
//! [`Candidate`] records.

use crate::candidate::Candidate;
use crate::pileup::Tally;
use crate::proximity::PositionSet;
use crate::regions::BedIndex;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use smartstring::{LazyCompact, SmartString};

/// Target number of sampled non-variant training examples genome-wide.
const NON_VARIANT_TARGET: f64 = 7_000_000.0;
/// Expected genome-wide count of near-variant bases for the default window.
const NEAR_VARIANT_BASES: f64 = 14_000_000.0;
/// Assumed genome size behind the calibration constants.
const GENOME_SIZE: f64 = 3_000_000_000.0;

/// Ratio of sampled non-variant to variant training examples.
pub const NON_VARIANT_TO_VARIANT_RATIO: f64 = 2.0;
/// Ratio of near-variant to outside-variant background examples.
pub const NEAR_TO_OUTSIDE_RATIO: f64 = 1.0;

/// Default acceptance probability for uniform training-mode sampling.
pub const DEFAULT_OUTPUT_PROBABILITY: f64 =
    NON_VARIANT_TARGET * NON_VARIANT_TO_VARIANT_RATIO / GENOME_SIZE;

/// Default acceptance probability for positions near a known variant,
/// calibrated so near and far background positions are sampled in roughly
/// equal numbers.
pub const DEFAULT_NEAR_PROBABILITY: f64 = (NON_VARIANT_TARGET / 2.0) * NEAR_TO_OUTSIDE_RATIO
    * NON_VARIANT_TO_VARIANT_RATIO
    / NEAR_VARIANT_BASES;

/// Default acceptance probability for positions away from known variants.
pub const DEFAULT_OUTSIDE_PROBABILITY: f64 =
    (NON_VARIANT_TARGET / 2.0) * NON_VARIANT_TO_VARIANT_RATIO / (GENOME_SIZE - NEAR_VARIANT_BASES);

/// How the sampling stage decides whether a closed position may be emitted.
pub enum Sampling {
    /// Default extraction: every position passes this stage.
    Always,
    /// Training mode without known variants: accept with one fixed
    /// probability everywhere.
    Uniform { probability: f64 },
    /// Training mode with known variants: exact variant positions are never
    /// emitted as background, near-variant positions are accepted with
    /// `near_probability`, everything else with `outside_probability`.
    Proximity {
        variants: PositionSet,
        near: PositionSet,
        near_probability: f64,
        outside_probability: f64,
    },
}

/// The configured per-position filter pipeline, plus its diagnostic counters.
pub struct PositionFilter {
    ctg: SmartString<LazyCompact>,
    /// 1-based inclusive restriction, when a contig range was requested.
    ctg_range: Option<(u32, u32)>,
    bed: Option<BedIndex>,
    sampling: Sampling,
    min_coverage: f64,
    min_allele_frequency: f64,
    rng: StdRng,
    near_candidates: u64,
    outside_candidates: u64,
}

impl PositionFilter {
    pub fn new(
        ctg: &str,
        ctg_range: Option<(u32, u32)>,
        bed: Option<BedIndex>,
        sampling: Sampling,
        min_coverage: f64,
        min_allele_frequency: f64,
        seed: Option<u64>,
    ) -> Self {
        Self {
            ctg: SmartString::from(ctg),
            ctg_range,
            bed,
            sampling,
            min_coverage,
            min_allele_frequency,
            rng: seed.map(StdRng::seed_from_u64).unwrap_or_else(StdRng::from_entropy),
            near_candidates: 0,
            outside_candidates: 0,
        }
    }

    /// Run one closed position through the pipeline.
    ///
    /// `pos` is 0-based; `ref_base` is the normalized reference base at that
    /// position. Returns the candidate to emit, or `None` when any stage
    /// rejects.
    pub fn evaluate(&mut self, pos: u32, tally: &Tally, ref_base: u8) -> Option<Candidate> {
        let pos1 = pos + 1;

        if let Some((start, end)) = self.ctg_range {
            if pos1 < start || pos1 > end {
                return None;
            }
        }
        if let Some(bed) = &self.bed {
            if !bed.contains(&self.ctg, pos) {
                return None;
            }
        }

        let (probability, is_near) = match &self.sampling {
            Sampling::Always => (None, None),
            Sampling::Uniform { probability } => (Some(*probability), None),
            Sampling::Proximity {
                variants,
                near,
                near_probability,
                outside_probability,
            } => {
                if variants.contains(&pos1) {
                    return None;
                }
                let is_near = near.contains(&pos1);
                let probability = if is_near {
                    *near_probability
                } else {
                    *outside_probability
                };
                (Some(probability), Some(is_near))
            }
        };
        if let Some(probability) = probability {
            if self.rng.gen::<f64>() > probability {
                return None;
            }
        }

        let depth = tally.depth();
        if (depth as f64) < self.min_coverage {
            return None;
        }

        let counts = tally.sorted_counts();
        let denominator = depth.max(1) as f64;
        let top_matches_ref = counts[0].0.as_byte() == ref_base;
        if top_matches_ref && (counts[1].1 as f64) / denominator < self.min_allele_frequency {
            return None;
        }

        match is_near {
            Some(true) => self.near_candidates += 1,
            Some(false) => self.outside_candidates += 1,
            None => {}
        }

        Some(Candidate {
            ctg: self.ctg.clone(),
            pos: pos1,
            ref_base: ref_base as char,
            depth,
            counts,
        })
    }

    /// Near/outside diagnostic counters, present only when proximity sampling
    /// was in effect.
    pub fn proximity_counts(&self) -> Option<(u64, u64)> {
        match self.sampling {
            Sampling::Proximity { .. } => Some((self.near_candidates, self.outside_candidates)),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pileup::Symbol;

    fn tally(a: u32, c: u32, g: u32, t: u32) -> Tally {
        let mut tally = Tally::default();
        for (symbol, count) in [
            (Symbol::A, a),
            (Symbol::C, c),
            (Symbol::G, g),
            (Symbol::T, t),
        ] {
            for _ in 0..count {
                tally.bump(symbol);
            }
        }
        tally
    }

    fn plain_filter(min_coverage: f64, min_af: f64) -> PositionFilter {
        PositionFilter::new("chr20", None, None, Sampling::Always, min_coverage, min_af, Some(7))
    }

    #[test]
    fn second_allele_above_threshold_passes_even_when_top_is_ref() {
        let mut filter = plain_filter(4.0, 0.125);
        // A=6, C=4, ref A: depth 10, second allele frequency 0.4
        let candidate = filter.evaluate(999, &tally(6, 4, 0, 0), b'A').unwrap();
        assert_eq!(candidate.pos, 1000);
        assert_eq!(candidate.depth, 10);
        assert_eq!(candidate.counts[0], (Symbol::A, 6));
        assert_eq!(candidate.counts[1], (Symbol::C, 4));
    }

    #[test]
    fn reference_dominated_position_is_rejected() {
        let mut filter = plain_filter(4.0, 0.125);
        // second allele frequency 1/10 < 0.125 and top matches ref
        assert!(filter.evaluate(999, &tally(9, 1, 0, 0), b'A').is_none());
    }

    #[test]
    fn non_reference_top_always_passes_frequency_test() {
        let mut filter = plain_filter(4.0, 0.9);
        assert!(filter.evaluate(999, &tally(1, 9, 0, 0), b'A').is_some());
    }

    #[test]
    fn shallow_positions_are_rejected() {
        let mut filter = plain_filter(4.0, 0.0);
        assert!(filter.evaluate(999, &tally(2, 1, 0, 0), b'A').is_none());
    }

    #[test]
    fn contig_range_is_one_based_inclusive() {
        let mut filter = PositionFilter::new(
            "chr20",
            Some((1000, 2000)),
            None,
            Sampling::Always,
            0.0,
            0.0,
            Some(7),
        );
        let observed = tally(0, 5, 0, 0);
        assert!(filter.evaluate(998, &observed, b'A').is_none()); // pos1 999
        assert!(filter.evaluate(999, &observed, b'A').is_some()); // pos1 1000
        assert!(filter.evaluate(1999, &observed, b'A').is_some()); // pos1 2000
        assert!(filter.evaluate(2000, &observed, b'A').is_none()); // pos1 2001
    }

    #[test]
    fn known_variants_are_never_background() {
        let variants: PositionSet = [1000].into_iter().collect();
        let near: PositionSet = [984].into_iter().collect();
        let mut filter = PositionFilter::new(
            "chr20",
            None,
            None,
            Sampling::Proximity {
                variants,
                near,
                near_probability: 1.0,
                outside_probability: 1.0,
            },
            0.0,
            0.0,
            Some(7),
        );
        let observed = tally(0, 5, 0, 0);
        assert!(filter.evaluate(999, &observed, b'A').is_none()); // the variant itself
        assert!(filter.evaluate(983, &observed, b'A').is_some()); // near ring
        assert!(filter.evaluate(500, &observed, b'A').is_some()); // background
        assert_eq!(filter.proximity_counts(), Some((1, 1)));
    }

    #[test]
    fn zero_probability_sampling_rejects_everything() {
        let mut filter = PositionFilter::new(
            "chr20",
            None,
            None,
            Sampling::Uniform { probability: 0.0 },
            0.0,
            0.0,
            Some(7),
        );
        for pos in 0..100 {
            assert!(filter.evaluate(pos, &tally(0, 5, 0, 0), b'A').is_none());
        }
    }

    #[test]
    fn seeded_sampling_is_reproducible() {
        let run = |seed: u64| -> Vec<u32> {
            let mut filter = PositionFilter::new(
                "chr20",
                None,
                None,
                Sampling::Uniform { probability: 0.5 },
                0.0,
                0.0,
                Some(seed),
            );
            (0..200)
                .filter(|&pos| filter.evaluate(pos, &tally(0, 5, 0, 0), b'A').is_some())
                .collect()
        };
        assert_eq!(run(42), run(42));
        assert!(!run(42).is_empty());
    }

    #[test]
    fn default_probabilities_match_calibration() {
        assert!((DEFAULT_NEAR_PROBABILITY - 0.5).abs() < 1e-12);
        assert!((DEFAULT_OUTSIDE_PROBABILITY - 7_000_000.0 / (3_000_000_000.0 - 14_000_000.0))
            .abs()
            < 1e-12);
        assert!((DEFAULT_OUTPUT_PROBABILITY - 14_000_000.0 / 3_000_000_000.0).abs() < 1e-12);
    }
}
