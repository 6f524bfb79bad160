//! Coarse-grained grading
//!
//! Decides gravel vs sand by the dominant coarse fraction, then well vs poorly
//! graded from how evenly the sand is spread over the coarse, medium and fine
//! sub-bands.

use super::SoilGroup;
use crate::sample::SoilSample;
use crate::thresholds::Thresholds;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DominantFraction {
    Gravel,
    Sand,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Gradation {
    Well,
    Poor,
}

static COARSE_GROUPS: &[(DominantFraction, Gradation, SoilGroup)] = &[
    (DominantFraction::Gravel, Gradation::Well, SoilGroup::GW),
    (DominantFraction::Gravel, Gradation::Poor, SoilGroup::GP),
    (DominantFraction::Sand, Gradation::Well, SoilGroup::SW),
    (DominantFraction::Sand, Gradation::Poor, SoilGroup::SP),
];

/// Gravel dominates only when strictly greater than total sand; absent
/// fractions count as zero.
pub fn dominant_fraction(sample: &SoilSample) -> DominantFraction {
    let gravel = sample.gravel.unwrap_or(0.0);
    let sand = sample.total_sand().unwrap_or(0.0);
    if gravel > sand {
        DominantFraction::Gravel
    } else {
        DominantFraction::Sand
    }
}

/// Largest sand sub-band as a share of total sand (None when no sand)
pub fn largest_band_share(sample: &SoilSample) -> Option<f64> {
    let total = sample.total_sand()?;
    if total <= 0.0 {
        return None;
    }
    let largest = [sample.coarse_sand, sample.medium_sand, sample.fine_sand]
        .iter()
        .flatten()
        .copied()
        .fold(0.0_f64, f64::max);
    Some(largest / total)
}

pub fn sand_gradation(sample: &SoilSample, t: &Thresholds) -> Gradation {
    match largest_band_share(sample) {
        Some(share) if share <= t.sand_band_dominance => Gradation::Well,
        _ => Gradation::Poor,
    }
}

pub fn classify_coarse_grained(sample: &SoilSample, t: &Thresholds) -> SoilGroup {
    let fraction = dominant_fraction(sample);
    let gradation = sand_gradation(sample, t);

    COARSE_GROUPS
        .iter()
        .find(|(f, g, _)| *f == fraction && *g == gradation)
        .map(|(_, _, group)| *group)
        .unwrap_or(SoilGroup::SP)
}
