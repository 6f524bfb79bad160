//! Plasticity Chart (Casagrande)
//!
//! Places a fine-grained soil on the PI-vs-LL chart. The A-line
//! `PI = 0.73 × (LL - 20)` separates clays (above) from silts (on or below);
//! the LL split (50) separates low from high plasticity.

use super::SoilGroup;
use crate::sample::SoilSample;
use crate::thresholds::Thresholds;

/// Low/high plasticity band from the liquid limit
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlasticityBand {
    Low,
    High,
}

/// Which side of the A-line a point falls on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ALineSide {
    Above,
    OnOrBelow,
}

/// Chart cells, checked first to last
static CHART: &[(PlasticityBand, ALineSide, SoilGroup)] = &[
    (PlasticityBand::High, ALineSide::Above, SoilGroup::CH),
    (PlasticityBand::Low, ALineSide::Above, SoilGroup::CL),
    (PlasticityBand::High, ALineSide::OnOrBelow, SoilGroup::MH),
    (PlasticityBand::Low, ALineSide::OnOrBelow, SoilGroup::ML),
];

pub fn plasticity_band(liquid_limit: f64, t: &Thresholds) -> PlasticityBand {
    if liquid_limit >= t.liquid_limit_split {
        PlasticityBand::High
    } else {
        PlasticityBand::Low
    }
}

pub fn a_line_side(liquid_limit: f64, plasticity_index: f64, t: &Thresholds) -> ALineSide {
    if plasticity_index > t.a_line_pi(liquid_limit) {
        ALineSide::Above
    } else {
        ALineSide::OnOrBelow
    }
}

/// Classify a fine-grained sample.
///
/// Missing LL places the soil in the low band; missing LL or PI places it on
/// or below the A-line. Either case returns a caveat note.
pub fn classify_fine_grained(sample: &SoilSample, t: &Thresholds) -> (SoilGroup, Option<String>) {
    let liquid_limit = sample.liquid_limit;
    let plasticity_index = sample.effective_plasticity_index();

    let band = liquid_limit
        .map(|ll| plasticity_band(ll, t))
        .unwrap_or(PlasticityBand::Low);

    let side = match (liquid_limit, plasticity_index) {
        (Some(ll), Some(pi)) => a_line_side(ll, pi, t),
        _ => ALineSide::OnOrBelow,
    };

    let group = CHART
        .iter()
        .find(|(b, s, _)| *b == band && *s == side)
        .map(|(_, _, g)| *g)
        .unwrap_or(SoilGroup::ML);

    let note = match (liquid_limit, plasticity_index) {
        (Some(_), Some(_)) => None,
        (None, None) => Some(
            "Atterberg limits not supplied; fine-grained soil assumed low-plasticity silt".to_string(),
        ),
        (None, Some(_)) => Some(
            "Liquid limit not supplied; plasticity chart position assumed low plasticity, below A-line".to_string(),
        ),
        (Some(_), None) => Some(
            "Plasticity index not supplied; fine-grained soil assumed below A-line (silt)".to_string(),
        ),
    };

    (group, note)
}
