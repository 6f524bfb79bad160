//! Rule Thresholds
//!
//! Every numeric constant used by the rule stages lives here, so a ruleset can
//! be reviewed or replaced in one place. `Thresholds::default()` is the
//! built-in USCS/IS-derived ruleset; `Thresholds::load` reads a JSON override
//! where any omitted key keeps its default.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use anyhow::{Context, Result};

use crate::classification::SoilGroup;

/// Complete threshold table for one analysis ruleset
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct Thresholds {
    // ========================================================================
    // Validation
    // ========================================================================

    /// Allowed |PI - (LL - PL)| before a mismatch warning
    pub pi_tolerance: f64,

    /// Grain-size sum band (inclusive) treated as consistent
    pub grading_sum_min: f64,
    pub grading_sum_max: f64,

    /// Upper bound for any percentage field (LL, PL, PI, fractions, moisture)
    pub max_percentage: f64,

    /// Upper bound for maximum dry density (kN/m³)
    pub max_dry_density: f64,

    // ========================================================================
    // Classification
    // ========================================================================

    /// Fines content at or above which a soil is fine-grained
    pub fines_split: f64,

    /// Liquid limit at or above which a fine soil is high plasticity
    pub liquid_limit_split: f64,

    /// A-line: PI = slope × (LL - intercept)
    pub a_line_slope: f64,
    pub a_line_intercept: f64,

    /// Largest share of total sand one sub-band may hold for "well graded"
    pub sand_band_dominance: f64,

    // ========================================================================
    // Behavior / suitability / risk
    // ========================================================================

    /// PI above which a soil is treated as highly plastic
    pub high_plasticity_pi: f64,

    /// PI above which a soil is treated as medium plastic
    pub medium_plasticity_pi: f64,

    /// NMC - OMC (percentage points) above which compaction is compromised
    pub moisture_excess: f64,

    /// Fines band for borderline poorly graded coarse soils (inclusive)
    pub borderline_fines_min: f64,
    pub borderline_fines_max: f64,

    /// Fines below which a poorly graded coarse soil is "clean" (erodible)
    pub clean_fines_max: f64,

    /// LL above which settlement from compressibility is expected
    pub compressible_liquid_limit: f64,

    /// LL or PI above which settlement should be monitored
    pub moderate_compressible_ll: f64,
    pub moderate_compressible_pi: f64,

    /// PI and fines above which foundation movement is possible
    pub expansive_pi: f64,
    pub expansive_fines: f64,

    /// Fines and PI above which drainage is poor
    pub drainage_fines: f64,
    pub drainage_pi: f64,

    /// MDD (kN/m³) above which density is rated high / moderate
    pub high_density_mdd: f64,
    pub moderate_density_mdd: f64,

    /// Class-typical minimum MDD per soil group (kN/m³)
    pub typical_mdd: MddTable,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            pi_tolerance: 1.0,
            grading_sum_min: 95.0,
            grading_sum_max: 105.0,
            max_percentage: 100.0,
            max_dry_density: 30.0,

            fines_split: 50.0,
            liquid_limit_split: 50.0,
            a_line_slope: 0.73,
            a_line_intercept: 20.0,
            sand_band_dominance: 0.60,

            high_plasticity_pi: 17.0,
            medium_plasticity_pi: 7.0,
            moisture_excess: 5.0,
            borderline_fines_min: 5.0,
            borderline_fines_max: 12.0,
            clean_fines_max: 5.0,
            compressible_liquid_limit: 50.0,
            moderate_compressible_ll: 35.0,
            moderate_compressible_pi: 17.0,
            expansive_pi: 25.0,
            expansive_fines: 40.0,
            drainage_fines: 50.0,
            drainage_pi: 15.0,
            high_density_mdd: 18.0,
            moderate_density_mdd: 16.0,

            typical_mdd: MddTable::default(),
        }
    }
}

impl Thresholds {
    /// Load a threshold table from a JSON file
    pub fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read thresholds file: {:?}", path))?;

        let thresholds: Thresholds = serde_json::from_str(&contents)
            .with_context(|| "Failed to parse thresholds JSON")?;

        thresholds.check()?;
        Ok(thresholds)
    }

    /// Reject tables whose bands are inverted
    pub fn check(&self) -> Result<()> {
        if self.grading_sum_min > self.grading_sum_max {
            anyhow::bail!(
                "grading_sum_min ({}) exceeds grading_sum_max ({})",
                self.grading_sum_min,
                self.grading_sum_max
            );
        }
        if self.borderline_fines_min > self.borderline_fines_max {
            anyhow::bail!(
                "borderline_fines_min ({}) exceeds borderline_fines_max ({})",
                self.borderline_fines_min,
                self.borderline_fines_max
            );
        }
        if !(0.0..=1.0).contains(&self.sand_band_dominance) {
            anyhow::bail!(
                "sand_band_dominance must be a fraction in 0-1, got {}",
                self.sand_band_dominance
            );
        }
        if self.medium_plasticity_pi > self.high_plasticity_pi {
            anyhow::bail!(
                "medium_plasticity_pi ({}) exceeds high_plasticity_pi ({})",
                self.medium_plasticity_pi,
                self.high_plasticity_pi
            );
        }
        if self.moderate_density_mdd > self.high_density_mdd {
            anyhow::bail!(
                "moderate_density_mdd ({}) exceeds high_density_mdd ({})",
                self.moderate_density_mdd,
                self.high_density_mdd
            );
        }
        Ok(())
    }

    /// PI on the A-line for a given liquid limit
    pub fn a_line_pi(&self, liquid_limit: f64) -> f64 {
        self.a_line_slope * (liquid_limit - self.a_line_intercept)
    }
}

/// Typical minimum maximum-dry-density per soil group (kN/m³)
///
/// Values below these suggest poor achievable density for the group.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct MddTable {
    pub gw: f64,
    pub gp: f64,
    pub sw: f64,
    pub sp: f64,
    pub cl: f64,
    pub ml: f64,
    pub ch: f64,
    pub mh: f64,
}

impl Default for MddTable {
    fn default() -> Self {
        Self {
            gw: 19.0,
            gp: 18.0,
            sw: 17.5,
            sp: 16.5,
            cl: 16.0,
            ml: 15.5,
            ch: 14.5,
            mh: 13.5,
        }
    }
}

impl MddTable {
    /// Threshold for a group; None for groups without a typical density
    pub fn for_group(&self, group: SoilGroup) -> Option<f64> {
        match group {
            SoilGroup::GW => Some(self.gw),
            SoilGroup::GP => Some(self.gp),
            SoilGroup::SW => Some(self.sw),
            SoilGroup::SP => Some(self.sp),
            SoilGroup::CL => Some(self.cl),
            SoilGroup::ML => Some(self.ml),
            SoilGroup::CH => Some(self.ch),
            SoilGroup::MH => Some(self.mh),
            SoilGroup::Indeterminate => None,
        }
    }
}
