//! Soil sample input model
//!
//! The eleven laboratory parameters, each optional. "Absent" is `None` and is
//! never conflated with zero; derived quantities (PI from LL/PL, total sand,
//! grading sum, moisture excess) are computed on demand and never written back.

use serde::{Serialize, Serializer};

/// Raw request mapping: field key -> JSON value (number, numeric string, null)
pub type RawSoilInput = serde_json::Map<String, serde_json::Value>;

/// One of the eleven soil-test parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum SoilField {
    LiquidLimit,
    PlasticLimit,
    PlasticityIndex,
    Gravel,
    CoarseSand,
    MediumSand,
    FineSand,
    Fines,
    OptimumMoisture,
    MaxDryDensity,
    NaturalMoisture,
}

impl SoilField {
    /// All fields in form order
    pub const ALL: [SoilField; 11] = [
        SoilField::LiquidLimit,
        SoilField::PlasticLimit,
        SoilField::PlasticityIndex,
        SoilField::Gravel,
        SoilField::CoarseSand,
        SoilField::MediumSand,
        SoilField::FineSand,
        SoilField::Fines,
        SoilField::OptimumMoisture,
        SoilField::MaxDryDensity,
        SoilField::NaturalMoisture,
    ];

    /// The five grain-size fractions
    pub const GRAIN_SIZE: [SoilField; 5] = [
        SoilField::Gravel,
        SoilField::CoarseSand,
        SoilField::MediumSand,
        SoilField::FineSand,
        SoilField::Fines,
    ];

    /// Canonical request key
    pub fn key(&self) -> &'static str {
        match self {
            SoilField::LiquidLimit => "LL",
            SoilField::PlasticLimit => "PL",
            SoilField::PlasticityIndex => "PI",
            SoilField::Gravel => "G",
            SoilField::CoarseSand => "CS",
            SoilField::MediumSand => "MS",
            SoilField::FineSand => "FS",
            SoilField::Fines => "F",
            SoilField::OptimumMoisture => "OMC%",
            SoilField::MaxDryDensity => "MDD",
            SoilField::NaturalMoisture => "NMC",
        }
    }

    /// Resolve a request key, including the unit-suffixed keys the web form posts
    pub fn from_key(key: &str) -> Option<Self> {
        match key.trim() {
            "LL" => Some(SoilField::LiquidLimit),
            "PL" => Some(SoilField::PlasticLimit),
            "PI" => Some(SoilField::PlasticityIndex),
            "G" => Some(SoilField::Gravel),
            "CS" => Some(SoilField::CoarseSand),
            "MS" => Some(SoilField::MediumSand),
            "FS" => Some(SoilField::FineSand),
            "F" => Some(SoilField::Fines),
            "OMC%" | "OMC" | "OMC (%)" => Some(SoilField::OptimumMoisture),
            "MDD" | "MDD (kN/m3)" => Some(SoilField::MaxDryDensity),
            "NMC" | "NMC (%)" | "NMC%" => Some(SoilField::NaturalMoisture),
            _ => None,
        }
    }

    /// Human-readable label
    pub fn label(&self) -> &'static str {
        match self {
            SoilField::LiquidLimit => "Liquid Limit",
            SoilField::PlasticLimit => "Plastic Limit",
            SoilField::PlasticityIndex => "Plasticity Index",
            SoilField::Gravel => "Gravel Content",
            SoilField::CoarseSand => "Coarse Sand",
            SoilField::MediumSand => "Medium Sand",
            SoilField::FineSand => "Fine Sand",
            SoilField::Fines => "Fines Content",
            SoilField::OptimumMoisture => "Optimum Moisture Content",
            SoilField::MaxDryDensity => "Maximum Dry Density",
            SoilField::NaturalMoisture => "Natural Moisture Content",
        }
    }

    pub fn unit(&self) -> &'static str {
        match self {
            SoilField::PlasticityIndex => "",
            SoilField::MaxDryDensity => "kN/m³",
            _ => "%",
        }
    }
}

impl Serialize for SoilField {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.key())
    }
}

impl std::fmt::Display for SoilField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.key())
    }
}

/// Parsed soil-test parameters as supplied by the lab report.
///
/// Serializes with the canonical request keys and omits absent fields, which
/// makes it the echoed `parameters` mapping of a report.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SoilSample {
    #[serde(rename = "LL", skip_serializing_if = "Option::is_none")]
    pub liquid_limit: Option<f64>,

    #[serde(rename = "PL", skip_serializing_if = "Option::is_none")]
    pub plastic_limit: Option<f64>,

    #[serde(rename = "PI", skip_serializing_if = "Option::is_none")]
    pub plasticity_index: Option<f64>,

    #[serde(rename = "G", skip_serializing_if = "Option::is_none")]
    pub gravel: Option<f64>,

    #[serde(rename = "CS", skip_serializing_if = "Option::is_none")]
    pub coarse_sand: Option<f64>,

    #[serde(rename = "MS", skip_serializing_if = "Option::is_none")]
    pub medium_sand: Option<f64>,

    #[serde(rename = "FS", skip_serializing_if = "Option::is_none")]
    pub fine_sand: Option<f64>,

    #[serde(rename = "F", skip_serializing_if = "Option::is_none")]
    pub fines: Option<f64>,

    #[serde(rename = "OMC%", skip_serializing_if = "Option::is_none")]
    pub optimum_moisture: Option<f64>,

    #[serde(rename = "MDD", skip_serializing_if = "Option::is_none")]
    pub max_dry_density: Option<f64>,

    #[serde(rename = "NMC", skip_serializing_if = "Option::is_none")]
    pub natural_moisture: Option<f64>,
}

impl SoilSample {
    pub fn get(&self, field: SoilField) -> Option<f64> {
        match field {
            SoilField::LiquidLimit => self.liquid_limit,
            SoilField::PlasticLimit => self.plastic_limit,
            SoilField::PlasticityIndex => self.plasticity_index,
            SoilField::Gravel => self.gravel,
            SoilField::CoarseSand => self.coarse_sand,
            SoilField::MediumSand => self.medium_sand,
            SoilField::FineSand => self.fine_sand,
            SoilField::Fines => self.fines,
            SoilField::OptimumMoisture => self.optimum_moisture,
            SoilField::MaxDryDensity => self.max_dry_density,
            SoilField::NaturalMoisture => self.natural_moisture,
        }
    }

    pub(crate) fn set(&mut self, field: SoilField, value: f64) {
        let slot = match field {
            SoilField::LiquidLimit => &mut self.liquid_limit,
            SoilField::PlasticLimit => &mut self.plastic_limit,
            SoilField::PlasticityIndex => &mut self.plasticity_index,
            SoilField::Gravel => &mut self.gravel,
            SoilField::CoarseSand => &mut self.coarse_sand,
            SoilField::MediumSand => &mut self.medium_sand,
            SoilField::FineSand => &mut self.fine_sand,
            SoilField::Fines => &mut self.fines,
            SoilField::OptimumMoisture => &mut self.optimum_moisture,
            SoilField::MaxDryDensity => &mut self.max_dry_density,
            SoilField::NaturalMoisture => &mut self.natural_moisture,
        };
        *slot = Some(value);
    }

    /// Number of supplied parameters
    pub fn supplied_count(&self) -> usize {
        SoilField::ALL.iter().filter(|f| self.get(**f).is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.supplied_count() == 0
    }

    /// PI used for analysis: the supplied value, else LL - PL (floored at 0)
    pub fn effective_plasticity_index(&self) -> Option<f64> {
        self.plasticity_index.or_else(|| self.computed_plasticity_index())
    }

    /// LL - PL when both limits are present, floored at 0 (non-plastic)
    pub fn computed_plasticity_index(&self) -> Option<f64> {
        match (self.liquid_limit, self.plastic_limit) {
            (Some(ll), Some(pl)) => Some((ll - pl).max(0.0)),
            _ => None,
        }
    }

    /// Sum of the supplied sand sub-bands; None when no sand band is present
    pub fn total_sand(&self) -> Option<f64> {
        let bands = [self.coarse_sand, self.medium_sand, self.fine_sand];
        if bands.iter().all(Option::is_none) {
            return None;
        }
        Some(bands.iter().flatten().sum())
    }

    /// G + CS + MS + FS + F, only when all five fractions are present
    pub fn grading_sum(&self) -> Option<f64> {
        SoilField::GRAIN_SIZE
            .iter()
            .map(|f| self.get(*f))
            .sum::<Option<f64>>()
    }

    /// NMC - OMC in percentage points (positive = wet of optimum)
    pub fn moisture_excess(&self) -> Option<f64> {
        match (self.natural_moisture, self.optimum_moisture) {
            (Some(nmc), Some(omc)) => Some(nmc - omc),
            _ => None,
        }
    }
}
