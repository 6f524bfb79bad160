//! Recommendation Generator
//!
//! One recommendation per distinct risk category, in detection order, then a
//! single closing recommendation keyed by the suitability level.

use rustc_hash::FxHashSet;
use serde::{Serialize, Serializer};

use crate::risk::{Risk, RiskCategory};
use crate::suitability::SuitabilityLevel;

#[derive(Debug, Clone, PartialEq)]
pub struct Recommendation {
    /// `None` for the verdict-level closing recommendation
    pub category: Option<RiskCategory>,
    pub text: String,
}

impl Serialize for Recommendation {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.text)
    }
}

/// Fixed risk -> remediation lookup
pub fn remediation_for(category: RiskCategory) -> &'static str {
    match category {
        RiskCategory::Swelling => {
            "Provide moisture barriers around foundations and consider lime stabilization to control swelling"
        }
        RiskCategory::ModeratelyExpansive => {
            "Provide a moisture barrier around the foundation perimeter and allow for foundation movement in design"
        }
        RiskCategory::LowBearingCapacity => {
            "Consider deep foundations (piles or piers) or ground improvement to achieve required bearing capacity"
        }
        RiskCategory::HighCompressibility => {
            "Carry out consolidation tests and consider preloading to limit long-term settlement"
        }
        RiskCategory::ModerateCompressibility => {
            "Monitor settlement during and after construction"
        }
        RiskCategory::PoorCompaction => {
            "Dry back the soil to near OMC before placement and compact to at least 95% of MDD"
        }
        RiskCategory::MoistureDeficit => {
            "Wet up the soil to near OMC and mix uniformly before compaction"
        }
        RiskCategory::ErosionDrainage => {
            "Provide filter layers or geotextile separation and controlled surface drainage to prevent erosion"
        }
        RiskCategory::PoorDrainage => "Install proper drainage system to control groundwater",
        RiskCategory::GradingAnomaly => "Repeat the sieve analysis to confirm the grain-size distribution",
        RiskCategory::AtterbergInconsistency => "Repeat the Atterberg limit tests to confirm LL, PL and PI",
    }
}

/// Closing recommendation keyed by suitability level
pub fn closing_for(level: SuitabilityLevel) -> &'static str {
    match level {
        SuitabilityLevel::Suitable => "Proceed with standard foundation design as per IS codes",
        SuitabilityLevel::ModeratelySuitable => {
            "Apply soil improvement measures before foundation design; shallow foundations adequate after treatment"
        }
        SuitabilityLevel::Unsuitable => {
            "Consider raft or pile foundation, or major ground improvement / alternative site"
        }
    }
}

/// Generate ordered recommendations from detected risks and the verdict
pub fn generate_recommendations(risks: &[Risk], level: SuitabilityLevel) -> Vec<Recommendation> {
    let mut seen: FxHashSet<RiskCategory> = FxHashSet::default();

    let mut recommendations: Vec<Recommendation> = risks
        .iter()
        .filter(|risk| seen.insert(risk.category))
        .map(|risk| Recommendation {
            category: Some(risk.category),
            text: remediation_for(risk.category).to_string(),
        })
        .collect();

    recommendations.push(Recommendation {
        category: None,
        text: closing_for(level).to_string(),
    });

    recommendations
}
