//! Risk Detector
//!
//! Independent boolean rules; each appends at most one `Risk`. Rules are not
//! mutually exclusive and a rule whose inputs are absent stays silent.

use serde::{Serialize, Serializer};

use crate::classification::Classification;
use crate::suitability::SuitabilityLevel;
use crate::thresholds::Thresholds;
use crate::validation::ValidatedSample;

/// Risk category, used for recommendation lookup and deduplication
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RiskCategory {
    Swelling,
    /// PI and fines high enough for foundation movement, short of swelling
    ModeratelyExpansive,
    LowBearingCapacity,
    HighCompressibility,
    ModerateCompressibility,
    /// NMC well wet of OMC
    PoorCompaction,
    /// NMC well dry of OMC
    MoistureDeficit,
    ErosionDrainage,
    PoorDrainage,
    /// Informational: grain-size fractions do not sum to ~100%
    GradingAnomaly,
    /// Informational: supplied PI disagrees with LL - PL
    AtterbergInconsistency,
}

impl RiskCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            RiskCategory::Swelling => "swelling",
            RiskCategory::ModeratelyExpansive => "moderately_expansive",
            RiskCategory::LowBearingCapacity => "low_bearing_capacity",
            RiskCategory::HighCompressibility => "high_compressibility",
            RiskCategory::ModerateCompressibility => "moderate_compressibility",
            RiskCategory::PoorCompaction => "poor_compaction",
            RiskCategory::MoistureDeficit => "moisture_deficit",
            RiskCategory::ErosionDrainage => "erosion_drainage",
            RiskCategory::PoorDrainage => "poor_drainage",
            RiskCategory::GradingAnomaly => "grading_anomaly",
            RiskCategory::AtterbergInconsistency => "atterberg_inconsistency",
        }
    }

    pub fn is_informational(&self) -> bool {
        matches!(self, RiskCategory::GradingAnomaly | RiskCategory::AtterbergInconsistency)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Risk {
    pub category: RiskCategory,
    pub description: String,
}

impl Serialize for Risk {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.description)
    }
}

pub struct RiskContext<'a> {
    pub validated: &'a ValidatedSample,
    pub classification: &'a Classification,
    pub level: SuitabilityLevel,
    pub thresholds: &'a Thresholds,
}

struct RiskRule {
    category: RiskCategory,
    detect: fn(&RiskContext) -> Option<String>,
}

static RISK_RULES: &[RiskRule] = &[
    RiskRule {
        category: RiskCategory::Swelling,
        detect: swelling,
    },
    RiskRule {
        category: RiskCategory::ModeratelyExpansive,
        detect: moderately_expansive,
    },
    RiskRule {
        category: RiskCategory::LowBearingCapacity,
        detect: low_bearing_capacity,
    },
    RiskRule {
        category: RiskCategory::HighCompressibility,
        detect: high_compressibility,
    },
    RiskRule {
        category: RiskCategory::ModerateCompressibility,
        detect: moderate_compressibility,
    },
    RiskRule {
        category: RiskCategory::PoorCompaction,
        detect: poor_compaction,
    },
    RiskRule {
        category: RiskCategory::MoistureDeficit,
        detect: moisture_deficit,
    },
    RiskRule {
        category: RiskCategory::ErosionDrainage,
        detect: erosion_drainage,
    },
    RiskRule {
        category: RiskCategory::PoorDrainage,
        detect: poor_drainage,
    },
    RiskRule {
        category: RiskCategory::GradingAnomaly,
        detect: grading_anomaly,
    },
    RiskRule {
        category: RiskCategory::AtterbergInconsistency,
        detect: atterberg_inconsistency,
    },
];

fn swelling(ctx: &RiskContext) -> Option<String> {
    if !ctx.classification.group.is_high_plasticity() {
        return None;
    }
    let pi = ctx.validated.sample().effective_plasticity_index()?;
    (pi > ctx.thresholds.high_plasticity_pi).then(|| {
        format!(
            "Swelling risk: PI {:.1} in {} - expansive behavior with seasonal moisture change",
            pi,
            ctx.classification.symbol()
        )
    })
}

fn moderately_expansive(ctx: &RiskContext) -> Option<String> {
    if swelling(ctx).is_some() {
        return None;
    }
    let sample = ctx.validated.sample();
    let pi = sample.effective_plasticity_index()?;
    let fines = sample.fines?;
    (pi > ctx.thresholds.expansive_pi && fines > ctx.thresholds.expansive_fines).then(|| {
        format!(
            "Moderately expansive: PI {:.1} with {:.1}% fines - foundation movement possible",
            pi, fines
        )
    })
}

fn low_bearing_capacity(ctx: &RiskContext) -> Option<String> {
    let fines = ctx.validated.sample().fines?;
    if fines < ctx.thresholds.fines_split || ctx.level == SuitabilityLevel::Suitable {
        return None;
    }
    Some(format!(
        "Low bearing capacity: {:.1}% fines - fine-grained soil with limited shear strength",
        fines
    ))
}

fn high_compressibility(ctx: &RiskContext) -> Option<String> {
    let ll = ctx.validated.sample().liquid_limit?;
    (ll > ctx.thresholds.compressible_liquid_limit).then(|| {
        format!(
            "High compressibility: LL {:.1} - significant settlement expected under load",
            ll
        )
    })
}

// Only below the high-compressibility LL, so the two tiers never stack
fn moderate_compressibility(ctx: &RiskContext) -> Option<String> {
    let t = ctx.thresholds;
    let sample = ctx.validated.sample();
    if sample.liquid_limit.is_some_and(|ll| ll > t.compressible_liquid_limit) {
        return None;
    }
    let detail = match (sample.liquid_limit, sample.effective_plasticity_index()) {
        (Some(ll), _) if ll > t.moderate_compressible_ll => format!("LL {:.1}", ll),
        (_, Some(pi)) if pi > t.moderate_compressible_pi => format!("PI {:.1}", pi),
        _ => return None,
    };
    Some(format!("Moderate compressibility: {} - monitor settlement", detail))
}

fn poor_compaction(ctx: &RiskContext) -> Option<String> {
    let excess = ctx.validated.sample().moisture_excess()?;
    (excess > ctx.thresholds.moisture_excess).then(|| {
        format!(
            "Poor compaction achievability: natural moisture {:.1} points above OMC",
            excess
        )
    })
}

fn moisture_deficit(ctx: &RiskContext) -> Option<String> {
    let (natural, optimum) = ctx.validated.moisture_deviation()?;
    (natural < optimum).then(|| {
        format!(
            "Moisture deficit: natural moisture {:.1}% is {:.1} points below OMC ({:.1}%) - compaction issues",
            natural,
            optimum - natural,
            optimum
        )
    })
}

fn erosion_drainage(ctx: &RiskContext) -> Option<String> {
    if !ctx.classification.group.is_poorly_graded() {
        return None;
    }
    let fines = ctx.validated.sample().fines?;
    (fines < ctx.thresholds.clean_fines_max).then(|| {
        format!(
            "Erosion/drainage risk: clean {} with {:.1}% fines - susceptible to piping and internal erosion",
            ctx.classification.symbol(),
            fines
        )
    })
}

fn poor_drainage(ctx: &RiskContext) -> Option<String> {
    let sample = ctx.validated.sample();
    let fines = sample.fines?;
    let pi = sample.effective_plasticity_index()?;
    (fines > ctx.thresholds.drainage_fines && pi > ctx.thresholds.drainage_pi).then(|| {
        format!(
            "Poor drainage: {:.1}% fines with PI {:.1} - waterlogging risk, drainage system essential",
            fines, pi
        )
    })
}

fn grading_anomaly(ctx: &RiskContext) -> Option<String> {
    let sum = ctx.validated.grading_sum_warning()?;
    Some(format!(
        "Grading data anomaly: grain-size fractions sum to {:.1}% (expected {:.0}-{:.0}%) - verify sieve analysis",
        sum, ctx.thresholds.grading_sum_min, ctx.thresholds.grading_sum_max
    ))
}

fn atterberg_inconsistency(ctx: &RiskContext) -> Option<String> {
    let (supplied, computed) = ctx.validated.plasticity_mismatch()?;
    Some(format!(
        "Atterberg data inconsistency: supplied PI {:.1} differs from LL - PL = {:.1}",
        supplied, computed
    ))
}

/// Detect construction risks in rule order
pub fn detect_risks(
    validated: &ValidatedSample,
    classification: &Classification,
    level: SuitabilityLevel,
    thresholds: &Thresholds,
) -> Vec<Risk> {
    let ctx = RiskContext {
        validated,
        classification,
        level,
        thresholds,
    };

    let risks: Vec<Risk> = RISK_RULES
        .iter()
        .filter_map(|rule| {
            (rule.detect)(&ctx).map(|description| Risk {
                category: rule.category,
                description,
            })
        })
        .collect();

    tracing::debug!(
        "Detected {} risks: {:?}",
        risks.len(),
        risks.iter().map(|r| r.category.as_str()).collect::<Vec<_>>()
    );
    risks
}
