//! Suitability Evaluator
//!
//! Decision table keyed by soil group, then by behavior traits already
//! derived. Every applicable rule is evaluated and the most severe level wins;
//! among rules of equal severity the earliest in the table supplies the
//! rationale.

use serde::Serialize;

use crate::behavior::{has_trait, BehaviorStatement, BehaviorTrait};
use crate::classification::Classification;
use crate::sample::SoilSample;
use crate::thresholds::Thresholds;

/// Suitability level, totally ordered by severity
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum SuitabilityLevel {
    #[serde(rename = "SUITABLE")]
    Suitable,
    #[serde(rename = "MODERATELY SUITABLE")]
    ModeratelySuitable,
    #[serde(rename = "UNSUITABLE")]
    Unsuitable,
}

impl SuitabilityLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            SuitabilityLevel::Suitable => "SUITABLE",
            SuitabilityLevel::ModeratelySuitable => "MODERATELY SUITABLE",
            SuitabilityLevel::Unsuitable => "UNSUITABLE",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            SuitabilityLevel::Suitable => "Appropriate for standard construction with normal precautions",
            SuitabilityLevel::ModeratelySuitable => {
                "Construction possible with soil improvement or special foundation design"
            }
            SuitabilityLevel::Unsuitable => "Major ground improvement required or consider alternative site",
        }
    }
}

impl std::fmt::Display for SuitabilityLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Level plus the rationale of the deciding rule
#[derive(Debug, Clone, PartialEq)]
pub struct SuitabilityVerdict {
    pub level: SuitabilityLevel,
    pub rationale: String,
}

pub struct SuitabilityContext<'a> {
    pub sample: &'a SoilSample,
    pub classification: &'a Classification,
    pub behavior: &'a [BehaviorStatement],
    pub thresholds: &'a Thresholds,
}

struct SuitabilityRule {
    level: SuitabilityLevel,
    evaluate: fn(&SuitabilityContext) -> Option<String>,
}

static SUITABILITY_RULES: &[SuitabilityRule] = &[
    SuitabilityRule {
        level: SuitabilityLevel::Unsuitable,
        evaluate: indeterminate,
    },
    SuitabilityRule {
        level: SuitabilityLevel::Unsuitable,
        evaluate: wet_high_plasticity,
    },
    SuitabilityRule {
        level: SuitabilityLevel::ModeratelySuitable,
        evaluate: fine_grained,
    },
    SuitabilityRule {
        level: SuitabilityLevel::ModeratelySuitable,
        evaluate: plastic_fines_coarse,
    },
    SuitabilityRule {
        level: SuitabilityLevel::ModeratelySuitable,
        evaluate: poorly_graded,
    },
    SuitabilityRule {
        level: SuitabilityLevel::ModeratelySuitable,
        evaluate: wet_coarse,
    },
    SuitabilityRule {
        level: SuitabilityLevel::ModeratelySuitable,
        evaluate: dry_coarse,
    },
    SuitabilityRule {
        level: SuitabilityLevel::ModeratelySuitable,
        evaluate: low_density_coarse,
    },
];

fn indeterminate(ctx: &SuitabilityContext) -> Option<String> {
    ctx.classification.is_indeterminate().then(|| {
        "Soil could not be classified - grain-size data (fines content) is required before \
         construction suitability can be assessed"
            .to_string()
    })
}

fn wet_high_plasticity(ctx: &SuitabilityContext) -> Option<String> {
    if !ctx.classification.group.is_high_plasticity() || !has_trait(ctx.behavior, BehaviorTrait::MoistureExcess) {
        return None;
    }
    let excess = ctx.sample.moisture_excess()?;
    Some(format!(
        "{} with natural moisture {:.1} points above OMC - not suitable without major ground improvement",
        ctx.classification.label(),
        excess
    ))
}

fn fine_grained(ctx: &SuitabilityContext) -> Option<String> {
    ctx.classification.group.is_fine_grained().then(|| {
        format!(
            "{} - moderately suitable, requires soil improvement measures",
            ctx.classification.label()
        )
    })
}

/// Coarse skeleton whose fines are plastic or compressible
fn plastic_fines_coarse(ctx: &SuitabilityContext) -> Option<String> {
    if !ctx.classification.group.is_coarse_grained() {
        return None;
    }
    let t = ctx.thresholds;
    let plastic = has_trait(ctx.behavior, BehaviorTrait::HighPlasticity)
        || ctx
            .sample
            .effective_plasticity_index()
            .is_some_and(|pi| pi > t.moderate_compressible_pi)
        || ctx
            .sample
            .liquid_limit
            .is_some_and(|ll| ll > t.moderate_compressible_ll);
    plastic.then(|| {
        format!(
            "{} with plastic or compressible fines - moderately suitable, fines govern settlement and volume change",
            ctx.classification.label()
        )
    })
}

/// Any GP/SP; the fines band picks the rationale
fn poorly_graded(ctx: &SuitabilityContext) -> Option<String> {
    if !ctx.classification.group.is_poorly_graded() {
        return None;
    }
    let label = ctx.classification.label();
    let t = ctx.thresholds;
    Some(match ctx.sample.fines {
        Some(fines) if fines < t.borderline_fines_min => format!(
            "{} with {:.1}% fines (clean) - moderately suitable, erosion and drainage control required",
            label, fines
        ),
        Some(fines) if fines <= t.borderline_fines_max => format!(
            "{} with {:.1}% fines (borderline {:.0}-{:.0}%) - moderately suitable, grading and compaction control required",
            label, fines, t.borderline_fines_min, t.borderline_fines_max
        ),
        Some(fines) => format!(
            "{} with {:.1}% fines (above {:.0}%) - moderately suitable, fines control compaction and drainage",
            label, fines, t.borderline_fines_max
        ),
        None => format!("{} - moderately suitable, grading control required", label),
    })
}

fn wet_coarse(ctx: &SuitabilityContext) -> Option<String> {
    if !ctx.classification.group.is_coarse_grained() || !has_trait(ctx.behavior, BehaviorTrait::MoistureExcess) {
        return None;
    }
    Some(format!(
        "{} placed well wet of optimum moisture - moderately suitable once moisture is controlled",
        ctx.classification.label()
    ))
}

fn dry_coarse(ctx: &SuitabilityContext) -> Option<String> {
    if !ctx.classification.group.is_coarse_grained() {
        return None;
    }
    let deficit = -ctx.sample.moisture_excess()?;
    (deficit > ctx.thresholds.moisture_excess).then(|| {
        format!(
            "{} placed {:.1} points dry of optimum moisture - moderately suitable once wetted to near OMC",
            ctx.classification.label(),
            deficit
        )
    })
}

fn low_density_coarse(ctx: &SuitabilityContext) -> Option<String> {
    if !ctx.classification.group.is_coarse_grained() || !has_trait(ctx.behavior, BehaviorTrait::LowDensity) {
        return None;
    }
    Some(format!(
        "{} with below-typical maximum dry density - moderately suitable, densification required",
        ctx.classification.label()
    ))
}

/// Evaluate suitability; the most severe applicable rule wins
pub fn evaluate_suitability(
    sample: &SoilSample,
    classification: &Classification,
    behavior: &[BehaviorStatement],
    thresholds: &Thresholds,
) -> SuitabilityVerdict {
    let ctx = SuitabilityContext {
        sample,
        classification,
        behavior,
        thresholds,
    };

    let mut verdict = SuitabilityVerdict {
        level: SuitabilityLevel::Suitable,
        rationale: format!(
            "{} - suitable for residential/light commercial construction",
            classification.label()
        ),
    };

    for rule in SUITABILITY_RULES {
        // An earlier rule of equal or higher severity already decided
        if rule.level <= verdict.level {
            continue;
        }
        if let Some(rationale) = (rule.evaluate)(&ctx) {
            verdict = SuitabilityVerdict {
                level: rule.level,
                rationale,
            };
        }
    }

    tracing::debug!("Suitability: {} ({})", verdict.level, verdict.rationale);
    verdict
}
