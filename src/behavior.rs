//! Behavior Analyzer
//!
//! Emits qualitative behavior statements from the classification and the
//! compaction/plasticity fields. Each rule fires independently and rules are
//! evaluated in table order; a rule whose inputs are absent emits nothing.
//! The list is never empty: a general statement is added when no rule fires.

use serde::{Serialize, Serializer};

use crate::classification::Classification;
use crate::sample::SoilSample;
use crate::thresholds::Thresholds;

/// What a behavior statement is about
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BehaviorTrait {
    /// Volume change / swelling potential
    HighPlasticity,
    MediumPlasticity,
    /// Minimal volume change
    LowPlasticity,
    /// Free drainage, low compressibility
    FreeDraining,
    MoistureSensitive,
    /// NMC well wet of OMC
    MoistureExcess,
    /// MDD below the class-typical value
    LowDensity,
    HighDensity,
    ModerateDensity,
    /// Classification had to assume missing data
    DataCaveat,
    General,
}

/// A single behavior statement
#[derive(Debug, Clone, PartialEq)]
pub struct BehaviorStatement {
    pub kind: BehaviorTrait,
    pub text: String,
}

impl Serialize for BehaviorStatement {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.text)
    }
}

/// Inputs visible to behavior rules
pub struct BehaviorContext<'a> {
    pub sample: &'a SoilSample,
    pub classification: &'a Classification,
    pub thresholds: &'a Thresholds,
}

impl BehaviorContext<'_> {
    fn is_highly_plastic(&self) -> bool {
        self.classification.group.is_high_plasticity()
            || self
                .sample
                .effective_plasticity_index()
                .is_some_and(|pi| pi > self.thresholds.high_plasticity_pi)
    }

    fn has_plastic_fines(&self) -> bool {
        self.is_highly_plastic()
            || self
                .sample
                .effective_plasticity_index()
                .is_some_and(|pi| pi > self.thresholds.medium_plasticity_pi)
            || self
                .sample
                .liquid_limit
                .is_some_and(|ll| ll > self.thresholds.compressible_liquid_limit)
    }

    fn is_below_typical_density(&self) -> bool {
        match (
            self.sample.max_dry_density,
            self.thresholds.typical_mdd.for_group(self.classification.group),
        ) {
            (Some(mdd), Some(typical)) => mdd < typical,
            _ => false,
        }
    }
}

struct BehaviorRule {
    kind: BehaviorTrait,
    evaluate: fn(&BehaviorContext) -> Option<String>,
}

static BEHAVIOR_RULES: &[BehaviorRule] = &[
    BehaviorRule {
        kind: BehaviorTrait::HighPlasticity,
        evaluate: high_plasticity,
    },
    BehaviorRule {
        kind: BehaviorTrait::MediumPlasticity,
        evaluate: medium_plasticity,
    },
    BehaviorRule {
        kind: BehaviorTrait::LowPlasticity,
        evaluate: low_plasticity,
    },
    BehaviorRule {
        kind: BehaviorTrait::FreeDraining,
        evaluate: free_draining,
    },
    BehaviorRule {
        kind: BehaviorTrait::MoistureSensitive,
        evaluate: moisture_sensitive,
    },
    BehaviorRule {
        kind: BehaviorTrait::MoistureExcess,
        evaluate: moisture_excess,
    },
    BehaviorRule {
        kind: BehaviorTrait::LowDensity,
        evaluate: low_density,
    },
    BehaviorRule {
        kind: BehaviorTrait::HighDensity,
        evaluate: high_density,
    },
    BehaviorRule {
        kind: BehaviorTrait::ModerateDensity,
        evaluate: moderate_density,
    },
    BehaviorRule {
        kind: BehaviorTrait::DataCaveat,
        evaluate: |ctx| ctx.classification.note.clone(),
    },
];

fn high_plasticity(ctx: &BehaviorContext) -> Option<String> {
    if !ctx.is_highly_plastic() {
        return None;
    }
    Some(match ctx.sample.effective_plasticity_index() {
        Some(pi) => format!(
            "Highly plastic (PI {:.1}) - significant volume change and swelling potential with moisture variation",
            pi
        ),
        None => "Highly plastic - significant volume change and swelling potential with moisture variation"
            .to_string(),
    })
}

fn medium_plasticity(ctx: &BehaviorContext) -> Option<String> {
    if ctx.is_highly_plastic() {
        return None;
    }
    let pi = ctx.sample.effective_plasticity_index()?;
    (pi > ctx.thresholds.medium_plasticity_pi).then(|| {
        format!("Medium plasticity (PI {:.1}) - moderate volume change potential", pi)
    })
}

fn low_plasticity(ctx: &BehaviorContext) -> Option<String> {
    if ctx.is_highly_plastic() {
        return None;
    }
    let pi = ctx.sample.effective_plasticity_index()?;
    (pi <= ctx.thresholds.medium_plasticity_pi)
        .then(|| format!("Low plasticity (PI {:.1}) - minimal volume change", pi))
}

// Plastic fines take over drainage and compressibility
fn free_draining(ctx: &BehaviorContext) -> Option<String> {
    if ctx.has_plastic_fines() {
        return None;
    }
    ctx.classification.group.is_coarse_grained().then(|| {
        format!(
            "{} - free-draining with low compressibility",
            ctx.classification.group_name()
        )
    })
}

fn moisture_sensitive(ctx: &BehaviorContext) -> Option<String> {
    ctx.classification.group.is_fine_grained().then(|| {
        "Fine-grained soil - strength and workability sensitive to moisture content".to_string()
    })
}

fn moisture_excess(ctx: &BehaviorContext) -> Option<String> {
    let excess = ctx.sample.moisture_excess()?;
    if excess <= ctx.thresholds.moisture_excess {
        return None;
    }
    Some(format!(
        "Natural moisture {:.1} points above OMC - compaction difficult, probable strength loss",
        excess
    ))
}

fn low_density(ctx: &BehaviorContext) -> Option<String> {
    let mdd = ctx.sample.max_dry_density?;
    let typical = ctx.thresholds.typical_mdd.for_group(ctx.classification.group)?;
    ctx.is_below_typical_density().then(|| {
        format!(
            "Maximum dry density {:.1} kN/m³ below typical {:.1} kN/m³ for {} - low in-place density likely",
            mdd,
            typical,
            ctx.classification.symbol()
        )
    })
}

fn high_density(ctx: &BehaviorContext) -> Option<String> {
    let mdd = ctx.sample.max_dry_density?;
    if ctx.is_below_typical_density() || mdd <= ctx.thresholds.high_density_mdd {
        return None;
    }
    Some(format!(
        "High density achievable (MDD {:.1} kN/m³) - good compaction potential",
        mdd
    ))
}

fn moderate_density(ctx: &BehaviorContext) -> Option<String> {
    let mdd = ctx.sample.max_dry_density?;
    if ctx.is_below_typical_density()
        || mdd > ctx.thresholds.high_density_mdd
        || mdd <= ctx.thresholds.moderate_density_mdd
    {
        return None;
    }
    Some(format!("Moderate density (MDD {:.1} kN/m³) - adequate compaction", mdd))
}

fn general_statement(classification: &Classification) -> BehaviorStatement {
    let text = if classification.is_indeterminate() {
        "Behavior cannot be characterised without grain-size data".to_string()
    } else {
        format!(
            "{} - no adverse behavior indicated by the supplied parameters",
            classification.group_name()
        )
    };
    BehaviorStatement {
        kind: BehaviorTrait::General,
        text,
    }
}

/// Analyze behavior for a classified sample
pub fn analyze_behavior(
    sample: &SoilSample,
    classification: &Classification,
    thresholds: &Thresholds,
) -> Vec<BehaviorStatement> {
    let ctx = BehaviorContext {
        sample,
        classification,
        thresholds,
    };

    let mut statements: Vec<BehaviorStatement> = BEHAVIOR_RULES
        .iter()
        .filter_map(|rule| {
            (rule.evaluate)(&ctx).map(|text| BehaviorStatement { kind: rule.kind, text })
        })
        .collect();

    if statements.is_empty() {
        statements.push(general_statement(classification));
    }

    tracing::debug!("Behavior analysis produced {} statements", statements.len());
    statements
}

/// True when any statement has the given trait
pub fn has_trait(statements: &[BehaviorStatement], kind: BehaviorTrait) -> bool {
    statements.iter().any(|s| s.kind == kind)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classification::{classify, SoilGroup};

    fn run(sample: &SoilSample) -> Vec<BehaviorStatement> {
        let t = Thresholds::default();
        let classification = classify(sample, &t);
        analyze_behavior(sample, &classification, &t)
    }

    fn kinds(statements: &[BehaviorStatement]) -> Vec<BehaviorTrait> {
        statements.iter().map(|s| s.kind).collect()
    }

    #[test]
    fn test_high_plasticity_clay_wet_of_optimum() {
        let sample = SoilSample {
            liquid_limit: Some(60.0),
            plastic_limit: Some(25.0),
            plasticity_index: Some(35.0),
            fines: Some(60.0),
            natural_moisture: Some(30.0),
            optimum_moisture: Some(18.0),
            ..Default::default()
        };
        assert_eq!(
            kinds(&run(&sample)),
            vec![
                BehaviorTrait::HighPlasticity,
                BehaviorTrait::MoistureSensitive,
                BehaviorTrait::MoistureExcess,
            ]
        );
    }

    #[test]
    fn test_well_graded_sand_is_free_draining() {
        let sample = SoilSample {
            gravel: Some(10.0),
            coarse_sand: Some(30.0),
            medium_sand: Some(30.0),
            fine_sand: Some(20.0),
            fines: Some(10.0),
            optimum_moisture: Some(12.0),
            max_dry_density: Some(18.0),
            natural_moisture: Some(11.0),
            ..Default::default()
        };
        let statements = run(&sample);
        assert_eq!(
            kinds(&statements),
            vec![BehaviorTrait::FreeDraining, BehaviorTrait::ModerateDensity]
        );
        assert!(statements[0].text.starts_with("Well-graded Sand"));
        assert_eq!(statements[1].text, "Moderate density (MDD 18.0 kN/m³) - adequate compaction");
    }

    #[test]
    fn test_sand_with_plastic_fines_not_free_draining() {
        let sample = SoilSample {
            gravel: Some(10.0),
            coarse_sand: Some(15.0),
            medium_sand: Some(15.0),
            fine_sand: Some(15.0),
            fines: Some(45.0),
            liquid_limit: Some(60.0),
            plasticity_index: Some(35.0),
            ..Default::default()
        };
        let statements = run(&sample);
        assert!(has_trait(&statements, BehaviorTrait::HighPlasticity));
        assert!(!has_trait(&statements, BehaviorTrait::FreeDraining));
    }

    #[test]
    fn test_low_plasticity_statement() {
        let sample = SoilSample {
            fines: Some(60.0),
            liquid_limit: Some(25.0),
            plasticity_index: Some(5.0),
            ..Default::default()
        };
        let statements = run(&sample);
        assert_eq!(statements[0].kind, BehaviorTrait::LowPlasticity);
        assert_eq!(statements[0].text, "Low plasticity (PI 5.0) - minimal volume change");
    }

    #[test]
    fn test_density_tiers() {
        let dense = SoilSample {
            gravel: Some(60.0),
            coarse_sand: Some(10.0),
            medium_sand: Some(10.0),
            fine_sand: Some(10.0),
            fines: Some(10.0),
            max_dry_density: Some(20.5),
            ..Default::default()
        };
        let statements = run(&dense);
        assert!(has_trait(&statements, BehaviorTrait::HighDensity));
        assert!(!has_trait(&statements, BehaviorTrait::ModerateDensity));

        // 17.0 is moderate in absolute terms but below the GW typical value
        let loose = SoilSample {
            max_dry_density: Some(17.0),
            ..dense
        };
        let statements = run(&loose);
        assert!(has_trait(&statements, BehaviorTrait::LowDensity));
        assert!(!has_trait(&statements, BehaviorTrait::ModerateDensity));
    }

    #[test]
    fn test_low_density_for_group() {
        let sample = SoilSample {
            gravel: Some(10.0),
            coarse_sand: Some(30.0),
            medium_sand: Some(30.0),
            fine_sand: Some(20.0),
            fines: Some(10.0),
            max_dry_density: Some(16.0),
            ..Default::default()
        };
        let statements = run(&sample);
        assert!(has_trait(&statements, BehaviorTrait::LowDensity));
        assert!(statements.last().unwrap().text.contains("typical 17.5"));
    }

    #[test]
    fn test_medium_plasticity_not_doubled_with_high() {
        let medium = SoilSample {
            fines: Some(55.0),
            liquid_limit: Some(35.0),
            plasticity_index: Some(12.0),
            ..Default::default()
        };
        assert_eq!(
            kinds(&run(&medium)),
            vec![BehaviorTrait::MediumPlasticity, BehaviorTrait::MoistureSensitive]
        );
    }

    #[test]
    fn test_never_empty() {
        let sample = SoilSample {
            optimum_moisture: Some(12.0),
            ..Default::default()
        };
        let statements = run(&sample);
        assert_eq!(statements.len(), 1);
        assert_eq!(statements[0].kind, BehaviorTrait::General);
    }

    #[test]
    fn test_indeterminate_with_high_pi() {
        let t = Thresholds::default();
        let sample = SoilSample {
            plasticity_index: Some(25.0),
            ..Default::default()
        };
        let classification = Classification::new(SoilGroup::Indeterminate);
        let statements = analyze_behavior(&sample, &classification, &t);
        assert_eq!(kinds(&statements), vec![BehaviorTrait::HighPlasticity]);
    }

    #[test]
    fn test_caveat_surfaced() {
        let sample = SoilSample {
            fines: Some(80.0),
            ..Default::default()
        };
        let statements = run(&sample);
        assert!(has_trait(&statements, BehaviorTrait::DataCaveat));
    }
}
