//! Soil Classifier (USCS / IS)
//!
//! Maps a validated sample to a soil-group symbol and plain-language name.
//!
//! ## Rule order (first match wins)
//! 1. Fines missing -> INDETERMINATE (grain-size data required)
//! 2. Fines >= 50 -> plasticity chart (CH / CL / MH / ML)
//! 3. Fines < 50 -> dominant coarse fraction + sand grading (GW / GP / SW / SP)
//!
//! Organic groups are not produced; there is no organic-content input.

pub mod plasticity;
pub mod grading;

use serde::{Serialize, Serializer};

use crate::sample::SoilSample;
use crate::thresholds::Thresholds;

pub use grading::{classify_coarse_grained, DominantFraction, Gradation};
pub use plasticity::{classify_fine_grained, ALineSide, PlasticityBand};

/// USCS/IS soil group
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SoilGroup {
    GW,
    GP,
    SW,
    SP,
    CL,
    ML,
    CH,
    MH,
    Indeterminate,
}

impl SoilGroup {
    pub fn symbol(&self) -> &'static str {
        match self {
            SoilGroup::GW => "GW",
            SoilGroup::GP => "GP",
            SoilGroup::SW => "SW",
            SoilGroup::SP => "SP",
            SoilGroup::CL => "CL",
            SoilGroup::ML => "ML",
            SoilGroup::CH => "CH",
            SoilGroup::MH => "MH",
            SoilGroup::Indeterminate => "INDETERMINATE",
        }
    }

    /// Group name lookup keyed by symbol
    pub fn group_name(&self) -> &'static str {
        match self {
            SoilGroup::GW => "Well-graded Gravel",
            SoilGroup::GP => "Poorly graded Gravel",
            SoilGroup::SW => "Well-graded Sand",
            SoilGroup::SP => "Poorly graded Sand",
            SoilGroup::CL => "Clay of Low Plasticity",
            SoilGroup::ML => "Silt of Low Plasticity",
            SoilGroup::CH => "Clay of High Plasticity",
            SoilGroup::MH => "Silt of High Plasticity",
            SoilGroup::Indeterminate => "Grain-size data (fines content) required",
        }
    }

    pub fn is_fine_grained(&self) -> bool {
        matches!(self, SoilGroup::CL | SoilGroup::ML | SoilGroup::CH | SoilGroup::MH)
    }

    pub fn is_coarse_grained(&self) -> bool {
        matches!(self, SoilGroup::GW | SoilGroup::GP | SoilGroup::SW | SoilGroup::SP)
    }

    pub fn is_high_plasticity(&self) -> bool {
        matches!(self, SoilGroup::CH | SoilGroup::MH)
    }

    pub fn is_poorly_graded(&self) -> bool {
        matches!(self, SoilGroup::GP | SoilGroup::SP)
    }
}

/// Classification result: group plus an optional data caveat
#[derive(Debug, Clone, PartialEq)]
pub struct Classification {
    pub group: SoilGroup,
    pub note: Option<String>,
}

impl Classification {
    pub fn new(group: SoilGroup) -> Self {
        Self { group, note: None }
    }

    pub fn symbol(&self) -> &'static str {
        self.group.symbol()
    }

    pub fn group_name(&self) -> &'static str {
        self.group.group_name()
    }

    /// "CH - Clay of High Plasticity"
    pub fn label(&self) -> String {
        format!("{} - {}", self.symbol(), self.group_name())
    }

    pub fn is_indeterminate(&self) -> bool {
        self.group == SoilGroup::Indeterminate
    }
}

impl Serialize for Classification {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.label())
    }
}

// ============================================================================
// Rule table
// ============================================================================

struct ClassificationRule {
    name: &'static str,
    applies: fn(&SoilSample, &Thresholds) -> bool,
    classify: fn(&SoilSample, &Thresholds) -> Classification,
}

static CLASSIFICATION_RULES: &[ClassificationRule] = &[
    ClassificationRule {
        name: "missing_fines",
        applies: |s, _| s.fines.is_none(),
        classify: |_, _| Classification::new(SoilGroup::Indeterminate),
    },
    ClassificationRule {
        name: "fine_grained",
        applies: |s, t| s.fines.is_some_and(|f| f >= t.fines_split),
        classify: |s, t| {
            let (group, note) = classify_fine_grained(s, t);
            Classification { group, note }
        },
    },
    ClassificationRule {
        name: "coarse_grained",
        applies: |s, t| s.fines.is_some_and(|f| f < t.fines_split),
        classify: |s, t| Classification {
            group: classify_coarse_grained(s, t),
            note: coarse_data_note(s),
        },
    },
];

fn coarse_data_note(sample: &SoilSample) -> Option<String> {
    (sample.gravel.is_none() && sample.total_sand().is_none()).then(|| {
        "Gravel and sand fractions not supplied - coarse soil assumed to be poorly graded sand".to_string()
    })
}

/// Classify a sample
pub fn classify(sample: &SoilSample, t: &Thresholds) -> Classification {
    CLASSIFICATION_RULES
        .iter()
        .find(|rule| (rule.applies)(sample, t))
        .map(|rule| {
            let classification = (rule.classify)(sample, t);
            tracing::debug!("Classified as {} via rule '{}'", classification.symbol(), rule.name);
            classification
        })
        .unwrap_or_else(|| Classification::new(SoilGroup::Indeterminate))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_fines_is_indeterminate() {
        let sample = SoilSample {
            liquid_limit: Some(60.0),
            plasticity_index: Some(35.0),
            ..Default::default()
        };
        let c = classify(&sample, &Thresholds::default());
        assert!(c.is_indeterminate());
        assert_eq!(c.label(), "INDETERMINATE - Grain-size data (fines content) required");
    }

    #[test]
    fn test_fines_split_is_inclusive() {
        let t = Thresholds::default();
        let fine = SoilSample {
            fines: Some(50.0),
            liquid_limit: Some(40.0),
            plasticity_index: Some(20.0),
            ..Default::default()
        };
        assert_eq!(classify(&fine, &t).group, SoilGroup::CL);

        let coarse = SoilSample {
            fines: Some(49.0),
            liquid_limit: Some(40.0),
            plasticity_index: Some(20.0),
            ..Default::default()
        };
        assert!(classify(&coarse, &t).group.is_coarse_grained());
    }

    #[test]
    fn test_coarse_without_grading_data_has_note() {
        let t = Thresholds::default();
        let fines_only = SoilSample {
            fines: Some(20.0),
            ..Default::default()
        };
        let c = classify(&fines_only, &t);
        assert_eq!(c.group, SoilGroup::SP);
        assert!(c.note.as_deref().unwrap().starts_with("Gravel and sand fractions not supplied"));

        let with_gravel = SoilSample {
            gravel: Some(30.0),
            ..fines_only
        };
        assert_eq!(classify(&with_gravel, &t).note, None);
    }

    #[test]
    fn test_label_and_json() {
        let c = Classification::new(SoilGroup::CH);
        assert_eq!(c.label(), "CH - Clay of High Plasticity");
        assert_eq!(serde_json::to_value(&c).unwrap(), "CH - Clay of High Plasticity");
    }

    #[test]
    fn test_group_families() {
        assert!(SoilGroup::MH.is_fine_grained());
        assert!(SoilGroup::MH.is_high_plasticity());
        assert!(SoilGroup::SP.is_poorly_graded());
        assert!(!SoilGroup::Indeterminate.is_fine_grained());
        assert!(!SoilGroup::Indeterminate.is_coarse_grained());
    }
}
