//! Report Assembler
//!
//! Pure aggregation of the stage outputs into the record consumed by the UI.
//! No computation happens here.

pub mod formatters;

use serde::Serialize;

use crate::behavior::BehaviorStatement;
use crate::classification::Classification;
use crate::recommendation::Recommendation;
use crate::risk::Risk;
use crate::sample::SoilSample;
use crate::suitability::{SuitabilityLevel, SuitabilityVerdict};

pub use formatters::{JsonFormatter, MarkdownFormatter};

/// Aggregate analysis result.
///
/// Wire shape: `classification` string, `behavior` list of strings,
/// `suitability` level name, `suitability_text`, `risks` and
/// `recommendations` lists of strings, `parameters` echoing the input.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalysisResult {
    pub classification: Classification,
    pub behavior: Vec<BehaviorStatement>,
    pub suitability: SuitabilityLevel,
    pub suitability_text: String,
    pub risks: Vec<Risk>,
    pub recommendations: Vec<Recommendation>,
    pub parameters: SoilSample,
}

impl AnalysisResult {
    pub fn symbol(&self) -> &'static str {
        self.classification.symbol()
    }
}

/// Package stage outputs; `parameters` is the sample exactly as supplied
pub fn assemble(
    parameters: SoilSample,
    classification: Classification,
    behavior: Vec<BehaviorStatement>,
    verdict: SuitabilityVerdict,
    risks: Vec<Risk>,
    recommendations: Vec<Recommendation>,
) -> AnalysisResult {
    AnalysisResult {
        classification,
        behavior,
        suitability: verdict.level,
        suitability_text: verdict.rationale,
        risks,
        recommendations,
        parameters,
    }
}
