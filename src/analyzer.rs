//! Soil Analyzer - main coordinator for the suitability pipeline
//!
//! Runs the stages strictly forward:
//! validate -> classify -> behavior -> suitability -> risks -> recommendations -> report.
//! Holds only the immutable threshold table, so one analyzer can be shared
//! across threads. Includes sequential and parallel (Rayon) batch entry points.

use rayon::prelude::*;

use crate::behavior::analyze_behavior;
use crate::classification::classify;
use crate::recommendation::generate_recommendations;
use crate::report::{assemble, AnalysisResult};
use crate::risk::detect_risks;
use crate::sample::{RawSoilInput, SoilSample};
use crate::suitability::evaluate_suitability;
use crate::thresholds::Thresholds;
use crate::validation::{validate, validate_sample, InputError, ValidatedSample};

/// Main soil analyzer
#[derive(Debug, Clone, Default)]
pub struct SoilAnalyzer {
    thresholds: Thresholds,
}

impl SoilAnalyzer {
    pub fn new(thresholds: Thresholds) -> Self {
        Self { thresholds }
    }

    pub fn thresholds(&self) -> &Thresholds {
        &self.thresholds
    }

    /// Analyze a raw request mapping
    pub fn analyze(&self, raw: &RawSoilInput) -> Result<AnalysisResult, InputError> {
        let validated = validate(raw, &self.thresholds)?;
        Ok(self.analyze_validated(&validated))
    }

    /// Analyze an already-typed sample
    pub fn analyze_sample(&self, sample: SoilSample) -> Result<AnalysisResult, InputError> {
        let validated = validate_sample(sample, &self.thresholds)?;
        Ok(self.analyze_validated(&validated))
    }

    /// Run the rule stages; total over any validated sample
    pub fn analyze_validated(&self, validated: &ValidatedSample) -> AnalysisResult {
        let t = &self.thresholds;
        let sample = validated.sample();

        let classification = classify(sample, t);
        let behavior = analyze_behavior(sample, &classification, t);
        let verdict = evaluate_suitability(sample, &classification, &behavior, t);
        let risks = detect_risks(validated, &classification, verdict.level, t);
        let recommendations = generate_recommendations(&risks, verdict.level);

        tracing::debug!(
            "Analyzed sample: {} / {} ({} risks, {} warnings)",
            classification.symbol(),
            verdict.level,
            risks.len(),
            validated.warnings().len()
        );

        assemble(
            sample.clone(),
            classification,
            behavior,
            verdict,
            risks,
            recommendations,
        )
    }

    /// Analyze many samples in parallel; output order matches input order
    pub fn analyze_batch(&self, inputs: &[RawSoilInput]) -> Vec<Result<AnalysisResult, InputError>> {
        inputs.par_iter().map(|raw| self.analyze(raw)).collect()
    }

    /// Sequential version of `analyze_batch`
    pub fn analyze_batch_sequential(&self, inputs: &[RawSoilInput]) -> Vec<Result<AnalysisResult, InputError>> {
        inputs.iter().map(|raw| self.analyze(raw)).collect()
    }
}
