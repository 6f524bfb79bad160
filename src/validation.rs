//! Input Validator
//!
//! Turns a raw request mapping into a `ValidatedSample`. Hard failures are
//! limited to "nothing supplied" and values that are non-numeric or physically
//! implausible; consistency problems (PI vs LL - PL, grain-size sum, moisture
//! far from optimum) become `ValidationWarning`s that travel with the sample
//! so later stages can surface them.

use rustc_hash::FxHashMap;
use serde::Serialize;
use serde_json::Value;

use crate::sample::{RawSoilInput, SoilField, SoilSample};
use crate::thresholds::Thresholds;

// ============================================================================
// Errors
// ============================================================================

/// Why a single field was rejected
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum ViolationKind {
    /// Value could not be read as a finite number
    NonNumeric { raw: String },
    /// Value outside the physically plausible range
    OutOfRange { value: f64, min: f64, max: f64 },
}

/// A rejected field with the reason
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldViolation {
    pub field: SoilField,
    #[serde(flatten)]
    pub kind: ViolationKind,
}

impl std::fmt::Display for FieldViolation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.kind {
            ViolationKind::NonNumeric { raw } => {
                write!(f, "{}: non-numeric value {}", self.field, raw)
            }
            ViolationKind::OutOfRange { value, min, max } => write!(
                f,
                "{}: {} outside plausible range {}-{}{}",
                self.field,
                value,
                min,
                max,
                self.field.unit()
            ),
        }
    }
}

/// Terminal input failure for an analysis request
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum InputError {
    #[error("no parameters supplied")]
    NoParameters,

    #[error("invalid soil parameters: {}", join_violations(.0))]
    InvalidValues(Vec<FieldViolation>),
}

fn join_violations(violations: &[FieldViolation]) -> String {
    violations
        .iter()
        .map(|v| v.to_string())
        .collect::<Vec<_>>()
        .join("; ")
}

impl InputError {
    /// Stable machine-readable kind
    pub fn kind(&self) -> &'static str {
        match self {
            InputError::NoParameters => "no_parameters",
            InputError::InvalidValues(_) => "invalid_values",
        }
    }

    /// Offending fields (empty for `NoParameters`)
    pub fn fields(&self) -> Vec<SoilField> {
        match self {
            InputError::NoParameters => Vec::new(),
            InputError::InvalidValues(violations) => violations.iter().map(|v| v.field).collect(),
        }
    }

    pub fn violations(&self) -> &[FieldViolation] {
        match self {
            InputError::NoParameters => &[],
            InputError::InvalidValues(violations) => violations,
        }
    }
}

// ============================================================================
// Warnings
// ============================================================================

/// Non-blocking data-quality condition found during validation
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ValidationWarning {
    /// Supplied PI differs from LL - PL beyond tolerance
    PlasticityIndexMismatch { supplied: f64, computed: f64 },

    /// PL above LL (the guide requires LL > PL)
    PlasticLimitExceedsLiquidLimit { liquid_limit: f64, plastic_limit: f64 },

    /// G + CS + MS + FS + F outside the accepted band
    GradingSumOutOfBand { sum: f64 },

    /// NMC far from OMC; compaction feasibility is questionable
    MoistureFarFromOptimum { natural: f64, optimum: f64 },

    /// Key that is not one of the eleven parameters (ignored)
    UnknownField { key: String },
}

impl std::fmt::Display for ValidationWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ValidationWarning::PlasticityIndexMismatch { supplied, computed } => write!(
                f,
                "Supplied PI ({:.1}) differs from LL - PL ({:.1})",
                supplied, computed
            ),
            ValidationWarning::PlasticLimitExceedsLiquidLimit { liquid_limit, plastic_limit } => write!(
                f,
                "Plastic limit ({:.1}%) exceeds liquid limit ({:.1}%)",
                plastic_limit, liquid_limit
            ),
            ValidationWarning::GradingSumOutOfBand { sum } => {
                write!(f, "Grain-size fractions sum to {:.1}% instead of ~100%", sum)
            }
            ValidationWarning::MoistureFarFromOptimum { natural, optimum } => write!(
                f,
                "Natural moisture ({:.1}%) deviates from OMC ({:.1}%) by {:.1} points",
                natural,
                optimum,
                (natural - optimum).abs()
            ),
            ValidationWarning::UnknownField { key } => write!(f, "Unknown parameter '{}' ignored", key),
        }
    }
}

// ============================================================================
// Validated sample
// ============================================================================

/// A sample that passed validation, with its soft warnings.
///
/// Only constructible through `validate` / `validate_sample`, so every
/// downstream stage can rely on in-range values.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedSample {
    sample: SoilSample,
    warnings: Vec<ValidationWarning>,
}

impl ValidatedSample {
    pub fn sample(&self) -> &SoilSample {
        &self.sample
    }

    pub fn warnings(&self) -> &[ValidationWarning] {
        &self.warnings
    }

    pub fn grading_sum_warning(&self) -> Option<f64> {
        self.warnings.iter().find_map(|w| match w {
            ValidationWarning::GradingSumOutOfBand { sum } => Some(*sum),
            _ => None,
        })
    }

    /// (natural, optimum) when NMC is far from OMC on either side
    pub fn moisture_deviation(&self) -> Option<(f64, f64)> {
        self.warnings.iter().find_map(|w| match w {
            ValidationWarning::MoistureFarFromOptimum { natural, optimum } => Some((*natural, *optimum)),
            _ => None,
        })
    }

    pub fn plasticity_mismatch(&self) -> Option<(f64, f64)> {
        self.warnings.iter().find_map(|w| match w {
            ValidationWarning::PlasticityIndexMismatch { supplied, computed } => Some((*supplied, *computed)),
            _ => None,
        })
    }
}

/// Validate a raw request mapping
pub fn validate(raw: &RawSoilInput, thresholds: &Thresholds) -> Result<ValidatedSample, InputError> {
    if raw.is_empty() {
        return Err(InputError::NoParameters);
    }

    let (chosen, unknown) = resolve_keys(raw);

    let mut sample = SoilSample::default();
    let mut violations = Vec::new();

    for (field, (_, value)) in chosen {
        match parse_value(value) {
            Ok(Some(number)) => sample.set(field, number),
            Ok(None) => {}
            Err(raw) => violations.push(FieldViolation {
                field,
                kind: ViolationKind::NonNumeric { raw },
            }),
        }
    }

    if sample.is_empty() {
        return Err(if violations.is_empty() {
            InputError::NoParameters
        } else {
            InputError::InvalidValues(sorted(violations))
        });
    }

    let mut validated = match validate_sample(sample, thresholds) {
        Ok(validated) => validated,
        Err(InputError::InvalidValues(range_violations)) => {
            violations.extend(range_violations);
            return Err(InputError::InvalidValues(sorted(violations)));
        }
        Err(e) => return Err(e),
    };

    if !violations.is_empty() {
        return Err(InputError::InvalidValues(sorted(violations)));
    }

    for key in unknown {
        let warning = ValidationWarning::UnknownField { key };
        tracing::warn!("{}", warning);
        validated.warnings.push(warning);
    }

    Ok(validated)
}

/// Pick one key per field before any value is parsed.
///
/// The canonical key wins over a unit-suffixed alias; between two aliases the
/// first in map order wins. Keys naming no field are returned separately.
fn resolve_keys(raw: &RawSoilInput) -> (FxHashMap<SoilField, (&str, &Value)>, Vec<String>) {
    let mut chosen: FxHashMap<SoilField, (&str, &Value)> = FxHashMap::default();
    let mut unknown = Vec::new();

    for (key, value) in raw {
        let Some(field) = SoilField::from_key(key) else {
            unknown.push(key.clone());
            continue;
        };

        let keep_existing = chosen
            .get(&field)
            .is_some_and(|(existing, _)| existing.trim() == field.key() || key.trim() != field.key());
        if keep_existing {
            tracing::debug!("Ignoring alias '{}' for {} already supplied", key, field);
            continue;
        }
        chosen.insert(field, (key.as_str(), value));
    }

    (chosen, unknown)
}

/// Validate an already-typed sample (range checks + soft warnings)
pub fn validate_sample(sample: SoilSample, thresholds: &Thresholds) -> Result<ValidatedSample, InputError> {
    if sample.is_empty() {
        return Err(InputError::NoParameters);
    }

    let violations: Vec<FieldViolation> = SoilField::ALL
        .iter()
        .filter_map(|field| {
            let value = sample.get(*field)?;
            check_range(*field, value, thresholds)
        })
        .collect();

    if !violations.is_empty() {
        return Err(InputError::InvalidValues(violations));
    }

    let warnings = collect_warnings(&sample, thresholds);
    for warning in &warnings {
        tracing::warn!("{}", warning);
    }

    Ok(ValidatedSample { sample, warnings })
}

fn sorted(mut violations: Vec<FieldViolation>) -> Vec<FieldViolation> {
    violations.sort_by_key(|v| v.field);
    violations
}

/// Ok(None) = absent, Err(raw) = non-numeric
fn parse_value(value: &Value) -> Result<Option<f64>, String> {
    match value {
        Value::Null => Ok(None),
        Value::Number(n) => n
            .as_f64()
            .filter(|v| v.is_finite())
            .map(Some)
            .ok_or_else(|| n.to_string()),
        Value::String(s) => {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                return Ok(None);
            }
            trimmed
                .parse::<f64>()
                .ok()
                .filter(|v| v.is_finite())
                .map(Some)
                .ok_or_else(|| format!("{:?}", s))
        }
        other => Err(other.to_string()),
    }
}

fn check_range(field: SoilField, value: f64, thresholds: &Thresholds) -> Option<FieldViolation> {
    let (min, max, out) = match field {
        // Density must be strictly positive
        SoilField::MaxDryDensity => (
            0.0,
            thresholds.max_dry_density,
            value <= 0.0 || value > thresholds.max_dry_density,
        ),
        _ => (
            0.0,
            thresholds.max_percentage,
            value < 0.0 || value > thresholds.max_percentage,
        ),
    };

    out.then(|| FieldViolation {
        field,
        kind: ViolationKind::OutOfRange { value, min, max },
    })
}

fn collect_warnings(sample: &SoilSample, t: &Thresholds) -> Vec<ValidationWarning> {
    let mut warnings = Vec::new();

    if let (Some(ll), Some(pl)) = (sample.liquid_limit, sample.plastic_limit) {
        if pl > ll {
            warnings.push(ValidationWarning::PlasticLimitExceedsLiquidLimit {
                liquid_limit: ll,
                plastic_limit: pl,
            });
        }
        if let Some(pi) = sample.plasticity_index {
            let computed = ll - pl;
            if (pi - computed).abs() > t.pi_tolerance {
                warnings.push(ValidationWarning::PlasticityIndexMismatch { supplied: pi, computed });
            }
        }
    }

    if let Some(sum) = sample.grading_sum() {
        if sum < t.grading_sum_min || sum > t.grading_sum_max {
            warnings.push(ValidationWarning::GradingSumOutOfBand { sum });
        }
    }

    if let (Some(nmc), Some(omc)) = (sample.natural_moisture, sample.optimum_moisture) {
        if (nmc - omc).abs() > t.moisture_excess {
            warnings.push(ValidationWarning::MoistureFarFromOptimum { natural: nmc, optimum: omc });
        }
    }

    warnings
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn raw(value: Value) -> RawSoilInput {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn test_empty_input() {
        let err = validate(&RawSoilInput::new(), &Thresholds::default()).unwrap_err();
        assert_eq!(err, InputError::NoParameters);
        assert_eq!(err.to_string(), "no parameters supplied");
    }

    #[test]
    fn test_only_blank_values_is_no_parameters() {
        let input = raw(json!({"LL": "", "PL": null}));
        let err = validate(&input, &Thresholds::default()).unwrap_err();
        assert_eq!(err.kind(), "no_parameters");
    }

    #[test]
    fn test_numeric_strings_accepted() {
        let input = raw(json!({"LL": "45.5", "F": 60}));
        let validated = validate(&input, &Thresholds::default()).unwrap();
        assert_eq!(validated.sample().liquid_limit, Some(45.5));
        assert_eq!(validated.sample().fines, Some(60.0));
    }

    #[test]
    fn test_non_numeric_rejected() {
        let input = raw(json!({"LL": "high", "G": true}));
        let err = validate(&input, &Thresholds::default()).unwrap_err();
        assert_eq!(err.kind(), "invalid_values");
        assert_eq!(err.fields(), vec![SoilField::LiquidLimit, SoilField::Gravel]);
    }

    #[test]
    fn test_out_of_range_names_fields() {
        let input = raw(json!({"LL": 120, "G": -5, "F": 40}));
        let err = validate(&input, &Thresholds::default()).unwrap_err();
        assert_eq!(err.fields(), vec![SoilField::LiquidLimit, SoilField::Gravel]);
        assert!(err.to_string().contains("LL: 120 outside plausible range"));
    }

    #[test]
    fn test_zero_density_rejected() {
        let input = raw(json!({"MDD": 0}));
        let err = validate(&input, &Thresholds::default()).unwrap_err();
        assert_eq!(err.fields(), vec![SoilField::MaxDryDensity]);
    }

    #[test]
    fn test_form_keys() {
        let input = raw(json!({"MDD (kN/m3)": 18.5, "NMC (%)": 14, "OMC%": 12}));
        let validated = validate(&input, &Thresholds::default()).unwrap();
        assert_eq!(validated.sample().max_dry_density, Some(18.5));
        assert_eq!(validated.sample().natural_moisture, Some(14.0));
    }

    #[test]
    fn test_canonical_key_wins_over_alias() {
        let input = raw(json!({"NMC": 14, "NMC (%)": 30}));
        let validated = validate(&input, &Thresholds::default()).unwrap();
        assert_eq!(validated.sample().natural_moisture, Some(14.0));
    }

    #[test]
    fn test_bad_alias_ignored_when_canonical_key_valid() {
        // "OMC (%)" sorts before "OMC%" in the request map
        let input = raw(json!({"OMC (%)": "x", "OMC%": 12}));
        let validated = validate(&input, &Thresholds::default()).unwrap();
        assert_eq!(validated.sample().optimum_moisture, Some(12.0));
    }

    #[test]
    fn test_bad_canonical_key_rejected_despite_valid_alias() {
        let input = raw(json!({"NMC": "wet", "NMC (%)": 14}));
        let err = validate(&input, &Thresholds::default()).unwrap_err();
        assert_eq!(err.fields(), vec![SoilField::NaturalMoisture]);
    }

    #[test]
    fn test_pi_mismatch_is_warning() {
        let input = raw(json!({"LL": 60, "PL": 25, "PI": 30}));
        let validated = validate(&input, &Thresholds::default()).unwrap();
        assert_eq!(validated.plasticity_mismatch(), Some((30.0, 35.0)));
        // Supplied PI is kept
        assert_eq!(validated.sample().plasticity_index, Some(30.0));
    }

    #[test]
    fn test_pi_within_tolerance() {
        let input = raw(json!({"LL": 60, "PL": 25, "PI": 35.8}));
        let validated = validate(&input, &Thresholds::default()).unwrap();
        assert!(validated.warnings().is_empty());
    }

    #[test]
    fn test_grading_sum_warning() {
        let input = raw(json!({"G": 40, "CS": 20, "MS": 20, "FS": 25, "F": 10}));
        let validated = validate(&input, &Thresholds::default()).unwrap();
        assert_eq!(validated.grading_sum_warning(), Some(115.0));
    }

    #[test]
    fn test_moisture_far_from_optimum() {
        let input = raw(json!({"NMC": 30, "OMC%": 18}));
        let validated = validate(&input, &Thresholds::default()).unwrap();
        assert!(matches!(
            validated.warnings()[0],
            ValidationWarning::MoistureFarFromOptimum { .. }
        ));
    }

    #[test]
    fn test_dry_side_moisture_deviation() {
        let input = raw(json!({"NMC": 5, "OMC%": 18}));
        let validated = validate(&input, &Thresholds::default()).unwrap();
        assert_eq!(validated.moisture_deviation(), Some((5.0, 18.0)));
    }

    #[test]
    fn test_unknown_field_is_warning() {
        let input = raw(json!({"F": 60, "Clay": 30}));
        let validated = validate(&input, &Thresholds::default()).unwrap();
        assert_eq!(
            validated.warnings(),
            &[ValidationWarning::UnknownField { key: "Clay".to_string() }]
        );
    }

    #[test]
    fn test_plastic_limit_above_liquid_limit() {
        let input = raw(json!({"LL": 20, "PL": 24}));
        let validated = validate(&input, &Thresholds::default()).unwrap();
        assert!(validated
            .warnings()
            .iter()
            .any(|w| matches!(w, ValidationWarning::PlasticLimitExceedsLiquidLimit { .. })));
    }

    #[test]
    fn test_violation_json_shape() {
        let violation = FieldViolation {
            field: SoilField::LiquidLimit,
            kind: ViolationKind::OutOfRange { value: 120.0, min: 0.0, max: 100.0 },
        };
        let json = serde_json::to_value(&violation).unwrap();
        assert_eq!(json["field"], "LL");
        assert_eq!(json["reason"], "out_of_range");
        assert_eq!(json["value"], 120.0);
    }
}
