//! Soil Suitability Rust Implementation
//!
//! Deterministic soil classification and construction-suitability engine.
//!
//! Pipeline stages, each a table of independent rules:
//! - `validation`: Input Validator (hard errors + soft warnings)
//! - `classification/`: USCS/IS classifier (plasticity chart, grading)
//! - `behavior`: qualitative behavior statements
//! - `suitability`: SUITABLE / MODERATELY SUITABLE / UNSUITABLE verdict
//! - `risk`: construction risk flags
//! - `recommendation`: ordered remediation advice
//! - `report`: `AnalysisResult` assembly and formatters
//!
//! `SoilAnalyzer` runs the whole pipeline; the `api` feature adds the HTTP service.

pub mod thresholds;
pub mod sample;
pub mod validation;
pub mod classification;
pub mod behavior;
pub mod suitability;
pub mod risk;
pub mod recommendation;
pub mod report;
pub mod analyzer;

#[cfg(feature = "api")]
pub mod config;
#[cfg(feature = "api")]
pub mod api_server;

// Re-export commonly used types
pub use analyzer::SoilAnalyzer;
pub use classification::{classify, Classification, SoilGroup};
pub use report::{AnalysisResult, JsonFormatter, MarkdownFormatter};
pub use sample::{RawSoilInput, SoilField, SoilSample};
pub use suitability::SuitabilityLevel;
pub use thresholds::Thresholds;
pub use validation::{validate, FieldViolation, InputError, ValidatedSample, ValidationWarning};

#[cfg(feature = "api")]
pub use api_server::{create_router, AppState};
#[cfg(feature = "api")]
pub use config::ServerConfig;
