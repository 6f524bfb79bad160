//! Analyze Sample
//!
//! Offline CLI: reads soil-test parameters from a JSON file and prints the
//! analysis report.
//!
//! The file may hold a single parameter object, a `{"soil_data": {...}}`
//! request body, or an array of parameter objects (analyzed in parallel).
//! Data-quality warnings are printed to stderr ahead of each report.
//!
//! Run with: cargo run --bin analyze_sample -- sample.json [--format json|compact|markdown] [--thresholds t.json]

use anyhow::{bail, Context, Result};
use rayon::prelude::*;
use soil_suitability_rust::{
    validate, AnalysisResult, InputError, JsonFormatter, MarkdownFormatter, RawSoilInput, SoilAnalyzer,
    Thresholds, ValidationWarning,
};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Copy, PartialEq)]
enum OutputFormat {
    Json,
    Compact,
    Markdown,
}

struct Args {
    input: PathBuf,
    format: OutputFormat,
    thresholds: Option<PathBuf>,
}

fn parse_args() -> Result<Args> {
    let mut input = None;
    let mut format = OutputFormat::Json;
    let mut thresholds = None;

    let mut args = std::env::args().skip(1);
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--format" => {
                format = match args.next().as_deref() {
                    Some("json") => OutputFormat::Json,
                    Some("compact") => OutputFormat::Compact,
                    Some("markdown") | Some("md") => OutputFormat::Markdown,
                    other => bail!("Unknown --format {:?} (expected json, compact or markdown)", other),
                }
            }
            "--thresholds" => {
                let path = args.next().context("--thresholds requires a path")?;
                thresholds = Some(PathBuf::from(path));
            }
            _ if input.is_none() => input = Some(PathBuf::from(arg)),
            _ => bail!("Unexpected argument: {}", arg),
        }
    }

    Ok(Args {
        input: input.context(
            "Usage: analyze_sample <input.json> [--format json|compact|markdown] [--thresholds t.json]",
        )?,
        format,
        thresholds,
    })
}

/// Single object, request body, or array of objects
fn read_inputs(path: &Path) -> Result<Vec<RawSoilInput>> {
    let contents = fs::read_to_string(path)
        .with_context(|| format!("Failed to read input file: {:?}", path))?;
    let value: serde_json::Value = serde_json::from_str(&contents)
        .with_context(|| format!("Failed to parse JSON in {:?}", path))?;

    match value {
        serde_json::Value::Array(items) => items
            .into_iter()
            .enumerate()
            .map(|(i, item)| match item {
                serde_json::Value::Object(map) => Ok(map),
                _ => bail!("Sample {} is not a JSON object", i),
            })
            .collect(),
        serde_json::Value::Object(mut map) => match map.remove("soil_data") {
            Some(serde_json::Value::Object(inner)) => Ok(vec![inner]),
            Some(_) => bail!("soil_data must be a JSON object"),
            None => Ok(vec![map]),
        },
        _ => bail!("Input must be a JSON object or array of objects"),
    }
}

/// Validate then analyze, keeping the soft warnings for the caller
fn analyze_with_warnings(
    analyzer: &SoilAnalyzer,
    raw: &RawSoilInput,
) -> Result<(Vec<ValidationWarning>, AnalysisResult), InputError> {
    let validated = validate(raw, analyzer.thresholds())?;
    let result = analyzer.analyze_validated(&validated);
    Ok((validated.warnings().to_vec(), result))
}

fn main() -> Result<()> {
    let args = parse_args()?;

    let thresholds = match &args.thresholds {
        Some(path) => Thresholds::load(path)?,
        None => Thresholds::default(),
    };
    let analyzer = SoilAnalyzer::new(thresholds);

    let inputs = read_inputs(&args.input)?;
    let outcomes: Vec<_> = inputs
        .par_iter()
        .map(|raw| analyze_with_warnings(&analyzer, raw))
        .collect();

    let mut rejected = 0;
    for (i, outcome) in outcomes.iter().enumerate() {
        match outcome {
            Ok((warnings, result)) => {
                for warning in warnings {
                    eprintln!("Sample {}: warning: {}", i, warning);
                }
                let rendered = match args.format {
                    OutputFormat::Json => JsonFormatter::format(result)?,
                    OutputFormat::Compact => JsonFormatter::format_compact(result)?,
                    OutputFormat::Markdown => MarkdownFormatter::format(result),
                };
                println!("{}", rendered);
            }
            Err(e) => {
                rejected += 1;
                eprintln!("Sample {}: {}", i, e);
            }
        }
    }

    if rejected > 0 {
        bail!("{} of {} samples rejected", rejected, outcomes.len());
    }

    Ok(())
}
