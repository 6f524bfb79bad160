use crate::report::AnalysisResult;

/// JSON formatter for analysis results
pub struct JsonFormatter;

impl JsonFormatter {
    /// Format result as pretty-printed JSON
    pub fn format(result: &AnalysisResult) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(result)
    }

    /// Format result as compact JSON (no whitespace)
    pub fn format_compact(result: &AnalysisResult) -> Result<String, serde_json::Error> {
        serde_json::to_string(result)
    }
}
