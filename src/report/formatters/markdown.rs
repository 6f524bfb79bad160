use crate::report::AnalysisResult;
use crate::sample::SoilField;
use crate::suitability::SuitabilityLevel;

/// Markdown formatter for analysis results
pub struct MarkdownFormatter;

impl MarkdownFormatter {
    /// Format result as a markdown report
    pub fn format(result: &AnalysisResult) -> String {
        let mut md = String::with_capacity(1024);

        md.push_str(&format!("# {}\n\n", result.classification.label()));
        md.push_str(&format!(
            "**Suitability:** {} {}\n\n",
            Self::level_icon(result.suitability),
            result.suitability
        ));
        md.push_str(&format!("_{}_\n\n", result.suitability.description()));
        md.push_str(&format!("{}\n\n", result.suitability_text));

        md.push_str("## Soil Behavior\n\n");
        for statement in &result.behavior {
            md.push_str(&format!("- {}\n", statement.text));
        }
        md.push('\n');

        if !result.risks.is_empty() {
            md.push_str("## Risks\n\n");
            for risk in &result.risks {
                let icon = if risk.category.is_informational() { "ℹ️" } else { "⚠️" };
                md.push_str(&format!("- {} {}\n", icon, risk.description));
            }
            md.push('\n');
        }

        md.push_str("## Recommendations\n\n");
        for (i, rec) in result.recommendations.iter().enumerate() {
            md.push_str(&format!("{}. {}\n", i + 1, rec.text));
        }
        md.push('\n');

        Self::format_parameters(&mut md, result);
        md
    }

    fn level_icon(level: SuitabilityLevel) -> &'static str {
        match level {
            SuitabilityLevel::Suitable => "✅",
            SuitabilityLevel::ModeratelySuitable => "⚠️",
            SuitabilityLevel::Unsuitable => "❌",
        }
    }

    fn format_parameters(md: &mut String, result: &AnalysisResult) {
        md.push_str("## Test Parameters\n\n");
        md.push_str("| Parameter | Value |\n");
        md.push_str("|-----------|-------|\n");
        for field in SoilField::ALL {
            let value = match result.parameters.get(field) {
                Some(v) => format!("{:.1} {}", v, field.unit()).trim_end().to_string(),
                None => "n/a".to_string(),
            };
            md.push_str(&format!("| {} ({}) | {} |\n", field.label(), field.key(), value));
        }
    }
}
