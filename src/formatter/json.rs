use serde::Serialize;

use crate::collector::{ProblemRecord, Severity, Verdict};

use super::plugin::LABEL;

/// JSON структура для скриптов и внешних систем
#[derive(Debug, Clone, Serialize)]
pub struct VerdictJson<'a> {
    pub label: &'static str,
    pub severity: Severity,
    pub exit_code: u8,
    pub message: &'a str,
    pub timestamp: String,
    /// Имена подсистем, если до них дошло
    pub summary: Option<&'a str>,
    pub problems: &'a [ProblemRecord],
}

/// JSON форматтер для вердикта
pub struct JsonFormatter;

impl JsonFormatter {
    pub fn format_verdict(verdict: &Verdict) -> VerdictJson<'_> {
        let (summary, problems) = match &verdict.evaluation {
            Some(evaluation) => (
                Some(evaluation.summary.as_str()),
                evaluation.problems.as_slice(),
            ),
            None => (None, &[][..]),
        };

        VerdictJson {
            label: LABEL,
            severity: verdict.severity,
            exit_code: verdict.severity.exit_code(),
            message: &verdict.summary,
            timestamp: chrono::Utc::now().to_rfc3339(),
            summary,
            problems,
        }
    }

    /// Компактный JSON в одну строку
    pub fn to_json_compact(verdict: &Verdict) -> anyhow::Result<String> {
        serde_json::to_string(&Self::format_verdict(verdict))
            .map_err(|e| anyhow::anyhow!("JSON serialization failed: {}", e))
    }
}
