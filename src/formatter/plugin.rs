use crate::collector::Verdict;

/// Метка плагина в начале строки
pub const LABEL: &str = "SERVERVIEW";

/// Строка в формате Nagios: `SERVERVIEW <SEVERITY> - <текст>`
pub struct PluginFormatter;

impl PluginFormatter {
    pub fn format_line(verdict: &Verdict) -> String {
        format!("{} {} - {}", LABEL, verdict.severity, verdict.summary)
    }
}
