pub mod json;
pub mod plugin;

pub use json::JsonFormatter;
pub use plugin::{LABEL, PluginFormatter};

use crate::collector::Verdict;
use crate::config::OutputFormat;

/// Превращает вердикт в единственную строку stdout
pub fn render(verdict: &Verdict, format: OutputFormat) -> String {
    match format {
        OutputFormat::Plugin => PluginFormatter::format_line(verdict),
        OutputFormat::Json => match JsonFormatter::to_json_compact(verdict) {
            Ok(json) => json,
            // не должно случаться, но строку вывести обязаны
            Err(e) => PluginFormatter::format_line(&Verdict::unknown(e.to_string())),
        },
    }
}
