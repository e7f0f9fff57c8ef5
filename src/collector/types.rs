use serde::Serialize;

/// Код статуса "ok" в MIB ServerView
pub const STATUS_OK: i64 = 1;

/// Текст, которым агент помечает отсутствие last-error
pub const LAST_ERROR_NOT_SUPPORTED: &str = "<<not supported>>";

/// Метка статуса подсистемы. Неизвестные коды не ошибка, а "outofrange".
pub fn status_label(code: i64) -> &'static str {
    match code {
        1 => "ok",
        2 => "degraded",
        3 => "error",
        4 => "failed",
        5 => "unknown-init",
        _ => "outofrange",
    }
}

/// Суффикс для вывода: пустой для `<<not supported>>`, иначе `,<текст>`
pub fn last_error_suffix(last_error: &str) -> String {
    if last_error == LAST_ERROR_NOT_SUPPORTED {
        String::new()
    } else {
        format!(",{}", last_error)
    }
}

/// Подсистема, прочитанная по индексу строки (с 1)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Subsystem {
    pub index: u32,
    pub name: String,
    pub status_code: i64,
    pub last_error: String,
}

/// Подсистема в ненормальном состоянии, готовая к выводу
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProblemRecord {
    pub name: String,
    #[serde(rename = "status")]
    pub status_label: String,
    #[serde(rename = "last_error")]
    pub error_suffix: String,
}

impl From<&Subsystem> for ProblemRecord {
    fn from(subsystem: &Subsystem) -> Self {
        Self {
            name: subsystem.name.clone(),
            status_label: status_label(subsystem.status_code).to_string(),
            error_suffix: last_error_suffix(&subsystem.last_error),
        }
    }
}

impl std::fmt::Display for ProblemRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}: {}{}",
            self.name, self.status_label, self.error_suffix
        )
    }
}

/// Результат опроса: сводка имен подсистем и список проблем по возрастанию индекса
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Evaluation {
    pub summary: String,
    pub problems: Vec<ProblemRecord>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Severity {
    Ok,
    Warning,
    Critical,
    Unknown,
}

impl Severity {
    pub fn exit_code(self) -> u8 {
        match self {
            Severity::Ok => 0,
            Severity::Warning => 1,
            Severity::Critical => 2,
            Severity::Unknown => 3,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Severity::Ok => "OK",
            Severity::Warning => "WARNING",
            Severity::Critical => "CRITICAL",
            Severity::Unknown => "UNKNOWN",
        }
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Итог проверки для планировщика мониторинга
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Verdict {
    pub severity: Severity,
    pub summary: String,
    pub evaluation: Option<Evaluation>,
}

impl Verdict {
    pub fn unknown(summary: impl Into<String>) -> Self {
        Self {
            severity: Severity::Unknown,
            summary: summary.into(),
            evaluation: None,
        }
    }
}
