use thiserror::Error;

/// Ошибки доступа к SNMP агенту.
///
/// Закрытый набор: вызывающий код сам решает, какие варианты проглотить
/// (`NoSuchInstance` для необязательных OID), а какие пробросить наверх.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SnmpError {
    /// Некорректная конфигурация, обнаруженная до любого сетевого обмена
    #[error("{0}")]
    InvalidArgument(String),

    #[error("invalid OID '{input}': {reason}")]
    InvalidOid { input: String, reason: String },

    /// Сам обмен не удался: сеть, таймаут, отказ аутентификации
    #[error("SNMP session error: {0}")]
    Session(String),

    /// Агент вернул error-status для конкретного OID
    #[error("agent returned {status} (index {index}) for {oid}")]
    RemoteValue {
        oid: String,
        status: ErrorStatus,
        index: u32,
    },

    #[error("no such instance: {0}")]
    NoSuchInstance(String),

    #[error("unsupported operation: {0}")]
    UnsupportedOperation(String),
}

impl SnmpError {
    /// Ошибки, которые говорят о проблеме обмена с агентом, а не о конфигурации
    pub fn is_session_level(&self) -> bool {
        matches!(
            self,
            SnmpError::Session(_)
                | SnmpError::RemoteValue { .. }
                | SnmpError::NoSuchInstance(_)
                | SnmpError::UnsupportedOperation(_)
        )
    }
}

/// Сигнал `get_multiple`: сессия ненадежна, частичному результату верить нельзя
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("session failure while reading '{name}': {source}")]
pub struct SessionFailure {
    pub name: String,
    #[source]
    pub source: SnmpError,
}

/// error-status из PDU ответа (RFC 3416)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorStatus {
    TooBig,
    NoSuchName,
    BadValue,
    ReadOnly,
    GenErr,
    NoAccess,
    WrongType,
    WrongLength,
    WrongEncoding,
    WrongValue,
    NoCreation,
    InconsistentValue,
    ResourceUnavailable,
    CommitFailed,
    UndoFailed,
    AuthorizationError,
    NotWritable,
    InconsistentName,
    Unknown(u32),
}

impl ErrorStatus {
    pub fn from_code(code: u32) -> Self {
        match code {
            1 => ErrorStatus::TooBig,
            2 => ErrorStatus::NoSuchName,
            3 => ErrorStatus::BadValue,
            4 => ErrorStatus::ReadOnly,
            5 => ErrorStatus::GenErr,
            6 => ErrorStatus::NoAccess,
            7 => ErrorStatus::WrongType,
            8 => ErrorStatus::WrongLength,
            9 => ErrorStatus::WrongEncoding,
            10 => ErrorStatus::WrongValue,
            11 => ErrorStatus::NoCreation,
            12 => ErrorStatus::InconsistentValue,
            13 => ErrorStatus::ResourceUnavailable,
            14 => ErrorStatus::CommitFailed,
            15 => ErrorStatus::UndoFailed,
            16 => ErrorStatus::AuthorizationError,
            17 => ErrorStatus::NotWritable,
            18 => ErrorStatus::InconsistentName,
            other => ErrorStatus::Unknown(other),
        }
    }
}

impl std::fmt::Display for ErrorStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            ErrorStatus::TooBig => "tooBig",
            ErrorStatus::NoSuchName => "noSuchName",
            ErrorStatus::BadValue => "badValue",
            ErrorStatus::ReadOnly => "readOnly",
            ErrorStatus::GenErr => "genErr",
            ErrorStatus::NoAccess => "noAccess",
            ErrorStatus::WrongType => "wrongType",
            ErrorStatus::WrongLength => "wrongLength",
            ErrorStatus::WrongEncoding => "wrongEncoding",
            ErrorStatus::WrongValue => "wrongValue",
            ErrorStatus::NoCreation => "noCreation",
            ErrorStatus::InconsistentValue => "inconsistentValue",
            ErrorStatus::ResourceUnavailable => "resourceUnavailable",
            ErrorStatus::CommitFailed => "commitFailed",
            ErrorStatus::UndoFailed => "undoFailed",
            ErrorStatus::AuthorizationError => "authorizationError",
            ErrorStatus::NotWritable => "notWritable",
            ErrorStatus::InconsistentName => "inconsistentName",
            ErrorStatus::Unknown(code) => return write!(f, "error-status {}", code),
        };
        f.write_str(name)
    }
}
