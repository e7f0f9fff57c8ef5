use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::snmp::DEFAULT_MAX_REPETITIONS;
use crate::snmp::auth::{DEFAULT_PORT, DEFAULT_SECURITY_NAME};

/// Базовые настройки проверки (YAML файл необязателен)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Настройки подключения
    pub connection: ConnectionSettings,
    /// Настройки аутентификации
    pub auth: AuthSettings,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConnectionSettings {
    /// Таймаут одного SNMP обмена (секунды)
    pub timeout: u64,
    pub port: i64,
    /// Строк на один GETBULK
    pub max_repetitions: u32,
    /// Сколько подсистем опрашивать одновременно
    pub concurrency: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthSettings {
    /// Security name для SNMPv1/v2c
    pub security_name: String,
    /// Протокол аутентификации SNMPv3: md5 или sha
    pub auth_protocol: String,
}

impl Default for ConnectionSettings {
    fn default() -> Self {
        Self {
            timeout: 25,
            port: DEFAULT_PORT,
            max_repetitions: DEFAULT_MAX_REPETITIONS,
            concurrency: 1,
        }
    }
}

impl Default for AuthSettings {
    fn default() -> Self {
        Self {
            security_name: DEFAULT_SECURITY_NAME.to_string(),
            auth_protocol: "md5".to_string(),
        }
    }
}

impl Settings {
    /// Загружает настройки из YAML файла
    pub fn load(path: &str) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .context(format!("cannot read settings file: {}", path))?;

        Self::from_yaml(&content).context(format!("cannot parse settings file: {}", path))
    }

    pub fn from_yaml(content: &str) -> Result<Self> {
        let settings: Settings = serde_yml::from_str(content)?;
        if settings.connection.timeout == 0 {
            anyhow::bail!("connection.timeout must be at least 1 second");
        }
        Ok(settings)
    }
}
