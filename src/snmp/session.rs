use std::future::Future;

use snmp2::{AsyncSession, Value};
use tokio::time::{Duration, timeout};

use super::auth::{AuthConfig, SnmpVersion, Target};
use super::error::SnmpError;
use super::oid::Oid;

/// Значение одного varbind: строка для показа или явный маркер отсутствия
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScalarResult {
    Value(String),
    NoSuchInstance,
}

/// Разобранный ответ агента, уже не привязанный к буферу сессии
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Response {
    pub error_status: u32,
    pub error_index: u32,
    pub varbinds: Vec<(Oid, ScalarResult)>,
}

/// Один сетевой обмен запрос/ответ с агентом.
///
/// Каждый вызов самодостаточен: реализация не хранит состояния между вызовами.
pub trait Exchange: Send + Sync {
    fn version(&self) -> SnmpVersion;

    fn get(&self, oid: &Oid) -> impl Future<Output = Result<Response, SnmpError>> + Send;

    fn get_bulk(
        &self,
        oid: &Oid,
        max_repetitions: u32,
    ) -> impl Future<Output = Result<Response, SnmpError>> + Send;
}

/// Обмен по UDP через `snmp2`: новая сессия на каждый запрос
pub struct UdpExchange {
    target: Target,
    auth: AuthConfig,
    timeout: Duration,
}

impl UdpExchange {
    pub fn new(target: Target, auth: AuthConfig, timeout: Duration) -> Self {
        Self {
            target,
            auth,
            timeout,
        }
    }

    /// Открывает сессию; для v3 сразу выполняет discovery engine ID
    async fn open(&self) -> Result<AsyncSession, SnmpError> {
        let address = self.target.address();
        let mut session = match (&self.auth, self.target.version) {
            (AuthConfig::Community { community, .. }, SnmpVersion::V1) => {
                AsyncSession::new_v1(address.as_str(), community.as_bytes(), 0)
                    .await
            }
            (AuthConfig::Community { community, .. }, _) => {
                AsyncSession::new_v2c(address.as_str(), community.as_bytes(), 0)
                    .await
            }
            (AuthConfig::Usm(usm), _) => {
                AsyncSession::new_v3(address.as_str(), 0, usm.security())
                    .await
            }
        }
        .map_err(|e| SnmpError::Session(format!("cannot open session to {}: {}", address, e)))?;

        if let AuthConfig::Usm(usm) = &self.auth {
            tracing::debug!(agent = %address, user = %usm.user, level = %usm.level(), "SNMPv3 engine discovery");
            self.bounded("engine discovery", session.init())
                .await?
                .map_err(|e| SnmpError::Session(format!("SNMPv3 discovery failed: {}", e)))?;
        }

        Ok(session)
    }

    /// Применяет таймаут к одному обмену
    async fn bounded<T>(
        &self,
        what: &str,
        exchange: impl Future<Output = T>,
    ) -> Result<T, SnmpError> {
        timeout(self.timeout, exchange).await.map_err(|_| {
            SnmpError::Session(format!(
                "{} to {} timed out after {:?}",
                what,
                self.target.address(),
                self.timeout
            ))
        })
    }
}

impl Exchange for UdpExchange {
    fn version(&self) -> SnmpVersion {
        self.target.version
    }

    async fn get(&self, oid: &Oid) -> Result<Response, SnmpError> {
        let wire_oid = oid.to_wire()?;
        let mut session = self.open().await?;

        tracing::debug!(agent = %self.target.address(), oid = %oid, "SNMP GET");
        let pdu = self
            .bounded("GET", session.get(&wire_oid))
            .await?
            .map_err(|e| SnmpError::Session(format!("GET {} failed: {}", oid, e)))?;

        convert_pdu(pdu.error_status, pdu.error_index, pdu.varbinds)
    }

    async fn get_bulk(&self, oid: &Oid, max_repetitions: u32) -> Result<Response, SnmpError> {
        let wire_oid = oid.to_wire()?;
        let mut session = self.open().await?;

        tracing::debug!(agent = %self.target.address(), oid = %oid, max_repetitions, "SNMP GETBULK");
        let pdu = self
            .bounded("GETBULK", session.getbulk(&[&wire_oid], 0, max_repetitions))
            .await?
            .map_err(|e| SnmpError::Session(format!("GETBULK {} failed: {}", oid, e)))?;

        convert_pdu(pdu.error_status, pdu.error_index, pdu.varbinds)
    }
}

/// Копирует varbind'ы из буфера сессии в собственные типы
fn convert_pdu<'a>(
    error_status: u32,
    error_index: u32,
    varbinds: impl Iterator<Item = (snmp2::Oid<'a>, Value<'a>)>,
) -> Result<Response, SnmpError> {
    let varbinds = varbinds
        .map(|(name, value)| {
            let name = Oid::parse(&name.to_string())?.with_leading_dot();
            Ok((name, render_value(&value)))
        })
        .collect::<Result<Vec<_>, SnmpError>>()?;

    Ok(Response {
        error_status,
        error_index,
        varbinds,
    })
}

/// Строковое представление значения, как его показывает агент
fn render_value(value: &Value<'_>) -> ScalarResult {
    let rendered = match value {
        Value::Null | Value::NoSuchObject | Value::NoSuchInstance | Value::EndOfMibView => {
            return ScalarResult::NoSuchInstance;
        }
        Value::OctetString(bytes) => String::from_utf8_lossy(bytes).into_owned(),
        Value::Integer(n) => n.to_string(),
        Value::Counter32(n) | Value::Unsigned32(n) | Value::Timeticks(n) => n.to_string(),
        Value::Counter64(n) => n.to_string(),
        Value::Boolean(b) => b.to_string(),
        Value::IpAddress([a, b, c, d]) => format!("{}.{}.{}.{}", a, b, c, d),
        Value::ObjectIdentifier(oid) => oid.to_string(),
        other => format!("{:?}", other),
    };
    ScalarResult::Value(rendered)
}
