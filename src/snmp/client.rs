use std::collections::BTreeMap;

use tokio::time::Duration;

use super::auth::{AuthConfig, Target};
use super::error::{ErrorStatus, SessionFailure, SnmpError};
use super::oid::Oid;
use super::session::{Exchange, Response, ScalarResult, UdpExchange};
use super::table::Table;

/// Сколько строк запрашивать одним GETBULK
pub const DEFAULT_MAX_REPETITIONS: u32 = 25;

/// Клиент запросов к одному агенту.
///
/// Хранит только неизменяемую конфигурацию; никаких кэшей между вызовами.
pub struct SnmpClient<E = UdpExchange> {
    exchange: E,
    max_repetitions: u32,
}

impl SnmpClient<UdpExchange> {
    /// Клиент поверх UDP; `timeout` применяется к каждому обмену отдельно
    pub fn connect(target: Target, auth: AuthConfig, timeout: Duration) -> Self {
        Self::with_exchange(UdpExchange::new(target, auth, timeout))
    }
}

impl<E: Exchange> SnmpClient<E> {
    pub fn with_exchange(exchange: E) -> Self {
        Self {
            exchange,
            max_repetitions: DEFAULT_MAX_REPETITIONS,
        }
    }

    pub fn max_repetitions(mut self, max_repetitions: u32) -> Self {
        self.max_repetitions = max_repetitions.max(1);
        self
    }

    /// GET одного OID, значение в виде строки
    pub async fn get_scalar(&self, oid: &str) -> Result<String, SnmpError> {
        let oid = Oid::parse(oid)?;
        self.get_oid(&oid).await
    }

    /// То же, что `get_scalar`, для уже разобранного OID
    pub async fn get_oid(&self, oid: &Oid) -> Result<String, SnmpError> {
        let response = self.exchange.get(oid).await?;
        check_error_status(oid, &response)?;

        match response.varbinds.into_iter().next() {
            Some((_, ScalarResult::Value(value))) => Ok(value),
            Some((_, ScalarResult::NoSuchInstance)) => {
                Err(SnmpError::NoSuchInstance(oid.to_string()))
            }
            None => Err(SnmpError::Session(format!("empty response for {}", oid))),
        }
    }

    /// Bulk walk по `oid` (OID записи таблицы) и сборка `Table`.
    ///
    /// Записи за границей префикса отбрасываются: агент при GETBULK
    /// может вернуть несколько строк следующей таблицы.
    pub async fn get_table(&self, oid: &str) -> Result<Table, SnmpError> {
        if !self.exchange.version().supports_bulk() {
            return Err(SnmpError::UnsupportedOperation(
                "table walk requires SNMP v2c or v3".to_string(),
            ));
        }

        let prefix = Oid::parse(oid)?;
        let mut table = Table::new();
        let mut cursor = prefix.clone();

        loop {
            let response = self
                .exchange
                .get_bulk(&cursor, self.max_repetitions)
                .await?;
            check_error_status(&cursor, &response)?;

            if response.varbinds.is_empty() {
                break;
            }

            let page_start = cursor.clone();
            let mut finished = false;
            for (name, reading) in response.varbinds {
                let value = match reading {
                    ScalarResult::Value(value) => value,
                    // endOfMibView
                    ScalarResult::NoSuchInstance => {
                        finished = true;
                        break;
                    }
                };

                // сама запись таблицы не ячейка: пропускаем, обход продолжается
                if name == prefix {
                    tracing::debug!(oid = %name, "table entry itself skipped");
                    continue;
                }

                if !prefix.is_strict_prefix_of(&name) {
                    tracing::debug!(oid = %name, prefix = %prefix, "walk left the table");
                    finished = true;
                    break;
                }

                if name <= cursor {
                    return Err(SnmpError::Session(format!(
                        "agent returned non-increasing OID {} after {}",
                        name, cursor
                    )));
                }

                if let Some((column, row)) = name.table_cell() {
                    if table.insert(column, row, value).is_some() {
                        tracing::warn!(oid = %name, "duplicate table cell overwritten");
                    }
                }
                cursor = name;
            }

            if finished || cursor == page_start {
                break;
            }
        }

        tracing::debug!(prefix = %prefix, cells = table.len(), "table walk complete");
        Ok(table)
    }

    /// Читает набор именованных OID.
    ///
    /// Отсутствующие экземпляры пропускаются, любая другая ошибка
    /// прерывает чтение целиком.
    pub async fn get_multiple(
        &self,
        names: &BTreeMap<String, String>,
    ) -> Result<BTreeMap<String, String>, SessionFailure> {
        let mut results = BTreeMap::new();

        for (name, oid) in names {
            match self.get_scalar(oid).await {
                Ok(value) => {
                    results.insert(name.clone(), value);
                }
                Err(SnmpError::NoSuchInstance(_)) => {
                    tracing::debug!(name = %name, oid = %oid, "no instance, skipped");
                }
                Err(source) => {
                    return Err(SessionFailure {
                        name: name.clone(),
                        source,
                    });
                }
            }
        }

        Ok(results)
    }
}

fn check_error_status(oid: &Oid, response: &Response) -> Result<(), SnmpError> {
    if response.error_status == 0 {
        return Ok(());
    }

    let failed = response
        .error_index
        .checked_sub(1)
        .and_then(|index| response.varbinds.get(index as usize))
        .map(|(name, _)| name.to_string())
        .unwrap_or_else(|| oid.to_string());

    Err(SnmpError::RemoteValue {
        oid: failed,
        status: ErrorStatus::from_code(response.error_status),
        index: response.error_index,
    })
}
