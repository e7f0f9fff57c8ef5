use futures::stream::{self, StreamExt, TryStreamExt};
use thiserror::Error;

use crate::snmp::{Exchange, SnmpClient, SnmpError};

pub mod device_info;
pub mod ignore;
pub mod types;

pub use device_info::DeviceInfo;
pub use ignore::IgnoreList;
pub use types::{Evaluation, ProblemRecord, Severity, Subsystem, Verdict};

use types::{STATUS_OK, status_label};

/// OID из MIB ServerView (ветка `.1.3.6.1.4.1.231.2.10.2.11`)
pub mod oids {
    pub const SUBSYSTEM_NAMES: &str = ".1.3.6.1.4.1.231.2.10.2.11.2.3.0";
    pub const GLOBAL_STATUS: &str = ".1.3.6.1.4.1.231.2.10.2.11.2.1.0";
    pub const SUBSYSTEM_COUNT: &str = ".1.3.6.1.4.1.231.2.10.2.11.3.2.0";
    /// Запись таблицы подсистем; колонки ниже, индекс строки последним
    pub const SUBSYSTEM_ENTRY: &str = ".1.3.6.1.4.1.231.2.10.2.11.3.1.1";

    pub const COLUMN_NAME: u32 = 2;
    pub const COLUMN_STATUS: u32 = 3;
    pub const COLUMN_LAST_ERROR: u32 = 4;
}

/// Сообщение для CRITICAL, вызванного сетью, а не железом
pub const SESSION_PROBLEM: &str = "network or snmp related problem - NOT a hardware problem";

#[derive(Debug, Error)]
pub enum CheckError {
    #[error(transparent)]
    Snmp(#[from] SnmpError),

    /// Агент вернул не число там, где MIB обещает INTEGER
    #[error("unexpected value '{value}' for {oid}, expected an integer")]
    MalformedValue { oid: String, value: String },
}

/// Опрос подсистем ServerView и сведение их статусов в список проблем
pub struct SubsystemCollector {
    ignore: IgnoreList,
    concurrency: usize,
}

impl SubsystemCollector {
    pub fn new(ignore: IgnoreList) -> Self {
        Self {
            ignore,
            concurrency: 1,
        }
    }

    /// Сколько подсистем опрашивать одновременно (1 = строго по очереди)
    pub fn concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    /// Собирает сводку имен и список проблем.
    ///
    /// Если глобальный статус "ok", подсистемы не опрашиваются вовсе:
    /// агент бывает непоследователен (глобально ok, deployment unknown),
    /// и это осознанно допускается.
    pub async fn evaluate<E: Exchange>(
        &self,
        client: &SnmpClient<E>,
    ) -> Result<Evaluation, CheckError> {
        let names_blob = client.get_scalar(oids::SUBSYSTEM_NAMES).await?;
        if !self.ignore.is_empty() {
            tracing::debug!(ignored = ?self.ignore.names(), "ignore list");
        }
        let summary = self.ignore.summarize(&names_blob);

        let global_status = read_integer(client, oids::GLOBAL_STATUS).await?;
        if global_status == STATUS_OK {
            tracing::debug!("global status ok, subsystem checks skipped");
            return Ok(Evaluation {
                summary,
                problems: Vec::new(),
            });
        }
        tracing::info!(global_status, "global status not ok, inspecting subsystems");

        let count = read_integer(client, oids::SUBSYSTEM_COUNT).await?;
        let count = u32::try_from(count).unwrap_or(0);

        // buffered() отдает результаты в порядке индексов, независимо от порядка завершения
        let records: Vec<Option<ProblemRecord>> = stream::iter(1..=count)
            .map(|index| self.inspect(client, index))
            .buffered(self.concurrency)
            .try_collect()
            .await?;

        Ok(Evaluation {
            summary,
            problems: records.into_iter().flatten().collect(),
        })
    }

    /// Проверяет одну подсистему; `None`, если она в порядке или игнорируется
    async fn inspect<E: Exchange>(
        &self,
        client: &SnmpClient<E>,
        index: u32,
    ) -> Result<Option<ProblemRecord>, CheckError> {
        let status_code = read_integer(client, &column_oid(oids::COLUMN_STATUS, index)).await?;
        if status_code == STATUS_OK {
            return Ok(None);
        }

        let name = client
            .get_scalar(&column_oid(oids::COLUMN_NAME, index))
            .await?;
        if self.ignore.contains(&name) {
            tracing::info!(index, name = %name, status = status_label(status_code), "ignored subsystem");
            return Ok(None);
        }

        let last_error = client
            .get_scalar(&column_oid(oids::COLUMN_LAST_ERROR, index))
            .await?;

        let subsystem = Subsystem {
            index,
            name,
            status_code,
            last_error,
        };
        tracing::info!(index, name = %subsystem.name, status = status_label(status_code), "subsystem problem");

        Ok(Some(ProblemRecord::from(&subsystem)))
    }
}

/// Последовательная проверка с заданным списком игнорирования
pub async fn evaluate<E: Exchange>(
    client: &SnmpClient<E>,
    ignore: &IgnoreList,
) -> Result<Evaluation, CheckError> {
    SubsystemCollector::new(ignore.clone())
        .evaluate(client)
        .await
}

/// Сводит результат проверки к вердикту
pub fn verdict(outcome: Result<Evaluation, CheckError>) -> Verdict {
    match outcome {
        Ok(evaluation) if evaluation.problems.is_empty() => Verdict {
            severity: Severity::Ok,
            summary: format!("All subsystems are good: {}", evaluation.summary),
            evaluation: Some(evaluation),
        },
        Ok(evaluation) => {
            let joined = evaluation
                .problems
                .iter()
                .map(ProblemRecord::to_string)
                .collect::<Vec<_>>()
                .join(" - ");
            Verdict {
                severity: Severity::Critical,
                summary: joined.trim_matches(['-', ' ']).to_string(),
                evaluation: Some(evaluation),
            }
        }
        Err(CheckError::Snmp(e)) if e.is_session_level() => {
            tracing::warn!(error = %e, "SNMP session failure");
            Verdict {
                severity: Severity::Critical,
                summary: SESSION_PROBLEM.to_string(),
                evaluation: None,
            }
        }
        Err(e) => Verdict::unknown(e.to_string()),
    }
}

/// Подсистемная таблица целиком, только для подробного лога (v2c/v3)
pub async fn log_subsystem_table<E: Exchange>(client: &SnmpClient<E>) {
    match client.get_table(oids::SUBSYSTEM_ENTRY).await {
        Ok(table) => {
            for row in table.row_indexes() {
                tracing::debug!(
                    row,
                    name = table.get(oids::COLUMN_NAME, row).unwrap_or("?"),
                    status = table.get(oids::COLUMN_STATUS, row).unwrap_or("?"),
                    last_error = table.get(oids::COLUMN_LAST_ERROR, row).unwrap_or(""),
                    "subsystem table row"
                );
            }
        }
        Err(e) => tracing::debug!(error = %e, "subsystem table not available"),
    }
}

fn column_oid(column: u32, index: u32) -> String {
    format!("{}.{}.{}", oids::SUBSYSTEM_ENTRY, column, index)
}

async fn read_integer<E: Exchange>(client: &SnmpClient<E>, oid: &str) -> Result<i64, CheckError> {
    let value = client.get_scalar(oid).await?;
    match value.trim().parse::<i64>() {
        Ok(number) => Ok(number),
        Err(_) => Err(CheckError::MalformedValue {
            oid: oid.to_string(),
            value,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::snmp::SnmpVersion;
    use crate::snmp::mock::{MockExchange, MockReply};
    use tokio::time::Duration;

    fn status(index: u32) -> String {
        column_oid(oids::COLUMN_STATUS, index)
    }

    fn name(index: u32) -> String {
        column_oid(oids::COLUMN_NAME, index)
    }

    fn last_error(index: u32) -> String {
        column_oid(oids::COLUMN_LAST_ERROR, index)
    }

    fn degraded_agent(count: u32) -> MockExchange {
        MockExchange::new(SnmpVersion::V2c)
            .value(oids::SUBSYSTEM_NAMES, "Environment PowerSupply MassStorage")
            .value(oids::GLOBAL_STATUS, "3")
            .value(oids::SUBSYSTEM_COUNT, count.to_string())
    }

    #[tokio::test]
    async fn healthy_global_status_skips_subsystems() {
        let mock = MockExchange::new(SnmpVersion::V1)
            .value(oids::SUBSYSTEM_NAMES, "psu fan temp")
            .value(oids::GLOBAL_STATUS, "1")
            .value(oids::SUBSYSTEM_COUNT, "3");
        let client = SnmpClient::with_exchange(mock.clone());

        let evaluation = evaluate(&client, &IgnoreList::default()).await.unwrap();

        assert_eq!(evaluation.summary, "fan,psu,temp");
        assert!(evaluation.problems.is_empty());
        assert_eq!(
            mock.gets(),
            vec![oids::SUBSYSTEM_NAMES, oids::GLOBAL_STATUS]
        );

        let verdict = verdict(Ok(evaluation));
        assert_eq!(verdict.severity, Severity::Ok);
        assert_eq!(verdict.summary, "All subsystems are good: fan,psu,temp");
    }

    #[tokio::test]
    async fn ignored_subsystem_is_never_reported() {
        let mock = degraded_agent(2)
            .value(&status(1), "5")
            .value(&name(1), "deployment")
            .value(&last_error(1), "should not be read")
            .value(&status(2), "1")
            .value(&name(2), "fan1");
        let client = SnmpClient::with_exchange(mock.clone());

        let evaluation = evaluate(&client, &IgnoreList::parse("deployment"))
            .await
            .unwrap();

        assert!(evaluation.problems.is_empty());
        // статус читается, last-error у игнорируемой подсистемы - нет
        assert_eq!(
            mock.gets(),
            vec![
                oids::SUBSYSTEM_NAMES.to_string(),
                oids::GLOBAL_STATUS.to_string(),
                oids::SUBSYSTEM_COUNT.to_string(),
                status(1),
                name(1),
                status(2),
            ]
        );
        assert_eq!(verdict(Ok(evaluation)).severity, Severity::Ok);
    }

    #[tokio::test]
    async fn problems_are_labelled_and_ordered() {
        let mock = degraded_agent(3)
            .value(&status(1), "4")
            .value(&name(1), "PowerSupply")
            .value(&last_error(1), "PSU1 overtemp")
            .value(&status(2), "1")
            .value(&status(3), "99")
            .value(&name(3), "MassStorage")
            .value(&last_error(3), "<<not supported>>");
        let client = SnmpClient::with_exchange(mock);

        let evaluation = evaluate(&client, &IgnoreList::default()).await.unwrap();

        assert_eq!(
            evaluation.problems,
            vec![
                ProblemRecord {
                    name: "PowerSupply".into(),
                    status_label: "failed".into(),
                    error_suffix: ",PSU1 overtemp".into(),
                },
                ProblemRecord {
                    name: "MassStorage".into(),
                    status_label: "outofrange".into(),
                    error_suffix: "".into(),
                },
            ]
        );

        let verdict = verdict(Ok(evaluation));
        assert_eq!(verdict.severity, Severity::Critical);
        assert_eq!(
            verdict.summary,
            "PowerSupply: failed,PSU1 overtemp - MassStorage: outofrange"
        );
    }

    #[tokio::test(start_paused = true)]
    async fn concurrent_fan_out_keeps_index_order() {
        let mut mock = degraded_agent(6);
        for index in 1..=6 {
            // поздние подсистемы отвечают первыми
            let lag = Duration::from_millis(u64::from(7 - index) * 10);
            mock = mock
                .value(&status(index), "2")
                .delay(&status(index), lag)
                .value(&name(index), format!("sub{}", index))
                .value(&last_error(index), "<<not supported>>");
        }
        let client = SnmpClient::with_exchange(mock.clone());

        let evaluation = SubsystemCollector::new(IgnoreList::default())
            .concurrency(4)
            .evaluate(&client)
            .await
            .unwrap();

        let names: Vec<&str> = evaluation
            .problems
            .iter()
            .map(|p| p.name.as_str())
            .collect();
        assert_eq!(names, ["sub1", "sub2", "sub3", "sub4", "sub5", "sub6"]);

        // ответы действительно пришли не по порядку
        let name_column = format!("{}.{}.", oids::SUBSYSTEM_ENTRY, oids::COLUMN_NAME);
        let first_name_read = mock
            .gets()
            .into_iter()
            .find(|oid| oid.starts_with(&name_column));
        assert_eq!(first_name_read, Some(name(4)));
    }

    #[tokio::test]
    async fn session_failure_propagates_without_partial_results() {
        let mock = degraded_agent(2)
            .value(&status(1), "3")
            .value(&name(1), "Environment")
            .value(&last_error(1), "fan stopped")
            .reply(&status(2), MockReply::SessionError("timeout".into()));
        let client = SnmpClient::with_exchange(mock);

        let outcome = evaluate(&client, &IgnoreList::default()).await;
        assert!(matches!(
            outcome,
            Err(CheckError::Snmp(SnmpError::Session(_)))
        ));

        let verdict = verdict(outcome);
        assert_eq!(verdict.severity, Severity::Critical);
        assert_eq!(verdict.summary, SESSION_PROBLEM);
        assert!(verdict.evaluation.is_none());
    }

    #[tokio::test]
    async fn remote_value_error_is_not_swallowed() {
        let mock = MockExchange::new(SnmpVersion::V1)
            .reply(oids::SUBSYSTEM_NAMES, MockReply::ErrorStatus(2));
        let client = SnmpClient::with_exchange(mock);

        let verdict = verdict(evaluate(&client, &IgnoreList::default()).await);
        assert_eq!(verdict.severity, Severity::Critical);
        assert_eq!(verdict.summary, SESSION_PROBLEM);
    }

    #[tokio::test]
    async fn non_numeric_status_is_unknown() {
        let mock = MockExchange::new(SnmpVersion::V2c)
            .value(oids::SUBSYSTEM_NAMES, "fan")
            .value(oids::GLOBAL_STATUS, "ok");
        let client = SnmpClient::with_exchange(mock);

        let verdict = verdict(evaluate(&client, &IgnoreList::default()).await);
        assert_eq!(verdict.severity, Severity::Unknown);
        assert!(verdict.summary.contains(oids::GLOBAL_STATUS));
    }

    #[test]
    fn invalid_argument_maps_to_unknown() {
        let verdict = verdict(Err(CheckError::Snmp(SnmpError::InvalidArgument(
            "unknown protocol version".into(),
        ))));
        assert_eq!(verdict, Verdict::unknown("unknown protocol version"));
    }
}
