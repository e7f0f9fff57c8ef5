use std::collections::BTreeMap;

use crate::snmp::{Exchange, SessionFailure, SnmpClient};

/// Стандартные OID из system group (MIB-II)
const SYS_DESCR: &str = ".1.3.6.1.2.1.1.1.0";
const SYS_OBJECT_ID: &str = ".1.3.6.1.2.1.1.2.0";
const SYS_NAME: &str = ".1.3.6.1.2.1.1.5.0";

/// Информация об агенте для подробного лога
pub struct DeviceInfo;

impl DeviceInfo {
    /// Читает sysDescr, sysObjectID и sysName; отсутствующие значения пропускаются
    pub async fn identify<E: Exchange>(
        client: &SnmpClient<E>,
    ) -> Result<BTreeMap<String, String>, SessionFailure> {
        let names = BTreeMap::from([
            ("sysDescr".to_string(), SYS_DESCR.to_string()),
            ("sysObjectID".to_string(), SYS_OBJECT_ID.to_string()),
            ("sysName".to_string(), SYS_NAME.to_string()),
        ]);
        client.get_multiple(&names).await
    }

    /// Пишет идентификацию агента в лог. На вердикт не влияет.
    pub async fn log_identity<E: Exchange>(client: &SnmpClient<E>) {
        match Self::identify(client).await {
            Ok(info) => {
                for (name, value) in &info {
                    tracing::info!(name = %name, value = %value, "agent identity");
                }
            }
            Err(e) => tracing::info!(error = %e, "agent identity not available"),
        }
    }
}
