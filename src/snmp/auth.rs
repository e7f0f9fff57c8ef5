use std::fmt;

use super::error::SnmpError;

/// Порт SNMP агента по умолчанию
pub const DEFAULT_PORT: i64 = 161;

/// Security name для community данных v1/v2c по умолчанию
pub const DEFAULT_SECURITY_NAME: &str = "test-agent";

/// Версия протокола SNMP
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SnmpVersion {
    V1,
    V2c,
    V3,
}

impl SnmpVersion {
    pub fn from_number(version: i64) -> Option<Self> {
        match version {
            1 => Some(SnmpVersion::V1),
            2 => Some(SnmpVersion::V2c),
            3 => Some(SnmpVersion::V3),
            _ => None,
        }
    }

    /// GETBULK есть только начиная с v2c
    pub fn supports_bulk(self) -> bool {
        !matches!(self, SnmpVersion::V1)
    }
}

impl fmt::Display for SnmpVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SnmpVersion::V1 => f.write_str("v1"),
            SnmpVersion::V2c => f.write_str("v2c"),
            SnmpVersion::V3 => f.write_str("v3"),
        }
    }
}

/// Адрес агента. Неизменяем после сборки.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Target {
    pub host: String,
    pub port: u16,
    pub version: SnmpVersion,
}

impl Target {
    /// `host:port`, IPv6 адрес берется в квадратные скобки
    pub fn address(&self) -> String {
        if self.host.contains(':') && !self.host.starts_with('[') {
            format!("[{}]:{}", self.host, self.port)
        } else {
            format!("{}:{}", self.host, self.port)
        }
    }
}

/// Учетные данные в том виде, в каком их ввел пользователь (еще не проверены)
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Credential {
    Community {
        security_name: String,
        community: String,
    },
    Usm {
        user: String,
        auth_key: Option<String>,
        auth_algorithm: String,
        priv_key: Option<String>,
    },
}

impl Credential {
    /// community для v1/v2c с security name по умолчанию
    pub fn community(community: impl Into<String>) -> Self {
        Credential::Community {
            security_name: DEFAULT_SECURITY_NAME.to_string(),
            community: community.into(),
        }
    }

    /// Разбирает `user` или `user:authkey` (формат опции -C для SNMPv3)
    pub fn from_user_key(value: &str, auth_algorithm: &str, priv_key: Option<String>) -> Self {
        let (user, auth_key) = match value.split_once(':') {
            Some((user, key)) => (user.to_string(), Some(key.to_string())),
            None => (value.to_string(), None),
        };
        Credential::Usm {
            user,
            auth_key,
            auth_algorithm: auth_algorithm.to_string(),
            priv_key,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthAlgorithm {
    Md5,
    Sha,
}

impl AuthAlgorithm {
    fn parse(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "md5" => Some(AuthAlgorithm::Md5),
            "sha" => Some(AuthAlgorithm::Sha),
            _ => None,
        }
    }

    pub fn to_wire(self) -> snmp2::v3::AuthProtocol {
        match self {
            AuthAlgorithm::Md5 => snmp2::v3::AuthProtocol::Md5,
            AuthAlgorithm::Sha => snmp2::v3::AuthProtocol::Sha1,
        }
    }
}

/// Стандартные уровни безопасности SNMPv3
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SecurityLevel {
    NoAuthNoPriv,
    AuthNoPriv,
    AuthPriv,
}

impl fmt::Display for SecurityLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SecurityLevel::NoAuthNoPriv => f.write_str("noAuthNoPriv"),
            SecurityLevel::AuthNoPriv => f.write_str("authNoPriv"),
            SecurityLevel::AuthPriv => f.write_str("authPriv"),
        }
    }
}

/// Проверенные параметры USM. Шифрование всегда DES.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UsmConfig {
    pub user: String,
    pub auth: Option<(AuthAlgorithm, String)>,
    pub priv_key: Option<String>,
}

impl UsmConfig {
    pub fn level(&self) -> SecurityLevel {
        match (&self.auth, &self.priv_key) {
            (Some(_), Some(_)) => SecurityLevel::AuthPriv,
            (Some(_), None) => SecurityLevel::AuthNoPriv,
            _ => SecurityLevel::NoAuthNoPriv,
        }
    }

    /// Параметры безопасности для сессии snmp2
    pub fn security(&self) -> snmp2::v3::Security {
        use snmp2::v3::{Auth, AuthProtocol, Cipher, Security};

        let (protocol, password) = match &self.auth {
            Some((algorithm, key)) => (algorithm.to_wire(), key.as_bytes()),
            None => (AuthProtocol::Md5, &b""[..]),
        };
        let auth = match (&self.auth, &self.priv_key) {
            (Some(_), Some(priv_key)) => Auth::AuthPriv {
                cipher: Cipher::Des,
                privacy_password: priv_key.as_bytes().to_vec(),
            },
            (Some(_), None) => Auth::AuthNoPriv,
            _ => Auth::NoAuthNoPriv,
        };

        Security::new(self.user.as_bytes(), password)
            .with_auth_protocol(protocol)
            .with_auth(auth)
    }
}

/// Готовая конфигурация аутентификации для всех последующих запросов
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthConfig {
    Community {
        security_name: String,
        community: String,
    },
    Usm(UsmConfig),
}

/// Проверяет ввод и собирает `(Target, AuthConfig)`. Сетевого обмена нет.
pub fn build(
    host: &str,
    port: i64,
    protocol_version: i64,
    credential: &Credential,
) -> Result<(Target, AuthConfig), SnmpError> {
    let version = SnmpVersion::from_number(protocol_version)
        .ok_or_else(|| SnmpError::InvalidArgument("unknown protocol version".to_string()))?;

    let port = u16::try_from(port)
        .map_err(|_| SnmpError::InvalidArgument("port must be >= 0 and < 2^16".to_string()))?;

    if host.trim().is_empty() {
        return Err(SnmpError::InvalidArgument(
            "host is a required argument".to_string(),
        ));
    }

    let auth = match version {
        SnmpVersion::V1 | SnmpVersion::V2c => match credential {
            Credential::Community {
                security_name,
                community,
            } if !community.is_empty() => AuthConfig::Community {
                security_name: if security_name.is_empty() {
                    DEFAULT_SECURITY_NAME.to_string()
                } else {
                    security_name.clone()
                },
                community: community.clone(),
            },
            _ => {
                return Err(SnmpError::InvalidArgument(
                    "community is a required argument for snmpv1/2".to_string(),
                ));
            }
        },
        SnmpVersion::V3 => match credential {
            Credential::Usm {
                user,
                auth_key,
                auth_algorithm,
                priv_key,
            } if !user.is_empty() => build_usm(user, auth_key, auth_algorithm, priv_key)?,
            _ => {
                return Err(SnmpError::InvalidArgument(
                    "user is a required argument for snmpv3".to_string(),
                ));
            }
        },
    };

    let target = Target {
        host: host.trim().to_string(),
        port,
        version,
    };

    Ok((target, auth))
}

fn build_usm(
    user: &str,
    auth_key: &Option<String>,
    auth_algorithm: &str,
    priv_key: &Option<String>,
) -> Result<AuthConfig, SnmpError> {
    let auth_key = auth_key.as_ref().filter(|key| !key.is_empty());
    let priv_key = priv_key.as_ref().filter(|key| !key.is_empty());

    let auth = match auth_key {
        Some(key) => {
            let algorithm = AuthAlgorithm::parse(auth_algorithm).ok_or_else(|| {
                SnmpError::InvalidArgument("unknown authentication protocol".to_string())
            })?;
            Some((algorithm, key.clone()))
        }
        None => None,
    };

    if priv_key.is_some() && auth.is_none() {
        return Err(SnmpError::InvalidArgument(
            "privacy requires an authentication key".to_string(),
        ));
    }

    Ok(AuthConfig::Usm(UsmConfig {
        user: user.to_string(),
        auth,
        priv_key: priv_key.cloned(),
    }))
}
