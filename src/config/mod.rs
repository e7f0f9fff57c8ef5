use std::env;
use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, ValueEnum};
use tokio::time::Duration;

pub mod settings;

pub use settings::Settings;

use crate::collector::IgnoreList;
use crate::snmp::{self, AuthConfig, Credential, SnmpError, SnmpVersion, Target};

/// Формат вывода результата
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Одна строка для Nagios
    #[default]
    Plugin,
    /// JSON для скриптов
    Json,
}

/// Checks all FSC ServerView (hardware) subsystems over SNMP and returns the global status.
#[derive(Debug, Parser)]
#[command(name = "check_serverview", version, about)]
pub struct Args {
    /// Connect to hostname
    #[arg(short = 'H', long = "host")]
    pub host: Option<String>,

    /// SNMP version to use: 1, 2 or 3 (affects the community option)
    #[arg(
        short = 'p',
        long = "protocol",
        default_value_t = 1,
        allow_negative_numbers = true
    )]
    pub protocol: i64,

    /// Community string with SNMPv1/v2, or <user>[:<authkey>] with SNMPv3 [default: public]
    #[arg(short = 'C', long = "community")]
    pub community: Option<String>,

    /// Comma separated list of subsystem names to ignore
    #[arg(short = 'i', long = "ignore", default_value = "")]
    pub ignore: String,

    /// Seconds before a single SNMP exchange times out [default: 25]
    #[arg(short = 't', long = "timeout")]
    pub timeout: Option<u64>,

    /// Amount of diagnostic output on stderr (0-3)
    #[arg(short = 'v', long = "verbose", default_value_t = 0)]
    pub verbose: u8,

    /// Warning threshold (accepted, not implemented)
    #[arg(short = 'w', long = "warning")]
    pub warning: Option<String>,

    /// Critical threshold (accepted, not implemented)
    #[arg(short = 'c', long = "critical")]
    pub critical: Option<String>,

    /// Agent UDP port [default: 161]
    #[arg(long = "port", allow_negative_numbers = true)]
    pub port: Option<i64>,

    /// SNMPv3 authentication protocol: md5 or sha [default: md5]
    #[arg(short = 'a', long = "auth-protocol")]
    pub auth_protocol: Option<String>,

    /// SNMPv3 privacy (DES) key, requires an authentication key
    #[arg(short = 'x', long = "priv-key")]
    pub priv_key: Option<String>,

    /// SNMPv1/v2 security name [default: test-agent]
    #[arg(long = "security-name")]
    pub security_name: Option<String>,

    /// Number of subsystems read at once [default: 1]
    #[arg(long = "concurrency")]
    pub concurrency: Option<usize>,

    /// Output format
    #[arg(long = "format", value_enum, default_value = "plugin")]
    pub format: OutputFormat,

    /// YAML settings file
    #[arg(long = "config", value_name = "PATH")]
    pub config: Option<PathBuf>,
}

impl Args {
    /// Логи только в stderr: stdout занят строкой для Nagios
    pub fn init_tracing(&self) {
        use tracing_subscriber::EnvFilter;

        let level = match self.verbose {
            0 => "warn",
            1 => "info",
            2 => "debug",
            _ => "trace",
        };
        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .with_target(false)
            .try_init();
    }
}

/// Главная конфигурация проверки
#[derive(Debug)]
pub struct AppConfig {
    /// Аргументы командной строки
    pub args: Args,
    /// Настройки из файла или по умолчанию
    pub settings: Settings,
}

impl AppConfig {
    /// Подгружает файл настроек, если он указан
    pub fn load(args: Args) -> Result<Self> {
        let settings = match &args.config {
            Some(path) => Settings::load(&path.to_string_lossy())?,
            None => Settings::default(),
        };

        Ok(Self { args, settings })
    }

    /// Как `load`, но нечитаемый файл настроек становится ошибкой аргумента
    pub fn resolve(args: Args) -> Result<Self, SnmpError> {
        Self::load(args).map_err(|e| SnmpError::InvalidArgument(format!("{:#}", e)))
    }

    /// Получает timeout: аргумент, затем SNMP_TIMEOUT, затем настройки
    pub fn get_timeout(&self) -> Duration {
        let seconds = self
            .args
            .timeout
            .or_else(|| env::var("SNMP_TIMEOUT").ok().and_then(|s| s.parse().ok()))
            .unwrap_or(self.settings.connection.timeout);
        Duration::from_secs(seconds.max(1))
    }

    /// Получает community: аргумент, затем SNMP_COMMUNITY, затем "public"
    pub fn get_community(&self) -> String {
        self.args
            .community
            .clone()
            .or_else(|| env::var("SNMP_COMMUNITY").ok())
            .unwrap_or_else(|| "public".to_string())
    }

    pub fn get_port(&self) -> i64 {
        self.args.port.unwrap_or(self.settings.connection.port)
    }

    pub fn get_auth_protocol(&self) -> String {
        self.args
            .auth_protocol
            .clone()
            .unwrap_or_else(|| self.settings.auth.auth_protocol.clone())
    }

    pub fn get_security_name(&self) -> String {
        self.args
            .security_name
            .clone()
            .unwrap_or_else(|| self.settings.auth.security_name.clone())
    }

    pub fn get_concurrency(&self) -> usize {
        self.args
            .concurrency
            .unwrap_or(self.settings.connection.concurrency)
            .max(1)
    }

    pub fn get_max_repetitions(&self) -> u32 {
        self.settings.connection.max_repetitions
    }

    pub fn ignore_list(&self) -> IgnoreList {
        IgnoreList::parse(&self.args.ignore)
    }

    /// Проверяет обязательные опции и собирает адрес и аутентификацию агента
    pub fn connection(&self) -> Result<(Target, AuthConfig), SnmpError> {
        let host = self.args.host.as_deref().unwrap_or("").trim();
        if host.is_empty() {
            return Err(SnmpError::InvalidArgument(
                "-H, --host is a required argument".to_string(),
            ));
        }

        let community = self.get_community();
        if community.is_empty() {
            return Err(SnmpError::InvalidArgument(
                "-C, --community is a required argument".to_string(),
            ));
        }

        let credential = match SnmpVersion::from_number(self.args.protocol) {
            Some(SnmpVersion::V3) => Credential::from_user_key(
                &community,
                &self.get_auth_protocol(),
                self.args.priv_key.clone(),
            ),
            Some(_) => Credential::Community {
                security_name: self.get_security_name(),
                community,
            },
            None => return Err(SnmpError::InvalidArgument("invalid protocol".to_string())),
        };

        snmp::build(host, self.get_port(), self.args.protocol, &credential)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::snmp::SecurityLevel;

    fn config(argv: &[&str]) -> AppConfig {
        let mut full = vec!["check_serverview"];
        full.extend_from_slice(argv);
        AppConfig::load(Args::try_parse_from(full).unwrap()).unwrap()
    }

    fn reason(config: &AppConfig) -> String {
        match config.connection() {
            Err(SnmpError::InvalidArgument(reason)) => reason,
            other => panic!("expected InvalidArgument, got {:?}", other),
        }
    }

    #[test]
    fn defaults_match_plugin_options() {
        let config = config(&["-H", "srv01", "-C", "public"]);

        assert_eq!(config.args.protocol, 1);
        assert_eq!(config.get_port(), 161);
        assert_eq!(config.get_concurrency(), 1);
        assert_eq!(config.args.format, OutputFormat::Plugin);
        assert!(config.ignore_list().is_empty());

        let (target, auth) = config.connection().unwrap();
        assert_eq!(target.version, SnmpVersion::V1);
        assert_eq!(
            auth,
            AuthConfig::Community {
                security_name: "test-agent".to_string(),
                community: "public".to_string(),
            }
        );
    }

    #[test]
    fn cli_flags_override_settings() {
        let config = config(&[
            "-H",
            "srv01",
            "-t",
            "7",
            "--port",
            "1161",
            "--concurrency",
            "3",
            "-a",
            "sha",
        ]);

        assert_eq!(config.get_timeout(), Duration::from_secs(7));
        assert_eq!(config.get_port(), 1161);
        assert_eq!(config.get_concurrency(), 3);
        assert_eq!(config.get_auth_protocol(), "sha");
    }

    #[test]
    fn missing_host_is_reported_first() {
        assert_eq!(
            reason(&config(&["-p", "7"])),
            "-H, --host is a required argument"
        );
    }

    #[test]
    fn empty_community_is_rejected() {
        assert_eq!(
            reason(&config(&["-H", "srv01", "-C", ""])),
            "-C, --community is a required argument"
        );
    }

    #[test]
    fn invalid_protocol() {
        let config = config(&["-H", "srv01", "-C", "x", "-p", "4"]);
        assert_eq!(reason(&config), "invalid protocol");
    }

    #[test]
    fn bad_port_comes_from_builder() {
        assert_eq!(
            reason(&config(&["-H", "srv01", "-C", "x", "--port", "70000"])),
            "port must be >= 0 and < 2^16"
        );
    }

    #[test]
    fn v3_community_is_user_and_key() {
        let config = config(&[
            "-H",
            "srv01",
            "-p",
            "3",
            "-C",
            "monitor:secret",
            "-x",
            "des",
        ]);

        match config.connection().unwrap().1 {
            AuthConfig::Usm(usm) => {
                assert_eq!(usm.user, "monitor");
                assert_eq!(usm.level(), SecurityLevel::AuthPriv);
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn unreadable_settings_file_is_an_argument_error() {
        let args = Args::try_parse_from([
            "check_serverview",
            "-H",
            "srv01",
            "--config",
            "/nonexistent/serverview.yaml",
        ])
        .unwrap();

        match AppConfig::resolve(args) {
            Err(SnmpError::InvalidArgument(reason)) => {
                assert!(reason.contains("cannot read settings file"));
                assert!(reason.contains("/nonexistent/serverview.yaml"));
            }
            other => panic!("expected InvalidArgument, got {:?}", other),
        }
    }

    #[test]
    fn thresholds_are_accepted() {
        let config = config(&["-H", "srv01", "-C", "x", "-w", "1", "-c", "2", "-v", "2"]);
        assert_eq!(config.args.warning.as_deref(), Some("1"));
        assert_eq!(config.args.verbose, 2);
    }
}
