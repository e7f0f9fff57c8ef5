use std::process::ExitCode;

use clap::Parser;
use clap::error::ErrorKind;

use serverview_snmp::collector::{self, DeviceInfo, SubsystemCollector, Verdict};
use serverview_snmp::config::{AppConfig, Args};
use serverview_snmp::formatter;
use serverview_snmp::snmp::SnmpClient;

/// Сообщение для всего, что не попало в таксономию ошибок
const UNHANDLED: &str = "Unhandled exception in plugin check_serverview";

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let args = match Args::try_parse() {
        Ok(args) => args,
        Err(e) => return usage_exit(e),
    };
    args.init_tracing();

    let format = args.format;
    // паника внутри проверки тоже должна закончиться строкой UNKNOWN
    let verdict = match tokio::spawn(run(args)).await {
        Ok(verdict) => verdict,
        Err(e) => {
            tracing::error!(error = %e, "check aborted");
            Verdict::unknown(UNHANDLED)
        }
    };

    tracing::info!(severity = %verdict.severity, summary = %verdict.summary, "verdict");
    println!("{}", formatter::render(&verdict, format));

    ExitCode::from(verdict.severity.exit_code())
}

/// Одна проверка: конфигурация, опрос агента, вердикт
async fn run(args: Args) -> Verdict {
    let config = match AppConfig::resolve(args) {
        Ok(config) => config,
        Err(e) => return Verdict::unknown(e.to_string()),
    };

    let (target, auth) = match config.connection() {
        Ok(connection) => connection,
        Err(e) => return Verdict::unknown(e.to_string()),
    };
    tracing::debug!(agent = %target.address(), version = %target.version, "checking agent");

    let supports_bulk = target.version.supports_bulk();
    let client = SnmpClient::connect(target, auth, config.get_timeout())
        .max_repetitions(config.get_max_repetitions());

    if config.args.verbose >= 1 {
        DeviceInfo::log_identity(&client).await;
    }
    if config.args.verbose >= 2 && supports_bulk {
        collector::log_subsystem_table(&client).await;
    }

    let outcome = SubsystemCollector::new(config.ignore_list())
        .concurrency(config.get_concurrency())
        .evaluate(&client)
        .await;

    collector::verdict(outcome)
}

/// Справка и версия печатаются как есть; ошибки разбора дают строку UNKNOWN. Код выхода всегда 3.
fn usage_exit(e: clap::Error) -> ExitCode {
    match e.kind() {
        ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => {
            let _ = e.print();
        }
        _ => {
            let rendered = e.to_string();
            let reason = rendered
                .lines()
                .next()
                .unwrap_or("invalid arguments")
                .trim_start_matches("error: ");
            println!(
                "{}",
                formatter::PluginFormatter::format_line(&Verdict::unknown(reason))
            );
        }
    }
    ExitCode::from(collector::Severity::Unknown.exit_code())
}
