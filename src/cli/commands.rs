use crate::cli::args::Args;
use crate::cli::output::{ConsoleWriter, Outcome, OutputWriter, Reply};
use crate::domain::action::{Action, RelayState, SensorKind};
use crate::domain::config::ClientConfig;
use crate::domain::error::{ClientError, ClientResult};
use crate::infrastructure::{config::ConfigManager, logging::init_logging};
use crate::rpc::daemon::{DaemonClient, SUCCESS_CODE};
use crate::rpc::transport::{TcpTransport, Transport};
use clap::CommandFactory;
use serde_json::Number;
use tracing::{debug, info};

/// Usage text shown when no action is given
pub fn usage_text() -> String {
    Args::command().render_help().to_string()
}

/// Execute CLI command, returning the process exit code
pub async fn execute_command(args: Args) -> ClientResult<u8> {
    let mut writer = ConsoleWriter::stdout(args.output, args.quiet);

    let config = load_config(&args)?;

    // Initialize logging
    if !args.quiet {
        init_logging(&config.global, args.verbose)?;
    }

    let action = match args.action()? {
        Some(action) => action,
        None => {
            writer.write_usage(&usage_text())?;
            return Ok(1);
        }
    };
    debug!("Dispatching {:?}", action);

    let transport = TcpTransport::connect(&config.daemon).await?;
    let mut daemon = DaemonClient::new(transport);

    let outcome = execute_action(&mut daemon, &action).await?;
    info!("{} finished, success: {}", outcome.action, outcome.success);

    writer.write_outcome(&outcome)?;
    Ok(outcome.exit_code())
}

/// Resolve configuration: files (or `--config`), then `--host`/`--port`
pub fn load_config(args: &Args) -> ClientResult<ClientConfig> {
    let config_manager = ConfigManager::new();
    let mut config = if let Some(config_path) = &args.config {
        config_manager.load_config_from_path(config_path)?
    } else {
        config_manager.load_config()?
    };

    if let Some(host) = &args.host {
        config.daemon.host = host.clone();
    }
    if let Some(port) = args.port {
        config.daemon.port = port;
    }

    Ok(config)
}

/// Invoke the remote method for `action` and describe the result
pub async fn execute_action<T: Transport>(
    daemon: &mut DaemonClient<T>,
    action: &Action,
) -> ClientResult<Outcome> {
    let label = action.label();

    let outcome = match action {
        Action::Graph(graph) => {
            let request = format!(
                "Graph: {} {} {} {} {} {} {}",
                graph.theme,
                graph.graph_type,
                graph.graph_id,
                graph.span,
                graph.time_from,
                graph.time_to,
                graph.width
            );
            let code = daemon.generate_graph(graph).await?;
            code_outcome(label, request, code, "Success", fail_plain)
        }
        Action::PidAllRestart(class) => {
            let request = format!("Restart all {} PID controllers", class);
            let code = daemon.all_pid_restart(*class).await?;
            code_outcome(label, request, code, "Success", fail_with_code)
        }
        Action::Pid {
            operation,
            pid_type,
            id,
        } => {
            let request = format!("{} {} PID controller number {}", operation.verb(), pid_type, id);
            let code = daemon.pid(*operation, *pid_type, *id).await?;
            code_outcome(label, request, code, "Success", fail_with_code)
        }
        Action::Relay { id, state } => {
            let code = daemon.change_relay(*id, *state).await?;
            match state {
                RelayState::OnFor(seconds) => code_outcome(
                    label,
                    format!("Relay {} ON for {} seconds", id, seconds),
                    code,
                    "Success",
                    fail_plain,
                ),
                _ => code_outcome(
                    label,
                    format!("Set relay {} to {}", id, state.wire_value()),
                    code,
                    "success",
                    |_| "fail".to_string(),
                ),
            }
        }
        Action::ReadSensor { kind, device, id } => {
            let request = format!("Read {} {} sensor {}", device, kind, id);
            let (text, values) = read_sensor(daemon, *kind, device, *id).await?;
            Outcome {
                action: label,
                request,
                reply: Reply::Reading { text, values },
                success: true,
            }
        }
        Action::SqlReload(relay) => {
            let request = match relay {
                Some(id) => format!("Reload SQLite database and initialize relay {}", id),
                None => "Reload SQLite database".to_string(),
            };
            let code = daemon.sqlreload(*relay).await?;
            code_outcome(label, request, code, "Success", fail_plain)
        }
        Action::Status => {
            let report = daemon.status().await?;
            Outcome {
                action: label,
                request: "Request Status Report".to_string(),
                success: report.active,
                reply: Reply::Status(report),
            }
        }
        Action::Terminate => {
            let code = daemon.terminate_daemon().await?;
            code_outcome(
                label,
                "Terminate all threads and daemon".to_string(),
                code,
                "Success",
                fail_plain,
            )
        }
        Action::TestEmail(recipient) => {
            let code = daemon.test_email(recipient).await?;
            code_outcome(
                label,
                format!("Send test email to {}", recipient),
                code,
                "Success (check your email for confirmation)",
                fail_plain,
            )
        }
    };

    Ok(outcome)
}

fn fail_plain(_code: i64) -> String {
    "Fail".to_string()
}

fn fail_with_code(code: i64) -> String {
    format!("Fail, {}", code)
}

fn code_outcome(
    action: &'static str,
    request: String,
    code: i64,
    success_text: &str,
    failure_text: impl Fn(i64) -> String,
) -> Outcome {
    let success = code == SUCCESS_CODE;
    let text = if success {
        success_text.to_string()
    } else {
        failure_text(code)
    };
    Outcome {
        action,
        request,
        reply: Reply::Code { code, text },
        success,
    }
}

async fn read_sensor<T: Transport>(
    daemon: &mut DaemonClient<T>,
    kind: SensorKind,
    device: &str,
    id: i64,
) -> ClientResult<(String, Vec<(&'static str, f64)>)> {
    let reading = match kind {
        SensorKind::T => {
            let temperature = daemon.read_t_sensor(device, id).await?;
            (
                format!("Temperature: {}°C", rounded(temperature)),
                vec![("temperature", temperature)],
            )
        }
        SensorKind::HT => {
            let reading = daemon.read_ht_sensor(device, id).await?;
            (
                format!(
                    "Temperature: {}°C Humidity: {}%",
                    rounded(reading.temperature),
                    rounded(reading.humidity)
                ),
                vec![
                    ("temperature", reading.temperature),
                    ("humidity", reading.humidity),
                ],
            )
        }
        SensorKind::CO2 => {
            let co2 = daemon.read_co2_sensor(device, id).await?;
            (format!("CO2: {} ppmv", co2), vec![("co2", as_f64(&co2)?)])
        }
        SensorKind::Press => {
            let reading = daemon.read_press_sensor(device, id).await?;
            (
                format!(
                    "Pressure: {} kPa Temperature: {}°C Altitude: {} m",
                    reading.pressure,
                    rounded(reading.temperature),
                    rounded(reading.altitude)
                ),
                vec![
                    ("pressure", as_f64(&reading.pressure)?),
                    ("temperature", reading.temperature),
                    ("altitude", reading.altitude),
                ],
            )
        }
    };
    Ok(reading)
}

fn as_f64(number: &Number) -> ClientResult<f64> {
    number
        .as_f64()
        .ok_or_else(|| ClientError::Protocol(format!("Reading {} is not representable", number)))
}

/// Two decimal places, keeping a trailing `.0` on whole numbers (`21.0`)
fn rounded(value: f64) -> String {
    format!("{:?}", (value * 100.0).round() / 100.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rounded() {
        assert_eq!(rounded(21.456), "21.46");
        assert_eq!(rounded(21.0), "21.0");
        assert_eq!(rounded(-3.333), "-3.33");
    }

    #[test]
    fn test_code_outcome() {
        let ok = code_outcome("pidrestart", "x".into(), 1, "Success", fail_with_code);
        assert!(ok.success);
        assert_eq!(ok.reply, Reply::Code { code: 1, text: "Success".into() });

        let failed = code_outcome("pidrestart", "x".into(), 3, "Success", fail_with_code);
        assert!(!failed.success);
        assert_eq!(failed.reply, Reply::Code { code: 3, text: "Fail, 3".into() });
    }

    #[test]
    fn test_usage_mentions_every_action() {
        let usage = usage_text();
        for flag in [
            "--graph",
            "--pidallrestart",
            "--pidrestart",
            "--pidstart",
            "--pidstop",
            "--relay",
            "--sensort",
            "--sensorht",
            "--sensorco2",
            "--sensorpress",
            "--sqlreload",
            "--status",
            "--terminate",
            "--test-email",
        ] {
            assert!(usage.contains(flag), "usage is missing {}", flag);
        }
    }
}
