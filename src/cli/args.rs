use crate::domain::action::{
    parse_index, parse_relay_id, parse_relay_state, parse_sqlreload_target, Action, GraphRequest,
    PidOperation, PidType, SensorClass, SensorKind,
};
use crate::domain::error::ClientResult;
use clap::{Parser, ValueEnum};
use std::path::PathBuf;

/// Command line arguments for the Mycodo client
///
/// Exactly one action flag may be given per invocation.
#[derive(Parser, Debug)]
#[command(
    name = "mycodo-client",
    version = env!("CARGO_PKG_VERSION"),
    about = "Client for the Mycodo daemon (daemon must be running)",
    long_about = "Sends a single command to the running Mycodo daemon: read a sensor, switch a relay, \
                  control PID loops, request status or graphs, reload the database, or terminate the daemon."
)]
pub struct Args {
    /// Generate a graph; FROM and TO are seconds since epoch
    #[arg(
        long,
        num_args = 7,
        value_names = ["THEME", "TYPE", "ID", "SPAN", "FROM", "TO", "WIDTH"],
        group = "action",
        help_heading = "Actions"
    )]
    pub graph: Option<Vec<String>>,

    /// Restart all PIDs of a sensor class (T, HT, CO2, Press)
    #[arg(long, value_name = "SENSOR", group = "action", help_heading = "Actions")]
    pub pidallrestart: Option<String>,

    /// Restart a PID controller (TTemp, HTTemp, HTHum, CO2, PressTemp, PressPress)
    #[arg(
        long,
        num_args = 2,
        value_names = ["PID_TYPE", "ID"],
        allow_negative_numbers = true,
        group = "action",
        help_heading = "Actions"
    )]
    pub pidrestart: Option<Vec<String>>,

    /// Start a PID controller
    #[arg(
        long,
        num_args = 2,
        value_names = ["PID_TYPE", "ID"],
        allow_negative_numbers = true,
        group = "action",
        help_heading = "Actions"
    )]
    pub pidstart: Option<Vec<String>>,

    /// Stop a PID controller
    #[arg(
        long,
        num_args = 2,
        value_names = ["PID_TYPE", "ID"],
        allow_negative_numbers = true,
        group = "action",
        help_heading = "Actions"
    )]
    pub pidstop: Option<Vec<String>>,

    /// Turn a relay off (0), on (1), or on for STATE seconds
    #[arg(
        short,
        long,
        num_args = 2,
        value_names = ["RELAY", "STATE"],
        allow_negative_numbers = true,
        group = "action",
        help_heading = "Actions"
    )]
    pub relay: Option<Vec<String>>,

    /// Read a temperature sensor (DS18B20)
    #[arg(
        long,
        num_args = 2,
        value_names = ["DEVICE", "ID"],
        allow_negative_numbers = true,
        group = "action",
        help_heading = "Actions"
    )]
    pub sensort: Option<Vec<String>>,

    /// Read a humidity/temperature sensor (DHT22, DHT11, AM2302)
    #[arg(
        long,
        num_args = 2,
        value_names = ["DEVICE", "ID"],
        allow_negative_numbers = true,
        group = "action",
        help_heading = "Actions"
    )]
    pub sensorht: Option<Vec<String>>,

    /// Read a CO2 sensor (K30)
    #[arg(
        long,
        num_args = 2,
        value_names = ["DEVICE", "ID"],
        allow_negative_numbers = true,
        group = "action",
        help_heading = "Actions"
    )]
    pub sensorco2: Option<Vec<String>>,

    /// Read a pressure sensor (BMP085-180)
    #[arg(
        long,
        num_args = 2,
        value_names = ["DEVICE", "ID"],
        allow_negative_numbers = true,
        group = "action",
        help_heading = "Actions"
    )]
    pub sensorpress: Option<Vec<String>>,

    /// Reload the SQLite database, initializing the relay's GPIO unless RELAY is -1
    #[arg(
        long,
        value_name = "RELAY",
        allow_negative_numbers = true,
        group = "action",
        help_heading = "Actions"
    )]
    pub sqlreload: Option<String>,

    /// Show daemon status and all global variables
    #[arg(short, long, group = "action", help_heading = "Actions")]
    pub status: bool,

    /// Terminate the communication service and daemon
    #[arg(short, long, group = "action", help_heading = "Actions")]
    pub terminate: bool,

    /// Send a test email
    #[arg(long, value_name = "RECIPIENT", group = "action", help_heading = "Actions")]
    pub test_email: Option<String>,

    /// Configuration file path
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Daemon host (overrides configuration)
    #[arg(long)]
    pub host: Option<String>,

    /// Daemon port (overrides configuration)
    #[arg(long)]
    pub port: Option<u16>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "text")]
    pub output: OutputFormat,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,

    /// Suppress output
    #[arg(short, long)]
    pub quiet: bool,
}

/// Output format options
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// Human-readable text output
    Text,
    /// JSON output
    Json,
    /// Table output
    Table,
}

impl Default for OutputFormat {
    fn default() -> Self {
        Self::Text
    }
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Text => write!(f, "text"),
            OutputFormat::Json => write!(f, "json"),
            OutputFormat::Table => write!(f, "table"),
        }
    }
}

impl Args {
    /// Validate the selected action flag and its values.
    ///
    /// Returns `Ok(None)` when no action flag was given.
    pub fn action(&self) -> ClientResult<Option<Action>> {
        if let Some(values) = &self.graph {
            let [theme, graph_type, graph_id, span, time_from, time_to, width] = fixed::<7>(values);
            return Ok(Some(Action::Graph(GraphRequest {
                theme,
                graph_type,
                graph_id,
                span,
                time_from,
                time_to,
                width,
            })));
        }

        if let Some(class) = &self.pidallrestart {
            return Ok(Some(Action::PidAllRestart(class.parse::<SensorClass>()?)));
        }

        let pid_flags = [
            (PidOperation::Restart, &self.pidrestart),
            (PidOperation::Start, &self.pidstart),
            (PidOperation::Stop, &self.pidstop),
        ];
        for (operation, values) in pid_flags {
            if let Some(values) = values {
                let [pid_type, id] = fixed::<2>(values);
                return Ok(Some(Action::Pid {
                    operation,
                    pid_type: pid_type.parse::<PidType>()?,
                    id: parse_index(&id)?,
                }));
            }
        }

        if let Some(values) = &self.relay {
            let [id, state] = fixed::<2>(values);
            return Ok(Some(Action::Relay {
                id: parse_relay_id(&id)?,
                state: parse_relay_state(&state)?,
            }));
        }

        let sensor_flags = [
            (SensorKind::T, &self.sensort),
            (SensorKind::HT, &self.sensorht),
            (SensorKind::CO2, &self.sensorco2),
            (SensorKind::Press, &self.sensorpress),
        ];
        for (kind, values) in sensor_flags {
            if let Some(values) = values {
                let [device, id] = fixed::<2>(values);
                return Ok(Some(Action::ReadSensor {
                    kind,
                    device,
                    id: parse_index(&id)?,
                }));
            }
        }

        if let Some(target) = &self.sqlreload {
            return Ok(Some(Action::SqlReload(parse_sqlreload_target(target)?)));
        }

        if self.status {
            return Ok(Some(Action::Status));
        }

        if self.terminate {
            return Ok(Some(Action::Terminate));
        }

        if let Some(recipient) = &self.test_email {
            return Ok(Some(Action::TestEmail(recipient.clone())));
        }

        Ok(None)
    }
}

/// clap enforces `num_args`, so the vector length is known here
fn fixed<const N: usize>(values: &[String]) -> [String; N] {
    std::array::from_fn(|i| values.get(i).cloned().unwrap_or_default())
}
