//! Typed daemon actions
//!
//! Every command-line action maps to exactly one [`Action`] variant, and each
//! variant carries its own already-validated arguments.

use crate::domain::error::{ClientError, ClientResult};
use std::fmt;
use std::str::FromStr;

/// Sensor classes accepted by `all_pid_restart`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SensorClass {
    T,
    HT,
    CO2,
    Press,
}

/// PID controller types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PidType {
    TTemp,
    HTTemp,
    HTHum,
    CO2,
    PressTemp,
    PressPress,
}

/// Sensor families that can be read on demand
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SensorKind {
    T,
    HT,
    CO2,
    Press,
}

/// PID lifecycle operations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PidOperation {
    Restart,
    Start,
    Stop,
}

/// Requested relay state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelayState {
    Off,
    On,
    /// On for the given number of seconds, then off
    OnFor(u32),
}

/// Graph generation parameters, passed through to the daemon untouched
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GraphRequest {
    pub theme: String,
    pub graph_type: String,
    pub graph_id: String,
    pub span: String,
    pub time_from: String,
    pub time_to: String,
    pub width: String,
}

/// One daemon action per invocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    Graph(GraphRequest),
    PidAllRestart(SensorClass),
    Pid {
        operation: PidOperation,
        pid_type: PidType,
        id: i64,
    },
    Relay {
        id: i64,
        state: RelayState,
    },
    ReadSensor {
        kind: SensorKind,
        device: String,
        id: i64,
    },
    /// `None` reloads without initializing a relay
    SqlReload(Option<i64>),
    Status,
    Terminate,
    TestEmail(String),
}

impl SensorClass {
    pub const ALL: [SensorClass; 4] = [Self::T, Self::HT, Self::CO2, Self::Press];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::T => "T",
            Self::HT => "HT",
            Self::CO2 => "CO2",
            Self::Press => "Press",
        }
    }
}

impl PidType {
    pub const ALL: [PidType; 6] = [
        Self::TTemp,
        Self::HTTemp,
        Self::HTHum,
        Self::CO2,
        Self::PressTemp,
        Self::PressPress,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::TTemp => "TTemp",
            Self::HTTemp => "HTTemp",
            Self::HTHum => "HTHum",
            Self::CO2 => "CO2",
            Self::PressTemp => "PressTemp",
            Self::PressPress => "PressPress",
        }
    }
}

impl SensorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::T => "T",
            Self::HT => "HT",
            Self::CO2 => "CO2",
            Self::Press => "Press",
        }
    }

    /// Remote method that reads this kind of sensor
    pub fn method(&self) -> &'static str {
        match self {
            Self::T => "read_t_sensor",
            Self::HT => "read_ht_sensor",
            Self::CO2 => "read_co2_sensor",
            Self::Press => "read_press_sensor",
        }
    }
}

impl PidOperation {
    pub fn method(&self) -> &'static str {
        match self {
            Self::Restart => "pid_restart",
            Self::Start => "pid_start",
            Self::Stop => "pid_stop",
        }
    }

    pub fn verb(&self) -> &'static str {
        match self {
            Self::Restart => "Restart",
            Self::Start => "Start",
            Self::Stop => "Stop",
        }
    }
}

impl RelayState {
    /// Integer sent to `change_relay`
    pub fn wire_value(&self) -> i64 {
        match self {
            Self::Off => 0,
            Self::On => 1,
            Self::OnFor(seconds) => i64::from(*seconds),
        }
    }
}

impl Action {
    /// Short label used in structured output
    pub fn label(&self) -> &'static str {
        match self {
            Self::Graph(_) => "graph",
            Self::PidAllRestart(_) => "pidallrestart",
            Self::Pid { operation, .. } => match operation {
                PidOperation::Restart => "pidrestart",
                PidOperation::Start => "pidstart",
                PidOperation::Stop => "pidstop",
            },
            Self::Relay { .. } => "relay",
            Self::ReadSensor { kind, .. } => match kind {
                SensorKind::T => "sensort",
                SensorKind::HT => "sensorht",
                SensorKind::CO2 => "sensorco2",
                SensorKind::Press => "sensorpress",
            },
            Self::SqlReload(_) => "sqlreload",
            Self::Status => "status",
            Self::Terminate => "terminate",
            Self::TestEmail(_) => "test-email",
        }
    }
}

fn invalid_option(value: &str, allowed: &[&str]) -> ClientError {
    let quoted: Vec<String> = allowed.iter().map(|a| format!("'{}'", a)).collect();
    let list = match quoted.split_last() {
        Some((last, rest)) if !rest.is_empty() => format!("{}, or {}", rest.join(", "), last),
        _ => quoted.join(""),
    };
    ClientError::InvalidInput(format!("'{}' is not a valid option. Use {}", value, list))
}

impl FromStr for SensorClass {
    type Err = ClientError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|class| class.as_str() == s)
            .ok_or_else(|| invalid_option(s, &Self::ALL.map(|c| c.as_str())))
    }
}

impl FromStr for PidType {
    type Err = ClientError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|pid| pid.as_str() == s)
            .ok_or_else(|| invalid_option(s, &Self::ALL.map(|p| p.as_str())))
    }
}

impl fmt::Display for SensorClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for PidType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for SensorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Parse a numeric identifier, accepting floats and truncating toward zero
/// (`"3.7"` is `3`).
pub fn parse_index(value: &str) -> ClientResult<i64> {
    let trimmed = value.trim();
    if let Ok(n) = trimmed.parse::<i64>() {
        return Ok(n);
    }
    match trimmed.parse::<f64>() {
        Ok(f) if f.is_finite() && f.abs() < i64::MAX as f64 => Ok(f.trunc() as i64),
        _ => Err(ClientError::InvalidInput(format!(
            "'{}' is not a valid number",
            value
        ))),
    }
}

/// Relay numbers must be written as plain integers greater than zero
pub fn parse_relay_id(value: &str) -> ClientResult<i64> {
    match value.trim().parse::<i64>() {
        Ok(id) if id > 0 => Ok(id),
        _ => Err(ClientError::InvalidInput(
            "second input must be an integer greater than 0".to_string(),
        )),
    }
}

/// `0` is off, `1` is on, any larger number is seconds on
pub fn parse_relay_state(value: &str) -> ClientResult<RelayState> {
    let invalid = || {
        ClientError::InvalidInput(format!(
            "relay state '{}' must be 0, 1, or a number of seconds greater than 1",
            value
        ))
    };
    let seconds = parse_index(value).map_err(|_| invalid())?;
    match seconds {
        0 => Ok(RelayState::Off),
        1 => Ok(RelayState::On),
        n if n > 1 => u32::try_from(n).map(RelayState::OnFor).map_err(|_| invalid()),
        _ => Err(invalid()),
    }
}

/// `-1` reloads the database without touching relay GPIO
pub fn parse_sqlreload_target(value: &str) -> ClientResult<Option<i64>> {
    match parse_index(value)? {
        -1 => Ok(None),
        id => Ok(Some(id)),
    }
}
