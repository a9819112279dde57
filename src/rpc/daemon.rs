//! Typed view of the daemon's remote command surface

use crate::domain::action::{GraphRequest, PidOperation, PidType, RelayState, SensorClass};
use crate::domain::error::{ClientError, ClientResult};
use crate::rpc::transport::Transport;
use serde::de::DeserializeOwned;
use serde_json::{json, Number, Value};

/// Return code the daemon uses for success
pub const SUCCESS_CODE: i64 = 1;

/// Result of `status(1)`
#[derive(Debug, Clone, PartialEq)]
pub struct StatusReport {
    pub active: bool,
    /// Global variable names paired with their values, in daemon order
    pub variables: Vec<(String, String)>,
}

/// Reading from a humidity/temperature sensor
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HtReading {
    pub humidity: f64,
    pub temperature: f64,
}

/// Reading from a barometric pressure sensor
#[derive(Debug, Clone, PartialEq)]
pub struct PressReading {
    /// Kept as sent so `101.0` prints as `101.0`
    pub pressure: Number,
    pub temperature: f64,
    pub altitude: f64,
}

/// Client for the daemon's remote methods
pub struct DaemonClient<T: Transport> {
    transport: T,
}

impl<T: Transport> DaemonClient<T> {
    pub fn new(transport: T) -> Self {
        Self { transport }
    }

    pub fn into_inner(self) -> T {
        self.transport
    }

    async fn invoke<R: DeserializeOwned>(&mut self, method: &str, params: Vec<Value>) -> ClientResult<R> {
        let value = self.transport.call(method, params).await?;
        serde_json::from_value(value.clone()).map_err(|e| {
            ClientError::Protocol(format!("Unexpected result from {}: {} ({})", method, value, e))
        })
    }

    async fn invoke_code(&mut self, method: &str, params: Vec<Value>) -> ClientResult<i64> {
        let value = self.transport.call(method, params).await?;
        return_code(method, &value)
    }

    pub async fn generate_graph(&mut self, graph: &GraphRequest) -> ClientResult<i64> {
        let params = vec![
            json!(graph.theme),
            json!(graph.graph_type),
            json!(graph.graph_id),
            json!(graph.span),
            json!(graph.time_from),
            json!(graph.time_to),
            json!(graph.width),
        ];
        self.invoke_code("generate_graph", params).await
    }

    pub async fn all_pid_restart(&mut self, class: SensorClass) -> ClientResult<i64> {
        self.invoke_code("all_pid_restart", vec![json!(class.as_str())]).await
    }

    /// `pid_restart`, `pid_start` or `pid_stop` depending on `operation`
    pub async fn pid(&mut self, operation: PidOperation, pid_type: PidType, id: i64) -> ClientResult<i64> {
        self.invoke_code(operation.method(), vec![json!(pid_type.as_str()), json!(id)])
            .await
    }

    pub async fn change_relay(&mut self, id: i64, state: RelayState) -> ClientResult<i64> {
        self.invoke_code("change_relay", vec![json!(id), json!(state.wire_value())])
            .await
    }

    pub async fn read_t_sensor(&mut self, device: &str, id: i64) -> ClientResult<f64> {
        self.invoke("read_t_sensor", vec![json!(device), json!(id)]).await
    }

    pub async fn read_ht_sensor(&mut self, device: &str, id: i64) -> ClientResult<HtReading> {
        let (humidity, temperature): (f64, f64) =
            self.invoke("read_ht_sensor", vec![json!(device), json!(id)]).await?;
        Ok(HtReading { humidity, temperature })
    }

    pub async fn read_co2_sensor(&mut self, device: &str, id: i64) -> ClientResult<Number> {
        self.invoke("read_co2_sensor", vec![json!(device), json!(id)]).await
    }

    pub async fn read_press_sensor(&mut self, device: &str, id: i64) -> ClientResult<PressReading> {
        let (pressure, temperature, altitude): (Number, f64, f64) =
            self.invoke("read_press_sensor", vec![json!(device), json!(id)]).await?;
        Ok(PressReading {
            pressure,
            temperature,
            altitude,
        })
    }

    /// `None` reloads the database without initializing a relay (`-1` on the wire)
    pub async fn sqlreload(&mut self, relay: Option<i64>) -> ClientResult<i64> {
        self.invoke_code("sqlreload", vec![json!(relay.unwrap_or(-1))]).await
    }

    pub async fn status(&mut self) -> ClientResult<StatusReport> {
        let (active, names, values): (Value, Vec<String>, Vec<String>) =
            self.invoke("status", vec![json!(1)]).await?;
        Ok(StatusReport {
            active: return_code("status", &active)? == SUCCESS_CODE,
            variables: names.into_iter().zip(values).collect(),
        })
    }

    pub async fn terminate_daemon(&mut self) -> ClientResult<i64> {
        self.invoke_code("terminate_daemon", vec![json!(1)]).await
    }

    pub async fn test_email(&mut self, recipient: &str) -> ClientResult<i64> {
        self.invoke_code("test_email", vec![json!(recipient)]).await
    }
}

/// Return codes arrive as integers, but tolerate `1.0` and booleans
fn return_code(method: &str, value: &Value) -> ClientResult<i64> {
    let code = match value {
        Value::Bool(b) => Some(i64::from(*b)),
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f.trunc() as i64)),
        _ => None,
    };
    code.ok_or_else(|| ClientError::Protocol(format!("Unexpected result from {}: {}", method, value)))
}
