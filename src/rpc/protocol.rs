//! JSON-RPC 2.0 envelopes exchanged with the daemon
//!
//! Each message is a single JSON object terminated by a newline:
//!
//! ```text
//! {"jsonrpc":"2.0","method":"change_relay","params":[3,1],"id":1}
//! {"jsonrpc":"2.0","result":1,"id":1}
//! ```

use crate::domain::error::{ClientError, ClientResult};
use serde::{Deserialize, Serialize};
use serde_json::Value;

pub const JSONRPC_VERSION: &str = "2.0";

/// Request sent to the daemon; params are always positional
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RpcRequest {
    pub jsonrpc: String,
    pub method: String,
    pub params: Vec<Value>,
    pub id: u64,
}

/// Response received from the daemon
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RpcResponse {
    pub jsonrpc: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<RpcError>,
    pub id: Value,
}

/// Error object carried by a failed response
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RpcError {
    pub code: i64,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

impl RpcRequest {
    pub fn new(id: u64, method: impl Into<String>, params: Vec<Value>) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION.to_string(),
            method: method.into(),
            params,
            id,
        }
    }

    /// Serialize as one newline-terminated line
    pub fn to_line(&self) -> ClientResult<String> {
        let mut line = serde_json::to_string(self)?;
        line.push('\n');
        Ok(line)
    }
}

impl RpcResponse {
    pub fn success(id: u64, result: Value) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION.to_string(),
            result: Some(result),
            error: None,
            id: Value::from(id),
        }
    }

    pub fn failure(id: u64, error: RpcError) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION.to_string(),
            result: None,
            error: Some(error),
            id: Value::from(id),
        }
    }

    pub fn from_line(line: &str) -> ClientResult<Self> {
        serde_json::from_str(line.trim_end())
            .map_err(|e| ClientError::Protocol(format!("Malformed response: {}", e)))
    }

    /// Check the envelope against the request it answers and extract the result
    pub fn into_result(self, expected_id: u64) -> ClientResult<Value> {
        if self.jsonrpc != JSONRPC_VERSION {
            return Err(ClientError::Protocol(format!(
                "Unsupported JSON-RPC version '{}'",
                self.jsonrpc
            )));
        }
        if self.id.as_u64() != Some(expected_id) {
            return Err(ClientError::Protocol(format!(
                "Response id {} does not match request id {}",
                self.id, expected_id
            )));
        }
        match (self.result, self.error) {
            (_, Some(error)) => Err(ClientError::Remote {
                code: error.code,
                message: error.message,
            }),
            (Some(result), None) => Ok(result),
            // a null result is legal and deserializes to None
            (None, None) => Ok(Value::Null),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_request_line_format() {
        let request = RpcRequest::new(7, "change_relay", vec![json!(3), json!(1)]);
        let line = request.to_line().unwrap();

        assert!(line.ends_with('\n'));
        assert_eq!(line.matches('\n').count(), 1);

        let value: Value = serde_json::from_str(&line).unwrap();
        assert_eq!(
            value,
            json!({"jsonrpc": "2.0", "method": "change_relay", "params": [3, 1], "id": 7})
        );
    }

    #[test]
    fn test_success_response() {
        let response = RpcResponse::from_line("{\"jsonrpc\":\"2.0\",\"result\":1,\"id\":4}\n").unwrap();
        assert_eq!(response.into_result(4).unwrap(), json!(1));
    }

    #[test]
    fn test_error_response() {
        let line = r#"{"jsonrpc":"2.0","error":{"code":-32601,"message":"Method not found"},"id":2}"#;
        let err = RpcResponse::from_line(line).unwrap().into_result(2).unwrap_err();

        match err {
            ClientError::Remote { code, message } => {
                assert_eq!(code, -32601);
                assert_eq!(message, "Method not found");
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_id_mismatch() {
        let err = RpcResponse::success(3, json!(1)).into_result(9).unwrap_err();
        assert!(matches!(err, ClientError::Protocol(_)));
        assert!(err.to_string().contains("does not match"));
    }

    #[test]
    fn test_null_result() {
        let line = r#"{"jsonrpc":"2.0","result":null,"id":1}"#;
        assert_eq!(RpcResponse::from_line(line).unwrap().into_result(1).unwrap(), Value::Null);
    }

    #[test]
    fn test_malformed_response() {
        let err = RpcResponse::from_line("not json").unwrap_err();
        assert!(err.to_string().contains("Malformed response"));
    }
}
