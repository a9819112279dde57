use crate::domain::{config::DaemonConfig, error::{ClientError, ClientResult}};
use crate::rpc::protocol::{RpcRequest, RpcResponse};
use async_trait::async_trait;
use serde_json::Value;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::TcpStream;
use tracing::{debug, info, warn};

/// A channel that can invoke one named remote method and return its result
#[async_trait]
pub trait Transport: Send {
    /// Call `method` with positional `params` and wait for the result
    async fn call(&mut self, method: &str, params: Vec<Value>) -> ClientResult<Value>;
}

/// JSON-RPC over a single TCP connection
pub struct TcpTransport {
    address: String,
    reader: BufReader<OwnedReadHalf>,
    writer: OwnedWriteHalf,
    request_timeout: Option<Duration>,
    next_id: u64,
}

impl TcpTransport {
    /// Open the connection described by `config`
    pub async fn connect(config: &DaemonConfig) -> ClientResult<Self> {
        let address = config.address();

        let stream = tokio::time::timeout(
            config.connect_timeout(),
            TcpStream::connect((config.host.as_str(), config.port)),
        )
        .await
        .map_err(|_| ClientError::DaemonUnreachable {
            address: address.clone(),
            reason: format!("connection timed out after {}ms", config.connect_timeout_ms),
        })?
        .map_err(|e| ClientError::DaemonUnreachable {
            address: address.clone(),
            reason: e.to_string(),
        })?;

        if let Err(e) = stream.set_nodelay(true) {
            warn!("Failed to set TCP_NODELAY: {}", e);
        }

        info!("Connected to daemon at {}", address);

        let (read_half, write_half) = stream.into_split();
        Ok(Self {
            address,
            reader: BufReader::new(read_half),
            writer: write_half,
            request_timeout: config.request_timeout(),
            next_id: 1,
        })
    }

    async fn exchange(&mut self, request: &RpcRequest) -> ClientResult<RpcResponse> {
        let line = request.to_line()?;
        self.writer.write_all(line.as_bytes()).await?;
        self.writer.flush().await?;

        let mut response = String::new();
        let n = self.reader.read_line(&mut response).await?;
        if n == 0 {
            return Err(ClientError::Protocol(format!(
                "Daemon at {} closed the connection before responding",
                self.address
            )));
        }

        RpcResponse::from_line(&response)
    }
}

#[async_trait]
impl Transport for TcpTransport {
    async fn call(&mut self, method: &str, params: Vec<Value>) -> ClientResult<Value> {
        let id = self.next_id;
        self.next_id += 1;

        let request = RpcRequest::new(id, method, params);
        debug!("Calling {} (id {}) with {:?}", method, id, request.params);

        let response = match self.request_timeout {
            Some(limit) => tokio::time::timeout(limit, self.exchange(&request))
                .await
                .map_err(|_| ClientError::Timeout)??,
            None => self.exchange(&request).await?,
        };

        let result = response.into_result(id);
        match &result {
            Ok(value) => debug!("{} returned {}", method, value),
            Err(e) => warn!("{} failed: {}", method, e),
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tokio::io::AsyncReadExt;
    use tokio::net::TcpListener;

    fn config_for(port: u16) -> DaemonConfig {
        DaemonConfig {
            host: "127.0.0.1".to_string(),
            port,
            connect_timeout_ms: 1000,
            request_timeout_ms: 0,
        }
    }

    /// Accept one connection and answer each request line with `reply(request)`
    async fn spawn_daemon<F>(reply: F) -> u16
    where
        F: Fn(RpcRequest) -> String + Send + 'static,
    {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();

        tokio::spawn(async move {
            if let Ok((socket, _)) = listener.accept().await {
                let (read_half, mut write_half) = socket.into_split();
                let mut lines = BufReader::new(read_half).lines();
                while let Ok(Some(line)) = lines.next_line().await {
                    let request: RpcRequest = serde_json::from_str(&line).unwrap();
                    let mut out = reply(request);
                    out.push('\n');
                    let _ = write_half.write_all(out.as_bytes()).await;
                }
            }
        });

        port
    }

    #[tokio::test]
    async fn test_call_round_trip() {
        let port = spawn_daemon(|request| {
            assert_eq!(request.method, "change_relay");
            assert_eq!(request.params, vec![json!(2), json!(0)]);
            serde_json::to_string(&RpcResponse::success(request.id, json!(1))).unwrap()
        })
        .await;

        let mut transport = TcpTransport::connect(&config_for(port)).await.unwrap();
        let result = transport.call("change_relay", vec![json!(2), json!(0)]).await.unwrap();
        assert_eq!(result, json!(1));
    }

    #[tokio::test]
    async fn test_request_ids_increase() {
        let port = spawn_daemon(|request| {
            serde_json::to_string(&RpcResponse::success(request.id, json!(request.id))).unwrap()
        })
        .await;

        let mut transport = TcpTransport::connect(&config_for(port)).await.unwrap();
        assert_eq!(transport.call("status", vec![json!(1)]).await.unwrap(), json!(1));
        assert_eq!(transport.call("status", vec![json!(1)]).await.unwrap(), json!(2));
    }

    #[tokio::test]
    async fn test_connection_refused_is_unreachable() {
        // bind then drop to get a port nobody listens on
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        drop(listener);

        let result = TcpTransport::connect(&config_for(port)).await;
        match result {
            Err(ClientError::DaemonUnreachable { address, .. }) => {
                assert_eq!(address, format!("127.0.0.1:{}", port));
            }
            Err(other) => panic!("unexpected error: {:?}", other),
            Ok(_) => panic!("connection should have been refused"),
        }
    }

    #[tokio::test]
    async fn test_connect_is_bounded_by_timeout() {
        // non-routable, so the SYN goes unanswered
        let config = DaemonConfig {
            host: "10.255.255.1".to_string(),
            port: 18812,
            connect_timeout_ms: 100,
            request_timeout_ms: 0,
        };

        let result = tokio::time::timeout(Duration::from_secs(2), TcpTransport::connect(&config))
            .await
            .expect("connect should give up after connect_timeout_ms");
        match result {
            Err(ClientError::DaemonUnreachable { address, reason }) => {
                assert_eq!(address, "10.255.255.1:18812");
                // hosts without a route fail fast instead of timing out
                if reason.contains("timed out") {
                    assert_eq!(reason, "connection timed out after 100ms");
                }
            }
            Err(other) => panic!("unexpected error: {:?}", other),
            Ok(_) => panic!("connection to a non-routable address should fail"),
        }
    }

    #[tokio::test]
    async fn test_closed_connection_is_protocol_error() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        tokio::spawn(async move {
            if let Ok((mut socket, _)) = listener.accept().await {
                let mut buf = [0u8; 256];
                let _ = socket.read(&mut buf).await;
            }
        });

        let mut transport = TcpTransport::connect(&config_for(port)).await.unwrap();
        let err = transport.call("terminate_daemon", vec![json!(1)]).await.unwrap_err();
        assert!(matches!(err, ClientError::Protocol(_)));
    }

    #[tokio::test]
    async fn test_request_timeout() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        tokio::spawn(async move {
            if let Ok((socket, _)) = listener.accept().await {
                // hold the socket open without answering
                tokio::time::sleep(Duration::from_secs(5)).await;
                drop(socket);
            }
        });

        let mut config = config_for(port);
        config.request_timeout_ms = 50;
        let mut transport = TcpTransport::connect(&config).await.unwrap();
        let err = transport.call("generate_graph", Vec::new()).await.unwrap_err();
        assert!(matches!(err, ClientError::Timeout));
    }
}
