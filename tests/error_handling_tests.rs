use mycodo_client::{ClientError, ClientResult};
use std::error::Error;

/// Error handling tests
#[cfg(test)]
mod error_handling_tests {
    use super::*;

    #[test]
    fn test_error_types() {
        let errors = vec![
            ClientError::DaemonUnreachable {
                address: "localhost:18812".to_string(),
                reason: "Connection refused".to_string(),
            },
            ClientError::Timeout,
            ClientError::Protocol("bad frame".to_string()),
            ClientError::Remote { code: -32601, message: "Method not found".to_string() },
            ClientError::InvalidInput("Invalid input".to_string()),
            ClientError::Config { message: "Config error".to_string() },
            ClientError::Output("Output error".to_string()),
        ];

        for error in errors {
            let display = error.to_string();
            assert!(!display.is_empty(), "Error display should not be empty");
        }

        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<ClientError>();
    }

    #[test]
    fn test_unreachable_names_the_endpoint() {
        let error = ClientError::DaemonUnreachable {
            address: "pi.local:18812".to_string(),
            reason: "connection timed out after 3000ms".to_string(),
        };
        assert_eq!(
            error.to_string(),
            "Daemon unreachable at pi.local:18812: connection timed out after 3000ms"
        );
    }

    #[test]
    fn test_invalid_input_is_shown_verbatim() {
        let error = ClientError::InvalidInput("second input must be an integer greater than 0".to_string());
        assert_eq!(error.to_string(), "second input must be an integer greater than 0");
    }

    #[test]
    fn test_io_error_conversion() {
        let io_error = std::io::Error::new(std::io::ErrorKind::BrokenPipe, "pipe closed");
        let client_error: ClientError = io_error.into();
        assert!(matches!(client_error, ClientError::Network(_)));
    }

    #[test]
    fn test_json_error_conversion() {
        let json_error = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let client_error: ClientError = json_error.into();
        assert!(matches!(client_error, ClientError::Protocol(_)));
    }

    #[test]
    fn test_error_chain() {
        let root_cause = std::io::Error::new(std::io::ErrorKind::ConnectionReset, "reset by peer");
        let network_error: ClientError = root_cause.into();

        let mut current_error: &dyn Error = &network_error;
        let mut depth = 0;

        while let Some(source) = current_error.source() {
            current_error = source;
            depth += 1;
            if depth > 10 {
                break;
            }
        }

        assert!(depth > 0, "Should have at least one source error");
    }

    #[tokio::test]
    async fn test_async_error_propagation() {
        async fn failing_call() -> ClientResult<i64> {
            Err(ClientError::Remote {
                code: -32000,
                message: "PID controller 9 does not exist".to_string(),
            })
        }

        async fn calling_function() -> ClientResult<i64> {
            let code = failing_call().await?;
            Ok(code)
        }

        let error = calling_function().await.unwrap_err();
        assert!(error.to_string().contains("Remote error -32000"));
        assert!(error.to_string().contains("does not exist"));
    }

    #[test]
    fn test_error_size() {
        let error_size = std::mem::size_of::<ClientError>();
        assert!(error_size <= 128, "ClientError too large: {} bytes", error_size);
    }
}
