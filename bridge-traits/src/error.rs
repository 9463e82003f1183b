use thiserror::Error;

/// Error surface shared by the storage, entitlement, and time bridges.
///
/// Platform adapters map their native failures (keychain, SQLite, remote
/// document store) into these variants with actionable context.
#[derive(Error, Debug)]
pub enum BridgeError {
    #[error("Bridge operation failed: {0}")]
    OperationFailed(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, BridgeError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_io_errors_convert() {
        let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "locked");
        let err = BridgeError::from(io);
        assert!(matches!(err, BridgeError::Io(_)));
        assert!(err.to_string().contains("locked"));
    }

    #[test]
    fn test_operation_failed_keeps_context() {
        let err = BridgeError::OperationFailed("keychain refused the write".to_string());
        assert!(err.to_string().contains("keychain refused the write"));
    }
}

