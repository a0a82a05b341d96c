use messageloop_api::errors::LoopError;
use std::error::Error;
use anyhow::{anyhow, Result as AnyhowResult};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lifecycle_error_messages() {
        assert_eq!(LoopError::NotStarted.to_string(), "Message loop has not been started");
        assert_eq!(LoopError::AlreadyStarted.to_string(), "Message loop has already been started");
        assert_eq!(LoopError::Stopped.to_string(), "Message loop is stopped");
        assert_eq!(LoopError::NotStopped.to_string(), "Message loop has not been shut down");
    }

    #[test]
    fn test_queue_full_error() {
        let error = LoopError::QueueFull { capacity: 16 };

        assert_eq!(error.to_string(), "Message queue is full (capacity: 16)");
        assert!(error.source().is_none());
        assert!(!error.is_lifecycle());
    }

    #[test]
    fn test_spawn_failed_error() {
        let error = LoopError::SpawnFailed("Resource temporarily unavailable".to_string());

        assert_eq!(
            error.to_string(),
            "Failed to spawn loop worker: Resource temporarily unavailable"
        );
        assert!(!error.is_lifecycle());
    }

    #[test]
    fn test_worker_panicked_error() {
        let error = LoopError::WorkerPanicked("boom".to_string());
        assert_eq!(error.to_string(), "Loop worker panicked: boom");
    }

    #[test]
    fn test_is_lifecycle() {
        assert!(LoopError::NotStarted.is_lifecycle());
        assert!(LoopError::AlreadyStarted.is_lifecycle());
        assert!(LoopError::Stopped.is_lifecycle());
        assert!(LoopError::NotStopped.is_lifecycle());
        assert!(!LoopError::QueueClosed.is_lifecycle());
        assert!(!LoopError::JoinFromLoop.is_lifecycle());
        assert!(!LoopError::InvalidConfig("x".to_string()).is_lifecycle());
    }

    // Test converting to anyhow::Result
    #[test]
    fn test_convert_to_anyhow_result() {
        let anyhow_result: AnyhowResult<()> = Err(LoopError::QueueClosed).map_err(|e| anyhow!(e));

        let err_string = anyhow_result.unwrap_err().to_string();
        assert!(err_string.contains("Message queue is closed"));
    }
}
