// Integration tests for config types in messageloop::thread::config

use std::sync::Arc;

use messageloop::thread::config::*;
use messageloop::thread::{BlockingQueueMessageLoop, Envelope, FlumeQueue};
use messageloop::{LoopError, LoopState, MessageLoop};

#[test]
fn test_loop_config_defaults() {
    let config = LoopConfig::default();

    assert_eq!(config.pool_max_size, DEFAULT_POOL_MAX_SIZE);
    assert_eq!(config.pool_max_size, 50);
    assert!(config.queue_capacity.is_none());
    assert_eq!(config.thread_name_prefix, DEFAULT_THREAD_NAME_PREFIX);
    assert!(config.validate().is_ok());
}

#[test]
fn test_zero_capacity_queue_is_invalid() {
    let config = LoopConfig {
        queue_capacity: Some(0),
        ..Default::default()
    };
    assert!(matches!(config.validate(), Err(LoopError::InvalidConfig(_))));

    let handler = |_msg_type: i32, _payload: Option<()>| {};
    let result = messageloop::BlockingQueueMessageLoop::<()>::with_config(handler, config);
    assert!(matches!(result, Err(LoopError::InvalidConfig(_))));
}

#[test]
fn test_nul_in_thread_name_prefix_is_rejected_by_every_constructor() {
    let config = LoopConfig {
        thread_name_prefix: "a\0b".to_string(),
        ..Default::default()
    };
    assert!(matches!(config.validate(), Err(LoopError::InvalidConfig(_))));

    let handler = |_msg_type: i32, _payload: Option<()>| {};
    let result = BlockingQueueMessageLoop::<()>::with_config(handler, config.clone());
    assert!(matches!(result, Err(LoopError::InvalidConfig(_))));

    let queue = Arc::new(FlumeQueue::<Envelope<()>>::unbounded());
    let result = BlockingQueueMessageLoop::<()>::with_queue(handler, queue, config);
    assert!(matches!(result, Err(LoopError::InvalidConfig(_))));
}

#[test]
fn test_with_queue_accepts_valid_config() {
    let handler = |_msg_type: i32, _payload: Option<()>| {};
    let queue = Arc::new(FlumeQueue::<Envelope<()>>::unbounded());
    let event_loop =
        BlockingQueueMessageLoop::<()>::with_queue(handler, queue, LoopConfig::default()).unwrap();
    assert!(event_loop.start());
    assert_eq!(event_loop.state(), LoopState::Started);
    assert!(event_loop.shutdown());
    event_loop.join().unwrap();
}

#[test]
fn test_zero_pool_is_valid() {
    let config = LoopConfig {
        pool_max_size: 0,
        ..Default::default()
    };
    assert!(config.validate().is_ok());
}

#[test]
fn test_thread_name_appends_loop_id() {
    let config = LoopConfig {
        thread_name_prefix: "io".to_string(),
        ..Default::default()
    };
    let id = uuid::Uuid::new_v4();
    assert_eq!(config.thread_name(&id), format!("io-{}", id.simple()));
}

#[test]
fn test_config_debug_format() {
    let config = LoopConfig::default();
    assert!(format!("{:?}", config).contains("pool_max_size"));
}
