// Integration tests for messageloop::runtime::RuntimeMessageLoop

mod common;

use std::sync::{Arc, OnceLock, Weak};
use std::time::Duration;

use common::{entry, Recorder, DEFAULT_WAIT};
use messageloop::{LoopError, LoopState, MessageLoop, RuntimeMessageLoop};
use tokio::runtime::Handle;

type StringLoop = RuntimeMessageLoop<String>;

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_lifecycle_on_host_runtime() {
    let recorder = Recorder::new();
    let event_loop = StringLoop::with_handle(recorder.handler(), Handle::current());

    assert!(!event_loop.post(1, None));
    assert!(!event_loop.shutdown());
    assert_eq!(event_loop.state(), LoopState::PreStart);

    assert!(event_loop.start());
    assert_eq!(event_loop.try_start(), Err(LoopError::AlreadyStarted));

    assert!(event_loop.post(7, Some("x".to_string())));
    assert!(wait_for(&recorder, 1).await);
    assert_eq!(recorder.entries(), vec![entry(7, "x")]);

    assert!(event_loop.shutdown());
    assert_eq!(event_loop.try_shutdown(), Err(LoopError::Stopped));
    assert_eq!(event_loop.try_post(8, None), Err(LoopError::Stopped));
    event_loop.terminated().await.unwrap();
    assert_eq!(recorder.len(), 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_shutdown_drains_queued_messages() {
    let recorder = Recorder::new();
    let event_loop = StringLoop::with_handle(recorder.handler(), Handle::current());
    assert!(event_loop.start());

    for i in 0..500 {
        assert!(event_loop.post(i, Some(i.to_string())));
    }
    assert!(event_loop.shutdown());
    event_loop.terminated().await.unwrap();

    let types: Vec<i32> = recorder.entries().iter().map(|(t, _)| *t).collect();
    assert_eq!(types, (0..500).collect::<Vec<_>>());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_is_on_loop_inside_handler_only() {
    let (tx, rx) = flume::unbounded();
    let slot: Arc<OnceLock<Weak<StringLoop>>> = Arc::new(OnceLock::new());
    let handler_slot = Arc::clone(&slot);
    let event_loop = Arc::new(StringLoop::with_handle(
        move |_msg_type: i32, _payload: Option<String>| {
            let on_loop = handler_slot
                .get()
                .and_then(Weak::upgrade)
                .map(|event_loop| event_loop.is_on_loop());
            tx.send(on_loop).unwrap();
        },
        Handle::current(),
    ));
    slot.set(Arc::downgrade(&event_loop)).unwrap();

    assert!(!event_loop.is_on_loop());
    assert!(event_loop.start());
    assert!(event_loop.post(1, None));
    assert_eq!(rx.recv_async().await.unwrap(), Some(true));

    // A different task on the same runtime is not the loop.
    let other = Arc::clone(&event_loop);
    assert!(!tokio::spawn(async move { other.is_on_loop() }).await.unwrap());
    assert!(!event_loop.is_on_loop());

    assert!(event_loop.shutdown());
    event_loop.terminated().await.unwrap();
}

#[test]
fn test_dedicated_runtime_thread() {
    let recorder = Recorder::new();
    let event_loop = StringLoop::create(recorder.handler());

    assert!(event_loop.start());
    assert!(!event_loop.is_on_loop());
    assert!(event_loop.post(1, Some("a".to_string())));
    assert!(event_loop.post(2, Some("b".to_string())));
    assert!(recorder.wait_for(2));
    assert_eq!(recorder.entries(), vec![entry(1, "a"), entry(2, "b")]);

    assert!(event_loop.shutdown());
    assert!(!event_loop.post(3, None));

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .unwrap();
    runtime.block_on(event_loop.terminated()).unwrap();
    assert_eq!(recorder.len(), 2);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_handler_panic_stops_runtime_loop() {
    let event_loop = StringLoop::with_handle(
        |msg_type: i32, _payload: Option<String>| {
            if msg_type == 99 {
                panic!("boom");
            }
        },
        Handle::current(),
    );
    assert!(event_loop.start());
    assert!(event_loop.post(99, None));

    let stopped = tokio::time::timeout(DEFAULT_WAIT, async {
        while event_loop.state() != LoopState::Stopped {
            tokio::time::sleep(Duration::from_millis(1)).await;
        }
    })
    .await;
    assert!(stopped.is_ok());
    assert!(!event_loop.post(1, None));
    assert_eq!(event_loop.try_shutdown(), Err(LoopError::Stopped));

    match event_loop.terminated().await {
        Err(LoopError::WorkerPanicked(reason)) => assert!(reason.contains("boom")),
        other => panic!("expected WorkerPanicked, got {:?}", other),
    }
    assert_eq!(event_loop.terminated().await, Ok(()));
}

async fn wait_for(recorder: &Recorder, count: usize) -> bool {
    tokio::time::timeout(DEFAULT_WAIT, async {
        while recorder.len() < count {
            tokio::time::sleep(Duration::from_millis(1)).await;
        }
    })
    .await
    .is_ok()
}
