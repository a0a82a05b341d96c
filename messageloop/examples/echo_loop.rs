use std::sync::Arc;
use std::thread;

use messageloop::{logging, BlockingQueueMessageLoop, LoopConfig, MessageLoop};

const GREET: i32 = 1;
const SUM: i32 = 2;

// Handler keeping state that is only ever touched on the loop thread
struct EchoHandler {
    total: u64,
}

impl messageloop::Handler<String> for EchoHandler {
    fn handle(&mut self, msg_type: i32, payload: Option<String>) {
        match (msg_type, payload) {
            (GREET, Some(name)) => logging::info!("hello, {}", name),
            (SUM, Some(value)) => {
                self.total += value.parse::<u64>().unwrap_or(0);
                logging::info!(total = self.total, "running sum");
            }
            (other, _) => logging::warn!(msg_type = other, "unknown message"),
        }
    }
}

fn main() -> anyhow::Result<()> {
    logging::init_development();

    let config = LoopConfig {
        pool_max_size: 8,
        thread_name_prefix: "echo".to_string(),
        ..Default::default()
    };
    let event_loop = Arc::new(BlockingQueueMessageLoop::with_config(
        EchoHandler { total: 0 },
        config,
    )?);
    event_loop.try_start()?;

    let producers: Vec<_> = (0..4)
        .map(|producer| {
            let event_loop = Arc::clone(&event_loop);
            thread::spawn(move || {
                event_loop.post(GREET, Some(format!("producer-{}", producer)));
                for value in 0..10 {
                    event_loop.post(SUM, Some(value.to_string()));
                }
            })
        })
        .collect();
    for producer in producers {
        producer.join().expect("producer panicked");
    }

    event_loop.try_shutdown()?;
    event_loop.join()?;
    logging::info!(pooled = event_loop.pooled_messages(), "loop finished");
    Ok(())
}
