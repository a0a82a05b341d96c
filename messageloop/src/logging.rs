// Logging for message loops
//
// This module provides a unified logging setup for applications built on the
// message loops in this crate. It sits on top of the `tracing` ecosystem; the
// loops themselves only emit events and spans, installing a subscriber is left
// to the application through the functions below.
//
// # Usage Examples
//
// ```rust,ignore
// use messageloop::logging;
//
// // INFO level, human readable console output
// logging::init_default();
//
// // Or pick the settings
// logging::init(logging::LogConfig {
//     level: tracing::Level::DEBUG,
//     json_format: false,
//     ..Default::default()
// });
// ```
//
// Loop events carry the loop id, so one loop can be isolated with a filter:
//
// ```text
// RUST_LOG=messageloop::thread=trace
// ```

use std::io;
use std::sync::Once;
use tracing::{Level, Subscriber};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Configuration for the logging setup
///
/// # Examples
///
/// ```rust
/// use messageloop::logging::LogConfig;
/// use tracing::Level;
///
/// let config = LogConfig {
///     level: Level::DEBUG,
///     target_filters: Some("messageloop::thread=trace".to_string()),
///     ..Default::default()
/// };
/// assert!(config.show_thread_info);
/// ```
#[derive(Debug, Clone)]
pub struct LogConfig {
    /// Minimum log level to display
    pub level: Level,
    /// Whether to use JSON format for logs
    pub json_format: bool,
    /// Whether to include file and line information
    pub show_file_line: bool,
    /// Whether to include thread name/id
    pub show_thread_info: bool,
    /// Whether to include timestamps
    pub show_time: bool,
    /// Target filter expressions (format: "target=level,target2=level2,...")
    pub target_filters: Option<String>,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: Level::INFO,
            json_format: false,
            show_file_line: true,
            show_thread_info: true,
            show_time: true,
            target_filters: None,
        }
    }
}

impl LogConfig {
    /// Builds the level filter: `RUST_LOG` first, then the configured level and
    /// target directives.
    pub fn env_filter(&self) -> EnvFilter {
        let mut env_filter = EnvFilter::from_default_env().add_directive(self.level.into());

        if let Some(filters) = &self.target_filters {
            for filter in filters.split(',') {
                match filter.trim().parse() {
                    Ok(directive) => env_filter = env_filter.add_directive(directive),
                    Err(err) => eprintln!("Ignoring invalid log filter '{}': {}", filter, err),
                }
            }
        }
        env_filter
    }
}

// Initialization guard to ensure we only initialize once
static INIT: Once = Once::new();

/// Initialize the logging system with the given configuration
///
/// Installs the global tracing subscriber. Safe to call multiple times; only
/// the first call takes effect.
pub fn init(config: LogConfig) {
    INIT.call_once(|| {
        let registry = tracing_subscriber::registry().with(config.env_filter());

        let subscriber: Box<dyn Subscriber + Send + Sync> = if config.json_format {
            Box::new(registry.with(fmt::layer().json().flatten_event(true)))
        } else {
            let fmt_layer = fmt::layer()
                .with_ansi(atty::is(atty::Stream::Stdout))
                .with_file(config.show_file_line)
                .with_line_number(config.show_file_line)
                .with_thread_names(config.show_thread_info)
                .with_thread_ids(config.show_thread_info);
            if config.show_time {
                Box::new(registry.with(fmt_layer))
            } else {
                Box::new(registry.with(fmt_layer.without_time()))
            }
        };

        set_global_subscriber(subscriber);
    });
}

fn set_global_subscriber<S>(subscriber: S)
where
    S: Subscriber + Send + Sync + 'static,
{
    if let Err(err) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Error setting global tracing subscriber: {}", err);
    }
}

/// Opens `path` in append mode, creating it if needed, as a log sink.
pub fn file_writer(path: &str) -> io::Result<Box<dyn io::Write + Send + Sync + 'static>> {
    use std::fs::OpenOptions;

    let file = OpenOptions::new().create(true).append(true).open(path)?;

    Ok(Box::new(file))
}

/// Initialize logging to both the console and `log_file`.
///
/// The file is checked up front so a bad path is reported to the caller
/// instead of silently falling back to stderr.
pub fn init_with_file(config: LogConfig, log_file: &str) -> Result<(), io::Error> {
    file_writer(log_file)?;

    INIT.call_once(|| {
        let console_layer = fmt::layer()
            .with_ansi(atty::is(atty::Stream::Stdout))
            .with_file(config.show_file_line)
            .with_line_number(config.show_file_line)
            .with_thread_names(config.show_thread_info)
            .with_thread_ids(config.show_thread_info);

        let log_file_path = log_file.to_string();
        let file_layer = fmt::layer()
            .with_ansi(false)
            .with_writer(move || match file_writer(&log_file_path) {
                Ok(writer) => writer,
                Err(_) => Box::new(std::io::stderr()),
            })
            .with_file(true)
            .with_line_number(true)
            .with_thread_names(true)
            .with_thread_ids(true);

        let subscriber = tracing_subscriber::registry()
            .with(config.env_filter())
            .with(console_layer)
            .with(file_layer);

        set_global_subscriber(subscriber);
    });

    Ok(())
}

/// INFO level, human readable console output.
pub fn init_default() {
    init(LogConfig::default());
}

/// DEBUG everywhere, TRACE for the loop engine (rejected posts, lifecycle).
pub fn init_development() {
    init(LogConfig {
        level: Level::DEBUG,
        target_filters: Some("messageloop=debug,messageloop::thread=trace".to_string()),
        ..Default::default()
    });
}

/// JSON lines at INFO, no source locations.
pub fn init_production() {
    init(LogConfig {
        level: Level::INFO,
        json_format: true,
        show_file_line: false,
        show_thread_info: true,
        show_time: true,
        target_filters: None,
    });
}

/// Warnings and errors only, compact, for test binaries.
pub fn init_test() {
    init(LogConfig {
        level: Level::WARN,
        json_format: false,
        show_file_line: true,
        show_thread_info: false,
        show_time: false,
        target_filters: None,
    });
}

/// Span covering everything a loop worker does.
///
/// ```rust
/// let id = uuid::Uuid::new_v4();
/// let span = messageloop::loop_span!("blocking_queue", id);
/// let _guard = span.enter();
/// ```
#[macro_export]
macro_rules! loop_span {
    ($kind:expr, $loop_id:expr) => {
        tracing::info_span!("message_loop", kind = $kind, loop_id = %$loop_id)
    };
    ($kind:expr, $loop_id:expr, $($fields:tt)*) => {
        tracing::info_span!("message_loop", kind = $kind, loop_id = %$loop_id, $($fields)*)
    };
}

/// Log a loop lifecycle event.
///
/// ```rust
/// let id = uuid::Uuid::new_v4();
/// messageloop::log_lifecycle!("runtime", id, "drained");
/// messageloop::log_lifecycle!("runtime", id, "stopped", dispatched = 3);
/// ```
#[macro_export]
macro_rules! log_lifecycle {
    ($kind:expr, $loop_id:expr, $event:expr) => {
        tracing::info!(kind = $kind, loop_id = %$loop_id, event = $event)
    };
    ($kind:expr, $loop_id:expr, $event:expr, $($fields:tt)*) => {
        tracing::info!(kind = $kind, loop_id = %$loop_id, event = $event, $($fields)*)
    };
}

// Re-export the most commonly used tracing macros for convenience
pub use tracing::{debug, error, info, trace, warn};
