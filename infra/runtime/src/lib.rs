//! # Runtime
//!
//! Builds the [Tokio](https://tokio.rs) runtime the gateway runs on.
//!
//! Two flavors are supported:
//! * **Multi-thread** (default): a work-stealing pool sized from `worker_threads`,
//!   `TOKIO_WORKER_THREADS` or the available parallelism.
//! * **Current-thread**: a single event loop; every handler is polled on the main thread.
//!
//! ```rust
//! use sgate_runtime::{RuntimeConfig, block_on};
//!
//! let answer = block_on(&RuntimeConfig::current_thread(), async { 40 + 2 }).unwrap();
//! assert_eq!(answer, 42);
//! ```

use sgate_domain::config::{RuntimeFlavor, RuntimeSettings};
use std::borrow::Cow;
use std::future::Future;
use std::sync::OnceLock;
use std::thread::available_parallelism;
use std::time::Duration;
use tokio::runtime::{Builder, Runtime};
use tracing::debug;

const DEFAULT_WORKER_THREADS: usize = 4;
const MAX_WORKER_THREADS: usize = 1024;
const DEFAULT_STACK_SIZE: usize = 3 * 1024 * 1024;
const MIN_STACK_SIZE: usize = 1024 * 1024;
const MAX_STACK_SIZE: usize = 16 * 1024 * 1024;
const THREAD_KEEP_ALIVE: Duration = Duration::from_secs(60);
const THREAD_NAME: &str = "sgate-worker";

static DETECTED_WORKERS: OnceLock<usize> = OnceLock::new();

#[sgate_derive::sgate_error]
pub enum RuntimeError {
    #[error("Failed to build Tokio runtime{}: {source}", format_context(.context))]
    Build { source: std::io::Error, context: Option<Cow<'static, str>> },
}

/// Worker count from `TOKIO_WORKER_THREADS` or the hardware, detected once.
fn detected_workers() -> usize {
    *DETECTED_WORKERS.get_or_init(|| {
        std::env::var("TOKIO_WORKER_THREADS")
            .ok()
            .and_then(|s| s.parse::<usize>().ok())
            .filter(|&n| (1..=MAX_WORKER_THREADS).contains(&n))
            .unwrap_or_else(|| {
                available_parallelism().map_or(DEFAULT_WORKER_THREADS, std::num::NonZero::get)
            })
    })
}

/// Runtime parameters. Values are clamped to safe bounds on construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuntimeConfig {
    pub flavor: RuntimeFlavor,
    pub worker_threads: usize,
    pub stack_size: usize,
    pub thread_name: String,
    pub thread_keep_alive: Duration,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            flavor: RuntimeFlavor::MultiThread,
            worker_threads: detected_workers(),
            stack_size: DEFAULT_STACK_SIZE,
            thread_name: THREAD_NAME.to_owned(),
            thread_keep_alive: THREAD_KEEP_ALIVE,
        }
    }
}

impl From<&RuntimeSettings> for RuntimeConfig {
    fn from(settings: &RuntimeSettings) -> Self {
        let config = Self { flavor: settings.flavor, ..Self::default() };
        match settings.worker_threads {
            Some(n) => config.with_worker_threads(n),
            None => config,
        }
    }
}

impl RuntimeConfig {
    /// A single-threaded event loop.
    #[must_use]
    pub fn current_thread() -> Self {
        Self { flavor: RuntimeFlavor::CurrentThread, worker_threads: 1, ..Self::default() }
    }

    #[must_use]
    pub fn with_worker_threads(mut self, threads: usize) -> Self {
        self.worker_threads = threads.clamp(1, MAX_WORKER_THREADS);
        self
    }

    #[must_use]
    pub fn with_stack_size(mut self, size: usize) -> Self {
        self.stack_size = size.clamp(MIN_STACK_SIZE, MAX_STACK_SIZE);
        self
    }

    #[must_use]
    pub fn with_thread_name(mut self, name: impl Into<String>) -> Self {
        let name = name.into();
        self.thread_name = if name.trim().is_empty() { THREAD_NAME.to_owned() } else { name };
        self
    }
}

/// Builds a runtime with all drivers (I/O, time) enabled.
///
/// # Errors
/// Returns [`RuntimeError::Build`] when the OS refuses to create the runtime threads.
pub fn build_runtime(config: &RuntimeConfig) -> Result<Runtime, RuntimeError> {
    debug!(
        flavor = ?config.flavor,
        workers = config.worker_threads,
        stack_size = config.stack_size,
        "Building Tokio runtime"
    );

    let mut builder = match config.flavor {
        RuntimeFlavor::MultiThread => {
            let mut b = Builder::new_multi_thread();
            b.worker_threads(config.worker_threads.clamp(1, MAX_WORKER_THREADS))
                .thread_keep_alive(config.thread_keep_alive);
            b
        }
        RuntimeFlavor::CurrentThread => Builder::new_current_thread(),
    };

    builder
        .enable_all()
        .thread_name(config.thread_name.clone())
        .thread_stack_size(config.stack_size.clamp(MIN_STACK_SIZE, MAX_STACK_SIZE))
        .build()
        .context(format!("{:?} runtime", config.flavor))
}

/// Builds a runtime from `config` and drives `future` to completion on it.
///
/// # Errors
/// Returns [`RuntimeError::Build`] if the runtime cannot be created.
pub fn block_on<F: Future>(config: &RuntimeConfig, future: F) -> Result<F::Output, RuntimeError> {
    Ok(build_runtime(config)?.block_on(future))
}
