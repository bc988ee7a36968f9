//! Shared tracing setup for RDE toolkit binaries (`spec.md` §5).
//!
//! The run's log file is created lazily, on first write, named
//! `rdesys_YYYYMMDD_HHMMSS.log` with the timestamp taken at creation
//! time — a run that emits no log lines leaves no empty file behind.

use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use anyhow::{Context, Result};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

const DEFAULT_LOG_FILTER: &str = "rde=info,rde_pipeline=info,rde_classifier=info";

/// Logging configuration shared by RDE toolkit binaries.
pub struct LogConfig<'a> {
    pub app_name: &'a str,
    pub verbose: bool,
}

/// Initialize tracing with a deferred-creation file writer and stderr
/// output. `log_dir` is the run's `logs/` directory (`OutputPaths::logs`).
pub fn init_logging(log_dir: PathBuf, config: LogConfig<'_>) -> Result<()> {
    let file_writer = SharedDeferredWriter::new(log_dir);

    let file_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    let console_filter = if config.verbose {
        file_filter.clone()
    } else {
        EnvFilter::new("warn")
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(file_writer)
                .with_ansi(false)
                .with_filter(file_filter),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_filter(console_filter),
        )
        .init();

    tracing::debug!(app = config.app_name, "logging initialized");
    Ok(())
}

struct DeferredFileAppender {
    dir: PathBuf,
    file: Option<File>,
}

impl DeferredFileAppender {
    fn new(dir: PathBuf) -> Self {
        Self { dir, file: None }
    }

    fn ensure_open(&mut self) -> io::Result<&mut File> {
        if self.file.is_none() {
            fs::create_dir_all(&self.dir)?;
            let name = format!("rdesys_{}.log", chrono::Local::now().format("%Y%m%d_%H%M%S"));
            let file = OpenOptions::new().create(true).append(true).open(self.dir.join(name))?;
            self.file = Some(file);
        }
        Ok(self.file.as_mut().expect("just opened"))
    }
}

impl Write for DeferredFileAppender {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.ensure_open()?.write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        match self.file.as_mut() {
            Some(file) => file.flush(),
            None => Ok(()),
        }
    }
}

#[derive(Clone)]
struct SharedDeferredWriter {
    inner: Arc<Mutex<DeferredFileAppender>>,
}

impl SharedDeferredWriter {
    fn new(dir: PathBuf) -> Self {
        Self {
            inner: Arc::new(Mutex::new(DeferredFileAppender::new(dir))),
        }
    }
}

struct SharedDeferredWriterGuard {
    inner: Arc<Mutex<DeferredFileAppender>>,
}

impl<'a> tracing_subscriber::fmt::MakeWriter<'a> for SharedDeferredWriter {
    type Writer = SharedDeferredWriterGuard;

    fn make_writer(&'a self) -> Self::Writer {
        SharedDeferredWriterGuard {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl Write for SharedDeferredWriterGuard {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let mut guard = self
            .inner
            .lock()
            .map_err(|_| io::Error::new(io::ErrorKind::Other, "log writer lock poisoned"))?;
        guard.write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        let mut guard = self
            .inner
            .lock()
            .map_err(|_| io::Error::new(io::ErrorKind::Other, "log writer lock poisoned"))?;
        guard.flush()
    }
}
