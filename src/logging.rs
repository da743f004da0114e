use std::fs::OpenOptions;
use std::io::{self, Read, Seek, SeekFrom, Write};
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use tracing::Level;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::Layer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

pub const MAX_LOG_FILE_BYTES: u64 = 10 * 1024 * 1024;

/// Logs to stderr, and additionally to `log_file` when given.
///
/// Stdout is left to the chat transcript and summaries.
pub fn init_logging(log_level: Level, log_file: Option<&str>) {
    let level_filter = LevelFilter::from_level(log_level);
    let stderr_layer = tracing_subscriber::fmt::layer().with_writer(io::stderr);

    if let Some(path) = log_file {
        let capped_writer = make_capped_file_writer(PathBuf::from(path), MAX_LOG_FILE_BYTES);
        let file_layer = tracing_subscriber::fmt::layer()
            .with_ansi(false)
            .with_writer(capped_writer);
        tracing_subscriber::registry()
            .with(stderr_layer.with_filter(level_filter))
            .with(file_layer.with_filter(level_filter))
            .init();
    } else {
        tracing_subscriber::registry()
            .with(stderr_layer.with_filter(level_filter))
            .init();
    }
}

fn make_capped_file_writer(path: PathBuf, max_len: u64) -> impl Fn() -> CappedFileWriter {
    let lock = Arc::new(Mutex::new(()));
    move || CappedFileWriter { path: path.clone(), max_len, lock: lock.clone() }
}

/// Appends to a file, keeping only its newest half once it reaches `max_len`.
struct CappedFileWriter {
    path: PathBuf,
    max_len: u64,
    lock: Arc<Mutex<()>>,
}

impl CappedFileWriter {
    fn shrink_if_full(&self) -> io::Result<()> {
        let size = match std::fs::metadata(&self.path) {
            Ok(meta) => meta.len(),
            Err(_) => return Ok(()),
        };
        if size < self.max_len {
            return Ok(());
        }

        let keep = self.max_len / 2;
        let mut tail = Vec::new();
        let mut rf = OpenOptions::new().read(true).open(&self.path)?;
        rf.seek(SeekFrom::Start(size.saturating_sub(keep)))?;
        rf.read_to_end(&mut tail)?;

        let mut wf = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(true)
            .open(&self.path)?;
        wf.write_all(&tail)
    }
}

impl Write for CappedFileWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let _guard = self
            .lock
            .lock()
            .map_err(|_| io::Error::new(io::ErrorKind::Other, "log file lock poisoned"))?;

        self.shrink_if_full()?;
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        file.write_all(buf)?;
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}
