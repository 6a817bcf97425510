//! 日志：控制台与 `logs/latest.log` 双输出，超限或退出时压缩归档。

use std::fs::{self, File};
use std::io::{self, IsTerminal};
use std::panic;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use time::OffsetDateTime;
use time::macros::format_description;
use tracing::error;
use tracing_appender::non_blocking::{NonBlockingBuilder, WorkerGuard};
use tracing_appender::rolling;
use tracing_subscriber::Layer;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::fmt;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use zip::CompressionMethod;
use zip::write::FileOptions;

const LOGS_DIR: &str = "logs";
const LATEST_LOG: &str = "latest.log";
const ROTATE_AT_BYTES: u64 = 10 * 1024 * 1024;
const INTERRUPTED_EXIT_CODE: i32 = 130;

#[derive(Debug, thiserror::Error)]
pub enum LogError {
    #[error("subscriber init failed: {0}")]
    Init(#[from] tracing_subscriber::util::TryInitError),
    #[error("io error: {0}")]
    Io(#[from] io::Error),
    #[error("zip error: {0}")]
    Zip(#[from] zip::result::ZipError),
    #[error("time formatting failed: {0}")]
    Time(#[from] time::error::Format),
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct LogOptions {
    pub debug: bool,
    pub use_color: bool,
    pub archive_on_exit: bool,
}

impl LogOptions {
    /// 标准输出不是终端（cron、重定向到文件）时不输出 ANSI 颜色。
    pub fn new(debug: bool, no_color: bool, archive_on_exit: bool) -> Self {
        Self::with_terminal(debug, no_color, archive_on_exit, io::stdout().is_terminal())
    }

    fn with_terminal(debug: bool, no_color: bool, archive_on_exit: bool, terminal: bool) -> Self {
        Self {
            debug,
            use_color: terminal && !no_color,
            archive_on_exit,
        }
    }
}

/// `logs/latest.log` 及同目录下的 `log_<时间>.zip` 归档。
#[derive(Debug, Clone)]
struct LogFiles {
    dir: PathBuf,
    latest: PathBuf,
}

impl LogFiles {
    fn under(base_dir: Option<&Path>) -> Self {
        let dir = base_dir.map_or_else(|| PathBuf::from(LOGS_DIR), |base| base.join(LOGS_DIR));
        let latest = dir.join(LATEST_LOG);
        Self { dir, latest }
    }

    fn rotate_if_larger_than(&self, limit: u64) -> Result<Option<PathBuf>, LogError> {
        match fs::metadata(&self.latest) {
            Ok(meta) if meta.len() >= limit => self.archive(),
            _ => Ok(None),
        }
    }

    /// 压缩 latest.log 后删除原文件；空文件直接删除。
    fn archive(&self) -> Result<Option<PathBuf>, LogError> {
        let len = match fs::metadata(&self.latest) {
            Ok(meta) => meta.len(),
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(err) => return Err(err.into()),
        };
        if len == 0 {
            fs::remove_file(&self.latest)?;
            return Ok(None);
        }

        let stamp = OffsetDateTime::now_utc().format(format_description!(
            "[year][month][day]_[hour][minute][second]"
        ))?;
        let target = self.free_archive_name(&stamp);

        let mut zip = zip::ZipWriter::new(File::create(&target)?);
        let options = FileOptions::default().compression_method(CompressionMethod::Deflated);
        zip.start_file(format!("{stamp}.log"), options)?;
        io::copy(&mut File::open(&self.latest)?, &mut zip)?;
        zip.finish()?;

        fs::remove_file(&self.latest)?;
        Ok(Some(target))
    }

    /// 同一秒内多次归档时追加序号，不覆盖已有归档。
    fn free_archive_name(&self, stamp: &str) -> PathBuf {
        let mut candidate = self.dir.join(format!("log_{stamp}.zip"));
        let mut n = 1;
        while candidate.exists() {
            candidate = self.dir.join(format!("log_{stamp}_{n}.zip"));
            n += 1;
        }
        candidate
    }
}

/// 持有文件写入线程；drop 时刷新并按需归档。
pub struct LogSystem {
    shutdown: Arc<Shutdown>,
}

impl LogSystem {
    pub fn init(options: LogOptions, base_dir: Option<&Path>) -> Result<Self, LogError> {
        let files = LogFiles::under(base_dir);
        fs::create_dir_all(&files.dir)?;
        files.rotate_if_larger_than(ROTATE_AT_BYTES)?;

        let (file_writer, guard) = NonBlockingBuilder::default()
            .lossy(false)
            .finish(rolling::never(&files.dir, LATEST_LOG));

        let console_level = if options.debug {
            LevelFilter::DEBUG
        } else {
            LevelFilter::INFO
        };

        tracing_subscriber::registry()
            .with(
                fmt::layer()
                    .with_target(false)
                    .with_ansi(options.use_color)
                    .with_writer(io::stdout)
                    .with_filter(console_level),
            )
            .with(
                fmt::layer()
                    .with_target(false)
                    .with_ansi(false)
                    .with_writer(file_writer)
                    .with_filter(LevelFilter::DEBUG),
            )
            .try_init()?;

        let shutdown = Arc::new(Shutdown {
            files,
            guard: Mutex::new(Some(guard)),
            archive: options.archive_on_exit,
            done: AtomicBool::new(false),
        });
        shutdown.install_hooks();
        Ok(Self { shutdown })
    }
}

impl Drop for LogSystem {
    fn drop(&mut self) {
        self.shutdown.run();
    }
}

struct Shutdown {
    files: LogFiles,
    guard: Mutex<Option<WorkerGuard>>,
    archive: bool,
    done: AtomicBool,
}

impl Shutdown {
    /// Ctrl-C 与 panic 时同样刷新日志。
    fn install_hooks(self: &Arc<Self>) {
        let on_signal = Arc::clone(self);
        let _ = ctrlc::set_handler(move || {
            on_signal.run();
            std::process::exit(INTERRUPTED_EXIT_CODE);
        });

        let on_panic = Arc::clone(self);
        let previous = panic::take_hook();
        panic::set_hook(Box::new(move |info| {
            error!("panic: {info}");
            on_panic.run();
            previous(info);
        }));
    }

    fn run(&self) {
        if self.done.swap(true, Ordering::SeqCst) {
            return;
        }
        // 先释放 guard，确保 latest.log 已写完再归档
        if let Ok(mut guard) = self.guard.lock() {
            guard.take();
        }
        if self.archive
            && let Err(err) = self.files.archive()
        {
            eprintln!("failed to archive log: {err}");
        }
    }
}
