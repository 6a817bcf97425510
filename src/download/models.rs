//! 单次运行的数据模型：进度状态、保存结果与运行结果。

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::base_system::json_store::{self, JsonObject, StoreError};
use crate::book_source::SourceError;

/// `progress.json`：当前书名与下一章章节号。未知字段原样保留。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Progress {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub book: Option<String>,
    #[serde(default = "first_chapter")]
    pub chapter: u64,
    #[serde(flatten)]
    pub extra: JsonObject,
}

fn first_chapter() -> u64 {
    1
}

impl Progress {
    #[cfg(test)]
    pub fn new(book: impl Into<String>, chapter: u64) -> Self {
        Self {
            book: Some(book.into()),
            chapter,
            extra: JsonObject::new(),
        }
    }

    /// 文件不存在或为空对象时返回 `None`。
    pub fn load(path: &Path) -> Result<Option<Self>, StoreError> {
        let raw = json_store::load(path)?;
        if raw.is_empty() {
            return Ok(None);
        }
        serde_json::from_value(Value::Object(raw))
            .map(Some)
            .map_err(|source| StoreError::Parse {
                path: path.to_path_buf(),
                source,
            })
    }

    pub fn save(&self, path: &Path) -> Result<(), StoreError> {
        json_store::save(path, self)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PersistOutcome {
    Written { path: PathBuf, next_chapter: u64 },
    SkippedInvalid { status: Option<u16>, length: usize },
    SkippedExists { path: PathBuf },
}

#[derive(Debug, Error)]
pub enum FatalConfigError {
    #[error("No progress file found at {}. Please create one.", .0.display())]
    MissingProgress(PathBuf),
    #[error("Book '{book}' not found in {}.", catalog.display())]
    UnknownBook { book: String, catalog: PathBuf },
    #[error("Invalid source for book '{book}': {source}")]
    InvalidSource { book: String, source: SourceError },
    #[error("Chapter {chapter} of book '{book}' is the last representable chapter number.")]
    ChapterOverflow { book: String, chapter: u64 },
}

#[derive(Debug)]
pub enum RunOutcome {
    Written { path: PathBuf, next_chapter: u64 },
    SkippedInvalid { status: Option<u16>, length: usize },
    SkippedExists { path: PathBuf },
    SkippedOutOfRange { chapter: u64, available: usize },
    Fatal(FatalConfigError),
}

impl RunOutcome {
    /// 跳过不算失败，避免定时任务被标红；只有配置错误返回 1。
    pub fn exit_status(&self) -> u8 {
        match self {
            RunOutcome::Fatal(_) => 1,
            _ => 0,
        }
    }

    pub fn exit_code(&self) -> ExitCode {
        ExitCode::from(self.exit_status())
    }
}

impl From<PersistOutcome> for RunOutcome {
    fn from(outcome: PersistOutcome) -> Self {
        match outcome {
            PersistOutcome::Written { path, next_chapter } => {
                RunOutcome::Written { path, next_chapter }
            }
            PersistOutcome::SkippedInvalid { status, length } => {
                RunOutcome::SkippedInvalid { status, length }
            }
            PersistOutcome::SkippedExists { path } => RunOutcome::SkippedExists { path },
        }
    }
}

impl From<FatalConfigError> for RunOutcome {
    fn from(err: FatalConfigError) -> Self {
        RunOutcome::Fatal(err)
    }
}
