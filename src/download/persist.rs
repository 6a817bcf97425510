//! 校验抓取结果、写入章节文件并推进进度。

use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, anyhow};
use tracing::{info, warn};

use super::models::{PersistOutcome, Progress};
use crate::book_source::BookSource;
use crate::network::FetchResponse;

const OK_STATUS: u16 = 200;

pub fn chapter_file_name(prefix: &str, chapter: u64) -> String {
    format!("{prefix}_ch{chapter}.txt")
}

/// 去除首尾空白后按字符计数，不足 `min_length` 视为无效。
pub fn is_valid_content(status: u16, body: &str, min_length: usize) -> bool {
    status == OK_STATUS && !body.is_empty() && body.trim().chars().count() >= min_length
}

pub struct Persister<'a> {
    pub output_dir: &'a Path,
    pub progress_path: &'a Path,
    pub min_length: usize,
}

impl Persister<'_> {
    pub fn chapter_path(&self, prefix: &str, chapter: u64) -> PathBuf {
        self.output_dir.join(chapter_file_name(prefix, chapter))
    }

    /// 仅在新写入章节文件后推进 `progress.chapter`；其余情况进度不变。
    pub fn persist(
        &self,
        book: &str,
        chapter: u64,
        source: &BookSource,
        progress: &mut Progress,
        response: Option<&FetchResponse>,
    ) -> Result<PersistOutcome> {
        let body = match response {
            Some(resp) if is_valid_content(resp.status, &resp.body, self.min_length) => {
                resp.body.as_str()
            }
            _ => {
                let status = response.map(|r| r.status);
                let length = response.map_or(0, |r| r.body.chars().count());
                warn!(
                    "Failed to fetch valid content (status={}, len={length}).",
                    status.map_or_else(|| "none".to_string(), |s| s.to_string())
                );
                return Ok(PersistOutcome::SkippedInvalid { status, length });
            }
        };

        // 先算好下一章，溢出时不落盘
        let next_chapter = chapter
            .checked_add(1)
            .ok_or_else(|| anyhow!("chapter {chapter} of '{book}' cannot be advanced"))?;

        let path = self.chapter_path(&source.file_prefix_for(book), chapter);
        if path.exists() {
            info!("Already have file: {}", path.display());
            return Ok(PersistOutcome::SkippedExists { path });
        }

        fs::create_dir_all(self.output_dir)
            .with_context(|| format!("create output dir {}", self.output_dir.display()))?;

        if !write_new_file(&path, body)? {
            info!("Already have file: {}", path.display());
            return Ok(PersistOutcome::SkippedExists { path });
        }
        info!("Saved: {}", path.display());

        progress.chapter = next_chapter;
        progress
            .save(self.progress_path)
            .context("update progress")?;
        info!(
            "Progress updated: book={}, chapter={next_chapter}",
            progress.book.as_deref().unwrap_or(book)
        );

        Ok(PersistOutcome::Written { path, next_chapter })
    }
}

/// 以 create_new 打开，文件已存在时返回 `Ok(false)`，不覆盖。
fn write_new_file(path: &Path, body: &str) -> Result<bool> {
    let mut file = match OpenOptions::new().write(true).create_new(true).open(path) {
        Ok(file) => file,
        Err(err) if err.kind() == io::ErrorKind::AlreadyExists => return Ok(false),
        Err(err) => {
            return Err(err).with_context(|| format!("create chapter file {}", path.display()));
        }
    };
    file.write_all(body.as_bytes())
        .with_context(|| format!("write chapter file {}", path.display()))?;
    Ok(true)
}
