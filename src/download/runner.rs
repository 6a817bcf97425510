//! 单次运行编排：书目 -> 进度 -> 来源 -> 地址 -> 抓取 -> 保存。

use anyhow::{Context, Result};
use tracing::{debug, error, info, warn};

use super::models::{FatalConfigError, Progress, RunOutcome};
use super::persist::Persister;
use crate::base_system::context::Config;
use crate::book_source::{Catalog, Resolution};
use crate::network::ChapterFetcher;

/// 执行一次抓取。配置错误与各类跳过都以 `RunOutcome` 返回；
/// 只有 IO 与 JSON 解析错误走 `Err`。
pub fn run_once(config: &Config, fetcher: &dyn ChapterFetcher) -> Result<RunOutcome> {
    let books_path = config.books_path();
    let progress_path = config.progress_path();

    let catalog = Catalog::load(&books_path)
        .with_context(|| format!("load catalog {}", books_path.display()))?;
    if catalog.is_empty() {
        warn!("Catalog {} is empty or missing.", books_path.display());
    } else {
        debug!("Catalog loaded: {} book(s)", catalog.len());
    }

    let Some(mut progress) = Progress::load(&progress_path)
        .with_context(|| format!("load progress {}", progress_path.display()))?
    else {
        return Ok(fatal(FatalConfigError::MissingProgress(progress_path)));
    };

    let book = progress.book.clone().unwrap_or_default();
    let chapter = progress.chapter;
    let source = match catalog.source(&book) {
        Some(Ok(source)) => source,
        Some(Err(source)) => {
            return Ok(fatal(FatalConfigError::InvalidSource { book, source }));
        }
        None => {
            return Ok(fatal(FatalConfigError::UnknownBook {
                book,
                catalog: books_path,
            }));
        }
    };
    debug!("Book '{book}', next chapter {chapter}");
    if chapter.checked_add(1).is_none() {
        return Ok(fatal(FatalConfigError::ChapterOverflow { book, chapter }));
    }

    let url = match source.resolve(chapter) {
        Resolution::Url(url) => url,
        Resolution::OutOfRange { chapter, available } => {
            info!("Chapter index out of range for list source ({chapter} of {available}).");
            return Ok(RunOutcome::SkippedOutOfRange { chapter, available });
        }
    };

    info!("Fetching: {url}");
    let response = fetcher.fetch(&url);

    let output_dir = config.output_path();
    let persister = Persister {
        output_dir: &output_dir,
        progress_path: &progress_path,
        min_length: config.min_length,
    };
    let outcome = persister.persist(&book, chapter, &source, &mut progress, response.as_ref())?;
    Ok(outcome.into())
}

fn fatal(err: FatalConfigError) -> RunOutcome {
    error!("{err}");
    RunOutcome::Fatal(err)
}
