//! 运行配置结构（Config）与默认值。
//!
//! 该模块同时提供生成 `config.yml` 的字段元信息。

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::config::FieldMeta;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    // 数据文件
    #[serde(default = "default_books_file")]
    pub books_file: String,
    #[serde(default = "default_progress_file")]
    pub progress_file: String,
    #[serde(default = "default_output_dir")]
    pub output_dir: String,

    // 校验
    #[serde(default = "default_min_length")]
    pub min_length: usize,

    // 网络配置
    #[serde(default = "default_request_timeout")]
    pub request_timeout: u64,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    // 日志
    #[serde(default)]
    pub archive_logs_on_exit: bool,

    #[serde(skip)]
    base_dir: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            books_file: default_books_file(),
            progress_file: default_progress_file(),
            output_dir: default_output_dir(),
            min_length: default_min_length(),
            request_timeout: default_request_timeout(),
            user_agent: default_user_agent(),
            archive_logs_on_exit: false,
            base_dir: None,
        }
    }
}

impl Config {
    /// `config.yml` 中的字段顺序与注释。
    pub const FIELDS: &'static [FieldMeta] = &[
        FieldMeta {
            name: "books_file",
            description: "书目配置文件（书名 -> 来源描述）",
        },
        FieldMeta {
            name: "progress_file",
            description: "进度文件，记录当前书名与下一章章节号",
        },
        FieldMeta {
            name: "output_dir",
            description: "章节文件保存目录",
        },
        FieldMeta {
            name: "min_length",
            description: "正文去除首尾空白后的最小字符数，低于该值视为无效内容",
        },
        FieldMeta {
            name: "request_timeout",
            description: "请求超时时间（秒）",
        },
        FieldMeta {
            name: "user_agent",
            description: "请求使用的 User-Agent",
        },
        FieldMeta {
            name: "archive_logs_on_exit",
            description: "退出时将 logs/latest.log 压缩归档",
        },
    ];

    /// 相对路径以此目录为基准（`--data-dir`），未设置时为当前目录。
    pub fn with_base_dir(mut self, base_dir: Option<&Path>) -> Self {
        self.base_dir = base_dir.map(Path::to_path_buf);
        self
    }

    pub fn books_path(&self) -> PathBuf {
        self.resolve(&self.books_file)
    }

    pub fn progress_path(&self) -> PathBuf {
        self.resolve(&self.progress_file)
    }

    pub fn output_path(&self) -> PathBuf {
        self.resolve(&self.output_dir)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout.max(1))
    }

    fn resolve(&self, raw: &str) -> PathBuf {
        let path = Path::new(raw.trim());
        match &self.base_dir {
            Some(base) if path.is_relative() => base.join(path),
            _ => path.to_path_buf(),
        }
    }
}

fn default_books_file() -> String {
    "books.json".to_string()
}

fn default_progress_file() -> String {
    "progress.json".to_string()
}

fn default_output_dir() -> String {
    "chapters".to_string()
}

fn default_min_length() -> usize {
    30
}

fn default_request_timeout() -> u64 {
    20
}

fn default_user_agent() -> String {
    "Mozilla/5.0 (compatible; DailyBookBot/1.0)".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn relative_paths_follow_base_dir() {
        let config = Config::default().with_base_dir(Some(Path::new("/data")));
        assert_eq!(config.books_path(), PathBuf::from("/data/books.json"));
        assert_eq!(config.output_path(), PathBuf::from("/data/chapters"));
    }

    #[test]
    fn absolute_paths_ignore_base_dir() {
        let mut config = Config::default();
        config.progress_file = "/srv/state/progress.json".to_string();
        let config = config.with_base_dir(Some(Path::new("/data")));
        assert_eq!(
            config.progress_path(),
            PathBuf::from("/srv/state/progress.json")
        );
    }

    #[test]
    fn defaults_without_base_dir_are_cwd_relative() {
        let config = Config::default();
        assert_eq!(config.books_path(), PathBuf::from("books.json"));
        assert_eq!(config.timeout(), Duration::from_secs(20));
        assert_eq!(config.min_length, 30);
        assert!(!config.archive_logs_on_exit);
    }

    #[test]
    fn every_serialized_field_is_described() {
        let value = serde_yaml::to_value(Config::default()).unwrap();
        let keys: Vec<&str> = value
            .as_mapping()
            .unwrap()
            .keys()
            .filter_map(|k| k.as_str())
            .collect();
        let described: Vec<&str> = Config::FIELDS.iter().map(|f| f.name).collect();
        assert_eq!(keys, described);
    }
}
