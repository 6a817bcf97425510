//! 书目文件（`books.json`）与来源描述。

use std::path::Path;

use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;

use crate::base_system::json_store::{self, JsonObject, StoreError};

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("unknown source type: {}", display_type(.0))]
    UnknownType(Option<Value>),
    #[error("pattern source has no `pattern` template")]
    MissingPattern,
    #[error("malformed source descriptor: {0}")]
    Malformed(#[from] serde_json::Error),
}

fn display_type(kind: &Option<Value>) -> String {
    match kind {
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
        None => "<missing>".to_string(),
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceKind {
    /// 含 `{chapter}` 占位符的地址模板。
    Pattern(String),
    /// 每章一个地址，下标 0 对应第 1 章。
    List(Vec<String>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookSource {
    pub kind: SourceKind,
    pub file_prefix: Option<String>,
}

#[derive(Deserialize)]
struct RawSource {
    #[serde(rename = "type", default)]
    kind: Option<Value>,
    #[serde(default)]
    pattern: Option<String>,
    #[serde(default)]
    list: Option<Vec<String>>,
    #[serde(default)]
    file_prefix: Option<String>,
}

#[cfg(test)]
impl BookSource {
    pub fn pattern(template: impl Into<String>) -> Self {
        Self {
            kind: SourceKind::Pattern(template.into()),
            file_prefix: None,
        }
    }

    pub fn list<I, S>(urls: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            kind: SourceKind::List(urls.into_iter().map(Into::into).collect()),
            file_prefix: None,
        }
    }

    pub fn with_file_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.file_prefix = Some(prefix.into());
        self
    }
}

impl BookSource {
    pub fn from_value(value: &Value) -> Result<Self, SourceError> {
        let raw = RawSource::deserialize(value)?;
        let kind = match raw.kind.as_ref().and_then(Value::as_str) {
            Some("pattern") => SourceKind::Pattern(raw.pattern.ok_or(SourceError::MissingPattern)?),
            Some("list") => SourceKind::List(raw.list.unwrap_or_default()),
            _ => return Err(SourceError::UnknownType(raw.kind)),
        };
        Ok(Self {
            kind,
            file_prefix: raw.file_prefix,
        })
    }

    /// 输出文件名前缀：显式配置优先，否则为书名（空格换成 `-`，转小写）。
    pub fn file_prefix_for(&self, book: &str) -> String {
        match &self.file_prefix {
            Some(prefix) => prefix.clone(),
            None => book.replace(' ', "-").to_lowercase(),
        }
    }
}

/// 书名 -> 来源描述。来源描述按需解码，未使用的条目即使格式不对也不影响本次运行。
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    books: JsonObject,
}

impl Catalog {
    pub fn load(path: &Path) -> Result<Self, StoreError> {
        Ok(Self {
            books: json_store::load(path)?,
        })
    }

    pub fn len(&self) -> usize {
        self.books.len()
    }

    pub fn is_empty(&self) -> bool {
        self.books.is_empty()
    }

    /// `None` 表示书目中没有该书。
    pub fn source(&self, book: &str) -> Option<Result<BookSource, SourceError>> {
        self.books.get(book).map(BookSource::from_value)
    }
}

impl From<JsonObject> for Catalog {
    fn from(books: JsonObject) -> Self {
        Self { books }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn decodes_pattern_source() {
        let source = BookSource::from_value(&json!({
            "type": "pattern",
            "pattern": "http://x/{chapter}.txt",
            "file_prefix": "foo"
        }))
        .unwrap();
        assert_eq!(
            source,
            BookSource::pattern("http://x/{chapter}.txt").with_file_prefix("foo")
        );
    }

    #[test]
    fn list_source_without_list_is_empty() {
        let source = BookSource::from_value(&json!({"type": "list"})).unwrap();
        assert_eq!(source.kind, SourceKind::List(Vec::new()));
    }

    #[test]
    fn unknown_or_missing_type_is_rejected() {
        let err = BookSource::from_value(&json!({"type": "rss"})).unwrap_err();
        assert!(matches!(err, SourceError::UnknownType(Some(_))));
        assert_eq!(err.to_string(), "unknown source type: rss");

        let err = BookSource::from_value(&json!({"pattern": "http://x"})).unwrap_err();
        assert!(matches!(err, SourceError::UnknownType(None)));
    }

    #[test]
    fn pattern_without_template_is_rejected() {
        let err = BookSource::from_value(&json!({"type": "pattern"})).unwrap_err();
        assert!(matches!(err, SourceError::MissingPattern));
    }

    #[test]
    fn non_object_descriptor_is_malformed() {
        let err = BookSource::from_value(&json!("http://x")).unwrap_err();
        assert!(matches!(err, SourceError::Malformed(_)));
    }

    #[test]
    fn default_prefix_is_hyphenated_lowercase() {
        let source = BookSource::pattern("http://x/{chapter}");
        assert_eq!(source.file_prefix_for("The Great Book"), "the-great-book");

        let source = source.with_file_prefix("tgb");
        assert_eq!(source.file_prefix_for("The Great Book"), "tgb");
    }

    #[test]
    fn catalog_lookup() {
        let books = json!({"Foo": {"type": "list", "list": ["http://a"]}});
        let Value::Object(map) = books else {
            unreachable!()
        };
        let catalog = Catalog::from(map);
        assert_eq!(catalog.len(), 1);
        assert!(catalog.source("Bar").is_none());
        assert!(matches!(catalog.source("Foo"), Some(Ok(_))));
    }
}
