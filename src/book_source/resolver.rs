use super::catalog::{BookSource, SourceKind};

const CHAPTER_PLACEHOLDER: &str = "{chapter}";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    Url(String),
    /// 列表来源没有该章，本次运行无事可做。
    OutOfRange { chapter: u64, available: usize },
}

impl BookSource {
    pub fn resolve(&self, chapter: u64) -> Resolution {
        match &self.kind {
            SourceKind::Pattern(template) => Resolution::Url(fill_pattern(template, chapter)),
            SourceKind::List(urls) => chapter
                .checked_sub(1)
                .and_then(|idx| usize::try_from(idx).ok())
                .and_then(|idx| urls.get(idx))
                .map(|url| Resolution::Url(url.clone()))
                .unwrap_or(Resolution::OutOfRange {
                    chapter,
                    available: urls.len(),
                }),
        }
    }
}

/// `{chapter}` 替换为章节号，`{{` / `}}` 还原为单个花括号，其余字符原样保留。
fn fill_pattern(template: &str, chapter: u64) -> String {
    let mut out = String::with_capacity(template.len() + 8);
    let mut rest = template;
    while let Some(pos) = rest.find(['{', '}']) {
        out.push_str(&rest[..pos]);
        let tail = &rest[pos..];
        if let Some(after) = tail.strip_prefix("{{") {
            out.push('{');
            rest = after;
        } else if let Some(after) = tail.strip_prefix("}}") {
            out.push('}');
            rest = after;
        } else if let Some(after) = tail.strip_prefix(CHAPTER_PLACEHOLDER) {
            out.push_str(&chapter.to_string());
            rest = after;
        } else {
            out.push_str(&tail[..1]);
            rest = &tail[1..];
        }
    }
    out.push_str(rest);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn url(s: &str) -> Resolution {
        Resolution::Url(s.to_string())
    }

    #[test]
    fn pattern_substitutes_chapter() {
        let source = BookSource::pattern("https://books.example/foo/{chapter}.txt");
        for chapter in [1, 7, 42, 1000] {
            assert_eq!(
                source.resolve(chapter),
                url(&format!("https://books.example/foo/{chapter}.txt"))
            );
        }
    }

    #[test]
    fn pattern_replaces_every_placeholder_and_nothing_else() {
        let source = BookSource::pattern("http://x/{chapter}/page?c={chapter}&id={id}");
        assert_eq!(source.resolve(5), url("http://x/5/page?c=5&id={id}"));
    }

    #[test]
    fn doubled_braces_are_literal() {
        let source = BookSource::pattern("http://x/{{chapter}}/{chapter}");
        assert_eq!(source.resolve(3), url("http://x/{chapter}/3"));

        let source = BookSource::pattern("http://x/q?f={{\"c\":{chapter}}}");
        assert_eq!(source.resolve(12), url("http://x/q?f={\"c\":12}"));
    }

    #[test]
    fn lone_braces_are_kept() {
        let source = BookSource::pattern("http://x/}{chapter}{");
        assert_eq!(source.resolve(2), url("http://x/}2{"));
    }

    #[test]
    fn pattern_without_placeholder_is_returned_as_is() {
        let source = BookSource::pattern("http://x/latest.txt");
        assert_eq!(source.resolve(9), url("http://x/latest.txt"));
    }

    #[test]
    fn list_is_one_indexed() {
        let source = BookSource::list(["http://a/1", "http://a/2", "http://a/3"]);
        assert_eq!(source.resolve(1), url("http://a/1"));
        assert_eq!(source.resolve(3), url("http://a/3"));
    }

    #[test]
    fn list_bounds_are_out_of_range() {
        let source = BookSource::list(["http://a/1", "http://a/2"]);
        assert_eq!(
            source.resolve(0),
            Resolution::OutOfRange {
                chapter: 0,
                available: 2
            }
        );
        assert_eq!(
            source.resolve(3),
            Resolution::OutOfRange {
                chapter: 3,
                available: 2
            }
        );
    }

    #[test]
    fn empty_list_has_nothing() {
        let source = BookSource::list(Vec::<String>::new());
        assert!(matches!(source.resolve(1), Resolution::OutOfRange { .. }));
    }
}
