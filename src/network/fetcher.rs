use std::time::Duration;

use anyhow::{Context, Result};
use reqwest::blocking::Client;
use reqwest::header::{ACCEPT, ACCEPT_ENCODING, HeaderMap, HeaderValue, USER_AGENT};
use tracing::{debug, warn};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchResponse {
    pub status: u16,
    pub body: String,
}

/// 单次 GET。传输层错误（DNS/连接/超时/TLS/读取正文）不向上抛出，记录日志后返回 `None`。
pub trait ChapterFetcher {
    fn fetch(&self, url: &str) -> Option<FetchResponse>;
}

pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    pub fn new(user_agent: &str, timeout: Duration) -> Result<Self> {
        // reqwest is built without default features (no gzip decoder).
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("*/*"));
        headers.insert(ACCEPT_ENCODING, HeaderValue::from_static("identity"));
        headers.insert(
            USER_AGENT,
            HeaderValue::from_str(user_agent)
                .with_context(|| format!("invalid user agent: {user_agent:?}"))?,
        );

        let client = Client::builder()
            .default_headers(headers)
            .timeout(timeout)
            .build()
            .context("build http client")?;
        Ok(Self { client })
    }
}

impl ChapterFetcher for HttpFetcher {
    fn fetch(&self, url: &str) -> Option<FetchResponse> {
        let resp = match self.client.get(url).send() {
            Ok(resp) => resp,
            Err(err) => {
                warn!("Fetch error: {err}");
                return None;
            }
        };

        let status = resp.status().as_u16();
        debug!("GET {url} -> {status}");

        // 按响应声明的 charset 解码，缺省 UTF-8
        match resp.text() {
            Ok(body) => Some(FetchResponse { status, body }),
            Err(err) => {
                warn!("Fetch error while reading body: {err}");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_user_agent_with_control_chars() {
        assert!(HttpFetcher::new("bad\nagent", Duration::from_secs(1)).is_err());
    }

    #[test]
    fn unreachable_host_is_swallowed() {
        let fetcher = HttpFetcher::new(
            "Mozilla/5.0 (compatible; DailyBookBot/1.0)",
            Duration::from_secs(2),
        )
        .unwrap();
        // 端口 9 (discard) 在本地通常无人监听，连接立即被拒绝
        assert!(fetcher.fetch("http://127.0.0.1:9/ch1.txt").is_none());
    }

    #[test]
    fn malformed_url_is_swallowed() {
        let fetcher = HttpFetcher::new("DailyBookBot", Duration::from_secs(1)).unwrap();
        assert!(fetcher.fetch("not a url").is_none());
    }
}
