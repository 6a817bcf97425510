//! 网络请求。

pub mod fetcher;

pub use fetcher::{ChapterFetcher, FetchResponse, HttpFetcher};
