//! 书目与章节来源。
//!
//! - `catalog`  — 书目（书名 -> 来源描述）与来源描述的解码
//! - `resolver` — 按章节号计算章节地址

pub mod catalog;
pub mod resolver;

pub use catalog::{BookSource, Catalog, SourceError};
pub use resolver::Resolution;
